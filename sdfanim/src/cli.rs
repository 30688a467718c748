//! Root CLI structure for sdfanim

use clap::{Parser, Subcommand};

use crate::commands::{demo::DemoArgs, info::InfoArgs, play::PlayArgs, tree::TreeArgs};

#[derive(Parser)]
#[command(name = "sdfanim")]
#[command(about = "Author, inspect and play skeletal animation object files", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Author a demo arm and save it as an object file
    Demo(DemoArgs),

    /// Display information about an object file
    Info(InfoArgs),

    /// Display the objects of a file as a tree
    Tree(TreeArgs),

    /// Step an object's player and print the joint translations
    Play(PlayArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

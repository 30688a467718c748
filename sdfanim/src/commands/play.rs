//! Step through an object's playback

use anyhow::{Context, Result, ensure};
use clap::Args;
use log::debug;
use std::path::PathBuf;

use super::load_object;

#[derive(Args)]
pub struct PlayArgs {
    /// Path to the object file
    pub file: PathBuf,

    /// Index of the object to play
    #[arg(short, long, default_value = "0")]
    pub object: usize,

    /// Number of updates to run
    #[arg(short, long, default_value = "10")]
    pub steps: usize,

    /// Seconds per update
    #[arg(long, default_value = "0.1")]
    pub delta: f32,

    /// Override the stored player duration
    #[arg(short, long)]
    pub duration: Option<f32>,

    /// Loop playback (only used with --duration)
    #[arg(short, long = "loop")]
    pub looping: bool,
}

pub fn execute(args: PlayArgs) -> Result<()> {
    ensure!(args.delta.is_finite() && args.delta >= 0.0, "Delta must be a non-negative number");

    let mut object = load_object(&args.file, args.object)?;
    if let Some(duration) = args.duration {
        object
            .start(duration, args.looping)
            .with_context(|| format!("Cannot play with duration {duration}"))?;
    } else if !object.player().is_started() {
        debug!("Stored player was never started, using one second without looping");
        object.start(1.0, false)?;
    }

    println!(
        "Playing object {} ({} joints, {:.3}s{})",
        args.object,
        object.joint_count(),
        object.player().duration(),
        if object.player().is_looping() { ", looping" } else { "" }
    );

    for step in 0..args.steps {
        let time = object.player().current_time();
        let pose = object
            .update(args.delta)
            .with_context(|| format!("Update {step} failed"))?;

        println!("\nStep {step:>3}  t = {time:.3}s");
        for (joint, matrix) in pose.deformation_matrices().iter().enumerate() {
            let translation = matrix.w_axis.truncate();
            println!(
                "  Joint {joint:>3}: ({:>8.3}, {:>8.3}, {:>8.3})",
                translation.x, translation.y, translation.z
            );
        }

        if object.player().is_done() {
            println!("\nFinished after {} steps", step + 1);
            break;
        }
    }
    Ok(())
}

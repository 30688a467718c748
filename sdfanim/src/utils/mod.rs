//! Shared utilities for the sdfanim CLI

pub mod tree;

pub use tree::{NodeType, TreeNode, TreeOptions, render_tree};

//! Tree view of object files

use anyhow::Result;
use clap::Args;
use sdf_anim::AnimationObject;
use sdf_anim::serializer::encoded_size;
use std::path::PathBuf;

use super::load_objects;
use crate::utils::{NodeType, TreeNode, TreeOptions, render_tree};

#[derive(Args)]
pub struct TreeArgs {
    /// Path to the object file
    pub file: PathBuf,

    /// Maximum depth to display
    #[arg(short, long, default_value = "3")]
    pub depth: usize,

    /// Show one line per node
    #[arg(short, long)]
    pub compact: bool,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,
}

pub fn execute(args: TreeArgs) -> Result<()> {
    let objects = load_objects(&args.file)?;

    let name = args
        .file
        .file_name()
        .map_or_else(|| args.file.display().to_string(), |n| n.to_string_lossy().into_owned());
    let mut root = TreeNode::new(name, NodeType::File).with_metadata("objects", objects.len());
    if let Ok(metadata) = std::fs::metadata(&args.file) {
        root = root.with_size(metadata.len());
    }
    for (index, object) in objects.iter().enumerate() {
        root = root.add_child(object_node(index, object));
    }

    let options = TreeOptions {
        max_depth: Some(args.depth),
        no_color: args.no_color,
        show_metadata: true,
        compact: args.compact,
    };
    print!("{}", render_tree(&root, &options));
    Ok(())
}

fn object_node(index: usize, object: &AnimationObject) -> TreeNode {
    let player = object.player();
    let bind_pose = object.bind_pose();

    let mut joints = TreeNode::new("Bind pose", NodeType::Section)
        .with_metadata("joints", object.joint_count());
    let bind_joints = bind_pose
        .inverse_world_matrices()
        .iter()
        .zip(bind_pose.world_weight_volumes());
    for (joint, (inverse, volume)) in bind_joints.enumerate() {
        let position = inverse.inverse().w_axis.truncate();
        joints = joints.add_child(
            TreeNode::new(format!("Joint {joint}"), NodeType::Joint)
                .with_metadata(
                    "position",
                    format!("({:.3}, {:.3}, {:.3})", position.x, position.y, position.z),
                )
                .with_metadata("falloff", format!("{:.2}", volume.falloff_rate)),
        );
    }

    let mut keyframes = TreeNode::new("Keyframes", NodeType::Section)
        .with_metadata("count", object.animation().keyframe_count());
    for (keyframe_index, keyframe) in object.animation().keyframes().iter().enumerate() {
        keyframes = keyframes.add_child(
            TreeNode::new(format!("Keyframe {keyframe_index}"), NodeType::Keyframe)
                .with_metadata("time", format!("{:.3}", keyframe.timestamp)),
        );
    }

    TreeNode::new(format!("Object {index}"), NodeType::Object)
        .with_size(encoded_size(object) as u64)
        .with_metadata("duration", format!("{:.3}s", player.duration()))
        .with_metadata("looping", player.is_looping())
        .add_child(joints)
        .add_child(keyframes)
}

//! Object file summaries

use anyhow::{Context, Result};
use clap::Args;
use sdf_anim::serializer::encoded_size;
use sdf_anim::{AnimationObject, BindPose, WeightVolume};
use serde::Serialize;
use std::path::PathBuf;

use super::load_objects;

#[derive(Args)]
pub struct InfoArgs {
    /// Path to the object file
    pub file: PathBuf,

    /// Show per-joint and per-keyframe details
    #[arg(short, long)]
    pub detailed: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ObjectSummary<'a> {
    index: usize,
    joint_count: usize,
    keyframe_count: usize,
    duration: f32,
    looping: bool,
    encoded_size: usize,
    timestamps: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight_volumes: Option<&'a [WeightVolume]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    animation: Option<&'a sdf_anim::Animation>,
}

impl<'a> ObjectSummary<'a> {
    fn new(index: usize, object: &'a AnimationObject, detailed: bool) -> Self {
        let animation = object.animation();
        Self {
            index,
            joint_count: object.joint_count(),
            keyframe_count: animation.keyframe_count(),
            duration: object.player().duration(),
            looping: object.player().is_looping(),
            encoded_size: encoded_size(object),
            timestamps: animation.keyframes().iter().map(|k| k.timestamp).collect(),
            weight_volumes: detailed.then(|| object.bind_pose().world_weight_volumes()),
            animation: detailed.then_some(animation),
        }
    }
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let objects = load_objects(&args.file)?;
    let summaries: Vec<ObjectSummary<'_>> = objects
        .iter()
        .enumerate()
        .map(|(index, object)| ObjectSummary::new(index, object, args.detailed))
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&summaries).context("Failed to encode summary")?;
        println!("{json}");
        return Ok(());
    }

    println!("=== Object File: {} ===", args.file.display());
    println!("Objects: {}", summaries.len());

    for (summary, object) in summaries.iter().zip(&objects) {
        println!("\n--- Object {} ---", summary.index);
        println!("Joints:     {}", summary.joint_count);
        println!("Keyframes:  {}", summary.keyframe_count);
        println!("Duration:   {:.3}s", summary.duration);
        println!("Looping:    {}", summary.looping);
        println!("Size:       {} bytes", summary.encoded_size);
        let timestamps: Vec<String> = summary.timestamps.iter().map(|t| format!("{t:.3}")).collect();
        println!("Timestamps: [{}]", timestamps.join(", "));

        if args.detailed {
            print_bind_pose(object.bind_pose());
        }
    }
    Ok(())
}

fn print_bind_pose(bind_pose: &BindPose) {
    println!("\nBind pose:");
    let joints = bind_pose
        .inverse_world_matrices()
        .iter()
        .zip(bind_pose.world_weight_volumes());
    for (index, (inverse, volume)) in joints.enumerate() {
        let position = inverse.inverse().w_axis.truncate();
        println!(
            "  Joint {index:>3}: position ({:.3}, {:.3}, {:.3}), volume end ({:.3}, {:.3}, {:.3}), falloff {:.2}",
            position.x,
            position.y,
            position.z,
            volume.end_point().x,
            volume.end_point().y,
            volume.end_point().z,
            volume.falloff_rate
        );
    }
}

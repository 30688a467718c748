//! Demo object authoring

use anyhow::{Context, Result, ensure};
use clap::Args;
use glam::Vec3;
use log::info;
use sdf_anim::{
    AnimationObject, AnimationObjectFactory, EditTransform, FactoryOptions, WeightVolume,
    save_animation_objects,
};
use std::path::PathBuf;

#[derive(Args)]
pub struct DemoArgs {
    /// Output object file
    pub output: PathBuf,

    /// Player duration in seconds
    #[arg(short, long, default_value = "2.0")]
    pub duration: f32,

    /// Loop playback
    #[arg(short, long = "loop")]
    pub looping: bool,

    /// Number of keyframes between the two border keyframes
    #[arg(short, long, default_value = "3")]
    pub keyframes: usize,

    /// Number of joints in the arm, root included
    #[arg(short, long, default_value = "4")]
    pub joints: usize,
}

pub fn execute(args: DemoArgs) -> Result<()> {
    ensure!(args.joints > 0, "An arm needs at least one joint");

    let object = build_arm(&args).context("Failed to author demo object")?;
    println!(
        "Authored arm: {} joints, {} keyframes, {:.2}s{}",
        object.joint_count(),
        object.animation().keyframe_count(),
        object.player().duration(),
        if object.player().is_looping() { ", looping" } else { "" }
    );

    save_animation_objects(&args.output, std::slice::from_ref(&object))
        .with_context(|| format!("Failed to save objects to {}", args.output.display()))?;
    println!("Saved to {}", args.output.display());
    Ok(())
}

/// A chain of joints that bends back and forth around Z
fn build_arm(args: &DemoArgs) -> Result<AnimationObject> {
    let options = FactoryOptions {
        default_duration: args.duration,
        default_looping: args.looping,
        place_child_at_volume_end: true,
    };
    let mut factory = AnimationObjectFactory::with_options(options);

    let segment = WeightVolume::new(Vec3::ZERO, Vec3::new(0.0, 1.5, 0.0), 8.0);
    let skeleton = factory.start_building_skeleton()?;
    skeleton.set_joint_weight_volume(segment)?;
    for _ in 1..args.joints {
        skeleton.add_child()?.go_to_child(0)?.set_joint_weight_volume(segment)?;
    }
    info!("Arm skeleton has {} joints", skeleton.joint_count());
    factory.complete_skeleton()?;

    let animation = factory.start_animating()?;
    for k in 1..=args.keyframes {
        let timestamp = k as f32 / (args.keyframes + 1) as f32;
        let angle = (timestamp * std::f32::consts::TAU).sin() * 0.6;

        animation.add_and_go_to_keyframe(timestamp)?;
        while animation.child_count()? > 0 {
            animation.go_to_child(0)?;
            let current = animation.joint_transform()?;
            let bent = EditTransform::new(current.position, Vec3::new(0.0, 0.0, angle), current.scale);
            animation.set_joint_transform(&bent)?;
        }
    }
    factory.complete_animation()?;

    Ok(factory.complete_object()?)
}

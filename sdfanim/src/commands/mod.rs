//! Command implementations

pub mod demo;
pub mod info;
pub mod play;
pub mod tree;

use anyhow::{Context, Result, bail};
use sdf_anim::{AnimationObject, try_load_animation_objects};
use std::path::Path;

/// Load every object in `path`, failing on anything unreadable
pub fn load_objects(path: &Path) -> Result<Vec<AnimationObject>> {
    try_load_animation_objects(path)
        .with_context(|| format!("Failed to load animation objects from {}", path.display()))
}

/// Load a single object by index
pub fn load_object(path: &Path, index: usize) -> Result<AnimationObject> {
    let mut objects = load_objects(path)?;
    let count = objects.len();
    if index >= count {
        bail!(
            "Object index {index} out of range ({} contains {count} objects)",
            path.display()
        );
    }
    Ok(objects.swap_remove(index))
}

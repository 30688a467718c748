//! Binary object files
//!
//! One object is laid out as (all little-endian, no padding):
//!
//! ```text
//! u64  joint_count
//! u64  keyframe_count
//! f32  player duration
//! u8   player looping (0 or 1)
//! joint_count    x mat4          inverse bind world matrices, column-major
//! joint_count    x WeightVolume  start point, start-to-end, falloff rate
//! keyframe_count x (f32 timestamp, joint_count x Transform)
//! ```
//!
//! A collection file is a `u64` object count followed by that many objects.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use glam::Mat4;
use log::{debug, error, warn};

use crate::animation::{Animation, AnimationPlayer, Keyframe};
use crate::binary::{BinaryReaderExt, BinaryWrite, BinaryWriterExt};
use crate::error::{AnimError, Result};
use crate::object::AnimationObject;
use crate::skeleton::BindPose;
use crate::transform::Transform;
use crate::weight_volume::WeightVolume;

/// Bytes taken by the fixed object header
pub const OBJECT_HEADER_SIZE: usize = 8 + 8 + 4 + 1;
const MAT4_SIZE: usize = 64;
const WEIGHT_VOLUME_SIZE: usize = 28;
const TIMESTAMP_SIZE: usize = 4;
const TRANSFORM_SIZE: usize = 32;

/// Encoded size of an object with the given counts, `None` on overflow
pub fn object_size(joint_count: usize, keyframe_count: usize) -> Option<usize> {
    let per_joint = joint_count.checked_mul(MAT4_SIZE + WEIGHT_VOLUME_SIZE)?;
    let per_keyframe = joint_count
        .checked_mul(TRANSFORM_SIZE)?
        .checked_add(TIMESTAMP_SIZE)?;
    OBJECT_HEADER_SIZE
        .checked_add(per_joint)?
        .checked_add(keyframe_count.checked_mul(per_keyframe)?)
}

/// Encoded size of `object`
pub fn encoded_size(object: &AnimationObject) -> usize {
    let player = object.player();
    let mut size = 0_u64.binary_size() * 2
        + player.duration().binary_size()
        + player.is_looping().binary_size();
    let bind_pose = object.bind_pose();
    size += bind_pose
        .inverse_world_matrices()
        .iter()
        .map(BinaryWrite::binary_size)
        .sum::<usize>();
    size += bind_pose
        .world_weight_volumes()
        .iter()
        .map(BinaryWrite::binary_size)
        .sum::<usize>();
    for keyframe in object.animation().keyframes() {
        size += keyframe.timestamp.binary_size();
        size += keyframe
            .transforms()
            .iter()
            .map(BinaryWrite::binary_size)
            .sum::<usize>();
    }
    size
}

/// Append one object to `writer`
pub fn write_animation_object<W: Write>(writer: &mut W, object: &AnimationObject) -> Result<()> {
    let animation = object.animation();
    let player = object.player();

    writer.binary_write(&(object.joint_count() as u64))?;
    writer.binary_write(&(animation.keyframe_count() as u64))?;
    writer.binary_write(&player.duration())?;
    writer.binary_write(&player.is_looping())?;

    for matrix in object.bind_pose().inverse_world_matrices() {
        writer.binary_write(matrix)?;
    }
    for volume in object.bind_pose().world_weight_volumes() {
        writer.binary_write(volume)?;
    }
    for keyframe in animation.keyframes() {
        writer.binary_write(&keyframe.timestamp)?;
        for transform in keyframe.transforms() {
            writer.binary_write(transform)?;
        }
    }
    Ok(())
}

fn remaining(cursor: &Cursor<&[u8]>) -> usize {
    let position = usize::try_from(cursor.position()).unwrap_or(usize::MAX);
    cursor.get_ref().len().saturating_sub(position)
}

fn ensure_available(cursor: &Cursor<&[u8]>, needed: usize) -> Result<()> {
    let available = remaining(cursor);
    if needed > available {
        return Err(AnimError::TruncatedBuffer {
            needed: needed as u64,
            available: available as u64,
        });
    }
    Ok(())
}

fn read_count(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<usize> {
    let count: u64 = cursor.binary_read()?;
    usize::try_from(count)
        .map_err(|_| AnimError::SizeOverflow(format!("{what} count {count} does not fit in memory")))
}

/// Read one object starting at the cursor position
///
/// The declared counts are checked against the bytes left in the buffer
/// before anything is allocated.
pub fn read_animation_object(cursor: &mut Cursor<&[u8]>) -> Result<AnimationObject> {
    ensure_available(cursor, OBJECT_HEADER_SIZE)?;
    let joint_count = read_count(cursor, "joint")?;
    let keyframe_count = read_count(cursor, "keyframe")?;
    let duration: f32 = cursor.binary_read()?;
    let looping: bool = cursor.binary_read()?;

    let body_size = object_size(joint_count, keyframe_count)
        .map(|size| size - OBJECT_HEADER_SIZE)
        .ok_or_else(|| {
            AnimError::SizeOverflow(format!(
                "{joint_count} joints with {keyframe_count} keyframes"
            ))
        })?;
    ensure_available(cursor, body_size)?;

    let mut inverse_world_matrices = Vec::with_capacity(joint_count);
    for _ in 0..joint_count {
        inverse_world_matrices.push(cursor.binary_read::<Mat4>()?);
    }
    let mut world_weight_volumes = Vec::with_capacity(joint_count);
    for _ in 0..joint_count {
        world_weight_volumes.push(cursor.binary_read::<WeightVolume>()?);
    }

    let mut keyframes = Vec::with_capacity(keyframe_count);
    for _ in 0..keyframe_count {
        let timestamp: f32 = cursor.binary_read()?;
        let mut transforms = Vec::with_capacity(joint_count);
        for _ in 0..joint_count {
            transforms.push(cursor.binary_read::<Transform>()?);
        }
        keyframes.push(Keyframe::new(timestamp, transforms));
    }

    let bind_pose = BindPose::from_parts(inverse_world_matrices, world_weight_volumes);
    let animation = Animation::from_keyframes(joint_count, keyframes)?;
    AnimationObject::new(
        bind_pose,
        animation,
        AnimationPlayer::restore(duration, looping),
    )
}

/// Encode a collection: object count, then every object
pub fn encode_animation_objects(objects: &[AnimationObject]) -> Result<Vec<u8>> {
    let size = objects.iter().map(encoded_size).sum::<usize>() + 8;
    let mut buffer = Vec::with_capacity(size);
    buffer.binary_write(&(objects.len() as u64))?;
    for object in objects {
        write_animation_object(&mut buffer, object)?;
    }
    Ok(buffer)
}

/// Decode a whole collection buffer
pub fn decode_animation_objects(data: &[u8]) -> Result<Vec<AnimationObject>> {
    let mut cursor = Cursor::new(data);
    ensure_available(&cursor, 8)?;
    let object_count = read_count(&mut cursor, "object")?;

    let minimum = object_count
        .checked_mul(OBJECT_HEADER_SIZE)
        .ok_or_else(|| AnimError::SizeOverflow(format!("{object_count} objects")))?;
    ensure_available(&cursor, minimum)?;

    let mut objects = Vec::with_capacity(object_count);
    for _ in 0..object_count {
        objects.push(read_animation_object(&mut cursor)?);
    }

    let trailing = remaining(&cursor);
    if trailing > 0 {
        warn!("Ignoring {trailing} trailing bytes after {object_count} objects");
    }
    Ok(objects)
}

/// Write every object to `path`, replacing the file
pub fn save_animation_objects<P: AsRef<Path>>(path: P, objects: &[AnimationObject]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&encode_animation_objects(objects)?)?;
    writer.flush()?;
    debug!("Saved {} animation objects to {}", objects.len(), path.display());
    Ok(())
}

/// Read every object stored at `path`
pub fn try_load_animation_objects<P: AsRef<Path>>(path: P) -> Result<Vec<AnimationObject>> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let objects = decode_animation_objects(&data)?;
    debug!("Loaded {} animation objects from {}", objects.len(), path.display());
    Ok(objects)
}

/// Read every object stored at `path`, or nothing if the file is unusable
///
/// Failures are logged; no partially decoded object is returned.
pub fn load_animation_objects<P: AsRef<Path>>(path: P) -> Vec<AnimationObject> {
    let path = path.as_ref();
    match try_load_animation_objects(path) {
        Ok(objects) => objects,
        Err(e) => {
            error!("Failed to load animation objects from {}: {e}", path.display());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::BuildingAnimation;
    use crate::skeleton::BuildingSkeleton;
    use crate::transform::EditTransform;
    use glam::Vec3;
    use pretty_assertions::assert_eq;

    fn object() -> AnimationObject {
        let mut building = BuildingSkeleton::new();
        let root = building.root();
        let child = building.add_child(root).unwrap();
        building
            .set_joint_transform(
                child,
                &EditTransform::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.3, 0.0, 0.0), 1.0),
            )
            .unwrap();
        let (skeleton, bind_pose) = building.build_skeleton_and_bind_pose();

        let mut animation = BuildingAnimation::from_skeleton(&skeleton);
        let index = animation.add_keyframe(0.4).unwrap();
        animation
            .keyframe_mut(index)
            .unwrap()
            .skeleton_mut()
            .joint_at_mut(&[0])
            .unwrap()
            .set_edit_transform(&EditTransform::new(Vec3::X, Vec3::new(0.0, 1.0, 0.0), 0.5));

        let mut player = AnimationPlayer::new();
        player.start(3.0, true).unwrap();
        AnimationObject::new(bind_pose, animation.build_animation().unwrap(), player).unwrap()
    }

    #[test]
    fn test_encoded_size_matches_layout() {
        let object = object();
        let mut buffer = Vec::new();
        write_animation_object(&mut buffer, &object).unwrap();

        assert_eq!(buffer.len(), encoded_size(&object));
        assert_eq!(Some(buffer.len()), object_size(2, 3));
        assert_eq!(buffer.len(), 21 + 2 * 92 + 3 * (4 + 2 * 32));
    }

    #[test]
    fn test_header_fields() {
        let object = object();
        let mut buffer = Vec::new();
        write_animation_object(&mut buffer, &object).unwrap();

        assert_eq!(&buffer[0..8], &2_u64.to_le_bytes());
        assert_eq!(&buffer[8..16], &3_u64.to_le_bytes());
        assert_eq!(&buffer[16..20], &3.0_f32.to_le_bytes());
        assert_eq!(buffer[20], 1);
    }

    #[test]
    fn test_round_trip_is_exact() {
        let object = object();
        let encoded = encode_animation_objects(&[object.clone(), object.clone()]).unwrap();
        let decoded = decode_animation_objects(&encoded).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].bind_pose(), object.bind_pose());
        assert_eq!(decoded[0].animation(), object.animation());
        assert_eq!(decoded[1].player().duration(), 3.0);
        assert!(decoded[1].player().is_looping());
        assert!(decoded[1].player().is_started());
        assert_eq!(encode_animation_objects(&decoded).unwrap(), encoded);
    }

    #[test]
    fn test_truncated_buffer_is_rejected() {
        let encoded = encode_animation_objects(&[object()]).unwrap();
        for cut in [0, 4, 8, 20, encoded.len() - 1] {
            assert!(decode_animation_objects(&encoded[..cut]).is_err(), "cut at {cut}");
        }
    }

    #[test]
    fn test_huge_counts_do_not_allocate() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&1_u64.to_le_bytes());
        buffer.extend_from_slice(&u64::MAX.to_le_bytes());
        buffer.extend_from_slice(&u64::MAX.to_le_bytes());
        buffer.extend_from_slice(&1.0_f32.to_le_bytes());
        buffer.push(0);

        assert!(matches!(
            decode_animation_objects(&buffer),
            Err(AnimError::SizeOverflow(_) | AnimError::TruncatedBuffer { .. })
        ));

        let mut many_objects = Vec::new();
        many_objects.extend_from_slice(&u64::MAX.to_le_bytes());
        assert!(decode_animation_objects(&many_objects).is_err());
    }

    #[test]
    fn test_invalid_loop_flag() {
        let mut encoded = encode_animation_objects(&[object()]).unwrap();
        encoded[8 + 20] = 7;
        assert!(matches!(
            decode_animation_objects(&encoded),
            Err(AnimError::InvalidBool(7))
        ));
    }

    /// Overwrite the timestamp of `keyframe` in a one-object collection
    /// built from `object()` (2 joints, 3 keyframes)
    fn with_timestamp(keyframe: usize, timestamp: f32) -> Vec<u8> {
        let mut encoded = encode_animation_objects(&[object()]).unwrap();
        let offset = 8 + OBJECT_HEADER_SIZE + 2 * (64 + 28) + keyframe * (4 + 2 * 32);
        encoded[offset..offset + 4].copy_from_slice(&timestamp.to_le_bytes());
        encoded
    }

    #[test]
    fn test_non_finite_timestamp_is_rejected() {
        for timestamp in [f32::NAN, f32::INFINITY] {
            assert!(matches!(
                decode_animation_objects(&with_timestamp(1, timestamp)),
                Err(AnimError::InvalidTimestamp(_))
            ));
        }
    }

    #[test]
    fn test_unsorted_timestamps_are_rejected() {
        assert!(matches!(
            decode_animation_objects(&with_timestamp(1, 1.5)),
            Err(AnimError::UnsortedKeyframes)
        ));
    }

    #[test]
    fn test_missing_border_timestamps_are_rejected() {
        assert!(matches!(
            decode_animation_objects(&with_timestamp(0, 0.1)),
            Err(AnimError::MissingBorderKeyframes)
        ));
        assert!(matches!(
            decode_animation_objects(&with_timestamp(2, 0.9)),
            Err(AnimError::MissingBorderKeyframes)
        ));
    }

    #[test]
    fn test_load_corrupt_timestamp_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nan.anim");
        std::fs::write(&path, with_timestamp(2, f32::NAN)).unwrap();
        assert!(load_animation_objects(&path).is_empty());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.anim");
        assert!(load_animation_objects(&path).is_empty());
        assert!(try_load_animation_objects(&path).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objects.anim");
        let object = object();

        save_animation_objects(&path, std::slice::from_ref(&object)).unwrap();
        let loaded = load_animation_objects(&path);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].animation(), object.animation());
    }
}

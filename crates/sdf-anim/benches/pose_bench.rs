use criterion::{Criterion, criterion_group, criterion_main};
use glam::Vec3;
use sdf_anim::animation::{AnimationPlayer, BuildingAnimation};
use sdf_anim::serializer::{decode_animation_objects, encode_animation_objects};
use sdf_anim::skeleton::BuildingSkeleton;
use sdf_anim::{AnimationObject, EditTransform};
use std::hint::black_box;

/// A chain of `length` joints with a handful of keyframes
fn create_test_object(length: usize) -> AnimationObject {
    let mut building = BuildingSkeleton::new();
    let mut parent = building.root();
    for _ in 1..length {
        let child = building.add_child(parent).unwrap();
        building
            .set_joint_transform(child, &EditTransform::new(Vec3::Y, Vec3::ZERO, 1.0))
            .unwrap();
        parent = child;
    }
    let (skeleton, bind_pose) = building.build_skeleton_and_bind_pose();

    let mut animation = BuildingAnimation::from_skeleton(&skeleton);
    for (i, timestamp) in [0.2_f32, 0.4, 0.6, 0.8].into_iter().enumerate() {
        let index = animation.add_keyframe(timestamp).unwrap();
        let bend = EditTransform::new(Vec3::Y, Vec3::new(0.0, 0.0, 0.1 * (i + 1) as f32), 1.0);
        animation
            .keyframe_mut(index)
            .unwrap()
            .skeleton_mut()
            .joint_at_mut(&[0])
            .unwrap()
            .set_edit_transform(&bend);
    }

    let mut object = AnimationObject::new(
        bind_pose,
        animation.build_animation().unwrap(),
        AnimationPlayer::new(),
    )
    .unwrap();
    object.start(2.0, true).unwrap();
    object
}

fn bench_player_update(c: &mut Criterion) {
    let mut object = create_test_object(64);

    c.bench_function("player_update_64_joints", |b| {
        b.iter(|| {
            let pose = object.update(black_box(1.0 / 60.0)).unwrap();
            black_box(pose.deformation_matrices()[0]);
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let mut object = create_test_object(64);

    c.bench_function("evaluate_64_joints", |b| {
        b.iter(|| {
            black_box(object.evaluate(black_box(0.37)).unwrap());
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let objects: Vec<_> = (0..8).map(|_| create_test_object(32)).collect();
    let data = encode_animation_objects(&objects).unwrap();

    c.bench_function("decode_8_objects", |b| {
        b.iter(|| {
            let _objects = decode_animation_objects(black_box(&data)).unwrap();
        })
    });
}

criterion_group!(benches, bench_player_update, bench_evaluate, bench_decode);
criterion_main!(benches);

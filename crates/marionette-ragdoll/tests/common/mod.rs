use glam::Vec3;
use marionette_core::{Armature, BoneId, Transform};
use marionette_ragdoll::SkeletonPair;

fn bone(arm: &mut Armature, name: &str, parent: Option<BoneId>, position: [f32; 3]) -> BoneId {
    arm.add_bone(name, parent, Transform::from_position(Vec3::from(position)))
        .unwrap()
}

/// Mixamo-named humanoid matching the default rig config. Leaf-to-root
/// offsets are in meters, T-pose, facing +Z.
pub fn humanoid() -> Armature {
    humanoid_without("")
}

/// Same skeleton with one (leaf) bone left out, for malformed-asset tests.
pub fn humanoid_without(skip: &str) -> Armature {
    let mut arm = Armature::new();
    let hips = bone(&mut arm, "Hips", None, [0.0, 1.0, 0.0]);
    let spine = bone(&mut arm, "Spine", Some(hips), [0.0, 0.15, 0.0]);
    let spine1 = bone(&mut arm, "Spine1", Some(spine), [0.0, 0.15, 0.0]);
    let neck = bone(&mut arm, "Neck", Some(spine1), [0.0, 0.15, 0.0]);
    bone(&mut arm, "Head", Some(neck), [0.0, 0.12, 0.0]);

    let left_arm = bone(&mut arm, "LeftArm", Some(spine1), [0.2, 0.12, 0.0]);
    let left_fore = bone(&mut arm, "LeftForeArm", Some(left_arm), [0.28, 0.0, 0.0]);
    if skip != "LeftHand" {
        bone(&mut arm, "LeftHand", Some(left_fore), [0.26, 0.0, 0.0]);
    }
    let right_arm = bone(&mut arm, "RightArm", Some(spine1), [-0.2, 0.12, 0.0]);
    let right_fore = bone(&mut arm, "RightForeArm", Some(right_arm), [-0.28, 0.0, 0.0]);
    bone(&mut arm, "RightHand", Some(right_fore), [-0.26, 0.0, 0.0]);

    let left_up = bone(&mut arm, "LeftUpLeg", Some(hips), [0.09, -0.05, 0.0]);
    let left_leg = bone(&mut arm, "LeftLeg", Some(left_up), [0.0, -0.45, 0.0]);
    bone(&mut arm, "LeftFoot", Some(left_leg), [0.0, -0.45, 0.0]);
    let right_up = bone(&mut arm, "RightUpLeg", Some(hips), [-0.09, -0.05, 0.0]);
    let right_leg = bone(&mut arm, "RightLeg", Some(right_up), [0.0, -0.45, 0.0]);
    bone(&mut arm, "RightFoot", Some(right_leg), [0.0, -0.45, 0.0]);

    arm.update_world_matrices();
    arm
}

pub fn skeleton_pair() -> SkeletonPair {
    SkeletonPair {
        clone: humanoid(),
        original: humanoid(),
    }
}

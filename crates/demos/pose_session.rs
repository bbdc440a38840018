use glam::Vec3;
use marionette_core::{Armature, BoneId, Scene, Transform};
use marionette_ragdoll::{
    DragEvent, DragSource, RagdollController, RigConfig, SkeletonPair, LEFT_ARM,
};

fn bone(arm: &mut Armature, name: &str, parent: Option<BoneId>, position: [f32; 3]) -> BoneId {
    arm.add_bone(name, parent, Transform::from_position(Vec3::from(position)))
        .expect("valid humanoid topology")
}

fn humanoid() -> Armature {
    let mut arm = Armature::new();
    let hips = bone(&mut arm, "Hips", None, [0.0, 1.0, 0.0]);
    let spine = bone(&mut arm, "Spine", Some(hips), [0.0, 0.15, 0.0]);
    let spine1 = bone(&mut arm, "Spine1", Some(spine), [0.0, 0.15, 0.0]);
    let neck = bone(&mut arm, "Neck", Some(spine1), [0.0, 0.15, 0.0]);
    bone(&mut arm, "Head", Some(neck), [0.0, 0.12, 0.0]);
    let left_arm = bone(&mut arm, "LeftArm", Some(spine1), [0.2, 0.12, 0.0]);
    let left_fore = bone(&mut arm, "LeftForeArm", Some(left_arm), [0.28, 0.0, 0.0]);
    bone(&mut arm, "LeftHand", Some(left_fore), [0.26, 0.0, 0.0]);
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

fn main() {
    env_logger::init();

    let config = RigConfig::default();
    log::info!(
        "rig config:\n{}",
        serde_json::to_string_pretty(&config).expect("config serializes")
    );

    let mut scene = Scene::new();
    let pair = SkeletonPair {
        clone: humanoid(),
        original: humanoid(),
    };
    let mut rig = RagdollController::new(&mut scene, pair, config).expect("rig builds");
    rig.selected_skeleton(&mut scene, true);

    let hand = rig.clone_armature().find("LeftHand").expect("hand bone");
    let start = rig.clone_armature().world_position(hand);
    let goal = start + Vec3::new(-0.1, -0.15, 0.08);
    log::info!("dragging left hand from {start} toward {goal}");

    rig.handle_drag(&mut scene, DragSource::Chain(LEFT_ARM), DragEvent::Started);
    for frame in 0..8 {
        // Ease the handle toward the goal, a frame at a time.
        let t = (frame + 1) as f32 / 8.0;
        rig.set_chain_target(
            &mut scene,
            LEFT_ARM,
            Transform::from_position(start.lerp(goal, t)),
        );
        rig.handle_drag(&mut scene, DragSource::Chain(LEFT_ARM), DragEvent::Moved);
        rig.tick(&mut scene);

        let reached = rig.clone_armature().world_position(hand);
        log::info!("frame {frame}: clone hand at {reached}");
    }
    rig.handle_drag(&mut scene, DragSource::Chain(LEFT_ARM), DragEvent::Ended);
    rig.tick(&mut scene);

    let original_hand = rig.original_armature().find("LeftHand").expect("hand bone");
    log::info!(
        "released: original hand at {}, clone hand at {}",
        rig.original_armature().world_position(original_hand),
        rig.clone_armature().world_position(hand)
    );

    rig.remove_markers(&mut scene);
    log::info!("markers removed, {} left in scene", scene.marker_count());
}

mod common;

use glam::{EulerRot, Quat, Vec3};
use marionette_core::{MarkerKind, RigError, Scene};
use marionette_ragdoll::{
    DragEvent, DragSource, FigureRig, RagdollController, RigConfig, SkeletonPair, LEFT_LEG, SPINE,
};
use pretty_assertions::assert_eq;

fn build(scene: &mut Scene) -> RagdollController {
    RagdollController::new(scene, common::skeleton_pair(), RigConfig::default()).unwrap()
}

#[test]
fn missing_bone_fails_fast_with_its_name() {
    let mut scene = Scene::new();
    let pair = SkeletonPair {
        clone: common::humanoid(),
        original: common::humanoid_without("LeftHand"),
    };
    match RagdollController::new(&mut scene, pair, RigConfig::default()) {
        Err(RigError::MissingBone(name)) => assert_eq!(name, "LeftHand"),
        Err(other) => panic!("expected missing bone, got {other:?}"),
        Ok(_) => panic!("malformed figure must fail at load time"),
    }
}

#[test]
fn invalid_config_is_rejected_before_any_rig_state() {
    let mut scene = Scene::new();
    let mut config = RigConfig::default();
    config.chains.pop();
    let result = RagdollController::new(&mut scene, common::skeleton_pair(), config);
    assert!(matches!(result, Err(RigError::InvalidConfiguration(_))));
    assert_eq!(scene.marker_count(), 0);
}

#[test]
fn init_populates_and_remove_clears_the_scene() {
    let mut scene = Scene::new();
    let mut rig = build(&mut scene);

    // Five poles, five chain handles, the hips handle, and the overlay.
    assert_eq!(scene.marker_count(), 12);

    let mut hidden_poles = 0;
    scene.for_each_marker(|m| {
        if m.kind == MarkerKind::PoleGizmo && !m.visible {
            hidden_poles += 1;
        }
    });
    assert_eq!(hidden_poles, 5);

    rig.remove_from_scene(&mut scene);
    assert_eq!(scene.marker_count(), 0);
}

#[test]
fn selection_toggles_handles_but_never_the_hips() {
    let mut scene = Scene::new();
    let mut rig = build(&mut scene);

    rig.set_selected(&mut scene, true);
    for object in rig.chain_objects() {
        assert!(scene.marker(object.control_target.marker).unwrap().interactive);
    }
    assert!(!scene.marker(rig.hips_control().marker).unwrap().interactive);
    assert!(scene.marker(rig.overlay()).unwrap().visible);

    rig.set_selected(&mut scene, false);
    for object in rig.chain_objects() {
        assert!(!scene.marker(object.control_target.marker).unwrap().interactive);
    }
    assert!(!scene.marker(rig.overlay()).unwrap().visible);
}

#[test]
fn foot_lock_is_a_pure_function_of_target_rotation() {
    let target_rotation = Quat::from_euler(EulerRot::XYZ, 0.2, 0.4, -0.1);

    let mut worlds = Vec::new();
    for iterations in [1u32, 25] {
        let mut scene = Scene::new();
        let mut config = RigConfig::default();
        config.solver_iterations = iterations;
        let mut rig =
            RagdollController::new(&mut scene, common::skeleton_pair(), config).unwrap();

        let mut target = rig.chain_objects()[LEFT_LEG].control_target.target;
        target.rotation = target_rotation;
        rig.set_chain_target(&mut scene, LEFT_LEG, target);
        rig.tick(&mut scene);

        let foot = rig.clone_armature().find("LeftFoot").unwrap();
        worlds.push(rig.clone_armature().world_rotation(foot));
    }

    let correction = Quat::from_euler(EulerRot::XYZ, 1.5, 0.0, 0.0);
    let expected = (target_rotation * correction).normalize();
    for world in worlds {
        assert!(world.abs_diff_eq(expected, 1e-4) || world.abs_diff_eq(-expected, 1e-4));
    }
}

#[test]
fn head_stays_level_after_late_update() {
    let mut scene = Scene::new();
    let mut rig = build(&mut scene);
    rig.tick(&mut scene);

    let head = rig.clone_armature().find("Head").unwrap();
    let expected = Quat::from_euler(EulerRot::XYZ, -1.0, 0.0, 0.0);
    let world = rig.clone_armature().world_rotation(head);
    assert!(world.abs_diff_eq(expected, 1e-4) || world.abs_diff_eq(-expected, 1e-4));
}

#[test]
fn update_phase_resets_poles_while_ik_is_off() {
    let mut scene = Scene::new();
    let mut rig = build(&mut scene);

    // Knock a pole off its anchor, then let the disabled-IK update pull it
    // back.
    let moved = Vec3::new(9.0, 9.0, 9.0);
    rig.chain_objects()[SPINE].pole.set_position(&mut scene, moved);
    rig.update(&mut scene);

    let anchor = rig
        .clone_armature()
        .world_position(rig.chains()[SPINE].pre_effector().bone);
    let offset = rig.chain_objects()[SPINE].pole.offset();
    let pole = rig.chain_objects()[SPINE].pole.position(&scene);
    assert!(pole.abs_diff_eq(anchor + offset, 1e-5));

    rig.handle_drag(&mut scene, DragSource::Chain(SPINE), DragEvent::Started);
    rig.chain_objects()[SPINE].pole.set_position(&mut scene, moved);
    rig.update(&mut scene);
    assert!(rig.chain_objects()[SPINE]
        .pole
        .position(&scene)
        .abs_diff_eq(moved, 1e-6));
}

use crate::chain::KinematicChain;
use crate::constraint::IkConstraint;
use glam::{Quat, Vec3};
use marionette_core::Armature;

/// Cyclic-coordinate-descent solver over one or more kinematic chains.
///
/// Each iteration sweeps the chain from the joint above the effector down to
/// the root, then re-aligns the bend plane against the root joint's pole
/// constraint. Copy-rotation constraints apply once, after the solve.
pub struct IkSolver {
    pub iterations: u32,
    pub tolerance: f32,
}

impl IkSolver {
    pub fn new() -> Self {
        Self {
            iterations: 10,
            tolerance: 1e-3,
        }
    }

    pub fn solve_all(&self, armature: &mut Armature, chains: &mut [KinematicChain]) {
        for chain in chains {
            self.solve(armature, chain);
        }
    }

    pub fn solve(&self, armature: &mut Armature, chain: &KinematicChain) {
        armature.update_world_matrices();
        let target = chain.target.position;
        let effector = chain.effector().bone;

        self.pre_bend_if_straight(armature, chain, target);
        let mut residual = f32::MAX;
        for _ in 0..self.iterations {
            self.ccd_pass(armature, chain, target);
            self.pole_pass(armature, chain);
            residual = armature.world_position(effector).distance(target);
            if residual < self.tolerance {
                break;
            }
        }
        if residual >= self.tolerance {
            log::debug!(
                "chain {:?} stopped at residual {residual} after {} iterations",
                chain.name,
                self.iterations
            );
        }
        self.copy_rotation_pass(armature, chain);
    }

    fn ccd_pass(&self, armature: &mut Armature, chain: &KinematicChain, target: Vec3) {
        let effector = chain.effector().bone;
        for i in (0..chain.joint_count() - 1).rev() {
            let joint = &chain.joints()[i];
            let pivot = armature.world_position(joint.bone);
            let to_effector = armature.world_position(effector) - pivot;
            let to_target = target - pivot;
            let (Some(from), Some(to)) = (to_effector.try_normalize(), to_target.try_normalize())
            else {
                continue;
            };

            let mut rotation = Quat::from_rotation_arc(from, to);
            if let Some(limit) = joint.step_limit {
                rotation = clamp_rotation(rotation, limit);
            }
            let world = armature.world_rotation(joint.bone);
            armature.set_world_rotation(joint.bone, (rotation * world).normalize());
            armature.update_world_matrices();
        }
    }

    /// Swings the chain about the root-effector axis so the middle joint lies
    /// in the plane spanned by root, effector, and pole. The effector does not
    /// move: the rotation axis passes through it.
    fn pole_pass(&self, armature: &mut Armature, chain: &KinematicChain) {
        let Some(pole) = chain.root().pole() else {
            return;
        };
        let root = chain.root().bone;
        let effector = chain.effector().bone;
        let mid = chain.joints()[chain.joint_count() / 2].bone;
        if mid == root || mid == effector {
            return;
        }

        let root_pos = armature.world_position(root);
        let Some(axis) = (armature.world_position(effector) - root_pos).try_normalize() else {
            return;
        };
        let mid_dir = (armature.world_position(mid) - root_pos).reject_from_normalized(axis);
        let pole_dir = (pole.position - root_pos).reject_from_normalized(axis);
        let (Some(mid_dir), Some(pole_dir)) = (mid_dir.try_normalize(), pole_dir.try_normalize())
        else {
            return;
        };

        let swing = mid_dir.cross(pole_dir).dot(axis).atan2(mid_dir.dot(pole_dir));
        let twist = swing + pole.pole_angle.to_radians();
        let world = armature.world_rotation(root);
        armature.set_world_rotation(root, (Quat::from_axis_angle(axis, twist) * world).normalize());
        armature.update_world_matrices();
    }

    /// A perfectly straight chain cannot bend toward a closer target: every
    /// corrective arc degenerates to identity. Nudge the interior joints off
    /// axis first, toward the pole side when a pole exists.
    fn pre_bend_if_straight(&self, armature: &mut Armature, chain: &KinematicChain, target: Vec3) {
        if chain.joint_count() < 3 {
            return;
        }
        let root_pos = armature.world_position(chain.root().bone);
        let eff_pos = armature.world_position(chain.effector().bone);
        let total = chain.total_length();
        if root_pos.distance(target) >= total * 0.999 {
            return;
        }
        if (total - root_pos.distance(eff_pos)).abs() > 1e-4 * total.max(1.0) {
            return;
        }
        let Some(dir) = (eff_pos - root_pos).try_normalize() else {
            return;
        };
        let bend_axis = chain
            .root()
            .pole()
            .and_then(|p| {
                (p.position - root_pos)
                    .reject_from_normalized(dir)
                    .try_normalize()
            })
            .map(|side| dir.cross(side))
            .unwrap_or_else(|| dir.any_orthonormal_vector());

        let interior = &chain.joints()[1..chain.joint_count() - 1];
        for joint in interior {
            let world = armature.world_rotation(joint.bone);
            armature.set_world_rotation(
                joint.bone,
                (Quat::from_axis_angle(bend_axis, 0.25) * world).normalize(),
            );
            armature.update_world_matrices();
        }
    }

    fn copy_rotation_pass(&self, armature: &mut Armature, chain: &KinematicChain) {
        let mut edits = Vec::new();
        for joint in chain.joints() {
            for constraint in joint.constraints() {
                if let IkConstraint::CopyRotation(copy) = constraint {
                    let source = chain.joints()[copy.source].bone;
                    edits.push((joint.bone, source, copy.influence));
                }
            }
        }
        for (bone, source, influence) in edits {
            let current = armature.local(bone).rotation;
            let copied = armature.local(source).rotation;
            armature.set_local_rotation(bone, current.slerp(copied, influence).normalize());
        }
        armature.update_world_matrices();
    }
}

impl Default for IkSolver {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_rotation(rotation: Quat, max_angle: f32) -> Quat {
    let (axis, mut angle) = rotation.to_axis_angle();
    if angle > std::f32::consts::PI {
        angle -= std::f32::consts::TAU;
    }
    if angle.abs() <= max_angle {
        rotation
    } else {
        Quat::from_axis_angle(axis, max_angle * angle.signum())
    }
}

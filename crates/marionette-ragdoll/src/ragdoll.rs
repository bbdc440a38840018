use crate::config::{RigConfig, CHAIN_COUNT, LEFT_LEG, RIGHT_LEG, SPINE};
use crate::control::{ControlTarget, DragEvent, DragSource, DragState};
use crate::pole::PoleTarget;
use crate::retarget::{apply_changes_to_original, BoneMap, RetargetState};
use crate::rig::{FigureRig, SkeletonPair};
use glam::{EulerRot, Quat, Vec3};
use log::info;
use marionette_core::{
    invert_or_identity, Armature, BoneId, Marker, MarkerId, MarkerKind, Result, Scene, Transform,
};
use marionette_ik::{
    CopyRotationConstraint, IkConstraint, IkSolver, KinematicChain, PoleConstraint,
};

/// One kinematic chain with the control that drives it and the pole that
/// shapes its bend plane.
pub struct ChainObject {
    pub control_target: ControlTarget,
    pub pole: PoleTarget,
    drag_state: DragState,
}

impl ChainObject {
    pub fn drag_state(&self) -> DragState {
        self.drag_state
    }
}

/// Orchestrator for a posed figure: owns the five chains, the hips control,
/// the pole constraints, and the clone/original skeleton pair, and drives the
/// per-frame update and retarget cycle.
pub struct RagdollController {
    config: RigConfig,
    solver: IkSolver,
    chains: Vec<KinematicChain>,
    chain_objects: Vec<ChainObject>,
    hips_control: ControlTarget,
    hips_clone: BoneId,
    clone: Armature,
    original: Armature,
    bone_map: BoneMap,
    retarget: RetargetState,
    ik_apply_enabled: bool,
    hips_moving: bool,
    pole_offsets_from_hips: [Vec3; CHAIN_COUNT],
    overlay: MarkerId,
}

impl RagdollController {
    /// Builds the rig over a clone/original pair. Fails fast when either
    /// skeleton is missing a configured bone; no partial rig is ever left
    /// behind in a usable-looking state.
    pub fn new(scene: &mut Scene, skeletons: SkeletonPair, config: RigConfig) -> Result<Self> {
        config.validate()?;
        let SkeletonPair {
            mut clone,
            mut original,
        } = skeletons;
        clone.update_world_matrices();
        original.update_world_matrices();

        let hips_clone = clone.require(&config.hips)?;
        original.require(&config.hips)?;

        let mut names: Vec<String> = vec![config.hips.clone()];
        let mut chains = Vec::with_capacity(CHAIN_COUNT);
        for spec in &config.chains {
            let mut bones = Vec::with_capacity(spec.bones.len());
            for bone_name in &spec.bones {
                bones.push(clone.require(bone_name)?);
                original.require(bone_name)?;
                names.push(bone_name.clone());
            }
            chains.push(KinematicChain::from_bones(
                spec.name.clone(),
                &clone,
                &bones,
            )?);
        }

        let bone_map = BoneMap::build(&clone, &original, &names)?;
        let mut retarget = RetargetState::new(bone_map.len());
        retarget.record(&clone, &bone_map);

        let mut chain_objects = Vec::with_capacity(CHAIN_COUNT);
        for (spec, chain) in config.chains.iter().zip(&mut chains) {
            let pole = Self::init_pole_target(
                scene,
                &clone,
                chain,
                spec.pole_offset(),
                format!("{}Pole", spec.name),
            );
            let mut constraint = PoleConstraint::new(pole.position(scene));
            constraint.pole_angle = spec.pole_angle;
            chain
                .root_mut()
                .add_constraint(IkConstraint::Pole(constraint));

            let effector_position = clone.world_position(chain.effector().bone);
            let control_target =
                ControlTarget::new(scene, Transform::from_position(effector_position));
            chain_objects.push(ChainObject {
                control_target,
                pole,
                drag_state: DragState::Idle,
            });
        }

        // Partial twist propagation: the joint under the top one copies a
        // fraction of the top joint's rotation.
        let spine = &mut chains[SPINE];
        let top = spine.joint_count() - 1;
        spine.joints_mut()[top - 1].add_constraint(IkConstraint::CopyRotation(
            CopyRotationConstraint::new(top, config.copy_rotation_influence),
        ));

        let hips_control = ControlTarget::new(
            scene,
            Transform::from_position(clone.world_position(hips_clone)),
        );

        let mut overlay_marker = Marker::new(MarkerKind::SkeletonOverlay);
        overlay_marker.visible = false;
        let overlay = scene.add_marker(overlay_marker);

        let solver = IkSolver {
            iterations: config.solver_iterations,
            tolerance: config.solver_tolerance,
        };

        info!(
            "ragdoll rig built: {} chains over {} mapped bones",
            chains.len(),
            bone_map.len()
        );

        let mut controller = Self {
            config,
            solver,
            chains,
            chain_objects,
            hips_control,
            hips_clone,
            clone,
            original,
            bone_map,
            retarget,
            ik_apply_enabled: false,
            hips_moving: false,
            pole_offsets_from_hips: [Vec3::ZERO; CHAIN_COUNT],
            overlay,
        };
        controller.reset_targets(scene);
        Ok(controller)
    }

    /// Places a chain's pole at its second-to-last joint plus the fixed
    /// offset. The display marker starts hidden.
    fn init_pole_target(
        scene: &mut Scene,
        armature: &Armature,
        chain: &KinematicChain,
        offset: Vec3,
        name: String,
    ) -> PoleTarget {
        let anchor = armature.world_position(chain.pre_effector().bone);
        PoleTarget::new(scene, name, anchor + offset, offset)
    }

    /// Single entry point for pointer lifecycle notifications. Handlers are
    /// idempotent within a frame, and `Ended` without a matching `Started`
    /// degrades to a plain `Ended`.
    pub fn handle_drag(&mut self, scene: &mut Scene, source: DragSource, event: DragEvent) {
        match (source, event) {
            (DragSource::Chain(index), DragEvent::Started) => self.begin_chain_drag(index),
            (DragSource::Chain(_), DragEvent::Moved) => {}
            (DragSource::Chain(index), DragEvent::Ended) => self.end_chain_drag(index),
            (DragSource::Hips, DragEvent::Started) => self.begin_hips_drag(scene),
            (DragSource::Hips, DragEvent::Moved) => self.follow_hips_drag(scene),
            (DragSource::Hips, DragEvent::Ended) => self.end_hips_drag(),
        }
    }

    fn begin_chain_drag(&mut self, index: usize) {
        if let Some(object) = self.chain_objects.get_mut(index) {
            object.drag_state = DragState::Dragging;
            self.ik_apply_enabled = true;
        }
    }

    fn end_chain_drag(&mut self, index: usize) {
        if let Some(object) = self.chain_objects.get_mut(index) {
            object.drag_state = DragState::Idle;
        }
        // Coarse on purpose: releasing any handle stops applying solver
        // output. Concurrent multi-chain drags are not a supported
        // interaction.
        self.ik_apply_enabled = false;
    }

    /// Captures every pole's world offset relative to the hips target, so the
    /// poles can follow the torso rigidly for the rest of the drag.
    fn begin_hips_drag(&mut self, scene: &mut Scene) {
        self.hips_moving = true;
        let hips_position = self.hips_control.target.position;
        for (slot, object) in self.chain_objects.iter().enumerate() {
            self.pole_offsets_from_hips[slot] = object.pole.position(scene) - hips_position;
        }
    }

    fn follow_hips_drag(&mut self, scene: &mut Scene) {
        if !self.hips_moving {
            return;
        }
        let hips_position = self.hips_control.target.position;
        for (slot, object) in self.chain_objects.iter().enumerate() {
            object
                .pole
                .set_position(scene, hips_position + self.pole_offsets_from_hips[slot]);
        }

        // Re-express the world-space target in the hips bone's parent space.
        let local = match self.clone.bone(self.hips_clone).parent {
            Some(parent) => invert_or_identity(self.clone.world_matrix(parent))
                .transform_point3(hips_position),
            None => hips_position,
        };
        self.clone.set_local_position(self.hips_clone, local);
        self.clone.update_world_matrices();

        // The figure root follows the torso.
        if let (Some(clone_root), Some(original_root)) = (self.clone.root(), self.original.root())
        {
            let position = self.clone.local(clone_root).position;
            self.original.set_local_position(original_root, position);
            self.original.update_world_matrices();
        }
    }

    fn end_hips_drag(&mut self) {
        self.hips_moving = false;
    }

    pub fn set_chain_target(&mut self, scene: &mut Scene, index: usize, target: Transform) {
        if let Some(object) = self.chain_objects.get_mut(index) {
            object.control_target.set_target(scene, target);
        }
    }

    pub fn set_hips_target(&mut self, scene: &mut Scene, target: Transform) {
        self.hips_control.set_target(scene, target);
    }

    /// Advances one frame: solver inputs sync, the chains solve on the clone
    /// while IK apply is enabled, then the update and late-update phases run
    /// in order.
    pub fn tick(&mut self, scene: &mut Scene) {
        self.sync_solver_inputs(scene);
        if self.ik_apply_enabled {
            self.solver.solve_all(&mut self.clone, &mut self.chains);
        }
        self.run_update(scene);
        self.run_late_update();
    }

    fn sync_solver_inputs(&mut self, scene: &Scene) {
        for (chain, object) in self.chains.iter_mut().zip(&self.chain_objects) {
            chain.target = object.control_target.target;
            if let Some(pole) = chain.root_mut().pole_mut() {
                pole.position = object.pole.position(scene);
            }
        }
    }

    fn run_update(&mut self, scene: &mut Scene) {
        if self.ik_apply_enabled {
            apply_changes_to_original(
                &mut self.clone,
                &mut self.original,
                &self.bone_map,
                &mut self.retarget,
            );
        } else {
            self.reset_targets(scene);
        }
    }

    /// Re-anchors every control target to its effector and every pole to its
    /// chain's second-to-last joint plus the fixed offset. Runs each frame
    /// while IK apply is off, so releasing a drag never leaves a stale pole
    /// to snap on the next enable.
    pub fn reset_targets(&mut self, scene: &mut Scene) {
        self.clone.update_world_matrices();
        for (chain, object) in self.chains.iter().zip(self.chain_objects.iter_mut()) {
            let mut target = object.control_target.target;
            target.position = self.clone.world_position(chain.effector().bone);
            object.control_target.set_target(scene, target);

            let anchor = self.clone.world_position(chain.pre_effector().bone);
            object.pole.set_position(scene, anchor + object.pole.offset());
        }
    }

    fn run_late_update(&mut self) {
        self.clone.update_world_matrices();
        self.legs_follow_target_rotation();
        self.apply_head_rotation();
    }

    /// Feet copy their chain target's rotation plus a fixed corrective twist
    /// that lays them flat against the ground plane, whatever the leg solve
    /// produced.
    fn legs_follow_target_rotation(&mut self) {
        let correction = euler_quat(self.config.foot_correction);
        for leg in [LEFT_LEG, RIGHT_LEG] {
            let foot = self.chains[leg].effector().bone;
            let target_rotation = self.chain_objects[leg].control_target.target.rotation;
            self.clone
                .set_world_rotation(foot, (target_rotation * correction).normalize());
            self.clone.update_world_matrices();
        }
    }

    /// The head holds a fixed level orientation instead of tilting with the
    /// solved torso.
    fn apply_head_rotation(&mut self) {
        let head = self.chains[SPINE].effector().bone;
        self.clone
            .set_world_rotation(head, euler_quat(self.config.head_correction));
        self.clone.update_world_matrices();
    }

    /// Full resync after the figure was scaled or relocated out of band: the
    /// clone re-adopts the original's root placement, targets and poles snap
    /// back onto the posed joints, and chain segment lengths re-measure.
    pub fn reinitialize(&mut self, scene: &mut Scene) {
        if let (Some(clone_root), Some(original_root)) = (self.clone.root(), self.original.root())
        {
            let original_local = self.original.local(original_root);
            self.clone
                .set_local_position(clone_root, original_local.position);
            self.clone.set_local_scale(clone_root, original_local.scale);
        }
        self.clone.update_world_matrices();

        for (chain, object) in self.chains.iter_mut().zip(self.chain_objects.iter_mut()) {
            let mut target = object.control_target.target;
            target.position = self.clone.world_position(chain.effector().bone);
            object.control_target.set_target(scene, target);

            let anchor = self.clone.world_position(chain.pre_effector().bone);
            object.pole.set_position(scene, anchor + object.pole.offset());
            chain.reinitialize_joints(&self.clone);
        }

        let mut hips_target = self.hips_control.target;
        hips_target.position = self.clone.world_position(self.hips_clone);
        self.hips_control.set_target(scene, hips_target);

        self.retarget.record(&self.clone, &self.bone_map);
        info!("ragdoll rig reinitialized");
    }

    /// Clone root follows the original when the figure is moved by anything
    /// other than the hips handle.
    pub fn move_ragdoll(&mut self) {
        if let (Some(clone_root), Some(original_root)) = (self.clone.root(), self.original.root())
        {
            let position = self.original.local(original_root).position;
            self.clone.set_local_position(clone_root, position);
            self.clone.update_world_matrices();
        }
    }

    pub fn remove_markers(&mut self, scene: &mut Scene) {
        for object in &self.chain_objects {
            object.pole.remove(scene);
            object.control_target.remove(scene);
        }
        self.hips_control.remove(scene);
        scene.remove_marker(self.overlay);
    }

    pub fn selected_skeleton(&mut self, scene: &mut Scene, selected: bool) {
        for object in &self.chain_objects {
            object.control_target.set_interactive(scene, selected);
        }
        // The hips handle does not follow selection.
        self.hips_control.set_interactive(scene, false);
        scene.marker_mut(self.overlay, |m| m.visible = selected);
    }

    pub fn is_ik_apply_enabled(&self) -> bool {
        self.ik_apply_enabled
    }

    pub fn is_hips_moving(&self) -> bool {
        self.hips_moving
    }

    pub fn clone_armature(&self) -> &Armature {
        &self.clone
    }

    pub fn original_armature(&self) -> &Armature {
        &self.original
    }

    /// Mutable access to the render/export skeleton for out-of-band edits,
    /// such as the editor moving or scaling the whole figure. Follow with
    /// `move_ragdoll` or `reinitialize` so the rig resyncs.
    pub fn original_armature_mut(&mut self) -> &mut Armature {
        &mut self.original
    }

    pub fn chains(&self) -> &[KinematicChain] {
        &self.chains
    }

    pub fn chain_objects(&self) -> &[ChainObject] {
        &self.chain_objects
    }

    pub fn hips_control(&self) -> &ControlTarget {
        &self.hips_control
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn overlay(&self) -> MarkerId {
        self.overlay
    }
}

impl FigureRig for RagdollController {
    fn update(&mut self, scene: &mut Scene) {
        self.run_update(scene);
    }

    fn late_update(&mut self, _scene: &mut Scene) {
        self.run_late_update();
    }

    fn remove_from_scene(&mut self, scene: &mut Scene) {
        self.remove_markers(scene);
    }

    fn set_selected(&mut self, scene: &mut Scene, selected: bool) {
        self.selected_skeleton(scene, selected);
    }
}

fn euler_quat(angles: [f32; 3]) -> Quat {
    Quat::from_euler(EulerRot::XYZ, angles[0], angles[1], angles[2])
}

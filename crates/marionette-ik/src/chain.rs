use crate::constraint::{IkConstraint, PoleConstraint};
use marionette_core::{Armature, BoneId, Result, RigError, Transform};

#[derive(Debug, Clone)]
pub struct Joint {
    pub bone: BoneId,
    /// Distance to the next joint, captured when the chain is built.
    pub length: f32,
    /// Largest corrective rotation the solver may apply per pass, radians.
    pub step_limit: Option<f32>,
    constraints: Vec<IkConstraint>,
}

impl Joint {
    pub fn new(bone: BoneId) -> Self {
        Self {
            bone,
            length: 0.0,
            step_limit: None,
            constraints: Vec::new(),
        }
    }

    pub fn add_constraint(&mut self, constraint: IkConstraint) {
        self.constraints.push(constraint);
    }

    pub fn constraints(&self) -> &[IkConstraint] {
        &self.constraints
    }

    pub fn pole(&self) -> Option<&PoleConstraint> {
        self.constraints.iter().find_map(|c| match c {
            IkConstraint::Pole(p) => Some(p),
            _ => None,
        })
    }

    pub fn pole_mut(&mut self) -> Option<&mut PoleConstraint> {
        self.constraints.iter_mut().find_map(|c| match c {
            IkConstraint::Pole(p) => Some(p),
            _ => None,
        })
    }
}

/// Ordered joints from a root bone down to an end effector, plus the target
/// transform the effector tries to reach.
#[derive(Debug, Clone)]
pub struct KinematicChain {
    pub name: String,
    joints: Vec<Joint>,
    pub target: Transform,
}

impl KinematicChain {
    /// Builds a chain over `bones`, which must run root to effector with each
    /// bone a descendant of the one before it. World matrices of `armature`
    /// must be current so segment lengths can be measured.
    pub fn from_bones(
        name: impl Into<String>,
        armature: &Armature,
        bones: &[BoneId],
    ) -> Result<Self> {
        let name = name.into();
        if bones.len() < 2 {
            return Err(RigError::InvalidChain(format!(
                "chain {name:?} needs at least two joints"
            )));
        }
        for pair in bones.windows(2) {
            if !armature.is_ancestor(pair[0], pair[1]) {
                return Err(RigError::InvalidChain(format!(
                    "chain {name:?}: bone {:?} is not a descendant of {:?}",
                    armature.bone(pair[1]).name,
                    armature.bone(pair[0]).name,
                )));
            }
        }

        let mut joints: Vec<Joint> = bones.iter().map(|&b| Joint::new(b)).collect();
        Self::measure_lengths(&mut joints, armature);

        Ok(Self {
            name,
            joints,
            target: Transform::default(),
        })
    }

    fn measure_lengths(joints: &mut [Joint], armature: &Armature) {
        for i in 0..joints.len() {
            joints[i].length = if i + 1 < joints.len() {
                armature
                    .world_position(joints[i].bone)
                    .distance(armature.world_position(joints[i + 1].bone))
            } else {
                0.0
            };
        }
    }

    /// Re-measures segment lengths from the armature's current pose. Called
    /// after the figure is scaled or relocated out of band.
    pub fn reinitialize_joints(&mut self, armature: &Armature) {
        Self::measure_lengths(&mut self.joints, armature);
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joints_mut(&mut self) -> &mut [Joint] {
        &mut self.joints
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn root(&self) -> &Joint {
        &self.joints[0]
    }

    pub fn root_mut(&mut self) -> &mut Joint {
        &mut self.joints[0]
    }

    pub fn effector(&self) -> &Joint {
        self.joints.last().unwrap_or_else(|| unreachable!())
    }

    /// The joint just above the effector. Pole targets anchor to it.
    pub fn pre_effector(&self) -> &Joint {
        &self.joints[self.joints.len() - 2]
    }

    pub fn total_length(&self) -> f32 {
        self.joints.iter().map(|j| j.length).sum()
    }
}

use glam::Vec3;

/// Rule attached to a joint, consulted by the solver alongside the primary
/// target.
#[derive(Debug, Clone)]
pub enum IkConstraint {
    Pole(PoleConstraint),
    CopyRotation(CopyRotationConstraint),
}

/// Biases the bend plane of the whole chain toward a world-space point.
/// Attached to the chain's root joint.
#[derive(Debug, Clone)]
pub struct PoleConstraint {
    /// World-space pole position. The owner refreshes this before each solve.
    pub position: Vec3,
    /// Extra twist of the bend plane about the root-effector axis, degrees.
    pub pole_angle: f32,
}

impl PoleConstraint {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            pole_angle: 0.0,
        }
    }
}

/// Copies a fraction of another joint's local rotation after the solve.
#[derive(Debug, Clone)]
pub struct CopyRotationConstraint {
    /// Joint index within the same chain whose rotation is copied.
    pub source: usize,
    /// Fraction of the source rotation applied, 0..=1.
    pub influence: f32,
}

impl CopyRotationConstraint {
    pub fn new(source: usize, influence: f32) -> Self {
        Self { source, influence }
    }
}

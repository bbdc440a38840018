use glam::Vec3;
use marionette_core::{Result, RigError};
use serde::{Deserialize, Serialize};

pub const SPINE: usize = 0;
pub const LEFT_ARM: usize = 1;
pub const RIGHT_ARM: usize = 2;
pub const LEFT_LEG: usize = 3;
pub const RIGHT_LEG: usize = 4;
pub const CHAIN_COUNT: usize = 5;

/// One kinematic chain of the rig: bone names root to effector, plus the
/// fixed pole placement for that chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSpec {
    pub name: String,
    pub bones: Vec<String>,
    pub pole_offset: [f32; 3],
    #[serde(default)]
    pub pole_angle: f32,
}

impl ChainSpec {
    pub fn pole_offset(&self) -> Vec3 {
        Vec3::from(self.pole_offset)
    }
}

/// Figure-level rig description, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigConfig {
    pub hips: String,
    /// Fixed order: spine, left arm, right arm, left leg, right leg.
    pub chains: Vec<ChainSpec>,
    pub copy_rotation_influence: f32,
    /// XYZ Euler correction keeping feet flat against the ground plane.
    pub foot_correction: [f32; 3],
    /// XYZ Euler correction keeping the head level under torso lean.
    pub head_correction: [f32; 3],
    pub solver_iterations: u32,
    pub solver_tolerance: f32,
}

impl Default for RigConfig {
    fn default() -> Self {
        let chain = |name: &str, bones: &[&str], pole_offset: [f32; 3], pole_angle: f32| {
            ChainSpec {
                name: name.to_string(),
                bones: bones.iter().map(|b| b.to_string()).collect(),
                pole_offset,
                pole_angle,
            }
        };
        Self {
            hips: "Hips".to_string(),
            chains: vec![
                chain(
                    "spine",
                    &["Hips", "Spine", "Spine1", "Neck", "Head"],
                    [0.0, 0.0, 0.0],
                    128.0,
                ),
                chain(
                    "leftArm",
                    &["LeftArm", "LeftForeArm", "LeftHand"],
                    [0.0, 0.0, -0.5],
                    0.0,
                ),
                chain(
                    "rightArm",
                    &["RightArm", "RightForeArm", "RightHand"],
                    [0.0, 0.0, -0.5],
                    0.0,
                ),
                chain(
                    "leftLeg",
                    &["LeftUpLeg", "LeftLeg", "LeftFoot"],
                    [0.0, 0.3, 0.8],
                    0.0,
                ),
                chain(
                    "rightLeg",
                    &["RightUpLeg", "RightLeg", "RightFoot"],
                    [0.0, 0.3, 0.8],
                    0.0,
                ),
            ],
            copy_rotation_influence: 0.5,
            foot_correction: [1.5, 0.0, 0.0],
            head_correction: [-1.0, 0.0, 0.0],
            solver_iterations: 10,
            solver_tolerance: 1e-3,
        }
    }
}

impl RigConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chains.len() != CHAIN_COUNT {
            return Err(RigError::InvalidConfiguration(format!(
                "expected {CHAIN_COUNT} chains, got {}",
                self.chains.len()
            )));
        }
        for chain in &self.chains {
            if chain.bones.len() < 2 {
                return Err(RigError::InvalidConfiguration(format!(
                    "chain {:?} needs at least two bones",
                    chain.name
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.copy_rotation_influence) {
            return Err(RigError::InvalidConfiguration(format!(
                "copy rotation influence {} outside 0..=1",
                self.copy_rotation_influence
            )));
        }
        if self.solver_iterations == 0 {
            return Err(RigError::InvalidConfiguration(
                "solver needs at least one iteration".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        RigConfig::default().validate().unwrap();
    }

    #[test]
    fn wrong_chain_count_is_rejected() {
        let mut config = RigConfig::default();
        config.chains.pop();
        assert!(matches!(
            config.validate(),
            Err(RigError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn influence_outside_unit_range_is_rejected() {
        let mut config = RigConfig::default();
        config.copy_rotation_influence = 1.5;
        assert!(matches!(
            config.validate(),
            Err(RigError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let config = RigConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: RigConfig = serde_json::from_str(&json).unwrap();
        back.validate().unwrap();
        assert_eq!(back.chains[LEFT_LEG].pole_offset(), Vec3::new(0.0, 0.3, 0.8));
    }
}

use marionette_core::{Armature, Scene};

/// The two skeleton instances a rig drives: the clone the solver bends and
/// the original that rendering and export consume. Same bone names and
/// count; rest poses may differ.
pub struct SkeletonPair {
    pub clone: Armature,
    pub original: Armature,
}

/// Capability set a posed figure exposes to the scene lifecycle.
///
/// Composition seam in place of a base-class hierarchy: construction plays
/// the initialize role, and each per-frame phase has a default no-op so a
/// rig overrides only the phases it uses.
pub trait FigureRig {
    /// Sense-solve-apply phase. Runs after the solver's own per-frame pass.
    fn update(&mut self, _scene: &mut Scene) {}

    /// Post-processing phase. Runs strictly after `update` and any world
    /// matrix refresh, since it reads world transforms.
    fn late_update(&mut self, _scene: &mut Scene) {}

    fn remove_from_scene(&mut self, _scene: &mut Scene) {}

    fn set_selected(&mut self, _scene: &mut Scene, _selected: bool) {}
}

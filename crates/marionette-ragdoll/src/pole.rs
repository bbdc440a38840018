use glam::Vec3;
use marionette_core::{Marker, MarkerId, MarkerKind, Scene};

/// Bend-plane anchor for one chain: a world-space point plus the fixed offset
/// it keeps from the chain's second-to-last joint.
///
/// The live position is stored on the display marker, as the renderer sees
/// it; the offset never changes after construction.
#[derive(Debug)]
pub struct PoleTarget {
    pub name: String,
    pub marker: MarkerId,
    offset: Vec3,
}

impl PoleTarget {
    /// Creates the pole at `position` with its display marker hidden.
    pub fn new(scene: &mut Scene, name: impl Into<String>, position: Vec3, offset: Vec3) -> Self {
        let mut marker = Marker::new(MarkerKind::PoleGizmo);
        marker.transform.position = position;
        marker.visible = false;
        let marker = scene.add_marker(marker);
        Self {
            name: name.into(),
            marker,
            offset,
        }
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn position(&self, scene: &Scene) -> Vec3 {
        scene
            .marker(self.marker)
            .map(|m| m.transform.position)
            .unwrap_or(Vec3::ZERO)
    }

    pub fn set_position(&self, scene: &mut Scene, position: Vec3) {
        scene.marker_mut(self.marker, |m| m.transform.position = position);
    }

    pub fn remove(&self, scene: &mut Scene) {
        scene.remove_marker(self.marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pole_marker_starts_hidden() {
        let mut scene = Scene::new();
        let pole = PoleTarget::new(
            &mut scene,
            "leftArmPole",
            Vec3::new(0.0, 1.0, -0.5),
            Vec3::new(0.0, 0.0, -0.5),
        );
        let marker = scene.marker(pole.marker).unwrap();
        assert!(!marker.visible);
        assert_eq!(pole.position(&scene), Vec3::new(0.0, 1.0, -0.5));
    }

    #[test]
    fn offset_is_fixed_while_position_moves() {
        let mut scene = Scene::new();
        let pole = PoleTarget::new(&mut scene, "pole", Vec3::ZERO, Vec3::new(0.0, 0.3, 0.8));
        pole.set_position(&mut scene, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(pole.position(&scene), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(pole.offset(), Vec3::new(0.0, 0.3, 0.8));
    }
}

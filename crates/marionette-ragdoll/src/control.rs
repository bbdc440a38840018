use marionette_core::{Marker, MarkerId, MarkerKind, Scene, Transform};

/// Drag lifecycle notification from the pointer layer. Values, not
/// callbacks: the UI posts these into the controller's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Started,
    Moved,
    Ended,
}

/// Which handle a drag event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    Hips,
    Chain(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// User-facing handle plus the target transform it drives.
#[derive(Debug)]
pub struct ControlTarget {
    pub marker: MarkerId,
    pub target: Transform,
}

impl ControlTarget {
    pub fn new(scene: &mut Scene, target: Transform) -> Self {
        let mut marker = Marker::new(MarkerKind::DragHandle);
        marker.transform = target;
        let marker = scene.add_marker(marker);
        Self { marker, target }
    }

    /// Moves both the target transform and its on-screen handle.
    pub fn set_target(&mut self, scene: &mut Scene, target: Transform) {
        self.target = target;
        scene.marker_mut(self.marker, |m| m.transform = target);
    }

    pub fn set_interactive(&self, scene: &mut Scene, interactive: bool) {
        scene.marker_mut(self.marker, |m| m.interactive = interactive);
    }

    pub fn remove(&self, scene: &mut Scene) {
        scene.remove_marker(self.marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn handle_marker_follows_target() {
        let mut scene = Scene::new();
        let mut control = ControlTarget::new(&mut scene, Transform::default());
        control.set_target(
            &mut scene,
            Transform::from_position(Vec3::new(1.0, 0.0, 2.0)),
        );
        let marker = scene.marker(control.marker).unwrap();
        assert_eq!(marker.transform.position, Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn remove_clears_the_marker() {
        let mut scene = Scene::new();
        let control = ControlTarget::new(&mut scene, Transform::default());
        control.remove(&mut scene);
        assert!(scene.marker(control.marker).is_none());
    }
}

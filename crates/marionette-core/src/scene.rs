use crate::Transform;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

pub type MarkerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    PoleGizmo,
    DragHandle,
    SkeletonOverlay,
}

#[derive(Debug, Clone)]
pub struct Marker {
    pub id: MarkerId,
    pub kind: MarkerKind,
    pub transform: Transform,
    pub visible: bool,
    pub interactive: bool,
}

impl Marker {
    pub fn new(kind: MarkerKind) -> Self {
        Self {
            id: 0,
            kind,
            transform: Transform::default(),
            visible: true,
            interactive: true,
        }
    }
}

/// Registry of display markers: pole gizmos, drag handles, and the debug
/// skeleton overlay.
pub struct Scene {
    markers: Arc<RwLock<HashMap<MarkerId, Marker>>>,
    next_marker_id: Arc<RwLock<MarkerId>>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            markers: Arc::new(RwLock::new(HashMap::new())),
            next_marker_id: Arc::new(RwLock::new(0)),
        }
    }

    pub fn add_marker(&mut self, mut marker: Marker) -> MarkerId {
        let mut next_id = self.next_marker_id.write();
        marker.id = *next_id;
        *next_id += 1;

        let id = marker.id;
        self.markers.write().insert(id, marker);
        id
    }

    pub fn remove_marker(&mut self, id: MarkerId) -> Option<Marker> {
        self.markers.write().remove(&id)
    }

    pub fn marker(&self, id: MarkerId) -> Option<Marker> {
        self.markers.read().get(&id).cloned()
    }

    pub fn marker_mut<F, R>(&self, id: MarkerId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Marker) -> R,
    {
        let mut markers = self.markers.write();
        markers.get_mut(&id).map(f)
    }

    pub fn for_each_marker<F>(&self, mut f: F)
    where
        F: FnMut(&Marker),
    {
        let markers = self.markers.read();
        for marker in markers.values() {
            f(marker);
        }
    }

    pub fn visible_markers(&self) -> Vec<Marker> {
        self.markers
            .read()
            .values()
            .filter(|m| m.visible)
            .cloned()
            .collect()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.read().len()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn markers_get_sequential_ids() {
        let mut scene = Scene::new();
        let a = scene.add_marker(Marker::new(MarkerKind::PoleGizmo));
        let b = scene.add_marker(Marker::new(MarkerKind::DragHandle));
        assert_ne!(a, b);
        assert_eq!(scene.marker_count(), 2);
    }

    #[test]
    fn marker_mut_updates_in_place() {
        let mut scene = Scene::new();
        let id = scene.add_marker(Marker::new(MarkerKind::PoleGizmo));
        scene.marker_mut(id, |m| m.transform.position = Vec3::new(1.0, 2.0, 3.0));
        let got = scene.marker(id).unwrap();
        assert_eq!(got.transform.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn removed_markers_are_gone() {
        let mut scene = Scene::new();
        let id = scene.add_marker(Marker::new(MarkerKind::SkeletonOverlay));
        assert!(scene.remove_marker(id).is_some());
        assert!(scene.marker(id).is_none());
        assert_eq!(scene.marker_count(), 0);
    }
}

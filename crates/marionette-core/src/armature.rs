use crate::{RigError, Result, Transform};
use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;

pub type BoneId = usize;

#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub parent: Option<BoneId>,
    local: Transform,
    world: Mat4,
    world_dirty: bool,
}

impl Bone {
    fn new(name: String, parent: Option<BoneId>, local: Transform) -> Self {
        Self {
            name,
            parent,
            local,
            world: Mat4::IDENTITY,
            world_dirty: true,
        }
    }

    pub fn local(&self) -> Transform {
        self.local
    }
}

/// Named bone hierarchy with cached world matrices.
///
/// Bones are stored parent-before-child, so a single forward pass refreshes
/// every world matrix. Local writes mark the bone dirty; dirtiness spreads to
/// descendants during `update_world_matrices`.
#[derive(Debug, Clone, Default)]
pub struct Armature {
    bones: Vec<Bone>,
    names: HashMap<String, BoneId>,
}

impl Armature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        parent: Option<BoneId>,
        local: Transform,
    ) -> Result<BoneId> {
        let name = name.into();
        let id = self.bones.len();
        if let Some(parent) = parent {
            if parent >= id {
                return Err(RigError::TopologyMismatch(format!(
                    "bone {name:?} added before its parent"
                )));
            }
        }
        if self.names.contains_key(&name) {
            return Err(RigError::TopologyMismatch(format!(
                "duplicate bone name {name:?}"
            )));
        }
        self.names.insert(name.clone(), id);
        self.bones.push(Bone::new(name, parent, local));
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bone(&self, id: BoneId) -> &Bone {
        &self.bones[id]
    }

    pub fn root(&self) -> Option<BoneId> {
        if self.bones.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    pub fn find(&self, name: &str) -> Option<BoneId> {
        self.names.get(name).copied()
    }

    pub fn require(&self, name: &str) -> Result<BoneId> {
        self.find(name)
            .ok_or_else(|| RigError::MissingBone(name.to_string()))
    }

    pub fn bone_names(&self) -> impl Iterator<Item = &str> {
        self.bones.iter().map(|b| b.name.as_str())
    }

    pub fn is_ancestor(&self, ancestor: BoneId, bone: BoneId) -> bool {
        let mut cursor = self.bones[bone].parent;
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.bones[id].parent;
        }
        false
    }

    pub fn local(&self, id: BoneId) -> Transform {
        self.bones[id].local
    }

    pub fn set_local(&mut self, id: BoneId, local: Transform) {
        self.bones[id].local = local;
        self.bones[id].world_dirty = true;
    }

    pub fn set_local_position(&mut self, id: BoneId, position: Vec3) {
        self.bones[id].local.position = position;
        self.bones[id].world_dirty = true;
    }

    pub fn set_local_rotation(&mut self, id: BoneId, rotation: Quat) {
        self.bones[id].local.rotation = rotation;
        self.bones[id].world_dirty = true;
    }

    pub fn set_local_scale(&mut self, id: BoneId, scale: Vec3) {
        self.bones[id].local.scale = scale;
        self.bones[id].world_dirty = true;
    }

    /// Decomposes `matrix` into position, rotation, and scale and writes them
    /// back as the bone's local transform.
    pub fn set_local_from_matrix(&mut self, id: BoneId, matrix: Mat4) {
        self.set_local(id, Transform::from(matrix));
    }

    /// Recomputes cached world matrices in hierarchy order. Only dirty bones
    /// and their descendants are touched.
    pub fn update_world_matrices(&mut self) {
        let mut touched = vec![false; self.bones.len()];
        for i in 0..self.bones.len() {
            let parent = self.bones[i].parent;
            let parent_touched = parent.map(|p| touched[p]).unwrap_or(false);
            if self.bones[i].world_dirty || parent_touched {
                let parent_world = parent.map(|p| self.bones[p].world).unwrap_or(Mat4::IDENTITY);
                let local_matrix = self.bones[i].local.to_matrix();
                self.bones[i].world = parent_world * local_matrix;
                self.bones[i].world_dirty = false;
                touched[i] = true;
            }
        }
    }

    pub fn world_matrix(&self, id: BoneId) -> Mat4 {
        self.bones[id].world
    }

    pub fn world_position(&self, id: BoneId) -> Vec3 {
        self.bones[id].world.w_axis.truncate()
    }

    pub fn world_rotation(&self, id: BoneId) -> Quat {
        self.bones[id].world.to_scale_rotation_translation().1
    }

    /// Sets the bone's local rotation so its world rotation equals `rotation`.
    /// World matrices must be current before calling.
    pub fn set_world_rotation(&mut self, id: BoneId, rotation: Quat) {
        let parent_rotation = match self.bones[id].parent {
            Some(p) => self.world_rotation(p),
            None => Quat::IDENTITY,
        };
        self.set_local_rotation(id, (parent_rotation.inverse() * rotation).normalize());
    }
}

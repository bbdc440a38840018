use glam::Mat4;
use marionette_core::{invert_or_identity, Armature, BoneId, Result, RigError};

/// Bijective clone-to-original bone pairing over the bones the rig drives.
///
/// Built once at initialization, validated against both armatures. Pairs are
/// held in clone hierarchy order (parent before child) so a retarget pass and
/// the world refresh that follows agree on traversal order.
#[derive(Debug)]
pub struct BoneMap {
    pairs: Vec<(BoneId, BoneId)>,
}

impl BoneMap {
    pub fn build(clone: &Armature, original: &Armature, names: &[String]) -> Result<Self> {
        if clone.len() != original.len() {
            return Err(RigError::TopologyMismatch(format!(
                "clone has {} bones, original has {}",
                clone.len(),
                original.len()
            )));
        }
        for name in clone.bone_names() {
            if original.find(name).is_none() {
                return Err(RigError::TopologyMismatch(format!(
                    "bone {name:?} present in clone but not in original"
                )));
            }
        }

        let mut pairs = Vec::with_capacity(names.len());
        for name in names {
            let clone_id = clone.require(name)?;
            let original_id = original.require(name)?;
            if !pairs.contains(&(clone_id, original_id)) {
                pairs.push((clone_id, original_id));
            }
        }
        pairs.sort_by_key(|&(clone_id, _)| clone_id);
        Ok(Self { pairs })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoneId, BoneId)> + '_ {
        self.pairs.iter().copied()
    }
}

/// Per-bone snapshot of the clone's local matrices as of the last accepted
/// frame, indexed by `BoneMap` slot. `None` marks the explicit no-snapshot
/// case; its delta is identity.
#[derive(Debug)]
pub struct RetargetState {
    snapshots: Vec<Option<Mat4>>,
}

impl RetargetState {
    pub fn new(len: usize) -> Self {
        Self {
            snapshots: vec![None; len],
        }
    }

    /// Overwrites every snapshot with the clone's current local matrices.
    /// Runs at initialization, after each retarget pass, and on reinitialize.
    pub fn record(&mut self, clone: &Armature, map: &BoneMap) {
        for (slot, (clone_id, _)) in map.iter().enumerate() {
            self.snapshots[slot] = Some(clone.local(clone_id).to_matrix());
        }
    }

    pub fn clear(&mut self) {
        self.snapshots.iter_mut().for_each(|s| *s = None);
    }

    fn previous(&self, slot: usize) -> Mat4 {
        self.snapshots[slot].unwrap_or(Mat4::IDENTITY)
    }

    #[cfg(test)]
    fn set(&mut self, slot: usize, matrix: Mat4) {
        self.snapshots[slot] = Some(matrix);
    }
}

/// Transfers the clone's incremental motion onto the original skeleton.
///
/// For each mapped bone: delta = original_prev * inverse(clone_prev), and the
/// original's new local matrix is delta * clone_now. Copying the absolute
/// clone transform would pop whenever the two skeletons disagree on rest
/// pose; the delta form moves the original by exactly what the clone moved.
pub fn apply_changes_to_original(
    clone: &mut Armature,
    original: &mut Armature,
    map: &BoneMap,
    state: &mut RetargetState,
) {
    clone.update_world_matrices();
    original.update_world_matrices();

    for (slot, (clone_id, original_id)) in map.iter().enumerate() {
        let clone_now = clone.local(clone_id).to_matrix();
        let clone_prev = state.previous(slot);
        let original_prev = original.local(original_id).to_matrix();

        let delta = original_prev * invert_or_identity(clone_prev);
        original.set_local_from_matrix(original_id, delta * clone_now);
    }

    state.record(clone, map);
    original.update_world_matrices();
}

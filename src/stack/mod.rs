//! UV island stacking.
//!
//! Stacking places every island of a similarity cluster on top of one
//! *master* island, so that identical parts share texture space.
//!
//! # Overview
//!
//! 1. Islands of every object are collected and fingerprinted
//!    ([`crate::island`]).
//! 2. [`group_by_similarity`] clusters them by relative similarity-index
//!    distance; singletons are dropped.
//! 3. [`find_master`] picks the master: the first selected island, or the
//!    least distorted one.
//! 4. [`StackTransform`] maps each replica onto the master's bounds.
//!
//! User-defined [`StackGroups`] take part in [`StackSystem::stack_all`]
//! before the automatic clusters.
//!
//! # Example
//!
//! ```
//! use trimstack::prelude::*;
//! use nalgebra::{Point2, Point3};
//!
//! // Two unit quads with identical UV layouts at different offsets.
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0), Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0),
//!     Point3::new(3.0, 1.0, 0.0), Point3::new(2.0, 1.0, 0.0),
//! ];
//! let square = |x: f64| vec![
//!     Point2::new(x, 0.0), Point2::new(x + 0.25, 0.0),
//!     Point2::new(x + 0.25, 0.25), Point2::new(x, 0.25),
//! ];
//! let faces = vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]];
//! let uvs = vec![square(0.0), square(0.5)];
//! let mesh = build_from_polygons("Bolts", &positions, &faces, Some(&uvs)).unwrap();
//!
//! let mut scene = Scene::from_mesh(mesh);
//! let options = StackOptions::default();
//! let system = StackSystem::new(&scene, &options);
//! assert_eq!(system.stacks().len(), 1);
//!
//! let moved = system.stack_all(&mut scene, &options, &Selection::new());
//! assert_eq!(moved, 1);
//! ```

mod cluster;
mod groups;
mod transform;

pub use cluster::{
    find_master, group_by_exact_index, group_by_similarity, group_members_by_similarity, merge_overlapping,
};
pub use groups::{StackGroup, StackGroups};
pub use transform::{best_rotation, snap_90, RotationMode, ScaleMode, StackTransform};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UvError};
use crate::island::{Island, IslandId, Selection, SelectionMode};
use crate::scene::Scene;

/// Options for stacking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackOptions {
    /// Relative similarity-index tolerance; 0 requires exact equality.
    pub threshold: f64,

    /// Rotation policy for replicas.
    pub rotation_mode: RotationMode,

    /// Scale policy for replicas.
    pub scale_mode: ScaleMode,

    /// Whether rotation matching is applied at all.
    pub match_rotation: bool,

    /// Whether scale matching is applied at all.
    pub match_scale: bool,

    /// Smallest cluster turned into a group by automatic grouping.
    pub min_group_size: usize,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            rotation_mode: RotationMode::OptimalMatch,
            scale_mode: ScaleMode::Uniform,
            match_rotation: true,
            match_scale: true,
            min_group_size: 2,
        }
    }
}

impl StackOptions {
    /// Set the similarity threshold (negative values clamp to 0).
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.max(0.0);
        self
    }

    /// Set the rotation policy.
    pub fn with_rotation_mode(mut self, mode: RotationMode) -> Self {
        self.rotation_mode = mode;
        self
    }

    /// Set the scale policy.
    pub fn with_scale_mode(mut self, mode: ScaleMode) -> Self {
        self.scale_mode = mode;
        self
    }

    /// Enable or disable rotation matching.
    pub fn with_match_rotation(mut self, enabled: bool) -> Self {
        self.match_rotation = enabled;
        self
    }

    /// Enable or disable scale matching.
    pub fn with_match_scale(mut self, enabled: bool) -> Self {
        self.match_scale = enabled;
        self
    }

    /// Set the minimum automatic group size (at least 1).
    pub fn with_min_group_size(mut self, size: usize) -> Self {
        self.min_group_size = size.max(1);
        self
    }

    fn effective_rotation(&self) -> RotationMode {
        if self.match_rotation {
            self.rotation_mode
        } else {
            RotationMode::None
        }
    }

    fn effective_scale(&self) -> ScaleMode {
        if self.match_scale {
            self.scale_mode
        } else {
            ScaleMode::None
        }
    }
}

/// Islands of a scene and their similarity clusters, taken at one point in time.
///
/// The system does not borrow the scene; every operation takes it again
/// and re-resolves islands by face index.
#[derive(Debug, Clone)]
pub struct StackSystem {
    islands: Vec<Island>,
    stacks: Vec<Vec<usize>>,
}

impl StackSystem {
    /// Collect the islands of every object in `scene` and cluster them.
    pub fn new(scene: &Scene, options: &StackOptions) -> Self {
        let islands: Vec<Island> = scene
            .iter()
            .flat_map(|object| Island::collect(&object.mesh))
            .collect();
        let stacks = group_by_similarity(&islands, options.threshold);
        log::info!(
            "collected {} islands in {} similarity stacks",
            islands.len(),
            stacks.len()
        );
        Self { islands, stacks }
    }

    // ==================== Accessors ====================

    /// All collected islands, in object then face order.
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// Similarity clusters as indices into [`StackSystem::islands`].
    pub fn stacks(&self) -> &[Vec<usize>] {
        &self.stacks
    }

    /// Index of the island with the given identifier.
    pub fn position(&self, id: &IslandId) -> Option<usize> {
        self.islands.iter().position(|island| &island.id() == id)
    }

    // ==================== Selection Queries ====================

    /// Identifiers of the islands currently selected in `scene`.
    pub fn selection_from_scene(&self, scene: &Scene, mode: SelectionMode) -> Selection {
        self.islands
            .iter()
            .filter(|island| {
                scene
                    .mesh(island.object_name())
                    .is_some_and(|mesh| island.is_selected(mesh, mode))
            })
            .map(Island::id)
            .collect()
    }

    /// Indices of the islands in `selection`.
    pub fn selected_islands(&self, selection: &Selection) -> Vec<usize> {
        (0..self.islands.len())
            .filter(|&i| selection.contains(&self.islands[i].id()))
            .collect()
    }

    /// Indices of the stacks containing at least one selected island.
    pub fn selected_stacks(&self, selection: &Selection) -> Vec<usize> {
        (0..self.stacks.len())
            .filter(|&s| {
                self.stacks[s]
                    .iter()
                    .any(|&i| selection.contains(&self.islands[i].id()))
            })
            .collect()
    }

    /// Master of a stack.
    pub fn master_of(&self, scene: &Scene, stack: usize, selection: &Selection) -> Option<usize> {
        find_master(&self.islands, &self.stacks[stack], selection, scene)
    }

    /// Indices of the live islands of `object` stored in one of its groups.
    pub fn group_islands(&self, scene: &Scene, object: &str, group_id: u32) -> Vec<usize> {
        scene
            .object(object)
            .map(|o| o.stack_groups.resolve(group_id, &self.islands, object))
            .unwrap_or_default()
    }

    // ==================== Stacking ====================

    /// Stack everything: manual groups first, then automatic clusters.
    ///
    /// Each group of every object is split by exact similarity index. Parts
    /// that share an island (an island may belong to several groups) are
    /// merged, and every merged part with two or more islands is stacked
    /// once. Islands handled there are left out of the automatic clusters.
    /// Returns the number of replicas moved.
    pub fn stack_all(&self, scene: &mut Scene, options: &StackOptions, selection: &Selection) -> usize {
        scene.refresh_group_counts();
        let mut processed: HashSet<usize> = HashSet::new();

        let parts: Vec<Vec<usize>> = self
            .all_group_members(scene)
            .into_iter()
            .filter(|members| members.len() >= 2)
            .flat_map(|members| group_by_exact_index(&self.islands, &members))
            .collect();
        let mut stacked = self.stack_parts(scene, parts, &mut processed, options, selection);

        for stack in &self.stacks {
            let remaining: Vec<usize> = stack
                .iter()
                .copied()
                .filter(|i| !processed.contains(i))
                .collect();
            if remaining.len() >= 2 {
                stacked += self.stack_members(scene, &remaining, options, selection);
            }
        }

        log::info!("stacked {} islands", stacked);
        stacked
    }

    /// Stack only the clusters containing a selected island.
    pub fn stack_selected(
        &self,
        scene: &mut Scene,
        options: &StackOptions,
        selection: &Selection,
    ) -> Result<usize> {
        if self.selected_islands(selection).is_empty() {
            return Err(UvError::NoSelection);
        }
        let mut stacked = 0;
        for s in self.selected_stacks(selection) {
            stacked += self.stack_members(scene, &self.stacks[s], options, selection);
        }
        log::info!("stacked {} selected islands", stacked);
        Ok(stacked)
    }

    /// Stack the islands of one group onto a single master.
    pub fn stack_group(
        &self,
        scene: &mut Scene,
        object: &str,
        group_id: u32,
        options: &StackOptions,
        selection: &Selection,
    ) -> Result<usize> {
        let groups = &scene
            .object(object)
            .ok_or_else(|| UvError::ObjectNotFound {
                name: object.to_string(),
            })?
            .stack_groups;
        if groups.get(group_id).is_none() {
            return Err(UvError::GroupNotFound { group_id });
        }
        let members = self.group_islands(scene, object, group_id);
        if members.len() < 2 {
            return Err(UvError::invalid_param(
                "group_id",
                group_id,
                "group needs at least 2 resolvable islands to stack",
            ));
        }
        Ok(self.stack_members(scene, &members, options, selection))
    }

    /// Stack every group with two or more live islands, clustering each
    /// group's islands by similarity first.
    ///
    /// Clusters sharing an island are merged and stacked onto one master,
    /// as in [`StackSystem::stack_all`].
    pub fn stack_all_groups(
        &self,
        scene: &mut Scene,
        options: &StackOptions,
        selection: &Selection,
    ) -> usize {
        scene.refresh_group_counts();
        let parts: Vec<Vec<usize>> = self
            .all_group_members(scene)
            .into_iter()
            .filter(|members| members.len() >= 2)
            .flat_map(|members| group_members_by_similarity(&self.islands, &members, options.threshold))
            .collect();
        let stacked = self.stack_parts(scene, parts, &mut HashSet::new(), options, selection);
        log::info!("stacked {} group islands", stacked);
        stacked
    }

    /// Live members of every group of every object, in scene order.
    fn all_group_members(&self, scene: &Scene) -> Vec<Vec<usize>> {
        scene
            .iter()
            .flat_map(|object| {
                object
                    .stack_groups
                    .iter()
                    .map(|group| {
                        object
                            .stack_groups
                            .resolve(group.group_id, &self.islands, object.name())
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Stack the parts with two or more islands. Parts sharing an island are
    /// merged first so they end on a single master. Stacked islands are added
    /// to `processed`.
    fn stack_parts(
        &self,
        scene: &mut Scene,
        parts: Vec<Vec<usize>>,
        processed: &mut HashSet<usize>,
        options: &StackOptions,
        selection: &Selection,
    ) -> usize {
        let parts: Vec<Vec<usize>> = parts.into_iter().filter(|p| p.len() >= 2).collect();
        let mut stacked = 0;
        for part in merge_overlapping(parts) {
            stacked += self.stack_members(scene, &part, options, selection);
            processed.extend(part);
        }
        stacked
    }

    /// Move every non-master member onto the master.
    ///
    /// The master and replicas are re-read from the live meshes, and
    /// transforms are computed for all replicas before any UV is written.
    fn stack_members(
        &self,
        scene: &mut Scene,
        members: &[usize],
        options: &StackOptions,
        selection: &Selection,
    ) -> usize {
        let Some(master_index) = find_master(&self.islands, members, selection, scene) else {
            return 0;
        };
        let cached = &self.islands[master_index];
        let Some(master_mesh) = scene.mesh(cached.object_name()) else {
            log::warn!("object {} of master island is gone", cached.object_name());
            return 0;
        };
        let Some(master) = cached.refreshed(master_mesh) else {
            log::warn!("master island in {} no longer resolves", cached.object_name());
            return 0;
        };

        let transforms: Vec<(usize, StackTransform)> = members
            .iter()
            .filter(|&&i| i != master_index)
            .filter_map(|&i| {
                let cached = &self.islands[i];
                let replica_mesh = scene.mesh(cached.object_name())?;
                let replica = cached.refreshed(replica_mesh)?;
                let transform = StackTransform::compute(
                    &replica,
                    replica_mesh,
                    &master,
                    master_mesh,
                    options.effective_rotation(),
                    options.effective_scale(),
                );
                Some((i, transform))
            })
            .collect();

        let mut moved = 0;
        for (i, transform) in transforms {
            let replica = &self.islands[i];
            let Some(mesh) = scene.mesh_mut(replica.object_name()) else {
                continue;
            };
            if transform.apply(replica, mesh) {
                moved += 1;
            } else {
                log::warn!("skipping stale island in {}", replica.object_name());
            }
        }
        moved
    }

    // ==================== Selection Operations ====================

    /// Select the master of every stack. Returns the number selected.
    pub fn select_primaries(&self, scene: &mut Scene, selection: &Selection, mode: SelectionMode) -> usize {
        let masters: Vec<usize> = (0..self.stacks.len())
            .filter_map(|s| self.master_of(scene, s, selection))
            .collect();
        self.select(scene, &masters, mode)
    }

    /// Select every non-master stack member. Returns the number selected.
    pub fn select_replicas(&self, scene: &mut Scene, selection: &Selection, mode: SelectionMode) -> usize {
        let mut replicas = Vec::new();
        for (s, stack) in self.stacks.iter().enumerate() {
            let master = self.master_of(scene, s, selection);
            replicas.extend(stack.iter().copied().filter(|&i| Some(i) != master));
        }
        self.select(scene, &replicas, mode)
    }

    /// Select every island that belongs to no stack. Returns the number selected.
    pub fn select_singles(&self, scene: &mut Scene, mode: SelectionMode) -> usize {
        let stacked: HashSet<usize> = self.stacks.iter().flatten().copied().collect();
        let singles: Vec<usize> = (0..self.islands.len())
            .filter(|i| !stacked.contains(i))
            .collect();
        self.select(scene, &singles, mode)
    }

    /// Select every island whose similarity index equals the target's exactly.
    ///
    /// Returns 0 when the target is not among the collected islands.
    pub fn select_similar(&self, scene: &mut Scene, target: &IslandId, mode: SelectionMode) -> usize {
        let Some(t) = self.position(target) else {
            return 0;
        };
        let index = self.islands[t].sim_index();
        let similar: Vec<usize> = (0..self.islands.len())
            .filter(|&i| self.islands[i].sim_index() == index)
            .collect();
        self.select(scene, &similar, mode)
    }

    /// Select the live islands of one group. Returns the number selected.
    pub fn select_group(&self, scene: &mut Scene, object: &str, group_id: u32, mode: SelectionMode) -> usize {
        let members = self.group_islands(scene, object, group_id);
        self.select(scene, &members, mode)
    }

    fn select(&self, scene: &mut Scene, indices: &[usize], mode: SelectionMode) -> usize {
        for &i in indices {
            let island = &self.islands[i];
            if let Some(mesh) = scene.mesh_mut(island.object_name()) {
                island.set_selected(mesh, mode, true);
            }
        }
        indices.len()
    }

    // ==================== Groups ====================

    /// Create a group on `object` holding its selected islands.
    pub fn create_group(
        &self,
        scene: &mut Scene,
        object: &str,
        selection: &Selection,
        name: Option<&str>,
    ) -> Result<u32> {
        let ids: Vec<IslandId> = self
            .selected_islands(selection)
            .into_iter()
            .map(|i| self.islands[i].id())
            .filter(|id| id.object_name == object)
            .collect();
        if ids.is_empty() {
            return Err(UvError::NoSelection);
        }
        let groups = &mut scene.require_object_mut(object)?.stack_groups;
        let id = groups.create_group(name);
        groups.assign(id, &ids)?;
        Ok(id)
    }

    /// Replace the previous automatic groups of `object` with one group per
    /// selected stack of at least `options.min_group_size` islands.
    ///
    /// Returns the ids of the created groups.
    pub fn auto_group(
        &self,
        scene: &mut Scene,
        object: &str,
        options: &StackOptions,
        selection: &Selection,
    ) -> Result<Vec<u32>> {
        let selected = self.selected_islands(selection).len();
        if selected == 0 {
            return Err(UvError::NoSelection);
        }
        if selected < 2 {
            return Err(UvError::invalid_param(
                "selection",
                selected,
                "need at least 2 islands to group by similarity",
            ));
        }

        let groups = &mut scene.require_object_mut(object)?.stack_groups;
        groups.clear_auto_groups();

        let mut created = Vec::new();
        let mut skipped = 0;
        for s in self.selected_stacks(selection) {
            let stack = &self.stacks[s];
            if stack.len() < options.min_group_size.max(1) {
                skipped += 1;
                continue;
            }
            let ids: Vec<IslandId> = stack.iter().map(|&i| self.islands[i].id()).collect();
            created.push(groups.create_auto_group(created.len() as u32, &ids)?);
        }

        log::info!(
            "created {} similarity groups on {} (skipped {} below {} islands)",
            created.len(),
            object,
            skipped,
            options.min_group_size
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_polygons, UvMesh};
    use nalgebra::{Point2, Point3};

    /// Disconnected unit quads with square UVs of side `size` at `(x, 0)`.
    fn quads(name: &str, placements: &[(f64, f64)]) -> UvMesh {
        let mut positions = Vec::new();
        let mut faces = Vec::new();
        let mut uvs = Vec::new();
        for (i, &(x, size)) in placements.iter().enumerate() {
            let px = i as f64 * 2.0;
            let base = positions.len();
            positions.extend([
                Point3::new(px, 0.0, 0.0),
                Point3::new(px + 1.0, 0.0, 0.0),
                Point3::new(px + 1.0, 1.0, 0.0),
                Point3::new(px, 1.0, 0.0),
            ]);
            faces.push(vec![base, base + 1, base + 2, base + 3]);
            uvs.push(vec![
                Point2::new(x, 0.0),
                Point2::new(x + size, 0.0),
                Point2::new(x + size, size),
                Point2::new(x, size),
            ]);
        }
        build_from_polygons(name, &positions, &faces, Some(&uvs)).unwrap()
    }

    fn bounds(scene: &Scene, system: &StackSystem, i: usize) -> (Point2<f64>, Point2<f64>) {
        let island = &system.islands()[i];
        let mesh = scene.mesh(island.object_name()).unwrap();
        let now = Island::from_faces(mesh, island.faces().to_vec());
        (now.bbox().min(), now.bbox().max())
    }

    #[test]
    fn test_duplicate_islands_stack_onto_origin_master() {
        let mut scene = Scene::from_mesh(quads("Obj", &[(2.0, 0.25), (0.0, 0.25)]));
        let options = StackOptions::default().with_rotation_mode(RotationMode::Snap90);
        let system = StackSystem::new(&scene, &options);
        assert_eq!(system.stacks(), &[vec![0, 1]]);

        let moved = system.stack_all(&mut scene, &options, &Selection::new());
        assert_eq!(moved, 1);

        let (min, max) = bounds(&scene, &system, 0);
        assert!((min - Point2::new(0.0, 0.0)).norm() < 1e-9);
        assert!((max - Point2::new(0.25, 0.25)).norm() < 1e-9);
    }

    #[test]
    fn test_selected_master_wins() {
        let mut scene = Scene::from_mesh(quads("Obj", &[(2.0, 0.25), (0.0, 0.25)]));
        let options = StackOptions::default();
        let system = StackSystem::new(&scene, &options);
        let selection: Selection = [system.islands()[0].id()].into_iter().collect();

        let moved = system.stack_selected(&mut scene, &options, &selection).unwrap();
        assert_eq!(moved, 1);
        let (min, _) = bounds(&scene, &system, 1);
        assert!((min - Point2::new(2.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_stack_selected_needs_selection() {
        let mut scene = Scene::from_mesh(quads("Obj", &[(2.0, 0.25), (0.0, 0.25)]));
        let options = StackOptions::default();
        let system = StackSystem::new(&scene, &options);
        let result = system.stack_selected(&mut scene, &options, &Selection::new());
        assert!(matches!(result, Err(UvError::NoSelection)));
    }

    #[test]
    fn test_group_roundtrip() {
        let mut scene = Scene::from_mesh(quads(
            "Obj",
            &[(0.0, 0.25), (1.0, 0.25), (2.0, 0.25), (3.0, 0.5)],
        ));
        let options = StackOptions::default();
        let system = StackSystem::new(&scene, &options);
        let ids: Vec<IslandId> = system.islands()[..3].iter().map(Island::id).collect();

        let groups = &mut scene.object_mut("Obj").unwrap().stack_groups;
        let g = groups.create_group(None);
        assert_eq!(g, 1);
        groups.assign(g, &ids).unwrap();
        assert_eq!(system.group_islands(&scene, "Obj", g), vec![0, 1, 2]);

        let groups = &mut scene.object_mut("Obj").unwrap().stack_groups;
        groups.remove(g, &ids[1..2]).unwrap();
        assert_eq!(system.group_islands(&scene, "Obj", g), vec![0, 2]);
        assert!(system.group_islands(&scene, "Other", g).is_empty());
    }

    fn assert_all_at(scene: &Scene, system: &StackSystem, x: f64) {
        for i in 0..system.islands().len() {
            let (min, max) = bounds(scene, system, i);
            assert!((min - Point2::new(x, 0.0)).norm() < 1e-9, "island {} at {:?}", i, min);
            assert!((max - Point2::new(x + 0.25, 0.25)).norm() < 1e-9, "island {} ends at {:?}", i, max);
        }
    }

    /// Three identical islands at x = 0, 1, 2 with groups {0, 1} and {1, 2}.
    fn overlapping_groups() -> (Scene, StackSystem) {
        let mut scene = Scene::from_mesh(quads("Obj", &[(0.0, 0.25), (1.0, 0.25), (2.0, 0.25)]));
        let system = StackSystem::new(&scene, &StackOptions::default());
        let ids: Vec<IslandId> = system.islands().iter().map(Island::id).collect();
        let groups = &mut scene.object_mut("Obj").unwrap().stack_groups;
        let first = groups.create_group(None);
        groups.assign(first, &ids[..2]).unwrap();
        let second = groups.create_group(None);
        groups.assign(second, &ids[1..]).unwrap();
        (scene, system)
    }

    #[test]
    fn test_stack_all_shared_group_member() {
        let (mut scene, system) = overlapping_groups();
        let options = StackOptions::default();
        assert_eq!(system.stack_all(&mut scene, &options, &Selection::new()), 2);
        assert_all_at(&scene, &system, 0.0);
    }

    #[test]
    fn test_stack_all_groups_shared_group_member() {
        let (mut scene, system) = overlapping_groups();
        let options = StackOptions::default();
        assert_eq!(system.stack_all_groups(&mut scene, &options, &Selection::new()), 2);
        assert_all_at(&scene, &system, 0.0);
    }

    #[test]
    fn test_successive_group_stacks_read_current_uvs() {
        // Stacking group 1 moves island 1; group 2 must see it at its new place.
        let (mut scene, system) = overlapping_groups();
        let options = StackOptions::default();
        let none = Selection::new();
        assert_eq!(system.stack_group(&mut scene, "Obj", 1, &options, &none).unwrap(), 1);
        assert_eq!(system.stack_group(&mut scene, "Obj", 2, &options, &none).unwrap(), 1);
        assert_all_at(&scene, &system, 0.0);
    }

    #[test]
    fn test_stack_group_errors() {
        let mut scene = Scene::from_mesh(quads("Obj", &[(0.0, 0.25), (1.0, 0.25)]));
        let options = StackOptions::default();
        let system = StackSystem::new(&scene, &options);
        let none = Selection::new();

        assert!(matches!(
            system.stack_group(&mut scene, "Obj", 4, &options, &none),
            Err(UvError::GroupNotFound { group_id: 4 })
        ));
        assert!(matches!(
            system.stack_group(&mut scene, "Nope", 1, &options, &none),
            Err(UvError::ObjectNotFound { .. })
        ));

        let g = scene.object_mut("Obj").unwrap().stack_groups.create_group(None);
        assert!(system.stack_group(&mut scene, "Obj", g, &options, &none).is_err());

        let ids: Vec<IslandId> = system.islands().iter().map(Island::id).collect();
        scene.object_mut("Obj").unwrap().stack_groups.assign(g, &ids).unwrap();
        assert_eq!(system.stack_group(&mut scene, "Obj", g, &options, &none).unwrap(), 1);
    }

    #[test]
    fn test_stack_all_processes_groups_first() {
        // Islands 0 and 2 are grouped by hand; 1 and 3 only cluster automatically.
        let mut scene = Scene::from_mesh(quads(
            "Obj",
            &[(0.0, 0.25), (1.0, 0.25), (2.0, 0.25), (3.0, 0.25)],
        ));
        let options = StackOptions::default();
        let system = StackSystem::new(&scene, &options);
        assert_eq!(system.stacks(), &[vec![0, 1, 2, 3]]);

        let ids = vec![system.islands()[0].id(), system.islands()[2].id()];
        let groups = &mut scene.object_mut("Obj").unwrap().stack_groups;
        let g = groups.create_group(None);
        groups.assign(g, &ids).unwrap();

        let moved = system.stack_all(&mut scene, &options, &Selection::new());
        assert_eq!(moved, 2);
        let (min2, _) = bounds(&scene, &system, 2);
        let (min3, _) = bounds(&scene, &system, 3);
        assert!((min2 - Point2::new(0.0, 0.0)).norm() < 1e-9);
        assert!((min3 - Point2::new(1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_select_operations() {
        let mut scene = Scene::from_mesh(quads("Obj", &[(1.0, 0.25), (0.0, 0.25), (2.0, 0.5)]));
        let options = StackOptions::default().with_threshold(0.0);
        let system = StackSystem::new(&scene, &options);
        let none = Selection::new();
        let mode = SelectionMode::Sync;

        assert_eq!(system.select_primaries(&mut scene, &none, mode), 1);
        let selected = system.selection_from_scene(&scene, mode);
        assert_eq!(selected.len(), 1);
        assert!(selected.contains(&system.islands()[1].id()));

        scene.mesh_mut("Obj").unwrap().select_all(false);
        assert_eq!(system.select_replicas(&mut scene, &none, mode), 1);
        assert!(system.selection_from_scene(&scene, mode).contains(&system.islands()[0].id()));

        scene.mesh_mut("Obj").unwrap().select_all(false);
        assert_eq!(system.select_singles(&mut scene, mode), 1);
        assert!(system.selection_from_scene(&scene, mode).contains(&system.islands()[2].id()));

        scene.mesh_mut("Obj").unwrap().select_all(false);
        let target = system.islands()[0].id();
        assert_eq!(system.select_similar(&mut scene, &target, mode), 2);
        assert_eq!(
            system.select_similar(&mut scene, &IslandId::new("Obj", [99]), mode),
            0
        );
    }

    #[test]
    fn test_auto_group() {
        let mut scene = Scene::from_mesh(quads(
            "Obj",
            &[(0.0, 0.25), (1.0, 0.25), (2.0, 0.5), (3.0, 0.5), (4.0, 0.1)],
        ));
        let options = StackOptions::default().with_threshold(0.0);
        let system = StackSystem::new(&scene, &options);
        assert_eq!(system.stacks().len(), 2);

        let all: Selection = system.islands().iter().map(Island::id).collect();
        let created = system.auto_group(&mut scene, "Obj", &options, &all).unwrap();
        assert_eq!(created, vec![1, 2]);

        let groups = &scene.object("Obj").unwrap().stack_groups;
        assert_eq!(groups.get(2).unwrap().name, "Similarity Group 2");
        assert_eq!(groups.get(1).unwrap().cached_island_count, 2);

        // Running again replaces the groups from the first run.
        let again = system.auto_group(&mut scene, "Obj", &options, &all).unwrap();
        assert_eq!(again, vec![1, 2]);
        assert_eq!(scene.object("Obj").unwrap().stack_groups.len(), 2);

        let big = options.clone().with_min_group_size(3);
        assert!(system.auto_group(&mut scene, "Obj", &big, &all).unwrap().is_empty());

        let one: Selection = [system.islands()[0].id()].into_iter().collect();
        assert!(system.auto_group(&mut scene, "Obj", &options, &one).is_err());
    }

    #[test]
    fn test_create_group_from_selection() {
        let mut scene = Scene::from_mesh(quads("Obj", &[(0.0, 0.25), (1.0, 0.25)]));
        let options = StackOptions::default();
        let system = StackSystem::new(&scene, &options);
        assert!(matches!(
            system.create_group(&mut scene, "Obj", &Selection::new(), None),
            Err(UvError::NoSelection)
        ));
        let all: Selection = system.islands().iter().map(Island::id).collect();
        let g = system.create_group(&mut scene, "Obj", &all, Some("Bolts")).unwrap();
        assert_eq!(system.group_islands(&scene, "Obj", g), vec![0, 1]);
        assert_eq!(system.stack_all_groups(&mut scene, &options, &Selection::new()), 1);
    }
}

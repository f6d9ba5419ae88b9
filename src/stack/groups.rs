//! User-defined stack groups.
//!
//! A [`StackGroup`] stores island identifiers as a JSON list in
//! `islands_data`:
//!
//! ```text
//! [{"object_name":"Cube","face_indices":[0,1,2]}, ...]
//! ```
//!
//! Entries are matched against live islands on every lookup. Entries whose
//! faces were renumbered by a topology edit stop matching and are skipped,
//! but stay in storage until the group is edited.

use serde::{Deserialize, Serialize};

use crate::error::{Result, UvError};
use crate::geom::color::{group_color, Rgb};
use crate::island::{Island, IslandId};

/// A named set of islands that should be stacked together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackGroup {
    /// Unique positive id within the owning object.
    pub group_id: u32,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: Rgb,
    /// JSON list of island identifiers.
    pub islands_data: String,
    /// Length of the stored list as of the last edit or refresh.
    pub cached_island_count: usize,
}

impl StackGroup {
    /// Create an empty group.
    pub fn new(group_id: u32, name: impl Into<String>, color: Rgb) -> Self {
        Self {
            group_id,
            name: name.into(),
            color,
            islands_data: "[]".to_string(),
            cached_island_count: 0,
        }
    }

    /// Parse the stored identifiers. An empty string reads as an empty list.
    pub fn stored_ids(&self) -> Result<Vec<IslandId>> {
        if self.islands_data.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&self.islands_data)?)
    }

    fn store(&mut self, ids: &[IslandId]) -> Result<()> {
        self.islands_data = serde_json::to_string(ids)?;
        self.cached_island_count = ids.len();
        Ok(())
    }
}

/// The stack groups of one object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StackGroups {
    groups: Vec<StackGroup>,
    active_index: usize,
    /// Ids created by the most recent automatic grouping.
    auto_created: Vec<u32>,
}

impl StackGroups {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Accessors ====================

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over groups in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &StackGroup> {
        self.groups.iter()
    }

    /// Look up a group by id.
    pub fn get(&self, group_id: u32) -> Option<&StackGroup> {
        self.groups.iter().find(|g| g.group_id == group_id)
    }

    fn get_mut(&mut self, group_id: u32) -> Result<&mut StackGroup> {
        if group_id == 0 {
            return Err(UvError::InvalidGroupId { group_id });
        }
        self.groups
            .iter_mut()
            .find(|g| g.group_id == group_id)
            .ok_or(UvError::GroupNotFound { group_id })
    }

    /// Index of the active group in the list.
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// The active group, if the list is not empty.
    pub fn active(&self) -> Option<&StackGroup> {
        self.groups.get(self.active_index)
    }

    /// Make the group at `index` active.
    pub fn set_active_index(&mut self, index: usize) -> Result<()> {
        if index >= self.groups.len() {
            return Err(UvError::invalid_param("index", index, "no group at this index"));
        }
        self.active_index = index;
        Ok(())
    }

    /// The id the next created group will get: one past the largest id, starting at 1.
    pub fn next_id(&self) -> u32 {
        self.groups.iter().map(|g| g.group_id).max().map_or(1, |m| m + 1)
    }

    // ==================== Editing ====================

    /// Create an empty group and make it active.
    ///
    /// The default name is `Group {id}`; the color hue steps by the golden
    /// ratio per id.
    pub fn create_group(&mut self, name: Option<&str>) -> u32 {
        let id = self.next_id();
        let name = name.map_or_else(|| format!("Group {}", id), str::to_string);
        self.groups.push(StackGroup::new(id, name, group_color(id)));
        self.active_index = self.groups.len() - 1;
        id
    }

    /// Append identifiers not already stored. Returns the stored count.
    ///
    /// Unparsable stored data is replaced.
    pub fn assign(&mut self, group_id: u32, ids: &[IslandId]) -> Result<usize> {
        let group = self.get_mut(group_id)?;
        let mut stored = group.stored_ids().unwrap_or_else(|e| {
            log::warn!("group {}: discarding unreadable island data: {}", group_id, e);
            Vec::new()
        });
        for id in ids {
            if !stored.contains(id) {
                stored.push(id.clone());
            }
        }
        group.store(&stored)?;
        Ok(stored.len())
    }

    /// Remove the first stored match of each identifier. Returns the stored count.
    pub fn remove(&mut self, group_id: u32, ids: &[IslandId]) -> Result<usize> {
        let group = self.get_mut(group_id)?;
        let mut stored = group.stored_ids()?;
        for id in ids {
            if let Some(pos) = stored.iter().position(|s| s == id) {
                stored.remove(pos);
            }
        }
        group.store(&stored)?;
        Ok(stored.len())
    }

    /// Indices into `islands` of the live islands of `object_name` stored in the group.
    ///
    /// Missing groups and unreadable data resolve to nothing.
    pub fn resolve(&self, group_id: u32, islands: &[Island], object_name: &str) -> Vec<usize> {
        let Some(group) = self.get(group_id) else {
            return Vec::new();
        };
        let stored = match group.stored_ids() {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("group {}: unreadable island data: {}", group_id, e);
                return Vec::new();
            }
        };
        islands
            .iter()
            .enumerate()
            .filter(|(_, island)| island.object_name() == object_name)
            .filter(|(_, island)| stored.contains(&island.id()))
            .map(|(i, _)| i)
            .collect()
    }

    /// Stored entry count of a group, 0 for missing groups or unreadable data.
    pub fn island_count(&self, group_id: u32) -> usize {
        self.get(group_id)
            .and_then(|g| g.stored_ids().ok())
            .map_or(0, |ids| ids.len())
    }

    /// Recompute every cached count from the stored list length.
    pub fn refresh_counts(&mut self) {
        for group in &mut self.groups {
            group.cached_island_count = group.stored_ids().map_or(0, |ids| ids.len());
        }
    }

    /// Delete a group by id.
    pub fn delete(&mut self, group_id: u32) -> Result<StackGroup> {
        let index = self
            .groups
            .iter()
            .position(|g| g.group_id == group_id)
            .ok_or(UvError::GroupNotFound { group_id })?;
        Ok(self.remove_at(index))
    }

    /// Delete the active group.
    pub fn delete_active(&mut self) -> Option<StackGroup> {
        (self.active_index < self.groups.len()).then(|| self.remove_at(self.active_index))
    }

    /// Delete every group whose cached count is below `min_size`.
    ///
    /// Returns the names of the removed groups.
    pub fn remove_small(&mut self, min_size: usize) -> Result<Vec<String>> {
        if min_size < 1 {
            return Err(UvError::invalid_param(
                "min_size",
                min_size,
                "minimum group size must be at least 1",
            ));
        }
        let mut removed = Vec::new();
        for index in (0..self.groups.len()).rev() {
            if self.groups[index].cached_island_count < min_size {
                removed.push(self.remove_at(index).name);
            }
        }
        removed.reverse();
        Ok(removed)
    }

    /// Delete all groups. Returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.groups.len();
        self.groups.clear();
        self.auto_created.clear();
        self.active_index = 0;
        count
    }

    // ==================== Automatic Grouping ====================

    /// Delete the groups created by the previous automatic grouping.
    pub fn clear_auto_groups(&mut self) {
        let created = std::mem::take(&mut self.auto_created);
        self.groups.retain(|g| !created.contains(&g.group_id));
        self.clamp_active();
    }

    /// Create the `ordinal`-th group of an automatic grouping run holding `ids`.
    ///
    /// Named `Similarity Group {ordinal + 1}`, with the hue stepped per ordinal.
    pub fn create_auto_group(&mut self, ordinal: u32, ids: &[IslandId]) -> Result<u32> {
        let id = self.next_id();
        let name = format!("Similarity Group {}", ordinal + 1);
        self.groups.push(StackGroup::new(id, name, group_color(ordinal)));
        self.auto_created.push(id);
        self.assign(id, ids)?;
        Ok(id)
    }

    fn remove_at(&mut self, index: usize) -> StackGroup {
        let group = self.groups.remove(index);
        self.auto_created.retain(|&id| id != group.group_id);
        self.clamp_active();
        group
    }

    fn clamp_active(&mut self) {
        if self.active_index >= self.groups.len() {
            self.active_index = self.groups.len().saturating_sub(1);
        }
    }
}

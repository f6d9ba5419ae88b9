//! Similarity clustering and master selection.

use crate::island::{Island, Selection};
use crate::scene::Scene;

/// Greedy clustering of `islands` by relative similarity-index distance.
///
/// Islands are visited in order; each unvisited island opens a cluster and
/// absorbs every later unvisited island within `threshold`. Clusters of a
/// single island are dropped. Returned clusters hold indices into `islands`,
/// in discovery order.
pub fn group_by_similarity(islands: &[Island], threshold: f64) -> Vec<Vec<usize>> {
    let all: Vec<usize> = (0..islands.len()).collect();
    group_members_by_similarity(islands, &all, threshold)
}

/// [`group_by_similarity`] restricted to the islands listed in `members`.
pub fn group_members_by_similarity(
    islands: &[Island],
    members: &[usize],
    threshold: f64,
) -> Vec<Vec<usize>> {
    let mut processed = vec![false; members.len()];
    let mut clusters = Vec::new();

    for a in 0..members.len() {
        if processed[a] {
            continue;
        }
        processed[a] = true;
        let first = &islands[members[a]];
        let mut cluster = vec![members[a]];

        for b in (a + 1)..members.len() {
            if !processed[b] && first.is_similar(&islands[members[b]], threshold) {
                processed[b] = true;
                cluster.push(members[b]);
            }
        }

        if cluster.len() >= 2 {
            log::debug!("stack {}: {} islands", clusters.len(), cluster.len());
            clusters.push(cluster);
        }
    }

    clusters
}

/// Partition `members` by exact similarity-index equality, in first-seen order.
///
/// Unlike [`group_by_similarity`] this keeps single-island groups.
pub fn group_by_exact_index(islands: &[Island], members: &[usize]) -> Vec<Vec<usize>> {
    let mut groups: Vec<(f64, Vec<usize>)> = Vec::new();
    for &i in members {
        let index = islands[i].sim_index();
        match groups.iter_mut().find(|(key, _)| *key == index) {
            Some((_, group)) => group.push(i),
            None => groups.push((index, vec![i])),
        }
    }
    groups.into_iter().map(|(_, group)| group).collect()
}

/// Merge parts that share an island, transitively.
///
/// A merged part takes the place of the earliest part it absorbed and holds
/// its islands in ascending order. Parts sharing nothing are returned as given.
pub fn merge_overlapping(parts: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    let mut merged: Vec<Vec<usize>> = Vec::new();
    for part in parts {
        let mut combined = part;
        let mut slot = None;
        let mut i = 0;
        while i < merged.len() {
            if merged[i].iter().any(|m| combined.contains(m)) {
                combined.extend(merged.remove(i));
                slot.get_or_insert(i);
            } else {
                i += 1;
            }
        }
        match slot {
            Some(slot) => {
                combined.sort_unstable();
                combined.dedup();
                merged.insert(slot, combined);
            }
            None => merged.push(combined),
        }
    }
    merged
}

/// Pick the master of a cluster.
///
/// The first member present in `selection` wins. Otherwise the member with
/// the lowest [`Island::distortion`] is chosen, keeping the earliest on ties;
/// members whose object is missing from `scene` count as infinitely
/// distorted. Returns `None` only for an empty cluster.
pub fn find_master(
    islands: &[Island],
    members: &[usize],
    selection: &Selection,
    scene: &Scene,
) -> Option<usize> {
    if let Some(&selected) = members
        .iter()
        .find(|&&i| selection.contains(&islands[i].id()))
    {
        return Some(selected);
    }

    let mut best: Option<(usize, f64)> = None;
    for &i in members {
        let island = &islands[i];
        let distortion = scene
            .mesh(island.object_name())
            .map(|mesh| island.distortion(mesh))
            .unwrap_or(f64::INFINITY);
        match best {
            Some((_, d)) if distortion >= d => {}
            _ => best = Some((i, distortion)),
        }
    }
    best.map(|(i, _)| i)
}

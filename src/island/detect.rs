//! UV island detection.
//!
//! An island is a maximal set of faces connected through edges whose UVs
//! agree on both sides. Meshes without a UV layer fall back to connectivity
//! across non-seam edges.

use std::collections::VecDeque;

use crate::mesh::{EdgeId, FaceId, LoopId, UvMesh};

/// Distance below which two UV coordinates are considered coincident.
pub const UV_EPSILON: f64 = 1e-6;

/// Split the faces accepted by `filter` into UV-connected islands.
///
/// Hidden faces are always skipped. Each island lists its faces in
/// ascending order; islands are ordered by their lowest face.
///
/// Falls back to [`seam_islands`] when the mesh has no UV layer.
pub fn detect_islands<F>(mesh: &UvMesh, filter: F) -> Vec<Vec<FaceId>>
where
    F: Fn(FaceId) -> bool,
{
    if mesh.has_uvs() {
        flood_fill(mesh, &filter, |l, m| uv_connected(mesh, l, m))
    } else {
        log::debug!("{}: no UV layer, splitting islands at seams", mesh.name());
        seam_islands(mesh, filter)
    }
}

/// Split the faces accepted by `filter` into islands connected across
/// non-seam edges.
pub fn seam_islands<F>(mesh: &UvMesh, filter: F) -> Vec<Vec<FaceId>>
where
    F: Fn(FaceId) -> bool,
{
    flood_fill(mesh, &filter, |l, _| !mesh.edge(mesh.loop_at(l).edge).seam)
}

/// Whether the two corners lying on the same edge agree on both UVs.
///
/// `l` and `m` must be loops of different faces whose outgoing edge is the
/// same mesh edge.
pub fn uv_connected(mesh: &UvMesh, l: LoopId, m: LoopId) -> bool {
    let l_next = mesh.loop_next(l);
    let m_next = mesh.loop_next(m);
    let coincident = |a: LoopId, b: LoopId| (mesh.uv(a) - mesh.uv(b)).norm() <= UV_EPSILON;

    if mesh.loop_at(l).vertex == mesh.loop_at(m).vertex {
        coincident(l, m) && coincident(l_next, m_next)
    } else {
        coincident(l, m_next) && coincident(l_next, m)
    }
}

fn flood_fill<F, C>(mesh: &UvMesh, filter: &F, connected: C) -> Vec<Vec<FaceId>>
where
    F: Fn(FaceId) -> bool,
    C: Fn(LoopId, LoopId) -> bool,
{
    let accepted = |f: FaceId| !mesh.face(f).hidden && filter(f);
    let mut visited = vec![false; mesh.num_faces()];
    let mut islands = Vec::new();

    for seed in mesh.face_ids() {
        if visited[seed.index()] || !accepted(seed) {
            continue;
        }

        let mut island = Vec::new();
        let mut queue = VecDeque::from([seed]);
        visited[seed.index()] = true;

        while let Some(f) = queue.pop_front() {
            island.push(f);
            for l in mesh.face_loops(f) {
                let e: EdgeId = mesh.loop_at(l).edge;
                for &g in mesh.edge_faces(e) {
                    if g == f || visited[g.index()] || !accepted(g) {
                        continue;
                    }
                    let Some(m) = mesh.face_loop_on_edge(g, e) else {
                        continue;
                    };
                    if connected(l, m) {
                        visited[g.index()] = true;
                        queue.push_back(g);
                    }
                }
            }
        }

        island.sort();
        islands.push(island);
    }

    islands
}

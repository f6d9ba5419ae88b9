//! Polygon mesh with per-corner UV coordinates.
//!
//! [`UvMesh`] stores faces as runs of *loops*. A loop is one corner of one
//! face: it knows its vertex, the edge leading to the next corner, its face,
//! and carries that corner's UV coordinate and UV selection flag. Two faces
//! sharing a vertex therefore hold separate UVs for it, which is what lets a
//! mesh be cut into UV islands without changing its 3D topology.
//!
//! # Structure
//!
//! - Loops of a face are stored contiguously; `next`/`prev` wrap within the run
//! - Each edge records the faces that use it and a seam flag
//! - Faces carry a 3D selection flag and a hidden flag
//!
//! Index based access through [`FaceId`] is checked with [`UvMesh::try_face`]
//! wherever a caller may hold ids from an earlier query; the panicking
//! accessors are for ids obtained from this mesh.

use nalgebra::{Point2, Point3, Vector2};

use super::index::{EdgeId, FaceId, LoopId, VertexId};

/// Angle reported for a UV corner whose adjacent UV edge has zero length.
pub const DEGENERATE_UV_ANGLE: f64 = 1e-5;

/// A vertex of the mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,
}

/// An undirected edge between two vertices.
#[derive(Debug, Clone)]
pub struct Edge {
    /// The two endpoints, in the order the edge was first seen.
    pub vertices: [VertexId; 2],

    /// Whether the edge is marked as a UV seam.
    pub seam: bool,

    /// Faces using this edge.
    pub(crate) faces: Vec<FaceId>,
}

/// One corner of a face.
#[derive(Debug, Clone)]
pub struct Loop {
    /// The vertex at this corner.
    pub vertex: VertexId,

    /// The edge from this corner to the next corner of the face.
    pub edge: EdgeId,

    /// The face this corner belongs to.
    pub face: FaceId,

    /// UV coordinate of this corner.
    pub uv: Point2<f64>,

    /// UV editor selection state of this corner.
    pub uv_select: bool,
}

/// A polygonal face.
#[derive(Debug, Clone)]
pub struct Face {
    pub(crate) first_loop: usize,
    pub(crate) len: usize,

    /// 3D selection state.
    pub select: bool,

    /// Hidden faces are ignored by island detection.
    pub hidden: bool,
}

impl Face {
    /// Number of corners of this face.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Faces always have at least three corners.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A named polygon mesh with a single UV layer.
#[derive(Debug, Clone, Default)]
pub struct UvMesh {
    name: String,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) loops: Vec<Loop>,
    pub(crate) faces: Vec<Face>,
    pub(crate) has_uvs: bool,
}

impl UvMesh {
    /// Create a new empty mesh.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    // ==================== Accessors ====================

    /// Name of the object owning this mesh.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the mesh.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of loops (face corners).
    #[inline]
    pub fn num_loops(&self) -> usize {
        self.loops.len()
    }

    /// Whether the mesh carries a UV layer.
    #[inline]
    pub fn has_uvs(&self) -> bool {
        self.has_uvs
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, v: VertexId) -> &Vertex {
        &self.vertices[v.index()]
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, e: EdgeId) -> &Edge {
        &self.edges[e.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, f: FaceId) -> &Face {
        &self.faces[f.index()]
    }

    /// Get a face by ID, or `None` if the id does not resolve in this mesh.
    #[inline]
    pub fn try_face(&self, f: FaceId) -> Option<&Face> {
        if f.is_valid() {
            self.faces.get(f.index())
        } else {
            None
        }
    }

    /// Get a loop by ID.
    #[inline]
    pub fn loop_at(&self, l: LoopId) -> &Loop {
        &self.loops[l.index()]
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> Point3<f64> {
        self.vertices[v.index()].position
    }

    /// UV coordinate of a loop.
    #[inline]
    pub fn uv(&self, l: LoopId) -> Point2<f64> {
        self.loops[l.index()].uv
    }

    /// Set the UV coordinate of a loop.
    #[inline]
    pub fn set_uv(&mut self, l: LoopId, uv: Point2<f64>) {
        self.loops[l.index()].uv = uv;
    }

    // ==================== Topology Queries ====================

    /// Next corner around the face.
    #[inline]
    pub fn loop_next(&self, l: LoopId) -> LoopId {
        let face = &self.faces[self.loops[l.index()].face.index()];
        let offset = l.index() - face.first_loop;
        LoopId::new(face.first_loop + (offset + 1) % face.len)
    }

    /// Previous corner around the face.
    #[inline]
    pub fn loop_prev(&self, l: LoopId) -> LoopId {
        let face = &self.faces[self.loops[l.index()].face.index()];
        let offset = l.index() - face.first_loop;
        LoopId::new(face.first_loop + (offset + face.len - 1) % face.len)
    }

    /// Faces using an edge.
    #[inline]
    pub fn edge_faces(&self, e: EdgeId) -> &[FaceId] {
        &self.edges[e.index()].faces
    }

    /// The loop of `f` whose outgoing edge is `e`, if any.
    pub fn face_loop_on_edge(&self, f: FaceId, e: EdgeId) -> Option<LoopId> {
        self.face_loops(f).find(|&l| self.loops[l.index()].edge == e)
    }

    // ==================== Iteration ====================

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// Iterate over all loop IDs.
    pub fn loop_ids(&self) -> impl Iterator<Item = LoopId> {
        (0..self.loops.len()).map(LoopId::new)
    }

    /// Iterate over the corners of a face in winding order.
    pub fn face_loops(&self, f: FaceId) -> impl Iterator<Item = LoopId> {
        let face = &self.faces[f.index()];
        (face.first_loop..face.first_loop + face.len).map(LoopId::new)
    }

    /// Iterate over the vertices of a face in winding order.
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.face_loops(f).map(move |l| self.loops[l.index()].vertex)
    }

    /// Iterate over the edges of a face in winding order.
    pub fn face_edges(&self, f: FaceId) -> impl Iterator<Item = EdgeId> + '_ {
        self.face_loops(f).map(move |l| self.loops[l.index()].edge)
    }

    // ==================== Geometry ====================

    /// 3D area of a face.
    ///
    /// Uses the Newell normal, so planar n-gons of either winding are handled.
    pub fn face_area(&self, f: FaceId) -> f64 {
        let points: Vec<Point3<f64>> = self.face_vertices(f).map(|v| self.position(v)).collect();
        let n = points.len();
        let mut normal = nalgebra::Vector3::zeros();
        for i in 0..n {
            let a = points[i].coords;
            let b = points[(i + 1) % n].coords;
            normal += a.cross(&b);
        }
        normal.norm() * 0.5
    }

    /// 3D length of an edge.
    pub fn edge_length(&self, e: EdgeId) -> f64 {
        let [a, b] = self.edges[e.index()].vertices;
        (self.position(b) - self.position(a)).norm()
    }

    /// Interior 3D angle at a corner.
    pub fn loop_angle(&self, l: LoopId) -> f64 {
        let p = self.position(self.loops[l.index()].vertex);
        let next = self.position(self.loops[self.loop_next(l).index()].vertex);
        let prev = self.position(self.loops[self.loop_prev(l).index()].vertex);
        let a = next - p;
        let b = prev - p;
        if a.norm_squared() == 0.0 || b.norm_squared() == 0.0 {
            return 0.0;
        }
        a.angle(&b)
    }

    /// Interior UV angle at a corner.
    ///
    /// Returns [`DEGENERATE_UV_ANGLE`] when either adjacent UV edge collapses.
    pub fn loop_uv_angle(&self, l: LoopId) -> f64 {
        let uv = self.uv(l);
        let a = self.uv(self.loop_next(l)) - uv;
        let b = self.uv(self.loop_prev(l)) - uv;
        match (normalized(a), normalized(b)) {
            (Some(a), Some(b)) => a.dot(&b).clamp(-1.0, 1.0).acos(),
            _ => DEGENERATE_UV_ANGLE,
        }
    }

    /// Signed-area magnitude of a face in UV space (shoelace formula).
    pub fn face_uv_area(&self, f: FaceId) -> f64 {
        let uvs: Vec<Point2<f64>> = self.face_loops(f).map(|l| self.uv(l)).collect();
        let n = uvs.len();
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += uvs[i].x * uvs[j].y - uvs[j].x * uvs[i].y;
        }
        area.abs() * 0.5
    }

    /// Lengths of the two diagonals of a quad face, or `None` for other faces.
    pub fn quad_diagonals(&self, f: FaceId) -> Option<(f64, f64)> {
        let verts: Vec<VertexId> = self.face_vertices(f).collect();
        if verts.len() != 4 {
            return None;
        }
        let d0 = (self.position(verts[0]) - self.position(verts[2])).norm();
        let d1 = (self.position(verts[1]) - self.position(verts[3])).norm();
        Some((d0, d1))
    }

    // ==================== Selection ====================

    /// Set the 3D selection state of a face.
    pub fn set_face_select(&mut self, f: FaceId, select: bool) {
        self.faces[f.index()].select = select;
    }

    /// Set the UV selection state of every corner of a face.
    pub fn set_face_uv_select(&mut self, f: FaceId, select: bool) {
        let face = &self.faces[f.index()];
        for l in &mut self.loops[face.first_loop..face.first_loop + face.len] {
            l.uv_select = select;
        }
    }

    /// Set the UV selection state of one corner.
    pub fn set_loop_uv_select(&mut self, l: LoopId, select: bool) {
        self.loops[l.index()].uv_select = select;
    }

    /// Select or deselect every face and corner.
    pub fn select_all(&mut self, select: bool) {
        for face in &mut self.faces {
            face.select = select;
        }
        for l in &mut self.loops {
            l.uv_select = select;
        }
    }

    /// Hide or reveal a face.
    pub fn set_face_hidden(&mut self, f: FaceId, hidden: bool) {
        self.faces[f.index()].hidden = hidden;
    }

    /// Mark or clear an edge as a UV seam.
    pub fn set_seam(&mut self, e: EdgeId, seam: bool) {
        self.edges[e.index()].seam = seam;
    }

    // ==================== Validation ====================

    /// Check internal consistency of loop, edge and face references.
    pub fn is_valid(&self) -> bool {
        for (fi, face) in self.faces.iter().enumerate() {
            if face.len < 3 || face.first_loop + face.len > self.loops.len() {
                return false;
            }
            for l in &self.loops[face.first_loop..face.first_loop + face.len] {
                if l.face.index() != fi || l.vertex.index() >= self.vertices.len() {
                    return false;
                }
                match self.edges.get(l.edge.index()) {
                    Some(edge) if edge.faces.contains(&FaceId::new(fi)) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

fn normalized(v: Vector2<f64>) -> Option<Vector2<f64>> {
    let n = v.norm();
    if n > 0.0 {
        Some(v / n)
    } else {
        None
    }
}

//! Core mesh data structures.
//!
//! This module provides [`UvMesh`], a polygon mesh whose faces are made of
//! loops (face corners) that each carry a UV coordinate.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`EdgeId`] - Identifies an undirected edge
//! - [`FaceId`] - Identifies a face
//! - [`LoopId`] - Identifies one corner of one face
//!
//! # Construction
//!
//! Meshes are constructed from file I/O or from face-vertex lists:
//!
//! ```
//! use trimstack::mesh::build_from_polygons;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![vec![0, 1, 2]];
//!
//! let mesh = build_from_polygons("Tri", &positions, &faces, None).unwrap();
//! assert_eq!(mesh.num_faces(), 1);
//! ```

mod builder;
mod index;
mod uvmesh;

pub use builder::{build_from_polygons, to_polygons};
pub use index::{EdgeId, FaceId, LoopId, MeshIndex, VertexId};
pub use uvmesh::{Edge, Face, Loop, UvMesh, Vertex, DEGENERATE_UV_ANGLE};

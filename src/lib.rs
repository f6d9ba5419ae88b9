//! # Trimstack
//!
//! UV island stacking and hotspot trimsheet mapping for polygon meshes.
//!
//! Trimstack finds UV islands that are copies of each other and stacks them
//! onto a single master island, and maps islands onto the rectangular
//! regions ("trims") of a trimsheet texture by shape and size.
//!
//! ## Features
//!
//! - **UV mesh**: polygon faces with per-corner UVs, seams and selection flags
//! - **Island fingerprints**: topology counts plus a similarity index built
//!   from area, perimeter and diagonals
//! - **Stacking**: similarity clustering, master selection, rotation and
//!   scale policies, persistent stack groups
//! - **Hotspot mapping**: two-stage trim matching by aspect, area or
//!   real-world size, nine-anchor fitting, seeded variation
//! - **Trimsheets**: trim collections with SVG export and import
//! - **File formats**: Wavefront OBJ with UVs
//!
//! ## Quick Start
//!
//! ```no_run
//! use trimstack::prelude::*;
//!
//! let mesh = trimstack::io::load("props.obj").unwrap();
//! let mut scene = Scene::from_mesh(mesh);
//!
//! // Stack every set of identical islands.
//! let options = StackOptions::default();
//! let system = StackSystem::new(&scene, &options);
//! let moved = system.stack_all(&mut scene, &options, &Selection::new());
//! println!("stacked {} islands", moved);
//!
//! // Map the selected islands onto a trimsheet.
//! let sheet = Trimsheet::from_trims(load_svg("sheet.svg").unwrap());
//! let report = run_hotspot(&mut scene, &sheet, &HotspotOptions::default()).unwrap();
//! println!("fitted {}/{}", report.islands_fitted, report.islands_processed);
//!
//! for mesh in scene.into_meshes() {
//!     trimstack::io::save(&mesh, format!("{}.obj", mesh.name())).unwrap();
//! }
//! ```
//!
//! ## Islands as Views
//!
//! Islands never own mesh data. An [`island::Island`] is an object name and
//! a sorted face list, resolved against the [`scene::Scene`] each time it is
//! used; an [`island::IslandId`] is the same pair in persistent form.
//! Selection is passed explicitly as a set of ids:
//!
//! ```
//! use trimstack::prelude::*;
//!
//! let mut selection = Selection::new();
//! selection.insert(IslandId::new("Cube", [3, 1, 2]));
//! assert!(selection.contains(&IslandId::new("Cube", [1, 2, 3])));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use nalgebra;

pub mod error;
pub mod geom;
pub mod hotspot;
pub mod io;
pub mod island;
pub mod mesh;
pub mod scene;
pub mod stack;
pub mod trim;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use trimstack::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Result, UvError};
    pub use crate::geom::BoundingBox2d;
    pub use crate::hotspot::{
        fit_selection_to_trim, run_hotspot, Alignment, AreaMatch, FitMode, FitOptions, HotspotOptions,
        HotspotReport, MatchPriority,
    };
    pub use crate::island::{Fingerprint, Island, IslandId, Selection, SelectionMode};
    pub use crate::mesh::{build_from_polygons, EdgeId, FaceId, LoopId, UvMesh, VertexId};
    pub use crate::scene::{Scene, SceneObject};
    pub use crate::stack::{RotationMode, ScaleMode, StackGroups, StackOptions, StackSystem};
    pub use crate::trim::{load_svg, save_svg, Trim, Trimsheet};
}

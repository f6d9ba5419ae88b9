//! Error types for trimstack.
//!
//! This module defines all error types used throughout the library.
//!
//! Not every failure is an error: stale face indices and degenerate islands
//! are recovered where they occur (skipped, or given infinite distortion) and
//! only reported through `log`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`UvError`].
pub type Result<T> = std::result::Result<T, UvError>;

/// Errors that can occur during UV operations.
#[derive(Error, Debug)]
pub enum UvError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three corners or repeats a vertex.
    #[error("face {face} is degenerate (fewer than 3 corners or duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A face was given a different number of UVs than it has corners.
    #[error("face {face} has {expected} corners but {found} UV coordinates")]
    UvCountMismatch {
        /// The face index.
        face: usize,
        /// Number of corners.
        expected: usize,
        /// Number of UVs supplied.
        found: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading a file.
    #[error("failed to load {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving a file.
    #[error("failed to save {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// The operation needs selected geometry and none was selected.
    #[error("nothing selected")]
    NoSelection,

    /// No trims are available to the operation.
    #[error("no trims available")]
    NoTrims,

    /// No object with the given name exists in the scene.
    #[error("object not found: {name}")]
    ObjectNotFound {
        /// The object name.
        name: String,
    },

    /// No stack group with the given id exists on the object.
    #[error("stack group {group_id} not found")]
    GroupNotFound {
        /// The group id.
        group_id: u32,
    },

    /// Group id 0 is reserved for "ungrouped".
    #[error("invalid stack group id {group_id}")]
    InvalidGroupId {
        /// The group id.
        group_id: u32,
    },

    /// The stored island list of a stack group could not be parsed.
    #[error("invalid stack group data: {0}")]
    InvalidGroupData(#[from] serde_json::Error),

    /// Malformed SVG input.
    #[error("svg error: {message}")]
    Svg {
        /// Error message.
        message: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl UvError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        UvError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an SVG error from any displayable message.
    pub(crate) fn svg<T: std::fmt::Display>(message: T) -> Self {
        UvError::Svg {
            message: message.to_string(),
        }
    }
}

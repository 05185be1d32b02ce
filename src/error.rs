//! Error type for fallible (structural) operations
//!
//! Geometry itself never fails: degenerate input is "no collision" and broken
//! preconditions are assertions. Errors only come from the body-part arena
//! (bad handles, bad tree edits) and from loading configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::boss::PartId;

#[derive(Error, Debug)]
pub enum BlammoError {
    // Body part tree errors
    #[error("Unknown or stale body part handle: {0}")]
    UnknownPart(PartId),

    #[error("Body part {0} is not a composite")]
    NotAComposite(PartId),

    #[error("Body part {0} has no bounds (not a leaf or weakpoint)")]
    NotALeaf(PartId),

    #[error("Body part {0} is not a weakpoint")]
    NotAWeakpoint(PartId),

    #[error("Body part {part} is already a child of {parent}")]
    AlreadyAttached { part: PartId, parent: PartId },

    #[error("Attaching {child} under {parent} would create a cycle")]
    WouldCreateCycle { parent: PartId, child: PartId },

    // Config errors
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    InvalidConfig(String),
}

/// Result type alias for all fallible operations
pub type BlammoResult<T> = Result<T, BlammoError>;

//! Error Types
//!
//! This module defines the error types used by the render binding layer.
//!
//! # Overview
//!
//! Most of the binding layer never fails: a layer, asset or entity that cannot
//! be found right now is simply skipped and picked up again on the next
//! notification. [`RenderableError`] only covers the entry points where the
//! caller hands over a value that can be checked on the spot:
//! - Parsing a render type name
//! - Mutating the asset registry with an unknown id
//! - Looking up components and nodes through the [`RenderSystem`](crate::system::RenderSystem)
//! - Inserting a layer whose id is already taken
//!
//! # Usage
//!
//! ```rust,ignore
//! use myth_renderable::errors::{RenderableError, Result};
//!
//! fn configure(system: &mut RenderSystem) -> Result<()> {
//!     let kind: RenderType = "box".parse()?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::assets::{AssetId, AssetKind};
use crate::layers::LayerId;

/// The main error type for the render binding layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderableError {
    // ========================================================================
    // Component Configuration Errors
    // ========================================================================
    /// The given string does not name a render type.
    #[error("Unknown render type: {0:?}")]
    UnknownRenderType(String),

    /// The component key is stale or was never issued.
    #[error("Render component not found")]
    ComponentNotFound,

    /// The node handle is stale or was never issued.
    #[error("Scene node not found")]
    NodeNotFound,

    // ========================================================================
    // Asset Registry Errors
    // ========================================================================
    /// The requested asset is not registered.
    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    /// The asset exists but carries a different kind of payload.
    #[error("Asset {id} is a {found:?} asset, expected {expected:?}")]
    AssetKindMismatch {
        /// The offending asset
        id: AssetId,
        /// The kind the operation needs
        expected: AssetKind,
        /// The kind that was registered
        found: AssetKind,
    },

    // ========================================================================
    // Layer Errors
    // ========================================================================
    /// A layer with the same id already exists in the composition.
    #[error("Layer {0} already exists in the composition")]
    DuplicateLayer(LayerId),
}

/// Alias for `Result<T, RenderableError>`.
pub type Result<T> = std::result::Result<T, RenderableError>;

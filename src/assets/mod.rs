//! Asset subsystem interface
//!
//! The binding layer never loads anything itself. It talks to an
//! [`AssetRegistry`] that:
//! - knows which assets exist and whether their payload is resident
//! - accepts load requests, completed later by an external loader
//! - queues add / load / change / remove / unload notifications
//! - routes those notifications to the [`AssetReference`]s bound to each id

pub mod asset;
pub mod reference;
pub mod registry;

pub use asset::{Asset, AssetId, AssetKind, AssetPayload, RenderData};
pub use reference::{
    AssetReference, AssetReferenceHandler, ReferenceSlot, ResolveAssetId, dispatch_asset_event,
};
pub use registry::{AssetEvent, AssetEventKind, AssetListener, AssetRegistry};

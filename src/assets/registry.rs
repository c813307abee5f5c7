use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::assets::asset::{Asset, AssetId, AssetKind, AssetPayload, RenderData};
use crate::assets::reference::ReferenceSlot;
use crate::component::RenderComponentKey;
use crate::errors::{RenderableError, Result};
use crate::resources::Geometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetEventKind {
    /// The asset became known to the registry (not necessarily loaded).
    Added,
    /// The payload is available.
    Loaded,
    /// A loaded render asset had its mesh list replaced.
    Changed,
    /// The asset was unregistered.
    Removed,
    /// The payload was evicted; the asset is still registered.
    Unloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetEvent {
    pub id: AssetId,
    pub kind: AssetEventKind,
}

/// One bound asset reference: which component, which of its slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetListener {
    pub component: RenderComponentKey,
    pub slot: ReferenceSlot,
}

/// Asset registry.
///
/// Every mutation queues an [`AssetEvent`]; nothing is delivered until the
/// owner drains the queue (see [`RenderSystem::process_events`](crate::system::RenderSystem::process_events)).
/// Load requests are recorded for an external loader, which completes them
/// with [`finish_load`](Self::finish_load).
#[derive(Debug, Default)]
pub struct AssetRegistry {
    assets: FxHashMap<AssetId, Asset>,
    next_id: u32,

    listeners: FxHashMap<AssetId, SmallVec<[AssetListener; 2]>>,

    pending: VecDeque<AssetEvent>,
    load_requests: Vec<AssetId>,
}

impl AssetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Allocates an id not used by any registered asset.
    pub fn reserve_id(&mut self) -> AssetId {
        loop {
            let id = AssetId(self.next_id.max(1));
            self.next_id = id.0 + 1;
            if !self.assets.contains_key(&id) {
                return id;
            }
        }
    }

    /// Registers an unloaded asset under a fresh id.
    pub fn create(&mut self, name: &str, kind: AssetKind) -> AssetId {
        let id = self.reserve_id();
        self.add(Asset::new(id, name, kind));
        id
    }

    /// Registers `asset` under its own id, replacing any previous entry.
    pub fn add(&mut self, asset: Asset) -> AssetId {
        let id = asset.id();
        let loaded = asset.is_loaded();
        if self.assets.insert(id, asset).is_some() {
            log::warn!("Asset {id} registered twice, replacing the previous entry");
        }
        self.queue(id, AssetEventKind::Added);
        if loaded {
            self.queue(id, AssetEventKind::Loaded);
        }
        id
    }

    /// Unregisters an asset. Bound references keep their id and pick the
    /// asset up again if it is re-added.
    pub fn remove(&mut self, id: AssetId) -> Option<Asset> {
        let asset = self.assets.remove(&id)?;
        self.load_requests.retain(|&r| r != id);
        self.queue(id, AssetEventKind::Removed);
        Some(asset)
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[must_use]
    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: AssetId) -> bool {
        self.assets.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Requests the payload. Already loaded assets re-announce `Loaded`;
    /// assets already in flight are not requested twice.
    pub fn load(&mut self, id: AssetId) {
        let Some(asset) = self.assets.get_mut(&id) else {
            return;
        };
        if asset.is_loaded() {
            self.queue(id, AssetEventKind::Loaded);
            return;
        }
        if asset.loading {
            return;
        }
        asset.loading = true;
        log::debug!("Load requested for asset {id} ({})", asset.name);
        self.load_requests.push(id);
    }

    /// Load requests issued since the last call, in request order.
    pub fn take_load_requests(&mut self) -> Vec<AssetId> {
        std::mem::take(&mut self.load_requests)
    }

    #[must_use]
    pub fn is_load_requested(&self, id: AssetId) -> bool {
        self.assets.get(&id).is_some_and(Asset::is_loading)
    }

    /// Completes a load with the payload produced by the loader.
    pub fn finish_load(&mut self, id: AssetId, payload: impl Into<AssetPayload>) -> Result<()> {
        let payload = payload.into();
        let asset = self
            .assets
            .get_mut(&id)
            .ok_or(RenderableError::AssetNotFound(id))?;
        if asset.kind() != payload.kind() {
            return Err(RenderableError::AssetKindMismatch {
                id,
                expected: asset.kind(),
                found: payload.kind(),
            });
        }
        asset.resource = Some(payload);
        asset.loading = false;
        self.load_requests.retain(|&r| r != id);
        self.queue(id, AssetEventKind::Loaded);
        Ok(())
    }

    /// Replaces the meshes of a loaded render asset.
    pub fn set_render_meshes(&mut self, id: AssetId, meshes: Vec<Arc<Geometry>>) -> Result<()> {
        let asset = self
            .assets
            .get_mut(&id)
            .ok_or(RenderableError::AssetNotFound(id))?;
        if asset.kind() != AssetKind::Render {
            return Err(RenderableError::AssetKindMismatch {
                id,
                expected: AssetKind::Render,
                found: asset.kind(),
            });
        }
        let was_loaded = asset.is_loaded();
        asset.resource = Some(AssetPayload::Render(RenderData::new(meshes)));
        asset.loading = false;
        self.queue(
            id,
            if was_loaded {
                AssetEventKind::Changed
            } else {
                AssetEventKind::Loaded
            },
        );
        Ok(())
    }

    /// Evicts the payload, keeping the asset registered.
    pub fn unload(&mut self, id: AssetId) -> Result<()> {
        let asset = self
            .assets
            .get_mut(&id)
            .ok_or(RenderableError::AssetNotFound(id))?;
        asset.loading = false;
        if asset.resource.take().is_some() {
            self.queue(id, AssetEventKind::Unloaded);
        }
        Ok(())
    }

    // ========================================================================
    // Listeners & Events
    // ========================================================================

    pub fn subscribe(&mut self, id: AssetId, listener: AssetListener) {
        let list = self.listeners.entry(id).or_default();
        if !list.contains(&listener) {
            list.push(listener);
        }
    }

    pub fn unsubscribe(&mut self, id: AssetId, listener: AssetListener) {
        if let Some(list) = self.listeners.get_mut(&id) {
            list.retain(|l| *l != listener);
            if list.is_empty() {
                self.listeners.remove(&id);
            }
        }
    }

    #[must_use]
    pub fn listeners(&self, id: AssetId) -> &[AssetListener] {
        self.listeners
            .get(&id)
            .map(SmallVec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of bound references across all assets.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(SmallVec::len).sum()
    }

    #[must_use]
    pub fn has_pending_events(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pop_event(&mut self) -> Option<AssetEvent> {
        self.pending.pop_front()
    }

    fn queue(&mut self, id: AssetId, kind: AssetEventKind) {
        self.pending.push_back(AssetEvent { id, kind });
    }
}

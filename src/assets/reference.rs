//! Asset references.
//!
//! An [`AssetReference`] is a component's named pointer to an asset id. Setting
//! the id unbinds from the previous asset and binds to the new one in the
//! registry; from then on the registry routes that asset's notifications back
//! to the owning component through [`AssetReferenceHandler`]. References never
//! poll.

use crate::assets::asset::{Asset, AssetId};
use crate::assets::registry::{AssetEventKind, AssetListener, AssetRegistry};
use crate::component::RenderComponentKey;

/// Which of a component's references an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceSlot {
    /// The render payload asset.
    Render,
    /// A material slot, by index.
    Material(usize),
}

/// Per-notification callbacks of an asset reference owner.
pub trait AssetReferenceHandler<C: ?Sized> {
    fn on_asset_added(&mut self, slot: ReferenceSlot, ctx: &mut C);
    fn on_asset_loaded(&mut self, slot: ReferenceSlot, ctx: &mut C);
    fn on_asset_changed(&mut self, slot: ReferenceSlot, ctx: &mut C);
    fn on_asset_removed(&mut self, slot: ReferenceSlot, ctx: &mut C);
    fn on_asset_unloaded(&mut self, slot: ReferenceSlot, ctx: &mut C);
}

/// Routes one notification kind to the matching handler method.
pub fn dispatch_asset_event<C: ?Sized, H: AssetReferenceHandler<C> + ?Sized>(
    handler: &mut H,
    slot: ReferenceSlot,
    kind: AssetEventKind,
    ctx: &mut C,
) {
    match kind {
        AssetEventKind::Added => handler.on_asset_added(slot, ctx),
        AssetEventKind::Loaded => handler.on_asset_loaded(slot, ctx),
        AssetEventKind::Changed => handler.on_asset_changed(slot, ctx),
        AssetEventKind::Removed => handler.on_asset_removed(slot, ctx),
        AssetEventKind::Unloaded => handler.on_asset_unloaded(slot, ctx),
    }
}

#[derive(Debug, Clone)]
pub struct AssetReference {
    owner: RenderComponentKey,
    slot: ReferenceSlot,
    id: Option<AssetId>,
}

impl AssetReference {
    #[must_use]
    pub fn new(owner: RenderComponentKey, slot: ReferenceSlot) -> Self {
        Self {
            owner,
            slot,
            id: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<AssetId> {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn slot(&self) -> ReferenceSlot {
        self.slot
    }

    /// Rebinds to `id` (`None` clears). No-op when unchanged.
    pub fn set_id(&mut self, id: Option<AssetId>, registry: &mut AssetRegistry) {
        if self.id == id {
            return;
        }
        let listener = self.listener();
        if let Some(old) = self.id.take() {
            registry.unsubscribe(old, listener);
        }
        if let Some(new) = id {
            registry.subscribe(new, listener);
        }
        self.id = id;
    }

    /// The referenced asset, if it is registered right now.
    #[must_use]
    pub fn asset<'r>(&self, registry: &'r AssetRegistry) -> Option<&'r Asset> {
        self.id.and_then(|id| registry.get(id))
    }

    #[must_use]
    pub fn is_loaded(&self, registry: &AssetRegistry) -> bool {
        self.asset(registry).is_some_and(Asset::is_loaded)
    }

    /// Does a notification for `id` still concern this reference?
    #[inline]
    #[must_use]
    pub fn matches(&self, id: AssetId) -> bool {
        self.id == Some(id)
    }

    fn listener(&self) -> AssetListener {
        AssetListener {
            component: self.owner,
            slot: self.slot,
        }
    }
}

/// Anything that names an asset: an id, a cleared id, or the asset itself.
pub trait ResolveAssetId {
    fn asset_id(self) -> Option<AssetId>;
}

impl ResolveAssetId for AssetId {
    #[inline]
    fn asset_id(self) -> Option<AssetId> {
        Some(self)
    }
}

impl ResolveAssetId for Option<AssetId> {
    #[inline]
    fn asset_id(self) -> Option<AssetId> {
        self
    }
}

impl ResolveAssetId for &Asset {
    #[inline]
    fn asset_id(self) -> Option<AssetId> {
        Some(self.id())
    }
}

impl ResolveAssetId for Option<&Asset> {
    #[inline]
    fn asset_id(self) -> Option<AssetId> {
        self.map(Asset::id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetKind;
    use slotmap::KeyData;

    fn owner() -> RenderComponentKey {
        RenderComponentKey::from(KeyData::from_ffi(1))
    }

    #[test]
    fn test_set_id_moves_subscription() {
        let mut registry = AssetRegistry::new();
        let a = registry.create("A", AssetKind::Render);
        let b = registry.create("B", AssetKind::Render);
        let mut reference = AssetReference::new(owner(), ReferenceSlot::Render);

        reference.set_id(Some(a), &mut registry);
        assert_eq!(registry.listeners(a).len(), 1);

        reference.set_id(Some(b), &mut registry);
        assert!(registry.listeners(a).is_empty());
        assert_eq!(registry.listeners(b).len(), 1);

        reference.set_id(None, &mut registry);
        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn test_reference_to_unregistered_id_is_inert() {
        let mut registry = AssetRegistry::new();
        let mut reference = AssetReference::new(owner(), ReferenceSlot::Material(0));
        reference.set_id(Some(AssetId(42)), &mut registry);
        assert!(reference.asset(&registry).is_none());
        assert!(!reference.is_loaded(&registry));
        assert!(reference.matches(AssetId(42)));
    }
}

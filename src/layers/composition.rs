use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashSet;

use crate::component::RenderComponentKey;
use crate::errors::{RenderableError, Result};
use crate::layers::layer::{Layer, LayerId};

static NEXT_COMPOSITION_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a composition, used to tell a replaced container from the
/// current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositionId(u32);

/// Container-level notifications.
#[derive(Debug)]
pub enum LayerEvent {
    Added(LayerId),
    /// The layer has already left the composition; subscribers get to clean
    /// their instances out of it before it is dropped.
    Removed(Layer),
}

/// Ordered set of render layers plus the components listening to it.
#[derive(Debug)]
pub struct LayerComposition {
    id: CompositionId,
    pub name: String,
    layers: Vec<Layer>,

    subscribers: FxHashSet<RenderComponentKey>,
    pending: VecDeque<LayerEvent>,
}

impl LayerComposition {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: CompositionId(NEXT_COMPOSITION_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.to_string(),
            layers: Vec::new(),
            subscribers: FxHashSet::default(),
            pending: VecDeque::new(),
        }
    }

    /// The engine's standard layer stack.
    #[must_use]
    pub fn with_default_layers() -> Self {
        let mut composition = Self::new("Default");
        composition.layers = vec![
            Layer::new(LayerId::WORLD, "World"),
            Layer::new(LayerId::DEPTH, "Depth"),
            Layer::new(LayerId::SKYBOX, "Skybox"),
            Layer::new(LayerId::IMMEDIATE, "Immediate"),
            Layer::new(LayerId::UI, "UI"),
        ];
        composition
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> CompositionId {
        self.id
    }

    // ========================================================================
    // Layers
    // ========================================================================

    pub fn push_layer(&mut self, layer: Layer) -> Result<()> {
        let index = self.layers.len();
        self.insert_layer(index, layer)
    }

    pub fn insert_layer(&mut self, index: usize, layer: Layer) -> Result<()> {
        let id = layer.id();
        if self.get_layer_by_id(id).is_some() {
            return Err(RenderableError::DuplicateLayer(id));
        }
        self.layers.insert(index.min(self.layers.len()), layer);
        self.pending.push_back(LayerEvent::Added(id));
        Ok(())
    }

    /// Takes the layer out of the composition; returns whether it existed.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let Some(index) = self.layers.iter().position(|l| l.id() == id) else {
            return false;
        };
        let layer = self.layers.remove(index);
        self.pending.push_back(LayerEvent::Removed(layer));
        true
    }

    #[must_use]
    pub fn get_layer_by_id(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn get_layer_by_id_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    // ========================================================================
    // Subscribers & Events
    // ========================================================================

    pub fn subscribe(&mut self, key: RenderComponentKey) {
        self.subscribers.insert(key);
    }

    pub fn unsubscribe(&mut self, key: RenderComponentKey) {
        self.subscribers.remove(&key);
    }

    #[must_use]
    pub fn is_subscribed(&self, key: RenderComponentKey) -> bool {
        self.subscribers.contains(&key)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Snapshot of the current subscribers.
    #[must_use]
    pub fn subscribers(&self) -> Vec<RenderComponentKey> {
        self.subscribers.iter().copied().collect()
    }

    pub fn pop_event(&mut self) -> Option<LayerEvent> {
        self.pending.pop_front()
    }

    #[must_use]
    pub fn has_pending_events(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl Default for LayerComposition {
    fn default() -> Self {
        Self::with_default_layers()
    }
}

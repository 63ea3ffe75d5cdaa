//! Rendering surface contract and generation-stamped screen handles.

use std::collections::BTreeMap;
use std::sync::Arc;

use derive_more::Display;
use tracing::{debug, instrument};

use super::Widget;

/// Render pass counter; bumped by every [`Surface::clear`].
pub type Generation = u64;

/// Stable handle of a node on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("#{}", _0)]
pub struct NodeId(pub u64);

/// Owner of the element tree.
///
/// Every mutating call names the generation it was issued for and is
/// ignored once the surface has moved on, so continuations of a superseded
/// render cannot touch the visible screen.
pub trait Surface: Send + Sync + std::fmt::Debug {
    /// Removes everything and starts a new generation.
    fn clear(&self) -> Generation;
    /// Current generation.
    fn generation(&self) -> Generation;
    /// Appends `widget` under `parent` (or at the root).
    fn append(&self, generation: Generation, parent: Option<NodeId>, widget: Widget)
    -> Option<NodeId>;
    /// Swaps the widget of `node`, keeping its place in the tree.
    fn replace(&self, generation: Generation, node: NodeId, widget: Widget) -> bool;
    /// Removes `node` and its subtree.
    fn remove(&self, generation: Generation, node: NodeId) -> bool;
    /// Whether `node` is currently attached.
    fn contains(&self, node: NodeId) -> bool;
    /// Sets the value of an input node.
    fn set_value(&self, generation: Generation, node: NodeId, value: &str) -> bool;
    /// Values of all inputs below `node`, keyed by field name.
    fn form_values(&self, node: NodeId) -> BTreeMap<String, String>;
}

/// Handle given to a render function: appends to the surface for one
/// render pass only, below an optional root node.
#[derive(Debug, Clone)]
pub struct Screen {
    surface: Arc<dyn Surface>,
    generation: Generation,
    root: Option<NodeId>,
}

impl Screen {
    /// Binds to the current generation of `surface`.
    pub fn current(surface: Arc<dyn Surface>) -> Self {
        let generation = surface.generation();
        Self {
            surface,
            generation,
            root: None,
        }
    }

    /// Same render pass, appending below `node` by default.
    pub fn within(&self, node: NodeId) -> Self {
        Self {
            surface: self.surface.clone(),
            generation: self.generation,
            root: Some(node),
        }
    }

    /// Node [`Screen::add`] appends to.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Generation this screen was rendered in.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// False once a later render cleared the surface.
    pub fn is_attached(&self) -> bool {
        self.surface.generation() == self.generation
    }

    /// Appends below the root of this screen.
    pub fn add(&self, widget: Widget) -> Option<NodeId> {
        self.add_to(self.root, widget)
    }

    /// Appends below `parent`.
    #[instrument(level = "trace", skip(self, widget), fields(kind = ?widget.kind))]
    pub fn add_to(&self, parent: Option<NodeId>, widget: Widget) -> Option<NodeId> {
        let node = self.surface.append(self.generation, parent, widget);
        if node.is_none() {
            debug!(generation = self.generation, "Append on detached screen ignored");
        }
        node
    }

    /// Replaces the widget of `node`.
    pub fn replace(&self, node: NodeId, widget: Widget) -> bool {
        self.surface.replace(self.generation, node, widget)
    }

    /// Removes `node`.
    pub fn remove(&self, node: NodeId) -> bool {
        self.surface.remove(self.generation, node)
    }

    /// Whether `node` is still on this screen.
    pub fn contains(&self, node: NodeId) -> bool {
        self.is_attached() && self.surface.contains(node)
    }

    /// Input values below `node`.
    pub fn form_values(&self, node: NodeId) -> BTreeMap<String, String> {
        if !self.is_attached() {
            return BTreeMap::new();
        }
        self.surface.form_values(node)
    }
}

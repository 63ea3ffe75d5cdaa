//! In-memory arena surface.
//!
//! Nodes live in a map keyed by [`NodeId`]; parents and children refer to
//! each other by id only. Used by the terminal front end and by tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use tracing::{instrument, trace};

use super::{Action, Generation, InputType, NodeId, Surface, Widget, WidgetKind};

#[derive(Debug, Clone)]
struct Node {
    widget: Widget,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    value: String,
}

#[derive(Debug, Default)]
struct Tree {
    generation: Generation,
    next_id: u64,
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
}

impl Tree {
    fn insert(&mut self, parent: Option<NodeId>, mut widget: Widget) -> NodeId {
        let children = std::mem::take(&mut widget.children);
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(
            id,
            Node {
                widget,
                parent,
                children: Vec::new(),
                value: String::new(),
            },
        );
        for child in children {
            let child_id = self.insert(Some(id), child);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.children.push(child_id);
            }
        }
        id
    }

    fn drop_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.drop_subtree(child);
            }
        }
    }

    fn walk(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        if let Some(node) = self.nodes.get(&id) {
            for child in &node.children {
                self.walk(*child, out);
            }
        }
    }

    fn document_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.walk(*root, &mut out);
        }
        out
    }
}

/// One rendered span of an [`OutlineLine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineSpan {
    /// Node the span shows.
    pub node: NodeId,
    /// Display text.
    pub text: String,
    /// Clickable or editable.
    pub focusable: bool,
    /// Styling tags of the node.
    pub classes: Vec<String>,
}

/// One line of the flattened surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineLine {
    /// Nesting depth.
    pub depth: usize,
    /// Spans laid out left to right.
    pub spans: Vec<OutlineSpan>,
}

/// [`Surface`] backed by an in-memory arena.
#[derive(Debug, Default)]
pub struct MemorySurface {
    tree: Mutex<Tree>,
}

impl MemorySurface {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Widget of `node`, without children.
    pub fn widget(&self, node: NodeId) -> Option<Widget> {
        self.tree().nodes.get(&node).map(|n| n.widget.clone())
    }

    /// Text of `node`.
    pub fn text_of(&self, node: NodeId) -> Option<String> {
        self.tree().nodes.get(&node).and_then(|n| n.widget.text.clone())
    }

    /// Action of `node`.
    pub fn action_of(&self, node: NodeId) -> Option<Action> {
        self.tree().nodes.get(&node).map(|n| n.widget.action.clone())
    }

    /// Current value of an input node.
    pub fn value_of(&self, node: NodeId) -> Option<String> {
        self.tree().nodes.get(&node).map(|n| n.value.clone())
    }

    /// Children of `node` in order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree()
            .nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Number of attached nodes.
    pub fn len(&self) -> usize {
        self.tree().nodes.len()
    }

    /// True when nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.tree().nodes.is_empty()
    }

    /// Nodes carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        self.find(|w| w.has_class(class))
    }

    /// Nodes whose widget satisfies `predicate`, in document order.
    pub fn find(&self, predicate: impl Fn(&Widget) -> bool) -> Vec<NodeId> {
        let tree = self.tree();
        tree.document_order()
            .into_iter()
            .filter(|id| tree.nodes.get(id).is_some_and(|n| predicate(&n.widget)))
            .collect()
    }

    /// First interactive node labelled exactly `label`.
    pub fn find_clickable(&self, label: &str) -> Option<NodeId> {
        self.find(|w| w.action.is_interactive() && w.text.as_deref() == Some(label))
            .into_iter()
            .next()
    }

    /// Whether any node's text contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        !self
            .find(|w| w.text.as_deref().is_some_and(|t| t.contains(needle)))
            .is_empty()
    }

    /// Flattens the tree into lines for text display.
    ///
    /// Rows, banners and board rows render their children inline; other
    /// containers only contribute indentation.
    #[instrument(level = "trace", skip(self))]
    pub fn outline(&self) -> Vec<OutlineLine> {
        let tree = self.tree();
        let mut lines = Vec::new();
        for root in &tree.roots {
            outline_node(&tree, *root, 0, &mut lines);
        }
        lines
    }
}

fn span_for(node_id: NodeId, node: &Node) -> OutlineSpan {
    let w = &node.widget;
    let text = match &w.kind {
        WidgetKind::Input { input_type, .. } => {
            let shown = match input_type {
                InputType::Password => "*".repeat(node.value.chars().count()),
                _ => node.value.clone(),
            };
            format!("{}: [{}]", w.text.as_deref().unwrap_or(""), shown)
        }
        WidgetKind::Cell { .. } => match w.text.as_deref() {
            Some(icon) => format!("[{}]", icon.to_uppercase()),
            None => "[ ]".to_string(),
        },
        WidgetKind::Button => format!("<{}>", w.text.as_deref().unwrap_or("")),
        WidgetKind::Heading(level) => format!(
            "{} {}",
            "#".repeat(*level as usize),
            w.text.as_deref().unwrap_or("")
        ),
        WidgetKind::Separator => format!("── {} ──", w.text.as_deref().unwrap_or("")),
        WidgetKind::Icon => format!("({})", w.text.as_deref().unwrap_or("")),
        _ => w.text.clone().unwrap_or_default(),
    };
    OutlineSpan {
        node: node_id,
        text,
        focusable: w.action.is_interactive() || matches!(w.kind, WidgetKind::Input { .. }),
        classes: w.classes.clone(),
    }
}

fn inline_spans(tree: &Tree, id: NodeId, spans: &mut Vec<OutlineSpan>) {
    let Some(node) = tree.nodes.get(&id) else {
        return;
    };
    if node.widget.text.is_some() || node.widget.action.is_interactive() {
        spans.push(span_for(id, node));
    }
    for child in &node.children {
        inline_spans(tree, *child, spans);
    }
}

fn outline_node(tree: &Tree, id: NodeId, depth: usize, lines: &mut Vec<OutlineLine>) {
    let Some(node) = tree.nodes.get(&id) else {
        return;
    };
    match node.widget.kind {
        WidgetKind::Row | WidgetKind::Banner(_) => {
            let mut spans = Vec::new();
            inline_spans(tree, id, &mut spans);
            if !spans.is_empty() {
                lines.push(OutlineLine { depth, spans });
            }
        }
        _ => {
            let shows_self = node.widget.text.is_some()
                || node.widget.action.is_interactive()
                || matches!(node.widget.kind, WidgetKind::Input { .. });
            if shows_self {
                lines.push(OutlineLine {
                    depth,
                    spans: vec![span_for(id, node)],
                });
            }
            let child_depth = if shows_self { depth + 1 } else { depth };
            for child in &node.children {
                outline_node(tree, *child, child_depth, lines);
            }
        }
    }
}

impl Surface for MemorySurface {
    fn clear(&self) -> Generation {
        let mut tree = self.tree();
        tree.nodes.clear();
        tree.roots.clear();
        tree.generation += 1;
        trace!(generation = tree.generation, "Surface cleared");
        tree.generation
    }

    fn generation(&self) -> Generation {
        self.tree().generation
    }

    fn append(
        &self,
        generation: Generation,
        parent: Option<NodeId>,
        widget: Widget,
    ) -> Option<NodeId> {
        let mut tree = self.tree();
        if tree.generation != generation {
            return None;
        }
        match parent {
            None => {
                let id = tree.insert(None, widget);
                tree.roots.push(id);
                Some(id)
            }
            Some(p) => {
                if !tree.nodes.contains_key(&p) {
                    return None;
                }
                let id = tree.insert(Some(p), widget);
                if let Some(node) = tree.nodes.get_mut(&p) {
                    node.children.push(id);
                }
                Some(id)
            }
        }
    }

    fn replace(&self, generation: Generation, node: NodeId, mut widget: Widget) -> bool {
        let mut tree = self.tree();
        if tree.generation != generation {
            return false;
        }
        let Some(old_children) = tree.nodes.get(&node).map(|n| n.children.clone()) else {
            return false;
        };
        for child in old_children {
            tree.drop_subtree(child);
        }
        let new_children = std::mem::take(&mut widget.children);
        if let Some(n) = tree.nodes.get_mut(&node) {
            n.widget = widget;
            n.children.clear();
        }
        for child in new_children {
            let child_id = tree.insert(Some(node), child);
            if let Some(n) = tree.nodes.get_mut(&node) {
                n.children.push(child_id);
            }
        }
        true
    }

    fn remove(&self, generation: Generation, node: NodeId) -> bool {
        let mut tree = self.tree();
        if tree.generation != generation {
            return false;
        }
        let Some(parent) = tree.nodes.get(&node).map(|n| n.parent) else {
            return false;
        };
        match parent {
            Some(p) => {
                if let Some(n) = tree.nodes.get_mut(&p) {
                    n.children.retain(|c| *c != node);
                }
            }
            None => tree.roots.retain(|r| *r != node),
        }
        tree.drop_subtree(node);
        true
    }

    fn contains(&self, node: NodeId) -> bool {
        self.tree().nodes.contains_key(&node)
    }

    fn set_value(&self, generation: Generation, node: NodeId, value: &str) -> bool {
        let mut tree = self.tree();
        if tree.generation != generation {
            return false;
        }
        match tree.nodes.get_mut(&node) {
            Some(n) if matches!(n.widget.kind, WidgetKind::Input { .. }) => {
                n.value = value.to_string();
                true
            }
            _ => false,
        }
    }

    fn form_values(&self, node: NodeId) -> BTreeMap<String, String> {
        let tree = self.tree();
        let mut ids = Vec::new();
        tree.walk(node, &mut ids);
        ids.into_iter()
            .filter_map(|id| tree.nodes.get(&id))
            .filter_map(|n| match &n.widget.kind {
                WidgetKind::Input { name, .. } => Some((name.clone(), n.value.clone())),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Screen;
    use std::sync::Arc;

    #[test]
    fn test_detached_screen_is_noop() {
        let surface = Arc::new(MemorySurface::new());
        surface.clear();
        let screen = Screen::current(surface.clone());
        let node = screen.add(Widget::text("first")).unwrap();
        surface.clear();
        assert!(!screen.is_attached());
        assert!(screen.add(Widget::text("late")).is_none());
        assert!(!screen.replace(node, Widget::text("late")));
        assert!(surface.is_empty());
    }

    #[test]
    fn test_replace_keeps_position_and_swaps_children() {
        let surface = Arc::new(MemorySurface::new());
        let screen = Screen::current(surface.clone());
        let parent = screen
            .add(Widget::container([Widget::text("a"), Widget::text("b")]))
            .unwrap();
        let first = surface.children(parent)[0];
        assert!(screen.replace(first, Widget::text("c")));
        let texts: Vec<_> = surface
            .children(parent)
            .into_iter()
            .filter_map(|n| surface.text_of(n))
            .collect();
        assert_eq!(texts, ["c", "b"]);
    }

    #[test]
    fn test_remove_drops_subtree() {
        let surface = Arc::new(MemorySurface::new());
        let screen = Screen::current(surface.clone());
        let parent = screen
            .add(Widget::container([Widget::text("a")]))
            .unwrap();
        assert_eq!(surface.len(), 2);
        assert!(screen.remove(parent));
        assert!(surface.is_empty());
    }

    #[test]
    fn test_form_values_and_outline() {
        let surface = Arc::new(MemorySurface::new());
        let screen = Screen::current(surface.clone());
        let form = screen
            .add(Widget::form([
                Widget::input("username", "Username", InputType::Text),
                Widget::input("password", "Password", InputType::Password),
            ]))
            .unwrap();
        let inputs = surface.children(form);
        assert!(surface.set_value(screen.generation(), inputs[0], "alice"));
        assert!(surface.set_value(screen.generation(), inputs[1], "pw"));

        let values = screen.form_values(form);
        assert_eq!(values.get("username").map(String::as_str), Some("alice"));

        let outline = surface.outline();
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[1].spans[0].text, "Password: [**]");
        assert!(outline[0].spans[0].focusable);
    }
}

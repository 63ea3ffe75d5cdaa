//! Declarative widgets and their click actions.
//!
//! A small set of concrete widget kinds plus builder functions. Screens
//! compose these; the rendering surface decides how they look.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::router::StateId;

/// Async closure run when an [`Action::Invoke`] widget is clicked.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>);

impl Callback {
    /// Wraps an async closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self(Arc::new(move || f().boxed()))
    }

    /// Starts the callback.
    pub fn invoke(&self) -> BoxFuture<'static, ()> {
        (self.0)()
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// What a click on a widget does.
#[derive(Debug, Clone, Default)]
pub enum Action {
    /// Navigate to a registered state.
    NavigateTo(StateId),
    /// Run a callback.
    Invoke(Callback),
    /// Resolve and navigate to a client URL.
    NavigateToUrl(String),
    /// Not clickable.
    #[default]
    Disabled,
}

impl Action {
    /// Shorthand for [`Action::Invoke`].
    pub fn invoke<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::Invoke(Callback::new(f))
    }

    /// True unless [`Action::Disabled`].
    pub fn is_interactive(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// Banner flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    /// Something failed.
    Error,
    /// Informational notice.
    Info,
}

/// Input field flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// Free text.
    Text,
    /// Masked text.
    Password,
    /// E-mail address.
    Email,
    /// Whole number.
    Number,
}

/// Concrete widget kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetKind {
    /// Generic block.
    Container,
    /// Children laid out side by side.
    Row,
    /// Children stacked.
    Column,
    /// Page header.
    Header,
    /// Page body.
    Main,
    /// Page footer.
    Footer,
    /// Card holding a screen's content.
    Tile,
    /// Heading of the given level.
    Heading(u8),
    /// Plain text.
    Text,
    /// Button.
    Button,
    /// Inline link.
    Link,
    /// Named icon.
    Icon,
    /// Form field.
    Input {
        /// Field name used in form values.
        name: String,
        /// Field flavour.
        input_type: InputType,
    },
    /// Groups inputs.
    Form,
    /// Dismissable notice; its children are the offered actions.
    Banner(BannerKind),
    /// One board tile.
    Cell {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },
    /// Horizontal rule with optional label.
    Separator,
}

/// One node of a declarative view tree.
#[derive(Debug, Clone)]
pub struct Widget {
    /// Widget kind.
    pub kind: WidgetKind,
    /// Label or content.
    pub text: Option<String>,
    /// Styling tags.
    pub classes: Vec<String>,
    /// Click behaviour.
    pub action: Action,
    /// Child widgets.
    pub children: Vec<Widget>,
}

impl Widget {
    /// Bare widget of `kind`.
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            text: None,
            classes: Vec::new(),
            action: Action::Disabled,
            children: Vec::new(),
        }
    }

    /// Generic block holding `children`.
    pub fn container(children: impl IntoIterator<Item = Widget>) -> Self {
        Self::new(WidgetKind::Container).with_children(children)
    }

    /// Side by side layout.
    pub fn row(children: impl IntoIterator<Item = Widget>) -> Self {
        Self::new(WidgetKind::Row).with_children(children)
    }

    /// Stacked layout.
    pub fn column(children: impl IntoIterator<Item = Widget>) -> Self {
        Self::new(WidgetKind::Column).with_children(children)
    }

    /// Page body.
    pub fn main(children: impl IntoIterator<Item = Widget>) -> Self {
        Self::new(WidgetKind::Main).with_children(children)
    }

    /// Card.
    pub fn tile(children: impl IntoIterator<Item = Widget>) -> Self {
        Self::new(WidgetKind::Tile).with_children(children)
    }

    /// Heading.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Heading(level)).with_text(text)
    }

    /// Plain text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Text).with_text(text)
    }

    /// Button.
    pub fn button(label: impl Into<String>, action: Action) -> Self {
        Self::new(WidgetKind::Button)
            .with_text(label)
            .with_action(action)
            .class("button")
    }

    /// Emphasised button.
    pub fn primary_button(label: impl Into<String>, action: Action) -> Self {
        Self::button(label, action).class("primary")
    }

    /// Inline link.
    pub fn link(label: impl Into<String>, action: Action) -> Self {
        Self::new(WidgetKind::Link)
            .with_text(label)
            .with_action(action)
    }

    /// Named icon.
    pub fn icon(name: impl Into<String>) -> Self {
        Self::new(WidgetKind::Icon).with_text(name)
    }

    /// Form field.
    pub fn input(name: impl Into<String>, label: impl Into<String>, input_type: InputType) -> Self {
        Self::new(WidgetKind::Input {
            name: name.into(),
            input_type,
        })
        .with_text(label)
    }

    /// Form.
    pub fn form(children: impl IntoIterator<Item = Widget>) -> Self {
        Self::new(WidgetKind::Form).with_children(children)
    }

    /// Separator with an optional caption.
    pub fn separator(caption: Option<&str>) -> Self {
        let widget = Self::new(WidgetKind::Separator);
        match caption {
            Some(c) => widget.with_text(c),
            None => widget,
        }
    }

    /// Sets the text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the action.
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Appends children.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Widget>) -> Self {
        self.children.extend(children);
        self
    }

    /// Appends one child.
    pub fn child(mut self, child: Widget) -> Self {
        self.children.push(child);
        self
    }

    /// Adds a styling tag.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Checks for a styling tag.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

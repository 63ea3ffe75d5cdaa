//! Rendering surface contract, widgets and the in-memory surface.

mod memory;
mod surface;
mod widget;

pub use memory::{MemorySurface, OutlineLine, OutlineSpan};
pub use surface::{Generation, NodeId, Screen, Surface};
pub use widget::{Action, BannerKind, Callback, InputType, Widget, WidgetKind};

//! Widgets: selectable items, icons, tooltips and the selector dropdown.

mod icon;
mod item;
mod selector;
mod tooltip;

pub use icon::*;
pub use item::*;
pub use selector::*;
pub use tooltip::*;

//! Selector dropdowns and hover tooltips for a production-calculator UI,
//! retained as an ECS node tree.
//!
//! `bevy_prodcalc_ui` lets you:
//! - build [`Selector`] dropdowns whose option list is generated on first open,
//! - attach lazily-built [`Tooltip`] popups to any node,
//! - render [`SelectableItem`]s as sprite-sheet icons,
//! - drive everything from window input through [`ProdcalcUiPlugin`].
//!
//! # Minimal setup
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bevy_prodcalc_ui::{
//!     ItemRef, ProdcalcUiPlugin, SelectableItem, append_child, bevy_app::App,
//!     ensure_document_body, init_logging, make_simple_dropdown, selection_callback,
//! };
//!
//! struct Belt(&'static str);
//!
//! impl SelectableItem for Belt {
//!     fn name(&self) -> &str {
//!         self.0
//!     }
//! }
//!
//! init_logging();
//!
//! let mut app = App::new();
//! app.add_plugins(ProdcalcUiPlugin);
//!
//! let belts: Vec<ItemRef> = vec![
//!     Arc::new(Belt("transport-belt")),
//!     Arc::new(Belt("fast-transport-belt")),
//! ];
//! let world = app.world_mut();
//! let selector = make_simple_dropdown(
//!     world,
//!     None,
//!     belts.clone(),
//!     belts[0].clone(),
//!     Some(selection_callback(|_world, changed| {
//!         println!("picked {}", changed.item.name());
//!     })),
//!     None,
//! );
//! let body = ensure_document_body(world);
//! append_child(world, body, selector.node());
//!
//! app.update();
//! ```
#![forbid(unsafe_code)]

pub mod controls;
pub mod ecs;
pub mod events;
pub mod input;
pub mod logging;
pub mod overlay;
pub mod plugin;
pub mod popup;
pub mod settings;
pub mod templates;

pub use bevy_app;
pub use bevy_ecs;
pub use bevy_input;
pub use bevy_math;
pub use bevy_window;

pub use controls::*;
pub use ecs::*;
pub use events::*;
pub use input::*;
pub use logging::*;
pub use overlay::*;
pub use plugin::*;
pub use popup::*;
pub use settings::*;
pub use templates::*;

pub mod prelude {
    pub use crate::{
        IconOptions, ItemRef, ProdcalcUiPlugin, SelectableItem, SelectionChanged, Selector,
        SelectorConfig, Tooltip, TooltipConfig, TooltipSupport, UiEventQueue, WidgetSettings,
        content_generator, make_simple_dropdown, render_icon, selection_callback,
        selector_content,
    };
}

#[cfg(test)]
mod tests;

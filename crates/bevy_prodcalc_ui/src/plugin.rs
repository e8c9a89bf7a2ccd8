use bevy_app::{App, Plugin, PreUpdate, Update};
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_input::mouse::MouseButtonInput;
use bevy_window::{CursorLeft, CursorMoved, WindowResized};

use crate::{
    controls::{SpriteSheet, despawn_orphaned_tooltips},
    events::UiEventQueue,
    input::{PointerState, inject_window_pointer_input},
    overlay::handle_pointer_actions,
    popup::UiViewport,
    settings::WidgetSettings,
};

/// Bevy plugin wiring window input into selector and tooltip widgets.
///
/// An existing [`WidgetSettings`] or [`SpriteSheet`] resource is kept.
#[derive(Default)]
pub struct ProdcalcUiPlugin;

impl Plugin for ProdcalcUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiEventQueue>()
            .init_resource::<WidgetSettings>()
            .init_resource::<UiViewport>()
            .init_resource::<PointerState>()
            .init_resource::<SpriteSheet>()
            .add_message::<CursorMoved>()
            .add_message::<CursorLeft>()
            .add_message::<MouseButtonInput>()
            .add_message::<WindowResized>()
            .add_systems(PreUpdate, inject_window_pointer_input)
            .add_systems(
                Update,
                (handle_pointer_actions, despawn_orphaned_tooltips).chain(),
            );
    }
}

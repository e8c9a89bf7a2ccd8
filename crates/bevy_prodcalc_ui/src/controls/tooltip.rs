use std::{fmt, sync::Arc};

use bevy_ecs::{entity::Entity, prelude::*};

use crate::{
    ecs::{StyleClass, UiNode},
    popup::PositionedPopup,
    settings::PopupOptions,
    templates::{
        append_child, despawn_node_tree, detach_node, ensure_document_body, parent_of,
        replace_children, set_hidden, spawn_node,
    },
};

/// Produces a fresh content node for a tooltip each time it is invoked.
pub type ContentGenerator = Arc<dyn Fn(&mut World) -> Entity + Send + Sync>;

/// Wrap a closure as a [`ContentGenerator`].
#[must_use]
pub fn content_generator(
    generate: impl Fn(&mut World) -> Entity + Send + Sync + 'static,
) -> ContentGenerator {
    Arc::new(generate)
}

/// Reference surfaces carrying this marker ignore hover-enter.
///
/// An open selector sets it on its root so its tooltip cannot cover the list.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuppressTooltips;

/// Marker on the `div.tooltip` frame node of a materialized tooltip popup.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipFrame {
    pub tooltip: Entity,
}

/// Nodes of a materialized tooltip popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooltipPopup {
    pub frame: Entity,
    pub content: Entity,
}

/// Hover-driven floating panel bound to a reference surface.
///
/// The popup is built on the first show and reused afterwards; hiding only
/// toggles visibility.
#[derive(Component)]
pub struct UiTooltip {
    pub reference: Entity,
    pub anchor: Entity,
    pub container: Entity,
    pub options: PopupOptions,
    is_open: bool,
    content_generator: ContentGenerator,
    popup: Option<TooltipPopup>,
}

impl fmt::Debug for UiTooltip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiTooltip")
            .field("reference", &self.reference)
            .field("anchor", &self.anchor)
            .field("container", &self.container)
            .field("is_open", &self.is_open)
            .field("popup", &self.popup)
            .finish_non_exhaustive()
    }
}

/// Construction parameters for [`Tooltip::spawn`].
#[derive(Clone)]
pub struct TooltipConfig {
    pub reference: Entity,
    pub content_generator: ContentGenerator,
    /// Node the popup is positioned against. Defaults to `reference`.
    pub anchor: Option<Entity>,
    /// Node the popup is inserted into. Defaults to the document body.
    pub container: Option<Entity>,
    pub options: PopupOptions,
}

impl TooltipConfig {
    #[must_use]
    pub fn new(reference: Entity, content_generator: ContentGenerator) -> Self {
        Self {
            reference,
            content_generator,
            anchor: None,
            container: None,
            options: PopupOptions::default(),
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<Option<Entity>>) -> Self {
        self.anchor = anchor.into();
        self
    }

    #[must_use]
    pub fn with_container(mut self, container: impl Into<Option<Entity>>) -> Self {
        self.container = container.into();
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: PopupOptions) -> Self {
        self.options = options;
        self
    }
}

/// Handle to a tooltip entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tooltip(Entity);

impl Tooltip {
    /// Create a tooltip. Nothing is rendered until the first [`Tooltip::show`].
    pub fn spawn(world: &mut World, config: TooltipConfig) -> Self {
        let container = match config.container {
            Some(container) => container,
            None => ensure_document_body(world),
        };

        let entity = world
            .spawn(UiTooltip {
                reference: config.reference,
                anchor: config.anchor.unwrap_or(config.reference),
                container,
                options: config.options,
                is_open: false,
                content_generator: config.content_generator,
                popup: None,
            })
            .id();

        tracing::debug!(tooltip = ?entity, reference = ?config.reference, "tooltip created");
        Self(entity)
    }

    #[must_use]
    pub fn entity(self) -> Entity {
        self.0
    }

    #[must_use]
    pub fn exists(self, world: &World) -> bool {
        world.get::<UiTooltip>(self.0).is_some()
    }

    /// All tooltips whose hover surface is `reference`.
    #[must_use]
    pub fn for_reference(world: &mut World, reference: Entity) -> Vec<Self> {
        let mut query = world.query::<(Entity, &UiTooltip)>();
        query
            .iter(world)
            .filter_map(|(entity, tooltip)| (tooltip.reference == reference).then_some(Self(entity)))
            .collect()
    }

    #[must_use]
    pub fn is_open(self, world: &World) -> bool {
        world
            .get::<UiTooltip>(self.0)
            .is_some_and(|tooltip| tooltip.is_open)
    }

    #[must_use]
    pub fn reference(self, world: &World) -> Option<Entity> {
        world.get::<UiTooltip>(self.0).map(|tooltip| tooltip.reference)
    }

    /// The `div.tooltip` frame, once the popup has been built.
    #[must_use]
    pub fn popup_node(self, world: &World) -> Option<Entity> {
        world
            .get::<UiTooltip>(self.0)
            .and_then(|tooltip| tooltip.popup)
            .map(|popup| popup.frame)
    }

    #[must_use]
    pub fn content_node(self, world: &World) -> Option<Entity> {
        world
            .get::<UiTooltip>(self.0)
            .and_then(|tooltip| tooltip.popup)
            .map(|popup| popup.content)
    }

    pub fn show(self, world: &mut World) {
        let Some(tooltip) = world.get::<UiTooltip>(self.0) else {
            return;
        };
        if tooltip.is_open {
            return;
        }
        let popup = tooltip.popup;

        match popup {
            None => self.create_popup(world),
            Some(popup) => {
                if world.get_entity(popup.frame).is_err() {
                    tracing::trace!(tooltip = ?self.0, "popup frame destroyed with its container");
                    return;
                }
                set_hidden(world, popup.frame, false);
                PositionedPopup::update(world, popup.frame);
            }
        }

        if let Some(mut tooltip) = world.get_mut::<UiTooltip>(self.0) {
            tooltip.is_open = true;
        }
        tracing::trace!(tooltip = ?self.0, "tooltip shown");
    }

    pub fn hide(self, world: &mut World) {
        let Some(mut tooltip) = world.get_mut::<UiTooltip>(self.0) else {
            return;
        };
        if !tooltip.is_open {
            return;
        }

        tooltip.is_open = false;
        let popup = tooltip.popup;
        drop(tooltip);
        if let Some(popup) = popup {
            set_hidden(world, popup.frame, true);
        }
        tracing::trace!(tooltip = ?self.0, "tooltip hidden");
    }

    fn create_popup(self, world: &mut World) {
        let Some(tooltip) = world.get::<UiTooltip>(self.0) else {
            return;
        };
        let generate = tooltip.content_generator.clone();
        let anchor = tooltip.anchor;
        let container = tooltip.container;
        let options = tooltip.options;

        let frame = spawn_node(
            world,
            None,
            (
                UiNode::Div,
                StyleClass::new("tooltip"),
                TooltipFrame { tooltip: self.0 },
            ),
        );
        let content = generate(world);
        append_child(world, frame, content);

        PositionedPopup::attach(world, frame, anchor, options);
        append_child(world, container, frame);

        if let Some(mut tooltip) = world.get_mut::<UiTooltip>(self.0) {
            tooltip.popup = Some(TooltipPopup { frame, content });
        }
        tracing::debug!(tooltip = ?self.0, ?frame, "tooltip popup built");
    }

    /// Swap the content generator.
    ///
    /// A popup that already exists has its content replaced in place and is
    /// re-positioned; its frame is kept.
    pub fn update_content_generator(self, world: &mut World, content_generator: ContentGenerator) {
        let Some(popup) = world.get::<UiTooltip>(self.0).map(|tooltip| tooltip.popup) else {
            return;
        };

        if let Some(popup) = popup
            && world.get_entity(popup.frame).is_ok()
        {
            let content = content_generator(world);
            replace_children(world, popup.frame, content);
            PositionedPopup::update(world, popup.frame);

            if let Some(mut tooltip) = world.get_mut::<UiTooltip>(self.0) {
                tooltip.popup = Some(TooltipPopup {
                    frame: popup.frame,
                    content,
                });
            }
        }

        if let Some(mut tooltip) = world.get_mut::<UiTooltip>(self.0) {
            tooltip.content_generator = content_generator;
        }
    }

    /// Remove the popup frame from its parent, if the popup was ever built.
    pub fn detach_popup(self, world: &mut World) -> bool {
        match self.popup_node(world) {
            Some(frame) if parent_of(world, frame).is_some() => detach_node(world, frame),
            _ => false,
        }
    }

    /// Destroy the tooltip together with its popup nodes.
    pub fn destroy(self, world: &mut World) {
        if let Some(frame) = self.popup_node(world)
            && world.get_entity(frame).is_ok()
        {
            despawn_node_tree(world, frame);
        }
        let _ = world.despawn(self.0);
        tracing::debug!(tooltip = ?self.0, "tooltip destroyed");
    }
}

/// Route a hover transition on `reference` to the tooltips bound to it.
pub fn handle_tooltip_hover(world: &mut World, reference: Entity, entered: bool) {
    let suppressed = world.get::<SuppressTooltips>(reference).is_some();
    for tooltip in Tooltip::for_reference(world, reference) {
        if entered {
            if suppressed {
                tracing::trace!(?reference, "hover ignored while tooltips are suppressed");
                continue;
            }
            tooltip.show(world);
        } else {
            tooltip.hide(world);
        }
    }
}

/// Destroy tooltips whose reference surface no longer exists.
pub fn despawn_orphaned_tooltips(world: &mut World) {
    let orphans = {
        let mut query = world.query::<(Entity, &UiTooltip)>();
        query
            .iter(world)
            .filter_map(|(entity, tooltip)| {
                world
                    .get_entity(tooltip.reference)
                    .is_err()
                    .then_some(Tooltip(entity))
            })
            .collect::<Vec<_>>()
    };

    for tooltip in orphans {
        tooltip.destroy(world);
    }
}

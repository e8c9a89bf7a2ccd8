//! Anchored placement for floating panels.
//!
//! Coordinates are window space with the origin at the top-left corner and `y`
//! growing downwards.

use bevy_ecs::{entity::Entity, prelude::*};
use bevy_math::{Rect, Vec2};

use crate::{
    ecs::{LayoutRect, PreferredSize, UiLabel},
    settings::{PopupOptions, PopupPlacement},
    templates::descendants_of,
};

const ESTIMATED_FONT_SIZE: f32 = 14.0;
const ESTIMATED_LINE_HEIGHT: f32 = ESTIMATED_FONT_SIZE * 1.4;
const PANEL_PADDING: f32 = 6.0;

/// Size of the window area popups must stay inside.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct UiViewport {
    pub size: Vec2,
}

impl Default for UiViewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

impl UiViewport {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
        }
    }
}

/// Placement state of a floating panel anchored to another node.
///
/// Lives on the panel entity. [`PositionedPopup::update`] recomputes the
/// panel's [`LayoutRect`] from the anchor's current bounds and the panel's
/// measured size.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PositionedPopup {
    pub anchor: Entity,
    pub options: PopupOptions,
    /// Side actually used by the last update, after flipping.
    pub placement: PopupPlacement,
    pub origin: Vec2,
}

impl PositionedPopup {
    /// Bind `panel` to `anchor` and place it immediately.
    pub fn attach(world: &mut World, panel: Entity, anchor: Entity, options: PopupOptions) {
        let Ok(mut entity) = world.get_entity_mut(panel) else {
            return;
        };

        entity.insert(PositionedPopup {
            anchor,
            options,
            placement: options.placement,
            origin: Vec2::ZERO,
        });
        Self::update(world, panel);
    }

    /// Recompute placement after the anchor moved or the content changed.
    ///
    /// Calling this repeatedly with unchanged anchor and content yields the same
    /// result.
    pub fn update(world: &mut World, panel: Entity) {
        let Some(popup) = world.get::<PositionedPopup>(panel).copied() else {
            return;
        };

        let anchor_rect = world
            .get::<LayoutRect>(popup.anchor)
            .map(|rect| rect.0)
            .unwrap_or_else(|| Rect::from_corners(Vec2::ZERO, Vec2::ZERO));
        let size = measure_panel(world, panel);
        let viewport = if popup.options.keep_in_viewport {
            world.get_resource::<UiViewport>().map(|viewport| viewport.size)
        } else {
            None
        };

        let (placement, origin) = select_popup_origin(anchor_rect, size, viewport, popup.options);

        if let Some(mut state) = world.get_mut::<PositionedPopup>(panel) {
            state.placement = placement;
            state.origin = origin;
        }
        world
            .entity_mut(panel)
            .insert(LayoutRect::from_origin_size(origin, size));

        tracing::trace!(?panel, ?placement, x = origin.x, y = origin.y, "popup placed");
    }
}

fn estimate_text_size(text: &str) -> Vec2 {
    let lines = text.lines().count().max(1);
    let widest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
    Vec2::new(
        widest as f32 * ESTIMATED_FONT_SIZE * 0.6,
        lines as f32 * ESTIMATED_LINE_HEIGHT,
    )
}

/// Measure a floating panel.
///
/// An explicit [`PreferredSize`] on the panel wins. Otherwise content is
/// stacked vertically: the widest descendant sets the width and descendant
/// heights add up, plus padding on every side.
#[must_use]
pub fn measure_panel(world: &World, panel: Entity) -> Vec2 {
    if let Some(size) = world.get::<PreferredSize>(panel) {
        return size.0;
    }

    let mut content = Vec2::ZERO;
    for node in descendants_of(world, panel) {
        let size = if let Some(size) = world.get::<PreferredSize>(node) {
            size.0
        } else if let Some(label) = world.get::<UiLabel>(node) {
            estimate_text_size(&label.text)
        } else {
            continue;
        };
        content.x = content.x.max(size.x);
        content.y += size.y;
    }

    content + Vec2::splat(PANEL_PADDING * 2.0)
}

#[must_use]
pub fn popup_origin_for_placement(
    anchor: Rect,
    size: Vec2,
    placement: PopupPlacement,
    options: PopupOptions,
) -> Vec2 {
    let center = anchor.center();
    match placement {
        PopupPlacement::Right => Vec2::new(
            anchor.max.x + options.distance,
            center.y - size.y * 0.5 + options.skidding,
        ),
        PopupPlacement::Left => Vec2::new(
            anchor.min.x - options.distance - size.x,
            center.y - size.y * 0.5 + options.skidding,
        ),
        PopupPlacement::Top => Vec2::new(
            center.x - size.x * 0.5 + options.skidding,
            anchor.min.y - options.distance - size.y,
        ),
        PopupPlacement::Bottom => Vec2::new(
            center.x - size.x * 0.5 + options.skidding,
            anchor.max.y + options.distance,
        ),
    }
}

#[must_use]
pub fn overflow_score(origin: Vec2, size: Vec2, viewport: Vec2) -> f32 {
    let left = (-origin.x).max(0.0);
    let top = (-origin.y).max(0.0);
    let right = (origin.x + size.x - viewport.x).max(0.0);
    let bottom = (origin.y + size.y - viewport.y).max(0.0);
    left + top + right + bottom
}

#[must_use]
pub fn clamp_origin(origin: Vec2, size: Vec2, viewport: Vec2) -> Vec2 {
    let max = (viewport - size).max(Vec2::ZERO);
    origin.clamp(Vec2::ZERO, max)
}

/// Pick the side and origin for a panel of `size` next to `anchor`.
///
/// Without a viewport the preferred side is used as is. With one, the panel
/// flips to the opposite side when that overflows less, then is clamped inside.
#[must_use]
pub fn select_popup_origin(
    anchor: Rect,
    size: Vec2,
    viewport: Option<Vec2>,
    options: PopupOptions,
) -> (PopupPlacement, Vec2) {
    let preferred = options.placement;
    let origin = popup_origin_for_placement(anchor, size, preferred, options);

    let Some(viewport) = viewport else {
        return (preferred, origin);
    };

    let preferred_overflow = overflow_score(origin, size, viewport);
    if preferred_overflow <= f32::EPSILON {
        return (preferred, origin);
    }

    let flipped = preferred.opposite();
    let flipped_origin = popup_origin_for_placement(anchor, size, flipped, options);
    let (placement, origin) = if overflow_score(flipped_origin, size, viewport) < preferred_overflow
    {
        (flipped, flipped_origin)
    } else {
        (preferred, origin)
    };

    (placement, clamp_origin(origin, size, viewport))
}

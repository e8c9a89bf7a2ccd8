use std::{collections::HashMap, sync::Arc};

use bevy_ecs::{entity::Entity, prelude::*};
use bevy_math::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    controls::{SelectableItem, Tooltip, TooltipConfig, TooltipSupport},
    ecs::{AltText, PreferredSize, StyleClass, TitleText, UiNode},
    settings::WidgetSettings,
    templates::spawn_node,
};

/// Size of one icon cell in the sprite sheet, in pixels.
pub const SPRITE_CELL_SIZE: Vec2 = Vec2::new(32.0, 32.0);

/// Column/row position of an icon inside the sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteCell {
    pub col: u32,
    pub row: u32,
}

impl SpriteCell {
    #[must_use]
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Background offset that brings this cell into a single-cell viewport.
    #[must_use]
    pub fn background_offset(self) -> Vec2 {
        Vec2::new(
            -(self.col as f32) * SPRITE_CELL_SIZE.x,
            -(self.row as f32) * SPRITE_CELL_SIZE.y,
        )
    }
}

/// Named sprite that is not tied to a game object (clocks, arrows, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraSprite {
    pub name: String,
    pub icon_col: u32,
    pub icon_row: u32,
}

impl SelectableItem for ExtraSprite {
    fn name(&self) -> &str {
        &self.name
    }

    fn sprite(&self) -> Option<SpriteCell> {
        Some(SpriteCell::new(self.icon_col, self.icon_row))
    }
}

/// Sprite sheet metadata shipped with the game data.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub hash: String,
    #[serde(default, rename = "extra")]
    pub extras: HashMap<String, ExtraSprite>,
}

impl SpriteSheet {
    #[must_use]
    pub fn url(&self) -> String {
        format!("images/sprite-sheet-{}.png", self.hash)
    }

    #[must_use]
    pub fn extra(&self, name: &str) -> Option<Arc<ExtraSprite>> {
        self.extras.get(name).cloned().map(Arc::new)
    }
}

/// Image background showing one sprite-sheet cell.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct SpriteBackground {
    pub sheet_url: String,
    pub offset: Vec2,
}

/// Options for [`render_icon`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IconOptions {
    /// Never attach a rich tooltip, even when settings allow one.
    pub suppress_tooltip: bool,
    /// Node the tooltip is positioned against. Defaults to the image.
    pub tooltip_anchor: Option<Entity>,
    /// Node the tooltip popup is inserted into. Defaults to the icon's own span.
    pub tooltip_container: Option<Entity>,
}

/// An icon: a `span` holding the `img`, plus its tooltip if one was attached.
///
/// Removing the span removes the image and, with the default container, the
/// tooltip popup in one go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconWidget {
    node: Entity,
    img: Entity,
    tooltip: Option<Tooltip>,
}

impl IconWidget {
    #[must_use]
    pub fn node(&self) -> Entity {
        self.node
    }

    #[must_use]
    pub fn img_node(&self) -> Entity {
        self.img
    }

    #[must_use]
    pub fn tooltip(&self) -> Option<Tooltip> {
        self.tooltip
    }
}

/// Render `item` as an icon.
///
/// A tooltip is attached when tooltips are enabled, the item supports one and
/// the caller did not suppress it; otherwise the image gets the item name as
/// its native title.
pub fn render_icon(
    world: &mut World,
    item: &dyn SelectableItem,
    options: IconOptions,
    settings: &WidgetSettings,
) -> IconWidget {
    let node = spawn_node(world, None, UiNode::Span);
    let img = spawn_node(
        world,
        Some(node),
        (
            UiNode::Img,
            StyleClass::new("icon"),
            AltText(item.name().to_string()),
            PreferredSize(SPRITE_CELL_SIZE),
        ),
    );

    if let Some(cell) = item.sprite() {
        let sheet_url = world
            .get_resource::<SpriteSheet>()
            .map(SpriteSheet::url)
            .unwrap_or_else(|| SpriteSheet::default().url());
        world.entity_mut(img).insert(SpriteBackground {
            sheet_url,
            offset: cell.background_offset(),
        });
    }

    let tooltip = match item.tooltip() {
        TooltipSupport::WithTooltip(generate)
            if settings.tooltips_enabled && !options.suppress_tooltip =>
        {
            let config = TooltipConfig::new(img, generate)
                .with_anchor(options.tooltip_anchor)
                .with_container(options.tooltip_container.unwrap_or(node))
                .with_options(settings.tooltip);
            Some(Tooltip::spawn(world, config))
        }
        _ => {
            world
                .entity_mut(img)
                .insert(TitleText(item.name().to_string()));
            None
        }
    };

    IconWidget { node, img, tooltip }
}

/// Shortcut for [`render_icon`] returning only the attachable span.
pub fn icon_node(
    world: &mut World,
    item: &dyn SelectableItem,
    options: IconOptions,
    settings: &WidgetSettings,
) -> Entity {
    render_icon(world, item, options, settings).node()
}

/// Render a named extra sprite from the installed [`SpriteSheet`].
pub fn extra_icon_node(
    world: &mut World,
    name: &str,
    settings: &WidgetSettings,
) -> Option<Entity> {
    let sprite = world.get_resource::<SpriteSheet>()?.extra(name)?;
    Some(icon_node(world, sprite.as_ref(), IconOptions::default(), settings))
}

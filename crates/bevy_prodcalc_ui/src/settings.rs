use std::{fs, io, path::Path, sync::Arc};

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Preferred side of the anchor a floating panel is placed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PopupPlacement {
    #[default]
    Right,
    Left,
    Top,
    Bottom,
}

impl PopupPlacement {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }
}

/// Placement options for positioned popups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupOptions {
    pub placement: PopupPlacement,
    /// Shift along the anchor edge, in logical pixels.
    pub skidding: f32,
    /// Gap between anchor and panel, in logical pixels.
    pub distance: f32,
    /// Flip and clamp the panel so it stays inside the viewport.
    pub keep_in_viewport: bool,
}

impl Default for PopupOptions {
    fn default() -> Self {
        Self {
            placement: PopupPlacement::Right,
            skidding: 0.0,
            distance: 20.0,
            keep_in_viewport: true,
        }
    }
}

/// Widget-layer configuration.
///
/// Widgets copy an `Arc` snapshot of these settings at construction time.
/// Changing settings means rebuilding the affected widgets.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    pub tooltips_enabled: bool,
    pub tooltip: PopupOptions,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            tooltips_enabled: true,
            tooltip: PopupOptions::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read widget settings from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid widget settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

impl WidgetSettings {
    #[must_use]
    pub fn with_tooltips_enabled(mut self, enabled: bool) -> Self {
        self.tooltips_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_tooltip_options(mut self, options: PopupOptions) -> Self {
        self.tooltip = options;
        self
    }

    pub fn from_ron_str(source: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_ron_str(&source)?;
        tracing::debug!(
            path = %path.display(),
            tooltips_enabled = settings.tooltips_enabled,
            "loaded widget settings"
        );
        Ok(settings)
    }

    /// Snapshot of the world's current settings, or defaults when none are installed.
    #[must_use]
    pub fn snapshot(world: &World) -> Arc<Self> {
        Arc::new(world.get_resource::<Self>().cloned().unwrap_or_default())
    }
}

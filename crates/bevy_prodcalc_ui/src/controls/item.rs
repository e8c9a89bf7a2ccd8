use std::{fmt, sync::Arc};

use crate::controls::{ContentGenerator, SpriteCell};

/// Whether an item can render rich tooltip content.
#[derive(Clone)]
pub enum TooltipSupport {
    WithTooltip(ContentGenerator),
    Plain,
}

impl TooltipSupport {
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::WithTooltip(_))
    }
}

impl fmt::Debug for TooltipSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WithTooltip(_) => f.write_str("WithTooltip(<generator>)"),
            Self::Plain => f.write_str("Plain"),
        }
    }
}

/// Domain object a selector can offer or an icon can depict.
pub trait SelectableItem: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Tooltip capability of this item.
    fn tooltip(&self) -> TooltipSupport {
        TooltipSupport::Plain
    }

    /// Cell of the item's icon in the sprite sheet.
    fn sprite(&self) -> Option<SpriteCell> {
        None
    }
}

impl fmt::Debug for dyn SelectableItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectableItem")
            .field("name", &self.name())
            .field("tooltip", &self.tooltip().is_supported())
            .finish()
    }
}

/// Shared handle to a selectable item. Selections compare by pointer identity.
pub type ItemRef = Arc<dyn SelectableItem>;

/// Identity comparison: two handles match only if they point at the same item,
/// never merely because they describe equal data.
#[must_use]
pub fn same_item(a: &ItemRef, b: &ItemRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

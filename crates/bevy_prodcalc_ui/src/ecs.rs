use bevy_ecs::prelude::*;
use bevy_math::{Rect, Vec2};

/// Marker for the document body, the default attach point for floating popups.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UiDocumentBody;

/// Element kind of a retained UI node.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiNode {
    Span,
    Div,
    Img,
    Input,
    Label,
}

/// Document-unique element id, used by labels to address their input.
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(pub String);

/// Text content of a node.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct UiLabel {
    pub text: String,
}

impl UiLabel {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// CSS-like class names attached to a node.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleClass(pub Vec<String>);

impl StyleClass {
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self(vec![class.into()])
    }

    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|existing| existing == class)
    }

    pub fn insert(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.contains(&class) {
            self.0.push(class);
        }
    }

    pub fn remove(&mut self, class: &str) {
        self.0.retain(|existing| existing != class);
    }
}

/// Equivalent of `display: none`: the node and its subtree are not rendered.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hidden;

/// Radio input state. Inputs sharing `name` form one group.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct RadioInput {
    pub name: String,
    pub checked: bool,
}

/// Label bound to the input whose [`ElementId`] matches.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct LabelFor(pub String);

/// Native hover title, used when an icon renders without a rich tooltip.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct TitleText(pub String);

/// Alternate text for image nodes.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct AltText(pub String);

/// Window-space bounds of a laid-out node.
///
/// Nodes without a layout rect are ignored by hit testing and act as a zero
/// rect at the origin when used as popup anchors.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct LayoutRect(pub Rect);

impl LayoutRect {
    #[must_use]
    pub fn from_corners(min: Vec2, max: Vec2) -> Self {
        Self(Rect::from_corners(min, max))
    }

    #[must_use]
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self(Rect::from_corners(origin, origin + size))
    }
}

/// Intrinsic size of a node, used when measuring floating panels.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PreferredSize(pub Vec2);

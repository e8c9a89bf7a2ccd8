use std::{fmt, sync::Arc};

use bevy_ecs::{entity::Entity, prelude::*};

use crate::{
    controls::{
        IconOptions, ItemRef, SuppressTooltips, Tooltip, TooltipConfig, TooltipSupport,
        despawn_orphaned_tooltips, render_icon, same_item,
    },
    ecs::{ElementId, LabelFor, RadioInput, StyleClass, UiNode},
    settings::WidgetSettings,
    templates::{
        add_class, append_child, clear_children, remove_class, set_hidden, spawn_element,
        spawn_node,
    },
};

/// What generators see of the selector they render for.
#[derive(Debug, Clone)]
pub struct SelectorContext {
    pub selector: Selector,
    pub node: Entity,
    pub dropdown: Entity,
    /// `None` until the option list has been generated, then the wrapper.
    pub tooltip_container: Option<Entity>,
    pub settings: Arc<WidgetSettings>,
}

/// One-shot factory for the option list, consumed by the first [`Selector::open`].
pub type OptionsGenerator =
    Box<dyn FnOnce(&mut World, &SelectorContext) -> Vec<ItemRef> + Send + Sync>;

/// Renders one candidate. Must not change the selector's state.
pub type SelectorContentGenerator =
    Arc<dyn Fn(&mut World, &SelectorContext, &ItemRef) -> Entity + Send + Sync>;

pub type SelectionCallback = Arc<dyn Fn(&mut World, &SelectionChanged) + Send + Sync>;

/// Wrap a closure as a [`SelectorContentGenerator`].
#[must_use]
pub fn selector_content(
    generate: impl Fn(&mut World, &SelectorContext, &ItemRef) -> Entity + Send + Sync + 'static,
) -> SelectorContentGenerator {
    Arc::new(generate)
}

/// Wrap a closure as a [`SelectionCallback`].
#[must_use]
pub fn selection_callback(
    callback: impl Fn(&mut World, &SelectionChanged) + Send + Sync + 'static,
) -> SelectionCallback {
    Arc::new(callback)
}

/// Passed to the selection callback after a user pick.
///
/// `selected` on the selector already equals `item` when the callback runs.
#[derive(Debug, Clone)]
pub struct SelectionChanged {
    pub selector: Selector,
    pub item: ItemRef,
    pub index: usize,
    pub option_inputs: Vec<Entity>,
}

/// A rendered option row: `div > [input, label > content]`.
#[derive(Debug, Clone)]
pub struct SelectorOption {
    pub item: ItemRef,
    pub row: Entity,
    pub input: Entity,
    pub label: Entity,
}

/// Collapsed or expanded. Moves from the first to the second exactly once.
#[derive(Component)]
pub enum SelectorPhase {
    Collapsed {
        options_generator: OptionsGenerator,
    },
    Expanded {
        options: Vec<SelectorOption>,
        tooltip_container: Entity,
    },
}

impl fmt::Debug for SelectorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collapsed { .. } => f.write_str("Collapsed"),
            Self::Expanded {
                options,
                tooltip_container,
            } => f
                .debug_struct("Expanded")
                .field("options", &options.len())
                .field("tooltip_container", tooltip_container)
                .finish(),
        }
    }
}

/// Selector state, stored on the selector's root `span`.
#[derive(Component)]
pub struct UiSelector {
    pub id: String,
    pub wrapper: Entity,
    pub dropdown: Entity,
    content_generator: SelectorContentGenerator,
    on_selection_changed: Option<SelectionCallback>,
    selected: ItemRef,
    is_open: bool,
    tooltip: Option<Tooltip>,
    settings: Arc<WidgetSettings>,
}

impl fmt::Debug for UiSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiSelector")
            .field("id", &self.id)
            .field("wrapper", &self.wrapper)
            .field("dropdown", &self.dropdown)
            .field("selected", &self.selected.name())
            .field("is_open", &self.is_open)
            .field("tooltip", &self.tooltip)
            .finish_non_exhaustive()
    }
}

/// Which part of a selector a node plays, for pointer routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorPart {
    InitialContent,
    Clicker,
    OptionRow(usize),
    OptionInput(usize),
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorPartOf {
    pub selector: Selector,
    pub part: SelectorPart,
}

/// Per-world counter for generated selector ids.
#[derive(Resource, Debug, Default)]
pub struct SelectorIdGen {
    next: u64,
}

impl SelectorIdGen {
    pub fn next_id(&mut self) -> String {
        let id = format!("selector-{}", self.next);
        self.next += 1;
        id
    }
}

/// Construction parameters for [`Selector::spawn`].
pub struct SelectorConfig {
    pub id: Option<String>,
    pub options_generator: OptionsGenerator,
    pub content_generator: SelectorContentGenerator,
    pub initial_selection: ItemRef,
    pub on_selection_changed: Option<SelectionCallback>,
    /// Falls back to the world's [`WidgetSettings`] resource.
    pub settings: Option<Arc<WidgetSettings>>,
}

impl SelectorConfig {
    #[must_use]
    pub fn new(
        options_generator: impl FnOnce(&mut World, &SelectorContext) -> Vec<ItemRef>
        + Send
        + Sync
        + 'static,
        content_generator: SelectorContentGenerator,
        initial_selection: ItemRef,
    ) -> Self {
        Self {
            id: None,
            options_generator: Box::new(options_generator),
            content_generator,
            initial_selection,
            on_selection_changed: None,
            settings: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_on_selection_changed(mut self, callback: SelectionCallback) -> Self {
        self.on_selection_changed = Some(callback);
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Arc<WidgetSettings>) -> Self {
        self.settings = Some(settings);
        self
    }
}

/// Dropdown widget handle.
///
/// Layout: `span#id > div.dropdownWrapper > [div.clicker, div.dropdown,
/// div.spacer]`. The option list is generated on the first [`Selector::open`];
/// until then `.dropdown` holds only the rendered initial selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector(Entity);

impl Selector {
    pub fn spawn(world: &mut World, config: SelectorConfig) -> Self {
        let id = match config.id {
            Some(id) => id,
            None => world.get_resource_or_init::<SelectorIdGen>().next_id(),
        };
        let settings = config
            .settings
            .unwrap_or_else(|| WidgetSettings::snapshot(world));

        let node = spawn_node(world, None, (UiNode::Span, ElementId(id.clone())));
        let selector = Self(node);
        let wrapper = spawn_element(world, Some(node), UiNode::Div, "dropdownWrapper");
        spawn_node(
            world,
            Some(wrapper),
            (
                UiNode::Div,
                StyleClass::new("clicker"),
                SelectorPartOf {
                    selector,
                    part: SelectorPart::Clicker,
                },
            ),
        );
        let dropdown = spawn_element(world, Some(wrapper), UiNode::Div, "dropdown");
        spawn_element(world, Some(wrapper), UiNode::Div, "spacer");

        world.entity_mut(node).insert((
            UiSelector {
                id: id.clone(),
                wrapper,
                dropdown,
                content_generator: config.content_generator,
                on_selection_changed: config.on_selection_changed,
                selected: config.initial_selection,
                is_open: false,
                tooltip: None,
                settings,
            },
            SelectorPhase::Collapsed {
                options_generator: config.options_generator,
            },
        ));

        selector.render_initial_content(world);
        tracing::debug!(selector = ?node, %id, "selector created");
        selector
    }

    #[must_use]
    pub fn node(self) -> Entity {
        self.0
    }

    #[must_use]
    pub fn id(self, world: &World) -> Option<&str> {
        world.get::<UiSelector>(self.0).map(|state| state.id.as_str())
    }

    #[must_use]
    pub fn is_open(self, world: &World) -> bool {
        world
            .get::<UiSelector>(self.0)
            .is_some_and(|state| state.is_open)
    }

    /// Whether the option list has been generated.
    #[must_use]
    pub fn is_expanded(self, world: &World) -> bool {
        matches!(
            world.get::<SelectorPhase>(self.0),
            Some(SelectorPhase::Expanded { .. })
        )
    }

    #[must_use]
    pub fn selected(self, world: &World) -> Option<ItemRef> {
        world
            .get::<UiSelector>(self.0)
            .map(|state| state.selected.clone())
    }

    #[must_use]
    pub fn tooltip(self, world: &World) -> Option<Tooltip> {
        world.get::<UiSelector>(self.0).and_then(|state| state.tooltip)
    }

    #[must_use]
    pub fn tooltip_container(self, world: &World) -> Option<Entity> {
        match world.get::<SelectorPhase>(self.0) {
            Some(SelectorPhase::Expanded {
                tooltip_container, ..
            }) => Some(*tooltip_container),
            _ => None,
        }
    }

    #[must_use]
    pub fn wrapper(self, world: &World) -> Option<Entity> {
        world.get::<UiSelector>(self.0).map(|state| state.wrapper)
    }

    #[must_use]
    pub fn dropdown(self, world: &World) -> Option<Entity> {
        world.get::<UiSelector>(self.0).map(|state| state.dropdown)
    }

    /// Rendered option rows. Empty while collapsed.
    #[must_use]
    pub fn options(self, world: &World) -> &[SelectorOption] {
        match world.get::<SelectorPhase>(self.0) {
            Some(SelectorPhase::Expanded { options, .. }) => options,
            _ => &[],
        }
    }

    #[must_use]
    pub fn option_inputs(self, world: &World) -> Vec<Entity> {
        self.options(world).iter().map(|option| option.input).collect()
    }

    fn context(self, world: &World) -> Option<SelectorContext> {
        let state = world.get::<UiSelector>(self.0)?;
        Some(SelectorContext {
            selector: self,
            node: self.0,
            dropdown: state.dropdown,
            tooltip_container: self.tooltip_container(world),
            settings: state.settings.clone(),
        })
    }

    fn render_initial_content(self, world: &mut World) {
        let Some(context) = self.context(world) else {
            return;
        };
        let Some(state) = world.get::<UiSelector>(self.0) else {
            return;
        };
        let generate = state.content_generator.clone();
        let selected = state.selected.clone();

        let content = generate(world, &context, &selected);
        let Ok(mut content_node) = world.get_entity_mut(content) else {
            tracing::warn!(
                selector = ?self.0,
                ?content,
                "content generator returned a missing node"
            );
            return;
        };
        content_node.insert(SelectorPartOf {
            selector: self,
            part: SelectorPart::InitialContent,
        });
        add_class(world, content, "initialSelection");
        append_child(world, context.dropdown, content);
    }

    /// Open the dropdown, generating the option list on the first call.
    pub fn open(self, world: &mut World) {
        match world.get::<SelectorPhase>(self.0) {
            Some(SelectorPhase::Collapsed { .. }) => self.generate_dropdown(world),
            Some(SelectorPhase::Expanded { .. }) => self.mark_open(world),
            None => {
                tracing::debug!(selector = ?self.0, "open ignored while options are generating");
            }
        }
    }

    fn generate_dropdown(self, world: &mut World) {
        let Some(SelectorPhase::Collapsed { options_generator }) =
            world.entity_mut(self.0).take::<SelectorPhase>()
        else {
            return;
        };
        let Some(state) = world.get::<UiSelector>(self.0) else {
            return;
        };
        let wrapper = state.wrapper;
        let dropdown = state.dropdown;
        let id = state.id.clone();
        let generate = state.content_generator.clone();

        // Tooltips built by the initial content live under its own nodes.
        clear_children(world, dropdown);
        despawn_orphaned_tooltips(world);

        let Some(mut context) = self.context(world) else {
            return;
        };
        let items = options_generator(world, &context);
        context.tooltip_container = Some(wrapper);

        let Some(selected) = self.selected(world) else {
            return;
        };
        let group = format!("{id}-dropdown");
        let mut options = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let input_id = format!("{id}-input-{index}");
            let row = spawn_node(
                world,
                Some(dropdown),
                (
                    UiNode::Div,
                    SelectorPartOf {
                        selector: self,
                        part: SelectorPart::OptionRow(index),
                    },
                ),
            );
            let input = spawn_node(
                world,
                Some(row),
                (
                    UiNode::Input,
                    ElementId(input_id.clone()),
                    RadioInput {
                        name: group.clone(),
                        checked: same_item(&item, &selected),
                    },
                    SelectorPartOf {
                        selector: self,
                        part: SelectorPart::OptionInput(index),
                    },
                ),
            );
            let label = spawn_node(world, Some(row), (UiNode::Label, LabelFor(input_id)));
            let content = generate(world, &context, &item);
            append_child(world, label, content);

            options.push(SelectorOption {
                item,
                row,
                input,
                label,
            });
        }

        tracing::debug!(selector = ?self.0, options = options.len(), "selector options generated");
        world.entity_mut(self.0).insert(SelectorPhase::Expanded {
            options,
            tooltip_container: wrapper,
        });
        self.mark_open(world);
    }

    fn mark_open(self, world: &mut World) {
        let Some(mut state) = world.get_mut::<UiSelector>(self.0) else {
            return;
        };
        if state.is_open {
            return;
        }
        state.is_open = true;
        let wrapper = state.wrapper;
        let tooltip = state.tooltip;
        drop(state);

        if let Some(tooltip) = tooltip {
            tooltip.hide(world);
        }
        add_class(world, wrapper, "open");
        self.sync_row_visibility(world);
        world.entity_mut(self.0).insert(SuppressTooltips);
        tracing::trace!(selector = ?self.0, "selector opened");
    }

    /// Close the dropdown. Option nodes are kept; only the checked row stays
    /// displayed.
    pub fn close(self, world: &mut World) {
        let Some(mut state) = world.get_mut::<UiSelector>(self.0) else {
            return;
        };
        if !state.is_open {
            return;
        }
        state.is_open = false;
        let wrapper = state.wrapper;
        drop(state);

        remove_class(world, wrapper, "open");
        self.sync_row_visibility(world);
        world.entity_mut(self.0).remove::<SuppressTooltips>();
        tracing::trace!(selector = ?self.0, "selector closed");
    }

    /// User pick of the option at `index`.
    ///
    /// Updates the selection, closes, notifies the selection callback and then
    /// refreshes the tooltip.
    pub fn select(self, world: &mut World, index: usize) {
        let Some(item) = self
            .options(world)
            .get(index)
            .map(|option| option.item.clone())
        else {
            tracing::debug!(selector = ?self.0, index, "select ignored for unknown option");
            return;
        };
        let Some(mut state) = world.get_mut::<UiSelector>(self.0) else {
            return;
        };
        state.selected = item.clone();
        let callback = state.on_selection_changed.clone();
        drop(state);

        self.close(world);
        self.sync_checked(world);

        if let Some(callback) = callback {
            let changed = SelectionChanged {
                selector: self,
                item,
                index,
                option_inputs: self.option_inputs(world),
            };
            callback(world, &changed);
        }
        self.refresh_tooltip(world);
    }

    /// Programmatic selection. Never notifies the selection callback.
    ///
    /// `item` does not have to be one of the options; then nothing is checked.
    pub fn set_selected(self, world: &mut World, item: ItemRef) {
        let Some(mut state) = world.get_mut::<UiSelector>(self.0) else {
            return;
        };
        state.selected = item;
        let dropdown = state.dropdown;
        drop(state);

        match world.get::<SelectorPhase>(self.0) {
            Some(SelectorPhase::Collapsed { .. }) => {
                clear_children(world, dropdown);
                despawn_orphaned_tooltips(world);
                self.render_initial_content(world);
            }
            Some(SelectorPhase::Expanded { .. }) => {
                self.sync_checked(world);
                self.refresh_tooltip(world);
            }
            None => {}
        }
    }

    fn sync_checked(self, world: &mut World) {
        let Some(selected) = self.selected(world) else {
            return;
        };
        let marks = self
            .options(world)
            .iter()
            .map(|option| (option.input, same_item(&option.item, &selected)))
            .collect::<Vec<_>>();
        for (input, checked) in marks {
            if let Some(mut radio) = world.get_mut::<RadioInput>(input) {
                radio.checked = checked;
            }
        }
        self.sync_row_visibility(world);
    }

    /// Closed dropdowns display only the checked row.
    fn sync_row_visibility(self, world: &mut World) {
        let is_open = self.is_open(world);
        let rows = self
            .options(world)
            .iter()
            .map(|option| {
                let checked = world
                    .get::<RadioInput>(option.input)
                    .is_some_and(|radio| radio.checked);
                (option.row, !is_open && !checked)
            })
            .collect::<Vec<_>>();
        for (row, hidden) in rows {
            set_hidden(world, row, hidden);
        }
    }

    /// Bring the owned tooltip in line with the current selection.
    pub fn refresh_tooltip(self, world: &mut World) {
        let Some(state) = world.get::<UiSelector>(self.0) else {
            return;
        };
        if !state.settings.tooltips_enabled {
            return;
        }
        let support = state.selected.tooltip();
        let tooltip = state.tooltip;
        let options = state.settings.tooltip;

        match (support, tooltip) {
            (TooltipSupport::WithTooltip(generate), Some(tooltip)) => {
                tooltip.update_content_generator(world, generate);
            }
            (TooltipSupport::WithTooltip(generate), None) => {
                let config = TooltipConfig::new(self.0, generate)
                    .with_container(self.tooltip_container(world))
                    .with_options(options);
                let tooltip = Tooltip::spawn(world, config);
                if let Some(mut state) = world.get_mut::<UiSelector>(self.0) {
                    state.tooltip = Some(tooltip);
                }
            }
            (TooltipSupport::Plain, Some(tooltip)) => {
                if tooltip.popup_node(world).is_some() {
                    tooltip.detach_popup(world);
                }
                tooltip.destroy(world);
                if let Some(mut state) = world.get_mut::<UiSelector>(self.0) {
                    state.tooltip = None;
                }
            }
            (TooltipSupport::Plain, None) => {}
        }
    }
}

/// Selector over a fixed list of items.
///
/// Without a content generator each item is rendered as an icon whose tooltip
/// is anchored to the `.dropdown` node and placed in the selector's current
/// tooltip container.
pub fn make_simple_dropdown(
    world: &mut World,
    id: Option<String>,
    options: Vec<ItemRef>,
    initial_selection: ItemRef,
    on_selection_changed: Option<SelectionCallback>,
    content_generator: Option<SelectorContentGenerator>,
) -> Selector {
    let content_generator = content_generator.unwrap_or_else(|| {
        selector_content(|world, context, item| {
            let options = IconOptions {
                suppress_tooltip: false,
                tooltip_anchor: Some(context.dropdown),
                tooltip_container: context.tooltip_container,
            };
            render_icon(world, item.as_ref(), options, &context.settings).node()
        })
    });

    let mut config = SelectorConfig::new(
        move |_world: &mut World, _context: &SelectorContext| options,
        content_generator,
        initial_selection,
    );
    config.id = id;
    config.on_selection_changed = on_selection_changed;
    Selector::spawn(world, config)
}

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use bevy_app::App;
use bevy_ecs::prelude::*;
use bevy_input::{
    ButtonState,
    mouse::{MouseButton, MouseButtonInput},
};
use bevy_math::Vec2;
use bevy_window::{CursorLeft, CursorMoved, WindowResized};

use crate::{
    IconOptions, ItemRef, LayoutRect, PointerState, ProdcalcUiPlugin, SelectableItem, Selector,
    SelectorConfig, SelectorContext, SpriteSheet, Tooltip, TooltipFrame, TooltipSupport,
    UiEventQueue, UiLabel, UiNode, UiTooltip, UiViewport, WidgetSettings, append_child,
    children_of, content_generator, ensure_document_body, is_displayed, make_simple_dropdown,
    parent_of, render_icon, same_item, selection_callback, selector_content,
};

struct Machine {
    name: &'static str,
    with_tooltip: bool,
}

impl SelectableItem for Machine {
    fn name(&self) -> &str {
        self.name
    }

    fn tooltip(&self) -> TooltipSupport {
        if !self.with_tooltip {
            return TooltipSupport::Plain;
        }
        let name = self.name;
        TooltipSupport::WithTooltip(content_generator(move |world| {
            world.spawn((UiNode::Div, UiLabel::new(name))).id()
        }))
    }
}

fn machine(name: &'static str, with_tooltip: bool) -> ItemRef {
    Arc::new(Machine { name, with_tooltip })
}

fn machines() -> Vec<ItemRef> {
    vec![
        machine("assembling-machine-1", true),
        machine("assembling-machine-2", true),
        machine("assembling-machine-3", true),
    ]
}

fn app() -> (App, Entity) {
    let mut app = App::new();
    app.add_plugins(ProdcalcUiPlugin);
    let window = app.world_mut().spawn_empty().id();
    (app, window)
}

fn frame_count(app: &mut App) -> usize {
    let world = app.world_mut();
    let mut query = world.query::<&TooltipFrame>();
    query.iter(world).count()
}

fn set_layout(app: &mut App, node: Entity, origin: Vec2, size: Vec2) {
    app.world_mut()
        .entity_mut(node)
        .insert(LayoutRect::from_origin_size(origin, size));
}

fn move_cursor(app: &mut App, window: Entity, position: Vec2) {
    app.world_mut().write_message(CursorMoved {
        window,
        position,
        delta: None,
    });
    app.update();
}

fn click_at(app: &mut App, window: Entity, position: Vec2) {
    let world = app.world_mut();
    world.write_message(CursorMoved {
        window,
        position,
        delta: None,
    });
    for state in [ButtonState::Pressed, ButtonState::Released] {
        world.write_message(MouseButtonInput {
            button: MouseButton::Left,
            state,
            window,
        });
    }
    app.update();
}

#[test]
fn plugin_installs_resources() {
    let (mut app, _) = app();
    app.update();

    let world = app.world();
    assert!(world.get_resource::<UiEventQueue>().is_some());
    assert!(world.get_resource::<PointerState>().is_some());
    assert!(world.get_resource::<SpriteSheet>().is_some());
    assert_eq!(world.resource::<UiViewport>(), &UiViewport::new(1280.0, 720.0));
    assert!(world.resource::<WidgetSettings>().tooltips_enabled);
}

#[test]
fn plugin_keeps_existing_settings() {
    let mut app = App::new();
    app.insert_resource(WidgetSettings::default().with_tooltips_enabled(false))
        .add_plugins(ProdcalcUiPlugin);

    assert!(!app.world().resource::<WidgetSettings>().tooltips_enabled);
}

#[test]
fn window_resize_updates_viewport() {
    let (mut app, window) = app();
    app.world_mut().write_message(WindowResized {
        window,
        width: 640.0,
        height: 480.0,
    });
    app.update();

    assert_eq!(app.world().resource::<UiViewport>(), &UiViewport::new(640.0, 480.0));
}

#[test]
fn hover_shows_and_hides_icon_tooltip() {
    let (mut app, window) = app();
    let world = app.world_mut();
    let body = ensure_document_body(world);
    let settings = WidgetSettings::snapshot(world);
    let icon = render_icon(
        world,
        machine("electric-mining-drill", true).as_ref(),
        IconOptions::default(),
        &settings,
    );
    append_child(world, body, icon.node());
    let tooltip = icon.tooltip().expect("icon tooltip");
    set_layout(&mut app, icon.img_node(), Vec2::new(100.0, 100.0), Vec2::splat(32.0));

    move_cursor(&mut app, window, Vec2::new(110.0, 110.0));
    assert!(tooltip.is_open(app.world()));
    let frame = tooltip.popup_node(app.world()).expect("popup after hover");
    assert!(is_displayed(app.world(), frame));
    assert_eq!(parent_of(app.world(), frame), Some(icon.node()));

    move_cursor(&mut app, window, Vec2::new(500.0, 500.0));
    assert!(!tooltip.is_open(app.world()));
    assert!(!is_displayed(app.world(), frame));

    move_cursor(&mut app, window, Vec2::new(110.0, 110.0));
    app.world_mut().write_message(CursorLeft { window });
    app.update();
    assert!(!tooltip.is_open(app.world()));
    assert_eq!(frame_count(&mut app), 1);
}

#[test]
fn hidden_popup_does_not_capture_pointer() {
    let (mut app, window) = app();
    let world = app.world_mut();
    let body = ensure_document_body(world);
    let settings = WidgetSettings::snapshot(world);
    let icon = render_icon(
        world,
        machine("stone-furnace", true).as_ref(),
        IconOptions::default(),
        &settings,
    );
    append_child(world, body, icon.node());
    let tooltip = icon.tooltip().expect("icon tooltip");
    set_layout(&mut app, icon.img_node(), Vec2::ZERO, Vec2::splat(32.0));

    move_cursor(&mut app, window, Vec2::splat(10.0));
    move_cursor(&mut app, window, Vec2::splat(600.0));
    let frame = tooltip.popup_node(app.world()).expect("popup after hover");
    let rect = app
        .world()
        .get::<LayoutRect>(frame)
        .copied()
        .expect("popup is laid out");

    move_cursor(&mut app, window, rect.0.center());
    let hovered = &app.world().resource::<PointerState>().hovered;
    assert!(!hovered.contains(&frame));
}

/// Cursor moves and a window leave in one frame: the leave wins.
#[test]
fn cursor_left_applies_after_same_frame_moves() {
    let (mut app, window) = app();
    let world = app.world_mut();
    let body = ensure_document_body(world);
    let settings = WidgetSettings::snapshot(world);
    let icon = render_icon(
        world,
        machine("steel-furnace", true).as_ref(),
        IconOptions::default(),
        &settings,
    );
    append_child(world, body, icon.node());
    let tooltip = icon.tooltip().expect("icon tooltip");
    set_layout(&mut app, icon.img_node(), Vec2::ZERO, Vec2::splat(32.0));

    let world = app.world_mut();
    world.write_message(CursorLeft { window });
    world.write_message(CursorMoved {
        window,
        position: Vec2::splat(10.0),
        delta: None,
    });
    app.update();

    let pointer = app.world().resource::<PointerState>();
    assert_eq!(pointer.position, None);
    assert!(pointer.hovered.is_empty());
    assert!(!tooltip.is_open(app.world()));
}

#[test]
fn orphaned_icon_tooltip_is_reaped() {
    let (mut app, _) = app();
    let world = app.world_mut();
    let settings = WidgetSettings::snapshot(world);
    let icon = render_icon(
        world,
        machine("burner-inserter", true).as_ref(),
        IconOptions::default(),
        &settings,
    );
    let tooltip = icon.tooltip().expect("icon tooltip");
    tooltip.show(world);
    crate::despawn_node_tree(world, icon.node());

    app.update();
    assert!(!tooltip.exists(app.world()));
    assert_eq!(frame_count(&mut app), 0);
}

/// Options `[X, Y, Z]`, selection `Y`, open then pick `Z` by clicking its label.
#[test]
fn selector_open_and_pick_through_pointer_input() {
    let (mut app, window) = app();
    let items = machines();
    let generated = Arc::new(AtomicUsize::new(0));
    let changes = Arc::new(Mutex::new(Vec::new()));

    let world = app.world_mut();
    let body = ensure_document_body(world);
    let options = items.clone();
    let counter = generated.clone();
    let recorded = changes.clone();
    let config = SelectorConfig::new(
        move |_world: &mut World, _context: &SelectorContext| {
            counter.fetch_add(1, Ordering::SeqCst);
            options
        },
        selector_content(|world, _context, item| {
            world
                .spawn((UiNode::Span, UiLabel::new(item.name().to_string())))
                .id()
        }),
        items[1].clone(),
    )
    .with_id("factory")
    .with_on_selection_changed(selection_callback(move |world, changed| {
        recorded.lock().expect("test mutex poisoned").push((
            changed.index,
            changed.selector.is_open(world),
            changed.option_inputs.len(),
        ));
    }));
    let selector = Selector::spawn(world, config);
    append_child(world, body, selector.node());

    let dropdown = selector.dropdown(world).expect("dropdown exists");
    let initial = children_of(world, dropdown)[0];
    set_layout(&mut app, initial, Vec2::new(10.0, 10.0), Vec2::new(100.0, 20.0));

    click_at(&mut app, window, Vec2::new(20.0, 20.0));
    assert!(selector.is_open(app.world()));
    assert_eq!(generated.load(Ordering::SeqCst), 1);
    assert!(app.world().get_entity(initial).is_err());

    let option = selector.options(app.world())[2].clone();
    let content = children_of(app.world(), option.label)[0];
    set_layout(&mut app, option.row, Vec2::new(10.0, 70.0), Vec2::new(120.0, 20.0));
    set_layout(&mut app, option.label, Vec2::new(30.0, 70.0), Vec2::new(100.0, 20.0));
    set_layout(&mut app, content, Vec2::new(30.0, 70.0), Vec2::new(60.0, 20.0));

    click_at(&mut app, window, Vec2::new(40.0, 75.0));

    let world = app.world();
    let selected = selector.selected(world).expect("selector exists");
    assert!(same_item(&selected, &items[2]));
    assert!(!selector.is_open(world));
    assert_eq!(
        *changes.lock().expect("test mutex poisoned"),
        vec![(2, false, 3)]
    );
    assert_eq!(generated.load(Ordering::SeqCst), 1);
    assert!(selector.tooltip(world).is_some());
}

/// Options stay laid out after closing, but a click on a hidden one changes nothing.
#[test]
fn closed_selector_ignores_clicks_on_unchecked_options() {
    let (mut app, window) = app();
    let items = machines();
    let world = app.world_mut();
    let body = ensure_document_body(world);
    let selector = make_simple_dropdown(world, None, items.clone(), items[0].clone(), None, None);
    append_child(world, body, selector.node());
    selector.open(world);

    let option = selector.options(world)[2].clone();
    let content = children_of(world, option.label)[0];
    set_layout(&mut app, option.label, Vec2::new(30.0, 70.0), Vec2::new(100.0, 20.0));
    set_layout(&mut app, content, Vec2::new(30.0, 70.0), Vec2::new(60.0, 20.0));

    selector.close(app.world_mut());
    assert!(!is_displayed(app.world(), option.label));

    click_at(&mut app, window, Vec2::new(40.0, 75.0));
    let world = app.world();
    let selected = selector.selected(world).expect("selector exists");
    assert!(same_item(&selected, &items[0]));
    assert!(!selector.is_open(world));

    selector.open(app.world_mut());
    assert!(is_displayed(app.world(), option.label));
}

#[test]
fn selector_tooltip_follows_hover_and_open_state() {
    let (mut app, window) = app();
    let items = machines();
    let world = app.world_mut();
    let body = ensure_document_body(world);
    let selector = make_simple_dropdown(world, None, items.clone(), items[0].clone(), None, None);
    append_child(world, body, selector.node());
    selector.open(world);
    selector.select(world, 1);
    let tooltip = selector.tooltip(world).expect("tooltip after select");
    set_layout(&mut app, selector.node(), Vec2::new(200.0, 200.0), Vec2::splat(40.0));

    move_cursor(&mut app, window, Vec2::new(210.0, 210.0));
    assert!(tooltip.is_open(app.world()));
    let frame = tooltip.popup_node(app.world()).expect("popup after hover");
    assert_eq!(parent_of(app.world(), frame), selector.wrapper(app.world()));

    selector.open(app.world_mut());
    assert!(!tooltip.is_open(app.world()));

    move_cursor(&mut app, window, Vec2::new(700.0, 700.0));
    move_cursor(&mut app, window, Vec2::new(210.0, 210.0));
    assert!(!tooltip.is_open(app.world()));

    selector.close(app.world_mut());
    move_cursor(&mut app, window, Vec2::new(700.0, 700.0));
    move_cursor(&mut app, window, Vec2::new(210.0, 210.0));
    assert!(tooltip.is_open(app.world()));
}

/// Never opened, then set to an item outside the option list.
#[test]
fn set_selected_outside_options_before_open() {
    let (mut app, _) = app();
    let items = machines();
    let world = app.world_mut();
    let selector = make_simple_dropdown(world, None, items.clone(), items[0].clone(), None, None);

    let outsider = machine("centrifuge", true);
    selector.set_selected(world, outsider.clone());
    app.update();

    let world = app.world();
    let dropdown = selector.dropdown(world).expect("dropdown exists");
    let shown = children_of(world, dropdown);
    assert_eq!(shown.len(), 1);
    let img = children_of(world, shown[0])[0];
    assert_eq!(
        world.get::<crate::AltText>(img),
        Some(&crate::AltText("centrifuge".to_string()))
    );
    assert!(!selector.is_expanded(world));
}

/// Tooltips disabled and the selection moves to an item that has one.
#[test]
fn disabled_tooltips_create_no_popup() {
    let mut app = App::new();
    app.insert_resource(WidgetSettings::default().with_tooltips_enabled(false))
        .add_plugins(ProdcalcUiPlugin);
    let items = machines();
    let world = app.world_mut();
    let selector = make_simple_dropdown(world, None, items.clone(), items[0].clone(), None, None);

    selector.open(world);
    selector.select(world, 2);
    selector.set_selected(world, items[1].clone());
    app.update();

    assert!(selector.tooltip(app.world()).is_none());
    let world = app.world_mut();
    let mut tooltips = world.query::<&UiTooltip>();
    assert_eq!(tooltips.iter(world).count(), 0);
    assert_eq!(frame_count(&mut app), 0);
}

/// A shown tooltip whose selection changes to a plain item.
///
/// The popup is detached when one exists and later hovers build nothing.
#[test]
fn plain_selection_detaches_popup_and_stops_hover() {
    let (mut app, window) = app();
    let mut items = machines();
    items.push(machine("wooden-chest", false));
    let world = app.world_mut();
    let body = ensure_document_body(world);
    let selector = make_simple_dropdown(world, None, items.clone(), items[0].clone(), None, None);
    append_child(world, body, selector.node());
    selector.open(world);
    selector.select(world, 0);
    set_layout(&mut app, selector.node(), Vec2::ZERO, Vec2::splat(40.0));

    move_cursor(&mut app, window, Vec2::splat(20.0));
    let tooltip = selector.tooltip(app.world()).expect("tooltip after select");
    let frame = tooltip.popup_node(app.world()).expect("popup after hover");
    let wrapper = selector.wrapper(app.world()).expect("wrapper exists");
    assert!(children_of(app.world(), wrapper).contains(&frame));

    selector.set_selected(app.world_mut(), items[3].clone());
    assert!(!children_of(app.world(), wrapper).contains(&frame));
    assert!(selector.tooltip(app.world()).is_none());
    assert!(Tooltip::for_reference(app.world_mut(), selector.node()).is_empty());

    move_cursor(&mut app, window, Vec2::splat(600.0));
    move_cursor(&mut app, window, Vec2::splat(20.0));
    assert_eq!(frame_count(&mut app), 0);
}

#[test]
fn settings_load_from_ron() {
    let settings = WidgetSettings::from_ron_str(
        "(tooltips_enabled: false, tooltip: (placement: Left, distance: 8.0))",
    )
    .expect("settings should parse");

    assert!(!settings.tooltips_enabled);
    assert_eq!(settings.tooltip.placement, crate::PopupPlacement::Left);
    assert_eq!(settings.tooltip.distance, 8.0);
    assert_eq!(settings.tooltip.skidding, 0.0);
    assert!(settings.tooltip.keep_in_viewport);
}

//! Routing of queued pointer actions to tooltips and selectors.

use bevy_ecs::{entity::Entity, prelude::*};

use crate::{
    controls::{SelectorPart, SelectorPartOf, handle_tooltip_hover},
    ecs::{LabelFor, RadioInput},
    events::{PointerAction, UiEventQueue},
    templates::{find_element_by_id, parent_of},
};

/// Target plus its ancestors, innermost first.
fn propagation_path(world: &World, target: Entity) -> Vec<Entity> {
    let mut path = vec![target];
    let mut current = parent_of(world, target);
    while let Some(entity) = current {
        path.push(entity);
        current = parent_of(world, entity);
    }
    path
}

/// Check `input` and uncheck the rest of its radio group.
///
/// Returns `false` when the input was already checked, which produces no change.
fn check_radio(world: &mut World, input: Entity) -> bool {
    let Some(radio) = world.get::<RadioInput>(input) else {
        return false;
    };
    if radio.checked {
        return false;
    }
    let group = radio.name.clone();

    let mut query = world.query::<(Entity, &mut RadioInput)>();
    for (entity, mut radio) in query.iter_mut(world) {
        if radio.name == group {
            radio.checked = entity == input;
        }
    }
    true
}

fn dispatch_change(world: &mut World, input: Entity) {
    let Some(part) = world.get::<SelectorPartOf>(input).copied() else {
        return;
    };
    if let SelectorPart::OptionInput(index) = part.part {
        tracing::trace!(?input, index, "option input changed");
        part.selector.select(world, index);
    }
}

fn activate_radio(world: &mut World, input: Entity) {
    if check_radio(world, input) {
        dispatch_change(world, input);
    }
}

fn dispatch_click(world: &mut World, target: Entity) {
    for node in propagation_path(world, target) {
        if world.get_entity(node).is_err() {
            return;
        }

        if let Some(label) = world.get::<LabelFor>(node) {
            let id = label.0.clone();
            if let Some(input) = find_element_by_id(world, &id) {
                activate_radio(world, input);
            }
        }

        let Some(part) = world.get::<SelectorPartOf>(node).copied() else {
            continue;
        };
        match part.part {
            SelectorPart::InitialContent => {
                part.selector.open(world);
                return;
            }
            SelectorPart::Clicker => {
                part.selector.close(world);
                return;
            }
            SelectorPart::OptionRow(_) => {
                if node == target {
                    part.selector.open(world);
                }
                return;
            }
            SelectorPart::OptionInput(_) => {
                activate_radio(world, node);
            }
        }
    }
}

/// Drain queued [`PointerAction`]s and apply them in push order.
///
/// Hover drives tooltips, clicks bubble from the target to its ancestors and
/// radio changes select the matching selector option.
pub fn handle_pointer_actions(world: &mut World) {
    let Some(queue) = world.get_resource::<UiEventQueue>() else {
        return;
    };
    let actions = queue.drain_actions::<PointerAction>();

    for event in actions {
        if world.get_entity(event.entity).is_err() {
            continue;
        }

        tracing::trace!(entity = ?event.entity, action = ?event.action, "pointer action");
        match event.action {
            PointerAction::Enter => handle_tooltip_hover(world, event.entity, true),
            PointerAction::Leave => handle_tooltip_hover(world, event.entity, false),
            PointerAction::Click => dispatch_click(world, event.entity),
            PointerAction::Change => dispatch_change(world, event.entity),
        }
    }
}

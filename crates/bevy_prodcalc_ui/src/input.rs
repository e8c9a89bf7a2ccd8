//! Window input bridge: cursor and mouse-button messages become queued
//! [`PointerAction`]s on the node under the pointer.

use bevy_ecs::{entity::Entity, hierarchy::ChildOf, message::MessageReader, prelude::*};
use bevy_input::{
    ButtonState,
    mouse::{MouseButton, MouseButtonInput},
};
use bevy_math::Vec2;
use bevy_window::{CursorLeft, CursorMoved, WindowResized};

use crate::{
    ecs::{Hidden, LayoutRect},
    events::{PointerAction, UiEventQueue},
    popup::UiViewport,
};

/// Pointer position and the nodes currently under it.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct PointerState {
    pub position: Option<Vec2>,
    /// Hit node followed by its ancestors.
    pub hovered: Vec<Entity>,
    /// Node under the pointer when the primary button went down.
    pub pressed: Option<Entity>,
}

/// Nodes left and entered when the hover path changes from `previous` to `next`.
///
/// Leaves are ordered innermost first, enters outermost first.
#[must_use]
pub fn hover_transitions(previous: &[Entity], next: &[Entity]) -> (Vec<Entity>, Vec<Entity>) {
    let left = previous
        .iter()
        .copied()
        .filter(|entity| !next.contains(entity))
        .collect();
    let entered = next
        .iter()
        .rev()
        .copied()
        .filter(|entity| !previous.contains(entity))
        .collect();
    (left, entered)
}

fn ancestor_path(target: Entity, parents: &Query<&ChildOf>) -> Vec<Entity> {
    let mut path = vec![target];
    let mut current = target;
    while let Ok(child_of) = parents.get(current) {
        current = child_of.parent();
        path.push(current);
    }
    path
}

/// Deepest displayed node whose layout contains `position`.
fn hit_test(
    position: Vec2,
    nodes: &Query<(Entity, &LayoutRect)>,
    parents: &Query<&ChildOf>,
    hidden: &Query<(), With<Hidden>>,
) -> Option<Entity> {
    nodes
        .iter()
        .filter(|(_, rect)| rect.0.contains(position))
        .filter_map(|(entity, _)| {
            let path = ancestor_path(entity, parents);
            let displayed = path.iter().all(|node| hidden.get(*node).is_err());
            displayed.then_some((entity, path.len()))
        })
        .max_by_key(|(_, depth)| *depth)
        .map(|(entity, _)| entity)
}

fn update_hover(pointer: &mut PointerState, queue: &UiEventQueue, next: Vec<Entity>) {
    let (left, entered) = hover_transitions(&pointer.hovered, &next);
    for entity in left {
        queue.push_pointer(entity, PointerAction::Leave);
    }
    for entity in entered {
        queue.push_pointer(entity, PointerAction::Enter);
    }
    pointer.hovered = next;
}

/// Turn this frame's window messages into queued pointer actions.
///
/// Each message type has its own reader, so ordering between types within a
/// frame is not recovered. Messages are applied as resizes, then cursor moves,
/// then `CursorLeft`, then button presses. A leave followed by a re-entry in
/// the same frame therefore ends with nothing hovered. Press and release are
/// both hit-tested at the last cursor position of the frame, so a press and
/// release with a move in between count as a click on the final target.
#[allow(clippy::too_many_arguments)]
pub fn inject_window_pointer_input(
    mut pointer: ResMut<PointerState>,
    mut viewport: ResMut<UiViewport>,
    queue: Res<UiEventQueue>,
    nodes: Query<(Entity, &LayoutRect)>,
    parents: Query<&ChildOf>,
    hidden: Query<(), With<Hidden>>,
    mut cursor_moved: MessageReader<CursorMoved>,
    mut cursor_left: MessageReader<CursorLeft>,
    mut mouse_button_input: MessageReader<MouseButtonInput>,
    mut window_resized: MessageReader<WindowResized>,
) {
    for event in window_resized.read() {
        viewport.size = Vec2::new(event.width, event.height);
        tracing::trace!(width = event.width, height = event.height, "viewport resized");
    }

    for event in cursor_moved.read() {
        pointer.position = Some(event.position);
        let next = hit_test(event.position, &nodes, &parents, &hidden)
            .map(|target| ancestor_path(target, &parents))
            .unwrap_or_default();
        update_hover(&mut pointer, &queue, next);
    }

    if cursor_left.read().count() > 0 {
        pointer.position = None;
        pointer.pressed = None;
        update_hover(&mut pointer, &queue, Vec::new());
    }

    for event in mouse_button_input.read() {
        if event.button != MouseButton::Left {
            continue;
        }

        let Some(position) = pointer.position else {
            tracing::debug!(window = ?event.window, "skipping mouse button input without cursor position");
            continue;
        };
        let target = hit_test(position, &nodes, &parents, &hidden);

        match event.state {
            ButtonState::Pressed => pointer.pressed = target,
            ButtonState::Released => {
                let pressed = pointer.pressed.take();
                if let Some(target) = target
                    && pressed == Some(target)
                {
                    tracing::trace!(?target, "click");
                    queue.push_pointer(target, PointerAction::Click);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_keep_shared_ancestors() {
        let mut world = World::new();
        let [root, a, b] = [(); 3].map(|_| world.spawn_empty().id());

        let (left, entered) = hover_transitions(&[a, root], &[b, root]);
        assert_eq!(left, vec![a]);
        assert_eq!(entered, vec![b]);

        let (left, entered) = hover_transitions(&[], &[b, root]);
        assert!(left.is_empty());
        assert_eq!(entered, vec![root, b]);

        let (left, entered) = hover_transitions(&[b, root], &[]);
        assert_eq!(left, vec![b, root]);
        assert!(entered.is_empty());
    }
}

use bevy_ecs::{
    entity::Entity,
    hierarchy::{ChildOf, Children},
    prelude::*,
};

use crate::ecs::{ElementId, Hidden, StyleClass, UiDocumentBody, UiNode};

fn first_document_body(world: &mut World) -> Option<Entity> {
    let mut query = world.query_filtered::<Entity, With<UiDocumentBody>>();
    query.iter(world).next()
}

/// Ensure a document body exists and return its entity id.
pub fn ensure_document_body(world: &mut World) -> Entity {
    if let Some(existing) = first_document_body(world) {
        return existing;
    }

    world.spawn((UiDocumentBody, UiNode::Div)).id()
}

/// Spawn a node, optionally as the last child of `parent`.
pub fn spawn_node<B: Bundle>(world: &mut World, parent: Option<Entity>, bundle: B) -> Entity {
    match parent {
        Some(parent) if world.get_entity(parent).is_ok() => {
            world.spawn((bundle, ChildOf(parent))).id()
        }
        _ => world.spawn(bundle).id(),
    }
}

/// Spawn an element of kind `node` carrying a single style class.
pub fn spawn_element(
    world: &mut World,
    parent: Option<Entity>,
    node: UiNode,
    class: &str,
) -> Entity {
    spawn_node(world, parent, (node, StyleClass::new(class)))
}

/// Move `child` to the end of `parent`'s children, detaching it from any previous parent.
pub fn append_child(world: &mut World, parent: Entity, child: Entity) {
    if world.get_entity(parent).is_err() || world.get_entity(child).is_err() {
        return;
    }

    world.entity_mut(child).insert(ChildOf(parent));
}

/// Remove `node` from its parent without destroying it.
///
/// Returns `false` when the node does not exist or had no parent.
pub fn detach_node(world: &mut World, node: Entity) -> bool {
    if world.get::<ChildOf>(node).is_none() {
        return false;
    }

    world.entity_mut(node).remove::<ChildOf>();
    true
}

#[must_use]
pub fn parent_of(world: &World, node: Entity) -> Option<Entity> {
    world.get::<ChildOf>(node).map(ChildOf::parent)
}

#[must_use]
pub fn children_of(world: &World, node: Entity) -> Vec<Entity> {
    world
        .get::<Children>(node)
        .map(|children| children.iter().collect())
        .unwrap_or_default()
}

/// All descendants of `node` in document order, excluding `node` itself.
#[must_use]
pub fn descendants_of(world: &World, node: Entity) -> Vec<Entity> {
    let mut out = Vec::new();
    let mut stack = children_of(world, node);
    stack.reverse();

    while let Some(next) = stack.pop() {
        out.push(next);
        let mut children = children_of(world, next);
        children.reverse();
        stack.extend(children);
    }

    out
}

/// Despawn `node` together with its whole subtree.
pub fn despawn_node_tree(world: &mut World, node: Entity) {
    for child in children_of(world, node) {
        if world.get_entity(child).is_ok() {
            despawn_node_tree(world, child);
        }
    }

    let _ = world.despawn(node);
}

/// Despawn every child subtree of `node`, leaving `node` itself in place.
pub fn clear_children(world: &mut World, node: Entity) {
    for child in children_of(world, node) {
        despawn_node_tree(world, child);
    }
}

/// Replace the whole content of `parent` with `child`.
///
/// The previous subtree is fully gone before the new child is attached.
pub fn replace_children(world: &mut World, parent: Entity, child: Entity) {
    clear_children(world, parent);
    append_child(world, parent, child);
}

pub fn set_hidden(world: &mut World, node: Entity, hidden: bool) {
    let Ok(mut entity) = world.get_entity_mut(node) else {
        return;
    };

    if hidden {
        entity.insert(Hidden);
    } else {
        entity.remove::<Hidden>();
    }
}

/// Whether `node` exists and neither it nor any ancestor is [`Hidden`].
#[must_use]
pub fn is_displayed(world: &World, node: Entity) -> bool {
    if world.get_entity(node).is_err() {
        return false;
    }

    let mut current = Some(node);
    while let Some(entity) = current {
        if world.get::<Hidden>(entity).is_some() {
            return false;
        }
        current = parent_of(world, entity);
    }

    true
}

pub fn add_class(world: &mut World, node: Entity, class: &str) {
    if let Some(mut classes) = world.get_mut::<StyleClass>(node) {
        classes.insert(class);
    } else if let Ok(mut entity) = world.get_entity_mut(node) {
        entity.insert(StyleClass::new(class));
    }
}

pub fn remove_class(world: &mut World, node: Entity, class: &str) {
    if let Some(mut classes) = world.get_mut::<StyleClass>(node) {
        classes.remove(class);
    }
}

#[must_use]
pub fn has_class(world: &World, node: Entity, class: &str) -> bool {
    world
        .get::<StyleClass>(node)
        .is_some_and(|classes| classes.contains(class))
}

#[must_use]
pub fn find_element_by_id(world: &mut World, id: &str) -> Option<Entity> {
    let mut query = world.query::<(Entity, &ElementId)>();
    query
        .iter(world)
        .find_map(|(entity, element_id)| (element_id.0 == id).then_some(entity))
}

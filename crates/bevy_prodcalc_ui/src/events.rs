use std::{any::Any, fmt, sync::Arc};

use bevy_ecs::{entity::Entity, prelude::Resource};
use crossbeam_queue::SegQueue;

/// Pointer interaction targeted at a UI node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// The pointer entered the node's bounds.
    Enter,
    /// The pointer left the node's bounds.
    Leave,
    /// Primary-button click on the node (deepest hit).
    Click,
    /// A form input's value changed.
    Change,
}

/// Type-erased UI event targeted at an entity.
pub struct UiEvent {
    pub entity: Entity,
    pub action: Box<dyn Any + Send + Sync>,
}

impl fmt::Debug for UiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiEvent")
            .field("entity", &self.entity)
            .field("action", &"<type-erased>")
            .finish()
    }
}

impl UiEvent {
    #[must_use]
    pub fn typed<T: Any + Send + Sync>(entity: Entity, action: T) -> Self {
        Self {
            entity,
            action: Box::new(action),
        }
    }

    fn is<T: Any>(&self) -> bool {
        self.action.is::<T>()
    }

    #[must_use]
    pub fn into_action<T: Any + Send + Sync>(self) -> Option<TypedUiEvent<T>> {
        match self.action.downcast::<T>() {
            Ok(action) => Some(TypedUiEvent {
                entity: self.entity,
                action: *action,
            }),
            Err(_) => None,
        }
    }
}

/// Typed UI event produced from a type-erased [`UiEvent`] queue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedUiEvent<T> {
    pub entity: Entity,
    pub action: T,
}

/// Lock-free queue shared between input bridges and dispatch systems.
#[derive(Resource, Clone, Debug)]
pub struct UiEventQueue {
    queue: Arc<SegQueue<UiEvent>>,
}

impl Default for UiEventQueue {
    fn default() -> Self {
        Self {
            queue: Arc::new(SegQueue::new()),
        }
    }
}

impl UiEventQueue {
    pub fn push(&self, event: UiEvent) {
        self.queue.push(event);
    }

    pub fn push_typed<T: Any + Send + Sync>(&self, entity: Entity, action: T) {
        self.push(UiEvent::typed(entity, action));
    }

    pub fn push_pointer(&self, entity: Entity, action: PointerAction) {
        self.push_typed(entity, action);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drain queue entries of type `T`, in push order.
    ///
    /// Entries of other types stay queued in their original relative order.
    #[must_use]
    pub fn drain_actions<T: Any + Send + Sync>(&self) -> Vec<TypedUiEvent<T>> {
        let mut drained = Vec::new();
        let mut others = Vec::new();
        while let Some(event) = self.queue.pop() {
            if event.is::<T>() {
                if let Some(event) = event.into_action::<T>() {
                    drained.push(event);
                }
            } else {
                others.push(event);
            }
        }
        for event in others {
            self.queue.push(event);
        }
        drained
    }
}

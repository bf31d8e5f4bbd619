//! Dependencies injected into the checklist reducer.

use crate::repository::TodoRepository;
use crate::types::{CategoryId, TodoId};
use checklist_core::environment::{Clock, SystemClock};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of identities for new todos and categories
pub trait IdGenerator: Send + Sync {
    /// Id for a todo about to be saved
    fn new_todo_id(&self) -> TodoId;

    /// Id for a category about to be saved
    fn new_category_id(&self) -> CategoryId;
}

/// Random (v4) ids
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn new_todo_id(&self) -> TodoId {
        TodoId::new()
    }

    fn new_category_id(&self) -> CategoryId {
        CategoryId::new()
    }
}

/// Predictable ids `00000000-0000-0000-0000-000000000001`, `...02`, ...
///
/// Todos and categories share the counter.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Starts counting at 1
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    fn next_uuid(&self) -> Uuid {
        Uuid::from_u128(u128::from(self.next.fetch_add(1, Ordering::SeqCst) + 1))
    }
}

impl IdGenerator for SequentialIds {
    fn new_todo_id(&self) -> TodoId {
        TodoId::from_uuid(self.next_uuid())
    }

    fn new_category_id(&self) -> CategoryId {
        CategoryId::from_uuid(self.next_uuid())
    }
}

/// Environment dependencies for the checklist reducer
///
/// Passed to `Store::new` once; the reducer reaches storage, time and id
/// generation only through it.
pub struct TodoEnvironment<R: TodoRepository> {
    /// Persistence
    pub repository: Arc<R>,
    /// Clock for `created_at`
    pub clock: Arc<dyn Clock>,
    /// Id source for new rows
    pub ids: Arc<dyn IdGenerator>,
}

impl<R: TodoRepository> TodoEnvironment<R> {
    /// Creates an environment from explicit dependencies
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            repository,
            clock,
            ids,
        }
    }

    /// System clock and random ids around `repository`
    #[must_use]
    pub fn live(repository: Arc<R>) -> Self {
        Self::new(repository, Arc::new(SystemClock), Arc::new(RandomIds))
    }
}

impl<R: TodoRepository> Clone for TodoEnvironment<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            ids: Arc::clone(&self.ids),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new();
        assert_eq!(ids.new_todo_id().as_uuid().as_u128(), 1);
        assert_eq!(ids.new_category_id().as_uuid().as_u128(), 2);
        assert_eq!(ids.new_todo_id().as_uuid().as_u128(), 3);
    }

    #[test]
    fn random_ids_differ() {
        assert_ne!(RandomIds.new_todo_id(), RandomIds.new_todo_id());
    }
}

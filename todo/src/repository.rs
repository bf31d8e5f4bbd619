//! Persistence boundary of the checklist feature.
//!
//! The reducer never touches storage directly: it returns effects that call
//! a [`TodoRepository`] and feed the result back as a response action. Any
//! engine that satisfies the contract below can be injected.

use crate::types::{Category, CategoryId, Todo, TodoId};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors returned by repository operations
///
/// Cloneable and comparable so it can travel inside actions.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepositoryError {
    /// No todo with this id is stored
    #[error("todo {0} not found")]
    TodoNotFound(TodoId),

    /// No category with this id is stored
    #[error("category {0} not found")]
    CategoryNotFound(CategoryId),

    /// The storage engine failed
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored row could not be turned back into a value
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Storage contract for todos and categories
///
/// Every operation commits on its own; there are no transactions spanning
/// several calls. Deleting a category unlinks the todos that referenced it
/// and never deletes them.
pub trait TodoRepository: Send + Sync + 'static {
    /// All todos, newest `created_at` first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] if the engine fails.
    fn fetch_todos(&self) -> impl Future<Output = Result<Vec<Todo>>> + Send;

    /// All categories, by name ascending.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] if the engine fails.
    fn fetch_categories(&self) -> impl Future<Output = Result<Vec<Category>>> + Send;

    /// Stores a new todo under the id it already carries.
    ///
    /// A `category_id` that matches no stored category is dropped and the
    /// todo is stored unlinked. Returns the todo as stored.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] if the engine fails or the id is
    /// already taken.
    fn save_todo(&self, todo: Todo) -> impl Future<Output = Result<Todo>> + Send;

    /// Overwrites every mutable field of a stored todo.
    ///
    /// `created_at` is never changed. An unknown `category_id` is stored as
    /// unlinked. Returns the todo as stored.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::TodoNotFound`] if no todo has this id
    /// - [`RepositoryError::Storage`] if the engine fails
    fn update_todo(&self, todo: Todo) -> impl Future<Output = Result<Todo>> + Send;

    /// Deletes a todo.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::TodoNotFound`] if no todo has this id
    /// - [`RepositoryError::Storage`] if the engine fails
    fn delete_todo(&self, id: TodoId) -> impl Future<Output = Result<()>> + Send;

    /// Stores a new category.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] if the engine fails or the id is
    /// already taken.
    fn save_category(&self, category: Category) -> impl Future<Output = Result<Category>> + Send;

    /// Deletes a category and unlinks its todos.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::CategoryNotFound`] if no category has this id
    /// - [`RepositoryError::Storage`] if the engine fails
    fn delete_category(&self, id: CategoryId) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Default)]
struct Tables {
    todos: Vec<Todo>,
    categories: Vec<Category>,
    fail_next: Option<RepositoryError>,
    calls: usize,
}

impl Tables {
    /// Counts the call and returns the injected failure, if any
    fn begin(&mut self) -> Result<()> {
        self.calls += 1;
        self.fail_next.take().map_or(Ok(()), Err)
    }

    fn known_category(&self, id: Option<CategoryId>) -> Option<CategoryId> {
        id.filter(|id| self.categories.iter().any(|c| c.id == *id))
    }
}

/// In-memory repository
///
/// Keeps both tables behind one lock. Cloning shares the tables, so a test
/// can keep a handle and inspect storage after the store has written to it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryTodoRepository {
    /// Creates an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding the given rows
    #[must_use]
    pub fn with_data(todos: Vec<Todo>, categories: Vec<Category>) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables {
                todos,
                categories,
                fail_next: None,
                calls: 0,
            })),
        }
    }

    /// Makes the next operation fail with `error`
    pub fn fail_next(&self, error: RepositoryError) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.fail_next = Some(error);
        }
    }

    /// Number of operations called so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.tables.lock().map_or(0, |tables| tables.calls)
    }

    fn with_tables<T>(&self, f: impl FnOnce(&mut Tables) -> Result<T>) -> Result<T> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| RepositoryError::Storage("in-memory tables poisoned".to_string()))?;
        tables.begin()?;
        f(&mut tables)
    }
}

impl TodoRepository for InMemoryTodoRepository {
    fn fetch_todos(&self) -> impl Future<Output = Result<Vec<Todo>>> + Send {
        let result = self.with_tables(|tables| {
            let mut todos = tables.todos.clone();
            todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(todos)
        });
        async move { result }
    }

    fn fetch_categories(&self) -> impl Future<Output = Result<Vec<Category>>> + Send {
        let result = self.with_tables(|tables| {
            let mut categories = tables.categories.clone();
            categories.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(categories)
        });
        async move { result }
    }

    fn save_todo(&self, todo: Todo) -> impl Future<Output = Result<Todo>> + Send {
        let result = self.with_tables(|tables| {
            if tables.todos.iter().any(|t| t.id == todo.id) {
                return Err(RepositoryError::Storage(format!("todo {} already exists", todo.id)));
            }
            let stored = Todo {
                category_id: tables.known_category(todo.category_id),
                ..todo
            };
            tables.todos.push(stored.clone());
            Ok(stored)
        });
        async move { result }
    }

    fn update_todo(&self, todo: Todo) -> impl Future<Output = Result<Todo>> + Send {
        let result = self.with_tables(|tables| {
            let category_id = tables.known_category(todo.category_id);
            let stored = tables
                .todos
                .iter_mut()
                .find(|t| t.id == todo.id)
                .ok_or(RepositoryError::TodoNotFound(todo.id))?;

            stored.title = todo.title;
            stored.is_completed = todo.is_completed;
            stored.due_date = todo.due_date;
            stored.reminder_date = todo.reminder_date;
            stored.notes = todo.notes;
            stored.category_id = category_id;
            Ok(stored.clone())
        });
        async move { result }
    }

    fn delete_todo(&self, id: TodoId) -> impl Future<Output = Result<()>> + Send {
        let result = self.with_tables(|tables| {
            let index = tables
                .todos
                .iter()
                .position(|t| t.id == id)
                .ok_or(RepositoryError::TodoNotFound(id))?;
            tables.todos.remove(index);
            Ok(())
        });
        async move { result }
    }

    fn save_category(&self, category: Category) -> impl Future<Output = Result<Category>> + Send {
        let result = self.with_tables(|tables| {
            if tables.categories.iter().any(|c| c.id == category.id) {
                return Err(RepositoryError::Storage(format!(
                    "category {} already exists",
                    category.id
                )));
            }
            tables.categories.push(category.clone());
            Ok(category)
        });
        async move { result }
    }

    fn delete_category(&self, id: CategoryId) -> impl Future<Output = Result<()>> + Send {
        let result = self.with_tables(|tables| {
            let index = tables
                .categories
                .iter()
                .position(|c| c.id == id)
                .ok_or(RepositoryError::CategoryNotFound(id))?;
            tables.categories.remove(index);
            for todo in tables.todos.iter_mut().filter(|t| t.category_id == Some(id)) {
                todo.category_id = None;
            }
            Ok(())
        });
        async move { result }
    }
}

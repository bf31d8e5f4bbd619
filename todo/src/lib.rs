//! Checklist feature: todos grouped into categories, persisted through a
//! pluggable repository with optimistic updates.
//!
//! The reducer is a pure function of `(state, action, environment)`. Every
//! repository call is returned as an effect whose result comes back as a
//! response action. Toggles and edits are applied to state immediately and
//! tracked per todo in [`TodoState::sync`]: a response is applied only if it
//! answers the latest request for that todo.
//!
//! Two storage engines implement [`TodoRepository`]:
//!
//! - [`InMemoryTodoRepository`] for tests and ephemeral sessions
//! - [`sqlite::SqliteTodoRepository`] backed by `sqlx`
//!
//! # Quick Start
//!
//! ```no_run
//! use checklist::{InMemoryTodoRepository, TodoAction, TodoEnvironment, TodoReducer, TodoState};
//! use checklist_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = TodoEnvironment::live(Arc::new(InMemoryTodoRepository::new()));
//! let store = Store::new(TodoState::new(), TodoReducer::new(), env);
//!
//! store.send(TodoAction::OnAppear).await?.wait().await;
//!
//! store
//!     .send(TodoAction::NewTodoTextChanged("Buy milk".to_string()))
//!     .await?;
//! store.send(TodoAction::AddTodoButtonTapped).await?.wait().await;
//!
//! let count = store.state(TodoState::count).await;
//! println!("Todos: {count}");
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod app;
pub mod config;
pub mod environment;
pub mod reducer;
pub mod repository;
pub mod sqlite;
pub mod types;

pub use actions::TodoAction;
pub use app::{app_reducer, AppAction, AppReducer, AppState};
pub use config::{Config, ConfigError, StorageKind};
pub use environment::{IdGenerator, RandomIds, SequentialIds, TodoEnvironment};
pub use reducer::TodoReducer;
pub use repository::{InMemoryTodoRepository, RepositoryError, TodoRepository};
pub use types::{
    Category, CategoryId, IdentifiedVec, SortOrder, SyncStatus, Todo, TodoChanges, TodoFilter,
    TodoId, TodoState,
};

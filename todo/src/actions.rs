//! Actions of the checklist feature.

use crate::repository::RepositoryError;
use crate::types::{Category, CategoryId, SortOrder, Todo, TodoChanges, TodoFilter, TodoId};
use checklist_macros::Action;
use serde::{Deserialize, Serialize};

/// Everything that can happen to the checklist
///
/// Intents come from the user; responses carry the result of a repository
/// call back into the reducer.
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TodoAction {
    // ========== Intents ==========
    /// The new-todo text field changed
    #[intent]
    NewTodoTextChanged(String),

    /// Submit the text field as a new todo
    #[intent]
    AddTodoButtonTapped,

    /// Flip completion of a todo
    #[intent]
    TodoToggled {
        /// Todo to toggle
        id: TodoId,
    },

    /// Delete the todos at the given display offsets
    #[intent]
    DeleteTodos {
        /// Offsets into `TodoState::todos`
        offsets: Vec<usize>,
    },

    /// The list became visible
    #[intent]
    OnAppear,

    /// The list was hidden
    #[intent]
    OnDisappear,

    /// Create a category
    #[intent]
    CreateCategory {
        /// Display name
        name: String,
        /// Color, defaults to `DEFAULT_COLOR_HEX`
        color_hex: Option<String>,
        /// Symbol name
        icon_name: Option<String>,
    },

    /// Delete a category, unlinking its todos
    #[intent]
    DeleteCategory {
        /// Category to delete
        id: CategoryId,
    },

    /// Choose the category given to new todos
    #[intent]
    SelectCategory(Option<CategoryId>),

    /// Start editing a todo
    #[intent]
    EditTodo(Todo),

    /// Stop editing without saving
    #[intent]
    CancelEditing,

    /// Apply a partial update to a todo
    #[intent]
    UpdateTodo {
        /// Todo to update
        id: TodoId,
        /// Fields to overwrite
        changes: TodoChanges,
    },

    /// Change the visible subset
    #[intent]
    FilterChanged(TodoFilter),

    /// Change the presentation order
    #[intent]
    SortOrderChanged(SortOrder),

    /// Clear the last reported failure
    #[intent]
    DismissError,

    // ========== Responses ==========
    /// Result of saving a new todo
    #[response]
    TodoSaved(Result<Todo, RepositoryError>),

    /// Result of loading all todos
    #[response]
    TodosLoaded(Result<Vec<Todo>, RepositoryError>),

    /// Result of loading all categories
    #[response]
    CategoriesLoaded(Result<Vec<Category>, RepositoryError>),

    /// Result of saving a new category
    #[response]
    CategorySaved(Result<Category, RepositoryError>),

    /// Result of persisting a toggle or an update
    #[response]
    TodoUpdated {
        /// Todo that was updated
        id: TodoId,
        /// Generation the request was issued with
        generation: u64,
        /// Stored todo or failure
        result: Result<Todo, RepositoryError>,
    },

    /// Result of deleting one todo
    #[response]
    TodoDeleted {
        /// Todo that was deleted
        id: TodoId,
        /// Outcome
        result: Result<(), RepositoryError>,
    },

    /// Result of deleting a category
    #[response]
    CategoryDeleted {
        /// Category that was deleted
        id: CategoryId,
        /// Outcome
        result: Result<(), RepositoryError>,
    },
}

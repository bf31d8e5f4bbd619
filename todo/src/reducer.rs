//! Reducer for the checklist feature.
//!
//! Every state change happens here, synchronously. Anything that touches
//! storage is returned as an effect whose result comes back as a response
//! action.
//!
//! Toggles and updates are applied optimistically. Each one bumps the todo's
//! sync generation; a response only lands if it answers the latest request,
//! and a failure marks the todo as failed without rolling the change back.

use crate::actions::TodoAction;
use crate::environment::TodoEnvironment;
use crate::repository::{RepositoryError, TodoRepository};
use crate::types::{
    Category, CategoryId, IdentifiedVec, SyncStatus, Todo, TodoFilter, TodoId, TodoState,
    DEFAULT_COLOR_HEX,
};
use checklist_core::{effect::Effect, perform, reducer::Reducer, smallvec, SmallVec};
use std::marker::PhantomData;
use std::sync::Arc;

type Effects = SmallVec<[Effect<TodoAction>; 4]>;

/// Reducer for the checklist feature
///
/// Generic over the repository so the environment can be injected with any
/// storage engine.
pub struct TodoReducer<R> {
    _repository: PhantomData<fn() -> R>,
}

impl<R> TodoReducer<R> {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _repository: PhantomData,
        }
    }
}

impl<R> Default for TodoReducer<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for TodoReducer<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for TodoReducer<R> {}

impl<R> std::fmt::Debug for TodoReducer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TodoReducer")
    }
}

impl<R: TodoRepository> TodoReducer<R> {
    fn save_todo(env: &TodoEnvironment<R>, todo: Todo) -> Effect<TodoAction> {
        let repository = Arc::clone(&env.repository);
        perform! {
            call: repository.save_todo(todo),
            then: TodoAction::TodoSaved
        }
    }

    fn update_todo(env: &TodoEnvironment<R>, todo: Todo, generation: u64) -> Effect<TodoAction> {
        let repository = Arc::clone(&env.repository);
        let id = todo.id;
        perform! {
            call: repository.update_todo(todo),
            then: |result| TodoAction::TodoUpdated { id, generation, result }
        }
    }

    fn delete_todo(env: &TodoEnvironment<R>, id: TodoId) -> Effect<TodoAction> {
        let repository = Arc::clone(&env.repository);
        perform! {
            call: repository.delete_todo(id),
            then: |result| TodoAction::TodoDeleted { id, result }
        }
    }

    fn load_all(env: &TodoEnvironment<R>) -> Effect<TodoAction> {
        let todos = Arc::clone(&env.repository);
        let categories = Arc::clone(&env.repository);
        Effect::chain(vec![
            perform! {
                call: todos.fetch_todos(),
                then: TodoAction::TodosLoaded
            },
            perform! {
                call: categories.fetch_categories(),
                then: TodoAction::CategoriesLoaded
            },
        ])
    }

    fn save_category(env: &TodoEnvironment<R>, category: Category) -> Effect<TodoAction> {
        let repository = Arc::clone(&env.repository);
        perform! {
            call: repository.save_category(category),
            then: TodoAction::CategorySaved
        }
    }

    fn delete_category(env: &TodoEnvironment<R>, id: CategoryId) -> Effect<TodoAction> {
        let repository = Arc::clone(&env.repository);
        perform! {
            call: repository.delete_category(id),
            then: |result| TodoAction::CategoryDeleted { id, result }
        }
    }

    /// Surfaces a failed repository call
    fn report(state: &mut TodoState, action: &'static str, error: &RepositoryError) {
        tracing::warn!(action, %error, "Repository operation failed");
        state.last_error = Some(error.to_string());
    }

    fn add_todo(state: &mut TodoState, env: &TodoEnvironment<R>) -> Effects {
        if state.new_todo_text.is_empty() {
            return SmallVec::new();
        }

        let title = std::mem::take(&mut state.new_todo_text);
        let todo = Todo::new(env.ids.new_todo_id(), title, env.clock.now())
            .with_category(state.selected_category_id);

        tracing::debug!(id = %todo.id, "Saving new todo");
        smallvec![Self::save_todo(env, todo)]
    }

    fn delete_todos(state: &mut TodoState, env: &TodoEnvironment<R>, offsets: &[usize]) -> Effects {
        let out_of_range = offsets.iter().filter(|&&o| o >= state.todos.len()).count();
        if out_of_range > 0 {
            tracing::warn!(out_of_range, "Ignoring offsets outside the todo list");
        }

        let removed = state.todos.remove_at_offsets(offsets);
        if removed.is_empty() {
            return SmallVec::new();
        }

        for todo in &removed {
            state.sync.remove(&todo.id);
        }
        if state
            .editing_todo
            .as_ref()
            .is_some_and(|editing| removed.iter().any(|t| t.id == editing.id))
        {
            state.editing_todo = None;
        }

        smallvec![Effect::chain(
            removed
                .iter()
                .map(|todo| Self::delete_todo(env, todo.id))
                .collect()
        )]
    }

    fn remove_category(state: &mut TodoState, env: &TodoEnvironment<R>, id: CategoryId) -> Effects {
        if state.categories.remove(id).is_none() {
            tracing::warn!(%id, "Delete requested for unknown category");
            return SmallVec::new();
        }

        let linked = state
            .todos
            .iter_mut()
            .chain(state.editing_todo.as_mut())
            .filter(|todo| todo.category_id == Some(id));
        for todo in linked {
            todo.category_id = None;
        }

        if state.selected_category_id == Some(id) {
            state.selected_category_id = None;
        }
        if state.filter == TodoFilter::Category(id) {
            state.filter = TodoFilter::All;
        }

        smallvec![Self::delete_category(env, id)]
    }

    /// Clears a link to a category that is no longer listed
    ///
    /// A save or update can be in flight while its category is deleted.
    fn unlink_deleted_category(state: &TodoState, mut todo: Todo) -> Todo {
        if let Some(category_id) = todo.category_id {
            if !state.categories.contains(category_id) {
                tracing::debug!(id = %todo.id, %category_id, "Unlinking deleted category");
                todo.category_id = None;
            }
        }
        todo
    }

    fn apply_update(
        state: &mut TodoState,
        id: TodoId,
        generation: u64,
        result: Result<Todo, RepositoryError>,
    ) {
        if !state.is_current(id, generation) {
            tracing::debug!(%id, generation, "Ignoring response to a superseded request");
            return;
        }

        match result {
            Ok(todo) => {
                let todo = Self::unlink_deleted_category(state, todo);
                state.todos.replace(todo);
                state.finish_sync(id, SyncStatus::Confirmed);
            },
            Err(error) => {
                Self::report(state, "TodoUpdated", &error);
                state.finish_sync(id, SyncStatus::Failed(error.to_string()));
            },
        }
    }
}

impl<R: TodoRepository> Reducer for TodoReducer<R> {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment<R>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(
            action = action.action_name(),
            response = action.is_response(),
            "Reducing action"
        );

        match action {
            // ========== Intents ==========
            TodoAction::NewTodoTextChanged(text) => {
                state.new_todo_text = text;
                SmallVec::new()
            },

            TodoAction::AddTodoButtonTapped => Self::add_todo(state, env),

            TodoAction::TodoToggled { id } => {
                let Some(todo) = state.todos.get_mut(id) else {
                    tracing::warn!(%id, "Toggle requested for unknown todo");
                    return SmallVec::new();
                };
                todo.is_completed = !todo.is_completed;
                let todo = todo.clone();

                let generation = state.begin_sync(id);
                smallvec![Self::update_todo(env, todo, generation)]
            },

            TodoAction::DeleteTodos { offsets } => Self::delete_todos(state, env, &offsets),

            TodoAction::OnAppear => {
                state.is_loading = true;
                smallvec![Self::load_all(env)]
            },

            TodoAction::OnDisappear => SmallVec::new(),

            TodoAction::CreateCategory {
                name,
                color_hex,
                icon_name,
            } => {
                let category = Category {
                    id: env.ids.new_category_id(),
                    name,
                    color_hex: color_hex.unwrap_or_else(|| DEFAULT_COLOR_HEX.to_string()),
                    icon_name,
                };
                smallvec![Self::save_category(env, category)]
            },

            TodoAction::DeleteCategory { id } => Self::remove_category(state, env, id),

            TodoAction::SelectCategory(id) => {
                state.selected_category_id = id;
                SmallVec::new()
            },

            TodoAction::EditTodo(todo) => {
                state.editing_todo = Some(todo);
                SmallVec::new()
            },

            TodoAction::CancelEditing => {
                state.editing_todo = None;
                SmallVec::new()
            },

            TodoAction::UpdateTodo { id, changes } => {
                let Some(todo) = state.todos.get_mut(id) else {
                    tracing::warn!(%id, "Update requested for unknown todo");
                    return SmallVec::new();
                };
                changes.apply_to(todo);
                let todo = todo.clone();

                state.editing_todo = None;
                let generation = state.begin_sync(id);
                smallvec![Self::update_todo(env, todo, generation)]
            },

            TodoAction::FilterChanged(filter) => {
                state.filter = filter;
                SmallVec::new()
            },

            TodoAction::SortOrderChanged(sort_order) => {
                state.sort_order = sort_order;
                SmallVec::new()
            },

            TodoAction::DismissError => {
                state.last_error = None;
                SmallVec::new()
            },

            // ========== Responses ==========
            TodoAction::TodoSaved(Ok(todo)) => {
                let todo = Self::unlink_deleted_category(state, todo);
                if !state.todos.insert_front(todo) {
                    tracing::debug!("Saved todo is already listed");
                }
                SmallVec::new()
            },

            TodoAction::TodosLoaded(Ok(todos)) => {
                state.is_loading = false;
                state.todos = IdentifiedVec::from_iter_dedup(todos);
                let listed = &state.todos;
                state.sync.retain(|id, _| listed.contains(*id));
                SmallVec::new()
            },

            TodoAction::TodosLoaded(Err(error)) => {
                state.is_loading = false;
                Self::report(state, "TodosLoaded", &error);
                SmallVec::new()
            },

            TodoAction::CategoriesLoaded(Ok(categories)) => {
                state.categories = IdentifiedVec::from_iter_dedup(categories);
                SmallVec::new()
            },

            TodoAction::CategorySaved(Ok(category)) => {
                if !state.categories.push(category) {
                    tracing::debug!("Saved category is already listed");
                }
                SmallVec::new()
            },

            TodoAction::TodoUpdated {
                id,
                generation,
                result,
            } => {
                Self::apply_update(state, id, generation, result);
                SmallVec::new()
            },

            TodoAction::TodoDeleted { result: Ok(()), .. }
            | TodoAction::CategoryDeleted { result: Ok(()), .. } => SmallVec::new(),

            TodoAction::TodoSaved(Err(error)) => {
                Self::report(state, "TodoSaved", &error);
                SmallVec::new()
            },

            TodoAction::CategoriesLoaded(Err(error)) => {
                Self::report(state, "CategoriesLoaded", &error);
                SmallVec::new()
            },

            TodoAction::CategorySaved(Err(error)) => {
                Self::report(state, "CategorySaved", &error);
                SmallVec::new()
            },

            TodoAction::TodoDeleted {
                result: Err(error), ..
            } => {
                Self::report(state, "TodoDeleted", &error);
                SmallVec::new()
            },

            TodoAction::CategoryDeleted {
                result: Err(error), ..
            } => {
                Self::report(state, "CategoryDeleted", &error);
                SmallVec::new()
            },
        }
    }
}

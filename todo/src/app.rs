//! Root feature composing the checklist into an application.

use crate::actions::TodoAction;
use crate::environment::TodoEnvironment;
use crate::reducer::TodoReducer;
use crate::types::TodoState;
use checklist_core::composition::{pullback, PullbackReducer};
use serde::{Deserialize, Serialize};

/// Application state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// The checklist feature
    pub todo_feature: TodoState,
}

/// Application actions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AppAction {
    /// An action for the checklist feature
    TodoFeature(TodoAction),
}

/// Root reducer: the checklist reducer lifted into the application domain
pub type AppReducer<R> =
    PullbackReducer<AppState, TodoState, AppAction, TodoAction, TodoEnvironment<R>, TodoReducer<R>>;

/// Builds the root reducer
#[must_use]
pub fn app_reducer<R: crate::repository::TodoRepository>() -> AppReducer<R> {
    pullback(TodoReducer::new(), todo_feature, todo_action, AppAction::TodoFeature)
}

fn todo_feature(state: &mut AppState) -> &mut TodoState {
    &mut state.todo_feature
}

#[allow(clippy::unnecessary_wraps)]
fn todo_action(action: AppAction) -> Option<TodoAction> {
    match action {
        AppAction::TodoFeature(action) => Some(action),
    }
}

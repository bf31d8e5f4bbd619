//! Reducer composition.
//!
//! [`pullback`] lifts a child feature (state *and* action) into a parent, so
//! an application reducer can host a feature reducer unchanged.
//!
//! # Example
//!
//! ```
//! use checklist_core::composition::pullback;
//! use checklist_core::{smallvec, Effect, Reducer, SmallVec};
//!
//! #[derive(Clone, Default)]
//! struct ListState {
//!     items: Vec<String>,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum ListAction {
//!     Add(String),
//! }
//!
//! struct ListReducer;
//!
//! impl Reducer for ListReducer {
//!     type State = ListState;
//!     type Action = ListAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut ListState, action: ListAction, _env: &()) -> SmallVec<[Effect<ListAction>; 4]> {
//!         let ListAction::Add(item) = action;
//!         state.items.push(item);
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! #[derive(Clone, Default)]
//! struct AppState {
//!     list: ListState,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum AppAction {
//!     List(ListAction),
//!     Quit,
//! }
//!
//! let app = pullback(
//!     ListReducer,
//!     |s: &mut AppState| &mut s.list,
//!     |a: AppAction| match a {
//!         AppAction::List(action) => Some(action),
//!         AppAction::Quit => None,
//!     },
//!     AppAction::List,
//! );
//!
//! let mut state = AppState::default();
//! let _ = app.reduce(&mut state, AppAction::List(ListAction::Add("milk".into())), &());
//! let _ = app.reduce(&mut state, AppAction::Quit, &());
//! assert_eq!(state.list.items, vec!["milk".to_string()]);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Lifts a child reducer into a parent domain.
///
/// - `state`: projects the parent state onto the child state
/// - `extract`: returns the child action if the parent action is one, `None` otherwise
/// - `embed`: wraps a child action (produced by child effects) into a parent action
///
/// Parent actions that are not child actions are ignored and produce no effects.
pub fn pullback<S, SubS, A, SubA, E, R>(
    reducer: R,
    state: fn(&mut S) -> &mut SubS,
    extract: fn(A) -> Option<SubA>,
    embed: fn(SubA) -> A,
) -> PullbackReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    PullbackReducer {
        reducer,
        state,
        extract,
        embed,
        _phantom: std::marker::PhantomData,
    }
}

/// A child reducer lifted into a parent state and action domain.
///
/// Created by [`pullback`].
pub struct PullbackReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    reducer: R,
    state: fn(&mut S) -> &mut SubS,
    extract: fn(A) -> Option<SubA>,
    embed: fn(SubA) -> A,
    _phantom: std::marker::PhantomData<fn() -> E>,
}

impl<S, SubS, A, SubA, E, R> Clone for PullbackReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            reducer: self.reducer.clone(),
            state: self.state,
            extract: self.extract,
            embed: self.embed,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<S, SubS, A, SubA, E, R> Reducer for PullbackReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
    A: Send + 'static,
    SubA: Send + 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(child_action) = (self.extract)(action) else {
            return SmallVec::new();
        };

        let embed = self.embed;
        self.reducer
            .reduce((self.state)(state), child_action, env)
            .into_iter()
            .map(|effect| effect.map(embed))
            .collect()
    }
}

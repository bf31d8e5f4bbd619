//! Declarative macro for the "call a dependency, map its result into an
//! action" effect that every persistence call has.

/// Create an `Effect::Future` that awaits a fallible call and always feeds
/// the `Result` back as an action
///
/// # Example
///
/// ```
/// use checklist_core::{perform, effect::Effect};
///
/// #[derive(Debug)]
/// enum Action {
///     Fetched(Result<u32, String>),
/// }
///
/// async fn fetch() -> Result<u32, String> {
///     Ok(7)
/// }
///
/// let effect: Effect<Action> = perform! {
///     call: fetch(),
///     then: Action::Fetched
/// };
/// assert!(matches!(effect, Effect::Future(_)));
/// ```
#[macro_export]
macro_rules! perform {
    (
        call: $call:expr,
        then: $then:expr
    ) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            let result = $call.await;
            ::std::option::Option::Some(($then)(result))
        }))
    };
}

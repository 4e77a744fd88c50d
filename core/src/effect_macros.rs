//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block body
///
/// # Example
///
/// ```rust,ignore
/// use composable_pokedex_core::async_effect;
///
/// async_effect! {
///     let page = api.fetch_page(&filters).await;
///     Some(PokemonAction::from_page(page))
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use composable_pokedex_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(3),
///     action: CounterAction::IncrementAsyncSuccess
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Create an `Effect::Cancellable` wrapping an async block body
///
/// Only the most recently started effect under `id` keeps running.
///
/// # Example
///
/// ```rust,ignore
/// use composable_pokedex_core::switch_effect;
///
/// switch_effect! {
///     id: FETCH_POKEMONS,
///     let page = api.fetch_page(&filters).await;
///     Some(PokemonAction::from_page(page))
/// }
/// ```
#[macro_export]
macro_rules! switch_effect {
    (id: $id:expr, $($body:tt)*) => {
        $crate::effect::Effect::Cancellable {
            id: $id,
            effect: ::std::boxed::Box::new($crate::async_effect! { $($body)* }),
        }
    };
}

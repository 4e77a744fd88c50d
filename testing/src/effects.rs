//! Running effect descriptions outside a Store.
//!
//! Reducer tests usually stop at "the reducer returned a Future effect".
//! [`collect_actions`] goes one step further and drives those effects to
//! see which actions they would feed back, without a Store and without
//! feeding the actions anywhere.

use composable_pokedex_core::effect::Effect;
use futures::future::BoxFuture;
use futures::FutureExt;

/// Drive `effects` and return the actions they produce
///
/// - `Future` effects are awaited
/// - `Delay` effects yield their action immediately, without sleeping
/// - `Parallel` and `Sequential` effects are walked in order
/// - `Cancel` effects are ignored
pub async fn collect_actions<A, I>(effects: I) -> Vec<A>
where
    A: Send + 'static,
    I: IntoIterator<Item = Effect<A>>,
{
    let mut actions = Vec::new();
    for effect in effects {
        actions.extend(collect(effect).await);
    }
    actions
}

fn collect<A: Send + 'static>(effect: Effect<A>) -> BoxFuture<'static, Vec<A>> {
    async move {
        match effect {
            Effect::None | Effect::Cancel(_) => Vec::new(),
            Effect::Future(future) => future.await.into_iter().collect(),
            Effect::Delay { action, .. } => vec![*action],
            Effect::Cancellable { effect, .. } => collect(*effect).await,
            Effect::Parallel(effects) | Effect::Sequential(effects) => {
                let mut actions = Vec::new();
                for effect in effects {
                    actions.extend(collect(effect).await);
                }
                actions
            },
        }
    }
    .boxed()
}

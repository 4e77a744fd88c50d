//! Integration tests for Store effect execution
//!
//! Covers the action feedback loop, latest-wins cancellation, effect ordering,
//! action broadcasting and shutdown.

use composable_pokedex_core::effect::{Effect, EffectId};
use composable_pokedex_core::reducer::Reducer;
use composable_pokedex_core::{smallvec, SmallVec};
use composable_pokedex_runtime::{Store, StoreError};
use std::time::Duration;

const LOAD: EffectId = EffectId::new("load");
const SETTLE: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, Default)]
struct TestState {
    total: i32,
    loading: bool,
    loaded: Vec<u32>,
    recorded: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq)]
enum TestAction {
    Add(i32),
    Load { value: u32, after: Duration },
    Loaded(u32),
    StopLoading,
    RecordInOrder(Vec<(u32, Duration)>),
    RecordTogether(Vec<(u32, Duration)>),
    Record(u32),
    Sleep(Duration),
}

#[derive(Clone)]
struct TestReducer;

fn delayed(value: u32, after: Duration) -> Effect<TestAction> {
    Effect::Delay {
        duration: after,
        action: Box::new(TestAction::Record(value)),
    }
}

impl Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TestAction::Add(n) => {
                state.total += n;
                SmallVec::new()
            },
            TestAction::Load { value, after } => {
                state.loading = true;
                smallvec![Effect::future(async move {
                    tokio::time::sleep(after).await;
                    Some(TestAction::Loaded(value))
                })
                .cancellable(LOAD)]
            },
            TestAction::Loaded(value) => {
                state.loading = false;
                state.loaded.push(value);
                SmallVec::new()
            },
            TestAction::StopLoading => {
                state.loading = false;
                smallvec![Effect::Cancel(LOAD)]
            },
            TestAction::RecordInOrder(steps) => {
                smallvec![Effect::chain(steps.into_iter().map(|(v, d)| delayed(v, d)).collect())]
            },
            TestAction::RecordTogether(steps) => {
                smallvec![Effect::merge(steps.into_iter().map(|(v, d)| delayed(v, d)).collect())]
            },
            TestAction::Record(value) => {
                state.recorded.push(value);
                SmallVec::new()
            },
            TestAction::Sleep(duration) => smallvec![Effect::future(async move {
                tokio::time::sleep(duration).await;
                None
            })],
        }
    }
}

fn test_store() -> Store<TestState, TestAction, (), TestReducer> {
    Store::new(TestState::default(), TestReducer, ())
}

#[tokio::test]
async fn test_send_reduces_before_returning() {
    let store = test_store();

    let _ = store.send(TestAction::Add(3)).await;
    let _ = store.send(TestAction::Add(-1)).await;

    assert_eq!(store.state(|s| s.total).await, 2);
}

#[tokio::test]
async fn test_future_effect_feeds_action_back() {
    let store = test_store();

    let _ = store
        .send(TestAction::Load {
            value: 7,
            after: Duration::from_millis(5),
        })
        .await;
    assert!(store.state(|s| s.loading).await);

    store.wait_idle(SETTLE).await.ok();

    let (loading, loaded) = store.state(|s| (s.loading, s.loaded.clone())).await;
    assert!(!loading);
    assert_eq!(loaded, vec![7]);
    assert!(!store.is_in_flight(LOAD));
}

#[tokio::test]
async fn test_latest_cancellable_effect_wins() {
    let store = test_store();

    let _ = store
        .send(TestAction::Load {
            value: 1,
            after: Duration::from_millis(200),
        })
        .await;
    let _ = store
        .send(TestAction::Load {
            value: 2,
            after: Duration::from_millis(10),
        })
        .await;

    store.wait_idle(SETTLE).await.ok();

    assert_eq!(store.state(|s| s.loaded.clone()).await, vec![2]);
}

#[tokio::test]
async fn test_cancel_effect_stops_in_flight_work() {
    let store = test_store();

    let _ = store
        .send(TestAction::Load {
            value: 9,
            after: Duration::from_millis(200),
        })
        .await;
    assert!(store.is_in_flight(LOAD));

    let _ = store.send(TestAction::StopLoading).await;
    store.wait_idle(Duration::from_millis(100)).await.ok();

    assert_eq!(store.pending_effects(), 0);
    assert!(store.state(|s| s.loaded.is_empty()).await);
    assert!(!store.cancel(LOAD), "nothing left to cancel");
}

#[tokio::test]
async fn test_sequential_effects_run_one_after_another() {
    let store = test_store();

    let _ = store
        .send(TestAction::RecordInOrder(vec![
            (1, Duration::from_millis(40)),
            (2, Duration::ZERO),
        ]))
        .await;
    store.wait_idle(SETTLE).await.ok();

    assert_eq!(store.state(|s| s.recorded.clone()).await, vec![1, 2]);
}

#[tokio::test]
async fn test_parallel_effects_run_concurrently() {
    let store = test_store();

    let _ = store
        .send(TestAction::RecordTogether(vec![
            (1, Duration::from_millis(40)),
            (2, Duration::ZERO),
        ]))
        .await;
    store.wait_idle(SETTLE).await.ok();

    assert_eq!(store.state(|s| s.recorded.clone()).await, vec![2, 1]);
}

#[tokio::test]
async fn test_effect_handle_waits_for_direct_effects() {
    let store = test_store();

    let handle = store.send(TestAction::Sleep(Duration::from_millis(20))).await;
    let Ok(mut handle) = handle else {
        unreachable!("store is running");
    };
    assert_eq!(handle.pending(), 1);

    assert!(handle.wait_with_timeout(SETTLE).await.is_ok());
    assert_eq!(handle.pending(), 0);
}

#[tokio::test]
async fn test_send_and_wait_for_returns_reduced_terminal_action() {
    let store = test_store();

    let result = store
        .send_and_wait_for(
            TestAction::Load {
                value: 4,
                after: Duration::from_millis(5),
            },
            |a| matches!(a, TestAction::Loaded(_)),
            SETTLE,
        )
        .await;

    assert_eq!(result, Ok(TestAction::Loaded(4)));
    assert_eq!(store.state(|s| s.loaded.clone()).await, vec![4]);
}

#[tokio::test]
async fn test_send_and_wait_for_times_out() {
    let store = test_store();

    let result = store
        .send_and_wait_for(TestAction::Add(1), |a| matches!(a, TestAction::Loaded(_)), Duration::from_millis(20))
        .await;

    assert_eq!(result, Err(StoreError::Timeout));
}

#[tokio::test]
async fn test_only_effect_actions_are_broadcast() {
    let store = test_store();
    let mut rx = store.subscribe_actions();

    let _ = store.send(TestAction::Add(1)).await;
    let _ = store
        .send(TestAction::Load {
            value: 5,
            after: Duration::ZERO,
        })
        .await;
    store.wait_idle(SETTLE).await.ok();

    assert_eq!(rx.recv().await.ok(), Some(TestAction::Loaded(5)));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_concurrent_sends_from_clones() {
    let store = test_store();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                let _ = store.send(TestAction::Add(1)).await;
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.is_ok());
    }

    assert_eq!(store.state(|s| s.total).await, 10);
}

#[tokio::test]
async fn test_shutdown_rejects_new_actions() {
    let store = test_store();

    assert_eq!(store.shutdown(SETTLE).await, Ok(()));

    let result = store.send(TestAction::Add(1)).await;
    assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
    assert_eq!(store.state(|s| s.total).await, 0);
}

#[tokio::test]
async fn test_shutdown_times_out_on_running_effects() {
    let store = test_store();

    let _ = store.send(TestAction::Sleep(Duration::from_secs(30))).await;

    let result = store.shutdown(Duration::from_millis(20)).await;
    assert_eq!(result, Err(StoreError::ShutdownTimeout(1)));
}

//! Integration tests for Store action broadcasting
//!
//! Observers see every action produced by an effect, which is how callers
//! wait for a particular repository response without polling state.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use checklist_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use checklist_runtime::{Store, StoreConfig, StoreError};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum SyncAction {
    /// Persist an item (simulated round-trip)
    Save { id: u64 },
    /// Persistence finished
    Saved { id: u64 },
    /// Load everything, one request after the other
    Load,
    /// A load step completed
    Loaded { step: u32 },
}

#[derive(Debug, Clone, Default)]
struct SyncState {
    saved: Vec<u64>,
    loaded_steps: Vec<u32>,
}

#[derive(Clone)]
struct SyncEnvironment {
    latency: Duration,
}

#[derive(Clone)]
struct SyncReducer;

impl Reducer for SyncReducer {
    type State = SyncState;
    type Action = SyncAction;
    type Environment = SyncEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SyncAction::Save { id } => {
                let latency = env.latency;
                smallvec![Effect::Future(Box::pin(async move {
                    tokio::time::sleep(latency).await;
                    Some(SyncAction::Saved { id })
                }))]
            },
            SyncAction::Saved { id } => {
                state.saved.push(id);
                SmallVec::new()
            },
            SyncAction::Load => {
                let latency = env.latency;
                smallvec![Effect::Sequential(
                    (1..=3)
                        .map(|step| Effect::Future(Box::pin(async move {
                            tokio::time::sleep(latency).await;
                            Some(SyncAction::Loaded { step })
                        })))
                        .collect()
                )]
            },
            SyncAction::Loaded { step } => {
                state.loaded_steps.push(step);
                SmallVec::new()
            },
        }
    }
}

fn new_store() -> Store<SyncState, SyncAction, SyncEnvironment, SyncReducer> {
    Store::new(
        SyncState::default(),
        SyncReducer,
        SyncEnvironment {
            latency: Duration::from_millis(5),
        },
    )
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_send_and_wait_for_response() {
    let store = new_store();

    let result = store
        .send_and_wait_for(
            SyncAction::Save { id: 7 },
            |action| matches!(action, SyncAction::Saved { id: 7 }),
            Duration::from_secs(1),
        )
        .await;

    assert_eq!(result.unwrap(), SyncAction::Saved { id: 7 });
    // The response was reduced before it was observed
    assert_eq!(store.state(|s| s.saved.clone()).await, vec![7]);
}

#[tokio::test]
async fn test_send_and_wait_for_timeout() {
    let store = new_store();

    let result = store
        .send_and_wait_for(
            SyncAction::Save { id: 1 },
            |action| matches!(action, SyncAction::Saved { id: 2 }),
            Duration::from_millis(50),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Timeout)));
}

#[tokio::test]
async fn test_correlated_waiters_get_their_own_response() {
    let store = Arc::new(new_store());

    let mut tasks = Vec::new();
    for id in 1..=5 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            store
                .send_and_wait_for(
                    SyncAction::Save { id },
                    move |action| matches!(action, SyncAction::Saved { id: saved } if *saved == id),
                    Duration::from_secs(2),
                )
                .await
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let id = i as u64 + 1;
        let result = task.await.expect("Task panicked");
        assert_eq!(result.unwrap(), SyncAction::Saved { id });
    }

    let mut saved = store.state(|s| s.saved.clone()).await;
    saved.sort_unstable();
    assert_eq!(saved, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_subscriber_sees_sequential_steps_in_order() {
    let store = new_store();
    let mut rx = store.subscribe_actions();

    let mut handle = store.send(SyncAction::Load).await.unwrap();
    handle
        .wait_with_timeout(Duration::from_secs(1))
        .await
        .unwrap();

    let mut received = Vec::new();
    while let Ok(action) = rx.try_recv() {
        received.push(action);
    }

    assert_eq!(
        received,
        vec![
            SyncAction::Loaded { step: 1 },
            SyncAction::Loaded { step: 2 },
            SyncAction::Loaded { step: 3 },
        ]
    );
    assert_eq!(store.state(|s| s.loaded_steps.clone()).await, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_lagging_subscriber_does_not_block_store() {
    let store = Store::with_config(
        SyncState::default(),
        SyncReducer,
        SyncEnvironment {
            latency: Duration::ZERO,
        },
        StoreConfig::default().with_broadcast_capacity(2),
    );
    let mut rx = store.subscribe_actions();

    let mut handles = Vec::new();
    for id in 0..10 {
        handles.push(store.send(SyncAction::Save { id }).await.unwrap());
    }
    for mut handle in handles {
        handle.wait().await;
    }

    assert_eq!(store.state(|s| s.saved.len()).await, 10);
    assert!(matches!(
        rx.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Lagged(_))
    ));
}

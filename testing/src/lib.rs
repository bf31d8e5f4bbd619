//! # Checklist Testing
//!
//! Testing utilities and helpers for the Checklist reducer architecture.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - An effect driver that runs returned effects without a Store
//!
//! ## Example
//!
//! ```ignore
//! use checklist_testing::{run_to_completion, test_clock};
//!
//! #[tokio::test]
//! async fn loads_on_appear() {
//!     let env = test_environment();
//!     let mut state = TodoState::new();
//!
//!     let actions = run_to_completion(&TodoReducer::new(), &mut state, TodoAction::OnAppear, &env).await;
//!
//!     assert_eq!(actions.len(), 3);
//!     assert!(!state.is_loading);
//! }
//! ```

use chrono::{DateTime, Utc};
use checklist_core::environment::Clock;


/// Effect execution without a Store
pub mod effects;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use checklist_testing::mocks::FixedClock;
    /// use checklist_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Test helpers and utilities.
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Install a test-friendly tracing subscriber
    ///
    /// Output goes through the test harness capture, filtered by `RUST_LOG`.
    /// Safe to call from every test; only the first call installs anything.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use effects::{collect_actions, run_to_completion};
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};

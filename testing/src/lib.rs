//! # Composable Pokedex Testing
//!
//! Testing utilities and helpers for the Composable Pokedex store.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given/When/Then builder for reducers ([`ReducerTest`])
//! - Assertion helpers for effects
//! - [`collect_actions`] to run effects without a Store
//!
//! ## Example
//!
//! ```ignore
//! use composable_pokedex_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(CounterReducer::new())
//!     .with_env(test_environment())
//!     .given_state(CounterState::default())
//!     .when_action(CounterAction::IncrementByAmount(5))
//!     .then_state(|state| assert_eq!(state.value, 5))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use composable_pokedex_core::environment::Clock;

/// Given/When/Then reducer tests
pub mod reducer_test;

/// Running effect descriptions outside a Store
pub mod effects;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use composable_pokedex_testing::mocks::FixedClock;
    /// use composable_pokedex_core::environment::Clock;
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
    #[must_use]
    pub fn test_clock() -> FixedClock {
        // 2025-01-01T00:00:00Z
        FixedClock::new(DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

// Re-export commonly used items
pub use effects::collect_actions;
pub use mocks::{test_clock, FixedClock};
pub use reducer_test::{assertions, ReducerTest};

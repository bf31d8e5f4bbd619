//! Metric names recorded by the store.
//!
//! The store records through the `metrics` facade only. Installing a
//! recorder (and choosing an exporter) is left to the binary; without one,
//! every call is a no-op.
//!
//! # Example
//!
//! ```
//! checklist_runtime::metrics::register_metrics();
//! ```

use metrics::{describe_counter, describe_histogram};

// Re-export metrics macros for use in other crates
pub use metrics::{counter, histogram};

/// Total actions accepted by `Store::send`.
pub const COMMANDS_TOTAL: &str = "store.commands.total";
/// Effects executed, labelled by `type`.
pub const EFFECTS_EXECUTED: &str = "store.effects.executed";
/// Effects returned per reduced action.
pub const EFFECTS_COUNT: &str = "store.effects.count";
/// Reducer wall-clock time.
pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";

/// Register all metric descriptions with the installed recorder.
pub fn register_metrics() {
    describe_counter!(COMMANDS_TOTAL, "Total number of actions sent to the store");
    describe_counter!(
        EFFECTS_EXECUTED,
        "Total number of effects executed, labelled by effect type"
    );
    describe_histogram!(EFFECTS_COUNT, "Number of effects returned by each reduction");
    describe_histogram!(REDUCER_DURATION, "Time taken to execute the reducer");

    // Shutdown
    describe_counter!("store.shutdown.initiated", "Graceful shutdowns started");
    describe_counter!("store.shutdown.completed", "Graceful shutdowns that drained all effects");
    describe_counter!("store.shutdown.timeout", "Graceful shutdowns that timed out");
    describe_counter!(
        "store.shutdown.rejected_actions",
        "Actions rejected because the store was shutting down"
    );
}

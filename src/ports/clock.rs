//! Clock port.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Only the model report's `generated_at` stamp consumes this; tests
/// substitute a fixed instant so report fixtures stay comparable.
pub trait Clock: Send + Sync {
    /// The current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

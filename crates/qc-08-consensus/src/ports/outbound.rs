//! Driven ports (Outbound dependencies)

use chrono::Utc;

/// Source of block timestamps.
pub trait TimeSource: Send + Sync {
    /// Current UTC time, ISO-8601 without offset.
    fn now_iso(&self) -> String;
}

/// Default time source using the system clock.
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_iso(&self) -> String {
        Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

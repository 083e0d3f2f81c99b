//! Metrics collection.
//!
//! # Metrics
//! - `beanstalk_config_refresh_total` (counter): refreshes by outcome
//! - `beanstalk_config_entries_changed_total` (counter): entries modified by merges
//! - `beanstalk_config_schema_options` (gauge): size of the last applied schema
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; without an installed recorder
//!   every call is a no-op
//! - The exporter is the embedding application's choice

use metrics::{counter, gauge};

/// Record the end of a refresh task.
pub fn record_refresh(outcome: &'static str) {
    counter!("beanstalk_config_refresh_total", "outcome" => outcome).increment(1);
}

/// Record entries modified by one merge pass.
pub fn record_entries_changed(changed: usize) {
    if changed > 0 {
        counter!("beanstalk_config_entries_changed_total").increment(changed as u64);
    }
}

/// Record the size of the schema just applied.
pub fn record_schema_size(options: usize) {
    gauge!("beanstalk_config_schema_options").set(options as f64);
}

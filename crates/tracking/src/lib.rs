//! Click telemetry and analytics seams.
//!
//! Both collaborators are best-effort: delivery is fire-and-forget, failures
//! are logged and dropped, and the widget never waits on them.

pub mod analytics;
pub mod click;

pub use {
    analytics::{AnalyticsSink, EVENT_CATEGORY, EVENT_LABEL, NoopAnalytics},
    click::{ClickEvent, ClickSink, HttpClickSink, TrackingError, spawn_report},
};

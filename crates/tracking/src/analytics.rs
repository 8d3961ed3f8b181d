/// Category attached to every analytics event.
pub const EVENT_CATEGORY: &str = "WhatsApp Chat";
/// Label attached to every analytics event.
pub const EVENT_LABEL: &str = "Widget Click";

/// Analytics provider seam. The host installs whatever vendor function is
/// available on the page; without one the widget simply skips the call.
///
/// Implementations must swallow their own failures — the widget never
/// reacts to analytics errors.
pub trait AnalyticsSink: Send + Sync {
    fn track_event(&self, name: &str, category: &str, label: &str);
}

/// Drops every event. Stands in when no provider is installed.
#[derive(Debug, Default)]
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn track_event(&self, _name: &str, _category: &str, _label: &str) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct RecordingSink {
        events: Mutex<Vec<(String, String, String)>>,
    }

    impl AnalyticsSink for RecordingSink {
        fn track_event(&self, name: &str, category: &str, label: &str) {
            if let Ok(mut events) = self.events.lock() {
                events.push((name.to_string(), category.to_string(), label.to_string()));
            }
        }
    }

    #[test]
    fn test_event_shape() {
        let sink = RecordingSink {
            events: Mutex::new(Vec::new()),
        };
        sink.track_event("whatsapp_click", EVENT_CATEGORY, EVENT_LABEL);

        let events = sink.events.lock().unwrap();
        assert_eq!(
            events[0],
            (
                "whatsapp_click".to_string(),
                "WhatsApp Chat".to_string(),
                "Widget Click".to_string()
            )
        );
    }

    #[test]
    fn test_noop_sink_is_silent() {
        NoopAnalytics.track_event("anything", EVENT_CATEGORY, EVENT_LABEL);
    }
}

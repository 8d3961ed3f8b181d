use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use {chrono::NaiveDateTime, tokio::task::JoinHandle, tracing::debug};

use {
    chatbubble_config::WidgetConfig,
    chatbubble_tracking::{
        AnalyticsSink, ClickEvent, ClickSink, EVENT_CATEGORY, EVENT_LABEL, HttpClickSink,
        spawn_report,
    },
};

use crate::{
    builder,
    controller::{Controller, Directive, VisibilityPhase, WidgetEvent},
    hours,
    launch::{LaunchAction, LinkOpener, SystemOpener},
    render::Element,
};

/// Action tag attached to click reports.
const CLICK_ACTION: &str = "widget_click";

/// How long the fallback mount timer waits for the primary ready signal.
pub const FALLBACK_MOUNT_DELAY: Duration = Duration::from_millis(500);

/// Page context forwarded with click telemetry.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub url: String,
    pub user_agent: String,
}

/// Owns the single widget instance for a host page.
///
/// Mounting is idempotent: once a widget exists, further mount calls — from
/// the primary ready signal or the fallback timer — return the same
/// instance instead of constructing a duplicate.
pub struct WidgetHost {
    slot: Mutex<Option<Arc<Widget>>>,
    page: PageContext,
    opener: Arc<dyn LinkOpener>,
    clicks: Option<Arc<dyn ClickSink>>,
    analytics: Option<Arc<dyn AnalyticsSink>>,
}

impl WidgetHost {
    pub fn new(page: PageContext) -> Self {
        Self {
            slot: Mutex::new(None),
            page,
            opener: Arc::new(SystemOpener),
            clicks: None,
            analytics: None,
        }
    }

    /// Replace the link opener (embedded hosts, tests).
    pub fn with_opener(mut self, opener: Arc<dyn LinkOpener>) -> Self {
        self.opener = opener;
        self
    }

    /// Install a click sink, overriding the endpoint-configured HTTP sink.
    pub fn with_click_sink(mut self, sink: Arc<dyn ClickSink>) -> Self {
        self.clicks = Some(sink);
        self
    }

    /// Install the page's analytics provider.
    pub fn with_analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(sink);
        self
    }

    /// The mounted widget, if any.
    pub fn instance(&self) -> Option<Arc<Widget>> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    /// Mount the widget for this page view.
    ///
    /// Returns the existing instance when one is already mounted. Returns
    /// `None` when the widget is disabled or outside its working hours;
    /// availability is not re-evaluated afterwards, so the widget then
    /// stays unmounted for the whole page view.
    pub fn mount(&self, config: &WidgetConfig, now: NaiveDateTime) -> Option<Arc<Widget>> {
        let Ok(mut slot) = self.slot.lock() else {
            return None;
        };
        if let Some(widget) = slot.as_ref() {
            return Some(Arc::clone(widget));
        }

        if !config.enabled {
            debug!("widget disabled, not mounting");
            return None;
        }
        if !hours::is_available_now(&config.working_hours, now) {
            debug!("outside working hours, not mounting");
            return None;
        }

        let tree = builder::build(config);
        let controller = Controller::new(&tree);

        let clicks = self.clicks.clone().or_else(|| {
            config.tracking.endpoint.clone().map(|endpoint| {
                Arc::new(HttpClickSink::new(endpoint)) as Arc<dyn ClickSink>
            })
        });
        let analytics = if config.analytics.enabled && config.analytics.provider_id.is_some() {
            self.analytics.clone()
        } else {
            None
        };

        let widget = Arc::new(Widget {
            tree: Mutex::new(tree.root),
            controller: Mutex::new(controller),
            pending: Mutex::new(None),
            launcher: LaunchAction::new(config.contact.message.clone(), Arc::clone(&self.opener)),
            clicks,
            analytics,
            event_name: config.analytics.event_name.clone(),
            token: config.tracking.token.clone(),
            page: self.page.clone(),
        });
        *slot = Some(Arc::clone(&widget));
        Some(widget)
    }

    /// Secondary initialization trigger: mount after `delay` in case the
    /// primary ready signal never fires. Guarded by the same slot, so at
    /// most one instance ever exists.
    pub fn spawn_fallback_mount(
        self: &Arc<Self>,
        config: WidgetConfig,
        delay: Duration,
    ) -> JoinHandle<()> {
        let host = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            host.mount(&config, chrono::Local::now().naive_local());
        })
    }
}

/// A mounted widget: the rendered structure plus its interaction runtime.
///
/// All mutation happens through [`Widget::handle_event`]; the staged
/// open/close steps run as a single scheduled deferred action that a
/// superseding transition aborts.
pub struct Widget {
    tree: Mutex<Element>,
    controller: Mutex<Controller>,
    /// Pending staged transition step, aborted when superseded.
    pending: Mutex<Option<JoinHandle<()>>>,
    launcher: LaunchAction,
    clicks: Option<Arc<dyn ClickSink>>,
    analytics: Option<Arc<dyn AnalyticsSink>>,
    event_name: String,
    token: Option<String>,
    page: PageContext,
}

impl Widget {
    pub fn phase(&self) -> VisibilityPhase {
        self.controller
            .lock()
            .map(|c| c.phase())
            .unwrap_or(VisibilityPhase::Closed)
    }

    /// Current embed markup of the mounted structure.
    pub fn html(&self) -> String {
        self.tree
            .lock()
            .map(|tree| tree.to_html())
            .unwrap_or_default()
    }

    /// Feed one input event through the state machine and execute the
    /// resulting directives. Must be called from within a tokio runtime.
    pub fn handle_event(self: &Arc<Self>, event: WidgetEvent) {
        let directives = match self.controller.lock() {
            Ok(mut controller) => controller.handle(event),
            Err(_) => Vec::new(),
        };
        self.apply(directives);
    }

    fn apply(self: &Arc<Self>, directives: Vec<Directive>) {
        for directive in directives {
            match directive {
                Directive::TrackClick => self.report_click(),
                Directive::Launch(target) => self.launcher.open(&target.phone, &target.message),
                Directive::RevealPanel => {
                    self.cancel_pending();
                    self.with_panel(|panel| {
                        panel.remove_class("cb-hidden");
                        panel.add_class("cb-open");
                    });
                },
                Directive::SettlePanel { delay } => self.schedule(delay, |panel| {
                    panel.add_class("cb-settled");
                }),
                Directive::RecedePanel => {
                    self.cancel_pending();
                    self.with_panel(|panel| {
                        panel.remove_class("cb-settled");
                        panel.add_class("cb-receding");
                    });
                },
                Directive::HidePanel { delay } => self.schedule(delay, |panel| {
                    panel.remove_class("cb-open");
                    panel.remove_class("cb-receding");
                    panel.add_class("cb-hidden");
                }),
            }
        }
    }

    /// Mutate the panel node if the structure has one; a panel-less
    /// structure degrades to a no-op.
    fn with_panel(&self, f: impl FnOnce(&mut Element)) {
        if let Ok(mut tree) = self.tree.lock()
            && let Some(panel) = tree.find_mut("cb-panel")
        {
            f(panel);
        }
    }

    fn cancel_pending(&self) {
        if let Ok(mut pending) = self.pending.lock()
            && let Some(handle) = pending.take()
        {
            handle.abort();
        }
    }

    /// Schedule the deferred step of a staged transition, aborting any
    /// step a previous transition left pending.
    fn schedule(self: &Arc<Self>, delay: Duration, f: impl FnOnce(&mut Element) + Send + 'static) {
        let widget = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            widget.with_panel(f);
        });
        if let Ok(mut pending) = self.pending.lock()
            && let Some(old) = pending.replace(handle)
        {
            old.abort();
        }
    }

    fn report_click(&self) {
        if let Some(sink) = &self.clicks {
            let event = ClickEvent::new(
                CLICK_ACTION,
                self.token.clone(),
                self.page.url.clone(),
                self.page.user_agent.clone(),
            );
            spawn_report(Arc::clone(sink), event);
        }
        if let Some(analytics) = &self.analytics {
            analytics.track_event(&self.event_name, EVENT_CATEGORY, EVENT_LABEL);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use {
        async_trait::async_trait,
        chatbubble_config::{Agent, AgentStatus},
        chatbubble_tracking::TrackingError,
        chrono::NaiveDate,
    };

    use super::*;

    #[derive(Default)]
    struct RecordingOpener {
        opened: Mutex<Vec<String>>,
    }

    impl LinkOpener for RecordingOpener {
        fn open(&self, url: &str) -> anyhow::Result<()> {
            if let Ok(mut opened) = self.opened.lock() {
                opened.push(url.to_string());
            }
            Ok(())
        }
    }

    struct CountingClickSink {
        reports: AtomicUsize,
    }

    #[async_trait]
    impl ClickSink for CountingClickSink {
        async fn report(&self, _event: &ClickEvent) -> Result<(), TrackingError> {
            self.reports.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RecordingAnalytics {
        events: Mutex<Vec<(String, String, String)>>,
    }

    impl AnalyticsSink for RecordingAnalytics {
        fn track_event(&self, name: &str, category: &str, label: &str) {
            if let Ok(mut events) = self.events.lock() {
                events.push((name.to_string(), category.to_string(), label.to_string()));
            }
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn base_config() -> WidgetConfig {
        let mut config = WidgetConfig::default();
        config.contact.phone_number = "+1 (234) 567-8900".to_string();
        config.contact.message = "hello".to_string();
        config
    }

    fn host_with_opener(opener: Arc<RecordingOpener>) -> WidgetHost {
        WidgetHost::new(PageContext {
            url: "https://shop.example/p/1".to_string(),
            user_agent: "test-agent".to_string(),
        })
        .with_opener(opener)
    }

    #[tokio::test]
    async fn test_mount_is_idempotent() {
        let host = WidgetHost::new(PageContext::default());
        let first = host.mount(&base_config(), noon()).unwrap();
        let second = host.mount(&base_config(), noon()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_disabled_config_does_not_mount() {
        let host = WidgetHost::new(PageContext::default());
        let mut config = base_config();
        config.enabled = false;
        assert!(host.mount(&config, noon()).is_none());
        assert!(host.instance().is_none());
    }

    #[tokio::test]
    async fn test_outside_working_hours_does_not_mount() {
        let host = WidgetHost::new(PageContext::default());
        let mut config = base_config();
        config.working_hours.enabled = true;
        config.working_hours.days = vec![chatbubble_config::Weekday::Tuesday];
        // noon() is a Monday.
        assert!(host.mount(&config, noon()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_mount_after_delay() {
        let host = Arc::new(WidgetHost::new(PageContext::default()));
        host.spawn_fallback_mount(base_config(), FALLBACK_MOUNT_DELAY);

        assert!(host.instance().is_none());
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(host.instance().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_never_duplicates_primary_mount() {
        let host = Arc::new(WidgetHost::new(PageContext::default()));
        host.spawn_fallback_mount(base_config(), FALLBACK_MOUNT_DELAY);
        let primary = host.mount(&base_config(), noon()).unwrap();

        tokio::time::sleep(Duration::from_millis(600)).await;
        let instance = host.instance().unwrap();
        assert!(Arc::ptr_eq(&primary, &instance));
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_transition_is_staged() {
        let host = WidgetHost::new(PageContext::default());
        let widget = host.mount(&base_config(), noon()).unwrap();

        widget.handle_event(WidgetEvent::ToggleClicked);
        assert_eq!(widget.phase(), VisibilityPhase::Open);
        let html = widget.html();
        assert!(html.contains("cb-open"));
        assert!(!html.contains("cb-settled"));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(widget.html().contains("cb-settled"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_transition_is_staged() {
        let host = WidgetHost::new(PageContext::default());
        let widget = host.mount(&base_config(), noon()).unwrap();

        widget.handle_event(WidgetEvent::ToggleClicked);
        tokio::time::sleep(Duration::from_millis(50)).await;

        widget.handle_event(WidgetEvent::CloseClicked);
        assert_eq!(widget.phase(), VisibilityPhase::Closed);
        let html = widget.html();
        assert!(html.contains("cb-receding"));
        assert!(!html.contains("cb-hidden"));

        tokio::time::sleep(Duration::from_millis(250)).await;
        let html = widget.html();
        assert!(html.contains("cb-hidden"));
        assert!(!html.contains("cb-open"));
        assert!(!html.contains("cb-receding"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseding_transition_cancels_pending_stage() {
        let host = WidgetHost::new(PageContext::default());
        let widget = host.mount(&base_config(), noon()).unwrap();

        // Close again before the settle stage ran.
        widget.handle_event(WidgetEvent::ToggleClicked);
        widget.handle_event(WidgetEvent::ToggleClicked);

        tokio::time::sleep(Duration::from_millis(300)).await;
        let html = widget.html();
        assert!(!html.contains("cb-settled"));
        assert!(html.contains("cb-hidden"));
        assert_eq!(widget.phase(), VisibilityPhase::Closed);
    }

    #[tokio::test]
    async fn test_minimal_layout_toggle_launches_directly() {
        let opener = Arc::new(RecordingOpener::default());
        let clicks = Arc::new(CountingClickSink {
            reports: AtomicUsize::new(0),
        });
        let host = host_with_opener(opener.clone()).with_click_sink(clicks.clone());

        let mut config = base_config();
        config.presentation.header_text = String::new();
        config.presentation.footer_text = String::new();
        let widget = host.mount(&config, noon()).unwrap();

        widget.handle_event(WidgetEvent::ToggleClicked);
        assert_eq!(widget.phase(), VisibilityPhase::Closed);

        let opened = opener.opened.lock().unwrap().clone();
        assert_eq!(opened, vec!["https://wa.me/+12345678900?text=hello"]);

        for _ in 0..100 {
            if clicks.reports.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(clicks.reports.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_contact_click_launches_agent_target() {
        let opener = Arc::new(RecordingOpener::default());
        let host = host_with_opener(opener.clone());

        let mut config = base_config();
        config.agents.enabled = true;
        config.agents.roster = vec![
            Agent {
                id: "1".into(),
                phone: "+111".into(),
                message: "to one".into(),
                ..Agent::default()
            },
            Agent {
                id: "2".into(),
                phone: "+222".into(),
                message: "to two".into(),
                status: AgentStatus::Active,
                ..Agent::default()
            },
        ];
        let widget = host.mount(&config, noon()).unwrap();

        widget.handle_event(WidgetEvent::ContactClicked { row: 1 });
        let opened = opener.opened.lock().unwrap().clone();
        assert_eq!(opened, vec!["https://wa.me/+222?text=to%20two"]);
    }

    #[tokio::test]
    async fn test_analytics_requires_provider_id() {
        let analytics = Arc::new(RecordingAnalytics {
            events: Mutex::new(Vec::new()),
        });

        // Enabled but no provider id: nothing is tracked.
        let host = WidgetHost::new(PageContext::default()).with_analytics(analytics.clone());
        let mut config = base_config();
        config.analytics.enabled = true;
        let widget = host.mount(&config, noon()).unwrap();
        widget.handle_event(WidgetEvent::ToggleClicked);
        assert!(analytics.events.lock().unwrap().is_empty());

        // With a provider id the configured event fires.
        let host = WidgetHost::new(PageContext::default()).with_analytics(analytics.clone());
        config.analytics.provider_id = Some("G-123".to_string());
        let widget = host.mount(&config, noon()).unwrap();
        widget.handle_event(WidgetEvent::ToggleClicked);
        let events = analytics.events.lock().unwrap();
        assert_eq!(events.as_slice(), [(
            "whatsapp_click".to_string(),
            "WhatsApp Chat".to_string(),
            "Widget Click".to_string()
        )]);
    }
}

use std::sync::Arc;

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    serde::Serialize,
    tracing::debug,
};

/// A single widget click, reported to the telemetry endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ClickEvent {
    /// Action tag identifying the interaction kind.
    pub action: String,
    /// Anti-forgery token, forwarded verbatim when configured.
    pub token: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub page_url: String,
    pub user_agent: String,
}

impl ClickEvent {
    pub fn new(
        action: impl Into<String>,
        token: Option<String>,
        page_url: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            token,
            timestamp: Utc::now(),
            page_url: page_url.into(),
            user_agent: user_agent.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("http transport: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint rejected click report: status {0}")]
    Status(u16),
    #[error("{0}")]
    Sink(String),
}

/// Delivers click events. The widget only ever calls this through
/// [`spawn_report`], so implementations may be slow but must be `Send`.
#[async_trait]
pub trait ClickSink: Send + Sync {
    async fn report(&self, event: &ClickEvent) -> Result<(), TrackingError>;
}

/// POSTs click events to an HTTP collector as form fields.
/// The response body is ignored.
pub struct HttpClickSink {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpClickSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ClickSink for HttpClickSink {
    async fn report(&self, event: &ClickEvent) -> Result<(), TrackingError> {
        let form = [
            ("action", event.action.clone()),
            ("token", event.token.clone().unwrap_or_default()),
            ("timestamp", event.timestamp.timestamp_millis().to_string()),
            ("page_url", event.page_url.clone()),
            ("user_agent", event.user_agent.clone()),
        ];
        let response = self.http.post(&self.endpoint).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrackingError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// Deliver `event` in the background.
///
/// Fire-and-forget: the task is never awaited or cancelled, failures are
/// logged at debug level and dropped. Multiple in-flight reports carry no
/// ordering guarantee.
pub fn spawn_report(sink: Arc<dyn ClickSink>, event: ClickEvent) {
    tokio::spawn(async move {
        if let Err(e) = sink.report(&event).await {
            debug!(error = %e, "click report failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use mockito::Matcher;

    use super::*;

    #[tokio::test]
    async fn test_http_sink_posts_form_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/collect")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "widget_click".into()),
                Matcher::UrlEncoded("token".into(), "tok-1".into()),
                Matcher::UrlEncoded("page_url".into(), "https://shop.example/p/1".into()),
                Matcher::UrlEncoded("user_agent".into(), "test-agent".into()),
            ]))
            .with_status(200)
            .create_async()
            .await;

        let sink = HttpClickSink::new(format!("{}/collect", server.url()));
        let event = ClickEvent::new(
            "widget_click",
            Some("tok-1".to_string()),
            "https://shop.example/p/1",
            "test-agent",
        );
        sink.report(&event).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_sink_maps_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/collect")
            .with_status(500)
            .create_async()
            .await;

        let sink = HttpClickSink::new(format!("{}/collect", server.url()));
        let event = ClickEvent::new("widget_click", None, "", "");
        let err = sink.report(&event).await.unwrap_err();
        assert!(matches!(err, TrackingError::Status(500)));
    }

    struct FailingSink {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ClickSink for FailingSink {
        async fn report(&self, _event: &ClickEvent) -> Result<(), TrackingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(TrackingError::Sink("collector down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_spawn_report_swallows_failures() {
        let sink = Arc::new(FailingSink {
            calls: AtomicUsize::new(0),
        });
        spawn_report(sink.clone(), ClickEvent::new("widget_click", None, "", ""));

        // Give the spawned task a chance to run; the failure must not
        // propagate anywhere.
        for _ in 0..100 {
            if sink.calls.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }
}

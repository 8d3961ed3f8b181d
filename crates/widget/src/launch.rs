use std::sync::Arc;

use tracing::{debug, warn};

/// Chat service deep-link base.
const LINK_BASE: &str = "https://wa.me/";

/// Strip everything that is not a digit, keeping a single leading `+`.
pub fn sanitize_phone(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_digit() {
            out.push(ch);
        } else if ch == '+' && out.is_empty() {
            out.push(ch);
        }
    }
    out
}

/// Build the chat deep link, or `None` when the phone has no digits.
///
/// The message is percent-encoded into the `text` query parameter.
pub fn build_link(phone: &str, message: &str) -> Option<String> {
    let phone = sanitize_phone(phone);
    if !phone.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!(
        "{LINK_BASE}{phone}?text={}",
        urlencoding::encode(message)
    ))
}

/// Hands a URL to the host environment to open in a new browsing context.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> anyhow::Result<()>;
}

/// Opens links with the operating system's default handler.
#[derive(Debug, Default)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open(&self, url: &str) -> anyhow::Result<()> {
        open::that(url)?;
        Ok(())
    }
}

/// Resolves a target into a deep link and opens it.
pub struct LaunchAction {
    fallback_message: String,
    opener: Arc<dyn LinkOpener>,
}

impl LaunchAction {
    pub fn new(fallback_message: impl Into<String>, opener: Arc<dyn LinkOpener>) -> Self {
        Self {
            fallback_message: fallback_message.into(),
            opener,
        }
    }

    /// Open a chat with `phone`, prefilled with `message` (or the default
    /// contact message when empty).
    ///
    /// A phone without digits is a silent no-op: no link is opened and no
    /// error surfaces to the visitor. Opener failures are logged and
    /// swallowed.
    pub fn open(&self, phone: &str, message: &str) {
        let message = if message.is_empty() {
            self.fallback_message.as_str()
        } else {
            message
        };
        let Some(link) = build_link(phone, message) else {
            debug!("launch skipped: no usable phone number");
            return;
        };
        if let Err(e) = self.opener.open(&link) {
            warn!(error = %e, "failed to open chat link");
        }
    }
}

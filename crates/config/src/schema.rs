/// Widget settings schema (contact, presentation, agents, working hours,
/// analytics, click tracking).

use serde::{Deserialize, Serialize};

/// Root widget configuration. Every field has a usable default so a host
/// can supply only the keys it cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Master switch. A disabled widget never mounts.
    pub enabled: bool,
    pub contact: ContactConfig,
    pub presentation: PresentationConfig,
    pub agents: AgentsConfig,
    pub working_hours: WorkingHoursConfig,
    pub analytics: AnalyticsConfig,
    pub tracking: TrackingConfig,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            contact: ContactConfig::default(),
            presentation: PresentationConfig::default(),
            agents: AgentsConfig::default(),
            working_hours: WorkingHoursConfig::default(),
            analytics: AnalyticsConfig::default(),
            tracking: TrackingConfig::default(),
        }
    }
}

/// Default contact used in single-contact mode and as the message fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub phone_number: String,
    pub message: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            phone_number: String::new(),
            message: "Hi! I need some information.".to_string(),
        }
    }
}

/// Visual presentation knobs. These only produce classification classes on
/// the rendered structure; none of them change widget behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub position: Position,
    pub design: Design,
    pub header_text: String,
    pub footer_text: String,
    pub animation: Animation,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            position: Position::default(),
            design: Design::default(),
            header_text: "Need help? Chat with us".to_string(),
            footer_text: "The team typically replies in a few minutes.".to_string(),
            animation: Animation::default(),
        }
    }
}

/// Corner of the page the widget is anchored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl Position {
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::BottomRight => "cb-bottom-right",
            Self::BottomLeft => "cb-bottom-left",
            Self::TopRight => "cb-top-right",
            Self::TopLeft => "cb-top-left",
        }
    }
}

/// Widget design variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Design {
    #[default]
    #[serde(rename = "design-1")]
    Design1,
    #[serde(rename = "design-2")]
    Design2,
    #[serde(rename = "design-3")]
    Design3,
    #[serde(rename = "design-4")]
    Design4,
}

impl Design {
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Design1 => "cb-design-1",
            Self::Design2 => "cb-design-2",
            Self::Design3 => "cb-design-3",
            Self::Design4 => "cb-design-4",
        }
    }
}

/// Launcher attention animation. At most one is active on the structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Animation {
    #[default]
    None,
    Bounce,
    Pulse,
    Shake,
    Wiggle,
    Float,
}

impl Animation {
    /// Class for this animation, or `None` when no animation is wanted.
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Bounce => Some("cb-anim-bounce"),
            Self::Pulse => Some("cb-anim-pulse"),
            Self::Shake => Some("cb-anim-shake"),
            Self::Wiggle => Some("cb-anim-wiggle"),
            Self::Float => Some("cb-anim-float"),
        }
    }
}

/// Multi-agent roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    pub enabled: bool,
    pub roster: Vec<Agent>,
}

impl AgentsConfig {
    /// Active roster entries, in configured order.
    pub fn active(&self) -> impl Iterator<Item = &Agent> {
        self.roster.iter().filter(|a| a.status.is_active())
    }
}

/// One agent the visitor can be routed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Agent {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: String,
    /// Short role line shown under the name (e.g. "Sales").
    pub label: String,
    pub phone: String,
    pub message: String,
    pub status: AgentStatus,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            id: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            avatar_url: String::new(),
            label: String::new(),
            phone: String::new(),
            message: String::new(),
            status: AgentStatus::Active,
        }
    }
}

impl Agent {
    /// "First Last", skipping empty parts.
    pub fn display_name(&self) -> String {
        let mut parts = Vec::new();
        if !self.first_name.is_empty() {
            parts.push(self.first_name.as_str());
        }
        if !self.last_name.is_empty() {
            parts.push(self.last_name.as_str());
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Active,
    Inactive,
}

impl AgentStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Time-of-day visibility policy. When disabled the widget is always on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingHoursConfig {
    pub enabled: bool,
    /// Window start, 24h "HH:MM".
    pub start: String,
    /// Window end, 24h "HH:MM". Inclusive.
    pub end: String,
    /// Days the window applies to. Empty means every day.
    pub days: Vec<Weekday>,
}

impl Default for WorkingHoursConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start: "09:00".to_string(),
            end: "18:00".to_string(),
            days: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// Analytics provider hookup. The provider itself is supplied by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub enabled: bool,
    pub provider_id: Option<String>,
    pub event_name: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider_id: None,
            event_name: "whatsapp_click".to_string(),
        }
    }
}

/// Click-telemetry delivery. Without an endpoint no telemetry is sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub endpoint: Option<String>,
    /// Anti-forgery token forwarded with every click report.
    pub token: Option<String>,
}

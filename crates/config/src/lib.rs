//! Widget configuration: typed settings schema, config file discovery and
//! loading (TOML/YAML/JSON), and `${ENV_VAR}` substitution.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{clear_config_dir, config_dir, discover_and_load, load_config, set_config_dir},
    schema::{
        Agent, AgentStatus, AgentsConfig, AnalyticsConfig, Animation, ContactConfig, Design,
        Position, PresentationConfig, TrackingConfig, Weekday, WidgetConfig, WorkingHoursConfig,
    },
};

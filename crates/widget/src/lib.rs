//! Headless WhatsApp chat-launcher widget engine.
//!
//! Given a [`chatbubble_config::WidgetConfig`], this crate gates visibility
//! by working hours, builds the renderable widget structure (single-contact
//! or multi-agent), runs the open/closed interaction state machine, and
//! launches `wa.me` deep links with click telemetry fired as a non-blocking
//! side effect.

pub mod builder;
pub mod controller;
pub mod hours;
pub mod launch;
pub mod mount;
pub mod render;

pub use {
    builder::{ContactRow, ContactTarget, WidgetMode, WidgetTree, build, set_animation},
    controller::{Controller, Directive, VisibilityPhase, WidgetEvent},
    hours::is_available_now,
    launch::{LaunchAction, LinkOpener, SystemOpener, build_link, sanitize_phone},
    mount::{FALLBACK_MOUNT_DELAY, PageContext, Widget, WidgetHost},
    render::Element,
};

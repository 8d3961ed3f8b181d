use chatbubble_config::{Agent, Animation, WidgetConfig};

use crate::render::Element;

/// Presentation mode selected from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetMode {
    /// Launcher plus a single default contact.
    Single,
    /// Launcher plus a panel listing the active agents.
    Multi,
}

/// Destination of a click: phone number plus prefilled message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactTarget {
    pub phone: String,
    pub message: String,
}

/// One clickable contact row. Both the row and its inner button carry a
/// target; the button-level one wins when present. Targets are set once at
/// build time and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub target: ContactTarget,
    pub button_target: Option<ContactTarget>,
}

/// Renderable widget structure plus the interaction data the controller
/// binds against.
#[derive(Debug, Clone)]
pub struct WidgetTree {
    pub mode: WidgetMode,
    pub root: Element,
    pub rows: Vec<ContactRow>,
    pub default_target: ContactTarget,
    pub has_panel: bool,
}

/// Build the widget structure for `config`.
///
/// Multi-contact mode is selected iff the roster is enabled and has at
/// least one active entry; otherwise the widget falls back to the default
/// contact. In single-contact mode with no header and no footer text the
/// detail panel is omitted entirely (minimal layout) and the launcher
/// launches the chat directly.
pub fn build(config: &WidgetConfig) -> WidgetTree {
    let active: Vec<&Agent> = config.agents.active().collect();
    let mode = if config.agents.enabled && !active.is_empty() {
        WidgetMode::Multi
    } else {
        WidgetMode::Single
    };
    let default_target = ContactTarget {
        phone: config.contact.phone_number.clone(),
        message: config.contact.message.clone(),
    };

    let presentation = &config.presentation;
    let mut launcher = Element::new("button")
        .class("cb-launcher")
        .attr("type", "button")
        .child(Element::new("span").class("cb-launcher-icon"));
    set_animation(&mut launcher, presentation.animation);

    let has_panel = mode == WidgetMode::Multi
        || !presentation.header_text.is_empty()
        || !presentation.footer_text.is_empty();

    let mut root = Element::new("div")
        .class("cb-widget")
        .class(presentation.position.css_class())
        .class(presentation.design.css_class())
        .child(launcher);

    let mut rows = Vec::new();
    if has_panel {
        let mut panel = Element::new("div").class("cb-panel").class("cb-hidden");
        if !presentation.header_text.is_empty() {
            panel = panel.child(
                Element::new("div")
                    .class("cb-header")
                    .text(&presentation.header_text),
            );
        }

        match mode {
            WidgetMode::Single => {
                if !presentation.footer_text.is_empty() {
                    panel = panel.child(
                        Element::new("div")
                            .class("cb-footer")
                            .text(&presentation.footer_text),
                    );
                }
                panel = panel.child(
                    Element::new("button")
                        .class("cb-chat-action")
                        .attr("type", "button")
                        .attr("data-phone", &default_target.phone)
                        .attr("data-message", &default_target.message)
                        .text("Open chat"),
                );
                rows.push(ContactRow {
                    target: default_target.clone(),
                    button_target: None,
                });
            },
            WidgetMode::Multi => {
                let mut list = Element::new("div").class("cb-agents");
                for agent in &active {
                    list = list.child(agent_row(agent));
                    let target = ContactTarget {
                        phone: agent.phone.clone(),
                        message: agent.message.clone(),
                    };
                    rows.push(ContactRow {
                        button_target: Some(target.clone()),
                        target,
                    });
                }
                panel = panel.child(list);
            },
        }
        root = root.child(panel);
    }

    WidgetTree {
        mode,
        root,
        rows,
        default_target,
        has_panel,
    }
}

fn agent_row(agent: &Agent) -> Element {
    let mut row = Element::new("div")
        .class("cb-agent-row")
        .attr("data-phone", &agent.phone)
        .attr("data-message", &agent.message);
    if !agent.avatar_url.is_empty() {
        row = row.child(
            Element::new("img")
                .class("cb-avatar")
                .attr("src", &agent.avatar_url),
        );
    }
    let mut meta = Element::new("div").class("cb-agent-meta").child(
        Element::new("div")
            .class("cb-agent-name")
            .text(agent.display_name()),
    );
    if !agent.label.is_empty() {
        meta = meta.child(Element::new("div").class("cb-agent-label").text(&agent.label));
    }
    row.child(meta).child(
        Element::new("button")
            .class("cb-agent-chat")
            .attr("type", "button")
            .attr("data-phone", &agent.phone)
            .attr("data-message", &agent.message),
    )
}

/// Apply `animation`'s class to `el`, clearing any other animation class
/// first so at most one is ever active.
pub fn set_animation(el: &mut Element, animation: Animation) {
    el.clear_class_prefix("cb-anim-");
    if let Some(class) = animation.css_class() {
        el.add_class(class);
    }
}

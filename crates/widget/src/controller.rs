use std::time::Duration;

use crate::builder::{ContactRow, ContactTarget, WidgetTree};

/// Delay before the settled visual state is applied on open, so the show
/// transition is not skipped by layout thrashing.
pub const SETTLE_DELAY: Duration = Duration::from_millis(10);
/// Delay before the panel is removed from layout on close, so the hide
/// transition stays visually observable.
pub const HIDE_DELAY: Duration = Duration::from_millis(200);

/// Whether the detail panel is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityPhase {
    Closed,
    Open,
}

/// Discrete inputs the host forwards to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    ToggleClicked,
    CloseClicked,
    ContactClicked { row: usize },
}

/// Ordered side effects for the host runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Report the click to telemetry and analytics. Always emitted before
    /// a `Launch` from the same interaction.
    TrackClick,
    /// Open the chat deep link for this target.
    Launch(ContactTarget),
    /// Make the panel visible immediately.
    RevealPanel,
    /// Apply the settled visual state after `delay`.
    SettlePanel { delay: Duration },
    /// Apply the receding visual state immediately.
    RecedePanel,
    /// Fully hide the panel after `delay`.
    HidePanel { delay: Duration },
}

/// The widget's open/closed state machine.
///
/// Owns the single mutable `VisibilityPhase` plus the immutable interaction
/// data captured at build time; agent data is never mutated after that.
#[derive(Debug)]
pub struct Controller {
    phase: VisibilityPhase,
    has_panel: bool,
    default_target: ContactTarget,
    rows: Vec<ContactRow>,
}

impl Controller {
    pub fn new(tree: &WidgetTree) -> Self {
        Self {
            phase: VisibilityPhase::Closed,
            has_panel: tree.has_panel,
            default_target: tree.default_target.clone(),
            rows: tree.rows.clone(),
        }
    }

    pub fn phase(&self) -> VisibilityPhase {
        self.phase
    }

    pub fn handle(&mut self, event: WidgetEvent) -> Vec<Directive> {
        match event {
            WidgetEvent::ToggleClicked => self.toggle(),
            WidgetEvent::CloseClicked => self.close(),
            WidgetEvent::ContactClicked { row } => self.contact(row),
        }
    }

    fn toggle(&mut self) -> Vec<Directive> {
        if !self.has_panel {
            // Minimal layout: nothing to show, go straight to the chat.
            return vec![
                Directive::TrackClick,
                Directive::Launch(self.default_target.clone()),
            ];
        }
        match self.phase {
            VisibilityPhase::Closed => {
                self.phase = VisibilityPhase::Open;
                vec![
                    Directive::TrackClick,
                    Directive::RevealPanel,
                    Directive::SettlePanel {
                        delay: SETTLE_DELAY,
                    },
                ]
            },
            VisibilityPhase::Open => {
                self.phase = VisibilityPhase::Closed;
                vec![
                    Directive::TrackClick,
                    Directive::RecedePanel,
                    Directive::HidePanel { delay: HIDE_DELAY },
                ]
            },
        }
    }

    fn close(&mut self) -> Vec<Directive> {
        match self.phase {
            VisibilityPhase::Open => {
                self.phase = VisibilityPhase::Closed;
                vec![
                    Directive::RecedePanel,
                    Directive::HidePanel { delay: HIDE_DELAY },
                ]
            },
            // Closing an already-closed widget is a no-op.
            VisibilityPhase::Closed => Vec::new(),
        }
    }

    fn contact(&mut self, row: usize) -> Vec<Directive> {
        let Some(row) = self.rows.get(row) else {
            // Unknown row — a partially-built structure degrades to a no-op.
            return Vec::new();
        };
        let target = row.button_target.as_ref().unwrap_or(&row.target).clone();
        vec![Directive::TrackClick, Directive::Launch(target)]
    }
}

use mathdrill::session::PhaseKind;
use ratatui::Frame;

use crate::{
    ui::{render_config, render_finished, render_running},
    App,
};

/// A UI Screen boundary: one per session phase
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Configuration form shown before an attempt
pub struct ConfigScreen;

impl Screen for ConfigScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_config(app, f);
    }
}

/// Timer, current question and answer box
pub struct DrillScreen;

impl Screen for DrillScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_running(app, f);
    }
}

/// Score summary and per-question review
pub struct ReviewScreen;

impl Screen for ReviewScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_finished(app, f);
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: PhaseKind) -> Box<dyn Screen> {
    match phase {
        PhaseKind::Configuring => Box::new(ConfigScreen),
        PhaseKind::Running => Box::new(DrillScreen),
        PhaseKind::Finished => Box::new(ReviewScreen),
    }
}

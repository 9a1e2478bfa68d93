//! Full-window panel shown after a rendering fault

use crate::theme::Theme;
use egui::{Context, RichText};

pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

pub struct RecoveryPanel;

impl RecoveryPanel {
    /// Render the panel; true when the user asked to return to the dashboard
    pub fn ui(ctx: &Context, theme: &Theme, message: &str) -> bool {
        let message = if message.trim().is_empty() { FALLBACK_MESSAGE } else { message };
        let mut go_home = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() / 4.0);
                ui.label(RichText::new("⚠").size(48.0).color(theme.error));
                ui.add_space(8.0);
                ui.heading("Something went wrong");
                ui.add_space(8.0);
                ui.colored_label(theme.text_secondary, message);
                ui.add_space(24.0);
                let button = egui::Button::new(RichText::new("Return to Dashboard").color(theme.surface))
                    .fill(theme.accent);
                go_home = ui.add(button).clicked();
            });
        });

        go_home
    }
}

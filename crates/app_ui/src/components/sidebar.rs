//! Navigation sidebar

use crate::theme::Theme;
use app_core::Route;
use egui::{RichText, Ui};

const ENTRIES: [(Route, &str); 2] = [(Route::Dashboard, "🏠"), (Route::Details, "📋")];

pub struct Sidebar;

impl Sidebar {
    /// Render the sidebar; returns the route the user picked
    pub fn ui(ui: &mut Ui, theme: &Theme, current: Route) -> Option<Route> {
        let mut picked = None;

        ui.add_space(16.0);
        ui.horizontal(|ui| {
            ui.label(RichText::new("📁").size(22.0));
            ui.label(RichText::new("File Manager").size(18.0).strong().color(theme.accent));
        });
        ui.add_space(24.0);

        for (route, icon) in ENTRIES {
            let active = route == current;
            let text = RichText::new(format!("{}  {}", icon, route.title()));
            let text = if active { text.color(theme.accent).strong() } else { text };

            let button = egui::Button::new(text)
                .fill(if active { theme.accent_soft } else { theme.surface })
                .stroke(egui::Stroke::NONE)
                .min_size(egui::vec2(ui.available_width(), 36.0));

            if ui.add(button).clicked() && !active {
                picked = Some(route);
            }
        }

        picked
    }
}

//! Status bar component

use egui::Ui;

/// Status bar information
#[derive(Debug, Clone, Default)]
pub struct StatusInfo {
    /// Backend the records come from
    pub source: String,

    /// Loaded record count
    pub records: Option<usize>,

    pub fetching: bool,

    /// A create call is pending
    pub uploading: bool,

    /// Additional status message
    pub message: String,
}

impl StatusInfo {
    pub fn records_label(&self) -> String {
        match self.records {
            Some(1) => "1 file".to_string(),
            Some(n) => format!("{} files", n),
            None => "No data".to_string(),
        }
    }

    /// Background work worth a spinner; uploads take precedence
    pub fn activity_label(&self) -> Option<&'static str> {
        if self.uploading {
            Some("Uploading")
        } else if self.fetching {
            Some("Refreshing")
        } else {
            None
        }
    }
}

/// Status bar component
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar
    pub fn ui(ui: &mut Ui, info: &StatusInfo) {
        ui.horizontal(|ui| {
            ui.label(&info.source);
            ui.separator();
            ui.label(info.records_label());

            if let Some(activity) = info.activity_label() {
                ui.separator();
                ui.spinner();
                ui.label(activity);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if !info.message.is_empty() {
                    ui.label(&info.message);
                }
            });
        });
    }
}

//! Dashboard: searchable, sortable, paginated file table

use super::format;
use crate::theme::Theme;
use app_core::{DashboardState, FilesSnapshot, SortKey};
use app_db::PageSize;
use egui::{RichText, Ui};

/// Something the app has to handle outside the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    /// Open this record in the detail view
    OpenFile(String),
    /// Show the upload dialog
    AddDocument,
}

const COLUMNS: [(Option<SortKey>, &str); 4] = [
    (Some(SortKey::FileName), "FILE NAME"),
    (Some(SortKey::UploadedDate), "DATE"),
    (Some(SortKey::UploadedBy), "UPLOADED BY"),
    (None, "UPLOADED AT"),
];

#[derive(Default)]
pub struct DashboardView {
    search_input: String,
    focus_search: bool,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus the search box on the next frame
    pub fn focus_search(&mut self) {
        self.focus_search = true;
    }

    /// Align the search box with a freshly mounted state
    pub fn reset(&mut self, state: &DashboardState) {
        self.search_input = state.query().search().to_string();
    }

    pub fn ui(
        &mut self,
        ui: &mut Ui,
        theme: &Theme,
        state: &mut DashboardState,
        files: &FilesSnapshot,
    ) -> Option<DashboardAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.heading(RichText::new("Documents").strong().color(theme.text));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let add = egui::Button::new(RichText::new("📄 Add Document").color(theme.accent))
                    .fill(theme.accent_soft);
                if ui.add(add).clicked() {
                    action = Some(DashboardAction::AddDocument);
                }

                let search = egui::TextEdit::singleline(&mut self.search_input)
                    .hint_text("🔍 Search files...")
                    .desired_width(280.0);
                let response = ui.add(search);
                if std::mem::take(&mut self.focus_search) {
                    response.request_focus();
                }
                if response.changed() {
                    state.set_search(self.search_input.clone());
                }
            });
        });
        ui.add_space(16.0);

        if files.is_loading() {
            ui.centered_and_justified(|ui| {
                ui.spinner();
            });
            return action;
        }

        if let Some(error) = &files.error {
            ui.vertical_centered(|ui| {
                ui.add_space(120.0);
                ui.colored_label(theme.error, RichText::new(format!("Error loading files: {}", error)).size(16.0));
            });
            return action;
        }

        let page = state.run(files.records());

        egui::Frame::none()
            .fill(theme.surface)
            .rounding(8.0)
            .inner_margin(egui::Margin::symmetric(20.0, 12.0))
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                egui::Grid::new("files_table")
                    .num_columns(COLUMNS.len())
                    .spacing([40.0, 16.0])
                    .striped(true)
                    .min_col_width(120.0)
                    .show(ui, |ui| {
                        let sort = state.query().sort();
                        for (key, title) in COLUMNS {
                            match key {
                                Some(key) => {
                                    let text = RichText::new(format!("{}{}", title, sort.indicator(key)))
                                        .small()
                                        .strong()
                                        .color(theme.text_secondary);
                                    if ui.add(egui::Label::new(text).sense(egui::Sense::click())).clicked() {
                                        state.toggle_sort(key);
                                    }
                                }
                                None => {
                                    ui.label(RichText::new(title).small().strong().color(theme.text_secondary));
                                }
                            }
                        }
                        ui.end_row();

                        for record in &page.items {
                            let name = RichText::new(&record.file_name).color(theme.accent).strong();
                            if ui.add(egui::Label::new(name).sense(egui::Sense::click())).clicked() {
                                action = Some(DashboardAction::OpenFile(record.id.clone()));
                            }
                            ui.label(format::date(&record.uploaded_date));
                            ui.label(&record.uploaded_by);
                            ui.label(format::date_time(&record.uploaded_date));
                            ui.end_row();
                        }
                    });

                if page.items.is_empty() {
                    ui.vertical_centered(|ui| {
                        ui.add_space(48.0);
                        let message = if state.query().search().is_empty() {
                            "No files uploaded yet"
                        } else {
                            "No files found"
                        };
                        ui.colored_label(theme.text_secondary, message);
                        ui.add_space(48.0);
                    });
                }
            });

        ui.add_space(16.0);
        ui.horizontal(|ui| {
            ui.colored_label(theme.text_secondary, "Items per page:");
            let mut size = state.query().page_size();
            egui::ComboBox::from_id_salt("page_size")
                .selected_text(size.to_string())
                .width(60.0)
                .show_ui(ui, |ui| {
                    for option in PageSize::ALL {
                        ui.selectable_value(&mut size, option, option.to_string());
                    }
                });
            if size != state.query().page_size() {
                state.set_page_size(size);
            }

            ui.add_space(24.0);
            ui.colored_label(theme.text_secondary, page.range_label());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let total_pages = page.total_pages;
                if ui.add_enabled(page.has_next(), egui::Button::new("›")).clicked() {
                    state.next_page(total_pages);
                }
                if ui.add_enabled(page.has_previous(), egui::Button::new("‹")).clicked() {
                    state.prev_page();
                }
            });
        });

        action
    }
}

//! Detail view: side list of documents next to a preview of the selected one

use super::format;
use super::preview::{PdfRenderer, PreviewCache};
use crate::theme::Theme;
use app_api::FileRecord;
use app_core::{DetailState, FilesSnapshot};
use egui::{RichText, Ui};
use std::sync::Arc;
use tokio::runtime::Handle;

const SIDE_LIST_WIDTH: f32 = 280.0;

pub struct DetailView {
    previews: PreviewCache,
}

impl DetailView {
    /// Previews load on `runtime`'s blocking pool
    pub fn new(pdf: Arc<dyn PdfRenderer>, runtime: Handle) -> Self {
        Self {
            previews: PreviewCache::new(pdf, runtime),
        }
    }

    /// Forget loaded previews; records may have changed underneath them
    pub fn clear_previews(&mut self) {
        self.previews.clear();
    }

    pub fn ui(&mut self, ui: &mut Ui, theme: &Theme, state: &mut DetailState, files: &FilesSnapshot) {
        if files.is_loading() {
            ui.centered_and_justified(|ui| {
                ui.spinner();
            });
            return;
        }

        if let Some(error) = &files.error {
            ui.vertical_centered(|ui| {
                ui.add_space(120.0);
                ui.colored_label(theme.error, format!("Error loading files: {}", error));
            });
            return;
        }

        let records = files.records();
        state.sync(records);

        if records.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(120.0);
                ui.label(RichText::new("No files available").size(18.0).strong());
                ui.add_space(8.0);
                ui.colored_label(theme.text_secondary, "Upload some files to get started");
            });
            return;
        }

        egui::SidePanel::left("detail_list")
            .resizable(false)
            .exact_width(SIDE_LIST_WIDTH)
            .frame(egui::Frame::none().fill(theme.background).inner_margin(12.0))
            .show_inside(ui, |ui| side_list(ui, theme, state, records));

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(theme.surface).inner_margin(16.0))
            .show_inside(ui, |ui| self.preview_pane(ui, theme, state, records));
    }

    fn preview_pane(&mut self, ui: &mut Ui, theme: &Theme, state: &mut DetailState, records: &[FileRecord]) {
        let Some(record) = state.nav().selected(records) else {
            ui.centered_and_justified(|ui| {
                ui.colored_label(theme.text_secondary, "Select a file to preview");
            });
            return;
        };

        let position = state.nav().current_index(records).map_or(0, |i| i + 1);
        let can_previous = state.nav().can_previous(records);
        let can_next = state.nav().can_next(records);

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new(&record.file_name).size(18.0).strong());
                ui.colored_label(
                    theme.text_secondary,
                    format!("{} · {}", record.uploaded_by, format::date_time(&record.uploaded_date)),
                );
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(can_next, egui::Button::new("›")).clicked() {
                    state.next(records);
                }
                ui.label(format!("Document {}/{}", position, records.len()));
                if ui.add_enabled(can_previous, egui::Button::new("‹")).clicked() {
                    state.previous(records);
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.vertical_centered(|ui| {
                self.previews.ui(ui, theme, record, state.nav_mut());
            });
        });
    }
}

fn side_list(ui: &mut Ui, theme: &Theme, state: &mut DetailState, records: &[FileRecord]) {
    let mut picked = None;
    let selected = state.nav().selected_id().map(str::to_string);

    egui::ScrollArea::vertical()
        .max_height((ui.available_height() - 40.0).max(0.0))
        .show(ui, |ui| {
            for record in state.nav().list_window(records) {
                let active = selected.as_deref() == Some(record.id.as_str());
                if file_card(ui, theme, record, active).clicked() {
                    picked = Some(record.id.clone());
                }
                ui.add_space(8.0);
            }
        });

    if let Some(id) = picked {
        state.select(records, &id);
    }

    let len = records.len();
    ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui| {
        ui.horizontal(|ui| {
            let nav = state.nav_mut();
            if ui.add_enabled(nav.can_prev_list_page(), egui::Button::new("Prev")).clicked() {
                nav.prev_list_page();
            }
            ui.colored_label(
                theme.text_secondary,
                format!("{} of {}", nav.list_range_label(len), len),
            );
            if ui.add_enabled(nav.can_next_list_page(len), egui::Button::new("Next")).clicked() {
                nav.next_list_page(len);
            }
        });
    });
}

fn file_card(ui: &mut Ui, theme: &Theme, record: &FileRecord, active: bool) -> egui::Response {
    let frame = egui::Frame::none()
        .fill(if active { theme.accent_soft } else { theme.surface })
        .stroke(egui::Stroke::new(1.0, if active { theme.accent } else { theme.border }))
        .rounding(6.0)
        .inner_margin(10.0);

    let response = frame
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(if record.is_pdf() { "📄" } else { "🖼" }).size(20.0));
                ui.vertical(|ui| {
                    let name = RichText::new(&record.file_name).strong();
                    ui.label(if active { name.color(theme.accent) } else { name });
                    let kind = if record.is_pdf() { "PDF" } else { "Image" };
                    ui.colored_label(
                        theme.text_secondary,
                        RichText::new(format!("{} · {}", kind, format::short_date(&record.uploaded_date))).small(),
                    );
                });
            });
        })
        .response;

    response.interact(egui::Sense::click())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::preview::PageScanRenderer;
    use app_api::FileType;
    use app_db::PreferenceStore;

    fn record(id: &str, name: &str, file_type: FileType) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            file_name: name.to_string(),
            uploaded_date: "2024-03-01T09:00:00.000Z".to_string(),
            uploaded_by: "Alice".to_string(),
            file_type,
            file_url: format!("file:///filedesk-missing/{}", name),
        }
    }

    fn loaded(records: Vec<FileRecord>) -> FilesSnapshot {
        FilesSnapshot {
            records: Some(Arc::new(records)),
            error: None,
            is_fetching: false,
        }
    }

    fn draw(view: &mut DetailView, state: &mut DetailState, files: &FilesSnapshot) {
        let ctx = egui::Context::default();
        let theme = Theme::light();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| view.ui(ui, &theme, state, files));
        });
    }

    #[test]
    fn test_first_frame_selects_and_persists_first_record() {
        let prefs = PreferenceStore::in_memory();
        let mut state = DetailState::mount(prefs.clone());
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut view = DetailView::new(Arc::new(PageScanRenderer), runtime.handle().clone());

        let files = loaded(vec![
            record("a", "a.pdf", FileType::Pdf),
            record("b", "b.png", FileType::Image),
        ]);
        draw(&mut view, &mut state, &files);

        assert_eq!(state.nav().selected_id(), Some("a"));
        assert_eq!(prefs.selected_file().as_deref(), Some("a"));
    }

    #[test]
    fn test_broken_previews_do_not_disturb_selection() {
        let prefs = PreferenceStore::in_memory();
        prefs.set_selected_file("b");
        let mut state = DetailState::mount(prefs.clone());
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut view = DetailView::new(Arc::new(PageScanRenderer), runtime.handle().clone());

        let files = loaded(vec![
            record("a", "a.pdf", FileType::Pdf),
            record("b", "b.png", FileType::Image),
        ]);
        draw(&mut view, &mut state, &files);
        draw(&mut view, &mut state, &files);

        assert_eq!(state.nav().selected_id(), Some("b"));
        assert_eq!(state.nav().preview_page(), 1);
    }

    #[test]
    fn test_error_and_loading_leave_state_alone() {
        let prefs = PreferenceStore::in_memory();
        let mut state = DetailState::mount(prefs.clone());
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut view = DetailView::new(Arc::new(PageScanRenderer), runtime.handle().clone());

        draw(&mut view, &mut state, &FilesSnapshot::default());
        let failed = FilesSnapshot {
            error: Some("Failed to fetch files".to_string()),
            ..Default::default()
        };
        draw(&mut view, &mut state, &failed);

        assert_eq!(state.nav().selected_id(), None);
        assert_eq!(prefs.selected_file(), None);
    }
}

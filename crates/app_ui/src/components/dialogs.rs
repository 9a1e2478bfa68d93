//! Dialog components

use crate::theme::Theme;
use app_core::{
    validate, AppError, UploadCandidate, UploadSource, ValidationError, PICKER_EXTENSIONS,
};
use egui::{Align2, Context, RichText, Window};
use std::path::{Path, PathBuf};

/// Result of dialog interaction
pub enum DialogResult<T> {
    /// Still open, nothing decided
    None,
    Ok(T),
    Cancel,
}

/// Common dialog trait
pub trait Dialog {
    type Output;
    fn ui(&mut self, ctx: &Context, theme: &Theme) -> DialogResult<Self::Output>;
    fn is_open(&self) -> bool;
    fn close(&mut self);
}

/// A validated file plus the optional uploader name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub candidate: UploadCandidate,
    pub uploaded_by: String,
}

/// "Add Document" dialog.
///
/// Picking and dropping feed the same validation. A rejected file shows a
/// notice and leaves the dialog open with its previous selection.
#[derive(Default)]
pub struct UploadDialog {
    open: bool,
    candidate: Option<UploadCandidate>,
    uploaded_by: String,
    path_input: String,
    /// Local validation notice
    notice: Option<String>,
    /// Failure reported by the backend
    error: Option<String>,
    uploading: bool,
}

impl UploadDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn candidate(&self) -> Option<&UploadCandidate> {
        self.candidate.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn set_uploaded_by(&mut self, name: &str) {
        self.uploaded_by = name.to_string();
    }

    /// Inspect and validate a picked or dropped file
    pub fn accept_path(&mut self, path: &Path, source: UploadSource, declared_type: Option<&str>) {
        let result = UploadCandidate::from_path(path, source)
            .map(|c| match declared_type {
                Some(mt) => c.with_media_type(mt),
                None => c,
            })
            .and_then(|c| validate(&c).map(|_| c));

        match result {
            Ok(candidate) => {
                tracing::info!(name = %candidate.name, ?source, "Upload candidate selected");
                self.path_input = candidate.location.display().to_string();
                self.candidate = Some(candidate);
                self.notice = None;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("Upload candidate rejected: {}", e);
                self.notice = Some(AppError::from(e).user_message());
            }
        }
    }

    /// Result of the native picker; `None` means it was dismissed
    pub fn accept_picked(&mut self, picked: Option<PathBuf>) {
        match picked {
            Some(path) => self.accept_path(&path, UploadSource::FilePicker, None),
            None => tracing::debug!("File picker dismissed"),
        }
    }

    /// Request for the selected file; without one, show the notice instead
    pub fn submit(&mut self) -> Option<UploadRequest> {
        if self.uploading {
            return None;
        }
        let Some(candidate) = self.candidate.clone() else {
            self.notice = Some(ValidationError::NoFileSelected.to_string());
            return None;
        };
        self.uploading = true;
        self.error = None;
        Some(UploadRequest {
            candidate,
            uploaded_by: self.uploaded_by.clone(),
        })
    }

    /// Outcome of the create call started by [`submit`](Self::submit)
    pub fn finish(&mut self, result: Result<(), String>) {
        self.uploading = false;
        match result {
            Ok(()) => self.reset(),
            Err(message) => self.error = Some(message),
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn take_dropped_file(&mut self, ctx: &Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
        let Some(file) = dropped else {
            return;
        };
        match file.path {
            Some(path) => {
                let declared = Some(file.mime.as_str()).filter(|m| !m.is_empty());
                self.accept_path(&path, UploadSource::DragDrop, declared);
            }
            None => {
                self.notice = Some(
                    ValidationError::Unreadable {
                        path: file.name,
                        reason: "dropped content has no file on disk".to_string(),
                    }
                    .to_string(),
                );
            }
        }
    }
}

/// Blocks until the user picks a file or dismisses the native dialog
fn pick_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select Document")
        .add_filter("Documents", &PICKER_EXTENSIONS)
        .add_filter("All files", &["*"])
        .pick_file()
}

impl Dialog for UploadDialog {
    type Output = UploadRequest;

    fn ui(&mut self, ctx: &Context, theme: &Theme) -> DialogResult<UploadRequest> {
        if !self.open {
            return DialogResult::None;
        }

        self.take_dropped_file(ctx);
        let mut close = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        let dragging = ctx.input(|i| !i.raw.hovered_files.is_empty());

        let mut result = DialogResult::None;

        Window::new("Add Document")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .fixed_size([440.0, 0.0])
            .show(ctx, |ui| {
                let stroke_color = if dragging { theme.accent } else { theme.border };
                egui::Frame::none()
                    .stroke(egui::Stroke::new(2.0, stroke_color))
                    .rounding(8.0)
                    .inner_margin(24.0)
                    .fill(if dragging { theme.accent_soft } else { theme.surface })
                    .show(ui, |ui| {
                        ui.set_min_width(ui.available_width());
                        ui.vertical_centered(|ui| match &self.candidate {
                            Some(c) => {
                                ui.label(RichText::new("📄").size(32.0));
                                ui.label(RichText::new(&c.name).strong());
                                ui.colored_label(theme.text_secondary, c.size_label());
                            }
                            None => {
                                ui.label(RichText::new("📁").size(32.0));
                                ui.label("Drag & drop your file here");
                                ui.colored_label(theme.text_secondary, "or browse for it");
                                ui.colored_label(
                                    theme.text_secondary,
                                    RichText::new("Supported: PDF, PNG, JPEG, JPG, GIF").small(),
                                );
                            }
                        });
                    });

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.add_enabled(!self.uploading, egui::Button::new("📂 Browse...")).clicked() {
                        self.accept_picked(pick_file());
                    }
                    let edit = egui::TextEdit::singleline(&mut self.path_input)
                        .hint_text("or type a path")
                        .desired_width(240.0);
                    let response = ui.add(edit);
                    let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if (ui.button("Select").clicked() || entered) && !self.path_input.trim().is_empty() {
                        let path = PathBuf::from(self.path_input.trim());
                        self.accept_path(&path, UploadSource::FilePicker, None);
                    }
                });

                if let Some(notice) = &self.notice {
                    ui.colored_label(theme.error, notice);
                }

                ui.add_space(8.0);
                ui.label("Uploaded By (Optional)");
                ui.add(
                    egui::TextEdit::singleline(&mut self.uploaded_by)
                        .hint_text("Enter your name")
                        .desired_width(f32::INFINITY),
                );

                if let Some(error) = &self.error {
                    ui.add_space(4.0);
                    ui.colored_label(theme.error, error);
                }

                ui.add_space(16.0);
                ui.horizontal(|ui| {
                    if ui.add_enabled(!self.uploading, egui::Button::new("Cancel")).clicked() {
                        close = true;
                    }

                    let label = if self.uploading { "Uploading..." } else { "Upload" };
                    let button = egui::Button::new(RichText::new(label).color(theme.surface)).fill(theme.accent);
                    if ui.add_enabled(!self.uploading, button).clicked() {
                        if let Some(request) = self.submit() {
                            result = DialogResult::Ok(request);
                        }
                    }
                });
            });

        if close {
            self.close();
            if !self.open {
                return DialogResult::Cancel;
            }
        }

        result
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        if !self.uploading {
            self.reset();
        }
    }
}

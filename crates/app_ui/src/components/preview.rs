//! Document previews
//!
//! Images are decoded locally. PDFs go through [`PdfRenderer`], the seam for
//! an external rendering engine. A failed preview degrades to a placeholder
//! and never takes the rest of the view down with it.

use crate::theme::Theme;
use app_api::{FileRecord, Url};
use app_core::{AppError, DetailNavigation};
use crossbeam_channel::{Receiver, Sender};
use egui::{ColorImage, TextureHandle, TextureOptions, Ui};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Renders PDF documents page by page
pub trait PdfRenderer: Send + Sync {
    /// Number of pages in the document at `path`
    fn page_count(&self, path: &Path) -> Result<u32, AppError>;

    /// Pixels of 1-indexed `page` scaled to `width`; `Ok(None)` if this
    /// renderer cannot rasterise pages.
    fn render_page(&self, path: &Path, page: u32, width: u32) -> Result<Option<image::RgbaImage>, AppError>;
}

/// Counts page objects without rasterising anything
#[derive(Debug, Default, Clone, Copy)]
pub struct PageScanRenderer;

impl PageScanRenderer {
    /// Count `/Type /Page` dictionaries, skipping the `/Type /Pages` tree nodes
    pub fn count_pages(bytes: &[u8]) -> u32 {
        const MARKER: &[u8] = b"/Type";
        let mut count = 0;
        let mut i = 0;
        while let Some(pos) = find(&bytes[i..], MARKER) {
            let mut j = i + pos + MARKER.len();
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if bytes[j..].starts_with(b"/Page") {
                let after = bytes.get(j + 5).copied();
                if !matches!(after, Some(c) if c.is_ascii_alphanumeric()) {
                    count += 1;
                }
            }
            i = j;
        }
        count
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

impl PdfRenderer for PageScanRenderer {
    fn page_count(&self, path: &Path) -> Result<u32, AppError> {
        let bytes = std::fs::read(path)
            .map_err(|e| AppError::Render(format!("{}: {}", path.display(), e)))?;
        if !bytes.starts_with(b"%PDF-") {
            return Err(AppError::Render(format!("{} is not a PDF", path.display())));
        }
        match Self::count_pages(&bytes) {
            0 => Err(AppError::Render(format!("{} has no pages", path.display()))),
            n => Ok(n),
        }
    }

    fn render_page(&self, _path: &Path, _page: u32, _width: u32) -> Result<Option<image::RgbaImage>, AppError> {
        Ok(None)
    }
}

/// Local path behind a record's `file://` location
pub fn local_path(file_url: &str) -> Result<PathBuf, AppError> {
    let url = Url::parse(file_url).map_err(|e| AppError::Render(format!("{}: {}", file_url, e)))?;
    if url.scheme() != "file" {
        return Err(AppError::Render(format!("{} is not a local file", file_url)));
    }
    url.to_file_path()
        .map_err(|_| AppError::Render(format!("{} has no local path", file_url)))
}

/// Decode an image file into egui pixels; the format comes from the content
pub fn decode_image(path: &Path) -> Result<ColorImage, AppError> {
    let render_err = |e: &dyn std::fmt::Display| AppError::Render(format!("{}: {}", path.display(), e));
    let img = image::ImageReader::open(path)
        .map_err(|e| render_err(&e))?
        .with_guessed_format()
        .map_err(|e| render_err(&e))?
        .decode()
        .map_err(|e| render_err(&e))?;
    Ok(to_color_image(&img.to_rgba8()))
}

fn to_color_image(rgba: &image::RgbaImage) -> ColorImage {
    let size = [rgba.width() as usize, rgba.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, rgba.as_raw())
}

/// Work handed to the runtime's blocking pool
enum Job {
    Open { url: String, is_pdf: bool },
    Page { url: String, page: u32, width: u32 },
}

enum Outcome {
    Image(ColorImage),
    PdfOpened(u32),
    PdfPage(u32, Option<ColorImage>),
    Failed(AppError),
    PageFailed(u32, AppError),
}

struct Finished {
    generation: u64,
    id: String,
    outcome: Outcome,
}

fn run_job(pdf: &dyn PdfRenderer, job: Job) -> Outcome {
    match job {
        Job::Open { url, is_pdf } => {
            let result = local_path(&url).and_then(|path| {
                if is_pdf {
                    pdf.page_count(&path).map(Outcome::PdfOpened)
                } else {
                    decode_image(&path).map(Outcome::Image)
                }
            });
            result.unwrap_or_else(Outcome::Failed)
        }
        Job::Page { url, page, width } => {
            match local_path(&url).and_then(|path| pdf.render_page(&path, page, width)) {
                Ok(img) => Outcome::PdfPage(page, img.as_ref().map(to_color_image)),
                Err(e) => Outcome::PageFailed(page, e),
            }
        }
    }
}

enum Page {
    Pending,
    Ready(TextureHandle),
    /// Nothing to draw; the placeholder stands in
    Blank,
}

enum Preview {
    Loading,
    Image(TextureHandle),
    Pdf { pages: u32, rendered: HashMap<u32, Page> },
    Failed,
}

/// Loaded previews keyed by record id.
///
/// Files are read and decoded on the runtime's blocking pool; the frame only
/// uploads finished pixels as textures.
pub struct PreviewCache {
    pdf: Arc<dyn PdfRenderer>,
    runtime: Handle,
    entries: HashMap<String, Preview>,
    /// Bumped by [`clear`](Self::clear) so late results are dropped
    generation: u64,
    done_tx: Sender<Finished>,
    done_rx: Receiver<Finished>,
}

impl PreviewCache {
    pub fn new(pdf: Arc<dyn PdfRenderer>, runtime: Handle) -> Self {
        let (done_tx, done_rx) = crossbeam_channel::unbounded();
        Self {
            pdf,
            runtime,
            entries: HashMap::new(),
            generation: 0,
            done_tx,
            done_rx,
        }
    }

    /// Drop everything, e.g. after the file list changed
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    /// Is the preview of `id` still being loaded?
    pub fn is_loading(&self, id: &str) -> bool {
        match self.entries.get(id) {
            Some(Preview::Loading) => true,
            Some(Preview::Pdf { rendered, .. }) => rendered.values().any(|p| matches!(p, Page::Pending)),
            _ => false,
        }
    }

    fn spawn(&self, id: &str, job: Job) {
        let pdf = self.pdf.clone();
        let tx = self.done_tx.clone();
        let generation = self.generation;
        let id = id.to_string();
        self.runtime.spawn_blocking(move || {
            let outcome = run_job(pdf.as_ref(), job);
            if tx.send(Finished { generation, id, outcome }).is_err() {
                tracing::debug!("Preview finished after its view was dropped");
            }
        });
    }

    /// Apply finished loads; results from before the last clear are ignored
    fn collect(&mut self, ctx: &egui::Context) {
        while let Ok(done) = self.done_rx.try_recv() {
            if done.generation != self.generation {
                continue;
            }
            let id = done.id;
            match done.outcome {
                Outcome::Image(pixels) => {
                    let texture = ctx.load_texture(format!("preview-{}", id), pixels, TextureOptions::LINEAR);
                    self.entries.insert(id, Preview::Image(texture));
                }
                Outcome::PdfOpened(pages) => {
                    self.entries.insert(id, Preview::Pdf { pages, rendered: HashMap::new() });
                }
                Outcome::Failed(e) => {
                    tracing::warn!(id = %id, "Preview failed: {}", e);
                    self.entries.insert(id, Preview::Failed);
                }
                Outcome::PdfPage(page, pixels) => {
                    if let Some(Preview::Pdf { rendered, .. }) = self.entries.get_mut(&id) {
                        let slot = match pixels {
                            Some(pixels) => {
                                let name = format!("preview-{}-p{}", id, page);
                                Page::Ready(ctx.load_texture(name, pixels, TextureOptions::LINEAR))
                            }
                            None => Page::Blank,
                        };
                        rendered.insert(page, slot);
                    }
                }
                Outcome::PageFailed(page, e) => {
                    tracing::warn!(id = %id, page, "PDF page render failed: {}", e);
                    if let Some(Preview::Pdf { rendered, .. }) = self.entries.get_mut(&id) {
                        rendered.insert(page, Page::Blank);
                    }
                }
            }
        }
    }

    /// Draw the preview of `record`, reporting PDF page counts to `nav`
    pub fn ui(&mut self, ui: &mut Ui, theme: &Theme, record: &FileRecord, nav: &mut DetailNavigation) {
        self.collect(ui.ctx());

        if !self.entries.contains_key(&record.id) {
            self.entries.insert(record.id.clone(), Preview::Loading);
            let job = Job::Open {
                url: record.file_url.clone(),
                is_pdf: record.is_pdf(),
            };
            self.spawn(&record.id, job);
        }

        let width = ui.available_width().min(900.0);
        let mut page_job = None;
        let Some(entry) = self.entries.get_mut(&record.id) else {
            return;
        };

        match entry {
            Preview::Loading => {
                ui.add_space(60.0);
                ui.spinner();
                ui.ctx().request_repaint();
            }
            Preview::Image(texture) => {
                ui.add(egui::Image::new(&*texture).max_width(width).shrink_to_fit());
            }
            Preview::Pdf { pages, rendered } => {
                if nav.preview_page_count() != Some(*pages) {
                    nav.set_preview_page_count(*pages);
                }
                let page = nav.preview_page();

                match rendered.get(&page) {
                    Some(Page::Ready(texture)) => {
                        ui.add(egui::Image::new(texture).max_width(width).shrink_to_fit());
                    }
                    Some(Page::Pending) => {
                        ui.spinner();
                        ui.ctx().request_repaint();
                    }
                    Some(Page::Blank) => pdf_placeholder(ui, theme),
                    None => {
                        rendered.insert(page, Page::Pending);
                        page_job = Some(Job::Page {
                            url: record.file_url.clone(),
                            page,
                            width: width as u32,
                        });
                        ui.spinner();
                    }
                }

                page_controls(ui, nav, *pages);
            }
            Preview::Failed => {
                if record.is_pdf() {
                    pdf_placeholder(ui, theme);
                } else {
                    image_placeholder(ui, theme, width);
                }
            }
        }

        if let Some(job) = page_job {
            self.spawn(&record.id, job);
        }
    }
}

fn page_controls(ui: &mut Ui, nav: &mut DetailNavigation, pages: u32) {
    ui.add_space(8.0);
    ui.horizontal(|ui| {
        let page = nav.preview_page();
        if ui.add_enabled(page > 1, egui::Button::new("−")).clicked() {
            nav.prev_preview_page();
        }
        ui.label(format!("PDF Page No. {} / {}", page, pages));
        if ui.add_enabled(page < pages, egui::Button::new("+")).clicked() {
            nav.next_preview_page();
        }
    });
}

fn pdf_placeholder(ui: &mut Ui, theme: &Theme) {
    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.colored_label(theme.error, "Unable to load PDF preview");
        ui.add_space(12.0);
        ui.colored_label(theme.text_secondary, "Demo mode - actual PDFs would display here");
    });
}

fn image_placeholder(ui: &mut Ui, theme: &Theme, width: f32) {
    let size = egui::vec2(width.min(600.0), 400.0_f32.min(width * 2.0 / 3.0));
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    ui.painter().rect_filled(rect, 4.0, theme.background);
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "Image Preview Unavailable",
        egui::FontId::proportional(18.0),
        theme.text_secondary,
    );
}

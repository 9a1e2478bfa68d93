//! Upload staging: validate a local candidate and build the record to create
//!
//! Staging happens entirely on this machine. A rejected candidate never
//! reaches the network and never consumes an id.

use crate::error::ValidationError;
use app_api::{FileRecord, FileType, Url, ANONYMOUS};
use chrono::{SecondsFormat, Utc};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Media types accepted for upload
pub const ALLOWED_MEDIA_TYPES: [&str; 5] = [
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
];

/// Extensions offered by the native file picker
pub const PICKER_EXTENSIONS: [&str; 5] = ["pdf", "png", "jpg", "jpeg", "gif"];

/// Bytes read from a candidate when its extension is not recognised
const SNIFF_LEN: usize = 16;

/// How the candidate reached the upload dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSource {
    FilePicker,
    DragDrop,
}

/// A local file the user picked or dropped, not yet validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub name: String,
    pub size: u64,
    /// Detected or declared media type; `None` if nothing matched
    pub media_type: Option<String>,
    /// Absolute path of the content
    pub location: PathBuf,
    pub source: UploadSource,
}

impl UploadCandidate {
    /// Inspect a file on disk: metadata, absolute location, media type
    pub fn from_path(path: &Path, source: UploadSource) -> Result<Self, ValidationError> {
        let unreadable = |reason: String| ValidationError::Unreadable {
            path: path.display().to_string(),
            reason,
        };

        let location = std::fs::canonicalize(path).map_err(|e| unreadable(e.to_string()))?;
        let metadata = std::fs::metadata(&location).map_err(|e| unreadable(e.to_string()))?;
        if !metadata.is_file() {
            return Err(unreadable("not a regular file".to_string()));
        }

        let name = location
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| unreadable("missing file name".to_string()))?;

        let media_type = detect_media_type(&location);
        tracing::debug!(?source, %name, ?media_type, "Upload candidate inspected");

        Ok(Self {
            name,
            size: metadata.len(),
            media_type,
            location,
            source,
        })
    }

    /// Override the detected type with one declared by the drop payload.
    /// Blank declarations are ignored.
    pub fn with_media_type(mut self, media_type: &str) -> Self {
        let media_type = media_type.trim();
        if !media_type.is_empty() {
            self.media_type = Some(media_type.to_ascii_lowercase());
        }
        self
    }

    /// Size for display, e.g. `"12.50 KB"`
    pub fn size_label(&self) -> String {
        format!("{:.2} KB", self.size as f64 / 1024.0)
    }
}

/// Media type implied by a file extension, if the extension is known
pub fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "txt" | "text" | "log" => Some("text/plain"),
        _ => image::ImageFormat::from_extension(&ext).map(|f| f.to_mime_type()),
    }
}

/// Media type from leading magic bytes
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF-") {
        return Some("application/pdf");
    }
    image::guess_format(bytes).ok().map(|f| f.to_mime_type())
}

fn detect_media_type(path: &Path) -> Option<String> {
    if let Some(mt) = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(media_type_for_extension)
    {
        return Some(mt.to_string());
    }

    let mut head = Vec::with_capacity(SNIFF_LEN);
    let read = std::fs::File::open(path)
        .and_then(|f| f.take(SNIFF_LEN as u64).read_to_end(&mut head));
    if let Err(e) = read {
        tracing::debug!("Could not sniff {:?}: {}", path, e);
        return None;
    }
    sniff_media_type(&head).map(str::to_string)
}

/// Is `media_type` on the upload allow-list?
pub fn is_allowed(media_type: &str) -> bool {
    ALLOWED_MEDIA_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(media_type))
}

/// Check the candidate against the allow-list and derive its record type
pub fn validate(candidate: &UploadCandidate) -> Result<FileType, ValidationError> {
    match candidate.media_type.as_deref() {
        Some(mt) if is_allowed(mt) => Ok(if mt.eq_ignore_ascii_case("application/pdf") {
            FileType::Pdf
        } else {
            FileType::Image
        }),
        other => Err(ValidationError::UnsupportedFileType {
            media_type: other.map(str::to_string),
        }),
    }
}

/// Validate `candidate` and build the record to send to the backend
pub fn stage(
    candidate: &UploadCandidate,
    uploaded_by: &str,
    ids: &IdGenerator,
) -> Result<FileRecord, ValidationError> {
    let file_type = match validate(candidate) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(name = %candidate.name, media_type = ?candidate.media_type, "Upload rejected");
            return Err(e);
        }
    };

    let file_url = Url::from_file_path(&candidate.location).map_err(|_| ValidationError::Unreadable {
        path: candidate.location.display().to_string(),
        reason: "not an absolute path".to_string(),
    })?;

    let uploaded_by = match uploaded_by.trim() {
        "" => ANONYMOUS.to_string(),
        name => name.to_string(),
    };

    let record = FileRecord {
        id: ids.next_id(),
        file_name: candidate.name.clone(),
        uploaded_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uploaded_by,
        file_type,
        file_url: file_url.to_string(),
    };

    tracing::info!(id = %record.id, name = %record.file_name, %file_type, "Upload staged");
    Ok(record)
}

/// Millisecond-timestamp ids, strictly increasing within the process
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or_else(|last| last);
        now.max(prev + 1).to_string()
    }
}

/// Admits one upload at a time
#[derive(Debug, Default)]
pub struct SubmitLatch {
    busy: AtomicBool,
}

impl SubmitLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the latch; `None` while another submission holds it
    pub fn try_acquire(&self) -> Option<SubmitGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitGuard { latch: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the latch on drop
#[derive(Debug)]
pub struct SubmitGuard<'a> {
    latch: &'a SubmitLatch,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.latch.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn candidate(media_type: Option<&str>) -> UploadCandidate {
        UploadCandidate {
            name: "doc".into(),
            size: 10,
            media_type: media_type.map(str::to_string),
            location: std::env::temp_dir().join("doc"),
            source: UploadSource::FilePicker,
        }
    }

    #[test]
    fn test_txt_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "notes.txt", b"plain text");

        let c = UploadCandidate::from_path(&path, UploadSource::FilePicker).unwrap();
        assert_eq!(c.media_type.as_deref(), Some("text/plain"));

        let ids = IdGenerator::new();
        let err = stage(&c, "", &ids).unwrap_err();
        assert_eq!(err.to_string(), "unsupported file type");
        assert_eq!(ids.last.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_png_becomes_anonymous_image() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "scan.png", PNG_MAGIC);

        let c = UploadCandidate::from_path(&path, UploadSource::DragDrop).unwrap();
        let record = stage(&c, "   ", &IdGenerator::new()).unwrap();

        assert_eq!(record.file_type, FileType::Image);
        assert_eq!(record.uploaded_by, "Anonymous");
        assert_eq!(record.file_name, "scan.png");
        assert!(record.file_url.starts_with("file://"));
        assert!(record.uploaded_at().is_some());
        assert!(record.uploaded_date.ends_with('Z'));
    }

    #[test]
    fn test_pdf_keeps_uploader() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "Invoice.PDF", b"%PDF-1.7\n");

        let c = UploadCandidate::from_path(&path, UploadSource::FilePicker).unwrap();
        let record = stage(&c, " Dana ", &IdGenerator::new()).unwrap();
        assert_eq!(record.file_type, FileType::Pdf);
        assert_eq!(record.uploaded_by, "Dana");
    }

    #[test]
    fn test_picker_extensions_are_allowed() {
        for ext in PICKER_EXTENSIONS {
            let mt = media_type_for_extension(ext);
            assert!(mt.is_some_and(is_allowed), "{} should be uploadable", ext);
        }
    }

    #[test]
    fn test_accepts_exactly_allow_list() {
        for mt in ALLOWED_MEDIA_TYPES {
            assert!(validate(&candidate(Some(mt))).is_ok(), "{} should pass", mt);
        }
        for mt in ["text/plain", "image/webp", "image/svg+xml", "application/zip", "video/mp4"] {
            assert!(validate(&candidate(Some(mt))).is_err(), "{} should fail", mt);
        }
        assert_eq!(
            validate(&candidate(None)),
            Err(ValidationError::UnsupportedFileType { media_type: None })
        );
        assert_eq!(validate(&candidate(Some("application/pdf"))), Ok(FileType::Pdf));
        assert_eq!(validate(&candidate(Some("image/jpg"))), Ok(FileType::Image));
    }

    #[test]
    fn test_sniffs_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let pdf = write(&dir, "download", b"%PDF-1.4 rest");
        let png = write(&dir, "image.bin", PNG_MAGIC);
        let junk = write(&dir, "blob", b"hello world");

        let detect = |p: &Path| UploadCandidate::from_path(p, UploadSource::FilePicker).unwrap().media_type;
        assert_eq!(detect(&pdf).as_deref(), Some("application/pdf"));
        assert_eq!(detect(&png).as_deref(), Some("image/png"));
        assert_eq!(detect(&junk), None);
    }

    #[test]
    fn test_declared_type_overrides_detection() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "photo.txt", b"not really text");

        let c = UploadCandidate::from_path(&path, UploadSource::DragDrop)
            .unwrap()
            .with_media_type("IMAGE/GIF");
        assert_eq!(validate(&c), Ok(FileType::Image));

        let unchanged = c.clone().with_media_type("  ");
        assert_eq!(unchanged.media_type.as_deref(), Some("image/gif"));
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let err = UploadCandidate::from_path(&dir.path().join("gone.png"), UploadSource::FilePicker)
            .unwrap_err();
        assert!(matches!(err, ValidationError::Unreadable { .. }));
    }

    #[test]
    fn test_size_label() {
        let mut c = candidate(None);
        c.size = 12_800;
        assert_eq!(c.size_label(), "12.50 KB");
    }

    #[test]
    fn test_ids_strictly_increase() {
        let ids = IdGenerator::new();
        let generated: Vec<u64> = (0..500).map(|_| ids.next_id().parse().unwrap()).collect();
        assert!(generated.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(generated.iter().collect::<HashSet<_>>().len(), 500);
    }

    #[test]
    fn test_latch_admits_one() {
        let latch = SubmitLatch::new();
        let guard = latch.try_acquire().unwrap();
        assert!(latch.is_busy());
        assert!(latch.try_acquire().is_none());
        drop(guard);
        assert!(!latch.is_busy());
        assert!(latch.try_acquire().is_some());
    }
}

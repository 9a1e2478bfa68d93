//! UI Components

pub mod dashboard;
pub mod detail;
pub mod dialogs;
pub mod format;
pub mod preview;
pub mod recovery;
pub mod sidebar;
pub mod status_bar;

pub use dashboard::{DashboardAction, DashboardView};
pub use detail::DetailView;
pub use dialogs::{Dialog, DialogResult, UploadDialog, UploadRequest};
pub use preview::{PageScanRenderer, PdfRenderer, PreviewCache};
pub use recovery::RecoveryPanel;
pub use sidebar::Sidebar;
pub use status_bar::{StatusBar, StatusInfo};

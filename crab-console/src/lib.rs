//! Crab Console - table and QR code management for the admin console
//!
//! Talks to the `/admin` REST API, keeps a per-branch table cache, gates
//! destructive token operations behind explicit confirmation and renders
//! scan links as PNG/PDF artifacts.

pub mod clipboard;
pub mod config;
pub mod confirm;
pub mod debounce;
pub mod error;
pub mod export;
pub mod http;
pub mod notice;
pub mod registry;
pub mod scan;

pub use clipboard::{Clipboard, DeniedClipboard, MemoryClipboard};
#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
pub use config::ClientConfig;
pub use confirm::{ConfirmOutcome, DestructiveAction, PendingAction};
pub use debounce::Debouncer;
pub use error::{ClientError, ClientResult};
pub use export::{ExportFormat, ExportRequest, Exporter, RenderedQr, export_file_name};
pub use http::{AdminApi, HttpAdminApi};
pub use notice::{Notice, NoticeLevel};
pub use registry::TableRegistry;
pub use scan::ScanUrl;

// Re-export shared and rendering types for convenience
pub use crab_qr::{ErrorCorrection, QrSize};
pub use shared::models::{Branch, DiningTable};

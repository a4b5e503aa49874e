//! # crab-qr
//!
//! QR code rendering library - low-level drawing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW a code is drawn:
//! - QR matrix encoding with selectable error correction
//! - Square raster rendering with a quiet zone
//! - PNG encoding
//! - Single-page PDF composition (text + vector code)
//!
//! Business logic (WHAT is encoded, file naming, where files go) stays in
//! `crab-console`.
//!
//! ## Example
//!
//! ```ignore
//! use crab_qr::{ErrorCorrection, PdfPageBuilder, QrMatrix, QrSize};
//!
//! let matrix = QrMatrix::encode("https://shop.example/menu/scan/abc", ErrorCorrection::High)?;
//! let png = crab_qr::render_png(&matrix, QrSize::EXPORT)?;
//!
//! let mut page = PdfPageBuilder::a4();
//! page.text_centered(780.0, 24.0, "Main St.");
//! page.qr_code(&matrix, 147.5, 250.0, 300.0);
//! let pdf = page.build();
//! ```

mod error;
mod matrix;
mod pdf;
mod raster;

// Re-exports
pub use error::{RenderError, RenderResult};
pub use matrix::{ErrorCorrection, QrMatrix};
pub use pdf::PdfPageBuilder;
pub use raster::{QUIET_ZONE, QrSize, encode_png, render, render_png};

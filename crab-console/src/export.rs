//! PNG/PDF export of table QR codes
//!
//! Export always works from a [`RenderedQr`]: the matrix and raster are
//! produced before any file is written, so an export can never capture a
//! half-drawn code.

use crate::{ClientError, ClientResult, ScanUrl};
use chrono::{DateTime, Utc};
use crab_qr::{ErrorCorrection, PdfPageBuilder, QrMatrix, QrSize};
use image::GrayImage;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// A4 portrait layout, in points
const PDF_QR_SIDE: f32 = 360.0;
const PDF_QR_Y: f32 = 320.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unsupported export format: {}", other)),
        }
    }
}

/// Lower-case, with every non-alphanumeric character replaced by `_`
fn normalize_name(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                '_'
            }
        })
        .collect()
}

/// `{branch}_table_{label}_qr.{ext}`, e.g. `main_st__table_table_01_qr.png`
pub fn export_file_name(branch_name: &str, table_label: &str, format: ExportFormat) -> String {
    format!(
        "{}_table_{}_qr.{}",
        normalize_name(branch_name),
        normalize_name(table_label),
        format.extension()
    )
}

/// A fully rendered QR code for one scan link
#[derive(Debug, Clone)]
pub struct RenderedQr {
    url: String,
    matrix: QrMatrix,
    raster: GrayImage,
    size: QrSize,
}

impl RenderedQr {
    pub fn render(
        scan: &ScanUrl,
        token: &str,
        size: QrSize,
        ec: ErrorCorrection,
    ) -> ClientResult<Self> {
        let url = scan.for_token(token);
        let matrix = QrMatrix::encode(&url, ec)?;
        let raster = crab_qr::render(&matrix, size)?;
        Ok(Self {
            url,
            matrix,
            raster,
            size,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn matrix(&self) -> &QrMatrix {
        &self.matrix
    }

    pub fn raster(&self) -> &GrayImage {
        &self.raster
    }

    pub fn size(&self) -> QrSize {
        self.size
    }

    pub fn to_png(&self) -> ClientResult<Vec<u8>> {
        Ok(crab_qr::encode_png(&self.raster)?)
    }
}

/// Labels printed alongside the code
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub branch_name: String,
    pub table_label: String,
    pub generated_at: DateTime<Utc>,
}

impl ExportRequest {
    pub fn new(branch_name: impl Into<String>, table_label: impl Into<String>) -> Self {
        Self {
            branch_name: branch_name.into(),
            table_label: table_label.into(),
            generated_at: Utc::now(),
        }
    }

    pub fn file_name(&self, format: ExportFormat) -> String {
        export_file_name(&self.branch_name, &self.table_label, format)
    }
}

/// Writes exports into a directory
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Encode without touching the filesystem
    pub fn encode(
        &self,
        format: ExportFormat,
        qr: &RenderedQr,
        req: &ExportRequest,
    ) -> ClientResult<Vec<u8>> {
        match format {
            ExportFormat::Png => qr.to_png(),
            ExportFormat::Pdf => Ok(compose_pdf(qr, req)),
        }
    }

    /// Encode and write; an existing file with the same name is replaced
    pub fn export(
        &self,
        format: ExportFormat,
        qr: &RenderedQr,
        req: &ExportRequest,
    ) -> ClientResult<PathBuf> {
        let bytes = self.encode(format, qr, req)?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(req.file_name(format));
        std::fs::write(&path, &bytes).map_err(ClientError::Io)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "QR code exported");
        Ok(path)
    }
}

fn compose_pdf(qr: &RenderedQr, req: &ExportRequest) -> Vec<u8> {
    let mut page = PdfPageBuilder::a4();
    let width = page.width();
    let qr_x = (width - PDF_QR_SIDE) / 2.0;
    let generated = format!(
        "Generated {} UTC",
        req.generated_at.format("%Y-%m-%d %H:%M")
    );

    page.title(&format!("{} - {}", req.branch_name, req.table_label))
        .text_bold_centered(760.0, 28.0, &req.branch_name)
        .text_centered(725.0, 20.0, &req.table_label)
        .rule(72.0, width - 72.0, 705.0)
        .qr_code(qr.matrix(), qr_x, PDF_QR_Y, PDF_QR_SIDE)
        .text_centered(295.0, 10.0, qr.url())
        .text_centered(60.0, 9.0, &generated);
    page.build()
}

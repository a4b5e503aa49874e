//! QR matrix encoding

use crate::error::{RenderError, RenderResult};
use qrcode::{Color, EcLevel, QrCode};
use std::fmt;
use std::str::FromStr;

/// Error correction level
///
/// Printed table codes get scratched and stained, so exports use `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCorrection {
    /// ~7% recovery
    Low,
    /// ~15% recovery
    Medium,
    /// ~25% recovery
    Quartile,
    /// ~30% recovery
    #[default]
    High,
}

impl ErrorCorrection {
    fn level(self) -> EcLevel {
        match self {
            Self::Low => EcLevel::L,
            Self::Medium => EcLevel::M,
            Self::Quartile => EcLevel::Q,
            Self::High => EcLevel::H,
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "L",
            Self::Medium => "M",
            Self::Quartile => "Q",
            Self::High => "H",
        };
        f.write_str(s)
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(Self::Low),
            "m" | "medium" => Ok(Self::Medium),
            "q" | "quartile" => Ok(Self::Quartile),
            "h" | "high" => Ok(Self::High),
            other => Err(format!("unknown error correction level: {}", other)),
        }
    }
}

/// Encoded QR matrix (modules only, no quiet zone)
#[derive(Debug, Clone)]
pub struct QrMatrix {
    payload: String,
    ec: ErrorCorrection,
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Encode a payload at the given error correction level
    pub fn encode(payload: &str, ec: ErrorCorrection) -> RenderResult<Self> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), ec.level())
            .map_err(|e| RenderError::Encode(e.to_string()))?;

        let width = code.width();
        let dark = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();

        tracing::debug!(width, ec = %ec, len = payload.len(), "QR matrix encoded");

        Ok(Self {
            payload: payload.to_string(),
            ec,
            width,
            dark,
        })
    }

    /// The encoded payload
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Error correction level used
    pub fn error_correction(&self) -> ErrorCorrection {
        self.ec
    }

    /// Modules per side
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at column `x`, row `y` is dark
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }

    /// Iterate over dark module coordinates, row by row
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.dark
            .iter()
            .enumerate()
            .filter(|(_, d)| **d)
            .map(|(i, _)| (i % self.width, i / self.width))
    }
}

//! Single-page PDF composition
//!
//! Writes a minimal PDF 1.4 file by hand: one page, the standard Helvetica
//! fonts, a CJK font, and a content stream. The QR code is drawn as filled
//! vector squares so it stays sharp at any print size.
//!
//! Text that WinAnsi can carry (ASCII, Latin-1, the cp1252 punctuation) is
//! set in Helvetica. Anything else is set in Adobe's `STSong-Light` through
//! the `UniGB-UCS2-H` CMap: one of the standard CJK fonts that readers supply
//! themselves, so nothing is embedded. Characters outside the Basic
//! Multilingual Plane become `?`.

use crate::matrix::QrMatrix;
use crate::raster::QUIET_ZONE;
use std::fmt::Write as _;

/// A4 in points
const A4: (f32, f32) = (595.0, 842.0);

/// Approximate Helvetica advance width, in em
const AVG_GLYPH_EM: f32 = 0.55;

/// STSong-Light advance widths, in em
const CJK_HALF_EM: f32 = 0.5;
const CJK_FULL_EM: f32 = 1.0;

/// Font selection for text runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
    Cjk,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Cjk => "F3",
        }
    }
}

/// Single-page PDF builder
///
/// Coordinates are PDF points with the origin at the bottom-left corner.
pub struct PdfPageBuilder {
    width: f32,
    height: f32,
    title: Option<String>,
    ops: String,
}

impl PdfPageBuilder {
    /// Create a builder for a page of the given size in points
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            title: None,
            ops: String::new(),
        }
    }

    /// A4 portrait
    pub fn a4() -> Self {
        Self::new(A4.0, A4.1)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Set the document title (Info dictionary)
    pub fn title(&mut self, title: &str) -> &mut Self {
        self.title = Some(title.to_string());
        self
    }

    // === Text ===

    /// Draw a line of text with its baseline starting at (x, y)
    pub fn text(&mut self, x: f32, y: f32, size: f32, s: &str) -> &mut Self {
        self.text_run(Font::Regular, x, y, size, s)
    }

    /// Draw bold text with its baseline starting at (x, y)
    pub fn text_bold(&mut self, x: f32, y: f32, size: f32, s: &str) -> &mut Self {
        self.text_run(Font::Bold, x, y, size, s)
    }

    /// Draw text horizontally centred on the page
    pub fn text_centered(&mut self, y: f32, size: f32, s: &str) -> &mut Self {
        let x = (self.width - text_width(s, size)) / 2.0;
        self.text_run(Font::Regular, x.max(0.0), y, size, s)
    }

    /// Draw bold text horizontally centred on the page
    pub fn text_bold_centered(&mut self, y: f32, size: f32, s: &str) -> &mut Self {
        let x = (self.width - text_width(s, size)) / 2.0;
        self.text_run(Font::Bold, x.max(0.0), y, size, s)
    }

    /// `font` applies when WinAnsi covers `s`; otherwise the CJK font is used
    fn text_run(&mut self, font: Font, x: f32, y: f32, size: f32, s: &str) -> &mut Self {
        let (font, operand) = match win_ansi_literal(s) {
            Some(literal) => (font, literal),
            None => (Font::Cjk, ucs2_hex(s)),
        };
        let _ = writeln!(
            self.ops,
            "BT /{} {:.2} Tf {:.2} {:.2} Td {} Tj ET",
            font.resource(),
            size,
            x,
            y,
            operand
        );
        self
    }

    // === Graphics ===

    /// Draw a QR code (including its quiet zone) in a square of `side`
    /// points whose bottom-left corner is at (x, y).
    pub fn qr_code(&mut self, matrix: &QrMatrix, x: f32, y: f32, side: f32) -> &mut Self {
        let total = (matrix.width() + 2 * QUIET_ZONE) as f32;
        let module = side / total;
        let top = y + side;

        self.ops.push_str("q\n1 g\n");
        let _ = writeln!(self.ops, "{:.3} {:.3} {:.3} {:.3} re f", x, y, side, side);
        self.ops.push_str("0 g\n");
        for (mx, my) in matrix.dark_modules() {
            let px = x + (mx + QUIET_ZONE) as f32 * module;
            // Matrix rows grow downwards, PDF y grows upwards
            let py = top - (my + QUIET_ZONE + 1) as f32 * module;
            let _ = writeln!(self.ops, "{:.3} {:.3} {:.3} {:.3} re", px, py, module, module);
        }
        self.ops.push_str("f\nQ\n");
        self
    }

    /// Draw a horizontal rule
    pub fn rule(&mut self, x1: f32, x2: f32, y: f32) -> &mut Self {
        let _ = writeln!(self.ops, "0.5 w {:.2} {:.2} m {:.2} {:.2} l S", x1, y, x2, y);
        self
    }

    // === Build ===

    /// Serialize the document
    pub fn build(self) -> Vec<u8> {
        let mut objects: Vec<String> = Vec::with_capacity(10);

        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        objects.push("<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string());
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Resources << /Font << /F1 4 0 R /F2 5 0 R /F3 6 0 R >> >> /Contents 9 0 R >>",
            self.width, self.height
        ));
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );
        objects.push(
            "<< /Type /Font /Subtype /Type0 /BaseFont /STSong-Light /Encoding /UniGB-UCS2-H \
             /DescendantFonts [7 0 R] >>"
                .to_string(),
        );
        // CIDs 1-95 are the half-width ASCII glyphs of Adobe-GB1
        objects.push(
            "<< /Type /Font /Subtype /CIDFontType0 /BaseFont /STSong-Light \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (GB1) /Supplement 2 >> \
             /FontDescriptor 8 0 R /DW 1000 /W [1 95 500] >>"
                .to_string(),
        );
        objects.push(
            "<< /Type /FontDescriptor /FontName /STSong-Light /Flags 6 \
             /FontBBox [-25 -254 1000 880] /ItalicAngle 0 /Ascent 880 /Descent -120 \
             /CapHeight 880 /StemV 93 >>"
                .to_string(),
        );
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            self.ops.len(),
            self.ops
        ));
        let title = self.title.as_deref().unwrap_or("QR code");
        objects.push(format!(
            "<< /Title {} /Producer (crab-qr) >>",
            info_string(title)
        ));

        let mut out: Vec<u8> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_at = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for off in &offsets {
            let _ = write!(xref, "{:010} 00000 n \n", off);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            objects.len(),
            xref_at
        );
        out.extend_from_slice(xref.as_bytes());
        out
    }
}

impl Default for PdfPageBuilder {
    fn default() -> Self {
        Self::a4()
    }
}

/// Estimated rendered width of `s` at `size` points
fn text_width(s: &str, size: f32) -> f32 {
    if s.chars().all(|c| win_ansi(c).is_some()) {
        return s.chars().count() as f32 * size * AVG_GLYPH_EM;
    }
    s.chars()
        .map(|c| if c.is_ascii() { CJK_HALF_EM } else { CJK_FULL_EM })
        .sum::<f32>()
        * size
}

/// WinAnsiEncoding byte for `c`, if the standard fonts carry it
fn win_ansi(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// `s` as a WinAnsi literal string `(...)`, or `None` if some character
/// has no WinAnsi code. Bytes above 0x7E are written as octal escapes.
fn win_ansi_literal(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('(');
    for c in s.chars() {
        let byte = win_ansi(c)?;
        match byte {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(byte as char);
            }
            0x20..=0x7E => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out.push(')');
    Some(out)
}

/// `s` as a hex string of UCS-2 code units for the `UniGB-UCS2-H` CMap
fn ucs2_hex(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 4 + 2);
    out.push('<');
    for c in s.chars() {
        let unit = u16::try_from(u32::from(c)).unwrap_or(u16::from(b'?'));
        let _ = write!(out, "{:04X}", unit);
    }
    out.push('>');
    out
}

/// A text string for the Info dictionary: a literal for printable ASCII,
/// UTF-16BE with a byte order mark otherwise
fn info_string(s: &str) -> String {
    if s.is_ascii() {
        if let Some(literal) = win_ansi_literal(s) {
            return literal;
        }
    }
    let mut out = String::from("<FEFF");
    for unit in s.encode_utf16() {
        let _ = write!(out, "{:04X}", unit);
    }
    out.push('>');
    out
}

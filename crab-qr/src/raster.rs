//! Raster rendering and PNG encoding

use crate::error::{RenderError, RenderResult};
use crate::matrix::QrMatrix;
use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;

/// Light modules around the code, in modules (the QR standard asks for 4)
pub const QUIET_ZONE: usize = 4;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Square raster size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrSize(pub u32);

impl QrSize {
    /// On-screen preview
    pub const PREVIEW: QrSize = QrSize(140);
    /// Print-quality export
    pub const EXPORT: QrSize = QrSize(1000);

    pub fn px(self) -> u32 {
        self.0
    }
}

/// Render a matrix into a `size` x `size` grayscale image.
///
/// Every module is drawn with the same integer pixel size; leftover pixels
/// become extra margin so the code stays centred and sharp.
pub fn render(matrix: &QrMatrix, size: QrSize) -> RenderResult<GrayImage> {
    let total = (matrix.width() + 2 * QUIET_ZONE) as u32;
    let px = size.px();
    if px < total {
        return Err(RenderError::TooSmall {
            requested: px,
            minimum: total,
        });
    }

    let module = px / total;
    let offset = (px - module * total) / 2 + QUIET_ZONE as u32 * module;

    let mut img = GrayImage::from_pixel(px, px, LIGHT);
    for (mx, my) in matrix.dark_modules() {
        let x0 = offset + mx as u32 * module;
        let y0 = offset + my as u32 * module;
        for y in y0..y0 + module {
            for x in x0..x0 + module {
                img.put_pixel(x, y, DARK);
            }
        }
    }

    tracing::debug!(size = px, module_px = module, "QR rasterized");
    Ok(img)
}

/// Encode a grayscale raster as PNG bytes
pub fn encode_png(img: &GrayImage) -> RenderResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Render and encode in one step
pub fn render_png(matrix: &QrMatrix, size: QrSize) -> RenderResult<Vec<u8>> {
    encode_png(&render(matrix, size)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::ErrorCorrection;

    fn sample() -> QrMatrix {
        QrMatrix::encode("https://shop.example/menu/scan/abc123", ErrorCorrection::High).unwrap()
    }

    #[test]
    fn test_render_exact_size() {
        let m = sample();
        for size in [QrSize::PREVIEW, QrSize::EXPORT] {
            let img = render(&m, size).unwrap();
            assert_eq!(img.dimensions(), (size.px(), size.px()));
        }
    }

    #[test]
    fn test_quiet_zone_is_light() {
        let m = sample();
        let img = render(&m, QrSize::EXPORT).unwrap();
        let total = (m.width() + 2 * QUIET_ZONE) as u32;
        let module = 1000 / total;
        // The whole first quiet-zone band stays white
        for x in 0..1000 {
            for y in 0..module * QUIET_ZONE as u32 {
                assert_eq!(img.get_pixel(x, y), &LIGHT);
            }
        }
    }

    #[test]
    fn test_top_left_finder_is_dark() {
        let m = sample();
        let img = render(&m, QrSize::EXPORT).unwrap();
        let total = (m.width() + 2 * QUIET_ZONE) as u32;
        let module = 1000 / total;
        let offset = (1000 - module * total) / 2 + QUIET_ZONE as u32 * module;
        assert_eq!(img.get_pixel(offset, offset), &DARK);
        assert_eq!(img.get_pixel(offset - 1, offset - 1), &LIGHT);
    }

    #[test]
    fn test_too_small() {
        let m = sample();
        let err = render(&m, QrSize(10)).unwrap_err();
        match err {
            RenderError::TooSmall { requested, minimum } => {
                assert_eq!(requested, 10);
                assert_eq!(minimum as usize, m.width() + 2 * QUIET_ZONE);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_png_signature() {
        let png = render_png(&sample(), QrSize::PREVIEW).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}

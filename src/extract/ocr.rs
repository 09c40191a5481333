//! Image OCR - binarised image piped to the `tesseract` executable

use std::path::Path;

use crate::error::ExtractionError;

/// Pixels above this luminance become white, the rest black
#[cfg(feature = "ocr")]
const THRESHOLD: u8 = 128;

#[cfg(feature = "ocr")]
pub fn extract_image(path: &Path) -> Result<String, ExtractionError> {
    use std::io::{Cursor, Write};
    use std::process::{Command, Stdio};

    use tracing::{debug, info};

    let png = super::catch_panics(path, || {
        let image = image::open(path).map_err(|e| ExtractionError::failed(path, e))?;
        let binarised = binarise(image.to_luma8());

        let mut png = Vec::new();
        image::DynamicImage::ImageLuma8(binarised)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| ExtractionError::failed(path, e))?;
        Ok(png)
    })?;
    debug!("Prepared {} byte OCR image for {}", png.len(), path.display());

    let mut child = Command::new("tesseract")
        .args(["stdin", "stdout", "-l", "eng"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ExtractionError::failed(path, format!("cannot run tesseract: {}", e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(&png)?;
    }
    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(ExtractionError::failed(
            path,
            format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    info!(
        "OCR output for {}: '{}'",
        path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
        text.trim()
    );
    Ok(text)
}

/// Stretch contrast to the full range, then threshold
#[cfg(feature = "ocr")]
fn binarise(mut gray: image::GrayImage) -> image::GrayImage {
    let (lo, hi) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    let span = hi.saturating_sub(lo) as u32;
    for pixel in gray.pixels_mut() {
        let stretched = if span == 0 {
            pixel[0]
        } else {
            ((pixel[0] - lo) as u32 * 255 / span) as u8
        };
        pixel[0] = if stretched > THRESHOLD { 255 } else { 0 };
    }
    gray
}

#[cfg(not(feature = "ocr"))]
pub fn extract_image(path: &Path) -> Result<String, ExtractionError> {
    Err(ExtractionError::Unsupported(format!(
        "{} (rebuild with the `ocr` feature)",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "ocr"))]
    #[test]
    fn test_ocr_requires_feature() {
        assert!(matches!(
            extract_image(Path::new("scan.png")),
            Err(ExtractionError::Unsupported(_))
        ));
    }

    #[cfg(feature = "ocr")]
    #[test]
    fn test_binarise_stretches_then_thresholds() {
        // 100..=150 stretched to 0..=255; 120 maps to 102, 130 to 153
        let gray = image::GrayImage::from_raw(4, 1, vec![100, 120, 130, 150]).unwrap();
        let out = binarise(gray);
        assert_eq!(out.into_raw(), vec![0, 0, 255, 255]);
    }

    #[cfg(feature = "ocr")]
    #[test]
    fn test_undecodable_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, "not a png").unwrap();
        assert!(matches!(
            extract_image(&path),
            Err(ExtractionError::Failed { .. })
        ));
    }
}

//! OCR collaborator: turns receipt images into line-oriented text.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Anything that can read text from an image.
pub trait TextRecognizer {
    /// Recognize the text in `image`.
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError>;
}

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().copied().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().copied().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// One line of text per visual row.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl OcrResult {
    /// Build a result from unordered boxes.
    ///
    /// Boxes whose top edges fall within `line_tolerance` pixels of the
    /// row's first box are joined with spaces, so "Total" and "$50.00"
    /// printed on one receipt row stay on one text line.
    pub fn from_boxes(mut boxes: Vec<TextBox>, line_tolerance: f32) -> Self {
        boxes.sort_by(|a, b| {
            let (ax, ay, _, _) = a.rect();
            let (bx, by, _, _) = b.rect();
            ay.total_cmp(&by).then(ax.total_cmp(&bx))
        });

        let mut rows: Vec<(f32, Vec<&TextBox>)> = Vec::new();
        for text_box in &boxes {
            let (_, top, _, _) = text_box.rect();
            match rows.last_mut() {
                Some((row_top, members)) if (top - *row_top).abs() <= line_tolerance => {
                    members.push(text_box);
                }
                _ => rows.push((top, vec![text_box])),
            }
        }

        let mut ordered = Vec::with_capacity(boxes.len());
        let mut lines = Vec::with_capacity(rows.len());
        for (_, mut members) in rows {
            members.sort_by(|a, b| a.rect().0.total_cmp(&b.rect().0));
            lines.push(
                members
                    .iter()
                    .map(|b| b.text.trim())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" "),
            );
            ordered.extend(members.into_iter().cloned());
        }

        Self {
            boxes: ordered,
            text: lines.join("\n"),
            processing_time_ms: 0,
        }
    }
}

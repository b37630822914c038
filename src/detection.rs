use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::vehicle::VehicleClass;

/// One tracked vehicle in one frame. `track_id` comes from the external
/// tracker and is stable for the whole video.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub track_id: u32,
    pub class: VehicleClass,
    pub bbox: BBox<Ltrb>,
}

/// Plate region reported by the plate detector.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PlateCandidate {
    pub bbox: BBox<Ltrb>,
    pub score: f32,
}

/// Legible OCR output for one plate crop.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlateReading {
    pub text: String,
    pub score: f32,
}

impl Detection {
    #[inline]
    pub fn new(track_id: u32, class: VehicleClass, bbox: BBox<Ltrb>) -> Self {
        Self {
            track_id,
            class,
            bbox,
        }
    }
}

impl PlateCandidate {
    #[inline]
    pub fn new(bbox: BBox<Ltrb>, score: f32) -> Self {
        Self { bbox, score }
    }
}

impl PlateReading {
    /// `None` when the OCR text is blank or the score is not finite: such a
    /// reading is no reading.
    pub fn new(text: impl Into<String>, score: f32) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();

        if trimmed.is_empty() || !score.is_finite() {
            return None;
        }

        Some(Self {
            text: trimmed.to_string(),
            score,
        })
    }
}

use crate::bbox::{BBox, Ltrb};
use crate::vehicle::VehicleClass;

/// Plate text state of a row. `Unread` is distinct from a low-confidence
/// read: it means no text was observed on that frame at all.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Reading {
    #[default]
    Unread,
    Read {
        text: String,
        score: f32,
    },
}

impl Reading {
    #[inline]
    pub fn text(&self) -> Option<&str> {
        match self {
            Reading::Read { text, .. } => Some(text),
            Reading::Unread => None,
        }
    }

    #[inline]
    pub fn score(&self) -> Option<f32> {
        match self {
            Reading::Read { score, .. } => Some(*score),
            Reading::Unread => None,
        }
    }

    #[inline]
    pub fn is_read(&self) -> bool {
        matches!(self, Reading::Read { .. })
    }
}

/// One (frame, track) entry of a result table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub frame: u32,
    pub track_id: u32,
    pub class: VehicleClass,
    pub vehicle: BBox<Ltrb>,
    pub plate: Option<BBox<Ltrb>>,
    pub plate_score: Option<f32>,
    pub reading: Reading,
}

/// Row of the gap-free table produced by interpolation.
pub type DenseRow = Row;

impl Row {
    #[inline]
    pub fn key(&self) -> (u32, u32) {
        (self.frame, self.track_id)
    }
}

use crate::detection::{Detection, PlateCandidate};

/// Everything the external detectors reported for one video frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub index: u32,
    pub vehicles: Vec<Detection>,
    pub plates: Vec<PlateCandidate>,
}

impl Frame {
    #[inline]
    pub fn new(index: u32) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.plates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }
}

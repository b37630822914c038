use crate::detection::{PlateCandidate, PlateReading};

/// Seam to the OCR engine. `slot` is the candidate's position in the frame's
/// plate list. Returning `None` means the crop was not legible.
pub trait PlateReader {
    fn read(&mut self, frame: u32, slot: usize, plate: &PlateCandidate) -> Option<PlateReading>;
}

impl<F> PlateReader for F
where
    F: FnMut(u32, usize, &PlateCandidate) -> Option<PlateReading>,
{
    #[inline]
    fn read(&mut self, frame: u32, slot: usize, plate: &PlateCandidate) -> Option<PlateReading> {
        self(frame, slot, plate)
    }
}

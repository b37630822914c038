//! Binds plate detections to the vehicle track that contains them.
//!
//! A plate belongs to a vehicle when its box lies strictly inside the
//! vehicle's box. When several vehicle boxes contain the same plate (one car
//! seen through another's box, a truck hauling a car), the first containing
//! detection in the tracker's reported order wins.

use crate::detection::{Detection, PlateCandidate};
use crate::frame::Frame;

/// Vehicle whose box contains `plate`, if any.
pub fn associate<'a>(plate: &PlateCandidate, vehicles: &'a [Detection]) -> Option<&'a Detection> {
    vehicles.iter().find(|v| v.bbox.contains(&plate.bbox))
}

/// Pairs every plate of `frame` with its vehicle, preserving plate order.
/// Plates outside every vehicle are dropped.
pub fn associate_frame(frame: &Frame) -> impl Iterator<Item = (usize, &PlateCandidate, &Detection)> {
    frame
        .plates
        .iter()
        .enumerate()
        .filter_map(move |(slot, plate)| {
            associate(plate, &frame.vehicles).map(|vehicle| (slot, plate, vehicle))
        })
}

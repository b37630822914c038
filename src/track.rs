use tracing::warn;

use crate::row::Row;
use crate::vehicle::VehicleClass;

/// Direct observations of one vehicle, ascending by frame.
#[derive(Debug, Clone)]
pub struct Track<'a> {
    pub track_id: u32,
    nodes: Vec<&'a Row>,
}

impl<'a> Track<'a> {
    /// `nodes` must be non-empty and ascending by frame.
    pub(crate) fn new(track_id: u32, nodes: Vec<&'a Row>) -> Self {
        debug_assert!(!nodes.is_empty());
        debug_assert!(nodes.windows(2).all(|w| w[0].frame < w[1].frame));

        Self { track_id, nodes }
    }

    #[inline]
    pub fn nodes(&self) -> &[&'a Row] {
        &self.nodes
    }

    #[inline]
    pub fn first_frame(&self) -> u32 {
        self.nodes[0].frame
    }

    #[inline]
    pub fn last_frame(&self) -> u32 {
        self.nodes[self.nodes.len() - 1].frame
    }

    /// Number of frames in `[first_frame, last_frame]`.
    #[inline]
    pub fn lifespan(&self) -> usize {
        (self.last_frame() - self.first_frame()) as usize + 1
    }

    /// The track's vehicle class. Trackers occasionally flip the class of a
    /// vehicle between frames; the most frequent class wins, ties go to the
    /// one seen first.
    pub fn class(&self) -> VehicleClass {
        let mut counts: Vec<(VehicleClass, usize)> = Vec::with_capacity(1);

        for node in &self.nodes {
            match counts.iter_mut().find(|(c, _)| *c == node.class) {
                Some((_, n)) => *n += 1,
                None => counts.push((node.class, 1)),
            }
        }

        if counts.len() > 1 {
            warn!(
                "track {}: observed classes disagree {:?}",
                self.track_id, counts
            );
        }

        // max_by_key keeps the last maximum, walk backwards to prefer first seen
        counts
            .iter()
            .rev()
            .max_by_key(|(_, n)| *n)
            .map(|(c, _)| *c)
            .unwrap_or(self.nodes[0].class)
    }
}

//! Gap filling for sparse per-track results.
//!
//! Every track is expanded to one row per frame in `[first_frame, last_frame]`.
//! Vehicle and plate boxes are interpolated piecewise-linearly between the
//! track's direct observations (interpolation nodes), each coordinate on its
//! own. Plate text is never interpolated: rows that were not observed carry
//! `Reading::Unread` and no plate score.

use std::thread;
use tracing::{debug, info};

use crate::bbox::{BBox, Ltrb};
use crate::math::{bracket, segment_fraction};
use crate::row::{DenseRow, Reading, Row};
use crate::store::ResultTable;
use crate::track::Track;

#[derive(Debug, Clone)]
pub struct Interpolator {
    threads: usize,
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpolator {
    pub fn new() -> Self {
        Self { threads: 1 }
    }

    /// Spreads tracks over up to `threads` scoped workers. Tracks share no
    /// state, so the result does not depend on the worker count.
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }

    /// Dense table for every track of `table`, ordered by frame then track id.
    pub fn run(&self, table: &ResultTable) -> Vec<DenseRow> {
        let tracks: Vec<Track<'_>> = table.tracks().collect();

        if tracks.is_empty() {
            debug!("no tracks to interpolate");
            return Vec::new();
        }

        let mut rows: Vec<DenseRow> = if self.threads == 1 || tracks.len() == 1 {
            tracks.iter().flat_map(interpolate_track).collect()
        } else {
            let chunk = (tracks.len() + self.threads - 1) / self.threads;

            thread::scope(|s| {
                let workers: Vec<_> = tracks
                    .chunks(chunk)
                    .map(|part| {
                        s.spawn(move || part.iter().flat_map(interpolate_track).collect::<Vec<_>>())
                    })
                    .collect();

                workers
                    .into_iter()
                    .flat_map(|w| w.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                    .collect::<Vec<_>>()
            })
        };

        rows.sort_by_key(Row::key);

        info!(
            "interpolated {} tracks: {} observed rows -> {} dense rows",
            tracks.len(),
            table.len(),
            rows.len()
        );

        rows
    }
}

/// One row per frame of the track's lifespan.
pub fn interpolate_track(track: &Track<'_>) -> Vec<DenseRow> {
    let nodes = track.nodes();
    let class = track.class();

    let frames: Vec<u32> = nodes.iter().map(|n| n.frame).collect();
    let plates: Vec<(u32, BBox<Ltrb>)> = nodes
        .iter()
        .filter_map(|n| n.plate.map(|p| (n.frame, p)))
        .collect();
    let plate_frames: Vec<u32> = plates.iter().map(|(f, _)| *f).collect();

    let mut out = Vec::with_capacity(track.lifespan());

    for frame in track.first_frame()..=track.last_frame() {
        let (l, r) = match bracket(&frames, frame) {
            Some(pair) => pair,
            None => break,
        };

        if l == r && frames[l] == frame {
            out.push(Row {
                class,
                ..nodes[l].clone()
            });
            continue;
        }

        let vehicle = blend(frames[l], &nodes[l].vehicle, frames[r], &nodes[r].vehicle, frame);
        let plate = bracket(&plate_frames, frame).map(|(pl, pr)| {
            blend(plates[pl].0, &plates[pl].1, plates[pr].0, &plates[pr].1, frame)
        });

        out.push(Row {
            frame,
            track_id: track.track_id,
            class,
            vehicle,
            plate,
            plate_score: None,
            reading: Reading::Unread,
        });
    }

    debug!(
        "track {}: {} nodes over frames {}..={}",
        track.track_id,
        nodes.len(),
        track.first_frame(),
        track.last_frame()
    );

    out
}

#[inline]
fn blend(f0: u32, b0: &BBox<Ltrb>, f1: u32, b1: &BBox<Ltrb>, frame: u32) -> BBox<Ltrb> {
    if f0 == f1 {
        return *b0;
    }

    let t = segment_fraction(f0 as f64, f1 as f64, frame as f64);

    b0.lerp(b1, t as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::VehicleClass;

    fn observed(frame: u32, track_id: u32, x1: f32, text: &str, score: f32) -> Row {
        Row {
            frame,
            track_id,
            class: VehicleClass::Car,
            vehicle: BBox::ltrb(x1, 10.0, x1 + 40.0, 30.0),
            plate: Some(BBox::ltrb(x1 + 5.0, 15.0, x1 + 15.0, 20.0)),
            plate_score: Some(0.8),
            reading: Reading::Read {
                text: text.into(),
                score,
            },
        }
    }

    fn table(rows: Vec<Row>) -> ResultTable {
        ResultTable::from_rows(rows).unwrap()
    }

    #[test]
    fn test_linear_midpoint() {
        let t = table(vec![
            observed(10, 1, 100.0, "AB12", 0.5),
            observed(20, 1, 200.0, "AB12", 0.6),
        ]);
        let rows = Interpolator::new().run(&t);

        assert_eq!(rows.len(), 11);
        let mid = &rows[5];
        assert_eq!(mid.frame, 15);
        assert_eq!(mid.vehicle.left(), 150.0);
        assert_eq!(mid.plate.unwrap().left(), 155.0);
        assert_eq!(mid.reading, Reading::Unread);
        assert_eq!(mid.plate_score, None);
    }

    #[test]
    fn test_observed_rows_kept_exactly() {
        let input = vec![
            observed(0, 4, 3.3, "X1", 0.1),
            observed(3, 4, 17.9, "X2", 0.7),
            observed(7, 4, 1.1, "X3", 0.4),
        ];
        let rows = Interpolator::new().run(&table(input.clone()));

        assert_eq!(rows.len(), 8);
        for row in &input {
            assert_eq!(&rows[row.frame as usize], row);
        }
        for row in rows.iter().filter(|r| ![0, 3, 7].contains(&r.frame)) {
            assert!(!row.reading.is_read());
        }
    }

    #[test]
    fn test_no_gaps_no_duplicates() {
        let t = table(vec![
            observed(2, 1, 0.0, "A", 0.5),
            observed(9, 1, 70.0, "A", 0.5),
            observed(5, 2, 0.0, "B", 0.5),
            observed(6, 2, 10.0, "B", 0.5),
        ]);
        let rows = Interpolator::new().run(&t);

        let one: Vec<u32> = rows.iter().filter(|r| r.track_id == 1).map(|r| r.frame).collect();
        let two: Vec<u32> = rows.iter().filter(|r| r.track_id == 2).map(|r| r.frame).collect();

        assert_eq!(one, (2..=9).collect::<Vec<_>>());
        assert_eq!(two, vec![5, 6]);
        assert!(rows.windows(2).all(|w| w[0].key() < w[1].key()));
    }

    #[test]
    fn test_single_observation() {
        let row = observed(42, 3, 5.0, "ONE", 0.9);
        let rows = Interpolator::new().run(&table(vec![row.clone()]));

        assert_eq!(rows, vec![row]);
    }

    #[test]
    fn test_empty_table() {
        let rows = Interpolator::new().run(&ResultTable::default());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let t = table(vec![
            observed(0, 1, 0.0, "A", 0.5),
            observed(6, 1, 30.0, "A", 0.7),
            observed(1, 2, 100.0, "B", 0.5),
            observed(4, 2, 40.0, "B", 0.9),
        ]);
        let dense = Interpolator::new().run(&t);
        let again = Interpolator::new().run(&table(dense.clone()));

        assert_eq!(again, dense);
    }

    #[test]
    fn test_thread_count_does_not_change_output() {
        let mut input = Vec::new();
        for id in 0..9u32 {
            input.push(observed(id, id, id as f32, "P", 0.5));
            input.push(observed(id + 5, id, id as f32 + 50.0, "P", 0.6));
        }
        let t = table(input);

        let single = Interpolator::new().run(&t);
        let multi = Interpolator::with_threads(4).run(&t);

        assert_eq!(single.len(), 9 * 6);
        assert_eq!(single, multi);
    }

    #[test]
    fn test_missing_plate_box_interpolates_from_plate_nodes() {
        let mut first = observed(0, 1, 0.0, "A", 0.5);
        first.plate = None;
        let t = table(vec![
            first,
            observed(2, 1, 20.0, "A", 0.5),
            observed(4, 1, 40.0, "A", 0.5),
        ]);
        let rows = Interpolator::new().run(&t);

        assert_eq!(rows[0].plate, None);
        assert_eq!(rows[1].plate, Some(BBox::ltrb(25.0, 15.0, 35.0, 20.0)));
        assert_eq!(rows[3].plate, Some(BBox::ltrb(35.0, 15.0, 45.0, 20.0)));
    }
}

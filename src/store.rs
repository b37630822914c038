//! Sparse accumulation of per-frame plate readings.
//!
//! Frame records are appended once, in ascending frame order, and never
//! touched again. A per-track index of `(record, row)` positions is kept next
//! to the log so tracks can be walked without scanning every frame.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::associator::associate_frame;
use crate::detection::PlateReading;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::reader::PlateReader;
use crate::row::{Reading, Row};
use crate::track::Track;

/// Rows read on one frame, at most one per track.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    index: u32,
    rows: Vec<Row>,
}

impl FrameRecord {
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    pub fn get(&self, track_id: u32) -> Option<&Row> {
        self.rows.iter().find(|r| r.track_id == track_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ResultStore {
    records: Vec<FrameRecord>,
    index: BTreeMap<u32, Vec<(usize, usize)>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates, reads and stores one frame. A frame without any legible
    /// plate still gets an (empty) record.
    ///
    /// When two plates land on the same track in the same frame, the later
    /// one in the frame's plate list replaces the earlier one.
    pub fn record_frame<R: PlateReader + ?Sized>(
        &mut self,
        frame: &Frame,
        reader: &mut R,
    ) -> Result<&FrameRecord> {
        self.check_order(frame.index)?;

        let mut rows: Vec<Row> = Vec::new();

        for (slot, plate, vehicle) in associate_frame(frame) {
            // readers may build `PlateReading` by hand; normalize through `new`
            let reading = match reader
                .read(frame.index, slot, plate)
                .and_then(|r| PlateReading::new(r.text, r.score))
            {
                Some(r) => r,
                None => continue,
            };

            let row = Row {
                frame: frame.index,
                track_id: vehicle.track_id,
                class: vehicle.class,
                vehicle: vehicle.bbox,
                plate: Some(plate.bbox),
                plate_score: Some(plate.score),
                reading: Reading::Read {
                    text: reading.text,
                    score: reading.score,
                },
            };

            if let Some(existing) = rows.iter_mut().find(|r| r.track_id == row.track_id) {
                debug!(
                    "frame {}: plate #{} replaces earlier plate on track {}",
                    frame.index, slot, row.track_id
                );
                *existing = row;
            } else {
                rows.push(row);
            }
        }

        let dropped = frame.plates.len() - rows.len();
        if dropped > 0 {
            debug!(
                "frame {}: {} of {} plates unassociated, unread or superseded",
                frame.index,
                dropped,
                frame.plates.len()
            );
        }

        self.append(FrameRecord {
            index: frame.index,
            rows,
        })
    }

    /// Appends an already built record. Every row must carry `index` as its frame.
    pub fn push(&mut self, index: u32, rows: Vec<Row>) -> Result<&FrameRecord> {
        self.check_order(index)?;

        let mut seen = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.frame != index {
                return Err(Error::FrameMismatch {
                    record: index,
                    row: row.frame,
                });
            }

            if seen.contains(&row.track_id) {
                return Err(Error::DuplicateEntry {
                    frame: index,
                    track_id: row.track_id,
                });
            }
            seen.push(row.track_id);
        }

        self.append(FrameRecord { index, rows })
    }

    fn check_order(&self, next: u32) -> Result<()> {
        match self.records.last() {
            Some(last) if last.index >= next => Err(Error::FrameOrder {
                previous: last.index,
                next,
            }),
            _ => Ok(()),
        }
    }

    fn append(&mut self, record: FrameRecord) -> Result<&FrameRecord> {
        let pos = self.records.len();

        for (i, row) in record.rows.iter().enumerate() {
            self.index.entry(row.track_id).or_default().push((pos, i));
        }

        self.records.push(record);

        Ok(&self.records[pos])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Seals the log once the video is exhausted.
    pub fn finish(self) -> ResultTable {
        info!(
            "result table finalized: {} frames, {} tracks",
            self.records.len(),
            self.index.len()
        );

        ResultTable {
            records: self.records,
            index: self.index,
        }
    }
}

/// Finalized, read-only result log.
#[derive(Debug, Default)]
pub struct ResultTable {
    records: Vec<FrameRecord>,
    index: BTreeMap<u32, Vec<(usize, usize)>>,
}

impl ResultTable {
    /// Rebuilds a table from flat rows, e.g. a persisted table. Rows may come
    /// in any order but each (frame, track) pair must be unique.
    pub fn from_rows<I: IntoIterator<Item = Row>>(rows: I) -> Result<Self> {
        let mut frames: BTreeMap<u32, Vec<Row>> = BTreeMap::new();

        for row in rows {
            frames.entry(row.frame).or_default().push(row);
        }

        let mut store = ResultStore::new();
        for (index, mut rows) in frames {
            rows.sort_by_key(|r| r.track_id);
            store.push(index, rows)?;
        }

        Ok(store.finish())
    }

    #[inline]
    pub fn records(&self) -> &[FrameRecord] {
        &self.records
    }

    #[inline]
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.records.iter().flat_map(|r| r.rows.iter())
    }

    #[inline]
    pub fn track_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.index.keys().copied()
    }

    pub fn track(&self, track_id: u32) -> Option<Track<'_>> {
        self.index
            .get(&track_id)
            .map(|positions| self.collect_track(track_id, positions))
    }

    /// Tracks in ascending id order.
    pub fn tracks(&self) -> impl Iterator<Item = Track<'_>> {
        self.index
            .iter()
            .map(move |(&id, positions)| self.collect_track(id, positions))
    }

    fn collect_track<'a>(&'a self, id: u32, positions: &[(usize, usize)]) -> Track<'a> {
        let nodes = positions
            .iter()
            .map(|&(rec, row)| &self.records[rec].rows[row])
            .collect();

        Track::new(id, nodes)
    }

    #[inline]
    pub fn track_count(&self) -> usize {
        self.index.len()
    }

    /// Number of rows across all frames.
    pub fn len(&self) -> usize {
        self.records.iter().map(FrameRecord::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::codec;
    use crate::detection::{Detection, PlateCandidate};
    use crate::vehicle::VehicleClass;

    fn frame(index: u32) -> Frame {
        let mut frame = Frame::new(index);
        frame.vehicles = vec![
            Detection::new(1, VehicleClass::Car, BBox::ltrb(0.0, 0.0, 40.0, 40.0)),
            Detection::new(2, VehicleClass::Bus, BBox::ltrb(50.0, 0.0, 150.0, 60.0)),
        ];
        frame.plates = vec![
            PlateCandidate::new(BBox::ltrb(10.0, 20.0, 20.0, 25.0), 0.7),
            PlateCandidate::new(BBox::ltrb(60.0, 40.0, 80.0, 45.0), 0.6),
            PlateCandidate::new(BBox::ltrb(200.0, 40.0, 220.0, 45.0), 0.9),
        ];
        frame
    }

    fn read_all(_frame: u32, slot: usize, _plate: &PlateCandidate) -> Option<PlateReading> {
        PlateReading::new(format!("PLATE{}", slot), 0.5)
    }

    #[test]
    fn test_record_frame_keeps_read_and_associated() {
        let mut store = ResultStore::new();
        let record = store.record_frame(&frame(0), &mut read_all).unwrap();

        assert_eq!(record.len(), 2);
        assert_eq!(record.get(1).unwrap().reading.text(), Some("PLATE0"));
        assert_eq!(record.get(2).unwrap().reading.text(), Some("PLATE1"));
        assert_eq!(record.get(2).unwrap().class, VehicleClass::Bus);
        assert_eq!(record.get(2).unwrap().plate_score, Some(0.6));
    }

    #[test]
    fn test_unreadable_plate_not_recorded() {
        let mut store = ResultStore::new();
        let mut reader = |_: u32, slot: usize, _: &PlateCandidate| {
            if slot == 0 {
                None
            } else {
                Some(PlateReading {
                    text: " ".into(),
                    score: 0.4,
                })
            }
        };

        let record = store.record_frame(&frame(0), &mut reader).unwrap();
        assert!(record.is_empty());

        let table = store.finish();
        assert_eq!(table.records().len(), 1);
        assert_eq!(table.track_count(), 0);
    }

    #[test]
    fn test_padded_text_survives_csv() {
        let mut store = ResultStore::new();
        let mut reader = |_: u32, _: usize, _: &PlateCandidate| {
            Some(PlateReading {
                text: " AB 12 ".into(),
                score: 0.9,
            })
        };

        let record = store.record_frame(&frame(0), &mut reader).unwrap();
        assert_eq!(record.get(1).unwrap().reading.text(), Some("AB 12"));

        let rows: Vec<Row> = store.finish().rows().cloned().collect();
        let mut buf = Vec::new();
        codec::write_rows(&mut buf, &rows).unwrap();

        assert_eq!(codec::read_rows(buf.as_slice()).unwrap(), rows);
    }

    #[test]
    fn test_push_rejects_foreign_row() {
        let mut store = ResultStore::new();
        store.record_frame(&frame(0), &mut read_all).unwrap();
        let rows: Vec<Row> = store.records[0].rows().to_vec();

        let mut other = ResultStore::new();
        assert!(matches!(
            other.push(4, rows),
            Err(Error::FrameMismatch { record: 4, row: 0 })
        ));
        assert!(other.is_empty());
        assert!(other.index.is_empty());
    }

    #[test]
    fn test_last_plate_wins_within_track() {
        let mut f = frame(4);
        f.plates.push(PlateCandidate::new(BBox::ltrb(5.0, 5.0, 15.0, 10.0), 0.3));

        let mut store = ResultStore::new();
        let record = store.record_frame(&f, &mut read_all).unwrap();

        assert_eq!(record.len(), 2);
        let row = record.get(1).unwrap();
        assert_eq!(row.reading.text(), Some("PLATE3"));
        assert_eq!(row.plate, Some(BBox::ltrb(5.0, 5.0, 15.0, 10.0)));
    }

    #[test]
    fn test_frames_must_ascend() {
        let mut store = ResultStore::new();
        store.record_frame(&frame(3), &mut read_all).unwrap();

        assert!(matches!(
            store.record_frame(&frame(3), &mut read_all),
            Err(Error::FrameOrder { previous: 3, next: 3 })
        ));
        assert!(store.record_frame(&frame(2), &mut read_all).is_err());
        assert!(store.record_frame(&frame(4), &mut read_all).is_ok());
    }

    #[test]
    fn test_track_index() {
        let mut store = ResultStore::new();
        for i in [0, 1, 5] {
            store.record_frame(&frame(i), &mut read_all).unwrap();
        }
        let table = store.finish();

        assert_eq!(table.track_ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(table.len(), 6);

        let track = table.track(2).unwrap();
        assert_eq!(track.first_frame(), 0);
        assert_eq!(track.last_frame(), 5);
        assert_eq!(track.nodes().len(), 3);
        assert!(table.track(9).is_none());
    }

    #[test]
    fn test_from_rows_rejects_duplicates() {
        let mut store = ResultStore::new();
        store.record_frame(&frame(0), &mut read_all).unwrap();
        let table = store.finish();

        let mut rows: Vec<Row> = table.rows().cloned().collect();
        rows.reverse();
        let rebuilt = ResultTable::from_rows(rows.clone()).unwrap();
        assert_eq!(rebuilt.records(), table.records());

        rows.push(rows[0].clone());
        assert!(matches!(
            ResultTable::from_rows(rows),
            Err(Error::DuplicateEntry { frame: 0, .. })
        ));
    }
}

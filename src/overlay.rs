//! Per-frame overlay planning for the rendering side.
//!
//! The actual pixels are drawn by whoever implements [`Canvas`]; this module
//! only decides what goes on each frame.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::bbox::{BBox, Ltwh};
use crate::row::DenseRow;
use crate::selector::Label;
use crate::vehicle::Color;

pub const VEHICLE_THICKNESS: u32 = 2;
pub const PLATE_THICKNESS: u32 = 1;

pub trait Canvas {
    /// `bbox` is the rectangle's top-left corner and size.
    fn rectangle(&mut self, bbox: &BBox<Ltwh>, color: Color, thickness: u32);
    /// `anchor` is the text's bottom-left corner.
    fn text(&mut self, anchor: (f32, f32), text: &str, color: Color);
}

pub struct Overlay<'a> {
    rows: Vec<&'a DenseRow>,
    frames: BTreeMap<u32, Range<usize>>,
    labels: &'a BTreeMap<u32, Label>,
}

impl<'a> Overlay<'a> {
    pub fn new<I>(rows: I, labels: &'a BTreeMap<u32, Label>) -> Self
    where
        I: IntoIterator<Item = &'a DenseRow>,
    {
        let mut rows: Vec<&'a DenseRow> = rows.into_iter().collect();
        rows.sort_by_key(|r| r.key());

        let mut frames: BTreeMap<u32, Range<usize>> = BTreeMap::new();
        for (i, row) in rows.iter().enumerate() {
            frames.entry(row.frame).or_insert(i..i).end = i + 1;
        }

        Self {
            rows,
            frames,
            labels,
        }
    }

    /// Rows to draw on `frame`, ascending by track id.
    pub fn rows_for(&self, frame: u32) -> &[&'a DenseRow] {
        match self.frames.get(&frame) {
            Some(range) => &self.rows[range.clone()],
            None => &[],
        }
    }

    /// Draws one frame: vehicle box in its class color, plate box in red,
    /// and the track's label at the vehicle's top-left corner.
    pub fn draw<C: Canvas + ?Sized>(&self, frame: u32, canvas: &mut C) -> usize {
        let rows = self.rows_for(frame);

        for row in rows {
            let color = row.class.color();
            canvas.rectangle(&row.vehicle.as_ltwh(), color, VEHICLE_THICKNESS);

            if let Some(plate) = &row.plate {
                canvas.rectangle(&plate.as_ltwh(), Color::RED, PLATE_THICKNESS);
            }

            if let Some(label) = self.labels.get(&row.track_id) {
                canvas.text((row.vehicle.left(), row.vehicle.top()), &label.caption(), color);
            }
        }

        rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Reading;
    use crate::selector::select_labels;
    use crate::vehicle::VehicleClass;

    #[derive(Default)]
    struct Recorder {
        rects: Vec<([f32; 4], Color, u32)>,
        texts: Vec<((f32, f32), String, Color)>,
    }

    impl Canvas for Recorder {
        fn rectangle(&mut self, bbox: &BBox<Ltwh>, color: Color, thickness: u32) {
            let rect = [bbox.left(), bbox.top(), bbox.width(), bbox.height()];
            self.rects.push((rect, color, thickness));
        }

        fn text(&mut self, anchor: (f32, f32), text: &str, color: Color) {
            self.texts.push((anchor, text.to_string(), color));
        }
    }

    fn row(frame: u32, track_id: u32, class: VehicleClass, reading: Reading) -> DenseRow {
        DenseRow {
            frame,
            track_id,
            class,
            vehicle: BBox::ltrb(10.0, 20.0, 50.0, 40.0),
            plate: if reading.is_read() {
                Some(BBox::ltrb(15.0, 30.0, 25.0, 35.0))
            } else {
                None
            },
            plate_score: None,
            reading,
        }
    }

    #[test]
    fn test_draw_frame() {
        let rows = vec![
            row(0, 1, VehicleClass::Bus, Reading::Read { text: "BUS1".into(), score: 0.7 }),
            row(1, 1, VehicleClass::Bus, Reading::Unread),
            row(1, 2, VehicleClass::Car, Reading::Unread),
        ];
        let labels = select_labels(&rows);
        let overlay = Overlay::new(&rows, &labels);

        let mut canvas = Recorder::default();
        assert_eq!(overlay.draw(1, &mut canvas), 2);

        assert_eq!(canvas.rects.len(), 2);
        assert_eq!(canvas.rects[0].0, [10.0, 20.0, 40.0, 20.0]);
        assert_eq!(canvas.rects[0].1, VehicleClass::Bus.color());
        assert_eq!(canvas.rects[0].2, VEHICLE_THICKNESS);
        assert_eq!(canvas.rects[1].1, VehicleClass::Car.color());

        // the label comes from the track, not from the (unread) row
        assert_eq!(canvas.texts.len(), 1);
        assert_eq!(canvas.texts[0].0, (10.0, 20.0));
        assert_eq!(canvas.texts[0].1, "bus: BUS1");
    }

    #[test]
    fn test_plate_box_in_red() {
        let rows = vec![row(0, 1, VehicleClass::Car, Reading::Read { text: "X".into(), score: 0.7 })];
        let labels = select_labels(&rows);
        let overlay = Overlay::new(&rows, &labels);

        let mut canvas = Recorder::default();
        overlay.draw(0, &mut canvas);

        assert_eq!(canvas.rects[1], ([15.0, 30.0, 10.0, 5.0], Color::RED, PLATE_THICKNESS));
    }

    #[test]
    fn test_frame_without_rows() {
        let rows: Vec<DenseRow> = Vec::new();
        let labels = BTreeMap::new();
        let overlay = Overlay::new(&rows, &labels);

        let mut canvas = Recorder::default();
        assert_eq!(overlay.draw(3, &mut canvas), 0);
        assert!(overlay.rows_for(3).is_empty());
    }
}

//! Detector dump input: one JSON object per line, one line per frame.
//!
//! ```text
//! {"frame": 0,
//!  "vehicles": [{"track_id": 7, "class_id": 2, "bbox": [10, 10, 50, 30]}],
//!  "plates": [{"bbox": [15, 15, 25, 20], "score": 0.8, "text": "ABC123", "text_score": 0.9}]}
//! ```
//!
//! `class_id` is the detector's COCO class; anything that is not a vehicle is
//! dropped. `text`/`text_score` hold the OCR output for the plate crop and
//! are absent when the crop was not legible.

use serde_derive::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::debug;

use crate::bbox::{BBox, Ltrb};
use crate::detection::{Detection, PlateCandidate, PlateReading};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::reader::PlateReader;
use crate::vehicle::VehicleClass;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VehicleDump {
    pub track_id: u32,
    pub class_id: u32,
    pub bbox: BBox<Ltrb>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlateDump {
    pub bbox: BBox<Ltrb>,
    pub score: f32,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub text_score: Option<f32>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FrameDump {
    pub frame: u32,
    #[serde(default)]
    pub vehicles: Vec<VehicleDump>,
    #[serde(default)]
    pub plates: Vec<PlateDump>,
}

impl FrameDump {
    /// Parses one dump line. OCR text and its score come in pairs.
    pub fn parse(line: &str) -> Result<Self> {
        let dump: Self = serde_json::from_str(line)?;

        for (slot, plate) in dump.plates.iter().enumerate() {
            let column = match (&plate.text, plate.text_score) {
                (Some(_), None) => "text_score",
                (None, Some(_)) => "text",
                _ => continue,
            };

            return Err(Error::ParseError {
                line: 1,
                column,
                message: format!(
                    "frame {}: plate #{} has only one of text and text_score",
                    dump.frame, slot
                ),
            });
        }

        Ok(dump)
    }

    pub fn to_frame(&self) -> Frame {
        let vehicles = self
            .vehicles
            .iter()
            .filter_map(|v| {
                VehicleClass::from_coco_id(v.class_id).map(|c| Detection::new(v.track_id, c, v.bbox))
            })
            .collect::<Vec<_>>();

        if vehicles.len() < self.vehicles.len() {
            debug!(
                "frame {}: {} non-vehicle detections skipped",
                self.frame,
                self.vehicles.len() - vehicles.len()
            );
        }

        Frame {
            index: self.frame,
            vehicles,
            plates: self
                .plates
                .iter()
                .map(|p| PlateCandidate::new(p.bbox, p.score))
                .collect(),
        }
    }
}

/// Replays the OCR results stored in the dump.
impl PlateReader for FrameDump {
    fn read(&mut self, frame: u32, slot: usize, _plate: &PlateCandidate) -> Option<PlateReading> {
        if frame != self.frame {
            return None;
        }

        let plate = self.plates.get(slot)?;

        PlateReading::new(plate.text.clone()?, plate.text_score?)
    }
}

/// Iterator over the frames of a dump, skipping blank lines.
pub fn frames<R: BufRead>(input: R) -> impl Iterator<Item = Result<FrameDump>> {
    input
        .lines()
        .enumerate()
        .filter_map(|(i, line)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(FrameDump::parse(&line).map_err(|e| match e {
                Error::JsonError(e) => Error::ParseError {
                    line: i as u64 + 1,
                    column: "frame",
                    message: e.to_string(),
                },
                Error::ParseError {
                    column, message, ..
                } => Error::ParseError {
                    line: i as u64 + 1,
                    column,
                    message,
                },
                other => other,
            })),
            Err(e) => Some(Err(e.into())),
        })
}

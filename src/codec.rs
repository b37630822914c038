//! CSV hand-off format shared by the pipeline stages.
//!
//! ```text
//! frame_nmr,car_id,car_class,car_bbox,license_plate_bbox,license_plate_bbox_score,license_number,license_number_score
//! 0,7,car,[10 10 50 30],[15 15 25 20],0.8,ABC123,0.9
//! 2,7,car,[20 10 60 30],[25 15 35 20],,,
//! ```
//!
//! Boxes are written as `[x1 y1 x2 y2]`. An empty plate text column means
//! "no reading", never an empty string.

use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, info};

use crate::bbox::{BBox, Ltrb};
use crate::error::{Error, Result};
use crate::row::{Reading, Row};
use crate::store::ResultTable;
use crate::vehicle::VehicleClass;

pub const COLUMNS: [&str; 8] = [
    "frame_nmr",
    "car_id",
    "car_class",
    "car_bbox",
    "license_plate_bbox",
    "license_plate_bbox_score",
    "license_number",
    "license_number_score",
];

#[derive(Serialize, Deserialize, Debug)]
struct CsvRow {
    frame_nmr: u32,
    car_id: u32,
    car_class: String,
    car_bbox: String,
    license_plate_bbox: Option<String>,
    license_plate_bbox_score: Option<f32>,
    license_number: Option<String>,
    license_number_score: Option<f32>,
}

impl From<&Row> for CsvRow {
    fn from(row: &Row) -> Self {
        Self {
            frame_nmr: row.frame,
            car_id: row.track_id,
            car_class: row.class.name().to_string(),
            car_bbox: row.vehicle.to_string(),
            license_plate_bbox: row.plate.map(|p| p.to_string()),
            license_plate_bbox_score: row.plate_score,
            license_number: row.reading.text().map(str::to_string),
            license_number_score: row.reading.score(),
        }
    }
}

impl CsvRow {
    fn into_row(self, line: u64) -> Result<Row> {
        let parse_err = |column: &'static str, message: String| Error::ParseError {
            line,
            column,
            message,
        };

        let class = self
            .car_class
            .parse::<VehicleClass>()
            .map_err(|e| parse_err("car_class", e))?;

        let vehicle = parse_bbox(&self.car_bbox).map_err(|e| parse_err("car_bbox", e))?;

        let plate = match self.license_plate_bbox.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(parse_bbox(s).map_err(|e| parse_err("license_plate_bbox", e))?),
        };

        for (column, score) in [
            ("license_plate_bbox_score", self.license_plate_bbox_score),
            ("license_number_score", self.license_number_score),
        ] {
            if score.map_or(false, |v| !v.is_finite()) {
                return Err(parse_err(column, "score is not a finite number".into()));
            }
        }

        let text = self
            .license_number
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let reading = match (text, self.license_number_score) {
            (Some(text), Some(score)) => Reading::Read { text, score },
            (None, None) => Reading::Unread,
            (Some(_), None) => {
                return Err(parse_err(
                    "license_number_score",
                    "plate text without a text score".into(),
                ))
            }
            (None, Some(_)) => {
                return Err(parse_err(
                    "license_number",
                    "text score without plate text".into(),
                ))
            }
        };

        Ok(Row {
            frame: self.frame_nmr,
            track_id: self.car_id,
            class,
            vehicle,
            plate,
            plate_score: self.license_plate_bbox_score,
            reading,
        })
    }
}

#[inline]
fn parse_bbox(s: &str) -> std::result::Result<BBox<Ltrb>, String> {
    s.parse::<BBox<Ltrb>>().map_err(|e| e.to_string())
}

/// Writes the header followed by one line per row.
pub fn write_rows<'a, W, I>(writer: W, rows: I) -> Result<usize>
where
    W: io::Write,
    I: IntoIterator<Item = &'a Row>,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(COLUMNS)?;

    let mut count = 0;
    for row in rows {
        wtr.serialize(CsvRow::from(row))?;
        count += 1;
    }

    wtr.flush()?;

    Ok(count)
}

/// Reads every row, stopping at the first malformed one.
pub fn read_rows<R: io::Read>(reader: R) -> Result<Vec<Row>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if let Some(missing) = COLUMNS
        .iter()
        .copied()
        .find(|c| !headers.iter().any(|h| h == *c))
    {
        return Err(Error::ParseError {
            line: 1,
            column: missing,
            message: "required column missing from header".into(),
        });
    }

    let mut record = csv::StringRecord::new();
    let mut rows = Vec::new();

    while rdr.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let raw: CsvRow = record.deserialize(Some(&headers))?;

        rows.push(raw.into_row(line)?);
    }

    Ok(rows)
}

pub fn write_path<'a, P, I>(path: P, rows: I) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a Row>,
{
    let path = path.as_ref();
    let file = File::create(path)?;
    let count = write_rows(io::BufWriter::new(file), rows)?;

    info!("wrote {} rows to {}", count, path.display());

    Ok(count)
}

pub fn read_path<P: AsRef<Path>>(path: P) -> Result<Vec<Row>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let rows = read_rows(io::BufReader::new(file))?;

    debug!("read {} rows from {}", rows.len(), path.display());

    Ok(rows)
}

/// Loads a persisted table, sparse or dense.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<ResultTable> {
    ResultTable::from_rows(read_path(path)?)
}

pub mod associator;
pub mod bbox;
pub mod codec;
pub mod config;
pub mod detection;
pub mod dump;
pub mod error;
pub mod frame;
pub mod interpolate;
pub mod math;
pub mod overlay;
pub mod pipeline;
pub mod reader;
pub mod row;
pub mod selector;
pub mod store;
pub mod vehicle;

mod track;

pub use detection::{Detection, PlateCandidate, PlateReading};
pub use error::{Error, Result};
pub use frame::Frame;
pub use interpolate::Interpolator;
pub use reader::PlateReader;
pub use row::{DenseRow, Reading, Row};
pub use selector::{select_labels, Label};
pub use store::{FrameRecord, ResultStore, ResultTable};
pub use track::Track;
pub use vehicle::VehicleClass;

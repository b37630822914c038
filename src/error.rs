use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Config Error: {0}")]
    ConfigError(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Parse Error at line {line}, column `{column}`: {message}")]
    ParseError {
        line: u64,
        column: &'static str,
        message: String,
    },

    #[error("Frame {next} pushed after frame {previous}; frames must be strictly ascending")]
    FrameOrder { previous: u32, next: u32 },

    #[error("Row of frame {row} pushed into the record of frame {record}")]
    FrameMismatch { record: u32, row: u32 },

    #[error("Duplicate entry for track {track_id} in frame {frame}")]
    DuplicateEntry { frame: u32, track_id: u32 },
}

use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::row::{Reading, Row};
use crate::vehicle::VehicleClass;

/// Stable per-track label drawn on every frame of the track.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Label {
    pub class: VehicleClass,
    pub text: String,
    pub score: f32,
    /// Frame the winning reading was taken from.
    pub frame: u32,
}

impl Label {
    /// Caption as drawn over the vehicle, e.g. `car: ABC123`.
    pub fn caption(&self) -> String {
        format!("{}: {}", self.class, self.text)
    }
}

/// Highest-scoring reading of every track. Tracks without any reading get no
/// label. On equal scores the earliest frame wins.
pub fn select_labels<'a, I>(rows: I) -> BTreeMap<u32, Label>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut best: BTreeMap<u32, Label> = BTreeMap::new();

    for row in rows {
        let (text, score) = match &row.reading {
            Reading::Read { text, score } => (text, *score),
            Reading::Unread => continue,
        };

        let better = match best.get(&row.track_id) {
            None => true,
            Some(current) => {
                score > current.score || (score == current.score && row.frame < current.frame)
            }
        };

        if better {
            best.insert(
                row.track_id,
                Label {
                    class: row.class,
                    text: text.clone(),
                    score,
                    frame: row.frame,
                },
            );
        }
    }

    debug!("selected labels for {} tracks", best.len());

    best
}

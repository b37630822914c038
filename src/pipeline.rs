//! The three file-to-file stages and a driver running them back to back.
//! Each stage reads the previous stage's persisted output.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::codec;
use crate::config::Config;
use crate::dump;
use crate::error::Result;
use crate::interpolate::Interpolator;
use crate::row::DenseRow;
use crate::selector::{select_labels, Label};
use crate::store::{ResultStore, ResultTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub frames: usize,
    pub tracks: usize,
    pub sparse_rows: usize,
    pub dense_rows: usize,
    pub labels: usize,
}

/// Association and accumulation over a detector dump, in frame order.
pub fn collect<R: BufRead>(input: R) -> Result<ResultTable> {
    let mut store = ResultStore::new();

    for dump in dump::frames(input) {
        let mut dump = dump?;
        let frame = dump.to_frame();

        store.record_frame(&frame, &mut dump)?;
    }

    Ok(store.finish())
}

pub fn collect_path<P: AsRef<Path>, Q: AsRef<Path>>(detections: P, sparse: Q) -> Result<ResultTable> {
    let input = BufReader::new(File::open(detections)?);
    let table = collect(input)?;

    codec::write_path(sparse, table.rows())?;

    Ok(table)
}

pub fn interpolate_path<P: AsRef<Path>, Q: AsRef<Path>>(
    sparse: P,
    dense: Q,
    threads: usize,
) -> Result<Vec<DenseRow>> {
    let table = codec::read_table(sparse)?;
    let rows = Interpolator::with_threads(threads).run(&table);

    codec::write_path(dense, &rows)?;

    Ok(rows)
}

pub fn labels_path<P: AsRef<Path>>(dense: P) -> Result<BTreeMap<u32, Label>> {
    let rows = codec::read_path(dense)?;

    Ok(select_labels(&rows))
}

pub fn write_labels<W: Write>(mut writer: W, labels: &BTreeMap<u32, Label>) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, labels)?;
    writeln!(writer)?;

    Ok(())
}

pub fn write_labels_path<P: AsRef<Path>>(path: P, labels: &BTreeMap<u32, Label>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_labels(&mut writer, labels)?;
    writer.flush()?;

    Ok(())
}

/// Runs collect, interpolate and label selection with the configured paths.
pub fn run(config: &Config) -> Result<Summary> {
    let paths = &config.paths;

    let table = collect_path(&paths.detections, &paths.sparse)?;
    let dense = interpolate_path(&paths.sparse, &paths.dense, config.interpolation.threads)?;
    let labels = labels_path(&paths.dense)?;
    write_labels_path(&paths.labels, &labels)?;

    let summary = Summary {
        frames: table.records().len(),
        tracks: table.track_count(),
        sparse_rows: table.len(),
        dense_rows: dense.len(),
        labels: labels.len(),
    };

    info!("pipeline finished: {:?}", summary);

    Ok(summary)
}

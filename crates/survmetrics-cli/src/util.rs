//! JSON input and output for the commands
//!
//! Datasets and censoring models are read from JSON files. Every command
//! writes a single pretty-printed JSON document, either to a file or to
//! standard output.

use std::{
    fmt,
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Serialize, de::DeserializeOwned};
use survmetrics_eval::censoring::CensoringEstimator;

use crate::model::dataset::Dataset;

/// Where a [`JsonWriter`] sends its document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => f.write_str("stdout"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Buffered writer for one JSON document.
///
/// Without a path the document goes to stdout, so commands can be piped into
/// each other (`survmetrics simulate | ...`).
pub struct JsonWriter {
    destination: Destination,
    writer: Box<dyn Write>,
}

impl JsonWriter {
    /// Opens `path`, creating missing parent directories, or stdout for `None`.
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self {
                destination: Destination::Stdout,
                writer: Box::new(io::stdout().lock()),
            });
        };

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("cannot create output directory {}", dir.display()))?;
        }
        let file =
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
        Ok(Self {
            destination: Destination::File(path.to_owned()),
            writer: Box::new(BufWriter::new(file)),
        })
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Writes `value` followed by a newline and flushes.
    pub fn write<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .and_then(|()| writeln!(self.writer).map_err(serde_json::Error::io))
            .with_context(|| format!("cannot write JSON to {}", self.destination))?;
        self.writer
            .flush()
            .with_context(|| format!("cannot flush {}", self.destination))
    }
}

/// Writes `value` as a JSON file at `path`.
pub fn save_json<T>(value: &T, path: &Path) -> anyhow::Result<()>
where
    T: Serialize,
{
    JsonWriter::create(Some(path))?.write(value)
}

fn read_json<T>(path: &Path, what: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let file = File::open(path).with_context(|| format!("cannot open {what} {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not a valid {what}", path.display()))
}

/// Read an evaluation dataset from a JSON file
///
/// # Errors
///
/// Returns error if the file cannot be opened or parsed, including rows with
/// invalid times or statuses.
pub fn read_dataset_file<P>(path: P) -> anyhow::Result<Dataset>
where
    P: AsRef<Path>,
{
    read_json(path.as_ref(), "dataset")
}

/// Read a saved censoring model. Models with an inconsistent curve or floor
/// are rejected.
pub fn read_censoring_model_file<P>(path: P) -> anyhow::Result<CensoringEstimator>
where
    P: AsRef<Path>,
{
    read_json(path.as_ref(), "censoring model")
}

//! Destinations for step records.
//!
//! The simulator writes one [`StepRecord`] per visited state into a
//! [`RecordSink`]. Records are grouped into segments, one per agent type
//! per run, named after the case parameters and the agent's strategy.
//!
//! - [`FileSink`] appends each segment to a file in an output directory,
//!   as tab-separated lines or JSON lines.
//! - [`MemorySink`] keeps segments in memory.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use nkscape_types::StepRecord;
use serde::Deserialize;

/// Errors raised by record sinks.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Creating, writing or flushing an output file failed.
    #[error("output I/O failed for {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A record could not be serialized.
    #[error("failed to serialize record: {source}")]
    Json {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// A record was written while no segment was open.
    #[error("no output segment is open")]
    NoOpenSegment,
}

/// Line format of a [`FileSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Tab-separated fields, one record per line.
    #[default]
    Tsv,
    /// One JSON object per line.
    JsonLines,
}

/// Receiver of step records.
pub trait RecordSink {
    /// Start a new segment, closing any segment still open.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the segment cannot be created.
    fn open_segment(&mut self, name: &str) -> Result<(), SinkError>;

    /// Append one record to the open segment.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::NoOpenSegment`] without an open segment, or an
    /// I/O or serialization error.
    fn write_record(&mut self, record: &StepRecord) -> Result<(), SinkError>;

    /// Finish the open segment. Closing with nothing open is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if buffered output cannot be flushed.
    fn close_segment(&mut self) -> Result<(), SinkError>;
}

/// Appends segments to files under a directory.
///
/// Files are opened in append mode, so repeated runs of the same case
/// accumulate in one file per agent type.
#[derive(Debug)]
pub struct FileSink {
    directory: PathBuf,
    format: OutputFormat,
    open: Option<OpenFile>,
}

#[derive(Debug)]
struct OpenFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a sink writing into `directory` (created on first use).
    pub fn new(directory: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            directory: directory.into(),
            format,
            open: None,
        }
    }

    /// Output directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Line format.
    pub const fn format(&self) -> OutputFormat {
        self.format
    }
}

impl RecordSink for FileSink {
    fn open_segment(&mut self, name: &str) -> Result<(), SinkError> {
        self.close_segment()?;
        fs::create_dir_all(&self.directory).map_err(|source| SinkError::Io {
            path: self.directory.clone(),
            source,
        })?;
        let path = self.directory.join(name);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Io {
                path: path.clone(),
                source,
            })?;
        self.open = Some(OpenFile {
            path,
            writer: BufWriter::new(file),
        });
        Ok(())
    }

    fn write_record(&mut self, record: &StepRecord) -> Result<(), SinkError> {
        let open = self.open.as_mut().ok_or(SinkError::NoOpenSegment)?;
        let line = match self.format {
            OutputFormat::Tsv => record.to_string(),
            OutputFormat::JsonLines => serde_json::to_string(record)?,
        };
        writeln!(open.writer, "{line}").map_err(|source| SinkError::Io {
            path: open.path.clone(),
            source,
        })
    }

    fn close_segment(&mut self) -> Result<(), SinkError> {
        if let Some(mut open) = self.open.take() {
            open.writer.flush().map_err(|source| SinkError::Io {
                path: open.path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// One named group of records held by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Segment name.
    pub name: String,
    /// Records in write order.
    pub records: Vec<StepRecord>,
}

/// Collects segments in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    segments: Vec<Segment>,
    open: bool,
}

impl MemorySink {
    /// Create an empty sink.
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
            open: false,
        }
    }

    /// All segments in the order they were opened.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Every record across all segments, in write order.
    pub fn records(&self) -> impl Iterator<Item = &StepRecord> {
        self.segments.iter().flat_map(|segment| segment.records.iter())
    }

    /// Consume the sink, returning its segments.
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}

impl RecordSink for MemorySink {
    fn open_segment(&mut self, name: &str) -> Result<(), SinkError> {
        self.segments.push(Segment {
            name: name.to_owned(),
            records: Vec::new(),
        });
        self.open = true;
        Ok(())
    }

    fn write_record(&mut self, record: &StepRecord) -> Result<(), SinkError> {
        if !self.open {
            return Err(SinkError::NoOpenSegment);
        }
        let segment = self.segments.last_mut().ok_or(SinkError::NoOpenSegment)?;
        segment.records.push(*record);
        Ok(())
    }

    fn close_segment(&mut self) -> Result<(), SinkError> {
        self.open = false;
        Ok(())
    }
}

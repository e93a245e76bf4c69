//! # Path Recorder
//!
//! Sinks for committed ray paths. Every path that reaches the receiver is
//! handed to a [`PathRecorder`] together with its success index (0, 1, 2,
//! ... in the order rays were cast).
//!
//! ## CSV layout
//!
//! [`CsvRecorder`] writes one header row, then for each path a separator
//! line, one row per segment and a blank line:
//!
//! ```text
//! origin_x,origin_y,origin_z,direction_x,...,totalDistance,rayDistance,hitTag
//! --- Ray Trace 0 ---
//! 0,0,0,0,0,1,0,0,10,0,0,-1,10,10,r
//!
//! ```
//!
//! Output is buffered; nothing is guaranteed on disk before [`PathRecorder::flush`].

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info};

use crate::error::Result;
use crate::ray::{RayPath, RaySegment};

/// Column names of the CSV output.
pub const CSV_HEADER: &str = "origin_x,origin_y,origin_z,direction_x,direction_y,direction_z,\
hitPoint_x,hitPoint_y,hitPoint_z,hitNormal_x,hitNormal_y,hitNormal_z,totalDistance,rayDistance,hitTag";

/// Consumer of committed ray paths.
pub trait PathRecorder {
    /// Record the path of the `index`-th successful ray.
    fn record(&mut self, index: usize, path: &RayPath) -> Result<()>;

    /// Push buffered output to its destination.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes paths as CSV to any writer.
pub struct CsvRecorder<W: Write> {
    writer: BufWriter<W>,
    paths_written: usize,
}

impl CsvRecorder<File> {
    /// Create (or truncate) `path` and write the header.
    ///
    /// Missing parent directories are created.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        info!("Recording ray paths to {}", path.display());
        Self::new(File::create(path)?)
    }
}

impl<W: Write> CsvRecorder<W> {
    /// Wrap `writer` and write the header row.
    pub fn new(writer: W) -> Result<Self> {
        let mut writer = BufWriter::new(writer);
        writeln!(writer, "{CSV_HEADER}")?;
        Ok(Self {
            writer,
            paths_written: 0,
        })
    }

    /// Paths written so far.
    pub fn paths_written(&self) -> usize {
        self.paths_written
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error().into())
    }

    fn write_segment(&mut self, s: &RaySegment) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            s.origin.x,
            s.origin.y,
            s.origin.z,
            s.direction.x,
            s.direction.y,
            s.direction.z,
            s.hit_point.x,
            s.hit_point.y,
            s.hit_point.z,
            s.hit_normal.x,
            s.hit_normal.y,
            s.hit_normal.z,
            s.total_distance,
            s.ray_distance,
            s.hit_tag,
        )?;
        Ok(())
    }
}

impl<W: Write> PathRecorder for CsvRecorder<W> {
    fn record(&mut self, index: usize, path: &RayPath) -> Result<()> {
        writeln!(self.writer, "--- Ray Trace {index} ---")?;
        for segment in path.segments() {
            self.write_segment(segment)?;
        }
        writeln!(self.writer)?;
        self.paths_written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        debug!("Flushed {} ray paths", self.paths_written);
        Ok(())
    }
}

/// Keeps recorded paths in memory.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    /// Recorded `(index, path)` pairs in arrival order.
    pub paths: Vec<(usize, RayPath)>,
}

impl MemoryRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PathRecorder for MemoryRecorder {
    fn record(&mut self, index: usize, path: &RayPath) -> Result<()> {
        self.paths.push((index, path.clone()));
        Ok(())
    }
}

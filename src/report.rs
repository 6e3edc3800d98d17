//! Result and error logs written while a simulation runs
//!
//! The [`ResultLog`] holds one line per SNR point and is rewritten in full whenever it changes.
//! Each rewrite goes to a temporary file that then replaces the log, so a reader never sees a
//! partially written line. The [`ErrorLog`] gets one appended line per frame error.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::warn;

use crate::{Error, SimulationResult};

/// Header line of the result log without frame times
const HEADER: &str = "snr fer ber frames avg_iter";

/// Header line of the result log with frame times
const HEADER_WITH_FRAME_TIME: &str = "snr fer ber frames avg_iter frame_time";

/// Cumulative listing of simulation results, one line per SNR point
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ResultLog {
    /// Path of the log file
    path: PathBuf,
    /// Whether lines carry the average frame time (ms)
    log_frame_time: bool,
    /// Result line of each SNR point processed so far
    lines: Vec<String>,
}

impl ResultLog {
    /// Returns empty result log to be written to a given path.
    #[must_use]
    pub fn new(path: &Path, log_frame_time: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            log_frame_time,
            lines: Vec::new(),
        }
    }

    /// Returns path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sets line of an SNR point. Indices must be set in order, starting from `0`.
    pub fn update(&mut self, snr_index: usize, result: &SimulationResult) {
        let line = result.log_line(self.log_frame_time);
        match self.lines.get_mut(snr_index) {
            Some(existing) => *existing = line,
            None => self.lines.push(line),
        }
    }

    /// Returns full contents of the log.
    #[must_use]
    pub fn contents(&self) -> String {
        let header = if self.log_frame_time {
            HEADER_WITH_FRAME_TIME
        } else {
            HEADER
        };
        std::iter::once(header)
            .chain(self.lines.iter().map(String::as_str))
            .map(|line| format!("{line}\n"))
            .collect()
    }

    /// Replaces the log file with the current contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written or moved into place.
    pub fn write(&self) -> Result<(), Error> {
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);
        fs::write(&tmp_path, self.contents())?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Replaces the log file with the current contents, emitting a warning on failure.
    pub fn write_or_warn(&self) {
        if let Err(err) = self.write() {
            warn!(path = %self.path.display(), error = %err, "cannot write result log");
        }
    }
}

/// Diagnostics of one frame error
#[derive(Clone, PartialEq, Debug)]
pub struct FrameErrorReport {
    /// SNR (dB)
    pub snr_db: f64,
    /// Frame number within the SNR point
    pub frame: u64,
    /// Whether the decoded word satisfies every check
    pub is_codeword: bool,
    /// Squared Euclidean distance between transmitted and re-mapped decoded symbols
    pub squared_distance: f64,
    /// Code bit positions decoded in error
    pub failed_bits: Vec<usize>,
    /// Unsatisfied checks
    pub failed_checks: Vec<usize>,
}

impl fmt::Display for FrameErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SNR: {:.2} -- frame: {} -- is codeword: {} -- dE(c,chat): {:.3} -- dH(c,chat): {} | {} \
             -- synd weight: {} | {}",
            self.snr_db,
            self.frame,
            u8::from(self.is_codeword),
            self.squared_distance,
            self.failed_bits.len(),
            self.failed_bits.iter().join(" "),
            self.failed_checks.len(),
            self.failed_checks.iter().join(" ")
        )
    }
}

/// Append-only log of frame errors
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ErrorLog {
    /// Path of the log file
    path: PathBuf,
}

impl ErrorLog {
    /// Returns error log appending to a given path.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Returns path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends report of a frame error.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be opened or written.
    pub fn append(&self, report: &FrameErrorReport) -> Result<(), Error> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{report}")?;
        Ok(())
    }

    /// Appends report of a frame error, emitting a warning on failure.
    pub fn append_or_warn(&self, report: &FrameErrorReport) {
        if let Err(err) = self.append(report) {
            warn!(path = %self.path.display(), error = %err, "cannot write error log");
        }
    }
}

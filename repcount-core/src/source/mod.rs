//! source — where per-frame landmarks come from
//!
//! Camera capture and the pose model live outside this crate; they reach the
//! counting loop through [`LandmarkSource`]. Two sources ship here: a JSON
//! Lines replay of pre-extracted landmarks and an in-memory queue.
//!
//! Replay format: one [`PoseFrame`] per line, e.g.
//!
//! ```text
//! {"width":640,"height":480,"landmarks":[{"x":0.51,"y":0.42,"visibility":0.98}, ...]}
//! {"width":640,"height":480,"landmarks":null}
//! ```

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::landmarks::PoseFrame;

/// A stream of pose frames. `Ok(None)` ends the session: a failed read is
/// not retried.
pub trait LandmarkSource {
    fn next_frame(&mut self) -> Result<Option<PoseFrame>>;

    /// Release the underlying device or file. Called once, on every exit path.
    fn close(&mut self) {}

    /// Frame count if known up front, for progress reporting.
    fn len_hint(&self) -> Option<u64> {
        None
    }
}

// ── Replay ───────────────────────────────────────────────────────────────────

/// Streams frames from a JSON Lines file.
pub struct ReplaySource {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    line_no: u64,
    total: u64,
}

impl ReplaySource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let total = total_frames(&path);
        let file = File::open(&path)
            .with_context(|| format!("could not open landmark file {}", path.display()))?;
        info!(path = %path.display(), total, "opened landmark replay");

        Ok(Self {
            path,
            lines: Some(BufReader::new(file).lines()),
            line_no: 0,
            total,
        })
    }
}

impl LandmarkSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<PoseFrame>> {
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };

        for line in lines.by_ref() {
            self.line_no += 1;
            let line = line
                .with_context(|| format!("failed to read {}", self.path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: PoseFrame = serde_json::from_str(&line).with_context(|| {
                format!(
                    "malformed frame at {}:{}",
                    self.path.display(),
                    self.line_no
                )
            })?;
            return Ok(Some(frame));
        }

        Ok(None)
    }

    fn close(&mut self) {
        if self.lines.take().is_some() {
            debug!(path = %self.path.display(), lines = self.line_no, "closed landmark replay");
        }
    }

    fn len_hint(&self) -> Option<u64> {
        Some(self.total)
    }
}

/// Number of non-blank lines in a replay file. Falls back to 0 if the file
/// cannot be read.
pub fn total_frames<P: AsRef<Path>>(path: P) -> u64 {
    let Ok(file) = File::open(path) else {
        return 0;
    };
    BufReader::new(file)
        .lines()
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .count() as u64
}

// ── Memory ───────────────────────────────────────────────────────────────────

/// Frames held in memory.
#[derive(Debug, Default)]
pub struct MemorySource {
    frames: VecDeque<PoseFrame>,
    total: u64,
    closed: bool,
}

impl MemorySource {
    pub fn new(frames: impl IntoIterator<Item = PoseFrame>) -> Self {
        let frames: VecDeque<_> = frames.into_iter().collect();
        let total = frames.len() as u64;
        Self {
            frames,
            total,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl LandmarkSource for MemorySource {
    fn next_frame(&mut self) -> Result<Option<PoseFrame>> {
        if self.closed {
            return Ok(None);
        }
        Ok(self.frames.pop_front())
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn len_hint(&self) -> Option<u64> {
        Some(self.total)
    }
}

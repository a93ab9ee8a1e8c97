//! JSONL trace of a scenario run and its golden checksum.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use infipage_core::GesturePhase;
use serde::Serialize;

use crate::error::Result;

/// Prefix on checksum strings so logs say which hash produced them.
const CHECKSUM_PREFIX: &str = "blake3:";

/// blake3 digest of a text, hex encoded with a `blake3:` prefix.
#[must_use]
pub fn compute_text_checksum(text: &str) -> String {
    let hash = blake3::hash(text.as_bytes());
    format!("{CHECKSUM_PREFIX}{}", hash.to_hex())
}

/// One line of the trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    Start {
        scenario: String,
        pagers: Vec<String>,
    },
    Step {
        step: usize,
        op: &'static str,
        t_ms: f64,
    },
    Mounted {
        pager: String,
        id: String,
        depth: u32,
    },
    Unmounted {
        pager: String,
    },
    /// A pager handed the touch to a competing recognizer.
    GestureFailed {
        pager: String,
        t_ms: f64,
    },
    Release {
        velocity_x: f64,
        velocity_y: f64,
        t_ms: f64,
    },
    PageChange {
        pager: String,
        page: i64,
        previous: i64,
        t_ms: f64,
    },
    Settled {
        frames: u32,
        idle: bool,
    },
    Snapshot {
        step: usize,
        t_ms: f64,
        pagers: Vec<PagerSnapshot>,
    },
    Complete {
        steps: usize,
        checksum: String,
    },
}

/// Observable state of one pager at the end of a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagerSnapshot {
    pub name: String,
    pub page: i64,
    pub target: i64,
    pub translation: f64,
    pub position: f64,
    pub phase: GesturePhase,
    pub locked: bool,
    pub visible: Vec<VisibleSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleSlot {
    pub label: String,
    pub focus: f64,
    pub active: bool,
}

/// Accumulates trace lines in memory; written out once the run completes.
#[derive(Debug, Default)]
pub struct Trace {
    lines: Vec<String>,
    events: Vec<TraceEvent>,
}

impl Trace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: TraceEvent) -> Result<()> {
        self.lines.push(serde_json::to_string(&event)?);
        self.events.push(event);
        Ok(())
    }

    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Checksum over every line recorded so far.
    #[must_use]
    pub fn checksum(&self) -> String {
        compute_text_checksum(&self.lines.join("\n"))
    }

    /// Write the trace as JSONL, creating parent directories as needed.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        for line in &self.lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }
}

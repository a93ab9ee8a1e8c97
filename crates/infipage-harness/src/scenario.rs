//! Scenario files: a pager tree plus a script of host events.
//!
//! ```json
//! {
//!   "name": "feed-with-carousel",
//!   "viewport": { "width": 300, "height": 600 },
//!   "pagers": [
//!     { "name": "feed", "config": { "orientation": "vertical" } },
//!     { "name": "carousel", "parent": "feed", "config": { "min_index": 0 } }
//!   ],
//!   "steps": [
//!     { "op": "swipe", "from": [250, 300], "to": [40, 300] },
//!     { "op": "settle" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use infipage_core::{PagerConfig, Viewport};
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// Default frame step, roughly 60 Hz.
pub const DEFAULT_FRAME_MS: u64 = 16;

/// Frame cap for `settle` steps.
pub const DEFAULT_SETTLE_FRAMES: u32 = 600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    pub pagers: Vec<PagerSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One pager in the tree. Parents must be declared before their children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagerSpec {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub config: PagerConfig,
    /// Overrides the scenario viewport for this pager.
    #[serde(default)]
    pub viewport: Option<Viewport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// A single-finger drag delivered to every pager under the touch.
    Swipe(Swipe),
    /// Advance the clock by `count` frames.
    Frames {
        count: u32,
        #[serde(default = "default_frame_ms")]
        dt_ms: u64,
    },
    /// Advance frames until every pager is idle.
    Settle {
        #[serde(default = "default_settle_frames")]
        max_frames: u32,
    },
    SetPage {
        pager: String,
        index: i64,
        #[serde(default)]
        animated: bool,
    },
    Increment {
        pager: String,
        #[serde(default)]
        animated: bool,
    },
    Decrement {
        pager: String,
        #[serde(default)]
        animated: bool,
    },
    /// New viewport for one pager, or for all of them when `pager` is absent.
    Layout {
        #[serde(default)]
        pager: Option<String>,
        width: f64,
        height: f64,
    },
    Mount(PagerSpec),
    /// Unmount a pager together with its descendants.
    Unmount { pager: String },
    SetGesturesDisabled { pager: String, disabled: bool },
    Rearm { pager: String },
}

impl Step {
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::Swipe(_) => "swipe",
            Self::Frames { .. } => "frames",
            Self::Settle { .. } => "settle",
            Self::SetPage { .. } => "set_page",
            Self::Increment { .. } => "increment",
            Self::Decrement { .. } => "decrement",
            Self::Layout { .. } => "layout",
            Self::Mount(_) => "mount",
            Self::Unmount { .. } => "unmount",
            Self::SetGesturesDisabled { .. } => "set_gestures_disabled",
            Self::Rearm { .. } => "rearm",
        }
    }
}

/// A straight-line drag from `from` to `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swipe {
    /// Innermost pager under the finger; defaults to the deepest mounted one.
    #[serde(default)]
    pub through: Option<String>,
    pub from: [f64; 2],
    pub to: [f64; 2],
    #[serde(default = "default_swipe_ms")]
    pub duration_ms: u64,
    /// Move events between touch-down and release.
    #[serde(default = "default_swipe_samples")]
    pub samples: u32,
    /// Time the finger rests at `to` before lifting.
    #[serde(default)]
    pub hold_ms: u64,
    /// Tree changes made while the finger is down.
    #[serde(default)]
    pub during: Vec<TreeChange>,
}

/// A mount or unmount applied mid-swipe, just before the first move event
/// at or after `at_ms`. Changes still pending at release apply before it.
///
/// Pagers mounted this way never join the gesture already in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeChange {
    pub at_ms: u64,
    #[serde(default)]
    pub mount: Option<PagerSpec>,
    #[serde(default)]
    pub unmount: Option<String>,
}

fn default_viewport() -> Viewport {
    Viewport::new(300.0, 600.0)
}

fn default_frame_ms() -> u64 {
    DEFAULT_FRAME_MS
}

fn default_settle_frames() -> u32 {
    DEFAULT_SETTLE_FRAMES
}

fn default_swipe_ms() -> u64 {
    120
}

fn default_swipe_samples() -> u32 {
    8
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HarnessError::MissingPath {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Static checks; pager references inside steps are resolved while
    /// running because `mount`/`unmount` change the tree.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HarnessError::invalid("scenario name is empty"));
        }
        let mut names = HashSet::new();
        for spec in &self.pagers {
            validate_spec(spec, &names)?;
            names.insert(spec.name.as_str());
        }
        for (index, step) in self.steps.iter().enumerate() {
            validate_step(step).map_err(|message| {
                HarnessError::invalid(format!("step {index} ({}): {message}", step.op()))
            })?;
        }
        Ok(())
    }
}

fn validate_spec(spec: &PagerSpec, declared: &HashSet<&str>) -> Result<()> {
    if spec.name.trim().is_empty() {
        return Err(HarnessError::invalid("pager name is empty"));
    }
    if declared.contains(spec.name.as_str()) {
        return Err(HarnessError::invalid(format!(
            "duplicate pager name `{}`",
            spec.name
        )));
    }
    if let Some(parent) = &spec.parent
        && !declared.contains(parent.as_str())
    {
        return Err(HarnessError::invalid(format!(
            "pager `{}` names parent `{parent}` before it is declared",
            spec.name
        )));
    }
    spec.config.validate()?;
    Ok(())
}

fn validate_step(step: &Step) -> std::result::Result<(), String> {
    match step {
        Step::Swipe(swipe) => {
            if swipe.samples == 0 {
                return Err("samples must be at least 1".into());
            }
            if swipe.from.iter().chain(&swipe.to).any(|v| !v.is_finite()) {
                return Err("touch coordinates must be finite".into());
            }
            for change in &swipe.during {
                match (&change.mount, &change.unmount) {
                    (Some(spec), None) => {
                        spec.config.validate().map_err(|error| error.to_string())?;
                    }
                    (None, Some(_)) => {}
                    _ => {
                        return Err(format!(
                            "change at {} ms needs exactly one of `mount` or `unmount`",
                            change.at_ms
                        ));
                    }
                }
            }
        }
        Step::Frames { dt_ms, .. } if *dt_ms == 0 => {
            return Err("dt_ms must be positive".into());
        }
        Step::Layout { width, height, .. } if !width.is_finite() || !height.is_finite() => {
            return Err("viewport size must be finite".into());
        }
        Step::Mount(spec) => {
            spec.config.validate().map_err(|error| error.to_string())?;
        }
        _ => {}
    }
    Ok(())
}

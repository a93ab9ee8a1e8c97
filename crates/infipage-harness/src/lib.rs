#![forbid(unsafe_code)]

//! Harness: a deterministic headless host for `infipage-core`.
//!
//! Scenarios (JSON) describe a pager tree and a script of swipes, frames,
//! layout changes, programmatic jumps and mount churn. The [`Host`] mounts
//! the tree, routes every synthetic touch to all pagers under the finger
//! (innermost first, as a platform with simultaneous recognition would),
//! estimates release velocity with [`VelocityTracker1D`], and drives frames
//! on a simulated clock. The run produces a JSONL [`Trace`] whose blake3
//! checksum serves as a golden value.

pub mod cli;
pub mod error;
pub mod host;
pub mod runner;
pub mod scenario;
pub mod touch;
pub mod trace;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{HarnessError, Result};
pub use host::Host;
pub use runner::{RunReport, init_tracing, run_scenario};
pub use scenario::{PagerSpec, Scenario, Step, Swipe, TreeChange};
pub use touch::VelocityTracker1D;
pub use trace::{PagerSnapshot, Trace, TraceEvent, compute_text_checksum};

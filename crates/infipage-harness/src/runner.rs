//! Executes a [`Scenario`] against a [`Host`] and records the trace.

use std::collections::BTreeMap;

use infipage_core::Viewport;

use crate::error::Result;
use crate::host::Host;
use crate::scenario::{DEFAULT_FRAME_MS, Scenario, Step};
use crate::trace::{Trace, TraceEvent};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "INFIPAGE_LOG";

/// Install a stderr `tracing` subscriber filtered by `INFIPAGE_LOG`
/// (default `info`). Safe to call more than once.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Result of one scenario run.
#[derive(Debug)]
pub struct RunReport {
    pub scenario: String,
    pub trace: Trace,
    /// Checksum of every trace line before the `complete` record.
    pub checksum: String,
    /// Committed page of each pager still mounted at the end.
    pub final_pages: BTreeMap<String, i64>,
    pub elapsed_ms: f64,
}

pub fn run_scenario(scenario: &Scenario) -> Result<RunReport> {
    scenario.validate()?;
    let span = tracing::info_span!("scenario", name = %scenario.name);
    let _guard = span.enter();

    let mut trace = Trace::new();
    let mut host = Host::new(scenario.viewport);
    trace.record(TraceEvent::Start {
        scenario: scenario.name.clone(),
        pagers: scenario.pagers.iter().map(|spec| spec.name.clone()).collect(),
    })?;
    for spec in &scenario.pagers {
        host.mount(spec, &mut trace)?;
    }

    for (index, step) in scenario.steps.iter().enumerate() {
        trace.record(TraceEvent::Step {
            step: index,
            op: step.op(),
            t_ms: host.clock_ms(),
        })?;
        tracing::debug!(step = index, op = step.op(), "step");
        apply_step(&mut host, step, &mut trace)?;
        host.drain_changes(&mut trace)?;
        trace.record(TraceEvent::Snapshot {
            step: index,
            t_ms: host.clock_ms(),
            pagers: host.snapshot(),
        })?;
    }

    let checksum = trace.checksum();
    trace.record(TraceEvent::Complete {
        steps: scenario.steps.len(),
        checksum: checksum.clone(),
    })?;

    let final_pages = host
        .names()
        .into_iter()
        .filter_map(|name| {
            let page = host.pager(&name).ok()?.current_page();
            Some((name, page))
        })
        .collect();
    tracing::info!(
        steps = scenario.steps.len(),
        checksum = %checksum,
        "scenario complete"
    );
    Ok(RunReport {
        scenario: scenario.name.clone(),
        trace,
        checksum,
        final_pages,
        elapsed_ms: host.clock_ms(),
    })
}

fn apply_step(host: &mut Host, step: &Step, trace: &mut Trace) -> Result<()> {
    let frame_ms = DEFAULT_FRAME_MS as f64;
    match step {
        Step::Swipe(swipe) => host.swipe(swipe, frame_ms, trace),
        Step::Frames { count, dt_ms } => {
            for _ in 0..*count {
                host.frame(*dt_ms as f64, trace)?;
            }
            Ok(())
        }
        Step::Settle { max_frames } => {
            let frames = host.settle(frame_ms, *max_frames, trace)?;
            let idle = host.is_idle();
            if !idle {
                tracing::warn!(frames, "pagers still moving after frame cap");
            }
            trace.record(TraceEvent::Settled { frames, idle })
        }
        Step::SetPage {
            pager,
            index,
            animated,
        } => host.set_page(pager, *index, *animated),
        Step::Increment { pager, animated } => host.increment(pager, *animated),
        Step::Decrement { pager, animated } => host.decrement(pager, *animated),
        Step::Layout {
            pager,
            width,
            height,
        } => host.layout(pager.as_deref(), Viewport::new(*width, *height)),
        Step::Mount(spec) => host.mount(spec, trace),
        Step::Unmount { pager } => host.unmount(pager, trace),
        Step::SetGesturesDisabled { pager, disabled } => {
            host.pager_mut(pager)?.set_gestures_disabled(*disabled);
            Ok(())
        }
        Step::Rearm { pager } => {
            host.pager_mut(pager)?.rearm();
            Ok(())
        }
    }
}

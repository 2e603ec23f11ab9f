//! Watch command: poll, copy, retry, report, sleep

use crate::config::load_pairs;
use crate::diff::{should_copy, source_state, SourceState};
use crate::executor::{attempt_copy, Copier, FsCopier};
use crate::pending::PendingSet;
use crate::types::{CopyFailure, PathPair, WatchError};
use crate::ui::{format_copied_notice, format_status};
use crate::Config;
use chrono::Local;
use filetime::FileTime;
use tracing::{debug, info, warn};

/// Everything the loop carries from one cycle to the next
#[derive(Debug)]
pub struct LoopState {
    pairs: Vec<PathPair>,
    pending: PendingSet,
    baseline: FileTime,
    first_iteration: bool,
}

impl LoopState {
    pub fn new(pairs: Vec<PathPair>) -> Self {
        Self {
            pairs,
            pending: PendingSet::new(),
            baseline: FileTime::now(),
            first_iteration: true,
        }
    }

    pub fn pairs(&self) -> &[PathPair] {
        &self.pairs
    }

    pub fn pending(&self) -> &PendingSet {
        &self.pending
    }

    /// Start instant of the previous cycle
    pub fn baseline(&self) -> FileTime {
        self.baseline
    }

    pub fn is_first_iteration(&self) -> bool {
        self.first_iteration
    }
}

/// Which pass a copy attempt belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Primary,
    Retry,
}

/// Events emitted while a cycle runs.
#[derive(Debug)]
pub enum CycleEvent<'a> {
    /// Source was copied over its destination
    Copied {
        pair: &'a PathPair,
        pass: Pass,
        bytes: u64,
    },
    /// Copy attempt was rejected; the pair is pending
    Failed {
        pair: &'a PathPair,
        pass: Pass,
        error: &'a CopyFailure,
    },
}

/// Optional callback used to receive cycle events.
pub type CycleCallback<'cb> = dyn Fn(&CycleEvent<'_>) + 'cb;

/// Outcome of one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Pair indices copied successfully, in attempt order
    pub copied: Vec<usize>,
    /// Pair indices whose attempt failed (either pass)
    pub failed: Vec<usize>,
    /// Pair indices that left the pending set
    pub resolved: Vec<usize>,
    /// Pairs skipped because their source was not there
    pub skipped_missing: usize,
    /// Pending count once the cycle finished
    pub pending: usize,
}

/// Drives the watch-copy-retry cycle over a fixed pair list.
pub struct WatchLoop<C: Copier> {
    state: LoopState,
    copier: C,
}

impl<C: Copier> WatchLoop<C> {
    pub fn new(pairs: Vec<PathPair>, copier: C) -> Self {
        Self {
            state: LoopState::new(pairs),
            copier,
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn copier(&self) -> &C {
        &self.copier
    }

    /// Run one cycle without sleeping.
    ///
    /// 1. Primary pass: copy every present source that changed since the
    ///    previous cycle began (all of them on the first cycle).
    /// 2. Retry pass: try every pending pair whose source is present.
    /// 3. Drop the first-iteration flag and move the baseline to this
    ///    cycle's start.
    pub fn run_cycle(&mut self, on_event: Option<&CycleCallback<'_>>) -> CycleReport {
        let started = FileTime::now();
        let mut report = CycleReport::default();

        let LoopState {
            pairs,
            pending,
            baseline,
            first_iteration,
        } = &mut self.state;

        for pair in pairs.iter() {
            let modified = match source_state(&pair.source) {
                SourceState::Present(modified) => modified,
                SourceState::Missing => {
                    report.skipped_missing += 1;
                    continue;
                }
            };

            if !should_copy(*first_iteration, modified, *baseline) {
                debug!(source = %pair.source.display(), "unchanged");
                continue;
            }

            match attempt_copy(&self.copier, pair) {
                Ok(bytes) => {
                    info!(
                        source = %pair.source.display(),
                        dest = %pair.destination.display(),
                        bytes,
                        "copied"
                    );
                    if pending.mark_resolved(pair.index) {
                        report.resolved.push(pair.index);
                    }
                    report.copied.push(pair.index);
                    emit_event(
                        on_event,
                        CycleEvent::Copied {
                            pair,
                            pass: Pass::Primary,
                            bytes,
                        },
                    );
                }
                Err(error) => {
                    warn!(
                        source = %pair.source.display(),
                        dest = %pair.destination.display(),
                        error = %error,
                        "copy failed, marked pending"
                    );
                    emit_event(
                        on_event,
                        CycleEvent::Failed {
                            pair,
                            pass: Pass::Primary,
                            error: &error,
                        },
                    );
                    pending.mark_failed(pair.index, error);
                    report.failed.push(pair.index);
                }
            }
        }

        for index in pending.snapshot() {
            let Some(pair) = pairs.get(index) else {
                continue;
            };

            // A vanished source keeps its entry until a later copy succeeds.
            if source_state(&pair.source) == SourceState::Missing {
                debug!(source = %pair.source.display(), "pending source missing, retry skipped");
                continue;
            }

            match attempt_copy(&self.copier, pair) {
                Ok(bytes) => {
                    info!(
                        source = %pair.source.display(),
                        dest = %pair.destination.display(),
                        bytes,
                        "pending copy resolved"
                    );
                    pending.mark_resolved(index);
                    report.resolved.push(index);
                    report.copied.push(index);
                    emit_event(
                        on_event,
                        CycleEvent::Copied {
                            pair,
                            pass: Pass::Retry,
                            bytes,
                        },
                    );
                }
                Err(error) => {
                    debug!(source = %pair.source.display(), error = %error, "retry failed");
                    emit_event(
                        on_event,
                        CycleEvent::Failed {
                            pair,
                            pass: Pass::Retry,
                            error: &error,
                        },
                    );
                    pending.mark_failed(index, error);
                    report.failed.push(index);
                }
            }
        }

        *first_iteration = false;
        *baseline = started;
        report.pending = pending.len();
        report
    }
}

fn emit_event(on_event: Option<&CycleCallback<'_>>, event: CycleEvent<'_>) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}

/// Print copied notices as they happen
fn print_event(event: &CycleEvent<'_>) {
    if let CycleEvent::Copied { pair, bytes, .. } = event {
        println!("{}", format_copied_notice(&pair.file_name(), *bytes));
    }
}

fn print_status<C: Copier>(config: &Config, watch: &WatchLoop<C>) {
    println!(
        "{}",
        format_status(
            &config.pairs_file,
            watch.state().pairs(),
            watch.state().pending(),
            Local::now()
        )
    );
}

/// Run the watch command.
///
/// Loads the pair list once, then cycles until Ctrl-C (or after one cycle
/// with `once`). Returns the number of pairs still pending at exit.
pub async fn run(config: Config) -> Result<usize, WatchError> {
    let pairs = load_pairs(&config.pairs_file)?;
    info!(
        pairs = pairs.len(),
        interval_ms = config.interval.as_millis() as u64,
        "watching"
    );

    let mut watch = WatchLoop::new(pairs, FsCopier::new(config.create_dirs));
    print_status(&config, &watch);

    loop {
        let report = watch.run_cycle(Some(&print_event));
        print_status(&config, &watch);

        if config.once {
            return Ok(report.pending);
        }

        tokio::select! {
            _ = tokio::time::sleep(config.interval) => {}
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("interrupted, stopping");
                return Ok(watch.state().pending().len());
            }
        }
    }
}

//! Parallel fan-out of independent analyses.
//!
//! Each symbol runs as its own task on a private rayon pool (never the global
//! one). Results come back over an `mpsc` channel and are collected against a
//! single deadline for the whole batch. Branches that have not reported by
//! then are `TimedOut`; whatever they send later is dropped with the
//! receiver.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use confluence_core::AnalysisResult;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Outcome of one branch of a fan-out.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchOutcome<T = AnalysisResult> {
    Completed(T),
    TimedOut,
}

impl<T> BranchOutcome<T> {
    pub fn completed(&self) -> Option<&T> {
        match self {
            BranchOutcome::Completed(v) => Some(v),
            BranchOutcome::TimedOut => None,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, BranchOutcome::TimedOut)
    }
}

pub struct BatchRunner {
    pool: rayon::ThreadPool,
    branch_timeout: Duration,
}

impl BatchRunner {
    pub fn new(workers: usize, branch_timeout: Duration) -> Result<Self, BatchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("confluence-batch-{i}"))
            .panic_handler(|_| tracing::error!("analysis task panicked"))
            .build()?;
        Ok(Self {
            pool,
            branch_timeout,
        })
    }

    pub fn branch_timeout(&self) -> Duration {
        self.branch_timeout
    }

    /// Analyze every symbol in parallel. Returns one outcome per symbol, in
    /// input order.
    ///
    /// The deadline is `branch_timeout` from the call, shared by all
    /// branches. A branch that panics never reports and ends up `TimedOut`.
    pub fn run<F>(&self, symbols: &[String], days: u32, analyze: F) -> Vec<BranchOutcome>
    where
        F: Fn(&str, u32) -> AnalysisResult + Send + Sync + 'static,
    {
        let deadline = Instant::now() + self.branch_timeout;
        let analyze = Arc::new(analyze);
        let (tx, rx) = mpsc::channel();

        for (index, symbol) in symbols.iter().enumerate() {
            let tx = tx.clone();
            let analyze = Arc::clone(&analyze);
            let symbol = symbol.clone();
            self.pool.spawn(move || {
                let result = analyze(&symbol, days);
                // Receiver is gone once the deadline passed.
                let _ = tx.send((index, result));
            });
        }
        drop(tx);

        let mut slots: Vec<Option<AnalysisResult>> = vec![None; symbols.len()];
        let mut pending = symbols.len();
        while pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((index, result)) => {
                    slots[index] = Some(result);
                    pending -= 1;
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(pending, "batch deadline reached");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        slots
            .into_iter()
            .zip(symbols)
            .map(|(slot, symbol)| match slot {
                Some(result) => BranchOutcome::Completed(result),
                None => {
                    tracing::warn!(symbol = symbol.as_str(), "branch timed out");
                    BranchOutcome::TimedOut
                }
            })
            .collect()
    }
}

/// Run two independent closures in parallel, waiting at most `timeout` for
/// both together.
pub fn join_two<A, B, FA, FB>(
    a: FA,
    b: FB,
    timeout: Duration,
) -> (BranchOutcome<A>, BranchOutcome<B>)
where
    A: Send + 'static,
    B: Send + 'static,
    FA: FnOnce() -> A + Send + 'static,
    FB: FnOnce() -> B + Send + 'static,
{
    let deadline = Instant::now() + timeout;
    let rx_a = spawn_branch("confluence-join-a", a);
    let rx_b = spawn_branch("confluence-join-b", b);
    (wait_until(&rx_a, deadline), wait_until(&rx_b, deadline))
}

fn spawn_branch<T, F>(name: &str, f: F) -> Receiver<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new().name(name.into()).spawn(move || {
        let _ = tx.send(f());
    });
    // On failure the sender is dropped with the closure and the branch
    // reads as timed out.
    if let Err(e) = spawned {
        tracing::error!(branch = name, error = %e, "failed to spawn branch thread");
    }
    rx
}

fn wait_until<T>(rx: &Receiver<T>, deadline: Instant) -> BranchOutcome<T> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    match rx.recv_timeout(remaining) {
        Ok(value) => BranchOutcome::Completed(value),
        Err(_) => BranchOutcome::TimedOut,
    }
}

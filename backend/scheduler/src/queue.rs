use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use spamshot_core::SpamshotError;
use tracing::{debug, error, info, warn};

/// One queued unit of work with its own progress channel.
#[async_trait]
pub trait Submission: Send + Sync + 'static {
    /// Identifier used in logs.
    fn id(&self) -> String;

    /// Tell the submitter how many runs are ahead of theirs (1 = next).
    async fn notify_position(&self, position: usize);
}

/// Runs the per-image pipeline for a submission.
#[async_trait]
pub trait SubmissionHandler<S: Submission>: Send + Sync + 'static {
    async fn run(&self, submission: Arc<S>) -> Result<(), SpamshotError>;

    /// Report a failed run back to its submitter.
    async fn report_failure(&self, submission: &S, error: &SpamshotError);
}

/// What `submit` did with a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The queue was idle; a worker was started for this entry.
    Started,
    /// The entry waits behind `position` runs (1 = next).
    Queued { position: usize },
}

struct QueueEntry<S> {
    seq: u64,
    submission: Arc<S>,
    /// Last position sent to the submitter; 0 until the first update.
    position: usize,
}

#[derive(Default)]
struct QueueStats {
    completed: u64,
    failed: u64,
}

struct QueueState<S> {
    pending: VecDeque<QueueEntry<S>>,
    /// True while a worker task owns the queue.
    worker_active: bool,
    /// Sequence number of the entry currently running.
    current: Option<u64>,
    next_seq: u64,
    stats: QueueStats,
}

struct QueueInner<S: Submission> {
    state: Mutex<QueueState<S>>,
    /// Serializes position broadcasts so submitters never see them out of order.
    notify_gate: tokio::sync::Mutex<()>,
    handler: Arc<dyn SubmissionHandler<S>>,
    run_timeout: Option<Duration>,
}

impl<S: Submission> QueueInner<S> {
    fn lock_state(&self) -> MutexGuard<'_, QueueState<S>> {
        // Never held across an await, so a poisoned lock only means a panic
        // between two plain field updates.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Strict FIFO, single-worker submission queue.
///
/// At most one submission runs at a time, in arrival order. Every time the
/// running entry changes, each waiting entry is told its new position. A
/// failed, panicked, or timed-out run is reported to its own submitter and the
/// worker moves on.
pub struct SubmissionQueue<S: Submission> {
    inner: Arc<QueueInner<S>>,
}

impl<S: Submission> Clone for SubmissionQueue<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Submission> SubmissionQueue<S> {
    /// Create an idle queue. With `run_timeout` set, a run that exceeds it
    /// fails with [`SpamshotError::Timeout`] and the queue advances.
    pub fn new(handler: Arc<dyn SubmissionHandler<S>>, run_timeout: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    worker_active: false,
                    current: None,
                    next_seq: 0,
                    stats: QueueStats::default(),
                }),
                notify_gate: tokio::sync::Mutex::new(()),
                handler,
                run_timeout,
            }),
        }
    }

    /// Append a submission, starting the worker if the queue is idle.
    ///
    /// Returns without waiting for the run or for any progress message. A
    /// submission that has to wait is told its position from a separate task.
    pub async fn submit(&self, submission: S) -> Admission {
        let submission = Arc::new(submission);
        let (seq, start_worker, ahead) = {
            let mut state = self.inner.lock_state();
            let seq = state.next_seq;
            state.next_seq += 1;
            state.pending.push_back(QueueEntry {
                seq,
                submission: Arc::clone(&submission),
                position: 0,
            });
            let start_worker = !state.worker_active;
            state.worker_active = true;
            let ahead = state.pending.len() - 1 + usize::from(state.current.is_some());
            (seq, start_worker, ahead)
        };

        info!(submission = %submission.id(), seq, "Submission admitted");

        if start_worker {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { drain(inner).await });
            return Admission::Started;
        }
        if ahead == 0 {
            // Head of the queue while the worker is between runs.
            return Admission::Started;
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { announce_position(inner, seq).await });
        Admission::Queued { position: ahead }
    }

    /// Number of entries waiting (not counting the running one).
    pub fn pending_len(&self) -> usize {
        self.inner.lock_state().pending.len()
    }

    /// True while a run is in progress.
    pub fn is_running(&self) -> bool {
        self.inner.lock_state().current.is_some()
    }

    /// Finished runs as `(completed, failed)`.
    pub fn totals(&self) -> (u64, u64) {
        let state = self.inner.lock_state();
        (state.stats.completed, state.stats.failed)
    }
}

/// Send a newly queued entry its position, unless the worker already has.
async fn announce_position<S: Submission>(inner: Arc<QueueInner<S>>, seq: u64) {
    let _gate = inner.notify_gate.lock().await;
    let target = {
        let mut state = inner.lock_state();
        // Between runs the worker broadcasts on its next pick.
        if state.current.is_none() {
            return;
        }
        state
            .pending
            .iter_mut()
            .enumerate()
            .find(|(_, entry)| entry.seq == seq)
            .and_then(|(i, entry)| {
                if entry.position == i + 1 {
                    return None;
                }
                entry.position = i + 1;
                Some((Arc::clone(&entry.submission), entry.position))
            })
    };

    if let Some((submission, position)) = target {
        submission.notify_position(position).await;
    }
}

/// Worker loop: pop the head, broadcast positions, run, repeat until empty.
async fn drain<S: Submission>(inner: Arc<QueueInner<S>>) {
    debug!("Queue worker started");
    loop {
        let entry = {
            let _gate = inner.notify_gate.lock().await;
            let (entry, waiting) = {
                let mut state = inner.lock_state();
                let Some(entry) = state.pending.pop_front() else {
                    state.worker_active = false;
                    state.current = None;
                    debug!("Queue drained, worker idle");
                    return;
                };
                state.current = Some(entry.seq);
                let waiting: Vec<(Arc<S>, usize)> = state
                    .pending
                    .iter_mut()
                    .enumerate()
                    .map(|(i, queued)| {
                        queued.position = i + 1;
                        (Arc::clone(&queued.submission), queued.position)
                    })
                    .collect();
                (entry, waiting)
            };

            for (submission, position) in waiting {
                submission.notify_position(position).await;
            }
            entry
        };

        let id = entry.submission.id();
        info!(submission = %id, seq = entry.seq, "Run started");

        let outcome = run_one(&inner, Arc::clone(&entry.submission)).await;
        let failed = outcome.is_err();
        if let Err(err) = outcome {
            warn!(submission = %id, category = err.category(), error = %err, "Run failed");
            inner.handler.report_failure(&entry.submission, &err).await;
        } else {
            info!(submission = %id, "Run completed");
        }

        let mut state = inner.lock_state();
        state.current = None;
        if failed {
            state.stats.failed += 1;
        } else {
            state.stats.completed += 1;
        }
        debug!(submission = %id, seq = entry.seq, "Entry finished");
    }
}

/// Run one submission on its own task so a panic cannot take the worker down.
async fn run_one<S: Submission>(
    inner: &QueueInner<S>,
    submission: Arc<S>,
) -> Result<(), SpamshotError> {
    let handler = Arc::clone(&inner.handler);
    let mut task = tokio::spawn(async move { handler.run(submission).await });

    let joined = match inner.run_timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                task.abort();
                return Err(SpamshotError::Timeout(limit.as_secs()));
            }
        },
        None => task.await,
    };

    match joined {
        Ok(result) => result,
        Err(join_err) => {
            error!(error = %join_err, "Run task aborted");
            Err(SpamshotError::Other(anyhow::anyhow!("run crashed: {join_err}")))
        }
    }
}

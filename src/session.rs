//! The selection pipeline between the UI and the statistics.
//!
//! Location/date selections are coalesced over the debounce window, numbered, and
//! turned into either a fetch (new location) or an immediate recompute (same
//! location, new date). Only the result of the newest selection is ever published.

use crate::config::ClimateConfig;
use crate::error::ClimateError;
use crate::report::{ClimateReport, ClimateSnapshot};
use crate::types::location::Location;
use crate::types::period::parse_iso_date;
use crate::types::raw_series::RawSeries;
use chrono::NaiveDate;
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Anything that can produce the raw store for a location.
pub trait HistoricalSource: Send + Sync + 'static {
    fn load(
        &self,
        location: &Location,
    ) -> impl Future<Output = Result<Arc<RawSeries>, ClimateError>> + Send;
}

/// A place and a target date picked by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub location: Location,
    pub date: NaiveDate,
}

impl Selection {
    pub fn new(location: Location, date: NaiveDate) -> Self {
        Self { location, date }
    }

    /// Builds a selection from the date picker's `YYYY-MM-DD` string.
    pub fn parse(location: Location, date: &str) -> Result<Self, ClimateError> {
        let date = parse_iso_date(date).ok_or_else(|| ClimateError::InvalidDate(date.to_string()))?;
        Ok(Self { location, date })
    }
}

/// What the rendering layer should currently show.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionView {
    Idle,
    Loading { sequence: u64 },
    Ready { sequence: u64, report: Arc<ClimateReport> },
    /// The fetch for this selection failed; distinct from a sparse but successful fetch.
    Failed { sequence: u64, message: String },
}

impl SessionView {
    pub fn sequence(&self) -> Option<u64> {
        match self {
            SessionView::Idle => None,
            SessionView::Loading { sequence }
            | SessionView::Ready { sequence, .. }
            | SessionView::Failed { sequence, .. } => Some(*sequence),
        }
    }

    /// `true` for `Ready` and `Failed`.
    pub fn is_settled(&self) -> bool {
        matches!(self, SessionView::Ready { .. } | SessionView::Failed { .. })
    }

    pub fn report(&self) -> Option<&Arc<ClimateReport>> {
        match self {
            SessionView::Ready { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Front end of a running session. Cloning it gives another sender into the same worker.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    selections: mpsc::UnboundedSender<Selection>,
    view: watch::Receiver<SessionView>,
}

impl SessionHandle {
    pub fn select(&self, selection: Selection) -> Result<(), ClimateError> {
        self.selections
            .send(selection)
            .map_err(|_| ClimateError::SessionClosed)
    }

    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    /// Waits until a selection numbered `sequence` or later has settled.
    /// Returns `None` once the worker is gone.
    pub async fn settled_after(&mut self, sequence: u64) -> Option<SessionView> {
        self.view
            .wait_for(|v| v.is_settled() && v.sequence().is_some_and(|s| s >= sequence))
            .await
            .ok()
            .map(|v| v.clone())
    }
}

struct Completion {
    fetch_id: u64,
    location: Location,
    result: Result<Arc<RawSeries>, ClimateError>,
}

/// The fetch currently allowed to publish, and the newest selection waiting on it.
struct PendingFetch {
    fetch_id: u64,
    location: Location,
    sequence: u64,
    date: NaiveDate,
    token: CancellationToken,
}

pub struct ClimateSession<S> {
    source: Arc<S>,
    config: ClimateConfig,
    selections: mpsc::UnboundedReceiver<Selection>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    view: watch::Sender<SessionView>,
    sequence: u64,
    snapshot: Option<ClimateSnapshot>,
    pending: Option<PendingFetch>,
}

impl<S: HistoricalSource> ClimateSession<S> {
    /// Starts the worker on the current tokio runtime.
    ///
    /// The worker stops when every [`SessionHandle`] has been dropped.
    pub fn spawn(source: Arc<S>, config: ClimateConfig) -> (SessionHandle, JoinHandle<()>) {
        let (selections_tx, selections) = mpsc::unbounded_channel();
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (view, view_rx) = watch::channel(SessionView::Idle);

        let session = ClimateSession {
            source,
            config,
            selections,
            completions_tx,
            completions,
            view,
            sequence: 0,
            snapshot: None,
            pending: None,
        };
        let worker = tokio::spawn(session.run());
        (
            SessionHandle {
                selections: selections_tx,
                view: view_rx,
            },
            worker,
        )
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                received = self.selections.recv() => {
                    let Some(first) = received else { break };
                    let (selection, open) = self.coalesce(first).await;
                    self.apply(selection);
                    if !open {
                        break;
                    }
                }
                Some(completion) = self.completions.recv() => self.complete(completion),
            }
        }
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
        }
        debug!("Session worker stopped after {} selections", self.sequence);
    }

    /// Keeps taking selections until none arrives within the debounce window.
    /// The flag is `false` when the channel closed meanwhile.
    async fn coalesce(&mut self, first: Selection) -> (Selection, bool) {
        let window: Duration = self.config.debounce();
        let mut latest = first;
        loop {
            match tokio::time::timeout(window, self.selections.recv()).await {
                Ok(Some(next)) => {
                    debug!("Coalescing selection for {}", latest.location);
                    latest = next;
                }
                Ok(None) => return (latest, false),
                Err(_) => return (latest, true),
            }
        }
    }

    fn apply(&mut self, selection: Selection) {
        self.sequence += 1;
        let sequence = self.sequence;

        if let Some(pending) = self.pending.as_mut() {
            if pending.location.same_place(&selection.location) {
                // same place already loading: retarget it instead of refetching
                pending.sequence = sequence;
                pending.location = selection.location;
                pending.date = selection.date;
                self.view.send_replace(SessionView::Loading { sequence });
                return;
            }
        }

        if let Some(pending) = self.pending.take() {
            debug!("Cancelling fetch for {}", pending.location);
            pending.token.cancel();
        }

        if let Some(snapshot) = self.snapshot.as_mut() {
            if snapshot.location.same_place(&selection.location) {
                snapshot.location = selection.location;
                let report = ClimateReport::build(snapshot, selection.date, &self.config);
                self.view.send_replace(SessionView::Ready {
                    sequence,
                    report: Arc::new(report),
                });
                return;
            }
        }

        let token = CancellationToken::new();
        self.pending = Some(PendingFetch {
            fetch_id: sequence,
            location: selection.location.clone(),
            sequence,
            date: selection.date,
            token: token.clone(),
        });
        self.view.send_replace(SessionView::Loading { sequence });

        let source = Arc::clone(&self.source);
        let completions = self.completions_tx.clone();
        let location = selection.location;
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => Err(ClimateError::Cancelled),
                loaded = source.load(&location) => loaded,
            };
            // the worker may already be gone
            let _ = completions.send(Completion {
                fetch_id: sequence,
                location,
                result,
            });
        });
    }

    fn complete(&mut self, completion: Completion) {
        let is_current = self
            .pending
            .as_ref()
            .is_some_and(|p| p.fetch_id == completion.fetch_id);
        if !is_current {
            debug!(
                "Dropping stale result for {} (fetch {})",
                completion.location, completion.fetch_id
            );
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        match completion.result {
            Ok(raw) => {
                let snapshot = ClimateSnapshot::new(pending.location, raw);
                let report = ClimateReport::build(&snapshot, pending.date, &self.config);
                self.snapshot = Some(snapshot);
                self.view.send_replace(SessionView::Ready {
                    sequence: pending.sequence,
                    report: Arc::new(report),
                });
            }
            Err(e) => {
                warn!("Fetch for {} failed: {}", completion.location, e);
                self.view.send_replace(SessionView::Failed {
                    sequence: pending.sequence,
                    message: e.to_string(),
                });
            }
        }
    }
}

use std::collections::HashSet;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::binding::ResultRow;
use crate::cache::ModeCache;
use crate::domain::VisMode;
use crate::error::VisError;
use crate::orthologs::{OrthologPair, ortholog_pairs};
use crate::queries::{ortholog_pairs_query, query_for};
use crate::reshape::{Pipeline, Visualization};
use crate::sparql::SparqlClient;

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn event(&self, _event: ProgressEvent) {}
}

pub trait RenderAdapter {
    fn render(&self, mode: VisMode, view: &Visualization) -> Result<(), VisError>;
}

#[derive(Debug, Clone)]
pub enum ViewState {
    Idle,
    Loading(VisMode),
    Ready {
        mode: VisMode,
        view: Arc<Visualization>,
    },
    Error {
        mode: VisMode,
        error: Arc<VisError>,
    },
}

impl ViewState {
    pub fn mode(&self) -> Option<VisMode> {
        match self {
            ViewState::Idle => None,
            ViewState::Loading(mode)
            | ViewState::Ready { mode, .. }
            | ViewState::Error { mode, .. } => Some(*mode),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready { .. })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PrefetchReport {
    pub completed: Vec<VisMode>,
    pub skipped: Vec<VisMode>,
    pub failed: Vec<PrefetchFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrefetchFailure {
    pub mode: VisMode,
    pub message: String,
}

#[derive(Default)]
struct InFlight {
    modes: Mutex<HashSet<VisMode>>,
    done: Condvar,
}

struct Claim<'a> {
    inflight: &'a InFlight,
    mode: VisMode,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        let mut modes = self
            .inflight
            .modes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        modes.remove(&self.mode);
        self.inflight.done.notify_all();
    }
}

/// At most one request per mode is outstanding across clones; a second
/// caller waits for it and then reads the cache. If that request failed the
/// waiter issues its own.
pub struct Fetcher<C: SparqlClient> {
    client: Arc<C>,
    cache: Arc<ModeCache>,
    inflight: Arc<InFlight>,
}

impl<C: SparqlClient> Clone for Fetcher<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            cache: Arc::clone(&self.cache),
            inflight: Arc::clone(&self.inflight),
        }
    }
}

impl<C: SparqlClient> Fetcher<C> {
    pub fn new(client: Arc<C>, cache: Arc<ModeCache>) -> Self {
        Self {
            client,
            cache,
            inflight: Arc::default(),
        }
    }

    pub fn cache(&self) -> &Arc<ModeCache> {
        &self.cache
    }

    pub fn rows(&self, mode: VisMode) -> Result<Arc<Vec<ResultRow>>, VisError> {
        let _claim = loop {
            if let Some(rows) = self.cache.rows(mode) {
                debug!(%mode, rows = rows.len(), "rows served from cache");
                return Ok(rows);
            }
            let mut modes = self
                .inflight
                .modes
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if modes.insert(mode) {
                break Claim {
                    inflight: &self.inflight,
                    mode,
                };
            }
            debug!(%mode, "waiting for in-flight request");
            while modes.contains(&mode) {
                modes = self
                    .inflight
                    .done
                    .wait(modes)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
        };

        let rows = Arc::new(self.client.select(mode.as_str(), &query_for(mode))?);
        self.cache.store_rows(mode, Arc::clone(&rows));
        Ok(rows)
    }

    pub fn refetch(&self, mode: VisMode) -> Result<Arc<Vec<ResultRow>>, VisError> {
        self.cache.invalidate(mode);
        self.rows(mode)
    }

    pub fn ortholog_pairs(&self) -> Result<Vec<OrthologPair>, VisError> {
        let rows = self.client.select("pairs", &ortholog_pairs_query())?;
        Ok(ortholog_pairs(&rows))
    }
}

pub struct Orchestrator<C: SparqlClient> {
    fetcher: Fetcher<C>,
    pipeline: Pipeline,
    state: Mutex<ViewState>,
}

impl<C: SparqlClient + 'static> Orchestrator<C> {
    pub fn new(client: C, pipeline: Pipeline) -> Self {
        Self::with_cache(Arc::new(client), Arc::new(ModeCache::new()), pipeline)
    }

    pub fn with_cache(client: Arc<C>, cache: Arc<ModeCache>, pipeline: Pipeline) -> Self {
        Self {
            fetcher: Fetcher::new(client, cache),
            pipeline,
            state: Mutex::new(ViewState::Idle),
        }
    }

    pub fn fetcher(&self) -> &Fetcher<C> {
        &self.fetcher
    }

    pub fn cache(&self) -> &Arc<ModeCache> {
        self.fetcher.cache()
    }

    pub fn state(&self) -> ViewState {
        self.lock_state().clone()
    }

    pub fn switch_mode(&self, mode: VisMode, sink: &dyn ProgressSink) -> ViewState {
        if let Some(view) = self.fetcher.cache().processed(mode) {
            let fetched_at = self
                .cache()
                .entry(mode)
                .and_then(|entry| entry.fetched_at)
                .map(|at| at.to_rfc3339());
            debug!(%mode, fetched_at = ?fetched_at, "processed view served from cache");
            sink.event(ProgressEvent {
                message: format!("phase=Render; mode={mode}; cached"),
                elapsed: None,
            });
            return self.set_state(ViewState::Ready { mode, view });
        }

        self.set_state(ViewState::Loading(mode));
        match run_pipeline(&self.fetcher, &self.pipeline, mode, sink) {
            Ok(view) => {
                sink.event(ProgressEvent {
                    message: format!("phase=Render; mode={mode}; kind={}", view.kind()),
                    elapsed: None,
                });
                self.set_state(ViewState::Ready { mode, view })
            }
            Err(err) => {
                warn!(%mode, error = %err, "mode switch failed");
                self.set_state(ViewState::Error {
                    mode,
                    error: Arc::new(err),
                })
            }
        }
    }

    pub fn refresh(&self, mode: VisMode, sink: &dyn ProgressSink) -> ViewState {
        self.fetcher.cache().invalidate(mode);
        self.switch_mode(mode, sink)
    }

    pub fn dismiss(&self) -> ViewState {
        let mut state = self.lock_state();
        if matches!(*state, ViewState::Error { .. }) {
            *state = ViewState::Idle;
        }
        state.clone()
    }

    pub fn prefetch(&self, modes: &[VisMode]) -> JoinHandle<PrefetchReport> {
        let fetcher = self.fetcher.clone();
        let pipeline = self.pipeline;
        let modes = modes.to_vec();
        thread::spawn(move || {
            let mut report = PrefetchReport::default();
            for mode in modes {
                if fetcher.cache().processed(mode).is_some() {
                    report.skipped.push(mode);
                    continue;
                }
                match run_pipeline(&fetcher, &pipeline, mode, &NoProgress) {
                    Ok(_) => {
                        debug!(%mode, "prefetched");
                        report.completed.push(mode);
                    }
                    Err(err) => {
                        warn!(%mode, error = %err, "background prefetch failed");
                        report.failed.push(PrefetchFailure {
                            mode,
                            message: err.to_string(),
                        });
                    }
                }
            }
            report
        })
    }

    fn set_state(&self, next: ViewState) -> ViewState {
        let mut state = self.lock_state();
        *state = next;
        state.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, ViewState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn run_pipeline<C: SparqlClient>(
    fetcher: &Fetcher<C>,
    pipeline: &Pipeline,
    mode: VisMode,
    sink: &dyn ProgressSink,
) -> Result<Arc<Visualization>, VisError> {
    sink.event(ProgressEvent {
        message: format!("phase=Fetch; mode={mode}"),
        elapsed: None,
    });
    let start = Instant::now();
    let rows = fetcher.rows(mode)?;
    sink.event(ProgressEvent {
        message: format!("phase=Normalize; mode={mode}; rows={}", rows.len()),
        elapsed: Some(start.elapsed()),
    });

    let start = Instant::now();
    let view = Arc::new(pipeline.process(mode, &rows));
    sink.event(ProgressEvent {
        message: format!("phase=Reshape; mode={mode}; kind={}", view.kind()),
        elapsed: Some(start.elapsed()),
    });
    info!(%mode, rows = rows.len(), kind = view.kind(), "mode ready");

    fetcher.cache().store_processed(mode, Arc::clone(&view));
    Ok(view)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;

    use super::*;

    struct CountingClient {
        calls: AtomicUsize,
    }

    impl SparqlClient for CountingClient {
        fn select(&self, _label: &str, _query: &str) -> Result<Vec<ResultRow>, VisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                ResultRow::new()
                    .with("speciesLabel", "house mouse")
                    .with("orthologCount", "12"),
            ])
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        messages: Mutex<Vec<String>>,
    }

    impl ProgressSink for RecordingSink {
        fn event(&self, event: ProgressEvent) {
            self.messages.lock().unwrap().push(event.message);
        }
    }

    #[test]
    fn phases_run_in_order() {
        let orchestrator = Orchestrator::new(
            CountingClient {
                calls: AtomicUsize::new(0),
            },
            Pipeline::default(),
        );
        let sink = RecordingSink::default();
        let state = orchestrator.switch_mode(VisMode::Bar, &sink);
        assert_matches!(state, ViewState::Ready { mode: VisMode::Bar, .. });

        let phases: Vec<String> = sink
            .messages
            .lock()
            .unwrap()
            .iter()
            .map(|message| message.split(';').next().unwrap().to_string())
            .collect();
        assert_eq!(
            phases,
            vec!["phase=Fetch", "phase=Normalize", "phase=Reshape", "phase=Render"]
        );
    }

    #[test]
    fn fetcher_refetch_bypasses_cache() {
        let client = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
        });
        let fetcher = Fetcher::new(Arc::clone(&client), Arc::new(ModeCache::new()));
        fetcher.rows(VisMode::Bar).unwrap();
        fetcher.rows(VisMode::Bar).unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        fetcher.refetch(VisMode::Bar).unwrap();
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dismiss_only_leaves_error() {
        let orchestrator = Orchestrator::new(
            CountingClient {
                calls: AtomicUsize::new(0),
            },
            Pipeline::default(),
        );
        assert_matches!(orchestrator.dismiss(), ViewState::Idle);
        orchestrator.switch_mode(VisMode::Bar, &NoProgress);
        assert!(orchestrator.dismiss().is_ready());
    }
}

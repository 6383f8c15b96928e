//! Channel indexer: the windowed backward sweep.
//!
//! A run walks a channel's history from a caller-supplied upper message id
//! down to id 1 in fixed-size windows:
//! - Fetching: honor cancellation, compute the next window, fetch it
//! - Processing: extract media and dedup against the working catalog
//! - Persisting: write the catalog back, pause, advance the offset
//!
//! The catalog is persisted on every exit path so a partial run keeps what
//! it found.

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{CatalogStore, Category, Insertion, MediaRecord, WorkingCatalog};
use crate::config::ChannelsConfig;
use crate::metrics;
use crate::source::{extract_media, ChannelRef, ExtractedMedia, MessageSource, SourceMessage};

use super::config::IndexerConfig;
use super::notifier::{ProgressEvent, ProgressNotifier};
use super::session::IndexSession;
use super::types::{IndexError, IndexOutcome, IndexRequest, RunPermit, SingleOutcome};
use super::window::window_at;

/// How a sweep ended, before the final persist.
#[derive(Debug)]
enum Termination {
    Exhausted,
    Canceled,
    Failed(IndexError),
}

#[derive(Debug)]
enum SweepState {
    Fetching,
    Processing(Vec<Option<SourceMessage>>),
    Persisting,
    Finished(Termination),
}

/// Per-run bookkeeping.
struct SweepRun {
    run_id: Uuid,
    request: IndexRequest,
    offset: u64,
    window: Option<Range<i64>>,
    catalog: WorkingCatalog,
    found: usize,
}

/// Indexes configured channels into the catalog, one run at a time.
pub struct ChannelIndexer {
    config: IndexerConfig,
    channels: ChannelsConfig,
    catalog: Arc<dyn CatalogStore>,
    source: Arc<dyn MessageSource>,
    session: Arc<IndexSession>,
    run_lock: Arc<Mutex<()>>,
}

impl ChannelIndexer {
    pub fn new(
        config: IndexerConfig,
        channels: ChannelsConfig,
        catalog: Arc<dyn CatalogStore>,
        source: Arc<dyn MessageSource>,
        session: Arc<IndexSession>,
    ) -> Self {
        Self {
            config,
            channels,
            catalog,
            source,
            session,
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn session(&self) -> &Arc<IndexSession> {
        &self.session
    }

    pub fn channels(&self) -> &ChannelsConfig {
        &self.channels
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Whether a run (or single-message operation) currently holds the lock.
    pub fn is_running(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }

    /// Validate a request and wait for the run lock.
    ///
    /// Taking the lock clears any cancel left over from an earlier run, so a
    /// cancel issued after this returns applies to the new run.
    pub async fn begin(&self, request: IndexRequest) -> Result<RunPermit, IndexError> {
        self.authorize(&request)?;
        let guard = self.run_lock.clone().lock_owned().await;
        self.session.reset_cancel();
        Ok(RunPermit { guard, request })
    }

    /// Validate a request and take the run lock, or fail with
    /// [`IndexError::AlreadyRunning`] if another run holds it.
    pub fn try_begin(&self, request: IndexRequest) -> Result<RunPermit, IndexError> {
        self.authorize(&request)?;
        let guard = self
            .run_lock
            .clone()
            .try_lock_owned()
            .map_err(|_| IndexError::AlreadyRunning)?;
        self.session.reset_cancel();
        Ok(RunPermit { guard, request })
    }

    /// Index a channel, waiting for any active run to finish first.
    ///
    /// Validation and authorization failures are returned as `Err` before
    /// anything is loaded or fetched. Everything after that is reported
    /// through the returned [`IndexOutcome`].
    pub async fn index(
        &self,
        request: IndexRequest,
        notifier: &dyn ProgressNotifier,
    ) -> Result<IndexOutcome, IndexError> {
        let permit = self.begin(request).await?;
        Ok(self.run(permit, notifier).await)
    }

    /// Like [`index`](Self::index) but rejects instead of waiting.
    pub async fn try_index(
        &self,
        request: IndexRequest,
        notifier: &dyn ProgressNotifier,
    ) -> Result<IndexOutcome, IndexError> {
        let permit = self.try_begin(request)?;
        Ok(self.run(permit, notifier).await)
    }

    /// Execute a run on a background task.
    pub fn spawn(
        self: &Arc<Self>,
        permit: RunPermit,
        notifier: Arc<dyn ProgressNotifier>,
    ) -> JoinHandle<IndexOutcome> {
        let indexer = Arc::clone(self);
        tokio::spawn(async move { indexer.run(permit, notifier.as_ref()).await })
    }

    /// Execute a run. The permit's lock is released when this returns.
    pub async fn run(&self, permit: RunPermit, notifier: &dyn ProgressNotifier) -> IndexOutcome {
        let RunPermit {
            guard: _guard,
            request,
        } = permit;
        let started = Instant::now();

        let offset = self.session.resume_offset();
        let records = self.catalog.load(request.category);

        let mut run = SweepRun {
            run_id: Uuid::new_v4(),
            request,
            offset,
            window: None,
            catalog: WorkingCatalog::from_records(request.category, records),
            found: 0,
        };

        info!(
            run_id = %run.run_id,
            channel = %request.channel,
            category = %request.category,
            upper = request.upper_message_id,
            offset,
            existing = run.catalog.len(),
            "Starting index run"
        );
        notifier
            .notify(&ProgressEvent::Started {
                run_id: run.run_id,
                channel: request.channel,
                category: request.category,
                upper_message_id: request.upper_message_id,
                resume_offset: offset,
            })
            .await;

        let mut state = SweepState::Fetching;
        let outcome = loop {
            state = match state {
                SweepState::Fetching => self.fetch_window(&mut run).await,
                SweepState::Processing(slots) => self.process_window(&mut run, slots, notifier).await,
                SweepState::Persisting => self.persist_window(&mut run).await,
                SweepState::Finished(termination) => break self.finish(&run, termination),
            };
        };

        metrics::INDEX_RUNS
            .with_label_values(&[outcome.label()])
            .inc();
        metrics::INDEX_RUN_DURATION
            .with_label_values(&[outcome.label()])
            .observe(started.elapsed().as_secs_f64());

        match &outcome {
            IndexOutcome::Failed { error, found } => warn!(
                run_id = %run.run_id,
                found = *found,
                window = ?run.window,
                "Index run failed: {}",
                error
            ),
            _ => info!(
                run_id = %run.run_id,
                found = outcome.found(),
                outcome = outcome.label(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Index run finished"
            ),
        }

        notifier.notify(&terminal_event(&run, &outcome)).await;
        outcome
    }

    async fn fetch_window(&self, run: &mut SweepRun) -> SweepState {
        if self.session.is_cancel_requested() {
            info!(run_id = %run.run_id, "Cancel requested, stopping at window boundary");
            return SweepState::Finished(Termination::Canceled);
        }

        let Some(window) = window_at(
            run.request.upper_message_id,
            run.offset,
            self.config.window_size,
        ) else {
            return SweepState::Finished(Termination::Exhausted);
        };

        debug!(run_id = %run.run_id, start = window.start, end = window.end, "Fetching window");
        run.window = Some(window.clone());

        match self.source.fetch_range(run.request.channel, window).await {
            Ok(slots) if slots.iter().all(Option::is_none) => {
                debug!(run_id = %run.run_id, "Window returned nothing, history exhausted");
                SweepState::Finished(Termination::Exhausted)
            }
            Ok(slots) => {
                metrics::WINDOWS_FETCHED.inc();
                SweepState::Processing(slots)
            }
            Err(e) => {
                metrics::SOURCE_ERRORS.inc();
                SweepState::Finished(Termination::Failed(e.into()))
            }
        }
    }

    async fn process_window(
        &self,
        run: &mut SweepRun,
        slots: Vec<Option<SourceMessage>>,
        notifier: &dyn ProgressNotifier,
    ) -> SweepState {
        let progress_every = self.config.progress_every.max(1) as usize;

        for message in slots.into_iter().flatten() {
            let Some(media) = extract_media(&message) else {
                continue;
            };
            if run.catalog.insert(media.title, media.file_id) == Insertion::Duplicate {
                continue;
            }

            run.found += 1;
            metrics::FILES_INDEXED
                .with_label_values(&[run.request.category.slug()])
                .inc();

            if run.found % progress_every == 0 {
                notifier
                    .notify(&ProgressEvent::Progress {
                        run_id: run.run_id,
                        category: run.request.category,
                        found: run.found,
                    })
                    .await;
            }
        }

        SweepState::Persisting
    }

    async fn persist_window(&self, run: &mut SweepRun) -> SweepState {
        if let Err(e) = self
            .catalog
            .save(run.request.category, run.catalog.records())
        {
            return SweepState::Finished(Termination::Failed(e.into()));
        }

        if self.config.window_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.window_delay_ms)).await;
        }
        run.offset += u64::from(self.config.window_size);
        SweepState::Fetching
    }

    /// Final persist, then map the termination to an outcome.
    fn finish(&self, run: &SweepRun, termination: Termination) -> IndexOutcome {
        let saved = self
            .catalog
            .save(run.request.category, run.catalog.records());
        let found = run.found;

        match (termination, saved) {
            (Termination::Exhausted, Ok(())) => IndexOutcome::Completed { found },
            (Termination::Canceled, Ok(())) => IndexOutcome::Canceled { found },
            (Termination::Exhausted | Termination::Canceled, Err(e)) => IndexOutcome::Failed {
                error: e.into(),
                found,
            },
            (Termination::Failed(error), saved) => {
                if let Err(e) = saved {
                    warn!(run_id = %run.run_id, "Failed to persist catalog after error: {}", e);
                }
                IndexOutcome::Failed { error, found }
            }
        }
    }

    /// Index one message from a configured channel.
    pub async fn index_single(
        &self,
        channel: ChannelRef,
        message_id: i64,
    ) -> Result<SingleOutcome, IndexError> {
        let category = self.channels.category_of(channel).ok_or_else(|| {
            IndexError::Authorization(format!("channel {} is not configured", channel))
        })?;
        if message_id < 1 {
            return Err(IndexError::Validation(format!(
                "message id must be positive, got {}",
                message_id
            )));
        }

        let _guard = self.run_lock.lock().await;
        let slots = self
            .source
            .fetch_range(channel, message_id..message_id + 1)
            .await?;

        let Some(media) = slots.into_iter().flatten().find_map(|m| extract_media(&m)) else {
            return Ok(SingleOutcome::NoMedia);
        };
        self.store_one(category, media)
    }

    /// Add a media file received directly (for example a manual upload).
    pub async fn add_media(
        &self,
        category: Category,
        media: ExtractedMedia,
    ) -> Result<SingleOutcome, IndexError> {
        if media.file_id.trim().is_empty() {
            return Err(IndexError::Validation("file id must not be empty".to_string()));
        }
        let _guard = self.run_lock.lock().await;
        self.store_one(category, media)
    }

    /// Reset a category's catalog. Holds the run lock for the whole clear so
    /// a sweep cannot write an older snapshot back over it.
    pub fn clear_catalog(&self, category: Category) -> Result<(), IndexError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| IndexError::AlreadyRunning)?;
        self.catalog.clear(category)?;
        info!(category = %category, "Catalog cleared");
        Ok(())
    }

    fn store_one(
        &self,
        category: Category,
        media: ExtractedMedia,
    ) -> Result<SingleOutcome, IndexError> {
        let mut catalog = WorkingCatalog::from_records(category, self.catalog.load(category));

        if let Some(existing) = catalog.get(&media.file_id) {
            return Ok(SingleOutcome::Duplicate(existing.clone()));
        }

        let record = MediaRecord::new(media.title.clone(), media.file_id.clone(), category);
        catalog.insert(media.title, media.file_id);
        self.catalog.save(category, catalog.records())?;

        metrics::FILES_INDEXED
            .with_label_values(&[category.slug()])
            .inc();
        info!(category = %category, file_id = %record.file_id, "Added single media file");
        Ok(SingleOutcome::Added(record))
    }

    fn authorize(&self, request: &IndexRequest) -> Result<(), IndexError> {
        if request.upper_message_id < 1 {
            return Err(IndexError::Validation(format!(
                "last message id must be positive, got {}",
                request.upper_message_id
            )));
        }
        if !self
            .channels
            .is_authorized(request.channel, request.category)
        {
            return Err(IndexError::Authorization(format!(
                "channel {} is not configured for {}",
                request.channel, request.category
            )));
        }
        Ok(())
    }
}

fn terminal_event(run: &SweepRun, outcome: &IndexOutcome) -> ProgressEvent {
    let run_id = run.run_id;
    let category = run.request.category;
    match outcome {
        IndexOutcome::Completed { found } => ProgressEvent::Completed {
            run_id,
            category,
            found: *found,
        },
        IndexOutcome::Canceled { found } => ProgressEvent::Canceled {
            run_id,
            category,
            found: *found,
        },
        IndexOutcome::Failed { error, found } => ProgressEvent::Failed {
            run_id,
            category,
            found: *found,
            error: error.to_string(),
        },
    }
}

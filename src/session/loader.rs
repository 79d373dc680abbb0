//! Asynchronous decode orchestration with stale-result discard.

use crate::geometry::{decode_collection, mark_active, ActivityCollection};
use crate::import::DecodeOptions;
use crate::session::store::FileStore;
use crossbeam::channel::{Receiver, Sender};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Loader lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderEvent {
    /// A decode pass finished and its collections were published.
    CollectionsUpdated { generation: u64 },
    /// A decode pass finished after the file set had already moved on.
    ResultDiscarded { generation: u64 },
}

/// Outcome of one refresh call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Published,
    Stale,
}

/// Errors from the decode dispatch layer.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Decode task failed: {0}")]
    TaskFailed(String),
}

#[derive(Debug, Default)]
struct Published {
    generation: u64,
    collections: Vec<ActivityCollection>,
}

/// Dispatches per-file decodes concurrently and publishes ordered collection
/// sets.
///
/// Results are reassembled in file-set order regardless of task completion
/// order, and a result computed against a superseded store generation is
/// discarded rather than published, so a slow, stale decode can never clobber
/// a newer one.
pub struct RouteLoader {
    store: Arc<Mutex<FileStore>>,
    options: DecodeOptions,
    published: Arc<Mutex<Published>>,
    event_tx: Option<Sender<LoaderEvent>>,
}

impl RouteLoader {
    /// Create a loader with default decode options.
    pub fn new(store: Arc<Mutex<FileStore>>) -> Self {
        Self::with_options(store, DecodeOptions::default())
    }

    /// Create a loader with explicit decode options.
    pub fn with_options(store: Arc<Mutex<FileStore>>, options: DecodeOptions) -> Self {
        Self {
            store,
            options,
            published: Arc::new(Mutex::new(Published::default())),
            event_tx: None,
        }
    }

    /// Get an event receiver for loader events.
    pub fn event_receiver(&mut self) -> Receiver<LoaderEvent> {
        let (tx, rx) = crossbeam::channel::unbounded();
        self.event_tx = Some(tx);
        rx
    }

    /// Send an event if the channel is available.
    fn send_event(&self, event: LoaderEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }

    /// Decode the current file set and publish the resulting collections.
    ///
    /// Snapshots the store once, decodes each file on a blocking task, and
    /// reassembles in snapshot order. The result is published only if the
    /// store generation is unchanged when the pass completes.
    pub async fn refresh(&self) -> Result<RefreshOutcome, LoaderError> {
        let snapshot = self.store.lock().await.snapshot();
        let generation = snapshot.generation;
        tracing::debug!(
            files = snapshot.files.len(),
            generation,
            "Dispatching decode tasks"
        );

        let tasks: Vec<_> = snapshot
            .files
            .iter()
            .map(|file| {
                let file = file.clone();
                let options = self.options;
                tokio::task::spawn_blocking(move || decode_collection(&file, &options))
            })
            .collect();

        // join_all preserves the order of the task list, not completion order
        let mut collections = Vec::with_capacity(tasks.len());
        for joined in futures::future::join_all(tasks).await {
            collections.push(joined.map_err(|e| LoaderError::TaskFailed(e.to_string()))?);
        }
        mark_active(&mut collections, snapshot.active_index);

        if self.try_publish(generation, collections).await {
            Ok(RefreshOutcome::Published)
        } else {
            Ok(RefreshOutcome::Stale)
        }
    }

    /// Publish a decoded collection set if its generation is still current.
    ///
    /// Returns false (and drops the set) when the store has moved past the
    /// generation the set was computed from, or when a newer set was already
    /// published.
    pub async fn try_publish(&self, generation: u64, collections: Vec<ActivityCollection>) -> bool {
        let current = self.store.lock().await.generation();
        if current != generation {
            tracing::debug!(computed = generation, current, "Discarding stale collections");
            self.send_event(LoaderEvent::ResultDiscarded { generation });
            return false;
        }

        {
            let mut published = self.published.lock().await;
            if published.generation > generation {
                self.send_event(LoaderEvent::ResultDiscarded { generation });
                return false;
            }
            published.generation = generation;
            published.collections = collections;
        }

        self.send_event(LoaderEvent::CollectionsUpdated { generation });
        true
    }

    /// Latest published collections, in file-set order.
    pub async fn collections(&self) -> Vec<ActivityCollection> {
        self.published.lock().await.collections.clone()
    }

    /// Generation of the latest published collections.
    pub async fn published_generation(&self) -> u64 {
        self.published.lock().await.generation
    }
}

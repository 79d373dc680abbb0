//! Session file set shared between the shell and the decode loader.

use crate::import::TrackFile;
use crossbeam::channel::{Receiver, Sender};

/// Change notifications emitted by [`FileStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Files were added, removed, or the set was cleared.
    FilesChanged { generation: u64 },
    /// The focused collection changed.
    ActiveChanged { generation: u64, active_index: usize },
}

/// Point-in-time view of the store used to run one aggregation pass.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub files: Vec<TrackFile>,
    pub active_index: usize,
    pub generation: u64,
}

/// Ordered, name-unique set of uploaded files with an active selection.
///
/// The store is the session's only shared mutable state: the shell mutates it,
/// the loader snapshots it. Every mutation bumps a generation counter so an
/// in-flight decode can detect that it has been superseded.
pub struct FileStore {
    files: Vec<TrackFile>,
    active_index: usize,
    generation: u64,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            active_index: 0,
            generation: 0,
            subscribers: Vec::new(),
        }
    }

    /// Append files, silently dropping names already in the set.
    ///
    /// Returns the store generation after the mutation; unchanged if every
    /// name was a duplicate.
    pub fn add_files(&mut self, files: Vec<TrackFile>) -> u64 {
        let mut added = 0usize;
        for file in files {
            if self.contains(&file.name) {
                tracing::debug!(file = %file.name, "Skipping duplicate file");
                continue;
            }
            self.files.push(file);
            added += 1;
        }

        if added > 0 {
            self.generation += 1;
            self.publish(StoreEvent::FilesChanged {
                generation: self.generation,
            });
        }
        self.generation
    }

    /// Remove a file by name. Returns false when the name is not present.
    ///
    /// The active selection follows the file it pointed at: removing an
    /// earlier file shifts it down, removing the focused file moves focus to
    /// the next one (clamped to the end).
    pub fn remove(&mut self, name: &str) -> bool {
        let index = match self.files.iter().position(|file| file.name == name) {
            Some(index) => index,
            None => return false,
        };

        self.files.remove(index);
        if self.files.is_empty() {
            self.active_index = 0;
        } else if index < self.active_index {
            self.active_index -= 1;
        } else if self.active_index >= self.files.len() {
            self.active_index = self.files.len() - 1;
        }

        self.generation += 1;
        self.publish(StoreEvent::FilesChanged {
            generation: self.generation,
        });
        true
    }

    /// Empty the set and reset the active selection.
    pub fn clear(&mut self) {
        if self.files.is_empty() {
            return;
        }
        self.files.clear();
        self.active_index = 0;
        self.generation += 1;
        self.publish(StoreEvent::FilesChanged {
            generation: self.generation,
        });
    }

    /// Focus the collection at `index`. Returns false (and changes nothing)
    /// when the index is out of range; refocusing the current index is a
    /// no-op that does not bump the generation.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.files.len() {
            return false;
        }
        if index == self.active_index {
            return true;
        }

        self.active_index = index;
        self.generation += 1;
        self.publish(StoreEvent::ActiveChanged {
            generation: self.generation,
            active_index: index,
        });
        true
    }

    pub fn files(&self) -> &[TrackFile] {
        &self.files
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|file| file.name == name)
    }

    /// Clone-out view for one decode pass. File bytes are reference-counted,
    /// so this copies names and pointers, not buffers.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            files: self.files.clone(),
            active_index: self.active_index,
            generation: self.generation,
        }
    }

    /// Register a change listener. Dropped receivers are pruned on the next
    /// publish.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = crossbeam::channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, event: StoreEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

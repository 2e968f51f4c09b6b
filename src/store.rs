//! Key-value persistence and the store that owns the live collection.
//!
//! The live forest is never edited in place. `mutate` hands a clone to the
//! caller's closure and only a successful result replaces the collection,
//! which is then persisted before listeners are told about it.

use crate::config::{Preferences, ensure_dir};
use crate::error::{GroveError, StoreError};
use crate::layout::CollapsedSet;
use crate::node::Node;
use crate::normalize::parse_document;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const NODES_KEY: &str = "grove.nodes.v1";
pub const SEED_KEY: &str = "grove.seed.v1";
pub const PREFS_KEY: &str = "grove.prefs.v1";
pub const COLLAPSED_KEY: &str = "grove.collapsed.v1";

/// Default collection compiled into the binary.
pub const BUNDLED_SEED: &str = include_str!("../data/forest.json");

/// String blobs by key; the stand-in for browser local storage.
pub trait KeyValue {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_err(key: &str, source: io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValue for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(key, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        ensure_dir(&self.dir).map_err(|e| io_err(key, e))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| io_err(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_err(key, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(io_err(key, e)),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValue for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Recoverable problems found while loading; shown to the user as warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    StoredDataInvalid(String),
    SeedInvalid(String),
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::StoredDataInvalid(why) => {
                write!(f, "Saved collection is unreadable ({why}); showing the default set")
            }
            Notice::SeedInvalid(why) => {
                write!(f, "Default collection could not be loaded ({why}); starting empty")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Stored,
    Seed,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub source: LoadSource,
    pub notices: Vec<Notice>,
}

/// Handle returned by `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Marks an asynchronous load (import, reset). Only the newest ticket may
/// complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

type Listener = Box<dyn FnMut(&[Node], u64)>;

pub struct Store<K: KeyValue> {
    kv: K,
    nodes: Vec<Node>,
    revision: u64,
    listeners: Vec<(u64, Listener)>,
    next_listener: u64,
    generation: u64,
}

impl<K: KeyValue> Store<K> {
    /// An empty store; call `load` to fill it.
    pub fn new(kv: K) -> Self {
        Self {
            kv,
            nodes: Vec::new(),
            revision: 0,
            listeners: Vec::new(),
            next_listener: 0,
            generation: 0,
        }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Bumped on every successful replace.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Fill the collection from storage, falling back to `seed`. Listeners
    /// are notified with whatever was loaded.
    pub fn load(&mut self, seed: &str) -> Result<LoadOutcome, StoreError> {
        if self.kv.get(SEED_KEY)?.is_none() {
            self.kv.set(SEED_KEY, seed)?;
        }

        let mut notices = Vec::new();
        let stored = self.kv.get(NODES_KEY)?;
        if let Some(text) = &stored {
            match parse_document(text) {
                Ok(forest) => {
                    debug!(nodes = crate::tree::count(&forest), "loaded stored collection");
                    self.nodes = forest;
                    self.notify();
                    return Ok(LoadOutcome {
                        source: LoadSource::Stored,
                        notices,
                    });
                }
                Err(e) => {
                    warn!(error = %e, "stored collection is malformed, using seed");
                    notices.push(Notice::StoredDataInvalid(e.to_string()));
                }
            }
        }

        let source = match parse_document(seed) {
            Ok(forest) => {
                info!(nodes = crate::tree::count(&forest), "loaded seed collection");
                self.nodes = forest;
                // First run: keep generated ids stable across invocations.
                if stored.is_none() {
                    self.persist()?;
                }
                LoadSource::Seed
            }
            Err(e) => {
                warn!(error = %e, "seed collection is malformed, starting empty");
                notices.push(Notice::SeedInvalid(e.to_string()));
                self.nodes = Vec::new();
                LoadSource::Empty
            }
        };
        self.notify();
        Ok(LoadOutcome { source, notices })
    }

    /// Apply `edit` to a clone of the collection and swap it in on success.
    /// On error the live collection and storage are untouched.
    pub fn mutate<T, E, F>(&mut self, edit: F) -> Result<T, E>
    where
        F: FnOnce(&mut Vec<Node>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut draft = self.nodes.clone();
        let out = edit(&mut draft)?;
        self.replace(draft)?;
        Ok(out)
    }

    /// Persist `forest`, make it live and notify listeners.
    pub fn replace(&mut self, forest: Vec<Node>) -> Result<(), StoreError> {
        let text = encode(NODES_KEY, &forest)?;
        self.kv.set(NODES_KEY, &text)?;
        self.nodes = forest;
        self.revision += 1;
        debug!(revision = self.revision, "collection replaced");
        self.notify();
        Ok(())
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let text = encode(NODES_KEY, &self.nodes)?;
        self.kv.set(NODES_KEY, &text)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&[Node], u64) + 'static,
    {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        Subscription(id)
    }

    /// Returns false when the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription.0);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.nodes, self.revision);
        }
    }

    /// Start an asynchronous load. Any ticket handed out earlier becomes stale.
    pub fn begin_request(&mut self) -> RequestTicket {
        self.generation += 1;
        RequestTicket(self.generation)
    }

    /// Finish a load started with `begin_request`. Returns false, and leaves
    /// the collection alone, when a newer request has started since.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        forest: Vec<Node>,
    ) -> Result<bool, StoreError> {
        if ticket.0 != self.generation {
            debug!(ticket = ticket.0, current = self.generation, "discarding stale completion");
            return Ok(false);
        }
        self.replace(forest)?;
        Ok(true)
    }

    /// Replace the collection with the seed snapshot saved on first run, or
    /// `bundled` when the snapshot is missing or unreadable.
    pub fn reset_to_seed(&mut self, bundled: &str) -> Result<(), GroveError> {
        let ticket = self.begin_request();
        let snapshot = self
            .kv
            .get(SEED_KEY)?
            .and_then(|text| match parse_document(&text) {
                Ok(forest) => Some(forest),
                Err(e) => {
                    warn!(error = %e, "seed snapshot is malformed, using bundled seed");
                    None
                }
            });
        let forest = match snapshot {
            Some(forest) => forest,
            None => parse_document(bundled)?,
        };
        self.complete(ticket, forest)?;
        self.kv.remove(COLLAPSED_KEY)?;
        info!("collection reset to seed");
        Ok(())
    }

    pub fn preferences(&self) -> Preferences {
        self.read_or_default(PREFS_KEY)
    }

    pub fn set_preferences(&mut self, prefs: &Preferences) -> Result<(), StoreError> {
        self.write(PREFS_KEY, prefs)
    }

    pub fn collapsed(&self) -> CollapsedSet {
        self.read_or_default(COLLAPSED_KEY)
    }

    pub fn set_collapsed(&mut self, collapsed: &CollapsedSet) -> Result<(), StoreError> {
        self.write(COLLAPSED_KEY, collapsed)
    }

    fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let text = match self.kv.get(key) {
            Ok(Some(text)) => text,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!(error = %e, key, "could not read setting");
                return T::default();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(error = %e, key, "ignoring malformed setting");
            T::default()
        })
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let text = encode(key, value)?;
        self.kv.set(key, &text)
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string_pretty(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })
}

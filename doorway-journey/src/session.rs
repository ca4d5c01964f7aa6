//! User session: display name and subscription flag
//!
//! The in-memory values are authoritative. Every change is mirrored to a
//! best-effort key-value store; read and write failures are logged and
//! otherwise ignored. Absent or corrupt stored values rehydrate as defaults.
//!
//! Stored layout:
//! - `ux_user`: JSON object `{"name": "<string>"}`
//! - `ux_isSubscribed`: JSON boolean

use crate::context::DoorwayContext;
use crate::{Error, Result};
use chrono::Utc;
use doorway_common::events::JourneyEvent;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const USER_KEY: &str = "ux_user";
pub const SUBSCRIBED_KEY: &str = "ux_isSubscribed";

/// Shown when no name has been set
pub const GUEST_NAME: &str = "Guest";

/// Best-effort string key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Process-local store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object file holding every key
///
/// The whole file is read on each `get` and rewritten on each `set`; the
/// session only ever holds two keys.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking writes forever
        let mut entries = self.read_all().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, json)
            .map_err(|e| Error::Store(format!("{}: {}", self.path.display(), e)))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredUser {
    #[serde(default)]
    name: String,
}

/// Name and subscription flag mirrored to `S`
#[derive(Debug)]
pub struct UserSession<S: KeyValueStore = MemoryStore> {
    ctx: DoorwayContext,
    store: S,
    name: String,
    is_subscribed: bool,
}

impl UserSession<MemoryStore> {
    /// Session with nothing persisted beyond this process
    pub fn in_memory(ctx: DoorwayContext) -> Self {
        Self::new(ctx, MemoryStore::new())
    }
}

impl<S: KeyValueStore> UserSession<S> {
    /// Rehydrate from `store`; anything unreadable uses the default
    pub fn new(ctx: DoorwayContext, store: S) -> Self {
        let name = load_value::<StoredUser>(&store, USER_KEY)
            .map(|u| u.name)
            .unwrap_or_default();
        let is_subscribed = load_value::<bool>(&store, SUBSCRIBED_KEY).unwrap_or(false);

        info!(
            name = %display_name_for(&name),
            is_subscribed,
            build = %ctx.build.stamp,
            "User session mounted"
        );

        Self {
            ctx,
            store,
            name,
            is_subscribed,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_subscribed(&self) -> bool {
        self.is_subscribed
    }

    /// Name for display ("Guest" when empty)
    pub fn display_name(&self) -> &str {
        display_name_for(&self.name)
    }

    pub fn badge(&self) -> &'static str {
        if self.is_subscribed {
            "SUBSCRIBED"
        } else {
            "FREE"
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn set_name(&mut self, name: &str) {
        debug!(name = %name, "set_name");
        self.name = name.to_string();
        self.persist_user();
        self.announce();
    }

    /// Flip the subscription flag; returns the new value
    pub fn toggle_subscribed(&mut self) -> bool {
        self.is_subscribed = !self.is_subscribed;
        debug!(is_subscribed = self.is_subscribed, "toggle_subscribed");
        self.persist_subscribed();
        self.announce();
        self.is_subscribed
    }

    /// Back to defaults; the defaults are written through as well
    pub fn reset(&mut self) {
        debug!("reset");
        self.name.clear();
        self.is_subscribed = false;
        self.persist_user();
        self.persist_subscribed();
        self.announce();
    }

    fn persist_user(&mut self) {
        let user = StoredUser {
            name: self.name.clone(),
        };
        save_value(&mut self.store, USER_KEY, &user);
    }

    fn persist_subscribed(&mut self) {
        save_value(&mut self.store, SUBSCRIBED_KEY, &self.is_subscribed);
    }

    fn announce(&self) {
        self.ctx.emit(JourneyEvent::SessionChanged {
            name: self.name.clone(),
            is_subscribed: self.is_subscribed,
            timestamp: Utc::now(),
        });
    }
}

fn display_name_for(name: &str) -> &str {
    if name.is_empty() {
        GUEST_NAME
    } else {
        name
    }
}

fn load_value<T: serde::de::DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "Session store read failed, using default");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Ignoring corrupt session value");
            None
        }
    }
}

fn save_value<T: Serialize>(store: &mut impl KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(Error::from)
        .and_then(|json| store.set(key, &json));

    if let Err(e) = result {
        warn!(key, error = %e, "Session store write failed, keeping in-memory value");
    }
}

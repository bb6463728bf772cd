//! Deduplication keys for incoming messages.
//!
//! Two keys per message: the `(channel_id, message_id)` pair when the source has
//! stable identifiers, and a content fingerprint that is always present. The
//! pair is checked first; the fingerprint catches sources without identifiers
//! and reposts of the same text under new ones.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Where a message came from. Either part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub channel_id: Option<String>,
    pub message_id: Option<i64>,
}

impl SourceRef {
    /// Channel trimmed, blank channel dropped. Stored records carry this form,
    /// so lookups by `pair()` match what was written.
    pub fn normalized(self) -> Self {
        Self {
            channel_id: self
                .channel_id
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            message_id: self.message_id,
        }
    }

    /// Both identifiers, if both are present and the channel is non-blank.
    pub fn pair(&self) -> Option<(&str, i64)> {
        match (self.channel_id.as_deref().map(str::trim), self.message_id) {
            (Some(channel), Some(message)) if !channel.is_empty() => Some((channel, message)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DedupKey {
    #[serde(rename_all = "camelCase")]
    Source { channel_id: String, message_id: i64 },
    Content { hash: String },
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupKey::Source {
                channel_id,
                message_id,
            } => write!(f, "source:{channel_id}/{message_id}"),
            DedupKey::Content { hash } => write!(f, "content:{hash}"),
        }
    }
}

/// Lowercases, collapses every whitespace run to a single space and trims.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// SHA-256 of the normalised text, lowercase hex.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(normalize_text(text).as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupKeys {
    pub source: Option<DedupKey>,
    pub content: DedupKey,
}

impl DedupKeys {
    pub fn derive(source: &SourceRef, text: &str) -> Self {
        Self {
            source: source.pair().map(|(channel, message)| DedupKey::Source {
                channel_id: channel.to_string(),
                message_id: message,
            }),
            content: DedupKey::Content {
                hash: content_hash(text),
            },
        }
    }

    pub fn hash(&self) -> &str {
        match &self.content {
            DedupKey::Content { hash } => hash,
            DedupKey::Source { .. } => unreachable!("content key is always a hash"),
        }
    }

    /// Lookup order: identifiers first, then content.
    pub fn in_lookup_order(&self) -> impl Iterator<Item = &DedupKey> {
        self.source.iter().chain(std::iter::once(&self.content))
    }
}

/// Per-key async locks so concurrent ingestion of one message runs the
/// check-then-create sequence at most once at a time.
#[derive(Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<DedupKey, Weak<AsyncMutex<()>>>>,
}

/// Holds every lock for one message until dropped.
pub struct KeyGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, key: &DedupKey) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.retain(|_, weak| weak.strong_count() > 0);
        if let Some(existing) = locks.get(key).and_then(Weak::upgrade) {
            return existing;
        }
        let fresh = Arc::new(AsyncMutex::new(()));
        locks.insert(key.clone(), Arc::downgrade(&fresh));
        fresh
    }

    /// Locks all `keys`, always in sorted order so two messages sharing keys
    /// cannot deadlock.
    pub async fn acquire(&self, keys: &DedupKeys) -> KeyGuard {
        let mut ordered: Vec<&DedupKey> = keys.in_lookup_order().collect();
        ordered.sort();

        let mut guards = Vec::with_capacity(ordered.len());
        for key in ordered {
            guards.push(self.handle(key).lock_owned().await);
        }
        KeyGuard { _guards: guards }
    }

    #[cfg(test)]
    pub fn tracked(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.values().filter(|w| w.strong_count() > 0).count()
    }
}

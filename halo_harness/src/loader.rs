// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`AssetLoader`].

use std::collections::HashMap;
use std::sync::Arc;
use std::task::Poll;

use halo_core::asset::{AssetLoader, LoadError, SceneTemplate, SharedAsset, SourceId};

#[derive(Debug)]
struct Entry {
    template: SceneTemplate,
    cached: Option<SharedAsset>,
    /// Polls left before the entry resolves.
    pending: u32,
    failure: Option<String>,
}

/// A caching loader over registered templates.
///
/// The first load of a source publishes an [`Arc`] that every later load
/// returns again, until [`evict`](Self::evict) drops it. With a latency of
/// `n`, a source answers [`Poll::Pending`] for its first `n` polls after
/// registration or eviction, which is how a suspended load looks to an
/// instance.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    entries: HashMap<SourceId, Entry>,
    latency: u32,
    polls: usize,
}

impl MemoryLoader {
    /// Creates an empty loader that resolves immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many polls each later registration or eviction stays pending.
    #[must_use]
    pub fn with_latency(mut self, polls: u32) -> Self {
        self.latency = polls;
        self
    }

    /// Registers (or replaces) the template served for `source`.
    pub fn register(&mut self, source: impl Into<SourceId>, template: SceneTemplate) {
        self.entries.insert(
            source.into(),
            Entry {
                template,
                cached: None,
                pending: self.latency,
                failure: None,
            },
        );
    }

    /// Makes every load of `source` fail as malformed.
    pub fn fail(&mut self, source: impl Into<SourceId>, reason: &str) {
        let source = source.into();
        match self.entries.get_mut(&source) {
            Some(entry) => entry.failure = Some(reason.to_owned()),
            None => {
                self.entries.insert(
                    source,
                    Entry {
                        template: SceneTemplate::new("unloadable"),
                        cached: None,
                        pending: 0,
                        failure: Some(reason.to_owned()),
                    },
                );
            }
        }
    }

    /// Drops the cached asset so the next resolution publishes a new one.
    ///
    /// Returns `false` if `source` was never registered.
    pub fn evict(&mut self, source: &SourceId) -> bool {
        let latency = self.latency;
        self.entries.get_mut(source).is_some_and(|entry| {
            entry.cached = None;
            entry.pending = latency;
            true
        })
    }

    /// Returns the currently cached asset for `source`, if resolved.
    #[must_use]
    pub fn cached(&self, source: &SourceId) -> Option<&SharedAsset> {
        self.entries.get(source).and_then(|e| e.cached.as_ref())
    }

    /// Returns how many times [`load`](AssetLoader::load) has been called.
    #[must_use]
    pub fn polls(&self) -> usize {
        self.polls
    }
}

impl AssetLoader for MemoryLoader {
    fn load(&mut self, source: &SourceId) -> Poll<Result<SharedAsset, LoadError>> {
        self.polls += 1;
        let Some(entry) = self.entries.get_mut(source) else {
            return Poll::Ready(Err(LoadError::NotFound(source.clone())));
        };
        if let Some(reason) = &entry.failure {
            return Poll::Ready(Err(LoadError::Malformed {
                id: source.clone(),
                reason: reason.clone(),
            }));
        }
        if entry.pending > 0 {
            entry.pending -= 1;
            return Poll::Pending;
        }
        let Entry {
            template, cached, ..
        } = entry;
        let asset = cached.get_or_insert_with(|| Arc::new(template.clone()));
        Poll::Ready(Ok(Arc::clone(asset)))
    }
}

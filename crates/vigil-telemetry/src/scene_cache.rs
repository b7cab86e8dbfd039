// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cached references into the host world.
//!
//! Enumerating the world is expensive, so the entity list is taken once and
//! reused until it is explicitly refreshed. The handles it holds may go stale
//! at any time; every consumer checks liveness before use.

use vigil_core::{EntityId, SceneHost};

/// A snapshot of the world's entity handles.
#[derive(Debug, Default, Clone)]
pub struct SceneObjectCache {
    entities: Vec<EntityId>,
    valid: bool,
}

impl SceneObjectCache {
    /// An empty, invalid cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents with a fresh enumeration.
    ///
    /// On failure the cache is left empty and invalid so that the next
    /// [`ensure`](Self::ensure) retries. Returns `true` on success.
    pub fn refresh(&mut self, host: &dyn SceneHost) -> bool {
        match host.enumerate_entities() {
            Ok(entities) => {
                log::debug!("Scene cache refreshed: {} entities", entities.len());
                self.entities = entities;
                self.valid = true;
            }
            Err(e) => {
                log::debug!("Scene enumeration failed: {e}");
                self.entities.clear();
                self.valid = false;
            }
        }
        self.valid
    }

    /// Repopulates if the cache is empty or the last enumeration failed.
    pub fn ensure(&mut self, host: &dyn SceneHost) -> bool {
        if self.valid && !self.entities.is_empty() {
            return true;
        }
        log::debug!("Scene cache empty or stale; repopulating");
        self.refresh(host)
    }

    /// Marks the cache stale without touching its contents.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// `true` if the last enumeration succeeded.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Number of cached handles, live or not.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Every cached handle in enumeration order.
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Cached handles that still refer to live entities.
    pub fn live<'a>(&'a self, host: &'a dyn SceneHost) -> impl Iterator<Item = EntityId> + 'a {
        self.entities
            .iter()
            .copied()
            .filter(move |entity| host.is_alive(*entity))
    }
}

/// A lazily (re)acquired handle to the host's primary viewpoint.
#[derive(Debug, Default, Clone, Copy)]
pub struct ViewpointRef {
    entity: Option<EntityId>,
}

impl ViewpointRef {
    /// An unset reference.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the held viewpoint if it is still alive, otherwise asks the host again.
    pub fn acquire(&mut self, host: &dyn SceneHost) -> Option<EntityId> {
        if let Some(entity) = self.entity.filter(|e| host.is_alive(*e)) {
            return Some(entity);
        }
        let previous = self.entity;
        self.entity = host.primary_viewpoint();
        if self.entity != previous {
            match self.entity {
                Some(entity) => log::debug!("Primary viewpoint acquired: {entity}"),
                None => log::debug!("No primary viewpoint available"),
            }
        }
        self.entity
    }

    /// The held handle without checking it.
    pub fn current(&self) -> Option<EntityId> {
        self.entity
    }

    /// Forgets the held handle.
    pub fn invalidate(&mut self) {
        self.entity = None;
    }
}

//! Generation-counted arena of live script contexts.
//!
//! A [`ContextId`] pairs a slot index with the slot's generation. Removing
//! a context bumps the generation, so an id held past teardown never
//! resolves to whatever context reuses the slot.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::context::{ScriptContextEntry, ScriptEnvironment};

/// Handle to a script context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextId {
    index: u32,
    generation: u32,
}

impl ContextId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

struct Live {
    entry: ScriptContextEntry,
    env: Box<dyn ScriptEnvironment>,
}

#[derive(Default)]
struct Slot {
    generation: u32,
    live: Option<Live>,
}

#[derive(Default)]
pub struct ScriptContextRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl ScriptContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a context. `build` receives the new id.
    pub fn insert_with(
        &mut self,
        build: impl FnOnce(ContextId) -> ScriptContextEntry,
        env: Box<dyn ScriptEnvironment>,
    ) -> ContextId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = ContextId::new(index, slot.generation);
        slot.live = Some(Live {
            entry: build(id),
            env,
        });
        self.len += 1;
        id
    }

    /// Remove a context, returning its entry and environment.
    pub fn remove(
        &mut self,
        id: ContextId,
    ) -> Option<(ScriptContextEntry, Box<dyn ScriptEnvironment>)> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let live = slot.live.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some((live.entry, live.env))
    }

    fn live(&self, id: ContextId) -> Option<&Live> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.live.as_ref())
    }

    pub fn get(&self, id: ContextId) -> Option<&ScriptContextEntry> {
        self.live(id).map(|live| &live.entry)
    }

    pub fn env_mut(&mut self, id: ContextId) -> Option<&mut dyn ScriptEnvironment> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let live = slot.live.as_mut()?;
        Some(live.env.as_mut())
    }

    pub fn is_live(&self, id: ContextId) -> bool {
        self.live(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn entries(&self) -> impl Iterator<Item = &ScriptContextEntry> {
        self.slots
            .iter()
            .filter_map(|slot| slot.live.as_ref().map(|live| &live.entry))
    }

    /// Run `f` on every live context matching `filter`. Returns the number
    /// of contexts visited.
    pub fn for_each_matching(
        &mut self,
        filter: impl Fn(&ScriptContextEntry) -> bool,
        mut f: impl FnMut(&ScriptContextEntry, &mut dyn ScriptEnvironment),
    ) -> usize {
        let mut visited = 0;
        for slot in &mut self.slots {
            if let Some(live) = slot.live.as_mut() {
                if filter(&live.entry) {
                    f(&live.entry, live.env.as_mut());
                    visited += 1;
                }
            }
        }
        visited
    }

    /// Remove every context whose frame is gone. No unload event is
    /// dispatched since the frame cannot observe it.
    pub fn sweep_detached(&mut self) -> Vec<ScriptContextEntry> {
        let detached: Vec<ContextId> = self
            .entries()
            .filter(|entry| entry.is_detached())
            .map(|entry| entry.context_id)
            .collect();
        detached
            .into_iter()
            .filter_map(|id| self.remove(id).map(|(entry, _)| entry))
            .collect()
    }
}

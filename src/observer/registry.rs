//! Dispatch table: element handle → subscriber callback.
//!
//! A slot table indexed by the handle's arena index. Every lookup checks the
//! generation, so a handle to a removed element never reaches the callback of
//! the element that recycled its slot. Unregistering evicts the slot
//! explicitly.
//!
//! Callbacks are checked out while they run. The table is never borrowed
//! across a callback invocation, so a callback may register or unregister
//! freely; a registration that was removed or replaced while its callback ran
//! is not restored.

use crate::model::{ElementId, VisibilityEvent};

/// Subscriber callback for one target.
pub type Callback = Box<dyn FnMut(VisibilityEvent)>;

/// Identity of one `register` call. Replacing a callback issues a new token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token(u64);

struct Registration {
    generation: u32,
    token: Token,
    /// `None` while checked out for invocation.
    callback: Option<Callback>,
}

/// Outcome of [`Registry::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Inserted {
    /// No live registration existed for the target.
    New,
    /// A previous callback for the same target was dropped.
    Replaced,
    /// A registration for an older generation of the same slot was dropped.
    Evicted(ElementId),
}

#[derive(Default)]
pub(crate) struct Registry {
    slots: Vec<Option<Registration>>,
    live: usize,
    next_token: u64,
}

impl Registry {
    /// Associate `callback` with `target`, replacing any previous association.
    ///
    /// A registration left behind by an older generation of the same slot is
    /// evicted; its id is returned so the caller can stop observing it.
    pub(crate) fn insert(&mut self, target: ElementId, callback: Callback) -> Inserted {
        let slot = target.slot();
        if slot >= self.slots.len() {
            self.slots.resize_with(slot + 1, || None);
        }

        let token = Token(self.next_token);
        self.next_token += 1;

        let previous = self.slots[slot].replace(Registration {
            generation: target.generation(),
            token,
            callback: Some(callback),
        });

        match previous {
            Some(old) if old.generation == target.generation() => Inserted::Replaced,
            Some(old) => Inserted::Evicted(ElementId::new(target.index(), old.generation)),
            None => {
                self.live += 1;
                Inserted::New
            }
        }
    }

    /// Drop the association for `target`. Returns whether one existed.
    pub(crate) fn remove(&mut self, target: ElementId) -> bool {
        if !self.contains(target) {
            return false;
        }
        self.slots[target.slot()] = None;
        self.live -= 1;
        self.trim();
        true
    }

    /// Whether `target` has a live association.
    pub(crate) fn contains(&self, target: ElementId) -> bool {
        self.lookup(target).is_some()
    }

    /// Take the callback for `target` out of the table for invocation.
    ///
    /// `None` if the target is not registered, or its callback is already
    /// running further up the stack.
    pub(crate) fn checkout(&mut self, target: ElementId) -> Option<(Token, Callback)> {
        let reg = self
            .slots
            .get_mut(target.slot())?
            .as_mut()
            .filter(|reg| reg.generation == target.generation())?;
        let callback = reg.callback.take()?;
        Some((reg.token, callback))
    }

    /// Return a checked-out callback, unless its registration was removed or
    /// replaced in the meantime (in which case the callback is dropped).
    pub(crate) fn checkin(&mut self, target: ElementId, token: Token, callback: Callback) {
        if let Some(reg) = self
            .slots
            .get_mut(target.slot())
            .and_then(Option::as_mut)
            .filter(|reg| reg.generation == target.generation() && reg.token == token)
        {
            reg.callback = Some(callback);
        }
    }

    /// Number of live associations.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Drop every association.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.live = 0;
    }

    fn lookup(&self, target: ElementId) -> Option<&Registration> {
        self.slots
            .get(target.slot())?
            .as_ref()
            .filter(|reg| reg.generation == target.generation())
    }

    fn trim(&mut self) {
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
    }
}

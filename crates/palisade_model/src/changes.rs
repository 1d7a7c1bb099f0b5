//! Per-object dirty tracking.
//!
//! Every object records which of its wire fields have been modified locally
//! since the last successful exchange with the server. Update payloads are
//! built from this record so that untouched fields never travel and never
//! clobber concurrent edits made elsewhere.

use std::borrow::Cow;
use std::collections::BTreeSet;

/// Which kind of write payload is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Payload for creating an object the server has never seen. Carries
    /// every locally populated field and no identifier.
    Create,
    /// Payload for updating an existing object. Carries only fields marked
    /// changed, plus the lookup key the server resolves the object by.
    Update,
}

/// The set of wire field names an object has modified locally.
///
/// Field names are stored as [`Cow`] so that the fixed vocabulary of typed
/// objects costs nothing while dynamically keyed objects can still track
/// arbitrary fields.
#[derive(Debug, Default)]
pub struct ChangeSet {
    fields: BTreeSet<Cow<'static, str>>,
}

impl ChangeSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        ChangeSet::default()
    }

    /// Marks `field` as modified.
    pub fn mark(&mut self, field: impl Into<Cow<'static, str>>) {
        self.fields.insert(field.into());
    }

    /// Whether `field` has been modified since the last sync.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    /// Whether anything at all has been modified.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Forgets all recorded modifications.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// The modified field names, in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(Cow::as_ref)
    }
}

/// Writes `value` into `slot` and marks `field` when the value actually
/// changed. Assigning an equal value leaves the change set untouched.
pub(crate) fn assign<T: PartialEq>(
    changes: &mut ChangeSet,
    field: &'static str,
    slot: &mut T,
    value: T,
) {
    if *slot != value {
        *slot = value;
        changes.mark(field);
    }
}

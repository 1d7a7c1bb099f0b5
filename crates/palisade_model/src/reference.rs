//! Shared, late-bound links between objects.
//!
//! A [`Reference`] is a small indirection cell. While a response is being
//! parsed, a link to an object that has not appeared yet is held as
//! [`RefState::Pending`] with the raw identifier from the wire; once the
//! target is known the cell is rebound in place. Because clones of a
//! `Reference` share the cell, every holder observes the rebinding at once,
//! including holders that captured the link before the target existed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::objects::ObjectHandle;

/// What a reference currently points at.
#[derive(Debug)]
pub(crate) enum RefState {
    /// Bound to a live object.
    Resolved(ObjectHandle),
    /// Waiting for an object with this name or uid to materialize.
    Pending(String),
}

/// A link from one object to another.
///
/// Cloning is cheap and intentional: clones alias the same cell, so code
/// that stored the reference early still sees the target once resolution
/// happens.
#[derive(Clone)]
pub struct Reference {
    cell: Rc<RefCell<RefState>>,
}

impl Reference {
    /// A reference already bound to `target`.
    pub(crate) fn resolved(target: ObjectHandle) -> Self {
        Reference {
            cell: Rc::new(RefCell::new(RefState::Resolved(target))),
        }
    }

    /// A reference that only knows the wire identifier of its target.
    pub(crate) fn pending(identifier: impl Into<String>) -> Self {
        Reference {
            cell: Rc::new(RefCell::new(RefState::Pending(identifier.into()))),
        }
    }

    /// Rebinds the cell to `target`. Every clone sees the new state.
    pub(crate) fn bind(&self, target: ObjectHandle) {
        *self.cell.borrow_mut() = RefState::Resolved(target);
    }

    /// The referenced object, if the link has been resolved.
    pub fn target(&self) -> Option<ObjectHandle> {
        match &*self.cell.borrow() {
            RefState::Resolved(handle) => Some(handle.clone()),
            RefState::Pending(_) => None,
        }
    }

    /// Whether the link points at a live object.
    pub fn is_resolved(&self) -> bool {
        matches!(&*self.cell.borrow(), RefState::Resolved(_))
    }

    /// The raw identifier of an unresolved link.
    pub fn pending_identifier(&self) -> Option<String> {
        match &*self.cell.borrow() {
            RefState::Pending(identifier) => Some(identifier.clone()),
            RefState::Resolved(_) => None,
        }
    }

    /// The identifier this link would be written as on the wire: the target
    /// name when known, its uid as a fallback, or the still-pending
    /// identifier.
    pub fn key(&self) -> Option<String> {
        match &*self.cell.borrow() {
            RefState::Resolved(handle) => {
                handle.name().or_else(|| handle.uid().map(|uid| uid.to_string()))
            }
            RefState::Pending(identifier) => Some(identifier.clone()),
        }
    }

    /// Whether `self` and `other` alias the same cell.
    pub fn shares_cell(&self, other: &Reference) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.try_borrow() {
            Ok(state) => f.debug_tuple("Reference").field(&*state).finish(),
            Err(_) => f.write_str("Reference(<borrowed>)"),
        }
    }
}

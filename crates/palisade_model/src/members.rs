//! Membership lists with add/remove delta tracking.
//!
//! Fields like a group's `members` or a rule's `source` hold an ordered,
//! duplicate-free list of [`Reference`]s plus a record of how the list has
//! diverged locally. Small divergences travel as `add`/`remove` deltas;
//! anything the deltas cannot express (reordering, wholesale assignment,
//! clearing) escalates to a full replacement, which always wins.

use serde_json::{Map, Value};

use crate::objects::ObjectHandle;
use crate::reference::Reference;

/// How a membership list's local state relates to the server's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAction {
    /// In sync; nothing to transmit.
    None,
    /// Only additions happened; transmit an `add` delta.
    Add,
    /// Only removals happened; transmit a `remove` delta.
    Remove,
    /// The list must be replaced wholesale with its current contents.
    Set,
}

/// Something that can join a membership list.
#[derive(Debug, Clone)]
pub enum Member {
    /// A name or uid the server will resolve.
    Identifier(String),
    /// A live object.
    Object(ObjectHandle),
}

impl From<&str> for Member {
    fn from(identifier: &str) -> Self {
        Member::Identifier(identifier.to_owned())
    }
}

impl From<String> for Member {
    fn from(identifier: String) -> Self {
        Member::Identifier(identifier)
    }
}

impl From<&ObjectHandle> for Member {
    fn from(handle: &ObjectHandle) -> Self {
        Member::Object(handle.clone())
    }
}

impl From<ObjectHandle> for Member {
    fn from(handle: ObjectHandle) -> Self {
        Member::Object(handle)
    }
}

impl Member {
    /// The wire key this member is addressed by, if it has one.
    pub(crate) fn key(&self) -> Option<String> {
        match self {
            Member::Identifier(identifier) => Some(identifier.clone()),
            Member::Object(handle) => {
                handle.name().or_else(|| handle.uid().map(|uid| uid.to_string()))
            }
        }
    }

    pub(crate) fn into_reference(self) -> Reference {
        match self {
            Member::Identifier(identifier) => Reference::pending(identifier),
            Member::Object(handle) => Reference::resolved(handle),
        }
    }
}

/// An ordered, duplicate-free collection of object references with delta
/// tracking against the last synced state.
#[derive(Debug, Default)]
pub struct MemberList {
    items: Vec<Reference>,
    added: Vec<String>,
    removed: Vec<String>,
    forced_set: bool,
}

impl MemberList {
    /// Creates an empty, in-sync list.
    pub fn new() -> Self {
        MemberList::default()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list has no members.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates the member references in order.
    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.items.iter()
    }

    /// The member at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Reference> {
        self.items.get(index)
    }

    /// Whether a member with this wire key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.key().as_deref() == Some(key))
    }

    /// Appends a member. Returns `false` without side effects when the
    /// member is already present or has no usable key.
    pub fn add(&mut self, member: impl Into<Member>) -> bool {
        let member = member.into();
        let Some(key) = member.key() else {
            return false;
        };
        if self.contains(&key) {
            return false;
        }
        self.items.push(member.into_reference());
        if let Some(at) = self.removed.iter().position(|k| *k == key) {
            // A re-add nets out the earlier removal.
            self.removed.remove(at);
        } else {
            self.added.push(key);
        }
        self.reconcile_mixed();
        true
    }

    /// Removes the member with this wire key. Returns `false` when absent.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(at) = self.position(key) else {
            return false;
        };
        self.items.remove(at);
        if let Some(pos) = self.added.iter().position(|k| k == key) {
            // Removing something added locally cancels the addition.
            self.added.remove(pos);
        } else {
            self.removed.push(key.to_owned());
        }
        self.reconcile_mixed();
        true
    }

    /// Inserts a member at `index`, forcing a full replacement on the next
    /// write. Returns `false` for duplicates and keyless members.
    pub fn insert(&mut self, index: usize, member: impl Into<Member>) -> bool {
        let member = member.into();
        let Some(key) = member.key() else {
            return false;
        };
        if self.contains(&key) {
            return false;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, member.into_reference());
        self.force_set();
        true
    }

    /// Replaces the whole list, forcing a full replacement on the next
    /// write. Duplicate keys keep their first occurrence.
    pub fn assign<M: Into<Member>>(&mut self, members: impl IntoIterator<Item = M>) {
        self.items.clear();
        for member in members {
            let member = member.into();
            let Some(key) = member.key() else { continue };
            if !self.contains(&key) {
                self.items.push(member.into_reference());
            }
        }
        self.force_set();
    }

    /// Empties the list, forcing a full (empty) replacement on the next
    /// write.
    pub fn clear(&mut self) {
        self.items.clear();
        self.force_set();
    }

    /// Pending delta state.
    pub fn action(&self) -> MemberAction {
        if self.forced_set {
            MemberAction::Set
        } else if !self.added.is_empty() {
            MemberAction::Add
        } else if !self.removed.is_empty() {
            MemberAction::Remove
        } else {
            MemberAction::None
        }
    }

    /// Keys added since the last sync, in order.
    pub fn pending_added(&self) -> &[String] {
        &self.added
    }

    /// Keys removed since the last sync, in order.
    pub fn pending_removed(&self) -> &[String] {
        &self.removed
    }

    /// Whether the list has local changes to transmit.
    pub fn has_pending(&self) -> bool {
        self.action() != MemberAction::None
    }

    // Once both additions and removals coexist the change can no longer be
    // expressed as a single delta; replace wholesale.
    fn reconcile_mixed(&mut self) {
        if !self.added.is_empty() && !self.removed.is_empty() {
            self.force_set();
        }
    }

    fn force_set(&mut self) {
        self.forced_set = true;
        self.added.clear();
        self.removed.clear();
    }

    /// Replaces contents with freshly parsed references and marks the list
    /// in sync.
    pub(crate) fn absorb(&mut self, items: Vec<Reference>) {
        self.items = items;
        self.clear_delta();
    }

    /// Marks the list in sync without touching its contents.
    pub(crate) fn clear_delta(&mut self) {
        self.added.clear();
        self.removed.clear();
        self.forced_set = false;
    }

    fn keys(&self) -> Vec<Value> {
        self.items
            .iter()
            .filter_map(|item| item.key())
            .map(Value::String)
            .collect()
    }

    /// Writes the current membership as a plain array under `field`,
    /// omitting the field entirely when empty. Used for create payloads.
    pub(crate) fn write_full(&self, field: &str, out: &mut Map<String, Value>) {
        if !self.items.is_empty() {
            out.insert(field.to_owned(), Value::Array(self.keys()));
        }
    }

    /// Writes the pending delta under `field`, if there is one. A forced
    /// replacement is written as the full current array; an empty
    /// replacement is the documented way to remove every member.
    pub(crate) fn write_delta(&self, field: &str, out: &mut Map<String, Value>) {
        match self.action() {
            MemberAction::None => {}
            MemberAction::Add => {
                let keys = self.added.iter().cloned().map(Value::String).collect();
                let mut delta = Map::new();
                delta.insert("add".to_owned(), Value::Array(keys));
                out.insert(field.to_owned(), Value::Object(delta));
            }
            MemberAction::Remove => {
                let keys = self.removed.iter().cloned().map(Value::String).collect();
                let mut delta = Map::new();
                delta.insert("remove".to_owned(), Value::Array(keys));
                out.insert(field.to_owned(), Value::Object(delta));
            }
            MemberAction::Set => {
                out.insert(field.to_owned(), Value::Array(self.keys()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn delta_for(list: &MemberList) -> Option<Value> {
        let mut out = Map::new();
        list.write_delta("members", &mut out);
        out.remove("members")
    }

    #[test]
    fn add_then_remove_nets_to_nothing() {
        let mut list = MemberList::new();
        assert!(list.add("web-srv"));
        assert_eq!(list.action(), MemberAction::Add);

        assert!(list.remove("web-srv"));
        assert_eq!(list.action(), MemberAction::None);
        assert!(list.is_empty());
        assert_eq!(delta_for(&list), None);
    }

    #[test]
    fn remove_then_readd_nets_to_nothing() {
        let mut list = MemberList::new();
        list.absorb(vec![Reference::pending("db-srv")]);

        assert!(list.remove("db-srv"));
        assert_eq!(list.action(), MemberAction::Remove);

        assert!(list.add("db-srv"));
        assert_eq!(list.action(), MemberAction::None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut list = MemberList::new();
        assert!(list.add("web-srv"));
        assert!(!list.add("web-srv"));
        assert_eq!(list.len(), 1);
        assert_eq!(list.pending_added(), ["web-srv"]);
    }

    #[test]
    fn mixed_operations_escalate_to_set() {
        let mut list = MemberList::new();
        list.absorb(vec![Reference::pending("old"), Reference::pending("keep")]);

        assert!(list.remove("old"));
        assert!(list.add("new"));
        assert_eq!(list.action(), MemberAction::Set);

        assert_eq!(delta_for(&list), Some(json!(["keep", "new"])));
    }

    #[test]
    fn clear_writes_an_empty_replacement() {
        let mut list = MemberList::new();
        list.absorb(vec![Reference::pending("a"), Reference::pending("b")]);

        list.clear();
        assert_eq!(list.action(), MemberAction::Set);
        assert_eq!(delta_for(&list), Some(json!([])));
    }

    #[test]
    fn assign_replaces_and_deduplicates() {
        let mut list = MemberList::new();
        list.absorb(vec![Reference::pending("a")]);

        list.assign(["x", "y", "x"]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.action(), MemberAction::Set);
        assert_eq!(delta_for(&list), Some(json!(["x", "y"])));
    }

    #[test]
    fn insert_is_positional_and_forces_set() {
        let mut list = MemberList::new();
        list.absorb(vec![Reference::pending("a"), Reference::pending("c")]);

        assert!(list.insert(1, "b"));
        assert_eq!(delta_for(&list), Some(json!(["a", "b", "c"])));
    }

    #[test]
    fn pure_deltas_serialize_as_add_or_remove() {
        let mut list = MemberList::new();
        list.absorb(vec![Reference::pending("a")]);
        list.add("b");
        assert_eq!(delta_for(&list), Some(json!({ "add": ["b"] })));

        let mut list = MemberList::new();
        list.absorb(vec![Reference::pending("a")]);
        list.remove("a");
        assert_eq!(delta_for(&list), Some(json!({ "remove": ["a"] })));
    }

    #[test]
    fn create_payload_omits_empty_lists() {
        let list = MemberList::new();
        let mut out = Map::new();
        list.write_full("members", &mut out);
        assert!(out.is_empty());

        let mut list = MemberList::new();
        list.add("a");
        let mut out = Map::new();
        list.write_full("members", &mut out);
        assert_eq!(out.get("members"), Some(&json!(["a"])));
    }

    #[test]
    fn absorb_resets_delta_state() {
        let mut list = MemberList::new();
        list.add("a");
        list.remove("a");
        list.add("b");
        list.absorb(vec![Reference::pending("b")]);
        assert_eq!(list.action(), MemberAction::None);
        assert!(list.contains("b"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn distinct_keys() -> impl Strategy<Value = Vec<String>> {
            prop::collection::hash_set("[a-z]{1,8}", 1..12)
                .prop_map(|keys| keys.into_iter().collect())
        }

        proptest! {
            #[test]
            fn adding_then_removing_everything_nets_to_nothing(keys in distinct_keys()) {
                let mut list = MemberList::new();
                for key in &keys {
                    prop_assert!(list.add(key.as_str()));
                }
                for key in &keys {
                    prop_assert!(list.remove(key));
                }
                prop_assert_eq!(list.action(), MemberAction::None);
                prop_assert!(list.is_empty());
            }

            #[test]
            fn removing_then_readding_synced_members_nets_to_nothing(keys in distinct_keys()) {
                let mut list = MemberList::new();
                list.absorb(keys.iter().map(Reference::pending).collect());

                for key in &keys {
                    prop_assert!(list.remove(key));
                }
                for key in &keys {
                    prop_assert!(list.add(key.as_str()));
                }
                prop_assert_eq!(list.action(), MemberAction::None);
                prop_assert_eq!(list.len(), keys.len());
            }
        }
    }
}

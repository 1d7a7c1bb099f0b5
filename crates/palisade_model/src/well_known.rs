//! Built-in singletons the server addresses by bare name.
//!
//! Rule columns refer to a handful of built-ins (`Accept`, `Drop`, `Log`,
//! `Any`, ...) that no listing ever returns as plain objects. The registry
//! pins one shared instance per built-in so that every rule pointing at
//! `Accept` points at the same object, across responses.

use std::collections::HashMap;

use crate::objects::{GenericObject, ObjectHandle};

const ACTIONS: [&str; 5] = ["Accept", "Drop", "Reject", "Ask", "Inform"];
const TRACKS: [&str; 3] = ["None", "Log", "Alert"];
const SCOPES: [&str; 2] = ["Any", "Internet"];

/// The shared instances for built-in objects, keyed by every identifier
/// they answer to.
#[derive(Debug)]
pub struct WellKnownRegistry {
    by_id: HashMap<String, ObjectHandle>,
}

impl WellKnownRegistry {
    /// A registry with no entries.
    pub fn empty() -> Self {
        WellKnownRegistry {
            by_id: HashMap::new(),
        }
    }

    /// The standard set: rule actions, track settings and the `Any` and
    /// `Internet` match scopes.
    pub fn standard() -> Self {
        let mut registry = WellKnownRegistry::empty();
        for name in ACTIONS {
            registry.register(ObjectHandle::new(GenericObject::singleton(
                "RulebaseAction",
                name,
            )));
        }
        for name in TRACKS {
            registry.register(ObjectHandle::new(GenericObject::singleton("Track", name)));
        }
        for name in SCOPES {
            registry.register(ObjectHandle::new(GenericObject::singleton("Global", name)));
        }
        registry
    }

    /// Pins `handle` under its name and uid. Later registrations replace
    /// earlier ones for the same identifier.
    pub fn register(&mut self, handle: ObjectHandle) {
        if let Some(name) = handle.name() {
            self.by_id.insert(name, handle.clone());
        }
        if let Some(uid) = handle.uid() {
            self.by_id.insert(uid.to_string(), handle);
        }
    }

    /// The pinned instance for `identifier`, if any.
    pub fn get(&self, identifier: &str) -> Option<&ObjectHandle> {
        self.by_id.get(identifier)
    }

    /// Number of identifiers with a pinned instance.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Default for WellKnownRegistry {
    fn default() -> Self {
        WellKnownRegistry::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Object;

    #[test]
    fn standard_set_covers_actions_tracks_and_scopes() {
        let registry = WellKnownRegistry::standard();
        for name in ACTIONS.iter().chain(&TRACKS).chain(&SCOPES) {
            assert!(registry.get(name).is_some(), "missing built-in {name}");
        }
    }

    #[test]
    fn lookups_share_one_instance() {
        let registry = WellKnownRegistry::standard();
        let first = registry.get("Accept").unwrap();
        let second = registry.get("Accept").unwrap();
        assert!(first.same_object(second));
    }

    #[test]
    fn custom_registrations_answer_by_name_and_uid() {
        let mut registry = WellKnownRegistry::empty();
        registry.register(ObjectHandle::new(GenericObject::singleton(
            "Track",
            "Detailed Log",
        )));
        assert!(registry.get("Detailed Log").is_some());

        let custom = Object::create_generic("Track", "Extended Log");
        registry.register(custom.clone());
        assert!(registry.get("Extended Log").unwrap().same_object(&custom));
    }
}

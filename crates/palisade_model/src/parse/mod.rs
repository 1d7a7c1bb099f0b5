//! Response parsing with a per-response identity cache.
//!
//! A [`ParseSession`] turns the JSON of one server response into object
//! handles while guaranteeing that a uid maps to exactly one instance
//! within that response. Nodes register in the cache before their fields
//! are absorbed, which is what lets cyclic and self-referential documents
//! terminate; links to objects that have not appeared yet are held as
//! pending [`Reference`] cells and rebound in place by the resolution pass
//! that [`ParseSession::finish`] runs.
//!
//! Sessions are deliberately short-lived and single-threaded: one response,
//! one session, then [`ParseSession::finish`].

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::detail::DetailLevel;
use crate::error::{ModelError, ModelResult};
use crate::objects::{doc_str, ObjectHandle};
use crate::reference::Reference;
use crate::registry::{self, ObjectType};
use crate::uid::Uid;
use crate::well_known::WellKnownRegistry;

mod resolver;

/// Detail level implied for objects nested inside another object's fields.
const CHILD_DETAIL: DetailLevel = DetailLevel::Standard;

/// Counters describing what one parse did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    /// Instances allocated for uids first seen in this response.
    pub objects_built: usize,
    /// Nodes that reused an instance already in the cache.
    pub cache_hits: usize,
    /// Pending references bound during the resolution pass.
    pub references_bound: usize,
    /// References created by this session still pending after resolution.
    pub left_pending: usize,
}

/// Parses the nodes of one response into a shared object graph.
pub struct ParseSession<'a> {
    well_known: &'a WellKnownRegistry,
    requested: DetailLevel,
    cache: HashMap<String, ObjectHandle>,
    pending: HashMap<String, Reference>,
    roots: Vec<ObjectHandle>,
    root_target: Option<ObjectHandle>,
    stats: ParseStats,
}

impl<'a> ParseSession<'a> {
    /// A fresh session. `requested` is the detail level root nodes were
    /// asked for; nested nodes are absorbed at [`DetailLevel::Standard`].
    pub fn new(well_known: &'a WellKnownRegistry, requested: DetailLevel) -> Self {
        ParseSession {
            well_known,
            requested,
            cache: HashMap::new(),
            pending: HashMap::new(),
            roots: Vec::new(),
            root_target: None,
            stats: ParseStats::default(),
        }
    }

    /// Pre-registers an existing instance under its uid so the response is
    /// absorbed into it instead of allocating a fresh object. Returns
    /// `false` when the handle has no uid to register under.
    pub fn seed(&mut self, handle: &ObjectHandle) -> bool {
        let Some(uid) = handle.uid() else {
            return false;
        };
        self.cache.insert(uid.to_string(), handle.clone());
        true
    }

    /// Designates the instance the next root node is absorbed into, for
    /// reconciling a create response with the object that was uploaded.
    pub fn seed_root_target(&mut self, handle: &ObjectHandle) {
        self.root_target = Some(handle.clone());
    }

    /// Parses a root object node at the requested detail level.
    pub fn root(&mut self, value: &Value) -> ModelResult<ObjectHandle> {
        let doc = value
            .as_object()
            .ok_or_else(|| ModelError::malformed("root node must be an object"))?;
        if let Some(target) = self.root_target.take() {
            return self.build_into(target, doc);
        }
        let handle = self.build_node(doc, self.requested)?;
        self.roots.push(handle.clone());
        Ok(handle)
    }

    /// Parses a listing row: either a full object node or a bare uid
    /// string, which yields a uid-level shell.
    pub fn row(&mut self, value: &Value) -> ModelResult<ObjectHandle> {
        match value {
            Value::String(identifier) => {
                if let Some(well_known) = self.well_known.get(identifier) {
                    return Ok(well_known.clone());
                }
                if let Some(existing) = self.cache.get(identifier) {
                    self.stats.cache_hits += 1;
                    return Ok(existing.clone());
                }
                let shell = registry::instantiate_remote_generic(None, Uid::new(identifier.as_str()));
                let handle = ObjectHandle::new(shell);
                self.cache.insert(identifier.clone(), handle.clone());
                self.roots.push(handle.clone());
                self.stats.objects_built += 1;
                trace!(uid = %identifier, "registered uid shell");
                Ok(handle)
            }
            Value::Object(doc) => {
                let handle = self.build_node(doc, self.requested)?;
                self.roots.push(handle.clone());
                Ok(handle)
            }
            _ => Err(ModelError::malformed(
                "listing row must be a string or an object",
            )),
        }
    }

    /// Runs reference resolution and returns the session's counters.
    pub fn finish(mut self) -> ParseStats {
        self.resolve_references();
        debug!(
            objects_built = self.stats.objects_built,
            cache_hits = self.stats.cache_hits,
            references_bound = self.stats.references_bound,
            left_pending = self.stats.left_pending,
            "parse session finished"
        );
        self.stats
    }

    /// Builds or reuses the instance for an object node.
    ///
    /// The instance is registered in the cache before its fields are
    /// absorbed; a node that refers back to it, however deeply, gets the
    /// same instance instead of recursing forever.
    fn build_node(
        &mut self,
        doc: &Map<String, Value>,
        level: DetailLevel,
    ) -> ModelResult<ObjectHandle> {
        let raw_tag = doc.get("type").and_then(Value::as_str);
        let uid = doc_str(doc, "uid").ok_or_else(|| ModelError::MissingUid {
            type_tag: raw_tag.unwrap_or("object").to_owned(),
        })?;

        // Built-ins are pinned; their nodes are never absorbed.
        if let Some(well_known) = self.well_known.get(&uid) {
            return Ok(well_known.clone());
        }

        let tag = raw_tag.ok_or_else(|| ModelError::MissingType { uid: uid.clone() })?;
        let kind = ObjectType::from_discriminator(tag);

        let handle = if let Some(existing) = self.cache.get(&uid).cloned() {
            self.stats.cache_hits += 1;
            let Some(current) = existing.current_detail() else {
                // The instance is mid-absorption further up the stack. Its
                // header, uid and level are already in place, so it can be
                // handed out as is; absorbing again would re-enter it.
                return Ok(existing);
            };
            upgrade_kind(&existing, kind, tag, &uid)?;
            if current >= level {
                return Ok(existing);
            }
            existing
        } else {
            let shell = match kind {
                Some(kind) => registry::instantiate_remote(kind, Uid::new(uid.as_str())),
                None => registry::instantiate_remote_generic(
                    Some(tag.to_owned()),
                    Uid::new(uid.as_str()),
                ),
            };
            let handle = ObjectHandle::new(shell);
            self.cache.insert(uid.clone(), handle.clone());
            self.stats.objects_built += 1;
            trace!(uid = %uid, tag, "registered object");
            handle
        };

        let mut object = handle.borrow_mut();
        object.populate(doc, level, self)?;
        drop(object);
        Ok(handle)
    }

    /// Absorbs a root node into a designated existing instance.
    fn build_into(
        &mut self,
        target: ObjectHandle,
        doc: &Map<String, Value>,
    ) -> ModelResult<ObjectHandle> {
        let raw_tag = doc.get("type").and_then(Value::as_str);
        let uid = doc_str(doc, "uid").ok_or_else(|| ModelError::MissingUid {
            type_tag: raw_tag.unwrap_or("object").to_owned(),
        })?;
        let tag = raw_tag.ok_or_else(|| ModelError::MissingType { uid: uid.clone() })?;
        upgrade_kind(&target, ObjectType::from_discriminator(tag), tag, &uid)?;

        self.cache.insert(uid, target.clone());
        self.roots.push(target.clone());
        let mut object = target.borrow_mut();
        object.populate(doc, self.requested, self)?;
        drop(object);
        Ok(target)
    }

    /// A reference for a nested value: object nodes resolve immediately,
    /// identifier strings resolve through the cache or stay pending.
    pub(crate) fn child_reference(&mut self, value: &Value) -> ModelResult<Reference> {
        match value {
            Value::String(identifier) => Ok(self.reference_for(identifier)),
            Value::Object(doc) => {
                let handle = self.build_node(doc, CHILD_DETAIL)?;
                Ok(Reference::resolved(handle))
            }
            _ => Err(ModelError::malformed(
                "reference must be a string or an object",
            )),
        }
    }

    /// References for an array of nested values.
    pub(crate) fn child_references(&mut self, value: &Value) -> ModelResult<Vec<Reference>> {
        let rows = value
            .as_array()
            .ok_or_else(|| ModelError::malformed("membership must be an array"))?;
        rows.iter().map(|row| self.child_reference(row)).collect()
    }

    fn reference_for(&mut self, identifier: &str) -> Reference {
        if let Some(well_known) = self.well_known.get(identifier) {
            return Reference::resolved(well_known.clone());
        }
        if let Some(existing) = self.cache.get(identifier) {
            return Reference::resolved(existing.clone());
        }
        // Same identifier, same cell: every holder sees the target at once
        // when resolution binds it.
        self.pending
            .entry(identifier.to_owned())
            .or_insert_with(|| Reference::pending(identifier))
            .clone()
    }
}

/// Reconciles a cached instance with the discriminator of a new node for
/// the same uid.
///
/// A generic instance is upgraded in place when a typed tag arrives, so
/// every alias and reference cell observes the richer object. Two
/// different typed tags for one uid are a protocol violation. An unknown
/// tag on a typed instance is tolerated; the typed instance stays.
fn upgrade_kind(
    existing: &ObjectHandle,
    kind: Option<ObjectType>,
    tag: &str,
    uid: &str,
) -> ModelResult<()> {
    let current = existing.type_tag();
    match kind {
        Some(incoming) if current == ObjectType::Generic => {
            let shell = registry::instantiate_remote(incoming, Uid::new(uid));
            existing.replace_object(shell);
            trace!(uid = %uid, tag, "upgraded generic shell");
            Ok(())
        }
        Some(incoming) if incoming != current => Err(ModelError::TypeConflict {
            uid: Uid::new(uid),
            cached: current,
            incoming,
        }),
        _ => Ok(()),
    }
}

/// Parses a single object response at `level`.
pub fn parse_object(
    well_known: &WellKnownRegistry,
    level: DetailLevel,
    value: &Value,
) -> ModelResult<ObjectHandle> {
    let mut session = ParseSession::new(well_known, level);
    let handle = session.root(value)?;
    session.finish();
    Ok(handle)
}

/// Parses a batch of listing rows that share one identity cache.
pub fn parse_objects(
    well_known: &WellKnownRegistry,
    level: DetailLevel,
    values: &[Value],
) -> ModelResult<Vec<ObjectHandle>> {
    let mut session = ParseSession::new(well_known, level);
    let handles = values
        .iter()
        .map(|value| session.row(value))
        .collect::<ModelResult<Vec<_>>>()?;
    session.finish();
    Ok(handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Object;
    use serde_json::json;

    fn registry() -> WellKnownRegistry {
        WellKnownRegistry::standard()
    }

    #[test]
    fn duplicate_uids_collapse_to_one_instance() {
        let wk = registry();
        let group = json!({
            "uid": "g1", "type": "group", "name": "dmz",
            "members": [
                { "uid": "h1", "type": "host", "name": "web-srv", "ipv4-address": "10.0.0.7" },
                { "uid": "h1", "type": "host", "name": "web-srv" },
            ],
        });
        let handle = parse_object(&wk, DetailLevel::Full, &group).unwrap();
        let payload = handle.group().unwrap();
        let members = payload.members().unwrap();
        let first = members.get(0).unwrap().target().unwrap();
        let second = members.get(1).unwrap().target().unwrap();
        assert!(first.same_object(&second));
        assert_eq!(first.name().as_deref(), Some("web-srv"));
    }

    #[test]
    fn self_referential_documents_terminate() {
        let wk = registry();
        let group = json!({
            "uid": "g1", "type": "group", "name": "dmz",
            "members": [{
                "uid": "h1", "type": "host", "name": "web-srv",
                "groups": [{ "uid": "g1", "type": "group", "name": "dmz" }],
            }],
        });
        let handle = parse_object(&wk, DetailLevel::Full, &group).unwrap();
        let host = handle.group().unwrap().members().unwrap().get(0).unwrap().target().unwrap();

        // The nested host was absorbed at standard detail, so its group
        // links are only reachable through the reference walk.
        let mut back_targets = Vec::new();
        host.borrow().visit_references(&mut |reference| {
            if let Some(target) = reference.target() {
                back_targets.push(target);
            }
        });
        assert!(back_targets.iter().any(|target| target.same_object(&handle)));
        assert_eq!(handle.detail_level(), DetailLevel::Full);
        assert_eq!(host.detail_level(), DetailLevel::Standard);
    }

    #[test]
    fn detail_level_never_goes_down() {
        let wk = registry();
        let mut session = ParseSession::new(&wk, DetailLevel::Full);
        let full = json!({ "uid": "h1", "type": "host", "name": "web-srv", "comments": "edge" });
        let handle = session.root(&full).unwrap();
        assert_eq!(handle.detail_level(), DetailLevel::Full);

        // The same uid arriving as a nested, shallower node changes nothing.
        let group = json!({
            "uid": "g1", "type": "group", "name": "dmz",
            "members": [{ "uid": "h1", "type": "host", "name": "web-srv" }],
        });
        let group = session.root(&group).unwrap();
        session.finish();

        let member = group.group().unwrap().members().unwrap().get(0).unwrap().target().unwrap();
        assert!(member.same_object(&handle));
        assert_eq!(handle.detail_level(), DetailLevel::Full);
        assert_eq!(
            handle.borrow().meta().comments().unwrap(),
            Some("edge")
        );
    }

    #[test]
    fn uid_shells_are_upgraded_in_place() {
        let wk = registry();
        let rows = [
            json!("h1"),
            json!({ "uid": "h1", "type": "host", "name": "web-srv", "ipv4-address": "10.0.0.7" }),
        ];
        let handles = parse_objects(&wk, DetailLevel::Standard, &rows).unwrap();
        assert!(handles[0].same_object(&handles[1]));
        assert_eq!(handles[0].type_tag(), ObjectType::Host);
        let payload = handles[0].host().unwrap();
        assert_eq!(payload.ipv4_address().unwrap(), Some("10.0.0.7"));
    }

    #[test]
    fn conflicting_typed_tags_are_fatal() {
        let wk = registry();
        let rows = [
            json!({ "uid": "x1", "type": "host", "name": "a" }),
            json!({ "uid": "x1", "type": "network", "name": "a" }),
        ];
        let err = parse_objects(&wk, DetailLevel::Standard, &rows).unwrap_err();
        assert!(matches!(err, ModelError::TypeConflict { .. }));
    }

    #[test]
    fn unknown_tags_fall_back_to_generic() {
        let wk = registry();
        let node = json!({
            "uid": "d1", "type": "data-center", "name": "aws-east",
            "hostname": "dc.example.com",
        });
        let handle = parse_object(&wk, DetailLevel::Full, &node).unwrap();
        assert_eq!(handle.type_tag(), ObjectType::Generic);
        let payload = handle.generic().unwrap();
        assert_eq!(payload.raw_type(), Some("data-center"));
        assert_eq!(payload.field("hostname"), Some(&json!("dc.example.com")));
    }

    #[test]
    fn unknown_tag_on_a_typed_instance_is_tolerated() {
        let wk = registry();
        let rows = [
            json!({ "uid": "h1", "type": "host", "name": "web-srv" }),
            json!({ "uid": "h1", "type": "host-cluster-member", "name": "web-srv" }),
        ];
        let handles = parse_objects(&wk, DetailLevel::Standard, &rows).unwrap();
        assert_eq!(handles[1].type_tag(), ObjectType::Host);
        assert!(handles[0].same_object(&handles[1]));
    }

    #[test]
    fn nodes_without_uid_are_fatal() {
        let wk = registry();
        let group = json!({
            "uid": "g1", "type": "group", "name": "dmz",
            "members": [{ "type": "host", "name": "web-srv" }],
        });
        let err = parse_object(&wk, DetailLevel::Full, &group).unwrap_err();
        assert!(matches!(err, ModelError::MissingUid { type_tag } if type_tag == "host"));
    }

    #[test]
    fn nodes_without_a_type_tag_are_fatal() {
        let wk = registry();
        let node = json!({ "uid": "h1", "name": "web-srv" });
        let err = parse_object(&wk, DetailLevel::Full, &node).unwrap_err();
        assert!(matches!(err, ModelError::MissingType { uid } if uid == "h1"));
    }

    #[test]
    fn non_object_roots_are_fatal() {
        let wk = registry();
        let err = parse_object(&wk, DetailLevel::Full, &json!(42)).unwrap_err();
        assert!(matches!(err, ModelError::Malformed(_)));
    }

    #[test]
    fn well_known_names_resolve_to_pinned_instances() {
        let wk = registry();
        let rule = json!({
            "uid": "r1", "type": "access-rule", "name": "allow-web",
            "action": "Accept", "track": "Log",
            "source": ["Any"],
        });
        let handle = parse_object(&wk, DetailLevel::Full, &rule).unwrap();
        let payload = handle.access_rule().unwrap();
        let action = payload.action().unwrap().unwrap().target().unwrap();
        assert!(action.same_object(wk.get("Accept").unwrap()));
        let any = payload.source().unwrap().get(0).unwrap().target().unwrap();
        assert!(any.same_object(wk.get("Any").unwrap()));
    }

    #[test]
    fn seeded_instances_absorb_the_response() {
        let wk = registry();
        let first = parse_object(
            &wk,
            DetailLevel::Standard,
            &json!({ "uid": "h1", "type": "host", "name": "web-srv" }),
        )
        .unwrap();

        let mut session = ParseSession::new(&wk, DetailLevel::Full);
        assert!(session.seed(&first));
        let again = session
            .root(&json!({
                "uid": "h1", "type": "host", "name": "web-srv",
                "ipv4-address": "10.0.0.7", "comments": "edge",
            }))
            .unwrap();
        session.finish();

        assert!(again.same_object(&first));
        assert_eq!(first.detail_level(), DetailLevel::Full);
    }

    #[test]
    fn seeding_requires_a_uid() {
        let wk = registry();
        let local = Object::create(ObjectType::Host, "web-srv");
        let mut session = ParseSession::new(&wk, DetailLevel::Full);
        assert!(!session.seed(&local));
    }

    #[test]
    fn root_target_reconciles_a_create_response() {
        let wk = registry();
        let local = Object::create(ObjectType::Host, "web-srv");
        local.host_mut().unwrap().set_ipv4_address("10.0.0.7");
        assert!(local.is_new());
        assert!(local.is_changed());

        let mut session = ParseSession::new(&wk, DetailLevel::Full);
        session.seed_root_target(&local);
        let returned = session
            .root(&json!({
                "uid": "srv-42", "type": "host", "name": "web-srv",
                "ipv4-address": "10.0.0.7",
            }))
            .unwrap();
        session.finish();

        assert!(returned.same_object(&local));
        assert!(!local.is_new());
        assert_eq!(local.uid().unwrap().as_str(), "srv-42");
        assert!(!local.is_changed());
    }

    #[test]
    fn stats_count_builds_and_hits() {
        let wk = registry();
        let mut session = ParseSession::new(&wk, DetailLevel::Standard);
        session
            .row(&json!({ "uid": "h1", "type": "host", "name": "a" }))
            .unwrap();
        session
            .row(&json!({ "uid": "h1", "type": "host", "name": "a" }))
            .unwrap();
        session.row(&json!("h2")).unwrap();
        let stats = session.finish();
        assert_eq!(stats.objects_built, 2);
        assert_eq!(stats.cache_hits, 1);
    }
}

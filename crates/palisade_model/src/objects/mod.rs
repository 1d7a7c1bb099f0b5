//! The typed object universe.
//!
//! Every kind of managed object the server can return is a variant of
//! [`Object`]. Several variants share a payload struct when the server gives
//! them the same shape (the three port-based service kinds all carry
//! [`Service`], for example). Kinds the client has no type for are held as
//! [`GenericObject`] so that unknown data still participates in identity
//! and graph resolution.
//!
//! Objects live behind [`ObjectHandle`]s: cheap, shared, interior-mutable
//! handles with pointer identity. The parser guarantees that one uid maps to
//! one handle within a response, so `same_object` is the identity test.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::changes::{ChangeSet, WriteMode};
use crate::detail::DetailLevel;
use crate::error::ModelResult;
use crate::members::MemberList;
use crate::meta::Meta;
use crate::parse::ParseSession;
use crate::reference::Reference;
use crate::registry::{self, ObjectType};
use crate::uid::Uid;

mod access;
mod application;
mod generic;
mod group;
mod nat;
mod network;
mod service;

pub use access::{AccessLayer, AccessRule};
pub use application::ApplicationSite;
pub use generic::{GenericObject, Plain};
pub use group::{Group, GroupWithExclusion};
pub use nat::NatSettings;
pub use network::{AddressRange, DnsDomain, Host, Network, SimpleGateway};
pub use service::{IcmpService, OtherService, Service};

/// Dispatches `$body` over every variant's payload.
macro_rules! with_object {
    ($object:expr, $payload:ident => $body:expr) => {
        match $object {
            Object::Host($payload) => $body,
            Object::Network($payload) => $body,
            Object::AddressRange($payload) => $body,
            Object::MulticastAddressRange($payload) => $body,
            Object::DnsDomain($payload) => $body,
            Object::SecurityZone($payload) => $body,
            Object::Tag($payload) => $body,
            Object::Group($payload) => $body,
            Object::GroupWithExclusion($payload) => $body,
            Object::ServiceTcp($payload) => $body,
            Object::ServiceUdp($payload) => $body,
            Object::ServiceSctp($payload) => $body,
            Object::ServiceIcmp($payload) => $body,
            Object::ServiceIcmp6($payload) => $body,
            Object::ServiceOther($payload) => $body,
            Object::ServiceGroup($payload) => $body,
            Object::ApplicationSite($payload) => $body,
            Object::ApplicationSiteCategory($payload) => $body,
            Object::ApplicationSiteGroup($payload) => $body,
            Object::AccessRule($payload) => $body,
            Object::AccessSection($payload) => $body,
            Object::AccessLayer($payload) => $body,
            Object::Time($payload) => $body,
            Object::TimeGroup($payload) => $body,
            Object::SimpleGateway($payload) => $body,
            Object::Generic($payload) => $body,
        }
    };
}

/// Behavior every payload implements so [`Object`] can treat all kinds
/// uniformly.
pub(crate) trait ObjectCodec {
    /// The shared header state.
    fn meta(&self) -> &Meta;
    /// Mutable access to the shared header state.
    fn meta_mut(&mut self) -> &mut Meta;
    /// Absorbs the kind-specific fields of a response node.
    fn populate_fields(
        &mut self,
        doc: &Map<String, Value>,
        session: &mut ParseSession<'_>,
    ) -> ModelResult<()>;
    /// Writes the kind-specific fields of a create or update payload.
    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>);
    /// Calls `visit` for every outgoing reference the payload holds.
    fn visit_references(&self, visit: &mut dyn FnMut(&Reference)) {
        let _ = visit;
    }
    /// Whether any tracked child state (membership lists, nested settings)
    /// has pending changes.
    fn tracked_children_changed(&self) -> bool {
        false
    }
    /// Marks all tracked child state as synced.
    fn mark_children_synced(&mut self) {}
}

/// A managed object of any kind.
#[derive(Debug)]
pub enum Object {
    /// A single IPv4/IPv6 host.
    Host(Host),
    /// An IPv4/IPv6 subnet.
    Network(Network),
    /// A contiguous address range.
    AddressRange(AddressRange),
    /// A contiguous multicast address range.
    MulticastAddressRange(AddressRange),
    /// A DNS domain matcher.
    DnsDomain(DnsDomain),
    /// A topology security zone.
    SecurityZone(Plain),
    /// A tag attachable to other objects.
    Tag(Plain),
    /// A group of network objects.
    Group(Group),
    /// A group defined by inclusion minus exclusion.
    GroupWithExclusion(GroupWithExclusion),
    /// A TCP service.
    ServiceTcp(Service),
    /// A UDP service.
    ServiceUdp(Service),
    /// An SCTP service.
    ServiceSctp(Service),
    /// An ICMP service.
    ServiceIcmp(IcmpService),
    /// An ICMPv6 service.
    ServiceIcmp6(IcmpService),
    /// A service matched by raw IP protocol number.
    ServiceOther(OtherService),
    /// A group of services.
    ServiceGroup(Group),
    /// An application or web site.
    ApplicationSite(ApplicationSite),
    /// A category of application sites.
    ApplicationSiteCategory(Plain),
    /// A group of application sites.
    ApplicationSiteGroup(Group),
    /// A rule in an access layer.
    AccessRule(AccessRule),
    /// A section header inside a rulebase.
    AccessSection(Plain),
    /// An ordered layer of access rules.
    AccessLayer(AccessLayer),
    /// A time object.
    Time(Plain),
    /// A group of time objects.
    TimeGroup(Group),
    /// A gateway definition.
    SimpleGateway(SimpleGateway),
    /// Any kind the client has no dedicated type for.
    Generic(GenericObject),
}

impl Object {
    /// Creates a new local object of a typed kind and wraps it in a handle.
    /// The object starts dirty in nothing but its name and has no uid until
    /// the server accepts it.
    pub fn create(type_tag: ObjectType, name: impl Into<String>) -> ObjectHandle {
        let mut object = registry::instantiate_new(type_tag);
        object.meta_mut().set_name(name);
        ObjectHandle::new(object)
    }

    /// Creates a new local object of a kind the client has no type for,
    /// keeping the raw discriminator so writes can still be routed.
    pub fn create_generic(raw_type: impl Into<String>, name: impl Into<String>) -> ObjectHandle {
        let mut object = registry::instantiate_new_generic(raw_type.into());
        object.meta_mut().set_name(name);
        ObjectHandle::new(object)
    }

    /// The shared header state.
    pub fn meta(&self) -> &Meta {
        with_object!(self, payload => payload.meta())
    }

    /// Mutable access to the shared header state.
    pub fn meta_mut(&mut self) -> &mut Meta {
        with_object!(self, payload => payload.meta_mut())
    }

    /// The discriminator this object was built for.
    pub fn type_tag(&self) -> ObjectType {
        self.meta().type_tag()
    }

    /// Whether anything about this object diverges from the server.
    pub fn is_changed(&self) -> bool {
        self.meta().is_changed() || with_object!(self, payload => payload.tracked_children_changed())
    }

    /// Absorbs a response node: header first, then tags and kind fields.
    /// Ends with all local change tracking cleared, since the node is by
    /// definition the server's view.
    pub(crate) fn populate(
        &mut self,
        doc: &Map<String, Value>,
        level: DetailLevel,
        session: &mut ParseSession<'_>,
    ) -> ModelResult<()> {
        // The level must be promoted before any nested node can re-enter
        // this object through the identity cache.
        self.meta_mut().absorb_header(doc, level);
        if let Some(tags) = doc.get("tags") {
            let items = session.child_references(tags)?;
            self.meta_mut().tags.absorb(items);
        }
        with_object!(self, payload => payload.populate_fields(doc, session))?;
        self.meta_mut().mark_synced();
        with_object!(self, payload => payload.mark_children_synced());
        Ok(())
    }

    /// Builds the wire payload for a create or update. The uid never
    /// appears in either mode; updates address the object by name.
    pub fn serialize_for(&self, mode: WriteMode) -> Map<String, Value> {
        let mut out = Map::new();
        self.meta().write_header(mode, &mut out);
        with_object!(self, payload => payload.write_fields(mode, &mut out));
        out
    }

    /// Calls `visit` for every outgoing reference, tags included.
    pub(crate) fn visit_references(&self, visit: &mut dyn FnMut(&Reference)) {
        for reference in self.meta().tags.iter() {
            visit(reference);
        }
        with_object!(self, payload => payload.visit_references(visit));
    }
}

/// A shared handle to an [`Object`].
///
/// Handles are reference counted and interiorly mutable; clones alias the
/// same object. Identity is pointer identity, checked with
/// [`ObjectHandle::same_object`].
#[derive(Clone)]
pub struct ObjectHandle(Rc<RefCell<Object>>);

impl ObjectHandle {
    pub(crate) fn new(object: Object) -> Self {
        ObjectHandle(Rc::new(RefCell::new(object)))
    }

    /// Borrows the object immutably.
    ///
    /// # Panics
    ///
    /// Panics if the object is mutably borrowed, as with [`RefCell`].
    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    /// Borrows the object mutably.
    ///
    /// # Panics
    ///
    /// Panics if the object is already borrowed, as with [`RefCell`].
    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.0.borrow_mut()
    }

    /// Whether two handles alias the same object.
    pub fn same_object(&self, other: &ObjectHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Stable address for identity sets.
    pub(crate) fn ptr_key(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// The detail level, or `None` while the object is mutably borrowed,
    /// which the parser reads as "absorption in progress".
    pub(crate) fn current_detail(&self) -> Option<DetailLevel> {
        self.0
            .try_borrow()
            .ok()
            .map(|object| object.meta().detail_level())
    }

    /// Replaces the held object, preserving the handle identity that every
    /// alias and reference cell sees.
    pub(crate) fn replace_object(&self, object: Object) {
        *self.0.borrow_mut() = object;
    }

    /// The object's name, if it has one.
    pub fn name(&self) -> Option<String> {
        self.borrow().meta().name().map(str::to_owned)
    }

    /// The name requests should address the object by.
    pub fn lookup_name(&self) -> Option<String> {
        self.borrow().meta().lookup_name().map(str::to_owned)
    }

    /// The server-assigned identifier, if any.
    pub fn uid(&self) -> Option<Uid> {
        self.borrow().meta().uid().cloned()
    }

    /// The discriminator of the held object.
    pub fn type_tag(&self) -> ObjectType {
        self.borrow().type_tag()
    }

    /// How deeply the object has been fetched.
    pub fn detail_level(&self) -> DetailLevel {
        self.borrow().meta().detail_level()
    }

    /// Whether the server has never seen this object.
    pub fn is_new(&self) -> bool {
        self.borrow().meta().is_new()
    }

    /// Whether anything about this object diverges from the server.
    pub fn is_changed(&self) -> bool {
        self.borrow().is_changed()
    }

    /// The host payload, when this handle holds a host.
    pub fn host(&self) -> Option<Ref<'_, Host>> {
        Ref::filter_map(self.borrow(), |object| match object {
            Object::Host(payload) => Some(payload),
            _ => None,
        })
        .ok()
    }

    /// Mutable host payload access.
    pub fn host_mut(&self) -> Option<RefMut<'_, Host>> {
        RefMut::filter_map(self.borrow_mut(), |object| match object {
            Object::Host(payload) => Some(payload),
            _ => None,
        })
        .ok()
    }

    /// The network payload, when this handle holds a network.
    pub fn network(&self) -> Option<Ref<'_, Network>> {
        Ref::filter_map(self.borrow(), |object| match object {
            Object::Network(payload) => Some(payload),
            _ => None,
        })
        .ok()
    }

    /// Mutable network payload access.
    pub fn network_mut(&self) -> Option<RefMut<'_, Network>> {
        RefMut::filter_map(self.borrow_mut(), |object| match object {
            Object::Network(payload) => Some(payload),
            _ => None,
        })
        .ok()
    }

    /// The group payload, for any of the group-shaped kinds.
    pub fn group(&self) -> Option<Ref<'_, Group>> {
        Ref::filter_map(self.borrow(), |object| match object {
            Object::Group(payload)
            | Object::ServiceGroup(payload)
            | Object::ApplicationSiteGroup(payload)
            | Object::TimeGroup(payload) => Some(payload),
            _ => None,
        })
        .ok()
    }

    /// Mutable group payload access, for any of the group-shaped kinds.
    pub fn group_mut(&self) -> Option<RefMut<'_, Group>> {
        RefMut::filter_map(self.borrow_mut(), |object| match object {
            Object::Group(payload)
            | Object::ServiceGroup(payload)
            | Object::ApplicationSiteGroup(payload)
            | Object::TimeGroup(payload) => Some(payload),
            _ => None,
        })
        .ok()
    }

    /// The service payload, for the port-based service kinds.
    pub fn service(&self) -> Option<Ref<'_, Service>> {
        Ref::filter_map(self.borrow(), |object| match object {
            Object::ServiceTcp(payload)
            | Object::ServiceUdp(payload)
            | Object::ServiceSctp(payload) => Some(payload),
            _ => None,
        })
        .ok()
    }

    /// Mutable service payload access, for the port-based service kinds.
    pub fn service_mut(&self) -> Option<RefMut<'_, Service>> {
        RefMut::filter_map(self.borrow_mut(), |object| match object {
            Object::ServiceTcp(payload)
            | Object::ServiceUdp(payload)
            | Object::ServiceSctp(payload) => Some(payload),
            _ => None,
        })
        .ok()
    }

    /// The access rule payload, when this handle holds a rule.
    pub fn access_rule(&self) -> Option<Ref<'_, AccessRule>> {
        Ref::filter_map(self.borrow(), |object| match object {
            Object::AccessRule(payload) => Some(payload),
            _ => None,
        })
        .ok()
    }

    /// Mutable access rule payload access.
    pub fn access_rule_mut(&self) -> Option<RefMut<'_, AccessRule>> {
        RefMut::filter_map(self.borrow_mut(), |object| match object {
            Object::AccessRule(payload) => Some(payload),
            _ => None,
        })
        .ok()
    }

    /// The generic payload, when this handle holds an untyped object.
    pub fn generic(&self) -> Option<Ref<'_, GenericObject>> {
        Ref::filter_map(self.borrow(), |object| match object {
            Object::Generic(payload) => Some(payload),
            _ => None,
        })
        .ok()
    }

    /// Mutable generic payload access.
    pub fn generic_mut(&self) -> Option<RefMut<'_, GenericObject>> {
        RefMut::filter_map(self.borrow_mut(), |object| match object {
            Object::Generic(payload) => Some(payload),
            _ => None,
        })
        .ok()
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Shallow on purpose: printing targets would recurse through
        // reference cycles.
        match self.0.try_borrow() {
            Ok(object) => {
                let meta = object.meta();
                f.debug_struct("ObjectHandle")
                    .field("type", &meta.type_tag())
                    .field("name", &meta.name())
                    .field("uid", &meta.uid())
                    .finish()
            }
            Err(_) => f.write_str("ObjectHandle(<borrowed>)"),
        }
    }
}

pub(crate) fn doc_str(doc: &Map<String, Value>, key: &str) -> Option<String> {
    doc.get(key).and_then(Value::as_str).map(str::to_owned)
}

pub(crate) fn doc_bool(doc: &Map<String, Value>, key: &str) -> Option<bool> {
    doc.get(key).and_then(Value::as_bool)
}

pub(crate) fn doc_u16(doc: &Map<String, Value>, key: &str) -> Option<u16> {
    doc.get(key)
        .and_then(Value::as_u64)
        .and_then(|wide| u16::try_from(wide).ok())
}

pub(crate) fn doc_u32(doc: &Map<String, Value>, key: &str) -> Option<u32> {
    doc.get(key)
        .and_then(Value::as_u64)
        .and_then(|wide| u32::try_from(wide).ok())
}

fn write_str(out: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        out.insert(key.to_owned(), Value::String(value.clone()));
    }
}

/// Emits an optional string field: always in create mode, only when marked
/// changed in update mode.
pub(crate) fn emit_str(
    out: &mut Map<String, Value>,
    mode: WriteMode,
    changes: &ChangeSet,
    key: &'static str,
    value: &Option<String>,
) {
    match mode {
        WriteMode::Create => write_str(out, key, value),
        WriteMode::Update => {
            if changes.contains(key) {
                write_str(out, key, value);
            }
        }
    }
}

/// Emits an optional bool field under the same rules as [`emit_str`].
pub(crate) fn emit_bool(
    out: &mut Map<String, Value>,
    mode: WriteMode,
    changes: &ChangeSet,
    key: &'static str,
    value: &Option<bool>,
) {
    let include = match mode {
        WriteMode::Create => value.is_some(),
        WriteMode::Update => changes.contains(key),
    };
    if include {
        if let Some(value) = value {
            out.insert(key.to_owned(), Value::Bool(*value));
        }
    }
}

/// Emits an optional unsigned field under the same rules as [`emit_str`].
pub(crate) fn emit_u64(
    out: &mut Map<String, Value>,
    mode: WriteMode,
    changes: &ChangeSet,
    key: &'static str,
    value: Option<u64>,
) {
    let include = match mode {
        WriteMode::Create => value.is_some(),
        WriteMode::Update => changes.contains(key),
    };
    if include {
        if let Some(value) = value {
            out.insert(key.to_owned(), Value::from(value));
        }
    }
}

/// Emits a membership field: the full array in create mode, the pending
/// delta in update mode.
pub(crate) fn emit_members(
    out: &mut Map<String, Value>,
    mode: WriteMode,
    field: &'static str,
    list: &MemberList,
) {
    match mode {
        WriteMode::Create => list.write_full(field, out),
        WriteMode::Update => list.write_delta(field, out),
    }
}

/// Emits a single-reference field as its wire key under the same rules as
/// [`emit_str`].
pub(crate) fn emit_reference(
    out: &mut Map<String, Value>,
    mode: WriteMode,
    changes: &ChangeSet,
    key: &'static str,
    value: &Option<Reference>,
) {
    let include = match mode {
        WriteMode::Create => value.is_some(),
        WriteMode::Update => changes.contains(key),
    };
    if include {
        if let Some(wire_key) = value.as_ref().and_then(Reference::key) {
            out.insert(key.to_owned(), Value::String(wire_key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_objects_are_new_full_and_named() {
        let host = Object::create(ObjectType::Host, "web-srv");
        assert!(host.is_new());
        assert_eq!(host.detail_level(), DetailLevel::Full);
        assert_eq!(host.name().as_deref(), Some("web-srv"));
        assert_eq!(host.type_tag(), ObjectType::Host);
        assert!(host.is_changed());
    }

    #[test]
    fn typed_accessors_match_only_their_kind() {
        let host = Object::create(ObjectType::Host, "h");
        assert!(host.host().is_some());
        assert!(host.network().is_none());
        assert!(host.group().is_none());
    }

    #[test]
    fn group_accessor_spans_group_shaped_kinds() {
        let services = Object::create(ObjectType::ServiceGroup, "web-ports");
        assert!(services.group().is_some());
        let times = Object::create(ObjectType::TimeGroup, "off-hours");
        assert!(times.group().is_some());
    }

    #[test]
    fn create_payload_never_contains_uid() {
        let host = Object::create(ObjectType::Host, "web-srv");
        if let Some(mut payload) = host.host_mut() {
            payload.set_ipv4_address("10.0.0.7");
        }
        let doc = host.borrow().serialize_for(WriteMode::Create);
        assert!(!doc.contains_key("uid"));
        assert_eq!(doc.get("name"), Some(&Value::String("web-srv".into())));
        assert_eq!(
            doc.get("ipv4-address"),
            Some(&Value::String("10.0.0.7".into()))
        );
    }

    #[test]
    fn handle_debug_is_shallow() {
        let host = Object::create(ObjectType::Host, "web-srv");
        let printed = format!("{host:?}");
        assert!(printed.contains("web-srv"));
        assert!(printed.contains("Host"));
    }

    #[test]
    fn clones_share_identity() {
        let host = Object::create(ObjectType::Host, "h");
        let alias = host.clone();
        assert!(host.same_object(&alias));
        let other = Object::create(ObjectType::Host, "h");
        assert!(!host.same_object(&other));
    }
}

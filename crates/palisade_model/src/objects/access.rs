//! Access control payloads.

use serde_json::{Map, Value};

use crate::changes::{assign, WriteMode};
use crate::detail::DetailLevel;
use crate::error::ModelResult;
use crate::members::{Member, MemberList};
use crate::meta::Meta;
use crate::parse::ParseSession;
use crate::reference::Reference;

use super::{doc_bool, emit_bool, emit_members, emit_reference, ObjectCodec};

/// A rule in an access layer.
///
/// The action and track columns point at well-known singletons (`Accept`,
/// `Drop`, `Log`, ...); the match columns are membership lists over the
/// object graph.
#[derive(Debug)]
pub struct AccessRule {
    meta: Meta,
    enabled: Option<bool>,
    action: Option<Reference>,
    track: Option<Reference>,
    source: MemberList,
    destination: MemberList,
    service: MemberList,
}

impl AccessRule {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        AccessRule {
            meta,
            enabled: None,
            action: None,
            track: None,
            source: MemberList::new(),
            destination: MemberList::new(),
            service: MemberList::new(),
        }
    }

    /// The shared header state.
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Mutable access to the shared header state.
    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    /// Whether the rule is enabled.
    pub fn enabled(&self) -> ModelResult<Option<bool>> {
        self.meta.require("enabled", DetailLevel::Standard)?;
        Ok(self.enabled)
    }

    /// Enables or disables the rule.
    pub fn set_enabled(&mut self, enabled: bool) {
        assign(&mut self.meta.changes, "enabled", &mut self.enabled, Some(enabled));
    }

    /// The rule's action.
    pub fn action(&self) -> ModelResult<Option<&Reference>> {
        self.meta.require("action", DetailLevel::Standard)?;
        Ok(self.action.as_ref())
    }

    /// Sets the action, typically by well-known name (`"Accept"`, `"Drop"`).
    pub fn set_action(&mut self, action: impl Into<Member>) {
        self.action = Some(action.into().into_reference());
        self.meta.changes.mark("action");
    }

    /// The rule's tracking setting.
    pub fn track(&self) -> ModelResult<Option<&Reference>> {
        self.meta.require("track", DetailLevel::Standard)?;
        Ok(self.track.as_ref())
    }

    /// Sets the tracking setting, typically by well-known name (`"Log"`).
    pub fn set_track(&mut self, track: impl Into<Member>) {
        self.track = Some(track.into().into_reference());
        self.meta.changes.mark("track");
    }

    /// The source match column.
    pub fn source(&self) -> ModelResult<&MemberList> {
        self.meta.require("source", DetailLevel::Standard)?;
        Ok(&self.source)
    }

    /// Mutable access to the source column.
    pub fn source_mut(&mut self) -> ModelResult<&mut MemberList> {
        self.meta.require("source", DetailLevel::Standard)?;
        Ok(&mut self.source)
    }

    /// The destination match column.
    pub fn destination(&self) -> ModelResult<&MemberList> {
        self.meta.require("destination", DetailLevel::Standard)?;
        Ok(&self.destination)
    }

    /// Mutable access to the destination column.
    pub fn destination_mut(&mut self) -> ModelResult<&mut MemberList> {
        self.meta.require("destination", DetailLevel::Standard)?;
        Ok(&mut self.destination)
    }

    /// The service match column.
    pub fn service(&self) -> ModelResult<&MemberList> {
        self.meta.require("service", DetailLevel::Standard)?;
        Ok(&self.service)
    }

    /// Mutable access to the service column.
    pub fn service_mut(&mut self) -> ModelResult<&mut MemberList> {
        self.meta.require("service", DetailLevel::Standard)?;
        Ok(&mut self.service)
    }
}

impl ObjectCodec for AccessRule {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn populate_fields(
        &mut self,
        doc: &Map<String, Value>,
        session: &mut ParseSession<'_>,
    ) -> ModelResult<()> {
        if let Some(enabled) = doc_bool(doc, "enabled") {
            self.enabled = Some(enabled);
        }
        if let Some(action) = doc.get("action") {
            self.action = Some(session.child_reference(action)?);
        }
        if let Some(track) = doc.get("track") {
            self.track = Some(session.child_reference(track)?);
        }
        if let Some(source) = doc.get("source") {
            self.source.absorb(session.child_references(source)?);
        }
        if let Some(destination) = doc.get("destination") {
            self.destination.absorb(session.child_references(destination)?);
        }
        if let Some(service) = doc.get("service") {
            self.service.absorb(session.child_references(service)?);
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        let changes = &self.meta.changes;
        emit_bool(out, mode, changes, "enabled", &self.enabled);
        emit_reference(out, mode, changes, "action", &self.action);
        emit_reference(out, mode, changes, "track", &self.track);
        emit_members(out, mode, "source", &self.source);
        emit_members(out, mode, "destination", &self.destination);
        emit_members(out, mode, "service", &self.service);
    }

    fn visit_references(&self, visit: &mut dyn FnMut(&Reference)) {
        if let Some(action) = &self.action {
            visit(action);
        }
        if let Some(track) = &self.track {
            visit(track);
        }
        for column in [&self.source, &self.destination, &self.service] {
            for reference in column.iter() {
                visit(reference);
            }
        }
    }

    fn tracked_children_changed(&self) -> bool {
        self.source.has_pending() || self.destination.has_pending() || self.service.has_pending()
    }

    fn mark_children_synced(&mut self) {
        self.source.clear_delta();
        self.destination.clear_delta();
        self.service.clear_delta();
    }
}

/// An ordered layer of access rules. The rules themselves are fetched
/// through the rulebase listing, not embedded here.
#[derive(Debug)]
pub struct AccessLayer {
    meta: Meta,
    shared: Option<bool>,
}

impl AccessLayer {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        AccessLayer { meta, shared: None }
    }

    /// The shared header state.
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Mutable access to the shared header state.
    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    /// Whether the layer is shared between policies.
    pub fn shared(&self) -> ModelResult<Option<bool>> {
        self.meta.require("shared", DetailLevel::Full)?;
        Ok(self.shared)
    }

    /// Marks the layer as shared.
    pub fn set_shared(&mut self, shared: bool) {
        assign(&mut self.meta.changes, "shared", &mut self.shared, Some(shared));
    }
}

impl ObjectCodec for AccessLayer {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn populate_fields(
        &mut self,
        doc: &Map<String, Value>,
        _session: &mut ParseSession<'_>,
    ) -> ModelResult<()> {
        if let Some(shared) = doc_bool(doc, "shared") {
            self.shared = Some(shared);
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        emit_bool(out, mode, &self.meta.changes, "shared", &self.shared);
    }
}

//! Service payloads.

use serde_json::{Map, Value};

use crate::changes::{assign, WriteMode};
use crate::detail::DetailLevel;
use crate::error::ModelResult;
use crate::members::MemberList;
use crate::meta::Meta;
use crate::parse::ParseSession;
use crate::reference::Reference;

use super::{doc_bool, doc_str, doc_u16, doc_u32, emit_bool, emit_members, emit_str, emit_u64, ObjectCodec};

/// A port-based service. The same shape serves the TCP, UDP and SCTP
/// kinds; the discriminator on the object says which protocol it is.
#[derive(Debug)]
pub struct Service {
    meta: Meta,
    port: Option<String>,
    match_for_any: Option<bool>,
    session_timeout: Option<u32>,
    groups: MemberList,
}

impl Service {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        Service {
            meta,
            port: None,
            match_for_any: None,
            session_timeout: None,
            groups: MemberList::new(),
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

    /// The port, or a port range like `8000-8100`.
    pub fn port(&self) -> ModelResult<Option<&str>> {
        self.meta.require("port", DetailLevel::Standard)?;
        Ok(self.port.as_deref())
    }

    /// Sets the port or port range.
    pub fn set_port(&mut self, port: impl Into<String>) {
        assign(&mut self.meta.changes, "port", &mut self.port, Some(port.into()));
    }

    /// Whether the service matches rules whose service column is `Any`.
    pub fn match_for_any(&self) -> ModelResult<Option<bool>> {
        self.meta.require("match-for-any", DetailLevel::Full)?;
        Ok(self.match_for_any)
    }

    /// Sets `Any`-column matching.
    pub fn set_match_for_any(&mut self, matches: bool) {
        assign(
            &mut self.meta.changes,
            "match-for-any",
            &mut self.match_for_any,
            Some(matches),
        );
    }

    /// Idle session timeout in seconds.
    pub fn session_timeout(&self) -> ModelResult<Option<u32>> {
        self.meta.require("session-timeout", DetailLevel::Full)?;
        Ok(self.session_timeout)
    }

    /// Sets the idle session timeout.
    pub fn set_session_timeout(&mut self, seconds: u32) {
        assign(
            &mut self.meta.changes,
            "session-timeout",
            &mut self.session_timeout,
            Some(seconds),
        );
    }

    /// Service groups this service belongs to.
    pub fn groups(&self) -> ModelResult<&MemberList> {
        self.meta.require("groups", DetailLevel::Full)?;
        Ok(&self.groups)
    }

    /// Mutable access to the group memberships.
    pub fn groups_mut(&mut self) -> ModelResult<&mut MemberList> {
        self.meta.require("groups", DetailLevel::Full)?;
        Ok(&mut self.groups)
    }
}

impl ObjectCodec for Service {
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
        // Some releases send ports as numbers, some as strings.
        if let Some(port) = doc_str(doc, "port") {
            self.port = Some(port);
        } else if let Some(port) = doc.get("port").and_then(Value::as_u64) {
            self.port = Some(port.to_string());
        }
        if let Some(matches) = doc_bool(doc, "match-for-any") {
            self.match_for_any = Some(matches);
        }
        if let Some(seconds) = doc_u32(doc, "session-timeout") {
            self.session_timeout = Some(seconds);
        }
        if let Some(groups) = doc.get("groups") {
            self.groups.absorb(session.child_references(groups)?);
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        let changes = &self.meta.changes;
        emit_str(out, mode, changes, "port", &self.port);
        emit_bool(out, mode, changes, "match-for-any", &self.match_for_any);
        emit_u64(out, mode, changes, "session-timeout", self.session_timeout.map(u64::from));
        emit_members(out, mode, "groups", &self.groups);
    }

    fn visit_references(&self, visit: &mut dyn FnMut(&Reference)) {
        for reference in self.groups.iter() {
            visit(reference);
        }
    }

    fn tracked_children_changed(&self) -> bool {
        self.groups.has_pending()
    }

    fn mark_children_synced(&mut self) {
        self.groups.clear_delta();
    }
}

/// An ICMP or ICMPv6 service, matched by type and code.
#[derive(Debug)]
pub struct IcmpService {
    meta: Meta,
    icmp_type: Option<u16>,
    icmp_code: Option<u16>,
    groups: MemberList,
}

impl IcmpService {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        IcmpService {
            meta,
            icmp_type: None,
            icmp_code: None,
            groups: MemberList::new(),
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

    /// The ICMP type number.
    pub fn icmp_type(&self) -> ModelResult<Option<u16>> {
        self.meta.require("icmp-type", DetailLevel::Standard)?;
        Ok(self.icmp_type)
    }

    /// Sets the ICMP type number.
    pub fn set_icmp_type(&mut self, icmp_type: u16) {
        assign(
            &mut self.meta.changes,
            "icmp-type",
            &mut self.icmp_type,
            Some(icmp_type),
        );
    }

    /// The ICMP code number.
    pub fn icmp_code(&self) -> ModelResult<Option<u16>> {
        self.meta.require("icmp-code", DetailLevel::Standard)?;
        Ok(self.icmp_code)
    }

    /// Sets the ICMP code number.
    pub fn set_icmp_code(&mut self, icmp_code: u16) {
        assign(
            &mut self.meta.changes,
            "icmp-code",
            &mut self.icmp_code,
            Some(icmp_code),
        );
    }

    /// Service groups this service belongs to.
    pub fn groups(&self) -> ModelResult<&MemberList> {
        self.meta.require("groups", DetailLevel::Full)?;
        Ok(&self.groups)
    }

    /// Mutable access to the group memberships.
    pub fn groups_mut(&mut self) -> ModelResult<&mut MemberList> {
        self.meta.require("groups", DetailLevel::Full)?;
        Ok(&mut self.groups)
    }
}

impl ObjectCodec for IcmpService {
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
        if let Some(icmp_type) = doc_u16(doc, "icmp-type") {
            self.icmp_type = Some(icmp_type);
        }
        if let Some(icmp_code) = doc_u16(doc, "icmp-code") {
            self.icmp_code = Some(icmp_code);
        }
        if let Some(groups) = doc.get("groups") {
            self.groups.absorb(session.child_references(groups)?);
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        let changes = &self.meta.changes;
        emit_u64(out, mode, changes, "icmp-type", self.icmp_type.map(u64::from));
        emit_u64(out, mode, changes, "icmp-code", self.icmp_code.map(u64::from));
        emit_members(out, mode, "groups", &self.groups);
    }

    fn visit_references(&self, visit: &mut dyn FnMut(&Reference)) {
        for reference in self.groups.iter() {
            visit(reference);
        }
    }

    fn tracked_children_changed(&self) -> bool {
        self.groups.has_pending()
    }

    fn mark_children_synced(&mut self) {
        self.groups.clear_delta();
    }
}

/// A service matched by raw IP protocol number.
#[derive(Debug)]
pub struct OtherService {
    meta: Meta,
    ip_protocol: Option<u16>,
    groups: MemberList,
}

impl OtherService {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        OtherService {
            meta,
            ip_protocol: None,
            groups: MemberList::new(),
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

    /// The IP protocol number.
    pub fn ip_protocol(&self) -> ModelResult<Option<u16>> {
        self.meta.require("ip-protocol", DetailLevel::Standard)?;
        Ok(self.ip_protocol)
    }

    /// Sets the IP protocol number.
    pub fn set_ip_protocol(&mut self, protocol: u16) {
        assign(
            &mut self.meta.changes,
            "ip-protocol",
            &mut self.ip_protocol,
            Some(protocol),
        );
    }

    /// Service groups this service belongs to.
    pub fn groups(&self) -> ModelResult<&MemberList> {
        self.meta.require("groups", DetailLevel::Full)?;
        Ok(&self.groups)
    }

    /// Mutable access to the group memberships.
    pub fn groups_mut(&mut self) -> ModelResult<&mut MemberList> {
        self.meta.require("groups", DetailLevel::Full)?;
        Ok(&mut self.groups)
    }
}

impl ObjectCodec for OtherService {
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
        if let Some(protocol) = doc_u16(doc, "ip-protocol") {
            self.ip_protocol = Some(protocol);
        }
        if let Some(groups) = doc.get("groups") {
            self.groups.absorb(session.child_references(groups)?);
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        let changes = &self.meta.changes;
        emit_u64(out, mode, changes, "ip-protocol", self.ip_protocol.map(u64::from));
        emit_members(out, mode, "groups", &self.groups);
    }

    fn visit_references(&self, visit: &mut dyn FnMut(&Reference)) {
        for reference in self.groups.iter() {
            visit(reference);
        }
    }

    fn tracked_children_changed(&self) -> bool {
        self.groups.has_pending()
    }

    fn mark_children_synced(&mut self) {
        self.groups.clear_delta();
    }
}

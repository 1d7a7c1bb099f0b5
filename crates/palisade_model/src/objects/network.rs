//! Host, network and address payloads.

use serde_json::{Map, Value};

use crate::changes::{assign, WriteMode};
use crate::detail::DetailLevel;
use crate::error::ModelResult;
use crate::members::MemberList;
use crate::meta::Meta;
use crate::parse::ParseSession;
use crate::reference::Reference;

use super::{
    doc_bool, doc_str, doc_u32, emit_bool, emit_members, emit_str, emit_u64, NatSettings,
    ObjectCodec,
};

/// A single addressable host.
#[derive(Debug)]
pub struct Host {
    meta: Meta,
    ipv4_address: Option<String>,
    ipv6_address: Option<String>,
    nat: NatSettings,
    groups: MemberList,
}

impl Host {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        Host {
            meta,
            ipv4_address: None,
            ipv6_address: None,
            nat: NatSettings::new(),
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

    /// The host's IPv4 address.
    pub fn ipv4_address(&self) -> ModelResult<Option<&str>> {
        self.meta.require("ipv4-address", DetailLevel::Standard)?;
        Ok(self.ipv4_address.as_deref())
    }

    /// Sets the IPv4 address.
    pub fn set_ipv4_address(&mut self, address: impl Into<String>) {
        assign(
            &mut self.meta.changes,
            "ipv4-address",
            &mut self.ipv4_address,
            Some(address.into()),
        );
    }

    /// The host's IPv6 address.
    pub fn ipv6_address(&self) -> ModelResult<Option<&str>> {
        self.meta.require("ipv6-address", DetailLevel::Standard)?;
        Ok(self.ipv6_address.as_deref())
    }

    /// Sets the IPv6 address.
    pub fn set_ipv6_address(&mut self, address: impl Into<String>) {
        assign(
            &mut self.meta.changes,
            "ipv6-address",
            &mut self.ipv6_address,
            Some(address.into()),
        );
    }

    /// The host's NAT configuration.
    pub fn nat_settings(&self) -> ModelResult<&NatSettings> {
        self.meta.require("nat-settings", DetailLevel::Full)?;
        Ok(&self.nat)
    }

    /// Mutable access to the NAT configuration.
    pub fn nat_settings_mut(&mut self) -> ModelResult<&mut NatSettings> {
        self.meta.require("nat-settings", DetailLevel::Full)?;
        Ok(&mut self.nat)
    }

    /// Groups this host belongs to.
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

impl ObjectCodec for Host {
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
        if let Some(address) = doc_str(doc, "ipv4-address") {
            self.ipv4_address = Some(address);
        }
        if let Some(address) = doc_str(doc, "ipv6-address") {
            self.ipv6_address = Some(address);
        }
        if let Some(nat) = doc.get("nat-settings") {
            self.nat.populate(nat)?;
        }
        if let Some(groups) = doc.get("groups") {
            self.groups.absorb(session.child_references(groups)?);
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        emit_str(out, mode, &self.meta.changes, "ipv4-address", &self.ipv4_address);
        emit_str(out, mode, &self.meta.changes, "ipv6-address", &self.ipv6_address);
        self.nat.write(mode, out);
        emit_members(out, mode, "groups", &self.groups);
    }

    fn visit_references(&self, visit: &mut dyn FnMut(&Reference)) {
        for reference in self.groups.iter() {
            visit(reference);
        }
    }

    fn tracked_children_changed(&self) -> bool {
        self.groups.has_pending() || self.nat.is_changed()
    }

    fn mark_children_synced(&mut self) {
        self.groups.clear_delta();
        self.nat.mark_synced();
    }
}

/// An IPv4/IPv6 subnet.
#[derive(Debug)]
pub struct Network {
    meta: Meta,
    subnet4: Option<String>,
    mask_length4: Option<u32>,
    subnet6: Option<String>,
    mask_length6: Option<u32>,
    broadcast: Option<String>,
    nat: NatSettings,
    groups: MemberList,
}

impl Network {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        Network {
            meta,
            subnet4: None,
            mask_length4: None,
            subnet6: None,
            mask_length6: None,
            broadcast: None,
            nat: NatSettings::new(),
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

    /// The IPv4 subnet address.
    pub fn subnet4(&self) -> ModelResult<Option<&str>> {
        self.meta.require("subnet4", DetailLevel::Standard)?;
        Ok(self.subnet4.as_deref())
    }

    /// Sets the IPv4 subnet address.
    pub fn set_subnet4(&mut self, subnet: impl Into<String>) {
        assign(
            &mut self.meta.changes,
            "subnet4",
            &mut self.subnet4,
            Some(subnet.into()),
        );
    }

    /// The IPv4 prefix length.
    pub fn mask_length4(&self) -> ModelResult<Option<u32>> {
        self.meta.require("mask-length4", DetailLevel::Standard)?;
        Ok(self.mask_length4)
    }

    /// Sets the IPv4 prefix length.
    pub fn set_mask_length4(&mut self, length: u32) {
        assign(
            &mut self.meta.changes,
            "mask-length4",
            &mut self.mask_length4,
            Some(length),
        );
    }

    /// The IPv6 subnet address.
    pub fn subnet6(&self) -> ModelResult<Option<&str>> {
        self.meta.require("subnet6", DetailLevel::Standard)?;
        Ok(self.subnet6.as_deref())
    }

    /// Sets the IPv6 subnet address.
    pub fn set_subnet6(&mut self, subnet: impl Into<String>) {
        assign(
            &mut self.meta.changes,
            "subnet6",
            &mut self.subnet6,
            Some(subnet.into()),
        );
    }

    /// The IPv6 prefix length.
    pub fn mask_length6(&self) -> ModelResult<Option<u32>> {
        self.meta.require("mask-length6", DetailLevel::Standard)?;
        Ok(self.mask_length6)
    }

    /// Sets the IPv6 prefix length.
    pub fn set_mask_length6(&mut self, length: u32) {
        assign(
            &mut self.meta.changes,
            "mask-length6",
            &mut self.mask_length6,
            Some(length),
        );
    }

    /// Whether broadcast traffic is matched (`allow` or `disallow`).
    pub fn broadcast(&self) -> ModelResult<Option<&str>> {
        self.meta.require("broadcast", DetailLevel::Full)?;
        Ok(self.broadcast.as_deref())
    }

    /// Sets the broadcast matching mode.
    pub fn set_broadcast(&mut self, broadcast: impl Into<String>) {
        assign(
            &mut self.meta.changes,
            "broadcast",
            &mut self.broadcast,
            Some(broadcast.into()),
        );
    }

    /// The network's NAT configuration.
    pub fn nat_settings(&self) -> ModelResult<&NatSettings> {
        self.meta.require("nat-settings", DetailLevel::Full)?;
        Ok(&self.nat)
    }

    /// Mutable access to the NAT configuration.
    pub fn nat_settings_mut(&mut self) -> ModelResult<&mut NatSettings> {
        self.meta.require("nat-settings", DetailLevel::Full)?;
        Ok(&mut self.nat)
    }

    /// Groups this network belongs to.
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

impl ObjectCodec for Network {
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
        if let Some(subnet) = doc_str(doc, "subnet4") {
            self.subnet4 = Some(subnet);
        }
        if let Some(length) = doc_u32(doc, "mask-length4") {
            self.mask_length4 = Some(length);
        }
        if let Some(subnet) = doc_str(doc, "subnet6") {
            self.subnet6 = Some(subnet);
        }
        if let Some(length) = doc_u32(doc, "mask-length6") {
            self.mask_length6 = Some(length);
        }
        if let Some(broadcast) = doc_str(doc, "broadcast") {
            self.broadcast = Some(broadcast);
        }
        if let Some(nat) = doc.get("nat-settings") {
            self.nat.populate(nat)?;
        }
        if let Some(groups) = doc.get("groups") {
            self.groups.absorb(session.child_references(groups)?);
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        let changes = &self.meta.changes;
        emit_str(out, mode, changes, "subnet4", &self.subnet4);
        emit_u64(out, mode, changes, "mask-length4", self.mask_length4.map(u64::from));
        emit_str(out, mode, changes, "subnet6", &self.subnet6);
        emit_u64(out, mode, changes, "mask-length6", self.mask_length6.map(u64::from));
        emit_str(out, mode, changes, "broadcast", &self.broadcast);
        self.nat.write(mode, out);
        emit_members(out, mode, "groups", &self.groups);
    }

    fn visit_references(&self, visit: &mut dyn FnMut(&Reference)) {
        for reference in self.groups.iter() {
            visit(reference);
        }
    }

    fn tracked_children_changed(&self) -> bool {
        self.groups.has_pending() || self.nat.is_changed()
    }

    fn mark_children_synced(&mut self) {
        self.groups.clear_delta();
        self.nat.mark_synced();
    }
}

/// A contiguous range of addresses, unicast or multicast.
#[derive(Debug)]
pub struct AddressRange {
    meta: Meta,
    ipv4_first: Option<String>,
    ipv4_last: Option<String>,
    ipv6_first: Option<String>,
    ipv6_last: Option<String>,
    groups: MemberList,
}

impl AddressRange {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        AddressRange {
            meta,
            ipv4_first: None,
            ipv4_last: None,
            ipv6_first: None,
            ipv6_last: None,
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

    /// First IPv4 address of the range.
    pub fn ipv4_first(&self) -> ModelResult<Option<&str>> {
        self.meta.require("ipv4-address-first", DetailLevel::Standard)?;
        Ok(self.ipv4_first.as_deref())
    }

    /// Sets the first IPv4 address.
    pub fn set_ipv4_first(&mut self, address: impl Into<String>) {
        assign(
            &mut self.meta.changes,
            "ipv4-address-first",
            &mut self.ipv4_first,
            Some(address.into()),
        );
    }

    /// Last IPv4 address of the range.
    pub fn ipv4_last(&self) -> ModelResult<Option<&str>> {
        self.meta.require("ipv4-address-last", DetailLevel::Standard)?;
        Ok(self.ipv4_last.as_deref())
    }

    /// Sets the last IPv4 address.
    pub fn set_ipv4_last(&mut self, address: impl Into<String>) {
        assign(
            &mut self.meta.changes,
            "ipv4-address-last",
            &mut self.ipv4_last,
            Some(address.into()),
        );
    }

    /// First IPv6 address of the range.
    pub fn ipv6_first(&self) -> ModelResult<Option<&str>> {
        self.meta.require("ipv6-address-first", DetailLevel::Standard)?;
        Ok(self.ipv6_first.as_deref())
    }

    /// Sets the first IPv6 address.
    pub fn set_ipv6_first(&mut self, address: impl Into<String>) {
        assign(
            &mut self.meta.changes,
            "ipv6-address-first",
            &mut self.ipv6_first,
            Some(address.into()),
        );
    }

    /// Last IPv6 address of the range.
    pub fn ipv6_last(&self) -> ModelResult<Option<&str>> {
        self.meta.require("ipv6-address-last", DetailLevel::Standard)?;
        Ok(self.ipv6_last.as_deref())
    }

    /// Sets the last IPv6 address.
    pub fn set_ipv6_last(&mut self, address: impl Into<String>) {
        assign(
            &mut self.meta.changes,
            "ipv6-address-last",
            &mut self.ipv6_last,
            Some(address.into()),
        );
    }

    /// Groups this range belongs to.
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

impl ObjectCodec for AddressRange {
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
        if let Some(address) = doc_str(doc, "ipv4-address-first") {
            self.ipv4_first = Some(address);
        }
        if let Some(address) = doc_str(doc, "ipv4-address-last") {
            self.ipv4_last = Some(address);
        }
        if let Some(address) = doc_str(doc, "ipv6-address-first") {
            self.ipv6_first = Some(address);
        }
        if let Some(address) = doc_str(doc, "ipv6-address-last") {
            self.ipv6_last = Some(address);
        }
        if let Some(groups) = doc.get("groups") {
            self.groups.absorb(session.child_references(groups)?);
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        let changes = &self.meta.changes;
        emit_str(out, mode, changes, "ipv4-address-first", &self.ipv4_first);
        emit_str(out, mode, changes, "ipv4-address-last", &self.ipv4_last);
        emit_str(out, mode, changes, "ipv6-address-first", &self.ipv6_first);
        emit_str(out, mode, changes, "ipv6-address-last", &self.ipv6_last);
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

/// A DNS domain matcher. Domain names start with a dot.
#[derive(Debug)]
pub struct DnsDomain {
    meta: Meta,
    is_sub_domain: Option<bool>,
}

impl DnsDomain {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        DnsDomain {
            meta,
            is_sub_domain: None,
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

    /// Whether sub-domains of the domain also match.
    pub fn is_sub_domain(&self) -> ModelResult<Option<bool>> {
        self.meta.require("is-sub-domain", DetailLevel::Standard)?;
        Ok(self.is_sub_domain)
    }

    /// Sets sub-domain matching.
    pub fn set_is_sub_domain(&mut self, matches: bool) {
        assign(
            &mut self.meta.changes,
            "is-sub-domain",
            &mut self.is_sub_domain,
            Some(matches),
        );
    }
}

impl ObjectCodec for DnsDomain {
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
        if let Some(matches) = doc_bool(doc, "is-sub-domain") {
            self.is_sub_domain = Some(matches);
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        emit_bool(out, mode, &self.meta.changes, "is-sub-domain", &self.is_sub_domain);
    }
}

/// A gateway definition.
#[derive(Debug)]
pub struct SimpleGateway {
    meta: Meta,
    ipv4_address: Option<String>,
    ipv6_address: Option<String>,
    version: Option<String>,
}

impl SimpleGateway {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        SimpleGateway {
            meta,
            ipv4_address: None,
            ipv6_address: None,
            version: None,
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

    /// The gateway's IPv4 address.
    pub fn ipv4_address(&self) -> ModelResult<Option<&str>> {
        self.meta.require("ipv4-address", DetailLevel::Standard)?;
        Ok(self.ipv4_address.as_deref())
    }

    /// Sets the IPv4 address.
    pub fn set_ipv4_address(&mut self, address: impl Into<String>) {
        assign(
            &mut self.meta.changes,
            "ipv4-address",
            &mut self.ipv4_address,
            Some(address.into()),
        );
    }

    /// The gateway's IPv6 address.
    pub fn ipv6_address(&self) -> ModelResult<Option<&str>> {
        self.meta.require("ipv6-address", DetailLevel::Standard)?;
        Ok(self.ipv6_address.as_deref())
    }

    /// Sets the IPv6 address.
    pub fn set_ipv6_address(&mut self, address: impl Into<String>) {
        assign(
            &mut self.meta.changes,
            "ipv6-address",
            &mut self.ipv6_address,
            Some(address.into()),
        );
    }

    /// The installed software version.
    pub fn version(&self) -> ModelResult<Option<&str>> {
        self.meta.require("version", DetailLevel::Standard)?;
        Ok(self.version.as_deref())
    }

    /// Sets the software version.
    pub fn set_version(&mut self, version: impl Into<String>) {
        assign(
            &mut self.meta.changes,
            "version",
            &mut self.version,
            Some(version.into()),
        );
    }
}

impl ObjectCodec for SimpleGateway {
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
        if let Some(address) = doc_str(doc, "ipv4-address") {
            self.ipv4_address = Some(address);
        }
        if let Some(address) = doc_str(doc, "ipv6-address") {
            self.ipv6_address = Some(address);
        }
        if let Some(version) = doc_str(doc, "version") {
            self.version = Some(version);
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        let changes = &self.meta.changes;
        emit_str(out, mode, changes, "ipv4-address", &self.ipv4_address);
        emit_str(out, mode, changes, "ipv6-address", &self.ipv6_address);
        emit_str(out, mode, changes, "version", &self.version);
    }
}

//! The discriminator table: wire tags to concrete kinds.

use std::fmt;

use crate::meta::Meta;
use crate::objects::{
    AccessLayer, AccessRule, AddressRange, ApplicationSite, DnsDomain, GenericObject, Group,
    GroupWithExclusion, Host, IcmpService, Network, Object, OtherService, Plain, Service,
    SimpleGateway,
};
use crate::uid::Uid;

/// Every kind the client models, plus [`ObjectType::Generic`] for the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ObjectType {
    Host,
    Network,
    AddressRange,
    MulticastAddressRange,
    DnsDomain,
    SecurityZone,
    Tag,
    Group,
    GroupWithExclusion,
    ServiceTcp,
    ServiceUdp,
    ServiceSctp,
    ServiceIcmp,
    ServiceIcmp6,
    ServiceOther,
    ServiceGroup,
    ApplicationSite,
    ApplicationSiteCategory,
    ApplicationSiteGroup,
    AccessRule,
    AccessSection,
    AccessLayer,
    Time,
    TimeGroup,
    SimpleGateway,
    /// Any discriminator the table does not list.
    Generic,
}

/// All typed kinds, in wire-tag order. Excludes [`ObjectType::Generic`],
/// which has no discriminator of its own.
pub const TYPED_KINDS: [ObjectType; 25] = [
    ObjectType::Host,
    ObjectType::Network,
    ObjectType::AddressRange,
    ObjectType::MulticastAddressRange,
    ObjectType::DnsDomain,
    ObjectType::SecurityZone,
    ObjectType::Tag,
    ObjectType::Group,
    ObjectType::GroupWithExclusion,
    ObjectType::ServiceTcp,
    ObjectType::ServiceUdp,
    ObjectType::ServiceSctp,
    ObjectType::ServiceIcmp,
    ObjectType::ServiceIcmp6,
    ObjectType::ServiceOther,
    ObjectType::ServiceGroup,
    ObjectType::ApplicationSite,
    ObjectType::ApplicationSiteCategory,
    ObjectType::ApplicationSiteGroup,
    ObjectType::AccessRule,
    ObjectType::AccessSection,
    ObjectType::AccessLayer,
    ObjectType::Time,
    ObjectType::TimeGroup,
    ObjectType::SimpleGateway,
];

impl ObjectType {
    /// The wire discriminator, as it appears in `type` fields and command
    /// names. `Generic` answers the server's own catch-all tag.
    pub fn discriminator(self) -> &'static str {
        match self {
            ObjectType::Host => "host",
            ObjectType::Network => "network",
            ObjectType::AddressRange => "address-range",
            ObjectType::MulticastAddressRange => "multicast-address-range",
            ObjectType::DnsDomain => "dns-domain",
            ObjectType::SecurityZone => "security-zone",
            ObjectType::Tag => "tag",
            ObjectType::Group => "group",
            ObjectType::GroupWithExclusion => "group-with-exclusion",
            ObjectType::ServiceTcp => "service-tcp",
            ObjectType::ServiceUdp => "service-udp",
            ObjectType::ServiceSctp => "service-sctp",
            ObjectType::ServiceIcmp => "service-icmp",
            ObjectType::ServiceIcmp6 => "service-icmp6",
            ObjectType::ServiceOther => "service-other",
            ObjectType::ServiceGroup => "service-group",
            ObjectType::ApplicationSite => "application-site",
            ObjectType::ApplicationSiteCategory => "application-site-category",
            ObjectType::ApplicationSiteGroup => "application-site-group",
            ObjectType::AccessRule => "access-rule",
            ObjectType::AccessSection => "access-section",
            ObjectType::AccessLayer => "access-layer",
            ObjectType::Time => "time",
            ObjectType::TimeGroup => "time-group",
            ObjectType::SimpleGateway => "simple-gateway",
            ObjectType::Generic => "object",
        }
    }

    /// The plural command suffix used by listings (`show-hosts`,
    /// `show-services-tcp`). Rules list through the rulebase command.
    pub fn listing_suffix(self) -> &'static str {
        match self {
            ObjectType::Host => "hosts",
            ObjectType::Network => "networks",
            ObjectType::AddressRange => "address-ranges",
            ObjectType::MulticastAddressRange => "multicast-address-ranges",
            ObjectType::DnsDomain => "dns-domains",
            ObjectType::SecurityZone => "security-zones",
            ObjectType::Tag => "tags",
            ObjectType::Group => "groups",
            ObjectType::GroupWithExclusion => "groups-with-exclusion",
            ObjectType::ServiceTcp => "services-tcp",
            ObjectType::ServiceUdp => "services-udp",
            ObjectType::ServiceSctp => "services-sctp",
            ObjectType::ServiceIcmp => "services-icmp",
            ObjectType::ServiceIcmp6 => "services-icmp6",
            ObjectType::ServiceOther => "services-other",
            ObjectType::ServiceGroup => "service-groups",
            ObjectType::ApplicationSite => "application-sites",
            ObjectType::ApplicationSiteCategory => "application-site-categories",
            ObjectType::ApplicationSiteGroup => "application-site-groups",
            ObjectType::AccessRule => "access-rulebase",
            ObjectType::AccessSection => "access-sections",
            ObjectType::AccessLayer => "access-layers",
            ObjectType::Time => "times",
            ObjectType::TimeGroup => "time-groups",
            ObjectType::SimpleGateway => "simple-gateways",
            ObjectType::Generic => "objects",
        }
    }

    /// Looks a wire tag up in the table. Unknown tags return `None` and are
    /// handled generically by the parser.
    pub fn from_discriminator(tag: &str) -> Option<ObjectType> {
        TYPED_KINDS
            .into_iter()
            .find(|kind| kind.discriminator() == tag)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.discriminator())
    }
}

fn build(meta: Meta) -> Object {
    match meta.type_tag() {
        ObjectType::Host => Object::Host(Host::with_meta(meta)),
        ObjectType::Network => Object::Network(Network::with_meta(meta)),
        ObjectType::AddressRange => Object::AddressRange(AddressRange::with_meta(meta)),
        ObjectType::MulticastAddressRange => {
            Object::MulticastAddressRange(AddressRange::with_meta(meta))
        }
        ObjectType::DnsDomain => Object::DnsDomain(DnsDomain::with_meta(meta)),
        ObjectType::SecurityZone => Object::SecurityZone(Plain::with_meta(meta)),
        ObjectType::Tag => Object::Tag(Plain::with_meta(meta)),
        ObjectType::Group => Object::Group(Group::with_meta(meta)),
        ObjectType::GroupWithExclusion => {
            Object::GroupWithExclusion(GroupWithExclusion::with_meta(meta))
        }
        ObjectType::ServiceTcp => Object::ServiceTcp(Service::with_meta(meta)),
        ObjectType::ServiceUdp => Object::ServiceUdp(Service::with_meta(meta)),
        ObjectType::ServiceSctp => Object::ServiceSctp(Service::with_meta(meta)),
        ObjectType::ServiceIcmp => Object::ServiceIcmp(IcmpService::with_meta(meta)),
        ObjectType::ServiceIcmp6 => Object::ServiceIcmp6(IcmpService::with_meta(meta)),
        ObjectType::ServiceOther => Object::ServiceOther(OtherService::with_meta(meta)),
        ObjectType::ServiceGroup => Object::ServiceGroup(Group::with_meta(meta)),
        ObjectType::ApplicationSite => Object::ApplicationSite(ApplicationSite::with_meta(meta)),
        ObjectType::ApplicationSiteCategory => {
            Object::ApplicationSiteCategory(Plain::with_meta(meta))
        }
        ObjectType::ApplicationSiteGroup => Object::ApplicationSiteGroup(Group::with_meta(meta)),
        ObjectType::AccessRule => Object::AccessRule(AccessRule::with_meta(meta)),
        ObjectType::AccessSection => Object::AccessSection(Plain::with_meta(meta)),
        ObjectType::AccessLayer => Object::AccessLayer(AccessLayer::with_meta(meta)),
        ObjectType::Time => Object::Time(Plain::with_meta(meta)),
        ObjectType::TimeGroup => Object::TimeGroup(Group::with_meta(meta)),
        ObjectType::SimpleGateway => Object::SimpleGateway(SimpleGateway::with_meta(meta)),
        ObjectType::Generic => Object::Generic(GenericObject::with_meta(meta)),
    }
}

/// A blank local object of a typed kind.
pub(crate) fn instantiate_new(type_tag: ObjectType) -> Object {
    build(Meta::new(type_tag))
}

/// A blank local object of an untyped kind, keeping the raw tag.
pub(crate) fn instantiate_new_generic(raw_type: String) -> Object {
    Object::Generic(GenericObject::with_raw_type(
        Meta::new(ObjectType::Generic),
        raw_type,
    ))
}

/// A uid-level shell for an object the server mentioned by reference.
pub(crate) fn instantiate_remote(type_tag: ObjectType, uid: Uid) -> Object {
    build(Meta::remote(type_tag, uid))
}

/// A uid-level generic shell, optionally keeping an unrecognized raw tag.
pub(crate) fn instantiate_remote_generic(raw_type: Option<String>, uid: Uid) -> Object {
    let meta = Meta::remote(ObjectType::Generic, uid);
    match raw_type {
        Some(raw_type) => Object::Generic(GenericObject::with_raw_type(meta, raw_type)),
        None => Object::Generic(GenericObject::with_meta(meta)),
    }
}

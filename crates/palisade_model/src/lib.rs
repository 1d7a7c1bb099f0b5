//! # Palisade Object Model
//!
//! The typed object graph behind the Palisade management client:
//!
//! - **Objects**: every managed kind as a variant of [`Object`], shared
//!   behind [`ObjectHandle`]s with pointer identity.
//! - **Parsing**: [`ParseSession`] maps one response to one instance per
//!   uid, absorbs nodes at their detail level and resolves forward
//!   references.
//! - **Detail levels**: [`DetailLevel`] records how deeply an object was
//!   fetched; reads above the fetched level fail fast instead of returning
//!   absent data.
//! - **Change tracking**: [`ChangeSet`] and [`MemberList`] record local
//!   divergence so updates transmit exactly what changed.
//!
//! The graph is deliberately single-threaded: handles are `Rc`-based and
//! meant to live inside one management session.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod changes;
mod detail;
mod error;
mod members;
mod meta;
mod objects;
mod parse;
mod reference;
mod registry;
mod uid;
mod well_known;

pub use changes::{ChangeSet, WriteMode};
pub use detail::DetailLevel;
pub use error::{ModelError, ModelResult};
pub use members::{Member, MemberAction, MemberList};
pub use meta::Meta;
pub use objects::{
    AccessLayer, AccessRule, AddressRange, ApplicationSite, DnsDomain, GenericObject, Group,
    GroupWithExclusion, Host, IcmpService, NatSettings, Network, Object, ObjectHandle,
    OtherService, Plain, Service, SimpleGateway,
};
pub use parse::{parse_object, parse_objects, ParseSession, ParseStats};
pub use reference::Reference;
pub use registry::{ObjectType, TYPED_KINDS};
pub use uid::Uid;
pub use well_known::WellKnownRegistry;

//! Property-based test generators using proptest.
//!
//! Strategies for the value shapes the client deals in: object names,
//! addresses, detail levels and whole listing fleets.

use proptest::prelude::*;
use serde_json::Value;

use palisade_model::DetailLevel;

use crate::fixtures;

/// Strategy for valid object names.
pub fn object_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{2,15}").expect("Invalid regex")
}

/// Strategy for IPv4 addresses.
pub fn ipv4_strategy() -> impl Strategy<Value = String> {
    (0u8..=255, 0u8..=255, 0u8..=255, 1u8..=254)
        .prop_map(|(a, b, c, d)| format!("{a}.{b}.{c}.{d}"))
}

/// Strategy over the three detail levels.
pub fn detail_level_strategy() -> impl Strategy<Value = DetailLevel> {
    prop_oneof![
        Just(DetailLevel::Uid),
        Just(DetailLevel::Standard),
        Just(DetailLevel::Full),
    ]
}

/// Strategy for page window sizes small enough to force several pages.
pub fn page_limit_strategy() -> impl Strategy<Value = u32> {
    1u32..=20
}

/// Strategy for a fleet of host documents with unique uids and names.
pub fn host_fleet_strategy(max: usize) -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(ipv4_strategy(), 0..=max).prop_map(|addresses| {
        addresses
            .iter()
            .enumerate()
            .map(|(index, address)| {
                fixtures::host_doc(
                    &format!("00000000-0000-0000-0000-{index:012}"),
                    &format!("host-{index}"),
                    address,
                )
            })
            .collect()
    })
}

//! # Palisade Bench
//!
//! Shared document builders for the benchmark suites.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde_json::{json, Value};

/// Host rows for a listing of `count` objects.
pub fn listing_rows(count: usize) -> Vec<Value> {
    (0..count)
        .map(|index| {
            json!({
                "uid": format!("00000000-0000-0000-0000-{index:012}"),
                "type": "host",
                "name": format!("host-{index}"),
                "ipv4-address": format!("10.{}.{}.{}", index / 65536, (index / 256) % 256, index % 256),
            })
        })
        .collect()
}

/// A group document nesting `depth` levels of `width` subgroups, with a
/// host leaf under each innermost group.
pub fn nested_group_doc(depth: usize, width: usize) -> Value {
    let mut next_uid = 0usize;
    build_group(depth, width, &mut next_uid)
}

fn build_group(depth: usize, width: usize, next_uid: &mut usize) -> Value {
    let uid = *next_uid;
    *next_uid += 1;
    if depth == 0 {
        return json!({
            "uid": format!("leaf-{uid}"),
            "type": "host",
            "name": format!("leaf-{uid}"),
            "ipv4-address": "10.0.0.1",
        });
    }
    let members: Vec<Value> = (0..width)
        .map(|_| build_group(depth - 1, width, next_uid))
        .collect();
    json!({
        "uid": format!("group-{uid}"),
        "type": "group",
        "name": format!("group-{uid}"),
        "members": members,
    })
}

/// Listing rows where `count` groups reference `count` hosts by bare uid
/// before the host documents appear, exercising deferred resolution.
pub fn forward_reference_rows(count: usize) -> Vec<Value> {
    let mut rows: Vec<Value> = (0..count)
        .map(|index| {
            let members: Vec<Value> = (0..count)
                .map(|target| json!(format!("fwd-{target}")))
                .collect();
            json!({
                "uid": format!("grp-{index}"),
                "type": "group",
                "name": format!("grp-{index}"),
                "members": members,
            })
        })
        .collect();
    rows.extend((0..count).map(|index| {
        json!({
            "uid": format!("fwd-{index}"),
            "type": "host",
            "name": format!("fwd-{index}"),
            "ipv4-address": "10.0.0.2",
        })
    }));
    rows
}

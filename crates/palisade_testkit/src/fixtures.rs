//! Response document fixtures.
//!
//! Builders for the JSON documents a management server answers with, so
//! tests can script realistic responses without hand-writing envelopes.

use serde_json::{json, Map, Value};
use uuid::Uuid;

/// A fresh random uid in the server's format.
pub fn uid() -> String {
    Uuid::new_v4().to_string()
}

/// A host document.
pub fn host_doc(uid: &str, name: &str, ipv4: &str) -> Value {
    json!({
        "uid": uid,
        "type": "host",
        "name": name,
        "ipv4-address": ipv4,
    })
}

/// A network document.
pub fn network_doc(uid: &str, name: &str, subnet: &str, mask_length: u32) -> Value {
    json!({
        "uid": uid,
        "type": "network",
        "name": name,
        "subnet4": subnet,
        "mask-length4": mask_length,
    })
}

/// A group document. Members may be full documents or bare uid strings.
pub fn group_doc(uid: &str, name: &str, members: &[Value]) -> Value {
    json!({
        "uid": uid,
        "type": "group",
        "name": name,
        "members": members,
    })
}

/// A TCP service document.
pub fn service_tcp_doc(uid: &str, name: &str, port: &str) -> Value {
    json!({
        "uid": uid,
        "type": "service-tcp",
        "name": name,
        "port": port,
    })
}

/// An access rule document. Sources may be documents or identifiers.
pub fn access_rule_doc(uid: &str, name: &str, source: &[Value], action: &str) -> Value {
    json!({
        "uid": uid,
        "type": "access-rule",
        "name": name,
        "enabled": true,
        "source": source,
        "destination": ["Any"],
        "service": ["Any"],
        "action": action,
        "track": "None",
    })
}

/// A document with a discriminator the client has no dedicated type for.
pub fn generic_doc(raw_type: &str, uid: &str, name: &str) -> Value {
    json!({
        "uid": uid,
        "type": raw_type,
        "name": name,
    })
}

/// A structured command rejection body.
pub fn error_body(code: &str, message: &str) -> Value {
    json!({
        "code": code,
        "message": message,
    })
}

/// Wraps listing rows in a paging envelope.
pub fn listing_page(objects: &[Value], from: u32, to: u32, total: u32) -> Value {
    json!({
        "objects": objects,
        "from": from,
        "to": to,
        "total": total,
    })
}

/// Wraps rulebase rows and their objects dictionary in a paging envelope.
pub fn rulebase_page(
    rules: &[Value],
    dictionary: &[Value],
    from: u32,
    to: u32,
    total: u32,
) -> Value {
    json!({
        "rulebase": rules,
        "objects-dictionary": dictionary,
        "from": from,
        "to": to,
        "total": total,
    })
}

/// Splits rows into paging envelopes of `limit` rows each, the way a
/// server walks a listing. Always yields at least one page, so an empty
/// listing still has its terminal envelope.
pub fn paged_listing(rows: &[Value], limit: u32) -> Vec<Value> {
    let total = rows.len() as u32;
    let step = limit.max(1) as usize;
    let mut pages = Vec::new();
    let mut offset = 0usize;
    loop {
        let window: Vec<Value> = rows.iter().skip(offset).take(step).cloned().collect();
        let from = offset as u32;
        let to = from + window.len() as u32;
        pages.push(listing_page(&window, from, to, total));
        offset += step;
        if to >= total {
            break;
        }
    }
    pages
}

/// Adds or replaces a field on an object document.
pub fn with_field(doc: Value, key: &str, value: Value) -> Value {
    let mut map = match doc {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_owned(), other);
            map
        }
    };
    map.insert(key.to_owned(), value);
    Value::Object(map)
}

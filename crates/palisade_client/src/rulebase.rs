//! Rulebase windows.
//!
//! A rulebase answer carries its rows under `rulebase`, optionally grouped
//! one level deep into sections, plus an `objects-dictionary` holding the
//! objects the rule columns point at, which the rows themselves name only
//! by uid. The whole window is parsed in a single session so that the
//! column references and the dictionary entries collapse onto the same
//! instances once resolution runs.

use serde_json::Value;

use palisade_model::{DetailLevel, ObjectHandle, ParseSession, WellKnownRegistry};

use crate::error::{ClientError, ClientResult};

/// Parses one rulebase window into its rule handles.
///
/// Sections are flattened: their header object is absorbed when it is
/// addressable, but only the rules inside appear in the returned window.
pub(crate) fn parse_rulebase_items(
    well_known: &WellKnownRegistry,
    detail: DetailLevel,
    command: &str,
    body: &Value,
) -> ClientResult<Vec<ObjectHandle>> {
    let rows = body
        .get("rulebase")
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::protocol(command, "rulebase body has no `rulebase` array"))?;

    let mut session = ParseSession::new(well_known, detail);
    let mut items = Vec::new();
    for row in rows {
        if let Some(nested) = row.get("rulebase").and_then(Value::as_array) {
            if row.get("uid").is_some() {
                session.row(row)?;
            }
            for rule in nested {
                items.push(session.row(rule)?);
            }
        } else {
            items.push(session.row(row)?);
        }
    }

    // The dictionary arrives after the rows, so the rows' column entries
    // start out pending and are bound by the resolution pass below.
    if let Some(dictionary) = body.get("objects-dictionary").and_then(Value::as_array) {
        for node in dictionary {
            session.row(node)?;
        }
    }

    session.finish();
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn window() -> Value {
        json!({
            "rulebase": [
                {
                    "uid": "r1", "type": "access-rule", "name": "allow-web",
                    "enabled": true,
                    "source": ["ed997ff6"],
                    "action": "Accept",
                },
                {
                    "uid": "sec1", "type": "access-section", "name": "Inbound",
                    "rulebase": [
                        {
                            "uid": "r2", "type": "access-rule",
                            "source": ["ed997ff6"],
                            "action": "Drop",
                        },
                    ],
                },
            ],
            "objects-dictionary": [
                {
                    "uid": "ed997ff6", "type": "host", "name": "web-srv",
                    "ipv4-address": "10.0.0.7",
                },
            ],
            "from": 0, "to": 2, "total": 2,
        })
    }

    #[test]
    fn sections_flatten_to_their_rules() {
        let wk = WellKnownRegistry::standard();
        let items =
            parse_rulebase_items(&wk, DetailLevel::Standard, "show-access-rulebase", &window())
                .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name().as_deref(), Some("allow-web"));
        assert!(items[1].access_rule().is_some());
    }

    #[test]
    fn dictionary_entries_unify_column_references() {
        let wk = WellKnownRegistry::standard();
        let items =
            parse_rulebase_items(&wk, DetailLevel::Standard, "show-access-rulebase", &window())
                .unwrap();

        let first = items[0].access_rule().unwrap();
        let source = first.source().unwrap();
        let target = source.get(0).unwrap().target().unwrap();
        assert_eq!(target.name().as_deref(), Some("web-srv"));

        let second = items[1].access_rule().unwrap();
        let again = second.source().unwrap().get(0).unwrap().target().unwrap();
        assert!(target.same_object(&again));

        let action = first.action().unwrap().unwrap().target().unwrap();
        assert!(action.same_object(wk.get("Accept").unwrap()));
    }

    #[test]
    fn windows_without_rows_are_a_protocol_violation() {
        let wk = WellKnownRegistry::standard();
        let err = parse_rulebase_items(
            &wk,
            DetailLevel::Standard,
            "show-access-rulebase",
            &json!({ "objects": [] }),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::Protocol { .. }));
    }

    #[test]
    fn missing_dictionary_leaves_references_pending() {
        let wk = WellKnownRegistry::standard();
        let body = json!({
            "rulebase": [
                {
                    "uid": "r1", "type": "access-rule",
                    "source": ["ghost"],
                },
            ],
            "from": 0, "to": 1, "total": 1,
        });
        let items =
            parse_rulebase_items(&wk, DetailLevel::Standard, "show-access-rulebase", &body)
                .unwrap();
        let rule = items[0].access_rule().unwrap();
        let source = rule.source().unwrap();
        let entry = source.get(0).unwrap();
        assert!(entry.target().is_none());
        assert_eq!(entry.pending_identifier().as_deref(), Some("ghost"));
    }
}

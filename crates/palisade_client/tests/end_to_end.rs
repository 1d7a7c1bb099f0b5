//! Integration tests driving sessions against scripted transports.

use palisade_client::{ClientError, ListingQuery, Session, SessionConfig};
use palisade_model::{DetailLevel, Object, ObjectType};
use palisade_testkit::fixtures::{
    error_body, group_doc, host_doc, paged_listing, rulebase_page, uid, with_field,
};
use palisade_testkit::generators::{host_fleet_strategy, page_limit_strategy};
use palisade_testkit::transport::ScriptedTransport;
use proptest::prelude::*;
use serde_json::{json, Value};

#[test]
fn create_then_rename_round_trip() {
    let created = uid();
    let transport = ScriptedTransport::new()
        .reply("add-host", host_doc(&created, "web-srv", "10.0.0.7"))
        .reply("set-host", host_doc(&created, "app-srv", "10.0.0.7"));
    let session = Session::new(&transport);

    let host = Object::create(ObjectType::Host, "web-srv");
    host.host_mut().unwrap().set_ipv4_address("10.0.0.7");
    session.add(&host).unwrap();

    assert_eq!(host.uid().unwrap().as_str(), created);
    assert!(!host.is_new());
    assert!(!host.is_changed());

    host.borrow_mut().meta_mut().set_name("app-srv");
    session.update(&host).unwrap();

    let posted = transport.posted();
    assert!(posted[0].payload.get("uid").is_none());
    assert_eq!(posted[1].payload["name"], json!("web-srv"));
    assert_eq!(posted[1].payload["new-name"], json!("app-srv"));
    assert!(posted[1].payload.get("uid").is_none());

    assert_eq!(host.lookup_name().as_deref(), Some("app-srv"));
    assert!(!host.is_changed());
}

#[test]
fn membership_additions_post_a_delta() {
    let group_uid = uid();
    let member = host_doc(&uid(), "web-srv", "10.0.0.7");
    let transport = ScriptedTransport::new()
        .reply("show-group", group_doc(&group_uid, "dmz", &[member.clone()]))
        .reply(
            "set-group",
            group_doc(&group_uid, "dmz", &[member, json!("db-srv")]),
        );
    let session = Session::new(&transport);

    let group = session
        .show_at(ObjectType::Group, "dmz", DetailLevel::Full)
        .unwrap();
    group
        .group_mut()
        .unwrap()
        .members_mut()
        .unwrap()
        .add("db-srv");
    assert!(group.is_changed());

    session.update(&group).unwrap();
    let posted = transport.posted();
    assert_eq!(posted[1].payload["members"], json!({ "add": ["db-srv"] }));
    assert!(!group.is_changed());
}

#[test]
fn netted_membership_changes_post_nothing() {
    let transport = ScriptedTransport::new().reply(
        "show-group",
        group_doc(&uid(), "dmz", &[host_doc(&uid(), "web-srv", "10.0.0.7")]),
    );
    let session = Session::new(&transport);

    let group = session
        .show_at(ObjectType::Group, "dmz", DetailLevel::Full)
        .unwrap();
    {
        let mut payload = group.group_mut().unwrap();
        let members = payload.members_mut().unwrap();
        members.add("db-srv");
        members.remove("db-srv");
    }
    assert!(!group.is_changed());

    session.update(&group).unwrap();
    assert_eq!(transport.commands(), vec!["show-group"]);
}

#[test]
fn clearing_membership_posts_the_empty_list() {
    let group_uid = uid();
    let transport = ScriptedTransport::new()
        .reply(
            "show-group",
            group_doc(&group_uid, "dmz", &[host_doc(&uid(), "web-srv", "10.0.0.7")]),
        )
        .reply("set-group", group_doc(&group_uid, "dmz", &[]));
    let session = Session::new(&transport);

    let group = session
        .show_at(ObjectType::Group, "dmz", DetailLevel::Full)
        .unwrap();
    group.group_mut().unwrap().members_mut().unwrap().clear();
    session.update(&group).unwrap();

    let posted = transport.posted();
    assert_eq!(posted[1].payload["members"], json!([]));
}

#[test]
fn listings_walk_pages_by_offset() {
    let rows: Vec<Value> = (0..5)
        .map(|index| host_doc(&format!("h{index}"), &format!("host-{index}"), "10.0.0.1"))
        .collect();
    let mut transport = ScriptedTransport::new();
    for page in paged_listing(&rows, 2) {
        transport = transport.reply("show-hosts", page);
    }
    let session = Session::with_config(&transport, SessionConfig::new().with_page_limit(2));

    let all = session.fetch_all(ObjectType::Host).unwrap();
    let names: Vec<_> = all.iter().filter_map(|handle| handle.name()).collect();
    assert_eq!(names, ["host-0", "host-1", "host-2", "host-3", "host-4"]);

    let offsets: Vec<_> = transport
        .posted()
        .iter()
        .map(|post| post.payload["offset"].clone())
        .collect();
    assert_eq!(offsets, [json!(0), json!(2), json!(4)]);
    assert_eq!(transport.remaining(), 0);
}

#[test]
fn forward_references_unify_with_later_rows() {
    let host_uid = uid();
    let listing = json!({
        "objects": [
            group_doc(&uid(), "dmz", &[json!(host_uid.clone())]),
            host_doc(&host_uid, "web-srv", "10.0.0.7"),
        ],
        "from": 0, "to": 2, "total": 2,
    });
    let transport = ScriptedTransport::new().reply("show-objects", listing);
    let session = Session::new(&transport);

    let page = session
        .list(
            ObjectType::Generic,
            &ListingQuery::new().with_detail(DetailLevel::Full),
        )
        .unwrap();
    assert!(page.is_last());

    let group = page.items()[0].group().unwrap();
    let member = group.members().unwrap().get(0).unwrap().target().unwrap();
    assert!(member.same_object(&page.items()[1]));
    assert_eq!(member.name().as_deref(), Some("web-srv"));
}

#[test]
fn rulebase_windows_resolve_their_dictionary() {
    let host_uid = uid();
    let rules = [
        json!({
            "uid": uid(), "type": "access-rule", "name": "allow-web",
            "source": [host_uid.clone()], "action": "Accept",
        }),
        json!({
            "uid": uid(), "type": "access-section", "name": "Inbound",
            "rulebase": [{
                "uid": uid(), "type": "access-rule",
                "source": [host_uid.clone()], "action": "Drop",
            }],
        }),
    ];
    let dictionary = [host_doc(&host_uid, "web-srv", "10.0.0.7")];
    let transport = ScriptedTransport::new().reply(
        "show-access-rulebase",
        rulebase_page(&rules, &dictionary, 0, 2, 2),
    );
    let session = Session::new(&transport);

    let page = session
        .show_rulebase("Network", &ListingQuery::new())
        .unwrap();
    assert_eq!(transport.posted()[0].payload["name"], json!("Network"));
    assert_eq!(page.len(), 2);
    assert!(page.is_last());
    assert!(page.next(&session).unwrap().is_none());

    let first = page.items()[0].access_rule().unwrap();
    let from_rule = first.source().unwrap().get(0).unwrap().target().unwrap();
    assert_eq!(from_rule.name().as_deref(), Some("web-srv"));

    let second = page.items()[1].access_rule().unwrap();
    let from_section_rule = second.source().unwrap().get(0).unwrap().target().unwrap();
    assert!(from_rule.same_object(&from_section_rule));
}

#[test]
fn rejections_surface_the_server_error() {
    let transport = ScriptedTransport::new().reject(
        "show-host",
        404,
        error_body("generic_err_object_not_found", "Requested object [ghost] not found"),
    );
    let session = Session::new(&transport);
    let err = session.show(ObjectType::Host, "ghost").unwrap_err();
    match err {
        ClientError::Api { command, code, message } => {
            assert_eq!(command, "show-host");
            assert_eq!(code, "generic_err_object_not_found");
            assert!(message.contains("ghost"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn failed_updates_keep_the_object_dirty() {
    let host_uid = uid();
    let transport = ScriptedTransport::new()
        .reply("show-host", host_doc(&host_uid, "web-srv", "10.0.0.7"))
        .reject(
            "set-host",
            404,
            error_body("generic_err_object_not_found", "Requested object [web-srv] not found"),
        );
    let session = Session::new(&transport);

    let host = session.show(ObjectType::Host, "web-srv").unwrap();
    host.borrow_mut().meta_mut().set_name("app-srv");
    let err = session.update(&host).unwrap_err();
    assert!(matches!(err, ClientError::Api { .. }));

    // Nothing was acknowledged: the rename is still pending and the old
    // name is still the lookup key, so the caller can retry.
    assert!(host.is_changed());
    assert_eq!(host.lookup_name().as_deref(), Some("web-srv"));
    assert_eq!(host.name().as_deref(), Some("app-srv"));
}

#[test]
fn detail_too_low_reads_point_at_the_reload_level() {
    let host_uid = uid();
    let shallow = host_doc(&host_uid, "web-srv", "10.0.0.7");
    let deep = with_field(shallow.clone(), "comments", json!("edge"));
    let transport = ScriptedTransport::new()
        .reply("show-host", shallow)
        .reply("show-host", deep);
    let session = Session::new(&transport);

    let host = session
        .show_at(ObjectType::Host, "web-srv", DetailLevel::Standard)
        .unwrap();
    let err = host.borrow().meta().comments().unwrap_err();
    assert!(matches!(
        err,
        palisade_model::ModelError::DetailTooLow {
            actual: DetailLevel::Standard,
            required: DetailLevel::Full,
            ..
        }
    ));

    session.reload(&host, DetailLevel::Full).unwrap();
    assert_eq!(host.borrow().meta().comments().unwrap(), Some("edge"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pagination_concatenates_exactly_total(
        fleet in host_fleet_strategy(40),
        limit in page_limit_strategy(),
    ) {
        let mut transport = ScriptedTransport::new();
        for page in paged_listing(&fleet, limit) {
            transport = transport.reply("show-hosts", page);
        }
        let session = Session::with_config(
            &transport,
            SessionConfig::new().with_page_limit(limit),
        );

        let all = session.fetch_all(ObjectType::Host).unwrap();
        let expected: Vec<_> = fleet
            .iter()
            .filter_map(|doc| doc.get("name").and_then(Value::as_str))
            .map(str::to_owned)
            .collect();
        let actual: Vec<_> = all.iter().filter_map(|handle| handle.name()).collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(transport.remaining(), 0);
    }
}

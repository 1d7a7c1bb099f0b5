//! Offset/limit paging over listing commands.
//!
//! Listings return a window of rows plus `from`/`to`/`total` counters. A
//! [`Page`] wraps one window and knows how to request the next: the new
//! offset is simply the exclusive `to` of the current window, and the
//! listing is finished once `to` reaches `total`. Each page is parsed in
//! its own session, so identity is shared within a page but not across
//! pages.

use serde_json::{Map, Value};

use palisade_model::{DetailLevel, ObjectHandle, ParseSession, WellKnownRegistry};

use crate::error::{ClientError, ClientResult};
use crate::session::Session;
use crate::transport::Transport;

/// A sort clause for a listing.
#[derive(Debug, Clone)]
pub enum Order {
    /// Sort ascending by this field.
    Ascending(String),
    /// Sort descending by this field.
    Descending(String),
}

impl Order {
    /// Ascending order on `key`.
    pub fn ascending(key: impl Into<String>) -> Self {
        Order::Ascending(key.into())
    }

    /// Descending order on `key`.
    pub fn descending(key: impl Into<String>) -> Self {
        Order::Descending(key.into())
    }

    fn to_value(&self) -> Value {
        let mut clause = Map::new();
        match self {
            Order::Ascending(key) => clause.insert("ASC".to_owned(), Value::String(key.clone())),
            Order::Descending(key) => clause.insert("DESC".to_owned(), Value::String(key.clone())),
        };
        Value::Object(clause)
    }
}

/// Tuning for one listing: window size, start offset, sort order and
/// detail level. Unset knobs fall back to the session configuration.
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    limit: Option<u32>,
    offset: u32,
    order: Vec<Order>,
    detail: Option<DetailLevel>,
}

impl ListingQuery {
    /// A query with every knob at its default.
    pub fn new() -> Self {
        ListingQuery::default()
    }

    /// Sets the window size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit.max(1));
        self
    }

    /// Sets the starting offset.
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the detail level rows are fetched at.
    pub fn with_detail(mut self, level: DetailLevel) -> Self {
        self.detail = Some(level);
        self
    }

    /// Appends a sort clause.
    pub fn order_by(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    pub(crate) fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub(crate) fn offset(&self) -> u32 {
        self.offset
    }

    pub(crate) fn detail(&self) -> Option<DetailLevel> {
        self.detail
    }

    pub(crate) fn order(&self) -> &[Order] {
        &self.order
    }
}

/// How a page's response body is turned into items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageKind {
    /// Rows arrive under `objects`.
    Listing,
    /// Rows arrive under `rulebase` with a side dictionary of referenced
    /// objects.
    Rulebase,
}

/// One window of a listing.
#[derive(Debug)]
pub struct Page {
    pub(crate) command: String,
    pub(crate) base: Map<String, Value>,
    pub(crate) kind: PageKind,
    pub(crate) detail: DetailLevel,
    pub(crate) limit: u32,
    pub(crate) order: Vec<Order>,
    start: u32,
    end: u32,
    total: u32,
    items: Vec<ObjectHandle>,
}

impl Page {
    /// Offset of the first row in this window.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Offset just past the last row in this window.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Total number of rows the listing holds.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// The rows of this window.
    pub fn items(&self) -> &[ObjectHandle] {
        &self.items
    }

    /// Number of rows in this window.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether this window reaches the end of the listing.
    pub fn is_last(&self) -> bool {
        self.end >= self.total
    }

    /// Fetches the next window, or `None` when this one was the last.
    pub fn next<T: Transport>(&self, session: &Session<T>) -> ClientResult<Option<Page>> {
        if self.is_last() {
            return Ok(None);
        }
        fetch_page(
            session,
            &self.command,
            &self.base,
            self.kind,
            self.detail,
            self.limit,
            &self.order,
            self.end,
        )
        .map(Some)
    }
}

/// Builds the request payload for one window.
pub(crate) fn page_payload(
    base: &Map<String, Value>,
    detail: DetailLevel,
    limit: u32,
    order: &[Order],
    offset: u32,
) -> Map<String, Value> {
    let mut payload = base.clone();
    payload.insert("limit".to_owned(), Value::from(limit));
    payload.insert("offset".to_owned(), Value::from(offset));
    payload.insert(
        "details-level".to_owned(),
        Value::String(detail.token().to_owned()),
    );
    if !order.is_empty() {
        payload.insert(
            "order".to_owned(),
            Value::Array(order.iter().map(Order::to_value).collect()),
        );
    }
    payload
}

/// Posts one window and parses it into a [`Page`].
#[allow(clippy::too_many_arguments)]
pub(crate) fn fetch_page<T: Transport>(
    session: &Session<T>,
    command: &str,
    base: &Map<String, Value>,
    kind: PageKind,
    detail: DetailLevel,
    limit: u32,
    order: &[Order],
    offset: u32,
) -> ClientResult<Page> {
    let payload = page_payload(base, detail, limit, order, offset);
    let body = session.post_raw(command, Value::Object(payload))?;
    let items = match kind {
        PageKind::Listing => parse_listing_items(session.well_known(), detail, command, &body)?,
        PageKind::Rulebase => {
            crate::rulebase::parse_rulebase_items(session.well_known(), detail, command, &body)?
        }
    };
    let (start, end, total) = read_envelope(command, &body, items.len())?;
    Ok(Page {
        command: command.to_owned(),
        base: base.clone(),
        kind,
        detail,
        limit,
        order: order.to_vec(),
        start,
        end,
        total,
        items,
    })
}

/// Parses the rows of a plain listing body in one shared session.
pub(crate) fn parse_listing_items(
    well_known: &WellKnownRegistry,
    detail: DetailLevel,
    command: &str,
    body: &Value,
) -> ClientResult<Vec<ObjectHandle>> {
    let rows = body
        .get("objects")
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::protocol(command, "listing body has no `objects` array"))?;
    let mut session = ParseSession::new(well_known, detail);
    let items = rows
        .iter()
        .map(|row| session.row(row))
        .collect::<Result<Vec<_>, _>>()?;
    session.finish();
    Ok(items)
}

fn counter(body: &Value, key: &str) -> Option<u32> {
    body.get(key)
        .and_then(Value::as_u64)
        .and_then(|wide| u32::try_from(wide).ok())
}

/// Reads the `from`/`to`/`total` counters. `total` is mandatory; a window
/// without it cannot be paged. Missing `from` means the window starts at
/// zero, and a missing `to` is reconstructed from the row count.
pub(crate) fn read_envelope(
    command: &str,
    body: &Value,
    item_count: usize,
) -> ClientResult<(u32, u32, u32)> {
    let total = counter(body, "total")
        .ok_or_else(|| ClientError::protocol(command, "listing body has no `total` counter"))?;
    let start = counter(body, "from").unwrap_or(0);
    let end = counter(body, "to").unwrap_or(start + item_count as u32);
    Ok((start, end, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_clauses_take_the_wire_shape() {
        assert_eq!(Order::ascending("name").to_value(), json!({ "ASC": "name" }));
        assert_eq!(Order::descending("name").to_value(), json!({ "DESC": "name" }));
    }

    #[test]
    fn payload_carries_paging_and_order() {
        let mut base = Map::new();
        base.insert("name".to_owned(), Value::String("Network".to_owned()));
        let payload = page_payload(
            &base,
            DetailLevel::Full,
            25,
            &[Order::ascending("name")],
            50,
        );
        assert_eq!(payload.get("name"), Some(&json!("Network")));
        assert_eq!(payload.get("limit"), Some(&json!(25)));
        assert_eq!(payload.get("offset"), Some(&json!(50)));
        assert_eq!(payload.get("details-level"), Some(&json!("full")));
        assert_eq!(payload.get("order"), Some(&json!([{ "ASC": "name" }])));
    }

    #[test]
    fn order_is_omitted_when_unset() {
        let payload = page_payload(&Map::new(), DetailLevel::Standard, 50, &[], 0);
        assert!(!payload.contains_key("order"));
    }

    #[test]
    fn envelope_requires_total() {
        let err = read_envelope("show-hosts", &json!({ "objects": [] }), 0).unwrap_err();
        assert!(matches!(err, ClientError::Protocol { .. }));

        let (start, end, total) =
            read_envelope("show-hosts", &json!({ "from": 0, "to": 2, "total": 9 }), 2).unwrap();
        assert_eq!((start, end, total), (0, 2, 9));
    }

    #[test]
    fn missing_window_counters_are_reconstructed() {
        let (start, end, total) = read_envelope("show-hosts", &json!({ "total": 3 }), 3).unwrap();
        assert_eq!((start, end, total), (0, 3, 3));
    }

    #[test]
    fn listing_rows_share_one_identity_cache() {
        let wk = WellKnownRegistry::standard();
        let body = json!({
            "objects": [
                { "uid": "h1", "type": "host", "name": "a" },
                "h1",
            ],
            "from": 0, "to": 2, "total": 2,
        });
        let items = parse_listing_items(&wk, DetailLevel::Standard, "show-hosts", &body).unwrap();
        assert!(items[0].same_object(&items[1]));
    }
}

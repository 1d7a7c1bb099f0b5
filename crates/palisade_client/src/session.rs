//! The command session.
//!
//! A [`Session`] owns a transport and a well-known registry and turns the
//! generic object surface into commands: `show-host`, `add-group`,
//! `set-service-tcp`, `delete-network`, and the plural listing commands.
//! All helpers work over [`ObjectHandle`] without per-kind branching; the
//! command name is derived from the object's discriminator.
//!
//! Responses are reconciled into the instances the caller already holds:
//! `add` absorbs the create response into the uploaded object, giving it
//! its uid, and `update` re-absorbs the server's post-write document so
//! the dirty set clears exactly when the server acknowledged the write.

use serde_json::{json, Map, Value};
use tracing::debug;

use palisade_model::{
    DetailLevel, ObjectHandle, ObjectType, ParseSession, WellKnownRegistry, WriteMode,
};

use crate::config::SessionConfig;
use crate::error::{ClientError, ClientResult};
use crate::paging::{fetch_page, ListingQuery, Page, PageKind};
use crate::transport::{Transport, TransportError};

/// A management session over one transport.
pub struct Session<T: Transport> {
    transport: T,
    config: SessionConfig,
    well_known: WellKnownRegistry,
}

impl<T: Transport> Session<T> {
    /// A session with the default configuration and the standard
    /// well-known set.
    pub fn new(transport: T) -> Self {
        Session::with_config(transport, SessionConfig::default())
    }

    /// A session with an explicit configuration.
    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        Session {
            transport,
            config,
            well_known: WellKnownRegistry::standard(),
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The well-known singletons responses resolve against.
    pub fn well_known(&self) -> &WellKnownRegistry {
        &self.well_known
    }

    /// Mutable access to the well-known set, for pinning extra built-ins
    /// before any response is parsed.
    pub fn well_known_mut(&mut self) -> &mut WellKnownRegistry {
        &mut self.well_known
    }

    /// Posts a raw command and returns the response body.
    ///
    /// Rejections that arrive as an error status are lifted into
    /// [`ClientError::Api`] using the structured error document. This is
    /// the escape hatch for commands the typed helpers do not cover.
    pub fn post_raw(&self, command: &str, payload: Value) -> ClientResult<Value> {
        debug!(command, "posting command");
        match self.transport.post(command, &payload) {
            Ok(body) => Ok(body),
            Err(TransportError::Status { status, body }) => {
                debug!(command, status, "command rejected");
                Err(ClientError::from_api(command, &body))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetches one object by name at the configured detail level.
    pub fn show(&self, kind: ObjectType, name: &str) -> ClientResult<ObjectHandle> {
        self.show_at(kind, name, self.config.default_detail())
    }

    /// Fetches one object by name at an explicit detail level.
    pub fn show_at(
        &self,
        kind: ObjectType,
        name: &str,
        level: DetailLevel,
    ) -> ClientResult<ObjectHandle> {
        let command = typed_command("show", kind)?;
        self.fetch_object(&command, "name", name, level)
    }

    /// Fetches one object by uid at an explicit detail level.
    pub fn show_by_uid(
        &self,
        kind: ObjectType,
        uid: &str,
        level: DetailLevel,
    ) -> ClientResult<ObjectHandle> {
        let command = typed_command("show", kind)?;
        self.fetch_object(&command, "uid", uid, level)
    }

    /// Reloads an object in place at `level`, promoting its detail level.
    ///
    /// The response is absorbed into the instance itself, so every alias
    /// and reference holding it observes the promotion.
    pub fn reload(&self, handle: &ObjectHandle, level: DetailLevel) -> ClientResult<()> {
        let Some(uid) = handle.uid() else {
            return Err(ClientError::InvalidOperation(
                "object was never uploaded; there is nothing to reload".to_owned(),
            ));
        };
        let command = object_command("show", handle)?;
        let body = self.post_raw(
            &command,
            json!({ "uid": uid.as_str(), "details-level": level.token() }),
        )?;
        let mut session = ParseSession::new(&self.well_known, level);
        session.seed(handle);
        session.root(&body)?;
        session.finish();
        Ok(())
    }

    fn fetch_object(
        &self,
        command: &str,
        key: &str,
        identifier: &str,
        level: DetailLevel,
    ) -> ClientResult<ObjectHandle> {
        let body = self.post_raw(
            command,
            json!({ key: identifier, "details-level": level.token() }),
        )?;
        let mut session = ParseSession::new(&self.well_known, level);
        let handle = session.root(&body)?;
        session.finish();
        Ok(handle)
    }

    /// Uploads a locally created object.
    ///
    /// The create response is absorbed into the same instance: it gains
    /// its uid, its detail level becomes full, and its dirty set clears.
    pub fn add(&self, handle: &ObjectHandle) -> ClientResult<()> {
        if !handle.is_new() {
            return Err(ClientError::InvalidOperation(
                "object already exists on the server; use update".to_owned(),
            ));
        }
        let command = object_command("add", handle)?;
        let payload = handle.borrow().serialize_for(WriteMode::Create);
        let body = self.post_raw(&command, Value::Object(payload))?;

        let mut session = ParseSession::new(&self.well_known, DetailLevel::Full);
        session.seed_root_target(handle);
        session.root(&body)?;
        session.finish();
        Ok(())
    }

    /// Pushes local changes to an object the server already knows.
    ///
    /// The object is addressed by the name the server last confirmed, so
    /// a pending rename still finds the record. An unchanged object posts
    /// nothing.
    pub fn update(&self, handle: &ObjectHandle) -> ClientResult<()> {
        if handle.is_new() {
            return Err(ClientError::InvalidOperation(
                "object was never uploaded; use add".to_owned(),
            ));
        }
        if !handle.is_changed() {
            return Ok(());
        }
        if handle.lookup_name().is_none() {
            return Err(ClientError::InvalidOperation(
                "object has no name to address the update by".to_owned(),
            ));
        }
        let command = object_command("set", handle)?;
        let payload = handle.borrow().serialize_for(WriteMode::Update);
        let body = self.post_raw(&command, Value::Object(payload))?;

        let mut session = ParseSession::new(&self.well_known, DetailLevel::Full);
        session.seed(handle);
        session.root(&body)?;
        session.finish();
        Ok(())
    }

    /// Deletes an object, addressing it by its server-confirmed name.
    pub fn delete(&self, handle: &ObjectHandle) -> ClientResult<()> {
        let command = object_command("delete", handle)?;
        let name = handle.lookup_name().ok_or_else(|| {
            ClientError::InvalidOperation("object has no name to delete by".to_owned())
        })?;
        self.post_raw(&command, json!({ "name": name }))?;
        Ok(())
    }

    /// Deletes an object by kind and name without holding an instance.
    pub fn delete_by_name(&self, kind: ObjectType, name: &str) -> ClientResult<()> {
        let command = typed_command("delete", kind)?;
        self.post_raw(&command, json!({ "name": name }))?;
        Ok(())
    }

    /// Fetches the first page of a listing.
    pub fn list(&self, kind: ObjectType, query: &ListingQuery) -> ClientResult<Page> {
        let command = format!("show-{}", kind.listing_suffix());
        fetch_page(
            self,
            &command,
            &Map::new(),
            PageKind::Listing,
            query.detail().unwrap_or_else(|| self.config.default_detail()),
            query.limit().unwrap_or_else(|| self.config.page_limit()),
            query.order(),
            query.offset(),
        )
    }

    /// Eagerly walks every page of a listing and concatenates the rows.
    pub fn fetch_all(&self, kind: ObjectType) -> ClientResult<Vec<ObjectHandle>> {
        let mut page = self.list(kind, &ListingQuery::new())?;
        let mut all = page.items().to_vec();
        while let Some(next) = page.next(self)? {
            all.extend_from_slice(next.items());
            page = next;
        }
        Ok(all)
    }

    /// Fetches the first window of an access layer's rulebase.
    pub fn show_rulebase(&self, layer: &str, query: &ListingQuery) -> ClientResult<Page> {
        let mut base = Map::new();
        base.insert("name".to_owned(), Value::String(layer.to_owned()));
        fetch_page(
            self,
            "show-access-rulebase",
            &base,
            PageKind::Rulebase,
            query.detail().unwrap_or_else(|| self.config.default_detail()),
            query.limit().unwrap_or_else(|| self.config.page_limit()),
            query.order(),
            query.offset(),
        )
    }
}

/// The command for a verb over a typed kind. The generic catch-all has no
/// commands of its own.
fn typed_command(verb: &str, kind: ObjectType) -> ClientResult<String> {
    if kind == ObjectType::Generic {
        return Err(ClientError::InvalidOperation(format!(
            "cannot {verb} an object without a concrete type"
        )));
    }
    Ok(format!("{verb}-{}", kind.discriminator()))
}

/// The command for a verb over a held object. Generic objects that kept an
/// unrecognized raw tag use it verbatim.
fn object_command(verb: &str, handle: &ObjectHandle) -> ClientResult<String> {
    let kind = handle.type_tag();
    if kind != ObjectType::Generic {
        return Ok(format!("{verb}-{}", kind.discriminator()));
    }
    let raw = handle
        .generic()
        .and_then(|payload| payload.raw_type().map(str::to_owned));
    match raw {
        Some(tag) => Ok(format!("{verb}-{tag}")),
        None => Err(ClientError::InvalidOperation(format!(
            "cannot {verb} an object without a concrete type"
        ))),
    }
}

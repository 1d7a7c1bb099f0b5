//! Catch-all payloads.

use serde_json::{Map, Value};

use crate::changes::WriteMode;
use crate::detail::DetailLevel;
use crate::error::ModelResult;
use crate::meta::Meta;
use crate::parse::ParseSession;
use crate::registry::ObjectType;
use crate::uid::Uid;

use super::{Object, ObjectCodec};

const HEADER_KEYS: [&str; 6] = ["uid", "type", "name", "color", "comments", "tags"];

/// An object of a kind the client has no dedicated type for.
///
/// The raw discriminator and every non-header field are retained verbatim,
/// so unknown kinds still take part in identity, resolution and writes.
#[derive(Debug)]
pub struct GenericObject {
    meta: Meta,
    raw_type: Option<String>,
    fields: Map<String, Value>,
}

impl GenericObject {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        GenericObject {
            meta,
            raw_type: None,
            fields: Map::new(),
        }
    }

    pub(crate) fn with_raw_type(meta: Meta, raw_type: String) -> Self {
        GenericObject {
            meta,
            raw_type: Some(raw_type),
            fields: Map::new(),
        }
    }

    /// A fully resolved singleton for a built-in the server addresses by
    /// bare name, like the `Accept` action.
    pub(crate) fn singleton(raw_type: &str, identifier: &str) -> Object {
        let mut meta = Meta::remote(ObjectType::Generic, Uid::new(identifier));
        meta.name = Some(identifier.to_owned());
        meta.synced_name = Some(identifier.to_owned());
        meta.detail_level = DetailLevel::Full;
        Object::Generic(GenericObject {
            meta,
            raw_type: Some(raw_type.to_owned()),
            fields: Map::new(),
        })
    }

    /// The shared header state.
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Mutable access to the shared header state.
    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    /// The discriminator the server used for this object, if it carried
    /// one.
    pub fn raw_type(&self) -> Option<&str> {
        self.raw_type.as_deref()
    }

    /// A retained field, exactly as the server sent it.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The retained field names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Sets a field to be written back verbatim.
    pub fn set_field(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        self.meta.changes.mark(key.clone());
        self.fields.insert(key, value);
    }
}

impl ObjectCodec for GenericObject {
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
        if let Some(raw_type) = doc.get("type").and_then(Value::as_str) {
            self.raw_type = Some(raw_type.to_owned());
        }
        for (key, value) in doc {
            if !HEADER_KEYS.contains(&key.as_str()) {
                self.fields.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        match mode {
            WriteMode::Create => {
                for (key, value) in &self.fields {
                    out.insert(key.clone(), value.clone());
                }
            }
            WriteMode::Update => {
                for (key, value) in &self.fields {
                    if self.meta.changes.contains(key) {
                        out.insert(key.clone(), value.clone());
                    }
                }
            }
        }
    }
}

/// A kind with no fields beyond the shared header: tags, zones, sections
/// and the like.
#[derive(Debug)]
pub struct Plain {
    meta: Meta,
}

impl Plain {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        Plain { meta }
    }

    /// The shared header state.
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Mutable access to the shared header state.
    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

impl ObjectCodec for Plain {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn populate_fields(
        &mut self,
        _doc: &Map<String, Value>,
        _session: &mut ParseSession<'_>,
    ) -> ModelResult<()> {
        Ok(())
    }

    fn write_fields(&self, _mode: WriteMode, _out: &mut Map<String, Value>) {}
}

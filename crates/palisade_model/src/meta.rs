//! State common to every managed object.

use serde_json::{Map, Value};

use crate::changes::{assign, ChangeSet, WriteMode};
use crate::detail::DetailLevel;
use crate::error::{ModelError, ModelResult};
use crate::members::MemberList;
use crate::objects::doc_str;
use crate::registry::ObjectType;
use crate::uid::Uid;

/// Identity, detail bookkeeping and the shared business fields carried by
/// every object kind.
#[derive(Debug)]
pub struct Meta {
    pub(crate) type_tag: ObjectType,
    pub(crate) uid: Option<Uid>,
    pub(crate) name: Option<String>,
    /// The name the server knows the object by, captured at the last sync.
    /// Diverges from `name` only between a local rename and its upload.
    pub(crate) synced_name: Option<String>,
    pub(crate) detail_level: DetailLevel,
    pub(crate) color: Option<String>,
    pub(crate) comments: Option<String>,
    pub(crate) tags: MemberList,
    pub(crate) changes: ChangeSet,
}

impl Meta {
    /// State for an object created locally. It starts at full detail (the
    /// caller owns every field) and has no uid until the server assigns one.
    pub(crate) fn new(type_tag: ObjectType) -> Self {
        Meta {
            type_tag,
            uid: None,
            name: None,
            synced_name: None,
            detail_level: DetailLevel::Full,
            color: None,
            comments: None,
            tags: MemberList::new(),
            changes: ChangeSet::new(),
        }
    }

    /// State for an object first seen in a response. It starts as a bare
    /// identifier and gains detail as richer nodes are absorbed.
    pub(crate) fn remote(type_tag: ObjectType, uid: Uid) -> Self {
        Meta {
            type_tag,
            uid: Some(uid),
            name: None,
            synced_name: None,
            detail_level: DetailLevel::Uid,
            color: None,
            comments: None,
            tags: MemberList::new(),
            changes: ChangeSet::new(),
        }
    }

    /// The discriminator this object was built for.
    pub fn type_tag(&self) -> ObjectType {
        self.type_tag
    }

    /// The server-assigned identifier, if the object has been synced.
    pub fn uid(&self) -> Option<&Uid> {
        self.uid.as_ref()
    }

    /// Whether the server has never seen this object.
    pub fn is_new(&self) -> bool {
        self.uid.is_none()
    }

    /// The object's (possibly locally renamed) name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Renames the object locally. The previous synced name is kept so the
    /// server can still find the object when the rename is uploaded.
    pub fn set_name(&mut self, name: impl Into<String>) {
        assign(&mut self.changes, "name", &mut self.name, Some(name.into()));
    }

    /// The name requests should address the object by: the last synced name
    /// when a rename is pending, the current name otherwise.
    pub fn lookup_name(&self) -> Option<&str> {
        self.synced_name.as_deref().or(self.name.as_deref())
    }

    /// How deeply this object has been fetched.
    pub fn detail_level(&self) -> DetailLevel {
        self.detail_level
    }

    /// The object's display color.
    pub fn color(&self) -> ModelResult<Option<&str>> {
        self.require("color", DetailLevel::Standard)?;
        Ok(self.color.as_deref())
    }

    /// Sets the display color.
    pub fn set_color(&mut self, color: impl Into<String>) {
        assign(&mut self.changes, "color", &mut self.color, Some(color.into()));
    }

    /// Free-form comments.
    pub fn comments(&self) -> ModelResult<Option<&str>> {
        self.require("comments", DetailLevel::Full)?;
        Ok(self.comments.as_deref())
    }

    /// Sets the comments field.
    pub fn set_comments(&mut self, comments: impl Into<String>) {
        assign(
            &mut self.changes,
            "comments",
            &mut self.comments,
            Some(comments.into()),
        );
    }

    /// The object's tag memberships.
    pub fn tags(&self) -> ModelResult<&MemberList> {
        self.require("tags", DetailLevel::Full)?;
        Ok(&self.tags)
    }

    /// Mutable access to the tag memberships.
    pub fn tags_mut(&mut self) -> ModelResult<&mut MemberList> {
        self.require("tags", DetailLevel::Full)?;
        Ok(&mut self.tags)
    }

    /// Fields modified since the last sync.
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Whether any shared field or tag membership diverges from the server.
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty() || self.tags.has_pending()
    }

    /// Fails with [`ModelError::DetailTooLow`] when the object has not been
    /// fetched deeply enough to carry `field`.
    pub(crate) fn require(&self, field: &'static str, required: DetailLevel) -> ModelResult<()> {
        if self.detail_level >= required {
            Ok(())
        } else {
            Err(ModelError::DetailTooLow {
                field,
                actual: self.detail_level,
                required,
            })
        }
    }

    /// Absorbs the header fields of a response node and promotes the detail
    /// level. Field data in the node overrides local state.
    pub(crate) fn absorb_header(&mut self, doc: &Map<String, Value>, level: DetailLevel) {
        if let Some(uid) = doc_str(doc, "uid") {
            self.uid = Some(Uid::new(uid));
        }
        if let Some(name) = doc_str(doc, "name") {
            self.synced_name = Some(name.clone());
            self.name = Some(name);
        }
        if let Some(color) = doc_str(doc, "color") {
            self.color = Some(color);
        }
        if let Some(comments) = doc_str(doc, "comments") {
            self.comments = Some(comments);
        }
        self.detail_level = self.detail_level.promote(level);
    }

    /// Declares the local state synced: clears the change set, the tag
    /// delta and any pending rename.
    pub(crate) fn mark_synced(&mut self) {
        self.changes.clear();
        self.tags.clear_delta();
        if self.name.is_some() {
            self.synced_name = self.name.clone();
        }
    }

    /// Writes the shared header fields of a write payload. The uid is never
    /// transmitted in either mode.
    pub(crate) fn write_header(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        match mode {
            WriteMode::Create => {
                if let Some(name) = &self.name {
                    out.insert("name".to_owned(), Value::String(name.clone()));
                }
                if let Some(color) = &self.color {
                    out.insert("color".to_owned(), Value::String(color.clone()));
                }
                if let Some(comments) = &self.comments {
                    out.insert("comments".to_owned(), Value::String(comments.clone()));
                }
                self.tags.write_full("tags", out);
            }
            WriteMode::Update => {
                if let Some(lookup) = self.lookup_name() {
                    out.insert("name".to_owned(), Value::String(lookup.to_owned()));
                }
                if self.changes.contains("name") {
                    if let Some(name) = &self.name {
                        out.insert("new-name".to_owned(), Value::String(name.clone()));
                    }
                }
                if self.changes.contains("color") {
                    if let Some(color) = &self.color {
                        out.insert("color".to_owned(), Value::String(color.clone()));
                    }
                }
                if self.changes.contains("comments") {
                    if let Some(comments) = &self.comments {
                        out.insert("comments".to_owned(), Value::String(comments.clone()));
                    }
                }
                self.tags.write_delta("tags", out);
            }
        }
    }
}

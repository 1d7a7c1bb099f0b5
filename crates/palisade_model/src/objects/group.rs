//! Group payloads.

use serde_json::{Map, Value};

use crate::changes::WriteMode;
use crate::detail::DetailLevel;
use crate::error::ModelResult;
use crate::members::{Member, MemberList};
use crate::meta::Meta;
use crate::parse::ParseSession;
use crate::reference::Reference;

use super::{emit_members, emit_reference, ObjectCodec};

/// A group of objects. The same shape serves network groups, service
/// groups, application site groups and time groups.
#[derive(Debug)]
pub struct Group {
    meta: Meta,
    members: MemberList,
}

impl Group {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        Group {
            meta,
            members: MemberList::new(),
        }
    }

    /// The shared header state.
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Mutable access to the shared header state.
    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    /// The group's members.
    pub fn members(&self) -> ModelResult<&MemberList> {
        self.meta.require("members", DetailLevel::Full)?;
        Ok(&self.members)
    }

    /// Mutable access to the membership.
    pub fn members_mut(&mut self) -> ModelResult<&mut MemberList> {
        self.meta.require("members", DetailLevel::Full)?;
        Ok(&mut self.members)
    }
}

impl ObjectCodec for Group {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn populate_fields(
        &mut self,
        doc: &Map<String, Value>,
        session: &mut ParseSession<'_>,
    ) -> ModelResult<()> {
        if let Some(members) = doc.get("members") {
            self.members.absorb(session.child_references(members)?);
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        emit_members(out, mode, "members", &self.members);
    }

    fn visit_references(&self, visit: &mut dyn FnMut(&Reference)) {
        for reference in self.members.iter() {
            visit(reference);
        }
    }

    fn tracked_children_changed(&self) -> bool {
        self.members.has_pending()
    }

    fn mark_children_synced(&mut self) {
        self.members.clear_delta();
    }
}

/// A group defined as one object's contents minus another's.
#[derive(Debug)]
pub struct GroupWithExclusion {
    meta: Meta,
    include: Option<Reference>,
    except: Option<Reference>,
}

impl GroupWithExclusion {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        GroupWithExclusion {
            meta,
            include: None,
            except: None,
        }
    }

    /// The shared header state.
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Mutable access to the shared header state.
    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    /// The included scope.
    pub fn include(&self) -> ModelResult<Option<&Reference>> {
        self.meta.require("include", DetailLevel::Full)?;
        Ok(self.include.as_ref())
    }

    /// Sets the included scope.
    pub fn set_include(&mut self, member: impl Into<Member>) {
        self.include = Some(member.into().into_reference());
        self.meta.changes.mark("include");
    }

    /// The excluded scope.
    pub fn except(&self) -> ModelResult<Option<&Reference>> {
        self.meta.require("except", DetailLevel::Full)?;
        Ok(self.except.as_ref())
    }

    /// Sets the excluded scope.
    pub fn set_except(&mut self, member: impl Into<Member>) {
        self.except = Some(member.into().into_reference());
        self.meta.changes.mark("except");
    }
}

impl ObjectCodec for GroupWithExclusion {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn populate_fields(
        &mut self,
        doc: &Map<String, Value>,
        session: &mut ParseSession<'_>,
    ) -> ModelResult<()> {
        if let Some(include) = doc.get("include") {
            self.include = Some(session.child_reference(include)?);
        }
        if let Some(except) = doc.get("except") {
            self.except = Some(session.child_reference(except)?);
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        let changes = &self.meta.changes;
        emit_reference(out, mode, changes, "include", &self.include);
        emit_reference(out, mode, changes, "except", &self.except);
    }

    fn visit_references(&self, visit: &mut dyn FnMut(&Reference)) {
        if let Some(include) = &self.include {
            visit(include);
        }
        if let Some(except) = &self.except {
            visit(except);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Object;
    use crate::registry::ObjectType;
    use serde_json::json;

    #[test]
    fn membership_edits_serialize_as_deltas() {
        let group = Object::create(ObjectType::Group, "dmz");
        {
            let mut payload = group.group_mut().unwrap();
            payload.meta_mut().mark_synced();
            payload.members_mut().unwrap().add("web-srv");
            payload.members_mut().unwrap().add("db-srv");
        }
        let doc = group.borrow().serialize_for(WriteMode::Update);
        assert_eq!(doc.get("members"), Some(&json!({ "add": ["web-srv", "db-srv"] })));
    }

    #[test]
    fn create_serializes_full_membership() {
        let group = Object::create(ObjectType::Group, "dmz");
        group.group_mut().unwrap().members_mut().unwrap().add("web-srv");
        let doc = group.borrow().serialize_for(WriteMode::Create);
        assert_eq!(doc.get("members"), Some(&json!(["web-srv"])));
        assert!(!doc.contains_key("uid"));
    }

    #[test]
    fn exclusion_scopes_serialize_as_keys() {
        let group = Object::create(ObjectType::GroupWithExclusion, "dmz-minus-db");
        {
            let mut object = group.borrow_mut();
            if let Object::GroupWithExclusion(payload) = &mut *object {
                payload.set_include("dmz");
                payload.set_except("db-srv");
            }
        }
        let doc = group.borrow().serialize_for(WriteMode::Create);
        assert_eq!(doc.get("include"), Some(&json!("dmz")));
        assert_eq!(doc.get("except"), Some(&json!("db-srv")));
    }
}

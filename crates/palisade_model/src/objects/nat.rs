//! Nested NAT configuration carried by hosts and networks.

use serde_json::{Map, Value};

use crate::changes::{assign, ChangeSet, WriteMode};
use crate::error::{ModelError, ModelResult};

use super::{doc_bool, doc_str};

/// Automatic NAT settings embedded in an address object.
///
/// The block tracks its own changes: any modification makes the owning
/// object dirty, and an update transmits the whole block, which is how the
/// server expects nested configuration to be replaced.
#[derive(Debug, Default)]
pub struct NatSettings {
    auto_rule: Option<bool>,
    ip_address: Option<String>,
    method: Option<String>,
    hide_behind: Option<String>,
    install_on: Option<String>,
    changes: ChangeSet,
}

impl NatSettings {
    /// An empty, in-sync block.
    pub fn new() -> Self {
        NatSettings::default()
    }

    /// Whether an automatic NAT rule is generated.
    pub fn auto_rule(&self) -> Option<bool> {
        self.auto_rule
    }

    /// Enables or disables the automatic NAT rule.
    pub fn set_auto_rule(&mut self, enabled: bool) {
        assign(&mut self.changes, "auto-rule", &mut self.auto_rule, Some(enabled));
    }

    /// The translated address for static NAT.
    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    /// Sets the translated address.
    pub fn set_ip_address(&mut self, address: impl Into<String>) {
        assign(
            &mut self.changes,
            "ip-address",
            &mut self.ip_address,
            Some(address.into()),
        );
    }

    /// The translation method, `hide` or `static`.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Sets the translation method.
    pub fn set_method(&mut self, method: impl Into<String>) {
        assign(&mut self.changes, "method", &mut self.method, Some(method.into()));
    }

    /// What hide NAT hides behind, `gateway` or `ip-address`.
    pub fn hide_behind(&self) -> Option<&str> {
        self.hide_behind.as_deref()
    }

    /// Sets the hide target.
    pub fn set_hide_behind(&mut self, target: impl Into<String>) {
        assign(
            &mut self.changes,
            "hide-behind",
            &mut self.hide_behind,
            Some(target.into()),
        );
    }

    /// Which gateways the automatic rule is installed on.
    pub fn install_on(&self) -> Option<&str> {
        self.install_on.as_deref()
    }

    /// Sets the install target.
    pub fn set_install_on(&mut self, target: impl Into<String>) {
        assign(
            &mut self.changes,
            "install-on",
            &mut self.install_on,
            Some(target.into()),
        );
    }

    /// Whether the block diverges from the server.
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }

    pub(crate) fn mark_synced(&mut self) {
        self.changes.clear();
    }

    pub(crate) fn populate(&mut self, value: &Value) -> ModelResult<()> {
        let doc = value
            .as_object()
            .ok_or_else(|| ModelError::malformed("nat-settings must be an object"))?;
        if let Some(enabled) = doc_bool(doc, "auto-rule") {
            self.auto_rule = Some(enabled);
        }
        if let Some(address) = doc_str(doc, "ip-address") {
            self.ip_address = Some(address);
        }
        if let Some(method) = doc_str(doc, "method") {
            self.method = Some(method);
        }
        if let Some(target) = doc_str(doc, "hide-behind") {
            self.hide_behind = Some(target);
        }
        if let Some(target) = doc_str(doc, "install-on") {
            self.install_on = Some(target);
        }
        self.changes.clear();
        Ok(())
    }

    fn body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        if let Some(enabled) = self.auto_rule {
            body.insert("auto-rule".to_owned(), Value::Bool(enabled));
        }
        if let Some(address) = &self.ip_address {
            body.insert("ip-address".to_owned(), Value::String(address.clone()));
        }
        if let Some(method) = &self.method {
            body.insert("method".to_owned(), Value::String(method.clone()));
        }
        if let Some(target) = &self.hide_behind {
            body.insert("hide-behind".to_owned(), Value::String(target.clone()));
        }
        if let Some(target) = &self.install_on {
            body.insert("install-on".to_owned(), Value::String(target.clone()));
        }
        body
    }

    /// Writes the block: in create mode when anything is set, in update
    /// mode when anything changed, always as the whole block.
    pub(crate) fn write(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        let include = match mode {
            WriteMode::Create => {
                self.auto_rule.is_some()
                    || self.ip_address.is_some()
                    || self.method.is_some()
                    || self.hide_behind.is_some()
                    || self.install_on.is_some()
            }
            WriteMode::Update => self.is_changed(),
        };
        if include {
            out.insert("nat-settings".to_owned(), Value::Object(self.body()));
        }
    }
}

//! Application site payload.

use serde_json::{Map, Value};

use crate::changes::{assign, WriteMode};
use crate::detail::DetailLevel;
use crate::error::ModelResult;
use crate::meta::Meta;
use crate::parse::ParseSession;

use super::{doc_str, emit_str, ObjectCodec};

/// An application or web site, matched by its URL list.
///
/// Unlike group membership, the URL list is plain data with no delta
/// tracking: any edit marks the whole field and an update replaces it.
#[derive(Debug)]
pub struct ApplicationSite {
    meta: Meta,
    primary_category: Option<String>,
    url_list: Vec<String>,
}

impl ApplicationSite {
    pub(crate) fn with_meta(meta: Meta) -> Self {
        ApplicationSite {
            meta,
            primary_category: None,
            url_list: Vec::new(),
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

    /// The site's primary category.
    pub fn primary_category(&self) -> ModelResult<Option<&str>> {
        self.meta.require("primary-category", DetailLevel::Standard)?;
        Ok(self.primary_category.as_deref())
    }

    /// Sets the primary category.
    pub fn set_primary_category(&mut self, category: impl Into<String>) {
        assign(
            &mut self.meta.changes,
            "primary-category",
            &mut self.primary_category,
            Some(category.into()),
        );
    }

    /// The matched URLs.
    pub fn urls(&self) -> ModelResult<&[String]> {
        self.meta.require("url-list", DetailLevel::Full)?;
        Ok(&self.url_list)
    }

    /// Replaces the URL list.
    pub fn set_urls<U: Into<String>>(&mut self, urls: impl IntoIterator<Item = U>) {
        self.url_list = urls.into_iter().map(Into::into).collect();
        self.meta.changes.mark("url-list");
    }

    /// Appends one URL.
    pub fn add_url(&mut self, url: impl Into<String>) {
        self.url_list.push(url.into());
        self.meta.changes.mark("url-list");
    }
}

impl ObjectCodec for ApplicationSite {
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
        if let Some(category) = doc_str(doc, "primary-category") {
            self.primary_category = Some(category);
        }
        if let Some(urls) = doc.get("url-list").and_then(Value::as_array) {
            self.url_list = urls
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect();
        }
        Ok(())
    }

    fn write_fields(&self, mode: WriteMode, out: &mut Map<String, Value>) {
        emit_str(
            out,
            mode,
            &self.meta.changes,
            "primary-category",
            &self.primary_category,
        );
        let include = match mode {
            WriteMode::Create => !self.url_list.is_empty(),
            WriteMode::Update => self.meta.changes.contains("url-list"),
        };
        if include {
            let urls = self.url_list.iter().cloned().map(Value::String).collect();
            out.insert("url-list".to_owned(), Value::Array(urls));
        }
    }
}

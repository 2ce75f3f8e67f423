//! API construction.
//!
//! An [`ApiBuilder`] collects functions and documentation; [`ApiBuilder::build`]
//! validates them and precomputes every static artifact, so that an [`Api`]
//! is immutable and can be shared between requests without locking.

use crate::config::ProtocolConfig;
use crate::descriptor::{BaseUrl, Descriptor};
use crate::dispatch::{dispatch, CallResult};
use crate::docs::Section;
use crate::error::{Error, Result, SherpaError};
use crate::handler::{Fallible, Handler, Plain};
use crate::registry::{Function, Registry, Returned, Signature};
use bytes::Bytes;
use std::any::type_name;
use tracing::{info, warn};

/// Builder for an [`Api`].
pub struct ApiBuilder {
    base_url: String,
    id: String,
    title: String,
    version: String,
    entries: Vec<(String, Function)>,
    docs: Option<Section>,
    rejected: Option<SherpaError>,
}

impl ApiBuilder {
    /// Start an API served from `base_url`, e.g. `https://example.com/demo/`.
    pub fn new(
        base_url: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            id: id.into(),
            title: title.into(),
            version: version.into(),
            entries: Vec::new(),
            docs: None,
            rejected: None,
        }
    }

    /// Expose an async function without an error indicator.
    ///
    /// Functions returning `Result` belong in [`ApiBuilder::fallible`];
    /// registering one here makes [`ApiBuilder::build`] fail.
    pub fn function<H, Args, T>(self, name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<Args, Plain<T>>,
    {
        self.plain::<T>(name.into(), handler.into_function(false))
    }

    /// Expose an async function returning `Result<T, E>`.
    pub fn fallible<H, Args, T, E>(self, name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<Args, Fallible<T, E>>,
    {
        self.raw(name, handler.into_function(false))
    }

    /// Expose an async function whose last parameter is a variadic tail,
    /// typically a `Vec<_>`. Callers may omit it.
    pub fn variadic<H, Args, T>(self, name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<Args, Plain<T>>,
    {
        self.plain::<T>(name.into(), handler.into_function(true))
    }

    /// Fallible variant of [`ApiBuilder::variadic`].
    pub fn variadic_fallible<H, Args, T, E>(self, name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<Args, Fallible<T, E>>,
    {
        self.raw(name, handler.into_function(true))
    }

    fn plain<T>(mut self, name: String, function: Function) -> Self {
        if self.rejected.is_none() && type_name::<T>().starts_with("core::result::Result<") {
            self.rejected = Some(SherpaError::InvalidSignature {
                name: name.clone(),
                message: "function returns Result; register it as fallible".into(),
            });
        }
        self.raw(name, function)
    }

    /// Expose a prebuilt function.
    pub fn raw(mut self, name: impl Into<String>, function: Function) -> Self {
        self.entries.push((name.into(), function));
        self
    }

    /// Documentation returned by `_docs`. Without it a minimal tree is
    /// derived from the registered signatures.
    pub fn docs(mut self, docs: Section) -> Self {
        self.docs = Some(docs);
        self
    }

    pub fn build(self) -> Result<Api> {
        if let Some(err) = self.rejected {
            return Err(err);
        }
        let base_url = BaseUrl::parse(&self.base_url)?;
        let registry = Registry::new(self.entries)?;

        let docs = match self.docs {
            Some(mut docs) => {
                docs.validate()?;
                docs.normalize_versions();
                docs
            }
            None => Section::generate(&self.title, &registry),
        };
        let docs_value = serde_json::to_value(&docs)?;
        let docs_function = Function::raw(
            Signature::new(Vec::<String>::new(), ["Section"]),
            move |_| {
                let value = docs_value.clone();
                async move { Returned::Values(vec![value]) }
            },
        );

        let descriptor = Descriptor::new(
            base_url.as_str(),
            self.id,
            self.title,
            self.version,
            registry.names(),
        );
        let descriptor_json = descriptor.to_bytes()?;
        let script = crate::script::render(&descriptor_json);

        info!(
            "Built API {} ({} functions) at {}",
            descriptor.id,
            registry.len(),
            base_url.as_str()
        );

        Ok(Api {
            base_url,
            registry,
            descriptor,
            descriptor_json,
            script,
            docs,
            docs_function,
        })
    }
}

/// An exposed API: functions plus precomputed descriptor, script and docs.
#[derive(Debug)]
pub struct Api {
    base_url: BaseUrl,
    registry: Registry,
    descriptor: Descriptor,
    descriptor_json: Bytes,
    script: Bytes,
    docs: Section,
    docs_function: Function,
}

impl Api {
    pub fn builder(
        base_url: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        version: impl Into<String>,
    ) -> ApiBuilder {
        ApiBuilder::new(base_url, id, title, version)
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn title(&self) -> &str {
        &self.descriptor.title
    }

    pub fn version(&self) -> &str {
        &self.descriptor.version
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Serialized descriptor, identical for every request.
    pub fn descriptor_json(&self) -> Bytes {
        self.descriptor_json.clone()
    }

    pub fn script(&self) -> Bytes {
        self.script.clone()
    }

    pub fn docs(&self) -> &Section {
        &self.docs
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Look up a callable function, including the reserved `_docs`.
    pub fn lookup(&self, name: &str) -> Option<&Function> {
        if name == ProtocolConfig::DOCS_FUNCTION {
            return Some(&self.docs_function);
        }
        self.registry.get(name)
    }

    /// Run one call against the API. Unknown functions produce a
    /// `sherpaBadFunction` failure.
    pub async fn call(&self, name: &str, body: &[u8]) -> CallResult {
        match self.lookup(name) {
            Some(function) => dispatch(name, function, body).await,
            None => {
                warn!("Call to unknown function {}", name);
                CallResult::Failure(Error::bad_function(format!(
                    "function {} does not exist",
                    name
                )))
            }
        }
    }
}

//! Function registry.
//!
//! A [`Registry`] maps function names to [`Function`]s. It is built once by
//! [`crate::ApiBuilder`] and is read-only afterwards.

use crate::config::ProtocolConfig;
use crate::error::{Error, FunctionError, Result, SherpaError};
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Outputs of one invocation, before normalization into a call result.
#[derive(Debug)]
pub enum Returned {
    /// Function without an error indicator.
    Values(Vec<Value>),
    /// Function with a trailing error indicator; `None` means it is clear.
    Checked(Vec<Value>, Option<FunctionError>),
}

/// Future produced by an invocation.
pub type CallFuture = BoxFuture<'static, Returned>;

type Shim = dyn Fn(Vec<Value>) -> std::result::Result<CallFuture, Error> + Send + Sync;

/// Declared shape of an exposed function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<String>,
    variadic: bool,
    returns: Vec<String>,
    fallible: bool,
}

impl Signature {
    pub fn new<P, R>(params: P, returns: R) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            variadic: false,
            returns: returns.into_iter().map(Into::into).collect(),
            fallible: false,
        }
    }

    /// Mark the last parameter as variadic. It is passed as one array and may
    /// be left out by the caller.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Mark the function as having a trailing error indicator.
    pub fn fallible(mut self) -> Self {
        self.fallible = true;
        self
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn returns(&self) -> &[String] {
        &self.returns
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn is_fallible(&self) -> bool {
        self.fallible
    }

    /// Whether a call with `count` parameters passes the arity check.
    pub fn accepts(&self, count: usize) -> bool {
        let fixed = self.params.len();
        if self.variadic {
            count == fixed || count + 1 == fixed
        } else {
            count == fixed
        }
    }

    /// The error reported when a call with `got` parameters is rejected.
    pub fn arity_error(&self, got: usize) -> Error {
        let want = self.params.len();
        let message = if self.variadic {
            format!(
                "bad number of parameters, got {}, want {} or {}",
                got,
                want.saturating_sub(1),
                want
            )
        } else {
            format!("bad number of parameters, got {}, want {}", got, want)
        };
        Error::bad_params(message)
    }

    fn check(&self, name: &str) -> Result<()> {
        if self.variadic && self.params.is_empty() {
            return Err(SherpaError::InvalidSignature {
                name: name.to_string(),
                message: "variadic function must declare at least one parameter".into(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if self.variadic && i + 1 == self.params.len() {
                write!(f, "...")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")?;
        let mut returns: Vec<&str> = self.returns.iter().map(String::as_str).collect();
        if self.fallible {
            returns.push("error");
        }
        match returns.len() {
            0 => Ok(()),
            1 => write!(f, " -> {}", returns[0]),
            _ => write!(f, " -> ({})", returns.join(", ")),
        }
    }
}

/// An exposed function: its signature plus the adapter that coerces
/// parameters and produces the invocation future.
#[derive(Clone)]
pub struct Function {
    signature: Signature,
    shim: Arc<Shim>,
}

impl Function {
    /// Build a function from an explicit signature and a closure receiving
    /// the arity-checked parameters as JSON values.
    ///
    /// For a variadic signature, an omitted tail arrives as an empty array.
    pub fn raw<F, Fut>(signature: Signature, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Returned> + Send + 'static,
    {
        Self::from_shim(signature, move |params| {
            let fut: CallFuture = Box::pin(f(params));
            Ok(fut)
        })
    }

    pub(crate) fn from_shim<S>(signature: Signature, shim: S) -> Self
    where
        S: Fn(Vec<Value>) -> std::result::Result<CallFuture, Error> + Send + Sync + 'static,
    {
        Self {
            signature,
            shim: Arc::new(shim),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Coerce the parameters and create the invocation future. Nothing runs
    /// until the future is polled.
    pub(crate) fn prepare(&self, params: Vec<Value>) -> std::result::Result<CallFuture, Error> {
        (self.shim)(params)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Immutable name to function mapping.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    functions: BTreeMap<String, Function>,
}

impl Registry {
    /// Build a registry, rejecting invalid or duplicate names and signatures
    /// that can never be called.
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Function)>,
    {
        let mut functions = BTreeMap::new();
        for (name, function) in entries {
            validate_name(&name)?;
            function.signature.check(&name)?;
            if functions.contains_key(&name) {
                return Err(SherpaError::DuplicateFunction(name));
            }
            functions.insert(name, function);
        }
        Ok(Self { functions })
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Function names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Function)> {
        self.functions.iter().map(|(name, f)| (name.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason| SherpaError::InvalidFunctionName {
        name: name.to_string(),
        reason,
    };

    if ProtocolConfig::RESERVED_NAMES.contains(&name) {
        return Err(SherpaError::ReservedName(name.to_string()));
    }
    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid("name is empty")),
        Some(c) if c.is_ascii_digit() => return Err(invalid("name starts with a digit")),
        _ => {}
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("only letters, digits and underscores are allowed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop(signature: Signature) -> Function {
        Function::raw(signature, |_| async { Returned::Values(vec![]) })
    }

    #[test]
    fn test_arity_fixed() {
        let sig = Signature::new(["i64", "i64"], ["i64"]);
        assert!(sig.accepts(2));
        assert!(!sig.accepts(1));
        assert!(!sig.accepts(3));
        assert_eq!(
            sig.arity_error(1).message,
            "bad number of parameters, got 1, want 2"
        );
    }

    #[test]
    fn test_arity_variadic() {
        let sig = Signature::new(["String", "Vec<String>"], ["String"]).variadic();
        assert!(sig.accepts(1));
        assert!(sig.accepts(2));
        assert!(!sig.accepts(0));
        assert!(!sig.accepts(3));
        assert_eq!(
            sig.arity_error(3).message,
            "bad number of parameters, got 3, want 1 or 2"
        );
    }

    #[test]
    fn test_signature_display() {
        let sig = Signature::new(["String", "Vec<String>"], ["String"])
            .variadic()
            .fallible();
        assert_eq!(sig.to_string(), "(String, ...Vec<String>) -> (String, error)");
        assert_eq!(Signature::new(Vec::<String>::new(), Vec::<String>::new()).to_string(), "()");
    }

    #[test]
    fn test_registry_sorted_names() {
        let registry = Registry::new([
            ("zeta".to_string(), noop(Signature::new(["i64"], ["i64"]))),
            ("alpha".to_string(), noop(Signature::new(["i64"], ["i64"]))),
        ])
        .unwrap();
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.get("alpha").is_some());
        assert!(registry.get("beta").is_none());
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let err = Registry::new([
            ("sum".to_string(), noop(Signature::new(["i64"], ["i64"]))),
            ("sum".to_string(), noop(Signature::new(["i64"], ["i64"]))),
        ])
        .unwrap_err();
        assert!(matches!(err, SherpaError::DuplicateFunction(name) if name == "sum"));
    }

    #[test]
    fn test_registry_rejects_bad_names() {
        for name in ["", "9lives", "a/b", "has space"] {
            let err = Registry::new([(name.to_string(), noop(Signature::new(["i64"], ["i64"])))])
                .unwrap_err();
            assert!(
                matches!(err, SherpaError::InvalidFunctionName { .. }),
                "{name:?} gave {err}"
            );
        }
        let err = Registry::new([("_docs".to_string(), noop(Signature::new(["i64"], ["i64"])))])
            .unwrap_err();
        assert!(matches!(err, SherpaError::ReservedName(_)));
    }

    #[test]
    fn test_registry_rejects_empty_variadic() {
        let sig = Signature::new(Vec::<String>::new(), ["i64"]).variadic();
        let err = Registry::new([("broken".to_string(), noop(sig))]).unwrap_err();
        assert!(matches!(err, SherpaError::InvalidSignature { .. }));
    }

    #[tokio::test]
    async fn test_raw_function_receives_params() {
        let f = Function::raw(Signature::new(["any"], ["any"]), |params| async move {
            Returned::Values(params)
        });
        match f.prepare(vec![json!(7)]).unwrap().await {
            Returned::Values(values) => assert_eq!(values, vec![json!(7)]),
            other => panic!("unexpected {other:?}"),
        }
    }
}

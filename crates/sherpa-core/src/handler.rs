//! Typed function adapters.
//!
//! Async functions and closures whose parameters implement
//! [`DeserializeOwned`] and whose output implements [`Serialize`] can be
//! exposed directly. The adapter decodes each positional JSON value into the
//! declared parameter type before the function runs, and encodes the output
//! afterwards. `()` is zero outputs and a tuple is several outputs.

use crate::error::{Error, FunctionError};
use crate::registry::{CallFuture, Function, Returned, Signature};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::{type_name, TypeId};
use std::future::Future;
use std::marker::PhantomData;
use tracing::error;

/// Marker for functions returning a value without an error indicator.
pub struct Plain<T>(PhantomData<fn() -> T>);

/// Marker for functions returning `Result<T, E>`.
pub struct Fallible<T, E>(PhantomData<fn() -> (T, E)>);

/// A callable that can be exposed as a Sherpa function.
///
/// Implemented for `Fn` types of up to eight parameters. `Args` is the tuple
/// of parameter types and `Marker` selects between [`Plain`] and
/// [`Fallible`] outputs.
pub trait Handler<Args, Marker>: Send + Sync + Sized + 'static {
    /// Signature derived from the parameter and output types.
    fn signature(&self) -> Signature;

    /// Decode the parameters and start the call.
    fn prepare(&self, params: Vec<Value>) -> Result<CallFuture, Error>;

    /// Wrap the handler into a registry entry.
    fn into_function(self, variadic: bool) -> Function {
        let mut signature = self.signature();
        if variadic {
            signature = signature.variadic();
        }
        Function::from_shim(signature, move |params| self.prepare(params))
    }
}

/// Readable type name without module paths, e.g. `Vec<String>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
            continue;
        }
        out.push(c);
        if !(c.is_alphanumeric() || c == '_') {
            segment_start = out.len();
        }
    }
    out
}

fn label<T>() -> String {
    short_type_name(type_name::<T>())
}

fn output_labels<T: 'static>() -> Vec<String> {
    if TypeId::of::<T>() == TypeId::of::<()>() {
        Vec::new()
    } else {
        vec![label::<T>()]
    }
}

fn decode<A: DeserializeOwned>(position: usize, value: Option<Value>) -> Result<A, Error> {
    let value = value.ok_or_else(|| {
        Error::bad_params(format!("missing parameter {}", position))
    })?;
    serde_json::from_value(value).map_err(|e| {
        Error::bad_params(format!(
            "parameter {}: cannot decode as {}: {}",
            position,
            label::<A>(),
            e
        ))
    })
}

fn encode<T: Serialize + 'static>(output: T) -> Result<Vec<Value>, FunctionError> {
    if TypeId::of::<T>() == TypeId::of::<()>() {
        return Ok(Vec::new());
    }
    match serde_json::to_value(&output) {
        Ok(value) => Ok(vec![value]),
        Err(e) => {
            error!("Failed to encode result of type {}: {}", label::<T>(), e);
            Err(FunctionError::Plain(format!("encoding result: {}", e)))
        }
    }
}

fn plain_returned<T: Serialize + 'static>(output: T) -> Returned {
    match encode(output) {
        Ok(values) => Returned::Values(values),
        Err(err) => Returned::Checked(Vec::new(), Some(err)),
    }
}

fn fallible_returned<T, E>(output: Result<T, E>) -> Returned
where
    T: Serialize + 'static,
    E: Into<FunctionError>,
{
    match output {
        Ok(value) => match encode(value) {
            Ok(values) => Returned::Checked(values, None),
            Err(err) => Returned::Checked(Vec::new(), Some(err)),
        },
        Err(err) => Returned::Checked(Vec::new(), Some(err.into())),
    }
}

macro_rules! impl_handler {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, Fut, T, $($ty,)*> Handler<($($ty,)*), Plain<T>> for F
        where
            F: Fn($($ty),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = T> + Send + 'static,
            T: Serialize + Send + 'static,
            $($ty: DeserializeOwned + Send + 'static,)*
        {
            fn signature(&self) -> Signature {
                let params: Vec<String> = vec![$(label::<$ty>()),*];
                Signature::new(params, output_labels::<T>())
            }

            fn prepare(&self, params: Vec<Value>) -> Result<CallFuture, Error> {
                let mut params = params.into_iter();
                let mut position = 0usize;
                $(
                    position += 1;
                    let $ty = decode::<$ty>(position, params.next())?;
                )*
                let fut = (self)($($ty),*);
                Ok(Box::pin(async move { plain_returned(fut.await) }))
            }
        }

        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, Fut, T, E, $($ty,)*> Handler<($($ty,)*), Fallible<T, E>> for F
        where
            F: Fn($($ty),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Result<T, E>> + Send + 'static,
            T: Serialize + Send + 'static,
            E: Into<FunctionError> + Send + 'static,
            $($ty: DeserializeOwned + Send + 'static,)*
        {
            fn signature(&self) -> Signature {
                let params: Vec<String> = vec![$(label::<$ty>()),*];
                Signature::new(params, output_labels::<T>()).fallible()
            }

            fn prepare(&self, params: Vec<Value>) -> Result<CallFuture, Error> {
                let mut params = params.into_iter();
                let mut position = 0usize;
                $(
                    position += 1;
                    let $ty = decode::<$ty>(position, params.next())?;
                )*
                let fut = (self)($($ty),*);
                Ok(Box::pin(async move { fallible_returned(fut.await) }))
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);
impl_handler!(A1, A2, A3, A4, A5, A6, A7);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8);

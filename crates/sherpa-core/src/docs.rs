//! Documentation tree returned by the `_docs` function.
//!
//! The tree is supplied by the API author or derived from the registered
//! signatures. Parameter and field types are token lists following this
//! grammar:
//!
//! ```text
//! type := "nullable"? ("any" | basictype | identifier | "[]" type | "{}" type)
//! ```

use crate::config::DocsConfig;
use crate::error::{Result, SherpaError};
use crate::handler::short_type_name;
use crate::registry::{Registry, Signature};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fmt::Write as _;

/// Basic type tokens.
pub const BASIC_TYPES: &[&str] = &[
    "boolean", "int8", "uint8", "int16", "uint16", "int32", "uint32", "int64", "uint64",
    "int64s", "uint64s", "float32", "float64", "string", "timestamp", "int", "float",
];

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn is_zero(version: &i64) -> bool {
    *version == 0
}

/// A section of API documentation. Sections nest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    /// Markdown.
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub functions: Vec<FunctionDoc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sections: Vec<Section>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub types: Vec<TypeDoc>,
    /// Documentation format version, only meaningful on the root section.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub version: i64,
}

/// Documentation for one function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDoc {
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub params: Vec<Param>,
    #[serde(rename = "return", default, deserialize_with = "null_as_empty")]
    pub returns: Vec<Param>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub ty: Vec<String>,
}

/// A named compound type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDoc {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fields: Vec<FieldDoc>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDoc {
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub ty: Vec<String>,
    #[serde(default)]
    pub text: String,
}

/// Parsed type token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    pub nullable: bool,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Any,
    Basic(String),
    Named(String),
    Array(Box<TypeExpr>),
    Map(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> std::result::Result<Self, String> {
        let (expr, rest) = Self::parse_prefix(tokens)?;
        if !rest.is_empty() {
            return Err(format!("unexpected token {:?} after type", rest[0].as_ref()));
        }
        Ok(expr)
    }

    fn parse_prefix<S: AsRef<str>>(tokens: &[S]) -> std::result::Result<(Self, &[S]), String> {
        let (nullable, tokens) = match tokens.first().map(AsRef::as_ref) {
            Some("nullable") => (true, &tokens[1..]),
            _ => (false, tokens),
        };
        let Some((first, rest)) = tokens.split_first() else {
            return Err("missing type".to_string());
        };
        let (kind, rest) = match first.as_ref() {
            "any" => (TypeKind::Any, rest),
            "[]" => {
                let (elem, rest) = Self::parse_prefix(rest)?;
                (TypeKind::Array(Box::new(elem)), rest)
            }
            "{}" => {
                let (elem, rest) = Self::parse_prefix(rest)?;
                (TypeKind::Map(Box::new(elem)), rest)
            }
            "nullable" => return Err("repeated nullable".to_string()),
            token if BASIC_TYPES.contains(&token) => (TypeKind::Basic(token.to_string()), rest),
            token if is_identifier(token) => (TypeKind::Named(token.to_string()), rest),
            token => return Err(format!("invalid type token {:?}", token)),
        };
        Ok((Self { nullable, kind }, rest))
    }

    pub fn to_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        self.push_tokens(&mut tokens);
        tokens
    }

    fn push_tokens(&self, tokens: &mut Vec<String>) {
        if self.nullable {
            tokens.push("nullable".into());
        }
        match &self.kind {
            TypeKind::Any => tokens.push("any".into()),
            TypeKind::Basic(name) | TypeKind::Named(name) => tokens.push(name.clone()),
            TypeKind::Array(elem) => {
                tokens.push("[]".into());
                elem.push_tokens(tokens);
            }
            TypeKind::Map(elem) => {
                tokens.push("{}".into());
                elem.push_tokens(tokens);
            }
        }
    }

    /// Map a Rust type name, as reported for a registered function, onto a
    /// documentation type. Unknown generic types become `any`.
    pub fn from_rust_type(name: &str) -> Self {
        let name = short_type_name(name);
        let name = name.trim();
        let plain = |kind| Self {
            nullable: false,
            kind,
        };
        if let Some(inner) = generic_arg(name, "Option") {
            let mut expr = Self::from_rust_type(inner);
            expr.nullable = true;
            return expr;
        }
        if let Some(inner) = generic_arg(name, "Vec").or_else(|| slice_elem(name)) {
            return plain(TypeKind::Array(Box::new(Self::from_rust_type(inner))));
        }
        for map in ["HashMap", "BTreeMap"] {
            if let Some(args) = generic_arg(name, map) {
                let value = args.split_once(',').map(|(_, v)| v).unwrap_or("Value");
                return plain(TypeKind::Map(Box::new(Self::from_rust_type(value))));
            }
        }
        let basic = match name {
            "bool" => "boolean",
            "i8" => "int8",
            "u8" => "uint8",
            "i16" => "int16",
            "u16" => "uint16",
            "i32" => "int32",
            "u32" => "uint32",
            "i64" | "isize" => "int64",
            "u64" | "usize" => "uint64",
            "Int64s" => "int64s",
            "Uint64s" => "uint64s",
            "f32" => "float32",
            "f64" => "float64",
            "String" | "&str" | "char" => "string",
            "Value" => return plain(TypeKind::Any),
            other if is_identifier(other) => return plain(TypeKind::Named(other.to_string())),
            _ => return plain(TypeKind::Any),
        };
        plain(TypeKind::Basic(basic.to_string()))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tokens().join(" "))
    }
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

fn generic_arg<'a>(name: &'a str, outer: &str) -> Option<&'a str> {
    name.strip_prefix(outer)?
        .strip_prefix('<')?
        .strip_suffix('>')
        .map(str::trim)
}

fn slice_elem(name: &str) -> Option<&str> {
    name.strip_prefix("&[")?.strip_suffix(']')
}

impl Section {
    /// Minimal documentation derived from the registered signatures.
    pub fn generate(title: &str, registry: &Registry) -> Self {
        let functions = registry
            .iter()
            .map(|(name, function)| FunctionDoc::generate(name, function.signature()))
            .collect();
        Self {
            title: title.to_string(),
            text: String::new(),
            functions,
            sections: Vec::new(),
            types: Vec::new(),
            version: DocsConfig::FORMAT_VERSION,
        }
    }

    /// Check every type token list in the tree.
    pub fn validate(&self) -> Result<()> {
        let invalid = |owner: &str, tokens: &[String], message: String| SherpaError::InvalidDocs {
            message: format!("{}: type {:?}: {}", owner, tokens, message),
        };
        for function in &self.functions {
            for param in function.params.iter().chain(&function.returns) {
                TypeExpr::parse(&param.ty).map_err(|e| {
                    invalid(&format!("{}.{}", function.name, param.name), &param.ty, e)
                })?;
            }
        }
        for ty in &self.types {
            for field in &ty.fields {
                TypeExpr::parse(&field.ty).map_err(|e| {
                    invalid(&format!("{}.{}", ty.name, field.name), &field.ty, e)
                })?;
            }
        }
        self.sections.iter().try_for_each(Section::validate)
    }

    /// Clear versions below the root and default the root version.
    pub fn normalize_versions(&mut self) {
        if self.version == 0 {
            self.version = DocsConfig::FORMAT_VERSION;
        }
        for section in &mut self.sections {
            section.clear_versions();
        }
    }

    fn clear_versions(&mut self) {
        self.version = 0;
        for section in &mut self.sections {
            section.clear_versions();
        }
    }

    /// Find a function anywhere in the tree.
    pub fn find_function(&self, name: &str) -> Option<&FunctionDoc> {
        self.functions
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.sections.iter().find_map(|s| s.find_function(name)))
    }

    /// Render the tree as plain text, one heading per section and function.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        let _ = write!(out, "# {}\n\n{}\n\n", self.title, self.text);
        for function in &self.functions {
            let _ = write!(out, "# {}()\n{}\n\n", function.name, function.text);
        }
        for section in &self.sections {
            section.render_into(out);
        }
        out.push('\n');
    }
}

impl FunctionDoc {
    fn generate(name: &str, signature: &Signature) -> Self {
        let params = signature
            .params()
            .iter()
            .enumerate()
            .map(|(i, ty)| Param {
                name: format!("p{}", i + 1),
                ty: TypeExpr::from_rust_type(ty).to_tokens(),
            })
            .collect();
        let returns = signature
            .returns()
            .iter()
            .enumerate()
            .map(|(i, ty)| Param {
                name: format!("r{}", i + 1),
                ty: TypeExpr::from_rust_type(ty).to_tokens(),
            })
            .collect();
        Self {
            name: name.to_string(),
            text: format!("{}{}", name, signature),
            params,
            returns,
        }
    }
}

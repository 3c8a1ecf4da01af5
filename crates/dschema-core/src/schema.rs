//! # Compiled Schema Model
//!
//! The immutable, typed counterpart of a raw schema. A compiled [`Schema`]
//! has every default resolved and every nested schema compiled; the tree is
//! isomorphic to (a resolved version of) the raw tree.
//!
//! ## Dispatch
//!
//! [`SchemaKind`] is a closed sum type over the built-in schema types, plus
//! [`SchemaKind::Custom`] so that user-registered types still fit the model.
//! Compilers and validators are looked up by [`Schema::type_name`], so a
//! custom type participates in dispatch exactly like a built-in one.
//!
//! ## References
//!
//! `$ref` nodes are normally inlined at compile time. Only a reference that
//! points back into a definition still being compiled survives as
//! [`SchemaKind::Ref`]; it is resolved lazily against
//! [`TopSchema::definitions`] during validation. The compiled tree is
//! therefore always acyclic.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Type names of the built-in schema types.
pub mod types {
    /// `boolean`
    pub const BOOLEAN: &str = "boolean";
    /// `null`
    pub const NULL: &str = "null";
    /// `number`
    pub const NUMBER: &str = "number";
    /// `integer`
    pub const INTEGER: &str = "integer";
    /// `string`
    pub const STRING: &str = "string";
    /// `array`
    pub const ARRAY: &str = "array";
    /// `object`
    pub const OBJECT: &str = "object";
    /// `combine`
    pub const COMBINE: &str = "combine";
    /// `ref`
    pub const REF: &str = "ref";
}

/// Default prefix of definition paths (`#/definitions/<name>`).
pub const DEFAULT_DEFINITION_PREFIX: &str = "#/definitions/";

/// A compiled schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Whether a value must be present (after default substitution).
    pub required: bool,
    /// Value substituted when the input is absent.
    pub default: Option<Value>,
    /// Type-specific part.
    pub kind: SchemaKind,
}

impl Schema {
    /// A schema of the given kind with `required: false` and no default.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            required: false,
            default: None,
            kind,
        }
    }

    /// The `type` discriminator.
    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }
}

/// Type-specific part of a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// `boolean`
    Boolean,
    /// `null`
    Null,
    /// `number`
    Number(NumberSchema),
    /// `integer`
    Integer(IntegerSchema),
    /// `string`
    String(StringSchema),
    /// `array`
    Array(ArraySchema),
    /// `object`
    Object(ObjectSchema),
    /// `combine` (allOf / anyOf / oneOf)
    Combine(CombineSchema),
    /// `ref` left unresolved because it is recursive.
    Ref(RefSchema),
    /// A user-registered type.
    Custom(CustomSchema),
}

impl SchemaKind {
    /// The `type` discriminator.
    pub fn type_name(&self) -> &str {
        match self {
            SchemaKind::Boolean => types::BOOLEAN,
            SchemaKind::Null => types::NULL,
            SchemaKind::Number(_) => types::NUMBER,
            SchemaKind::Integer(_) => types::INTEGER,
            SchemaKind::String(_) => types::STRING,
            SchemaKind::Array(_) => types::ARRAY,
            SchemaKind::Object(_) => types::OBJECT,
            SchemaKind::Combine(_) => types::COMBINE,
            SchemaKind::Ref(_) => types::REF,
            SchemaKind::Custom(c) => &c.type_name,
        }
    }
}

/// Constraints of a `number` schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberSchema {
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Exclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    /// Exclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    /// Allowed values.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<f64>>,
}

/// Constraints of an `integer` schema. Bounds are rounded inward at
/// compile time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegerSchema {
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    /// Exclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<i64>,
    /// Exclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<i64>,
    /// Allowed values.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<i64>>,
}

/// Supported `format` names of a string schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringFormat {
    /// E-mail address.
    Email,
    /// Dotted-quad IPv4 address.
    Ipv4,
    /// IPv6 address.
    Ipv6,
}

impl StringFormat {
    /// Parse a format name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "email" => Some(Self::Email),
            "ipv4" => Some(Self::Ipv4),
            "ipv6" => Some(Self::Ipv6),
            _ => None,
        }
    }
}

/// Supported `transform` steps of a string schema, applied in declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringTransform {
    /// Strip leading and trailing whitespace.
    Trim,
    /// Lower-case every character.
    Lowercase,
    /// Upper-case every character.
    Uppercase,
    /// `HelloWorld`
    CamelCase,
    /// `helloWorld`
    LittleCamelCase,
    /// `hello-world`
    KebabCase,
}

impl StringTransform {
    /// Parse a transform name, case-insensitively; `_` and `-` are interchangeable.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('_', "-").as_str() {
            "trim" => Some(Self::Trim),
            "lowercase" => Some(Self::Lowercase),
            "uppercase" => Some(Self::Uppercase),
            "camel-case" => Some(Self::CamelCase),
            "little-camel-case" => Some(Self::LittleCamelCase),
            "kebab-case" => Some(Self::KebabCase),
            _ => None,
        }
    }
}

/// A compiled regular expression that compares and serializes by source.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile a pattern.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    /// The pattern's source text.
    pub fn source(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self(regex)
    }
}

impl Deref for Pattern {
    type Target = Regex;

    fn deref(&self) -> &Regex {
        &self.0
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source()).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source()
    }
}

impl Eq for Pattern {}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.source())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// Constraints of a `string` schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringSchema {
    /// Minimum length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Pattern the value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    /// The value must satisfy at least one of these formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Vec<StringFormat>>,
    /// Transform pipeline applied before any check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Vec<StringTransform>>,
    /// Allowed values.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

/// Constraints of an `array` schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    /// Schema of every element.
    pub items: Box<Schema>,
    /// Whether elements must be pairwise distinct.
    pub unique: bool,
}

/// A property whose name is a pattern matched against input keys.
#[derive(Debug, Clone, PartialEq)]
pub struct RegexNameProperty {
    /// Key pattern.
    pub pattern: Pattern,
    /// Schema shared by every matching key.
    pub schema: Schema,
}

/// Constraints of an `object` schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    /// Literal-named properties.
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Pattern-named properties, checked after literal names.
    pub regex_name_properties: Option<Vec<RegexNameProperty>>,
    /// String schema constraining the names of additional properties.
    pub property_names: Option<Box<Schema>>,
    /// `key -> [keys that must also be present]`.
    pub dependencies: Option<BTreeMap<String, Vec<String>>>,
    /// Names of required properties.
    pub required_properties: Vec<String>,
    /// Keep undeclared properties (subject to `property_names`).
    pub allow_additional_properties: bool,
    /// Drop undeclared properties without a warning.
    pub silent_ignore: bool,
}

/// How group results of a `combine` schema are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineStrategy {
    /// Every present group must be valid.
    #[default]
    All,
    /// At least one present group must be valid.
    Any,
    /// Exactly one present group must be valid.
    One,
}

impl CombineStrategy {
    /// Parse a strategy name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "all" => Some(Self::All),
            "any" => Some(Self::Any),
            "one" => Some(Self::One),
            _ => None,
        }
    }

    /// The strategy name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
            Self::One => "one",
        }
    }
}

/// Constraints of a `combine` schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombineSchema {
    /// Group combination strategy.
    pub strategy: CombineStrategy,
    /// Data must match every member.
    pub all_of: Option<Vec<Schema>>,
    /// Data must match at least one member.
    pub any_of: Option<Vec<Schema>>,
    /// Data must match exactly one member.
    pub one_of: Option<Vec<Schema>>,
}

/// A recursive reference, resolved at validation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefSchema {
    /// `$id` or `#/definitions/<name>` of the target.
    pub reference: String,
}

/// A schema of a user-registered type.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomSchema {
    /// The registered `type` discriminator.
    pub type_name: String,
    /// Type-specific properties, as produced by the custom compiler.
    pub properties: Map<String, Value>,
}

/// A compiled entry of a `definitions` block.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionSchema {
    /// Explicit `$id`, if any.
    pub id: Option<String>,
    /// Compiled body.
    pub schema: Schema,
}

/// The result of compiling a complete raw schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TopSchema {
    /// Explicit `$id` of the top schema, if any.
    pub id: Option<String>,
    /// Compiled definitions, keyed by name.
    pub definitions: BTreeMap<String, DefinitionSchema>,
    /// Compiled body.
    pub schema: Schema,
}

impl TopSchema {
    /// Wrap a body with no definitions.
    pub fn from_schema(schema: Schema) -> Self {
        Self {
            id: None,
            definitions: BTreeMap::new(),
            schema,
        }
    }

    /// Look up a reference target.
    ///
    /// Tries `<prefix><name>` paths first, then definition `$id`s, then the
    /// top schema's own `$id`.
    pub fn definition(&self, id_or_path: &str, prefix: &str) -> Option<&Schema> {
        if let Some(name) = id_or_path.strip_prefix(prefix) {
            if let Some(def) = self.definitions.get(name) {
                return Some(&def.schema);
            }
        }
        if let Some(def) = self
            .definitions
            .values()
            .find(|d| d.id.as_deref() == Some(id_or_path))
        {
            return Some(&def.schema);
        }
        if self.id.as_deref() == Some(id_or_path) {
            return Some(&self.schema);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_schema() -> Schema {
        Schema::new(SchemaKind::String(StringSchema::default()))
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Schema::new(SchemaKind::Boolean).type_name(), "boolean");
        assert_eq!(string_schema().type_name(), "string");
        let custom = Schema::new(SchemaKind::Custom(CustomSchema {
            type_name: "ipv4".to_string(),
            properties: Map::new(),
        }));
        assert_eq!(custom.type_name(), "ipv4");
    }

    #[test]
    fn test_pattern_equality_by_source() {
        let a = Pattern::new("^a+$").unwrap();
        let b = Pattern::new("^a+$").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Pattern::new("^b+$").unwrap());
    }

    #[test]
    fn test_pattern_serde_uses_source() {
        let p = Pattern::new(r"^\d{3}$").unwrap();
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json, Value::String(r"^\d{3}$".to_string()));
        let back: Pattern = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
        assert!(back.is_match("123"));
    }

    #[test]
    fn test_string_schema_serde_field_names() {
        let s = StringSchema {
            min_length: Some(1),
            enum_values: Some(vec!["a".to_string()]),
            transform: Some(vec![StringTransform::Trim, StringTransform::KebabCase]),
            ..Default::default()
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["minLength"], 1);
        assert_eq!(json["enum"][0], "a");
        assert_eq!(json["transform"][1], "kebab-case");
        assert!(json.get("pattern").is_none());
    }

    #[test]
    fn test_transform_and_format_names() {
        assert_eq!(StringTransform::from_name("LowerCase"), Some(StringTransform::Lowercase));
        assert_eq!(StringTransform::from_name("camel_case"), Some(StringTransform::CamelCase));
        assert_eq!(StringTransform::from_name("reverse"), None);
        assert_eq!(StringFormat::from_name("IPv4"), Some(StringFormat::Ipv4));
        assert_eq!(StringFormat::from_name("uri"), None);
    }

    #[test]
    fn test_top_schema_definition_lookup() {
        let mut definitions = BTreeMap::new();
        definitions.insert(
            "name".to_string(),
            DefinitionSchema {
                id: Some("#/name".to_string()),
                schema: string_schema(),
            },
        );
        let top = TopSchema {
            id: Some("#/root".to_string()),
            definitions,
            schema: Schema::new(SchemaKind::Boolean),
        };
        let prefix = DEFAULT_DEFINITION_PREFIX;
        assert_eq!(top.definition("#/definitions/name", prefix), Some(&string_schema()));
        assert_eq!(top.definition("#/name", prefix), Some(&string_schema()));
        assert_eq!(top.definition("#/root", prefix).map(Schema::type_name), Some("boolean"));
        assert!(top.definition("#/missing", prefix).is_none());
    }

    #[test]
    fn test_combine_strategy_names() {
        assert_eq!(CombineStrategy::default(), CombineStrategy::All);
        assert_eq!(CombineStrategy::from_name("one"), Some(CombineStrategy::One));
        assert_eq!(CombineStrategy::Any.as_str(), "any");
        assert_eq!(CombineStrategy::from_name("some"), None);
    }
}

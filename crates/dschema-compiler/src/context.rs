//! # Compile Context
//!
//! State threaded through one compile call: the registered compilers, the
//! options, and the [`DefinitionRegistry`] of the current top-level pass.
//!
//! A context is created by the [`CompilerMaster`](crate::CompilerMaster)
//! for every call and dropped when the call returns, so definitions never
//! leak from one compile into the next. Per-type compilers receive the
//! context by `&mut` and use it to compile nested raw schemas.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use dschema_core::cover::cover_string;
use dschema_core::json::stringify;
use dschema_core::{
    CompileResult, DefinitionSchema, Diagnostic, RegistryError, Schema, SchemaJsonError, TopSchema,
};
use serde_json::{Map, Value};

use crate::master::SchemaCompiler;
use crate::options::{CompilerOptions, CopyMode};
use crate::registry::{DefinitionRegistry, DefinitionState};

/// Compilers keyed by type name.
pub(crate) type CompilerSet = HashMap<String, Box<dyn SchemaCompiler>>;

/// Produce a raw schema equal to `child`, where every key the child does not
/// set (or sets to `null`) is taken from `parent`.
pub fn inherit_raw_schema(
    parent: &Map<String, Value>,
    child: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = parent.clone();
    for (key, value) in child {
        if !value.is_null() {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Per-call compile state.
pub struct CompileContext<'a> {
    compilers: &'a CompilerSet,
    options: &'a CompilerOptions,
    definitions: DefinitionRegistry<'a>,
}

impl<'a> CompileContext<'a> {
    pub(crate) fn new(compilers: &'a CompilerSet, options: &'a CompilerOptions) -> Self {
        Self {
            compilers,
            options,
            definitions: DefinitionRegistry::new(),
        }
    }

    /// Options of the owning master.
    pub fn options(&self) -> &CompilerOptions {
        self.options
    }

    /// Definitions registered in this pass.
    pub fn definitions(&self) -> &DefinitionRegistry<'a> {
        &self.definitions
    }

    /// Mutable access to the definitions registered in this pass.
    pub fn definitions_mut(&mut self) -> &mut DefinitionRegistry<'a> {
        &mut self.definitions
    }

    /// `<prefix><name>`
    pub fn definition_path(&self, name: &str) -> String {
        format!("{}{}", self.options.definition_path_prefix, name)
    }

    /// Turn a raw node into a raw schema map.
    ///
    /// A string is shorthand for `{"type": <string>}`. An object is borrowed
    /// or cloned according to [`CopyMode`].
    pub fn normalize<'v>(&self, raw: &'v Value) -> Result<Cow<'v, Map<String, Value>>, Diagnostic> {
        match raw {
            Value::String(type_name) => {
                let mut map = Map::new();
                map.insert("type".to_string(), Value::String(type_name.clone()));
                Ok(Cow::Owned(map))
            }
            Value::Object(map) => Ok(match self.options.copy_mode {
                CopyMode::Shallow => Cow::Borrowed(map),
                CopyMode::Deep => Cow::Owned(map.clone()),
            }),
            other => Err(Diagnostic::new(
                "type",
                format!(
                    "schema must be an object or a type name, but got ({}).",
                    stringify(Some(other))
                ),
            )),
        }
    }

    /// Compile any raw schema node.
    pub fn compile_data_schema(&mut self, raw: &Value) -> CompileResult<Schema> {
        match self.normalize(raw) {
            Ok(map) => self.compile_raw(&map),
            Err(diagnostic) => {
                let mut result = CompileResult::new();
                result.add_error(diagnostic);
                result
            }
        }
    }

    /// Compile an already normalized raw schema, dispatching on `type`.
    pub fn compile_raw(&mut self, raw: &Map<String, Value>) -> CompileResult<Schema> {
        let mut result = CompileResult::new();
        let type_name = match raw.get("type") {
            Some(Value::String(s)) if !s.is_empty() => s.as_str(),
            other => {
                result.add_error(Diagnostic::new(
                    "type",
                    format!("type must be a non-empty string, but got ({}).", stringify(other)),
                ));
                return result;
            }
        };
        let compilers = self.compilers;
        let Some(compiler) = compilers.get(type_name) else {
            result.add_error(Diagnostic::new(
                "type",
                format!("unknown type ({type_name})."),
            ));
            return result;
        };
        tracing::trace!(type_name, "compiling schema node");
        compiler.compile(raw, self)
    }

    /// Compile the registered definition at `path`.
    ///
    /// The entry is marked [`DefinitionState::Compiling`] while its body
    /// compiles and [`DefinitionState::Finished`] afterwards.
    pub fn compile_definition(&mut self, path: &str) -> CompileResult<DefinitionSchema> {
        let mut result = CompileResult::new();
        let Some(raw) = self.definitions.raw(path).cloned() else {
            result.add_error(Diagnostic::new(
                "$ref",
                RegistryError::NotFound(path.to_string()).to_string(),
            ));
            return result;
        };

        let id = cover_string(None, raw.get("$id"));
        if id.has_error() {
            result.add_error(Diagnostic::new("$id", id.error_summary()));
        }

        self.mark(path, DefinitionState::Compiling);
        let body = self.compile_raw(&raw);
        self.mark(path, DefinitionState::Finished);

        result.merge(&body);
        if let Some(schema) = body.into_value() {
            result.set_value(DefinitionSchema {
                id: id.value,
                schema,
            });
        }
        result
    }

    /// Compile a complete raw schema: its `definitions` block, then its body.
    pub fn compile_top_data_schema(&mut self, raw: &'a Value) -> CompileResult<TopSchema> {
        self.definitions.clear();
        let result = self.compile_top_inner(raw);
        self.definitions.clear();
        result
    }

    fn compile_top_inner(&mut self, raw: &'a Value) -> CompileResult<TopSchema> {
        let mut result = CompileResult::new();
        let top = match self.normalize(raw) {
            Ok(top) => top,
            Err(diagnostic) => {
                result.add_error(diagnostic);
                return result;
            }
        };

        let top_id = cover_string(None, top.get("$id"));
        if top_id.has_error() {
            result.add_error(Diagnostic::new("$id", top_id.error_summary()));
        }
        let top_id = top_id.value;

        // The top schema is addressable by its own $id and stays on the
        // compile stack for the whole pass.
        if let Some(id) = &top_id {
            match self.definitions.add_raw(id, top.clone(), Some(id)) {
                Ok(()) => self.mark(id, DefinitionState::Compiling),
                Err(e) => {
                    result.add_error(Diagnostic::new("$id", e.to_string()));
                }
            }
        }

        let registered = self.register_definitions(raw, &mut result);

        let mut definitions = BTreeMap::new();
        for (name, path) in &registered {
            let compiled = self.compile_definition(path);
            result.add_handle_result("definitions", &compiled, Some(name.as_str()));
            if let Some(definition) = compiled.into_value() {
                definitions.insert(name.clone(), definition);
            }
        }

        let body = self.compile_raw(&top);
        if let Some(id) = &top_id {
            if self.definitions.has(id) {
                self.mark(id, DefinitionState::Finished);
            }
        }
        result.merge(&body);

        tracing::debug!(
            definitions = definitions.len(),
            errors = result.errors().len(),
            warnings = result.warnings().len(),
            "compiled top-level schema"
        );

        if let Some(schema) = body.into_value() {
            result.set_value(TopSchema {
                id: top_id,
                definitions,
                schema,
            });
        }
        result
    }

    /// Pre-register every entry of the `definitions` block, so that forward
    /// and self references resolve. Returns `(name, path)` of each
    /// registered entry.
    fn register_definitions(
        &mut self,
        raw: &'a Value,
        result: &mut CompileResult<TopSchema>,
    ) -> Vec<(String, String)> {
        let mut registered = Vec::new();
        let defs = match raw.as_object().and_then(|m| m.get("definitions")) {
            None | Some(Value::Null) => return registered,
            Some(Value::Object(defs)) => defs,
            Some(other) => {
                result.add_error(Diagnostic::new(
                    "definitions",
                    format!("definitions must be an object, but got ({}).", stringify(Some(other))),
                ));
                return registered;
            }
        };

        for (name, def_raw) in defs {
            let path = self.definition_path(name);
            let def = match self.normalize(def_raw) {
                Ok(def) => def,
                Err(diagnostic) => {
                    result.add_error(diagnostic.with_property(name.as_str()));
                    continue;
                }
            };
            let id = match def.get("$id") {
                Some(Value::String(id)) => Some(id.clone()),
                _ => None,
            };
            if let Err(e) = self.definitions.add_raw(&path, def, id.as_deref()) {
                result.add_error(
                    Diagnostic::new("definitions", e.to_string()).with_property(name.as_str()),
                );
                continue;
            }
            registered.push((name.clone(), path));
        }
        registered
    }

    pub(crate) fn mark(&mut self, path: &str, state: DefinitionState) {
        if let Err(e) = self.definitions.set_state(path, state) {
            tracing::error!(path, error = %e, "definition vanished from the registry");
        }
    }

    /// Serialize a compiled schema by dispatching on its type.
    pub fn to_json(&self, schema: &Schema) -> Result<Value, SchemaJsonError> {
        let type_name = schema.type_name();
        let compiler = self
            .compilers
            .get(type_name)
            .ok_or_else(|| SchemaJsonError::UnknownType(type_name.to_string()))?;
        compiler.to_json(schema, self)
    }

    /// Rebuild a compiled schema from its serialized form.
    pub fn parse_json(&self, json: &Value) -> Result<Schema, SchemaJsonError> {
        let map = json
            .as_object()
            .ok_or_else(|| SchemaJsonError::NotAnObject(stringify(Some(json))))?;
        let type_name = match map.get("type") {
            Some(Value::String(s)) if !s.is_empty() => s.as_str(),
            _ => return Err(SchemaJsonError::MissingType),
        };
        let compiler = self
            .compilers
            .get(type_name)
            .ok_or_else(|| SchemaJsonError::UnknownType(type_name.to_string()))?;
        compiler.parse_json(map, self)
    }

    /// Serialize a top-level schema, including `$id` and `definitions`.
    pub fn to_json_top(&self, top: &TopSchema) -> Result<Value, SchemaJsonError> {
        let mut json = match self.to_json(&top.schema)? {
            Value::Object(map) => map,
            other => return Err(SchemaJsonError::NotAnObject(stringify(Some(&other)))),
        };
        if let Some(id) = &top.id {
            json.insert("$id".to_string(), Value::String(id.clone()));
        }
        if !top.definitions.is_empty() {
            let mut definitions = Map::new();
            for (name, definition) in &top.definitions {
                let mut def = match self.to_json(&definition.schema)? {
                    Value::Object(map) => map,
                    other => return Err(SchemaJsonError::NotAnObject(stringify(Some(&other)))),
                };
                if let Some(id) = &definition.id {
                    def.insert("$id".to_string(), Value::String(id.clone()));
                }
                definitions.insert(name.clone(), Value::Object(def));
            }
            json.insert("definitions".to_string(), Value::Object(definitions));
        }
        Ok(Value::Object(json))
    }

    /// Rebuild a top-level schema from [`to_json_top`](Self::to_json_top) output.
    pub fn parse_json_top(&self, json: &Value) -> Result<TopSchema, SchemaJsonError> {
        let map = json
            .as_object()
            .ok_or_else(|| SchemaJsonError::NotAnObject(stringify(Some(json))))?;
        let id = read_id(map)?;
        let mut definitions = BTreeMap::new();
        match map.get("definitions") {
            None | Some(Value::Null) => {}
            Some(Value::Object(defs)) => {
                for (name, def) in defs {
                    let def_id = def.as_object().map(read_id).transpose()?.flatten();
                    definitions.insert(
                        name.clone(),
                        DefinitionSchema {
                            id: def_id,
                            schema: self.parse_json(def)?,
                        },
                    );
                }
            }
            Some(_) => {
                return Err(SchemaJsonError::InvalidField {
                    type_name: "top".to_string(),
                    field: "definitions".to_string(),
                    reason: "expected an object".to_string(),
                })
            }
        }
        Ok(TopSchema {
            id,
            definitions,
            schema: self.parse_json(json)?,
        })
    }
}

fn read_id(map: &Map<String, Value>) -> Result<Option<String>, SchemaJsonError> {
    match map.get("$id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(Some(id.clone())),
        Some(_) => Err(SchemaJsonError::InvalidField {
            type_name: "top".to_string(),
            field: "$id".to_string(),
            reason: "expected a string".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!("test fixtures are objects"),
        }
    }

    #[test]
    fn test_inherit_child_wins() {
        let parent = map(json!({"type": "string", "required": true, "minLength": 2}));
        let child = map(json!({"required": false, "default": "x"}));
        let merged = inherit_raw_schema(&parent, &child);
        assert_eq!(
            Value::Object(merged),
            json!({"type": "string", "required": false, "minLength": 2, "default": "x"})
        );
    }

    #[test]
    fn test_inherit_ignores_null_overrides() {
        let parent = map(json!({"type": "integer", "required": true}));
        let child = map(json!({"required": null}));
        let merged = inherit_raw_schema(&parent, &child);
        assert_eq!(merged["required"], json!(true));
    }

    #[test]
    fn test_normalize_modes() {
        let compilers = CompilerSet::new();
        let shallow = CompilerOptions::default();
        let ctx = CompileContext::new(&compilers, &shallow);
        let raw = json!({"type": "integer"});
        assert!(matches!(ctx.normalize(&raw), Ok(Cow::Borrowed(_))));
        assert!(matches!(ctx.normalize(&json!("integer")), Ok(Cow::Owned(_))));
        assert!(ctx.normalize(&json!(3)).is_err());

        let deep = CompilerOptions {
            copy_mode: CopyMode::Deep,
            ..CompilerOptions::default()
        };
        let ctx = CompileContext::new(&compilers, &deep);
        assert!(matches!(ctx.normalize(&raw), Ok(Cow::Owned(_))));
    }

    #[test]
    fn test_definition_path_uses_prefix() {
        let compilers = CompilerSet::new();
        let options = CompilerOptions {
            definition_path_prefix: "#/defs/".to_string(),
            ..CompilerOptions::default()
        };
        let ctx = CompileContext::new(&compilers, &options);
        assert_eq!(ctx.definition_path("node"), "#/defs/node");
    }
}

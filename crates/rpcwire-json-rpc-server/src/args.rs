//! Bound call arguments handed to method handlers

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::JsonRpcErrorObject;

/// Arguments a handler is invoked with, after version-aware binding.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CallArgs {
    /// No parameters (absent, `null`, `[]` or `{}`)
    #[default]
    None,
    /// Positional parameters, spread in order
    Positional(Vec<Value>),
    /// A single mapping of named parameters
    Named(Map<String, Value>),
}

impl CallArgs {
    pub fn is_empty(&self) -> bool {
        match self {
            CallArgs::None => true,
            CallArgs::Positional(values) => values.is_empty(),
            CallArgs::Named(map) => map.is_empty(),
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, CallArgs::Named(_))
    }

    /// Look a parameter up by name when the call used named parameters,
    /// otherwise by position. Lets one method serve both call styles.
    pub fn param(&self, name: &str, index: usize) -> Option<&Value> {
        let value = match self {
            CallArgs::None => None,
            CallArgs::Positional(values) => values.get(index),
            CallArgs::Named(map) => map.get(name),
        };
        value.filter(|v| !v.is_null())
    }

    /// Typed variant of [`CallArgs::param`]; a missing value is `Ok(None)`,
    /// a value of the wrong shape is `InvalidParams`.
    pub fn param_as<T: DeserializeOwned>(
        &self,
        name: &str,
        index: usize,
    ) -> Result<Option<T>, JsonRpcErrorObject> {
        self.param(name, index)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| {
                    JsonRpcErrorObject::invalid_params()
                        .with_data(Value::String(format!("{}: {}", name, e)))
                })
            })
            .transpose()
    }

    /// Like [`CallArgs::param_as`] but the parameter must be present
    pub fn require<T: DeserializeOwned>(
        &self,
        name: &str,
        index: usize,
    ) -> Result<T, JsonRpcErrorObject> {
        self.param_as(name, index)?
            .ok_or_else(JsonRpcErrorObject::invalid_params)
    }

    /// Positional values, empty for named or absent arguments
    pub fn positional(&self) -> &[Value] {
        match self {
            CallArgs::Positional(values) => values,
            _ => &[],
        }
    }

    /// Deserialize a named-parameter mapping into a typed struct
    pub fn named<T: DeserializeOwned>(&self) -> Result<T, JsonRpcErrorObject> {
        match self {
            CallArgs::Named(map) => {
                serde_json::from_value(Value::Object(map.clone())).map_err(|e| {
                    JsonRpcErrorObject::invalid_params().with_data(Value::String(e.to_string()))
                })
            }
            _ => Err(JsonRpcErrorObject::invalid_params_with(
                "Named parameters expected",
            )),
        }
    }
}

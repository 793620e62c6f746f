//! Per-node parameter schemas.
//!
//! The service describes each node's parameters as an open-ended map of
//! `{ type, hint, isRequired, allowedValues }` records. Here the `type` string
//! is resolved once into the closed [`ParamKind`] so renderers can match on it
//! exhaustively.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

/// How a parameter is edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// Free text.
    Text,
    /// A URL.
    Url,
    /// One of a fixed set of values.
    Dropdown {
        /// Options in service order.
        allowed_values: Vec<String>,
    },
    /// Incoming edge binding, managed by the editor.
    EdgeInput,
    /// Outgoing edge binding, managed by the editor.
    EdgeOutput,
    /// Anything else, edited as raw JSON.
    Complex {
        /// The service's type name, e.g. `list` or `query_filter`.
        type_name: String,
    },
}

impl ParamKind {
    /// Resolves a service type name.
    pub fn parse(type_name: &str, allowed_values: Vec<String>) -> Self {
        match type_name {
            "text" => Self::Text,
            "url" => Self::Url,
            "dropdown" => Self::Dropdown { allowed_values },
            "edge_input" => Self::EdgeInput,
            "edge_output" => Self::EdgeOutput,
            other => Self::Complex {
                type_name: other.to_owned(),
            },
        }
    }

    /// Returns the service type name.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Url => "url",
            Self::Dropdown { .. } => "dropdown",
            Self::EdgeInput => "edge_input",
            Self::EdgeOutput => "edge_output",
            Self::Complex { type_name } => type_name,
        }
    }

    /// Edge bindings cannot be edited by hand.
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::EdgeInput | Self::EdgeOutput)
    }
}

/// Description of one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub kind: ParamKind,
    pub hint: Option<String>,
    pub required: bool,
}

impl ParamSpec {
    /// Reads a parameter record; anything unreadable becomes an untyped complex parameter.
    pub fn from_value(value: &Value) -> Self {
        let type_name = value.get("type").and_then(Value::as_str).unwrap_or_default();
        let allowed_values = value
            .get("allowedValues")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(option_label).collect())
            .unwrap_or_default();

        Self {
            kind: ParamKind::parse(type_name, allowed_values),
            hint: value
                .get("hint")
                .and_then(Value::as_str)
                .filter(|hint| !hint.is_empty())
                .map(str::to_owned),
            required: value
                .get("isRequired")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }

    /// Writes the record back in service shape.
    pub fn to_value(&self) -> Value {
        let mut record = Map::new();
        record.insert("type".into(), json!(self.kind.type_name()));
        if let Some(hint) = &self.hint {
            record.insert("hint".into(), json!(hint));
        }
        record.insert("isRequired".into(), json!(self.required));
        if let ParamKind::Dropdown { allowed_values } = &self.kind {
            record.insert("allowedValues".into(), json!(allowed_values));
        }
        Value::Object(record)
    }
}

fn option_label(value: &Value) -> String {
    match value {
        Value::String(label) => label.clone(),
        other => other.to_string(),
    }
}

/// Parameter schema of one node type, as returned by the node details endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSchema {
    /// Parameters in service order.
    pub params: Vec<(String, ParamSpec)>,
    /// Warning reported by the service alongside the schema.
    pub error: Option<String>,
}

impl NodeSchema {
    /// Reads a node details response.
    pub fn from_value(value: &Value) -> Self {
        let params = value
            .get("params")
            .and_then(Value::as_object)
            .map(|params| {
                params
                    .iter()
                    .map(|(name, spec)| (name.clone(), ParamSpec::from_value(spec)))
                    .collect()
            })
            .unwrap_or_default();

        let error = value
            .get("error")
            .and_then(Value::as_str)
            .filter(|error| !error.is_empty())
            .map(str::to_owned);

        Self { params, error }
    }

    /// Writes the schema back in service shape.
    pub fn to_value(&self) -> Value {
        let params: Map<_, _> = self
            .params
            .iter()
            .map(|(name, spec)| (name.clone(), spec.to_value()))
            .collect();

        let mut schema = Map::new();
        schema.insert("params".into(), Value::Object(params));
        if let Some(error) = &self.error {
            schema.insert("error".into(), json!(error));
        }
        Value::Object(schema)
    }

    /// Looks up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params
            .iter()
            .find_map(|(param, spec)| (param == name).then_some(spec))
    }

    /// Returns whether the node takes no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl Serialize for NodeSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NodeSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

/// Turns a parameter name into a form label: `max_retry_count` becomes `Max Retry Count`.
pub fn humanize(name: &str) -> String {
    let mut label = String::with_capacity(name.len());
    let mut word_start = true;

    for c in name.chars() {
        let c = if c == '_' { ' ' } else { c };
        let is_word = c.is_alphanumeric();
        if is_word && word_start {
            label.extend(c.to_uppercase());
        } else {
            label.push(c);
        }
        word_start = !is_word;
    }

    label
}

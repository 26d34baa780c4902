//! Tool response shape and reporting policies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a tool's top-level `success` flag is derived from its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPolicy {
    /// `success` equals the outcome of the single underlying step.
    AllOrNothing,
    /// `success` is true whenever the batch ran to completion; item failures
    /// are visible only through counts and per-item detail.
    BestEffort,
}

/// How much diagnostic detail failure responses carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportDetail {
    /// Failure responses hold `success:false` and a single `error` message.
    #[default]
    Compact,
    /// Failure responses additionally carry structured diagnostics.
    Detailed,
}

impl FromStr for ReportDetail {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(ReportDetail::Compact),
            "detailed" => Ok(ReportDetail::Detailed),
            other => Err(format!("unknown report detail '{other}'; expected 'compact' or 'detailed'")),
        }
    }
}

impl fmt::Display for ReportDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportDetail::Compact => f.write_str("compact"),
            ReportDetail::Detailed => f.write_str("detailed"),
        }
    }
}

/// JSON response returned to the invoking caller:
/// `{ success, ...operation-specific fields, error? }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            fields: Map::new(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            fields: Map::new(),
            error: Some(error.into()),
        }
    }

    /// Attach an operation-specific field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn message(&self) -> Option<&str> {
        self.field("message").and_then(Value::as_str)
    }

    /// Render the response as a JSON object.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 2);
        object.insert("success".to_string(), Value::Bool(self.success));
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        if let Some(error) = &self.error {
            object.insert("error".to_string(), Value::String(error.clone()));
        }
        Value::Object(object)
    }
}

//! Tool descriptions advertised to the model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name, purpose and argument schema of one callable tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the arguments object
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Small JSON Schema builders for tool arguments
///
/// ```
/// use agent_llm::tools::schema;
/// use serde_json::json;
///
/// let schema = schema::object(
///     json!({
///         "symbol": schema::string("Ticker symbol, e.g. AAPL"),
///         "limit": schema::bounded_integer("Maximum articles", 1, 10),
///     }),
///     &["symbol"],
/// );
/// assert_eq!(schema["required"][0], "symbol");
/// ```
pub mod schema {
    use serde_json::{Value, json};

    pub fn object(properties: Value, required: &[&str]) -> Value {
        json!({ "type": "object", "properties": properties, "required": required })
    }

    pub fn string(description: &str) -> Value {
        json!({ "type": "string", "description": description })
    }

    /// Integer with inclusive bounds
    pub fn bounded_integer(description: &str, minimum: i64, maximum: i64) -> Value {
        json!({
            "type": "integer",
            "description": description,
            "minimum": minimum,
            "maximum": maximum,
        })
    }
}

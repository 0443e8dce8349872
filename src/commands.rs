//! The closed set of operations the model may ask for.
//!
//! Tool calls arrive as a function name plus a JSON argument string. They are
//! decoded into [`Command`] before anything touches the order store, and bad
//! arguments fall back to defaults instead of failing the turn.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::constants::DEFAULT_ORDER_TOTAL;
use crate::llm_interaction::ToolCall;
use crate::orders::OrderStore;

pub const PLACE_ORDER: &str = "place_order";
pub const CANCEL_ORDER: &str = "cancel_order";

lazy_static::lazy_static! {
    /// Function declarations sent with every completion request.
    pub static ref TOOL_DECLARATIONS: Value = json!([
        {
            "type": "function",
            "function": {
                "name": PLACE_ORDER,
                "description": "Place a new order with a total amount.",
                "parameters": {
                    "type": "object",
                    "properties": { "total": { "type": "number" } },
                    "required": ["total"]
                }
            }
        },
        {
            "type": "function",
            "function": {
                "name": CANCEL_ORDER,
                "description": "Cancel an order by ID if possible.",
                "parameters": {
                    "type": "object",
                    "properties": { "order_id": { "type": "string" } },
                    "required": ["order_id"]
                }
            }
        }
    ]);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PlaceOrder { total: f64 },
    CancelOrder { order_id: String },
    Unknown { name: String },
}

// Lenient argument shapes: a field of the wrong type decodes as None.
#[derive(Deserialize, Default)]
struct PlaceOrderArgs {
    #[serde(default, deserialize_with = "lenient")]
    total: Option<f64>,
}

#[derive(Deserialize, Default)]
struct CancelOrderArgs {
    #[serde(default, deserialize_with = "lenient")]
    order_id: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn parse_args<T: serde::de::DeserializeOwned + Default>(name: &str, raw: &str) -> T {
    let raw = if raw.trim().is_empty() { "{}" } else { raw };
    match serde_json::from_str(raw) {
        Ok(args) => args,
        Err(e) => {
            warn!(tool = name, arguments = raw, error = %e, "Malformed tool arguments, using defaults");
            T::default()
        }
    }
}

impl Command {
    pub fn from_tool_call(call: &ToolCall) -> Self {
        match call.name.as_str() {
            PLACE_ORDER => {
                let args: PlaceOrderArgs = parse_args(&call.name, &call.arguments);
                let total = match args.total {
                    Some(total) if total.is_finite() && total >= 0.0 => total,
                    other => {
                        if other.is_some() {
                            warn!(?other, "Rejected order total, using default");
                        }
                        DEFAULT_ORDER_TOTAL
                    }
                };
                Command::PlaceOrder { total }
            }
            CANCEL_ORDER => {
                let args: CancelOrderArgs = parse_args(&call.name, &call.arguments);
                Command::CancelOrder { order_id: args.order_id.unwrap_or_default() }
            }
            other => Command::Unknown { name: other.to_string() },
        }
    }

    /// Runs the command and returns the sentence shown to the user.
    pub fn execute(&self, store: &mut OrderStore) -> String {
        match self {
            Command::PlaceOrder { total } => {
                let order_id = store.place(*total);
                format!("✅ Order {} placed with total ${:.2}.", order_id, total)
            }
            Command::CancelOrder { order_id } => store.cancel(order_id).to_string(),
            Command::Unknown { name } => {
                warn!(tool = %name, "Model requested an unknown tool");
                "Unknown tool.".to_string()
            }
        }
    }
}

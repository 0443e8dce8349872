// Defaults, overridable from the environment (or a .env file loaded in main).

use std::env;

lazy_static::lazy_static! {
    pub static ref OPENAI_BASE_URL: String = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
    pub static ref ORDER_DESK_MODEL: String = env::var("ORDER_DESK_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
    pub static ref SYSTEM_PROMPT: String = env::var("ORDER_DESK_SYSTEM_PROMPT").unwrap_or_else(|_| "You are a customer support assistant. You can place or cancel orders.".to_string());
}

pub const GREETING: &str = "Hello! How can I help you today?";

/// Assistant turn used when the model answers with neither text nor tool calls.
pub const FALLBACK_REPLY: &str = "I'm not sure how to respond.";

/// Used when the model calls `place_order` without a usable `total`.
pub const DEFAULT_ORDER_TOTAL: f64 = 10.0;

/// Identifiers are `ORD-<n>` with n counting up from here.
pub const FIRST_ORDER_NUMBER: usize = 1001;

pub const DEFAULT_PORT: u16 = 9900;

/// When set (to anything), `.env` files are not loaded at startup.
pub const NO_DOTENV_VAR: &str = "ORDER_DESK_NO_DOTENV";

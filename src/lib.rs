pub mod chat;
pub mod commands;
pub mod config;
pub mod constants;
pub mod llm_interaction;
pub mod orders;
pub mod session;
pub mod terminal;
pub mod web_server;

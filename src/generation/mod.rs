pub mod client;
pub mod client_error;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;

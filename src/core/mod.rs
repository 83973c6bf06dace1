pub mod chat;
pub mod chat_stream;
pub mod config;
pub mod deploy;
pub mod history;
pub mod message;
pub mod server_url;

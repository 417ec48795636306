pub mod app;
pub mod assembly;
pub mod attachments;
pub mod commands;
pub mod config;
pub mod content;
pub mod emit;
pub mod extract;
pub mod history;
pub mod llm;
pub mod message;
pub mod mime;
pub mod normalize;
pub mod paths;
pub mod session;
pub mod transcribe;
pub mod util;

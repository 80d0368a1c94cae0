//! BlogScout MCP Server
//!
//! Model Context Protocol server exposing natural-language and raw blog
//! search to AI assistants over stdio.

pub mod protocol;
mod server;
pub mod tools;

pub use server::{start_server, McpServer};

//! Knox MCP client: an MCP stdio server with a single `knox_client` HTTP tool.
//!
//! The binary wires [`server::KnoxServer`] to rmcp's stdio transport; the library is split out
//! so the tool surface and HTTP executor can be exercised directly in tests.

pub mod cli;
pub mod error;
pub mod http;
pub mod logging;
pub mod safety;
pub mod server;
pub mod tool;

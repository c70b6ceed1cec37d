//! Test helpers shared by the Knox MCP client integration tests.

mod stdio;
mod upstream;

pub use stdio::StdioMcpSession;
pub use upstream::{ObservedRequest, StubUpstream};

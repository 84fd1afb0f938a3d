mod dispatch;
mod server;
mod tools;

pub use dispatch::{call_tool, error_envelope, ToolError};
pub use server::{dispatch_jsonrpc, serve_stdio};
pub use tools::tool_definitions;

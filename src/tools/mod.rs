/// MCP tools for baseball statistics
/// 
/// This module contains the tool catalog that clients discover and the invoker
/// that turns a named call into a `ToolOutcome`.

pub mod args;
pub mod invoker;
pub mod registry;

// Re-export tool types for easy access
pub use args::*;
pub use invoker::{ToolInvoker, ToolTimeouts, CACHE_CLEARED_MESSAGE};
pub use registry::{ToolDescriptor, ToolKind, ToolRegistry, ToolSummary};

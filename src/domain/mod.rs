/// Domain module containing the values that flow between the tool layer and the transports
/// 
/// A tool call always ends in a `ToolOutcome`: either a payload to send back to the
/// client or a coded failure. Transports never inspect payloads beyond this enum.

pub mod outcome;

// Re-export public types for easy access
pub use outcome::*;

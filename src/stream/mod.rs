/// Chunked response encoding
///
/// Responses on the Streamable HTTP transport are produced as a lazy sequence of
/// byte fragments that concatenate to one JSON-RPC response object.

pub mod encoder;

pub use encoder::{encode, encode_result, ResponseFragments, MAX_FRAGMENT_LEN};

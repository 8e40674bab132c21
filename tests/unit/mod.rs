/// Unit tests for the tool invoker, the chunked encoder and the JSON-RPC envelope
#[path = "../support/mod.rs"]
mod support;

mod encoder_tests;
mod envelope_tests;
mod invoker_tests;

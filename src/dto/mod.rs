/// Inbound request parsing and validation.
pub mod request;
/// Outbound response shape.
pub mod response;

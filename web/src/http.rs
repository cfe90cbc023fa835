pub const LINE_DELIMITER: &str = "\r\n";

pub mod codec;
pub mod frames;
mod response;

pub use response::{Document, IntoResponse, Response};

/// An actionable request line. Only `GET` is ever produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: http::Method,
    pub path: String,
}

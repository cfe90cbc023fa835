use std::fmt::Write;

use http::{header::CONTENT_LENGTH, Method};

use crate::{error::ResponseError, http::LINE_DELIMITER};

use super::{Request, Response};

/// Parses one transport line as a request line.
///
/// request line = "GET /path HTTP/VERSION". Lines that do not start with a
/// `GET` token (headers, blank lines, other methods, leading whitespace)
/// yield `None`.
pub fn request_line(mut line: &str) -> Option<Request> {
    if !line.starts_with(Method::GET.as_str()) {
        return None;
    }

    let method = split_to_whitespace(&mut line);
    if method != Method::GET.as_str() {
        return None;
    }

    let path = split_to_whitespace(&mut line).trim();
    let path = path.strip_prefix('/').unwrap_or(path);

    Some(Request {
        method: Method::GET,
        path: path.to_string(),
    })
}

#[inline]
fn split_to_whitespace<'a>(buf: &mut &'a str) -> &'a str {
    let trimmed = buf.trim_start();
    match trimmed.find(char::is_whitespace) {
        Some(pos) => {
            let part = &trimmed[..pos];
            *buf = &trimmed[pos..];
            part
        }
        None => {
            *buf = "";
            trimmed
        }
    }
}

/// Serializes a response as status line, headers, blank line and body.
pub fn encode(response: &Response) -> Result<String, ResponseError> {
    let body = response.body();
    let mut dst = String::with_capacity(128 + body.len());

    write!(dst, "{:?} {}{LINE_DELIMITER}", response.version(), response.status())?;

    for (key, value) in response.headers() {
        let value = value.to_str()?;
        write!(dst, "{}: {}{LINE_DELIMITER}", key, value)?;
    }

    if response.headers().get(CONTENT_LENGTH).is_none() {
        write!(dst, "{}: {}{LINE_DELIMITER}", CONTENT_LENGTH, body.len())?;
    }

    dst.push_str(LINE_DELIMITER);
    dst.push_str(body);

    Ok(dst)
}

use http::{
    header::{CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, DATE},
    HeaderValue, StatusCode,
};
use mime::Mime;
use time::{macros::format_description, OffsetDateTime};

pub type Response = http::Response<String>;

/// IMF-fixdate, e.g. `Thu, 01 Jan 1970 00:00:00 GMT`.
const HTTP_DATE: &[time::format_description::FormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

pub trait IntoResponse {
    fn into_response(self) -> Response;
}

/// A fully rendered body together with its media type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub status: StatusCode,
    pub content_type: Mime,
    pub body: String,
}

impl Document {
    pub fn html(body: String) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: mime::TEXT_HTML_UTF_8,
            body,
        }
    }

    pub fn css(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: mime::TEXT_CSS,
            body: body.into(),
        }
    }
}

impl IntoResponse for Document {
    /// Headers are inserted in the order they are written on the wire.
    fn into_response(self) -> Response {
        let body_len = self.body.len();
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        if let Ok(date) = OffsetDateTime::now_utc().format(HTTP_DATE) {
            if let Ok(date) = HeaderValue::from_str(&date) {
                headers.insert(DATE, date);
            }
        }
        headers.insert(CONTENT_LENGTH, body_len.into());
        if let Ok(content_type) = HeaderValue::from_str(self.content_type.as_ref()) {
            headers.insert(CONTENT_TYPE, content_type);
        }
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        response
    }
}

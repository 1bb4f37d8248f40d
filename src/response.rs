use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

const INDENT: &[u8] = b"    ";

/// JSON body indented by four spaces. Non-ASCII text is written as-is.
pub struct PrettyJson<T>(pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        let mut buf = Vec::with_capacity(256);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
        if let Err(err) = self.0.serialize(&mut ser) {
            tracing::error!(error = %err, "failed to serialize response");
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
        buf.push(b'\n');
        ([(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))], buf).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    #[tokio::test]
    async fn renders_indented_unescaped_json() {
        let resp = PrettyJson(json!({ "name": "Тарковский" })).into_response();
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(std::str::from_utf8(&body).unwrap(), "{\n    \"name\": \"Тарковский\"\n}\n");
    }
}

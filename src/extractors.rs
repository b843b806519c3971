use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

/// JSON body extractor whose rejections use the service's error body shape
/// instead of axum's plain-text messages.
///
/// A request without a Content-Type header is still parsed as JSON.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get(header::CONTENT_TYPE) {
            let content_type_str = content_type
                .to_str()
                .map_err(|_| ApiJsonRejection::InvalidContentType)?;

            // drop parameters such as charset
            let media_type = content_type_str
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .to_lowercase();

            if media_type != "application/json" {
                return Err(ApiJsonRejection::InvalidContentType);
            }
        }

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiJsonRejection::JsonRejection(rejection)),
        }
    }
}

#[derive(Debug)]
pub enum ApiJsonRejection {
    InvalidContentType,
    JsonRejection(JsonRejection),
}

impl IntoResponse for ApiJsonRejection {
    fn into_response(self) -> Response {
        let message = match self {
            ApiJsonRejection::InvalidContentType => {
                "Content-Type must be application/json".to_string()
            }
            ApiJsonRejection::JsonRejection(rejection) => {
                format!("Invalid JSON: {}", rejection.body_text())
            }
        };
        (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Router};
    use axum_test::TestServer;
    use serde_json::Value;

    fn app() -> Router {
        Router::new().route(
            "/echo",
            post(|ApiJson(body): ApiJson<Value>| async move { Json(body) }),
        )
    }

    #[tokio::test]
    async fn test_accepts_json() {
        let server = TestServer::new(app()).unwrap();

        let response = server.post("/echo").json(&json!({"name": "Jane"})).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>()["name"], "Jane");
    }

    #[tokio::test]
    async fn test_rejects_other_content_types() {
        let server = TestServer::new(app()).unwrap();

        let response = server
            .post("/echo")
            .text("name=Jane")
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["message"]
            .as_str()
            .unwrap()
            .contains("Content-Type"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let server = TestServer::new(app()).unwrap();

        let response = server
            .post("/echo")
            .bytes("{\"name\": ".into())
            .content_type("application/json")
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON"));
    }
}

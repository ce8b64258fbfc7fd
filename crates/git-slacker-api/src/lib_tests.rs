//! Tests for the router, controllers and response rendering.

use super::*;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request as HttpRequest;
use git_slacker_core::{ChatPlatform, ChatTransport, DeliveryError, SecretValue, Secrets};
use mockall::mock;
use tower::ServiceExt;

mock! {
    pub Transport {}

    #[async_trait]
    impl ChatTransport for Transport {
        async fn send_message(
            &self,
            platform: ChatPlatform,
            recipient: &str,
            message: &str,
        ) -> Result<(), DeliveryError>;
    }
}

const SLACK_TOKEN: &str = "slackverification";

async fn test_state(config: ServiceConfig) -> AppState {
    let secrets = Secrets {
        slack_webhook_token: SecretValue::from(SLACK_TOKEN),
        telegram_webhook_token: SecretValue::from("telegramtoken"),
        ..Default::default()
    };
    build_state(config, &secrets, Arc::new(MockTransport::new())).await
}

async fn test_router() -> Router {
    create_router(test_state(ServiceConfig::default()).await)
}

fn post_json(uri: &str, body: &str) -> HttpRequest<Body> {
    HttpRequest::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_status_and_listeners() {
        let app = test_router().await;

        let response = app
            .oneshot(HttpRequest::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["listeners"]["WebHook/Received"], json!(["WebHook/Log"]));
    }

    #[tokio::test]
    async fn test_responses_carry_nosniff() {
        let app = test_router().await;

        let response = app
            .oneshot(HttpRequest::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
    }
}

mod correlation_tests {
    use super::*;

    #[tokio::test]
    async fn test_generated_correlation_id_is_echoed() {
        let app = test_router().await;

        let response = app
            .oneshot(HttpRequest::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let header = response.headers().get(CORRELATION_HEADER).unwrap();
        assert!(header.to_str().unwrap().parse::<CorrelationId>().is_ok());
    }

    #[tokio::test]
    async fn test_incoming_correlation_id_is_reused_in_error_body() {
        let app = test_router().await;
        let id = CorrelationId::new();
        let request = HttpRequest::post("/webhook/gitlab")
            .header(CORRELATION_HEADER, id.as_str())
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get(CORRELATION_HEADER).unwrap(),
            id.as_str().as_str()
        );
        let body = json_body(response).await;
        assert_eq!(body["error"]["id"], id.as_str());
    }
}

mod routing_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_provider_is_not_found() {
        let app = test_router().await;

        let response = app.oneshot(post_json("/webhook/gitlab", "{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store,no-cache"
        );
        let body = json_body(response).await;
        assert_eq!(body["status"], false);
        assert_eq!(body["error"]["code"], 404);
        assert_eq!(body["error"]["message"], "Unknown service provider");
        assert!(body["error"].get("detail").is_none());
    }

    #[tokio::test]
    async fn test_commands_endpoint_rejects_telegram() {
        let app = test_router().await;

        let response = app
            .oneshot(post_json("/bot/telegram/commands", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Unknown service provider");
    }

    #[tokio::test]
    async fn test_malformed_provider_segment_is_route_not_found() {
        let app = test_router().await;

        let response = app.oneshot(post_json("/webhook/GitHub", "{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Whoopsies! Route not found!");
    }

    #[tokio::test]
    async fn test_malformed_secure_token_is_route_not_found() {
        let app = test_router().await;

        let response = app
            .oneshot(post_json("/bot/telegram/events/bad-token", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Whoopsies! Route not found!");
    }

    #[tokio::test]
    async fn test_unknown_route_falls_back_to_not_found() {
        let app = test_router().await;

        let response = app
            .oneshot(HttpRequest::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::X_CONTENT_TYPE_OPTIONS).is_some());
        let body = json_body(response).await;
        assert_eq!(body["status"], false);
        assert_eq!(body["error"]["code"], 404);
        assert_eq!(body["error"]["message"], "Whoopsies! Route not found!");
    }

    #[tokio::test]
    async fn test_wrong_method_is_bad_request() {
        let app = test_router().await;

        let response = app
            .oneshot(
                HttpRequest::get("/webhook/github")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(
            body["error"]["message"],
            "Whoopsies! Method not allowed for this route!"
        );
    }

    #[tokio::test]
    async fn test_options_is_no_content() {
        let app = test_router().await;

        let response = app
            .oneshot(
                HttpRequest::options("/webhook/github")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}

mod body_tests {
    use super::*;

    #[test]
    fn test_empty_body_is_empty_payload() {
        assert!(parse_body(&HeaderMap::new(), b"").unwrap().is_empty());
    }

    #[test]
    fn test_form_body_becomes_string_fields() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let payload = parse_body(&headers, b"token=abc&text=hello+world").unwrap();

        assert_eq!(payload["token"], "abc");
        assert_eq!(payload["text"], "hello world");
    }

    #[test]
    fn test_json_array_is_malformed() {
        let result = parse_body(&HeaderMap::new(), b"[1, 2]");

        assert!(matches!(result, Err(ApiError::MalformedBody { .. })));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_invalid_request_format() {
        let app = test_router().await;

        let response = app
            .oneshot(post_json("/bot/slack/events", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Invalid request format");
    }

    #[tokio::test]
    async fn test_form_encoded_slack_command_is_accepted() {
        let app = test_router().await;
        let request = HttpRequest::post("/bot/slack/commands")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(format!("token={SLACK_TOKEN}&command=%2Fdeploy")))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": true}));
    }
}

mod debug_tests {
    use super::*;

    #[tokio::test]
    async fn test_debug_mode_attaches_error_chain() {
        let config = ServiceConfig {
            debug: true,
            ..Default::default()
        };
        let app = create_router(test_state(config).await);

        let response = app
            .oneshot(post_json("/bot/slack/events", r#"{"token": "wrong"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Invalid request signature");
        assert_eq!(body["error"]["detail"], json!(["Invalid request signature"]));
    }
}

mod server_tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_configuration_is_rejected_before_binding() {
        let mut config = ServiceConfig::default();
        config.server.host = String::new();
        let state = test_state(config).await;

        let result = start_server(state).await;

        assert!(matches!(
            result,
            Err(ServiceError::Configuration(ConfigError::Missing { key })) if key == "server.host"
        ));
    }
}

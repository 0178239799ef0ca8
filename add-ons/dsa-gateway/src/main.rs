//! Axum-based API gateway for the Design System Awards survey. Config-driven via CoreConfig.

mod handlers;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use dsa_core::{AnswerStore, CoreConfig, QuestionBank, SurveyPolicy, SurveyService};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Pre-flight check: config, question source, store and port.
fn run_verify() -> Result<(), String> {
    let config = CoreConfig::load().map_err(|e| format!("Config load failed: {}", e))?;

    print!("Checking question bank {}... ", config.questions_path);
    let bank = QuestionBank::load_json_path(&config.questions_path)
        .map_err(|e| format!("question bank unusable: {}", e))?;
    println!("OK ({} categories)", bank.len());

    let store_path = config.store_path();
    print!("Checking answer store {}... ", store_path.display());
    let store = AnswerStore::open_path(&store_path)
        .map_err(|e| format!("answer store LOCKED or inaccessible: {}", e))?;
    let (users, sessions) = store.actor_counts();
    drop(store);
    println!("OK ({} users, {} sessions)", users, sessions);

    let port = config.port;
    print!("Checking {}:{}... ", config.bind_address, port);
    match std::net::TcpListener::bind((config.bind_address.as_str(), port)) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => {
            return Err(format!("Port {} BLOCKED: {}", port, e));
        }
    }

    println!("\nAll checks passed. Ready to start gateway.");
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[dsa-gateway] .env not loaded: {} (using system environment)", e);
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(target: "dsa::gateway", error = %e, "gateway stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BoxError> {
    let config = Arc::new(CoreConfig::load()?);

    // No degraded mode: without a question bank there is nothing to serve.
    let bank = Arc::new(QuestionBank::load_json_path(&config.questions_path)?);
    let store = Arc::new(AnswerStore::open_path(config.store_path())?);
    store.mirror_questions(&bank)?;
    let policy = Arc::new(SurveyPolicy::from_config(&config));
    let survey = Arc::new(SurveyService::new(bank, store, policy));

    let app = build_app(AppState {
        config: Arc::clone(&config),
        survey,
    });

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("{} running on http://{}", config.app_name, addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Resolves the OpenAPI document: configured path first, then the copy at the workspace root.
fn openapi_file(config: &CoreConfig) -> PathBuf {
    let configured = PathBuf::from(&config.openapi_path);
    if configured.exists() {
        return configured;
    }

    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("openapi.yaml")
}

fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let openapi = openapi_file(&state.config);

    Router::new()
        .route("/session", post(handlers::create_session))
        .route("/categories", get(handlers::categories))
        .route("/questions/:category", get(handlers::questions))
        .route("/answers", post(handlers::post_answer))
        .route("/answers/:id/:category", get(handlers::get_answers))
        .route("/generate", post(handlers::generate))
        .route("/general-questions", get(handlers::general_questions))
        .route("/needs-general/:category", get(handlers::needs_general))
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/status", get(handlers::status))
        .route_service("/openapi.yaml", ServeFile::new(openapi))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    pub(crate) survey: Arc<SurveyService>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const QUESTIONS: &str = r#"{
        "best-documentation": ["Who maintains the docs?", "How are docs versioned?"],
        "best-design-token-system": ["How many tokens do you ship?"],
        "best-adoption": ["How many teams use the system?"]
    }"#;

    const ORG_QUESTION: &str = "What’s the name of your organization?";

    fn test_app() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig {
            storage_path: dir.path().display().to_string(),
            ..CoreConfig::default()
        };
        let bank = Arc::new(QuestionBank::from_json_str(QUESTIONS).unwrap());
        let store = Arc::new(AnswerStore::open_path(config.store_path()).unwrap());
        let policy = Arc::new(SurveyPolicy::from_config(&config));
        let app = build_app(AppState {
            config: Arc::new(config),
            survey: Arc::new(SurveyService::new(bank, store, policy)),
        });
        (dir, app)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&b).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, body).await;
        assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&bytes));
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_categories_and_questions_preserve_order() {
        let (_dir, app) = test_app();
        let (_, json) = send_json(&app, "GET", "/categories", None).await;
        assert_eq!(
            json,
            json!(["best-documentation", "best-design-token-system", "best-adoption"])
        );

        let (_, json) = send_json(&app, "GET", "/questions/best-documentation", None).await;
        assert_eq!(json["category"], "best-documentation");
        assert_eq!(
            json["questions"],
            json!(["Who maintains the docs?", "How are docs versioned?"])
        );
    }

    #[tokio::test]
    async fn test_unknown_category_questions_404() {
        let (_dir, app) = test_app();
        let (status, body) = send(&app, "GET", "/questions/unknown-category", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(String::from_utf8(body).unwrap(), "Category not found");
    }

    #[tokio::test]
    async fn test_general_answer_visible_for_every_category() {
        let (_dir, app) = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/answers",
            Some(json!({ "userId": "A", "question": ORG_QUESTION, "answer": "Acme", "isGeneral": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());

        for category in ["best-documentation", "best-adoption", "not-a-category"] {
            let (_, json) = send_json(&app, "GET", &format!("/answers/A/{}", category), None).await;
            assert_eq!(json["category"], category);
            assert_eq!(json["general"][ORG_QUESTION], "Acme");
            assert_eq!(json["answers"], json!({}));
        }
    }

    #[tokio::test]
    async fn test_category_answer_scoped_to_category() {
        let (_dir, app) = test_app();
        let (status, _) = send(
            &app,
            "POST",
            "/answers",
            Some(json!({
                "userId": "A",
                "category": "best-documentation",
                "question": "Who maintains the docs?",
                "answer": "A docs guild",
                "isGeneral": false
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, json) = send_json(&app, "GET", "/answers/A/best-documentation", None).await;
        assert_eq!(json["answers"]["Who maintains the docs?"], "A docs guild");
        let (_, json) = send_json(&app, "GET", "/answers/A/best-adoption", None).await;
        assert_eq!(json["answers"], json!({}));
    }

    #[tokio::test]
    async fn test_unknown_actor_reads_empty() {
        let (_dir, app) = test_app();
        let (_, json) = send_json(&app, "GET", "/answers/nobody/best-documentation", None).await;
        assert_eq!(json, json!({ "category": "best-documentation", "general": {}, "answers": {} }));
    }

    #[tokio::test]
    async fn test_generate_requires_answers() {
        let (_dir, app) = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/generate",
            Some(json!({ "userId": "A", "category": "best-documentation" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(String::from_utf8(body).unwrap(), "No answers found for that category.");
    }

    #[tokio::test]
    async fn test_generate_unknown_category_404() {
        let (_dir, app) = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/generate",
            Some(json!({ "userId": "A", "category": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(String::from_utf8(body).unwrap(), "Category not found");
    }

    #[tokio::test]
    async fn test_generate_includes_general_answers_in_recorded_order() {
        let (_dir, app) = test_app();
        let submissions = [
            json!({ "userId": "A", "question": ORG_QUESTION, "answer": "Acme", "isGeneral": true }),
            json!({ "userId": "A", "category": "best-documentation", "question": "How are docs versioned?", "answer": "Per release" }),
            json!({ "userId": "A", "category": "best-documentation", "question": "Who maintains the docs?", "answer": "A docs guild" }),
        ];
        for body in submissions {
            let (status, _) = send(&app, "POST", "/answers", Some(body)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, json) = send_json(
            &app,
            "POST",
            "/generate",
            Some(json!({ "userId": "A", "category": "best-documentation" })),
        )
        .await;
        assert_eq!(json["general"], json!({ ORG_QUESTION: "Acme" }));
        let order: Vec<&str> = json["answers"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(order, vec!["How are docs versioned?", "Who maintains the docs?"]);
        assert_eq!(
            json["questions"],
            json!(["Who maintains the docs?", "How are docs versioned?"])
        );
    }

    #[tokio::test]
    async fn test_generate_with_session_returns_payload() {
        let (_dir, app) = test_app();
        let (_, json) = send_json(&app, "POST", "/session", None).await;
        let session_id = json["sessionId"].as_str().unwrap().to_string();

        for (question, answer) in [
            ("How many tokens do you ship?", "about 400"),
            ("How many tokens do you ship?", "about 450"),
        ] {
            let (status, _) = send(
                &app,
                "POST",
                "/answers",
                Some(json!({
                    "sessionId": session_id,
                    "category": "best-design-token-system",
                    "question": question,
                    "answer": answer
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, json) = send_json(
            &app,
            "POST",
            "/generate",
            Some(json!({ "sessionId": session_id, "category": "best-design-token-system" })),
        )
        .await;
        assert_eq!(json["id"], session_id.as_str());
        assert_eq!(json["category"], "best-design-token-system");
        assert_eq!(json["questions"], json!(["How many tokens do you ship?"]));
        assert_eq!(json["answers"], json!({ "How many tokens do you ship?": "about 450" }));
        assert_eq!(json["general"], json!({}));

        let (_, json) = send_json(
            &app,
            "GET",
            &format!("/answers/{}/best-design-token-system", session_id),
            None,
        )
        .await;
        assert_eq!(json["answers"]["How many tokens do you ship?"], "about 450");
    }

    #[tokio::test]
    async fn test_sessions_are_distinct() {
        let (_dir, app) = test_app();
        let (_, a) = send_json(&app, "POST", "/session", None).await;
        let (_, b) = send_json(&app, "POST", "/session", None).await;
        assert!(a["sessionId"].is_string());
        assert_ne!(a["sessionId"], b["sessionId"]);

        let (_, status) = send_json(&app, "GET", "/api/v1/status", None).await;
        assert_eq!(status["sessions"], 2);
        assert_eq!(status["appName"], "DSA API");
        assert_eq!(status["categories"], 3);
    }

    #[tokio::test]
    async fn test_answers_validation_rejects_typos_and_missing_ids() {
        let (_dir, app) = test_app();
        for body in [
            json!({ "userId": "A", "category": "best-docs", "question": "Who maintains the docs?", "answer": "x" }),
            json!({ "userId": "A", "category": "best-documentation", "question": "Who maintains docs?", "answer": "x" }),
            json!({ "userId": "A", "question": "Org?", "answer": "x", "isGeneral": true }),
            json!({ "category": "best-documentation", "question": "Who maintains the docs?", "answer": "x" }),
            json!({ "userId": "A", "sessionId": "S", "category": "best-documentation", "question": "Who maintains the docs?", "answer": "x" }),
            json!({ "userId": "A", "category": "best-documentation", "answer": "x" }),
            json!({ "userId": "A", "category": "best-documentation", "question": "Who maintains the docs?" }),
        ] {
            let (status, _) = send(&app, "POST", "/answers", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        let (status, body) = send(
            &app,
            "POST",
            "/answers",
            Some(json!({ "userId": "A", "category": "best-documentation", "answer": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8(body).unwrap().contains("question"));

        let (status, _) = send(&app, "POST", "/generate", Some(json!({ "userId": "A" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (_, json) = send_json(&app, "GET", "/answers/A/best-documentation", None).await;
        assert_eq!(json["answers"], json!({}));
        assert_eq!(json["general"], json!({}));
    }

    #[tokio::test]
    async fn test_general_questions_and_needs_general() {
        let (_dir, app) = test_app();
        let (_, json) = send_json(&app, "GET", "/general-questions", None).await;
        assert_eq!(json["questions"].as_array().unwrap().len(), 4);
        assert_eq!(json["questions"][0], ORG_QUESTION);

        let (_, json) = send_json(&app, "GET", "/needs-general/best-documentation", None).await;
        assert_eq!(json, json!({ "category": "best-documentation", "needsGeneral": true }));
        let (_, json) = send_json(&app, "GET", "/needs-general/best-design-token-system", None).await;
        assert_eq!(json["needsGeneral"], false);
    }

    #[tokio::test]
    async fn test_openapi_served() {
        let (_dir, app) = test_app();
        let (status, body) = send(&app, "GET", "/openapi.yaml", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().starts_with("openapi:"));
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, app) = test_app();
        let (_, json) = send_json(&app, "GET", "/api/v1/health", None).await;
        assert_eq!(json["status"], "ok");
    }
}

//! The HTTP API end to end over a real socket, with a scripted model.

use async_trait::async_trait;
use deck_gemini::{GatewayError, GenerationRequest, TextGenerator};
use deck_pptx::{PptxReader, PPTX_CONTENT_TYPE};
use deck_server::{router, AppState};
use deck_store::FileStore;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

const PYTHON_DECK: &str = "Here is your deck.

Slide 1: Basics
- Python is readable

Slide 2: Loops
- for loops iterate over sequences

Slide 3: Functions
- def defines a function
";

/// What the fake model answers.
#[derive(Clone)]
enum Reply {
    Text(&'static str),
    Timeout,
    Upstream(u16),
}

struct FakeGenerator {
    reply: Reply,
    requests: Mutex<Vec<GenerationRequest>>,
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::Timeout => Err(GatewayError::Timeout(Duration::from_secs(30))),
            Reply::Upstream(status) => Err(GatewayError::Upstream {
                status: *status,
                body: "internal upstream detail".into(),
            }),
        }
    }
}

struct TestApp {
    base: String,
    http: reqwest::Client,
    generator: Arc<FakeGenerator>,
    dir: TempDir,
}

impl TestApp {
    async fn spawn(reply: Reply) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let generator = Arc::new(FakeGenerator {
            reply,
            requests: Mutex::new(Vec::new()),
        });
        let state = AppState::new(Arc::new(store), generator.clone(), Default::default());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            http: reqwest::Client::new(),
            generator,
            dir,
        }
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .http
            .post(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.http
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .unwrap()
    }

    async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let response = self.get(path).await;
        let status = response.status();
        (status, response.json().await.unwrap())
    }
}

#[tokio::test]
async fn generate_stores_deck_and_downloads_as_pptx() {
    let app = TestApp::spawn(Reply::Text(PYTHON_DECK)).await;

    let (status, body) = app
        .post("/generate-ppt", json!({ "topic": "Python", "slidesCount": 3 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let slides = body["slides"].as_array().unwrap();
    let titles: Vec<&str> = slides.iter().map(|s| s["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["Basics", "Loops", "Functions"]);
    for slide in slides {
        assert_eq!(slide["content"].as_array().unwrap().len(), 1);
        assert!(slide["image"].is_null());
    }

    // The coding template asks for fenced code in the topic's language.
    let requests = app.generator.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("exactly 3 slides"));
    assert!(requests[0].prompt.contains("```python"));
    assert!(requests[0].system_instruction.is_some());

    assert!(app.dir.path().join("Python.json").is_file());

    let response = app.get("/download-ppt/Python").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], PPTX_CONTENT_TYPE);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"Python.pptx\""
    );
    let bytes = response.bytes().await.unwrap();

    let read = PptxReader::new().read(Cursor::new(bytes.to_vec())).unwrap();
    assert_eq!(read.len(), 3);
    assert_eq!(read[0].title(), Some("Basics"));
    assert_eq!(read[1].texts[1], "🔹 for loops iterate over sequences");
    assert_eq!(read[2].title(), Some("Functions"));
}

#[tokio::test]
async fn generate_accepts_string_counts_and_general_topics() {
    let app = TestApp::spawn(Reply::Text(PYTHON_DECK)).await;

    let (status, _) = app
        .post("/generate-ppt", json!({ "topic": "Ocean tides", "slidesCount": "3" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let requests = app.generator.requests.lock().unwrap().clone();
    assert!(!requests[0].prompt.contains("```"));

    let (status, body) = app.get_json("/check-slides/Ocean%20tides").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "exists": true }));
}

#[tokio::test]
async fn generate_rejects_missing_or_out_of_range_input() {
    let app = TestApp::spawn(Reply::Text(PYTHON_DECK)).await;

    for body in [
        json!({ "topic": "Python" }),
        json!({ "slidesCount": 3 }),
        json!({ "topic": "   ", "slidesCount": 3 }),
        json!({ "topic": "Python", "slidesCount": 0 }),
    ] {
        let (status, reply) = app.post("/generate-ppt", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply["error"], "Missing required fields: topic and slidesCount");
    }

    let (status, _) = app
        .post("/generate-ppt", json!({ "topic": "Python", "slidesCount": 14 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/generate-ppt", json!({ "topic": "///", "slidesCount": 3 }))
        .await;
    assert_eq!(status, StatusCode::OK, "unsafe characters are replaced, not rejected");

    assert!(app.generator.requests.lock().unwrap().len() == 1);
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let app = TestApp::spawn(Reply::Text(PYTHON_DECK)).await;

    let response = app
        .http
        .post(format!("{}/generate-ppt", app.base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unparseable_ai_text_is_reported_and_not_stored() {
    let app = TestApp::spawn(Reply::Text("I cannot help with that.")).await;

    let (status, body) = app
        .post("/generate-ppt", json!({ "topic": "Rust", "slidesCount": 2 }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Unexpected AI response. Please try again.");

    let (_, body) = app.get_json("/check-slides/Rust").await;
    assert_eq!(body["exists"], false);
}

#[tokio::test]
async fn gateway_failures_map_to_gateway_statuses() {
    let app = TestApp::spawn(Reply::Timeout).await;
    let (status, _) = app
        .post("/generate-ppt", json!({ "topic": "Rust", "slidesCount": 2 }))
        .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

    let app = TestApp::spawn(Reply::Upstream(500)).await;
    let (status, body) = app.post("/ai-search", json!({ "query": "tides" })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!body["error"].as_str().unwrap().contains("upstream detail"));
}

#[tokio::test]
async fn update_with_no_slides_is_rejected_and_writes_nothing() {
    let app = TestApp::spawn(Reply::Text(PYTHON_DECK)).await;

    let (status, body) = app
        .post("/update-slides", json!({ "topic": "Empty", "slides": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No slides to save");

    let (status, _) = app.post("/update-slides", json!({ "topic": "Empty" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(!app.dir.path().join("Empty.json").exists());
}

#[tokio::test]
async fn update_normalizes_and_topic_whitespace_collides() {
    let app = TestApp::spawn(Reply::Text(PYTHON_DECK)).await;

    let (status, body) = app
        .post(
            "/update-slides",
            json!({
                "topic": "My Topic",
                "useImages": false,
                "slides": [
                    { "content": ["- kept", "   "], "image": "https://example.com/a.png" },
                    { "title": "Second", "theme": "#112233" }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "message": "Slides updated successfully!" })
    );

    let (status, body) = app.get_json("/get-slides/My%20%20Topic").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["slides"][0],
        json!({
            "title": "Untitled Slide",
            "content": ["- kept"],
            "theme": "#FFFFFF",
            "titleColor": "#000000",
            "contentColor": "#000000",
            "image": null
        })
    );
    assert_eq!(body["slides"][1]["theme"], "#112233");
    assert_eq!(body["slides"][1]["content"], json!([]));
}

#[tokio::test]
async fn missing_decks_are_not_found() {
    let app = TestApp::spawn(Reply::Text(PYTHON_DECK)).await;

    for path in ["/download-ppt/Nothing", "/download-pdf/Nothing", "/get-slides/Nothing"] {
        let (status, body) = app.get_json(path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(body["error"], "No slides found for this topic");
    }

    let (status, body) = app.get_json("/check-slides/Nothing").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], false);
}

#[tokio::test]
async fn downloads_pdf() {
    let app = TestApp::spawn(Reply::Text(PYTHON_DECK)).await;
    app.post(
        "/update-slides",
        json!({ "topic": "Tides", "slides": [{ "title": "Moon", "content": ["- gravity"] }] }),
    )
    .await;

    let response = app.get("/download-pdf/Tides").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"Tides.pdf\""
    );
    assert!(response.bytes().await.unwrap().starts_with(b"%PDF"));
}

#[tokio::test]
async fn missing_image_fails_pptx_render() {
    let app = TestApp::spawn(Reply::Text(PYTHON_DECK)).await;
    app.post(
        "/update-slides",
        json!({
            "topic": "Pictures",
            "useImages": true,
            "slides": [{ "title": "Cat", "image": "cat.png" }]
        }),
    )
    .await;

    let (status, body) = app.get_json("/download-ppt/Pictures").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate PowerPoint file.");
}

#[tokio::test]
async fn named_colour_theme_renders_without_assets() {
    let app = TestApp::spawn(Reply::Text(PYTHON_DECK)).await;
    app.post(
        "/update-slides",
        json!({
            "topic": "Colours",
            "slides": [{ "title": "Sky", "theme": "lightblue", "content": ["- blue"] }]
        }),
    )
    .await;

    let response = app.get("/download-ppt/Colours").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.bytes().await.unwrap();
    let slides = PptxReader::new().read(Cursor::new(bytes.to_vec())).unwrap();
    assert_eq!(slides.len(), 1);
    assert_eq!(slides[0].pictures, 0);
}

#[tokio::test]
async fn ai_search_echoes_query() {
    let app = TestApp::spawn(Reply::Text("Tides are caused by the moon.")).await;

    let (status, body) = app.post("/ai-search", json!({ "query": "tides" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "query": "tides", "response": "Tides are caused by the moon." })
    );

    let (status, body) = app.post("/ai-search", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query is required");
}

#[tokio::test]
async fn empty_ai_search_answer_has_placeholder() {
    let app = TestApp::spawn(Reply::Text("")).await;

    let (_, body) = app.post("/ai-search", json!({ "query": "tides" })).await;
    assert_eq!(body["response"], "No relevant information found.");
}

#[tokio::test]
async fn assistant_endpoints_answer() {
    let app = TestApp::spawn(Reply::Text("  Bonjour  ")).await;

    let (status, body) = app
        .post("/translate", json!({ "text": "Hello", "targetLanguage": "French" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["translation"], "Bonjour");

    let (status, body) = app.post("/medical-chat", json!({ "message": "headache" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reply"].is_string());

    let (status, body) = app.post("/solve-math", json!({ "problem": "1+1" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["solution"].is_string());

    let (status, _) = app.post("/translate", json!({ "text": "Hello" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let requests = app.generator.requests.lock().unwrap().clone();
    assert!(requests[0].prompt.contains("French"));
    assert!(requests.iter().all(|r| r.system_instruction.is_some()));
}

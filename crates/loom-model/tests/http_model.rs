//! `HttpModel` against a scripted local chat-completions server.

use std::io::Read;
use std::sync::{Arc, Mutex};

use loom_config::ModelConfig;
use loom_model::{GenerativeModel, HttpModel, ModelError, ModelRequest, Tool};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

struct ScriptedServer {
    base_url: String,
    bodies: Arc<Mutex<Vec<Value>>>,
}

/// Serve `replies` in order, one per request, recording request bodies.
fn serve(replies: Vec<(u16, Value)>) -> ScriptedServer {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&bodies);

    std::thread::spawn(move || {
        for (status, reply) in replies {
            let Ok(mut request) = server.recv() else { return };
            assert_eq!(request.url(), "/v1/chat/completions");
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body).unwrap();
            seen.lock().unwrap().push(serde_json::from_str(&body).unwrap());

            let response = tiny_http::Response::from_string(reply.to_string())
                .with_status_code(status)
                .with_header(
                    tiny_http::Header::from_bytes("Content-Type", "application/json").unwrap(),
                );
            let _ = request.respond(response);
        }
    });

    ScriptedServer {
        base_url: format!("http://127.0.0.1:{port}/v1"),
        bodies,
    }
}

fn model(base_url: &str) -> HttpModel {
    HttpModel::from_config(&ModelConfig {
        base_url: base_url.to_string(),
        api_key: "sk-test".into(),
        diagram_model: "diagram-mini".into(),
        timeout_secs: 5,
        ..ModelConfig::default()
    })
    .unwrap()
}

fn text_reply(text: &str) -> Value {
    json!({"choices": [{"message": {"role": "assistant", "content": text}}]})
}

fn diagram_call() -> Value {
    json!({"choices": [{"message": {
        "role": "assistant",
        "content": null,
        "tool_calls": [{
            "id": "call_1",
            "type": "function",
            "function": {"name": "generate_diagram", "arguments": "{\"description\":\"a first-class lever\"}"}
        }]
    }}]})
}

#[tokio::test]
async fn plain_answer_takes_one_step() {
    let server = serve(vec![(200, text_reply("function LessonComponent() {}"))]);
    let request = ModelRequest::new("write a lesson").with_limits(500, 3);

    let response = model(&server.base_url).generate(&request).await.unwrap();
    assert_eq!(response.text, "function LessonComponent() {}");
    assert_eq!(response.steps, 1);
    assert!(response.tool_results.is_empty());

    let bodies = server.bodies.lock().unwrap();
    assert_eq!(bodies[0]["max_tokens"], 500);
    assert!(bodies[0].get("tools").is_none());
}

#[tokio::test]
async fn diagram_tool_result_is_fed_back() {
    let server = serve(vec![
        (200, diagram_call()),
        (200, text_reply("```mermaid\ngraph TD; Effort-->Fulcrum\n```")),
        (200, text_reply("function LessonComponent() { return null; }")),
    ]);
    let request = ModelRequest::new("write a lesson")
        .with_tools(&[Tool::GenerateDiagram])
        .with_limits(500, 3);

    let response = model(&server.base_url).generate(&request).await.unwrap();
    assert_eq!(response.text, "function LessonComponent() { return null; }");
    assert_eq!(response.steps, 2);
    assert_eq!(response.tool_results.len(), 1);
    assert_eq!(response.tool_results[0].output, "graph TD; Effort-->Fulcrum");

    let bodies = server.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 3);
    assert_eq!(bodies[0]["tools"][0]["function"]["name"], "generate_diagram");
    assert_eq!(bodies[1]["model"], "diagram-mini");
    let last_messages = bodies[2]["messages"].as_array().unwrap();
    let tool_message = last_messages.last().unwrap();
    assert_eq!(tool_message["role"], "tool");
    assert_eq!(tool_message["tool_call_id"], "call_1");
}

#[tokio::test]
async fn step_budget_without_answer_yields_empty_text() {
    let server = serve(vec![
        (200, diagram_call()),
        (200, text_reply("graph LR; A-->B")),
    ]);
    let request = ModelRequest::new("write a lesson")
        .with_tools(&[Tool::GenerateDiagram])
        .with_limits(500, 1);

    let response = model(&server.base_url).generate(&request).await.unwrap();
    assert_eq!(response.text, "");
    assert_eq!(response.tool_results.len(), 1);
}

#[tokio::test]
async fn api_failures_surface_as_errors() {
    let server = serve(vec![(500, json!({"error": {"message": "boom"}}))]);
    let err = model(&server.base_url)
        .generate(&ModelRequest::new("write a lesson"))
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Api { status: 500, .. }), "{err}");
}

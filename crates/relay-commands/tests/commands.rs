use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use relay_args::FieldValues;
use relay_commands::{
    ChatSurface, CommandContext, Dispatcher, FieldKind, FormRequest, SessionSettings,
};
use relay_core::{RelayError, Result, ValidationError};
use relay_mcp::{HttpResponse, Transport};
use relay_store::{MemoryStore, ServerStore};
use serde_json::{json, Value};

const ENDPOINT: &str = "https://weather.example/mcp";

/// Answers the three MCP methods from canned state and records every request.
struct FakeServer {
    tools: Mutex<Value>,
    call_reply: Mutex<String>,
    offline: bool,
    requests: Mutex<Vec<Value>>,
}

impl std::fmt::Debug for FakeServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeServer").finish()
    }
}

impl FakeServer {
    fn new(tools: Value) -> Self {
        Self {
            tools: Mutex::new(tools),
            call_reply: Mutex::new(sse_result("Sunny in Paris")),
            offline: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new(json!([]))
        }
    }

    fn set_tools(&self, tools: Value) {
        *self.tools.lock().unwrap() = tools;
    }

    fn reply_to_calls(&self, body: String) {
        *self.call_reply.lock().unwrap() = body;
    }

    fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r["method"].as_str().unwrap().to_string())
            .collect()
    }

    fn calls(&self) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|r| r["method"] == "tools/call")
            .map(|r| r["params"].clone())
            .collect()
    }
}

fn sse_result(text: &str) -> String {
    let payload = json!({
        "jsonrpc": "2.0",
        "id": 3,
        "result": {"content": [{"type": "text", "text": text}]}
    });
    format!("event: message\ndata: {}\n\n", payload)
}

fn reply(content_type: &str, body: String) -> HttpResponse {
    HttpResponse {
        status: 200,
        content_type: Some(content_type.to_string()),
        body: futures::stream::iter(vec![Ok::<Vec<u8>, RelayError>(body.into_bytes())]).boxed(),
    }
}

#[async_trait]
impl Transport for FakeServer {
    async fn post(&self, endpoint: &str, body: String, _timeout: Duration) -> Result<HttpResponse> {
        if self.offline {
            return Err(RelayError::transport("connection refused"));
        }
        assert_eq!(endpoint, ENDPOINT);

        let request: Value = serde_json::from_str(&body).unwrap();
        self.requests.lock().unwrap().push(request.clone());

        let id = request["id"].clone();
        let response = match request["method"].as_str().unwrap() {
            "initialize" => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "protocolVersion": "2024-11-05",
                    "serverInfo": {"name": "weather", "version": "1.0.0"}
                }
            }),
            "tools/list" => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {"tools": self.tools.lock().unwrap().clone()}
            }),
            "tools/call" => {
                let body = self.call_reply.lock().unwrap().clone();
                return Ok(reply("text/event-stream", body));
            }
            other => panic!("unexpected method {other}"),
        };
        Ok(reply("application/json", response.to_string()))
    }
}

/// Records replies and answers forms from a script.
#[derive(Default)]
struct RecordingSurface {
    replies: Mutex<Vec<String>>,
    forms: Mutex<Vec<FormRequest>>,
    form_answer: Mutex<Option<FieldValues>>,
}

impl RecordingSurface {
    fn answer_forms_with(&self, fields: &[(&str, &str)]) {
        let values = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        *self.form_answer.lock().unwrap() = Some(values);
    }

    fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }

    fn last_reply(&self) -> String {
        self.replies().last().cloned().unwrap_or_default()
    }

    fn forms(&self) -> Vec<FormRequest> {
        self.forms.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatSurface for RecordingSurface {
    async fn say(&self, text: &str) -> Result<()> {
        self.replies.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn request_form(&self, form: FormRequest) -> Result<Option<FieldValues>> {
        self.forms.lock().unwrap().push(form);
        Ok(self.form_answer.lock().unwrap().clone())
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    server: Arc<FakeServer>,
    surface: Arc<RecordingSurface>,
    dispatcher: Dispatcher,
}

impl Harness {
    fn new(server: FakeServer) -> Self {
        Self::with_settings(server, SessionSettings::default())
    }

    fn with_settings(server: FakeServer, settings: SessionSettings) -> Self {
        let store = Arc::new(MemoryStore::new());
        let server = Arc::new(server);
        let surface = Arc::new(RecordingSurface::default());
        let ctx = CommandContext::new(store.clone(), server.clone(), surface.clone())
            .with_settings(settings);
        Self {
            store,
            server,
            surface,
            dispatcher: Dispatcher::new(ctx),
        }
    }

    async fn send(&self, text: &str) -> String {
        self.dispatcher.handle_message(text).await.unwrap();
        self.surface.last_reply()
    }
}

fn forecast_tools() -> Value {
    json!([{
        "name": "forecast",
        "description": "Weather forecast for a city",
        "inputSchema": {
            "type": "object",
            "properties": {
                "city": {"type": "string", "description": "City name"},
                "days": {"type": "integer"}
            },
            "required": ["city"]
        }
    }])
}

async fn registered(tools: Value) -> Harness {
    let harness = Harness::new(FakeServer::new(tools));
    harness.send(&format!("add weather {}", ENDPOINT)).await;
    harness
}

#[tokio::test]
async fn add_registers_server_and_tools() {
    let harness = Harness::new(FakeServer::new(forecast_tools()));

    let reply = harness.send(&format!("add weather <{}|weather.example>", ENDPOINT)).await;
    assert_eq!(reply, "Registered MCP server 'weather'.\nTools: 1");
    assert_eq!(harness.server.methods(), vec!["initialize", "tools/list"]);

    let server = harness.store.find_server_by_name("weather").await.unwrap().unwrap();
    assert_eq!(server.endpoint, ENDPOINT);
    assert_eq!(server.tool_names(), vec!["forecast"]);
    assert!(server.tool("forecast").unwrap().input_schema.is_some());
}

#[tokio::test]
async fn add_refuses_before_touching_the_network() {
    let harness = Harness::new(FakeServer::new(forecast_tools()));

    let reply = harness.send(&format!("add Help {}", ENDPOINT)).await;
    assert_eq!(reply, ValidationError::ReservedName("Help".into()).to_string());

    let reply = harness.send("add weather ftp://weather.example/mcp").await;
    assert_eq!(
        reply,
        ValidationError::InvalidEndpoint("ftp://weather.example/mcp".into()).to_string()
    );

    assert!(harness.server.requests().is_empty());
    assert!(harness.store.list_servers().await.unwrap().is_empty());
}

#[tokio::test]
async fn add_refuses_duplicates() {
    let harness = registered(forecast_tools()).await;

    let reply = harness.send(&format!("add weather {}", ENDPOINT)).await;
    assert_eq!(reply, ValidationError::DuplicateServer("weather".into()).to_string());
    assert_eq!(harness.store.list_servers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn add_refuses_file_field_tools() {
    let harness = Harness::new(FakeServer::new(json!([
        {"name": "summarize", "inputSchema": {"type": "object", "properties": {"text": {"type": "string"}}}},
        {"name": "transcribe", "inputSchema": {"type": "object", "properties": {"file": {"type": "string"}}}}
    ])));

    let reply = harness.send(&format!("add audio {}", ENDPOINT)).await;
    assert_eq!(
        reply,
        ValidationError::FileField {
            tool: "transcribe".into()
        }
        .to_string()
    );
    assert!(harness.store.find_server_by_name("audio").await.unwrap().is_none());
}

#[tokio::test]
async fn unreachable_server_is_reported() {
    let harness = Harness::new(FakeServer::offline());

    let reply = harness.send(&format!("add weather {}", ENDPOINT)).await;
    assert_eq!(
        reply,
        "Something went wrong: transport error: connection refused\nPlease try again."
    );
    assert!(harness.store.list_servers().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_reports_changes() {
    let harness = registered(forecast_tools()).await;
    harness.server.set_tools(json!([
        {"name": "forecast"},
        {"name": "alerts", "description": "Severe weather alerts"}
    ]));

    let reply = harness.send("update weather").await;
    assert_eq!(
        reply,
        "Updated tools for MCP server 'weather'.\nTools: 1 → 2\n\nAdded tools:\n• alerts"
    );
    assert!(harness.surface.replies().iter().any(|r| r.starts_with("Refreshing tools")));

    let server = harness.store.find_server_by_name("weather").await.unwrap().unwrap();
    assert_eq!(server.tool_names(), vec!["forecast", "alerts"]);

    let reply = harness.send("update weather").await;
    assert!(reply.ends_with("\nNo changes."), "{reply}");
}

#[tokio::test]
async fn update_keeps_tools_when_new_ones_need_files() {
    let harness = registered(forecast_tools()).await;
    harness.server.set_tools(json!([
        {"name": "upload", "inputSchema": {"type": "object", "properties": {"doc": {"type": "file"}}}}
    ]));

    let reply = harness.send("update weather").await;
    assert_eq!(reply, ValidationError::FileField { tool: "upload".into() }.to_string());

    let server = harness.store.find_server_by_name("weather").await.unwrap().unwrap();
    assert_eq!(server.tool_names(), vec!["forecast"]);
}

#[tokio::test]
async fn unknown_server_is_not_found() {
    let harness = Harness::new(FakeServer::new(forecast_tools()));

    for text in ["update ghost", "delete ghost", "tool ghost", "ghost city=Paris"] {
        let reply = harness.send(text).await;
        assert_eq!(
            reply,
            "MCP server 'ghost' not found. Use `list` to see registered servers.",
            "{text}"
        );
    }
    assert!(harness.server.requests().is_empty());
}

#[tokio::test]
async fn delete_removes_server() {
    let harness = registered(forecast_tools()).await;

    assert_eq!(harness.send("delete weather").await, "Deleted MCP server 'weather'.");
    assert!(harness.store.find_server_by_name("weather").await.unwrap().is_none());
}

#[tokio::test]
async fn list_shows_servers_with_summary() {
    let harness = Harness::new(FakeServer::new(forecast_tools()));
    assert_eq!(harness.send("list").await, "No MCP servers are registered.");

    harness.send(&format!("add weather {}", ENDPOINT)).await;
    assert_eq!(
        harness.send("list").await,
        "Registered MCP servers:\n• weather - Weather forecast for a city"
    );
}

#[tokio::test]
async fn tool_lists_live_parameters() {
    let harness = registered(forecast_tools()).await;

    let reply = harness.send("tool weather").await;
    assert_eq!(
        reply,
        "Tools on MCP server 'weather':\n\n*forecast*\nWeather forecast for a city\nParameters:\n  - city (string, required): City name\n  - days (integer, optional): "
    );
}

#[tokio::test]
async fn execute_binds_text_and_replies_with_result() {
    let harness = registered(forecast_tools()).await;

    let reply = harness.send("weather Paris days=3").await;
    assert_eq!(reply, "Sunny in Paris");
    assert!(harness.surface.forms().is_empty());
    assert!(harness
        .surface
        .replies()
        .contains(&"Running 'forecast' on MCP server 'weather'...".to_string()));

    let calls = harness.server.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["name"], "forecast");
    assert_eq!(calls[0]["arguments"], json!({"days": 3, "city": "Paris"}));
}

#[tokio::test]
async fn execute_without_arguments_asks_for_a_form() {
    let harness = registered(forecast_tools()).await;
    harness.surface.answer_forms_with(&[("city", "Lyon"), ("days", "2"), ("unknown", "x")]);

    let reply = harness.send("weather").await;
    assert_eq!(reply, "Sunny in Paris");

    let forms = harness.surface.forms();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].server, "weather");
    assert_eq!(forms[0].tool, "forecast");
    assert_eq!(forms[0].fields[1].kind, FieldKind::Number);

    let calls = harness.server.calls();
    assert_eq!(calls[0]["arguments"], json!({"city": "Lyon", "days": 2}));
}

#[tokio::test]
async fn execute_refuses_when_required_fields_stay_missing() {
    let harness = registered(forecast_tools()).await;
    let before = harness.server.methods().len();

    // Form dismissed.
    let reply = harness.send("weather days=3").await;
    assert_eq!(
        reply,
        ValidationError::MissingRequired(vec!["city".into()]).to_string()
    );
    assert_eq!(harness.surface.forms().len(), 1);
    // Refused before the handshake, so nothing reached the server.
    assert_eq!(harness.server.methods().len(), before);
}

#[tokio::test]
async fn execute_reports_tool_errors() {
    let harness = registered(forecast_tools()).await;
    harness.server.reply_to_calls(format!(
        "data: {}\n\n",
        json!({"jsonrpc": "2.0", "id": 3, "error": {"code": -32602, "message": "Unknown city"}})
    ));

    let reply = harness.send("weather Atlantis").await;
    assert_eq!(reply, "Execution failed:\nUnknown city");
}

#[tokio::test]
async fn execute_streams_vendor_events() {
    let harness = registered(forecast_tools()).await;
    harness.server.reply_to_calls(
        [
            r#"data: {"event": "text-chunk", "data": {"text": "Cloudy, "}}"#,
            r#"data: {"event": "text-chunk", "data": {"text": "12°C"}}"#,
            r#"data: {"event": "workflow_finished", "data": {"outputs": {}}}"#,
            "",
        ]
        .join("\n\n"),
    );

    assert_eq!(harness.send("weather Oslo").await, "Cloudy, 12°C");
}

#[tokio::test]
async fn execute_with_empty_result() {
    let harness = registered(forecast_tools()).await;
    harness.server.reply_to_calls(String::new());

    assert_eq!(
        harness.send("weather Oslo").await,
        "Finished, but the result was empty."
    );
}

#[tokio::test]
async fn identity_is_forwarded() {
    let settings = SessionSettings {
        identity: Some("U123".into()),
        ..SessionSettings::default()
    };
    let harness = Harness::with_settings(FakeServer::new(forecast_tools()), settings);

    harness.send(&format!("add weather {}", ENDPOINT)).await;
    harness.send("weather Paris").await;

    let requests = harness.server.requests();
    assert_eq!(requests.len(), 4);
    assert!(requests.iter().all(|r| r["params"]["user"] == "U123"));
}

#[tokio::test]
async fn short_commands_show_usage() {
    let harness = Harness::new(FakeServer::new(forecast_tools()));

    assert_eq!(harness.send("add weather").await, "Usage: `add <name> <url>`");
    assert!(harness.send("help").await.starts_with("Commands:"));
}

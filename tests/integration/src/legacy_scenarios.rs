//! Scenarios for the legacy line envelope
//!
//! Older clients send `{"id", "method"?, "inputs": {"tool", ...}}` and expect
//! `{"id", "outputs": {"results": ...}}` or `{"id", "error": {...}}` back.

use devops_search_mcp::{AuditLog, SearchMcpServer, ToolRegistry};
use devops_test_utils::fixtures::{code_search_payload, wiki_search_payload};
use devops_test_utils::{MockUpstream, test_config_with_project};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use tempfile::TempDir;

fn server(upstream: MockUpstream, display_name: &str) -> (SearchMcpServer<MockUpstream>, TempDir) {
    let logs = TempDir::new().unwrap();
    let server = SearchMcpServer::with_upstream(
        test_config_with_project(),
        upstream,
        ToolRegistry::new(display_name),
        AuditLog::in_dir(logs.path()),
    );
    (server, logs)
}

async fn send(server: &SearchMcpServer<MockUpstream>, message: Value) -> Value {
    let response = server
        .handle_message(&message.to_string())
        .await
        .unwrap()
        .unwrap();
    serde_json::from_str(&response).unwrap()
}

#[tokio::test]
async fn wiki_search_results_are_wrapped_in_outputs() {
    let (server, _logs) = server(
        MockUpstream::new().respond_json(200, wiki_search_payload()),
        "Azure DevOps",
    );

    let response = send(
        &server,
        json!({ "id": "42", "inputs": { "tool": "azure_devops_wiki_search", "query": "deployment" } }),
    )
    .await;

    assert_eq!(response["id"], "42");
    assert!(response.get("error").is_none());
    assert_eq!(response["outputs"]["results"]["count"], 1);
    assert_eq!(
        response["outputs"]["results"]["results"][0]["title"],
        "Deploy.md"
    );
}

#[tokio::test]
async fn code_search_passes_flattened_arguments() {
    let (server, _logs) = server(
        MockUpstream::new().respond_json(200, code_search_payload()),
        "Azure DevOps",
    );

    send(
        &server,
        json!({
            "id": 1,
            "inputs": {
                "tool": "azure_devops_code_search",
                "query": "parse",
                "repository": "svc",
                "maxResults": 25
            }
        }),
    )
    .await;

    let body = server
        .dispatcher()
        .client()
        .upstream()
        .last_request()
        .body
        .unwrap();
    assert_eq!(body["$top"], 25);
    assert_eq!(body["filters"]["Repository"], json!(["svc"]));
}

#[tokio::test]
async fn upstream_failure_becomes_error_envelope() {
    let (server, _logs) = server(
        MockUpstream::new().respond_text(500, "Internal Server Error"),
        "Azure DevOps",
    );

    let response = send(
        &server,
        json!({ "id": 5, "inputs": { "tool": "azure_devops_code_search", "query": "x" } }),
    )
    .await;

    assert!(response.get("outputs").is_none());
    assert_eq!(
        response["error"]["message"],
        "Code search failed with status 500: Internal Server Error"
    );
}

#[rstest]
#[case::default_prefix("Azure DevOps", "azure_devops_wiki_search", true)]
#[case::custom_prefix("Contoso Ops", "contoso_ops_wiki_search", true)]
#[case::wrong_prefix("Contoso Ops", "azure_devops_wiki_search", false)]
#[tokio::test]
async fn tool_names_follow_display_name(
    #[case] display_name: &str,
    #[case] tool: &str,
    #[case] known: bool,
) {
    let (server, _logs) = server(
        MockUpstream::new().respond_json(200, json!({ "count": 0, "results": [] })),
        display_name,
    );

    let response = send(&server, json!({ "id": 1, "inputs": { "tool": tool, "query": "x" } })).await;

    assert_eq!(response.get("outputs").is_some(), known);
    assert_eq!(server.dispatcher().client().upstream().call_count(), usize::from(known));
}

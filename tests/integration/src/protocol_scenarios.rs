//! End-to-end protocol scenarios
//!
//! Each scenario drives the server with JSON-RPC lines exactly as an MCP
//! client would, with a scripted upstream standing in for Azure DevOps.

use devops_client::{Config, Method, UpstreamResponse};
use devops_search_mcp::{AuditLog, SearchMcpServer, ToolRegistry};
use devops_test_utils::fixtures::{
    code_search_payload, git_item_payload, project_not_found_payload, wiki_page_payload,
    wiki_search_payload,
};
use devops_test_utils::{MockUpstream, test_config, test_config_with_project};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    server: SearchMcpServer<MockUpstream>,
    logs: TempDir,
    next_id: std::cell::Cell<u64>,
}

impl Harness {
    fn new(upstream: MockUpstream) -> Self {
        Self::with_config(test_config_with_project(), upstream)
    }

    fn with_config(config: Config, upstream: MockUpstream) -> Self {
        let logs = TempDir::new().unwrap();
        let server = SearchMcpServer::with_upstream(
            config,
            upstream,
            ToolRegistry::default(),
            AuditLog::in_dir(logs.path()),
        );
        Self {
            server,
            logs,
            next_id: std::cell::Cell::new(1),
        }
    }

    fn upstream(&self) -> &MockUpstream {
        self.server.dispatcher().client().upstream()
    }

    async fn request(&self, method: &str, params: Value) -> Value {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let line = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }).to_string();
        let response = self.server.handle_message(&line).await.unwrap().unwrap();
        let parsed: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed["id"], id);
        parsed
    }

    /// Call a tool and return `(is_error, decoded text payload)`
    async fn call_tool(&self, name: &str, arguments: Value) -> (bool, Value) {
        let response = self
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await;
        let result = &response["result"];
        let text = result["content"][0]["text"].as_str().unwrap();
        (
            result["isError"].as_bool().unwrap_or(false),
            serde_json::from_str(text).unwrap(),
        )
    }

    fn audit_entries(&self) -> Vec<Value> {
        std::fs::read_to_string(self.logs.path().join("search-requests.log"))
            .unwrap_or_default()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

// =============================================================================
// Handshake
// =============================================================================

mod handshake {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn initialize_lists_catalog_without_upstream_calls() {
        let harness = Harness::new(MockUpstream::new());

        let init = harness.request("initialize", json!({})).await;
        let listed = harness.request("tools/list", json!({})).await;

        assert_eq!(init["result"]["tools"], listed["result"]["tools"]);
        assert_eq!(harness.upstream().call_count(), 0);
        assert!(harness.audit_entries().is_empty());
    }
}

// =============================================================================
// Wiki search
// =============================================================================

mod wiki_search {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn deployment_query_against_infra() {
        let harness = Harness::with_config(
            test_config(),
            MockUpstream::new().respond_json(200, wiki_search_payload()),
        );

        let (is_error, payload) = harness
            .call_tool(
                "azure_devops_wiki_search",
                json!({ "query": "deployment", "project": "Infra" }),
            )
            .await;

        assert!(!is_error);
        let body = harness.upstream().last_request().body.unwrap();
        assert_eq!(body["$top"], 10);
        assert_eq!(body["$skip"], 0);
        assert_eq!(body["filters"]["Project"], json!(["Infra"]));

        assert_eq!(payload["count"], 1);
        assert_eq!(payload["results"][0]["content"], "run the deployment pipeline");
        assert_eq!(payload["results"][0]["id"], "c0ffee");
    }

    #[tokio::test]
    async fn missing_project_is_validation_error_without_network() {
        let harness = Harness::with_config(test_config(), MockUpstream::new());

        let (is_error, payload) = harness
            .call_tool("azure_devops_wiki_search", json!({ "query": "deployment" }))
            .await;

        assert!(is_error);
        assert_eq!(
            payload,
            json!({ "kind": "Validation", "message": "Project name is required for wiki search" })
        );
        assert_eq!(harness.upstream().call_count(), 0);
    }

    #[tokio::test]
    async fn upstream_404_is_reported_with_status() {
        let harness = Harness::new(
            MockUpstream::new().respond_json(404, json!({ "message": "Project not found" })),
        );

        let (is_error, payload) = harness
            .call_tool("azure_devops_wiki_search", json!({ "query": "deployment" }))
            .await;

        assert!(is_error);
        assert_eq!(payload["kind"], "UpstreamHttp");
        assert_eq!(payload["status"], 404);
        assert_eq!(
            payload["message"],
            "Wiki search failed with status 404: Project not found"
        );

        let types: Vec<Value> = harness.audit_entries().iter().map(|e| e["type"].clone()).collect();
        assert_eq!(types, vec![json!("wiki"), json!("error")]);
    }
}

// =============================================================================
// Code search
// =============================================================================

mod code_search {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn extensions_become_path_globs() {
        let harness = Harness::new(MockUpstream::new().respond_json(200, code_search_payload()));

        let (is_error, payload) = harness
            .call_tool(
                "azure_devops_code_search",
                json!({ "query": "TODO", "fileExtensions": ["ts", "js"] }),
            )
            .await;

        assert!(!is_error);
        let request = harness.upstream().last_request();
        assert_eq!(request.method, Method::Post);
        assert_eq!(
            request.url.as_str(),
            "https://almsearch.dev.azure.com/contoso/_apis/search/codesearchresults?api-version=7.1"
        );
        let body = request.body.unwrap();
        assert_eq!(body["filters"]["Path"], json!(["**/*.ts", "**/*.js"]));
        assert_eq!(body["$orderBy"][0]["sortOrder"], "ASC");
        assert_eq!(payload["results"][0]["matches"][0]["line"], 0);
    }

    #[tokio::test]
    async fn path_wins_over_extensions() {
        let harness = Harness::new(MockUpstream::new().respond_json(200, code_search_payload()));

        harness
            .call_tool(
                "azure_devops_code_search",
                json!({ "query": "TODO", "path": "/src", "fileExtensions": ["ts"] }),
            )
            .await;

        let body = harness.upstream().last_request().body.unwrap();
        assert_eq!(body["filters"]["Path"], json!(["/src"]));
    }

    #[tokio::test]
    async fn unknown_code_element_is_rejected() {
        let harness = Harness::new(MockUpstream::new());

        let (is_error, payload) = harness
            .call_tool(
                "azure_devops_code_search",
                json!({ "query": "x", "codeElements": ["macro"] }),
            )
            .await;

        assert!(is_error);
        assert_eq!(payload["kind"], "Validation");
        assert_eq!(harness.upstream().call_count(), 0);
    }
}

// =============================================================================
// Code retrieval
// =============================================================================

mod code_retrieval {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn relative_path_is_normalized() {
        let harness = Harness::new(
            MockUpstream::new()
                .respond(UpstreamResponse::json(200, git_item_payload("export {};\n")).with_commit_id("abc")),
        );

        let (is_error, payload) = harness
            .call_tool(
                "azure_devops_code_retrieval",
                json!({ "repository": "svc", "path": "src/app.ts" }),
            )
            .await;

        assert!(!is_error);
        let request = harness.upstream().last_request();
        assert_eq!(request.method, Method::Get);
        assert!(request.url.query_pairs().any(|(k, v)| k == "path" && v == "/src/app.ts"));
        assert_eq!(payload["fileName"], "app.ts");
        assert_eq!(payload["path"], "/src/app.ts");
        assert_eq!(payload["size"], 11);
        assert_eq!(payload["commitId"], "abc");
    }

    #[tokio::test]
    async fn repeated_retrieval_is_identical() {
        let harness = Harness::new(
            MockUpstream::new()
                .respond_text(200, "line one\nline two\n")
                .respond_text(200, "line one\nline two\n"),
        );
        let arguments = json!({ "repository": "svc", "path": "/README.md", "branch": "main" });

        let (_, first) = harness.call_tool("azure_devops_code_retrieval", arguments.clone()).await;
        let (_, second) = harness.call_tool("azure_devops_code_retrieval", arguments).await;

        assert_eq!(first, second);
        assert_eq!(first["size"], 18);
        let requests = harness.upstream().requests();
        assert_eq!(requests[0], requests[1]);
    }
}

// =============================================================================
// Wiki pages
// =============================================================================

mod wiki_page {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn page_with_children() {
        let harness = Harness::new(MockUpstream::new().respond_json(200, wiki_page_payload()));

        let (is_error, payload) = harness
            .call_tool(
                "azure_devops_wiki_page",
                json!({ "wikiIdentifier": "Infra.wiki", "path": "/Runbooks", "recursionLevel": "oneLevel" }),
            )
            .await;

        assert!(!is_error);
        assert_eq!(payload["title"], "Runbooks");
        assert_eq!(payload["isParentPage"], true);
        assert_eq!(payload["subPages"][0]["path"], "/Runbooks/Deploy");
        assert!(payload["subPages"][0].get("subPages").is_none());
    }

    #[tokio::test]
    async fn invalid_recursion_level_is_rejected() {
        let harness = Harness::new(MockUpstream::new());

        let (is_error, payload) = harness
            .call_tool(
                "azure_devops_wiki_page",
                json!({ "wikiIdentifier": "Infra.wiki", "recursionLevel": "deep" }),
            )
            .await;

        assert!(is_error);
        assert_eq!(payload["kind"], "Validation");
        assert_eq!(harness.upstream().call_count(), 0);
    }

    #[tokio::test]
    async fn project_not_found_keeps_upstream_message() {
        let harness = Harness::new(
            MockUpstream::new().respond_json(404, project_not_found_payload("Infra")),
        );

        let (_, payload) = harness
            .call_tool("azure_devops_wiki_page", json!({ "wikiIdentifier": "Infra.wiki" }))
            .await;

        assert_eq!(
            payload["message"],
            "Wiki page retrieval failed with status 404: TF200016: The following project does not exist: Infra."
        );
    }
}

// =============================================================================
// Unknown operations
// =============================================================================

mod unknown_operation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn never_touches_upstream() {
        let harness = Harness::new(MockUpstream::new().respond_json(200, wiki_search_payload()));

        let (is_error, payload) = harness
            .call_tool("azure_devops_wiki_delete", json!({ "query": "x" }))
            .await;

        assert!(is_error);
        assert_eq!(payload["kind"], "UnknownOperation");
        assert_eq!(harness.upstream().call_count(), 0);

        let entries = harness.audit_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["type"], "error");
    }

    #[tokio::test]
    async fn transport_failure_is_reported() {
        let harness = Harness::new(MockUpstream::new().fail_transport("connection reset by peer"));

        let (is_error, payload) = harness
            .call_tool("azure_devops_code_search", json!({ "query": "x" }))
            .await;

        assert!(is_error);
        assert_eq!(payload["kind"], "Transport");
        assert_eq!(payload["message"], "connection reset by peer");
        assert!(payload.get("status").is_none());
    }
}

//! Configurations and canned upstream payloads.
//!
//! Payloads follow the shapes Azure DevOps returns, trimmed to the fields
//! the client reads.

use devops_client::Config;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const TEST_ORG_URL: &str = "https://dev.azure.com/contoso";
pub const TEST_TOKEN: &str = "test-pat";
pub const TEST_PROJECT: &str = "Infra";

/// A configuration for `contoso` with no default project.
///
/// # Panics
/// Panics if the constants above stop forming a valid configuration.
pub fn test_config() -> Config {
    Config::new(TEST_ORG_URL, TEST_TOKEN)
        .unwrap_or_else(|e| panic!("test_config: invalid fixture configuration: {e}"))
}

/// A configuration for `contoso` whose default project is [`TEST_PROJECT`].
pub fn test_config_with_project() -> Config {
    test_config().with_default_project(TEST_PROJECT)
}

/// A temporary directory for audit logs; removed on drop.
///
/// # Panics
/// Panics if the directory cannot be created.
pub fn log_dir() -> TempDir {
    TempDir::new().unwrap_or_else(|e| panic!("log_dir: failed to create temp dir: {e}"))
}

/// Wiki search response with one hit on `/Runbooks/Deploy.md`.
pub fn wiki_search_payload() -> Value {
    json!({
        "count": 1,
        "results": [{
            "fileName": "Deploy.md",
            "path": "/Runbooks/Deploy.md",
            "collection": { "name": "Infra.wiki" },
            "project": { "name": TEST_PROJECT },
            "contentId": "c0ffee",
            "hits": [{
                "fieldReferenceName": "content",
                "highlights": ["run the <highlighthit>deployment</highlighthit> pipeline"]
            }]
        }]
    })
}

/// Code search response with one hit in `svc/src/app.ts` at offset 120.
pub fn code_search_payload() -> Value {
    json!({
        "count": 1,
        "results": [{
            "fileName": "app.ts",
            "path": "/src/app.ts",
            "repository": { "name": "svc" },
            "project": { "name": TEST_PROJECT },
            "matches": {
                "content": [{ "charOffset": 120, "length": 4 }],
                "fileName": []
            }
        }]
    })
}

/// Git item response carrying `content` inline.
pub fn git_item_payload(content: &str) -> Value {
    json!({
        "objectId": "4b825dc642cb6eb9a060e54bf8d69288fbee4904",
        "gitObjectType": "blob",
        "path": "/src/app.ts",
        "content": content
    })
}

/// Wiki page tree: `/Runbooks` with a single child `/Runbooks/Deploy`.
pub fn wiki_page_payload() -> Value {
    json!({
        "id": 7,
        "path": "/Runbooks",
        "order": 0,
        "isParentPage": true,
        "gitItemPath": "/Runbooks.md",
        "content": "# Runbooks",
        "subPages": [{
            "id": 8,
            "path": "/Runbooks/Deploy",
            "order": 0,
            "isParentPage": false,
            "gitItemPath": "/Runbooks/Deploy.md"
        }]
    })
}

/// Error body Azure DevOps returns for an unknown project.
pub fn project_not_found_payload(project: &str) -> Value {
    json!({
        "$id": "1",
        "message": format!("TF200016: The following project does not exist: {project}."),
        "typeName": "Microsoft.TeamFoundation.Core.WebApi.ProjectDoesNotExistWithNameException",
        "typeKey": "ProjectDoesNotExistWithNameException",
        "errorCode": 0
    })
}

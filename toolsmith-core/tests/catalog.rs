use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tempfile::TempDir;
use toolsmith_core::catalog::tool_name;
use toolsmith_core::{CatalogError, HttpMethod, OperationCatalog, SearchQuery, SpecStore};

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

const USERS_SPEC: &str = r#"
openapi: 3.0.0
info: { title: Users, version: 1.0.0 }
servers:
  - url: https://users.example.com
components:
  parameters:
    PageSize:
      name: pageSize
      in: query
      schema: { type: integer, minimum: 1 }
paths:
  /users:
    get:
      operationId: listUsers
      summary: List all users
      tags: [users, admin]
      parameters:
        - $ref: '#/components/parameters/PageSize'
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: array
                items: { $ref: 'schemas.yaml#/User' }
    post:
      operationId: create-user
      tags: [users]
      requestBody:
        required: true
        content:
          application/json:
            schema: { $ref: 'schemas.yaml#/User' }
      responses:
        "201": { description: created }
  /users/{id}:
    parameters:
      - name: id
        in: path
        schema: { type: string }
      - name: session
        in: cookie
        schema: { type: string }
    get:
      summary: Fetch a single user
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: { $ref: 'schemas.yaml#/User' }
    delete:
      operationId: deleteUser
      responses:
        "204": { description: gone }
"#;

const USER_SCHEMAS: &str = r#"
User:
  type: object
  required: [id]
  properties:
    id: { type: string }
    email: { type: string, format: email }
"#;

const BILLING_SPEC: &str = r#"{
  "openapi": "3.0.0",
  "info": { "title": "Billing", "version": "2.0.0" },
  "paths": {
    "/invoices": {
      "get": {
        "operationId": "listInvoices",
        "tags": ["invoices"],
        "responses": {
          "200": {
            "description": "ok",
            "content": { "application/json": { "schema": {
              "type": "object",
              "properties": { "items": { "type": "array" }, "hasMore": { "type": "boolean" } }
            } } }
          }
        }
      }
    },
    "/invoices/{id}": {
      "get": {
        "operationId": "getInvoice",
        "parameters": [ { "name": "id", "in": "path", "schema": { "type": "string" } } ],
        "responses": {
          "200": {
            "description": "ok",
            "content": { "application/json": { "schema": {
              "type": "object", "properties": { "id": { "type": "string" } }
            } } }
          }
        }
      }
    }
  }
}"#;

fn fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "users/openapi.yaml", USERS_SPEC);
    write(tmp.path(), "users/schemas.yaml", USER_SCHEMAS);
    write(tmp.path(), "billing/v2/openapi.json", BILLING_SPEC);
    tmp
}

fn loaded(root: &Path) -> OperationCatalog {
    let mut catalog = OperationCatalog::new(SpecStore::new(root));
    catalog.load().unwrap();
    catalog
}

#[test]
fn loads_operations_with_namespaces_and_derived_names() {
    let tmp = fixture();
    let catalog = loaded(tmp.path());

    assert_eq!(catalog.len(), 6);
    assert!(catalog.load_errors().is_empty());

    let list = catalog.get("api_users_listUsers").expect("listUsers");
    assert_eq!(list.product, "users");
    assert_eq!(list.version, "v1");
    assert_eq!(list.method, HttpMethod::Get);
    assert_eq!(list.server_url.as_deref(), Some("https://users.example.com"));

    let invoice = catalog.get("api_billing_getInvoice").expect("getInvoice");
    assert_eq!(invoice.version, "v2");

    // operationId derived from the path when absent.
    assert!(catalog.get("api_users_getUsers").is_some());
    // Hyphens are not allowed in tool names.
    assert!(catalog.get("api_users_create_user").is_some());
}

#[test]
fn load_is_idempotent_and_reset_rebuilds() {
    let tmp = fixture();
    let mut catalog = OperationCatalog::new(SpecStore::new(tmp.path()));
    let first = catalog.load().unwrap();
    let names: BTreeSet<String> = catalog.tool_names().map(String::from).collect();

    let second = catalog.load().unwrap();
    assert_eq!(first, second);
    assert_eq!(names, catalog.tool_names().map(String::from).collect());

    catalog.reset();
    assert!(catalog.is_empty());
    assert!(!catalog.is_loaded());
    assert_eq!(catalog.load().unwrap(), first);
    assert_eq!(names, catalog.tool_names().map(String::from).collect());
}

#[test]
fn missing_spec_dir_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let mut catalog = OperationCatalog::new(SpecStore::new(tmp.path().join("nope")));
    let err = catalog.load().unwrap_err();
    assert!(matches!(err, CatalogError::SpecDirMissing(_)));
}

#[test]
fn broken_file_is_skipped_and_recorded() {
    let tmp = fixture();
    write(tmp.path(), "broken/openapi.yaml", "openapi: [unclosed");
    write(tmp.path(), "nopaths/openapi.json", r#"{"openapi":"3.0.0"}"#);

    let catalog = loaded(tmp.path());
    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.load_errors().len(), 2);
}

#[test]
fn external_and_local_refs_are_inlined() {
    let tmp = fixture();
    let catalog = loaded(tmp.path());

    let list = catalog.get("api_users_listUsers").unwrap();
    let page_size = &list.parameters[0];
    assert_eq!(page_size.name, "pageSize");
    assert_eq!(page_size.schema["type"], "integer");

    let schema = list.responses["200"].json_schema().unwrap();
    assert_eq!(schema["items"]["properties"]["email"]["format"], "email");

    let create = catalog.get("api_users_create_user").unwrap();
    let body = create.request_body.as_ref().unwrap();
    assert!(body.required);
    assert_eq!(body.json_schema().unwrap()["required"][0], "id");
}

#[test]
fn path_item_parameters_merge_and_cookies_are_dropped() {
    let tmp = fixture();
    let catalog = loaded(tmp.path());
    let delete = catalog.get("api_users_deleteUser").unwrap();
    assert_eq!(delete.parameters.len(), 1);
    assert_eq!(delete.parameters[0].name, "id");
    assert!(delete.parameters[0].required);
}

#[test]
fn pagination_heuristic() {
    let tmp = fixture();
    let catalog = loaded(tmp.path());
    // query parameter `pageSize`
    assert!(catalog.get("api_users_listUsers").unwrap().paginated);
    // `hasMore` in the 200 response
    assert!(catalog.get("api_billing_listInvoices").unwrap().paginated);
    // neither signal
    assert!(!catalog.get("api_billing_getInvoice").unwrap().paginated);
    assert!(!catalog.get("api_users_deleteUser").unwrap().paginated);
}

#[test]
fn search_composes_filters() {
    let tmp = fixture();
    let catalog = loaded(tmp.path());

    let by_product = catalog.search(&SearchQuery {
        product: Some("Billing".into()),
        ..Default::default()
    });
    assert_eq!(by_product.len(), 2);

    let get_users = catalog.search(&SearchQuery {
        product: Some("users".into()),
        method: Some(HttpMethod::Get),
        ..Default::default()
    });
    assert_eq!(get_users.len(), 2);

    let tagged = catalog.search(&SearchQuery {
        tags: vec!["admin".into(), "invoices".into()],
        ..Default::default()
    });
    let names: BTreeSet<&str> = tagged.iter().map(|o| o.tool_name.as_str()).collect();
    assert_eq!(names, BTreeSet::from(["api_users_listUsers", "api_billing_listInvoices"]));

    let text = catalog.search(&SearchQuery {
        text: Some("single USER".into()),
        ..Default::default()
    });
    assert_eq!(text.len(), 1);
    assert_eq!(text[0].tool_name, "api_users_getUsers");

    let paginated_gets = catalog.search(&SearchQuery {
        method: Some(HttpMethod::Get),
        paginated: Some(true),
        limit: Some(1),
        ..Default::default()
    });
    assert_eq!(paginated_gets.len(), 1);
}

#[test]
fn stats_and_indices() {
    let tmp = fixture();
    let catalog = loaded(tmp.path());
    let stats = catalog.stats();
    assert_eq!(stats.total, 6);
    assert_eq!(stats.by_product["users"], 4);
    assert_eq!(stats.by_product["billing"], 2);
    assert_eq!(stats.by_method["GET"], 4);
    assert_eq!(stats.paginated, 2);
    assert_eq!(stats.with_body, 1);

    assert_eq!(catalog.by_method(HttpMethod::Delete).len(), 1);
    assert_eq!(catalog.by_product("billing").len(), 2);
    assert_eq!(catalog.products().collect::<Vec<_>>(), vec!["billing", "users"]);
}

#[test]
fn tool_name_is_pure() {
    assert_eq!(
        tool_name("api", "users", "listUsers"),
        tool_name("api", "users", "listUsers")
    );
}

// Truncated names alias and the later operation replaces the earlier one.
// Pinned deliberately until a collision policy (e.g. hash suffix) is chosen.
#[test]
fn truncation_collision_last_writer_wins() {
    let shared = "x".repeat(52);
    let first = format!("{shared}First");
    let second = format!("{shared}Second");
    assert_eq!(tool_name("api", "billing", &first), tool_name("api", "billing", &second));

    let tmp = TempDir::new().unwrap();
    let spec = format!(
        r#"{{"openapi":"3.0.0","paths":{{
            "/a":{{"get":{{"operationId":"{first}","responses":{{}}}}}},
            "/b":{{"get":{{"operationId":"{second}","responses":{{}}}}}}
        }}}}"#
    );
    write(tmp.path(), "billing/openapi.json", &spec);

    let catalog = loaded(tmp.path());
    assert_eq!(catalog.len(), 1);
    let survivor = catalog.operations().next().unwrap();
    assert_eq!(survivor.operation_id, second);
    assert_eq!(catalog.by_method(HttpMethod::Get).len(), 1);
    assert!(catalog.warnings().iter().any(|w| w.contains("collision")));
}

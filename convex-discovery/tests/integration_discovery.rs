//! Integration tests for the discovery pass over a synthetic backend.
//!
//! These tests lay out a realistic backend directory (generated barrel plus
//! TypeScript and JavaScript modules) and verify what the engine reports.

mod common;

use common::{write_backend, write_file};
use convex_discovery::DiscoveryContext;
use convex_schema::{ArgType, FunctionType};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn test_discovers_functions_in_barrel_order() {
    let dir = tempdir().unwrap();
    let backend = dir.path().join("convex");
    write_backend(&backend);

    let ctx = DiscoveryContext::new(&backend).unwrap();
    let functions = ctx.discover();

    let paths: Vec<&str> = functions.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "legacy.ping",
            "lib_utils.formatDate",
            "todos.getAll",
            "todos.create",
            "todos.toggle",
        ]
    );
}

#[test]
fn test_function_types_and_references() {
    let dir = tempdir().unwrap();
    let backend = dir.path().join("convex");
    write_backend(&backend);

    let functions = DiscoveryContext::new(&backend).unwrap().discover();
    let summary: Vec<(&str, FunctionType, Option<&str>)> = functions
        .iter()
        .map(|f| (f.path.as_str(), f.function_type, f.reference.as_deref()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("legacy.ping", FunctionType::Query, Some("legacy:ping")),
            (
                "lib_utils.formatDate",
                FunctionType::Action,
                Some("lib/utils:formatDate")
            ),
            ("todos.getAll", FunctionType::Query, Some("todos:getAll")),
            ("todos.create", FunctionType::Mutation, Some("todos:create")),
            ("todos.toggle", FunctionType::Mutation, Some("todos:toggle")),
        ]
    );
}

#[test]
fn test_argument_schemas() {
    let dir = tempdir().unwrap();
    let backend = dir.path().join("convex");
    write_backend(&backend);

    let functions = DiscoveryContext::new(&backend).unwrap().discover();
    let find = |path: &str| functions.iter().find(|f| f.path == path).unwrap();

    // No `args` property: empty argument map, closed schema with no properties
    let get_all = find("todos.getAll");
    assert_eq!(get_all.args.as_ref().map(|a| a.len()), Some(0));
    assert_eq!(get_all.json_schema.property_iter().count(), 0);
    assert_eq!(get_all.json_schema.required, None);

    let create = find("todos.create");
    assert_eq!(create.json_schema.required, Some(vec!["text".to_string()]));
    let properties = create.json_schema.properties.as_ref().unwrap();
    assert_eq!(properties["text"].schema_type, ArgType::String);
    assert_eq!(properties["priority"].schema_type, ArgType::Integer);

    let toggle = find("todos.toggle");
    let mut required = toggle.json_schema.required.clone().unwrap();
    required.sort();
    assert_eq!(required, vec!["done".to_string(), "id".to_string()]);

    let format = find("lib_utils.formatDate");
    let properties = format.json_schema.properties.as_ref().unwrap();
    assert_eq!(properties["timestamp"].schema_type, ArgType::Number);
    assert!(format.json_schema.is_required("timestamp"));
    assert!(!format.json_schema.is_required("locale"));
}

#[test]
fn test_typescript_preferred_over_javascript() {
    let dir = tempdir().unwrap();
    let backend = dir.path().join("convex");
    write_file(
        &backend.join("_generated/api.d.ts"),
        r#"import type * as todos from "../todos.js";"#,
    );
    write_file(
        &backend.join("todos.ts"),
        "export const fromTs = query({ args: {} });",
    );
    write_file(
        &backend.join("todos.js"),
        "export const fromJs = query({ args: {} });",
    );

    let functions = DiscoveryContext::new(&backend).unwrap().discover();
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].path, "todos.fromTs");
}

#[test]
fn test_missing_barrel_yields_nothing() {
    let dir = tempdir().unwrap();
    let backend = dir.path().join("convex");
    write_file(&backend.join("todos.ts"), common::TODOS);

    let functions = DiscoveryContext::new(&backend).unwrap().discover();
    assert!(functions.is_empty());
}

#[test]
fn test_malformed_module_does_not_abort_discovery() {
    let dir = tempdir().unwrap();
    let backend = dir.path().join("convex");
    write_file(
        &backend.join("_generated/api.d.ts"),
        r#"
import type * as broken from "../broken.js";
import type * as todos from "../todos.js";
"#,
    );
    write_file(&backend.join("broken.ts"), "export const = mutation({{{");
    write_file(&backend.join("todos.ts"), common::TODOS);

    let functions = DiscoveryContext::new(&backend).unwrap().discover();
    assert!(functions.iter().any(|f| f.path == "todos.create"));
    assert!(functions.iter().all(|f| !f.path.starts_with("broken.")));
}

#[test]
fn test_discovery_is_stable() {
    let dir = tempdir().unwrap();
    let backend = dir.path().join("convex");
    write_backend(&backend);

    let ctx = DiscoveryContext::new(&backend).unwrap();
    let first = serde_json::to_string(&ctx.discover()).unwrap();
    let second = serde_json::to_string(&ctx.discover()).unwrap();
    assert_eq!(first, second);
}

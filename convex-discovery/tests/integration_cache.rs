//! Integration tests for cached discovery.

mod common;

use common::{write_backend, write_file};
use convex_discovery::DiscoveryContext;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_cache_hit_skips_module_resolution() {
    let dir = tempdir().unwrap();
    let backend = dir.path().join("convex");
    let cache_dir = dir.path().join("node_modules/.cache/convex-cli");
    write_backend(&backend);

    let ctx = DiscoveryContext::new(&backend)
        .unwrap()
        .with_cache(&cache_dir);
    let first = ctx.discover();
    assert!(cache_dir.join("functions.json").exists());

    // The barrel lives in the generated directory, which is outside the
    // checksum; removing it only matters if the engine re-reads it.
    fs::remove_file(backend.join("_generated/api.d.ts")).unwrap();
    assert_eq!(ctx.discover(), first);
}

#[test]
fn test_source_edit_triggers_rediscovery() {
    let dir = tempdir().unwrap();
    let backend = dir.path().join("convex");
    let cache_dir = dir.path().join("cache");
    write_backend(&backend);

    let ctx = DiscoveryContext::new(&backend)
        .unwrap()
        .with_cache(&cache_dir);
    assert_eq!(ctx.discover().len(), 5);

    write_file(
        &backend.join("legacy.js"),
        r#"
export const ping = query({ handler: async () => "pong" });
export const pong = query({ handler: async () => "ping" });
"#,
    );
    let functions = ctx.discover();
    assert_eq!(functions.len(), 6);
    assert!(functions.iter().any(|f| f.path == "legacy.pong"));
}

#[test]
fn test_refresh_clears_cache() {
    let dir = tempdir().unwrap();
    let backend = dir.path().join("convex");
    let cache_dir = dir.path().join("cache");
    write_backend(&backend);

    let ctx = DiscoveryContext::new(&backend)
        .unwrap()
        .with_cache(&cache_dir);
    assert_eq!(ctx.discover().len(), 5);

    fs::remove_file(backend.join("_generated/api.d.ts")).unwrap();
    assert!(ctx.refresh().is_empty());
}

#[test]
fn test_unwritable_cache_location_is_ignored() {
    let dir = tempdir().unwrap();
    let backend = dir.path().join("convex");
    write_backend(&backend);

    // A regular file where the cache directory should be
    let blocker = dir.path().join("cache");
    fs::write(&blocker, "not a directory").unwrap();

    let ctx = DiscoveryContext::new(&backend).unwrap().with_cache(&blocker);
    assert_eq!(ctx.discover().len(), 5);
    assert_eq!(ctx.discover().len(), 5);
}

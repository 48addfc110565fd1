//! Unit tests for CLI commands
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use clap::Parser;
use tempfile::TempDir;

use crate::cache::{read_table, source_hash};
use crate::cli::{run_with_config, serve_lines, Cli, Commands, OutputFormat};
use crate::manifest::load_registry;
use crate::runtime_config::RuntimeConfig;

const MANIFEST: &str = r#"
routes:
  - uri: /post/{year}/{slug?}
    name: post.show
    methods:
      GET: PostController
    where:
      year: "[0-9]{4}"
  - uri: /about
    methods:
      GET: AboutController
"#;

fn manifest_dir() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("routes.yaml");
    fs::write(&path, MANIFEST).unwrap();
    (dir, path)
}

fn run(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    run_with_config(cli, &RuntimeConfig::default(), &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn test_resolve_command_parses() {
    let cli = Cli::try_parse_from([
        "wildroute",
        "resolve",
        "--routes",
        "routes.yaml",
        "--method",
        "get",
        "/a",
        "/b",
    ])
    .unwrap();

    match cli.command {
        Commands::Resolve {
            routes,
            method,
            paths,
            fail_on_miss,
            cache,
        } => {
            assert_eq!(routes.to_string_lossy(), "routes.yaml");
            assert_eq!(method.as_deref(), Some("get"));
            assert_eq!(paths, vec!["/a".to_string(), "/b".to_string()]);
            assert!(!fail_on_miss);
            assert!(cache.is_none());
        }
        _ => panic!("Expected Resolve command"),
    }
}

#[test]
fn test_resolve_requires_paths() {
    assert!(Cli::try_parse_from(["wildroute", "resolve", "--routes", "routes.yaml"]).is_err());
}

#[test]
fn test_inspect_format_flag() {
    let cli = Cli::try_parse_from([
        "wildroute",
        "inspect",
        "--routes",
        "routes.yaml",
        "--format",
        "json",
    ])
    .unwrap();
    match cli.command {
        Commands::Inspect { format, .. } => assert_eq!(format, OutputFormat::Json),
        _ => panic!("Expected Inspect command"),
    }
}

#[test]
fn test_resolve_prints_matches_and_misses() {
    let (_dir, path) = manifest_dir();
    let output = run(&[
        "wildroute",
        "resolve",
        "--routes",
        path.to_str().unwrap(),
        "--method",
        "head",
        "/post/2024/hello",
        "/nowhere",
    ])
    .unwrap();

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines[0],
        "/post/2024/hello -> #0 /post/{year}/{slug?} (post.show) year=2024 slug=hello HEAD=PostController"
    );
    assert_eq!(lines[1], "/nowhere -> no route");
}

#[test]
fn test_resolve_with_method_reaches_method_specific_route() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.yaml");
    fs::write(
        &path,
        r#"
routes:
  - uri: /user/{id}
    methods:
      GET: ShowUser
  - uri: /user/{uid}
    methods:
      DELETE: DeleteUser
"#,
    )
    .unwrap();

    let output = run(&[
        "wildroute",
        "resolve",
        "--routes",
        path.to_str().unwrap(),
        "--method",
        "delete",
        "/user/5",
    ])
    .unwrap();
    assert_eq!(output.trim_end(), "/user/5 -> #1 /user/{uid} uid=5 DELETE=DeleteUser");

    let output = run(&[
        "wildroute",
        "resolve",
        "--routes",
        path.to_str().unwrap(),
        "--method",
        "post",
        "/user/5",
    ])
    .unwrap();
    assert_eq!(output.trim_end(), "/user/5 -> no route");
}

#[test]
fn test_resolve_fail_on_miss() {
    let (_dir, path) = manifest_dir();
    let err = run(&[
        "wildroute",
        "resolve",
        "--routes",
        path.to_str().unwrap(),
        "--fail-on-miss",
        "/about",
        "/nowhere",
    ])
    .unwrap_err();
    assert_eq!(err.to_string(), "1 of 2 paths did not resolve");
}

#[test]
fn test_inspect_lists_variants() {
    let (_dir, path) = manifest_dir();
    let output = run(&["wildroute", "inspect", "--routes", path.to_str().unwrap()]).unwrap();

    assert!(output.contains("#0 /post/{year}/{slug?} [dynamic] name=post.show"));
    assert!(output.contains("HEAD -> PostController (derived)"));
    assert!(output.contains("^/post/([0-9]{4})$"));
    assert!(output.contains("#1 /about [static]"));
    assert!(output.trim_end().ends_with("2 routes, 3 table rows"));
}

#[test]
fn test_compile_then_resolve_from_cache() {
    let (dir, path) = manifest_dir();
    let table = dir.path().join("routes.table.json");
    let output = run(&[
        "wildroute",
        "compile",
        "--routes",
        path.to_str().unwrap(),
        "--out",
        table.to_str().unwrap(),
    ])
    .unwrap();
    assert!(output.starts_with("compiled 2 routes (3 table rows)"));
    assert_eq!(
        read_table(&table).unwrap().source_hash,
        Some(source_hash(MANIFEST.as_bytes()))
    );

    let output = run(&[
        "wildroute",
        "resolve",
        "--routes",
        path.to_str().unwrap(),
        "--cache",
        table.to_str().unwrap(),
        "/post/1999",
    ])
    .unwrap();
    assert_eq!(
        output.trim_end(),
        "/post/1999 -> #0 /post/{year}/{slug?} (post.show) year=1999"
    );
}

#[test]
fn test_serve_lines_skips_blank_input() {
    let (_dir, path) = manifest_dir();
    let shared = Arc::new(ArcSwap::from_pointee(load_registry(&path).unwrap()));
    let input = Cursor::new("/about\n\n   \n/post/abcd\n");
    let mut out = Vec::new();
    serve_lines(&shared, input, &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "/about -> #1 /about\n/post/abcd -> no route\n"
    );
}

//! Unit tests for CLI commands

use crate::cli::{execute, Cli, Commands};
use clap::Parser;
use std::io::Write;

const ROUTES: &str = r#"
[[route]]
name = "products.list"
template = "products"
methods = ["GET"]

[[route]]
name = "products.show"
template = "products/{id:int}"
methods = ["GET", "HEAD"]
route_name = "product"
handler = "show_product"

[[route]]
name = "products.update"
template = "products/{id:int}"
methods = ["PUT"]
"#;

fn routes_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(ROUTES.as_bytes()).unwrap();
    file
}

fn run(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(args)?;
    let mut out = Vec::new();
    execute(&cli, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn test_match_command_parses() {
    let cli = Cli::try_parse_from(["pathroute", "match", "--routes", "r.toml", "--method", "PUT", "/a/b"]).unwrap();
    match cli.command {
        Commands::Match { source, method, path } => {
            assert_eq!(source.routes.to_string_lossy(), "r.toml");
            assert!(!source.json);
            assert_eq!(method, "PUT");
            assert_eq!(path, "/a/b");
        }
        other => panic!("Expected Match command, got {other:?}"),
    }
}

#[test]
fn test_link_values_require_key_value() {
    assert!(Cli::try_parse_from(["pathroute", "link", "--routes", "r.toml", "id"]).is_err());
    let cli = Cli::try_parse_from(["pathroute", "link", "--routes", "r.toml", "id=4", "--ambient", "page=2"]).unwrap();
    match cli.command {
        Commands::Link { values, ambient, name, .. } => {
            assert_eq!(values, vec![("id".to_string(), "4".to_string())]);
            assert_eq!(ambient, vec![("page".to_string(), "2".to_string())]);
            assert!(name.is_none());
        }
        other => panic!("Expected Link command, got {other:?}"),
    }
}

#[test]
fn test_check_reports_endpoint_count() {
    let file = routes_file();
    let path = file.path().to_str().unwrap();
    let out = run(&["pathroute", "check", "--routes", path]).unwrap();
    assert!(out.starts_with("ok: 3 endpoints"));

    let out = run(&["pathroute", "check", "--routes", path, "--json"]).unwrap();
    let report: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(report["endpoints"], 3);
}

#[test]
fn test_routes_lists_in_table_order() {
    let file = routes_file();
    let out = run(&["pathroute", "routes", "--routes", file.path().to_str().unwrap(), "--json"]).unwrap();
    let routes: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    let names: Vec<&str> = routes
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["products.list", "products.show", "products.update"]);
}

#[test]
fn test_match_outcomes() {
    let file = routes_file();
    let path = file.path().to_str().unwrap();

    let out = run(&["pathroute", "match", "--routes", path, "--json", "/products/42"]).unwrap();
    let report: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(report["status"], "matched");
    assert_eq!(report["endpoint"], "products.show");
    assert_eq!(report["handler"], "show_product");
    assert_eq!(report["values"]["id"], "42");

    let out = run(&["pathroute", "match", "--routes", path, "--method", "DELETE", "/products/42"]).unwrap();
    assert_eq!(out.trim(), "405 Method Not Allowed (Allow: GET, HEAD, PUT)");

    let out = run(&["pathroute", "match", "--routes", path, "/products/abc"]).unwrap();
    assert_eq!(out.trim(), "404 Not Found");
}

#[test]
fn test_link_by_name() {
    let file = routes_file();
    let path = file.path().to_str().unwrap();
    let out = run(&["pathroute", "link", "--routes", path, "--name", "product", "id=7", "page=2"]).unwrap();
    assert_eq!(out.trim(), "/products/7?page=2");

    let err = run(&["pathroute", "link", "--routes", path, "--name", "product", "id=x"]).unwrap_err();
    assert!(err.to_string().contains("No endpoint"));
}

#[test]
fn test_broken_route_file_is_reported() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(b"[[route]]\nname = \"bad\"\ntemplate = \"{a}{b}\"\n").unwrap();
    let err = run(&["pathroute", "check", "--routes", file.path().to_str().unwrap()]).unwrap_err();
    assert!(format!("{err:#}").contains("bad"));
}

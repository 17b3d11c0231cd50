use crate::config::RouteFile;
use crate::policy::ParameterPolicyFactory;
use crate::router::RouteTable;
use crate::selector::{RequestContext, SelectionOutcome};
use crate::values::RouteValueDictionary;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Command-line interface for pathroute
///
/// Compiles a TOML route file and answers questions about it: does it
/// build, what does it contain, which endpoint serves a path, and what path
/// does a link resolve to.
#[derive(Parser, Debug)]
#[command(name = "pathroute")]
#[command(about = "Route template compiler and matcher", long_about = None, version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct RouteSource {
    /// Path to the TOML route file
    #[arg(short, long, env = "PATHROUTE_ROUTES")]
    pub routes: PathBuf,

    /// Print JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile the route file and report any error
    Check {
        #[command(flatten)]
        source: RouteSource,
    },
    /// List endpoints in table order
    Routes {
        #[command(flatten)]
        source: RouteSource,
    },
    /// Route a request path and print the selected endpoint
    Match {
        #[command(flatten)]
        source: RouteSource,

        /// HTTP method of the request
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request path, e.g. /products/42
        path: String,
    },
    /// Generate a path from route values
    Link {
        #[command(flatten)]
        source: RouteSource,

        /// Route name to generate for; without it the first endpoint whose
        /// required values agree is used
        #[arg(short, long)]
        name: Option<String>,

        /// Ambient values from the current request (key=value, repeatable)
        #[arg(long = "ambient", value_parser = parse_key_value)]
        ambient: Vec<(String, String)>,

        /// Explicit values (key=value)
        #[arg(value_parser = parse_key_value)]
        values: Vec<(String, String)>,
    },
}

impl Commands {
    fn source(&self) -> &RouteSource {
        match self {
            Commands::Check { source }
            | Commands::Routes { source }
            | Commands::Match { source, .. }
            | Commands::Link { source, .. } => source,
        }
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

/// Read, compile and return the route table described by `path`.
///
/// `PATHROUTE_*` environment overrides apply on top of the file's options.
///
/// # Errors
///
/// Read, parse and compile failures, with the file path as context.
pub fn load_route_table(path: &Path) -> anyhow::Result<RouteTable> {
    let file = RouteFile::load(path)?;
    let options = file.options.with_overrides(|key| env::var(key).ok());
    let factory = ParameterPolicyFactory::new(options.constraint_map());
    let endpoints = file
        .endpoints()
        .with_context(|| format!("Invalid route in {}", path.display()))?;
    RouteTable::build(endpoints, &options, &factory)
        .with_context(|| format!("Failed to compile routes from {}", path.display()))
}

/// Parse the process arguments and run the selected command against stdout.
///
/// # Errors
///
/// Returns an error if:
/// - The route file cannot be read, parsed or compiled
/// - A match is ambiguous
/// - A link cannot be generated
/// - Writing the output fails
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &mut out)
}

/// Run `cli`, writing results to `out`.
///
/// # Errors
///
/// See [`run_cli`].
pub fn execute(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let source = cli.command.source();
    let table = load_route_table(&source.routes)?;

    match &cli.command {
        Commands::Check { source } => {
            let counts: serde_json::Map<String, serde_json::Value> = table
                .dfa()
                .jump_table_counts()
                .into_iter()
                .map(|(kind, count)| (kind.to_string(), json!(count)))
                .collect();
            if source.json {
                let report = json!({
                    "endpoints": table.len(),
                    "dfa_states": table.dfa().states().len(),
                    "max_segments": table.max_segments(),
                    "jump_tables": counts,
                });
                writeln!(out, "{report}")?;
            } else {
                writeln!(
                    out,
                    "ok: {} endpoints, {} DFA states",
                    table.len(),
                    table.dfa().states().len()
                )?;
            }
        }
        Commands::Routes { source } => {
            if source.json {
                let routes: Vec<serde_json::Value> = table
                    .entries()
                    .iter()
                    .map(|entry| {
                        let endpoint = entry.endpoint();
                        json!({
                            "name": endpoint.display_name(),
                            "template": endpoint.pattern().raw_text(),
                            "order": endpoint.order(),
                            "score": entry.score(),
                            "methods": endpoint.metadata().http_methods.as_ref().map(|m| &m.methods),
                            "route_name": endpoint.metadata().route_name,
                            "handler": endpoint.handler(),
                        })
                    })
                    .collect();
                writeln!(out, "{}", serde_json::Value::Array(routes))?;
            } else {
                for entry in table.entries() {
                    let endpoint = entry.endpoint();
                    let methods = endpoint
                        .metadata()
                        .http_methods
                        .as_ref()
                        .map_or_else(|| "*".to_string(), |m| m.methods.join(","));
                    writeln!(
                        out,
                        "{:>3}  {:<12} /{:<40} {}",
                        entry.score(),
                        methods,
                        endpoint.pattern().raw_text().trim_start_matches('/'),
                        endpoint.display_name()
                    )?;
                }
            }
        }
        Commands::Match {
            source,
            method,
            path,
        } => {
            let ctx = RequestContext::new(method, path);
            let outcome = table
                .route_blocking(&ctx)
                .with_context(|| format!("{method} {path}"))?;
            write_outcome(out, &outcome, source.json)?;
        }
        Commands::Link {
            source,
            name,
            ambient,
            values,
        } => {
            let values: RouteValueDictionary = values.iter().cloned().collect();
            let ambient: RouteValueDictionary = ambient.iter().cloned().collect();
            let ambient = (!ambient.is_empty()).then_some(&ambient);
            let links = table.link_generator();
            let path = match name {
                Some(name) => links.get_path_by_name(name, &values, ambient),
                None => links.get_path_by_values(&values, ambient),
            }
            .ok_or_else(|| anyhow::anyhow!("No endpoint can generate a link for {values:?}"))?;
            if source.json {
                writeln!(out, "{}", json!({ "path": path }))?;
            } else {
                writeln!(out, "{path}")?;
            }
        }
    }
    Ok(())
}

fn write_outcome(out: &mut dyn Write, outcome: &SelectionOutcome, as_json: bool) -> anyhow::Result<()> {
    match outcome {
        SelectionOutcome::Matched(candidate) => {
            let endpoint = &candidate.endpoint;
            if as_json {
                let report = json!({
                    "status": "matched",
                    "endpoint": endpoint.display_name(),
                    "template": endpoint.pattern().raw_text(),
                    "handler": endpoint.handler(),
                    "values": candidate.values,
                });
                writeln!(out, "{report}")?;
            } else {
                writeln!(out, "{} ({})", endpoint.display_name(), endpoint.pattern().raw_text())?;
                for (key, value) in candidate.values.iter() {
                    writeln!(out, "  {key} = {value}")?;
                }
            }
        }
        SelectionOutcome::MethodNotAllowed { allowed } => {
            if as_json {
                writeln!(out, "{}", json!({ "status": "method_not_allowed", "allow": allowed }))?;
            } else {
                writeln!(out, "405 Method Not Allowed (Allow: {})", allowed.join(", "))?;
            }
        }
        SelectionOutcome::NoMatch => {
            if as_json {
                writeln!(out, "{}", json!({ "status": "no_match" }))?;
            } else {
                writeln!(out, "404 Not Found")?;
            }
        }
    }
    Ok(())
}

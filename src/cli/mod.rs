//! # CLI Module
//!
//! Command-line access to a route file: compile it, list its endpoints,
//! route a path through it and generate links from it.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Compile the route file and report table statistics:
//!
//! ```bash
//! pathroute check --routes routes.toml
//! ```
//!
//! ### `routes`
//!
//! List endpoints in table order with their score group:
//!
//! ```bash
//! pathroute routes --routes routes.toml --json
//! ```
//!
//! ### `match`
//!
//! Route a request and print the selected endpoint and its values, a 405
//! with the allowed methods, or a 404:
//!
//! ```bash
//! pathroute match --routes routes.toml --method PUT /products/42
//! ```
//!
//! ### `link`
//!
//! Generate a path by route name or by required values:
//!
//! ```bash
//! pathroute link --routes routes.toml --name product id=42 page=2
//! ```
//!
//! Every command accepts `--json`. `PATHROUTE_ROUTES` can stand in for
//! `--routes`. Logs go to stderr (see [`crate::logging`]), so stdout
//! carries only command output.
//!
//! ## Usage from Code
//!
//! ```rust,no_run
//! use pathroute::cli::{execute, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["pathroute", "check", "--routes", "routes.toml"]);
//! execute(&cli, &mut std::io::stdout()).unwrap();
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{execute, load_route_table, run_cli, Cli, Commands, RouteSource};

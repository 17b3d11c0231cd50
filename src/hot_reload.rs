//! # Hot Reload Module
//!
//! Watches a TOML route file and swaps a freshly compiled [`RouteTable`]
//! into a [`RouterHandle`] whenever the file changes.
//!
//! ## Overview
//!
//! On every modify or create event the watcher:
//! - Re-reads and parses the route file
//! - Applies `PATHROUTE_*` environment overrides to the file's options
//! - Compiles a new route table with the supplied policy factory
//! - Publishes it atomically and calls the reload hook
//!
//! A file that fails to read, parse or compile is logged and ignored; the
//! table already being served stays live.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pathroute::hot_reload::watch_routes;
//! use pathroute::policy::ParameterPolicyFactory;
//! use pathroute::router::{RouteTable, RouterHandle};
//! use pathroute::config::RouterOptions;
//! use std::sync::Arc;
//!
//! let factory = ParameterPolicyFactory::default();
//! let table = RouteTable::build(Vec::new(), &RouterOptions::default(), &factory).unwrap();
//! let handle = Arc::new(RouterHandle::new(table));
//!
//! let _watcher = watch_routes("routes.toml", Arc::clone(&handle), factory, |table| {
//!     println!("now serving {} endpoints", table.len());
//! })
//! .unwrap();
//! // Keep `_watcher` alive for as long as reloads should happen.
//! ```

use crate::config::RouteFile;
use crate::policy::ParameterPolicyFactory;
use crate::router::{RouteTable, RouterHandle};
use anyhow::Context;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Load `path`, compile it and publish the result through `handle`.
///
/// Returns the number of endpoints now being served.
///
/// # Errors
///
/// Read, parse and compile failures. The handle is left untouched.
pub fn reload_from_file(
    path: impl AsRef<Path>,
    handle: &RouterHandle,
    factory: &ParameterPolicyFactory,
) -> anyhow::Result<usize> {
    let path = path.as_ref();
    let file = RouteFile::load(path)?;
    let options = file.options.with_overrides(|key| env::var(key).ok());
    let endpoints = file
        .endpoints()
        .with_context(|| format!("Invalid route in {}", path.display()))?;
    let table = RouteTable::build(endpoints, &options, factory)
        .with_context(|| format!("Failed to compile routes from {}", path.display()))?;
    let count = table.len();
    handle.reload(table);
    Ok(count)
}

/// Watch `path` and reload `handle` whenever it changes.
///
/// `on_reload` runs after each successful swap with the table now being
/// served. The returned watcher must be kept alive; dropping it stops the
/// watch.
///
/// # Errors
///
/// Fails when the platform watcher cannot be created or `path` cannot be
/// watched.
pub fn watch_routes<P, F>(
    path: P,
    handle: Arc<RouterHandle>,
    factory: ParameterPolicyFactory,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&RouteTable) + Send + 'static,
{
    let path_buf: PathBuf = path.as_ref().to_path_buf();
    let watch_path = path_buf.clone();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    match reload_from_file(&path_buf, &handle, &factory) {
                        Ok(endpoints_count) => {
                            info!(
                                path = %path_buf.display(),
                                endpoints_count,
                                "Route file reloaded"
                            );
                            on_reload(&handle.load());
                        }
                        Err(err) => {
                            warn!(
                                path = %path_buf.display(),
                                error = %format!("{err:#}"),
                                "Route file reload failed, keeping current table"
                            );
                        }
                    }
                }
            }
            Err(err) => {
                warn!(path = %path_buf.display(), error = %err, "Route file watch error");
            }
        },
        Config::default(),
    )?;
    watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

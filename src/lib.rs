//! # pathroute
//!
//! **pathroute** compiles HTTP route templates such as
//! `products/{id:int}/{*rest}` into a DFA over path segments, selects one
//! endpoint per request, and turns route values back into URLs.
//!
//! ## Overview
//!
//! A host application hands pathroute a list of endpoints (a template,
//! optional HTTP methods, defaults, constraints and metadata). pathroute
//! builds an immutable [`RouteTable`](router::RouteTable) once; request
//! threads then share it without locking, and a
//! [`RouterHandle`](router::RouterHandle) swaps in a rebuilt table on reload.
//!
//! ## Architecture
//!
//! - **[`pattern`]** - Template parsing into segments, parts and precedence
//! - **[`policy`]** - Route constraints, parameter transformers and the token factory
//! - **[`matcher`]** - Path tokenizer, per-pattern matcher, jump tables and the DFA
//! - **[`endpoint`]** - Endpoints and their metadata
//! - **[`selector`]** - Endpoint selection with HTTP method and host constraints
//! - **[`binder`]** - Template binding and link generation
//! - **[`router`]** - The compiled route table and its swappable handle
//! - **[`config`]** - Router options and TOML route files
//! - **[`hot_reload`]** - Route file watching
//! - **[`logging`]** - Structured logging setup
//! - **[`cli`]** - The `pathroute` command-line tool
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Table as RouteTable
//!     participant Dfa as DFA
//!     participant Matcher as RoutePatternMatcher
//!     participant Selector as EndpointSelector
//!
//!     Host->>Table: route(GET /products/42)
//!     Table->>Table: tokenize into segment spans
//!     Table->>Dfa: find_candidates(path, spans)
//!     Dfa->>Dfa: jump table lookup per segment
//!     Dfa-->>Table: candidate endpoint indices
//!     loop each candidate
//!         Table->>Matcher: try_match(path)
//!         Matcher-->>Table: route values {id: "42"}
//!         Table->>Table: route constraints (int, min, ...)
//!     end
//!     Table->>Selector: select(ctx, candidates)
//!     Selector->>Selector: method / custom constraints by order
//!     Selector->>Selector: lowest score group
//!     Selector-->>Host: Matched | NoMatch | MethodNotAllowed
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pathroute::config::RouterOptions;
//! use pathroute::endpoint::Endpoint;
//! use pathroute::policy::ParameterPolicyFactory;
//! use pathroute::router::RouteTable;
//! use pathroute::selector::RequestContext;
//! use pathroute::values::RouteValueDictionary;
//!
//! let endpoints = vec![
//!     Endpoint::builder("show", "products/{id:int}")
//!         .methods(["GET"])
//!         .route_name("product")
//!         .build()
//!         .unwrap(),
//! ];
//! let table = RouteTable::build(endpoints, &RouterOptions::default(), &ParameterPolicyFactory::default()).unwrap();
//!
//! let outcome = table.route_blocking(&RequestContext::new("GET", "/products/42")).unwrap();
//! assert_eq!(outcome.matched().unwrap().values.get_str("id"), Some("42"));
//!
//! let values: RouteValueDictionary = [("id", "7")].into_iter().collect();
//! let link = table.link_generator().get_path_by_name("product", &values, None);
//! assert_eq!(link.as_deref(), Some("/products/7"));
//! ```

pub mod binder;
pub mod cli;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod hot_reload;
pub mod logging;
pub mod matcher;
pub mod pattern;
pub mod policy;
pub mod router;
pub mod selector;
pub mod text;
pub mod values;

pub use config::{RouteFile, RouterOptions};
pub use endpoint::{Endpoint, EndpointBuilder};
pub use error::{AmbiguousMatchError, ConstraintResolutionError, PatternError, RouteTableError};
pub use pattern::{parse, RoutePattern};
pub use router::{RouteTable, RouterHandle};
pub use selector::{RequestContext, SelectionOutcome};
pub use values::{RouteValue, RouteValueDictionary};

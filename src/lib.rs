//! Mark-based request routing.
//!
//! Routes are registered on a [`Collector`] as method and path pattern pairs. Patterns are literal
//! text with `{name}` or `{name:regex}` placeholders; a placeholder without an expression matches
//! one path segment (`[^/]+`).
//!
//! Routes without placeholders end up in exact-match tables. Routes with placeholders are compiled
//! into batches of alternatives, each batch being a single regular expression in which every
//! alternative is wrapped in its own capture group, its _mark_. Dispatching a path costs one table
//! lookup plus at most one expression match per batch.
//!
//! # Examples
//! ```
//! use mark_router::{Collector, DispatchResult, Dispatcher};
//!
//! let mut routes = Collector::new();
//! routes.get("/", "index").unwrap();
//! routes.get("/users/{id:\\d+}", "user").unwrap();
//! routes.post("/users", "create_user").unwrap();
//!
//! let dispatcher = Dispatcher::new(routes.finish());
//!
//! match dispatcher.dispatch("GET", "/users/42") {
//!     DispatchResult::Found { handler, params } => {
//!         assert_eq!(*handler, "user");
//!         assert_eq!(&params["id"], "42");
//!     }
//!     DispatchResult::NotFound => unreachable!(),
//!     DispatchResult::MethodNotAllowed { .. } => unreachable!(),
//! }
//!
//! assert!(matches!(
//!     dispatcher.dispatch("GET", "/users"),
//!     DispatchResult::MethodNotAllowed { .. }
//! ));
//! ```
//!
//! # Crate Features
//! - `unicode` (default): match with the [`regex`] crate; without it, `regex-lite` is used.
//! - `http` (default): accept [`http::Method`] and [`http::Uri`] and map results to status codes.
//!
//! [`regex`]: https://docs.rs/regex

#![deny(rust_2018_idioms, nonstandard_style)]
#![warn(missing_debug_implementations)]

mod collector;
mod compiler;
mod config;
mod de;
mod dispatcher;
mod engine;
mod error;
mod generator;
mod methods;
mod params;
mod parser;

pub use self::collector::{Collector, RouteMap};
pub use self::compiler::{compile, RoutingChunk};
pub use self::config::{RouterConfig, DEFAULT_MAX_GROUPS_PER_BATCH};
pub use self::de::ParamsDeserializer;
pub use self::dispatcher::{DispatchResult, Dispatcher};
pub use self::error::{ParseError, RouteError, UrlGenerationError};
pub use self::generator::{MarkBasedDataGenerator, RouteId, StaticRouteMap, VariableRouteBatch};
pub use self::methods::{IntoMethods, Methods};
pub use self::params::Params;
pub use self::parser::{parse, Placeholder, Segment, DEFAULT_PLACEHOLDER_EXPR};

/// Types a request path can be read from.
pub trait ResourcePath {
    fn path(&self) -> &str;
}

impl ResourcePath for str {
    fn path(&self) -> &str {
        self
    }
}

impl ResourcePath for String {
    fn path(&self) -> &str {
        self.as_str()
    }
}

impl<'a> ResourcePath for &'a str {
    fn path(&self) -> &str {
        self
    }
}

impl ResourcePath for bytestring::ByteString {
    fn path(&self) -> &str {
        self
    }
}

/// Only the path component is routed; the query string is ignored.
#[cfg(feature = "http")]
impl ResourcePath for http::Uri {
    fn path(&self) -> &str {
        http::Uri::path(self)
    }
}

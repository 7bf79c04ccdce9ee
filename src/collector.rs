use std::{
    borrow::Borrow,
    collections::HashMap,
    hash::{BuildHasher, Hash},
};

use tracing::debug;

use crate::{
    compiler::{compile, RoutingChunk},
    config::RouterConfig,
    error::{RouteError, UrlGenerationError},
    generator::{MarkBasedDataGenerator, RouteId, StaticRouteMap, VariableRouteBatch},
    methods::IntoMethods,
    parser::parse,
};

/// Route registration surface.
///
/// Patterns are parsed and compiled as they are added; static routes land in exact-match tables
/// and variable routes in mark-based batches. Once all routes are registered, [`finish`] hands out
/// the immutable [`RouteMap`] that a [`Dispatcher`](crate::Dispatcher) serves from.
///
/// The handler type `T` is opaque; the collector only stores it.
///
/// # Examples
/// ```
/// use mark_router::{Collector, DispatchResult, Dispatcher};
///
/// let mut routes = Collector::new();
/// routes.get("/", "index").unwrap();
/// routes.add_route(["GET", "POST"], "/users/{id}", "user").unwrap();
///
/// let dispatcher = Dispatcher::new(routes.finish());
///
/// match dispatcher.dispatch("POST", "/users/42") {
///     DispatchResult::Found { handler, params } => {
///         assert_eq!(*handler, "user");
///         assert_eq!(params.get("id"), Some("42"));
///     }
///     _ => unreachable!(),
/// }
/// ```
///
/// [`finish`]: Collector::finish
#[derive(Debug)]
pub struct Collector<T> {
    config: RouterConfig,
    generator: MarkBasedDataGenerator,
    handlers: Vec<T>,
    named: HashMap<String, NamedRoute>,

    /// Pattern prefix of the groups currently being registered.
    prefix: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NamedRoute {
    chunk: RoutingChunk,
    route: RouteId,
}

impl<T> Default for Collector<T> {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! method_route {
    ($(#[$meta:meta])* $name:ident, $method:literal) => {
        $(#[$meta])*
        pub fn $name(&mut self, pattern: &str, handler: T) -> Result<RouteId, RouteError> {
            self.add_route($method, pattern, handler)
        }
    };
}

impl<T> Collector<T> {
    /// Constructs an empty collector with default configuration.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Constructs an empty collector with the given configuration.
    pub fn with_config(config: RouterConfig) -> Self {
        let config = config.sanitized();

        Self {
            generator: MarkBasedDataGenerator::new(config.groups_per_batch()),
            config,
            handlers: Vec::new(),
            named: HashMap::new(),
            prefix: String::new(),
        }
    }

    /// Registers `handler` for `pattern` under one or more methods.
    ///
    /// Errors leave the collector unchanged.
    pub fn add_route(
        &mut self,
        methods: impl IntoMethods,
        pattern: &str,
        handler: T,
    ) -> Result<RouteId, RouteError> {
        self.register(methods, pattern, handler).map(|(id, _)| id)
    }

    /// Registers `handler` like [`add_route`](Self::add_route) and records the route under
    /// `name` for path generation.
    pub fn add_named_route(
        &mut self,
        methods: impl IntoMethods,
        pattern: &str,
        handler: T,
        name: impl Into<String>,
    ) -> Result<RouteId, RouteError> {
        let name = name.into();

        if self.named.contains_key(&name) {
            return Err(RouteError::DuplicateName { name });
        }

        let (route, chunk) = self.register(methods, pattern, handler)?;
        self.named.insert(name, NamedRoute { chunk, route });

        Ok(route)
    }

    method_route!(
        /// Registers a `GET` route.
        get, "GET"
    );
    method_route!(
        /// Registers a `POST` route.
        post, "POST"
    );
    method_route!(
        /// Registers a `PUT` route.
        put, "PUT"
    );
    method_route!(
        /// Registers a `PATCH` route.
        patch, "PATCH"
    );
    method_route!(
        /// Registers a `DELETE` route.
        delete, "DELETE"
    );
    method_route!(
        /// Registers a `HEAD` route.
        head, "HEAD"
    );
    method_route!(
        /// Registers an `OPTIONS` route.
        options, "OPTIONS"
    );

    /// Registers the routes added by `f` under a common pattern prefix.
    ///
    /// Groups nest; the prefix is removed again even if `f` fails.
    ///
    /// # Examples
    /// ```
    /// use mark_router::{Collector, Dispatcher};
    ///
    /// let mut routes = Collector::new();
    /// routes
    ///     .group("/admin", |admin| {
    ///         admin.get("/users", "list_users")?;
    ///         admin.get("/users/{id}", "show_user")?;
    ///         Ok(())
    ///     })
    ///     .unwrap();
    ///
    /// let dispatcher = Dispatcher::new(routes.finish());
    /// assert!(dispatcher.dispatch("GET", "/admin/users/1").is_found());
    /// assert!(!dispatcher.dispatch("GET", "/users/1").is_found());
    /// ```
    pub fn group<F>(&mut self, prefix: &str, f: F) -> Result<(), RouteError>
    where
        F: FnOnce(&mut Self) -> Result<(), RouteError>,
    {
        let outer = self.prefix.len();
        self.prefix.push_str(prefix);

        let res = f(self);

        self.prefix.truncate(outer);
        res
    }

    /// Returns the static route tables registered so far.
    pub fn static_route_map(&self) -> &StaticRouteMap {
        self.generator.static_route_map()
    }

    /// Returns the variable route batches registered so far.
    pub fn variable_route_map(&self) -> &[VariableRouteBatch] {
        self.generator.variable_route_map()
    }

    /// Finish registration and create the route map.
    pub fn finish(self) -> RouteMap<T> {
        let (static_routes, batches) = self.generator.into_parts();

        debug!(
            routes = self.handlers.len(),
            batches = batches.len(),
            "Finished route collection"
        );

        RouteMap {
            handlers: self.handlers,
            static_routes,
            batches,
            named: self.named,
            config: self.config,
        }
    }

    fn register(
        &mut self,
        methods: impl IntoMethods,
        pattern: &str,
        handler: T,
    ) -> Result<(RouteId, RoutingChunk), RouteError> {
        let full;
        let pattern = if self.prefix.is_empty() {
            pattern
        } else {
            full = format!("{}{}", self.prefix, pattern);
            full.as_str()
        };

        let methods = methods.methods();
        if methods.is_empty() {
            return Err(RouteError::NoMethods {
                pattern: pattern.to_owned(),
            });
        }

        let chunk = compile(parse(pattern)?);
        let route = RouteId(self.handlers.len());

        if chunk.is_static() {
            self.generator.add_static_route(&methods, &chunk, route)?;
        } else {
            self.generator.add_variable_route(&methods, &chunk, route)?;
        }

        self.handlers.push(handler);

        Ok((route, chunk))
    }
}

/// Immutable routing data produced by a [`Collector`].
#[derive(Debug, Clone)]
pub struct RouteMap<T> {
    pub(crate) handlers: Vec<T>,
    pub(crate) static_routes: StaticRouteMap,
    pub(crate) batches: Vec<VariableRouteBatch>,
    named: HashMap<String, NamedRoute>,
    pub(crate) config: RouterConfig,
}

impl<T> RouteMap<T> {
    /// Returns the handler of a registered route.
    pub fn handler(&self, route: RouteId) -> Option<&T> {
        self.handlers.get(route.0)
    }

    /// Returns number of registered routes.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no routes were registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the configuration the routes were collected with.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Returns the static route tables.
    pub fn static_route_map(&self) -> &StaticRouteMap {
        &self.static_routes
    }

    /// Returns the variable route batches in registration order.
    pub fn variable_route_map(&self) -> &[VariableRouteBatch] {
        &self.batches
    }

    /// Returns the route registered under `name`.
    pub fn named(&self, name: &str) -> Option<RouteId> {
        self.named.get(name).map(|named| named.route)
    }

    /// Generates the path of a named route from a map of placeholder values.
    ///
    /// # Examples
    /// ```
    /// # use std::collections::HashMap;
    /// use mark_router::Collector;
    ///
    /// let mut routes = Collector::new();
    /// routes
    ///     .add_named_route("GET", "/user/{id}/post/{title}", (), "post")
    ///     .unwrap();
    /// let routes = routes.finish();
    ///
    /// let mut map = HashMap::new();
    /// map.insert("id", "123");
    /// map.insert("title", "my-post");
    ///
    /// assert_eq!(routes.url_for("post", &map).unwrap(), "/user/123/post/my-post");
    /// ```
    pub fn url_for<K, V, S>(
        &self,
        name: &str,
        values: &HashMap<K, V, S>,
    ) -> Result<String, UrlGenerationError>
    where
        K: Borrow<str> + Eq + Hash,
        V: AsRef<str>,
        S: BuildHasher,
    {
        self.build_path(name, |placeholder| values.get(placeholder))
    }

    /// Generates the path of a named route from placeholder values in pattern order.
    ///
    /// # Examples
    /// ```
    /// use mark_router::Collector;
    ///
    /// let mut routes = Collector::new();
    /// routes
    ///     .add_named_route("GET", "/user/{id}/post/{title}", (), "post")
    ///     .unwrap();
    /// let routes = routes.finish();
    ///
    /// assert_eq!(
    ///     routes.url_for_iter("post", ["123", "my-post"]).unwrap(),
    ///     "/user/123/post/my-post"
    /// );
    /// assert!(routes.url_for_iter("post", ["123"]).is_err());
    /// ```
    pub fn url_for_iter<I>(&self, name: &str, values: I) -> Result<String, UrlGenerationError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut iter = values.into_iter();
        self.build_path(name, |_| iter.next())
    }

    fn build_path<F, I>(&self, name: &str, vars: F) -> Result<String, UrlGenerationError>
    where
        F: FnMut(&str) -> Option<I>,
        I: AsRef<str>,
    {
        let named = self
            .named
            .get(name)
            .ok_or_else(|| UrlGenerationError::RouteNotFound {
                name: name.to_owned(),
            })?;

        let mut path = String::new();
        named
            .chunk
            .build_path(&mut path, vars)
            .map_err(|placeholder| UrlGenerationError::MissingParameter {
                placeholder: placeholder.to_owned(),
            })?;

        Ok(path)
    }
}

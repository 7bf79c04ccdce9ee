use std::collections::BTreeSet;

use tracing::trace;

use crate::{
    collector::RouteMap,
    engine::Captures,
    generator::{MarkedRoute, RouteId},
    params::Params,
    ResourcePath,
};

/// Outcome of dispatching a method and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult<'a, T> {
    /// A route matched the path and is registered for the method.
    Found {
        handler: &'a T,
        params: Params<'a>,
    },

    /// No route matches the path under any method.
    NotFound,

    /// Routes match the path, but none under the requested method.
    MethodNotAllowed { allowed: BTreeSet<&'a str> },
}

impl<'a, T> DispatchResult<'a, T> {
    /// Returns `true` if a handler was found.
    pub fn is_found(&self) -> bool {
        matches!(self, DispatchResult::Found { .. })
    }

    /// Returns the matched handler.
    pub fn handler(&self) -> Option<&'a T> {
        match self {
            DispatchResult::Found { handler, .. } => Some(*handler),
            _ => None,
        }
    }

    /// Returns the captured placeholder values of a match.
    pub fn params(&self) -> Option<&Params<'a>> {
        match self {
            DispatchResult::Found { params, .. } => Some(params),
            _ => None,
        }
    }

    /// Returns the methods the path is registered for, if dispatch failed on the method alone.
    pub fn allowed_methods(&self) -> Option<&BTreeSet<&'a str>> {
        match self {
            DispatchResult::MethodNotAllowed { allowed } => Some(allowed),
            _ => None,
        }
    }
}

#[cfg(feature = "http")]
impl<'a, T> DispatchResult<'a, T> {
    /// Returns the status code a server would answer this result with.
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            DispatchResult::Found { .. } => http::StatusCode::OK,
            DispatchResult::NotFound => http::StatusCode::NOT_FOUND,
            DispatchResult::MethodNotAllowed { .. } => http::StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Returns the value of the `Allow` header for a method-not-allowed result.
    ///
    /// `None` for other results, or when a registered method is not a valid header value.
    pub fn allow_header(&self) -> Option<http::HeaderValue> {
        let allowed = self.allowed_methods()?;
        let value = allowed.iter().copied().collect::<Vec<_>>().join(", ");
        http::HeaderValue::from_str(&value).ok()
    }
}

/// Matches requests against a [`RouteMap`].
///
/// Static routes are consulted first with a single table lookup. Variable routes are then tried
/// batch by batch in registration order; one expression match per batch selects the route through
/// its mark.
///
/// # Examples
/// ```
/// use mark_router::{Collector, DispatchResult, Dispatcher};
///
/// let mut routes = Collector::new();
/// routes.get("/users", "list").unwrap();
/// routes.add_route(["GET", "POST"], "/users/{id}", "user").unwrap();
/// let dispatcher = Dispatcher::new(routes.finish());
///
/// assert_eq!(dispatcher.dispatch("GET", "/users").handler(), Some(&"list"));
/// assert_eq!(dispatcher.dispatch("GET", "/teams"), DispatchResult::NotFound);
///
/// let res = dispatcher.dispatch("DELETE", "/users/42");
/// assert_eq!(
///     res.allowed_methods().unwrap().iter().copied().collect::<Vec<_>>(),
///     vec!["GET", "POST"]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    routes: RouteMap<T>,
}

impl<T> Dispatcher<T> {
    pub fn new(routes: RouteMap<T>) -> Self {
        Self { routes }
    }

    /// Returns the route map being served.
    pub fn routes(&self) -> &RouteMap<T> {
        &self.routes
    }

    /// Finds the handler for `method` and `path`.
    ///
    /// Paths are matched as given; no decoding or normalization is applied. When the router is
    /// configured to, a `HEAD` request with no `HEAD` route is served by the `GET` route.
    pub fn dispatch<'a, M, R>(&'a self, method: M, path: &'a R) -> DispatchResult<'a, T>
    where
        M: AsRef<str>,
        R: ResourcePath + ?Sized,
    {
        let method = method.as_ref();
        let path = path.path();
        let routes = &self.routes;

        if let Some(&route) = routes.static_routes.get(method).and_then(|t| t.get(path)) {
            return self.found(route, Params::new());
        }

        let mut lookup = Lookup {
            method,
            fallback: (method == "HEAD" && routes.config.falls_back_to_get()).then_some("GET"),
            candidate: None,
            allowed: BTreeSet::new(),
        };

        if let Some(fallback) = lookup.fallback {
            lookup.candidate = routes
                .static_routes
                .get(fallback)
                .and_then(|table| table.get(path))
                .map(|&route| (route, Params::new()));
        }

        for batch in &routes.batches {
            let caps = match batch.captures(path) {
                Some(caps) => caps,
                None => continue,
            };

            let mark = match batch.mark_of(&caps) {
                Some(mark) => mark,
                None => continue,
            };
            let marks = batch.routes();
            let marked = &marks[mark];

            if let Some(hit) = lookup.visit(marked, &caps, marked.group) {
                return self.found(hit.0, hit.1);
            }

            // the combined expression stops at the first alternative; later ones in this
            // batch may still match the path
            for marked in &marks[mark + 1..] {
                if let Some(caps) = marked.regex.captures(path) {
                    if let Some(hit) = lookup.visit(marked, &caps, 0) {
                        return self.found(hit.0, hit.1);
                    }
                }
            }
        }

        if let Some((route, params)) = lookup.candidate {
            return self.found(route, params);
        }

        let mut allowed = lookup.allowed;
        for (registered, table) in &routes.static_routes {
            if table.contains_key(path) {
                allowed.insert(registered.as_str());
            }
        }

        if allowed.is_empty() {
            DispatchResult::NotFound
        } else {
            trace!(method, path, ?allowed, "Path matched under other methods");
            DispatchResult::MethodNotAllowed { allowed }
        }
    }

    fn found<'a>(&'a self, route: RouteId, params: Params<'a>) -> DispatchResult<'a, T> {
        match self.routes.handler(route) {
            Some(handler) => DispatchResult::Found { handler, params },
            None => DispatchResult::NotFound,
        }
    }
}

/// State of one dispatch across the variable routes.
struct Lookup<'m, 'a> {
    method: &'m str,

    /// Method whose routes serve the request when none matches `method`.
    fallback: Option<&'static str>,

    /// First match under the fallback method.
    candidate: Option<(RouteId, Params<'a>)>,

    /// Methods of every matching route seen so far.
    allowed: BTreeSet<&'a str>,
}

impl<'m, 'a> Lookup<'m, 'a> {
    /// Records a route that matched the path; returns it if it serves the requested method.
    fn visit(
        &mut self,
        marked: &'a MarkedRoute,
        caps: &Captures<'a>,
        offset: usize,
    ) -> Option<(RouteId, Params<'a>)> {
        if marked.accepts(self.method) {
            return Some((marked.route, marked.params(caps, offset)));
        }

        self.allowed.extend(marked.methods());

        if self.candidate.is_none() && self.fallback.map_or(false, |m| marked.accepts(m)) {
            self.candidate = Some((marked.route, marked.params(caps, offset)));
        }

        None
    }
}

//! Mark-based route data generation.
//!
//! Static routes go into exact-match tables keyed by method then path. Variable routes are
//! grouped into batches, each compiled into a single expression of the form
//! `^(?:(chunk0)|(chunk1)|...)$`. The outer group around each chunk is its _mark_: after a
//! successful match, the first outer group that participated tells which chunk fired.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    compiler::RoutingChunk,
    engine::{self, Captures, Regex},
    error::RouteError,
    methods::Methods,
    params::Params,
};

/// Identifies a registered route; an index into the route map's handler table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub usize);

/// Exact-match tables for static routes: method, then literal path.
pub type StaticRouteMap = HashMap<String, HashMap<String, RouteId>>;

/// Group of variable routes compiled into one combined expression.
#[derive(Debug, Clone)]
pub struct VariableRouteBatch {
    regex: Regex,
    routes: Vec<MarkedRoute>,
}

/// One alternative of a batch.
#[derive(Debug, Clone)]
pub(crate) struct MarkedRoute {
    /// Index of the outer capture group wrapping this chunk in the batch expression.
    pub(crate) group: usize,

    /// Capture group of each placeholder, relative to the chunk.
    pub(crate) params: Vec<usize>,

    /// The chunk on its own, anchored. Group indices equal the relative ones above.
    pub(crate) regex: Regex,

    pub(crate) pattern: String,
    pub(crate) route: RouteId,
    pub(crate) methods: Vec<String>,

    /// Placeholder names in pattern order.
    pub(crate) names: Vec<String>,
}

impl VariableRouteBatch {
    /// Returns the combined expression source.
    pub fn regex(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns number of marks (alternatives) in this batch.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if the batch holds no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates over the route patterns of this batch in mark order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|route| route.pattern.as_str())
    }

    pub(crate) fn captures<'h>(&self, path: &'h str) -> Option<Captures<'h>> {
        self.regex.captures(path)
    }

    pub(crate) fn routes(&self) -> &[MarkedRoute] {
        &self.routes
    }

    /// Recovers the mark of the alternative that produced `caps`.
    ///
    /// The mark is the position of the first route whose outer group took part in the match.
    /// Participation is checked rather than non-emptiness since an alternative can legitimately
    /// match an empty path.
    pub(crate) fn mark_of(&self, caps: &Captures<'_>) -> Option<usize> {
        self.routes
            .iter()
            .position(|route| caps.get(route.group).is_some())
    }
}

impl MarkedRoute {
    /// Returns `true` if this route was registered for `method`.
    pub(crate) fn accepts(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    /// Returns all methods this route was registered for.
    pub(crate) fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(String::as_str)
    }

    /// Zips placeholder names with captured values.
    ///
    /// `offset` is the index of the group preceding this chunk's first group: the mark group for a
    /// batch match, `0` for a match of the chunk's own expression.
    pub(crate) fn params<'a>(&'a self, caps: &Captures<'a>, offset: usize) -> Params<'a> {
        let mut params = Params::with_capacity(self.names.len());

        for (name, group) in self.names.iter().zip(&self.params) {
            if let Some(m) = caps.get(offset + group) {
                params.push(name, m.as_str());
            }
        }

        params
    }
}

/// Accumulates compiled routes into static tables and mark-based variable batches.
#[derive(Debug, Clone)]
pub struct MarkBasedDataGenerator {
    max_groups: usize,
    static_routes: StaticRouteMap,
    batches: Vec<VariableRouteBatch>,

    /// Alternatives of the batch under construction, which is always the last of `batches`.
    open: Vec<String>,
    open_groups: usize,

    /// Methods registered so far per variable route expression.
    taken: HashMap<String, Vec<String>>,
}

impl MarkBasedDataGenerator {
    /// Constructs an empty generator with the given capture group ceiling per batch.
    pub fn new(max_groups_per_batch: usize) -> Self {
        Self {
            max_groups: max_groups_per_batch,
            static_routes: HashMap::new(),
            batches: Vec::new(),
            open: Vec::new(),
            open_groups: 0,
            taken: HashMap::new(),
        }
    }

    /// Adds a route without placeholders to the static tables of each method.
    ///
    /// Nothing is inserted if any of the methods already has a route for this path. Variable
    /// chunks are forwarded to [`add_variable_route`](Self::add_variable_route).
    pub fn add_static_route(
        &mut self,
        methods: &Methods,
        chunk: &RoutingChunk,
        route: RouteId,
    ) -> Result<(), RouteError> {
        let path = match chunk.static_path() {
            Some(path) => path,
            None => return self.add_variable_route(methods, chunk, route),
        };

        for method in methods.iter() {
            let taken = self
                .static_routes
                .get(method)
                .map_or(false, |table| table.contains_key(&path));

            if taken {
                return Err(RouteError::DuplicateRoute {
                    method: method.to_owned(),
                    pattern: path,
                });
            }
        }

        for method in methods.iter() {
            self.static_routes
                .entry(method.to_owned())
                .or_default()
                .insert(path.clone(), route);
        }

        debug!(path = %path, route = route.0, "Added static route");

        Ok(())
    }

    /// Adds a route with placeholders to the batch under construction.
    ///
    /// Every route gets a mark of its own, also when its expression equals one registered before
    /// under other methods. When the route's groups (one per placeholder plus its mark) would push
    /// the open batch over the ceiling, the open batch is closed and the route starts a new one.
    /// Nothing changes if the route is rejected.
    pub fn add_variable_route(
        &mut self,
        methods: &Methods,
        chunk: &RoutingChunk,
        route: RouteId,
    ) -> Result<(), RouteError> {
        for method in methods.iter() {
            if self.is_taken(chunk.regex(), method) {
                return Err(RouteError::DuplicateRoute {
                    method: method.to_owned(),
                    pattern: chunk.pattern(),
                });
            }
        }

        let cost = chunk.group_count() + 1;
        let fresh = self.open.is_empty() || self.open_groups + cost > self.max_groups;

        if cost > self.max_groups {
            warn!(
                pattern = %chunk,
                groups = cost,
                max_groups = self.max_groups,
                "Variable route exceeds the per-batch group ceiling; it will be batched alone"
            );
        }

        let compile_err = |reason| RouteError::Compile {
            pattern: chunk.pattern(),
            reason,
        };

        let alternative = format!("({})", chunk.regex());
        let standalone = engine::anchored(chunk.regex()).map_err(compile_err)?;
        let combined = if fresh {
            engine::anchored(&alternative)
        } else {
            engine::anchored(&format!("{}|{}", self.open.join("|"), alternative))
        }
        .map_err(compile_err)?;

        if fresh && !self.open.is_empty() {
            self.close_batch();
        }

        let marked = MarkedRoute {
            group: self.open_groups + 1,
            params: chunk.param_groups().to_vec(),
            regex: standalone,
            pattern: chunk.pattern(),
            route,
            methods: methods.iter().map(ToOwned::to_owned).collect(),
            names: chunk.param_names().map(ToOwned::to_owned).collect(),
        };

        self.open.push(alternative);
        self.open_groups += cost;

        if fresh {
            self.batches.push(VariableRouteBatch {
                regex: combined,
                routes: vec![marked],
            });
        } else if let Some(batch) = self.batches.last_mut() {
            batch.regex = combined;
            batch.routes.push(marked);
        }

        self.taken
            .entry(chunk.regex().to_owned())
            .or_default()
            .extend(methods.iter().map(ToOwned::to_owned));

        debug!(
            pattern = %chunk,
            batch = self.batches.len() - 1,
            mark = self.open.len() - 1,
            route = route.0,
            "Added variable route"
        );

        Ok(())
    }

    fn is_taken(&self, regex: &str, method: &str) -> bool {
        self.taken
            .get(regex)
            .map_or(false, |methods| methods.iter().any(|m| m == method))
    }

    /// Freezes the batch under construction; the next variable route opens a new one.
    fn close_batch(&mut self) {
        debug!(
            batch = self.batches.len() - 1,
            routes = self.open.len(),
            groups = self.open_groups,
            "Closed variable route batch"
        );

        self.open.clear();
        self.open_groups = 0;
    }

    /// Returns the static route tables.
    pub fn static_route_map(&self) -> &StaticRouteMap {
        &self.static_routes
    }

    /// Returns the variable route batches in registration order.
    pub fn variable_route_map(&self) -> &[VariableRouteBatch] {
        &self.batches
    }

    pub(crate) fn into_parts(self) -> (StaticRouteMap, Vec<VariableRouteBatch>) {
        (self.static_routes, self.batches)
    }
}

use serde::Deserialize;

/// Default ceiling on capture groups compiled into one variable route batch.
pub const DEFAULT_MAX_GROUPS_PER_BATCH: usize = 32;

/// Route collection and dispatch options.
///
/// Can be deserialized from an application's configuration; missing fields take their default
/// values.
///
/// # Examples
/// ```
/// use mark_router::RouterConfig;
///
/// let config = RouterConfig::default()
///     .max_groups_per_batch(16)
///     .head_fallback(false);
///
/// assert_eq!(config.groups_per_batch(), 16);
/// assert!(!config.falls_back_to_get());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    max_groups_per_batch: usize,
    head_fallback: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_groups_per_batch: DEFAULT_MAX_GROUPS_PER_BATCH,
            head_fallback: true,
        }
    }
}

impl RouterConfig {
    /// Sets the ceiling on capture groups per combined variable route expression.
    ///
    /// Every variable route costs one group for its mark plus one per placeholder.
    ///
    /// # Panics
    /// Panics if `max` is less than 2, the cost of the smallest variable route.
    pub fn max_groups_per_batch(mut self, max: usize) -> Self {
        assert!(max >= 2, "batch ceiling must fit at least one variable route");
        self.max_groups_per_batch = max;
        self
    }

    /// Sets whether `HEAD` requests fall back to `GET` routes when no `HEAD` route matches.
    pub fn head_fallback(mut self, enabled: bool) -> Self {
        self.head_fallback = enabled;
        self
    }

    /// Returns the capture group ceiling per batch.
    pub fn groups_per_batch(&self) -> usize {
        self.max_groups_per_batch
    }

    /// Returns `true` if `HEAD` requests fall back to `GET` routes.
    pub fn falls_back_to_get(&self) -> bool {
        self.head_fallback
    }

    /// Clamps values that may have arrived through deserialization without the setter checks.
    pub(crate) fn sanitized(mut self) -> Self {
        if self.max_groups_per_batch < 2 {
            tracing::warn!(
                max_groups_per_batch = self.max_groups_per_batch,
                "Batch ceiling is too small to fit a variable route, using 2"
            );
            self.max_groups_per_batch = 2;
        }

        self
    }
}

use std::ops::Index;

use serde::{de, Deserialize};

use crate::de::ParamsDeserializer;

/// Placeholder values captured from a dispatched path.
///
/// Names borrow from the route map and values borrow from the dispatched path, so building a
/// `Params` never copies string data. Entries keep the order placeholders appear in the pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params<'a> {
    items: Vec<(&'a str, &'a str)>,
}

impl<'a> Params<'a> {
    /// Constructs an empty parameter list.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: &'a str, value: &'a str) {
        self.items.push((name, value));
    }

    /// Returns the value captured for placeholder `name`.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.items
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    /// Returns number of captured values.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing was captured.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[(&'a str, &'a str)] {
        &self.items
    }

    /// Returns an iterator over `(name, value)` pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.items.iter().copied()
    }

    /// Deserializes the captured values into a user type.
    ///
    /// Structs and maps are filled by name, tuples and sequences by position, and plain values
    /// from the single captured value.
    ///
    /// # Examples
    /// ```
    /// use mark_router::{Collector, DispatchResult, Dispatcher};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Post {
    ///     user: String,
    ///     id: u32,
    /// }
    ///
    /// let mut routes = Collector::new();
    /// routes.get(r"/{user}/posts/{id:\d+}", "show_post").unwrap();
    /// let dispatcher = Dispatcher::new(routes.finish());
    ///
    /// match dispatcher.dispatch("GET", "/ferris/posts/42") {
    ///     DispatchResult::Found { params, .. } => {
    ///         let post: Post = params.load().unwrap();
    ///         assert_eq!(post.user, "ferris");
    ///         assert_eq!(post.id, 42);
    ///     }
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn load<D>(&self) -> Result<D, de::value::Error>
    where
        D: Deserialize<'a>,
    {
        D::deserialize(ParamsDeserializer::new(self))
    }
}

impl<'a, 'b> Index<&'b str> for Params<'a> {
    type Output = str;

    fn index(&self, name: &'b str) -> &str {
        self.get(name).expect("value for parameter is not available")
    }
}

impl<'a> Index<usize> for Params<'a> {
    type Output = str;

    fn index(&self, idx: usize) -> &str {
        self.items[idx].1
    }
}

impl<'a> IntoIterator for Params<'a> {
    type Item = (&'a str, &'a str);
    type IntoIter = std::vec::IntoIter<(&'a str, &'a str)>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params<'a>(items: &[(&'a str, &'a str)]) -> Params<'a> {
        let mut params = Params::new();
        for &(name, value) in items {
            params.push(name, value);
        }
        params
    }

    #[test]
    fn lookup() {
        let p = params(&[("user", "ferris"), ("id", "42")]);

        assert_eq!(p.len(), 2);
        assert!(!p.is_empty());
        assert_eq!(p.get("user"), Some("ferris"));
        assert_eq!(p.get("missing"), None);
        assert_eq!(&p["id"], "42");
        assert_eq!(&p[0], "ferris");
        assert_eq!(
            p.iter().collect::<Vec<_>>(),
            vec![("user", "ferris"), ("id", "42")]
        );
    }

    #[test]
    #[should_panic]
    fn index_missing() {
        let p = Params::new();
        let _ = &p["id"];
    }

    #[test]
    fn empty() {
        let p = Params::with_capacity(4);
        assert!(p.is_empty());
        assert_eq!(p, Params::default());
    }
}

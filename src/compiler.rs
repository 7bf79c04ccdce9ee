use std::fmt;

use crate::{engine::escape, parser::Segment};

/// A compiled route pattern.
///
/// Holds the parsed segments together with the regex body they compile to. The body is neither
/// anchored nor flagged so that it can be embedded as one alternative of a larger expression.
/// Capture group indices are relative to the chunk: the first group opened by the body is `1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingChunk {
    segments: Vec<Segment>,
    regex: String,
    params: Vec<usize>,
    group_count: usize,
}

/// Compiles parsed segments into a routing chunk.
///
/// Literal text is escaped and each placeholder becomes one capturing group around its
/// expression. Segments are expected to come from [`parse`](crate::parse) and are not validated
/// again.
///
/// # Examples
/// ```
/// use mark_router::{compile, parse};
///
/// let chunk = compile(parse(r"/user/{id:\d+}.json").unwrap());
/// assert_eq!(chunk.regex(), r"/user/(\d+)\.json");
/// assert_eq!(chunk.group_count(), 1);
/// assert!(!chunk.is_static());
///
/// let chunk = compile(parse("/about").unwrap());
/// assert_eq!(chunk.static_path().as_deref(), Some("/about"));
/// ```
pub fn compile(segments: Vec<Segment>) -> RoutingChunk {
    let mut regex = String::new();
    let mut params = Vec::new();
    let mut group_count = 0;

    for segment in &segments {
        match segment {
            Segment::Literal(text) => regex.push_str(&escape(text)),
            Segment::Placeholder(placeholder) => {
                group_count += 1;
                params.push(group_count);
                group_count += placeholder.nested_groups();

                regex.push('(');
                regex.push_str(placeholder.expr());
                regex.push(')');
            }
        }
    }

    RoutingChunk {
        segments,
        regex,
        params,
        group_count,
    }
}

impl RoutingChunk {
    /// Returns the segments this chunk was compiled from.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` if the chunk has no placeholders.
    pub fn is_static(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the exact path a static chunk matches, or `None` for variable chunks.
    pub fn static_path(&self) -> Option<String> {
        if !self.is_static() {
            return None;
        }

        Some(
            self.segments
                .iter()
                .filter_map(|seg| match seg {
                    Segment::Literal(text) => Some(text.as_str()),
                    Segment::Placeholder(_) => None,
                })
                .collect(),
        )
    }

    /// Returns the unanchored regex body.
    pub fn regex(&self) -> &str {
        &self.regex
    }

    /// Total number of capture groups in the body, including groups nested in custom expressions.
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Returns placeholder names in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|seg| match seg {
            Segment::Placeholder(placeholder) => Some(placeholder.name()),
            Segment::Literal(_) => None,
        })
    }

    /// Relative capture group index of each placeholder, in pattern order.
    pub(crate) fn param_groups(&self) -> &[usize] {
        &self.params
    }

    /// Renders the pattern this chunk was compiled from.
    pub fn pattern(&self) -> String {
        self.to_string()
    }

    /// Assembles a path using a closure that maps placeholder names to values.
    ///
    /// Returns the name of the first placeholder `vars` has no value for.
    pub(crate) fn build_path<'a, F, I>(
        &'a self,
        path: &mut String,
        mut vars: F,
    ) -> Result<(), &'a str>
    where
        F: FnMut(&str) -> Option<I>,
        I: AsRef<str>,
    {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Placeholder(placeholder) => match vars(placeholder.name()) {
                    Some(val) => path.push_str(val.as_ref()),
                    None => return Err(placeholder.name()),
                },
            }
        }

        Ok(())
    }
}

impl fmt::Display for RoutingChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::Placeholder(p) if p.is_custom() => {
                    write!(f, "{{{}:{}}}", p.name(), p.expr())?
                }
                Segment::Placeholder(p) => write!(f, "{{{}}}", p.name())?,
            }
        }

        Ok(())
    }
}

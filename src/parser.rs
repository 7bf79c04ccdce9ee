use crate::{engine, error::ParseError};

/// Expression used for placeholders written without a custom expression.
///
/// Matches one or more characters up to the next `/`.
pub const DEFAULT_PLACEHOLDER_EXPR: &str = "[^/]+";

/// One piece of a parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal slice of pattern, unescaped.
    Literal(String),

    /// Named dynamic segment.
    Placeholder(Placeholder),
}

/// A named dynamic segment and the expression its value must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    name: String,
    expr: Option<String>,
    groups: usize,
}

impl Placeholder {
    /// Returns the placeholder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the expression values of this placeholder must match.
    pub fn expr(&self) -> &str {
        self.expr.as_deref().unwrap_or(DEFAULT_PLACEHOLDER_EXPR)
    }

    /// Returns `true` if the pattern gave an explicit expression for this placeholder.
    pub fn is_custom(&self) -> bool {
        self.expr.is_some()
    }

    /// Number of capture groups opened inside the expression itself.
    pub(crate) fn nested_groups(&self) -> usize {
        self.groups
    }

    /// Builds a placeholder without validating its expression.
    #[cfg(test)]
    pub(crate) fn unchecked(name: &str, expr: &str, groups: usize) -> Self {
        Self {
            name: name.to_owned(),
            expr: Some(expr.to_owned()),
            groups,
        }
    }
}

/// Parses a route pattern into its literal and placeholder segments.
///
/// # Examples
/// ```
/// use mark_router::{parse, Segment};
///
/// let segments = parse(r"/user/{id:\d+}/posts").unwrap();
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[0], Segment::Literal("/user/".to_owned()));
///
/// match &segments[1] {
///     Segment::Placeholder(placeholder) => {
///         assert_eq!(placeholder.name(), "id");
///         assert_eq!(placeholder.expr(), r"\d+");
///     }
///     _ => unreachable!(),
/// }
///
/// assert!(parse("/user/{id").is_err());
/// ```
pub fn parse(pattern: &str) -> Result<Vec<Segment>, ParseError> {
    let mut segments = Vec::new();
    let mut unprocessed = pattern;

    while let Some(idx) = unprocessed.find(['{', '}']) {
        let (literal, rem) = unprocessed.split_at(idx);

        if rem.starts_with('}') {
            return Err(ParseError::UnbalancedBrace {
                pattern: pattern.to_owned(),
            });
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal.to_owned()));
        }

        let (placeholder, rem) = parse_placeholder(pattern, rem)?;

        let taken = segments.iter().any(|seg| match seg {
            Segment::Placeholder(other) => other.name == placeholder.name,
            Segment::Literal(_) => false,
        });

        if taken {
            return Err(ParseError::DuplicatePlaceholder {
                pattern: pattern.to_owned(),
                name: placeholder.name,
            });
        }

        segments.push(Segment::Placeholder(placeholder));
        unprocessed = rem;
    }

    if !unprocessed.is_empty() {
        segments.push(Segment::Literal(unprocessed.to_owned()));
    }

    Ok(segments)
}

/// Parses the placeholder at the start of `unprocessed`, returning it and the remaining input.
///
/// `unprocessed` must start with `{`. Braces nest so that expressions like `\d{3}` survive.
fn parse_placeholder<'a>(
    pattern: &str,
    unprocessed: &'a str,
) -> Result<(Placeholder, &'a str), ParseError> {
    let mut nesting = 0usize;
    let close_idx = unprocessed
        .find(|c| match c {
            '{' => {
                nesting += 1;
                false
            }
            '}' => {
                nesting -= 1;
                nesting == 0
            }
            _ => false,
        })
        .ok_or_else(|| ParseError::UnbalancedBrace {
            pattern: pattern.to_owned(),
        })?;

    let (param, rem) = unprocessed.split_at(close_idx + 1);

    // remove outer curly brackets
    let param = &param[1..param.len() - 1];

    let (name, expr) = match param.split_once(':') {
        Some((name, expr)) => (name, Some(expr)),
        None => (param, None),
    };

    if name.is_empty() {
        return Err(ParseError::EmptyPlaceholderName {
            pattern: pattern.to_owned(),
        });
    }

    let invalid = |reason: String| ParseError::InvalidExpression {
        pattern: pattern.to_owned(),
        name: name.to_owned(),
        reason,
    };

    let groups = match expr {
        None => 0,
        Some("") => return Err(invalid("expression is empty".to_owned())),
        Some(expr) => {
            if let Some(reason) = unembeddable(expr) {
                return Err(invalid(reason.to_owned()));
            }

            engine::group_count(expr).map_err(invalid)?
        }
    };

    let placeholder = Placeholder {
        name: name.to_owned(),
        expr: expr.map(ToOwned::to_owned),
        groups,
    };

    Ok((placeholder, rem))
}

/// Looks for constructs that break once the expression is embedded in a batch alternation:
/// anchors, and group names that would collide with another route's.
fn unembeddable(expr: &str) -> Option<&'static str> {
    let mut chars = expr.char_indices().peekable();
    let mut class_depth = 0usize;

    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, 'A' | 'z')) = chars.next() {
                    if class_depth == 0 {
                        return Some("anchors are not allowed");
                    }
                }
            }
            '[' => {
                class_depth += 1;

                // leading `^` negates the class and a leading `]` is literal
                if let Some((_, '^')) = chars.peek() {
                    chars.next();
                }
                if let Some((_, ']')) = chars.peek() {
                    chars.next();
                }
            }
            ']' if class_depth > 0 => class_depth -= 1,
            '^' | '$' if class_depth == 0 => return Some("anchors are not allowed"),
            '(' if class_depth == 0 => {
                let rest = &expr[idx + 1..];
                let named = rest.starts_with("?P<") || rest.starts_with("?<");
                if named && !rest.starts_with("?<=") && !rest.starts_with("?<!") {
                    return Some("named capture groups are not allowed");
                }
            }
            _ => {}
        }
    }

    None
}

//! Error types.

use derive_more::{Display, Error};

/// Errors that can occur when parsing a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A `{` is never closed, or a `}` appears without a matching `{`.
    #[display("pattern {pattern:?} contains unbalanced braces")]
    UnbalancedBrace { pattern: String },

    /// The same placeholder name is used twice within one pattern.
    #[display("pattern {pattern:?} uses placeholder `{name}` more than once")]
    DuplicatePlaceholder { pattern: String, name: String },

    /// A placeholder has no name, e.g. `{}` or `{:\d+}`.
    #[display("pattern {pattern:?} contains a placeholder without a name")]
    EmptyPlaceholderName { pattern: String },

    /// A custom placeholder expression is rejected by the regex engine, is anchored or names a
    /// capture group.
    #[display("placeholder `{name}` in pattern {pattern:?} has an invalid expression: {reason}")]
    InvalidExpression {
        pattern: String,
        name: String,
        reason: String,
    },
}

/// Errors that can occur when registering a route.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[non_exhaustive]
pub enum RouteError {
    /// The route pattern is malformed.
    #[display("{_0}")]
    Parse(#[error(source)] ParseError),

    /// A route for the same method and pattern has already been registered.
    #[display("route {pattern:?} is already registered for method {method}")]
    DuplicateRoute { method: String, pattern: String },

    /// The route was registered without any method.
    #[display("route {pattern:?} has no methods")]
    NoMethods { pattern: String },

    /// The route name is already taken by another route.
    #[display("route name `{name}` is already registered")]
    DuplicateName { name: String },

    /// The combined expression of a variable route batch could not be built.
    #[display("could not compile variable route {pattern:?}: {reason}")]
    Compile { pattern: String, reason: String },
}

impl From<ParseError> for RouteError {
    fn from(err: ParseError) -> Self {
        RouteError::Parse(err)
    }
}

/// Errors which can occur when attempting to generate a path for a named route.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[non_exhaustive]
pub enum UrlGenerationError {
    /// No route has been registered under this name.
    #[display("no route named `{name}`")]
    RouteNotFound { name: String },

    /// A value for a placeholder was not supplied.
    #[display("missing value for placeholder `{placeholder}`")]
    MissingParameter { placeholder: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = ParseError::DuplicatePlaceholder {
            pattern: "/{id}/{id}".to_owned(),
            name: "id".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            r#"pattern "/{id}/{id}" uses placeholder `id` more than once"#
        );

        let err = RouteError::from(ParseError::EmptyPlaceholderName {
            pattern: "/{}".to_owned(),
        });
        assert_eq!(
            err.to_string(),
            r#"pattern "/{}" contains a placeholder without a name"#
        );

        let err = RouteError::DuplicateRoute {
            method: "GET".to_owned(),
            pattern: "/a".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            r#"route "/a" is already registered for method GET"#
        );
    }

    #[test]
    fn parse_error_is_source() {
        use std::error::Error as _;

        let err = RouteError::from(ParseError::UnbalancedBrace {
            pattern: "/{id".to_owned(),
        });
        assert!(err.source().is_some());
    }
}

//! The query subset understood by the in-memory store.
//!
//! `SELECT * FROM c`, optionally followed by `WHERE c.<field> = @<param>` terms joined with `AND`.
//! Tokens must be separated by whitespace. Anything else is rejected as a bad request.

use document_store::{QueryDefinition, StoreError};
use serde_json::Value;

/// Conjunction of field equality terms. No terms matches every document.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Filter {
    terms: Vec<(String, Value)>,
}

fn unsupported(text: &str) -> StoreError {
    StoreError::BadRequest(format!("unsupported query: {}", text))
}

impl Filter {
    pub(crate) fn match_all() -> Self {
        Self { terms: Vec::new() }
    }

    pub(crate) fn parse(query: &QueryDefinition) -> Result<Self, StoreError> {
        let text = query.query_text();
        let tokens: Vec<&str> = text.split_whitespace().collect();

        let conditions = match tokens.as_slice() {
            [select, "*", from, "c", rest @ ..]
                if select.eq_ignore_ascii_case("SELECT") && from.eq_ignore_ascii_case("FROM") =>
            {
                rest
            }
            _ => return Err(unsupported(text)),
        };

        let mut rest = match conditions {
            [] => return Ok(Self::match_all()),
            [keyword, rest @ ..] if keyword.eq_ignore_ascii_case("WHERE") => rest,
            _ => return Err(unsupported(text)),
        };

        let mut terms = Vec::new();
        loop {
            match rest {
                [lhs, "=", rhs, tail @ ..] => {
                    let field = lhs.strip_prefix("c.").ok_or_else(|| unsupported(text))?;
                    let value = query.parameter(rhs).ok_or_else(|| {
                        StoreError::BadRequest(format!("query parameter '{}' is not defined", rhs))
                    })?;
                    terms.push((field.to_string(), value.clone()));

                    match tail {
                        [] => return Ok(Self { terms }),
                        [keyword, next @ ..] if keyword.eq_ignore_ascii_case("AND") => rest = next,
                        _ => return Err(unsupported(text)),
                    }
                }
                _ => return Err(unsupported(text)),
            }
        }
    }

    pub(crate) fn matches(&self, document: &Value) -> bool {
        self.terms
            .iter()
            .all(|(field, value)| document.get(field) == Some(value))
    }
}

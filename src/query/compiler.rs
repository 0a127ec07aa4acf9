//! Compiles selection criteria into a select query string.
//!
//! The output is the raw parameter string appended after `select?`:
//! `q=<body>[&fl=..][&exclude=false][&name=value..]&wt=json`.

use std::fmt;

use super::types::{
    CriterionKey, CriterionValue, ParamValue, Projection, QueryParams, QueryValue,
    SelectionCriteria, CONTENT_FIELD, RESPONSE_WRITER_PARAM,
};
use crate::error::{IndexServerError, IndexServerResult, QueryBuildError};

/// Query body matching every document
pub const MATCH_ALL: &str = "*:*";

const QUERY_PREFIX: &str = "q=";
const AND_JOIN: &str = " AND ";
const OR_JOIN: &str = " OR ";
const JSON_WRITER_SUFFIX: &str = "&wt=json";

/// A compiled query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery(String);

impl CompiledQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The bare query clause used inside a delete envelope.
    ///
    /// Strips one leading `q=` and one trailing `&wt=json`.
    pub fn delete_clause(&self) -> &str {
        let clause = self.0.strip_prefix(QUERY_PREFIX).unwrap_or(&self.0);
        clause.strip_suffix(JSON_WRITER_SUFFIX).unwrap_or(clause)
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compile a read query.
///
/// Any malformed input fails the whole compilation with
/// [`IndexServerError::QueryConstructionFailed`].
pub fn compile(
    selection: &SelectionCriteria,
    projection: &Projection,
    params: &QueryParams,
) -> IndexServerResult<CompiledQuery> {
    let body = build_body(selection).map_err(IndexServerError::query_construction)?;

    let mut query = String::with_capacity(body.len() + 32);
    query.push_str(QUERY_PREFIX);
    query.push_str(&body);
    query.push_str(&field_list(projection));
    query.push_str(&extra_params(params));
    query.push_str(JSON_WRITER_SUFFIX);

    crate::log_query_debug!("Compiled query: {}", query);
    Ok(CompiledQuery(query))
}

fn build_body(selection: &SelectionCriteria) -> Result<String, QueryBuildError> {
    if selection.is_empty() {
        return Ok(MATCH_ALL.to_string());
    }

    let mut body = String::new();
    for (key, value) in selection.iter() {
        match (key, value) {
            (CriterionKey::Group(fields), value) => {
                body.push_str(&group_clause(fields, value)?);
                body.push_str(AND_JOIN);
            }
            (CriterionKey::Field(name), CriterionValue::Any(values)) => {
                let terms = or_terms(name, values)?;
                body.push('(');
                body.push_str(&terms);
                body.push(')');
                body.push_str(AND_JOIN);
            }
            (key, CriterionValue::One(value)) if key.is_keyword() => {
                let clause = value.as_text().ok_or(QueryBuildError::KeywordNotText)?;
                // Stops here, keeping any join left by the previous clause
                body.push('(');
                body.push_str(clause);
                body.push(')');
                return Ok(body);
            }
            (CriterionKey::Field(name), CriterionValue::One(value)) => {
                body.push_str(&term(name, value));
                body.push_str(AND_JOIN);
            }
        }
    }

    body.truncate(body.len() - AND_JOIN.len());
    Ok(body)
}

fn term(field: &str, value: &QueryValue) -> String {
    format!("{}:{}", field, value)
}

fn or_terms(field: &str, values: &[QueryValue]) -> Result<String, QueryBuildError> {
    if values.is_empty() {
        return Err(QueryBuildError::EmptyValueList {
            field: field.to_string(),
        });
    }
    Ok(values
        .iter()
        .map(|value| term(field, value))
        .collect::<Vec<_>>()
        .join(OR_JOIN))
}

fn group_clause(fields: &[String], value: &CriterionValue) -> Result<String, QueryBuildError> {
    if fields.is_empty() {
        return Err(QueryBuildError::EmptyFieldGroup);
    }

    let mut parts = Vec::with_capacity(fields.len());
    for field in fields {
        match value {
            CriterionValue::One(v) => parts.push(term(field, v)),
            CriterionValue::Any(values) => parts.push(or_terms(field, values)?),
        }
    }
    Ok(format!("({})", parts.join(OR_JOIN)))
}

fn field_list(projection: &Projection) -> String {
    if projection.is_empty() {
        return String::new();
    }
    let mut fragment = format!(
        "&fl={}",
        projection.iter().cloned().collect::<Vec<_>>().join(",")
    );
    if projection.contains(CONTENT_FIELD) {
        fragment.push_str("&exclude=false");
    }
    fragment
}

fn param_fragment(name: &str, value: Option<&QueryValue>) -> String {
    match value {
        Some(value) => format!("&{}={}", name, value),
        None => format!("&{}", name),
    }
}

fn extra_params(params: &QueryParams) -> String {
    let mut fragment = String::new();
    for (name, value) in params.iter() {
        // Never emitted by QueryParams, guarded so the suffix stays unique
        if name == RESPONSE_WRITER_PARAM {
            continue;
        }
        match value {
            ParamValue::Single(v) => fragment.push_str(&param_fragment(name, v.as_ref())),
            ParamValue::Repeated(values) => {
                for v in values {
                    fragment.push_str(&param_fragment(name, v.as_ref()));
                }
            }
        }
    }
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::types::projection;

    fn body_of(selection: &SelectionCriteria) -> String {
        let compiled = compile(selection, &Projection::new(), &QueryParams::new()).unwrap();
        compiled.delete_clause().to_string()
    }

    #[test]
    fn test_empty_selection_matches_all() {
        let compiled = compile(
            &SelectionCriteria::new(),
            &Projection::new(),
            &QueryParams::new(),
        )
        .unwrap();
        assert_eq!(compiled.as_str(), "q=*:*&wt=json");
    }

    #[test]
    fn test_single_scalar_has_no_trailing_join() {
        assert_eq!(body_of(&SelectionCriteria::new().field("a", 1)), "a:1");
    }

    #[test]
    fn test_list_value_is_or_clause() {
        assert_eq!(
            body_of(&SelectionCriteria::new().any_of("a", [1, 2])),
            "(a:1 OR a:2)"
        );
    }

    #[test]
    fn test_field_group_scalar() {
        assert_eq!(
            body_of(&SelectionCriteria::new().group(&["a", "b"], 1)),
            "(a:1 OR b:1)"
        );
    }

    #[test]
    fn test_field_group_list_is_field_major() {
        assert_eq!(
            body_of(&SelectionCriteria::new().group_any(&["a", "b"], ["x", "y"])),
            "(a:x OR a:y OR b:x OR b:y)"
        );
    }

    #[test]
    fn test_clauses_follow_insertion_order() {
        assert_eq!(
            body_of(&SelectionCriteria::new().field("b", 2).field("a", 1)),
            "b:2 AND a:1"
        );
        assert_eq!(
            body_of(&SelectionCriteria::new().field("a", 1).field("b", 2)),
            "a:1 AND b:2"
        );
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let selection = SelectionCriteria::new()
            .field("a", 1)
            .field("b", 2)
            .field("a", 3);
        assert_eq!(body_of(&selection), "a:3 AND b:2");
    }

    #[test]
    fn test_keyword_stops_compilation() {
        let selection = SelectionCriteria::new()
            .field("a", 1)
            .keyword("x y")
            .field("c", 3);
        assert_eq!(body_of(&selection), "a:1 AND (x y)");
    }

    #[test]
    fn test_keyword_alone() {
        assert_eq!(
            body_of(&SelectionCriteria::new().keyword("hello world")),
            "(hello world)"
        );
    }

    #[test]
    fn test_keyword_must_be_text() {
        let selection = SelectionCriteria::new().field("keyword", 5);
        let err = compile(&selection, &Projection::new(), &QueryParams::new()).unwrap_err();
        assert!(matches!(
            err,
            IndexServerError::QueryConstructionFailed {
                source: QueryBuildError::KeywordNotText
            }
        ));
    }

    #[test]
    fn test_keyword_list_is_plain_or_clause() {
        let selection = SelectionCriteria::new().any_of("keyword", ["x", "y"]);
        assert_eq!(body_of(&selection), "(keyword:x OR keyword:y)");
    }

    #[test]
    fn test_empty_value_list_fails() {
        let selection = SelectionCriteria::new().any_of("a", Vec::<i64>::new());
        let err = compile(&selection, &Projection::new(), &QueryParams::new()).unwrap_err();
        match err {
            IndexServerError::QueryConstructionFailed { source } => {
                assert_eq!(
                    source,
                    QueryBuildError::EmptyValueList {
                        field: "a".to_string()
                    }
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_group_fails() {
        let selection = SelectionCriteria::new().group(&[], 1);
        assert!(compile(&selection, &Projection::new(), &QueryParams::new()).is_err());
    }

    #[test]
    fn test_projection_and_content() {
        let compiled = compile(
            &SelectionCriteria::new(),
            &projection(["f1", "f2"]),
            &QueryParams::new(),
        )
        .unwrap();
        let fl = compiled
            .as_str()
            .split('&')
            .find_map(|p| p.strip_prefix("fl="))
            .unwrap();
        let fields: Vec<&str> = fl.split(',').collect();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&"f1") && fields.contains(&"f2"));
        assert!(!compiled.as_str().contains("exclude=false"));

        let compiled = compile(
            &SelectionCriteria::new(),
            &projection(["content", "f1"]),
            &QueryParams::new(),
        )
        .unwrap();
        assert!(compiled.as_str().contains("&exclude=false"));
    }

    #[test]
    fn test_repeated_params_and_pinned_writer() {
        let params = QueryParams::new()
            .set_repeated("rows", [1, 2])
            .set("wt", "xml")
            .flag("debug");
        let compiled = compile(&SelectionCriteria::new(), &Projection::new(), &params).unwrap();
        assert_eq!(compiled.as_str(), "q=*:*&rows=1&rows=2&debug&wt=json");
        assert_eq!(compiled.as_str().matches("wt=").count(), 1);
    }

    #[test]
    fn test_delete_clause_strips_only_ends() {
        let selection = SelectionCriteria::new().field("q", "q=1");
        let compiled = compile(&selection, &Projection::new(), &QueryParams::new()).unwrap();
        assert_eq!(compiled.as_str(), "q=q:q=1&wt=json");
        assert_eq!(compiled.delete_clause(), "q:q=1");
    }
}

//! Parsing of decision-function responses into tagged results
//!
//! Every loosely-shaped response the decision function can produce is
//! resolved here, with the documented fallbacks as explicit branches:
//! ambiguous usefulness fails closed, and unparseable continuation plans
//! become an empty `Continue`, which the controller treats as `Done`.

use crate::types::{QueryPlanDecision, Usefulness};
use tracing::debug;

/// Token the planner returns when no further research is needed
pub const DONE_SENTINEL: &str = "<done>";

/// Parse a response expected to be a JSON array of strings.
///
/// A JSON array embedded in surrounding prose is salvaged by taking the
/// outermost bracketed span. Returns `None` when no such list can be read.
pub fn parse_query_list(response: &str) -> Option<Vec<String>> {
    let trimmed = response.trim();

    let start = trimmed.find('[')?;
    let end = trimmed.rfind(']')?;
    if start > end {
        return None;
    }

    match serde_json::from_str::<Vec<String>>(&trimmed[start..=end]) {
        Ok(queries) => Some(queries),
        Err(e) => {
            debug!(error = %e, "Response is not a JSON list of strings");
            None
        }
    }
}

/// Interpret the planner's continuation response.
///
/// An exact sentinel match means research is complete. Otherwise the
/// response must parse as a list of new queries; anything else becomes
/// `Continue` with no queries.
pub fn parse_plan_decision(response: &str) -> QueryPlanDecision {
    let trimmed = response.trim();

    if trimmed == DONE_SENTINEL {
        return QueryPlanDecision::Done;
    }

    match parse_query_list(trimmed) {
        Some(queries) => QueryPlanDecision::Continue(queries),
        None => {
            debug!("Planner response was neither the done sentinel nor a query list");
            QueryPlanDecision::Continue(Vec::new())
        }
    }
}

/// Resolve a usefulness verdict, failing closed to `NotUseful`.
pub fn parse_usefulness(response: &str) -> Usefulness {
    let answer = response.trim();

    match answer {
        "Yes" => Usefulness::Useful,
        "No" => Usefulness::NotUseful,
        _ if answer.contains("Yes") => Usefulness::Useful,
        _ if answer.contains("No") => Usefulness::NotUseful,
        _ => Usefulness::NotUseful,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_query_list() {
        assert_eq!(
            parse_query_list(r#"["q1", "q2"]"#),
            Some(vec!["q1".to_string(), "q2".to_string()])
        );
    }

    #[test]
    fn salvages_list_from_surrounding_prose() {
        let response = "Here are the queries:\n[\"q1\", \"q2\"]\nGood luck!";
        assert_eq!(
            parse_query_list(response),
            Some(vec!["q1".to_string(), "q2".to_string()])
        );
    }

    #[test]
    fn rejects_non_list_responses() {
        assert_eq!(parse_query_list("not json"), None);
        assert_eq!(parse_query_list("][ backwards"), None);
        assert_eq!(parse_query_list("[1, 2, 3]"), None);
    }

    #[test]
    fn salvages_list_nested_in_other_json() {
        // The outermost bracketed span is taken even inside an object.
        assert_eq!(
            parse_query_list(r#"{"queries": ["q1"]}"#),
            Some(vec!["q1".to_string()])
        );
    }

    #[test]
    fn sentinel_means_done() {
        assert_eq!(parse_plan_decision("<done>"), QueryPlanDecision::Done);
        assert_eq!(parse_plan_decision("  <done>  "), QueryPlanDecision::Done);
    }

    #[test]
    fn malformed_plan_becomes_empty_continue() {
        assert_eq!(
            parse_plan_decision("not json"),
            QueryPlanDecision::Continue(Vec::new())
        );
    }

    #[test]
    fn plan_with_queries_continues() {
        assert_eq!(
            parse_plan_decision(r#"["next query"]"#),
            QueryPlanDecision::Continue(vec!["next query".to_string()])
        );
    }

    #[test]
    fn usefulness_exact_answers() {
        assert_eq!(parse_usefulness("Yes"), Usefulness::Useful);
        assert_eq!(parse_usefulness("No"), Usefulness::NotUseful);
    }

    #[test]
    fn usefulness_resolves_embedded_tokens() {
        assert_eq!(parse_usefulness("Maybe, leaning Yes"), Usefulness::Useful);
        assert_eq!(parse_usefulness("No, irrelevant."), Usefulness::NotUseful);
    }

    #[test]
    fn ambiguous_usefulness_fails_closed() {
        assert_eq!(parse_usefulness("unclear"), Usefulness::NotUseful);
        assert_eq!(parse_usefulness(""), Usefulness::NotUseful);
    }
}

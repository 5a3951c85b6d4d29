//! Prompt construction for the decision function
//!
//! One builder per decision-function call. Each returns the role-tagged
//! message sequence the call contract in the parsing layer depends on.

use crate::parse::DONE_SENTINEL;
use delver_providers::DecisionMessage;

/// Ask for up to four initial search queries as a JSON array
pub fn initial_queries(user_query: &str) -> Vec<DecisionMessage> {
    let instructions = "You are an expert research assistant. Given the user's query, \
        generate up to four distinct, precise search queries that would help gather \
        comprehensive information on the topic. Return only a JSON array of strings \
        (for example: [\"query1\", \"query2\", \"query3\"]) without any additional text.";

    vec![
        DecisionMessage::system("You are a helpful and precise research assistant."),
        DecisionMessage::user(format!("User Query: {}\n\n{}", user_query, instructions)),
    ]
}

/// Ask whether a page helps answer the user's query ('Yes' or 'No')
pub fn usefulness(user_query: &str, page_text: &str) -> Vec<DecisionMessage> {
    let instructions = "You are a critical research evaluator. Given the user's query and \
        the content of a webpage, determine if the webpage contains information relevant \
        and useful for addressing the query. Respond with exactly one word: 'Yes' if the \
        page is useful, or 'No' if it is not. Do not include any extra text.";

    vec![
        DecisionMessage::system("You are a strict and concise evaluator of research relevance."),
        DecisionMessage::user(format!(
            "User Query: {}\n\nWebpage Content (first 20000 characters):\n{}\n\n{}",
            user_query, page_text, instructions
        )),
    ]
}

/// Ask for the page's query-relevant text, plain and without commentary
pub fn extraction(user_query: &str, search_query: &str, page_text: &str) -> Vec<DecisionMessage> {
    let instructions = "You are an expert information extractor. Given the user's query, \
        the search query that led to this page, and the webpage content, extract all \
        pieces of information that are relevant to answering the user's query. Return \
        only the relevant context as plain text without commentary.";

    vec![
        DecisionMessage::system("You are an expert in extracting and summarizing relevant information."),
        DecisionMessage::user(format!(
            "User Query: {}\nSearch Query: {}\n\nWebpage Content (first 20000 characters):\n{}\n\n{}",
            user_query, search_query, page_text, instructions
        )),
    ]
}

/// Ask for up to four new queries as a JSON array, or the done sentinel
pub fn next_plan(
    user_query: &str,
    previous_queries: &[String],
    contexts: &[String],
) -> Vec<DecisionMessage> {
    let instructions = format!(
        "You are an analytical research assistant. Based on the original query, the \
        search queries performed so far, and the extracted contexts from webpages, \
        determine if further research is needed. If further research is needed, provide \
        up to four new search queries as a JSON array of strings (for example, \
        [\"new query1\", \"new query2\"]). If you believe no further research is needed, \
        respond with exactly \"{sentinel}\".\nOutput only a JSON array or the token \
        \"{sentinel}\" without any additional text.",
        sentinel = DONE_SENTINEL
    );

    vec![
        DecisionMessage::system("You are a systematic research planner."),
        DecisionMessage::user(format!(
            "User Query: {}\nPrevious Search Queries: {:?}\n\nExtracted Relevant Contexts:\n{}\n\n{}",
            user_query,
            previous_queries,
            contexts.join("\n"),
            instructions
        )),
    ]
}

/// Ask for the final report over all gathered contexts
pub fn final_report(user_query: &str, contexts: &[String]) -> Vec<DecisionMessage> {
    let instructions = "You are an expert researcher and report writer. Based on the \
        gathered contexts below and the original query, write a comprehensive, \
        well-structured, and detailed report that addresses the query thoroughly. \
        Include all relevant insights and conclusions without extraneous commentary.";

    vec![
        DecisionMessage::system("You are a skilled report writer."),
        DecisionMessage::user(format!(
            "User Query: {}\n\nGathered Relevant Contexts:\n{}\n\n{}",
            user_query,
            contexts.join("\n"),
            instructions
        )),
    ]
}

//! # Query String Parsing
//!
//! Parses the model's output, a Looker explore URL query string such as
//! `fields=a,b&f[a]=x&sorts=a desc`, into a `ParsedQuery`. The text is
//! model-generated, so the scanner is lenient: segments it does not recognise
//! are dropped without error.

use crate::types::ParsedQuery;

/// One `&`-separated segment of the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Fields(Vec<&'a str>),
    Pivots(Vec<&'a str>),
    Filter { key: &'a str, value: &'a str },
    Sorts(Vec<String>),
    Unknown,
}

fn split_list(rest: &str) -> Vec<&str> {
    rest.split(',').filter(|item| !item.is_empty()).collect()
}

/// Renders `field desc` as-is and drops any other direction token.
fn sort_item(item: &str) -> String {
    let mut pieces = item.split(' ');
    let field = pieces.next().unwrap_or_default();
    match pieces.next() {
        Some("desc") => format!("{field} desc"),
        _ => field.to_string(),
    }
}

/// Classifies a single segment by its prefix.
pub fn classify(segment: &str) -> Segment<'_> {
    if let Some(rest) = segment.strip_prefix("fields=") {
        Segment::Fields(split_list(rest))
    } else if let Some(rest) = segment.strip_prefix("pivots=") {
        Segment::Pivots(split_list(rest))
    } else if let Some(rest) = segment.strip_prefix("f[") {
        match rest.split_once('=') {
            Some((key, value)) => Segment::Filter {
                key: key.strip_suffix(']').unwrap_or(key),
                value,
            },
            None => Segment::Unknown,
        }
    } else if let Some(rest) = segment.strip_prefix("sorts=") {
        Segment::Sorts(split_list(rest).into_iter().map(sort_item).collect())
    } else {
        Segment::Unknown
    }
}

/// Parses a generated query string. Later `fields`, `pivots` and `sorts`
/// segments replace earlier ones; a repeated filter key overwrites its value.
pub fn parse_query_string(text: &str) -> ParsedQuery {
    let mut parsed = ParsedQuery::default();

    for segment in text.trim().split('&') {
        match classify(segment) {
            Segment::Fields(fields) => {
                parsed.fields = fields.into_iter().map(String::from).collect();
            }
            Segment::Pivots(pivots) => {
                parsed.pivots = pivots.into_iter().map(String::from).collect();
            }
            Segment::Filter { key, value } => {
                parsed.filters.insert(key.to_string(), value.to_string());
            }
            Segment::Sorts(sorts) => parsed.sorts = sorts,
            Segment::Unknown => {}
        }
    }

    parsed
}

//! # Explore Query Prompt
//!
//! The prompt that asks the model to translate a question into a Looker explore
//! URL query string. Building it is pure templating, so identical inputs always
//! produce an identical prompt.

/// The fixed task description and output contract.
pub const EXPLORE_INSTRUCTIONS: &str = r#"Context
----------

You are a developer who would translate questions to a structured Looker URL query based on the following instructions.

Instructions:
    - choose only the fields in the below lookml metadata
    - prioritize the field description, label, tags, and name for what field(s) to use for a given description
    - generate only one answer, no more.
    - use the Examples (at the bottom) for guidance on how to structure the Looker url query
    - try to avoid adding dynamic_fields, provide them when very similar example is found in the bottom
    - never respond with sql, always return an looker explore url as a single string
    - response should start with fields= , as in the Examples section at the bottom"#;

/// Assembles the full prompt from the rendered metadata, examples and question.
pub fn build_explore_prompt(
    dimensions: &str,
    measures: &str,
    examples: &str,
    question: &str,
) -> String {
    format!(
        r#"{EXPLORE_INSTRUCTIONS}

LookML Metadata
----------

Dimensions Used to group by information (follow the instructions in tags when using a specific field; if map used include a location or lat long dimension;):

{dimensions}

Measures are used to perform calculations (if top, bottom, total, sum, etc. are used include a measure):

{measures}

Example
----------

{examples}

Input
----------
{question}

Output
----------
"#
    )
}

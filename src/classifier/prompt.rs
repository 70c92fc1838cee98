// Classification prompt.

/// Build the instruction sent to the model for one comment.
///
/// The raw comment is embedded (not the cleaned text) so the model sees
/// punctuation, casing and links as the author wrote them.
pub fn build_prompt(comment: &str) -> String {
    format!(
        r#"Analyze this comment for toxicity and offensive content. The comment is: "{comment}"

Determine if it contains any of the following and provide scores from 0 to 1:
- Toxicity
- Severe toxicity
- Obscene content
- Threats
- Insults
- Identity hate

Respond ONLY in valid JSON format (no introductory text, code fences, or explanations outside the JSON object) with the following structure:
{{
    "is_toxic": boolean,
    "toxicity_score": float,
    "severe_toxicity": float,
    "obscene": float,
    "threat": float,
    "insult": float,
    "identity_hate": float,
    "offensive_words": list[string],
    "explanation": string
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Verdict;

    #[test]
    fn test_prompt_embeds_comment_and_every_field() {
        let prompt = build_prompt("you absolute walnut");
        assert!(prompt.contains(r#"The comment is: "you absolute walnut""#));
        for key in Verdict::REQUIRED_KEYS {
            assert!(prompt.contains(&format!("\"{key}\"")), "prompt missing {key}");
        }
    }
}

//! crates/access_hub_core/src/flashcards.rs
//!
//! Defensive parsing of flashcards out of generative model text. The model
//! is asked for a JSON array of `{question, answer}` objects but sometimes
//! wraps it in markdown fences or ignores the format entirely, so a line
//! heuristic backs up the JSON path.

use serde::Deserialize;

use crate::domain::Flashcard;

#[derive(Deserialize)]
struct RawCard {
    question: String,
    answer: String,
}

/// Parses model output into flashcards. Tries JSON first (tolerating code
/// fences and surrounding prose), then falls back to pairing a line that
/// contains a question mark with the line that follows it.
pub fn parse_flashcards(text: &str) -> Vec<Flashcard> {
    if let Some(cards) = parse_json(text) {
        return cards;
    }
    parse_lines(text)
}

fn parse_json(text: &str) -> Option<Vec<Flashcard>> {
    let trimmed = strip_code_fences(text);
    // The array may be embedded in prose; cut to the outermost brackets.
    let start = trimmed.find('[')?;
    let end = trimmed.rfind(']')?;
    if end <= start {
        return None;
    }
    let raw: Vec<RawCard> = serde_json::from_str(&trimmed[start..=end]).ok()?;
    Some(
        raw.into_iter()
            .map(|c| Flashcard::new(c.question, c.answer))
            .collect(),
    )
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag after the opening fence.
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Pairs consecutive non-empty lines where the first contains a question
/// mark, stripping list numbering from both.
fn parse_lines(text: &str) -> Vec<Flashcard> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut cards = Vec::new();
    let mut i = 0;
    while i + 1 < lines.len() {
        if lines[i].contains('?') {
            let question = strip_numbering(lines[i]);
            let answer = strip_numbering(lines[i + 1]);
            if !question.is_empty() && !answer.is_empty() {
                cards.push(Flashcard::new(question, answer));
            }
            i += 2;
        } else {
            i += 1;
        }
    }
    cards
}

/// Removes leading list markers: `1.`, `2)`, `-`, `*`, `Q:`, `A:`.
fn strip_numbering(line: &str) -> String {
    let mut rest = line.trim_start();
    for prefix in ["Q:", "A:", "-", "*"] {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped.trim_start();
        }
    }
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let after = &rest[digits..];
        if let Some(stripped) = after.strip_prefix('.').or_else(|| after.strip_prefix(')')) {
            rest = stripped.trim_start();
        }
    }
    rest.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_json_array() {
        let cards = parse_flashcards(r#"[{"question":"Q1","answer":"A1"}]"#);
        assert_eq!(cards, vec![Flashcard::new("Q1", "A1")]);
        assert!(!cards[0].flipped);
    }

    #[test]
    fn parses_json_inside_code_fence() {
        let text = "```json\n[{\"question\":\"What?\",\"answer\":\"That.\"}]\n```";
        let cards = parse_flashcards(text);
        assert_eq!(cards, vec![Flashcard::new("What?", "That.")]);
    }

    #[test]
    fn parses_json_embedded_in_prose() {
        let text = "Here are your cards:\n[{\"question\":\"Q\",\"answer\":\"A\"}]\nEnjoy!";
        assert_eq!(parse_flashcards(text), vec![Flashcard::new("Q", "A")]);
    }

    #[test]
    fn falls_back_to_line_pairs_on_malformed_json() {
        let text = "[{not json\n1. What is X?\nX is Y.";
        let cards = parse_flashcards(text);
        assert_eq!(cards, vec![Flashcard::new("What is X?", "X is Y.")]);
    }

    #[test]
    fn line_heuristic_strips_numbering_on_both_lines() {
        let text = "1. What is photosynthesis?\n2) The process plants use to make food.\nNot a question line\n3. Why is the sky blue?\n- Rayleigh scattering.";
        let cards = parse_flashcards(text);
        assert_eq!(
            cards,
            vec![
                Flashcard::new("What is photosynthesis?", "The process plants use to make food."),
                Flashcard::new("Why is the sky blue?", "Rayleigh scattering."),
            ]
        );
    }

    #[test]
    fn unpaired_question_line_yields_nothing() {
        assert!(parse_flashcards("What is X?").is_empty());
        assert!(parse_flashcards("").is_empty());
    }
}

//! Prompt composition from retrieved evidence.
//!
//! Pure functions: no state, no side effects, byte-identical output for
//! identical inputs.

use crate::config::Prompts;
use crate::search::EvidenceSnippet;
use std::collections::HashMap;

/// Render evidence snippets into the context block, in retrieval order.
///
/// Order reflects ranking and is preserved, never re-sorted.
pub fn format_context(evidence: &[EvidenceSnippet]) -> String {
    evidence
        .iter()
        .map(|snippet| {
            format!(
                "A: {}\nV: {}\nL: {}",
                snippet.text, snippet.source_title, snippet.external_link
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the answer-generation prompt from a question and its evidence.
///
/// Empty evidence yields a prompt with an empty context block; the model is
/// instructed not to invent sources, so that case degrades gracefully.
pub fn build_answer_prompt(prompts: &Prompts, question: &str, evidence: &[EvidenceSnippet]) -> String {
    let mut vars = HashMap::new();
    vars.insert("question".to_string(), question.to_string());
    vars.insert("context".to_string(), format_context(evidence));

    prompts.render_with_custom(&prompts.answer.user, &vars)
}

/// Build the self-evaluation prompt from a question and the already
/// generated answer. The evidence is deliberately not included.
pub fn build_evaluation_prompt(prompts: &Prompts, question: &str, answer: &str) -> String {
    let mut vars = HashMap::new();
    vars.insert("question".to_string(), question.to_string());
    vars.insert("answer".to_string(), answer.to_string());

    prompts.render_with_custom(&prompts.evaluation.user, &vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(id: &str, text: &str) -> EvidenceSnippet {
        EvidenceSnippet {
            id: id.to_string(),
            text: text.to_string(),
            source_title: format!("Video {}", id),
            external_link: format!("https://youtube.com/watch?v={}&t=10s", id),
            collection: "Audio Signal Processing for ML".to_string(),
        }
    }

    #[test]
    fn test_context_preserves_retrieval_order() {
        let evidence = vec![
            snippet("1", "first excerpt"),
            snippet("2", "second excerpt"),
            snippet("3", "third excerpt"),
        ];
        let context = format_context(&evidence);

        let first = context.find("first excerpt").unwrap();
        let second = context.find("second excerpt").unwrap();
        let third = context.find("third excerpt").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_answer_prompt_contains_question_and_all_snippets() {
        let prompts = Prompts::default();
        let evidence: Vec<_> = (0..5)
            .map(|i| snippet(&i.to_string(), &format!("excerpt number {}", i)))
            .collect();

        let prompt = build_answer_prompt(&prompts, "What is a spectrogram?", &evidence);

        assert!(prompt.contains("What is a spectrogram?"));
        for s in &evidence {
            assert!(prompt.contains(&s.text));
            assert!(prompt.contains(&s.external_link));
        }
    }

    #[test]
    fn test_answer_prompt_idempotent() {
        let prompts = Prompts::default();
        let evidence = vec![snippet("1", "an excerpt")];

        let a = build_answer_prompt(&prompts, "What is MFCC?", &evidence);
        let b = build_answer_prompt(&prompts, "What is MFCC?", &evidence);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_evidence_is_not_an_error() {
        let prompts = Prompts::default();
        let prompt = build_answer_prompt(&prompts, "What is MFCC?", &[]);

        assert!(prompt.contains("What is MFCC?"));
        assert!(prompt.contains("CONTEXT"));
    }

    #[test]
    fn test_evaluation_prompt_embeds_answer_not_evidence() {
        let prompts = Prompts::default();
        let prompt = build_evaluation_prompt(
            &prompts,
            "What is MFCC?",
            "MFCC stands for mel-frequency cepstral coefficients.",
        );

        assert!(prompt.contains("What is MFCC?"));
        assert!(prompt.contains("mel-frequency cepstral coefficients"));
        assert!(prompt.contains("NON_RELEVANT"));
    }
}

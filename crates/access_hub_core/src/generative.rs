//! crates/access_hub_core/src/generative.rs
//!
//! The generative content client: fixed natural-language instruction
//! templates for the content-transformation operations, executed through the
//! `GenerativeModel` port. Every operation resolves to a [`Generated`]
//! outcome with a safe fallback value; nothing propagates past this
//! boundary.

use std::sync::Arc;

use tracing::warn;

use crate::domain::Flashcard;
use crate::flashcards::parse_flashcards;
use crate::ports::GenerativeModel;

/// Target reading level for text simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingLevel {
    /// 5th-grade vocabulary and sentence length.
    VerySimple,
    /// 8th-grade reading level.
    #[default]
    Simple,
    /// 10th-grade reading level, technical accuracy preserved.
    Medium,
}

/// Outcome of one generative operation. `error` is set when the model call
/// failed and `value` holds the operation's safe fallback instead of fresh
/// output.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    pub error: Option<String>,
}

impl<T> Generated<T> {
    fn fresh(value: T) -> Self {
        Self { value, error: None }
    }

    fn fallback(value: T, error: String) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Stateless request builder over a single generative model endpoint.
pub struct GenerativeContent {
    model: Arc<dyn GenerativeModel>,
}

impl GenerativeContent {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Simplifies text to the requested reading level. Falls back to the
    /// original text so the reader always has something to show.
    pub async fn simplify_text(
        &self,
        text: &str,
        level: ReadingLevel,
        context: Option<&str>,
    ) -> Generated<String> {
        let instruction = match level {
            ReadingLevel::Simple => {
                "Simplify the following text to an 8th-grade reading level. Keep all important information but use simpler words and shorter sentences:"
            }
            ReadingLevel::VerySimple => {
                "Simplify the following text to a 5th-grade reading level. Use very simple words and short sentences:"
            }
            ReadingLevel::Medium => {
                "Simplify the following text to a 10th-grade reading level. Make it easier to understand while maintaining technical accuracy:"
            }
        };
        let prompt = with_context(format!("{instruction}\n\n{text}"), context);
        match self.model.generate(&prompt).await {
            Ok(simplified) => Generated::fresh(simplified),
            Err(e) => {
                warn!("simplification failed, returning original text: {e}");
                Generated::fallback(text.to_string(), e.to_string())
            }
        }
    }

    /// Summarizes text in about `max_words` words.
    pub async fn summarize(
        &self,
        text: &str,
        max_words: usize,
        context: Option<&str>,
    ) -> Generated<String> {
        let prompt = with_context(
            format!(
                "Provide a comprehensive summary of the following text in about {max_words} words. Focus on key points and main ideas:\n\n{text}"
            ),
            context,
        );
        self.text_op("summary", &prompt, String::new()).await
    }

    /// Generates accessible alternative text for an image.
    pub async fn describe_image(
        &self,
        image: &[u8],
        mime: &str,
        context: Option<&str>,
    ) -> Generated<String> {
        let prompt = with_context(
            "Generate a detailed, accessible alternative text description for this image. The description should be clear and helpful for visually impaired users. Include important visual details, text in the image, and the overall purpose or message of the image.".to_string(),
            context,
        );
        self.image_op(
            "image description",
            &prompt,
            image,
            mime,
            "Unable to generate description".to_string(),
        )
        .await
    }

    /// Explains a mathematical equation in plain language.
    pub async fn explain_math(&self, equation: &str, context: Option<&str>) -> Generated<String> {
        let prompt = with_context(
            format!(
                "Explain the following mathematical equation in simple, plain language. Break down what each part means and provide a step-by-step explanation:\n\nEquation: {equation}\n\nProvide:\n1. What the equation represents\n2. Explanation of each component\n3. Step-by-step solution (if applicable)"
            ),
            context,
        );
        self.text_op("math explanation", &prompt, String::new())
            .await
    }

    /// Describes a flowchart or diagram as linear text.
    pub async fn describe_diagram(
        &self,
        image: &[u8],
        mime: &str,
        context: Option<&str>,
    ) -> Generated<String> {
        let prompt = with_context(
            "Describe this flowchart or diagram in a clear, linear text format that can be easily understood by someone who cannot see the visual representation. Include:\n1. The overall purpose\n2. Each step in sequence\n3. Decision points and branches\n4. Final outcomes".to_string(),
            context,
        );
        self.image_op("diagram description", &prompt, image, mime, String::new())
            .await
    }

    /// Extracts the `count` most important key points as a numbered list.
    pub async fn extract_key_points(
        &self,
        text: &str,
        count: usize,
        context: Option<&str>,
    ) -> Generated<String> {
        let prompt = with_context(
            format!(
                "Extract the {count} most important key points from the following text. Present them as a numbered list:\n\n{text}"
            ),
            context,
        );
        self.text_op("key points", &prompt, String::new()).await
    }

    /// Generates study flashcards. The model is asked for a JSON array; the
    /// parser tolerates malformed output (see [`parse_flashcards`]).
    pub async fn generate_flashcards(
        &self,
        text: &str,
        count: usize,
        context: Option<&str>,
    ) -> Generated<Vec<Flashcard>> {
        let prompt = with_context(
            format!(
                "Create {count} study flashcards from the following text. Respond with ONLY a JSON array of objects with \"question\" and \"answer\" string fields, no other text:\n\n{text}"
            ),
            context,
        );
        match self.model.generate(&prompt).await {
            Ok(raw) => Generated::fresh(parse_flashcards(&raw)),
            Err(e) => {
                warn!("flashcard generation failed: {e}");
                Generated::fallback(Vec::new(), e.to_string())
            }
        }
    }

    /// Describes a chemistry diagram or molecular structure.
    pub async fn describe_chemistry(
        &self,
        image: &[u8],
        mime: &str,
        context: Option<&str>,
    ) -> Generated<String> {
        let prompt = with_context(
            "Describe this chemistry diagram or molecular structure in detail for a visually impaired student. Include:\n1. The type of diagram (molecular structure, reaction, etc.)\n2. Elements and compounds present\n3. Bonds and connections\n4. Overall chemical significance".to_string(),
            context,
        );
        self.image_op("chemistry description", &prompt, image, mime, String::new())
            .await
    }

    async fn text_op(&self, op: &str, prompt: &str, fallback: String) -> Generated<String> {
        match self.model.generate(prompt).await {
            Ok(value) => Generated::fresh(value),
            Err(e) => {
                warn!("{op} failed: {e}");
                Generated::fallback(fallback, e.to_string())
            }
        }
    }

    async fn image_op(
        &self,
        op: &str,
        prompt: &str,
        image: &[u8],
        mime: &str,
        fallback: String,
    ) -> Generated<String> {
        match self.model.generate_with_image(prompt, image, mime).await {
            Ok(value) => Generated::fresh(value),
            Err(e) => {
                warn!("{op} failed: {e}");
                Generated::fallback(fallback, e.to_string())
            }
        }
    }
}

/// Appends the optional per-user context string so the model can tailor
/// vocabulary and examples to the reader.
fn with_context(prompt: String, context: Option<&str>) -> String {
    match context {
        Some(ctx) if !ctx.trim().is_empty() => {
            format!("{prompt}\n\nContext about the reader: {ctx}")
        }
        _ => prompt,
    }
}

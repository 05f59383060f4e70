//! Newsletter generation: reference scrape, one model call, markup parse.

use crate::config::{GeneratorConfig, ScrapeFailurePolicy};
use crate::draft::NewsletterDraft;
use crate::markup::parse_content;
use crate::model::{GeminiModel, GenerationRequest, TextModel};
use crate::outcome::{Failure, OperationResult};
use crate::scrape::{PageScraper, ReferenceSource, SCRAPE_FAILED, legacy_error_text};
use crate::Result;

/// Message carried by generation failures.
pub const GENERATION_FAILED: &str = "Content not generated";

/// Builds the system instruction that pins the model to the star markup.
pub fn system_instruction(reference: &str, category: &str) -> String {
    format!(
        "You are a newsletter generating AI. Keep the title within * symbols, subtitles within ** symbols, \
         paragraphs within *** symbols, and keep the tags within two **** symbols, each tag separated by a comma. \
         The newsletter belongs to the \"{category}\" category. \
         Generate the newsletter taking reference from here: {reference} \
         and keep the title relative to the user input and the reference data provided."
    )
}

/// Drafts newsletters from a reference source and a text model.
pub struct ContentGenerator<S, M> {
    source: S,
    model: M,
    config: GeneratorConfig,
}

impl ContentGenerator<PageScraper, GeminiModel> {
    /// HTTP scraper plus Gemini, configured from `config`.
    pub fn from_api_key(api_key: &str, config: GeneratorConfig) -> Result<Self> {
        let source = PageScraper::new(config.scrape.clone())?;
        let model = GeminiModel::new(api_key, config.model.clone())?;
        Ok(Self::new(source, model, config))
    }
}

impl<S: ReferenceSource, M: TextModel> ContentGenerator<S, M> {
    pub fn new(source: S, model: M, config: GeneratorConfig) -> Self {
        Self { source, model, config }
    }

    /// Drafts a newsletter titled after `title` from the page at `reference_link`.
    pub async fn generate(&self, title: &str, category: &str, reference_link: &str) -> OperationResult<NewsletterDraft> {
        let reference = match self.source.fetch_reference(reference_link).await {
            Ok(text) => text,
            Err(e) => match self.config.on_scrape_failure {
                ScrapeFailurePolicy::Abort => {
                    tracing::warn!(url = reference_link, error = %e, "reference scrape failed, not generating");
                    return Err(Failure::from_error(GENERATION_FAILED, &e));
                }
                ScrapeFailurePolicy::PassThrough => {
                    tracing::warn!(url = reference_link, error = %e, "reference scrape failed, passing error text through");
                    legacy_error_text(&Failure::from_error(SCRAPE_FAILED, &e))
                }
            },
        };

        let request = GenerationRequest {
            system_instruction: system_instruction(&reference, category),
            prompt: title.to_string(),
            max_output_tokens: self.config.model.max_output_tokens,
            temperature: self.config.model.temperature,
        };

        let raw = self.model.generate(&request).await.map_err(|e| {
            tracing::warn!(error = %e, "generation failed");
            Failure::from_error(GENERATION_FAILED, &e)
        })?;

        let draft = parse_content(&raw, category);
        tracing::info!(title = %draft.title, sections = draft.content.len(), "newsletter drafted");
        Ok(draft)
    }
}

/// Drafts a newsletter with the default scraper and Gemini settings.
pub async fn generate_content(title: &str, category: &str, link: &str, api_key: &str) -> OperationResult<NewsletterDraft> {
    generate_content_with_config(title, category, link, api_key, &GeneratorConfig::default()).await
}

/// Drafts a newsletter with custom settings.
pub async fn generate_content_with_config(
    title: &str,
    category: &str,
    link: &str,
    api_key: &str,
    config: &GeneratorConfig,
) -> OperationResult<NewsletterDraft> {
    let generator = ContentGenerator::from_api_key(api_key, config.clone())
        .map_err(|e| Failure::from_error(GENERATION_FAILED, &e))?;
    generator.generate(title, category, link).await
}

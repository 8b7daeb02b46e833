//! Narrative insight generation
//!
//! Each variant builds one prompt, makes one completion call and never fails:
//! when the provider cannot answer, a fixed sentence naming the company (and
//! the category, where there is one) is returned instead.

use std::sync::Arc;

use super::catalog::Catalog;
use super::completion::{CompletionClient, CompletionError, CompletionRequest, Sampling};
use super::prompts::{self, GuidanceTemplate};
use crate::config::ModelConfig;
use crate::server::models::research::{Insight, ResearchRecord};

const ANALYSIS: Sampling = Sampling::new(0.3, 500, 60);
const RECOMMENDATION: Sampling = Sampling::new(0.6, 200, 45);
const PANEL: Sampling = Sampling::new(0.5, 150, 30);
const GUIDANCE: Sampling = Sampling::new(0.1, 50, 30);
const HIRING_GUIDANCE: Sampling = Sampling::new(0.2, 60, 30);
const SPEECH_LINE: Sampling = Sampling::new(0.3, 100, 10);

/// Canned panel text used when a category has no research
pub fn panel_no_data(category: &str) -> String {
  format!("No data available for {category} analysis.")
}

pub struct InsightGenerator {
  completion: CompletionClient,
  models: ModelConfig,
  catalog: Arc<Catalog>,
}

impl InsightGenerator {
  pub fn new(completion: CompletionClient, models: ModelConfig, catalog: Arc<Catalog>) -> Self {
    Self { completion, models, catalog }
  }

  fn provider(&self) -> &str {
    &self.catalog.provider
  }

  /// Run one completion; empty content counts as a failure
  async fn generate(
    &self,
    variant: &str,
    model: &str,
    prompt: String,
    sampling: Sampling,
    attributed: bool,
  ) -> Result<String, CompletionError> {
    let request = CompletionRequest { model: model.to_string(), prompt, sampling, attributed };
    match self.completion.complete(&request).await {
      Ok(text) if text.is_empty() => {
        tracing::warn!(variant, "completion returned empty content");
        Err(CompletionError::NoChoices)
      }
      Ok(text) => Ok(text),
      Err(e) => {
        tracing::warn!(variant, "completion failed: {e}");
        Err(e)
      }
    }
  }

  /// Long-form summary of a full research record
  pub async fn analyze_company(&self, record: &ResearchRecord) -> String {
    let company = &record.company_name;
    match self.generate("analysis", &self.models.primary, prompts::analysis(record), ANALYSIS, false).await {
      Ok(text) => text,
      Err(e) if e.is_transport() => {
        format!("Analysis for {company} is unavailable due to a connection error.")
      }
      Err(_) => format!("Analysis for {company} is unavailable. Please check the API key configuration."),
    }
  }

  /// Sales recommendation for one category, grounded in the catalog
  pub async fn category_recommendation(&self, category: &str, insights: &[Insight], company_name: &str) -> String {
    if insights.is_empty() {
      return format!("No {category} data available for {company_name}.");
    }

    let prompt =
      prompts::category_recommendation(&self.catalog, category, company_name, &prompts::insight_digest(insights));
    match self.generate("recommendation", &self.models.primary, prompt, RECOMMENDATION, false).await {
      Ok(text) => text,
      Err(e) if e.is_transport() => format!(
        "Based on {company_name}'s {category} data, {} can provide strategic solutions to accelerate their digital transformation.",
        self.provider()
      ),
      Err(_) => format!(
        "For {company_name}, our {category} analysis shows opportunities where {}'s expertise can drive transformation.",
        self.provider()
      ),
    }
  }

  /// Two or three sentence insight for the category panel
  pub async fn panel_insight(&self, category: &str, insights: &[Insight], company_name: &str) -> String {
    if insights.is_empty() {
      return panel_no_data(category);
    }

    let prompt = prompts::panel_insight(&self.catalog, category, company_name, &prompts::insight_digest(insights));
    match self.generate("panel", &self.models.primary, prompt, PANEL, false).await {
      Ok(text) => text,
      Err(e) if e.is_transport() => format!(
        "Key {category} insights for {company_name} reveal strategic opportunities for digital transformation."
      ),
      Err(_) => format!(
        "Analysis shows {company_name} has opportunities in {category} that align with {}'s expertise.",
        self.provider()
      ),
    }
  }

  /// Short spoken guidance for the sales team derived from a recommendation
  ///
  /// Hiring categories get a talent-focused prompt; everything else is shaped
  /// by `template`, which the caller chooses.
  pub async fn ceo_guidance(
    &self,
    recommendation: &str,
    company_name: &str,
    category: &str,
    template: GuidanceTemplate,
  ) -> String {
    let (prompt, sampling) = if category.eq_ignore_ascii_case("hiring") {
      (prompts::hiring_guidance(&self.catalog, company_name, recommendation), HIRING_GUIDANCE)
    } else {
      (prompts::ceo_guidance(&self.catalog, template, company_name, recommendation), GUIDANCE)
    };

    match self.generate("guidance", &self.models.primary, prompt, sampling, false).await {
      Ok(text) => text,
      Err(e) if e.is_transport() => format!(
        "{company_name} seeks transformation. I urge the sales team to engage {} solutions.",
        self.provider()
      ),
      Err(_) => format!(
        "{company_name} focuses on growth. I urge the sales team to position {} strategically.",
        self.provider()
      ),
    }
  }

  /// One-sentence line meant to be read aloud, produced by the compact model
  pub async fn speech_line(&self, insight: &str, company_name: &str, category: &str) -> String {
    let fallback = format!("{company_name} benefits from {} solutions.", self.provider());
    if insight.is_empty() || !self.completion.has_api_key() {
      return fallback;
    }

    let prompt = prompts::speech_line(&self.catalog, company_name, category, insight);
    match self.generate("speech_line", &self.models.compact, prompt, SPEECH_LINE, true).await {
      Ok(text) => {
        let line = strip_quotes(&text);
        if line.is_empty() {
          fallback
        } else {
          line.to_string()
        }
      }
      Err(_) => fallback,
    }
  }
}

fn strip_quotes(text: &str) -> &str {
  text.trim_matches('"').trim_matches('\'')
}

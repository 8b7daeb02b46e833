//! Prompt text for each generation variant

use rand::Rng;
use std::fmt::Write;

use super::catalog::Catalog;
use crate::server::models::clip_chars;
use crate::server::models::research::{Insight, ResearchRecord};

/// Character budget for the research digest in the full analysis
pub const ANALYSIS_BUDGET: usize = 8000;
/// Character budget for category snippets in recommendations and panel insights
pub const CATEGORY_BUDGET: usize = 1500;
/// Insights considered per category
pub const CATEGORY_INSIGHTS: usize = 3;

/// Sentence shapes the CEO guidance is asked to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidanceTemplate {
  Struggling,
  Challenge,
  Needs,
}

impl GuidanceTemplate {
  pub const ALL: [GuidanceTemplate; 3] =
    [GuidanceTemplate::Struggling, GuidanceTemplate::Challenge, GuidanceTemplate::Needs];

  /// Choose a template uniformly at random
  pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
    Self::ALL[rng.random_range(0..Self::ALL.len())]
  }

  pub fn sentence(&self, company_name: &str) -> String {
    match self {
      GuidanceTemplate::Struggling => {
        format!("Team, {company_name} is struggling with [problem], here's my play: [solutions]. Let's land this deal!")
      }
      GuidanceTemplate::Challenge => {
        "Listen up, their challenge is [problem], I'm pitching [solutions]. Time to make it happen!".to_string()
      }
      GuidanceTemplate::Needs => {
        "This client needs [problem], my recommendation: [solutions]. Let's close strong!".to_string()
      }
    }
  }
}

/// Flatten a research record into a bulleted digest, clipped to [`ANALYSIS_BUDGET`]
pub fn research_digest(record: &ResearchRecord) -> String {
  let mut text = format!("Company: {}\n", record.company_name);
  for (category, research) in &record.categories {
    let _ = writeln!(text, "\n{}:", category.as_str().to_uppercase());
    for insight in &research.insights {
      let _ = writeln!(text, "- {}: {}", insight.title, insight.snippet);
    }
  }

  if !record.latest_news.is_empty() {
    text.push_str("\nLATEST NEWS:\n");
    for news in &record.latest_news {
      let _ = writeln!(text, "- {} ({})", news.title, news.source);
    }
  }

  clip_chars(&text, ANALYSIS_BUDGET).to_string()
}

/// Join the first few insights into one line, clipped to [`CATEGORY_BUDGET`]
pub fn insight_digest(insights: &[Insight]) -> String {
  let text: String = insights
    .iter()
    .take(CATEGORY_INSIGHTS)
    .map(|insight| format!("{}: {} ", insight.title, insight.snippet))
    .collect();
  clip_chars(&text, CATEGORY_BUDGET).to_string()
}

pub fn analysis(record: &ResearchRecord) -> String {
  format!(
    "Analyze this company research and write a concise, engaging summary.\n\
     Focus on business opportunities, challenges and strategic insights.\n\
     Stay under 300 words.\n\n\
     {}\n\n\
     Your analysis:",
    research_digest(record)
  )
}

pub fn category_recommendation(catalog: &Catalog, category: &str, company_name: &str, digest: &str) -> String {
  format!(
    "You are {speaker}. Study this {category} research about {company_name} and write a sales \
     recommendation drawn from the whole portfolio below.\n\n\
     Requirements:\n\
     1. Open with domain consulting for {company_name}'s industry and the exact {category} problem.\n\
     2. Recommend 3 to 5 distinct digital services that address it.\n\
     3. Name 2 or 3 proprietary platforms that fit.\n\
     4. Spread recommendations across the catalog instead of repeating the same few platforms.\n\
     5. State the business value of each recommendation.\n\n\
     {provider} CATALOG:\n{rendered}\n\n\
     RESEARCH ({category}):\n{digest}\n\n\
     Your recommendation:",
    speaker = catalog.speaker(),
    provider = catalog.provider.to_uppercase(),
    rendered = catalog.render(),
  )
}

pub fn panel_insight(catalog: &Catalog, category: &str, company_name: &str, digest: &str) -> String {
  format!(
    "Using this {category} research about {company_name}, write a 2 to 3 sentence business insight that \
     identifies the key opportunity or challenge, explains why it matters to {company_name}, and suggests \
     which {provider} offerings can help. Be specific and actionable rather than repeating the raw data.\n\n\
     {provider} OFFERINGS:\n{rendered}\n\n\
     RESEARCH ({category}):\n{digest}\n\n\
     Business insight:",
    provider = catalog.provider,
    rendered = catalog.render(),
  )
}

pub fn ceo_guidance(catalog: &Catalog, template: GuidanceTemplate, company_name: &str, recommendation: &str) -> String {
  format!(
    "As {speaker}, write guidance for the sales team using exactly this format:\n\n\
     {sentence}\n\n\
     Replace [problem] with the specific issue from the research and [solutions] with one or two \
     {provider} services or platforms. Stay under 25 words and be direct.\n\n\
     Research: {recommendation}",
    speaker = catalog.speaker(),
    sentence = template.sentence(company_name),
    provider = catalog.provider,
  )
}

pub fn hiring_guidance(catalog: &Catalog, company_name: &str, recommendation: &str) -> String {
  format!(
    "As {speaker}, read this hiring research about {company_name} and brief the sales team.\n\n\
     {recommendation}\n\n\
     Name the technology roles being hired (AI, data science, cloud, infrastructure and so on) and explain \
     how {provider} can supply that specialized talent.\n\
     Format: \"{company_name} is expanding its tech workforce with roles in X, Y, Z. Position {provider} as \
     the partner supplying these specialists.\"\n\
     Stay under 30 words and be specific about the roles.",
    speaker = catalog.speaker(),
    provider = catalog.provider,
  )
}

pub fn speech_line(catalog: &Catalog, company_name: &str, category: &str, insight: &str) -> String {
  format!(
    "As {speaker}, give your sales team one spoken line (under 25 words) on how to sell to {company_name}.\n\n\
     Insight ({category}): {insight}\n\n\
     Shape: \"Team, {company_name} needs [problem], pitch [{provider} solution] to [benefit].\"\n\
     Reply with the guidance sentence only.",
    speaker = catalog.speaker(),
    provider = catalog.provider,
  )
}

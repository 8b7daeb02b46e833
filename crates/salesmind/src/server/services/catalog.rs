//! Product catalog used as grounding context in generation prompts

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../../../catalog/default_catalog.yaml");

#[derive(Error, Debug)]
pub enum CatalogError {
  #[error("unable to read catalog: {0}")]
  Io(#[from] std::io::Error),

  #[error("invalid catalog: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("catalog has no sections")]
  Empty,
}

/// Services and platforms the sales team can pitch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
  /// Company selling the catalog
  pub provider: String,
  /// Executive whose voice the guidance prompts adopt
  #[serde(default)]
  pub spokesperson: Option<String>,
  pub sections: Vec<CatalogSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSection {
  pub title: String,
  #[serde(default)]
  pub items: Vec<String>,
}

impl Catalog {
  pub fn load(path: &Path) -> Result<Self, CatalogError> {
    let text = std::fs::read_to_string(path)?;
    Self::parse(&text)
  }

  /// The catalog compiled into the binary
  pub fn builtin() -> Result<Self, CatalogError> {
    Self::parse(BUILTIN_CATALOG)
  }

  pub fn parse(text: &str) -> Result<Self, CatalogError> {
    let catalog: Catalog = serde_yaml::from_str(text)?;
    if catalog.sections.is_empty() {
      return Err(CatalogError::Empty);
    }
    Ok(catalog)
  }

  /// How the speaker is introduced in prompts, e.g. "Venu, CEO of LTIMindtree"
  pub fn speaker(&self) -> String {
    match &self.spokesperson {
      Some(name) => format!("{name}, CEO of {}", self.provider),
      None => format!("the CEO of {}", self.provider),
    }
  }

  /// Plain-text rendering with upper-cased section headings and bulleted items
  pub fn render(&self) -> String {
    let mut text = String::new();
    for section in &self.sections {
      let _ = writeln!(text, "{}:", section.title.to_uppercase());
      for item in &section.items {
        let _ = writeln!(text, "- {item}");
      }
      text.push('\n');
    }
    text.trim_end().to_string()
  }
}

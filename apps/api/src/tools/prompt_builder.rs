//! Prompt builder: turns a `GenerationRequest` into the final prompt text.

use std::collections::BTreeMap;

use crate::llm_client::error::GenerationError;
use crate::llm_client::prompts::{banned_phrases, render, JSON_ONLY_INSTRUCTION};
use crate::models::task::{TaskKind, Variant};
use crate::tools::catalog;

/// A single prompt parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
}

impl ParamValue {
    fn render(&self) -> String {
        match self {
            ParamValue::Text(text) => text.clone(),
            ParamValue::List(items) => items.join(", "),
            ParamValue::Flag(true) => "yes".to_string(),
            ParamValue::Flag(false) => "no".to_string(),
        }
    }
}

/// Everything needed to render one prompt. Immutable once built.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub task: TaskKind,
    parameters: BTreeMap<&'static str, ParamValue>,
    variant: Option<Variant>,
}

impl GenerationRequest {
    pub fn new(task: TaskKind) -> Self {
        Self {
            task,
            parameters: BTreeMap::new(),
            variant: None,
        }
    }

    pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.parameters.insert(name, ParamValue::Text(value.into()));
        self
    }

    pub fn list(mut self, name: &'static str, values: Vec<String>) -> Self {
        self.parameters.insert(name, ParamValue::List(values));
        self
    }

    pub fn flag(mut self, name: &'static str, value: bool) -> Self {
        self.parameters.insert(name, ParamValue::Flag(value));
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }
}

/// Renders the prompt for `request`. Pure: the same request always yields the same text.
pub fn build(request: &GenerationRequest) -> Result<String, GenerationError> {
    let template = catalog::template_for(request.task, request.variant)?;

    render(template, |name| match name {
        "json_only" => Some(JSON_ONLY_INSTRUCTION.to_string()),
        "banned_phrases" => Some(banned_phrases()),
        _ => catalog::fragment(request.variant, name)
            .map(str::to_string)
            .or_else(|| request.parameters.get(name).map(ParamValue::render)),
    })
    .map_err(|missing| {
        GenerationError::Configuration(format!(
            "unresolved placeholders in {:?} template: {}",
            request.task,
            missing.join(", ")
        ))
    })
}

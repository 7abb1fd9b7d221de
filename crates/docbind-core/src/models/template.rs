//! Extraction templates: sections of typed fields, each with an extraction
//! method.
//!
//! The JSON shape matches what template authors write by hand:
//!
//! ```json
//! {
//!   "name": "Invoice",
//!   "category": "finance",
//!   "version": 1,
//!   "sections": [{
//!     "id": "s1", "name": "Header",
//!     "fields": [{
//!       "id": "f1", "name": "Invoice No", "type": "text", "required": true,
//!       "extraction": { "method": "regex", "regex": "INV-(\\d+)" }
//!     }]
//!   }]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DocbindError, Result, StrategyError};
use crate::models::region::Region;

/// A user-authored schema of fields to extract from a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Template identifier.
    #[serde(default)]
    pub id: String,

    /// Display name. Must not be empty.
    pub name: String,

    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Category tag.
    #[serde(default)]
    pub category: String,

    /// Template revision.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Ordered sections. May be empty.
    pub sections: Vec<Section>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

/// Named group of fields. Grouping only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Semantic type of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Date,
    Select,
    MultiSelect,
    Array,
}

impl FieldType {
    /// Short description used in model instructions.
    pub fn description(&self) -> &'static str {
        match self {
            FieldType::Text => "文本类型",
            FieldType::Number => "数字类型",
            FieldType::Date => "日期类型",
            FieldType::Select => "选择类型",
            FieldType::MultiSelect => "多选类型",
            FieldType::Array => "数组类型",
        }
    }
}

/// Optional validation rule attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

/// A single field to extract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,

    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: FieldType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// How values for this field are found.
    pub extraction: ExtractionSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRule>,

    /// Allowed values for select types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    /// The field may legitimately carry several values.
    #[serde(default)]
    pub allow_multiple: bool,
}

impl Field {
    /// Create a text field with the given extraction method.
    pub fn new(id: impl Into<String>, name: impl Into<String>, method: ExtractionMethod) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: FieldType::Text,
            required: false,
            description: None,
            extraction: ExtractionSpec {
                method,
                prompt: None,
            },
            validation: None,
            options: None,
            allow_multiple: false,
        }
    }

    /// Set the field type.
    pub fn with_kind(mut self, kind: FieldType) -> Self {
        self.kind = kind;
        self
    }

    /// Set the extraction hint.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.extraction.prompt = Some(prompt.into());
        self
    }

    /// Allow several values.
    pub fn with_allow_multiple(mut self, allow_multiple: bool) -> Self {
        self.allow_multiple = allow_multiple;
        self
    }

    /// Whether every found value should be selected, not just the best one.
    pub fn accepts_multiple(&self) -> bool {
        self.allow_multiple || matches!(self.kind, FieldType::MultiSelect | FieldType::Array)
    }

    /// The free-text extraction hint, if any.
    pub fn prompt(&self) -> Option<&str> {
        self.extraction.prompt.as_deref()
    }
}

/// Extraction method with exactly the inputs it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionMethod {
    /// Keyword lookup in OCR text.
    Ocr,
    /// Ask the vision model.
    Ai,
    /// Vision model, reserved for combined strategies.
    Hybrid,
    /// Regular expression over the full text.
    Regex { pattern: String },
    /// OCR words inside a page rectangle.
    Position { region: Region },
    /// A known method whose required input is missing.
    Misconfigured { method: String, error: StrategyError },
    /// A method name this crate does not know.
    Unknown { method: String },
}

impl ExtractionMethod {
    /// Wire name of the method.
    pub fn name(&self) -> &str {
        match self {
            ExtractionMethod::Ocr => "ocr",
            ExtractionMethod::Ai => "ai",
            ExtractionMethod::Hybrid => "hybrid",
            ExtractionMethod::Regex { .. } => "regex",
            ExtractionMethod::Position { .. } => "position",
            ExtractionMethod::Misconfigured { method, .. } => method,
            ExtractionMethod::Unknown { method } => method,
        }
    }
}

/// Per-field extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawExtractionSpec", into = "RawExtractionSpec")]
pub struct ExtractionSpec {
    pub method: ExtractionMethod,
    /// Free-text hint passed to the model.
    pub prompt: Option<String>,
}

/// Flat wire shape of [`ExtractionSpec`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawExtractionSpec {
    #[serde(default)]
    method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Region>,
}

impl From<RawExtractionSpec> for ExtractionSpec {
    fn from(raw: RawExtractionSpec) -> Self {
        let method = match raw.method.as_str() {
            "ocr" => ExtractionMethod::Ocr,
            "ai" => ExtractionMethod::Ai,
            "hybrid" => ExtractionMethod::Hybrid,
            "regex" => match raw.regex.filter(|p| !p.is_empty()) {
                Some(pattern) => ExtractionMethod::Regex { pattern },
                None => ExtractionMethod::Misconfigured {
                    method: raw.method.clone(),
                    error: StrategyError::MissingPattern,
                },
            },
            "position" => match raw.position {
                Some(region) => ExtractionMethod::Position { region },
                None => ExtractionMethod::Misconfigured {
                    method: raw.method.clone(),
                    error: StrategyError::MissingPosition,
                },
            },
            _ => ExtractionMethod::Unknown { method: raw.method },
        };

        Self {
            method,
            prompt: raw.prompt.filter(|p| !p.trim().is_empty()),
        }
    }
}

impl From<ExtractionSpec> for RawExtractionSpec {
    fn from(spec: ExtractionSpec) -> Self {
        let mut raw = RawExtractionSpec {
            method: spec.method.name().to_string(),
            prompt: spec.prompt,
            ..Default::default()
        };
        match spec.method {
            ExtractionMethod::Regex { pattern } => raw.regex = Some(pattern),
            ExtractionMethod::Position { region } => raw.position = Some(region),
            _ => {}
        }
        raw
    }
}

impl Template {
    /// Create an empty template.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            category: String::new(),
            version: 1,
            sections: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// All fields in section order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    /// Number of fields across all sections.
    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|s| s.fields.len()).sum()
    }

    /// Parse a template from JSON and give it a fresh identity.
    pub fn import(json: &str) -> Result<Self> {
        let mut template: Template = serde_json::from_str(json)
            .map_err(|e| DocbindError::Template(format!("invalid template format: {e}")))?;

        if template.name.trim().is_empty() {
            return Err(DocbindError::Template("template name is empty".to_string()));
        }

        let now = Utc::now();
        template.id = format!("template_{}", now.timestamp_millis());
        template.created_at = now;
        template.updated_at = now;
        Ok(template)
    }

    /// Check the template for problems. Returns human-readable issues.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push("Template name is empty".to_string());
        }

        for field in self.fields() {
            match &field.extraction.method {
                ExtractionMethod::Regex { pattern } => {
                    if let Err(e) = regex::Regex::new(pattern) {
                        issues.push(format!("Field '{}': invalid regex: {}", field.name, e));
                    }
                }
                ExtractionMethod::Misconfigured { method, error } => {
                    issues.push(format!("Field '{}' ({}): {}", field.name, method, error));
                }
                ExtractionMethod::Unknown { method } => {
                    issues.push(format!(
                        "Field '{}': unknown extraction method '{}'",
                        field.name, method
                    ));
                }
                _ => {}
            }

            if matches!(field.kind, FieldType::Select | FieldType::MultiSelect)
                && field.options.as_ref().is_none_or(|o| o.is_empty())
            {
                issues.push(format!("Field '{}': select field has no options", field.name));
            }
        }

        issues
    }
}

impl Section {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a resolved target is used for. Drives which action wrappers get
/// generated for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementRole {
    Input,
    Clickable,
    Text,
    Endpoint,
}

impl ElementRole {
    /// Infer a UI role from the observed tag and input type.
    pub fn infer(tag: &str, input_type: Option<&str>) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "input" => match input_type.map(|t| t.to_ascii_lowercase()).as_deref() {
                Some("submit" | "button" | "reset" | "checkbox" | "radio" | "image") => {
                    ElementRole::Clickable
                }
                _ => ElementRole::Input,
            },
            "textarea" | "select" => ElementRole::Input,
            "button" | "a" | "summary" => ElementRole::Clickable,
            _ => ElementRole::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Variant name as written in Rust source, e.g. `Post`.
    pub fn variant_name(&self) -> &'static str {
        match self {
            HttpMethod::Get => "Get",
            HttpMethod::Post => "Post",
            HttpMethod::Put => "Put",
            HttpMethod::Patch => "Patch",
            HttpMethod::Delete => "Delete",
            HttpMethod::Head => "Head",
            HttpMethod::Options => "Options",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => Err(format!("unsupported HTTP method: {}", other)),
        }
    }
}

/// Classification of one HTTP probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointStatus {
    Exists,
    AuthRequired,
    Absent,
    ServerError,
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMetadata {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub visible: bool,
}

/// Longest sample text kept in element metadata.
pub const SAMPLE_TEXT_LIMIT: usize = 80;

impl ElementMetadata {
    pub fn new(tag: impl Into<String>, visible: bool) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            input_type: None,
            text: None,
            visible,
        }
    }

    pub fn with_input_type(mut self, input_type: Option<String>) -> Self {
        self.input_type = input_type.filter(|t| !t.is_empty());
        self
    }

    /// Attach sample text, collapsing whitespace and truncating.
    pub fn with_text(mut self, text: Option<&str>) -> Self {
        self.text = text.and_then(sample_text);
        self
    }

    pub fn role(&self) -> ElementRole {
        ElementRole::infer(&self.tag, self.input_type.as_deref())
    }
}

fn sample_text(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.chars().take(SAMPLE_TEXT_LIMIT).collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointMetadata {
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub status_class: EndpointStatus,
    pub requires_auth: bool,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetMetadata {
    Element(ElementMetadata),
    Endpoint(EndpointMetadata),
}

/// The outcome of one successful resolution.
///
/// Created fresh by every resolution call and owned by its caller; the live
/// target may change between calls, so nothing holds on to these.
#[derive(Debug, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub logical_name: String,
    pub matched_candidate: String,
    pub metadata: TargetMetadata,
}

impl ResolvedTarget {
    pub fn element(&self) -> Option<&ElementMetadata> {
        match &self.metadata {
            TargetMetadata::Element(meta) => Some(meta),
            TargetMetadata::Endpoint(_) => None,
        }
    }

    pub fn endpoint(&self) -> Option<&EndpointMetadata> {
        match &self.metadata {
            TargetMetadata::Endpoint(meta) => Some(meta),
            TargetMetadata::Element(_) => None,
        }
    }
}

//! Ordered candidate lists.
//!
//! A `CandidateList` names one logical target (a UI element or an API
//! operation) and the locator strings or path templates that may find it.
//! Order is preference: the first entry that matches wins.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateListError {
    #[error("candidate list for '{0}' is empty")]
    Empty(String),

    #[error("candidate list has an empty logical name")]
    EmptyName,
}

/// Wire form used by serde before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCandidateList {
    logical_name: String,
    candidates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCandidateList", into = "RawCandidateList")]
pub struct CandidateList {
    logical_name: String,
    candidates: Vec<String>,
}

impl CandidateList {
    /// Build a list, trimming entries and dropping repeats.
    ///
    /// The first occurrence of a duplicate keeps its position, so the
    /// declared preference order survives deduplication.
    pub fn new<N, I, S>(logical_name: N, candidates: I) -> Result<Self, CandidateListError>
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let logical_name = logical_name.into().trim().to_string();
        if logical_name.is_empty() {
            return Err(CandidateListError::EmptyName);
        }

        let mut deduped: Vec<String> = Vec::new();
        for candidate in candidates {
            let candidate = candidate.as_ref().trim();
            if candidate.is_empty() || deduped.iter().any(|c| c == candidate) {
                continue;
            }
            deduped.push(candidate.to_string());
        }

        if deduped.is_empty() {
            return Err(CandidateListError::Empty(logical_name));
        }

        Ok(Self {
            logical_name,
            candidates: deduped,
        })
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn primary(&self) -> &str {
        &self.candidates[0]
    }

    pub fn fallbacks(&self) -> &[String] {
        &self.candidates[1..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(String::as_str)
    }

    /// Copy of this list with `matched` moved to the front.
    ///
    /// The remaining entries keep their relative order. Returns `None` if
    /// `matched` is not part of the list.
    pub fn reordered_with_primary(&self, matched: &str) -> Option<Self> {
        let index = self.candidates.iter().position(|c| c == matched)?;
        let mut candidates = Vec::with_capacity(self.candidates.len());
        candidates.push(self.candidates[index].clone());
        candidates.extend(
            self.candidates
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, c)| c.clone()),
        );
        Some(Self {
            logical_name: self.logical_name.clone(),
            candidates,
        })
    }
}

impl TryFrom<RawCandidateList> for CandidateList {
    type Error = CandidateListError;

    fn try_from(raw: RawCandidateList) -> Result<Self, Self::Error> {
        CandidateList::new(raw.logical_name, raw.candidates)
    }
}

impl From<CandidateList> for RawCandidateList {
    fn from(list: CandidateList) -> Self {
        RawCandidateList {
            logical_name: list.logical_name,
            candidates: list.candidates,
        }
    }
}

/// How a UI candidate string should be interpreted by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorKind {
    Css(String),
    XPath(String),
    /// Match on trimmed visible text.
    Text(String),
}

impl SelectorKind {
    pub fn parse(candidate: &str) -> Self {
        let candidate = candidate.trim();
        if let Some(rest) = candidate.strip_prefix("xpath=") {
            SelectorKind::XPath(rest.to_string())
        } else if let Some(rest) = candidate.strip_prefix("text=") {
            SelectorKind::Text(rest.trim_matches('"').to_string())
        } else if candidate.starts_with('/') || candidate.starts_with('(') {
            SelectorKind::XPath(candidate.to_string())
        } else {
            SelectorKind::Css(candidate.to_string())
        }
    }

    /// XPath equivalent, used by drivers without a native text locator.
    pub fn to_xpath(&self) -> Option<String> {
        match self {
            SelectorKind::Css(_) => None,
            SelectorKind::XPath(xpath) => Some(xpath.clone()),
            SelectorKind::Text(text) => Some(format!(
                "//*[normalize-space(text())={}]",
                xpath_literal(text)
            )),
        }
    }
}

/// Quote a string for use inside an XPath expression.
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dedups_and_keeps_order() {
        let list = CandidateList::new(
            "email input",
            ["#email", " input[type=email] ", "#email", "", "[name=email]"],
        )
        .unwrap();
        assert_eq!(
            list.candidates(),
            &["#email", "input[type=email]", "[name=email]"]
        );
        assert_eq!(list.primary(), "#email");
        assert_eq!(list.fallbacks().len(), 2);
    }

    #[test]
    fn test_new_rejects_empty() {
        let err = CandidateList::new("submit", Vec::<String>::new()).unwrap_err();
        assert_eq!(err, CandidateListError::Empty("submit".into()));
        assert_eq!(
            CandidateList::new("  ", ["#a"]).unwrap_err(),
            CandidateListError::EmptyName
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: CandidateList =
            serde_json::from_str(r##"{"logical_name":"x","candidates":["#a","#a","#b"]}"##)
                .unwrap();
        assert_eq!(ok.len(), 2);

        let bad = serde_json::from_str::<CandidateList>(r#"{"logical_name":"x","candidates":[]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_reordered_with_primary() {
        let list = CandidateList::new("btn", ["#a", "#b", "#c"]).unwrap();
        let reordered = list.reordered_with_primary("#b").unwrap();
        assert_eq!(reordered.candidates(), &["#b", "#a", "#c"]);
        assert!(list.reordered_with_primary("#z").is_none());
    }

    #[test]
    fn test_selector_kind_parse() {
        assert_eq!(
            SelectorKind::parse("input[type=email]"),
            SelectorKind::Css("input[type=email]".into())
        );
        assert_eq!(
            SelectorKind::parse("//button[@id='go']"),
            SelectorKind::XPath("//button[@id='go']".into())
        );
        assert_eq!(
            SelectorKind::parse("xpath=(//a)[1]"),
            SelectorKind::XPath("(//a)[1]".into())
        );
        assert_eq!(
            SelectorKind::parse("text=\"Sign in\""),
            SelectorKind::Text("Sign in".into())
        );
    }

    #[test]
    fn test_text_to_xpath_quotes() {
        let xpath = SelectorKind::Text("Don't go".into()).to_xpath().unwrap();
        assert_eq!(xpath, "//*[normalize-space(text())=\"Don't go\"]");
        assert!(SelectorKind::Css("#a".into()).to_xpath().is_none());
    }
}

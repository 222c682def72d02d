//! In-page element helper shared by the script-driven backends.
//!
//! Both the CDP and the WebDriver backends evaluate the same function and
//! decode its reply with [`DomReply`], so selector semantics (CSS, XPath,
//! visible text) are identical across drivers.

use serde::{Deserialize, Serialize};
use vigil_common::{BackendError, ElementMetadata, SelectorKind};

/// `function (kind, selector, op, value)`; returns a plain JSON object.
pub const ELEMENT_JS: &str = r#"function (kind, selector, op, value) {
  var el = null;
  try {
    if (kind === 'xpath') {
      el = document.evaluate(selector, document, null,
        XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
    } else {
      el = document.querySelector(selector);
    }
  } catch (e) {
    return { error: String(e && e.message ? e.message : e) };
  }
  if (!el) return { found: false };
  var style = window.getComputedStyle(el);
  var rect = el.getBoundingClientRect();
  var visible = style.display !== 'none' && style.visibility !== 'hidden'
    && rect.width > 0 && rect.height > 0;
  if (op === 'query') {
    return {
      found: true,
      tag: el.tagName.toLowerCase(),
      input_type: el.getAttribute('type'),
      text: (el.innerText || el.value || el.getAttribute('aria-label') || '').slice(0, 200),
      visible: visible
    };
  }
  if (op === 'fill') {
    el.focus();
    el.value = value;
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
    return { found: true, ok: true };
  }
  if (op === 'click') {
    if (!visible) return { found: true, ok: false, reason: 'not visible' };
    if (el.disabled) return { found: true, ok: false, reason: 'disabled' };
    el.click();
    return { found: true, ok: true };
  }
  if (op === 'text') return { found: true, value: (el.innerText || el.textContent || '') };
  if (op === 'value') return { found: true, value: (el.value == null ? '' : String(el.value)) };
  return { error: 'unknown op ' + op };
}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomOp {
    Query,
    Fill,
    Click,
    Text,
    Value,
}

/// Arguments passed to [`ELEMENT_JS`], in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct DomCall {
    pub kind: &'static str,
    pub selector: String,
    pub op: DomOp,
    pub value: String,
}

impl DomCall {
    pub fn new(selector: &str, op: DomOp) -> Self {
        let (kind, selector) = match SelectorKind::parse(selector) {
            SelectorKind::Css(css) => ("css", css),
            other => (
                "xpath",
                other.to_xpath().unwrap_or_else(|| selector.to_string()),
            ),
        };
        Self {
            kind,
            selector,
            op,
            value: String::new(),
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn args(&self) -> Vec<serde_json::Value> {
        vec![
            serde_json::Value::from(self.kind),
            serde_json::Value::from(self.selector.clone()),
            serde_json::to_value(self.op).unwrap_or(serde_json::Value::Null),
            serde_json::Value::from(self.value.clone()),
        ]
    }

    /// Self-contained expression, for `Runtime.evaluate`.
    pub fn expression(&self) -> String {
        let args: Vec<String> = self.args().iter().map(|a| a.to_string()).collect();
        format!("({})({})", ELEMENT_JS, args.join(", "))
    }

    /// Script body taking `arguments[0..4]`, for WebDriver `execute`.
    pub fn webdriver_script() -> String {
        format!(
            "return ({})(arguments[0], arguments[1], arguments[2], arguments[3]);",
            ELEMENT_JS
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomReply {
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl DomReply {
    pub fn from_value(value: serde_json::Value) -> Result<Self, BackendError> {
        if value.is_null() {
            return Err(BackendError::ScriptError(
                "element helper returned null".into(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    fn check(&self, selector: &str) -> Result<(), BackendError> {
        if let Some(error) = &self.error {
            tracing::debug!("Selector '{}' rejected by page: {}", selector, error);
            return Err(BackendError::SelectorInvalid {
                selector: selector.to_string(),
            });
        }
        if !self.found {
            return Err(BackendError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        Ok(())
    }

    pub fn into_metadata(self, selector: &str) -> Result<Option<ElementMetadata>, BackendError> {
        match self.check(selector) {
            Ok(()) => {}
            Err(BackendError::ElementNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        }
        let meta = ElementMetadata::new(self.tag.unwrap_or_default(), self.visible)
            .with_input_type(self.input_type)
            .with_text(self.text.as_deref());
        Ok(Some(meta))
    }

    pub fn into_unit(self, selector: &str) -> Result<(), BackendError> {
        self.check(selector)?;
        match self.ok {
            Some(false) => Err(BackendError::ElementNotInteractable {
                selector: selector.to_string(),
                reason: self.reason.unwrap_or_else(|| "unknown".into()),
            }),
            _ => Ok(()),
        }
    }

    pub fn into_text(self, selector: &str) -> Result<String, BackendError> {
        self.check(selector)?;
        Ok(self.value.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_routes_selector_kinds() {
        assert_eq!(DomCall::new("#email", DomOp::Query).kind, "css");
        let xpath = DomCall::new("//input[@name='q']", DomOp::Query);
        assert_eq!(xpath.kind, "xpath");
        assert_eq!(xpath.selector, "//input[@name='q']");
        let text = DomCall::new("text=Sign in", DomOp::Click);
        assert_eq!(text.kind, "xpath");
        assert_eq!(text.selector, "//*[normalize-space(text())='Sign in']");
    }

    #[test]
    fn test_expression_embeds_json_args() {
        let call = DomCall::new("input[name=\"q\"]", DomOp::Fill).with_value("hi");
        let expr = call.expression();
        assert!(expr.ends_with(r#"("css", "input[name=\"q\"]", "fill", "hi")"#));
    }

    #[test]
    fn test_reply_into_metadata() {
        let reply = DomReply::from_value(json!({
            "found": true, "tag": "input", "input_type": "email",
            "text": "", "visible": true
        }))
        .unwrap();
        let meta = reply.into_metadata("#email").unwrap().unwrap();
        assert_eq!(meta.tag, "input");
        assert_eq!(meta.input_type.as_deref(), Some("email"));
        assert!(meta.text.is_none());

        let missing = DomReply::from_value(json!({ "found": false })).unwrap();
        assert!(missing.into_metadata("#nope").unwrap().is_none());
    }

    #[test]
    fn test_reply_error_is_invalid_selector() {
        let reply = DomReply::from_value(json!({ "error": "not a valid selector" })).unwrap();
        assert!(matches!(
            reply.into_metadata("##"),
            Err(BackendError::SelectorInvalid { .. })
        ));
        assert!(DomReply::from_value(serde_json::Value::Null).is_err());
    }

    #[test]
    fn test_reply_click_not_interactable() {
        let reply = DomReply::from_value(json!({
            "found": true, "ok": false, "reason": "disabled"
        }))
        .unwrap();
        match reply.into_unit("#go") {
            Err(BackendError::ElementNotInteractable { reason, .. }) => {
                assert_eq!(reason, "disabled")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use vigil_common::{ElementMetadata, HttpMethod};
use vigil_engine::backend::{Backend, BackendError, NavigationResult};
use vigil_engine::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// A page held in memory: selectors map straight to elements.
#[derive(Debug, Default)]
pub struct FakePage {
    pub elements: HashMap<String, ElementMetadata>,
    pub values: HashMap<String, String>,
    pub texts: HashMap<String, String>,
    pub invalid: HashSet<String>,
    pub fail_navigation: bool,
    pub navigations: Vec<String>,
    pub lookups: Vec<String>,
    pub actions: Vec<String>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: &str, tag: &str, visible: bool) -> Self {
        self.elements
            .insert(selector.to_string(), ElementMetadata::new(tag, visible));
        self
    }

    pub fn with_text(mut self, selector: &str, tag: &str, text: &str) -> Self {
        self.elements.insert(
            selector.to_string(),
            ElementMetadata::new(tag, true).with_text(Some(text)),
        );
        self.texts.insert(selector.to_string(), text.to_string());
        self
    }

    pub fn with_invalid(mut self, selector: &str) -> Self {
        self.invalid.insert(selector.to_string());
        self
    }

    fn require(&self, selector: &str) -> Result<(), BackendError> {
        if self.elements.contains_key(selector) {
            Ok(())
        } else {
            Err(BackendError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }
}

#[async_trait]
impl Backend for FakePage {
    async fn launch(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
    async fn close(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
    async fn is_ready(&self) -> bool {
        true
    }
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        if self.fail_navigation {
            return Err(BackendError::Navigation(format!(
                "net::ERR_CONNECTION_REFUSED at {}",
                url
            )));
        }
        self.navigations.push(url.to_string());
        Ok(NavigationResult {
            url: url.to_string(),
            title: "fake".into(),
            status: 200,
        })
    }
    async fn find_element(
        &mut self,
        selector: &str,
    ) -> Result<Option<ElementMetadata>, BackendError> {
        self.lookups.push(selector.to_string());
        if self.invalid.contains(selector) {
            return Err(BackendError::SelectorInvalid {
                selector: selector.to_string(),
            });
        }
        Ok(self.elements.get(selector).cloned())
    }
    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), BackendError> {
        self.require(selector)?;
        self.actions.push(format!("fill {} {}", selector, value));
        self.values.insert(selector.to_string(), value.to_string());
        Ok(())
    }
    async fn click(&mut self, selector: &str) -> Result<(), BackendError> {
        self.require(selector)?;
        self.actions.push(format!("click {}", selector));
        Ok(())
    }
    async fn text_content(&mut self, selector: &str) -> Result<String, BackendError> {
        self.require(selector)?;
        Ok(self.texts.get(selector).cloned().unwrap_or_default())
    }
    async fn input_value(&mut self, selector: &str) -> Result<String, BackendError> {
        self.require(selector)?;
        Ok(self.values.get(selector).cloned().unwrap_or_default())
    }
    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError> {
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

/// An HTTP surface answering from a fixed route table; anything else is 404.
#[derive(Debug, Default)]
pub struct RouteTable {
    pub base_url: String,
    pub routes: HashMap<(HttpMethod, String), (u16, String)>,
    pub unreachable: HashSet<String>,
    pub calls: Mutex<Vec<HttpRequest>>,
}

impl RouteTable {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    pub fn route(mut self, method: HttpMethod, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert((method, path.to_string()), (status, body.to_string()));
        self
    }

    pub fn down(mut self, path: &str) -> Self {
        self.unreachable.insert(path.to_string());
        self
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for RouteTable {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(request.clone());
        let path = request
            .url
            .strip_prefix(&self.base_url)
            .unwrap_or(&request.url)
            .to_string();
        if self.unreachable.contains(&path) {
            return Err(TransportError::Connect(format!("{} refused", path)));
        }
        let (status, body) = self
            .routes
            .get(&(request.method, path))
            .cloned()
            .unwrap_or((404, String::new()));
        Ok(HttpResponse {
            status,
            headers: vec![("content-type".into(), "application/json".into())],
            body,
        })
    }
}

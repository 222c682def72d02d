use crate::cdp::CdpClient;
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::page::ScreenshotParams;
use std::time::Duration;
use tracing::{debug, info};
use vigil_common::ElementMetadata;
use vigil_engine::backend::{Backend, BackendError, NavigationResult};
use vigil_engine::dom::{DomCall, DomOp, DomReply};

/// Upper bound for one evaluation; a blocking dialog would otherwise hang it.
const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Evaluations retried while the page is between documents.
const MAX_CONTEXT_RETRIES: u32 = 10;

const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

pub struct HeadlessBackend {
    client: Option<CdpClient>,
    visible: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::new_with_visibility(false)
    }

    pub fn new_with_visibility(visible: bool) -> Self {
        Self {
            client: None,
            visible,
        }
    }

    pub fn get_client(&self) -> Option<&CdpClient> {
        self.client.as_ref()
    }

    fn page(&self) -> Result<&Page, BackendError> {
        self.client
            .as_ref()
            .map(|c| &c.page)
            .ok_or(BackendError::NotReady)
    }

    async fn run(&self, call: DomCall) -> Result<DomReply, BackendError> {
        let page = self.page()?;
        let expression = call.expression();
        let mut last_error = None;

        for attempt in 0..MAX_CONTEXT_RETRIES {
            let evaluated = tokio::time::timeout(EVAL_TIMEOUT, page.evaluate(expression.as_str()))
                .await
                .map_err(|_| BackendError::Timeout {
                    operation: "evaluate".into(),
                })?;
            match evaluated {
                Ok(result) => {
                    let value: serde_json::Value = result
                        .into_value()
                        .map_err(|e| BackendError::ScriptError(e.to_string()))?;
                    return DomReply::from_value(value);
                }
                Err(e) => {
                    let message = e.to_string();
                    if !is_context_error(&message) {
                        return Err(BackendError::ScriptError(message));
                    }
                    debug!(
                        "Context error (attempt {}/{}), retrying",
                        attempt + 1,
                        MAX_CONTEXT_RETRIES
                    );
                    last_error = Some(message);
                    tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
                }
            }
        }

        Err(BackendError::ScriptError(last_error.unwrap_or_else(|| {
            "evaluation failed after retries".to_string()
        })))
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for HeadlessBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Launching headless backend (Chromium)...");
        let client = CdpClient::launch(self.visible)
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BackendError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        let page = self.page()?;
        info!("Navigating to: {}", url);
        page.goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;

        let title = page.get_title().await.ok().flatten().unwrap_or_default();
        let url = page
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult {
            url,
            title,
            status: 200,
        })
    }

    async fn find_element(
        &mut self,
        selector: &str,
    ) -> Result<Option<ElementMetadata>, BackendError> {
        self.run(DomCall::new(selector, DomOp::Query))
            .await?
            .into_metadata(selector)
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), BackendError> {
        self.run(DomCall::new(selector, DomOp::Fill).with_value(value))
            .await?
            .into_unit(selector)
    }

    async fn click(&mut self, selector: &str) -> Result<(), BackendError> {
        self.run(DomCall::new(selector, DomOp::Click))
            .await?
            .into_unit(selector)
    }

    async fn text_content(&mut self, selector: &str) -> Result<String, BackendError> {
        self.run(DomCall::new(selector, DomOp::Text))
            .await?
            .into_text(selector)
    }

    async fn input_value(&mut self, selector: &str) -> Result<String, BackendError> {
        self.run(DomCall::new(selector, DomOp::Value))
            .await?
            .into_text(selector)
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError> {
        self.page()?
            .screenshot(ScreenshotParams::builder().build())
            .await
            .map_err(|e| BackendError::Other(format!("Screenshot failed: {}", e)))
    }
}

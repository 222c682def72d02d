use crate::webdriver::{WebDriverClient, headless_capabilities};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use tracing::info;
use vigil_common::ElementMetadata;
use vigil_engine::backend::{Backend, BackendError, NavigationResult};
use vigil_engine::dom::{DomCall, DomOp, DomReply};

/// Default address of a locally started chromedriver.
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

pub struct WebDriverBackend {
    client: Option<WebDriverClient>,
    webdriver_url: String,
    headless: bool,
}

impl WebDriverBackend {
    pub fn new(webdriver_url: &str, headless: bool) -> Self {
        Self {
            client: None,
            webdriver_url: webdriver_url.to_string(),
            headless,
        }
    }

    pub fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }

    fn client(&self) -> Result<&WebDriverClient, BackendError> {
        self.client.as_ref().ok_or(BackendError::NotReady)
    }

    async fn run(&self, call: DomCall) -> Result<DomReply, BackendError> {
        let client = self.client()?;
        let value = client
            .client
            .execute(&DomCall::webdriver_script(), call.args())
            .await
            .map_err(map_cmd_error)?;
        DomReply::from_value(value)
    }
}

impl Default for WebDriverBackend {
    fn default() -> Self {
        Self::new(DEFAULT_WEBDRIVER_URL, true)
    }
}

fn map_cmd_error(err: CmdError) -> BackendError {
    BackendError::ScriptError(err.to_string())
}

#[async_trait]
impl Backend for WebDriverBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Connecting to WebDriver at {}...", self.webdriver_url);
        let caps = self.headless.then(headless_capabilities);
        let client = WebDriverClient::connect(&self.webdriver_url, caps)
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
        let client = self.client()?;
        info!("Navigating to: {}", url);
        client
            .client
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;

        let title = client.client.title().await.unwrap_or_default();
        let url = client
            .client
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(|e| BackendError::Navigation(e.to_string()))?;
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
        self.client()?
            .client
            .screenshot()
            .await
            .map_err(|e| BackendError::Other(format!("Screenshot failed: {}", e)))
    }
}

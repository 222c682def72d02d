use super::{Locator, LocatorSource, PageError, PageSession};
use crate::backend::Backend;
use crate::catalog::Catalog;
use crate::catalog::builtin::{LOGIN_EMAIL, LOGIN_ERROR, LOGIN_PASSWORD, LOGIN_SUBMIT};
use tracing::info;
use vigil_common::DiscoveryRecord;

/// The sign-in form.
#[derive(Debug, Clone)]
pub struct LoginPage {
    path: String,
    email: Locator,
    password: Locator,
    submit: Locator,
    error: Locator,
}

impl LoginPage {
    /// Built on the bundled login catalog.
    pub fn new() -> Result<Self, PageError> {
        Self::from_catalog(&Catalog::login_page())
    }

    pub fn from_catalog(catalog: &Catalog) -> Result<Self, PageError> {
        let path = catalog.path.clone().unwrap_or_else(|| "/login".into());
        Self::build(path, LocatorSource::Catalog(catalog))
    }

    /// Use the candidate order a discovery run settled on.
    pub fn from_record(record: &DiscoveryRecord, path: &str) -> Result<Self, PageError> {
        Self::build(path.to_string(), LocatorSource::Record(record))
    }

    fn build(path: String, source: LocatorSource<'_>) -> Result<Self, PageError> {
        Ok(Self {
            path,
            email: source.locator(LOGIN_EMAIL)?,
            password: source.locator(LOGIN_PASSWORD)?,
            submit: source.locator(LOGIN_SUBMIT)?,
            error: source.locator(LOGIN_ERROR)?,
        })
    }

    pub async fn open<B: Backend + ?Sized>(
        &self,
        session: &mut PageSession<'_, B>,
    ) -> Result<(), PageError> {
        session.goto(&self.path).await?;
        Ok(())
    }

    pub async fn login<B: Backend + ?Sized>(
        &self,
        session: &mut PageSession<'_, B>,
        email: &str,
        password: &str,
    ) -> Result<(), PageError> {
        info!("Logging in as {}", email);
        session.fill(&self.email, email).await?;
        session.fill(&self.password, password).await?;
        session.click(&self.submit).await
    }

    /// Text of the error banner, if one is shown.
    pub async fn error_message<B: Backend + ?Sized>(
        &self,
        session: &mut PageSession<'_, B>,
    ) -> Result<Option<String>, PageError> {
        match session.text_of(&self.error).await {
            Ok(text) => Ok(Some(text)),
            Err(PageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn has_error<B: Backend + ?Sized>(
        &self,
        session: &mut PageSession<'_, B>,
    ) -> Result<bool, PageError> {
        session.is_visible(&self.error).await
    }
}

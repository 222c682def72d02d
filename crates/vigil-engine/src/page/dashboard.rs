use super::{Locator, LocatorSource, PageError, PageSession};
use crate::backend::Backend;
use crate::catalog::Catalog;
use crate::catalog::builtin::{DASHBOARD_LOGOUT, DASHBOARD_USER_MENU, DASHBOARD_WELCOME};
use vigil_common::DiscoveryRecord;

/// The landing page after a successful sign-in.
#[derive(Debug, Clone)]
pub struct DashboardPage {
    welcome: Locator,
    user_menu: Locator,
    logout: Locator,
}

impl DashboardPage {
    pub fn new() -> Result<Self, PageError> {
        Self::from_catalog(&Catalog::dashboard_page())
    }

    pub fn from_catalog(catalog: &Catalog) -> Result<Self, PageError> {
        Self::build(LocatorSource::Catalog(catalog))
    }

    pub fn from_record(record: &DiscoveryRecord) -> Result<Self, PageError> {
        Self::build(LocatorSource::Record(record))
    }

    fn build(source: LocatorSource<'_>) -> Result<Self, PageError> {
        Ok(Self {
            welcome: source.locator(DASHBOARD_WELCOME)?,
            user_menu: source.locator(DASHBOARD_USER_MENU)?,
            logout: source.locator(DASHBOARD_LOGOUT)?,
        })
    }

    pub async fn is_loaded<B: Backend + ?Sized>(
        &self,
        session: &mut PageSession<'_, B>,
    ) -> Result<bool, PageError> {
        session.is_visible(&self.welcome).await
    }

    pub async fn welcome_text<B: Backend + ?Sized>(
        &self,
        session: &mut PageSession<'_, B>,
    ) -> Result<String, PageError> {
        session.text_of(&self.welcome).await
    }

    /// Open the user menu when the page has one, then sign out.
    pub async fn logout<B: Backend + ?Sized>(
        &self,
        session: &mut PageSession<'_, B>,
    ) -> Result<(), PageError> {
        if session.is_visible(&self.user_menu).await? {
            session.click(&self.user_menu).await?;
        }
        session.click(&self.logout).await
    }
}

//! Catalogs for the login flow, the dashboard and the auth API.

use super::{Catalog, CatalogEntry};
use vigil_common::{ElementRole, SurfaceKind};

pub const LOGIN_EMAIL: &str = "email input";
pub const LOGIN_PASSWORD: &str = "password input";
pub const LOGIN_SUBMIT: &str = "login button";
pub const LOGIN_ERROR: &str = "error message";
pub const DASHBOARD_WELCOME: &str = "welcome message";
pub const DASHBOARD_USER_MENU: &str = "user menu";
pub const DASHBOARD_LOGOUT: &str = "logout button";

impl Catalog {
    pub fn login_page() -> Self {
        Catalog::new("login", SurfaceKind::Ui, Some("/login"))
            .with_entry(CatalogEntry::new(
                LOGIN_EMAIL,
                Some(ElementRole::Input),
                &[
                    "[data-testid=email]",
                    "#email",
                    "input[type=email]",
                    "input[name=email]",
                    "input[name=username]",
                ],
            ))
            .with_entry(CatalogEntry::new(
                LOGIN_PASSWORD,
                Some(ElementRole::Input),
                &[
                    "[data-testid=password]",
                    "#password",
                    "input[type=password]",
                    "input[name=password]",
                ],
            ))
            .with_entry(CatalogEntry::new(
                LOGIN_SUBMIT,
                Some(ElementRole::Clickable),
                &[
                    "[data-testid=login-button]",
                    "button[type=submit]",
                    "input[type=submit]",
                    "text=Log in",
                    "text=Sign in",
                ],
            ))
            .with_entry(CatalogEntry::new(
                LOGIN_ERROR,
                Some(ElementRole::Text),
                &[
                    "[data-testid=error-message]",
                    "[role=alert]",
                    ".error-message",
                    ".alert-danger",
                ],
            ))
    }

    pub fn dashboard_page() -> Self {
        Catalog::new("dashboard", SurfaceKind::Ui, Some("/dashboard"))
            .with_entry(CatalogEntry::new(
                DASHBOARD_WELCOME,
                Some(ElementRole::Text),
                &[
                    "[data-testid=welcome-message]",
                    ".welcome-message",
                    "main h1",
                    "h1",
                ],
            ))
            .with_entry(CatalogEntry::new(
                DASHBOARD_USER_MENU,
                Some(ElementRole::Clickable),
                &[
                    "[data-testid=user-menu]",
                    ".user-menu",
                    "[aria-label='User menu']",
                ],
            ))
            .with_entry(CatalogEntry::new(
                DASHBOARD_LOGOUT,
                Some(ElementRole::Clickable),
                &[
                    "[data-testid=logout-button]",
                    "#logout",
                    "text=Log out",
                    "text=Logout",
                    "text=Sign out",
                ],
            ))
    }

    pub fn auth_api() -> Self {
        Catalog::from_paths(
            "auth-api",
            &[
                "/auth/login",
                "/auth/logout",
                "/auth/me",
                "/auth/refresh",
                "/users",
                "/users/{id}",
                "/health",
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_valid() {
        for catalog in [
            Catalog::login_page(),
            Catalog::dashboard_page(),
            Catalog::auth_api(),
        ] {
            catalog.validate().unwrap();
        }
        assert!(Catalog::login_page().entry(LOGIN_SUBMIT).is_some());
    }
}

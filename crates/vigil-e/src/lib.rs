//! Any W3C WebDriver endpoint (chromedriver, geckodriver, a grid) as a
//! backend.

pub mod backend;
pub mod webdriver;

pub use backend::WebDriverBackend;

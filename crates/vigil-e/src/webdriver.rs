use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};

pub struct WebDriverClient {
    pub client: Client,
}

impl WebDriverClient {
    pub async fn connect(
        url: &str,
        capabilities: Option<Map<String, Value>>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut caps = Map::new();
        if let Some(user_caps) = capabilities {
            for (k, v) in user_caps {
                caps.insert(k, v);
            }
        }

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(url)
            .await
            .map_err(|e| format!("Failed to connect to WebDriver at {}: {}", url, e))?;

        Ok(Self { client })
    }

    pub async fn close(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.client
            .close()
            .await
            .map_err(|e| format!("Failed to close session: {}", e))?;
        Ok(())
    }
}

/// Capabilities asking Chrome and Firefox drivers for a headless session.
pub fn headless_capabilities() -> Map<String, Value> {
    let mut caps = Map::new();
    caps.insert(
        "goog:chromeOptions".into(),
        json!({ "args": ["--headless=new", "--no-sandbox", "--disable-gpu"] }),
    );
    caps.insert("moz:firefoxOptions".into(), json!({ "args": ["-headless"] }));
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_capabilities_cover_both_drivers() {
        let caps = headless_capabilities();
        assert!(caps["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap()
            .contains(&json!("--headless=new")));
        assert_eq!(caps["moz:firefoxOptions"]["args"][0], "-headless");
    }
}

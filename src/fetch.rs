use crate::config::{ClientConfig, RenderConfig};
use crate::error::Result;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// HTTP fetch adapter. Carries the spoofed browser identity and, when a
/// comic is flagged as dynamic, routes page fetches through a Splash-style
/// rendering proxy. Image fetches always go direct.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    config: ClientConfig,
    render: Option<RenderConfig>,
}

impl PageFetcher {
    pub fn new(config: &ClientConfig, render: Option<RenderConfig>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            render,
        })
    }

    /// The effective engine configuration for this fetcher. The rendering
    /// entries are present exactly when dynamic rendering is enabled.
    pub fn engine_settings(&self) -> BTreeMap<String, String> {
        let mut settings = BTreeMap::new();
        settings.insert("user_agent".to_string(), self.config.user_agent.clone());
        settings.insert(
            "timeout_secs".to_string(),
            self.config.timeout_secs.to_string(),
        );
        if let Some(render) = &self.render {
            settings.insert("render_endpoint".to_string(), render.endpoint.clone());
            settings.insert("render_wait".to_string(), render.wait_seconds.to_string());
            settings.insert("render_viewport".to_string(), render.viewport.clone());
        }
        settings
    }

    fn page_request_url(&self, url: &Url) -> Result<Url> {
        match &self.render {
            None => Ok(url.clone()),
            Some(render) => {
                let mut proxied = Url::parse(&render.endpoint)?.join("render.html")?;
                proxied
                    .query_pairs_mut()
                    .append_pair("url", url.as_str())
                    .append_pair("wait", &render.wait_seconds.to_string())
                    .append_pair("viewport", &render.viewport);
                Ok(proxied)
            }
        }
    }

    /// Fetches a comic page and returns its HTML. Follows redirects; any
    /// non-success status is an error.
    pub async fn fetch_page(&self, url: &Url) -> Result<String> {
        let request_url = self.page_request_url(url)?;
        let response = self.client.get(request_url).send().await?;
        let text = response.error_for_status()?.text().await?;
        Ok(text)
    }

    /// Fetches raw image bytes, bypassing the rendering proxy.
    pub async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self.client.get(url.clone()).send().await?;
        let bytes = response.error_for_status()?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDER_KEYS: [&str; 3] = ["render_endpoint", "render_wait", "render_viewport"];

    #[test]
    fn engine_settings_without_rendering_has_no_render_entries() {
        let fetcher = PageFetcher::new(&ClientConfig::default(), None).unwrap();
        let settings = fetcher.engine_settings();
        for key in RENDER_KEYS {
            assert!(!settings.contains_key(key), "unexpected key {key}");
        }
        assert!(settings.contains_key("user_agent"));
    }

    #[test]
    fn engine_settings_with_rendering_has_every_render_entry() {
        let fetcher =
            PageFetcher::new(&ClientConfig::default(), Some(RenderConfig::default())).unwrap();
        let settings = fetcher.engine_settings();
        for key in RENDER_KEYS {
            assert!(settings.contains_key(key), "missing key {key}");
        }
    }

    #[test]
    fn dynamic_pages_are_routed_through_the_proxy() {
        let render = RenderConfig {
            endpoint: "http://localhost:8050".to_string(),
            wait_seconds: 0.5,
            viewport: "1024x768".to_string(),
        };
        let fetcher = PageFetcher::new(&ClientConfig::default(), Some(render)).unwrap();
        let target = Url::parse("https://example.com/comic/1").unwrap();
        let proxied = fetcher.page_request_url(&target).unwrap();
        assert_eq!(proxied.host_str(), Some("localhost"));
        assert_eq!(proxied.path(), "/render.html");
        let query: Vec<(String, String)> = proxied
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("url".to_string(), target.to_string())));
        assert!(query.contains(&("wait".to_string(), "0.5".to_string())));
    }

    #[test]
    fn static_pages_are_fetched_directly() {
        let fetcher = PageFetcher::new(&ClientConfig::default(), None).unwrap();
        let target = Url::parse("https://example.com/comic/1").unwrap();
        assert_eq!(fetcher.page_request_url(&target).unwrap(), target);
    }

    #[test]
    fn fetch_page_returns_the_page_body() {
        tokio_test::block_on(async {
            let mut server = mockito::Server::new_async().await;
            let _page = server
                .mock("GET", "/1.html")
                .with_body("<html>comic</html>")
                .create_async()
                .await;

            let fetcher = PageFetcher::new(&ClientConfig::default(), None).unwrap();
            let url = Url::parse(&format!("{}/1.html", server.url())).unwrap();
            assert_eq!(fetcher.fetch_page(&url).await.unwrap(), "<html>comic</html>");
        });
    }

    #[test]
    fn fetch_page_surfaces_http_errors() {
        tokio_test::block_on(async {
            let mut server = mockito::Server::new_async().await;
            let _page = server
                .mock("GET", "/1.html")
                .with_status(500)
                .create_async()
                .await;

            let fetcher = PageFetcher::new(&ClientConfig::default(), None).unwrap();
            let url = Url::parse(&format!("{}/1.html", server.url())).unwrap();
            assert!(matches!(
                fetcher.fetch_page(&url).await,
                Err(crate::error::ComicDlError::Http(_))
            ));
        });
    }
}

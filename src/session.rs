//! The live automation session — one launched browser, one page.

use crate::config::BrowserConfig;
use crate::Result;
use async_trait::async_trait;
use eoka::{Browser, Page};
use serde_json::Value;
use tracing::debug;

/// The surface the driver needs from a live page.
///
/// The driver components are generic over this seam so sequencing and both
/// failure policies stay testable without a browser.
#[async_trait]
pub trait PageSurface: Send + Sync {
    /// Navigate the page.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Evaluate a JS expression and deserialize its completion value.
    async fn eval(&self, js: &str) -> Result<Value>;

    /// Execute JS, discarding the result.
    async fn exec(&self, js: &str) -> Result<()>;

    /// Click the first element matching a CSS selector.
    async fn click_css(&self, selector: &str) -> Result<()>;

    /// Type keystrokes into the focused element.
    async fn type_keys(&self, text: &str) -> Result<()>;

    /// Unconditional fixed wait.
    async fn settle(&self, ms: u64);
}

/// One browser context with one page, exclusively owned for the whole run
/// and closed exactly once.
pub struct Session {
    browser: Browser,
    page: Page,
}

impl Session {
    /// Launch a browser and open a blank page.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let stealth = eoka::StealthConfig {
            headless: config.headless,
            proxy: config.proxy.clone(),
            user_agent: config.user_agent.clone(),
            viewport_width: config.viewport.as_ref().map(|v| v.width).unwrap_or(1280),
            viewport_height: config.viewport.as_ref().map(|v| v.height).unwrap_or(720),
            ..Default::default()
        };

        debug!(
            "launching browser (headless: {}, proxy: {:?})",
            config.headless, config.proxy
        );
        let browser = Browser::launch_with_config(stealth).await?;
        let page = browser.new_page("about:blank").await?;

        Ok(Self { browser, page })
    }

    /// Close the browser.
    pub async fn close(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

#[async_trait]
impl PageSurface for Session {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn eval(&self, js: &str) -> Result<Value> {
        let value: Value = self.page.evaluate(js).await?;
        Ok(value)
    }

    async fn exec(&self, js: &str) -> Result<()> {
        self.page.execute(js).await?;
        Ok(())
    }

    async fn click_css(&self, selector: &str) -> Result<()> {
        self.page.click(selector).await?;
        Ok(())
    }

    async fn type_keys(&self, text: &str) -> Result<()> {
        self.page.type_text(text).await?;
        Ok(())
    }

    async fn settle(&self, ms: u64) {
        self.page.wait(ms).await;
    }
}

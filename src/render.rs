//! Headless-browser rendering of the target page.
//!
//! The listing page assembles its news container client-side, so a plain
//! HTTP fetch is not enough; we drive a Chrome session over CDP and hand the
//! rendered document to the extractor. The [`PageRenderer`] trait is the
//! seam the pipeline and tests mock through.

use crate::config::Scrape;
use crate::error::IngestError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, instrument, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Renders a URL and returns the resulting document HTML once the expected
/// container is present.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str, container_selector: &str) -> Result<String, IngestError>;
}

/// Real renderer backed by an isolated chromiumoxide session per invocation.
///
/// The target site's certificate chain is unreliable, so certificate errors
/// are ignored, and a realistic viewport is set to avoid anti-bot rejection.
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    navigation_timeout: Duration,
    selector_timeout: Duration,
}

impl ChromeRenderer {
    pub fn new(navigation_timeout: Duration, selector_timeout: Duration) -> Self {
        Self {
            navigation_timeout,
            selector_timeout,
        }
    }

    pub fn from_config(scrape: &Scrape) -> Self {
        Self::new(
            Duration::from_secs(scrape.navigation_timeout_secs),
            Duration::from_secs(scrape.selector_timeout_secs),
        )
    }

    fn browser_config() -> Result<BrowserConfig, IngestError> {
        BrowserConfig::builder()
            .viewport(Viewport {
                width: 1366,
                height: 768,
                ..Viewport::default()
            })
            .arg("--ignore-certificate-errors")
            .arg("--disable-blink-features=AutomationControlled")
            .build()
            .map_err(IngestError::Navigation)
    }

    async fn render_in_session(
        &self,
        browser: &Browser,
        url: &str,
        container_selector: &str,
    ) -> Result<String, IngestError> {
        let page = timeout(self.navigation_timeout, async {
            let page = browser.new_page(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(page)
        })
        .await
        .map_err(|_| {
            IngestError::Navigation(format!(
                "navigation to {url} timed out after {}s",
                self.navigation_timeout.as_secs()
            ))
        })?
        .map_err(|err| IngestError::Navigation(format!("failed to load {url}: {err}")))?;

        // The container is attached by page scripts after load; poll for it.
        let deadline = Instant::now() + self.selector_timeout;
        loop {
            match page.find_element(container_selector).await {
                Ok(_) => break,
                Err(_) if Instant::now() < deadline => sleep(POLL_INTERVAL).await,
                Err(_) => {
                    return Err(IngestError::SelectorTimeout {
                        selector: container_selector.to_string(),
                        waited_secs: self.selector_timeout.as_secs(),
                    })
                }
            }
        }

        page.content()
            .await
            .map_err(|err| IngestError::Navigation(format!("failed to read page content: {err}")))
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    /// Open a fresh browser session, render the page, and tear the session
    /// down on every exit path before the result propagates.
    #[instrument(skip(self))]
    async fn render(&self, url: &str, container_selector: &str) -> Result<String, IngestError> {
        let (mut browser, mut handler) = Browser::launch(Self::browser_config()?)
            .await
            .map_err(|err| IngestError::Navigation(format!("failed to launch browser: {err}")))?;
        let driver = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let result = self.render_in_session(&browser, url, container_selector).await;

        if let Err(err) = browser.close().await {
            warn!(%err, "failed to close browser session");
        }
        // Reap the chromium child; close() only asks it to shut down.
        if let Err(err) = browser.wait().await {
            warn!(%err, "failed to reap browser process");
        }
        driver.abort();
        debug!(ok = result.is_ok(), "browser session released");
        result
    }
}

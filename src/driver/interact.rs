//! Element interaction — resolve one locator, perform one action.
//!
//! Interaction failures are unrecoverable. The form under automation is
//! assumed well-behaved, so a locator that resolves to nothing within the
//! implicit wait means the page structure changed or the element never
//! appeared; the run cannot continue and the error propagates to the top.

use super::scroll::Scroller;
use crate::config::{Delays, Locator, Timeouts};
use crate::session::PageSurface;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Clicking and typing, as the mapper and orchestrator consume them.
#[async_trait]
pub trait FormActions: Send + Sync {
    /// Resolve the locator and click it.
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Resolve the locator and type `value` into it. Keystrokes append to
    /// whatever the field already contains; nothing is cleared.
    async fn send_text(&self, locator: &Locator, value: &str) -> Result<()>;

    /// Unconditional fixed wait between actions.
    async fn pause(&self, ms: u64);
}

/// How a locator resolved: the match count and a stable path to the first
/// matching element.
#[derive(Debug, Deserialize)]
struct Resolved {
    count: usize,
    path: String,
}

/// Finds all matches and builds a CSS path to the first, so later calls hit
/// the same node even when the raw selector matches several.
const RESOLVE_JS: &str = r#"(() => {
    const matches = document.querySelectorAll(__SEL__);
    if (matches.length === 0) return null;
    const el = matches[0];
    const path = [];
    let node = el;
    while (node && node !== document.body) {
        let selector = node.tagName.toLowerCase();
        if (node.id) {
            path.unshift('#' + node.id);
            break;
        }
        const siblings = Array.from(node.parentNode?.children || []);
        const index = siblings.indexOf(node) + 1;
        if (siblings.length > 1) selector += ':nth-child(' + index + ')';
        path.unshift(selector);
        node = node.parentNode;
    }
    return { count: matches.length, path: path.join(' > ') };
})()"#;

const VISIBLE_JS: &str = r#"(() => {
    const el = document.querySelector(__SEL__);
    if (!el) return false;
    const r = el.getBoundingClientRect();
    return r.bottom > 0 && r.top < window.innerHeight && r.right > 0 && r.left < window.innerWidth;
})()"#;

const FOCUS_JS: &str = "document.querySelector(__SEL__)?.focus()";

/// Performs single actions against the live page, honoring the implicit
/// wait configured once for the whole run.
pub struct Interactor<'a, P: PageSurface> {
    surface: &'a P,
    scroller: Scroller<'a, P>,
    implicit_wait_ms: u64,
    poll_interval_ms: u64,
    scroll_settle_ms: u64,
}

impl<'a, P: PageSurface> Interactor<'a, P> {
    pub fn new(surface: &'a P, timeouts: &Timeouts, delays: &Delays) -> Self {
        Self {
            surface,
            scroller: Scroller::new(surface),
            implicit_wait_ms: timeouts.implicit_wait_ms,
            poll_interval_ms: timeouts.poll_interval_ms,
            scroll_settle_ms: delays.scroll_settle_ms,
        }
    }

    /// Resolve a locator to the first matching element, polling until the
    /// implicit wait elapses. Zero matches by the deadline is fatal.
    pub async fn resolve(&self, locator: &Locator) -> Result<String> {
        let sel = serde_json::to_string(locator.as_str()).unwrap();
        let js = RESOLVE_JS.replace("__SEL__", &sel);
        let deadline = Instant::now() + Duration::from_millis(self.implicit_wait_ms);

        loop {
            let value = self.surface.eval(&js).await?;
            if !value.is_null() {
                let resolved: Resolved = serde_json::from_value(value).map_err(|e| {
                    Error::Interaction(format!("bad resolve payload for {}: {}", locator, e))
                })?;
                if resolved.count > 1 {
                    debug!(
                        "{} matched {} elements, using the first",
                        locator, resolved.count
                    );
                }
                return Ok(resolved.path);
            }
            if Instant::now() >= deadline {
                return Err(Error::Interaction(format!("no element matched {}", locator)));
            }
            tokio::time::sleep(Duration::from_millis(self.poll_interval_ms)).await;
        }
    }

    /// Scroll the element into view if it sits outside the viewport. The
    /// scroll itself is fail-soft; only the visibility probe can error.
    async fn ensure_in_view(&self, path: &str) -> Result<()> {
        let sel = serde_json::to_string(path).unwrap();
        let js = VISIBLE_JS.replace("__SEL__", &sel);
        let visible = self.surface.eval(&js).await?.as_bool().unwrap_or(false);
        if !visible {
            self.scroller
                .scroll_to_element(&Locator::new(path), self.scroll_settle_ms)
                .await;
        }
        Ok(())
    }
}

#[async_trait]
impl<P: PageSurface> FormActions for Interactor<'_, P> {
    async fn click(&self, locator: &Locator) -> Result<()> {
        let path = self.resolve(locator).await?;
        self.ensure_in_view(&path).await?;
        debug!("click {}", locator);
        self.surface.click_css(&path).await
    }

    async fn send_text(&self, locator: &Locator, value: &str) -> Result<()> {
        let path = self.resolve(locator).await?;
        self.ensure_in_view(&path).await?;
        let sel = serde_json::to_string(&path).unwrap();
        self.surface.exec(&FOCUS_JS.replace("__SEL__", &sel)).await?;
        debug!("type into {}", locator);
        self.surface.type_keys(value).await
    }

    async fn pause(&self, ms: u64) {
        self.surface.settle(ms).await;
    }
}

//! Viewport scrolling — five gestures, all fail-soft.
//!
//! A failed gesture is logged and swallowed; the interaction that follows
//! either succeeds anyway or fails hard on its own terms. Contrast with
//! clicking and typing, where any fault aborts the run.

use crate::config::Locator;
use crate::session::PageSurface;
use crate::{Error, Result};
use serde_json::Value;
use tracing::warn;

/// Scroll direction, mapped onto signed deltas.
///
/// Δx: (+) right, (−) left. Δy: (+) down, (−) up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Signed (Δx, Δy) for scrolling `amount` pixels this way.
    pub fn deltas(self, amount: i64) -> (i64, i64) {
        match self {
            Self::Up => (0, -amount),
            Self::Right => (amount, 0),
            Self::Down => (0, amount),
            Self::Left => (-amount, 0),
        }
    }
}

/// Brings the target element to the bottom edge of the viewport, whether it
/// was above or below the current view.
const SCROLL_TO_ELEMENT_JS: &str = r#"(() => {
    const el = document.querySelector(__SEL__);
    if (!el) return 'no_element';
    el.scrollIntoView({ block: 'end', inline: 'nearest' });
    return 'ok';
})()"#;

/// Scrolls whatever sits under the origin point; falls back to the window
/// when no scrollable container is found there.
const SCROLL_FROM_ELEMENT_JS: &str = r#"(() => {
    const el = document.querySelector(__SEL__);
    if (!el) return 'no_element';
    let r = el.getBoundingClientRect();
    if (r.bottom < 0 || r.top > window.innerHeight) {
        el.scrollIntoView({ block: 'end', inline: 'nearest' });
        r = el.getBoundingClientRect();
    }
    const x = r.left + r.width / 2 + (__XOFF__);
    const y = r.top + r.height / 2 + (__YOFF__);
    if (x < 0 || y < 0 || x > window.innerWidth || y > window.innerHeight)
        return 'origin_outside_viewport';
    let node = document.elementFromPoint(x, y);
    while (node && node !== document.documentElement && node !== document.body) {
        const s = getComputedStyle(node);
        const scrollable = /(auto|scroll)/.test(s.overflowY + s.overflowX) &&
            (node.scrollHeight > node.clientHeight || node.scrollWidth > node.clientWidth);
        if (scrollable) break;
        node = node.parentElement;
    }
    if (node && node !== document.documentElement && node !== document.body) {
        node.scrollBy(__DX__, __DY__);
    } else {
        window.scrollBy(__DX__, __DY__);
    }
    return 'ok';
})()"#;

const SCROLL_FROM_VIEWPORT_JS: &str = r#"(() => {
    const x = (__XOFF__);
    const y = (__YOFF__);
    if (x < 0 || y < 0 || x > window.innerWidth || y > window.innerHeight)
        return 'origin_outside_screen';
    let node = document.elementFromPoint(x, y);
    while (node && node !== document.documentElement && node !== document.body) {
        const s = getComputedStyle(node);
        const scrollable = /(auto|scroll)/.test(s.overflowY + s.overflowX) &&
            (node.scrollHeight > node.clientHeight || node.scrollWidth > node.clientWidth);
        if (scrollable) break;
        node = node.parentElement;
    }
    if (node && node !== document.documentElement && node !== document.body) {
        node.scrollBy(__DX__, __DY__);
    } else {
        window.scrollBy(__DX__, __DY__);
    }
    return 'ok';
})()"#;

/// Issues scroll gestures against a page surface.
pub struct Scroller<'a, P: PageSurface> {
    surface: &'a P,
}

impl<'a, P: PageSurface> Scroller<'a, P> {
    pub fn new(surface: &'a P) -> Self {
        Self { surface }
    }

    /// Scroll until the element's bottom edge sits at the viewport's bottom
    /// edge. Use before interacting with elements that may be off-screen.
    pub async fn scroll_to_element(&self, locator: &Locator, settle_ms: u64) {
        let js = SCROLL_TO_ELEMENT_JS.replace("__SEL__", &encode(locator));
        soft("scroll_to_element", self.gesture(&js, settle_ms).await);
    }

    /// Blind, page-relative scroll by a fixed delta; no element reference.
    pub async fn scroll_by_amount(&self, direction: Direction, amount: i64, settle_ms: u64) {
        let (dx, dy) = direction.deltas(amount);
        let result: Result<()> = async {
            self.surface
                .exec(&format!("window.scrollBy({dx}, {dy})"))
                .await?;
            self.surface.settle(settle_ms).await;
            Ok(())
        }
        .await;
        soft("scroll_by_amount", result);
    }

    /// Scroll by a delta with the element as the gesture origin. An element
    /// outside the viewport is first brought to the bottom of the screen.
    pub async fn scroll_from_element(
        &self,
        locator: &Locator,
        direction: Direction,
        amount: i64,
        settle_ms: u64,
    ) {
        let js = from_element_js(locator, direction, amount, 0, 0);
        soft("scroll_from_element", self.gesture(&js, settle_ms).await);
    }

    /// As [`scroll_from_element`](Self::scroll_from_element), with the origin
    /// offset from the element's center. An origin outside the viewport is a
    /// fault (logged, swallowed).
    pub async fn scroll_from_element_with_offset(
        &self,
        locator: &Locator,
        direction: Direction,
        amount: i64,
        x_offset: i64,
        y_offset: i64,
        settle_ms: u64,
    ) {
        let js = from_element_js(locator, direction, amount, x_offset, y_offset);
        soft(
            "scroll_from_element_with_offset",
            self.gesture(&js, settle_ms).await,
        );
    }

    /// Scroll with the origin offset from the viewport's top-left corner; no
    /// element reference. An origin outside the screen is a fault (logged,
    /// swallowed).
    pub async fn scroll_from_viewport_offset(
        &self,
        direction: Direction,
        amount: i64,
        x_offset: i64,
        y_offset: i64,
        settle_ms: u64,
    ) {
        let (dx, dy) = direction.deltas(amount);
        let js = SCROLL_FROM_VIEWPORT_JS
            .replace("__XOFF__", &x_offset.to_string())
            .replace("__YOFF__", &y_offset.to_string())
            .replace("__DX__", &dx.to_string())
            .replace("__DY__", &dy.to_string());
        soft(
            "scroll_from_viewport_offset",
            self.gesture(&js, settle_ms).await,
        );
    }

    /// Run one probe and settle afterwards. The settle only happens when the
    /// gesture itself went through.
    async fn gesture(&self, js: &str, settle_ms: u64) -> Result<()> {
        check(self.surface.eval(js).await?)?;
        self.surface.settle(settle_ms).await;
        Ok(())
    }
}

fn from_element_js(
    locator: &Locator,
    direction: Direction,
    amount: i64,
    x_offset: i64,
    y_offset: i64,
) -> String {
    let (dx, dy) = direction.deltas(amount);
    SCROLL_FROM_ELEMENT_JS
        .replace("__SEL__", &encode(locator))
        .replace("__XOFF__", &x_offset.to_string())
        .replace("__YOFF__", &y_offset.to_string())
        .replace("__DX__", &dx.to_string())
        .replace("__DY__", &dy.to_string())
}

fn encode(locator: &Locator) -> String {
    serde_json::to_string(locator.as_str()).unwrap()
}

fn check(value: Value) -> Result<()> {
    match value.as_str() {
        Some("ok") => Ok(()),
        Some(status) => Err(Error::Interaction(status.replace('_', " "))),
        None => Err(Error::Interaction("scroll probe returned no status".into())),
    }
}

fn soft(gesture: &str, result: Result<()>) {
    if let Err(e) = result {
        warn!("{} failed (continuing): {}", gesture, e);
    }
}

//! Cookie consent strategies, tried in priority order.

use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use folio_core::FolioError;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::shared::{js, to_folio_error, SessionTiming};

/// One way of finding and pressing a consent control in a document `D`.
#[async_trait]
pub trait ConsentStrategy<D: ?Sized + Sync = Page>: Send + Sync {
    /// Handle to the control found by [`matches`](Self::matches)
    type Target: Send + Sync;

    fn name(&self) -> String;

    /// Returns a visible consent control, if this strategy finds one.
    async fn matches(&self, doc: &D) -> Option<Self::Target>;

    async fn activate(&self, target: &Self::Target) -> Result<(), FolioError>;
}

/// Boxed strategy over a Chromium tab.
pub type PageConsentStrategy = Box<dyn ConsentStrategy<Page, Target = Element>>;

/// Runs strategies in order until one clicks, over a few attempts.
pub struct CookieDismisser<D: ?Sized + Sync, T: Send + Sync> {
    strategies: Vec<Box<dyn ConsentStrategy<D, Target = T>>>,
    attempts: usize,
    retry_delay: Duration,
    dismissed_delay: Duration,
}

impl<D, T> CookieDismisser<D, T>
where
    D: ?Sized + Sync,
    T: Send + Sync,
{
    pub fn new(strategies: Vec<Box<dyn ConsentStrategy<D, Target = T>>>, timing: &SessionTiming) -> Self {
        Self {
            strategies,
            attempts: timing.cookie_attempts,
            retry_delay: timing.cookie_retry,
            dismissed_delay: timing.cookie_dismissed,
        }
    }

    /// Clicks the first visible consent control, retrying while the banner
    /// is still being injected. Finding nothing is not an error.
    pub async fn dismiss(&self, doc: &D) -> bool {
        for attempt in 1..=self.attempts {
            if let Some(strategy) = self.try_once(doc).await {
                info!(attempt, "Cookie banner dismissed via {}", strategy);
                sleep(self.dismissed_delay).await;
                return true;
            }
            sleep(self.retry_delay).await;
        }
        debug!("No cookie banner found");
        false
    }

    async fn try_once(&self, doc: &D) -> Option<String> {
        for strategy in &self.strategies {
            let Some(target) = strategy.matches(doc).await else { continue };
            match strategy.activate(&target).await {
                Ok(()) => return Some(strategy.name()),
                Err(e) => warn!("Consent click via {} failed: {}", strategy.name(), e),
            }
        }
        None
    }
}

#[derive(Debug, Deserialize)]
struct ElementProbe {
    visible: bool,
    text: String,
}

async fn probe(element: &Element) -> Option<ElementProbe> {
    let ret = element
        .call_js_fn(js::cookie::PROBE_ELEMENT, false)
        .await
        .ok()?;
    let raw = ret.result.value?;
    serde_json::from_str(raw.as_str()?).ok()
}

async fn click(element: &Element) -> Result<(), FolioError> {
    element
        .call_js_fn(js::cookie::CLICK_ELEMENT, false)
        .await
        .map_err(|e| to_folio_error(e, "ConsentClick"))?;
    Ok(())
}

/// First element matching a CSS selector.
pub struct SelectorStrategy {
    selector: String,
}

impl SelectorStrategy {
    pub fn new(selector: impl Into<String>) -> Self {
        Self { selector: selector.into() }
    }
}

#[async_trait]
impl ConsentStrategy for SelectorStrategy {
    type Target = Element;

    fn name(&self) -> String {
        format!("selector {}", self.selector)
    }

    async fn matches(&self, page: &Page) -> Option<Element> {
        // Not found and invalid selectors both land here.
        let element = page.find_element(self.selector.as_str()).await.ok()?;
        let probe = probe(&element).await?;
        probe.visible.then_some(element)
    }

    async fn activate(&self, element: &Element) -> Result<(), FolioError> {
        click(element).await
    }
}

/// Any visible button whose label contains one of the patterns.
pub struct ButtonTextStrategy {
    patterns: Vec<String>,
}

impl ButtonTextStrategy {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(|p| p.into().to_lowercase()).collect(),
        }
    }

    pub fn label_matches(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.patterns.iter().any(|p| label.contains(p.as_str()))
    }
}

#[async_trait]
impl ConsentStrategy for ButtonTextStrategy {
    type Target = Element;

    fn name(&self) -> String {
        format!("button text {:?}", self.patterns)
    }

    async fn matches(&self, page: &Page) -> Option<Element> {
        let buttons = page.find_elements("button").await.ok()?;
        for button in buttons {
            let Some(probe) = probe(&button).await else { continue };
            if probe.visible && self.label_matches(&probe.text) {
                debug!(text = %probe.text, "consent button matched by text");
                return Some(button);
            }
        }
        None
    }

    async fn activate(&self, element: &Element) -> Result<(), FolioError> {
        click(element).await
    }
}

pub fn default_consent_strategies() -> Vec<PageConsentStrategy> {
    let mut strategies: Vec<PageConsentStrategy> = js::cookie::CONSENT_SELECTORS
        .iter()
        .map(|s| Box::new(SelectorStrategy::new(*s)) as PageConsentStrategy)
        .collect();
    strategies.push(Box::new(ButtonTextStrategy::new(js::cookie::CONSENT_TEXT_PATTERNS.iter().copied())));
    strategies
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Records which strategies looked for a control.
    #[derive(Default)]
    struct Banner {
        log: Mutex<Vec<String>>,
    }

    impl Banner {
        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    struct FakeStrategy {
        name: &'static str,
        /// Attempt (1-based) from which the control is visible
        visible_from: Option<usize>,
        click_fails: bool,
        seen: Mutex<usize>,
    }

    impl FakeStrategy {
        fn boxed(name: &'static str, visible_from: Option<usize>, click_fails: bool) -> Box<dyn ConsentStrategy<Banner, Target = &'static str>> {
            Box::new(Self { name, visible_from, click_fails, seen: Mutex::new(0) })
        }
    }

    #[async_trait]
    impl ConsentStrategy<Banner> for FakeStrategy {
        type Target = &'static str;

        fn name(&self) -> String {
            self.name.to_string()
        }

        async fn matches(&self, doc: &Banner) -> Option<&'static str> {
            let mut seen = self.seen.lock().unwrap();
            *seen += 1;
            doc.log.lock().unwrap().push(format!("match {}", self.name));
            self.visible_from.filter(|from| *seen >= *from).map(|_| self.name)
        }

        async fn activate(&self, _target: &&'static str) -> Result<(), FolioError> {
            if self.click_fails {
                return Err(FolioError::script_error("element detached"));
            }
            Ok(())
        }
    }

    fn dismisser(strategies: Vec<Box<dyn ConsentStrategy<Banner, Target = &'static str>>>) -> CookieDismisser<Banner, &'static str> {
        CookieDismisser::new(strategies, &SessionTiming::default())
    }

    #[test]
    fn text_match_ignores_case() {
        let s = ButtonTextStrategy::new(["accept", "agree"]);
        assert!(s.label_matches("Accept all cookies"));
        assert!(s.label_matches("TOUT ACCEPTER"));
        assert!(s.label_matches("I Agree"));
        assert!(!s.label_matches("Manage preferences"));
    }

    #[test]
    fn selectors_come_before_text_matching() {
        let strategies = default_consent_strategies();
        assert_eq!(strategies.len(), js::cookie::CONSENT_SELECTORS.len() + 1);
        assert_eq!(strategies[0].name(), "selector #onetrust-accept-btn-handler");
        assert!(strategies.last().unwrap().name().starts_with("button text"));
    }

    #[tokio::test(start_paused = true)]
    async fn first_matching_strategy_wins() {
        let banner = Banner::default();
        let d = dismisser(vec![
            FakeStrategy::boxed("a", None, false),
            FakeStrategy::boxed("b", Some(1), false),
            FakeStrategy::boxed("c", Some(1), false),
        ]);

        let start = Instant::now();
        assert!(d.dismiss(&banner).await);

        assert_eq!(banner.log(), vec!["match a", "match b"]);
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_three_attempts() {
        let banner = Banner::default();
        let d = dismisser(vec![FakeStrategy::boxed("a", None, false), FakeStrategy::boxed("b", None, false)]);

        let start = Instant::now();
        assert!(!d.dismiss(&banner).await);

        assert_eq!(banner.log().len(), 6);
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_click_falls_through_to_next_strategy() {
        let banner = Banner::default();
        let d = dismisser(vec![FakeStrategy::boxed("broken", Some(1), true), FakeStrategy::boxed("text", Some(1), false)]);

        assert!(d.dismiss(&banner).await);
        assert_eq!(banner.log(), vec!["match broken", "match text"]);
    }

    #[tokio::test(start_paused = true)]
    async fn late_banner_is_caught_on_a_retry() {
        let banner = Banner::default();
        let d = dismisser(vec![FakeStrategy::boxed("a", Some(2), false)]);

        let start = Instant::now();
        assert!(d.dismiss(&banner).await);

        assert_eq!(banner.log().len(), 2);
        // one retry pause, then the post-click pause
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }
}

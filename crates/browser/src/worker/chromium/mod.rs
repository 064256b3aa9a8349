mod actions;
mod consent;
mod host;
mod overlay;
mod wait;
mod worker;

pub use actions::ActionHandler;
pub use consent::{
    default_consent_strategies, ButtonTextStrategy, ConsentStrategy, CookieDismisser, PageConsentStrategy,
    SelectorStrategy,
};
pub use host::ChromiumHost;
pub use overlay::{PrintStyles, StatusOverlay};
pub use wait::WaitStrategy;
pub use worker::{resolve_embed_url, BrowserSession, ChromiumWorker};

//! Chromium side of folio: the document host the load verifier drives, the
//! cookie, cleanup and print steps around it, and the job worker tying them
//! to a launched browser.

pub mod shared;
pub mod worker;

pub use shared::{SessionTiming, SettleMode};
pub use worker::chromium::{
    resolve_embed_url, ActionHandler, BrowserSession, ChromiumHost, ChromiumWorker, PrintStyles,
    StatusOverlay, WaitStrategy,
};

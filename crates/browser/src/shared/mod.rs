pub mod js;
pub mod errors;
pub mod config;

pub use config::{SessionTiming, SettleMode};
pub use errors::to_folio_error;

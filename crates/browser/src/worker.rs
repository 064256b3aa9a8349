pub mod chromium;

pub use chromium::ChromiumWorker;

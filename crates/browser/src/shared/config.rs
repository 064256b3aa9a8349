use std::time::Duration;

/// How a host waits between scroll actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleMode {
    /// Poll a DOM mutation counter and return once the page has gone quiet
    Observed,
    /// Sleep for the whole budget
    Fixed,
}

#[derive(Debug, Clone)]
pub struct SessionTiming {
    pub initial_load: Duration,
    pub page_stable: Duration,
    pub check_interval: Duration,
    pub cookie_attempts: usize,
    pub cookie_retry: Duration,
    pub cookie_dismissed: Duration,
    pub print_delay: Duration,
    pub settle_mode: SettleMode,
    /// DOM silence that counts as "rendered" in observed mode
    pub quiet_window: Duration,
    pub poll_initial: Duration,
    pub poll_max: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            initial_load: Duration::from_millis(3000),
            page_stable: Duration::from_millis(30000),
            check_interval: Duration::from_millis(300),
            cookie_attempts: 3,
            cookie_retry: Duration::from_millis(500),
            cookie_dismissed: Duration::from_millis(500),
            print_delay: Duration::from_millis(1000),
            settle_mode: SettleMode::Observed,
            quiet_window: Duration::from_millis(150),
            poll_initial: Duration::from_millis(25),
            poll_max: Duration::from_millis(400),
        }
    }
}

impl SessionTiming {
    pub fn with_settle_mode(mut self, mode: SettleMode) -> Self {
        self.settle_mode = mode;
        self
    }

    pub fn fast() -> Self {
        Self {
            initial_load: Duration::from_millis(1500),
            page_stable: Duration::from_millis(20000),
            check_interval: Duration::from_millis(200),
            cookie_retry: Duration::from_millis(300),
            cookie_dismissed: Duration::from_millis(300),
            print_delay: Duration::from_millis(500),
            quiet_window: Duration::from_millis(100),
            ..Self::default()
        }
    }

    pub fn patient() -> Self {
        Self {
            initial_load: Duration::from_millis(6000),
            page_stable: Duration::from_millis(60000),
            check_interval: Duration::from_millis(500),
            cookie_attempts: 5,
            cookie_retry: Duration::from_millis(1000),
            cookie_dismissed: Duration::from_millis(1000),
            print_delay: Duration::from_millis(2000),
            quiet_window: Duration::from_millis(400),
            poll_max: Duration::from_millis(800),
            ..Self::default()
        }
    }
}

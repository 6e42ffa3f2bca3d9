use std::time::Duration;

pub const DEFAULT_TEMPLATE: &str = "Pages/KitsPage.ui";
pub const DEFAULT_GRANT_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-page runtime settings, loaded from the `[page]` config table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    /// Layout template appended first on open.
    pub template: String,
    /// Interval of the cooldown refresh task.
    pub refresh_interval: Duration,
    /// Upper bound on one inventory grant; exceeding it counts as a failure.
    pub grant_timeout: Duration,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            refresh_interval: crate::scheduler::DEFAULT_REFRESH_INTERVAL,
            grant_timeout: DEFAULT_GRANT_TIMEOUT,
        }
    }
}

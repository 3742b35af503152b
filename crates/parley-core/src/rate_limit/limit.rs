use chrono::Duration;

use parley_types::config::WindowLimit;

#[derive(Debug, Clone)]
pub struct Limit {
    pub(crate) max_attempts: u32,
    pub(crate) window: Duration,
    pub(crate) message: Option<String>,
}

impl Limit {
    #[must_use]
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            message: None,
        }
    }

    #[must_use]
    pub fn per_minute(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::minutes(1))
    }

    #[must_use]
    pub fn per_minutes(max_attempts: u32, minutes: i64) -> Self {
        Self::new(max_attempts, Duration::minutes(minutes))
    }

    #[must_use]
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    pub fn window_secs(&self) -> u64 {
        u64::try_from(self.window.num_seconds()).unwrap_or(u64::MAX)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn get_message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl From<WindowLimit> for Limit {
    fn from(limit: WindowLimit) -> Self {
        let secs = i64::try_from(limit.window_secs).unwrap_or(i64::MAX);
        Self::new(limit.max_requests, Duration::seconds(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_per_minutes() {
        let limit = Limit::per_minutes(5, 15);
        assert_eq!(limit.max_attempts(), 5);
        assert_eq!(limit.window_secs(), 900);
    }

    #[test]
    fn test_limit_from_settings() {
        let limit = Limit::from(WindowLimit::new(30, 900));
        assert_eq!(limit.max_attempts(), 30);
        assert_eq!(limit.window_secs(), 900);
        assert_eq!(limit.get_message(), None);
    }

    #[test]
    fn test_limit_message() {
        let limit = Limit::per_minute(5).message("Too many login attempts");
        assert_eq!(limit.get_message(), Some("Too many login attempts"));
    }
}

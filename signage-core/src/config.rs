use std::time::Duration;

/// The configuration of the signage system
#[derive(Debug, Clone)]
pub struct Config {
    /// How long a slide stays on screen when it doesn't specify a duration
    pub default_slide_duration: Duration,
    /// How often subscribers receive a keep-alive comment
    pub keep_alive_interval: Duration,
    /// The creator stamped onto records when a request doesn't name one
    pub default_creator: String,
}

impl Config {
    /// Resolves a slide's stored duration, where 0 or nothing means the default.
    pub fn slide_duration(&self, duration_in_seconds: Option<u32>) -> Duration {
        match duration_in_seconds {
            Some(seconds) if seconds > 0 => Duration::from_secs(seconds as u64),
            _ => self.default_slide_duration,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_slide_duration: Duration::from_secs(10),
            // Most proxies drop idle connections after a minute
            keep_alive_interval: Duration::from_secs(30),
            default_creator: "admin".to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::Config;

    #[test]
    fn zero_or_missing_slide_durations_use_the_default() {
        let config = Config::default();

        assert_eq!(config.slide_duration(None), config.default_slide_duration);
        assert_eq!(config.slide_duration(Some(0)), config.default_slide_duration);
        assert_eq!(config.slide_duration(Some(4)), Duration::from_secs(4));
    }
}

use std::fmt::{Display, Formatter};

use chrono::Duration;

/// Default attempts allowed inside one window.
pub const DEFAULT_MAX_ATTEMPTS_PER_WINDOW: u32 = 10;
/// Default decision window in minutes.
pub const DEFAULT_WINDOW_MINUTES: i64 = 5;
/// Default failed attempts inside the window that trigger a block.
pub const DEFAULT_MAX_FAILED_ATTEMPTS: u32 = 5;
/// Default automatic block length in minutes.
pub const DEFAULT_BLOCK_DURATION_MINUTES: i64 = 15;
/// Default sweep period in minutes.
pub const DEFAULT_CLEANUP_INTERVAL_MINUTES: i64 = 30;
/// Default retention horizon as a multiple of the decision window.
pub const DEFAULT_RETENTION_MULTIPLIER: u32 = 2;
/// Upper bound for any duration setting, one year.
pub const MAX_DURATION_MINUTES: i64 = 525_600;

/// Raw, unvalidated cache settings as read from the environment.
///
/// Durations are expressed in whole minutes.
#[derive(Debug, Clone, Default)]
pub struct VerificationCacheSettings {
    /// Attempts allowed per window.
    pub max_attempts_per_window: Option<String>,
    /// Decision window in minutes.
    pub window_minutes: Option<String>,
    /// Failed attempts that trigger a block.
    pub max_failed_attempts: Option<String>,
    /// Automatic block length in minutes.
    pub block_duration_minutes: Option<String>,
    /// Default manual block length in minutes.
    pub manual_block_duration_minutes: Option<String>,
    /// Sweep period in minutes.
    pub cleanup_interval_minutes: Option<String>,
    /// Retention horizon multiplier.
    pub retention_multiplier: Option<String>,
}

/// A setting that was present but unusable and got replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCorrection {
    /// Setting name.
    pub field: &'static str,
    /// Value that was rejected.
    pub raw_value: String,
    /// Default that was applied instead.
    pub applied_default: String,
}

impl Display for ConfigCorrection {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{} must be a positive integer in range, got '{}'; using {}",
            self.field, self.raw_value, self.applied_default
        )
    }
}

/// Immutable verification cache configuration.
///
/// Every value is positive and durations never exceed
/// [`MAX_DURATION_MINUTES`]. Construct it with [`Default`] or
/// [`VerificationCacheConfig::from_settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCacheConfig {
    max_attempts_per_window: u32,
    window_duration: Duration,
    max_failed_attempts: u32,
    block_duration: Duration,
    manual_block_duration: Duration,
    cleanup_interval: Duration,
    retention_multiplier: u32,
}

impl Default for VerificationCacheConfig {
    fn default() -> Self {
        Self {
            max_attempts_per_window: DEFAULT_MAX_ATTEMPTS_PER_WINDOW,
            window_duration: Duration::minutes(DEFAULT_WINDOW_MINUTES),
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            block_duration: Duration::minutes(DEFAULT_BLOCK_DURATION_MINUTES),
            manual_block_duration: Duration::minutes(DEFAULT_BLOCK_DURATION_MINUTES),
            cleanup_interval: Duration::minutes(DEFAULT_CLEANUP_INTERVAL_MINUTES),
            retention_multiplier: DEFAULT_RETENTION_MULTIPLIER,
        }
    }
}

impl VerificationCacheConfig {
    /// Builds a configuration from raw settings.
    ///
    /// Missing settings take their defaults silently. Settings that are
    /// present but non-positive or unparsable are replaced by their defaults
    /// and reported as corrections. The manual block length defaults to the
    /// automatic block length in effect.
    #[must_use]
    pub fn from_settings(settings: &VerificationCacheSettings) -> (Self, Vec<ConfigCorrection>) {
        let mut corrections = Vec::new();

        let max_attempts_per_window = positive_count(
            "max_attempts_per_window",
            settings.max_attempts_per_window.as_deref(),
            DEFAULT_MAX_ATTEMPTS_PER_WINDOW,
            &mut corrections,
        );
        let window_duration = positive_minutes(
            "window_minutes",
            settings.window_minutes.as_deref(),
            DEFAULT_WINDOW_MINUTES,
            &mut corrections,
        );
        let max_failed_attempts = positive_count(
            "max_failed_attempts",
            settings.max_failed_attempts.as_deref(),
            DEFAULT_MAX_FAILED_ATTEMPTS,
            &mut corrections,
        );
        let block_duration = positive_minutes(
            "block_duration_minutes",
            settings.block_duration_minutes.as_deref(),
            DEFAULT_BLOCK_DURATION_MINUTES,
            &mut corrections,
        );
        let manual_block_duration = positive_minutes(
            "manual_block_duration_minutes",
            settings.manual_block_duration_minutes.as_deref(),
            block_duration.num_minutes(),
            &mut corrections,
        );
        let cleanup_interval = positive_minutes(
            "cleanup_interval_minutes",
            settings.cleanup_interval_minutes.as_deref(),
            DEFAULT_CLEANUP_INTERVAL_MINUTES,
            &mut corrections,
        );
        let retention_multiplier = positive_count(
            "retention_multiplier",
            settings.retention_multiplier.as_deref(),
            DEFAULT_RETENTION_MULTIPLIER,
            &mut corrections,
        );

        (
            Self {
                max_attempts_per_window,
                window_duration,
                max_failed_attempts,
                block_duration,
                manual_block_duration,
                cleanup_interval,
                retention_multiplier,
            },
            corrections,
        )
    }

    /// Overrides the attempts allowed per window. Zero is ignored.
    #[must_use]
    pub fn with_max_attempts_per_window(mut self, value: u32) -> Self {
        if value > 0 {
            self.max_attempts_per_window = value;
        }
        self
    }

    /// Overrides the decision window. Out-of-range durations are ignored.
    #[must_use]
    pub fn with_window_duration(mut self, value: Duration) -> Self {
        if is_valid_duration(value) {
            self.window_duration = value;
        }
        self
    }

    /// Overrides the failure threshold. Zero is ignored.
    #[must_use]
    pub fn with_max_failed_attempts(mut self, value: u32) -> Self {
        if value > 0 {
            self.max_failed_attempts = value;
        }
        self
    }

    /// Overrides the automatic block length. Out-of-range durations are ignored.
    #[must_use]
    pub fn with_block_duration(mut self, value: Duration) -> Self {
        if is_valid_duration(value) {
            self.block_duration = value;
        }
        self
    }

    /// Overrides the default manual block length. Out-of-range durations are ignored.
    #[must_use]
    pub fn with_manual_block_duration(mut self, value: Duration) -> Self {
        if is_valid_duration(value) {
            self.manual_block_duration = value;
        }
        self
    }

    /// Overrides the sweep period. Out-of-range durations are ignored.
    #[must_use]
    pub fn with_cleanup_interval(mut self, value: Duration) -> Self {
        if is_valid_duration(value) {
            self.cleanup_interval = value;
        }
        self
    }

    /// Overrides the retention multiplier. Zero is ignored.
    #[must_use]
    pub fn with_retention_multiplier(mut self, value: u32) -> Self {
        if value > 0 {
            self.retention_multiplier = value;
        }
        self
    }

    /// Attempts allowed inside one window.
    #[must_use]
    pub fn max_attempts_per_window(&self) -> u32 {
        self.max_attempts_per_window
    }

    /// Trailing window used for rate-limit and block decisions.
    #[must_use]
    pub fn window_duration(&self) -> Duration {
        self.window_duration
    }

    /// Failed attempts inside the window that trigger a block.
    #[must_use]
    pub fn max_failed_attempts(&self) -> u32 {
        self.max_failed_attempts
    }

    /// Length of an automatic block.
    #[must_use]
    pub fn block_duration(&self) -> Duration {
        self.block_duration
    }

    /// Length of a manual block when the caller gives none.
    #[must_use]
    pub fn manual_block_duration(&self) -> Duration {
        self.manual_block_duration
    }

    /// Period of the background sweep.
    #[must_use]
    pub fn cleanup_interval(&self) -> Duration {
        self.cleanup_interval
    }

    /// Retention horizon as a multiple of the window.
    #[must_use]
    pub fn retention_multiplier(&self) -> u32 {
        self.retention_multiplier
    }

    /// Age beyond which raw attempts are discarded.
    #[must_use]
    pub fn retention_horizon(&self) -> Duration {
        i32::try_from(self.retention_multiplier)
            .ok()
            .and_then(|multiplier| self.window_duration.checked_mul(multiplier))
            .unwrap_or(Duration::MAX)
    }

    /// Sweep period as a standard duration for timers.
    #[must_use]
    pub fn cleanup_interval_std(&self) -> std::time::Duration {
        self.cleanup_interval.to_std().unwrap_or_else(|_| {
            std::time::Duration::from_secs(
                DEFAULT_CLEANUP_INTERVAL_MINUTES.unsigned_abs().saturating_mul(60),
            )
        })
    }
}

fn is_valid_duration(value: Duration) -> bool {
    value > Duration::zero() && value <= Duration::minutes(MAX_DURATION_MINUTES)
}

fn positive_count(
    field: &'static str,
    raw_value: Option<&str>,
    default: u32,
    corrections: &mut Vec<ConfigCorrection>,
) -> u32 {
    let Some(raw_value) = raw_value else {
        return default;
    };

    match raw_value.trim().parse::<u32>() {
        Ok(value) if value > 0 => value,
        _ => {
            corrections.push(ConfigCorrection {
                field,
                raw_value: raw_value.to_owned(),
                applied_default: default.to_string(),
            });
            default
        }
    }
}

fn positive_minutes(
    field: &'static str,
    raw_value: Option<&str>,
    default_minutes: i64,
    corrections: &mut Vec<ConfigCorrection>,
) -> Duration {
    let default = Duration::minutes(default_minutes);
    let Some(raw_value) = raw_value else {
        return default;
    };

    let parsed = raw_value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|minutes| (1..=MAX_DURATION_MINUTES).contains(minutes))
        .and_then(Duration::try_minutes);

    parsed.unwrap_or_else(|| {
        corrections.push(ConfigCorrection {
            field,
            raw_value: raw_value.to_owned(),
            applied_default: format!("{default_minutes} minutes"),
        });
        default
    })
}

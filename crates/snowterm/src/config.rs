//! Command line configuration and logging setup

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::{fs::File, path::PathBuf, sync::Mutex, time::Duration};
use tracing::subscriber::NoSubscriber;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// What happens when the name prompt receives a name that is not permitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum IdentityPolicy {
    /// Flash an error, erase the name and ask again
    #[default]
    Retry,
    /// Mark the prompt with a lock glyph and end the card
    LockOut,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Snowterm - a New Year greeting card for your terminal")]
pub struct Args {
    /// Playback speed multiplier for every pause and typing delay
    #[arg(long, default_value = "1.0")]
    pub speed: f64,

    /// Behaviour of the identity check on a name that is not permitted
    #[arg(long, value_enum, default_value = "retry")]
    pub identity: IdentityPolicy,

    /// Idle time in milliseconds before a hint appears
    #[arg(long, default_value = "5000")]
    pub hint_delay_ms: u64,

    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Write logs to this file (the screen is owned by the card)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Disable the snowfall
    #[arg(long)]
    pub no_snow: bool,

    /// Disable the music cue
    #[arg(long)]
    pub no_music: bool,
}

/// Settings the scenario and the effects read
#[derive(Debug, Clone)]
pub struct CardConfig {
    pub pace: Pace,
    pub identity: IdentityPolicy,
    pub hint_delay: Duration,
    pub snow: bool,
    pub music: bool,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            pace: Pace::default(),
            identity: IdentityPolicy::Retry,
            hint_delay: snowterm_terminal::DEFAULT_IDLE_DELAY,
            snow: true,
            music: true,
        }
    }
}

impl TryFrom<&Args> for CardConfig {
    type Error = anyhow::Error;

    fn try_from(args: &Args) -> Result<Self> {
        Ok(Self {
            pace: Pace::new(args.speed)?,
            identity: args.identity,
            hint_delay: Duration::from_millis(args.hint_delay_ms),
            snow: !args.no_snow,
            music: !args.no_music,
        })
    }
}

/// Accepted range of the playback speed multiplier
pub const SPEED_RANGE: std::ops::RangeInclusive<f64> = 0.01..=1000.0;

/// Scales scripted waits by the playback speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pace {
    speed: f64,
}

impl Default for Pace {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

impl Pace {
    pub fn new(speed: f64) -> Result<Self> {
        if !SPEED_RANGE.contains(&speed) {
            anyhow::bail!(
                "Speed must be between {} and {}, got {}",
                SPEED_RANGE.start(),
                SPEED_RANGE.end(),
                speed
            );
        }
        Ok(Self { speed })
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Scale a duration
    pub fn scale(&self, duration: Duration) -> Duration {
        duration.div_f64(self.speed)
    }

    /// Scaled duration of `ms` milliseconds
    pub fn millis(&self, ms: u64) -> Duration {
        self.scale(Duration::from_millis(ms))
    }

    pub async fn wait(&self, ms: u64) {
        tokio::time::sleep(self.millis(ms)).await;
    }
}

/// Install the global subscriber. The card owns the screen, so logs only go
/// to a file; without one tracing is silenced.
pub fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = &args.log_file else {
        let _ = NoSubscriber::default().try_init();
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = args.log_level.as_filter();
        EnvFilter::new(format!("snowterm={level},snowterm_terminal={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["snowterm"]);
        let config = CardConfig::try_from(&args).unwrap();

        assert_eq!(config.pace.speed(), 1.0);
        assert_eq!(config.identity, IdentityPolicy::Retry);
        assert_eq!(config.hint_delay, Duration::from_secs(5));
        assert!(config.snow);
        assert!(config.music);
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "snowterm",
            "--speed",
            "4",
            "--identity",
            "lock-out",
            "--hint-delay-ms",
            "1500",
            "--no-snow",
        ]);
        let config = CardConfig::try_from(&args).unwrap();

        assert_eq!(config.identity, IdentityPolicy::LockOut);
        assert_eq!(config.hint_delay, Duration::from_millis(1500));
        assert_eq!(config.pace.millis(2000), Duration::from_millis(500));
        assert!(!config.snow);
        assert!(config.music);
    }

    #[test]
    fn test_speed_must_be_positive() {
        assert!(Pace::new(0.0).is_err());
        assert!(Pace::new(-1.0).is_err());
        assert!(Pace::new(f64::NAN).is_err());
        assert!(Pace::new(0.5).is_ok());
    }

    #[test]
    fn test_speed_outside_range_is_rejected() {
        assert!(Pace::new(1e-300).is_err());
        assert!(Pace::new(0.001).is_err());
        assert!(Pace::new(f64::INFINITY).is_err());
        assert!(Pace::new(1e9).is_err());

        let args = Args::parse_from(["snowterm", "--speed", "1e-300"]);
        assert!(CardConfig::try_from(&args).is_err());

        // The slowest accepted pace still scales the longest waits
        let slowest = Pace::new(*SPEED_RANGE.start()).unwrap();
        let longest = slowest.millis(2000);
        assert!(longest > Duration::from_secs(199) && longest < Duration::from_secs(201));
    }
}

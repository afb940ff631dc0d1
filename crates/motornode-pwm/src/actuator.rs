use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{PwmError, Result};

/// Default PWM period: 1 ms (1 kHz).
pub const DEFAULT_PERIOD_NS: u32 = 1_000_000;

/// A duty-cycle output driving one motor.
///
/// The seam between the dispatch layer and the hardware. Production code uses
/// [`SysfsPwm`]; tests substitute an in-memory recorder.
pub trait Actuator: Send {
    /// Apply a duty cycle in percent.
    fn set_duty_cycle(&mut self, percent: f32) -> Result<()>;

    /// The most recently applied duty cycle in percent.
    fn duty_cycle(&self) -> f32;
}

/// One PWM channel backed by the Linux sysfs PWM interface.
///
/// The configured path is a channel directory such as
/// `/sys/class/pwm/pwmchip0/pwm0`, containing the `period`, `duty_cycle`
/// and `enable` attribute files.
pub struct SysfsPwm {
    path: PathBuf,
    period_ns: u32,
    duty_percent: f32,
}

impl SysfsPwm {
    /// Initialize the channel: set the period, zero the duty cycle, enable
    /// the output.
    pub fn init(path: impl AsRef<Path>, period_ns: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let channel = Self {
            path: path.clone(),
            period_ns,
            duty_percent: 0.0,
        };

        channel
            .write_attr("period", period_ns)
            .and_then(|()| channel.write_attr("duty_cycle", 0))
            .and_then(|()| channel.write_attr("enable", 1))
            .map_err(|err| match err {
                PwmError::Write { path, source } => PwmError::Init { path, source },
                other => other,
            })?;

        info!(?path, period_ns, "pwm channel initialized");
        Ok(channel)
    }

    /// The sysfs channel directory this output writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The configured PWM period in nanoseconds.
    pub fn period_ns(&self) -> u32 {
        self.period_ns
    }

    fn write_attr(&self, name: &str, value: u32) -> Result<()> {
        let attr = self.path.join(name);
        std::fs::write(&attr, value.to_string()).map_err(|source| PwmError::Write {
            path: attr,
            source,
        })
    }
}

impl Actuator for SysfsPwm {
    fn set_duty_cycle(&mut self, percent: f32) -> Result<()> {
        // Duty writes saturate at the physical range; the commanded value is
        // kept as-is for reporting.
        let active_ns = (self.period_ns as f32 * (percent.clamp(0.0, 100.0) / 100.0)) as u32;
        self.write_attr("duty_cycle", active_ns)?;
        self.duty_percent = percent;
        debug!(path = ?self.path, percent, active_ns, "duty cycle set");
        Ok(())
    }

    fn duty_cycle(&self) -> f32 {
        self.duty_percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_channel_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "motornode-pwm-{}-{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[test]
    fn init_writes_period_and_enables() {
        let dir = make_channel_dir("init");
        let channel = SysfsPwm::init(&dir, 2_000_000).expect("init should succeed");

        assert_eq!(
            std::fs::read_to_string(dir.join("period")).unwrap(),
            "2000000"
        );
        assert_eq!(
            std::fs::read_to_string(dir.join("duty_cycle")).unwrap(),
            "0"
        );
        assert_eq!(std::fs::read_to_string(dir.join("enable")).unwrap(), "1");
        assert_eq!(channel.duty_cycle(), 0.0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn set_duty_cycle_scales_by_period() {
        let dir = make_channel_dir("duty");
        let mut channel = SysfsPwm::init(&dir, 1_000_000).expect("init should succeed");

        channel.set_duty_cycle(25.0).expect("write should succeed");
        assert_eq!(
            std::fs::read_to_string(dir.join("duty_cycle")).unwrap(),
            "250000"
        );
        assert_eq!(channel.duty_cycle(), 25.0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn out_of_range_duty_saturates_on_the_wire() {
        let dir = make_channel_dir("clamp");
        let mut channel = SysfsPwm::init(&dir, 1_000_000).expect("init should succeed");

        channel.set_duty_cycle(-5.0).expect("write should succeed");
        assert_eq!(
            std::fs::read_to_string(dir.join("duty_cycle")).unwrap(),
            "0"
        );
        // The commanded value is still reported unmodified.
        assert_eq!(channel.duty_cycle(), -5.0);

        channel.set_duty_cycle(150.0).expect("write should succeed");
        assert_eq!(
            std::fs::read_to_string(dir.join("duty_cycle")).unwrap(),
            "1000000"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn init_fails_on_missing_directory() {
        let missing = std::env::temp_dir().join("motornode-pwm-does-not-exist/pwm0");
        let result = SysfsPwm::init(&missing, DEFAULT_PERIOD_NS);
        assert!(matches!(result, Err(PwmError::Init { .. })));
    }
}

use motornode_pwm::{Actuator, ChannelBank, SpeedMapper, MOTOR_COUNT};
use tracing::warn;

/// The shared actuation context.
///
/// Constructed once at startup and handed by `Arc` to both the IPC command
/// loop and the HTTP handlers — there are no process-wide globals. All duty
/// writes funnel through the bank's per-channel locks, so the two transports
/// can actuate concurrently without racing.
pub struct NodeState<A> {
    bank: ChannelBank<A>,
    mapper: Box<dyn SpeedMapper>,
}

impl<A: Actuator> NodeState<A> {
    pub fn new(bank: ChannelBank<A>, mapper: Box<dyn SpeedMapper>) -> Self {
        Self { bank, mapper }
    }

    /// Map each speed through the configured policy and apply it to its
    /// channel, positional order 0..3.
    ///
    /// A failed write is logged and does not stop the remaining channels.
    pub fn apply_speeds(&self, speeds: &[f32; MOTOR_COUNT]) {
        for (index, speed) in speeds.iter().copied().enumerate() {
            let percent = self.mapper.duty_cycle(speed);
            if let Err(err) = self.bank.set_duty_cycle(index, percent) {
                warn!(index, speed, %err, "duty cycle write failed");
            }
        }
    }

    /// Current duty cycles, channel order 0..3.
    pub fn duty_cycles(&self) -> [f32; MOTOR_COUNT] {
        self.bank.duty_cycles()
    }
}

#[cfg(test)]
mod tests {
    use motornode_pwm::{IdentityMapper, Result, RpmRangeMapper};

    use super::*;

    struct StubActuator {
        duty: f32,
    }

    impl Actuator for StubActuator {
        fn set_duty_cycle(&mut self, percent: f32) -> Result<()> {
            self.duty = percent;
            Ok(())
        }

        fn duty_cycle(&self) -> f32 {
            self.duty
        }
    }

    fn make_state(mapper: Box<dyn SpeedMapper>) -> NodeState<StubActuator> {
        let bank = ChannelBank::new([
            StubActuator { duty: 0.0 },
            StubActuator { duty: 0.0 },
            StubActuator { duty: 0.0 },
            StubActuator { duty: 0.0 },
        ]);
        NodeState::new(bank, mapper)
    }

    #[test]
    fn identity_mapping_applies_speeds_unchanged() {
        let state = make_state(Box::new(IdentityMapper));
        state.apply_speeds(&[10.0, -5.0, 0.0, 100.0]);
        assert_eq!(state.duty_cycles(), [10.0, -5.0, 0.0, 100.0]);
    }

    #[test]
    fn configured_mapper_transforms_speeds() {
        let state = make_state(Box::new(RpmRangeMapper::new(0.0, 1000.0)));
        state.apply_speeds(&[0.0, 250.0, 500.0, 1000.0]);
        assert_eq!(state.duty_cycles(), [0.0, 25.0, 50.0, 100.0]);
    }
}

//! Readiness gate that stands in for hardware flow control.
//!
//! The printer's print and feed mechanics are far slower than the serial
//! link, and the link itself reports no backpressure. After every operation
//! the driver arms this gate with an estimate of when the printer will be
//! ready again; before every byte it waits the estimate out. Printers wired
//! with a busy line skip the arithmetic entirely and poll the line instead.

use log::trace;

use crate::port::{BusyLine, Clock};

/// Flow-control strategy, fixed for the life of a session once
/// [`Printer::begin`](crate::Printer::begin) has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handshake {
    /// Pace output from per-operation timing estimates.
    Timed,
    /// Pace output from the printer's busy signal line.
    SignalPin,
}

pub(crate) struct TimingGate<C: Clock> {
    clock: C,
    busy: Option<Box<dyn BusyLine>>,
    handshake_enabled: bool,
    resume_at: u64,
    #[cfg(test)]
    last_estimate: u64,
}

impl<C: Clock> TimingGate<C> {
    /// A fresh gate starts in [`Handshake::Timed`] mode even when a busy line
    /// is present; `enable_handshake` flips it over once the printer has been
    /// told to drive the line.
    pub(crate) fn new(clock: C, busy: Option<Box<dyn BusyLine>>) -> Self {
        TimingGate {
            clock,
            busy,
            handshake_enabled: false,
            resume_at: 0,
            #[cfg(test)]
            last_estimate: 0,
        }
    }

    pub(crate) fn has_busy_line(&self) -> bool {
        self.busy.is_some()
    }

    /// Permanently switch to [`Handshake::SignalPin`] pacing.
    pub(crate) fn enable_handshake(&mut self) {
        if self.busy.is_some() {
            self.handshake_enabled = true;
        }
    }

    pub(crate) fn handshake(&self) -> Handshake {
        if self.handshake_enabled {
            Handshake::SignalPin
        } else {
            Handshake::Timed
        }
    }

    /// Block until the printer is estimated (or signalled) to be ready.
    ///
    /// This is an active poll, not a descheduling sleep: the calling thread
    /// spins on the clock or the busy line and monopolizes the processor
    /// until the gate opens. It is the single suspension point in the driver,
    /// so embedding schedulers that want to interleave work must do so around
    /// calls into the driver, not inside them.
    pub(crate) fn wait(&self) {
        match &self.busy {
            Some(line) if self.handshake_enabled => {
                while line.is_busy() {
                    std::hint::spin_loop();
                }
            }
            _ => {
                while self.clock.now_us() < self.resume_at {
                    std::hint::spin_loop();
                }
            }
        }
    }

    /// Record the estimated completion time of a just-issued operation.
    ///
    /// No-op under signal-pin handshaking; the line already says when the
    /// printer is ready. The estimate is advisory pacing only and cannot be
    /// revoked once set.
    pub(crate) fn arm(&mut self, duration_us: u64) {
        if !self.handshake_enabled {
            trace!("gate armed for {}us", duration_us);
            self.resume_at = self.clock.now_us() + duration_us;
            #[cfg(test)]
            {
                self.last_estimate = duration_us;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn resume_at(&self) -> u64 {
        self.resume_at
    }

    #[cfg(test)]
    pub(crate) fn last_estimate(&self) -> u64 {
        self.last_estimate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ScriptedBusyLine, StepClock};

    #[test]
    fn timed_wait_honors_the_estimate() {
        let clock = StepClock::new(1_000);
        let handle = clock.handle();
        let mut gate = TimingGate::new(clock, None);

        let before = handle.get();
        gate.arm(50_000);
        let resume = gate.resume_at();
        assert!(resume >= before + 50_000);

        gate.wait();
        assert!(handle.get() >= resume);
    }

    #[test]
    fn timed_wait_returns_immediately_when_idle() {
        let clock = StepClock::new(1_000);
        let handle = clock.handle();
        let gate: TimingGate<StepClock> = TimingGate::new(clock, None);

        gate.wait();
        // One clock read is all an open gate should cost.
        assert!(handle.get() <= 1_000);
    }

    #[test]
    fn signal_pin_arm_is_a_no_op() {
        let clock = StepClock::new(1_000);
        let mut gate = TimingGate::new(clock, Some(Box::new(ScriptedBusyLine::new(0))));
        gate.enable_handshake();
        assert_eq!(gate.handshake(), Handshake::SignalPin);

        gate.arm(1_000_000);
        assert_eq!(gate.resume_at(), 0);
    }

    #[test]
    fn signal_pin_wait_follows_the_line() {
        let clock = StepClock::new(1_000);
        let line = ScriptedBusyLine::new(5);
        let reads = line.reads();
        let mut gate = TimingGate::new(clock, Some(Box::new(line)));
        gate.enable_handshake();

        gate.wait();
        // Five busy reads plus the final low one.
        assert_eq!(reads.get(), 6);
    }

    #[test]
    fn handshake_needs_a_line() {
        let clock = StepClock::new(1_000);
        let mut gate = TimingGate::new(clock, None);
        gate.enable_handshake();
        assert_eq!(gate.handshake(), Handshake::Timed);
    }
}

//! Test doubles for the injected capabilities.

use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use crate::port::{BusyLine, Clock, SerialPort};

/// Records every transmitted byte and serves scripted status replies.
pub(crate) struct MockPort {
    pub sent: Vec<u8>,
    pub replies: VecDeque<u8>,
}

impl MockPort {
    pub(crate) fn new() -> Self {
        MockPort {
            sent: Vec::new(),
            replies: VecDeque::new(),
        }
    }

    pub(crate) fn with_replies(replies: &[u8]) -> Self {
        MockPort {
            sent: Vec::new(),
            replies: replies.iter().copied().collect(),
        }
    }
}

impl SerialPort for MockPort {
    fn send(&mut self, byte: u8) -> io::Result<()> {
        self.sent.push(byte);
        Ok(())
    }

    fn poll(&mut self) -> io::Result<Option<u8>> {
        Ok(self.replies.pop_front())
    }
}

/// Clock that advances by a fixed step on every read, so timed waits always
/// terminate.
pub(crate) struct StepClock {
    now: Rc<Cell<u64>>,
    step: u64,
}

impl StepClock {
    pub(crate) fn new(step_us: u64) -> Self {
        StepClock {
            now: Rc::new(Cell::new(0)),
            step: step_us,
        }
    }

    /// Shared view of the current time, readable after the clock has been
    /// moved into the driver.
    pub(crate) fn handle(&self) -> Rc<Cell<u64>> {
        Rc::clone(&self.now)
    }
}

impl Clock for StepClock {
    fn now_us(&self) -> u64 {
        let t = self.now.get() + self.step;
        self.now.set(t);
        t
    }
}

/// Busy line that reads high a scripted number of times, then low.
pub(crate) struct ScriptedBusyLine {
    remaining_high: Cell<u32>,
    reads: Rc<Cell<u32>>,
}

impl ScriptedBusyLine {
    pub(crate) fn new(high_reads: u32) -> Self {
        ScriptedBusyLine {
            remaining_high: Cell::new(high_reads),
            reads: Rc::new(Cell::new(0)),
        }
    }

    pub(crate) fn reads(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.reads)
    }
}

impl BusyLine for ScriptedBusyLine {
    fn is_busy(&self) -> bool {
        self.reads.set(self.reads.get() + 1);
        let remaining = self.remaining_high.get();
        if remaining > 0 {
            self.remaining_high.set(remaining - 1);
            true
        } else {
            false
        }
    }
}

//! Vsync gate
//!
//! The panel raises its tearing-effect line for the duration of each
//! vertical sync pulse. Waiting only for the line to be high could return
//! at the tail of a pulse already in progress, so the gate first lets any
//! current pulse end and then waits for the next one to begin.
//!
//! There is no timeout; the line is driven by fixed-frequency panel
//! hardware.

use embedded_hal_async::digital::Wait;
use scanline_hal::InputPin;

/// Blocking vsync waiter over the tearing-effect input
pub struct VsyncGate<P> {
    pin: P,
}

impl<P: InputPin> VsyncGate<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Whether a sync pulse is active right now
    pub fn in_vsync(&self) -> bool {
        self.pin.is_high()
    }

    /// Block until a fresh sync pulse starts
    pub fn wait(&self) {
        while self.pin.is_high() {
            core::hint::spin_loop();
        }
        while self.pin.is_low() {
            core::hint::spin_loop();
        }
    }

    /// Release the input pin
    pub fn release(self) -> P {
        self.pin
    }
}

/// Wait for a fresh sync pulse without blocking the executor
pub async fn wait_vsync_async<P: Wait>(pin: &mut P) -> Result<(), P::Error> {
    pin.wait_for_low().await?;
    pin.wait_for_high().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Replays a scripted level sequence; holds the last level forever
    struct ScriptedPin {
        levels: RefCell<VecDeque<bool>>,
        last: Cell<bool>,
        reads: Cell<usize>,
    }

    impl ScriptedPin {
        fn new(levels: &[bool]) -> Self {
            Self {
                levels: RefCell::new(levels.iter().copied().collect()),
                last: Cell::new(false),
                reads: Cell::new(0),
            }
        }

        fn remaining(&self) -> Vec<bool> {
            self.levels.borrow().iter().copied().collect()
        }
    }

    impl InputPin for ScriptedPin {
        fn is_high(&self) -> bool {
            self.reads.set(self.reads.get() + 1);
            if let Some(level) = self.levels.borrow_mut().pop_front() {
                self.last.set(level);
            }
            self.last.get()
        }
    }

    #[test]
    fn test_waits_out_current_pulse_first() {
        // In a pulse, pulse ends, gap, next pulse starts, extra samples
        let gate = VsyncGate::new(ScriptedPin::new(&[
            true, true, false, false, false, true, true, false,
        ]));
        gate.wait();
        let pin = gate.release();
        assert_eq!(pin.reads.get(), 6);
        assert_eq!(pin.remaining(), [true, false]);
    }

    #[test]
    fn test_outside_pulse_waits_for_next_start() {
        let gate = VsyncGate::new(ScriptedPin::new(&[false, false, true, false]));
        gate.wait();
        let pin = gate.release();
        assert_eq!(pin.remaining(), [false]);
    }

    /// Async line that advances through a script whenever it is awaited
    struct ScriptedLine {
        levels: VecDeque<bool>,
        level: bool,
    }

    impl ScriptedLine {
        fn advance_until(&mut self, target: bool) {
            while self.level != target {
                self.level = self.levels.pop_front().expect("script exhausted");
            }
        }
    }

    impl embedded_hal::digital::ErrorType for ScriptedLine {
        type Error = core::convert::Infallible;
    }

    impl Wait for ScriptedLine {
        async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
            self.advance_until(true);
            Ok(())
        }

        async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
            self.advance_until(false);
            Ok(())
        }

        async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
            self.advance_until(false);
            self.advance_until(true);
            Ok(())
        }

        async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
            self.advance_until(true);
            self.advance_until(false);
            Ok(())
        }

        async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
            let start = self.level;
            self.advance_until(!start);
            Ok(())
        }
    }

    #[test]
    fn test_async_wait_skips_current_pulse() {
        let mut line = ScriptedLine {
            levels: [true, false, false, true, true].into_iter().collect(),
            level: true,
        };
        embassy_futures::block_on(wait_vsync_async(&mut line)).unwrap();
        assert!(line.level);
        assert_eq!(line.levels.len(), 1);
    }

    #[test]
    fn test_in_vsync_reflects_level() {
        let gate = VsyncGate::new(ScriptedPin::new(&[true, false]));
        assert!(gate.in_vsync());
        assert!(!gate.in_vsync());
    }
}

//! EXTI Edge Dispatch
//!
//! Binds encoder lines to STM32 external interrupts. Each line is serviced
//! by its own task that sleeps on the EXTI edge, latches the new level and
//! calls the handler the decoder registered during activation.

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Pin, Pull};
use embassy_stm32::Peripheral;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::drivers::encoder::{deliver_level_change, EdgeDispatch, EdgeHandler, InputLine};

/// One encoder input routed through EXTI
pub struct ExtiLine {
    level: AtomicBool,
    pull_up: AtomicBool,
    handler: Signal<CriticalSectionRawMutex, EdgeHandler>,
}

impl ExtiLine {
    /// Create an unarmed line (idle level high)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level: AtomicBool::new(true),
            pull_up: AtomicBool::new(false),
            handler: Signal::new(),
        }
    }

    fn latch(&self, high: bool) {
        self.level.store(high, Ordering::Relaxed);
    }
}

impl Default for ExtiLine {
    fn default() -> Self {
        Self::new()
    }
}

impl InputLine for ExtiLine {
    fn is_high(&self) -> bool {
        self.level.load(Ordering::Relaxed)
    }
}

/// Dispatch layer arming [`ExtiLine`]s
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtiDispatch;

impl EdgeDispatch<&'static ExtiLine> for ExtiDispatch {
    type Error = Infallible;

    fn configure_pull_up(&mut self, line: &&'static ExtiLine) -> Result<(), Self::Error> {
        line.pull_up.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn attach(&mut self, line: &&'static ExtiLine, handler: EdgeHandler) -> Result<(), Self::Error> {
        line.handler.signal(handler);
        Ok(())
    }
}

/// Service one line forever
///
/// Waits until the line is armed, then configures the pin as an EXTI input
/// and dispatches every edge to the registered handler in delivery order.
/// The pin is re-sampled after each handler run so a level change that
/// slipped in before the next wait is still delivered.
pub async fn run_line<T>(pin: T, channel: T::ExtiChannel, line: &'static ExtiLine) -> !
where
    T: Pin,
    T::ExtiChannel: Peripheral<P = T::ExtiChannel>,
{
    let handler = line.handler.wait().await;
    let pull = if line.pull_up.load(Ordering::Relaxed) {
        Pull::Up
    } else {
        Pull::None
    };

    let mut input = ExtiInput::new(pin, channel, pull);
    // A line already low at arming is an edge the decoder has not seen
    deliver_level_change(&line.level, input.is_high(), handler);
    defmt::debug!("EXTI line armed, level high: {}", input.is_high());

    loop {
        input.wait_for_any_edge().await;
        line.latch(input.is_high());
        handler();
        // Edges between the handler and the next wait raise no event
        while deliver_level_change(&line.level, input.is_high(), handler) {}
    }
}

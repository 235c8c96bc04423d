//! Rotary Encoder Driver
//!
//! Interrupt-driven quadrature decoding for the tuning knob. Each of the two
//! encoder lines raises an edge interrupt; the handlers sample their own line
//! and feed a seven-state machine that counts one step per detent and absorbs
//! contact bounce.
//!
//! The accumulated position is shared between the edge handlers and the
//! foreground loop. All access goes through a `critical_section`, so the
//! foreground never observes a half-finished update.

use core::cell::{Cell, RefCell};
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;

/// Zero-argument trampoline bound to one hardware line.
///
/// Interrupt vectors cannot carry an instance, so the application provides a
/// free function per line that forwards to the owning decoder, e.g.
/// `fn encoder_a() { ENCODER.on_channel_a_edge() }`.
pub type EdgeHandler = fn();

/// Digital input whose current level can be sampled from interrupt context
pub trait InputLine {
    /// Returns true if the line is at logic high
    fn is_high(&self) -> bool;
}

impl<T: InputLine + ?Sized> InputLine for &T {
    fn is_high(&self) -> bool {
        (**self).is_high()
    }
}

/// A level latched by the dispatch layer on every edge
impl InputLine for AtomicBool {
    fn is_high(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Latch a fresh sample of a line and run `handler` if it moved
///
/// Returns true when `sampled` differs from the level previously latched
/// into `level`. Dispatch layers call this right after arming a line and
/// after every handler run: a transition that lands while no one waits on
/// the line raises no event, and the state machine assumes both lines start
/// high.
pub fn deliver_level_change(level: &AtomicBool, sampled: bool, handler: EdgeHandler) -> bool {
    if level.swap(sampled, Ordering::Relaxed) == sampled {
        return false;
    }
    handler();
    true
}

/// Interrupt dispatch capability consumed by [`QuadratureDecoder::activate`]
pub trait EdgeDispatch<L> {
    /// Error reported when the hardware rejects a configuration
    type Error;

    /// Configure `line` as a digital input with pull-up bias
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be configured.
    fn configure_pull_up(&mut self, line: &L) -> Result<(), Self::Error>;

    /// Invoke `handler` on every logic-level transition of `line`
    ///
    /// # Errors
    ///
    /// Returns an error if no interrupt can be routed to the line.
    fn attach(&mut self, line: &L, handler: EdgeHandler) -> Result<(), Self::Error>;
}

/// Errors raised while bringing up an encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderError<E> {
    /// The dispatch layer failed to configure a line
    Dispatch(E),
    /// `activate` was already called on this decoder
    AlreadyActive,
}

impl<E> From<E> for EncoderError<E> {
    fn from(error: E) -> Self {
        Self::Dispatch(error)
    }
}

impl<E: fmt::Debug> fmt::Display for EncoderError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatch(e) => write!(f, "edge dispatch error: {e:?}"),
            Self::AlreadyActive => write!(f, "encoder already activated"),
        }
    }
}

#[cfg(feature = "embedded")]
impl<E: defmt::Format> defmt::Format for EncoderError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Dispatch(e) => defmt::write!(f, "edge dispatch error: {}", e),
            Self::AlreadyActive => defmt::write!(f, "encoder already activated"),
        }
    }
}

/// Encoder rotation direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Clockwise rotation (increment)
    Clockwise,
    /// Counter-clockwise rotation (decrement)
    CounterClockwise,
}

#[cfg(feature = "embedded")]
impl defmt::Format for Direction {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Clockwise => defmt::write!(f, "CW"),
            Self::CounterClockwise => defmt::write!(f, "CCW"),
        }
    }
}

/// Encoder state machine states
///
/// A clockwise detent walks B low, A low, B high, A high; counter-clockwise
/// is the mirror image. The count changes on entering `Cw2`/`Ccw2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EncoderState {
    /// Resting at a detent, both lines high
    #[default]
    Idle,
    /// B went low first
    Cw1,
    /// Both low, step counted; waiting for B high
    Cw2,
    /// B back high; waiting for A high
    Cw3,
    /// A went low first
    Ccw1,
    /// Both low, step counted; waiting for A high
    Ccw2,
    /// A back high; waiting for B high
    Ccw3,
}

#[cfg(feature = "embedded")]
impl defmt::Format for EncoderState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "IDLE"),
            Self::Cw1 => defmt::write!(f, "CW_1"),
            Self::Cw2 => defmt::write!(f, "CW_2"),
            Self::Cw3 => defmt::write!(f, "CW_3"),
            Self::Ccw1 => defmt::write!(f, "CCW_1"),
            Self::Ccw2 => defmt::write!(f, "CCW_2"),
            Self::Ccw3 => defmt::write!(f, "CCW_3"),
        }
    }
}

/// Detent counting state machine, free of any hardware access
///
/// Holds the last observed level of each line, the current state and the
/// accumulated position.
#[derive(Clone, Copy, Debug)]
pub struct DetentTracker {
    state: EncoderState,
    a: bool,
    b: bool,
    position: i32,
}

impl DetentTracker {
    /// Create a tracker resting at a detent with both lines pulled high
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: EncoderState::Idle,
            a: true,
            b: true,
            position: 0,
        }
    }

    /// Record a new level on line A, returns direction if a step was counted
    pub fn update_a(&mut self, level: bool) -> Option<Direction> {
        self.a = level;
        self.advance()
    }

    /// Record a new level on line B, returns direction if a step was counted
    pub fn update_b(&mut self, level: bool) -> Option<Direction> {
        self.b = level;
        self.advance()
    }

    /// Current state machine state
    #[must_use]
    pub const fn state(&self) -> EncoderState {
        self.state
    }

    /// Accumulated position in detents
    #[must_use]
    pub const fn position(&self) -> i32 {
        self.position
    }

    /// Overwrite the accumulated position
    pub fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    fn advance(&mut self) -> Option<Direction> {
        use EncoderState::{Ccw1, Ccw2, Ccw3, Cw1, Cw2, Cw3, Idle};

        // Guards that match nothing leave the state alone; that is what
        // swallows contact bounce.
        let (next, step) = match (self.state, self.a, self.b) {
            // Whichever line drops first picks the direction. B is checked
            // first, so both low at once counts as clockwise.
            (Idle, _, false) => (Cw1, None),
            (Idle, false, true) => (Ccw1, None),

            (Cw1, false, false) => (Cw2, Some(Direction::Clockwise)),
            // B bounced back up before A ever dropped
            (Cw1, true, true) => (Idle, None),
            (Cw2, _, true) => (Cw3, None),
            (Cw3, true, _) => (Idle, None),

            (Ccw1, false, false) => (Ccw2, Some(Direction::CounterClockwise)),
            // A bounced back up before B ever dropped
            (Ccw1, true, true) => (Idle, None),
            (Ccw2, true, _) => (Ccw3, None),
            (Ccw3, _, true) => (Idle, None),

            (state, _, _) => (state, None),
        };

        match step {
            Some(Direction::Clockwise) => self.position = self.position.wrapping_add(1),
            Some(Direction::CounterClockwise) => self.position = self.position.wrapping_sub(1),
            None => {}
        }

        self.state = next;
        step
    }
}

impl Default for DetentTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Interrupt-driven quadrature decoder for one A/B encoder
///
/// Designed to live in a `static` so the edge trampolines can reach it:
///
/// ```ignore
/// static ENCODER: QuadratureDecoder<&ExtiLine> =
///     QuadratureDecoder::new(&LINE_A, &LINE_B, encoder_a, encoder_b);
///
/// fn encoder_a() { ENCODER.on_channel_a_edge() }
/// fn encoder_b() { ENCODER.on_channel_b_edge() }
/// ```
pub struct QuadratureDecoder<L> {
    pin_a: L,
    pin_b: L,
    isr_a: EdgeHandler,
    isr_b: EdgeHandler,
    tracker: Mutex<RefCell<DetentTracker>>,
    active: Mutex<Cell<bool>>,
}

impl<L> QuadratureDecoder<L> {
    /// Create a decoder for the given lines and their trampolines
    ///
    /// No hardware is touched until [`activate`](Self::activate).
    #[must_use]
    pub const fn new(pin_a: L, pin_b: L, isr_a: EdgeHandler, isr_b: EdgeHandler) -> Self {
        Self {
            pin_a,
            pin_b,
            isr_a,
            isr_b,
            tracker: Mutex::new(RefCell::new(DetentTracker::new())),
            active: Mutex::new(Cell::new(false)),
        }
    }

    /// Configure both lines as pulled-up inputs and route their edges here
    ///
    /// # Errors
    ///
    /// Returns [`EncoderError::AlreadyActive`] on a second call, or
    /// [`EncoderError::Dispatch`] if the dispatch layer rejects a line.
    pub fn activate<D>(&self, dispatch: &mut D) -> Result<(), EncoderError<D::Error>>
    where
        D: EdgeDispatch<L>,
    {
        if critical_section::with(|cs| self.active.borrow(cs).get()) {
            return Err(EncoderError::AlreadyActive);
        }

        dispatch.configure_pull_up(&self.pin_a)?;
        dispatch.configure_pull_up(&self.pin_b)?;
        dispatch.attach(&self.pin_a, self.isr_a)?;
        dispatch.attach(&self.pin_b, self.isr_b)?;

        critical_section::with(|cs| self.active.borrow(cs).set(true));

        #[cfg(feature = "embedded")]
        defmt::debug!("encoder activated");

        Ok(())
    }

    /// Whether [`activate`](Self::activate) has completed
    #[must_use]
    pub fn is_active(&self) -> bool {
        critical_section::with(|cs| self.active.borrow(cs).get())
    }

    /// Current accumulated position in detents
    #[must_use]
    pub fn read(&self) -> i32 {
        critical_section::with(|cs| self.tracker.borrow_ref(cs).position())
    }

    /// Overwrite the accumulated position
    pub fn write(&self, position: i32) {
        critical_section::with(|cs| self.tracker.borrow_ref_mut(cs).set_position(position));
    }

    /// Current state machine state
    #[must_use]
    pub fn state(&self) -> EncoderState {
        critical_section::with(|cs| self.tracker.borrow_ref(cs).state())
    }
}

impl<L: InputLine> QuadratureDecoder<L> {
    /// Edge handler for line A, called from the line A trampoline
    pub fn on_channel_a_edge(&self) {
        let level = self.pin_a.is_high();
        critical_section::with(|cs| self.tracker.borrow_ref_mut(cs).update_a(level));
    }

    /// Edge handler for line B, called from the line B trampoline
    pub fn on_channel_b_edge(&self) {
        let level = self.pin_b.is_high();
        critical_section::with(|cs| self.tracker.borrow_ref_mut(cs).update_b(level));
    }
}

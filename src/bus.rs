//! The five lines shared between LCD data and button input
//!
//! D4 ~ D7 and RS carry nibbles and register selection while a transaction is running,
//! and are pulled-up inputs read by the buttons the rest of the time.
//! [`DataBus`] is the only place that flips their direction, and it remembers which way they point.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin, PinState},
};

/// Wait after every direction change, before any level is driven or read
pub const BUS_SETTLE_US: u32 = 10;

/// Index of RS inside the line array, the other four are D4 ~ D7 in order
pub(crate) const RS_LINE: usize = 4;

/// Count of lines on the shared bus
pub const LINE_CNT: usize = 5;

/// A GPIO that can switch between push-pull output and pulled-up input at runtime
///
/// `embedded-hal` has no trait for mode switching, so HAL pins need a thin wrapper implementing this.
/// Mode switching is trusted to succeed.
pub trait BusPin: OutputPin + InputPin {
    /// Put the pin in push-pull output mode
    fn set_as_output(&mut self);
    /// Put the pin in input mode with internal pull-up enabled
    fn set_as_pull_up_input(&mut self);
}

/// Current direction of the shared lines
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusMode {
    /// Pins are untouched since construction
    #[default]
    Unconfigured,
    /// Driven by the LCD protocol engine
    Output,
    /// Pulled up and readable by the buttons
    Input,
}

/// Electrical polarity of every line the driver drives
///
/// Selected at build time with the `inverted-bus` feature, for boards that put an inverting buffer
/// between the MCU and the LCD.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// logical 1 is electrical high
    Normal,
    /// logical 1 is electrical low
    Inverted,
}

impl Polarity {
    /// Polarity picked by cargo features
    pub const BUILD: Polarity = if cfg!(feature = "inverted-bus") {
        Polarity::Inverted
    } else {
        Polarity::Normal
    };

    /// Electrical level to put on a pin to present logical `bit`
    pub fn level(self, bit: bool) -> PinState {
        match self {
            Polarity::Normal => PinState::from(bit),
            Polarity::Inverted => PinState::from(!bit),
        }
    }
}

impl Default for Polarity {
    fn default() -> Self {
        Self::BUILD
    }
}

/// Put `level` on `pin`
///
/// There is no readback on this bus, a failed write can only show up on the glass, so the error is dropped.
pub(crate) fn drive_pin(pin: &mut impl OutputPin, level: PinState) {
    pin.set_state(level).ok();
}

/// Bus direction controller, owns D4 ~ D7 and RS
pub struct DataBus<DBPin: BusPin> {
    lines: [DBPin; LINE_CNT],
    mode: BusMode,
}

impl<DBPin: BusPin> DataBus<DBPin> {
    /// Take the lines, nothing is touched until the first claim or release
    pub fn new(db4: DBPin, db5: DBPin, db6: DBPin, db7: DBPin, rs: DBPin) -> Self {
        Self {
            lines: [db4, db5, db6, db7, rs],
            mode: BusMode::Unconfigured,
        }
    }

    /// Current direction
    pub fn mode(&self) -> BusMode {
        self.mode
    }

    /// Switch every line to push-pull output
    pub fn claim_for_output(&mut self, delayer: &mut impl DelayNs) {
        self.lines.iter_mut().for_each(|pin| pin.set_as_output());
        delayer.delay_us(BUS_SETTLE_US);
        self.mode = BusMode::Output;
    }

    /// Switch every line back to pulled-up input
    pub fn release_to_input(&mut self, delayer: &mut impl DelayNs) {
        self.lines.iter_mut().for_each(|pin| pin.set_as_pull_up_input());
        delayer.delay_us(BUS_SETTLE_US);
        self.mode = BusMode::Input;
    }

    /// Present the lower 4 bits of `nibble` on D4 ~ D7
    pub(crate) fn push_nibble(&mut self, nibble: u8, polarity: Polarity) {
        assert!(
            self.mode == BusMode::Output,
            "bus must be claimed before driving it"
        );

        self.lines[..4]
            .iter_mut()
            .enumerate()
            .for_each(|(index, pin)| {
                drive_pin(pin, polarity.level((nibble >> index) & 1 == 1))
            });
    }

    /// Drive RS
    pub(crate) fn set_register_select(&mut self, bit: bool, polarity: Polarity) {
        assert!(
            self.mode == BusMode::Output,
            "bus must be claimed before driving it"
        );

        drive_pin(&mut self.lines[RS_LINE], polarity.level(bit));
    }

    /// Read one line, `true` when it's pulled to ground
    ///
    /// Returns [`None`] when the bus is not in input mode.
    /// A read error counts as not pulled down.
    pub(crate) fn is_line_low(&mut self, index: usize) -> Option<bool> {
        if self.mode != BusMode::Input {
            return None;
        }

        Some(self.lines[index].is_low().unwrap_or(false))
    }

    /// Give back D4, D5, D6, D7, RS in that order
    pub fn release(self) -> [DBPin; LINE_CNT] {
        self.lines
    }
}

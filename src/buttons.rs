//! Debounce and auto-repeat for the five buttons wired onto the LCD bus
//!
//! Every button shorts its line to ground, so a pressed button reads low while the bus is a
//! pulled-up input. Each line runs its own little automaton:
//!
//! * a level change is accepted only after it was seen on more than
//!   [`Buttons::DEBOUNCE_THRESHOLD`] consecutive samples
//! * an accepted press latches one edge
//! * while held, another edge latches [`Buttons::INITIAL_REPEAT_TICKS`] samples after the press,
//!   then every [`Buttons::STEADY_REPEAT_TICKS`] samples
//!
//! Samples are taken at most once per [`Buttons::POLL_INTERVAL_MS`].

use core::fmt;

use crate::bus::{BusMode, BusPin, DataBus, LINE_CNT};

/// Source of a free running millisecond counter, wrapping is fine
pub trait MillisClock {
    /// Milliseconds since some fixed point
    fn millis(&mut self) -> u32;
}

impl<F> MillisClock for F
where
    F: FnMut() -> u32,
{
    fn millis(&mut self) -> u32 {
        self()
    }
}

/// The five buttons, named after the LCD line each one shares
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    #[allow(missing_docs)]
    Db4,
    #[allow(missing_docs)]
    Db5,
    #[allow(missing_docs)]
    Db6,
    #[allow(missing_docs)]
    Db7,
    /// the button sharing the register select line
    Rs,
}

impl Button {
    /// Every button, in line order
    pub const ALL: [Button; LINE_CNT] = [
        Button::Db4,
        Button::Db5,
        Button::Db6,
        Button::Db7,
        Button::Rs,
    ];

    /// Line index on the shared bus
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Raw button number outside `0..5`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidButton(pub u8);

impl fmt::Display for InvalidButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no button {}, valid numbers are 0 to 4", self.0)
    }
}

impl TryFrom<u8> for Button {
    type Error = InvalidButton;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Button::ALL
            .get(value as usize)
            .copied()
            .ok_or(InvalidButton(value))
    }
}

/// Debounced level of one button
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// line pulled to ground
    Pressed,
    /// line held high by the pull-up
    #[default]
    Released,
}

impl Level {
    /// Level of a line, from whether it reads low
    pub fn from_low(is_low: bool) -> Self {
        match is_low {
            true => Level::Pressed,
            false => Level::Released,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct ButtonRecord {
    last: Level,
    run: u8,
    repeat: u8,
    latched: bool,
}

/// Something worth logging happened on one button
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(feature = "defmt"), allow(dead_code))]
enum Transition {
    Accepted(Level),
    Repeat,
}

impl ButtonRecord {
    fn step(&mut self, sample: Level, timing: &RepeatTiming) -> Option<Transition> {
        if sample == self.last {
            self.run = 0;

            if sample == Level::Pressed {
                self.repeat = self.repeat.wrapping_sub(1);
                if self.repeat == 0 {
                    self.repeat = timing.steady;
                    self.latched = true;
                    return Some(Transition::Repeat);
                }
            }

            None
        } else if self.run > timing.debounce_threshold {
            self.run = 0;
            self.repeat = timing.initial;
            self.last = sample;
            if sample == Level::Pressed && !self.latched {
                self.latched = true;
            }
            Some(Transition::Accepted(sample))
        } else {
            self.run += 1;
            None
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct RepeatTiming {
    debounce_threshold: u8,
    initial: u8,
    steady: u8,
}

/// Debounce and repeat engine for all five buttons
#[derive(Debug)]
pub struct Buttons {
    records: [ButtonRecord; LINE_CNT],
    last_poll_ms: u16,
    timing: RepeatTiming,
}

impl Default for Buttons {
    fn default() -> Self {
        Self::new()
    }
}

impl Buttons {
    /// Minimum time between two samples
    pub const POLL_INTERVAL_MS: u16 = 5;
    /// A change must be seen on more samples than this before it's accepted
    pub const DEBOUNCE_THRESHOLD: u8 = 10;
    /// Samples from an accepted press to its first repeat
    pub const INITIAL_REPEAT_TICKS: u8 = 100;
    /// Samples between later repeats
    pub const STEADY_REPEAT_TICKS: u8 = 30;

    /// Every button released, nothing latched
    pub fn new() -> Self {
        Self {
            records: [ButtonRecord::default(); LINE_CNT],
            last_poll_ms: 0,
            timing: RepeatTiming {
                debounce_threshold: Self::DEBOUNCE_THRESHOLD,
                initial: Self::INITIAL_REPEAT_TICKS,
                steady: Self::STEADY_REPEAT_TICKS,
            },
        }
    }

    /// Sample the bus if the poll interval has passed
    ///
    /// Returns whether a sample was taken. Nothing is read while the bus is not in input mode.
    pub fn poll<DBPin: BusPin>(&mut self, bus: &mut DataBus<DBPin>, now_ms: u32) -> bool {
        if bus.mode() != BusMode::Input {
            #[cfg(feature = "defmt")]
            defmt::warn!("button poll skipped, bus is {}", bus.mode());
            return false;
        }

        // only the low 16 bits of the counter are kept, wrapping_sub keeps the gate right across overflow
        let now = now_ms as u16;
        if now.wrapping_sub(self.last_poll_ms) < Self::POLL_INTERVAL_MS {
            return false;
        }
        self.last_poll_ms = now;

        let mut levels = [Level::Released; LINE_CNT];
        levels.iter_mut().enumerate().for_each(|(index, level)| {
            *level = Level::from_low(bus.is_line_low(index).unwrap_or(false));
        });

        self.sample(levels);
        true
    }

    /// Run every automaton once with the given raw levels, in [`Button::ALL`] order
    pub fn sample(&mut self, levels: [Level; LINE_CNT]) {
        let timing = self.timing;

        self.records
            .iter_mut()
            .zip(levels)
            .enumerate()
            .for_each(|(_index, (record, level))| {
                match record.step(level, &timing) {
                    #[cfg(feature = "defmt")]
                    Some(Transition::Accepted(level)) => {
                        defmt::debug!("button {} {}", Button::ALL[_index], level)
                    }
                    #[cfg(feature = "defmt")]
                    Some(Transition::Repeat) => {
                        defmt::trace!("button {} repeat", Button::ALL[_index])
                    }
                    _ => {}
                }
            });
    }

    /// Drain one pending press edge
    pub fn take_pressed_edge(&mut self, button: Button) -> bool {
        let record = &mut self.records[button.index()];
        core::mem::replace(&mut record.latched, false)
    }

    /// Whether an edge is waiting, without draining it
    pub fn has_pressed_edge(&self, button: Button) -> bool {
        self.records[button.index()].latched
    }

    /// Debounced level is pressed
    pub fn is_held(&self, button: Button) -> bool {
        self.level(button) == Level::Pressed
    }

    /// Debounced level
    pub fn level(&self, button: Button) -> Level {
        self.records[button.index()].last
    }

    /// Drop every latched edge
    pub fn clear(&mut self) {
        self.records
            .iter_mut()
            .for_each(|record| record.latched = false);
    }
}

/*!
# LCD 1602 with buttons

Driver for an HD44780 compatible character LCD on a 4-pin bus, where five push buttons share
D4 ~ D7 and RS with the display.

Basic Usage:

1. Wrap every shared GPIO so it implements [`bus::BusPin`] <br/>
    D4 ~ D7 and RS must be able to switch between push-pull output and pulled-up input at runtime.
    EN only needs [`embedded_hal::digital::OutputPin`].
<br/>
<br/>
2. Use [`lcd::Lcd::new()`] to create a [`lcd::Lcd`], then call [`lcd::Lcd::begin()`] once to initialize LCD1602 hardware
<br/>
<br/>
3. Use any methods provide by [`lcd::Lcd`] to control LCD1602, and call [`lcd::Lcd::poll_buttons()`]
    from the main loop to feed the button debouncer

Cargo features:

* `inverted-bus`: every driven line is inverted, for boards with an inverting buffer in front of the LCD
* `defmt`: log phase changes and button events with `defmt`, and derive `defmt::Format` on public types
*/

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod bus;
pub mod buttons;
pub mod command;
pub mod glyphs;
pub mod lcd;
pub mod sender;
pub mod state;
pub mod utils;

pub use bus::{BusMode, BusPin, Polarity};
pub use buttons::{Button, InvalidButton, MillisClock};
pub use command::{Font, MoveDirection, ShiftType, State};
pub use lcd::Lcd;
pub use state::Phase;

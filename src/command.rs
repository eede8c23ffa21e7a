//! Command set of the HD44780 compatible controller, and the enums used to build them

use crate::utils::BitOps;

/// Every instruction this driver sends to the LCD
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandSet {
    /// Clear DDRAM and move the cursor home
    ClearDisplay,
    /// Move the cursor home, undo display shift
    ReturnHome,
    /// How the address counter and the display move after each data write
    EntryModeSet(MoveDirection, ShiftType),
    /// Display, cursor and cursor blink switches
    DisplayOnOff {
        /// whole display
        display: State,
        /// underline cursor
        cursor: State,
        /// blinking block cursor
        cursor_blink: State,
    },
    /// Move the cursor, or the whole display window, one step
    CursorOrDisplayShift(ShiftType, MoveDirection),
    // this is not a command from datasheet,
    // it's a lone upper nibble sent during the power on handshake
    // only lower 4 bits are used
    HalfFunctionSet(u8),
    /// Interface width, line count and font
    FunctionSet(DataWidth, LineMode, Font),
    /// Move address counter into CGRAM
    SetCGRAM(u8),
    /// Move address counter into DDRAM
    SetDDRAM(u8),
    /// Write one byte into the RAM the address counter points to
    WriteDataToRAM(u8),
}

/// Direction of cursor (or display window) movement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveDirection {
    #[allow(missing_docs)]
    RightToLeft,
    #[allow(missing_docs)]
    #[default]
    LeftToRight,
}

/// Whether the display window follows the cursor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftType {
    #[allow(missing_docs)]
    #[default]
    CursorOnly,
    #[allow(missing_docs)]
    CursorAndDisplay,
}

/// A plain on/off switch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    #[allow(missing_docs)]
    Off,
    #[allow(missing_docs)]
    #[default]
    On,
}

/// Interface width
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataWidth {
    #[allow(missing_docs)]
    #[default]
    Bit4,
    #[allow(missing_docs)]
    Bit8,
}

/// Line mode of the controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineMode {
    #[allow(missing_docs)]
    #[default]
    OneLine,
    #[allow(missing_docs)]
    TwoLine,
}

/// Character font
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    #[allow(missing_docs)]
    #[default]
    Font5x8,
    /// Only available in [`LineMode::OneLine`]
    Font5x11,
}

/// Level of the RS line, decides whether the controller takes the byte as an instruction or as RAM data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterSelection {
    /// Instruction register, RS low
    Command,
    /// Data register, RS high
    Data,
}

/// Payload of a [`Command`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bits {
    /// A single nibble, one enable pulse
    Bit4(u8),
    /// A full byte, two enable pulses on a 4-bit bus
    Bit8(u8),
}

/// A [`CommandSet`] encoded into what will go on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    rs: RegisterSelection,
    data: Bits,
}

impl Command {
    pub(crate) fn new(rs: RegisterSelection, data: Bits) -> Self {
        if let Bits::Bit4(raw_bits) = data {
            assert!(raw_bits < 2u8.pow(4), "data is greater than 4 bits");
        }

        Self { rs, data }
    }

    /// Which register this command addresses
    pub fn get_register_selection(&self) -> RegisterSelection {
        self.rs
    }

    /// The raw bits to send
    pub fn get_data(&self) -> Bits {
        self.data
    }
}

impl From<CommandSet> for Command {
    fn from(command: CommandSet) -> Self {
        match command {
            CommandSet::ClearDisplay => {
                let raw_bits: u8 = 0b0000_0001;
                Self::new(RegisterSelection::Command, Bits::Bit8(raw_bits))
            }

            CommandSet::ReturnHome => {
                let raw_bits: u8 = 0b0000_0010;
                Self::new(RegisterSelection::Command, Bits::Bit8(raw_bits))
            }

            CommandSet::EntryModeSet(dir, st) => {
                let mut raw_bits: u8 = 0b0000_0100;

                raw_bits.put_bit(1, dir == MoveDirection::LeftToRight);
                raw_bits.put_bit(0, st == ShiftType::CursorAndDisplay);

                Self::new(RegisterSelection::Command, Bits::Bit8(raw_bits))
            }

            CommandSet::DisplayOnOff {
                display,
                cursor,
                cursor_blink,
            } => {
                let mut raw_bits: u8 = 0b0000_1000;

                raw_bits.put_bit(2, display == State::On);
                raw_bits.put_bit(1, cursor == State::On);
                raw_bits.put_bit(0, cursor_blink == State::On);

                Self::new(RegisterSelection::Command, Bits::Bit8(raw_bits))
            }

            CommandSet::CursorOrDisplayShift(st, dir) => {
                let mut raw_bits: u8 = 0b0001_0000;

                raw_bits.put_bit(3, st == ShiftType::CursorAndDisplay);
                raw_bits.put_bit(2, dir == MoveDirection::LeftToRight);

                Self::new(RegisterSelection::Command, Bits::Bit8(raw_bits))
            }

            CommandSet::HalfFunctionSet(nibble) => {
                Self::new(RegisterSelection::Command, Bits::Bit4(nibble))
            }

            CommandSet::FunctionSet(width, line, font) => {
                let mut raw_bits: u8 = 0b0010_0000;

                raw_bits.put_bit(4, width == DataWidth::Bit8);
                raw_bits.put_bit(3, line == LineMode::TwoLine);
                raw_bits.put_bit(2, font == Font::Font5x11);

                Self::new(RegisterSelection::Command, Bits::Bit8(raw_bits))
            }

            CommandSet::SetCGRAM(addr) => {
                assert!(addr < 2u8.pow(6), "CGRAM address out of range");

                Self::new(RegisterSelection::Command, Bits::Bit8(0b0100_0000 | addr))
            }

            // DDRAM address is 7 bits wide, a column past the row end simply wraps inside the controller
            CommandSet::SetDDRAM(addr) => Self::new(
                RegisterSelection::Command,
                Bits::Bit8(0b1000_0000 | (addr & 0b0111_1111)),
            ),

            CommandSet::WriteDataToRAM(data) => {
                Self::new(RegisterSelection::Data, Bits::Bit8(data))
            }
        }
    }
}

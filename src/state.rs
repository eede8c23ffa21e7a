use crate::command::{CommandSet, DataWidth, Font, LineMode, MoveDirection, ShiftType, State};

/// Lifecycle of the display
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// constructed, `begin()` not called yet
    #[default]
    Uninitialized,
    /// `begin()` is running the power on handshake
    Initializing,
    /// every display operation is available
    Ready,
}

/// Count of entries in the row offset table
pub const ROW_SLOTS: usize = 4;

/// Function set record, what the controller was told about its wiring and glass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) struct FunctionConfig {
    pub(crate) data_width: DataWidth,
    pub(crate) line_mode: LineMode,
    pub(crate) font: Font,
}

impl FunctionConfig {
    pub(crate) fn command(&self) -> CommandSet {
        CommandSet::FunctionSet(self.data_width, self.line_mode, self.font)
    }
}

/// Display on/off control record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DisplayControl {
    pub(crate) display: State,
    pub(crate) cursor: State,
    pub(crate) blink: State,
}

impl Default for DisplayControl {
    fn default() -> Self {
        Self {
            display: State::On,
            cursor: State::Off,
            blink: State::Off,
        }
    }
}

impl DisplayControl {
    pub(crate) fn command(&self) -> CommandSet {
        CommandSet::DisplayOnOff {
            display: self.display,
            cursor: self.cursor,
            cursor_blink: self.blink,
        }
    }
}

/// Entry mode record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) struct EntryMode {
    pub(crate) direction: MoveDirection,
    pub(crate) shift: ShiftType,
}

impl EntryMode {
    pub(crate) fn command(&self) -> CommandSet {
        CommandSet::EntryModeSet(self.direction, self.shift)
    }
}

/// In-memory mirror of the controller
#[derive(Debug, Default)]
pub(crate) struct LcdState {
    phase: Phase,
    pub(crate) function: FunctionConfig,
    pub(crate) display_control: DisplayControl,
    pub(crate) entry_mode: EntryMode,
    row_offsets: [u8; ROW_SLOTS],
    num_lines: u8,
}

impl LcdState {
    pub(crate) fn get_phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Record geometry given to `begin()`
    ///
    /// The controller can't do 5x11 with two lines, it falls back to 5x8 in that case.
    pub(crate) fn configure(&mut self, columns: u8, lines: u8, font: Font) {
        self.function.data_width = DataWidth::Bit4;
        self.function.line_mode = match lines > 1 {
            true => LineMode::TwoLine,
            false => LineMode::OneLine,
        };
        self.function.font = match self.function.line_mode {
            LineMode::OneLine => font,
            LineMode::TwoLine => Font::Font5x8,
        };
        self.num_lines = lines;

        self.set_row_offsets([
            0x00,
            0x40,
            0x00u8.wrapping_add(columns),
            0x40u8.wrapping_add(columns),
        ]);
    }

    pub(crate) fn get_num_lines(&self) -> u8 {
        self.num_lines
    }

    pub(crate) fn get_row_offsets(&self) -> [u8; ROW_SLOTS] {
        self.row_offsets
    }

    pub(crate) fn set_row_offsets(&mut self, offsets: [u8; ROW_SLOTS]) {
        self.row_offsets = offsets;
    }

    /// Clamp `row` into the row table and then into the configured line count
    pub(crate) fn clamp_row(&self, row: u8) -> u8 {
        let mut row = row.min(ROW_SLOTS as u8 - 1);
        if row >= self.num_lines {
            row = self.num_lines.saturating_sub(1);
        }
        row
    }

    /// DDRAM address of a cell, rows past the end land on the last row
    pub(crate) fn ddram_address(&self, col: u8, row: u8) -> u8 {
        col.wrapping_add(self.row_offsets[self.clamp_row(row) as usize])
    }
}

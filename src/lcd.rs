use core::fmt;

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::{
    bus::{BusMode, BusPin, DataBus, Polarity},
    buttons::{Button, Buttons, MillisClock},
    command::{CommandSet, Font, LineMode, MoveDirection, ShiftType, State},
    glyphs::Glyph,
    sender::ParallelSender,
    state::{LcdState, Phase, ROW_SLOTS},
};

mod init;

pub use init::{HANDSHAKE, POWER_ON_WAIT_US};

/// Clear display and return home take way longer than the other instructions
pub const SLOW_COMMAND_WAIT_US: u32 = 2_000;

/// LCD1602 on a 4-pin bus, with five buttons sharing D4 ~ D7 and RS
///
/// Display operations claim the bus as output for the duration of one transaction and
/// always leave it as a pulled-up input, ready for [`Lcd::poll_buttons()`].
pub struct Lcd<DBPin, ENPin, Delayer, Clock>
where
    DBPin: BusPin,
    ENPin: OutputPin,
    Delayer: DelayNs,
    Clock: MillisClock,
{
    sender: ParallelSender<DBPin, ENPin>,
    delayer: Delayer,
    clock: Clock,
    state: LcdState,
    buttons: Buttons,
}

impl<DBPin, ENPin, Delayer, Clock> Lcd<DBPin, ENPin, Delayer, Clock>
where
    DBPin: BusPin,
    ENPin: OutputPin,
    Delayer: DelayNs,
    Clock: MillisClock,
{
    /// Take every pin, nothing is sent until [`Lcd::begin()`]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rs: DBPin,
        en: ENPin,
        db4: DBPin,
        db5: DBPin,
        db6: DBPin,
        db7: DBPin,
        delayer: Delayer,
        clock: Clock,
    ) -> Self {
        let bus = DataBus::new(db4, db5, db6, db7, rs);

        Self {
            sender: ParallelSender::new(bus, en),
            delayer,
            clock,
            state: LcdState::default(),
            buttons: Buttons::new(),
        }
    }

    /// Give back D4, D5, D6, D7, RS, then EN, the delayer and the clock
    pub fn release(self) -> ([DBPin; 5], ENPin, Delayer, Clock) {
        let (bus, en) = self.sender.release();
        (bus.release(), en, self.delayer, self.clock)
    }

    fn assert_begun(&self) {
        assert!(
            self.state.get_phase() != Phase::Uninitialized,
            "LCD is not initialized, call .begin() first"
        );
    }

    fn send(&mut self, command: CommandSet) {
        self.assert_begun();
        self.sender.transmit(command, &mut self.delayer);
    }

    fn send_slow(&mut self, command: CommandSet) {
        self.send(command);
        self.delayer.delay_us(SLOW_COMMAND_WAIT_US);
    }
}

#[allow(missing_docs)]
impl<DBPin, ENPin, Delayer, Clock> Lcd<DBPin, ENPin, Delayer, Clock>
where
    DBPin: BusPin,
    ENPin: OutputPin,
    Delayer: DelayNs,
    Clock: MillisClock,
{
    pub fn get_phase(&self) -> Phase {
        self.state.get_phase()
    }

    pub fn get_bus_mode(&self) -> BusMode {
        self.sender.bus_mode()
    }

    pub fn get_polarity(&self) -> Polarity {
        self.sender.polarity()
    }

    /// Clear the display and move cursor to (0, 0)
    pub fn clear(&mut self) {
        self.send_slow(CommandSet::ClearDisplay);
    }

    /// Move cursor to (0, 0) and undo any display shift
    pub fn home(&mut self) {
        self.send_slow(CommandSet::ReturnHome);
    }

    /// Replace the row start table, in DDRAM addresses
    pub fn set_row_offsets(&mut self, row0: u8, row1: u8, row2: u8, row3: u8) {
        self.state.set_row_offsets([row0, row1, row2, row3]);
    }

    pub fn get_row_offsets(&self) -> [u8; ROW_SLOTS] {
        self.state.get_row_offsets()
    }

    /// Lines given to [`Lcd::begin()`]
    pub fn get_num_lines(&self) -> u8 {
        self.state.get_num_lines()
    }

    /// Move the cursor
    ///
    /// A `row` past the last line is clamped to the last line.
    pub fn set_cursor(&mut self, col: u8, row: u8) {
        let addr = self.state.ddram_address(col, row);
        self.send(CommandSet::SetDDRAM(addr));
    }

    pub fn set_display_state(&mut self, display: State) {
        self.state.display_control.display = display;
        self.send(self.state.display_control.command());
    }

    pub fn get_display_state(&self) -> State {
        self.state.display_control.display
    }

    pub fn set_cursor_state(&mut self, cursor: State) {
        self.state.display_control.cursor = cursor;
        self.send(self.state.display_control.command());
    }

    pub fn get_cursor_state(&self) -> State {
        self.state.display_control.cursor
    }

    pub fn set_cursor_blink_state(&mut self, blink: State) {
        self.state.display_control.blink = blink;
        self.send(self.state.display_control.command());
    }

    pub fn get_cursor_blink_state(&self) -> State {
        self.state.display_control.blink
    }

    pub fn set_direction(&mut self, dir: MoveDirection) {
        self.state.entry_mode.direction = dir;
        self.send(self.state.entry_mode.command());
    }

    pub fn get_direction(&self) -> MoveDirection {
        self.state.entry_mode.direction
    }

    pub fn set_shift_type(&mut self, shift: ShiftType) {
        self.state.entry_mode.shift = shift;
        self.send(self.state.entry_mode.command());
    }

    pub fn get_shift_type(&self) -> ShiftType {
        self.state.entry_mode.shift
    }

    pub fn get_line_mode(&self) -> LineMode {
        self.state.function.line_mode
    }

    pub fn get_font(&self) -> Font {
        self.state.function.font
    }

    /// Shift the whole display window one step, DDRAM is untouched
    pub fn shift_display(&mut self, dir: MoveDirection) {
        self.send(CommandSet::CursorOrDisplayShift(
            ShiftType::CursorAndDisplay,
            dir,
        ));
    }

    /// Upload a 5x8 glyph into one of the 8 CGRAM slots, `slot` is taken modulo 8
    ///
    /// The address counter is left in CGRAM, call [`Lcd::set_cursor()`] before writing text again.
    pub fn create_char(&mut self, slot: u8, glyph: &Glyph) {
        let slot = slot & 0b111;

        self.send(CommandSet::SetCGRAM(slot << 3));
        glyph
            .iter()
            .for_each(|&line| self.send(CommandSet::WriteDataToRAM(line)));
    }

    /// Write one byte at the cursor, a character code or a CGRAM slot `0..8`
    pub fn write(&mut self, byte: u8) {
        self.send(CommandSet::WriteDataToRAM(byte));
    }

    /// Write every byte of `str` at the cursor
    pub fn write_str_to_cur(&mut self, str: &str) {
        str.bytes().for_each(|byte| self.write(byte));
    }
}

/// One-line wrappers around the state setters
#[allow(missing_docs)]
impl<DBPin, ENPin, Delayer, Clock> Lcd<DBPin, ENPin, Delayer, Clock>
where
    DBPin: BusPin,
    ENPin: OutputPin,
    Delayer: DelayNs,
    Clock: MillisClock,
{
    pub fn display(&mut self) {
        self.set_display_state(State::On);
    }

    pub fn no_display(&mut self) {
        self.set_display_state(State::Off);
    }

    pub fn cursor(&mut self) {
        self.set_cursor_state(State::On);
    }

    pub fn no_cursor(&mut self) {
        self.set_cursor_state(State::Off);
    }

    pub fn blink(&mut self) {
        self.set_cursor_blink_state(State::On);
    }

    pub fn no_blink(&mut self) {
        self.set_cursor_blink_state(State::Off);
    }

    pub fn left_to_right(&mut self) {
        self.set_direction(MoveDirection::LeftToRight);
    }

    pub fn right_to_left(&mut self) {
        self.set_direction(MoveDirection::RightToLeft);
    }

    /// Text written at the cursor pushes the display window along
    pub fn autoscroll(&mut self) {
        self.set_shift_type(ShiftType::CursorAndDisplay);
    }

    pub fn no_autoscroll(&mut self) {
        self.set_shift_type(ShiftType::CursorOnly);
    }

    pub fn scroll_display_left(&mut self) {
        self.shift_display(MoveDirection::RightToLeft);
    }

    pub fn scroll_display_right(&mut self) {
        self.shift_display(MoveDirection::LeftToRight);
    }
}

/// Buttons
impl<DBPin, ENPin, Delayer, Clock> Lcd<DBPin, ENPin, Delayer, Clock>
where
    DBPin: BusPin,
    ENPin: OutputPin,
    Delayer: DelayNs,
    Clock: MillisClock,
{
    /// Sample the buttons, at most once per [`Buttons::POLL_INTERVAL_MS`]
    ///
    /// Call it from the main loop, between display updates. Returns whether a sample was taken.
    pub fn poll_buttons(&mut self) -> bool {
        let now = self.clock.millis();
        self.buttons.poll(self.sender.bus_mut(), now)
    }

    /// Drain one pending press of `button`, an initial press or an auto-repeat
    pub fn take_pressed_edge(&mut self, button: Button) -> bool {
        self.buttons.take_pressed_edge(button)
    }

    /// Block until `button` is held
    ///
    /// Returns `true` at once when a press was already latched, consuming it. Otherwise polls
    /// until the debounced level is pressed and returns `false`, the fresh press stays latched.
    /// There's no timeout.
    pub fn wait_pressed_edge(&mut self, button: Button) -> bool {
        if self.buttons.take_pressed_edge(button) {
            return true;
        }

        assert!(
            self.get_bus_mode() == BusMode::Input,
            "buttons can only be read after .begin()"
        );

        while !self.buttons.is_held(button) {
            self.poll_buttons();
        }

        false
    }

    /// Debounced level of `button` is pressed
    pub fn is_held(&self, button: Button) -> bool {
        self.buttons.is_held(button)
    }

    /// Instant, unfiltered reading of `button`, for diagnostics
    pub fn raw_level(&mut self, button: Button) -> bool {
        match self.sender.bus_mut().is_line_low(button.index()) {
            Some(is_low) => is_low,
            None => panic!("buttons can only be read after .begin()"),
        }
    }

    /// Drop every pending press
    pub fn clear_buttons(&mut self) {
        self.buttons.clear();
    }
}

impl<DBPin, ENPin, Delayer, Clock> fmt::Write for Lcd<DBPin, ENPin, Delayer, Clock>
where
    DBPin: BusPin,
    ENPin: OutputPin,
    Delayer: DelayNs,
    Clock: MillisClock,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_str_to_cur(s);
        Ok(())
    }
}

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::{
    bus::BusPin,
    buttons::MillisClock,
    command::{CommandSet, Font},
    glyphs::DEFAULT_GLYPHS,
    lcd::Lcd,
    state::Phase,
};

/// LCD needs 40 ms after Vcc rises above 2.7 V, an MCU can start well before Vcc reaches 4.5 V
pub const POWER_ON_WAIT_US: u32 = 50_000;

/// Power on handshake of 4-pin mode: lone nibbles and the wait after each one
///
/// Three `0x3` put the controller in 8-bit mode whatever state it was left in, `0x2` then switches to 4-bit mode.
pub const HANDSHAKE: [(u8, u32); 4] = [(0x3, 4_500), (0x3, 4_500), (0x3, 150), (0x2, 0)];

impl<DBPin, ENPin, Delayer, Clock> Lcd<DBPin, ENPin, Delayer, Clock>
where
    DBPin: BusPin,
    ENPin: OutputPin,
    Delayer: DelayNs,
    Clock: MillisClock,
{
    /// Initialize LCD hardware, must be called once before anything else
    ///
    /// `lines > 1` selects two line mode. Row offsets are reset to `0x00, 0x40, columns, 0x40 + columns`.
    /// `font` is [`Font::Font5x8`] on two line displays whatever is asked.
    /// Eight bar graph glyphs from [`DEFAULT_GLYPHS`] are loaded into CGRAM.
    pub fn begin(&mut self, columns: u8, lines: u8, font: Font) {
        assert!(
            self.state.get_phase() == Phase::Uninitialized,
            ".begin() should only be called once"
        );

        self.state.configure(columns, lines, font);
        self.enter_phase(Phase::Initializing);

        // in initialization process, we'd better use "raw command", to strictly follow datasheet
        let function_set = self.state.function.command();
        self.sender
            .transaction(&mut self.delayer, |sender, delayer| {
                delayer.delay_us(POWER_ON_WAIT_US);
                sender.idle_control_lines();

                HANDSHAKE.iter().for_each(|&(nibble, wait_us)| {
                    sender.send(CommandSet::HalfFunctionSet(nibble), delayer);
                    delayer.delay_us(wait_us);
                });

                sender.send(function_set, delayer);
            });

        DEFAULT_GLYPHS
            .iter()
            .zip(0u8..)
            .for_each(|(glyph, slot)| self.create_char(slot, glyph));

        self.send(self.state.display_control.command());
        self.clear();
        self.send(self.state.entry_mode.command());

        self.enter_phase(Phase::Ready);
    }

    fn enter_phase(&mut self, phase: Phase) {
        #[cfg(feature = "defmt")]
        defmt::debug!("LCD {} -> {}", self.state.get_phase(), phase);

        self.state.set_phase(phase);
    }
}

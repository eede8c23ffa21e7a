//! 4-pin parallel sender
//!
//! Frames a [`Command`] onto the shared bus: RS first, then the high nibble and the low nibble,
//! each latched by one enable pulse.

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::{
    bus::{drive_pin, BusMode, BusPin, DataBus, Polarity},
    command::{Bits, Command, RegisterSelection},
    utils::split_nibbles,
};

/// Hold time of each half of the enable pulse, must be longer than 450 ns
pub const ENABLE_PULSE_US: u32 = 1;

/// Wait after the falling edge of enable, most instructions finish in 37 us
pub const COMMAND_SETTLE_US: u32 = 100;

/// Sender that owns the shared bus and the enable strobe
pub struct ParallelSender<DBPin, ENPin>
where
    DBPin: BusPin,
    ENPin: OutputPin,
{
    bus: DataBus<DBPin>,
    en_pin: ENPin,
    polarity: Polarity,
}

impl<DBPin, ENPin> ParallelSender<DBPin, ENPin>
where
    DBPin: BusPin,
    ENPin: OutputPin,
{
    /// Combine bus and enable pin, polarity comes from the `inverted-bus` feature
    pub fn new(bus: DataBus<DBPin>, en: ENPin) -> Self {
        Self::with_polarity(bus, en, Polarity::BUILD)
    }

    pub(crate) fn with_polarity(bus: DataBus<DBPin>, en: ENPin, polarity: Polarity) -> Self {
        Self {
            bus,
            en_pin: en,
            polarity,
        }
    }

    /// Polarity every line is driven with
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Direction of the shared lines
    pub fn bus_mode(&self) -> BusMode {
        self.bus.mode()
    }

    pub(crate) fn bus_mut(&mut self) -> &mut DataBus<DBPin> {
        &mut self.bus
    }

    /// Drive RS and EN to their idle level
    pub(crate) fn idle_control_lines(&mut self) {
        self.bus.set_register_select(false, self.polarity);
        drive_pin(&mut self.en_pin, self.polarity.level(false));
    }

    /// Send a command on a bus that is already claimed
    pub fn send(&mut self, command: impl Into<Command>, delayer: &mut impl DelayNs) {
        let command = command.into();

        self.bus.set_register_select(
            command.get_register_selection() == RegisterSelection::Data,
            self.polarity,
        );

        match command.get_data() {
            Bits::Bit4(raw_bits) => self.write_nibble(raw_bits, delayer),
            Bits::Bit8(raw_bits) => split_nibbles(raw_bits)
                .into_iter()
                .for_each(|nibble| self.write_nibble(nibble, delayer)),
        }
    }

    /// Claim the bus, send, and release the bus back to input mode
    pub fn transmit<D: DelayNs>(&mut self, command: impl Into<Command>, delayer: &mut D) {
        let command = command.into();
        self.transaction(delayer, |sender, delayer| sender.send(command, delayer));
    }

    /// Scoped bus claim, everything `f` sends goes out while the lines are outputs
    pub fn transaction<D: DelayNs, R>(
        &mut self,
        delayer: &mut D,
        f: impl FnOnce(&mut Self, &mut D) -> R,
    ) -> R {
        self.bus.claim_for_output(delayer);
        let result = f(self, delayer);
        self.bus.release_to_input(delayer);
        result
    }

    fn write_nibble(&mut self, nibble: u8, delayer: &mut impl DelayNs) {
        self.bus.push_nibble(nibble, self.polarity);
        self.pulse_enable(delayer);
    }

    fn pulse_enable(&mut self, delayer: &mut impl DelayNs) {
        let idle = self.polarity.level(false);
        let active = self.polarity.level(true);

        drive_pin(&mut self.en_pin, idle);
        delayer.delay_us(ENABLE_PULSE_US);
        drive_pin(&mut self.en_pin, active);
        delayer.delay_us(ENABLE_PULSE_US);
        drive_pin(&mut self.en_pin, idle);
        delayer.delay_us(COMMAND_SETTLE_US);
    }

    /// Give back the shared lines and the enable pin
    pub fn release(self) -> (DataBus<DBPin>, ENPin) {
        (self.bus, self.en_pin)
    }
}

//! Drive LCD1602 with a STM32F411RET6 in 4 Pin Mode, and read 5 buttons from the same pins
//!
//! A value between 0 and 80 is shown as a number and as a bar graph made of the default glyphs.
//! D4 / D5 step it down / up (hold to repeat), D7 toggles the cursor, RS resets it.

//! Wiring diagram
//!
//! LCD1602 <-> STM32F411RET6
//!     Vss <-> GND
//!     Vdd <-> 5V (It is best to use an external source for the 5V pin, such as the 5V output from a DAPLink device or USB.)
//!      V0 <-> potentiometer <-> 5V & GND (to adjust the display contrast)
//!      RS <-> PA0 <-> button <-> GND
//!      RW <-> GND
//!      EN <-> PA2 (and optionally connect to a 4.7 kOhm Pulldown resistor, to stable voltage level when STM32 reset)
//!      D4 <-> PA3 <-> button <-> GND
//!      D5 <-> PA4 <-> button <-> GND
//!      D6 <-> PA5 <-> button <-> GND
//!      D7 <-> PA6 <-> button <-> GND
//!       A <-> 5V
//!       K <-> GND
//!
//! Put a ~1 kOhm resistor in series with each button, so a press while the MCU drives the line is harmless.

#![no_std]
#![no_main]

use core::{convert::Infallible, fmt::Write};

use panic_rtt_target as _;
use rtt_target::{rprintln, rtt_init_print};
use stm32f4xx_hal::{
    gpio::{ErasedPin, OpenDrain, Output},
    pac,
    prelude::*,
};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use lcd1602_buttons::{BusPin, Button, Font, Lcd};

/// A shared line, open drain with internal pull-up
///
/// Driving it high releases the line, so the same pin reads the button whenever the bus is idle.
struct SharedLine(ErasedPin<Output<OpenDrain>>);

impl ErrorType for SharedLine {
    type Error = Infallible;
}

impl OutputPin for SharedLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high();
        Ok(())
    }
}

impl InputPin for SharedLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_low())
    }
}

impl BusPin for SharedLine {
    // open drain is always an output
    fn set_as_output(&mut self) {}

    fn set_as_pull_up_input(&mut self) {
        self.0.set_high();
    }
}

const MAX_VALUE: u8 = 80;

#[cortex_m_rt::entry]
fn main() -> ! {
    rtt_init_print!();

    let dp = pac::Peripherals::take().expect("Cannot take device peripherals");
    let cp = pac::CorePeripherals::take().expect("Cannot take core peripherals");

    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.use_hse(12.MHz()).freeze();

    let delayer = cp.SYST.delay(&clocks);

    // a free running millisecond counter, 32-bit TIM2 wraps after ~49 days
    let mut counter = dp.TIM2.counter_ms(&clocks);
    counter
        .start(u32::MAX.millis())
        .expect("Cannot start millisecond counter");
    let clock = move || counter.now().ticks();

    // init needed digital pins

    let gpioa = dp.GPIOA.split();

    let rs_pin = SharedLine(gpioa.pa0.into_open_drain_output().internal_pull_up(true).erase());
    let en_pin = gpioa.pa2.into_push_pull_output().erase();

    let db4_pin = SharedLine(gpioa.pa3.into_open_drain_output().internal_pull_up(true).erase());
    let db5_pin = SharedLine(gpioa.pa4.into_open_drain_output().internal_pull_up(true).erase());
    let db6_pin = SharedLine(gpioa.pa5.into_open_drain_output().internal_pull_up(true).erase());
    let db7_pin = SharedLine(gpioa.pa6.into_open_drain_output().internal_pull_up(true).erase());

    let mut lcd = Lcd::new(
        rs_pin, en_pin, db4_pin, db5_pin, db6_pin, db7_pin, delayer, clock,
    );

    // init LCD1602
    lcd.begin(16, 2, Font::Font5x8);

    let mut value: u8 = MAX_VALUE / 2;
    let mut cursor_on = false;
    let mut dirty = true;

    loop {
        lcd.poll_buttons();

        if lcd.take_pressed_edge(Button::Db4) {
            value = value.saturating_sub(1);
            dirty = true;
        }

        if lcd.take_pressed_edge(Button::Db5) {
            value = (value + 1).min(MAX_VALUE);
            dirty = true;
        }

        if lcd.take_pressed_edge(Button::Db7) {
            cursor_on = !cursor_on;
            match cursor_on {
                true => lcd.cursor(),
                false => lcd.no_cursor(),
            }
        }

        if lcd.take_pressed_edge(Button::Rs) {
            rprintln!("reset");
            value = MAX_VALUE / 2;
            dirty = true;
        }

        if dirty {
            dirty = false;
            rprintln!("value {}", value);
            draw(&mut lcd, value);
        }
    }
}

/// Number on the first line, bar on the second, 5 pixel columns per cell
fn draw<DBPin, ENPin, Delayer, Clock>(lcd: &mut Lcd<DBPin, ENPin, Delayer, Clock>, value: u8)
where
    DBPin: BusPin,
    ENPin: OutputPin,
    Delayer: embedded_hal::delay::DelayNs,
    Clock: lcd1602_buttons::MillisClock,
{
    lcd.set_cursor(0, 0);
    // fmt::Write on Lcd never fails
    let _ = write!(lcd, "value: {:>3}/{}", value, MAX_VALUE);

    lcd.set_cursor(0, 1);
    (0..16u8).for_each(|cell| {
        let lit = value.saturating_sub(cell * 5).min(5);
        match lit {
            0 => lcd.write(b' '),
            // 0xFF is a full block in the character ROM
            5 => lcd.write(0xFF),
            // CGRAM slots 0 ~ 3 hold bars 1 ~ 4 pixels wide
            partial => lcd.write(partial - 1),
        }
    });
}

//! Simulated board: five shared lines, an enable strobe and an HD44780 listening on them
//!
//! Every pin, the delayer and the clock share one [`Board`], which logs everything that happens
//! and decodes the nibbles latched on each falling edge of enable.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    convert::Infallible,
    rc::Rc,
};

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType, InputPin, OutputPin},
};
use lcd1602_buttons::{BusPin, Button, Font, Lcd, MillisClock, Polarity};

pub const EN_LINE: usize = 5;

/// Shortest wait after a direction change before a line may be driven
pub const SETTLE_US: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Output,
    Input,
}

/// One decoded transfer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Command(u8),
    Data(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Mode(usize, Mode),
    DelayUs(u32),
    /// falling edge of enable, the controller latches a nibble
    Strobe,
    Op(Op),
}

/// Bare bones HD44780: interface width, address counter, DDRAM and CGRAM
pub struct Controller {
    four_bit: bool,
    pending: Option<(bool, u8)>,
    in_cgram: bool,
    address: u8,
    pub ddram: [u8; 128],
    pub cgram: [u8; 64],
}

impl Default for Controller {
    fn default() -> Self {
        Self {
            four_bit: false,
            pending: None,
            in_cgram: false,
            address: 0,
            ddram: [b' '; 128],
            cgram: [0; 64],
        }
    }
}

impl Controller {
    fn latch(&mut self, rs: bool, nibble: u8) -> Option<Op> {
        if !self.four_bit {
            // 8-bit interface, D0 ~ D3 are not wired and read as 0
            return Some(self.execute(rs, nibble << 4));
        }

        match self.pending.take() {
            None => {
                self.pending = Some((rs, nibble));
                None
            }
            Some((first_rs, high)) => {
                assert_eq!(first_rs, rs, "RS changed in the middle of a byte");
                Some(self.execute(rs, (high << 4) | nibble))
            }
        }
    }

    fn execute(&mut self, rs: bool, byte: u8) -> Op {
        if rs {
            match self.in_cgram {
                true => self.cgram[(self.address & 0x3F) as usize] = byte,
                false => self.ddram[(self.address & 0x7F) as usize] = byte,
            }
            self.address = self.address.wrapping_add(1);
            return Op::Data(byte);
        }

        if byte & 0x80 != 0 {
            self.in_cgram = false;
            self.address = byte & 0x7F;
        } else if byte & 0x40 != 0 {
            self.in_cgram = true;
            self.address = byte & 0x3F;
        } else if byte & 0xF0 == 0x20 || byte & 0xF0 == 0x30 {
            self.four_bit = byte & 0x10 == 0;
        } else if byte == 0x01 {
            self.ddram = [b' '; 128];
            self.in_cgram = false;
            self.address = 0;
        } else if byte & 0xFE == 0x02 {
            self.in_cgram = false;
            self.address = 0;
        }

        Op::Command(byte)
    }

    /// Text on `row` of a 16 column display with the usual row layout
    pub fn row_text(&self, row: usize) -> String {
        let start = [0x00, 0x40][row];
        self.ddram[start..start + 16]
            .iter()
            .map(|&byte| byte as char)
            .collect()
    }
}

pub struct Board {
    pub events: Vec<Event>,
    pub modes: [Option<Mode>; 5],
    /// electrical level last driven on D4 ~ D7, RS, EN
    pub driven: [bool; 6],
    /// buttons currently held down, in line order
    pub held: [bool; 5],
    pub controller: Controller,
    /// a line was driven while not in output mode, or before the direction change settled
    pub stray_writes: usize,
    settled: bool,
    pub now_ms: Rc<Cell<u32>>,
}

impl Board {
    fn logical(&self, line: usize) -> bool {
        match Polarity::BUILD {
            Polarity::Normal => self.driven[line],
            Polarity::Inverted => !self.driven[line],
        }
    }

    fn drive(&mut self, line: usize, level: bool) {
        if line < EN_LINE && (self.modes[line] != Some(Mode::Output) || !self.settled) {
            self.stray_writes += 1;
        }

        let was_active = self.logical(line);
        self.driven[line] = level;

        if line == EN_LINE && was_active && !self.logical(EN_LINE) {
            let nibble = (0..4).fold(0u8, |acc, bit| acc | ((self.logical(bit) as u8) << bit));
            let rs = self.logical(4);
            self.events.push(Event::Strobe);
            if let Some(op) = self.controller.latch(rs, nibble) {
                self.events.push(Event::Op(op));
            }
        }
    }

    /// Decoded transfers, in order
    pub fn ops(&self) -> Vec<Op> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Op(op) => Some(*op),
                _ => None,
            })
            .collect()
    }

    /// Transfers and the long waits between them, enable pulse and bus settle times left out
    pub fn timeline(&self) -> Vec<Event> {
        self.events
            .iter()
            .copied()
            .filter(|event| match event {
                Event::DelayUs(us) => *us >= 150,
                Event::Op(_) => true,
                Event::Mode(..) | Event::Strobe => false,
            })
            .collect()
    }

    pub fn all_lines(&self, mode: Mode) -> bool {
        self.modes.iter().all(|line| *line == Some(mode))
    }

    pub fn press(&mut self, button: Button) {
        self.held[button.index()] = true;
    }

    pub fn release(&mut self, button: Button) {
        self.held[button.index()] = false;
    }
}

pub type Shared = Rc<RefCell<Board>>;

pub struct SimPin {
    line: usize,
    board: Shared,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.board.borrow_mut().drive(self.line, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.board.borrow_mut().drive(self.line, true);
        Ok(())
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        let board = self.board.borrow();
        Ok(match board.modes[self.line] {
            Some(Mode::Input) => board.held[self.line],
            _ => !board.driven[self.line],
        })
    }
}

impl BusPin for SimPin {
    fn set_as_output(&mut self) {
        let mut board = self.board.borrow_mut();
        board.modes[self.line] = Some(Mode::Output);
        board.settled = false;
        board.events.push(Event::Mode(self.line, Mode::Output));
    }

    fn set_as_pull_up_input(&mut self) {
        let mut board = self.board.borrow_mut();
        board.modes[self.line] = Some(Mode::Input);
        board.settled = false;
        board.events.push(Event::Mode(self.line, Mode::Input));
    }
}

pub struct SimDelay {
    board: Shared,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        let mut board = self.board.borrow_mut();
        board.settled |= us >= SETTLE_US;
        board.events.push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay_us(ms * 1_000);
    }
}

/// Reads the shared counter, then moves it on by `step`
pub struct SimClock {
    now_ms: Rc<Cell<u32>>,
    step: u32,
}

impl MillisClock for SimClock {
    fn millis(&mut self) -> u32 {
        let now = self.now_ms.get();
        self.now_ms.set(now.wrapping_add(self.step));
        now
    }
}

pub type SimLcd = Lcd<SimPin, SimPin, SimDelay, SimClock>;

/// Fresh board, the clock starts at `start_ms` and moves `step_ms` per reading
pub fn board_with_clock(start_ms: u32, step_ms: u32) -> (SimLcd, Shared) {
    let now_ms = Rc::new(Cell::new(start_ms));
    let board = Rc::new(RefCell::new(Board {
        events: Vec::new(),
        modes: [None; 5],
        driven: [Polarity::BUILD == Polarity::Inverted; 6],
        held: [false; 5],
        controller: Controller::default(),
        stray_writes: 0,
        settled: false,
        now_ms: now_ms.clone(),
    }));

    let pin = |line| SimPin {
        line,
        board: board.clone(),
    };

    let lcd = Lcd::new(
        pin(4),
        pin(EN_LINE),
        pin(0),
        pin(1),
        pin(2),
        pin(3),
        SimDelay {
            board: board.clone(),
        },
        SimClock {
            now_ms,
            step: step_ms,
        },
    );

    (lcd, board)
}

/// Board whose clock moves a full poll interval on every reading
pub fn board() -> (SimLcd, Shared) {
    board_with_clock(5, 5)
}

/// 16x2 display after `begin()`, with the log emptied
pub fn begun() -> (SimLcd, Shared) {
    let (mut lcd, board) = board();
    lcd.begin(16, 2, Font::Font5x8);
    board.borrow_mut().events.clear();
    (lcd, board)
}

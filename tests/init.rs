mod common;

use common::{Event, Mode, Op};
use lcd1602_buttons::{glyphs::DEFAULT_GLYPHS, BusMode, Font, Phase};

#[test]
fn handshake_then_function_set() {
    let (mut lcd, board) = common::board();
    lcd.begin(16, 2, Font::Font5x8);

    let timeline = board.borrow().timeline();
    assert_eq!(
        timeline[..9],
        [
            Event::DelayUs(50_000),
            Event::Op(Op::Command(0x30)),
            Event::DelayUs(4_500),
            Event::Op(Op::Command(0x30)),
            Event::DelayUs(4_500),
            Event::Op(Op::Command(0x30)),
            Event::DelayUs(150),
            Event::Op(Op::Command(0x20)),
            Event::Op(Op::Command(0x28)),
        ]
    );
}

#[test]
fn begin_ends_with_display_on_clear_and_entry_mode() {
    let (mut lcd, board) = common::board();
    lcd.begin(16, 2, Font::Font5x8);

    let ops = board.borrow().ops();
    assert_eq!(
        ops[ops.len() - 3..],
        [Op::Command(0x0C), Op::Command(0x01), Op::Command(0x06)]
    );
}

#[test]
fn begin_loads_default_glyphs() {
    let (mut lcd, board) = common::board();
    lcd.begin(16, 2, Font::Font5x8);

    let board = board.borrow();
    DEFAULT_GLYPHS.iter().enumerate().for_each(|(slot, glyph)| {
        assert_eq!(&board.controller.cgram[slot * 8..slot * 8 + 8], glyph);
    });
}

#[test]
fn phase_and_bus_after_begin() {
    let (mut lcd, board) = common::board();
    assert_eq!(lcd.get_phase(), Phase::Uninitialized);
    assert_eq!(lcd.get_bus_mode(), BusMode::Unconfigured);

    lcd.begin(16, 2, Font::Font5x8);

    assert_eq!(lcd.get_phase(), Phase::Ready);
    assert_eq!(lcd.get_bus_mode(), BusMode::Input);
    let board = board.borrow();
    assert!(board.all_lines(Mode::Input));
    assert_eq!(board.stray_writes, 0);
}

#[test]
fn one_line_display_may_use_tall_font() {
    let (mut lcd, board) = common::board();
    lcd.begin(16, 1, Font::Font5x11);

    assert_eq!(board.borrow().ops()[4], Op::Command(0x24));
    assert_eq!(lcd.get_font(), Font::Font5x11);
}

#[test]
fn two_line_display_ignores_tall_font() {
    let (mut lcd, board) = common::board();
    lcd.begin(16, 2, Font::Font5x11);

    assert_eq!(board.borrow().ops()[4], Op::Command(0x28));
    assert_eq!(lcd.get_font(), Font::Font5x8);
}

#[test]
fn row_offsets_follow_columns() {
    let (mut lcd, _board) = common::board();
    lcd.begin(20, 4, Font::Font5x8);

    assert_eq!(lcd.get_row_offsets(), [0x00, 0x40, 0x14, 0x54]);
    assert_eq!(lcd.get_num_lines(), 4);
}

#[test]
#[should_panic(expected = "call .begin() first")]
fn display_before_begin_panics() {
    let (mut lcd, _board) = common::board();
    lcd.clear();
}

#[test]
#[should_panic(expected = "only be called once")]
fn second_begin_panics() {
    let (mut lcd, _board) = common::begun();
    lcd.begin(16, 2, Font::Font5x8);
}

#[test]
fn release_gives_pins_back() {
    let (lcd, _board) = common::begun();
    let (lines, _en, _delay, _clock) = lcd.release();
    assert_eq!(lines.len(), 5);
}

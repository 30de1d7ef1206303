// CPU conformance scenarios run through the whole machine

mod common;

use common::{emulator_with_program, ines_image, prg_with_program, set_reset_vector};
use nes_core::{Emulator, EmulatorConfig};

#[test]
fn reset_vector_boots_to_target() {
    // Program at $8005, reset vector pointing at it
    let mut prg = vec![0xEA; 16 * 1024];
    prg[0x0005] = 0x4C; // JMP $8005 (spin in place)
    prg[0x0006] = 0x05;
    prg[0x0007] = 0x80;
    set_reset_vector(&mut prg, 0x8005);

    let rom = ines_image(&prg, 0, 0, 0);
    let mut emulator = Emulator::with_config(EmulatorConfig::default());
    emulator.load_rom_bytes(&rom).unwrap();

    assert_eq!(emulator.cpu().pc, 0x8005);
    assert_eq!(emulator.cpu().sp, 0xFD);
    assert!(
        emulator.cpu().get_flag(nes_core::cpu::flags::INTERRUPT_DISABLE),
        "I must be set after reset"
    );
}

#[test]
fn branch_page_cross_costs_four_cycles() {
    // Place BEQ +2 at $80FE with Z set; it lands at $8102
    let mut prg = vec![0xEA; 16 * 1024];
    // LDA #$00 at $8000 sets Z, then JMP $80FE
    prg[0x0000] = 0xA9;
    prg[0x0001] = 0x00;
    prg[0x0002] = 0x4C;
    prg[0x0003] = 0xFE;
    prg[0x0004] = 0x80;
    prg[0x00FE] = 0xF0; // BEQ +2
    prg[0x00FF] = 0x02;
    set_reset_vector(&mut prg, 0x8000);

    let rom = ines_image(&prg, 0, 0, 0);
    let mut emulator = Emulator::with_config(EmulatorConfig::default());
    emulator.load_rom_bytes(&rom).unwrap();

    emulator.step_instruction(); // LDA #$00
    emulator.step_instruction(); // JMP $80FE
    assert_eq!(emulator.cpu().pc, 0x80FE);

    let cycles = emulator.step_instruction(); // BEQ +2, taken, page cross
    assert_eq!(cycles, 4, "2 base + 1 taken + 1 page cross");
    assert_eq!(emulator.cpu().pc, 0x8102);
}

#[test]
fn indirect_jmp_page_wrap_bug() {
    // JMP ($10FF) with $10FF=$34, $1000=$12, $1100=$56
    let mut emulator = emulator_with_program(&[
        0xA9, 0x34, 0x8D, 0xFF, 0x10, // $10FF = $34
        0xA9, 0x12, 0x8D, 0x00, 0x10, // $1000 = $12
        0xA9, 0x56, 0x8D, 0x00, 0x11, // $1100 = $56
        0x6C, 0xFF, 0x10, // JMP ($10FF)
    ]);

    for _ in 0..6 {
        emulator.step_instruction(); // three LDA/STA pairs
    }
    emulator.step_instruction(); // JMP ($10FF)
    assert_eq!(
        emulator.cpu().pc,
        0x1234,
        "the bug fetches the high byte from $1000, never $1100"
    );
}

#[test]
fn zero_page_wrap_in_indexed_addressing() {
    // LDX #$05; LDA #$77; STA $FE,X -> $0003 (wrap), then spin
    let mut emulator = emulator_with_program(&[
        0xA2, 0x05, // LDX #$05
        0xA9, 0x77, // LDA #$77
        0x95, 0xFE, // STA $FE,X
        0x4C, 0x06, 0x80, // spin
    ]);

    emulator.run_frame();
    assert_eq!(
        emulator.bus().read_silent(0x0003),
        0x77,
        "zero-page indexing wraps within page 0"
    );
}

#[test]
fn interrupt_disable_survives_to_handler() {
    // BRK into a handler that stores the status to RAM
    let mut program = vec![
        0x00, 0x00, // BRK (+ padding byte)
        0x4C, 0x02, 0x80, // spin after return
    ];
    while program.len() < 0x20 {
        program.push(0xEA);
    }
    // Handler at $8020: PHP; PLA; STA $11; RTI
    program.extend_from_slice(&[0x08, 0x68, 0x85, 0x11, 0x40]);

    let mut prg = prg_with_program(&program);
    common::set_irq_vector(&mut prg, 0x8020);
    let rom = ines_image(&prg, 0, 0, 0);

    let mut emulator = Emulator::with_config(EmulatorConfig::default());
    emulator.load_rom_bytes(&rom).unwrap();
    emulator.run_frame();

    let status = emulator.bus().read_silent(0x0011);
    assert_ne!(status, 0, "handler must have run");
    assert_eq!(
        status & 0x04,
        0x04,
        "I is set inside the BRK handler"
    );
}

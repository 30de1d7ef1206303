// Common test utilities for the integration suite
//
// Builds iNES images in memory and wires them into an emulator so
// tests never depend on ROM files on disk.

#![allow(dead_code)]

use nes_core::{Emulator, EmulatorConfig};

/// Assemble an iNES image from raw pieces
///
/// `prg` must be 16KB or 32KB; `chr_banks` of 0 declares CHR-RAM.
pub fn ines_image(prg: &[u8], chr_banks: u8, mapper: u8, flags6_low: u8) -> Vec<u8> {
    assert!(prg.len() % 16384 == 0, "PRG must be whole 16KB banks");

    let mut rom = vec![0u8; 16];
    rom[0..4].copy_from_slice(b"NES\x1A");
    rom[4] = (prg.len() / 16384) as u8;
    rom[5] = chr_banks;
    rom[6] = (mapper << 4) | (flags6_low & 0x0F);
    rom[7] = mapper & 0xF0;
    rom.extend_from_slice(prg);
    rom.extend(vec![0u8; chr_banks as usize * 8192]);
    rom
}

/// A 16KB NROM PRG bank: `program` at $8000, reset vector -> $8000
pub fn prg_with_program(program: &[u8]) -> Vec<u8> {
    let mut prg = vec![0xEA; 16 * 1024]; // NOP filler
    prg[..program.len()].copy_from_slice(program);
    set_reset_vector(&mut prg, 0x8000);
    prg
}

/// Point the reset vector of a 16KB bank at `target`
pub fn set_reset_vector(prg: &mut [u8], target: u16) {
    let len = prg.len();
    prg[len - 4] = (target & 0xFF) as u8;
    prg[len - 3] = (target >> 8) as u8;
}

/// Point the NMI vector of a 16KB bank at `target`
pub fn set_nmi_vector(prg: &mut [u8], target: u16) {
    let len = prg.len();
    prg[len - 6] = (target & 0xFF) as u8;
    prg[len - 5] = (target >> 8) as u8;
}

/// Point the IRQ vector of a 16KB bank at `target`
pub fn set_irq_vector(prg: &mut [u8], target: u16) {
    let len = prg.len();
    prg[len - 2] = (target & 0xFF) as u8;
    prg[len - 1] = (target >> 8) as u8;
}

/// Boot an emulator running `program` on an NROM cart with CHR-RAM
pub fn emulator_with_program(program: &[u8]) -> Emulator {
    let rom = ines_image(&prg_with_program(program), 0, 0, 0);
    let mut emulator = Emulator::with_config(EmulatorConfig::default());
    emulator
        .load_rom_bytes(&rom)
        .expect("in-memory test ROM must load");
    emulator
}

/// An infinite JMP $8000 loop
pub const SPIN_LOOP: &[u8] = &[0x4C, 0x00, 0x80];

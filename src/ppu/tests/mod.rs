//! PPU unit tests
//!
//! Organized by functionality: register behavior, frame timing,
//! rendering output, and hardware quirks.

mod registers;

use super::*;
use crate::cartridge::{Cartridge, Mirroring, Region};
use crate::cartridge::mappers::Mapper0;

// Register numbers used throughout the tests
pub(crate) const PPUCTRL: u16 = 0;
pub(crate) const PPUMASK: u16 = 1;
pub(crate) const PPUSTATUS: u16 = 2;
pub(crate) const OAMADDR: u16 = 3;
pub(crate) const OAMDATA: u16 = 4;
pub(crate) const PPUSCROLL: u16 = 5;
pub(crate) const PPUADDR: u16 = 6;
pub(crate) const PPUDATA: u16 = 7;

/// Build a PPU with an NROM cartridge whose CHR is a recognizable
/// pattern: every tile renders solid color 3 (both planes 0xFF)
pub(crate) fn ppu_with_solid_chr() -> Ppu {
    let mut ppu = Ppu::new();

    let cart = Cartridge {
        prg_rom: vec![0; 16 * 1024],
        chr_rom: vec![0xFF; 8 * 1024],
        trainer: None,
        mapper: 0,
        mirroring: Mirroring::Vertical,
        has_battery: false,
        chr_is_ram: false,
        region: Region::Ntsc,
    };
    let mapper: Box<dyn crate::cartridge::Mapper> = Box::new(Mapper0::new(cart));
    ppu.set_mapper(std::rc::Rc::new(std::cell::RefCell::new(mapper)));
    ppu
}

/// Step the PPU to a specific scanline and dot from its current spot
pub(crate) fn step_to(ppu: &mut Ppu, scanline: u16, dot: u16) {
    // Bounded by two frames so a broken counter fails loudly
    for _ in 0..(341 * 262 * 2) {
        if ppu.scanline() == scanline && ppu.dot() == dot {
            return;
        }
        ppu.step();
    }
    panic!("never reached scanline {} dot {}", scanline, dot);
}

/// Run exactly one full frame, returning the dots it took
pub(crate) fn run_one_frame(ppu: &mut Ppu) -> u64 {
    let start = ppu.dot_count();
    ppu.clear_frame_complete();
    while !ppu.frame_complete() {
        ppu.step();
    }
    ppu.dot_count() - start
}

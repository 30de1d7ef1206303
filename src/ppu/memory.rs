// PPU memory access: pattern tables, nametables, palette RAM

use super::Ppu;

impl Ppu {
    /// Mirror a nametable address into the 2KB of internal VRAM
    ///
    /// The address space exposes four nametables at $2000-$2FFF; the
    /// cartridge's mirroring mode decides which physical table backs
    /// each logical one.
    pub(super) fn mirror_nametable_addr(&self, addr: u16) -> usize {
        let addr = (addr & 0x0FFF) as usize;
        let table = addr / 0x400;
        let offset = addr & 0x3FF;
        self.nametable_map[table] + offset
    }

    /// Fold a palette address into the 32-byte palette RAM index
    fn palette_index(addr: u16) -> usize {
        (addr & 0x1F) as usize
    }

    /// Read a byte from PPU memory ($0000-$3FFF)
    ///
    /// Every access drives the address onto the PPU bus first so
    /// mappers can watch A12 (the MMC3 scanline counter).
    pub(super) fn read_ppu_memory(&mut self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        self.notify_ppu_bus(addr);

        match addr {
            0x0000..=0x1FFF => match &self.mapper {
                Some(mapper) => mapper.borrow_mut().ppu_read(addr),
                None => 0,
            },
            0x2000..=0x3EFF => self.nametables[self.mirror_nametable_addr(addr)],
            _ => self.palette_ram[Self::palette_index(addr)],
        }
    }

    /// Write a byte to PPU memory ($0000-$3FFF)
    ///
    /// Palette writes keep the $3F10/$3F14/$3F18/$3F1C mirrors in sync
    /// with their $3F00-column counterparts in both directions.
    pub(super) fn write_ppu_memory(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;
        self.notify_ppu_bus(addr);

        match addr {
            0x0000..=0x1FFF => {
                if let Some(mapper) = &self.mapper {
                    mapper.borrow_mut().ppu_write(addr, value);
                }
            }
            0x2000..=0x3EFF => {
                let index = self.mirror_nametable_addr(addr);
                self.nametables[index] = value;
            }
            _ => {
                let index = Self::palette_index(addr);
                self.palette_ram[index] = value;
                // Entry 0 of each sprite palette mirrors the
                // corresponding background entry
                if index & 0x03 == 0 {
                    self.palette_ram[index ^ 0x10] = value;
                }
            }
        }
    }

    /// Read palette RAM without bus side effects (pixel pipeline)
    #[inline]
    pub(super) fn palette_entry(&self, index: usize) -> u8 {
        self.palette_ram[index & 0x1F]
    }

    /// Drive an address onto the PPU bus for mapper snooping
    pub(super) fn notify_ppu_bus(&mut self, addr: u16) {
        if let Some(mapper) = &self.mapper {
            mapper.borrow_mut().ppu_bus_address(addr & 0x3FFF, self.dot_counter);
        }
    }

    /// Refresh the nametable map from the mapper's current mirroring
    ///
    /// Called each frame and after register writes; MMC1 and MMC3
    /// change mirroring at runtime.
    pub(super) fn refresh_mirroring(&mut self) {
        if let Some(mapper) = &self.mapper {
            let mirroring = mapper.borrow().mirroring();
            self.nametable_map = mirroring.nametable_map();
        }
    }
}

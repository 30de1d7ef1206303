// Emulator module - the console aggregate and frame scheduler
//
// `Emulator` owns the CPU, bus (PPU/APU/controllers), and cartridge
// mapper, and drives them in lockstep: one CPU instruction, then 3
// PPU dots per CPU cycle (16/5 on PAL), then the same number of APU
// cycles. Interrupts raised during the PPU/APU slice are delivered at
// the next instruction boundary.

mod config;
mod save_state;

pub use config::{ConfigError, EmulatorConfig, RegionChoice};
pub use save_state::{SaveState, SaveStateError};

use crate::audio::AudioSink;
use crate::bus::Bus;
use crate::cartridge::{create_mapper, Cartridge, INesError, Mapper, MapperError, Region};
use crate::cpu::Cpu;
use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Errors surfaced while loading a ROM into the emulator
#[derive(Debug)]
pub enum LoadError {
    /// The iNES image failed to parse
    Ines(INesError),
    /// The image parsed but names an unsupported mapper
    Mapper(MapperError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Ines(e) => write!(f, "ROM load failed: {}", e),
            LoadError::Mapper(e) => write!(f, "ROM load failed: {}", e),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<INesError> for LoadError {
    fn from(e: INesError) -> Self {
        LoadError::Ines(e)
    }
}

impl From<MapperError> for LoadError {
    fn from(e: MapperError) -> Self {
        LoadError::Mapper(e)
    }
}

/// Main emulator structure
pub struct Emulator {
    /// CPU (6502 core)
    cpu: Cpu,

    /// Bus owning PPU, APU, RAM, and controller ports
    bus: Bus,

    /// Cartridge mapper, shared between the bus and the PPU
    mapper: Option<Rc<RefCell<Box<dyn Mapper>>>>,

    /// Configuration
    config: EmulatorConfig,

    /// Active console region
    region: Region,

    /// Currently loaded ROM path (save-state validation)
    rom_path: Option<PathBuf>,

    /// Host audio sink; None runs silent
    audio_sink: Option<Box<dyn AudioSink>>,

    /// Samples awaiting a full chunk
    pending_audio: Vec<i16>,

    /// PAL dot pacing remainder (16 dots per 5 CPU cycles)
    pal_dot_remainder: u32,
}

impl Emulator {
    /// Create an emulator with default configuration and no ROM
    pub fn new() -> Self {
        Self::with_config(EmulatorConfig::load_or_default())
    }

    /// Create an emulator from an explicit configuration
    pub fn with_config(config: EmulatorConfig) -> Self {
        let mut emulator = Emulator {
            cpu: Cpu::new(),
            bus: Bus::new(),
            mapper: None,
            region: Region::Ntsc,
            rom_path: None,
            audio_sink: None,
            pending_audio: Vec::new(),
            pal_dot_remainder: 0,
            config,
        };
        emulator.apply_config();
        emulator
    }

    fn apply_config(&mut self) {
        self.bus.apu.set_sample_rate(self.config.audio.sample_rate);
        self.bus.apu.set_volume(self.config.audio.volume);
    }

    /// Load a ROM from an iNES file on disk
    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let path = path.as_ref();
        let cartridge = Cartridge::from_ines_file(path)?;
        self.rom_path = Some(path.to_path_buf());
        self.insert_cartridge(cartridge)
    }

    /// Load a ROM from raw iNES bytes
    pub fn load_rom_bytes(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        let cartridge = Cartridge::from_ines_bytes(bytes)?;
        self.insert_cartridge(cartridge)
    }

    /// Wire a parsed cartridge into the machine and reset
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) -> Result<(), LoadError> {
        self.region = match self.config.region {
            RegionChoice::Auto => cartridge.region,
            RegionChoice::Ntsc => Region::Ntsc,
            RegionChoice::Pal => Region::Pal,
        };

        let mapper = Rc::new(RefCell::new(create_mapper(cartridge)?));
        self.bus.attach_mapper(Rc::clone(&mapper));
        self.bus.ppu.set_mapper(Rc::clone(&mapper));
        self.mapper = Some(mapper);

        self.bus.ppu.set_region(self.region);
        self.bus.apu.set_region(self.region);

        self.reset();
        Ok(())
    }

    /// Reset the console (power button)
    ///
    /// The CPU comes out of its 7-cycle reset sequence with the PPU
    /// 21 dots in, keeping the 3:1 dot/cycle alignment exact.
    pub fn reset(&mut self) {
        self.bus.ppu.reset();
        self.bus.apu.reset();
        self.apply_config();
        self.bus.ppu.set_region(self.region);
        self.bus.apu.set_region(self.region);
        self.cpu.reset(&mut self.bus);

        self.pal_dot_remainder = 0;
        let dots = self.dots_for(self.cpu.cycles as u32);
        for _ in 0..dots {
            self.bus.ppu.step();
        }
    }

    /// Install the host audio sink
    pub fn set_audio_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.audio_sink = Some(sink);
    }

    /// Update a controller from a packed button mask
    /// (bit 0 = A ... bit 7 = Right)
    pub fn set_controller(&mut self, index: usize, buttons: u8) {
        self.bus.controllers.set_buttons(index, buttons);
    }

    /// PPU dots to run for `cycles` CPU cycles
    ///
    /// NTSC is exactly 3:1; PAL is 3.2:1, paced as 16 dots per 5
    /// cycles with a carried remainder.
    fn dots_for(&mut self, cycles: u32) -> u32 {
        match self.region {
            Region::Ntsc => cycles * 3,
            Region::Pal => {
                let total = cycles * 16 + self.pal_dot_remainder;
                self.pal_dot_remainder = total % 5;
                total / 5
            }
        }
    }

    /// Run the machine until the PPU completes a frame
    ///
    /// Returns the 256x240 ARGB frame buffer. A jammed CPU still
    /// produces frames (the PPU and APU keep ticking); a pathological
    /// ROM that never finishes a frame trips the step limit and
    /// returns the partial frame.
    pub fn run_frame(&mut self) -> &[u32; SCREEN_WIDTH * SCREEN_HEIGHT] {
        self.bus.ppu.clear_frame_complete();

        let step_limit = self.config.run.step_limit;
        let mut completed = false;

        for _ in 0..step_limit {
            // Level IRQs from the APU and mapper, sampled each tick
            let irq = self.bus.apu.irq_pending() || self.bus.mapper_irq_pending();
            self.cpu.set_irq_line(irq);

            let cycles = self.cpu.step(&mut self.bus);

            let dots = self.dots_for(cycles);
            for _ in 0..dots {
                self.bus.ppu.step();
            }

            self.bus.tick_apu(cycles);

            // NMI raised during the PPU slice lands on the next
            // instruction boundary
            if self.bus.ppu.take_nmi() {
                self.cpu.trigger_nmi();
            }

            if self.bus.ppu.frame_complete() {
                completed = true;
                break;
            }
        }

        if !completed {
            log::warn!(
                "frame did not complete within {} CPU steps; returning partial frame",
                step_limit
            );
        }

        self.flush_audio();
        self.bus.ppu.frame_buffer()
    }

    /// Execute a single CPU instruction, keeping the PPU and APU in
    /// lockstep (debuggers, conformance tests)
    ///
    /// Returns the cycles the instruction consumed.
    pub fn step_instruction(&mut self) -> u32 {
        let irq = self.bus.apu.irq_pending() || self.bus.mapper_irq_pending();
        self.cpu.set_irq_line(irq);

        let cycles = self.cpu.step(&mut self.bus);

        let dots = self.dots_for(cycles);
        for _ in 0..dots {
            self.bus.ppu.step();
        }
        self.bus.tick_apu(cycles);

        if self.bus.ppu.take_nmi() {
            self.cpu.trigger_nmi();
        }
        cycles
    }

    /// Push buffered samples to the sink in whole chunks
    fn flush_audio(&mut self) {
        self.pending_audio.extend(self.bus.apu.take_samples());

        let chunk_size = self.config.audio.chunk_size.max(1);
        let Some(sink) = &mut self.audio_sink else {
            // No sink installed: cap the backlog
            self.pending_audio.clear();
            return;
        };

        let mut offset = 0;
        while self.pending_audio.len() - offset >= chunk_size {
            let chunk = &self.pending_audio[offset..offset + chunk_size];
            if let Err(e) = sink.push_samples(chunk) {
                log::warn!("{}; dropping {} samples", e, chunk.len());
            }
            offset += chunk_size;
        }
        self.pending_audio.drain(..offset);
    }

    // ========================================
    // Accessors
    // ========================================

    /// The rendered frame buffer
    pub fn frame_buffer(&self) -> &[u32; SCREEN_WIDTH * SCREEN_HEIGHT] {
        self.bus.ppu.frame_buffer()
    }

    /// CPU reference (tracing, save states)
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutable CPU reference
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Bus reference
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Mutable bus reference
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Cartridge mapper handle, when a ROM is loaded
    pub fn mapper(&self) -> Option<&Rc<RefCell<Box<dyn Mapper>>>> {
        self.mapper.as_ref()
    }

    /// Active console region
    pub fn region(&self) -> Region {
        self.region
    }

    /// Path of the loaded ROM, if it came from disk
    pub fn rom_path(&self) -> Option<&Path> {
        self.rom_path.as_deref()
    }

    /// Configuration
    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Save the current state to a slot file next to the ROM
    pub fn save_state(&self, slot: u8) -> Result<(), SaveStateError> {
        let state = SaveState::from_emulator(self);
        state.save_to_file(slot, self.rom_path.as_deref())
    }

    /// Restore a previously saved slot
    pub fn load_state(&mut self, slot: u8) -> Result<(), SaveStateError> {
        let state = SaveState::load_from_file(slot, self.rom_path.as_deref())?;
        state.restore_to_emulator(self)
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::{Mirroring, Region};

    /// Build a minimal NROM cartridge whose reset vector points at an
    /// infinite loop (JMP $8000)
    pub(crate) fn looping_cartridge() -> Cartridge {
        let mut prg = vec![0xEA; 16 * 1024]; // NOP sled
        prg[0x0000] = 0x4C; // JMP $8000
        prg[0x0001] = 0x00;
        prg[0x0002] = 0x80;
        prg[0x3FFC] = 0x00; // reset vector -> $8000
        prg[0x3FFD] = 0x80;

        Cartridge {
            prg_rom: prg,
            chr_rom: vec![0; 8 * 1024],
            trainer: None,
            mapper: 0,
            mirroring: Mirroring::Vertical,
            has_battery: false,
            chr_is_ram: true,
            region: Region::Ntsc,
        }
    }

    fn test_emulator() -> Emulator {
        let mut emulator = Emulator::with_config(EmulatorConfig::default());
        emulator.insert_cartridge(looping_cartridge()).unwrap();
        emulator
    }

    #[test]
    fn test_reset_reads_vector() {
        let emulator = test_emulator();
        assert_eq!(emulator.cpu().pc, 0x8000);
        assert_eq!(emulator.cpu().sp, 0xFD);
        assert_eq!(emulator.cpu().cycles, 7);
    }

    #[test]
    fn test_reset_aligns_ppu_dots() {
        let emulator = test_emulator();
        assert_eq!(
            emulator.bus().ppu.dot_count(),
            21,
            "PPU pre-advanced 3 dots per reset cycle"
        );
    }

    #[test]
    fn test_run_frame_completes() {
        let mut emulator = test_emulator();
        emulator.run_frame();
        assert_eq!(emulator.bus().ppu.frame_count(), 1);
    }

    #[test]
    fn test_cycle_ratio_invariant() {
        let mut emulator = test_emulator();
        for _ in 0..3 {
            emulator.run_frame();
            assert_eq!(
                emulator.bus().ppu.dot_count(),
                3 * emulator.cpu().cycles,
                "NTSC dots must stay at exactly 3x CPU cycles"
            );
        }
    }

    #[test]
    fn test_jammed_cpu_still_finishes_frames() {
        let mut cart = looping_cartridge();
        cart.prg_rom[0x0000] = 0x02; // KIL instead of the JMP

        let mut emulator = Emulator::with_config(EmulatorConfig::default());
        emulator.insert_cartridge(cart).unwrap();

        emulator.run_frame();
        assert!(emulator.cpu().is_jammed());
        assert_eq!(
            emulator.bus().ppu.frame_count(),
            1,
            "the PPU keeps running under a jammed CPU"
        );
    }

    #[test]
    fn test_step_limit_returns_partial_frame() {
        let mut config = EmulatorConfig::default();
        config.run.step_limit = 10;

        let mut emulator = Emulator::with_config(config);
        emulator.insert_cartridge(looping_cartridge()).unwrap();

        emulator.run_frame();
        assert_eq!(
            emulator.bus().ppu.frame_count(),
            0,
            "10 steps cannot finish a frame"
        );
    }

    #[test]
    fn test_unsupported_mapper_rejected() {
        let mut cart = looping_cartridge();
        cart.mapper = 99;

        let mut emulator = Emulator::with_config(EmulatorConfig::default());
        assert!(matches!(
            emulator.insert_cartridge(cart),
            Err(LoadError::Mapper(MapperError::UnsupportedMapper(99)))
        ));
    }

    #[test]
    fn test_audio_reaches_sink() {
        use crate::audio::CaptureSink;

        let mut emulator = test_emulator();
        emulator.set_audio_sink(Box::new(CaptureSink::default()));

        // Key pulse 1 on directly through the bus
        emulator.bus_mut().write(0x4015, 0x01);
        emulator.bus_mut().write(0x4000, 0x3F);
        emulator.bus_mut().write(0x4002, 0x80);
        emulator.bus_mut().write(0x4003, 0x00);

        for _ in 0..4 {
            emulator.run_frame();
        }
        // The sink is boxed away; just confirm the backlog drains
        assert!(
            emulator.pending_audio.len() < emulator.config().audio.chunk_size,
            "full chunks must be flushed to the sink"
        );
    }

    #[test]
    fn test_pal_dot_pacing() {
        let mut config = EmulatorConfig::default();
        config.region = RegionChoice::Pal;

        let mut emulator = Emulator::with_config(config);
        emulator.insert_cartridge(looping_cartridge()).unwrap();

        emulator.run_frame();
        let dots = emulator.bus().ppu.dot_count();
        let cycles = emulator.cpu().cycles;
        let expected = cycles * 16 / 5;
        assert!(
            dots == expected || dots == expected + 1,
            "PAL dots ({}) should track 3.2x cycles ({})",
            dots,
            expected
        );
    }
}

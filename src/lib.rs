// NES emulation core
//
// Cycle-level emulation of the console's three processors (6502 CPU,
// 2C02 PPU, 2A03 APU), the memory bus, cartridge mappers, and the
// frame scheduler that drives them in lockstep. Host concerns stay
// behind narrow interfaces: the frame buffer out, a button mask in,
// PCM samples out through an AudioSink.

// Public modules
pub mod apu;
pub mod audio;
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod emulator;
pub mod input;
pub mod ppu;

// Re-export main types for convenience
pub use apu::Apu;
pub use audio::{AudioSink, AudioSinkError, CaptureSink, Mixer};
pub use bus::Bus;
pub use cartridge::{
    create_mapper, Cartridge, INesError, INesHeader, Mapper, MapperError, Mirroring, Region,
};
pub use cpu::Cpu;
pub use emulator::{
    ConfigError, Emulator, EmulatorConfig, LoadError, RegionChoice, SaveState, SaveStateError,
};
pub use input::{Controller, ControllerIO};
pub use ppu::{Ppu, SCREEN_HEIGHT, SCREEN_WIDTH};

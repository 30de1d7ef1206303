// Save state functionality
//
// Serializes the machine to a versioned JSON snapshot: CPU registers,
// work RAM, PPU registers and memories, mapper bank registers and
// PRG-RAM. The APU snapshot is coarse (channel enables); sequencer
// phase is not preserved across a load.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Current save state format version
const SAVE_STATE_VERSION: u32 = 1;

/// Errors that can occur during save state operations
#[derive(Debug)]
pub enum SaveStateError {
    /// I/O error
    Io(io::Error),

    /// Serialization/deserialization error
    Serialization(serde_json::Error),

    /// Save state version mismatch
    VersionMismatch { expected: u32, found: u32 },

    /// The snapshot belongs to a different ROM
    RomMismatch { expected: String, found: String },
}

impl std::fmt::Display for SaveStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveStateError::Io(e) => write!(f, "I/O error: {}", e),
            SaveStateError::Serialization(e) => write!(f, "serialization error: {}", e),
            SaveStateError::VersionMismatch { expected, found } => {
                write!(f, "version mismatch: expected {}, found {}", expected, found)
            }
            SaveStateError::RomMismatch { expected, found } => {
                write!(f, "snapshot is for '{}', loaded ROM is '{}'", found, expected)
            }
        }
    }
}

impl std::error::Error for SaveStateError {}

impl From<io::Error> for SaveStateError {
    fn from(e: io::Error) -> Self {
        SaveStateError::Io(e)
    }
}

impl From<serde_json::Error> for SaveStateError {
    fn from(e: serde_json::Error) -> Self {
        SaveStateError::Serialization(e)
    }
}

/// Complete emulator snapshot
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveState {
    /// Format version for compatibility checking
    version: u32,

    /// Creation timestamp
    timestamp: String,

    /// ROM file name, for validation on load
    rom_name: Option<String>,

    /// CPU state
    cpu: CpuState,

    /// PPU state
    ppu: PpuState,

    /// Coarse APU state
    apu: ApuState,

    /// 2KB work RAM
    ram: Vec<u8>,

    /// Mapper bank/IRQ registers (mapper-defined blob)
    mapper_registers: Vec<u8>,

    /// Cartridge PRG-RAM, when the mapper carries any
    prg_ram: Option<Vec<u8>>,
}

/// CPU registers and counters
#[derive(Debug, Serialize, Deserialize)]
struct CpuState {
    a: u8,
    x: u8,
    y: u8,
    sp: u8,
    pc: u16,
    status: u8,
    cycles: u64,
}

/// PPU registers, memories, and timing
#[derive(Debug, Serialize, Deserialize)]
struct PpuState {
    ppuctrl: u8,
    ppumask: u8,
    ppustatus: u8,
    oam_addr: u8,

    v: u16,
    t: u16,
    fine_x: u8,
    write_latch: bool,
    read_buffer: u8,

    scanline: u16,
    dot: u16,
    frame: u64,

    nametables: Vec<u8>,
    palette_ram: Vec<u8>,
    oam: Vec<u8>,
}

/// Coarse APU state: the $4015 enable bits
#[derive(Debug, Serialize, Deserialize)]
struct ApuState {
    channel_enables: u8,
}

impl SaveState {
    /// Capture the current emulator state
    pub fn from_emulator(emulator: &super::Emulator) -> Self {
        let cpu = emulator.cpu();
        let bus = emulator.bus();
        let ppu = &bus.ppu;

        let rom_name = emulator
            .rom_path()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(|s| s.to_string());

        let mut ram = Vec::with_capacity(2048);
        for addr in 0..2048u16 {
            ram.push(bus.read_silent(addr));
        }

        let (mapper_registers, prg_ram) = match emulator.mapper() {
            Some(mapper) => {
                let mapper = mapper.borrow();
                (
                    mapper.save_registers(),
                    mapper.prg_ram().map(|r| r.to_vec()),
                )
            }
            None => (Vec::new(), None),
        };

        SaveState {
            version: SAVE_STATE_VERSION,
            timestamp: Local::now().to_rfc3339(),
            rom_name,
            cpu: CpuState {
                a: cpu.a,
                x: cpu.x,
                y: cpu.y,
                sp: cpu.sp,
                pc: cpu.pc,
                status: cpu.status,
                cycles: cpu.cycles,
            },
            ppu: PpuState {
                ppuctrl: ppu.ppuctrl,
                ppumask: ppu.ppumask,
                ppustatus: ppu.ppustatus,
                oam_addr: ppu.oam_addr,
                v: ppu.v,
                t: ppu.t,
                fine_x: ppu.fine_x,
                write_latch: ppu.write_latch,
                read_buffer: ppu.read_buffer,
                scanline: ppu.scanline,
                dot: ppu.dot,
                frame: ppu.frame,
                nametables: ppu.nametables.to_vec(),
                palette_ram: ppu.palette_ram.to_vec(),
                oam: ppu.oam.to_vec(),
            },
            apu: ApuState {
                channel_enables: bus.apu.peek_status() & 0x1F,
            },
            ram,
            mapper_registers,
            prg_ram,
        }
    }

    /// Restore this snapshot into the emulator
    ///
    /// The loaded ROM must match the one the snapshot was taken from.
    pub fn restore_to_emulator(
        &self,
        emulator: &mut super::Emulator,
    ) -> Result<(), SaveStateError> {
        if self.version != SAVE_STATE_VERSION {
            return Err(SaveStateError::VersionMismatch {
                expected: SAVE_STATE_VERSION,
                found: self.version,
            });
        }

        let current_rom = emulator
            .rom_path()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(|s| s.to_string());
        if let (Some(current), Some(saved)) = (&current_rom, &self.rom_name) {
            if current != saved {
                return Err(SaveStateError::RomMismatch {
                    expected: current.clone(),
                    found: saved.clone(),
                });
            }
        }

        // CPU
        {
            let cpu = emulator.cpu_mut();
            cpu.a = self.cpu.a;
            cpu.x = self.cpu.x;
            cpu.y = self.cpu.y;
            cpu.sp = self.cpu.sp;
            cpu.pc = self.cpu.pc;
            cpu.cycles = self.cpu.cycles;
            cpu.write_status_byte(self.cpu.status);
        }

        // RAM
        for (addr, &byte) in self.ram.iter().enumerate().take(2048) {
            emulator.bus_mut().write(addr as u16, byte);
        }

        // PPU
        {
            let ppu = &mut emulator.bus_mut().ppu;
            ppu.ppuctrl = self.ppu.ppuctrl;
            ppu.ppumask = self.ppu.ppumask;
            ppu.ppustatus = self.ppu.ppustatus;
            ppu.oam_addr = self.ppu.oam_addr;
            ppu.v = self.ppu.v;
            ppu.t = self.ppu.t;
            ppu.fine_x = self.ppu.fine_x;
            ppu.write_latch = self.ppu.write_latch;
            ppu.read_buffer = self.ppu.read_buffer;
            ppu.scanline = self.ppu.scanline;
            ppu.dot = self.ppu.dot;
            ppu.frame = self.ppu.frame;

            let n = ppu.nametables.len().min(self.ppu.nametables.len());
            ppu.nametables[..n].copy_from_slice(&self.ppu.nametables[..n]);
            let n = ppu.palette_ram.len().min(self.ppu.palette_ram.len());
            ppu.palette_ram[..n].copy_from_slice(&self.ppu.palette_ram[..n]);
            let n = ppu.oam.len().min(self.ppu.oam.len());
            ppu.oam[..n].copy_from_slice(&self.ppu.oam[..n]);
        }

        // APU: re-assert the channel enables
        emulator
            .bus_mut()
            .write(0x4015, self.apu.channel_enables);

        // Mapper
        if let Some(mapper) = emulator.mapper() {
            let mut mapper = mapper.borrow_mut();
            mapper.load_registers(&self.mapper_registers);
            if let (Some(saved), Some(live)) = (&self.prg_ram, mapper.prg_ram_mut()) {
                let n = live.len().min(saved.len());
                live[..n].copy_from_slice(&saved[..n]);
            }
        }

        Ok(())
    }

    /// File path for a save slot
    fn slot_path(slot: u8, rom_path: Option<&Path>) -> PathBuf {
        let stem = rom_path
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("nes_core");
        PathBuf::from(format!("{}.state{}.json", stem, slot))
    }

    /// Write the snapshot to a slot file
    pub fn save_to_file(&self, slot: u8, rom_path: Option<&Path>) -> Result<(), SaveStateError> {
        let json = serde_json::to_string(self)?;
        fs::write(Self::slot_path(slot, rom_path), json)?;
        Ok(())
    }

    /// Read a snapshot back from a slot file
    pub fn load_from_file(slot: u8, rom_path: Option<&Path>) -> Result<Self, SaveStateError> {
        let json = fs::read_to_string(Self::slot_path(slot, rom_path))?;
        Ok(serde_json::from_str(&json)?)
    }
}

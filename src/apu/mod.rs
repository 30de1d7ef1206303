// APU module - Audio Processing Unit (2A03) implementation
//
// Five channels (two pulse, triangle, noise, DMC) plus the frame
// counter, stepped once per CPU cycle. The triangle and DMC timers
// run at the CPU rate; pulse and noise timers run at half of it. A
// pacing accumulator emits one mixed sample per host sample period.
//
// ## Register Map
//
// | Address       | Channel   | Registers                          |
// |---------------|-----------|------------------------------------|
// | $4000-$4003   | Pulse 1   | duty/envelope, sweep, timer, length|
// | $4004-$4007   | Pulse 2   | duty/envelope, sweep, timer, length|
// | $4008-$400B   | Triangle  | linear, -, timer, length           |
// | $400C-$400F   | Noise     | envelope, -, mode/period, length   |
// | $4010-$4013   | DMC       | rate/flags, level, address, length |
// | $4015         | Status    | channel enables / length status    |
// | $4017         | Frame     | sequencer mode, IRQ inhibit        |

pub mod channels;
pub mod components;
pub mod constants;

use crate::audio::{Mixer, DEFAULT_SAMPLE_RATE};
use crate::cartridge::Region;
use channels::{DmcChannel, NoiseChannel, PulseChannel, TriangleChannel};
use components::FrameCounter;
use constants::{CPU_CLOCK_NTSC, CPU_CLOCK_PAL};

/// APU state: channels, frame counter, and sample pacing
pub struct Apu {
    /// Pulse channel 1
    pulse1: PulseChannel,
    /// Pulse channel 2
    pulse2: PulseChannel,
    /// Triangle channel
    triangle: TriangleChannel,
    /// Noise channel
    noise: NoiseChannel,
    /// Delta modulation channel
    dmc: DmcChannel,

    /// Frame counter driving envelopes/lengths/sweeps
    frame_counter: FrameCounter,

    /// CPU cycle parity; pulse and noise clock on odd cycles
    odd_cycle: bool,

    /// Non-linear mixer
    mixer: Mixer,

    /// Cycles accumulated toward the next sample
    sample_accumulator: f64,

    /// CPU cycles per host sample
    cycles_per_sample: f64,

    /// Mixed samples awaiting delivery to the host sink
    sample_buffer: Vec<i16>,

    /// Console region
    region: Region,

    /// Host sample rate in Hz
    sample_rate: u32,
}

impl Apu {
    /// Create a new APU in the power-on state (NTSC, 48 kHz)
    pub fn new() -> Self {
        let mut apu = Apu {
            pulse1: PulseChannel::new(1),
            pulse2: PulseChannel::new(2),
            triangle: TriangleChannel::new(),
            noise: NoiseChannel::new(),
            dmc: DmcChannel::new(),
            frame_counter: FrameCounter::new(),
            odd_cycle: false,
            mixer: Mixer::new(),
            sample_accumulator: 0.0,
            cycles_per_sample: 0.0,
            sample_buffer: Vec::new(),
            region: Region::Ntsc,
            sample_rate: DEFAULT_SAMPLE_RATE,
        };
        apu.update_sample_pacing();
        apu
    }

    /// Reset to the power-on state, keeping region and sample config
    pub fn reset(&mut self) {
        let region = self.region;
        let sample_rate = self.sample_rate;
        let volume = self.mixer.volume();
        *self = Self::new();
        self.set_region(region);
        self.set_sample_rate(sample_rate);
        self.mixer.set_volume(volume);
    }

    /// Select NTSC or PAL clocking
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
        self.frame_counter.set_region(region);
        self.noise.set_region(region);
        self.dmc.set_region(region);
        self.update_sample_pacing();
    }

    /// Set the host sample rate
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1);
        self.update_sample_pacing();
    }

    /// Set the master volume (0.0 to 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.mixer.set_volume(volume);
    }

    fn update_sample_pacing(&mut self) {
        let cpu_clock = match self.region {
            Region::Ntsc => CPU_CLOCK_NTSC,
            Region::Pal => CPU_CLOCK_PAL,
        };
        self.cycles_per_sample = cpu_clock / self.sample_rate as f64;
    }

    // ========================================
    // Clocking
    // ========================================

    /// Advance the APU by one CPU cycle
    pub fn step_cycle(&mut self) {
        self.triangle.clock_timer();
        self.dmc.clock_timer();

        if self.odd_cycle {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
            self.noise.clock_timer();
        }
        self.odd_cycle = !self.odd_cycle;

        let events = self.frame_counter.clock();
        if events.quarter {
            self.clock_quarter_frame();
        }
        if events.half {
            self.clock_half_frame();
        }

        self.sample_accumulator += 1.0;
        if self.sample_accumulator >= self.cycles_per_sample {
            self.sample_accumulator -= self.cycles_per_sample;
            self.emit_sample();
        }
    }

    /// Quarter frame: envelopes and the triangle linear counter
    fn clock_quarter_frame(&mut self) {
        self.pulse1.clock_envelope();
        self.pulse2.clock_envelope();
        self.noise.clock_envelope();
        self.triangle.clock_linear_counter();
    }

    /// Half frame: length counters and sweeps
    fn clock_half_frame(&mut self) {
        self.pulse1.clock_length_counter();
        self.pulse1.clock_sweep();
        self.pulse2.clock_length_counter();
        self.pulse2.clock_sweep();
        self.triangle.clock_length_counter();
        self.noise.clock_length_counter();
    }

    /// Mix the current channel levels into the sample buffer
    fn emit_sample(&mut self) {
        let sample = self.mixer.mix(
            self.pulse1.output(),
            self.pulse2.output(),
            self.triangle.output(),
            self.noise.output(),
            self.dmc.output(),
        );
        self.sample_buffer.push(sample);
    }

    /// Drain the mixed samples accumulated so far
    pub fn take_samples(&mut self) -> Vec<i16> {
        std::mem::take(&mut self.sample_buffer)
    }

    /// Number of samples waiting in the buffer
    pub fn buffered_samples(&self) -> usize {
        self.sample_buffer.len()
    }

    // ========================================
    // Interrupts and DMA
    // ========================================

    /// Whether the frame counter or DMC is asserting IRQ
    pub fn irq_pending(&self) -> bool {
        self.frame_counter.irq_pending() || self.dmc.irq_pending()
    }

    /// Address the DMC wants fetched, if its buffer ran dry
    ///
    /// The bus services this between instructions, charging the CPU
    /// the sample-fetch stall.
    pub fn dmc_needs_sample(&self) -> Option<u16> {
        self.dmc.needs_sample_read()
    }

    /// Deliver the byte for a previously requested DMC fetch
    pub fn dmc_load_sample(&mut self, byte: u8) {
        self.dmc.load_sample_byte(byte);
    }

    // ========================================
    // Registers
    // ========================================

    /// Compose the $4015 status byte without clearing the frame IRQ
    /// (save states, debuggers)
    pub fn peek_status(&self) -> u8 {
        let mut status = 0u8;
        if self.pulse1.is_active() {
            status |= 0x01;
        }
        if self.pulse2.is_active() {
            status |= 0x02;
        }
        if self.triangle.is_active() {
            status |= 0x04;
        }
        if self.noise.is_active() {
            status |= 0x08;
        }
        if self.dmc.is_active() {
            status |= 0x10;
        }
        if self.frame_counter.irq_pending() {
            status |= 0x40;
        }
        if self.dmc.irq_pending() {
            status |= 0x80;
        }
        status
    }

    /// Read $4015: channel length status and IRQ flags
    ///
    /// Reading clears the frame IRQ flag (bit 6). The DMC IRQ (bit 7)
    /// is only cleared by acknowledging it through a $4015 write or
    /// $4010 with IRQ disabled.
    pub fn read_status(&mut self) -> u8 {
        let status = self.peek_status();
        self.frame_counter.clear_irq();
        status
    }

    /// Write an APU register ($4000-$4017)
    pub fn write_register(&mut self, addr: u16, data: u8) {
        match addr {
            // Pulse 1
            0x4000 => self.pulse1.write_register_0(data),
            0x4001 => self.pulse1.write_register_1(data),
            0x4002 => self.pulse1.write_register_2(data),
            0x4003 => self.pulse1.write_register_3(data),

            // Pulse 2
            0x4004 => self.pulse2.write_register_0(data),
            0x4005 => self.pulse2.write_register_1(data),
            0x4006 => self.pulse2.write_register_2(data),
            0x4007 => self.pulse2.write_register_3(data),

            // Triangle ($4009 is unused)
            0x4008 => self.triangle.write_register_0(data),
            0x400A => self.triangle.write_register_2(data),
            0x400B => self.triangle.write_register_3(data),

            // Noise ($400D is unused)
            0x400C => self.noise.write_register_0(data),
            0x400E => self.noise.write_register_2(data),
            0x400F => self.noise.write_register_3(data),

            // DMC
            0x4010 => self.dmc.write_register_0(data),
            0x4011 => self.dmc.write_register_1(data),
            0x4012 => self.dmc.write_register_2(data),
            0x4013 => self.dmc.write_register_3(data),

            // Status: channel enables; acknowledges the DMC IRQ
            0x4015 => {
                self.pulse1.set_enabled(data & 0x01 != 0);
                self.pulse2.set_enabled(data & 0x02 != 0);
                self.triangle.set_enabled(data & 0x04 != 0);
                self.noise.set_enabled(data & 0x08 != 0);
                self.dmc.set_enabled(data & 0x10 != 0);
                self.dmc.clear_irq();
            }

            // Frame counter
            0x4017 => {
                let events = self.frame_counter.write_control(data);
                if events.quarter {
                    self.clock_quarter_frame();
                }
                if events.half {
                    self.clock_half_frame();
                }
            }

            _ => {}
        }
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;

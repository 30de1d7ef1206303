//! Noise channel with its 15-bit LFSR

use crate::apu::components::{Divider, Envelope, LengthCounter};
use crate::apu::constants::{NOISE_PERIOD_TABLE_NTSC, NOISE_PERIOD_TABLE_PAL};
use crate::cartridge::Region;

/// Noise channel: pseudo-random 1-bit output shaped by the envelope
#[derive(Debug, Clone)]
pub struct NoiseChannel {
    /// Enabled flag (from $4015)
    enabled: bool,
    /// Envelope generator
    envelope: Envelope,
    /// Length counter
    pub(crate) length_counter: LengthCounter,
    /// LFSR clock divider, clocked every other CPU cycle
    divider: Divider,
    /// 15-bit linear feedback shift register, never zero
    shift_register: u16,
    /// Mode flag ($400E bit 7): tap bit 6 instead of bit 1
    mode: bool,
    /// Region for the period table
    region: Region,
}

impl NoiseChannel {
    /// Create a new noise channel
    pub fn new() -> Self {
        Self {
            enabled: false,
            envelope: Envelope::new(),
            length_counter: LengthCounter::new(),
            divider: Divider::new(),
            shift_register: 1,
            mode: false,
            region: Region::Ntsc,
        }
    }

    /// Select the region period table
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    /// $400C: length halt and envelope
    pub fn write_register_0(&mut self, data: u8) {
        self.length_counter.set_halt(data & 0x20 != 0);
        self.envelope.write_control(data);
    }

    /// $400E: mode and period select
    pub fn write_register_2(&mut self, data: u8) {
        self.mode = data & 0x80 != 0;
        let table = match self.region {
            Region::Ntsc => &NOISE_PERIOD_TABLE_NTSC,
            Region::Pal => &NOISE_PERIOD_TABLE_PAL,
        };
        self.divider.set_period(table[(data & 0x0F) as usize]);
    }

    /// $400F: length load
    ///
    /// The length counter always reloads; the $4015 enable bit only
    /// clears it and gates decrementing.
    pub fn write_register_3(&mut self, data: u8) {
        self.length_counter.load(data >> 3);
        self.envelope.restart();
    }

    /// $4015 enable bit
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length_counter.clear();
        }
    }

    /// Length counter still running (for $4015 reads)
    pub fn is_active(&self) -> bool {
        self.enabled && self.length_counter.is_active()
    }

    /// Clock the timer; on expiry, advance the LFSR
    ///
    /// Feedback is bit 0 XOR bit 1 (or bit 6 in mode 1), shifted into
    /// bit 14.
    pub fn clock_timer(&mut self) {
        if !self.divider.advance() {
            return;
        }

        let tap = if self.mode { 6 } else { 1 };
        let feedback = (self.shift_register ^ (self.shift_register >> tap)) & 0x01;
        self.shift_register = (self.shift_register >> 1) | (feedback << 14);
    }

    /// Quarter-frame clock
    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    /// Half-frame clock
    pub fn clock_length_counter(&mut self) {
        self.length_counter.clock();
    }

    /// Current sample (0 or the envelope volume)
    pub fn output(&self) -> u8 {
        if !self.is_active() || self.shift_register & 0x01 != 0 {
            0
        } else {
            self.envelope.volume()
        }
    }
}

impl Default for NoiseChannel {
    fn default() -> Self {
        Self::new()
    }
}

//! DMC (Delta Modulation Channel) for sample playback
//!
//! The channel pulls sample bytes from CPU memory one at a time. The
//! memory read itself happens on the bus (which also charges the CPU
//! the fetch stall); this type only exposes "a byte is needed at this
//! address" and "here is the byte".

use crate::apu::components::Divider;
use crate::apu::constants::{DMC_RATE_TABLE_NTSC, DMC_RATE_TABLE_PAL};
use crate::cartridge::Region;

/// DMC channel state
#[derive(Debug, Clone)]
pub struct DmcChannel {
    /// Enabled flag (from $4015)
    enabled: bool,
    /// IRQ enable flag ($4010 bit 7)
    irq_enabled: bool,
    /// Loop flag ($4010 bit 6)
    loop_flag: bool,
    /// Output-clock divider
    divider: Divider,
    /// Sample start address ($C000 + value * 64)
    sample_address: u16,
    /// Sample length (value * 16 + 1 bytes)
    sample_length: u16,
    /// Address of the next byte to fetch
    current_address: u16,
    /// Bytes left in the current sample
    bytes_remaining: u16,
    /// One-byte sample buffer
    sample_buffer: u8,
    /// Buffer holds no data
    sample_buffer_empty: bool,
    /// Output shift register
    shift_register: u8,
    /// Bits left in the shift register
    bits_remaining: u8,
    /// 7-bit output level (0-127)
    output_level: u8,
    /// Silence flag: buffer ran dry
    silence: bool,
    /// IRQ pending flag
    irq_flag: bool,
    /// Region for the rate table
    region: Region,
}

impl DmcChannel {
    /// Create a new DMC channel
    pub fn new() -> Self {
        Self {
            enabled: false,
            irq_enabled: false,
            loop_flag: false,
            divider: Divider::new(),
            sample_address: 0xC000,
            sample_length: 0,
            current_address: 0xC000,
            bytes_remaining: 0,
            sample_buffer: 0,
            sample_buffer_empty: true,
            shift_register: 0,
            bits_remaining: 0,
            output_level: 0,
            silence: true,
            irq_flag: false,
            region: Region::Ntsc,
        }
    }

    /// Select the region rate table
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    /// $4010: IRQ enable, loop, rate select
    pub fn write_register_0(&mut self, data: u8) {
        self.irq_enabled = data & 0x80 != 0;
        self.loop_flag = data & 0x40 != 0;
        if !self.irq_enabled {
            self.irq_flag = false;
        }

        let table = match self.region {
            Region::Ntsc => &DMC_RATE_TABLE_NTSC,
            Region::Pal => &DMC_RATE_TABLE_PAL,
        };
        self.divider.set_period(table[(data & 0x0F) as usize]);
    }

    /// $4011: direct output level load (7 bits)
    pub fn write_register_1(&mut self, data: u8) {
        self.output_level = data & 0x7F;
    }

    /// $4012: sample start address
    pub fn write_register_2(&mut self, data: u8) {
        self.sample_address = 0xC000 + ((data as u16) << 6);
    }

    /// $4013: sample length
    pub fn write_register_3(&mut self, data: u8) {
        self.sample_length = ((data as u16) << 4) + 1;
    }

    /// $4015 enable bit
    ///
    /// Disabling drops the rest of the sample; enabling restarts it
    /// if it had finished.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.bytes_remaining = 0;
        } else if self.bytes_remaining == 0 {
            self.restart_sample();
        }
    }

    /// Acknowledge the DMC IRQ ($4015 write)
    pub fn clear_irq(&mut self) {
        self.irq_flag = false;
    }

    fn restart_sample(&mut self) {
        self.current_address = self.sample_address;
        self.bytes_remaining = self.sample_length;
    }

    /// Bytes remain in the current sample (for $4015 reads)
    pub fn is_active(&self) -> bool {
        self.bytes_remaining > 0
    }

    /// Whether the DMC IRQ flag is raised
    pub fn irq_pending(&self) -> bool {
        self.irq_flag
    }

    /// Address to fetch from, when the buffer needs a byte
    pub fn needs_sample_read(&self) -> Option<u16> {
        if self.sample_buffer_empty && self.bytes_remaining > 0 {
            Some(self.current_address)
        } else {
            None
        }
    }

    /// Deliver a fetched sample byte
    ///
    /// Advances the address (wrapping from $FFFF back to $8000) and,
    /// at the end of the sample, either loops or raises the IRQ.
    pub fn load_sample_byte(&mut self, byte: u8) {
        if self.bytes_remaining == 0 {
            return;
        }

        self.sample_buffer = byte;
        self.sample_buffer_empty = false;

        self.current_address = self.current_address.wrapping_add(1);
        if self.current_address == 0x0000 {
            self.current_address = 0x8000;
        }

        self.bytes_remaining -= 1;
        if self.bytes_remaining == 0 {
            if self.loop_flag {
                self.restart_sample();
            } else if self.irq_enabled {
                self.irq_flag = true;
            }
        }
    }

    /// Clock the timer (every CPU cycle)
    pub fn clock_timer(&mut self) {
        if self.divider.advance() {
            self.clock_output_unit();
        }
    }

    /// One output-unit clock: emit one delta bit
    fn clock_output_unit(&mut self) {
        if self.bits_remaining == 0 {
            self.bits_remaining = 8;
            if self.sample_buffer_empty {
                self.silence = true;
            } else {
                self.silence = false;
                self.shift_register = self.sample_buffer;
                self.sample_buffer_empty = true;
            }
        }

        if !self.silence {
            if self.shift_register & 0x01 != 0 {
                if self.output_level <= 125 {
                    self.output_level += 2;
                }
            } else if self.output_level >= 2 {
                self.output_level -= 2;
            }
        }

        self.shift_register >>= 1;
        self.bits_remaining -= 1;
    }

    /// Current output level (0-127)
    pub fn output(&self) -> u8 {
        self.output_level
    }
}

impl Default for DmcChannel {
    fn default() -> Self {
        Self::new()
    }
}

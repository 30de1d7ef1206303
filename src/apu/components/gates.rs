//! Duration gates: the length counter and the triangle's linear
//! counter
//!
//! Both answer the same question for a channel ("may this keep
//! sounding?") on different clocks: the length counter ticks on half
//! frames from a table-coded start value, the linear counter on
//! quarter frames from a register-coded one.

use crate::apu::constants::LENGTH_COUNTER_TABLE;

/// Length counter: silences a channel when it reaches zero
///
/// Register writes always reload it; the $4015 enable bit clears it
/// and gates decrementing, but never blocks the load itself.
#[derive(Debug, Clone, Default)]
pub struct LengthCounter {
    /// Half-frame clocks left before the gate closes
    remaining: u8,
    /// Halt flag (channel register bit 5, or bit 7 for triangle)
    frozen: bool,
}

impl LengthCounter {
    /// Create a new, expired length counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock the counter (frame sequencer half frame)
    pub fn clock(&mut self) {
        if self.frozen || self.remaining == 0 {
            return;
        }
        self.remaining -= 1;
    }

    /// Reload from the 32-entry length table
    pub fn load(&mut self, index: u8) {
        self.remaining = LENGTH_COUNTER_TABLE[(index & 0x1F) as usize];
    }

    /// Whether the counter still gates sound on
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Force the counter to zero ($4015 channel disable)
    pub fn clear(&mut self) {
        self.remaining = 0;
    }

    /// Set the halt flag
    pub fn set_halt(&mut self, halt: bool) {
        self.frozen = halt;
    }
}

/// Linear counter: the triangle's finer-grained duration gate
///
/// Holds the raw $4008 byte (bit 7 control, bits 0-6 reload value)
/// and a reload request set by $400B writes. While the control bit
/// is high the request survives every clock, pinning the counter at
/// its reload value.
#[derive(Debug, Clone, Default)]
pub struct LinearCounter {
    /// Raw $4008 register byte
    control: u8,
    /// Quarter-frame clocks left before the gate closes
    remaining: u8,
    /// Reload on the next clock
    reload_queued: bool,
}

impl LinearCounter {
    /// Create a new, expired linear counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock the counter (frame sequencer quarter frame)
    pub fn clock(&mut self) {
        if self.reload_queued {
            self.remaining = self.control & 0x7F;
        } else if self.remaining > 0 {
            self.remaining -= 1;
        }

        if self.control & 0x80 == 0 {
            self.reload_queued = false;
        }
    }

    /// Latch the control register ($4008)
    pub fn write_control(&mut self, data: u8) {
        self.control = data;
    }

    /// Request a reload ($400B write)
    pub fn queue_reload(&mut self) {
        self.reload_queued = true;
    }

    /// Whether the counter still gates sound on
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }
}

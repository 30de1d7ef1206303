//! Triangle wave channel

use crate::apu::components::{Divider, LengthCounter, LinearCounter};
use crate::apu::constants::TRIANGLE_SEQUENCE;

/// Triangle channel: a 32-step wavetable gated by both the length
/// counter and the linear counter
#[derive(Debug, Clone)]
pub struct TriangleChannel {
    /// Enabled flag (from $4015)
    enabled: bool,
    /// Linear counter (quarter-frame gate)
    linear_counter: LinearCounter,
    /// Length counter (half-frame gate)
    pub(crate) length_counter: LengthCounter,
    /// Sequencer clock divider, clocked every CPU cycle
    pub(crate) divider: Divider,
    /// Position in the 32-step sequence
    sequence_position: u8,
}

impl TriangleChannel {
    /// Create a new triangle channel
    pub fn new() -> Self {
        Self {
            enabled: false,
            linear_counter: LinearCounter::new(),
            length_counter: LengthCounter::new(),
            divider: Divider::new(),
            sequence_position: 0,
        }
    }

    /// $4008: linear counter control (bit 7 doubles as length halt)
    pub fn write_register_0(&mut self, data: u8) {
        self.length_counter.set_halt(data & 0x80 != 0);
        self.linear_counter.write_control(data);
    }

    /// $400A: timer low byte
    pub fn write_register_2(&mut self, data: u8) {
        self.divider.set_low(data);
    }

    /// $400B: length load, timer high, linear reload request
    ///
    /// The length counter always reloads; the $4015 enable bit only
    /// clears it and gates decrementing.
    pub fn write_register_3(&mut self, data: u8) {
        self.divider.set_high(data & 0x07);
        self.length_counter.load(data >> 3);
        self.linear_counter.queue_reload();
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

    /// Clock the timer (every CPU cycle)
    ///
    /// The sequencer only advances while both gates are open, which
    /// freezes the output level instead of snapping it to zero.
    pub fn clock_timer(&mut self) {
        if self.linear_counter.is_active()
            && self.length_counter.is_active()
            && self.divider.advance()
        {
            self.sequence_position = (self.sequence_position + 1) & 0x1F;
        }
    }

    /// Quarter-frame clock
    pub fn clock_linear_counter(&mut self) {
        self.linear_counter.clock();
    }

    /// Half-frame clock
    pub fn clock_length_counter(&mut self) {
        self.length_counter.clock();
    }

    /// Current sample (0-15)
    ///
    /// Periods below 2 produce an ultrasonic tone on hardware; they
    /// are silenced here to avoid aliasing artifacts.
    pub fn output(&self) -> u8 {
        if !self.enabled
            || !self.linear_counter.is_active()
            || !self.length_counter.is_active()
            || self.divider.period() < 2
        {
            return 0;
        }

        TRIANGLE_SEQUENCE[self.sequence_position as usize]
    }
}

impl Default for TriangleChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed_on_triangle() -> TriangleChannel {
        let mut tri = TriangleChannel::new();
        tri.set_enabled(true);
        tri.write_register_0(0x7F); // linear reload 127
        tri.write_register_2(0x80);
        tri.write_register_3(0x08); // length + reload flag
        tri.clock_linear_counter(); // latch the linear counter
        tri
    }

    #[test]
    fn test_sequence_walks_down_then_up() {
        let mut tri = keyed_on_triangle();

        let mut seen = Vec::new();
        for _ in 0..(0x81 * 32) {
            tri.clock_timer();
            seen.push(tri.output());
        }
        assert!(seen.contains(&15));
        assert!(seen.contains(&0));
    }

    #[test]
    fn test_muted_when_linear_counter_expired() {
        let mut tri = TriangleChannel::new();
        tri.set_enabled(true);
        tri.write_register_0(0x00); // linear reload 0
        tri.write_register_3(0x08);
        tri.clock_linear_counter();
        assert_eq!(tri.output(), 0);
    }

    #[test]
    fn test_length_loads_while_disabled() {
        let mut tri = TriangleChannel::new();
        tri.write_register_3(0x08);
        assert!(
            tri.length_counter.is_active(),
            "the length counter reloads regardless of the enable bit"
        );
    }

    #[test]
    fn test_ultrasonic_period_is_silenced() {
        let mut tri = keyed_on_triangle();
        tri.write_register_2(0x01);
        tri.write_register_3(0x08); // period high bits 0
        assert_eq!(tri.output(), 0, "period < 2 mutes the channel");
    }

    #[test]
    fn test_sequencer_freezes_when_gated() {
        let mut tri = keyed_on_triangle();
        for _ in 0..0x90 {
            tri.clock_timer();
        }
        let frozen = tri.sequence_position;

        tri.set_enabled(false);
        for _ in 0..0x200 {
            tri.clock_timer();
        }
        assert_eq!(
            tri.sequence_position, frozen,
            "gated sequencer must not advance"
        );
    }
}

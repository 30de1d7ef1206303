//! Frame counter driving the APU's low-frequency clocks
//!
//! A divider over the CPU clock that emits quarter-frame events
//! (envelopes, linear counter) and half-frame events (length
//! counters, sweeps) on a fixed schedule, with an IRQ at the end of
//! the 4-step sequence.

use crate::apu::constants::{
    FRAME_PERIOD_4_NTSC, FRAME_PERIOD_4_PAL, FRAME_PERIOD_5_NTSC, FRAME_PERIOD_5_PAL,
    FRAME_STEPS_4_NTSC, FRAME_STEPS_4_PAL, FRAME_STEPS_5_NTSC, FRAME_STEPS_5_PAL,
};
use crate::cartridge::Region;

/// Frame counter sequencer mode ($4017 bit 7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// 4-step mode (default): IRQ at the end of the sequence
    FourStep,
    /// 5-step mode: longer sequence, no IRQ
    FiveStep,
}

/// Events produced by one frame counter clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameEvents {
    /// Clock envelopes and the triangle linear counter
    pub quarter: bool,
    /// Clock length counters and sweeps (implies quarter)
    pub half: bool,
}

impl FrameEvents {
    const NONE: FrameEvents = FrameEvents {
        quarter: false,
        half: false,
    };

    const QUARTER: FrameEvents = FrameEvents {
        quarter: true,
        half: false,
    };

    const HALF: FrameEvents = FrameEvents {
        quarter: true,
        half: true,
    };
}

/// Frame counter state
#[derive(Debug, Clone)]
pub struct FrameCounter {
    /// Sequencer mode
    mode: FrameMode,
    /// Console region (selects the cycle schedule)
    region: Region,
    /// CPU cycles into the current sequence
    cycle: u32,
    /// IRQ inhibit flag ($4017 bit 6)
    irq_inhibit: bool,
    /// Frame interrupt flag
    irq_pending: bool,
}

impl FrameCounter {
    /// Create a new frame counter in 4-step NTSC mode
    pub fn new() -> Self {
        Self {
            mode: FrameMode::FourStep,
            region: Region::Ntsc,
            cycle: 0,
            irq_inhibit: false,
            irq_pending: false,
        }
    }

    /// Reset to the power-on state, keeping the region
    pub fn reset(&mut self) {
        self.mode = FrameMode::FourStep;
        self.cycle = 0;
        self.irq_inhibit = false;
        self.irq_pending = false;
    }

    /// Select NTSC or PAL scheduling
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    /// The event schedule and wrap point for the current mode
    fn schedule(&self) -> (&'static [u32; 4], u32) {
        match (self.region, self.mode) {
            (Region::Ntsc, FrameMode::FourStep) => (&FRAME_STEPS_4_NTSC, FRAME_PERIOD_4_NTSC),
            (Region::Ntsc, FrameMode::FiveStep) => (&FRAME_STEPS_5_NTSC, FRAME_PERIOD_5_NTSC),
            (Region::Pal, FrameMode::FourStep) => (&FRAME_STEPS_4_PAL, FRAME_PERIOD_4_PAL),
            (Region::Pal, FrameMode::FiveStep) => (&FRAME_STEPS_5_PAL, FRAME_PERIOD_5_PAL),
        }
    }

    /// Write $4017
    ///
    /// Resets the sequence. A write with bit 7 set clocks both
    /// quarter and half frame units immediately; setting bit 6 clears
    /// any pending frame IRQ.
    pub fn write_control(&mut self, value: u8) -> FrameEvents {
        self.mode = if value & 0x80 != 0 {
            FrameMode::FiveStep
        } else {
            FrameMode::FourStep
        };
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.irq_pending = false;
        }

        self.cycle = 0;

        if self.mode == FrameMode::FiveStep {
            FrameEvents::HALF
        } else {
            FrameEvents::NONE
        }
    }

    /// Advance one CPU cycle
    pub fn clock(&mut self) -> FrameEvents {
        self.cycle += 1;

        let (steps, period) = self.schedule();
        let mut events = FrameEvents::NONE;

        if self.cycle == steps[0] || self.cycle == steps[2] {
            events = FrameEvents::QUARTER;
        } else if self.cycle == steps[1] || self.cycle == steps[3] {
            events = FrameEvents::HALF;
            // The final half-frame of the 4-step sequence raises IRQ
            if self.mode == FrameMode::FourStep
                && self.cycle == steps[3]
                && !self.irq_inhibit
            {
                self.irq_pending = true;
            }
        }

        if self.cycle >= period {
            self.cycle = 0;
        }

        events
    }

    /// Whether the frame IRQ flag is raised
    pub fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    /// Clear the frame IRQ flag ($4015 read)
    pub fn clear_irq(&mut self) {
        self.irq_pending = false;
    }

    /// Current mode
    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    /// Whether IRQs are inhibited
    pub fn irq_inhibited(&self) -> bool {
        self.irq_inhibit
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}

// Flag manipulation instructions
//
// CLI and SEI change the status I bit immediately, but the value used
// for IRQ recognition lags one instruction behind (the latency window
// managed by the core).

use crate::cpu::flags;

impl crate::cpu::Cpu {
    /// CLC - Clear Carry Flag
    pub fn clc(&mut self) {
        self.clear_flag(flags::CARRY);
    }

    /// SEC - Set Carry Flag
    pub fn sec(&mut self) {
        self.set_flag(flags::CARRY);
    }

    /// CLD - Clear Decimal Flag (no effect on arithmetic on the 2A03)
    pub fn cld(&mut self) {
        self.clear_flag(flags::DECIMAL);
    }

    /// SED - Set Decimal Flag (no effect on arithmetic on the 2A03)
    pub fn sed(&mut self) {
        self.set_flag(flags::DECIMAL);
    }

    /// CLI - Clear Interrupt Disable
    pub fn cli(&mut self) {
        self.clear_flag(flags::INTERRUPT_DISABLE);
        self.begin_inhibit_latency(false);
    }

    /// SEI - Set Interrupt Disable
    pub fn sei(&mut self) {
        self.set_flag(flags::INTERRUPT_DISABLE);
        self.begin_inhibit_latency(true);
    }

    /// CLV - Clear Overflow Flag
    pub fn clv(&mut self) {
        self.clear_flag(flags::OVERFLOW);
    }
}

// Stack instructions

use crate::bus::Bus;
use crate::cpu::flags;

impl crate::cpu::Cpu {
    /// PHA - Push Accumulator
    pub fn pha(&mut self, bus: &mut Bus) {
        self.stack_push(bus, self.a);
    }

    /// PLA - Pull Accumulator
    ///
    /// Flags affected: Z, N
    pub fn pla(&mut self, bus: &mut Bus) {
        self.a = self.stack_pop(bus);
        self.update_zero_and_negative_flags(self.a);
    }

    /// PHP - Push Processor Status
    ///
    /// The pushed copy always has B and U set (0x30), regardless of
    /// the live flags.
    pub fn php(&mut self, bus: &mut Bus) {
        let pushed = self.status | flags::BREAK | flags::UNUSED;
        self.stack_push(bus, pushed);
    }

    /// PLP - Pull Processor Status
    ///
    /// The pulled B and U bits are discarded; the live values are
    /// kept. A change to I goes through the one-instruction
    /// interrupt-disable latency window.
    pub fn plp(&mut self, bus: &mut Bus) {
        let pulled = self.stack_pop(bus);
        let keep = self.status & (flags::BREAK | flags::UNUSED);
        self.status = (pulled & !(flags::BREAK | flags::UNUSED)) | keep;
        self.begin_inhibit_latency(self.get_flag(flags::INTERRUPT_DISABLE));
    }

    /// TXS - Transfer X to Stack Pointer (no flags)
    pub fn txs(&mut self) {
        self.sp = self.x;
    }

    /// TSX - Transfer Stack Pointer to X
    ///
    /// Flags affected: Z, N
    pub fn tsx(&mut self) {
        self.x = self.sp;
        self.update_zero_and_negative_flags(self.x);
    }
}

// BRK, RTI, and NOP

use crate::bus::Bus;
use crate::cpu::{flags, vectors};

impl crate::cpu::Cpu {
    /// BRK - Force Interrupt
    ///
    /// Pushes the address two bytes past the BRK opcode (BRK has a
    /// padding byte), then status with B set, sets I, and jumps
    /// through $FFFE. If an NMI was latched while BRK is executing,
    /// the NMI vector wins and the NMI is consumed ("BRK hijacking").
    pub fn brk(&mut self, bus: &mut Bus) {
        let return_addr = self.pc.wrapping_add(1);
        self.stack_push_u16(bus, return_addr);

        let pushed = self.status | flags::BREAK | flags::UNUSED;
        self.stack_push(bus, pushed);

        self.set_flag(flags::INTERRUPT_DISABLE);
        self.sync_inhibit();

        let vector = if self.nmi_pending() {
            self.consume_nmi_for_brk();
            vectors::NMI
        } else {
            vectors::IRQ
        };

        let lo = bus.read(vector) as u16;
        let hi = bus.read(vector.wrapping_add(1)) as u16;
        self.pc = (hi << 8) | lo;
    }

    /// RTI - Return from Interrupt
    ///
    /// Pops status (discarding the pushed B/U bits) and PC as-is.
    /// The interrupt-disable line follows the popped I bit with no
    /// latency window.
    pub fn rti(&mut self, bus: &mut Bus) {
        let pulled = self.stack_pop(bus);
        let keep = self.status & (flags::BREAK | flags::UNUSED);
        self.status = (pulled & !(flags::BREAK | flags::UNUSED)) | keep;
        self.sync_inhibit();
        self.leave_nmi();

        self.pc = self.stack_pop_u16(bus);
    }

    /// NOP - No Operation
    ///
    /// Covers the official $EA and the unofficial multi-byte NOPs;
    /// operand fetches already happened in the addressing stage.
    pub fn nop(&mut self) {}
}

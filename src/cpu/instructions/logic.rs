// Logical instructions: AND, ORA, EOR, BIT

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::flags;

impl crate::cpu::Cpu {
    /// AND - Logical AND with Accumulator
    ///
    /// Flags affected: Z, N
    pub fn and(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.a &= self.read_operand(bus, addr_result);
        self.update_zero_and_negative_flags(self.a);
    }

    /// ORA - Logical OR with Accumulator
    ///
    /// Flags affected: Z, N
    pub fn ora(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.a |= self.read_operand(bus, addr_result);
        self.update_zero_and_negative_flags(self.a);
    }

    /// EOR - Exclusive OR with Accumulator
    ///
    /// Flags affected: Z, N
    pub fn eor(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.a ^= self.read_operand(bus, addr_result);
        self.update_zero_and_negative_flags(self.a);
    }

    /// BIT - Bit Test
    ///
    /// Z from A AND M; N and V copied from bits 7 and 6 of the
    /// operand. A is not modified.
    pub fn bit(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.set_zero(self.a & value == 0);
        self.update_flag(flags::NEGATIVE, value & 0x80 != 0);
        self.update_flag(flags::OVERFLOW, value & 0x40 != 0);
    }
}

// Arithmetic instructions: add, subtract, increment, decrement

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;

impl crate::cpu::Cpu {
    /// Shared add core used by ADC, SBC, and RRA
    ///
    /// Overflow is set when both operands share a sign and the result
    /// does not: `(A ^ result) & (operand ^ result) & 0x80`. Decimal
    /// mode is absent on the 2A03, so D is ignored.
    pub(crate) fn add_with_carry(&mut self, operand: u8) {
        let a = self.a as u16;
        let value = operand as u16;
        let carry = self.get_carry() as u16;

        let sum = a + value + carry;
        let result = sum as u8;

        self.set_carry(sum > 0xFF);
        self.set_overflow((self.a ^ result) & (operand ^ result) & 0x80 != 0);
        self.a = result;
        self.update_zero_and_negative_flags(result);
    }

    /// ADC - Add with Carry
    ///
    /// Flags affected: C, V, Z, N
    pub fn adc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.add_with_carry(value);
    }

    /// SBC - Subtract with Carry
    ///
    /// A - M - (1-C), implemented as ADC of the operand's complement.
    /// Flags affected: C, V, Z, N
    pub fn sbc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.add_with_carry(value ^ 0xFF);
    }

    /// INC - Increment Memory
    ///
    /// Flags affected: Z, N
    pub fn inc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = bus.read(addr_result.address).wrapping_add(1);
        bus.write(addr_result.address, value);
        self.update_zero_and_negative_flags(value);
    }

    /// DEC - Decrement Memory
    ///
    /// Flags affected: Z, N
    pub fn dec(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = bus.read(addr_result.address).wrapping_sub(1);
        bus.write(addr_result.address, value);
        self.update_zero_and_negative_flags(value);
    }

    /// INX - Increment X Register
    pub fn inx(&mut self) {
        self.x = self.x.wrapping_add(1);
        self.update_zero_and_negative_flags(self.x);
    }

    /// INY - Increment Y Register
    pub fn iny(&mut self) {
        self.y = self.y.wrapping_add(1);
        self.update_zero_and_negative_flags(self.y);
    }

    /// DEX - Decrement X Register
    pub fn dex(&mut self) {
        self.x = self.x.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.x);
    }

    /// DEY - Decrement Y Register
    pub fn dey(&mut self) {
        self.y = self.y.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.y);
    }
}

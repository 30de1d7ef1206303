// Shift and rotate instructions

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;

impl crate::cpu::Cpu {
    /// ASL - Arithmetic Shift Left
    ///
    /// Bit 7 goes to carry, 0 shifts in. Flags: C, Z, N
    pub fn asl(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let result = value << 1;

        self.set_carry(value & 0x80 != 0);
        self.update_zero_and_negative_flags(result);
        self.write_result(bus, addr_result, result);
    }

    /// LSR - Logical Shift Right
    ///
    /// Bit 0 goes to carry, 0 shifts in. Flags: C, Z, N (N always 0)
    pub fn lsr(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let result = value >> 1;

        self.set_carry(value & 0x01 != 0);
        self.update_zero_and_negative_flags(result);
        self.write_result(bus, addr_result, result);
    }

    /// ROL - Rotate Left through Carry
    ///
    /// Flags: C, Z, N
    pub fn rol(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let result = (value << 1) | self.get_carry() as u8;

        self.set_carry(value & 0x80 != 0);
        self.update_zero_and_negative_flags(result);
        self.write_result(bus, addr_result, result);
    }

    /// ROR - Rotate Right through Carry
    ///
    /// Flags: C, Z, N
    pub fn ror(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let result = (value >> 1) | ((self.get_carry() as u8) << 7);

        self.set_carry(value & 0x01 != 0);
        self.update_zero_and_negative_flags(result);
        self.write_result(bus, addr_result, result);
    }
}

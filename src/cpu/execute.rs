// CPU execution and trace logging module

use crate::bus::Bus;
use crate::cpu::addressing::{AddressingMode, AddressingResult};
use crate::cpu::opcodes::{OpcodeInfo, OPCODE_TABLE};
use crate::cpu::Cpu;

impl Cpu {
    /// Fetch, decode, and execute the instruction at PC
    ///
    /// Returns the cycle count: base cost from the decode table, plus
    /// the page-cross penalty for read instructions and any branch
    /// penalty reported by the handler.
    pub(crate) fn execute_next(&mut self, bus: &mut Bus) -> u32 {
        let opcode_pc = self.pc;
        let opcode = bus.read(self.pc);
        let opcode_info = &OPCODE_TABLE[opcode as usize];

        self.pc = self.pc.wrapping_add(1);

        let addr_result = match opcode_info.mode {
            AddressingMode::Implied => self.addr_implied(),
            AddressingMode::Accumulator => self.addr_accumulator(),
            AddressingMode::Immediate => self.addr_immediate(bus),
            AddressingMode::ZeroPage => self.addr_zero_page(bus),
            AddressingMode::ZeroPageX => self.addr_zero_page_x(bus),
            AddressingMode::ZeroPageY => self.addr_zero_page_y(bus),
            AddressingMode::Relative => self.addr_relative(bus),
            AddressingMode::Absolute => self.addr_absolute(bus),
            AddressingMode::AbsoluteX => self.addr_absolute_x(bus),
            AddressingMode::AbsoluteY => self.addr_absolute_y(bus),
            AddressingMode::Indirect => self.addr_indirect(bus),
            AddressingMode::IndexedIndirect => self.addr_indexed_indirect(bus),
            AddressingMode::IndirectIndexed => self.addr_indirect_indexed(bus),
        };

        let extra_cycles = self.execute_instruction(opcode, opcode_pc, &addr_result, bus);

        let mut cycles = opcode_info.cycles as u32;
        if opcode_info.page_cycle && addr_result.page_crossed {
            cycles += 1;
        }
        cycles + extra_cycles as u32
    }

    /// Dispatch a decoded instruction
    ///
    /// Returns extra cycles (branches only).
    #[allow(clippy::too_many_lines)]
    fn execute_instruction(
        &mut self,
        opcode: u8,
        opcode_pc: u16,
        addr_result: &AddressingResult,
        bus: &mut Bus,
    ) -> u8 {
        match opcode {
            // Load/Store instructions
            0xA9 | 0xA5 | 0xB5 | 0xAD | 0xBD | 0xB9 | 0xA1 | 0xB1 => self.lda(bus, addr_result),
            0xA2 | 0xA6 | 0xB6 | 0xAE | 0xBE => self.ldx(bus, addr_result),
            0xA0 | 0xA4 | 0xB4 | 0xAC | 0xBC => self.ldy(bus, addr_result),
            0x85 | 0x95 | 0x8D | 0x9D | 0x99 | 0x81 | 0x91 => self.sta(bus, addr_result),
            0x86 | 0x96 | 0x8E => self.stx(bus, addr_result),
            0x84 | 0x94 | 0x8C => self.sty(bus, addr_result),

            // Arithmetic instructions
            0x69 | 0x65 | 0x75 | 0x6D | 0x7D | 0x79 | 0x61 | 0x71 => self.adc(bus, addr_result),
            0xE9 | 0xE5 | 0xF5 | 0xED | 0xFD | 0xF9 | 0xE1 | 0xF1 | 0xEB => {
                self.sbc(bus, addr_result)
            }
            0xE6 | 0xF6 | 0xEE | 0xFE => self.inc(bus, addr_result),
            0xE8 => self.inx(),
            0xC8 => self.iny(),
            0xC6 | 0xD6 | 0xCE | 0xDE => self.dec(bus, addr_result),
            0xCA => self.dex(),
            0x88 => self.dey(),

            // Logical instructions
            0x29 | 0x25 | 0x35 | 0x2D | 0x3D | 0x39 | 0x21 | 0x31 => self.and(bus, addr_result),
            0x09 | 0x05 | 0x15 | 0x0D | 0x1D | 0x19 | 0x01 | 0x11 => self.ora(bus, addr_result),
            0x49 | 0x45 | 0x55 | 0x4D | 0x5D | 0x59 | 0x41 | 0x51 => self.eor(bus, addr_result),
            0x24 | 0x2C => self.bit(bus, addr_result),

            // Shift/Rotate instructions
            0x0A | 0x06 | 0x16 | 0x0E | 0x1E => self.asl(bus, addr_result),
            0x4A | 0x46 | 0x56 | 0x4E | 0x5E => self.lsr(bus, addr_result),
            0x2A | 0x26 | 0x36 | 0x2E | 0x3E => self.rol(bus, addr_result),
            0x6A | 0x66 | 0x76 | 0x6E | 0x7E => self.ror(bus, addr_result),

            // Compare instructions
            0xC9 | 0xC5 | 0xD5 | 0xCD | 0xDD | 0xD9 | 0xC1 | 0xD1 => self.cmp(bus, addr_result),
            0xE0 | 0xE4 | 0xEC => self.cpx(bus, addr_result),
            0xC0 | 0xC4 | 0xCC => self.cpy(bus, addr_result),

            // Branch instructions (return extra cycles)
            0x90 => return self.bcc(addr_result),
            0xB0 => return self.bcs(addr_result),
            0xF0 => return self.beq(addr_result),
            0x30 => return self.bmi(addr_result),
            0xD0 => return self.bne(addr_result),
            0x10 => return self.bpl(addr_result),
            0x50 => return self.bvc(addr_result),
            0x70 => return self.bvs(addr_result),

            // Jump/Subroutine instructions
            0x4C | 0x6C => self.jmp(addr_result),
            0x20 => self.jsr(bus, addr_result),
            0x60 => self.rts(bus),

            // Stack instructions
            0x48 => self.pha(bus),
            0x68 => self.pla(bus),
            0x08 => self.php(bus),
            0x28 => self.plp(bus),
            0x9A => self.txs(),
            0xBA => self.tsx(),

            // Transfer instructions
            0xAA => self.tax(),
            0xA8 => self.tay(),
            0x8A => self.txa(),
            0x98 => self.tya(),

            // Flag instructions
            0x18 => self.clc(),
            0xD8 => self.cld(),
            0x58 => self.cli(),
            0xB8 => self.clv(),
            0x38 => self.sec(),
            0xF8 => self.sed(),
            0x78 => self.sei(),

            // Miscellaneous instructions
            0x00 => self.brk(bus),
            0x40 => self.rti(bus),
            0xEA => self.nop(),

            // Unofficial: combined loads/stores
            0xA7 | 0xB7 | 0xAF | 0xBF | 0xA3 | 0xB3 | 0xAB => self.lax(bus, addr_result),
            0x87 | 0x97 | 0x8F | 0x83 => self.sax(bus, addr_result),

            // Unofficial: RMW + ALU fusions
            0xC7 | 0xD7 | 0xCF | 0xDF | 0xDB | 0xC3 | 0xD3 => self.dcp(bus, addr_result),
            0xE7 | 0xF7 | 0xEF | 0xFF | 0xFB | 0xE3 | 0xF3 => self.isb(bus, addr_result),
            0x07 | 0x17 | 0x0F | 0x1F | 0x1B | 0x03 | 0x13 => self.slo(bus, addr_result),
            0x27 | 0x37 | 0x2F | 0x3F | 0x3B | 0x23 | 0x33 => self.rla(bus, addr_result),
            0x47 | 0x57 | 0x4F | 0x5F | 0x5B | 0x43 | 0x53 => self.sre(bus, addr_result),
            0x67 | 0x77 | 0x6F | 0x7F | 0x7B | 0x63 | 0x73 => self.rra(bus, addr_result),

            // Unofficial: immediate-mode oddities
            0x0B | 0x2B => self.anc(bus, addr_result),
            0x4B => self.alr(bus, addr_result),
            0x6B => self.arr(bus, addr_result),
            0xCB => self.axs(bus, addr_result),
            0x8B => self.xaa(bus, addr_result),

            // Unofficial: SP-entangled stores
            0xBB => self.las(bus, addr_result),
            0x9B => self.tas(bus, addr_result),
            0x9E => self.shx(bus, addr_result),
            0x9C => self.shy(bus, addr_result),
            0x9F | 0x93 => self.sha(bus, addr_result),

            // Unofficial NOPs with operands already consumed
            0x1A | 0x3A | 0x5A | 0x7A | 0xDA | 0xFA | 0x80 | 0x82 | 0x89 | 0xC2 | 0xE2 | 0x04
            | 0x44 | 0x64 | 0x14 | 0x34 | 0x54 | 0x74 | 0xD4 | 0xF4 | 0x0C | 0x1C | 0x3C | 0x5C
            | 0x7C | 0xDC | 0xFC => self.nop(),

            // KIL: halt the CPU with PC rewound to the opcode
            0x02 | 0x12 | 0x22 | 0x32 | 0x42 | 0x52 | 0x62 | 0x72 | 0x92 | 0xB2 | 0xD2 | 0xF2 => {
                self.jam(opcode_pc)
            }

            _ => unreachable!("all 256 opcodes are dispatched"),
        }
        0
    }

    /// Generate a trace log line in nestest format
    ///
    /// ```text
    /// C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD CYC:7
    /// ```
    ///
    /// Reads go through the silent bus path so tracing never disturbs
    /// PPU or APU register state.
    pub fn trace(&self, bus: &Bus) -> String {
        let pc = self.pc;
        let opcode = bus.read_silent(pc);
        let opcode_info = &OPCODE_TABLE[opcode as usize];

        let byte1 = opcode;
        let byte2 = bus.read_silent(pc.wrapping_add(1));
        let byte3 = bus.read_silent(pc.wrapping_add(2));

        let hex_bytes = match opcode_info.bytes {
            2 => format!("{:02X} {:02X}   ", byte1, byte2),
            3 => format!("{:02X} {:02X} {:02X}", byte1, byte2, byte3),
            _ => format!("{:02X}      ", byte1),
        };

        let disassembly = self.disassemble(bus, opcode_info, byte2, byte3);
        let marker = if opcode_info.official { ' ' } else { '*' };

        format!(
            "{:04X}  {} {}{:<32}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            pc, hex_bytes, marker, disassembly, self.a, self.x, self.y, self.status, self.sp,
            self.cycles
        )
    }

    /// Render the operand for a trace line
    fn disassemble(&self, bus: &Bus, info: &OpcodeInfo, byte2: u8, byte3: u8) -> String {
        let abs = ((byte3 as u16) << 8) | byte2 as u16;

        let operand = match info.mode {
            AddressingMode::Implied => String::new(),
            AddressingMode::Accumulator => "A".to_string(),
            AddressingMode::Immediate => format!("#${:02X}", byte2),
            AddressingMode::ZeroPage => {
                format!("${:02X} = {:02X}", byte2, bus.read_silent(byte2 as u16))
            }
            AddressingMode::ZeroPageX => format!("${:02X},X", byte2),
            AddressingMode::ZeroPageY => format!("${:02X},Y", byte2),
            AddressingMode::Relative => {
                let target = self
                    .pc
                    .wrapping_add(2)
                    .wrapping_add(byte2 as i8 as u16);
                format!("${:04X}", target)
            }
            AddressingMode::Absolute => {
                if info.name == "JMP" || info.name == "JSR" {
                    format!("${:04X}", abs)
                } else {
                    format!("${:04X} = {:02X}", abs, bus.read_silent(abs))
                }
            }
            AddressingMode::AbsoluteX => format!("${:04X},X", abs),
            AddressingMode::AbsoluteY => format!("${:04X},Y", abs),
            AddressingMode::Indirect => format!("(${:04X})", abs),
            AddressingMode::IndexedIndirect => format!("(${:02X},X)", byte2),
            AddressingMode::IndirectIndexed => format!("(${:02X}),Y", byte2),
        };

        if operand.is_empty() {
            info.name.to_string()
        } else {
            format!("{} {}", info.name, operand)
        }
    }
}

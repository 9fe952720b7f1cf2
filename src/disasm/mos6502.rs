use super::{DecodeError, DecodeResult, Disassembler, Endianness, OpcodeInfo, decode_entry};
use crate::instruction::{InstructionType, NamingConvention, am::AddrMode};

/// Decoder for the documented NMOS 6502 instruction set.
#[derive(Debug, Clone, Default)]
pub struct Mos6502Disassembler {
    state: (),
}

impl Mos6502Disassembler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Disassembler for Mos6502Disassembler {
    type State = ();

    fn architecture_name(&self) -> &'static str {
        "6502"
    }

    fn endianness(&self) -> Endianness {
        Endianness::Little
    }

    fn max_instruction_len(&self) -> usize {
        3
    }

    fn state(&self) -> &() {
        &self.state
    }

    fn set_state(&mut self, state: ()) {
        self.state = state;
    }

    fn decode_next(&mut self, bytes: &[u8], address: u64) -> DecodeResult {
        let Some(&opcode) = bytes.first() else {
            return DecodeResult::need_more_bytes(1);
        };
        let Some(info) = OPCODES[opcode as usize] else {
            log::trace!("{address:06X}: undocumented opcode {opcode:02X}");
            return DecodeResult::Error(DecodeError::UnknownOpcode { opcode, address });
        };
        // no 16-bit registers on this cpu
        let len = info.len(true, true);
        decode_entry(info, len, bytes, address, NamingConvention::Regular)
    }
}

const fn table(entries: &[(u8, InstructionType, AddrMode)]) -> [Option<OpcodeInfo>; 256] {
    let mut t = [None; 256];
    let mut i = 0;
    while i < entries.len() {
        let (opcode, ty, mode) = entries[i];
        t[opcode as usize] = Some(OpcodeInfo::new(ty, mode));
        i += 1;
    }
    t
}

#[rustfmt::skip]
static OPCODES: [Option<OpcodeInfo>; 256] = {
    use {AddrMode::*, InstructionType::*};
    table(&[
        (0x69, Adc, Imm), (0x65, Adc, D), (0x75, Adc, Dx), (0x6d, Adc, A),
        (0x7d, Adc, Ax), (0x79, Adc, Ay), (0x61, Adc, Dxi), (0x71, Adc, Diy),
        (0x29, And, Imm), (0x25, And, D), (0x35, And, Dx), (0x2d, And, A),
        (0x3d, And, Ax), (0x39, And, Ay), (0x21, And, Dxi), (0x31, And, Diy),
        (0x0a, Asl, Acc), (0x06, Asl, D), (0x16, Asl, Dx), (0x0e, Asl, A), (0x1e, Asl, Ax),
        (0x90, Bcc, Rel), (0xb0, Bcs, Rel), (0xf0, Beq, Rel), (0x30, Bmi, Rel),
        (0xd0, Bne, Rel), (0x10, Bpl, Rel), (0x50, Bvc, Rel), (0x70, Bvs, Rel),
        (0x24, Bit, D), (0x2c, Bit, A),
        (0x00, Brk, Imp),
        (0x18, Clc, Imp), (0xd8, Cld, Imp), (0x58, Cli, Imp), (0xb8, Clv, Imp),
        (0xc9, Cmp, Imm), (0xc5, Cmp, D), (0xd5, Cmp, Dx), (0xcd, Cmp, A),
        (0xdd, Cmp, Ax), (0xd9, Cmp, Ay), (0xc1, Cmp, Dxi), (0xd1, Cmp, Diy),
        (0xe0, Cpx, Imm), (0xe4, Cpx, D), (0xec, Cpx, A),
        (0xc0, Cpy, Imm), (0xc4, Cpy, D), (0xcc, Cpy, A),
        (0xc6, Dec, D), (0xd6, Dec, Dx), (0xce, Dec, A), (0xde, Dec, Ax),
        (0xca, Dex, Imp), (0x88, Dey, Imp),
        (0x49, Eor, Imm), (0x45, Eor, D), (0x55, Eor, Dx), (0x4d, Eor, A),
        (0x5d, Eor, Ax), (0x59, Eor, Ay), (0x41, Eor, Dxi), (0x51, Eor, Diy),
        (0xe6, Inc, D), (0xf6, Inc, Dx), (0xee, Inc, A), (0xfe, Inc, Ax),
        (0xe8, Inx, Imp), (0xc8, Iny, Imp),
        (0x4c, Jmp, A), (0x6c, Jmp, Ai),
        (0x20, Jsr, A),
        (0xa9, Lda, Imm), (0xa5, Lda, D), (0xb5, Lda, Dx), (0xad, Lda, A),
        (0xbd, Lda, Ax), (0xb9, Lda, Ay), (0xa1, Lda, Dxi), (0xb1, Lda, Diy),
        (0xa2, Ldx, Imm), (0xa6, Ldx, D), (0xb6, Ldx, Dy), (0xae, Ldx, A), (0xbe, Ldx, Ay),
        (0xa0, Ldy, Imm), (0xa4, Ldy, D), (0xb4, Ldy, Dx), (0xac, Ldy, A), (0xbc, Ldy, Ax),
        (0x4a, Lsr, Acc), (0x46, Lsr, D), (0x56, Lsr, Dx), (0x4e, Lsr, A), (0x5e, Lsr, Ax),
        (0xea, Nop, Imp),
        (0x09, Ora, Imm), (0x05, Ora, D), (0x15, Ora, Dx), (0x0d, Ora, A),
        (0x1d, Ora, Ax), (0x19, Ora, Ay), (0x01, Ora, Dxi), (0x11, Ora, Diy),
        (0x48, Pha, Imp), (0x08, Php, Imp), (0x68, Pla, Imp), (0x28, Plp, Imp),
        (0x2a, Rol, Acc), (0x26, Rol, D), (0x36, Rol, Dx), (0x2e, Rol, A), (0x3e, Rol, Ax),
        (0x6a, Ror, Acc), (0x66, Ror, D), (0x76, Ror, Dx), (0x6e, Ror, A), (0x7e, Ror, Ax),
        (0x40, Rti, Imp), (0x60, Rts, Imp),
        (0xe9, Sbc, Imm), (0xe5, Sbc, D), (0xf5, Sbc, Dx), (0xed, Sbc, A),
        (0xfd, Sbc, Ax), (0xf9, Sbc, Ay), (0xe1, Sbc, Dxi), (0xf1, Sbc, Diy),
        (0x38, Sec, Imp), (0xf8, Sed, Imp), (0x78, Sei, Imp),
        (0x85, Sta, D), (0x95, Sta, Dx), (0x8d, Sta, A), (0x9d, Sta, Ax),
        (0x99, Sta, Ay), (0x81, Sta, Dxi), (0x91, Sta, Diy),
        (0x86, Stx, D), (0x96, Stx, Dy), (0x8e, Stx, A),
        (0x84, Sty, D), (0x94, Sty, Dx), (0x8c, Sty, A),
        (0xaa, Tax, Imp), (0xa8, Tay, Imp), (0xba, Tsx, Imp),
        (0x8a, Txa, Imp), (0x9a, Txs, Imp), (0x98, Tya, Imp),
    ])
};

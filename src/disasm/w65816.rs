use super::{DecodeResult, Disassembler, Endianness, OpcodeInfo, decode_entry};
use crate::{
    instruction::{InstructionType, NamingConvention, am::AddrMode},
    pf,
};

/// Register widths the decoder tracks through a linear pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorState {
    pub emulation_mode: bool,
    pub accumulator_8bit: bool,
    pub index_8bit: bool,
}

impl ProcessorState {
    pub const fn native(accumulator_8bit: bool, index_8bit: bool) -> Self {
        Self {
            emulation_mode: false,
            accumulator_8bit,
            index_8bit,
        }
    }

    /// Entering emulation mode forces 8-bit registers.
    pub fn set_emulation_mode(&mut self, emulation_mode: bool) {
        self.emulation_mode = emulation_mode;
        if emulation_mode {
            self.accumulator_8bit = true;
            self.index_8bit = true;
        }
    }

    pub const fn m8(&self) -> bool {
        self.emulation_mode || self.accumulator_8bit
    }

    pub const fn x8(&self) -> bool {
        self.emulation_mode || self.index_8bit
    }

    pub fn rep(&mut self, mask: u8) {
        if self.emulation_mode {
            return;
        }
        if mask & pf::M != 0 {
            self.accumulator_8bit = false;
        }
        if mask & pf::X != 0 {
            self.index_8bit = false;
        }
    }

    pub fn sep(&mut self, mask: u8) {
        if self.emulation_mode {
            return;
        }
        if mask & pf::M != 0 {
            self.accumulator_8bit = true;
        }
        if mask & pf::X != 0 {
            self.index_8bit = true;
        }
    }
}

impl Default for ProcessorState {
    fn default() -> Self {
        Self {
            emulation_mode: true,
            accumulator_8bit: true,
            index_8bit: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct W65816Disassembler {
    state: ProcessorState,
    naming: NamingConvention,
}

impl W65816Disassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, state: ProcessorState) -> Self {
        self.state = state;
        self
    }

    pub fn with_naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    pub const fn naming(&self) -> NamingConvention {
        self.naming
    }

    pub fn state_mut(&mut self) -> &mut ProcessorState {
        &mut self.state
    }
}

impl Disassembler for W65816Disassembler {
    type State = ProcessorState;

    fn architecture_name(&self) -> &'static str {
        "65816"
    }

    fn endianness(&self) -> Endianness {
        Endianness::Little
    }

    fn max_instruction_len(&self) -> usize {
        4
    }

    fn state(&self) -> &ProcessorState {
        &self.state
    }

    fn set_state(&mut self, state: ProcessorState) {
        log::debug!("65816 state set to {state:?}");
        self.state = state;
    }

    fn decode_next(&mut self, bytes: &[u8], address: u64) -> DecodeResult {
        let Some(&opcode) = bytes.first() else {
            return DecodeResult::need_more_bytes(1);
        };
        let info = OPCODES[opcode as usize];
        let len = info.len(self.state.m8(), self.state.x8());
        let res = decode_entry(info, len, bytes, address, self.naming);
        if res.is_success() {
            match info.ty {
                InstructionType::Rep => self.state.rep(bytes[1]),
                InstructionType::Sep => self.state.sep(bytes[1]),
                _ => return res,
            }
            log::debug!("{:06X}: widths now {:?}", address, self.state);
        }
        res
    }
}

const fn op(ty: InstructionType, mode: AddrMode) -> OpcodeInfo {
    OpcodeInfo::new(ty, mode)
}

#[rustfmt::skip]
static OPCODES: [OpcodeInfo; 256] = {
    use {AddrMode::*, InstructionType::*};
    [
        // 0x00
        op(Brk, Imm), op(Ora, Dxi), op(Cop, Imm), op(Ora, S),
        op(Tsb, D),   op(Ora, D),   op(Asl, D),   op(Ora, Dil),
        op(Php, Imp), op(Ora, Imm), op(Asl, Acc), op(Phd, Imp),
        op(Tsb, A),   op(Ora, A),   op(Asl, A),   op(Ora, Al),
        // 0x10
        op(Bpl, Rel), op(Ora, Diy), op(Ora, Di),  op(Ora, Siy),
        op(Trb, D),   op(Ora, Dx),  op(Asl, Dx),  op(Ora, Dily),
        op(Clc, Imp), op(Ora, Ay),  op(Inc, Acc), op(Tcs, Imp),
        op(Trb, A),   op(Ora, Ax),  op(Asl, Ax),  op(Ora, Alx),
        // 0x20
        op(Jsr, A),   op(And, Dxi), op(Jsl, Al),  op(And, S),
        op(Bit, D),   op(And, D),   op(Rol, D),   op(And, Dil),
        op(Plp, Imp), op(And, Imm), op(Rol, Acc), op(Pld, Imp),
        op(Bit, A),   op(And, A),   op(Rol, A),   op(And, Al),
        // 0x30
        op(Bmi, Rel), op(And, Diy), op(And, Di),  op(And, Siy),
        op(Bit, Dx),  op(And, Dx),  op(Rol, Dx),  op(And, Dily),
        op(Sec, Imp), op(And, Ay),  op(Dec, Acc), op(Tsc, Imp),
        op(Bit, Ax),  op(And, Ax),  op(Rol, Ax),  op(And, Alx),
        // 0x40
        op(Rti, Imp), op(Eor, Dxi), op(Wdm, Imm), op(Eor, S),
        op(Mvp, Bm),  op(Eor, D),   op(Lsr, D),   op(Eor, Dil),
        op(Pha, Imp), op(Eor, Imm), op(Lsr, Acc), op(Phk, Imp),
        op(Jmp, A),   op(Eor, A),   op(Lsr, A),   op(Eor, Al),
        // 0x50
        op(Bvc, Rel), op(Eor, Diy), op(Eor, Di),  op(Eor, Siy),
        op(Mvn, Bm),  op(Eor, Dx),  op(Lsr, Dx),  op(Eor, Dily),
        op(Cli, Imp), op(Eor, Ay),  op(Phy, Imp), op(Tcd, Imp),
        op(Jmp, Al),  op(Eor, Ax),  op(Lsr, Ax),  op(Eor, Alx),
        // 0x60
        op(Rts, Imp), op(Adc, Dxi), op(Per, Rell), op(Adc, S),
        op(Stz, D),   op(Adc, D),   op(Ror, D),   op(Adc, Dil),
        op(Pla, Imp), op(Adc, Imm), op(Ror, Acc), op(Rtl, Imp),
        op(Jmp, Ai),  op(Adc, A),   op(Ror, A),   op(Adc, Al),
        // 0x70
        op(Bvs, Rel), op(Adc, Diy), op(Adc, Di),  op(Adc, Siy),
        op(Stz, Dx),  op(Adc, Dx),  op(Ror, Dx),  op(Adc, Dily),
        op(Sei, Imp), op(Adc, Ay),  op(Ply, Imp), op(Tdc, Imp),
        op(Jmp, Axi), op(Adc, Ax),  op(Ror, Ax),  op(Adc, Alx),
        // 0x80
        op(Bra, Rel), op(Sta, Dxi), op(Brl, Rell), op(Sta, S),
        op(Sty, D),   op(Sta, D),   op(Stx, D),   op(Sta, Dil),
        op(Dey, Imp), op(Bit, Imm), op(Txa, Imp), op(Phb, Imp),
        op(Sty, A),   op(Sta, A),   op(Stx, A),   op(Sta, Al),
        // 0x90
        op(Bcc, Rel), op(Sta, Diy), op(Sta, Di),  op(Sta, Siy),
        op(Sty, Dx),  op(Sta, Dx),  op(Stx, Dy),  op(Sta, Dily),
        op(Tya, Imp), op(Sta, Ay),  op(Txs, Imp), op(Txy, Imp),
        op(Stz, A),   op(Sta, Ax),  op(Stz, Ax),  op(Sta, Alx),
        // 0xa0
        op(Ldy, Imm), op(Lda, Dxi), op(Ldx, Imm), op(Lda, S),
        op(Ldy, D),   op(Lda, D),   op(Ldx, D),   op(Lda, Dil),
        op(Tay, Imp), op(Lda, Imm), op(Tax, Imp), op(Plb, Imp),
        op(Ldy, A),   op(Lda, A),   op(Ldx, A),   op(Lda, Al),
        // 0xb0
        op(Bcs, Rel), op(Lda, Diy), op(Lda, Di),  op(Lda, Siy),
        op(Ldy, Dx),  op(Lda, Dx),  op(Ldx, Dy),  op(Lda, Dily),
        op(Clv, Imp), op(Lda, Ay),  op(Tsx, Imp), op(Tyx, Imp),
        op(Ldy, Ax),  op(Lda, Ax),  op(Ldx, Ay),  op(Lda, Alx),
        // 0xc0
        op(Cpy, Imm), op(Cmp, Dxi), op(Rep, Imm), op(Cmp, S),
        op(Cpy, D),   op(Cmp, D),   op(Dec, D),   op(Cmp, Dil),
        op(Iny, Imp), op(Cmp, Imm), op(Dex, Imp), op(Wai, Imp),
        op(Cpy, A),   op(Cmp, A),   op(Dec, A),   op(Cmp, Al),
        // 0xd0
        op(Bne, Rel), op(Cmp, Diy), op(Cmp, Di),  op(Cmp, Siy),
        op(Pei, Di),  op(Cmp, Dx),  op(Dec, Dx),  op(Cmp, Dily),
        op(Cld, Imp), op(Cmp, Ay),  op(Phx, Imp), op(Stp, Imp),
        op(Jml, Ail), op(Cmp, Ax),  op(Dec, Ax),  op(Cmp, Alx),
        // 0xe0
        op(Cpx, Imm), op(Sbc, Dxi), op(Sep, Imm), op(Sbc, S),
        op(Cpx, D),   op(Sbc, D),   op(Inc, D),   op(Sbc, Dil),
        op(Inx, Imp), op(Sbc, Imm), op(Nop, Imp), op(Xba, Imp),
        op(Cpx, A),   op(Sbc, A),   op(Inc, A),   op(Sbc, Al),
        // 0xf0
        op(Beq, Rel), op(Sbc, Diy), op(Sbc, Di),  op(Sbc, Siy),
        op(Pea, A),   op(Sbc, Dx),  op(Inc, Dx),  op(Sbc, Dily),
        op(Sed, Imp), op(Sbc, Ay),  op(Plx, Imp), op(Xce, Imp),
        op(Jsr, Axi), op(Sbc, Ax),  op(Inc, Ax),  op(Sbc, Alx),
    ]
};

pub mod am {
    use super::{Access, Operand};

    /// Addressing mode of an opcode. The immediate width is not part of the
    /// mode; it follows the instruction's [`super::FlagDependency`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum AddrMode {
        /// Implied
        Imp,
        /// Accumulator
        Acc,
        /// Immediate
        Imm,
        /// Absolute
        A,
        /// Absolute Indexed, X
        Ax,
        /// Absolute Indexed, Y
        Ay,
        /// Absolute Long
        Al,
        /// Absolute Long Indexed, X
        Alx,
        /// Absolute Indirect
        Ai,
        /// Absolute Indexed Indirect, X
        Axi,
        /// Absolute Indirect Long
        Ail,
        /// Direct Page
        D,
        /// Direct Indexed, X
        Dx,
        /// Direct Indexed, Y
        Dy,
        /// Direct Page Indexed Indirect, X
        Dxi,
        /// Direct Page Indirect Indexed, Y
        Diy,
        /// Direct Page Indirect Long Indexed, Y
        Dily,
        /// Direct Page Indirect
        Di,
        /// Direct Page Indirect Long
        Dil,
        /// Stack Relative
        S,
        /// Stack Relative Indirect Indexed, Y
        Siy,
        /// Program Counter Relative
        Rel,
        /// Program Counter Relative Long
        Rell,
        /// Block Move
        Bm,
    }

    impl AddrMode {
        /// Number of operand bytes following the opcode. `wide` only affects
        /// immediates.
        pub const fn operand_len(&self, wide: bool) -> usize {
            use AddrMode::*;
            match self {
                Imp | Acc => 0,
                Imm => {
                    if wide {
                        2
                    } else {
                        1
                    }
                }
                D | Dx | Dy | Dxi | Diy | Dily | Di | Dil | S | Siy | Rel => 1,
                A | Ax | Ay | Ai | Axi | Ail | Rell | Bm => 2,
                Al | Alx => 3,
            }
        }

        /// Renders the operands of an instruction. `raw` is the little-endian
        /// operand field, `len` the full instruction length.
        pub fn operands(&self, raw: u32, address: u64, len: usize, access: Access) -> Vec<Operand> {
            use AddrMode::*;
            let (src, dst) = (access.reads(), access.writes());
            let v = Some(raw as u64);
            let op = |text: String| Operand::new(text, src, dst, v);
            match self {
                Imp => vec![],
                Acc => vec![Operand::new("A", src, dst, None)],
                Imm if len > 2 => vec![op(format!("#${raw:04X}"))],
                Imm => vec![op(format!("#${raw:02X}"))],
                A => vec![op(format!("${raw:04X}"))],
                Ax => vec![op(format!("${raw:04X},X"))],
                Ay => vec![op(format!("${raw:04X},Y"))],
                Al => vec![op(format!("${raw:06X}"))],
                Alx => vec![op(format!("${raw:06X},X"))],
                Ai => vec![op(format!("(${raw:04X})"))],
                Axi => vec![op(format!("(${raw:04X},X)"))],
                Ail => vec![op(format!("[${raw:04X}]"))],
                D => vec![op(format!("${raw:02X}"))],
                Dx => vec![op(format!("${raw:02X},X"))],
                Dy => vec![op(format!("${raw:02X},Y"))],
                Dxi => vec![op(format!("(${raw:02X},X)"))],
                Diy => vec![op(format!("(${raw:02X}),Y"))],
                Dily => vec![op(format!("[${raw:02X}],Y"))],
                Di => vec![op(format!("(${raw:02X})"))],
                Dil => vec![op(format!("[${raw:02X}]"))],
                S => vec![op(format!("${raw:02X},S"))],
                Siy => vec![op(format!("(${raw:02X},S),Y"))],
                Rel | Rell => {
                    let offset = if *self == Rel {
                        raw as u8 as i8 as i64
                    } else {
                        raw as u16 as i16 as i64
                    };
                    let target = address.wrapping_add(len as u64).wrapping_add_signed(offset);
                    vec![Operand::new(format!("${target:04X}"), true, false, Some(target))]
                }
                Bm => {
                    // encoded as opcode, destination bank, source bank
                    let (dst_bank, src_bank) = (raw & 0xff, raw >> 8);
                    vec![
                        Operand::new(format!("${src_bank:02X}"), true, false, Some(src_bank as u64)),
                        Operand::new(format!("${dst_bank:02X}"), false, true, Some(dst_bank as u64)),
                    ]
                }
            }
        }
    }
}
use am::AddrMode;

/// A single rendered operand of a decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operand {
    text: String,
    is_source: bool,
    is_destination: bool,
    value: Option<u64>,
}

impl Operand {
    pub fn new(
        text: impl Into<String>,
        is_source: bool,
        is_destination: bool,
        value: Option<u64>,
    ) -> Self {
        Self {
            text: text.into(),
            is_source,
            is_destination,
            value,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn is_source(&self) -> bool {
        self.is_source
    }

    pub const fn is_destination(&self) -> bool {
        self.is_destination
    }

    pub const fn value(&self) -> Option<u64> {
        self.value
    }
}

impl core::fmt::Display for Operand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.text)
    }
}

/// A decoded instruction together with its control flow successors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    address: u64,
    mnemonic: String,
    operands: Vec<Operand>,
    bytes: Vec<u8>,
    is_branch: bool,
    is_terminator: bool,
    next_addresses: Vec<u64>,
}

impl Instruction {
    /// Creates a sequential instruction that falls through to the next address.
    pub fn new(
        address: u64,
        mnemonic: impl Into<String>,
        operands: Vec<Operand>,
        bytes: Vec<u8>,
    ) -> Self {
        let next = address.wrapping_add(bytes.len() as u64);
        Self {
            address,
            mnemonic: mnemonic.into(),
            operands,
            bytes,
            is_branch: false,
            is_terminator: false,
            next_addresses: vec![next],
        }
    }

    pub fn with_flow(mut self, is_branch: bool, is_terminator: bool, next: Vec<u64>) -> Self {
        self.is_branch = is_branch;
        self.is_terminator = is_terminator;
        self.next_addresses = next;
        self
    }

    pub const fn address(&self) -> u64 {
        self.address
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// First address after the instruction.
    pub fn end_address(&self) -> u64 {
        self.address.wrapping_add(self.bytes.len() as u64)
    }

    pub const fn is_branch(&self) -> bool {
        self.is_branch
    }

    pub const fn is_basic_block_terminator(&self) -> bool {
        self.is_terminator
    }

    /// Possible successors. Conditional branches list the fall through
    /// address first, then the target, even when both are equal.
    pub fn next_addresses(&self) -> &[u64] {
        &self.next_addresses
    }

    /// Mnemonic followed by the comma separated operands.
    pub fn text(&self) -> String {
        let mut s = self.mnemonic.clone();
        for (i, op) in self.operands.iter().enumerate() {
            s.push_str(if i == 0 { " " } else { ", " });
            s.push_str(op.text());
        }
        s
    }
}

impl core::fmt::Display for Instruction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:08X}: {}", self.address, self.text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionType {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Bra,
    Brk,
    Brl,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cop,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jml,
    Jmp,
    Jsl,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Mvn,
    Mvp,
    Nop,
    Ora,
    Pea,
    Pei,
    Per,
    Pha,
    Phb,
    Phd,
    Phk,
    Php,
    Phx,
    Phy,
    Pla,
    Plb,
    Pld,
    Plp,
    Plx,
    Ply,
    Rep,
    Rol,
    Ror,
    Rti,
    Rtl,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sep,
    Sta,
    Stp,
    Stx,
    Sty,
    Stz,
    Tax,
    Tay,
    Tcd,
    Tcs,
    Tdc,
    Trb,
    Tsb,
    Tsc,
    Tsx,
    Txa,
    Txs,
    Txy,
    Tya,
    Tyx,
    Wai,
    Wdm,
    Xba,
    Xce,
}

impl InstructionType {
    pub fn name(&self) -> &'static str {
        use InstructionType::*;
        match self {
            Adc => "ADC",
            And => "AND",
            Asl => "ASL",
            Bcc => "BCC",
            Bcs => "BCS",
            Beq => "BEQ",
            Bit => "BIT",
            Bmi => "BMI",
            Bne => "BNE",
            Bpl => "BPL",
            Bra => "BRA",
            Brk => "BRK",
            Brl => "BRL",
            Bvc => "BVC",
            Bvs => "BVS",
            Clc => "CLC",
            Cld => "CLD",
            Cli => "CLI",
            Clv => "CLV",
            Cmp => "CMP",
            Cop => "COP",
            Cpx => "CPX",
            Cpy => "CPY",
            Dec => "DEC",
            Dex => "DEX",
            Dey => "DEY",
            Eor => "EOR",
            Inc => "INC",
            Inx => "INX",
            Iny => "INY",
            Jml => "JML",
            Jmp => "JMP",
            Jsl => "JSL",
            Jsr => "JSR",
            Lda => "LDA",
            Ldx => "LDX",
            Ldy => "LDY",
            Lsr => "LSR",
            Mvn => "MVN",
            Mvp => "MVP",
            Nop => "NOP",
            Ora => "ORA",
            Pea => "PEA",
            Pei => "PEI",
            Per => "PER",
            Pha => "PHA",
            Phb => "PHB",
            Phd => "PHD",
            Phk => "PHK",
            Php => "PHP",
            Phx => "PHX",
            Phy => "PHY",
            Pla => "PLA",
            Plb => "PLB",
            Pld => "PLD",
            Plp => "PLP",
            Plx => "PLX",
            Ply => "PLY",
            Rep => "REP",
            Rol => "ROL",
            Ror => "ROR",
            Rti => "RTI",
            Rtl => "RTL",
            Rts => "RTS",
            Sbc => "SBC",
            Sec => "SEC",
            Sed => "SED",
            Sei => "SEI",
            Sep => "SEP",
            Sta => "STA",
            Stp => "STP",
            Stx => "STX",
            Sty => "STY",
            Stz => "STZ",
            Tax => "TAX",
            Tay => "TAY",
            Tcd => "TCD",
            Tcs => "TCS",
            Tdc => "TDC",
            Trb => "TRB",
            Tsb => "TSB",
            Tsc => "TSC",
            Tsx => "TSX",
            Txa => "TXA",
            Txs => "TXS",
            Txy => "TXY",
            Tya => "TYA",
            Tyx => "TYX",
            Wai => "WAI",
            Wdm => "WDM",
            Xba => "XBA",
            Xce => "XCE",
        }
    }

    /// Mnemonic as rendered under `convention`. Some names depend on the
    /// addressing mode, e.g. `INC A` is `INA` in the descriptive convention.
    pub fn mnemonic(&self, mode: AddrMode, convention: NamingConvention) -> &'static str {
        use {InstructionType::*, NamingConvention::*};
        match (self, mode, convention) {
            (Jmp, AddrMode::Al, Descriptive) => "JML",
            (Inc, AddrMode::Acc, Descriptive) => "INA",
            (Dec, AddrMode::Acc, Descriptive) => "DEA",
            (Bcc, _, Descriptive) => "BLT",
            (Bcs, _, Descriptive) => "BGE",
            _ => self.name(),
        }
    }

    /// Which status flag selects the width of an immediate operand.
    pub const fn flag_dependency(&self) -> Option<FlagDependency> {
        use {FlagDependency::*, InstructionType::*};
        match self {
            Adc | And | Bit | Cmp | Eor | Lda | Ora | Sbc => Some(M),
            Cpx | Cpy | Ldx | Ldy => Some(X),
            _ => None,
        }
    }

    pub const fn flow(&self) -> Flow {
        use {Flow::*, InstructionType::*};
        match self {
            Bcc | Bcs | Beq | Bmi | Bne | Bpl | Bvc | Bvs => Conditional,
            Bra | Brl | Jmp | Jml | Jsr | Jsl => Transfer,
            Brk | Cop | Rti | Rtl | Rts | Stp => Stop,
            _ => Sequential,
        }
    }

    /// How the instruction accesses its operand.
    pub const fn access(&self) -> Access {
        use InstructionType::*;
        match self {
            Sta | Stx | Sty | Stz => Access::Write,
            Asl | Lsr | Rol | Ror | Inc | Dec | Tsb | Trb => Access::ReadWrite,
            _ => Access::Read,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagDependency {
    /// Accumulator width
    M,
    /// Index register width
    X,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Continues at the next instruction
    Sequential,
    /// Continues at the next instruction or at the target
    Conditional,
    /// Always continues at the target
    Transfer,
    /// No statically known successor
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

impl Access {
    pub const fn reads(&self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    pub const fn writes(&self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingConvention {
    /// e.g. `INC A` instead of `INA`
    #[default]
    Regular,
    /// e.g. `INA` instead of `INC A`
    Descriptive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_accessors() {
        let op = Operand::new("#$42", true, false, Some(0x42));
        assert_eq!(op.text(), "#$42");
        assert!(op.is_source());
        assert!(!op.is_destination());
        assert_eq!(op.value(), Some(0x42));
        assert_eq!(op.to_string(), "#$42");
    }

    #[test]
    fn instruction_defaults_to_fall_through() {
        let ins = Instruction::new(0x8000, "NOP", vec![], vec![0xea]);
        assert_eq!(ins.len(), 1);
        assert_eq!(ins.end_address(), 0x8001);
        assert_eq!(ins.next_addresses(), &[0x8001]);
        assert!(!ins.is_branch());
        assert!(!ins.is_basic_block_terminator());
    }

    #[test]
    fn instruction_text() {
        let ops = vec![
            Operand::new("$01", true, false, Some(1)),
            Operand::new("$02", false, true, Some(2)),
        ];
        let ins = Instruction::new(0x1234, "MVN", ops, vec![0x54, 0x02, 0x01]);
        assert_eq!(ins.text(), "MVN $01, $02");
        assert_eq!(ins.to_string(), "00001234: MVN $01, $02");
    }

    #[test]
    fn naming_conventions() {
        use InstructionType::*;
        use NamingConvention::*;
        assert_eq!(Inc.mnemonic(AddrMode::Acc, Regular), "INC");
        assert_eq!(Inc.mnemonic(AddrMode::Acc, Descriptive), "INA");
        assert_eq!(Inc.mnemonic(AddrMode::A, Descriptive), "INC");
        assert_eq!(Dec.mnemonic(AddrMode::Acc, Descriptive), "DEA");
        assert_eq!(Jmp.mnemonic(AddrMode::Al, Regular), "JMP");
        assert_eq!(Jmp.mnemonic(AddrMode::Al, Descriptive), "JML");
        assert_eq!(Jmp.mnemonic(AddrMode::A, Descriptive), "JMP");
        assert_eq!(Bcc.mnemonic(AddrMode::Rel, Descriptive), "BLT");
        assert_eq!(Bcs.mnemonic(AddrMode::Rel, Descriptive), "BGE");
        assert_eq!(Jsl.mnemonic(AddrMode::Al, Regular), "JSL");
    }

    #[test]
    fn operand_lengths() {
        assert_eq!(AddrMode::Imm.operand_len(false), 1);
        assert_eq!(AddrMode::Imm.operand_len(true), 2);
        assert_eq!(AddrMode::Al.operand_len(true), 3);
        assert_eq!(AddrMode::Bm.operand_len(false), 2);
        assert_eq!(AddrMode::Acc.operand_len(true), 0);
    }

    #[test]
    fn relative_targets_wrap_backwards() {
        let ops = AddrMode::Rel.operands(0xfc, 0x8000, 2, Access::Read);
        assert_eq!(ops[0].value(), Some(0x7ffe));
        assert_eq!(ops[0].text(), "$7FFE");
        let ops = AddrMode::Rell.operands(0xfffd, 0x8000, 3, Access::Read);
        assert_eq!(ops[0].value(), Some(0x8000));
    }

    #[test]
    fn operand_access_flags() {
        let ops = AddrMode::A.operands(0x1234, 0, 3, InstructionType::Sta.access());
        assert!(!ops[0].is_source() && ops[0].is_destination());
        let ops = AddrMode::D.operands(0x42, 0, 2, InstructionType::Asl.access());
        assert!(ops[0].is_source() && ops[0].is_destination());
        let ops = AddrMode::Acc.operands(0, 0, 1, InstructionType::Asl.access());
        assert_eq!(ops[0].text(), "A");
        assert_eq!(ops[0].value(), None);
    }
}

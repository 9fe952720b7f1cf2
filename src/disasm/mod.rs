use thiserror::Error;

use crate::instruction::{
    FlagDependency, Flow, Instruction, InstructionType, NamingConvention, am::AddrMode,
};

pub mod mos6502;
pub mod w65816;

pub use mos6502::Mos6502Disassembler;
pub use w65816::{ProcessorState, W65816Disassembler};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown opcode ${opcode:02X} at ${address:06X}")]
    UnknownOpcode { opcode: u8, address: u64 },
}

/// Outcome of decoding a single instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    Success {
        instruction: Instruction,
        bytes_consumed: usize,
    },
    NeedMoreBytes {
        additional_bytes_needed: usize,
    },
    Error(DecodeError),
}

impl DecodeResult {
    pub fn success(instruction: Instruction) -> Self {
        let bytes_consumed = instruction.len();
        Self::Success {
            instruction,
            bytes_consumed,
        }
    }

    pub const fn need_more_bytes(additional_bytes_needed: usize) -> Self {
        Self::NeedMoreBytes {
            additional_bytes_needed,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub const fn needs_more_bytes(&self) -> bool {
        matches!(self, Self::NeedMoreBytes { .. })
    }

    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            Self::Success { instruction, .. } => Some(instruction),
            _ => None,
        }
    }

    pub fn into_instruction(self) -> Option<Instruction> {
        match self {
            Self::Success { instruction, .. } => Some(instruction),
            _ => None,
        }
    }

    pub fn bytes_consumed(&self) -> usize {
        match self {
            Self::Success { bytes_consumed, .. } => *bytes_consumed,
            _ => 0,
        }
    }

    pub fn additional_bytes_needed(&self) -> usize {
        match self {
            Self::NeedMoreBytes {
                additional_bytes_needed,
            } => *additional_bytes_needed,
            _ => 0,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Error(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Assembles `size` bytes starting at `offset` into a value.
/// Bytes past the end of `bytes` read as zero.
pub fn read_value(bytes: &[u8], offset: usize, size: usize, endianness: Endianness) -> u64 {
    let byte = |i: usize| bytes.get(offset + i).copied().unwrap_or(0) as u64;
    match endianness {
        Endianness::Little => (0..size).rev().fold(0, |acc, i| acc << 8 | byte(i)),
        Endianness::Big => (0..size).fold(0, |acc, i| acc << 8 | byte(i)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadKind {
    Ram,
    Rom,
}

/// Byte oriented read access to a backing store.
pub trait MemoryAccess {
    /// Returns up to `len` bytes starting at `address`. The slice is shorter
    /// when the store ends earlier.
    fn read_bytes(&self, kind: ReadKind, address: u64, len: usize) -> &[u8];
}

/// A CPU instruction decoder.
pub trait Disassembler {
    type State: Clone;

    fn architecture_name(&self) -> &'static str;

    fn endianness(&self) -> Endianness;

    /// Longest encoding this architecture has.
    fn max_instruction_len(&self) -> usize;

    fn state(&self) -> &Self::State;

    fn set_state(&mut self, state: Self::State);

    /// Decodes the instruction at the start of `bytes`, which are located at
    /// `address`. Never reads past the end of `bytes`.
    fn decode_next(&mut self, bytes: &[u8], address: u64) -> DecodeResult;

    fn decode_at<M: MemoryAccess + ?Sized>(&mut self, memory: &M, address: u64) -> DecodeResult
    where
        Self: Sized,
    {
        let window = memory.read_bytes(ReadKind::Rom, address, self.max_instruction_len());
        self.decode_next(window, address)
    }
}

/// One entry of an opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub ty: InstructionType,
    pub mode: AddrMode,
}

impl OpcodeInfo {
    pub const fn new(ty: InstructionType, mode: AddrMode) -> Self {
        Self { ty, mode }
    }

    /// Full length of the encoding. `m8` and `x8` select the immediate
    /// width for instructions depending on the M or X flag.
    pub const fn len(&self, m8: bool, x8: bool) -> usize {
        let wide = match self.ty.flag_dependency() {
            Some(FlagDependency::M) => !m8,
            Some(FlagDependency::X) => !x8,
            None => false,
        };
        1 + self.mode.operand_len(wide)
    }
}

/// Decodes a table entry whose encoding is known to be `len` bytes long.
/// Returns `NeedMoreBytes` if the window is shorter.
pub(crate) fn decode_entry(
    info: OpcodeInfo,
    len: usize,
    bytes: &[u8],
    address: u64,
    convention: NamingConvention,
) -> DecodeResult {
    let Some(bytes) = bytes.get(..len) else {
        return DecodeResult::need_more_bytes(len - bytes.len());
    };
    let raw = read_value(bytes, 1, len - 1, Endianness::Little) as u32;
    let operands = info.mode.operands(raw, address, len, info.ty.access());
    let mnemonic = info.ty.mnemonic(info.mode, convention);
    let target = operands.first().and_then(|op| op.value());
    let ins = Instruction::new(address, mnemonic, operands, bytes.to_vec());
    let fall_through = ins.end_address();
    let ins = match (info.ty.flow(), target) {
        (Flow::Sequential, _) => ins,
        (Flow::Conditional, Some(target)) => ins.with_flow(true, false, vec![fall_through, target]),
        (Flow::Transfer, Some(target)) => ins.with_flow(true, true, vec![target]),
        (Flow::Conditional | Flow::Transfer, None) => ins.with_flow(true, true, vec![]),
        (Flow::Stop, _) => ins.with_flow(false, true, vec![]),
    };
    log::trace!("{ins}");
    DecodeResult::success(ins)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat(Vec<u8>);

    impl MemoryAccess for Flat {
        fn read_bytes(&self, kind: ReadKind, address: u64, len: usize) -> &[u8] {
            if kind == ReadKind::Ram {
                return &[];
            }
            let start = (address as usize).min(self.0.len());
            let end = start.saturating_add(len).min(self.0.len());
            &self.0[start..end]
        }
    }

    #[test]
    fn read_value_byte_order() {
        let bytes = [0x12, 0x34, 0x56];
        assert_eq!(read_value(&bytes, 0, 2, Endianness::Little), 0x3412);
        assert_eq!(read_value(&bytes, 0, 2, Endianness::Big), 0x1234);
        assert_eq!(read_value(&bytes, 1, 2, Endianness::Little), 0x5634);
        assert_eq!(read_value(&bytes, 0, 3, Endianness::Little), 0x563412);
        assert_eq!(read_value(&bytes, 2, 2, Endianness::Little), 0x56);
        assert_eq!(read_value(&bytes, 0, 0, Endianness::Big), 0);
    }

    #[test]
    fn decode_result_states() {
        let ins = Instruction::new(0x8000, "NOP", vec![], vec![0xea]);
        let ok = DecodeResult::success(ins.clone());
        assert!(ok.is_success() && !ok.needs_more_bytes());
        assert_eq!(ok.bytes_consumed(), 1);
        assert_eq!(ok.instruction(), Some(&ins));

        let more = DecodeResult::need_more_bytes(2);
        assert!(!more.is_success() && more.needs_more_bytes());
        assert_eq!(more.additional_bytes_needed(), 2);
        assert_eq!(more.instruction(), None);

        let err = DecodeResult::Error(DecodeError::UnknownOpcode {
            opcode: 0x02,
            address: 0x8000,
        });
        assert!(!err.is_success() && !err.needs_more_bytes());
        assert_eq!(
            err.error_message().as_deref(),
            Some("unknown opcode $02 at $008000")
        );
    }

    #[test]
    fn decode_at_reads_window_from_memory() {
        let mem = Flat(vec![0xea, 0x20, 0x34, 0x12]);
        let mut dis = W65816Disassembler::new();
        let res = dis.decode_at(&mem, 1);
        let ins = res.instruction().unwrap();
        assert_eq!(ins.mnemonic(), "JSR");
        assert_eq!(ins.next_addresses(), &[0x1234]);

        let mem = Flat(vec![0x20, 0x34]);
        assert_eq!(
            dis.decode_at(&mem, 0),
            DecodeResult::need_more_bytes(1)
        );
    }
}

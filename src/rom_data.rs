use thiserror::Error;

use crate::{
    disasm::{DecodeError, DecodeResult, Disassembler, MemoryAccess, ReadKind},
    instruction::Instruction,
    range_collection::RangeCollection,
    region::{Region, RegionKind},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RomError {
    #[error("invalid span ${start:X}..=${end:X} for a rom of {size} bytes")]
    InvalidSpan { start: u64, end: u64, size: usize },
    #[error("can't decode code at ${address:X}")]
    Decode {
        address: u64,
        #[source]
        source: DecodeError,
    },
    #[error("rom ends inside the instruction at ${address:X}, {needed} more bytes needed")]
    Truncated { address: u64, needed: usize },
}

/// Raw ROM bytes with a map of what each part has been classified as.
#[derive(Debug, Clone)]
pub struct RomData {
    data: Vec<u8>,
    regions: RangeCollection<Region>,
}

impl RomData {
    /// Starts with everything classified as unknown.
    pub fn new(data: Vec<u8>) -> Self {
        let mut regions = RangeCollection::new();
        if !data.is_empty() {
            regions.add_range(Region::unknown(0, data.len() as u64 - 1));
        }
        Self { data, regions }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte at `address`, zero past the end.
    pub fn byte(&self, address: u64) -> u8 {
        usize::try_from(address)
            .ok()
            .and_then(|a| self.data.get(a))
            .copied()
            .unwrap_or(0)
    }

    /// Up to `len` bytes starting at `address`.
    pub fn fetch_bytes(&self, address: u64, len: usize) -> &[u8] {
        let start = usize::try_from(address)
            .unwrap_or(usize::MAX)
            .min(self.data.len());
        let end = start.saturating_add(len).min(self.data.len());
        &self.data[start..end]
    }

    pub fn regions(&self) -> &RangeCollection<Region> {
        &self.regions
    }

    pub fn region_kind_at(&self, address: u64) -> Option<RegionKind> {
        self.regions
            .range_containing_address(address)
            .map(Region::kind)
    }

    fn check_span(&self, start: u64, end: u64) -> Result<(), RomError> {
        if start > end || end >= self.data.len() as u64 {
            return Err(RomError::InvalidSpan {
                start,
                end,
                size: self.data.len(),
            });
        }
        Ok(())
    }

    pub fn add_unknown_range(&mut self, start: u64, end: u64) -> Result<(), RomError> {
        self.check_span(start, end)?;
        self.regions.add_range(Region::unknown(start, end));
        Ok(())
    }

    pub fn add_data_range(&mut self, start: u64, end: u64) -> Result<(), RomError> {
        self.check_span(start, end)?;
        self.regions.add_range(Region::data(start, end));
        Ok(())
    }

    pub fn add_string_range(&mut self, start: u64, end: u64) -> Result<(), RomError> {
        self.check_span(start, end)?;
        self.regions.add_range(Region::string(start, end));
        Ok(())
    }

    /// Decodes `start..=end` linearly with `disassembler` and marks it as code.
    /// The region grows past `end` if the last instruction straddles it.
    /// On failure the map and the disassembler state are left as they were.
    pub fn add_code_range<D: Disassembler>(
        &mut self,
        disassembler: &mut D,
        start: u64,
        end: u64,
    ) -> Result<(), RomError> {
        self.check_span(start, end)?;
        let saved = disassembler.state().clone();
        let instructions = match self.decode_linear(disassembler, start, end) {
            Ok(instructions) => instructions,
            Err(err) => {
                disassembler.set_state(saved);
                return Err(err);
            }
        };
        let last = instructions
            .last()
            .map_or(end, |i| i.end_address().wrapping_sub(1));
        log::debug!(
            "{} code: {} instructions in ${start:X}..=${last:X}",
            disassembler.architecture_name(),
            instructions.len()
        );
        self.regions
            .add_range(Region::code(start, last, instructions));
        Ok(())
    }

    fn decode_linear<D: Disassembler>(
        &self,
        disassembler: &mut D,
        start: u64,
        end: u64,
    ) -> Result<Vec<Instruction>, RomError> {
        let mut instructions = vec![];
        let mut address = start;
        while address <= end {
            let ins = match disassembler.decode_at(self, address) {
                DecodeResult::Success { instruction, .. } => instruction,
                DecodeResult::NeedMoreBytes {
                    additional_bytes_needed,
                } => {
                    log::warn!("{address:06X}: truncated instruction");
                    return Err(RomError::Truncated {
                        address,
                        needed: additional_bytes_needed,
                    });
                }
                DecodeResult::Error(source) => {
                    log::warn!("{source}");
                    return Err(RomError::Decode { address, source });
                }
            };
            address = ins.end_address();
            instructions.push(ins);
        }
        Ok(instructions)
    }
}

impl MemoryAccess for RomData {
    fn read_bytes(&self, kind: ReadKind, address: u64, len: usize) -> &[u8] {
        match kind {
            ReadKind::Rom => self.fetch_bytes(address, len),
            ReadKind::Ram => &[],
        }
    }
}

use crate::{
    instruction::Instruction,
    range::{Range, RangeError},
};

/// Bytes shown per line of a data or string region.
pub const BYTES_PER_LINE: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Unknown,
    Code,
    Data,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Unknown,
    Code(Vec<Instruction>),
    Data,
    String,
}

/// A classified span of ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    start: u64,
    end: u64,
    content: Content,
}

impl Region {
    fn new(start: u64, end: u64, content: Content) -> Self {
        debug_assert!(start <= end, "malformed region ${start:X}..=${end:X}");
        Self {
            start,
            end,
            content,
        }
    }

    pub fn unknown(start: u64, end: u64) -> Self {
        Self::new(start, end, Content::Unknown)
    }

    pub fn data(start: u64, end: u64) -> Self {
        Self::new(start, end, Content::Data)
    }

    pub fn string(start: u64, end: u64) -> Self {
        Self::new(start, end, Content::String)
    }

    /// `instructions` must be sorted and start inside `start..=end`.
    pub fn code(start: u64, end: u64, instructions: Vec<Instruction>) -> Self {
        Self::new(start, end, Content::Code(instructions))
    }

    pub fn kind(&self) -> RegionKind {
        match self.content {
            Content::Unknown => RegionKind::Unknown,
            Content::Code(_) => RegionKind::Code,
            Content::Data => RegionKind::Data,
            Content::String => RegionKind::String,
        }
    }

    /// Decoded instructions of a code region, empty for everything else.
    pub fn instructions(&self) -> &[Instruction] {
        match &self.content {
            Content::Code(instructions) => instructions,
            _ => &[],
        }
    }

    /// Moves the instructions starting at or after `position` into a new list.
    fn split_code_at(&mut self, position: u64) -> Content {
        match &mut self.content {
            Content::Code(instructions) => {
                let at = instructions.partition_point(|i| i.address() < position);
                Content::Code(instructions.split_off(at))
            }
            other => other.clone(),
        }
    }

    /// Drops an instruction running past `end` and turns a code piece
    /// left without instructions into an unknown one.
    fn trim_code(&mut self) {
        if let Content::Code(instructions) = &mut self.content {
            let end = self.end;
            if instructions
                .last()
                .is_some_and(|i| i.end_address().wrapping_sub(1) > end)
            {
                instructions.pop();
            }
            if instructions.is_empty() {
                self.content = Content::Unknown;
            }
        }
    }

    /// Start address of each line of a code region. Bytes no instruction
    /// covers get a line each, like unknown bytes.
    fn code_lines<'a>(&'a self, instructions: &'a [Instruction]) -> impl Iterator<Item = u64> + 'a {
        let end = self.end;
        let mut cursor = Some(self.start);
        let mut rest = instructions;
        core::iter::from_fn(move || {
            let at = cursor.filter(|&a| a <= end)?;
            cursor = match rest.split_first() {
                Some((ins, tail)) if ins.address() <= at => {
                    rest = tail;
                    Some(ins.end_address())
                        .filter(|&next| next > at)
                        .or_else(|| at.checked_add(1))
                }
                _ => at.checked_add(1),
            };
            Some(at)
        })
    }
}

impl Range for Region {
    fn address_start(&self) -> u64 {
        self.start
    }

    fn address_end(&self) -> u64 {
        self.end
    }

    fn line_count(&self) -> u64 {
        match &self.content {
            Content::Unknown => self.len(),
            Content::Code(instructions) => self.code_lines(instructions).count() as u64,
            Content::Data | Content::String => self.len().div_ceil(BYTES_PER_LINE),
        }
    }

    fn is_same(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }

    fn split_after(&mut self, position: u64) -> Option<Self> {
        if position < self.start || position >= self.end {
            return None;
        }
        let content = self.split_code_at(position + 1);
        let mut rest = Self::new(position + 1, self.end, content);
        rest.trim_code();
        self.end = position;
        self.trim_code();
        Some(rest)
    }

    fn split_before(&mut self, position: u64) -> Option<Self> {
        if position <= self.start || position > self.end {
            return None;
        }
        let mut content = self.split_code_at(position);
        if let (Content::Code(head), Content::Code(tail)) = (&mut self.content, &mut content) {
            core::mem::swap(head, tail);
        }
        let mut piece = Self::new(self.start, position - 1, content);
        piece.trim_code();
        self.start = position;
        self.trim_code();
        Some(piece)
    }

    fn combine_adjacent(&mut self, other: &Self) -> Result<(), RangeError> {
        self.check_adjacent(other)?;
        if let (Content::Code(mine), Content::Code(theirs)) = (&mut self.content, &other.content) {
            mine.extend_from_slice(theirs);
        }
        self.end = other.end;
        Ok(())
    }

    fn line_offset_for_address(&self, address: u64) -> Result<u64, RangeError> {
        self.check_address(address)?;
        let offset = address - self.start;
        match &self.content {
            Content::Unknown => Ok(offset),
            Content::Data | Content::String => Ok(offset / BYTES_PER_LINE),
            Content::Code(instructions) => Ok(self
                .code_lines(instructions)
                .take_while(|&line| line <= address)
                .count() as u64
                - 1),
        }
    }

    fn address_for_line(&self, line: u64) -> Result<u64, RangeError> {
        self.check_line(line)?;
        Ok(match &self.content {
            Content::Unknown => self.start + line,
            Content::Data | Content::String => self.start + line * BYTES_PER_LINE,
            Content::Code(instructions) => self
                .code_lines(instructions)
                .nth(line as usize)
                .unwrap_or(self.end),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nop(address: u64) -> Instruction {
        Instruction::new(address, "NOP", vec![], vec![0xea])
    }

    fn lda(address: u64) -> Instruction {
        Instruction::new(address, "LDA", vec![], vec![0xa9, 0x00])
    }

    #[test]
    fn line_counts() {
        assert_eq!(Region::unknown(0, 9).line_count(), 10);
        assert_eq!(Region::data(0, 15).line_count(), 1);
        assert_eq!(Region::data(0, 16).line_count(), 2);
        assert_eq!(Region::string(0, 0).line_count(), 1);
        let code = Region::code(0, 2, vec![nop(0), lda(1)]);
        assert_eq!(code.line_count(), 2);
    }

    #[test]
    fn same_kind_is_same() {
        assert!(Region::code(0, 0, vec![nop(0)]).is_same(&Region::code(5, 5, vec![nop(5)])));
        assert!(!Region::data(0, 0).is_same(&Region::string(1, 1)));
    }

    #[test]
    fn split_unknown() {
        let mut r = Region::unknown(0, 9);
        assert!(r.split_after(9).is_none());
        assert!(r.split_before(0).is_none());
        let rest = r.split_after(3).unwrap();
        assert_eq!((r.address_start(), r.address_end()), (0, 3));
        assert_eq!((rest.address_start(), rest.address_end()), (4, 9));
        assert_eq!(r.line_count() + rest.line_count(), 10);
    }

    #[test]
    fn split_code_moves_instructions() {
        let mut r = Region::code(0, 4, vec![nop(0), lda(1), lda(3)]);
        let head = r.split_before(3).unwrap();
        assert_eq!(head.instructions(), &[nop(0), lda(1)]);
        assert_eq!(r.instructions(), &[lda(3)]);
        assert_eq!((head.address_start(), head.address_end()), (0, 2));

        let mut r = Region::code(0, 4, vec![nop(0), lda(1), lda(3)]);
        let tail = r.split_after(0).unwrap();
        assert_eq!(r.instructions(), &[nop(0)]);
        assert_eq!(tail.instructions(), &[lda(1), lda(3)]);
    }

    fn lda_abs(address: u64) -> Instruction {
        Instruction::new(address, "LDA", vec![], vec![0xad, 0x00, 0x00])
    }

    #[test]
    fn split_inside_an_instruction() {
        let mut r = Region::code(0, 5, vec![lda_abs(0), lda_abs(3)]);
        let head = r.split_before(4).unwrap();
        assert_eq!(head.kind(), RegionKind::Code);
        assert_eq!(head.instructions(), &[lda_abs(0)]);
        assert_eq!(head.line_count(), 2);
        assert_eq!(head.address_for_line(1), Ok(3));
        assert_eq!(head.line_offset_for_address(3), Ok(1));
        assert_eq!(r.kind(), RegionKind::Unknown);
        assert_eq!(r.line_count(), 2);

        let mut r = Region::code(0, 5, vec![lda_abs(0), lda_abs(3)]);
        let rest = r.split_after(1).unwrap();
        assert_eq!(r.kind(), RegionKind::Unknown);
        assert_eq!(r.line_count(), 2);
        assert_eq!(rest.instructions(), &[lda_abs(3)]);
        assert_eq!(rest.line_count(), 2);
        assert_eq!(rest.address_for_line(0), Ok(2));
        assert_eq!(rest.line_offset_for_address(4), Ok(1));
    }

    #[test]
    fn whole_address_space() {
        let r = Region::unknown(0, u64::MAX);
        assert_eq!(r.len(), u64::MAX);
        assert_eq!(r.line_count(), u64::MAX);

        let mut c = crate::RangeCollection::new();
        c.add_range(r);
        assert_eq!(c.line_count(), u64::MAX);
        c.add_range(Region::data(5, 5));
        assert_eq!(c.len(), 3);
        assert_eq!(c.line_count(), u64::MAX);
        assert_eq!(c.line_for_address(5), Some(5));
    }

    #[test]
    fn split_keeps_kind() {
        let mut r = Region::string(0, 31);
        let rest = r.split_after(15).unwrap();
        assert_eq!(rest.kind(), RegionKind::String);
    }

    #[test]
    fn combine_code() {
        let mut a = Region::code(0, 0, vec![nop(0)]);
        let b = Region::code(1, 2, vec![lda(1)]);
        a.combine_adjacent(&b).unwrap();
        assert_eq!(a.address_end(), 2);
        assert_eq!(a.instructions(), &[nop(0), lda(1)]);
        assert!(a.combine_adjacent(&Region::code(5, 5, vec![])).is_err());
        assert!(a.combine_adjacent(&Region::data(3, 3)).is_err());
    }

    #[test]
    fn line_mapping() {
        let r = Region::data(0x100, 0x13f);
        assert_eq!(r.line_offset_for_address(0x11f), Ok(1));
        assert_eq!(r.address_for_line(3), Ok(0x130));
        assert_eq!(
            r.address_for_line(4),
            Err(RangeError::LineOutOfRange {
                line: 4,
                line_count: 4
            })
        );
        assert!(matches!(
            r.line_offset_for_address(0x140),
            Err(RangeError::AddressOutOfRange { .. })
        ));

        let code = Region::code(0, 4, vec![nop(0), lda(1), lda(3)]);
        assert_eq!(code.line_offset_for_address(2), Ok(1));
        assert_eq!(code.line_offset_for_address(4), Ok(2));
        assert_eq!(code.address_for_line(2), Ok(3));
        assert!(code.address_for_line(3).is_err());
    }
}

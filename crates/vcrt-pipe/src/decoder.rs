// ABOUTME: Reassembles 5-byte instruction records from arbitrarily split reads.
// ABOUTME: Bytes of an incomplete record are held until the rest arrives.

use vcrt_core::instruction::decode_stream;
use vcrt_core::{Instruction, INSTRUCTION_SIZE};

#[derive(Debug, Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes waiting for the rest of their record
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Decode every record completed by `bytes`
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Instruction> {
        if self.pending.is_empty() {
            let (instructions, rest) = decode_stream(bytes);
            self.pending.extend_from_slice(rest);
            return instructions;
        }

        self.pending.extend_from_slice(bytes);
        let (instructions, rest) = decode_stream(&self.pending);
        let consumed = self.pending.len() - rest.len();
        self.pending.drain(..consumed);
        debug_assert!(self.pending.len() < INSTRUCTION_SIZE);
        instructions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(instructions: &[Instruction]) -> Vec<u8> {
        instructions.iter().flat_map(|i| i.encode()).collect()
    }

    #[test]
    fn whole_records_pass_through() {
        let expected = vec![Instruction::power_on(), Instruction::set_target(-3, 7)];
        let mut decoder = StreamDecoder::new();
        assert_eq!(decoder.feed(&stream(&expected)), expected);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn reassembles_across_reads() {
        let expected = vec![
            Instruction::set_target(100, 200),
            Instruction::clear(),
            Instruction::power_off(),
        ];
        let bytes = stream(&expected);

        // Split at every size from one byte upward
        for chunk in 1..=bytes.len() {
            let mut decoder = StreamDecoder::new();
            let mut decoded = Vec::new();
            for piece in bytes.chunks(chunk) {
                decoded.extend(decoder.feed(piece));
            }
            assert_eq!(decoded, expected, "chunk size {chunk}");
            assert_eq!(decoder.pending_len(), 0);
        }
    }

    #[test]
    fn holds_incomplete_tail() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.feed(&[1, 0, 0]).is_empty());
        assert_eq!(decoder.pending_len(), 3);
        assert_eq!(decoder.feed(&[5, 6]), vec![Instruction::new(1, 0x0000_0506)]);
    }
}

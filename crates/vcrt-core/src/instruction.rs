// ABOUTME: Fixed 5-byte instruction wire format and its interpretation.
// ABOUTME: Decoding never fails; unknown opcodes surface as Command::Unknown.

/// Size of one instruction record on the wire
pub const INSTRUCTION_SIZE: usize = 5;

/// A decoded record: `[opcode:1][data:4 big-endian]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u8,
    pub data: u32,
}

impl Instruction {
    pub const fn new(opcode: u8, data: u32) -> Self {
        Self { opcode, data }
    }

    pub fn decode(bytes: [u8; INSTRUCTION_SIZE]) -> Self {
        let data = (u32::from(bytes[1]) << 24)
            | (u32::from(bytes[2]) << 16)
            | (u32::from(bytes[3]) << 8)
            | u32::from(bytes[4]);
        Self {
            opcode: bytes[0],
            data,
        }
    }

    pub fn encode(&self) -> [u8; INSTRUCTION_SIZE] {
        let [a, b, c, d] = self.data.to_be_bytes();
        [self.opcode, a, b, c, d]
    }

    /// Payload read as a packed coordinate pair
    pub fn coords(&self) -> (i16, i16) {
        decode_coords(self.data)
    }

    pub fn clear() -> Self {
        Self::new(opcode::CLEAR, 0)
    }

    pub fn set_target(x: i16, y: i16) -> Self {
        Self::new(opcode::SET_TARGET, encode_coords(x, y))
    }

    pub fn power_off() -> Self {
        Self::new(opcode::POWER_OFF, 0)
    }

    pub fn power_on() -> Self {
        Self::new(opcode::POWER_ON, 0)
    }
}

pub mod opcode {
    pub const CLEAR: u8 = 0;
    pub const SET_TARGET: u8 = 1;
    /// Legacy instruction set reuses opcode 1 for appending a point
    pub const SET_POINT: u8 = 1;
    pub const POWER_OFF: u8 = 2;
    pub const POWER_ON: u8 = 3;
}

/// Pack two signed 16-bit coordinates into one payload
pub fn encode_coords(x: i16, y: i16) -> u32 {
    ((x as u16 as u32) << 16) | (y as u16 as u32)
}

/// Unpack a coordinate payload, sign-extending each half
pub fn decode_coords(data: u32) -> (i16, i16) {
    ((data >> 16) as u16 as i16, (data & 0xFFFF) as u16 as i16)
}

/// Decode every whole record in `bytes`.
/// Returns the instructions and the trailing bytes of an incomplete record.
pub fn decode_stream(bytes: &[u8]) -> (Vec<Instruction>, &[u8]) {
    let chunks = bytes.chunks_exact(INSTRUCTION_SIZE);
    let remainder = chunks.remainder();
    let instructions = chunks
        .map(|chunk| {
            let mut record = [0u8; INSTRUCTION_SIZE];
            record.copy_from_slice(chunk);
            Instruction::decode(record)
        })
        .collect();
    (instructions, remainder)
}

/// Typed meaning of an instruction under the active instruction set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Clear,
    SetTarget { x: i16, y: i16 },
    PowerOn,
    PowerOff,
    SetPoint { x: i16, y: i16 },
    Unknown { opcode: u8 },
}

/// Which opcode table applies. Resolved once from the display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionSet {
    /// Electron gun: clear, set target, power off, power on
    Vector,
    /// Line list: clear, set point
    Legacy,
}

impl InstructionSet {
    pub fn interpret(self, instruction: Instruction) -> Command {
        match (self, instruction.opcode) {
            (_, opcode::CLEAR) => Command::Clear,
            (InstructionSet::Vector, opcode::SET_TARGET) => {
                let (x, y) = instruction.coords();
                Command::SetTarget { x, y }
            }
            (InstructionSet::Vector, opcode::POWER_OFF) => Command::PowerOff,
            (InstructionSet::Vector, opcode::POWER_ON) => Command::PowerOn,
            (InstructionSet::Legacy, opcode::SET_POINT) => {
                let (x, y) = instruction.coords();
                Command::SetPoint { x, y }
            }
            (_, other) => Command::Unknown { opcode: other },
        }
    }
}

// ABOUTME: Outbound events reported to clients: frames, keyboard, mouse and queue state.
// ABOUTME: Each event is 9 bytes on the wire: kind, then a big-endian u64 payload.

pub const EVENT_SIZE: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    FrameFinished,
    KeyPressed,
    KeyReleased,
    MouseMoved,
    MousePressed,
    MouseReleased,
    InstructionBufferEmpty,
}

impl EventKind {
    pub fn code(self) -> u8 {
        match self {
            EventKind::FrameFinished => 0,
            EventKind::KeyPressed => 1,
            EventKind::KeyReleased => 2,
            EventKind::MouseMoved => 3,
            EventKind::MousePressed => 4,
            EventKind::MouseReleased => 5,
            EventKind::InstructionBufferEmpty => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => EventKind::FrameFinished,
            1 => EventKind::KeyPressed,
            2 => EventKind::KeyReleased,
            3 => EventKind::MouseMoved,
            4 => EventKind::MousePressed,
            5 => EventKind::MouseReleased,
            6 => EventKind::InstructionBufferEmpty,
            _ => return None,
        })
    }
}

/// Mouse button codes carried by press/release events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButton(pub u64);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const MIDDLE: Self = Self(2);
    pub const BACK: Self = Self(3);
    pub const FORWARD: Self = Self(4);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub data: u64,
}

impl Event {
    pub const fn new(kind: EventKind, data: u64) -> Self {
        Self { kind, data }
    }

    pub fn frame_finished() -> Self {
        Self::new(EventKind::FrameFinished, 0)
    }

    pub fn key_pressed(scancode: u32) -> Self {
        Self::new(EventKind::KeyPressed, u64::from(scancode))
    }

    pub fn key_released(scancode: u32) -> Self {
        Self::new(EventKind::KeyReleased, u64::from(scancode))
    }

    pub fn mouse_moved(x: u32, y: u32) -> Self {
        Self::new(EventKind::MouseMoved, (u64::from(x) << 32) | u64::from(y))
    }

    pub fn mouse_pressed(button: MouseButton) -> Self {
        Self::new(EventKind::MousePressed, button.0)
    }

    pub fn mouse_released(button: MouseButton) -> Self {
        Self::new(EventKind::MouseReleased, button.0)
    }

    pub fn instruction_buffer_empty() -> Self {
        Self::new(EventKind::InstructionBufferEmpty, 0)
    }

    /// `(x, y)` for mouse movement events
    pub fn mouse_position(&self) -> Option<(u32, u32)> {
        (self.kind == EventKind::MouseMoved).then(|| ((self.data >> 32) as u32, self.data as u32))
    }

    pub fn encode(&self) -> [u8; EVENT_SIZE] {
        let mut bytes = [0u8; EVENT_SIZE];
        bytes[0] = self.kind.code();
        bytes[1..].copy_from_slice(&self.data.to_be_bytes());
        bytes
    }

    /// None for an unknown kind byte
    pub fn decode(bytes: [u8; EVENT_SIZE]) -> Option<Self> {
        let kind = EventKind::from_code(bytes[0])?;
        let mut data = [0u8; 8];
        data.copy_from_slice(&bytes[1..]);
        Some(Self::new(kind, u64::from_be_bytes(data)))
    }
}

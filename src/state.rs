use crate::constants::{
    FRAME_BUFFER_SIZE, GLYPH_TABLE, KEY_COUNT, MEMORY_SIZE, PROGRAM_START, STACK_DEPTH,
};
use crate::fault::Fault;

/// The frame buffer is linear and row-major: cell `i` is screen column
/// `i % DISPLAY_WIDTH` on row `i / DISPLAY_WIDTH`.
pub type FrameBuffer = [bool; FRAME_BUFFER_SIZE];

/// Pressed state of the hexadecimal keypad, indexed 0x0..0xF. Written only
/// by the host's input collaborator; the machine itself only reads it.
pub type Keypad = [bool; KEY_COUNT];

/// A snapshot of the machine's internal state.
///
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose
///     - the 16th (VF) doubles as the carry/borrow/collision flag
/// - (i) a 16-bit index register holding a 12-bit address; it may exceed
///   0xFFF transiently after add-to-index and must not be dereferenced
///   unchecked
/// - (pc) a 16-bit program counter
/// - (sp) a stack pointer into a 16-deep call stack
///
/// Timers
/// - two 8-bit countdown timers (delay & sound), decremented by the tick
///   driver at a cadence decoupled from instruction throughput
///
/// Memory
/// - 4096 bytes of addressable memory; the glyph table occupies
///   0x000..0x050 and program images load at 0x200
/// - a 64x32 monochrome frame buffer plus a dirty flag the host reads and
///   clears once per frame
///
/// Faults
/// - a recorded halt cause, if any; a faulted machine executes nothing
///   further until reset
#[derive(Copy, Clone)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub keys: Keypad,
    pub fault: Option<Fault>,
}

impl State {
    /// Power-on state: everything zeroed, the glyph table copied into low
    /// memory, and the program counter at the image load address.
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[0..GLYPH_TABLE.len()].copy_from_slice(&GLYPH_TABLE);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory,
            frame_buffer: [false; FRAME_BUFFER_SIZE],
            draw_flag: false,
            keys: [false; KEY_COUNT],
            fault: None,
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

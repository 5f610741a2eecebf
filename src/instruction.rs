use std::fmt;

use crate::operations;
use crate::state::State;
use crate::word::Word;

/// A decoded instruction.
///
/// Classification is keyed on the word's leading nibble; the 0x8 family
/// dispatches a second time on its trailing nibble, and the 0xE/0xF families
/// on their trailing byte. Words that match no operation decode to `None`
/// and are left to the tick driver to report.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1nnn
    Jump { addr: u16 },
    /// 2nnn
    Call { addr: u16 },
    /// 3xkk
    SkipEqImm { x: usize, byte: u8 },
    /// 4xkk
    SkipNeImm { x: usize, byte: u8 },
    /// 5xy0
    SkipEqReg { x: usize, y: usize },
    /// 6xkk
    LoadImm { x: usize, byte: u8 },
    /// 7xkk
    AddImm { x: usize, byte: u8 },
    /// 8xy0
    Copy { x: usize, y: usize },
    /// 8xy1
    Or { x: usize, y: usize },
    /// 8xy2
    And { x: usize, y: usize },
    /// 8xy3
    Xor { x: usize, y: usize },
    /// 8xy4
    Add { x: usize, y: usize },
    /// 8xy5
    Sub { x: usize, y: usize },
    /// 8xy6; the y operand is discarded at decode time (see `operations::shift_right`)
    ShiftRight { x: usize },
    /// 8xy7
    SubReverse { x: usize, y: usize },
    /// 8xyE; the y operand is discarded at decode time (see `operations::shift_left`)
    ShiftLeft { x: usize },
    /// 9xy0
    SkipNeReg { x: usize, y: usize },
    /// Annn
    LoadIndex { addr: u16 },
    /// Bnnn
    JumpOffset { addr: u16 },
    /// Cxkk
    Random { x: usize, mask: u8 },
    /// Dxyn
    Draw { x: usize, y: usize, height: u8 },
    /// Ex9E
    SkipKeyPressed { x: usize },
    /// ExA1
    SkipKeyNotPressed { x: usize },
    /// Fx07
    ReadDelay { x: usize },
    /// Fx0A
    WaitKey { x: usize },
    /// Fx15
    SetDelay { x: usize },
    /// Fx18
    SetSound { x: usize },
    /// Fx1E
    AddIndex { x: usize },
    /// Fx29
    GlyphIndex { x: usize },
    /// Fx33
    StoreBcd { x: usize },
    /// Fx55
    DumpRegisters { x: usize },
    /// Fx65
    LoadRegisters { x: usize },
}

impl Instruction {
    /// Classify a raw instruction word, or `None` for an unknown word.
    pub fn decode(word: Word) -> Option<Instruction> {
        let instruction = match word.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Instruction::Clear,
            (0x0, 0x0, 0xE, 0xE) => Instruction::Return,
            (0x1, ..) => Instruction::Jump { addr: word.addr() },
            (0x2, ..) => Instruction::Call { addr: word.addr() },
            (0x3, ..) => Instruction::SkipEqImm {
                x: word.x(),
                byte: word.kk(),
            },
            (0x4, ..) => Instruction::SkipNeImm {
                x: word.x(),
                byte: word.kk(),
            },
            (0x5, .., 0x0) => Instruction::SkipEqReg {
                x: word.x(),
                y: word.y(),
            },
            (0x6, ..) => Instruction::LoadImm {
                x: word.x(),
                byte: word.kk(),
            },
            (0x7, ..) => Instruction::AddImm {
                x: word.x(),
                byte: word.kk(),
            },
            (0x8, .., 0x0) => Instruction::Copy {
                x: word.x(),
                y: word.y(),
            },
            (0x8, .., 0x1) => Instruction::Or {
                x: word.x(),
                y: word.y(),
            },
            (0x8, .., 0x2) => Instruction::And {
                x: word.x(),
                y: word.y(),
            },
            (0x8, .., 0x3) => Instruction::Xor {
                x: word.x(),
                y: word.y(),
            },
            (0x8, .., 0x4) => Instruction::Add {
                x: word.x(),
                y: word.y(),
            },
            (0x8, .., 0x5) => Instruction::Sub {
                x: word.x(),
                y: word.y(),
            },
            (0x8, .., 0x6) => Instruction::ShiftRight { x: word.x() },
            (0x8, .., 0x7) => Instruction::SubReverse {
                x: word.x(),
                y: word.y(),
            },
            (0x8, .., 0xE) => Instruction::ShiftLeft { x: word.x() },
            (0x9, .., 0x0) => Instruction::SkipNeReg {
                x: word.x(),
                y: word.y(),
            },
            (0xA, ..) => Instruction::LoadIndex { addr: word.addr() },
            (0xB, ..) => Instruction::JumpOffset { addr: word.addr() },
            (0xC, ..) => Instruction::Random {
                x: word.x(),
                mask: word.kk(),
            },
            (0xD, ..) => Instruction::Draw {
                x: word.x(),
                y: word.y(),
                height: word.n(),
            },
            (0xE, .., 0x9, 0xE) => Instruction::SkipKeyPressed { x: word.x() },
            (0xE, .., 0xA, 0x1) => Instruction::SkipKeyNotPressed { x: word.x() },
            (0xF, .., 0x0, 0x7) => Instruction::ReadDelay { x: word.x() },
            (0xF, .., 0x0, 0xA) => Instruction::WaitKey { x: word.x() },
            (0xF, .., 0x1, 0x5) => Instruction::SetDelay { x: word.x() },
            (0xF, .., 0x1, 0x8) => Instruction::SetSound { x: word.x() },
            (0xF, .., 0x1, 0xE) => Instruction::AddIndex { x: word.x() },
            (0xF, .., 0x2, 0x9) => Instruction::GlyphIndex { x: word.x() },
            (0xF, .., 0x3, 0x3) => Instruction::StoreBcd { x: word.x() },
            (0xF, .., 0x5, 0x5) => Instruction::DumpRegisters { x: word.x() },
            (0xF, .., 0x6, 0x5) => Instruction::LoadRegisters { x: word.x() },
            _ => return None,
        };
        Some(instruction)
    }

    /// Apply the instruction to `state`, producing the successor state.
    pub fn execute(self, state: &State) -> State {
        match self {
            Instruction::Clear => operations::clear(state),
            Instruction::Return => operations::ret(state),
            Instruction::Jump { addr } => operations::jump(state, addr),
            Instruction::Call { addr } => operations::call(state, addr),
            Instruction::SkipEqImm { x, byte } => operations::skip_eq_imm(state, x, byte),
            Instruction::SkipNeImm { x, byte } => operations::skip_ne_imm(state, x, byte),
            Instruction::SkipEqReg { x, y } => operations::skip_eq_reg(state, x, y),
            Instruction::LoadImm { x, byte } => operations::load_imm(state, x, byte),
            Instruction::AddImm { x, byte } => operations::add_imm(state, x, byte),
            Instruction::Copy { x, y } => operations::copy(state, x, y),
            Instruction::Or { x, y } => operations::or(state, x, y),
            Instruction::And { x, y } => operations::and(state, x, y),
            Instruction::Xor { x, y } => operations::xor(state, x, y),
            Instruction::Add { x, y } => operations::add(state, x, y),
            Instruction::Sub { x, y } => operations::sub(state, x, y),
            Instruction::ShiftRight { x } => operations::shift_right(state, x),
            Instruction::SubReverse { x, y } => operations::sub_reverse(state, x, y),
            Instruction::ShiftLeft { x } => operations::shift_left(state, x),
            Instruction::SkipNeReg { x, y } => operations::skip_ne_reg(state, x, y),
            Instruction::LoadIndex { addr } => operations::load_index(state, addr),
            Instruction::JumpOffset { addr } => operations::jump_offset(state, addr),
            Instruction::Random { x, mask } => operations::random(state, x, mask),
            Instruction::Draw { x, y, height } => operations::draw(state, x, y, height),
            Instruction::SkipKeyPressed { x } => operations::skip_key_pressed(state, x),
            Instruction::SkipKeyNotPressed { x } => operations::skip_key_not_pressed(state, x),
            Instruction::ReadDelay { x } => operations::read_delay(state, x),
            Instruction::WaitKey { x } => operations::wait_key(state, x),
            Instruction::SetDelay { x } => operations::set_delay(state, x),
            Instruction::SetSound { x } => operations::set_sound(state, x),
            Instruction::AddIndex { x } => operations::add_index(state, x),
            Instruction::GlyphIndex { x } => operations::glyph_index(state, x),
            Instruction::StoreBcd { x } => operations::store_bcd(state, x),
            Instruction::DumpRegisters { x } => operations::dump_registers(state, x),
            Instruction::LoadRegisters { x } => operations::load_registers(state, x),
        }
    }
}

/// Mnemonic rendering consumed by the trace sink.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Instruction::Clear => write!(f, "cls"),
            Instruction::Return => write!(f, "ret"),
            Instruction::Jump { addr } => write!(f, "jp {:03X}", addr),
            Instruction::Call { addr } => write!(f, "call {:03X}", addr),
            Instruction::SkipEqImm { x, byte } => write!(f, "se v{:X}, {:02X}", x, byte),
            Instruction::SkipNeImm { x, byte } => write!(f, "sne v{:X}, {:02X}", x, byte),
            Instruction::SkipEqReg { x, y } => write!(f, "se v{:X}, v{:X}", x, y),
            Instruction::LoadImm { x, byte } => write!(f, "ld v{:X}, {:02X}", x, byte),
            Instruction::AddImm { x, byte } => write!(f, "add v{:X}, {:02X}", x, byte),
            Instruction::Copy { x, y } => write!(f, "ld v{:X}, v{:X}", x, y),
            Instruction::Or { x, y } => write!(f, "or v{:X}, v{:X}", x, y),
            Instruction::And { x, y } => write!(f, "and v{:X}, v{:X}", x, y),
            Instruction::Xor { x, y } => write!(f, "xor v{:X}, v{:X}", x, y),
            Instruction::Add { x, y } => write!(f, "add v{:X}, v{:X}", x, y),
            Instruction::Sub { x, y } => write!(f, "sub v{:X}, v{:X}", x, y),
            Instruction::ShiftRight { x } => write!(f, "shr v{:X}", x),
            Instruction::SubReverse { x, y } => write!(f, "subn v{:X}, v{:X}", x, y),
            Instruction::ShiftLeft { x } => write!(f, "shl v{:X}", x),
            Instruction::SkipNeReg { x, y } => write!(f, "sne v{:X}, v{:X}", x, y),
            Instruction::LoadIndex { addr } => write!(f, "ld i, {:03X}", addr),
            Instruction::JumpOffset { addr } => write!(f, "jp v0, {:03X}", addr),
            Instruction::Random { x, mask } => write!(f, "rnd v{:X}, {:02X}", x, mask),
            Instruction::Draw { x, y, height } => write!(f, "drw v{:X}, v{:X}, {:X}", x, y, height),
            Instruction::SkipKeyPressed { x } => write!(f, "skp v{:X}", x),
            Instruction::SkipKeyNotPressed { x } => write!(f, "sknp v{:X}", x),
            Instruction::ReadDelay { x } => write!(f, "ld v{:X}, dt", x),
            Instruction::WaitKey { x } => write!(f, "ld v{:X}, k", x),
            Instruction::SetDelay { x } => write!(f, "ld dt, v{:X}", x),
            Instruction::SetSound { x } => write!(f, "ld st, v{:X}", x),
            Instruction::AddIndex { x } => write!(f, "add i, v{:X}", x),
            Instruction::GlyphIndex { x } => write!(f, "ld f, v{:X}", x),
            Instruction::StoreBcd { x } => write!(f, "ld b, v{:X}", x),
            Instruction::DumpRegisters { x } => write!(f, "ld [i], v{:X}", x),
            Instruction::LoadRegisters { x } => write!(f, "ld v{:X}, [i]", x),
        }
    }
}

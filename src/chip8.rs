use log::{error, trace, warn};

use crate::config::Config;
use crate::constants::{MAX_IMAGE_SIZE, MEMORY_SIZE, PROGRAM_START};
use crate::fault::Fault;
use crate::instruction::Instruction;
use crate::state::{FrameBuffer, State};
use crate::word::Word;

/// # Chip-8
/// The virtual machine: owns the machine state and drives the
/// fetch-decode-execute loop and the timer cadence.
///
/// Supplies interfaces for the host collaborators:
/// - copying a program image into memory
/// - pressing and releasing keypad keys
/// - ticking the machine once per host frame
/// - collecting the frame buffer when the dirty signal is raised
/// - observing the sound timer crossing zero
/// - inspecting the halt cause after a fault
pub struct Chip8 {
    state: State,
    config: Config,
    cycle_count: u64,
    sound_edge: bool,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Chip8 {
            state: State::new(),
            config,
            cycle_count: 0,
            sound_edge: false,
        }
    }

    /// Copy a headerless program image into memory at the load address.
    ///
    /// Oversized images are rejected without touching machine state.
    /// Reading the image from wherever it lives is the host's job.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), Fault> {
        if image.len() > MAX_IMAGE_SIZE {
            return Err(Fault::ImageTooLarge { len: image.len() });
        }
        let start = PROGRAM_START as usize;
        self.state.memory[start..start + image.len()].copy_from_slice(image);
        Ok(())
    }

    /// Return to power-on state, clearing any fault. The program image must
    /// be reloaded afterwards.
    pub fn reset(&mut self) {
        self.state = State::new();
        self.cycle_count = 0;
        self.sound_edge = false;
    }

    /// Run one host frame: `cycles_per_update` instruction cycles, with a
    /// timer decrement check after every cycle. A halted machine stays put.
    pub fn tick(&mut self) {
        for _ in 0..self.config.cycles_per_update {
            if self.state.fault.is_some() {
                return;
            }
            self.step();
            self.cycle_count += 1;
            self.advance_timers();
        }
    }

    /// The halt cause, if the machine has faulted.
    pub fn fault(&self) -> Option<Fault> {
        self.state.fault
    }

    /// Read-and-clear accessor for the dirty signal: the frame buffer if it
    /// changed since the last take. Draws between takes coalesce into one
    /// notification.
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    /// The frame buffer regardless of the dirty signal. Cell `i` is screen
    /// column `i % 64` on row `i / 64`.
    pub fn frame(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Read-and-clear accessor for the sound timer's nonzero-to-zero
    /// crossing. The machine produces no sound itself; audio collaborators
    /// key off this edge.
    pub fn take_sound_edge(&mut self) -> bool {
        let edge = self.sound_edge;
        self.sound_edge = false;
        edge
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }

    /// Set the pressed state of a keypad key. This is the input
    /// collaborator's interface; the machine itself never writes keys.
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.state.keys[(key & 0xF) as usize] = pressed;
    }

    pub fn key_press(&mut self, key: u8) {
        self.set_key(key, true);
    }

    pub fn key_release(&mut self, key: u8) {
        self.set_key(key, false);
    }

    /// One fetch-decode-execute cycle.
    fn step(&mut self) {
        let word = match self.fetch() {
            Some(word) => word,
            None => {
                let fault = Fault::ProgramCounterOutOfBounds { pc: self.state.pc };
                error!("{}", fault);
                self.state.fault = Some(fault);
                return;
            }
        };
        match Instruction::decode(word) {
            Some(instruction) => {
                if self.config.trace {
                    trace!("{:03X}: {} ; {}", self.state.pc, word, instruction);
                }
                self.state = instruction.execute(&self.state);
                if let Some(fault) = self.state.fault {
                    error!("{}", fault);
                }
            }
            // The PC stays put, so the same word is fetched next cycle
            None => warn!("unknown instruction {} at {:03X}", word, self.state.pc),
        }
    }

    /// Assemble the instruction word at the PC, high byte first.
    fn fetch(&self) -> Option<Word> {
        let pc = self.state.pc as usize;
        if pc + 1 >= MEMORY_SIZE {
            return None;
        }
        Some(Word::from_bytes(
            self.state.memory[pc],
            self.state.memory[pc + 1],
        ))
    }

    /// Timer decrement check, run once per cycle. Decrements land every
    /// `cycles_per_timer_decrement` cycles so the timer rate stays decoupled
    /// from instruction throughput; nonzero timers count toward zero and
    /// stop there.
    fn advance_timers(&mut self) {
        let cadence = u64::from(self.config.cycles_per_timer_decrement);
        if cadence == 0 || self.cycle_count % cadence != 0 {
            return;
        }
        if self.state.delay_timer > 0 {
            self.state.delay_timer -= 1;
        }
        if self.state.sound_timer > 0 {
            self.state.sound_timer -= 1;
            if self.state.sound_timer == 0 {
                self.sound_edge = true;
            }
        }
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test_chip8 {
    use super::*;

    fn machine_per_cycle_timers() -> Chip8 {
        Chip8::with_config(Config {
            cycles_per_timer_decrement: 1,
            ..Config::default()
        })
    }

    #[test]
    fn test_fetch_assembles_big_endian_words() {
        let mut chip8 = Chip8::new();
        chip8.state.memory[0x200..0x202].copy_from_slice(&[0xAA, 0xBB]);
        assert_eq!(chip8.fetch(), Some(Word(0xAABB)));
    }

    #[test]
    fn test_fetch_past_end_of_memory_halts() {
        let mut chip8 = Chip8::new();
        chip8.state.pc = 0xFFF;
        chip8.tick();
        assert_eq!(chip8.fault(), Some(Fault::ProgramCounterOutOfBounds { pc: 0xFFF }));
    }

    #[test]
    fn test_load_image_lands_at_the_load_address() {
        let mut chip8 = Chip8::new();
        chip8.load_image(&[0x00, 0xE0]).unwrap();
        assert_eq!(chip8.state.memory[0x200..0x202], [0x00, 0xE0]);
    }

    #[test]
    fn test_load_image_rejects_oversized_images() {
        let mut chip8 = Chip8::new();
        let image = [0u8; MAX_IMAGE_SIZE + 1];
        assert_eq!(
            chip8.load_image(&image),
            Err(Fault::ImageTooLarge { len: MAX_IMAGE_SIZE + 1 })
        );
        // A rejected image leaves memory untouched
        assert_eq!(chip8.state.memory[0x200..], [0u8; MAX_IMAGE_SIZE][..]);
    }

    #[test]
    fn test_load_image_accepts_the_largest_image() {
        let mut chip8 = Chip8::new();
        let image = [0xFFu8; MAX_IMAGE_SIZE];
        assert!(chip8.load_image(&image).is_ok());
        assert_eq!(chip8.state.memory[0xFFF], 0xFF);
    }

    #[test]
    fn test_one_cycle_scenario_load_immediate() {
        let mut chip8 = Chip8::new();
        chip8.load_image(&[0x60, 0x2A]).unwrap();
        chip8.tick();
        assert_eq!(chip8.state.v[0x0], 0x2A);
        assert_eq!(chip8.state.pc, 0x202);
    }

    #[test]
    fn test_two_cycle_scenario_call_then_return() {
        let mut chip8 = Chip8::new();
        let mut image = [0u8; 0x102];
        image[0x000..0x002].copy_from_slice(&[0x23, 0x00]); // 0x200: call 0x300
        image[0x100..0x102].copy_from_slice(&[0x00, 0xEE]); // 0x300: ret
        chip8.load_image(&image).unwrap();
        chip8.tick();
        assert_eq!(chip8.state.pc, 0x300);
        chip8.tick();
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.sp, 0x0);
    }

    #[test]
    fn test_draw_scenario_raises_the_dirty_signal() {
        let mut chip8 = Chip8::new();
        // ld i, 0x300; drw v0, v1, 1; sprite row 0xFF at 0x300
        let mut image = [0u8; 0x102];
        image[0x000..0x004].copy_from_slice(&[0xA3, 0x00, 0xD0, 0x11]);
        image[0x100] = 0xFF;
        chip8.load_image(&image).unwrap();
        chip8.tick();
        chip8.tick();
        let frame = chip8.take_frame().expect("dirty signal should be raised");
        assert!(frame[0..8].iter().all(|&px| px));
        assert_eq!(chip8.state.v[0xF], 0x0);
        // The signal is edge-triggered: the take cleared it
        assert_eq!(chip8.take_frame(), None);
    }

    #[test]
    fn test_unknown_instruction_stalls_the_pc() {
        let mut chip8 = Chip8::new();
        chip8.load_image(&[0x01, 0x23]).unwrap();
        chip8.tick();
        chip8.tick();
        assert_eq!(chip8.state.pc, 0x200);
        assert_eq!(chip8.fault(), None);
    }

    #[test]
    fn test_halted_machine_ignores_ticks() {
        let mut chip8 = Chip8::new();
        chip8.load_image(&[0x00, 0xEE]).unwrap(); // ret with an empty stack
        chip8.tick();
        assert_eq!(chip8.fault(), Some(Fault::StackUnderflow { pc: 0x200 }));
        let pc = chip8.state.pc;
        chip8.tick();
        assert_eq!(chip8.state.pc, pc);
    }

    #[test]
    fn test_delay_timer_counts_to_zero_and_stops() {
        let mut chip8 = machine_per_cycle_timers();
        // ld v0, 5; ld dt, v0; then jp 0x204 forever
        chip8
            .load_image(&[0x60, 0x05, 0xF0, 0x15, 0x12, 0x04])
            .unwrap();
        chip8.tick();
        chip8.tick();
        assert_eq!(chip8.delay_timer(), 0x4); // set to 5, then one decrement
        for _ in 0..4 {
            chip8.tick();
        }
        assert_eq!(chip8.delay_timer(), 0x0);
        for _ in 0..3 {
            chip8.tick();
        }
        assert_eq!(chip8.delay_timer(), 0x0);
    }

    #[test]
    fn test_timer_cadence_is_decoupled_from_throughput() {
        let mut chip8 = Chip8::with_config(Config {
            cycles_per_timer_decrement: 10,
            ..Config::default()
        });
        chip8.load_image(&[0x60, 0x05, 0xF0, 0x15, 0x12, 0x04]).unwrap();
        for _ in 0..9 {
            chip8.tick();
        }
        // Nine cycles in, the first decrement (at cycle 10) hasn't landed
        assert_eq!(chip8.delay_timer(), 0x5);
        chip8.tick();
        assert_eq!(chip8.delay_timer(), 0x4);
    }

    #[test]
    fn test_sound_timer_crossing_zero_raises_the_edge() {
        let mut chip8 = machine_per_cycle_timers();
        // ld v0, 2; ld st, v0; then jp 0x204 forever
        chip8
            .load_image(&[0x60, 0x02, 0xF0, 0x18, 0x12, 0x04])
            .unwrap();
        chip8.tick();
        chip8.tick();
        assert_eq!(chip8.sound_timer(), 0x1);
        assert!(!chip8.take_sound_edge());
        chip8.tick();
        assert_eq!(chip8.sound_timer(), 0x0);
        assert!(chip8.take_sound_edge());
        // The edge is read-and-clear
        assert!(!chip8.take_sound_edge());
    }

    #[test]
    fn test_wait_key_stalls_until_a_key_while_timers_run() {
        let mut chip8 = machine_per_cycle_timers();
        // ld v0, 3; ld dt, v0; ld v1, k
        chip8
            .load_image(&[0x60, 0x03, 0xF0, 0x15, 0xF1, 0x0A])
            .unwrap();
        chip8.tick();
        chip8.tick();
        chip8.tick();
        chip8.tick();
        // Stalled on the wait, but the delay timer kept counting
        assert_eq!(chip8.state.pc, 0x204);
        assert_eq!(chip8.delay_timer(), 0x0);
        chip8.key_press(0x7);
        chip8.tick();
        assert_eq!(chip8.state.v[0x1], 0x7);
        assert_eq!(chip8.state.pc, 0x206);
    }

    #[test]
    fn test_cycles_per_update_batches_cycles() {
        let mut chip8 = Chip8::with_config(Config {
            cycles_per_update: 3,
            ..Config::default()
        });
        // Three register loads in a row
        chip8
            .load_image(&[0x60, 0x01, 0x61, 0x02, 0x62, 0x03])
            .unwrap();
        chip8.tick();
        assert_eq!(chip8.state.pc, 0x206);
        assert_eq!(chip8.state.v[0x0..0x3], [0x1, 0x2, 0x3]);
    }

    #[test]
    fn test_set_key_is_visible_to_the_core() {
        let mut chip8 = Chip8::new();
        chip8.key_press(0xE);
        assert!(chip8.state.keys[0xE]);
        chip8.key_release(0xE);
        assert!(!chip8.state.keys[0xE]);
    }

    #[test]
    fn test_reset_restores_power_on_state() {
        let mut chip8 = Chip8::new();
        chip8.load_image(&[0x00, 0xEE]).unwrap();
        chip8.key_press(0x1);
        chip8.tick();
        assert!(chip8.fault().is_some());
        chip8.reset();
        assert_eq!(chip8.fault(), None);
        assert_eq!(chip8.state.pc, 0x200);
        assert!(!chip8.state.keys[0x1]);
        // The program image is gone too; reloading is the host's call
        assert_eq!(chip8.state.memory[0x200..0x202], [0x0, 0x0]);
    }
}

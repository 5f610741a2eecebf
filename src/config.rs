/// Runtime options recognized by the machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Instruction cycles executed per `tick`.
    pub cycles_per_update: u32,
    /// Cycles between each timer decrement. Zero disables the timers.
    pub cycles_per_timer_decrement: u32,
    /// Emit a decoded description of every executed instruction to the log.
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycles_per_update: 1,
            cycles_per_timer_decrement: 10,
            trace: false,
        }
    }
}

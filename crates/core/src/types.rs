/// Simulation tick counter. Tick 0 is the state before the first step.
pub type Tick = u64;

/// Monotonic id assigned to every submitted input, used to order inputs within a tick.
pub type InputId = u64;

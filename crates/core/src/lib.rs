pub mod envelope;
pub mod game;
pub mod time;
pub mod types;

pub use envelope::InputEnvelope;
pub use game::{Game, TerminalOutcome};
pub use time::Micros;
pub use types::{InputId, Tick};

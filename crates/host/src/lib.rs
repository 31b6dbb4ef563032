mod host;

pub use host::{RunHost, RunResult};

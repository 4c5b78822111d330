pub mod payload;
pub mod ports;
pub mod stage;

// Re-export key types for easier access from other signflow modules (and lib.rs)
pub use payload::Payload;
pub use ports::{StageInput, StageOutput};
pub use stage::{map_each, ItemOutcome, Stage, StageStats};

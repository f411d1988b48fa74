pub mod agent;
pub mod generation;
pub mod providers;

pub use agent::{AdAgent, AgentOutput};
pub use generation::{GenerationError, GenerationState};

pub mod registry;

pub use registry::{Mode, ModeDefinition, ReasoningEffort};

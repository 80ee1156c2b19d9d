//! Model invocation: the transport seam the evaluation pipeline calls through.

#[path = "invoker/traits.rs"]
mod traits;

#[path = "invoker/usage.rs"]
mod usage;

#[path = "invoker/openai_compatible.rs"]
mod openai_compatible;

#[path = "invoker/config.rs"]
mod config;

#[path = "invoker/resilient.rs"]
mod resilient;

pub use config::ResilienceConfig;
pub use openai_compatible::OpenAICompatible;
pub use resilient::ResilientInvoker;
pub use traits::{Completion, ModelInvoker};
pub use usage::Usage;

pub mod assembler;
pub mod chain;
pub mod enricher;
pub mod error;
pub mod moralis;
pub mod pipeline;
pub mod provider;
pub mod settings;
pub mod slot;
pub mod throttle;
pub mod types;

pub use assembler::ResultSet;
pub use chain::Chain;
pub use error::{ApiError, PipelineError, PipelineResult};
pub use pipeline::Pipeline;
pub use slot::{BalanceSlot, SlotState};

//! Long-running platform operations: job submission responses, job status
//! polling, and waiting for modules to finish validating.

mod polling;
mod status;
mod waiting;

pub use polling::*;
pub use status::*;
pub use waiting::*;

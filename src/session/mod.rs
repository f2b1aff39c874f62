//! Capture session state
//!
//! This module holds the state shared between the control surface and the
//! acquisition thread: the dataset, the run flag and the start label.
//!
//! # Transitions
//!
//! ```text
//! Idle --Start--> Running --Stop--> Idle --Start--> Running ...
//!   any state --Reset--> Idle (empty dataset)
//! ```
//!
//! Start is a no-op while running. Start and Reset clear the dataset;
//! Stop never does.

pub mod state;
pub mod token;

pub use state::{DatasetDelta, RunStart, Session, PC_TIME_FORMAT, START_LABEL_FORMAT};
pub use token::RunToken;

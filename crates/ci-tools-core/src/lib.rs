pub mod error;
pub mod images;
pub mod io;
pub mod markdown_index;
pub mod probe;
pub mod security_config;
pub mod shutdown;
pub mod wait;

pub use error::{CiToolsError, Result};
pub use wait::{wait_at_most, PollConfig, WaitError};

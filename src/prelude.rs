pub use crate::base::{
    config::Config,
    error::{ToolError, ToolRes},
    types::{Err, Res, Void},
};
pub use anyhow::anyhow;
pub use tracing::{debug, error, info, instrument, warn};

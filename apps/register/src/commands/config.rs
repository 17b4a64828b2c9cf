//! # Config Commands
//!
//! Read-only access to the register configuration.

use tracing::debug;

use crate::state::RegisterConfig;

/// Gets the current register configuration.
///
/// ## When Used
/// - Front end startup (store name in the header)
/// - Currency formatting
/// - Pre-filling the open-drawer form (operator, opening float)
pub fn get_config(config: &RegisterConfig) -> RegisterConfig {
    debug!("get_config command");
    config.clone()
}

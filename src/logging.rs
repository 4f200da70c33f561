//! Process-wide logging bootstrap.
//!
//! Installs a `tracing-subscriber` fmt subscriber once per process. Later
//! calls are no-ops, so tests and the binary can both call it freely.

use crate::core::{Result, StoreError};
use once_cell::sync::OnceCell;
use tracing::{info, Level};

static INSTALLED_LEVEL: OnceCell<Level> = OnceCell::new();

/// Maps the `verbose` switch to a maximum level.
pub fn level_for(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Initializes logging at INFO, or DEBUG when `verbose`.
///
/// If another subscriber was already installed globally (e.g. by a test
/// harness) that subscriber is kept and this call still succeeds.
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = INSTALLED_LEVEL.get_or_try_init(|| -> Result<Level> {
        let level = level_for(verbose);
        let installed = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init();
        match installed {
            Ok(()) => Ok(level),
            Err(_) if tracing::dispatcher::has_been_set() => Ok(level),
            Err(err) => Err(StoreError::Config(format!("cannot install logger: {err}"))),
        }
    })?;

    info!(level = %level, "logging initialized");
    Ok(())
}

/// The level chosen by the first successful [`init_logging`] call.
pub fn installed_level() -> Option<Level> {
    INSTALLED_LEVEL.get().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_logging(true).unwrap();
        let first = installed_level();
        assert!(first.is_some());

        init_logging(false).unwrap();
        assert_eq!(installed_level(), first);
    }

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(true), Level::DEBUG);
        assert_eq!(level_for(false), Level::INFO);
    }
}

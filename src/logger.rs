//! Console output gated by the CLI's `--quiet` / `--verbose` flags.
//!
//! Errors always print. Everything else respects quiet mode; `verbose!`
//! lines additionally need verbose mode.

use std::sync::atomic::{AtomicBool, Ordering};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);
static VERBOSE_MODE: AtomicBool = AtomicBool::new(false);

/// Quiet wins when both are requested.
pub fn init(quiet: bool, verbose: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
    VERBOSE_MODE.store(verbose && !quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

pub fn is_verbose() -> bool {
    VERBOSE_MODE.load(Ordering::Relaxed)
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        if !$crate::logger::is_quiet() {
            println!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        if !$crate::logger::is_quiet() {
            println!("{} {}", $crate::constants::SUCCESS_PREFIX, format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::logger::is_verbose() {
            eprintln!("🔍 {}", format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        if !$crate::logger::is_quiet() {
            eprintln!("⚠️  {}", format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        eprintln!("❌ {}", format!($($arg)*));
    };
}

//! elib-test - Regression harness shared by the elib crates
//!
//! Each `tests/*_reg.rs` file runs a numbered sequence of checks through a
//! [`RegParams`] and asserts on [`RegParams::cleanup`] at the end:
//!
//! ```ignore
//! use elib_test::RegParams;
//!
//! let mut rp = RegParams::new("conncomp");
//! rp.compare_values(3.0, count as f64, 0.0); // 1
//! rp.write_volume_and_check(&labels)?; // 2
//! assert!(rp.cleanup());
//! ```
//!
//! Volumes written with [`RegParams::write_volume_and_check`] land in
//! `tests/regout/` at the workspace root and are compared with
//! `tests/golden/`. `REGTEST_MODE=generate` refreshes the golden files,
//! `REGTEST_MODE=display` skips the comparison.

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode, volume_to_text};

use elib_core::{Sample, Volume};

/// Single-channel 2D volume from rows given top to bottom.
///
/// # Panics
///
/// Panics on ragged or empty rows.
pub fn volume_from_rows<T: Sample>(rows: &[&[T]], bit_depth: u32) -> Volume<T> {
    let width = rows.first().map_or(0, |r| r.len());
    assert!(
        rows.iter().all(|r| r.len() == width),
        "rows of a test volume must have equal length"
    );
    let data = rows.concat();
    match Volume::from_vec(&[width, rows.len()], bit_depth, 1, data) {
        Ok(volume) => volume,
        Err(e) => panic!("invalid test volume: {e}"),
    }
}

fn workspace_root() -> String {
    // crates/elib-test
    format!("{}/../..", env!("CARGO_MANIFEST_DIR"))
}

/// Directory of the golden files.
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Directory the regression output is written to.
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}

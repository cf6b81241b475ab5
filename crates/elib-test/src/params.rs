//! Numbered checks of one regression test

use crate::error::{TestError, TestResult};
use crate::{golden_dir, regout_dir};
use elib_core::{Sample, Volume};
use std::fs;
use std::path::Path;

/// What to do with golden files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Overwrite golden files with the current output
    Generate,
    /// Compare output with golden files
    #[default]
    Compare,
    /// Write output only
    Display,
}

impl RegTestMode {
    /// Mode named by `REGTEST_MODE` (`generate`, `compare` or `display`);
    /// anything else selects [`RegTestMode::Compare`].
    pub fn from_env() -> Self {
        let value = std::env::var("REGTEST_MODE").unwrap_or_default();
        match value.trim().to_ascii_lowercase().as_str() {
            "generate" => Self::Generate,
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// State of one `*_reg` test.
///
/// Each check bumps the index, so a failure message names the check by the
/// `// N` comment next to it in the test source. Failures are collected and
/// reported together by [`RegParams::cleanup`].
pub struct RegParams {
    /// Test name without the `_reg` suffix
    pub test_name: String,
    pub mode: RegTestMode,
    index: usize,
    failures: Vec<TestError>,
}

impl RegParams {
    /// Start a test in the mode given by `REGTEST_MODE`.
    pub fn new(test_name: &str) -> Self {
        Self::with_mode(test_name, RegTestMode::from_env())
    }

    pub fn with_mode(test_name: &str, mode: RegTestMode) -> Self {
        eprintln!("==== {test_name}_reg ({mode:?}) ====");
        Self {
            test_name: test_name.to_string(),
            mode,
            index: 0,
            failures: Vec::new(),
        }
    }

    /// Number of checks run so far.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn next_index(&mut self) -> usize {
        self.index += 1;
        self.index
    }

    fn record(&mut self, failure: TestError) -> bool {
        eprintln!("{}_reg: {failure}", self.test_name);
        self.failures.push(failure);
        false
    }

    /// `actual` must be within `delta` of `expected`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        let index = self.next_index();
        if (expected - actual).abs() <= delta {
            return true;
        }
        self.record(TestError::Value {
            index,
            expected,
            actual,
            delta,
        })
    }

    /// `condition` must hold; `what` describes it in the failure report.
    pub fn check(&mut self, condition: bool, what: &str) -> bool {
        let index = self.next_index();
        if condition {
            return true;
        }
        self.record(TestError::Check {
            index,
            what: what.to_string(),
        })
    }

    /// Both volumes must have the same dimensions, channel count and
    /// samples. Bit depths are not compared.
    pub fn compare_volumes<T: Sample>(&mut self, expected: &Volume<T>, actual: &Volume<T>) -> bool {
        let index = self.next_index();
        if expected.dimensions() != actual.dimensions() || expected.channels() != actual.channels()
        {
            let shape = |v: &Volume<T>| {
                let mut s = v.dimensions().to_vec();
                s.push(v.channels());
                s
            };
            return self.record(TestError::VolumeShape {
                index,
                expected: shape(expected),
                actual: shape(actual),
            });
        }
        let differing = expected
            .data()
            .iter()
            .zip(actual.data())
            .position(|(a, b)| a != b);
        match differing {
            None => true,
            Some(i) => self.record(TestError::VolumeSample {
                index,
                at: expected.point_at(i % expected.voxel_count()).to_string(),
                expected: format!("{:?}", expected.data()[i]),
                actual: format!("{:?}", actual.data()[i]),
            }),
        }
    }

    /// Both byte strings must be equal.
    pub fn compare_strings(&mut self, expected: &[u8], actual: &[u8]) -> bool {
        let index = self.next_index();
        if expected == actual {
            return true;
        }
        self.record(TestError::Text {
            index,
            expected: String::from_utf8_lossy(expected).into_owned(),
            actual: String::from_utf8_lossy(actual).into_owned(),
        })
    }

    /// Write a volume as text to the output directory and check it against
    /// its golden file.
    ///
    /// The text is a header line with the dimensions followed by one line of
    /// samples per row, slices separated by a blank line.
    pub fn write_volume_and_check<T: Sample>(&mut self, volume: &Volume<T>) -> TestResult<bool> {
        self.write_data_and_check(volume_to_text(volume).as_bytes(), "txt")
    }

    /// Write `data` to the output directory and check it against its golden
    /// file.
    ///
    /// Generate mode (and compare mode when no golden file exists yet)
    /// stores the output as the new golden file; display mode only writes
    /// the output.
    pub fn write_data_and_check(&mut self, data: &[u8], ext: &str) -> TestResult<bool> {
        let index = self.next_index();
        fs::create_dir_all(regout_dir())?;
        let output = format!("{}/{}.{index:02}.{ext}", regout_dir(), self.test_name);
        fs::write(&output, data)?;

        let golden = format!(
            "{}/{}_golden.{index:02}.{ext}",
            golden_dir(),
            self.test_name
        );
        let have_golden = Path::new(&golden).exists();
        match self.mode {
            RegTestMode::Display => Ok(true),
            RegTestMode::Compare if have_golden => {
                if fs::read(&golden)? == data {
                    Ok(true)
                } else {
                    Ok(self.record(TestError::Golden {
                        index,
                        output,
                        golden,
                    }))
                }
            }
            RegTestMode::Generate | RegTestMode::Compare => {
                fs::create_dir_all(golden_dir())?;
                fs::write(&golden, data)?;
                eprintln!("{}_reg: wrote {golden}", self.test_name);
                Ok(true)
            }
        }
    }

    /// Report every failure and return `true` if there was none.
    pub fn cleanup(self) -> bool {
        if self.failures.is_empty() {
            eprintln!("SUCCESS: {}_reg ({} checks)", self.test_name, self.index);
            return true;
        }
        eprintln!(
            "FAILURE: {}_reg ({} of {} checks)",
            self.test_name,
            self.failures.len(),
            self.index
        );
        for failure in &self.failures {
            eprintln!("  {failure}");
        }
        false
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[TestError] {
        &self.failures
    }
}

/// Text rendering of a volume used for golden files.
pub fn volume_to_text<T: Sample>(volume: &Volume<T>) -> String {
    let dims = volume.dimensions();
    let mut text = format!("{dims:?} x{}\n", volume.channels());
    let row_len = dims[0] * volume.channels();
    let rows_per_slice = dims[1];
    for (r, row) in volume.data().chunks(row_len).enumerate() {
        if r > 0 && r % rows_per_slice == 0 {
            text.push('\n');
        }
        let line: Vec<String> = row.iter().map(|v| format!("{v:?}")).collect();
        text.push_str(&line.join(" "));
        text.push('\n');
    }
    text
}

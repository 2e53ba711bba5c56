// Integration test utilities
//
// Helpers for writing small OEIS-style corpora into a temporary directory.

#![allow(dead_code)] // not every test binary uses every helper

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use voeis::config::BuildConfig;

/// Excerpt of the real dumps, including the header comments they ship with
pub const STRIPPED: &str = "\
# OEIS Sequence Data (http://oeis.org/stripped.gz)
# Last Modified: January 1 2024
A000004 ,0,0,0,0,0,0,0,0,0,0,
A000027 ,1,2,3,4,5,6,7,8,9,10,11,12,
A000042 ,1,2,3,2,1,
A000045 ,0,1,1,2,3,5,8,13,21,34,55,89,144,
A000079 ,1,2,4,8,16,32,64,128,256,512,1024,2048,4096,8192,16384,32768,65536,131072,262144,524288,1048576,2097152,4194304,8388608,16777216,33554432,67108864,134217728,268435456,536870912,1073741824,2147483648,4294967296,
A033999 ,1,-1,1,-1,1,-1,1,-1,
";

pub const NAMES: &str = "\
# OEIS Sequence Names (http://oeis.org/names.gz)
# Last Modified: January 1 2024
A000004 The zero sequence.
A000027 The positive integers.
A000042 Test
A000045 Fibonacci numbers: F(n) = F(n-1) + F(n-2) with F(0) = 0 and F(1) = 1.
A000079 Powers of 2: a(n) = 2^n.
A033999 a(n) = (-1)^n.
";

/// A corpus on disk plus the config that builds it
pub struct Corpus {
    pub dir: TempDir,
    pub config: BuildConfig,
}

impl Corpus {
    pub fn new(stripped: &str, names: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let stripped_path = dir.path().join("stripped");
        let names_path = dir.path().join("names");
        fs::write(&stripped_path, stripped).expect("write stripped");
        fs::write(&names_path, names).expect("write names");
        let config = BuildConfig {
            stripped_path,
            names_path,
            out_dir: dir.path().join("db"),
        };
        Self { dir, config }
    }

    pub fn sample() -> Self {
        Self::new(STRIPPED, NAMES)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.config.out_dir.clone()
    }
}

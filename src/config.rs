//! Simulator configuration: memory layout, load address and run limits.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::vm::{Memory, Region};

/// Default start of the text segment and initial PC.
pub const TEXT_START: u32 = 0x0040_0000;

/// Size of each default region (1 MiB).
pub const REGION_SIZE: u32 = 0x0010_0000;

/// One mapped memory region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Name used in dumps; `stack` is special-cased by [`SimConfig::stack_top`].
    pub name: String,
    /// First mapped address.
    pub start: u32,
    /// Size in bytes.
    pub size: u32,
}

impl RegionConfig {
    fn new(name: &str, start: u32, size: u32) -> Self {
        RegionConfig {
            name: name.to_string(),
            start,
            size,
        }
    }

    /// One past the last mapped address, widened so the top of the address
    /// space does not overflow.
    fn end(&self) -> u64 {
        u64::from(self.start) + u64::from(self.size)
    }
}

/// Configuration for building a simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Mapped memory regions.
    pub regions: Vec<RegionConfig>,
    /// Load address for hex programs and the initial PC.
    pub text_start: u32,
    /// Cycle cap for `go`; `None` runs until the program halts.
    pub max_cycles: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            regions: vec![
                RegionConfig::new("text", TEXT_START, REGION_SIZE),
                RegionConfig::new("data", 0x1000_0000, REGION_SIZE),
                RegionConfig::new("stack", 0x7FF0_0000, REGION_SIZE),
                RegionConfig::new("ktext", 0x8000_0000, REGION_SIZE),
                RegionConfig::new("kdata", 0x9000_0000, REGION_SIZE),
            ],
            text_start: TEXT_START,
            max_cycles: None,
        }
    }
}

/// Error type for configuration loading and validation.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not valid JSON for [`SimConfig`].
    Parse(serde_json::Error),
    /// No regions are configured.
    NoRegions,
    /// A region has zero size or runs past the end of the address space.
    BadRegion(String),
    /// Two regions share addresses.
    Overlap(String, String),
    /// `text_start` is not inside any region.
    UnmappedText(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {e}"),
            ConfigError::Parse(e) => write!(f, "invalid config: {e}"),
            ConfigError::NoRegions => write!(f, "config maps no memory regions"),
            ConfigError::BadRegion(name) => {
                write!(f, "region '{name}' is empty or exceeds the address space")
            }
            ConfigError::Overlap(a, b) => write!(f, "regions '{a}' and '{b}' overlap"),
            ConfigError::UnmappedText(addr) => {
                write!(f, "text start {addr:#010x} is not inside any region")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl SimConfig {
    /// Read and validate a JSON configuration file.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed or
    /// validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: SimConfig = serde_json::from_str(&text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the region layout.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.regions.is_empty() {
            return Err(ConfigError::NoRegions);
        }
        for region in &self.regions {
            if region.size == 0 || region.end() > 1 << 32 {
                return Err(ConfigError::BadRegion(region.name.clone()));
            }
        }
        for (i, a) in self.regions.iter().enumerate() {
            for b in &self.regions[i + 1..] {
                if u64::from(a.start) < b.end() && u64::from(b.start) < a.end() {
                    return Err(ConfigError::Overlap(a.name.clone(), b.name.clone()));
                }
            }
        }
        let text = u64::from(self.text_start);
        if !self
            .regions
            .iter()
            .any(|r| u64::from(r.start) <= text && text < r.end())
        {
            return Err(ConfigError::UnmappedText(self.text_start));
        }
        Ok(())
    }

    /// Build zeroed memory with the configured regions.
    #[must_use]
    pub fn build_memory(&self) -> Memory {
        Memory::with_regions(
            self.regions
                .iter()
                .map(|r| Region::new(r.start, r.size))
                .collect(),
        )
    }

    /// Initial stack pointer: the last word of the `stack` region, if any.
    #[must_use]
    pub fn stack_top(&self) -> Option<u32> {
        self.regions
            .iter()
            .find(|r| r.name == "stack")
            .map(|r| r.start.wrapping_add(r.size).wrapping_sub(4))
    }
}

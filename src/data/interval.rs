//! # Genetic Intervals
//!
//! Parsed from `chr10:122892600-122892700`. Both bounds are inclusive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::variant::Chromosome;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneticInterval {
    pub chrom: Chromosome,
    pub start: u32,
    pub end: u32,
}

impl GeneticInterval {
    pub fn new(chrom: Chromosome, start: u32, end: u32) -> Self {
        Self { chrom, start, end }
    }

    pub fn contains(&self, chrom: Chromosome, pos: u32) -> bool {
        chrom == self.chrom && pos >= self.start && pos <= self.end
    }
}

impl FromStr for GeneticInterval {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (chrom, range) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("'{}' is not of the form chr10:122892600-122892700", s))?;
        let chrom: Chromosome = chrom.parse()?;
        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| format!("'{}' has no start-end range", s))?;
        let parse_pos = |p: &str| {
            p.trim()
                .replace(',', "")
                .parse::<u32>()
                .map_err(|e| format!("bad position '{}' in '{}': {}", p, s, e))
        };
        let start = parse_pos(start)?;
        let end = parse_pos(end)?;
        if start > end {
            return Err(format!("start {} is after end {} in '{}'", start, end, s));
        }
        Ok(Self { chrom, start, end })
    }
}

impl fmt::Display for GeneticInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chr{}:{}-{}", self.chrom, self.start, self.end)
    }
}

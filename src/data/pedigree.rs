//! # Pedigree and Inheritance
//!
//! Family structure and per-sample genotypes used by the inheritance filter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Genotype {
    HomRef,
    Het,
    HomVar,
    #[default]
    NoCall,
}

impl Genotype {
    /// At least one ALT allele observed
    pub fn carries_alt(self) -> bool {
        matches!(self, Genotype::Het | Genotype::HomVar)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PedigreeMember {
    pub name: String,
    #[serde(default)]
    pub sex: Sex,
    pub affected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother: Option<String>,
}

impl PedigreeMember {
    pub fn new(name: impl Into<String>, sex: Sex, affected: bool) -> Self {
        Self {
            name: name.into(),
            sex,
            affected,
            father: None,
            mother: None,
        }
    }

    pub fn with_parents(mut self, father: impl Into<String>, mother: impl Into<String>) -> Self {
        self.father = Some(father.into());
        self.mother = Some(mother.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pedigree {
    pub members: Vec<PedigreeMember>,
}

impl Pedigree {
    pub fn new(members: Vec<PedigreeMember>) -> Self {
        Self { members }
    }

    /// Single affected individual
    pub fn single_sample(name: impl Into<String>) -> Self {
        Self::new(vec![PedigreeMember::new(name, Sex::Unknown, true)])
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn affected(&self) -> impl Iterator<Item = &PedigreeMember> {
        self.members.iter().filter(|m| m.affected)
    }

    pub fn unaffected(&self) -> impl Iterator<Item = &PedigreeMember> {
        self.members.iter().filter(|m| !m.affected)
    }

    pub fn member(&self, name: &str) -> Option<&PedigreeMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Inheritance model requested for an analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModeOfInheritance {
    AutosomalDominant,
    AutosomalRecessive,
    XDominant,
    XRecessive,
    #[default]
    Undefined,
}

impl ModeOfInheritance {
    pub const ALL: [ModeOfInheritance; 5] = [
        ModeOfInheritance::AutosomalDominant,
        ModeOfInheritance::AutosomalRecessive,
        ModeOfInheritance::XDominant,
        ModeOfInheritance::XRecessive,
        ModeOfInheritance::Undefined,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModeOfInheritance::AutosomalDominant => "AUTOSOMAL_DOMINANT",
            ModeOfInheritance::AutosomalRecessive => "AUTOSOMAL_RECESSIVE",
            ModeOfInheritance::XDominant => "X_DOMINANT",
            ModeOfInheritance::XRecessive => "X_RECESSIVE",
            ModeOfInheritance::Undefined => "UNDEFINED",
        }
    }

    pub fn is_x_linked(self) -> bool {
        matches!(self, ModeOfInheritance::XDominant | ModeOfInheritance::XRecessive)
    }
}

impl fmt::Display for ModeOfInheritance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeOfInheritance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("permitted modes are: {}", super::permitted(&Self::ALL)))
    }
}

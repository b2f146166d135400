// src/region.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// One geographic column of the population table: the national total or a
/// province/territory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Canada,
    NewfoundlandAndLabrador,
    PrinceEdwardIsland,
    NovaScotia,
    NewBrunswick,
    Quebec,
    Ontario,
    Manitoba,
    Saskatchewan,
    Alberta,
    BritishColumbia,
    Yukon,
    NorthwestTerritories,
    Nunavut,
}

/// Number of region columns in the table.
pub const REGION_COUNT: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown region {0:?}")]
pub struct UnknownRegion(pub String);

impl Region {
    /// Every region, in the column order of the source CSV.
    pub const ALL: [Region; REGION_COUNT] = [
        Region::Canada,
        Region::NewfoundlandAndLabrador,
        Region::PrinceEdwardIsland,
        Region::NovaScotia,
        Region::NewBrunswick,
        Region::Quebec,
        Region::Ontario,
        Region::Manitoba,
        Region::Saskatchewan,
        Region::Alberta,
        Region::BritishColumbia,
        Region::Yukon,
        Region::NorthwestTerritories,
        Region::Nunavut,
    ];

    /// Header name of this region's column.
    pub fn column_name(&self) -> &'static str {
        match self {
            Region::Canada => "Canada",
            Region::NewfoundlandAndLabrador => "Newfoundland and Labrador",
            Region::PrinceEdwardIsland => "Prince Edward Island",
            Region::NovaScotia => "Nova Scotia",
            Region::NewBrunswick => "New Brunswick",
            Region::Quebec => "Quebec",
            Region::Ontario => "Ontario",
            Region::Manitoba => "Manitoba",
            Region::Saskatchewan => "Saskatchewan",
            Region::Alberta => "Alberta",
            Region::BritishColumbia => "British Columbia",
            Region::Yukon => "Yukon",
            Region::NorthwestTerritories => "Northwest Territories",
            Region::Nunavut => "Nunavut",
        }
    }

    /// Postal abbreviation; `CA` for the national total.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Region::Canada => "CA",
            Region::NewfoundlandAndLabrador => "NL",
            Region::PrinceEdwardIsland => "PE",
            Region::NovaScotia => "NS",
            Region::NewBrunswick => "NB",
            Region::Quebec => "QC",
            Region::Ontario => "ON",
            Region::Manitoba => "MB",
            Region::Saskatchewan => "SK",
            Region::Alberta => "AB",
            Region::BritishColumbia => "BC",
            Region::Yukon => "YT",
            Region::NorthwestTerritories => "NT",
            Region::Nunavut => "NU",
        }
    }

    /// Position of this region in [`Region::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Matches an exact column header, as found in the CSV.
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.column_name() == name)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Region {
    type Err = UnknownRegion;

    /// Accepts the column name (any case, any spacing) or the abbreviation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::ALL
            .into_iter()
            .find(|r| {
                r.column_name().eq_ignore_ascii_case(&wanted)
                    || r.abbreviation().eq_ignore_ascii_case(&wanted)
            })
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.column_name())
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

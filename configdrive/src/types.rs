// SPDX-License-Identifier: MIT

use core::fmt;
use core::str::FromStr;

/// On-disk encoding of the config drive payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentFormat {
    /// Raw ISO 9660 bytes.
    Iso,
    /// A mountable FAT filesystem.
    Vfat,
}

/// Class of storage scanned for config drive content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SearchLocation {
    /// Optical drives.
    Cdrom,
    /// Whole physical disks.
    Hdd,
    /// Disk partitions.
    Partition,
}

impl ContentFormat {
    pub const ALL: [ContentFormat; 2] = [ContentFormat::Iso, ContentFormat::Vfat];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFormat::Iso => "iso",
            ContentFormat::Vfat => "vfat",
        }
    }

    /// Optical media only carry ISO content; vfat is never looked for there.
    pub fn supports(&self, location: SearchLocation) -> bool {
        !matches!((self, location), (ContentFormat::Vfat, SearchLocation::Cdrom))
    }
}

impl SearchLocation {
    pub const ALL: [SearchLocation; 3] = [
        SearchLocation::Cdrom,
        SearchLocation::Hdd,
        SearchLocation::Partition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchLocation::Cdrom => "cdrom",
            SearchLocation::Hdd => "hdd",
            SearchLocation::Partition => "partition",
        }
    }
}

/// Names of every supported content format.
pub const CD_TYPES: [&str; 2] = ["iso", "vfat"];

/// Names of every supported search location.
pub const CD_LOCATIONS: [&str; 3] = ["cdrom", "hdd", "partition"];

/// Name that is not part of a closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownName(pub String);

impl fmt::Display for UnknownName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown name '{}'", self.0)
    }
}

impl std::error::Error for UnknownName {}

impl FromStr for ContentFormat {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

impl FromStr for SearchLocation {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchLocation::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for SearchLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

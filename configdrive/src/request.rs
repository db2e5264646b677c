// SPDX-License-Identifier: MIT

//! Search request negotiation.
//!
//! Configured types and locations are merged with the deprecated boolean
//! flags, validated against the supported names, and frozen into a typed
//! [`SearchRequest`] before any device is touched.

use std::collections::BTreeSet;

use crate::error::{ConfigDriveError, Result};
use crate::options::ConfigDriveOptions;
use crate::types::{CD_LOCATIONS, CD_TYPES, ContentFormat, SearchLocation};

/// Deprecated boolean aliases, each implying one format and one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyFlag {
    /// `raw_hdd`: raw ISO bytes on a physical disk.
    RawHdd,
    /// `cdrom`: ISO on an optical drive.
    Cdrom,
    /// `vfat`: FAT filesystem on a physical disk.
    Vfat,
}

impl LegacyFlag {
    pub const ALL: [LegacyFlag; 3] = [LegacyFlag::RawHdd, LegacyFlag::Cdrom, LegacyFlag::Vfat];

    pub fn implied(&self) -> (ContentFormat, SearchLocation) {
        match self {
            LegacyFlag::RawHdd => (ContentFormat::Iso, SearchLocation::Hdd),
            LegacyFlag::Cdrom => (ContentFormat::Iso, SearchLocation::Cdrom),
            LegacyFlag::Vfat => (ContentFormat::Vfat, SearchLocation::Hdd),
        }
    }

    pub fn is_set(&self, opts: &ConfigDriveOptions) -> bool {
        match self {
            LegacyFlag::RawHdd => opts.raw_hdd,
            LegacyFlag::Cdrom => opts.cdrom,
            LegacyFlag::Vfat => opts.vfat,
        }
    }

    /// Names this flag adds to the search space; empty when the flag is off.
    pub fn contribution(&self, active: bool) -> (BTreeSet<String>, BTreeSet<String>) {
        if !active {
            return (BTreeSet::new(), BTreeSet::new());
        }
        let (format, location) = self.implied();
        (
            BTreeSet::from([format.as_str().to_string()]),
            BTreeSet::from([location.as_str().to_string()]),
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            LegacyFlag::RawHdd => "raw_hdd",
            LegacyFlag::Cdrom => "cdrom",
            LegacyFlag::Vfat => "vfat",
        }
    }
}

/// Validated search space handed to a locator. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchRequest {
    formats: BTreeSet<ContentFormat>,
    locations: BTreeSet<SearchLocation>,
}

impl SearchRequest {
    pub fn formats(&self) -> &BTreeSet<ContentFormat> {
        &self.formats
    }

    pub fn locations(&self) -> &BTreeSet<SearchLocation> {
        &self.locations
    }

    /// True when there is nothing to search.
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty() || self.locations.is_empty()
    }

    /// `(format, location)` combinations to search, in a stable order.
    /// Combinations a medium cannot carry are left out.
    pub fn pairs(&self) -> impl Iterator<Item = (ContentFormat, SearchLocation)> + '_ {
        self.formats.iter().flat_map(move |&format| {
            self.locations
                .iter()
                .copied()
                .filter(move |&location| format.supports(location))
                .map(move |location| (format, location))
        })
    }
}

impl core::fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let join = |names: Vec<&str>| {
            if names.is_empty() {
                "-".to_string()
            } else {
                names.join(", ")
            }
        };
        write!(
            f,
            "types: {} | locations: {}",
            join(self.formats.iter().map(|t| t.as_str()).collect()),
            join(self.locations.iter().map(|l| l.as_str()).collect()),
        )
    }
}

/// Builds one validated [`SearchRequest`] from layered configuration.
#[derive(Debug, Clone)]
pub struct SearchRequestBuilder {
    types: BTreeSet<String>,
    locations: BTreeSet<String>,
}

impl SearchRequestBuilder {
    /// Starts from copies of the configured sets and folds in every
    /// active legacy flag.
    pub fn new(opts: &ConfigDriveOptions) -> Self {
        let mut builder = Self {
            types: opts.types.iter().cloned().collect(),
            locations: opts.locations.iter().cloned().collect(),
        };
        for flag in LegacyFlag::ALL {
            let active = flag.is_set(opts);
            if active {
                tracing::warn!(
                    flag = flag.name(),
                    "deprecated config drive option, use types and locations instead"
                );
            }
            builder.merge(flag.contribution(active));
        }
        builder
    }

    /// Unions a `(types, locations)` contribution into the search space.
    pub fn merge(&mut self, (types, locations): (BTreeSet<String>, BTreeSet<String>)) {
        self.types.extend(types);
        self.locations.extend(locations);
    }

    /// Types are checked first; the first offending set is reported whole.
    pub fn build(self) -> Result<SearchRequest> {
        let formats = parse_subset(self.types, &CD_TYPES, "types")?;
        let locations = parse_subset(self.locations, &CD_LOCATIONS, "locations")?;
        Ok(SearchRequest { formats, locations })
    }
}

/// Checks `names ⊆ universe` as one operation, then converts to the typed set.
fn parse_subset<T>(
    names: BTreeSet<String>,
    universe: &[&str],
    field: &'static str,
) -> Result<BTreeSet<T>>
where
    T: core::str::FromStr + Ord,
{
    let universe: BTreeSet<&str> = universe.iter().copied().collect();
    let requested: BTreeSet<&str> = names.iter().map(String::as_str).collect();

    if !requested.is_subset(&universe) {
        return Err(ConfigDriveError::Configuration {
            field,
            invalid: requested
                .difference(&universe)
                .map(|s| s.to_string())
                .collect(),
        });
    }

    Ok(names.iter().filter_map(|n| n.parse().ok()).collect())
}

/// Reconciles options into a validated request.
pub fn build_search_request(opts: &ConfigDriveOptions) -> Result<SearchRequest> {
    SearchRequestBuilder::new(opts).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set<T: Ord + Clone>(items: &[T]) -> BTreeSet<T> {
        items.iter().cloned().collect()
    }

    #[test]
    fn defaults_search_everything() {
        let req = build_search_request(&ConfigDriveOptions::default()).unwrap();
        assert_eq!(req.formats(), &set(&ContentFormat::ALL));
        assert_eq!(req.locations(), &set(&SearchLocation::ALL));
    }

    #[test]
    fn cdrom_flag_adds_optical_drive() {
        let mut opts = ConfigDriveOptions::empty().with_types(["iso"]);
        opts.cdrom = true;

        let req = build_search_request(&opts).unwrap();
        assert_eq!(req.formats(), &set(&[ContentFormat::Iso]));
        assert_eq!(req.locations(), &set(&[SearchLocation::Cdrom]));
    }

    #[test]
    fn each_flag_implies_its_pair() {
        let cases = [
            (LegacyFlag::RawHdd, ContentFormat::Iso, SearchLocation::Hdd),
            (LegacyFlag::Cdrom, ContentFormat::Iso, SearchLocation::Cdrom),
            (LegacyFlag::Vfat, ContentFormat::Vfat, SearchLocation::Hdd),
        ];
        for (flag, format, location) in cases {
            let mut opts = ConfigDriveOptions::empty();
            match flag {
                LegacyFlag::RawHdd => opts.raw_hdd = true,
                LegacyFlag::Cdrom => opts.cdrom = true,
                LegacyFlag::Vfat => opts.vfat = true,
            }
            let req = build_search_request(&opts).unwrap();
            assert_eq!(req.formats(), &set(&[format]), "{}", flag.name());
            assert_eq!(req.locations(), &set(&[location]), "{}", flag.name());
        }
    }

    #[test]
    fn flags_never_remove_configured_values() {
        let mut opts = ConfigDriveOptions::empty()
            .with_types(["vfat"])
            .with_locations(["partition"]);
        opts.raw_hdd = true;

        let req = build_search_request(&opts).unwrap();
        assert_eq!(req.formats(), &set(&ContentFormat::ALL));
        assert_eq!(
            req.locations(),
            &set(&[SearchLocation::Hdd, SearchLocation::Partition])
        );
    }

    #[test]
    fn bogus_type_is_named() {
        let opts = ConfigDriveOptions::default().with_types(["iso", "bogus-format"]);

        match build_search_request(&opts) {
            Err(ConfigDriveError::Configuration { field, invalid }) => {
                assert_eq!(field, "types");
                assert_eq!(invalid, ["bogus-format"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn bogus_location_is_named() {
        let opts = ConfigDriveOptions::default().with_locations(["floppy", "hdd", "usb"]);

        let err = build_search_request(&opts).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            r#"Invalid Config Drive locations ["floppy", "usb"]"#
        );
    }

    #[test]
    fn types_are_checked_before_locations() {
        let opts = ConfigDriveOptions::empty()
            .with_types(["cdrom"])
            .with_locations(["iso"]);

        match build_search_request(&opts).unwrap_err() {
            ConfigDriveError::Configuration { field, .. } => assert_eq!(field, "types"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_sets_are_accepted() {
        let req = build_search_request(&ConfigDriveOptions::empty()).unwrap();
        assert!(req.is_empty());
        assert_eq!(req.pairs().count(), 0);
        assert_eq!(req.to_string(), "types: - | locations: -");
    }

    #[test]
    fn request_is_detached_from_options() {
        let mut opts = ConfigDriveOptions::empty().with_types(["iso"]);
        opts.cdrom = true;
        let req = build_search_request(&opts).unwrap();

        opts.types.push("vfat".into());
        opts.locations.push("hdd".into());

        assert_eq!(req.formats(), &set(&[ContentFormat::Iso]));
        assert_eq!(req.locations(), &set(&[SearchLocation::Cdrom]));
    }

    #[test]
    fn pairs_skip_vfat_on_optical_drives() {
        let req = build_search_request(&ConfigDriveOptions::default()).unwrap();
        let pairs: Vec<_> = req.pairs().collect();

        assert_eq!(pairs.len(), 5);
        assert_eq!(pairs[0], (ContentFormat::Iso, SearchLocation::Cdrom));
        assert!(!pairs.contains(&(ContentFormat::Vfat, SearchLocation::Cdrom)));
    }
}

// src/profile.rs

//! Package classification: metadata families and structural profiles
//!
//! A package follows one of three metadata conventions (its *family*):
//! spreadsheet metadata under a `Metadata/` payload directory, per-item JSON
//! sidecar records next to the media, or both (hybrid). Within a family, the
//! *subtype* is resolved against an ordered registry of profiles.
//!
//! A profile is plain data: a name plus the category-directory and
//! file-extension sets a package of that subtype may use. Matching is subset
//! containment on both sets, and the first matching profile in registry order
//! wins, so narrower profiles are registered ahead of the broader ones they
//! overlap with. Adding a subtype is a registry entry, not new control flow.

use std::collections::BTreeSet;
use std::fmt;

/// Payload directory that must exist in every package
pub const PRESERVATION_MASTERS: &str = "PreservationMasters";

/// Payload directory holding spreadsheet metadata
pub const METADATA_DIR: &str = "Metadata";

/// Extension marking per-item sidecar records
pub const SIDECAR_EXT: &str = ".json";

/// Extension marking spreadsheet metadata files
pub const SHEET_EXT: &str = ".xlsx";

/// Media file extensions accepted in the payload (lowercase, with dot)
pub const MEDIA_EXTENSIONS: &[&str] = &[
    ".mov", ".mp4", ".wav", ".flac", ".iso", ".tar", ".dv", ".mkv",
];

/// Case-insensitive test for an accepted media file
pub fn is_media_file(path: &str) -> bool {
    let lower = path.to_lowercase();
    MEDIA_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Metadata convention a package follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Spreadsheet metadata in a `Metadata/` directory
    Spreadsheet,
    /// Per-item JSON sidecar records next to the media
    Sidecar,
    /// Both conventions present
    Hybrid,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Sidecar => "sidecar",
            Self::Hybrid => "hybrid",
        };
        write!(f, "{name}")
    }
}

/// Determine the metadata family from the package's category directories and
/// extensions. `None` means the package carries neither convention.
pub fn classify_family(dirs: &BTreeSet<String>, exts: &BTreeSet<String>) -> Option<Family> {
    let has_metadata_dir = dirs.contains(METADATA_DIR);
    let has_sidecars = exts.contains(SIDECAR_EXT);
    match (has_metadata_dir, has_sidecars) {
        (true, true) => Some(Family::Hybrid),
        (true, false) => Some(Family::Spreadsheet),
        (false, true) => Some(Family::Sidecar),
        (false, false) => None,
    }
}

/// A named structural/content fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub name: &'static str,
    /// Category directories a matching package may use
    pub directories: &'static [&'static str],
    /// File extensions a matching package may use
    pub extensions: &'static [&'static str],
}

impl Profile {
    /// Subset containment on both sets: the package's actual directories and
    /// extensions must each be covered by the profile's declared sets.
    pub fn matches(&self, dirs: &BTreeSet<String>, exts: &BTreeSet<String>) -> bool {
        dirs.iter().all(|d| self.directories.contains(&d.as_str()))
            && exts.iter().all(|e| self.extensions.contains(&e.as_str()))
    }
}

/// Ordered list of profiles for one family. Registry position is a designed
/// tie-break: the first matching profile wins and later matches are never
/// considered.
#[derive(Debug)]
pub struct ProfileRegistry {
    profiles: &'static [Profile],
}

impl ProfileRegistry {
    /// The built-in registry for a family
    pub fn for_family(family: Family) -> &'static ProfileRegistry {
        match family {
            Family::Spreadsheet => &SPREADSHEET_REGISTRY,
            Family::Sidecar => &SIDECAR_REGISTRY,
            Family::Hybrid => &HYBRID_REGISTRY,
        }
    }

    pub fn profiles(&self) -> &'static [Profile] {
        self.profiles
    }

    /// First profile whose directory and extension sets both contain the
    /// package's actual sets; `None` means unclassified.
    pub fn classify(
        &self,
        dirs: &BTreeSet<String>,
        exts: &BTreeSet<String>,
    ) -> Option<&'static Profile> {
        self.profiles.iter().find(|p| p.matches(dirs, exts))
    }
}

/// Directories a package of the family may use at all, regardless of subtype
pub fn allowed_directories(family: Family) -> &'static [&'static str] {
    match family {
        Family::Spreadsheet => &[
            "Metadata",
            "PreservationMasters",
            "EditMasters",
            "ArchiveOriginals",
            "ProjectFiles",
        ],
        Family::Sidecar => &[
            "PreservationMasters",
            "ServiceCopies",
            "EditMasters",
            "Images",
        ],
        Family::Hybrid => &[
            "Metadata",
            "PreservationMasters",
            "ServiceCopies",
            "EditMasters",
            "ArchiveOriginals",
        ],
    }
}

// Profiles that overlap are ordered narrowest first: "audio w/o edit masters"
// is a strict subset of "audio", so it must be tried first or it could never
// be selected.
static SPREADSHEET_REGISTRY: ProfileRegistry = ProfileRegistry {
    profiles: &[
        Profile {
            name: "video",
            directories: &["Metadata", "PreservationMasters"],
            extensions: &[".mov", ".xlsx", ".old"],
        },
        Profile {
            name: "dvd",
            directories: &["Metadata", "PreservationMasters"],
            extensions: &[".iso", ".xlsx", ".old"],
        },
        Profile {
            name: "audio w/o edit masters",
            directories: &["Metadata", "PreservationMasters"],
            extensions: &[".wav", ".xlsx", ".old"],
        },
        Profile {
            name: "audio",
            directories: &["Metadata", "PreservationMasters", "EditMasters"],
            extensions: &[".wav", ".xlsx", ".old"],
        },
        Profile {
            name: "born-digital video",
            directories: &[
                "Metadata",
                "ArchiveOriginals",
                "PreservationMasters",
                "EditMasters",
                "ProjectFiles",
            ],
            extensions: &[".tar", ".mov", ".xlsx", ".fcp", ".prproj"],
        },
        Profile {
            name: "born-digital audio",
            directories: &["Metadata", "ArchiveOriginals", "EditMasters"],
            extensions: &[".wav", ".xlsx", ".old"],
        },
    ],
};

static SIDECAR_REGISTRY: ProfileRegistry = ProfileRegistry {
    profiles: &[
        Profile {
            name: "video",
            directories: &[
                "Metadata",
                "PreservationMasters",
                "ServiceCopies",
                "Images",
            ],
            extensions: &[".mov", ".json", ".mp4", ".jpeg", ".jpg"],
        },
        Profile {
            name: "audio",
            directories: &["Metadata", "PreservationMasters", "EditMasters", "Images"],
            extensions: &[".wav", ".json", ".jpeg", ".jpg"],
        },
    ],
};

static HYBRID_REGISTRY: ProfileRegistry = ProfileRegistry {
    profiles: &[
        Profile {
            name: "video",
            directories: &[
                "Metadata",
                "PreservationMasters",
                "ServiceCopies",
                "Images",
            ],
            extensions: &[".mov", ".xlsx", ".json", ".mp4", ".jpeg"],
        },
        Profile {
            name: "audio",
            directories: &["Metadata", "PreservationMasters", "EditMasters", "Images"],
            extensions: &[".wav", ".xlsx", ".json", ".jpeg"],
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_family_table() {
        let json_exts = set(&[".wav", ".json"]);
        let xlsx_exts = set(&[".wav", ".xlsx"]);

        assert_eq!(
            classify_family(&set(&["Metadata", "PreservationMasters"]), &xlsx_exts),
            Some(Family::Spreadsheet)
        );
        assert_eq!(
            classify_family(&set(&["PreservationMasters"]), &json_exts),
            Some(Family::Sidecar)
        );
        assert_eq!(
            classify_family(
                &set(&["Metadata", "PreservationMasters"]),
                &set(&[".wav", ".xlsx", ".json"])
            ),
            Some(Family::Hybrid)
        );
        assert_eq!(
            classify_family(&set(&["PreservationMasters"]), &set(&[".wav"])),
            None
        );
    }

    #[test]
    fn test_subset_containment_not_equality() {
        let registry = ProfileRegistry::for_family(Family::Spreadsheet);
        // a package using only a fraction of the profile's sets still matches
        let profile = registry
            .classify(&set(&["Metadata", "PreservationMasters"]), &set(&[".mov"]))
            .unwrap();
        assert_eq!(profile.name, "video");
    }

    #[test]
    fn test_first_match_wins_for_overlapping_profiles() {
        let registry = ProfileRegistry::for_family(Family::Spreadsheet);

        // satisfies both "audio w/o edit masters" and "audio"; the earlier
        // registry entry is selected
        let narrow = registry
            .classify(
                &set(&["Metadata", "PreservationMasters"]),
                &set(&[".wav", ".xlsx"]),
            )
            .unwrap();
        assert_eq!(narrow.name, "audio w/o edit masters");

        // the broader package no longer fits the narrow profile
        let broad = registry
            .classify(
                &set(&["Metadata", "PreservationMasters", "EditMasters"]),
                &set(&[".wav", ".xlsx"]),
            )
            .unwrap();
        assert_eq!(broad.name, "audio");
    }

    #[test]
    fn test_unmatched_package_is_unclassified() {
        let registry = ProfileRegistry::for_family(Family::Spreadsheet);
        assert!(
            registry
                .classify(
                    &set(&["Metadata", "PreservationMasters"]),
                    &set(&[".mkv", ".xlsx"]),
                )
                .is_none()
        );
    }

    #[test]
    fn test_sidecar_profiles() {
        let registry = ProfileRegistry::for_family(Family::Sidecar);
        let profile = registry
            .classify(
                &set(&["PreservationMasters", "ServiceCopies"]),
                &set(&[".mov", ".mp4", ".json"]),
            )
            .unwrap();
        assert_eq!(profile.name, "video");
    }

    #[test]
    fn test_is_media_file_case_insensitive() {
        assert!(is_media_file("data/PreservationMasters/abc_123_v01_pm.WAV"));
        assert!(is_media_file("data/ServiceCopies/abc_123_v01_sc.mp4"));
        assert!(!is_media_file("data/Metadata/abc_123_v01.xlsx"));
        assert!(!is_media_file("data/PreservationMasters/abc_123_v01_pm.json"));
    }
}

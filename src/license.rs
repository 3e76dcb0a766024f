// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! License classification table and lookup.
//!
//! Maps SPDX license identifiers and free-form aliases to a visual category
//! used for badge rendering. The grouped static table is flattened into a
//! single immutable index once at construction, with a fail-fast uniqueness
//! check: the same identifier registered under two categories is a
//! programming error, not a runtime condition.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Error;

/// Classification buckets a license can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LicenseCategoryKind {
    /// Permissive licenses: not public domain and not copyleft.
    Permissive,
    /// Copyleft licenses requiring disclosure of source or same-license
    /// redistribution.
    Copyleft,
    /// Public domain licenses that do not require a copyright notice.
    PublicDomain,
    /// No license declared, or an identifier the table does not know.
    Unspecified
}

impl LicenseCategoryKind {
    /// Stable textual form matching the serialized representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Permissive => "permissive",
            Self::Copyleft => "copyleft",
            Self::PublicDomain => "public-domain",
            Self::Unspecified => "unspecified"
        }
    }
}

/// Visual category record attached to every classified license.
///
/// The priority totally orders categories for display and tie-breaking;
/// lower means more restrictive. Colors are CSS color names or hex tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LicenseCategory {
    /// Bucket the license belongs to.
    pub kind:     LicenseCategoryKind,
    /// Badge color token for this category.
    pub color:    &'static str,
    /// Display priority; unique per category, lower = more restrictive.
    pub priority: u8
}

/// Category returned for absent or unrecognized license identifiers.
pub const UNSPECIFIED: LicenseCategory = LicenseCategory {
    kind:     LicenseCategoryKind::Unspecified,
    color:    "lightgrey",
    priority: 4
};

/// One row of the grouped classification table: a category plus the SPDX
/// identifiers and aliases registered under it.
#[derive(Debug, Clone, Copy)]
pub struct LicenseGroup {
    /// Bucket the identifiers map to.
    pub kind:     LicenseCategoryKind,
    /// Badge color token for the bucket.
    pub color:    &'static str,
    /// Display priority for the bucket.
    pub priority: u8,
    /// Canonical SPDX identifiers.
    pub spdx_ids: &'static [&'static str],
    /// Free-form aliases seen in repository metadata.
    pub aliases:  &'static [&'static str]
}

const BUILT_IN_GROUPS: [LicenseGroup; 3] = [
    LicenseGroup {
        kind:     LicenseCategoryKind::Permissive,
        color:    "green",
        priority: 2,
        spdx_ids: &[
            "AFL-3.0",
            "Apache-2.0",
            "Artistic-2.0",
            "BSD-2-Clause",
            "BSD-3-Clause",
            "BSD-3-Clause-Clear",
            "BSL-1.0",
            "CC-BY-4.0",
            "ECL-2.0",
            "ISC",
            "MIT",
            "MS-PL",
            "NCSA",
            "PostgreSQL",
            "Zlib"
        ],
        aliases:  &["BSD", "Apache 2.0"]
    },
    LicenseGroup {
        kind:     LicenseCategoryKind::Copyleft,
        color:    "orange",
        priority: 1,
        spdx_ids: &[
            "AGPL-1.0-only",
            "AGPL-1.0-or-later",
            "AGPL-3.0-only",
            "AGPL-3.0-or-later",
            "CC-BY-SA-4.0",
            "EPL-1.0",
            "EPL-2.0",
            "EUPL-1.1",
            "GPL-1.0-only",
            "GPL-1.0-or-later",
            "GPL-2.0-only",
            "GPL-2.0-or-later",
            "GPL-3.0-only",
            "GPL-3.0-or-later",
            "LGPL-2.0-only",
            "LGPL-2.0-or-later",
            "LGPL-2.1-only",
            "LGPL-2.1-or-later",
            "LGPL-3.0-only",
            "LGPL-3.0-or-later",
            "LPPL-1.3c",
            "MPL-2.0",
            "MS-RL",
            "OFL-1.1",
            "OSL-3.0"
        ],
        aliases:  &[
            "GPL",
            "GPL-2.0",
            "GPL-3.0",
            "GPLv2",
            "GPLv2+",
            "GPLv3",
            "GPLv3+",
            "LGPL",
            "LGPL-2.1",
            "LGPL-3.0",
            "LGPLv2",
            "LGPLv2+",
            "LGPLv3",
            "LGPLv3+",
            "AGPL-3.0",
            "AGPLv3+",
            "MPL",
            "MPL 1.1",
            "MPL 2.0",
            "EPL"
        ]
    },
    LicenseGroup {
        kind:     LicenseCategoryKind::PublicDomain,
        color:    "#7cd958",
        priority: 3,
        spdx_ids: &["CC0-1.0", "Unlicense", "WTFPL"],
        aliases:  &["CC0"]
    }
];

/// Immutable license classifier built once per process.
///
/// # Examples
///
/// ```
/// use rebadge::{LicenseCategoryKind, LicenseClassifier};
///
/// let classifier = LicenseClassifier::new();
/// assert_eq!(
///     classifier.classify(Some("MIT")).kind,
///     LicenseCategoryKind::Permissive
/// );
/// assert_eq!(
///     classifier.classify(None).kind,
///     LicenseCategoryKind::Unspecified
/// );
/// ```
#[derive(Debug)]
pub struct LicenseClassifier {
    index: HashMap<&'static str, LicenseCategory>
}

impl LicenseClassifier {
    /// Builds the classifier from the built-in classification table.
    ///
    /// # Panics
    ///
    /// Panics when the built-in table registers the same identifier under
    /// two categories. That is a defect in the table itself and must fail at
    /// construction time, never at lookup time.
    pub fn new() -> Self {
        Self::from_groups(&BUILT_IN_GROUPS)
            .expect("built-in license table must not contain duplicate identifiers")
    }

    /// Builds a classifier from the provided grouped table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](Error::Validation) naming the first
    /// identifier that is registered more than once.
    pub fn from_groups(groups: &[LicenseGroup]) -> Result<Self, Error> {
        let mut index = HashMap::new();

        for group in groups {
            let category = LicenseCategory {
                kind:     group.kind,
                color:    group.color,
                priority: group.priority
            };

            for key in group.spdx_ids.iter().chain(group.aliases.iter()) {
                if index.insert(*key, category).is_some() {
                    return Err(Error::validation(format!(
                        "license identifier '{key}' is registered in more than one category"
                    )));
                }
            }
        }

        Ok(Self {
            index
        })
    }

    /// Classifies a license identifier into its visual category.
    ///
    /// Absent or empty identifiers resolve to [`UNSPECIFIED`], as do
    /// identifiers the table does not know: an unrecognized license must
    /// never abort badge generation. Lookup is case-sensitive, first by
    /// SPDX identifier and then by alias (both live in the same flattened
    /// index).
    pub fn classify(&self, identifier: Option<&str>) -> &LicenseCategory {
        match identifier {
            Some(id) if !id.is_empty() => self.index.get(id).unwrap_or(&UNSPECIFIED),
            _ => &UNSPECIFIED
        }
    }

    /// Number of identifiers the classifier knows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` when the classifier has no registered identifiers.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl Default for LicenseClassifier {
    fn default() -> Self {
        Self::new()
    }
}

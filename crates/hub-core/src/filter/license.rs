use crate::Result;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// OSI-approved identifiers used when no SPDX license list is configured
const BUILTIN_OSI_LICENSES: &[&str] = &[
    "0BSD",
    "AFL-3.0",
    "AGPL-3.0",
    "AGPL-3.0-only",
    "AGPL-3.0-or-later",
    "Apache-1.1",
    "Apache-2.0",
    "APSL-2.0",
    "Artistic-2.0",
    "BSD-1-Clause",
    "BSD-2-Clause",
    "BSD-2-Clause-Patent",
    "BSD-3-Clause",
    "BSD-3-Clause-LBNL",
    "BSL-1.0",
    "CDDL-1.0",
    "CECILL-2.1",
    "ECL-2.0",
    "EPL-1.0",
    "EPL-2.0",
    "EUPL-1.1",
    "EUPL-1.2",
    "GPL-2.0",
    "GPL-2.0-only",
    "GPL-2.0-or-later",
    "GPL-3.0",
    "GPL-3.0-only",
    "GPL-3.0-or-later",
    "ISC",
    "LGPL-2.0-only",
    "LGPL-2.0-or-later",
    "LGPL-2.1",
    "LGPL-2.1-only",
    "LGPL-2.1-or-later",
    "LGPL-3.0",
    "LGPL-3.0-only",
    "LGPL-3.0-or-later",
    "LPL-1.02",
    "MIT",
    "MIT-0",
    "MPL-1.1",
    "MPL-2.0",
    "MS-PL",
    "MS-RL",
    "NCSA",
    "OFL-1.1",
    "OSL-3.0",
    "PostgreSQL",
    "Python-2.0",
    "UPL-1.0",
    "Unlicense",
    "Zlib",
    "ZPL-2.1",
];

/// Shape of the SPDX `licenses.json` list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxLicenseList {
    licenses: Vec<SpdxLicense>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxLicense {
    license_id: String,
    #[serde(default)]
    is_osi_approved: bool,
}

/// Set of OSI-approved license identifiers
#[derive(Debug, Clone)]
pub struct OsiLicenses {
    ids: HashSet<String>,
}

impl OsiLicenses {
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            ids: BUILTIN_OSI_LICENSES.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Build the set from SPDX license list JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid SPDX license list.
    pub fn from_spdx_json(content: &str) -> Result<Self> {
        let list: SpdxLicenseList = serde_json::from_str(content)?;
        let total = list.licenses.len();
        let ids: HashSet<String> = list
            .licenses
            .into_iter()
            .filter(|l| l.is_osi_approved)
            .map(|l| l.license_id)
            .collect();
        debug!("{} of {total} SPDX licenses are OSI approved", ids.len());
        Ok(Self { ids })
    }

    /// Load an SPDX license list from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let licenses = Self::from_spdx_json(&content)?;
        info!(
            "Loaded {} OSI approved licenses from {}",
            licenses.len(),
            path.display()
        );
        Ok(licenses)
    }

    #[must_use]
    pub fn contains(&self, license: &str) -> bool {
        self.ids.contains(license.trim())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for OsiLicenses {
    fn default() -> Self {
        Self::builtin()
    }
}

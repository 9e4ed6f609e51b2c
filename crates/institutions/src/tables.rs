//! Lookup tables for institution detection and cleanup
//!
//! The builtin tables are initialized once per process and never mutated.
//! Deployments that need extra aliases build an owned copy with
//! [`LookupTables::with_overrides`].

use affilnet_common::errors::{AppError, Result};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Words that mark a header line as carrying an institution
const INSTITUTION_KEYWORDS: &[&str] = &[
    "university", "group", "dept", "science", "laboratory", "lab", "research", "iiit",
    "inc.", "labs", "institute", "technology", "tech", "dept.", "sciences", "department", "engineering",
    "computer", "ecole", "inria", "fraunhofer", "inc", "informatics", "centre", "mit", "eecs", "laboratoire",
    "institut", "team", "college", "universitat", "cybernetics", "mpi-is", "eth", "tu", "google", "nicta", "unam",
    "uc", "technion", "center", "school", "cnrs", "univ", "paristech", "deepmind", "ntu", "politecnico",
    "epfl", "computational", "neuroscience", "ucla", "caltech", "stanford", "cmu", "nvidia", "openai",
    "centrum", "amazon", "technische", "universität", "seas", "ut", "mpi", "université", "ist", "idsia", "csail",
    "uw-madison", "tecnologia", "research–almaden", "sutd", "usi-supsi", "dipartament", "informatica", "usc",
    "mathematics", "matematica", "cmla", "ibm", "leuven", "nyu", "foundation", "uiuc", "universite", "facebook",
    "twitter", "linkedin", "bbva", "ucl", "apple", "ucsc", "suny", "corp", "corporation", "universidad", "iit",
    "kaist", "nec", "microsoft", "sequel-inria/lifl-cnrs", "deib", "ucsd", "mpi-sws", "unc", "icme",
    "ltci", "polytechnique", "école", "faculty", "università", "informatik", "iupui", "kth",
    "riken", "superieure", "carnegie", "ntt", "purdue", "collaboratory", "aecom", "minds", "lg", "electronics",
    "uber", "wustl", "lip6", "upmc", "aist", "unviersity", "2tti-chicago", "academia", "jst", "presto", "inria/ens",
    "autonlab", "ispgroup/icteam", "fnrs", "huawei", "netflix", "psychology", "netﬂix", "eurecom", "ttic",
    "institutes", "vinai", "département", "qualcomm", "technologies", "instituto", "crest", "ensae",
    "universita", "cifar", "departement", "hkust", "statistik", "esat-stadius", "yandex", "philipps-universitat",
    "friedrich-schiller-universität", "montanuniversitat", "wilhelms-universität", "cnrs-univ", "oracle", "sri",
];

/// Normalized lines naming a university system without its campus
const LOCATION_INSTITUTIONS: &[&str] = &[
    "university of california",
    "university of massachusetts",
    "eecs university of california",
    "university of texas",
    "the university of texas",
    "university of texas at",
];

/// City marker in the following raw line and the campus it resolves to, in scan order
const LOCATION_SUFFIXES: &[(&str, &str)] = &[
    ("los angeles", "university of california los angeles"),
    ("irvine", "university of california irvine"),
    ("santa cruz", "university of california santa cruz"),
    ("san diego", "university of california san diego"),
    ("berkeley", "university of california berkeley"),
    ("merced", "university of california merced"),
    ("san francisco", "university of california san francisco"),
    ("santa barbara", "university of california santa barbara"),
    ("riverside", "university of california riverside"),
    ("amherst", "university of massachusetts amherst"),
    ("austin", "university of texas at austin"),
    ("dallas", "university of texas at dallas"),
    ("arlington", "university of texas at arlington"),
    ("san antonio", "university of texas at san antonio"),
    ("houston", "university of texas at san houston"),
];

const COMMON_TYPOS: &[(&str, &str)] = &[
    ("unversity", "university"),
    ("universty", "university"),
    ("unviersity", "university"),
    ("univeristy", "university"),
    ("universiy", "university"),
    ("insitute", "institute"),
    ("institue", "institute"),
    ("techonology", "technology"),
    ("tecnology", "technology"),
    ("califomia", "california"),
    ("califonia", "california"),
    ("massachussetts", "massachusetts"),
    ("laboratoy", "laboratory"),
    ("reseach", "research"),
    ("engeneering", "engineering"),
    ("departement", "department"),
];

const INSTITUTION_PARSING_FIXES: &[(&str, &[&str])] = &[
    ("google brain university of toronto", &["google brain", "university of toronto"]),
    ("microsoft research university of cambridge", &["microsoft research", "university of cambridge"]),
    ("deepmind university college london", &["deepmind", "university college london"]),
    ("stanford university google", &["stanford university", "google"]),
    ("inria ecole normale superieure", &["inria", "ecole normale superieure"]),
    ("mit ibm watson ai lab", &["mit", "ibm"]),
    ("carnegie mellon university facebook ai research", &["carnegie mellon university", "facebook ai research"]),
    ("university of oxford deepmind", &["university of oxford", "deepmind"]),
];

const INSTITUTIONS_DELETE: &[&str] = &[
    "",
    "university",
    "institute",
    "research",
    "eecs",
    "computer science",
    "department of computer science",
    "computer science department",
    "department of electrical engineering",
    "department of electrical engineering and computer science",
    "department of statistics",
    "department of mathematics",
    "school of computer science",
    "school of engineering",
    "equal contribution",
    "research group",
];

const INSTITUTIONS_MAPPING: &[(&str, &str)] = &[
    ("stanford", "stanford university"),
    ("massachusetts institute of technology", "mit"),
    ("mit csail", "mit"),
    ("csail mit", "mit"),
    ("cmu", "carnegie mellon university"),
    ("uc berkeley", "university of california berkeley"),
    ("eecs uc berkeley", "university of california berkeley"),
    ("ucla", "university of california los angeles"),
    ("ucsd", "university of california san diego"),
    ("uiuc", "university of illinois at urbana-champaign"),
    ("google inc", "google"),
    ("google research", "google"),
    ("google brain", "google"),
    ("microsoft research", "microsoft"),
    ("facebook ai research", "facebook"),
    ("ibm research", "ibm"),
    ("oxford university", "university of oxford"),
    ("nyu", "new york university"),
    ("princeton", "princeton university"),
    ("eth zürich", "eth zurich"),
];

lazy_static! {
    static ref BUILTIN: LookupTables = LookupTables::from_static();
}

/// Immutable lookup tables used by the parser and resolver
#[derive(Debug, Clone)]
pub struct LookupTables {
    /// Institution-indicating words
    pub keywords: HashSet<String>,

    /// Normalized lines that need a city on the following line
    pub location_institutions: HashSet<String>,

    /// City marker -> canonical campus name, in scan order
    pub locations: Vec<(String, String)>,

    /// Token -> corrected token
    pub typos: HashMap<String, String>,

    /// Known bad parse -> correct names
    pub parsing_fixes: HashMap<String, Vec<String>>,

    /// Names that are pure noise
    pub deletions: HashSet<String>,

    /// Name -> canonical spelling
    pub aliases: HashMap<String, String>,
}

/// Additions to the builtin tables, read from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableOverrides {
    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub typos: HashMap<String, String>,

    #[serde(default)]
    pub parsing_fixes: HashMap<String, Vec<String>>,

    #[serde(default)]
    pub deletions: Vec<String>,

    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

fn owned_pairs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

impl LookupTables {
    /// Process-wide builtin tables
    pub fn builtin() -> &'static LookupTables {
        &BUILTIN
    }

    fn from_static() -> Self {
        Self {
            keywords: INSTITUTION_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            location_institutions: LOCATION_INSTITUTIONS.iter().map(|s| s.to_string()).collect(),
            locations: LOCATION_SUFFIXES
                .iter()
                .map(|(city, name)| (city.to_string(), name.to_string()))
                .collect(),
            typos: owned_pairs(COMMON_TYPOS),
            parsing_fixes: INSTITUTION_PARSING_FIXES
                .iter()
                .map(|(bad, fixed)| {
                    (bad.to_string(), fixed.iter().map(|s| s.to_string()).collect())
                })
                .collect(),
            deletions: INSTITUTIONS_DELETE.iter().map(|s| s.to_string()).collect(),
            aliases: owned_pairs(INSTITUTIONS_MAPPING),
        }
    }

    /// Builtin tables extended by a JSON overrides file
    pub fn with_overrides(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| AppError::Configuration {
            message: format!("Failed to read lookup tables {}: {}", path.display(), e),
        })?;
        let overrides: TableOverrides = serde_json::from_str(&raw)?;

        tracing::info!(
            path = %path.display(),
            aliases = overrides.aliases.len(),
            deletions = overrides.deletions.len(),
            "Loaded lookup table overrides"
        );

        Ok(Self::builtin().clone().extended(overrides))
    }

    /// Merge overrides into a copy of these tables
    pub fn extended(mut self, overrides: TableOverrides) -> Self {
        self.keywords.extend(overrides.keywords);
        self.typos.extend(overrides.typos);
        self.parsing_fixes.extend(overrides.parsing_fixes);
        self.deletions.extend(overrides.deletions);
        self.aliases.extend(overrides.aliases);
        self
    }

    pub fn is_keyword(&self, token: &str) -> bool {
        self.keywords.contains(token)
    }

    pub fn needs_location(&self, joined: &str) -> bool {
        self.location_institutions.contains(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables() {
        let tables = LookupTables::builtin();
        assert!(tables.is_keyword("university"));
        assert!(tables.is_keyword("mit"));
        assert!(!tables.is_keyword("jane"));
        assert!(tables.needs_location("university of california"));
        assert_eq!(tables.locations.len(), 15);
        assert_eq!(tables.aliases["stanford"], "stanford university");
    }

    #[test]
    fn test_overrides_do_not_touch_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        std::fs::write(
            &path,
            r#"{"aliases": {"toronto": "university of toronto"}, "deletions": ["vector institute"]}"#,
        )
        .unwrap();

        let tables = LookupTables::with_overrides(&path).unwrap();
        assert_eq!(tables.aliases["toronto"], "university of toronto");
        assert!(tables.deletions.contains("vector institute"));
        assert!(tables.aliases.contains_key("stanford"));

        assert!(!LookupTables::builtin().aliases.contains_key("toronto"));
    }

    #[test]
    fn test_missing_overrides_file() {
        let err = LookupTables::with_overrides(Path::new("/nonexistent/tables.json")).unwrap_err();
        assert!(err.to_string().contains("lookup tables"));
    }
}

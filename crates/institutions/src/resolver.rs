//! Institution name resolution
//!
//! Three table-driven steps, applied in order:
//! 1. token-wise typo correction
//! 2. splitting of known bad parses into several institutions
//! 3. noise deletion, then alias mapping to the canonical spelling

use crate::tables::LookupTables;

/// Canonicalizes raw institution names
#[derive(Debug, Clone, Copy)]
pub struct InstitutionResolver<'a> {
    tables: &'a LookupTables,
}

impl<'a> InstitutionResolver<'a> {
    pub fn new(tables: &'a LookupTables) -> Self {
        Self { tables }
    }

    pub fn builtin() -> InstitutionResolver<'static> {
        InstitutionResolver::new(LookupTables::builtin())
    }

    /// Replace known misspelled tokens
    pub fn fix_typo(&self, name: &str) -> String {
        name.split(' ')
            .map(|token| {
                self.tables
                    .typos
                    .get(token)
                    .map(String::as_str)
                    .unwrap_or(token)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Expand a known bad parse into the institutions it merged
    pub fn fix_parsing(&self, name: &str) -> Vec<String> {
        match self.tables.parsing_fixes.get(name) {
            Some(names) => names.clone(),
            None => vec![name.to_string()],
        }
    }

    /// Canonical spelling, or `None` when the name is noise
    pub fn resolve_name(&self, name: &str) -> Option<String> {
        if self.tables.deletions.contains(name) {
            return None;
        }
        Some(
            self.tables
                .aliases
                .get(name)
                .cloned()
                .unwrap_or_else(|| name.to_string()),
        )
    }

    /// Every expanded name with its resolution, deletions kept as `None`
    pub fn resolve_all(&self, raw_name: &str) -> Vec<Option<String>> {
        let fixed = self.fix_typo(raw_name);
        self.fix_parsing(&fixed)
            .iter()
            .map(|name| self.resolve_name(name))
            .collect()
    }

    /// Canonical names for a raw name, noise dropped
    pub fn resolve(&self, raw_name: &str) -> Vec<String> {
        self.resolve_all(raw_name)
            .into_iter()
            .flatten()
            .filter(|name| !name.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_typo() {
        let resolver = InstitutionResolver::builtin();
        assert_eq!(resolver.fix_typo("stanford unversity"), "stanford university");
        assert_eq!(resolver.fix_typo("mit"), "mit");
        assert_eq!(resolver.fix_typo("a  b"), "a  b");
    }

    #[test]
    fn test_fix_parsing_splits_merged_names() {
        let resolver = InstitutionResolver::builtin();
        assert_eq!(
            resolver.fix_parsing("stanford university google"),
            vec!["stanford university", "google"]
        );
        assert_eq!(resolver.fix_parsing("mit"), vec!["mit"]);
    }

    #[test]
    fn test_resolve_name() {
        let resolver = InstitutionResolver::builtin();
        assert_eq!(resolver.resolve_name("department of computer science"), None);
        assert_eq!(resolver.resolve_name("stanford").as_deref(), Some("stanford university"));
        assert_eq!(resolver.resolve_name("rice university").as_deref(), Some("rice university"));
    }

    #[test]
    fn test_resolve_pipeline() {
        let resolver = InstitutionResolver::builtin();

        // typo fix feeds the split, the split feeds the aliases
        assert_eq!(
            resolver.resolve("google brain unversity of toronto"),
            vec!["google", "university of toronto"]
        );
        assert_eq!(
            resolver.resolve_all("department of computer science"),
            vec![None]
        );
        assert!(resolver.resolve("department of computer science").is_empty());
        assert!(resolver.resolve("").is_empty());
    }
}

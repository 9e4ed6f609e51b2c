//! Institution block parsing
//!
//! Scans a paper header line by line and groups institution-bearing lines
//! into blocks. An email marker (`@`) closes the current block. When a header
//! never contains an email marker, every keyword line becomes its own block.
//!
//! Lines such as "university of california" carry no campus; the campus is
//! read from the next raw line and appended as a canonical name.

use crate::normalizer::NormalizedLine;
use crate::tables::LookupTables;
use affilnet_common::config::ParserConfig;
use serde::{Deserialize, Serialize};

/// City that historic runs append under every location line, whatever the text
const UNCONDITIONAL_CITY: &str = "san diego";

/// Joined lines accumulated for one institution block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionFragment(pub Vec<String>);

impl InstitutionFragment {
    pub fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    /// Candidate institution name: the last line of the block
    pub fn raw_name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

/// Stateless entry point holding the tables and parser options
#[derive(Debug, Clone, Copy)]
pub struct InstitutionParser<'a> {
    tables: &'a LookupTables,
    strict_city_match: bool,
}

impl<'a> InstitutionParser<'a> {
    /// Create a parser over the given tables
    pub fn new(tables: &'a LookupTables, config: &ParserConfig) -> Self {
        Self {
            tables,
            strict_city_match: config.strict_city_match,
        }
    }

    /// Parser over the builtin tables with default options
    pub fn builtin() -> InstitutionParser<'static> {
        InstitutionParser::new(LookupTables::builtin(), &ParserConfig::default())
    }

    pub fn tables(&self) -> &'a LookupTables {
        self.tables
    }

    /// Start scanning a new header
    pub fn scanner(&self) -> HeaderScanner<'a> {
        HeaderScanner {
            parser: *self,
            institutions: Vec::new(),
            current: InstitutionFragment::default(),
            find_location: false,
            fallback: Vec::new(),
        }
    }

    /// Parse a whole header into institution blocks
    pub fn parse<S: AsRef<str>>(&self, header: &[S]) -> Vec<InstitutionFragment> {
        let mut scanner = self.scanner();
        for line in header {
            scanner.feed(line.as_ref());
        }
        scanner.finish()
    }

    /// Campus names to append for a raw line following a location line
    fn location_suffixes(&self, raw_line: &str) -> Vec<&'a str> {
        self.tables
            .locations
            .iter()
            .filter(|(city, _)| {
                raw_line.contains(city.as_str())
                    || (!self.strict_city_match && city == UNCONDITIONAL_CITY)
            })
            .map(|(_, name)| name.as_str())
            .collect()
    }
}

/// Per-header scanning state, advanced one line at a time
#[derive(Debug, Clone)]
pub struct HeaderScanner<'a> {
    parser: InstitutionParser<'a>,

    /// Blocks closed by an email marker
    institutions: Vec<InstitutionFragment>,

    /// Block being accumulated
    current: InstitutionFragment,

    /// Previous line named a university that needs a campus
    find_location: bool,

    /// Every keyword line as its own block, used when no email marker shows up
    fallback: Vec<InstitutionFragment>,
}

impl<'a> HeaderScanner<'a> {
    /// Advance the scanner with one raw header line
    pub fn feed(&mut self, raw_line: &str) {
        let line = NormalizedLine::new(raw_line);
        let matched = !line.matched_keywords(self.parser.tables).is_empty();

        if self.find_location {
            for name in self.parser.location_suffixes(raw_line) {
                self.current.push(name);
            }
        }
        self.find_location = self.parser.tables.needs_location(&line.joined);

        if matched {
            self.fallback.push(InstitutionFragment(vec![line.joined.clone()]));
        }

        if raw_line.contains('@') {
            let block = std::mem::take(&mut self.current);
            self.institutions.push(block);
            return;
        }

        if matched && !self.find_location {
            self.current.push(line.joined);
        }
    }

    /// Blocks closed so far
    pub fn institutions(&self) -> &[InstitutionFragment] {
        &self.institutions
    }

    /// Block currently open
    pub fn current(&self) -> &InstitutionFragment {
        &self.current
    }

    pub fn find_location(&self) -> bool {
        self.find_location
    }

    /// Close the header. An unterminated trailing block is discarded.
    pub fn finish(self) -> Vec<InstitutionFragment> {
        if !self.institutions.is_empty() {
            return self.institutions;
        }
        self.fallback
    }
}

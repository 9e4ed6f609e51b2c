//! Header segmentation

/// Lines of a paper preceding its abstract, trimmed.
///
/// The header ends at the first line that reads "abstract" on its own. A paper
/// without such a line is treated as all header.
pub fn extract_header<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.as_ref().trim())
        .take_while(|line| !line.eq_ignore_ascii_case("abstract"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_stops_at_abstract() {
        let lines = ["Title ", " Jane Doe", "Stanford University", "Abstract", "We study"];
        assert_eq!(
            extract_header(&lines),
            vec!["Title", "Jane Doe", "Stanford University"]
        );
    }

    #[test]
    fn test_header_without_abstract() {
        let lines = vec!["One".to_string(), "Two".to_string()];
        assert_eq!(extract_header(&lines).len(), 2);
    }
}

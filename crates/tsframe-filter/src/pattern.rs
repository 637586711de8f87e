use regex::Regex;

/// Compiled pattern matched against rendered frames
#[derive(Clone)]
pub struct CompiledPattern {
    regex: Regex,

    /// Original pattern string
    pattern: String,

    /// Case sensitivity
    case_insensitive: bool,
}

impl CompiledPattern {
    /// Compile a pattern string
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            pattern: pattern.to_string(),
            case_insensitive: false,
        })
    }

    /// Compile a case-insensitive pattern
    pub fn new_case_insensitive(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            // Prepend (?i) for case insensitive matching
            regex: Regex::new(&format!("(?i){}", pattern))?,
            pattern: pattern.to_string(),
            case_insensitive: true,
        })
    }

    /// Check if the pattern matches anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Capture groups of the leftmost match, excluding the whole match.
    ///
    /// Groups that did not participate in the match are empty strings.
    /// Returns `None` when the pattern does not match.
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(text)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }

    /// Number of capturing groups
    pub fn group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Get the original pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check if pattern is case insensitive
    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }
}

impl std::fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("pattern", &self.pattern)
            .field("case_insensitive", &self.case_insensitive)
            .finish()
    }
}

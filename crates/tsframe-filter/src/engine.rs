use crate::error::{FilterError, Result};
use crate::pattern::CompiledPattern;
use crate::policy::MatchPolicy;

/// Match settings
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// OR across patterns instead of AND
    pub any: bool,

    /// Invert the final selection
    pub exclude: bool,

    /// Report capture groups instead of whole frames
    pub sub: bool,

    /// Compile patterns case-insensitively
    pub ignore_case: bool,
}

impl FilterOptions {
    pub fn policy(&self) -> MatchPolicy {
        MatchPolicy::new(self.any, self.exclude)
    }
}

/// Outcome of evaluating one frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Not selected
    Reject,

    /// Selected; emit the frame unchanged
    Keep,

    /// Selected in sub-mode; emit these groups (possibly none)
    Captures(Vec<String>),
}

impl Verdict {
    pub fn is_selected(&self) -> bool {
        !matches!(self, Self::Reject)
    }
}

/// Ordered patterns plus the policy that combines their results
#[derive(Debug, Clone)]
pub struct MatchEngine {
    patterns: Vec<CompiledPattern>,
    policy: MatchPolicy,
    sub: bool,
}

impl MatchEngine {
    /// Compile `patterns` in order; the first invalid one is reported
    pub fn new<S: AsRef<str>>(patterns: &[S], options: FilterOptions) -> Result<Self> {
        let compiled = patterns
            .iter()
            .enumerate()
            .map(|(i, pattern)| {
                let pattern = pattern.as_ref();
                let compiled = if options.ignore_case {
                    CompiledPattern::new_case_insensitive(pattern)
                } else {
                    CompiledPattern::new(pattern)
                };
                compiled.map_err(|source| FilterError::Pattern {
                    index: i + 1,
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_patterns(compiled, options.policy(), options.sub)
    }

    /// Build an engine from already compiled patterns
    pub fn from_patterns(
        patterns: Vec<CompiledPattern>,
        policy: MatchPolicy,
        sub: bool,
    ) -> Result<Self> {
        if patterns.is_empty() {
            return Err(FilterError::NoPatterns);
        }
        Ok(Self {
            patterns,
            policy,
            sub,
        })
    }

    /// Evaluate one rendered frame.
    ///
    /// Patterns run in order and stop once the policy's answer is fixed. In
    /// sub-mode the groups reported are those of the first evaluated pattern
    /// that matched; a selection reached without any match reports none.
    pub fn evaluate(&self, text: &str) -> Verdict {
        if !self.sub {
            let selected = self
                .policy
                .select(self.patterns.iter().map(|p| p.is_match(text)));
            return if selected { Verdict::Keep } else { Verdict::Reject };
        }

        let mut groups: Option<Vec<String>> = None;
        let selected = self.policy.select(self.patterns.iter().map(|p| {
            match p.captures(text) {
                Some(caps) => {
                    groups.get_or_insert(caps);
                    true
                }
                None => false,
            }
        }));

        if selected {
            Verdict::Captures(groups.unwrap_or_default())
        } else {
            Verdict::Reject
        }
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn is_sub_mode(&self) -> bool {
        self.sub
    }
}

use regex::Regex;

/// A single keyword predicate in a classification table
#[derive(Debug, Clone)]
pub enum KeywordMatcher {
    /// Matches when the lowercase keyword occurs anywhere in the text
    Contains(String),

    /// Matches when any of the words occurs as a whole word
    Words(Regex),
}

impl KeywordMatcher {
    /// Creates a substring matcher; the keyword is lowercased
    pub fn contains(keyword: &str) -> Self {
        Self::Contains(keyword.to_lowercase())
    }

    /// Creates a whole-word matcher over a set of alternatives
    ///
    /// # Example
    ///
    /// ```
    /// use catalog_crawler::classify::KeywordMatcher;
    ///
    /// let matcher = KeywordMatcher::words(&["inn", "hotel"]).unwrap();
    /// assert!(matcher.is_match("cozy inn by the lake"));
    /// assert!(!matcher.is_match("dinner cruise"));
    /// ```
    pub fn words(words: &[&str]) -> Result<Self, regex::Error> {
        let alternatives = words
            .iter()
            .map(|word| regex::escape(&word.to_lowercase()))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"\b(?:{})\b", alternatives)).map(Self::Words)
    }

    /// Tests the matcher against text that is already lowercase
    pub fn is_match(&self, lowercase_text: &str) -> bool {
        match self {
            Self::Contains(keyword) => lowercase_text.contains(keyword.as_str()),
            Self::Words(regex) => regex.is_match(lowercase_text),
        }
    }
}

/// Ordered list of (matcher, result) rules; the first matching rule wins
///
/// Order is significant: a specific keyword listed before a broader one that
/// would also match takes precedence over it.
#[derive(Debug, Clone)]
pub struct KeywordTable<T> {
    rules: Vec<(KeywordMatcher, T)>,
}

impl<T> KeywordTable<T> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Builds a table of substring rules, preserving the given order
    pub fn from_keywords<K>(pairs: impl IntoIterator<Item = (K, T)>) -> Self
    where
        K: AsRef<str>,
    {
        Self {
            rules: pairs
                .into_iter()
                .map(|(keyword, value)| (KeywordMatcher::contains(keyword.as_ref()), value))
                .collect(),
        }
    }

    /// Appends a rule at the lowest priority
    pub fn push(&mut self, matcher: KeywordMatcher, value: T) {
        self.rules.push((matcher, value));
    }

    /// Returns the result of the first rule matching `text`
    pub fn first_match(&self, text: &str) -> Option<&T> {
        let lower = text.to_lowercase();
        self.rules
            .iter()
            .find(|(matcher, _)| matcher.is_match(&lower))
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<T> Default for KeywordTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

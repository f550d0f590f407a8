//! Keyword scorer for free-text status and tone detection.
//!
//! Category order in each table is its tie-break priority: when two categories share the
//! top count, the one listed first wins. Reordering a table changes predictions.

/// Category -> keyword substrings, plus the label returned when nothing matches.
#[derive(Debug, Clone, Copy)]
pub struct KeywordTable {
    pub default: &'static str,
    pub categories: &'static [(&'static str, &'static [&'static str])],
}

/// Mental-health status from a free-text statement.
pub const STATUS_KEYWORDS: KeywordTable = KeywordTable {
    default: "General Mental Health Concern",
    categories: &[
        ("Depression", &["sad", "hopeless", "empty"]),
        ("Anxiety", &["anxious", "panic", "fear"]),
        ("Sleep Disorder", &["sleep", "tired", "insomnia"]),
        ("Social Anxiety", &["social", "public", "awkward"]),
        ("Bipolar Disorder", &["mood", "manic", "energetic"]),
        ("PTSD", &["trauma", "flashback", "abuse"]),
        ("OCD", &["obsess", "ritual"]),
        ("ADHD", &["focus", "distract"]),
        ("Eating Disorder", &["eating", "weight"]),
        ("General Stress", &["stress", "pressure"]),
    ],
};

/// Emotional tone of a statement (multimodal endpoint).
pub const TONE_KEYWORDS: KeywordTable = KeywordTable {
    default: "Neutral",
    categories: &[
        ("Sad", &["sad", "down", "depressed"]),
        ("Anxious", &["anxious", "panic"]),
        ("Angry", &["angry", "mad"]),
        ("Stressed", &["stress", "overwhelm"]),
        ("Happy", &["happy", "excited"]),
    ],
};

/// Number of distinct keywords of one category found in already-lowercased text.
fn hits(lower: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| lower.contains(*k)).count()
}

/// Per-category hit counts in table order.
pub fn category_scores(text: &str, table: &KeywordTable) -> Vec<(&'static str, usize)> {
    let lower = text.to_lowercase();
    table
        .categories
        .iter()
        .map(|(category, keywords)| (*category, hits(&lower, keywords)))
        .collect()
}

/// Highest-scoring category; first listed wins ties; table default when nothing matched.
pub fn score(text: &str, table: &KeywordTable) -> &'static str {
    let mut best: Option<(&'static str, usize)> = None;
    for (category, count) in category_scores(text, table) {
        if count > best.map(|(_, c)| c).unwrap_or(0) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category).unwrap_or(table.default)
}

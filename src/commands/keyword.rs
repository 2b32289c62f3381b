use crate::components::google_calendar::FilterKeyword;

/// Chat trigger words and the filter each one selects
pub const KEYWORDS: [(&str, FilterKeyword); 4] = [
    ("今日", FilterKeyword::Today),
    ("W", FilterKeyword::ContainsW),
    ("O", FilterKeyword::ContainsO),
    ("全部", FilterKeyword::All),
];

/// Resolve inbound chat text to a filter keyword; `None` for anything unrecognized
pub fn parse_keyword(text: &str) -> Option<FilterKeyword> {
    let text = text.trim();
    KEYWORDS
        .iter()
        .find(|(word, _)| *word == text)
        .map(|(_, keyword)| *keyword)
}

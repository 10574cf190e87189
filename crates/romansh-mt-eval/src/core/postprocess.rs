const QUOTE_VARIANTS: [char; 4] = ['“', '”', '«', '»'];

/// Normalizes a reference or system segment before scoring.
///
/// Curly and guillemet quotes become `"`, newlines become spaces, and
/// surrounding whitespace is trimmed. Idempotent.
pub fn postprocess(segment: &str) -> String {
    segment
        .replace(QUOTE_VARIANTS, "\"")
        .replace('\n', " ")
        .trim()
        .to_string()
}

pub fn postprocess_all(segments: Vec<String>) -> Vec<String> {
    segments.iter().map(|segment| postprocess(segment)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("«Allegra!»", "\"Allegra!\"")]
    #[case("“Grüezi” sagte er", "\"Grüezi\" sagte er")]
    #[case("  zwei\nZeilen \n", "zwei Zeilen")]
    #[case("", "")]
    #[case(" \n ", "")]
    fn normalizes_quotes_and_whitespace(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(postprocess(input), expected);
    }

    #[test]
    fn keeps_inner_whitespace_runs() {
        assert_eq!(postprocess("a  b"), "a  b");
    }
}

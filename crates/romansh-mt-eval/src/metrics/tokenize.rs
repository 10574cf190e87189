use regex::Regex;
use std::sync::LazyLock;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\{-~\[-` -&\(-\+:-@/])").unwrap());
static PERIOD_COMMA_AFTER_NON_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^0-9])([\.,])").unwrap());
static PERIOD_COMMA_BEFORE_NON_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\.,])([^0-9])").unwrap());
static DASH_AFTER_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9])(-)").unwrap());

/// The `13a` tokenizer of the WMT `mteval-v13a` script.
///
/// Splits punctuation off words except for periods and commas inside numbers.
pub fn tokenize_13a(line: &str) -> Vec<String> {
    let mut line = line.replace("<skipped>", "").replace("-\n", "").replace('\n', " ");
    if line.contains('&') {
        line = line
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
    }

    let line = format!(" {line} ");
    let line = PUNCTUATION.replace_all(&line, " $1 ");
    let line = PERIOD_COMMA_AFTER_NON_DIGIT.replace_all(&line, "$1 $2 ");
    let line = PERIOD_COMMA_BEFORE_NON_DIGIT.replace_all(&line, " $1 $2");
    let line = DASH_AFTER_DIGIT.replace_all(&line, "$1 $2 ");

    line.split_whitespace().map(str::to_string).collect()
}

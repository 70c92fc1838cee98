// Comment normalization.
//
// Lower-case, drop URLs, turn anything that isn't a word character or
// whitespace into a space, then collapse whitespace. Applying it twice gives
// the same result as applying it once.

use std::sync::OnceLock;

use regex_lite::Regex;

/// Anything but a Unicode `White_Space` char. regex-lite's `\S` is ASCII-only,
/// so NBSP and friends are listed explicitly to match `char::is_whitespace`.
const NON_SPACE: &str = r"[^\t\n\x0B\x0C\r \x{85}\x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}]";

/// `http…`, `https…` and `www…` runs up to the next whitespace.
fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!("http{NON_SPACE}+|www{NON_SPACE}+|https{NON_SPACE}+");
        Regex::new(&pattern).expect("url regex")
    })
}

/// Normalize a comment for display and downstream keyword work.
pub fn clean_comment(comment: &str) -> String {
    let lowered = comment.to_lowercase();
    let without_urls = url_re().replace_all(&lowered, "");

    let words_only: String = without_urls
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    words_only.split_whitespace().collect::<Vec<_>>().join(" ")
}

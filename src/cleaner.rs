//! WebVTT to plain text.
//!
//! Timing cues, positioning metadata and inline `<...>` markup are dropped,
//! whitespace is normalized, and the surviving lines are joined into a single
//! transcript which is optionally re-split into fixed-size word chunks.

use regex::Regex;

// Lazily compiled static regex.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| Regex::new($re).unwrap())
    }};
}

/// Substrings that mark a cue-settings / positioning line.
const METADATA_MARKERS: &[&str] = &["align:start", "position:"];

/// Keywords that open a non-caption block (header, comment, styling).
const BLOCK_KEYWORDS: &[&str] = &["WEBVTT", "NOTE", "STYLE", "REGION"];

/// Line filters on top of the basic cue/tag stripping. All off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanOptions {
    /// Drop the `WEBVTT` header block and any `NOTE`, `STYLE` or `REGION` block.
    pub strip_header: bool,
    /// Drop a cleaned line that repeats the line right before it.
    pub dedupe_lines: bool,
}

pub struct Cleaner {
    chunk_size: Option<usize>,
    options: CleanOptions,
}

impl Cleaner {
    /// A chunk size of zero is treated the same as no chunk size.
    pub fn new(chunk_size: Option<usize>) -> Self {
        Self {
            chunk_size: chunk_size.filter(|&size| size > 0),
            options: CleanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CleanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn chunk_size(&self) -> Option<usize> {
        self.chunk_size
    }

    /// Clean `content` and split it into chunks.
    ///
    /// Without a chunk size the result always has exactly one element (the
    /// whole transcript, possibly empty). With a chunk size every chunk but
    /// the last holds exactly that many words, and empty input gives no
    /// chunks at all.
    pub fn clean_and_chunk(&self, content: &str) -> Vec<String> {
        let combined = self.clean_lines(content).join(" ");

        match self.chunk_size {
            None => vec![combined],
            Some(size) => chunk_words(&combined, size),
        }
    }

    /// The cleaned, non-empty lines of `content` in their original order.
    pub fn clean_lines(&self, content: &str) -> Vec<String> {
        let mut cleaned: Vec<String> = Vec::new();
        let mut in_block = false;
        let mut after_blank = true;

        for line in split_lines(content).map(str::trim) {
            // Blocks only open at the start of the file or after a blank line.
            let at_block_start = after_blank;
            after_blank = line.is_empty();

            if self.options.strip_header {
                if in_block {
                    in_block = !line.is_empty();
                    continue;
                }
                if at_block_start && opens_block(line) {
                    in_block = true;
                    continue;
                }
            }

            let Some(line) = clean_line(line) else {
                continue;
            };

            if self.options.dedupe_lines && cleaned.last() == Some(&line) {
                continue;
            }
            cleaned.push(line);
        }

        cleaned
    }
}

/// Clean a single trimmed line, or `None` if nothing of it survives.
fn clean_line(line: &str) -> Option<String> {
    if line.is_empty() || is_timing_line(line) || is_metadata_line(line) {
        return None;
    }

    let untagged = regex!(r"<[^>]*>").replace_all(line, "");
    let normalized = regex!(r"\s+").replace_all(&untagged, " ");
    let normalized = normalized.trim();

    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_owned())
    }
}

/// `HH:MM:SS.mmm --> HH:MM:SS.mmm`, optionally followed by cue settings.
fn is_timing_line(line: &str) -> bool {
    regex!(r"^\d{2}:\d{2}:\d{2}\.\d{3}\s*-->\s*\d{2}:\d{2}:\d{2}\.\d{3}.*$").is_match(line)
}

fn is_metadata_line(line: &str) -> bool {
    METADATA_MARKERS.iter().any(|marker| line.contains(marker))
}

fn opens_block(line: &str) -> bool {
    let line = line.trim_start_matches('\u{feff}');
    BLOCK_KEYWORDS.iter().any(|keyword| {
        line.strip_prefix(keyword)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}

/// Split on every line boundary: `\n`, `\r\n`, a lone `\r` and the rarer
/// Unicode separators.
fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().flat_map(|line| {
        line.split(|c: char| {
            matches!(
                c,
                '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
            )
        })
    })
}

/// `size` must be non-zero.
fn chunk_words(text: &str, size: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();

    words.chunks(size).map(|chunk| chunk.join(" ")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "00:00:01.000 --> 00:00:02.000 align:start position:0%\nHello <c>world</c>\n\n00:00:03.000 --> 00:00:04.000\nFoo   bar\n";

    fn clean(text: &str, chunk_size: Option<usize>) -> Vec<String> {
        Cleaner::new(chunk_size).clean_and_chunk(text)
    }

    #[test]
    fn test_sample_without_chunking() {
        assert_eq!(clean(SAMPLE, None), vec!["Hello world Foo bar"]);
    }

    #[test]
    fn test_sample_with_chunking() {
        assert_eq!(clean(SAMPLE, Some(2)), vec!["Hello world", "Foo bar"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean("", None), vec![String::new()]);
        assert!(clean("", Some(3)).is_empty());
        assert!(clean("\n  \n\t\n", Some(3)).is_empty());
    }

    #[test]
    fn test_zero_chunk_size_means_no_chunking() {
        assert_eq!(clean(SAMPLE, Some(0)), vec!["Hello world Foo bar"]);
        assert_eq!(Cleaner::new(Some(0)).chunk_size(), None);
    }

    #[test]
    fn test_timing_lines_are_dropped() {
        let input = "00:01:02.345 --> 00:01:04.000\n\
                     12:34:56.789-->12:34:57.000 line:90%\n\
                     kept";
        assert_eq!(clean(input, None), vec!["kept"]);
    }

    #[test]
    fn test_malformed_timing_lines_are_text() {
        let input = "0:00:01.000 --> 0:00:02.000\n00:00:01 --> 00:00:02";
        assert_eq!(
            clean(input, None),
            vec!["0:00:01.000 --> 0:00:02.000 00:00:01 --> 00:00:02"]
        );
    }

    #[test]
    fn test_metadata_lines_are_dropped() {
        let input = "one\nsomething align:start\nposition:50% two\nthree";
        assert_eq!(clean(input, None), vec!["one three"]);
    }

    #[test]
    fn test_tags_are_stripped() {
        let input = "<v Roger>Hi</v> <00:00:45.280><c>there</c> <>friend\n<i></i>\n<b>bold</b>";
        let out = clean(input, None);
        assert_eq!(out, vec!["Hi there friend bold"]);
        assert!(!out[0].contains('<'));
        assert!(!out[0].contains('>'));
    }

    #[test]
    fn test_tag_only_line_contributes_nothing() {
        let input = "a\n<c> </c>\nb";
        assert_eq!(Cleaner::new(None).clean_lines(input), vec!["a", "b"]);
        assert_eq!(clean(input, None), vec!["a b"]);
    }

    #[test]
    fn test_edge_tags_leave_no_stray_spaces() {
        assert_eq!(clean("x <i></i>\ny", None), vec!["x y"]);
        assert_eq!(clean("<c.yellow></c> z <b>w</b> <i></i>", None), vec!["z w"]);
        assert_eq!(clean("x <i></i>\ny", Some(1)), vec!["x", "y"]);
    }

    #[test]
    fn test_strip_header_keeps_caption_starting_with_keyword() {
        let input = "WEBVTT\n\n\
                     00:00:01.000 --> 00:00:02.000\n\
                     NOTE the exam is Friday\nbring a pencil\n\n\
                     00:00:03.000 --> 00:00:04.000\nSTYLE matters\n\n\
                     NOTE real comment\nskipped\n\n\
                     00:00:05.000 --> 00:00:06.000\nbye";
        let cleaner = Cleaner::new(None).with_options(CleanOptions {
            strip_header: true,
            ..Default::default()
        });
        assert_eq!(
            cleaner.clean_and_chunk(input),
            vec!["NOTE the exam is Friday bring a pencil STYLE matters bye"]
        );
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let input = "  lots\t\tof    space  \r\nhere ";
        assert_eq!(clean(input, None), vec!["lots of space here"]);
    }

    #[test]
    fn test_line_boundaries() {
        let input = "one\r\ntwo\rthree\u{2028}four";
        assert_eq!(
            Cleaner::new(None).clean_lines(input),
            vec!["one", "two", "three", "four"]
        );
    }

    #[test]
    fn test_header_kept_by_default() {
        let input = "WEBVTT\nKind: captions\n\n00:00:00.000 --> 00:00:01.000\nhi";
        assert_eq!(clean(input, None), vec!["WEBVTT Kind: captions hi"]);
    }

    #[test]
    fn test_strip_header() {
        let input = "\u{feff}WEBVTT - title\r\nKind: captions\r\nLanguage: en\r\n\r\n\
                     NOTE this is\r\na comment\r\n\r\n\
                     STYLE\r\n::cue { color: red }\r\n\r\n\
                     00:00:00.000 --> 00:00:01.000\r\nhi\r\nNOTEWORTHY line\r\n";
        let cleaner = Cleaner::new(None).with_options(CleanOptions {
            strip_header: true,
            ..Default::default()
        });
        assert_eq!(cleaner.clean_and_chunk(input), vec!["hi NOTEWORTHY line"]);
    }

    #[test]
    fn test_dedupe_lines() {
        let input = "00:00:00.000 --> 00:00:01.000\nhello there\n\n\
                     00:00:01.000 --> 00:00:02.000\nhello <c>there</c>\ngeneral\n\n\
                     00:00:02.000 --> 00:00:03.000\nhello there";
        let plain = Cleaner::new(None);
        assert_eq!(
            plain.clean_and_chunk(input),
            vec!["hello there hello there general hello there"]
        );

        let deduped = Cleaner::new(None).with_options(CleanOptions {
            dedupe_lines: true,
            ..Default::default()
        });
        assert_eq!(
            deduped.clean_and_chunk(input),
            vec!["hello there general hello there"]
        );
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let once = clean(SAMPLE, None);
        assert_eq!(clean(&once[0], None), once);

        let odd = "a < b and c > d\n<i>x</i>";
        let once = clean(odd, None);
        assert_eq!(clean(&once[0], None), once);
    }

    #[test]
    fn test_chunk_word_counts() {
        let text: String = (0..23)
            .map(|i| format!("00:00:{:02}.000 --> 00:00:{:02}.500\nword{}  <c>x{}</c>\n\n", i, i, i, i))
            .collect();
        let words: Vec<String> = clean(&text, None)[0]
            .split_whitespace()
            .map(String::from)
            .collect();
        assert_eq!(words.len(), 46);

        for size in 1..=10 {
            let chunks = clean(&text, Some(size));
            let (last, rest) = chunks.split_last().unwrap();
            for chunk in rest {
                assert_eq!(chunk.split_whitespace().count(), size);
            }
            let tail = last.split_whitespace().count();
            assert!((1..=size).contains(&tail));

            let rejoined: Vec<String> = chunks
                .iter()
                .flat_map(|c| c.split_whitespace().map(String::from))
                .collect();
            assert_eq!(rejoined, words);
        }
    }

    #[test]
    fn test_chunk_larger_than_text() {
        assert_eq!(clean(SAMPLE, Some(100)), vec!["Hello world Foo bar"]);
    }
}

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Bracketed stage directions, e.g. `[Exit GHOST]`.
static STAGE_DIRECTION: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\[.*?\]").expect("STAGE_DIRECTION must compile"));

/// Lines holding only an upper-case speaker label, e.g. `HAMLET.`.
static SPEAKER_LABEL: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?mR)^[A-Z]+\.$").expect("SPEAKER_LABEL must compile"));

/// A word (letters, digits, underscore, inner apostrophes) or any other single visible character.
static TOKEN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\b[\w']+\b|\S").expect("TOKEN must compile"));

/// First word character of the text, or of a sentence following a period.
static SENTENCE_START: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\w|\.\s+\w").expect("SENTENCE_START must compile"));

/// A space in front of closing punctuation.
static SPACE_BEFORE_PUNCTUATION: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r" ([.,!?;:])").expect("SPACE_BEFORE_PUNCTUATION must compile"));

/// Word-level tokenizer.
///
/// Turns raw text into lower-case word and punctuation tokens, and joins
/// tokens back into readable text.
///
/// Stateless: the patterns are compiled once per process and shared.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tokenizer;

impl Tokenizer {
	pub fn new() -> Self {
		Self
	}

	/// Splits `text` into tokens.
	///
	/// - Removes `[...]` spans and lines made only of an upper-case label followed by a period
	/// - Lower-cases what remains
	/// - Emits maximal runs of word/apostrophe characters, and every other
	///   non-whitespace character on its own
	///
	/// Empty or whitespace-only input gives an empty vector.
	pub fn tokenize(&self, text: &str) -> Vec<String> {
		let text = STAGE_DIRECTION.replace_all(text, "");
		let text = SPEAKER_LABEL.replace_all(&text, "");
		let text = text.to_lowercase();

		TOKEN.find_iter(&text).map(|m| m.as_str().to_owned()).collect()
	}

	/// Joins tokens back into text.
	///
	/// Tokens are separated by single spaces, sentence starts are capitalized
	/// (naively: any period followed by whitespace starts a sentence), then the
	/// space before `. , ! ? ; :` is removed.
	pub fn detokenize<S: AsRef<str>>(&self, tokens: &[S]) -> String {
		let joined = tokens.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");

		let capitalized = SENTENCE_START.replace_all(&joined, |caps: &Captures| caps[0].to_uppercase());

		SPACE_BEFORE_PUNCTUATION.replace_all(&capitalized, "$1").into_owned()
	}
}

//! Turning text into element sequences and back.
//!
//! Every mode is lossless: concatenating the tokens gives the input back.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TokenMode {
    /// One token per line, terminator included.
    #[default]
    Lines,
    /// Alternating runs of whitespace and non-whitespace.
    Words,
    /// One token per character.
    Chars,
}

pub fn tokenize(text: &str, mode: TokenMode) -> Vec<String> {
    match mode {
        TokenMode::Lines => text.split_inclusive('\n').map(str::to_owned).collect(),
        TokenMode::Words => words(text),
        TokenMode::Chars => text.chars().map(String::from).collect(),
    }
}

pub fn join(tokens: &[String]) -> String {
    tokens.concat()
}

fn words(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                tokens.push(text[start..i].to_owned());
                start = i;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(text[start..].to_owned());
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_keep_terminators() {
        assert_eq!(
            tokenize("a\nb\nc", TokenMode::Lines),
            vec!["a\n", "b\n", "c"]
        );
        assert_eq!(tokenize("a\n", TokenMode::Lines), vec!["a\n"]);
        assert!(tokenize("", TokenMode::Lines).is_empty());
    }

    #[test]
    fn test_words_alternate() {
        assert_eq!(
            tokenize("let  x = 1;\n", TokenMode::Words),
            vec!["let", "  ", "x", " ", "=", " ", "1;", "\n"]
        );
        assert_eq!(tokenize("  lead", TokenMode::Words), vec!["  ", "lead"]);
    }

    #[test]
    fn test_chars_unicode() {
        assert_eq!(tokenize("hé!", TokenMode::Chars), vec!["h", "é", "!"]);
    }

    #[test]
    fn test_join_is_lossless() {
        let text = "fn main() {\n    println!(\"hi\");\n}\n\n";
        for mode in [TokenMode::Lines, TokenMode::Words, TokenMode::Chars] {
            assert_eq!(join(&tokenize(text, mode)), text, "{mode:?}");
        }
    }
}

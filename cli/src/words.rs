//! Splitting shell-mode input into arguments

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Незакрытая кавычка")]
pub struct UnclosedQuote;

/// Split on whitespace; single or double quotes group words, e.g.
/// `add --city "New York" --price 2`.
pub fn split_words(line: &str) -> Result<Vec<String>, UnclosedQuote> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(UnclosedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words() {
        assert_eq!(split_words("  list   --json ").unwrap(), vec!["list", "--json"]);
        assert!(split_words("   ").unwrap().is_empty());
    }

    #[test]
    fn quoted_words_keep_spaces() {
        assert_eq!(
            split_words(r#"add --city "New  York" --price '2,5'"#).unwrap(),
            vec!["add", "--city", "New  York", "--price", "2,5"]
        );
    }

    #[test]
    fn empty_quotes_make_an_empty_word() {
        assert_eq!(split_words(r#"add --city """#).unwrap(), vec!["add", "--city", ""]);
    }

    #[test]
    fn unclosed_quote_is_an_error() {
        assert_eq!(split_words(r#"add --city "Omsk"#), Err(UnclosedQuote));
    }
}

//! Reading terms from text
//!
//! The grammar is read in a single pass with one character of lookahead.
//! Whitespace is skipped before every token. Any structural violation aborts
//! the whole read with a [`FormatError`].

use crate::error::{FormatError, ReadError};
use crate::term::Term;
use std::io::Read;
use std::path::Path;
use tracing::trace;

/// Read a single term from a string
pub fn read(input: &str) -> Result<Term, FormatError> {
    let mut reader = TermReader::new(input);
    let term = reader.read_term()?;
    reader.skip_whitespace();
    if let Some(ch) = reader.peek() {
        return Err(reader.error(format!("Unexpected '{}' after the term", ch)));
    }
    Ok(term)
}

/// Read a single term from a byte stream holding UTF-8 text
pub fn read_from(mut source: impl Read) -> Result<Term, ReadError> {
    let mut text = String::new();
    source.read_to_string(&mut text)?;
    Ok(read(&text)?)
}

/// Read a single term from a file
pub fn read_file(path: impl AsRef<Path>) -> Result<Term, ReadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    trace!(path = %path.display(), bytes = text.len(), "reading term file");
    Ok(read(&text)?)
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || matches!(ch, '_' | '-' | '+' | '*' | '$')
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '+' | '*' | '$')
}

/// Recursive-descent term reader over a string
struct TermReader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TermReader<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    // ===== Character Stream =====

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// The character after the next one
    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> FormatError {
        FormatError::new(message, self.pos)
    }

    fn peek_or_fail(&self) -> Result<char, FormatError> {
        self.peek().ok_or_else(|| self.error("Unexpected end of input"))
    }

    fn next_or_fail(&mut self) -> Result<char, FormatError> {
        self.advance().ok_or_else(|| self.error("Unexpected end of input"))
    }

    fn expect(&mut self, what: &str, expected: char) -> Result<(), FormatError> {
        let offset = self.pos;
        let ch = self.next_or_fail()?;
        if ch != expected {
            return Err(FormatError::new(
                format!("Expected {}, got '{}'", what, ch),
                offset,
            ));
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    // ===== Terms =====

    fn read_term(&mut self) -> Result<Term, FormatError> {
        self.skip_whitespace();
        let ch = self.peek_or_fail()?;
        let term = match ch {
            '[' => self.read_list()?,
            '(' => self.read_appl()?,
            '"' => self.read_string()?,
            '<' => self.read_placeholder()?,
            '.' | '0'..='9' => self.read_number(false)?,
            '-' if matches!(self.peek_second(), Some('.' | '0'..='9')) => {
                self.advance();
                self.read_number(true)?
            }
            c if is_identifier_start(c) => self.read_appl()?,
            c => return Err(self.error(format!("Invalid term starting with '{}'", c))),
        };
        let annotations = self.read_annotations()?;
        Ok(if annotations.is_empty() {
            term
        } else {
            term.annotated(annotations)
        })
    }

    /// `{ terms }` after a term, if present
    fn read_annotations(&mut self) -> Result<Vec<Term>, FormatError> {
        self.skip_whitespace();
        if self.peek() != Some('{') {
            return Ok(Vec::new());
        }
        self.advance();
        self.read_sequence('}')
    }

    /// Comma-separated terms up to and including `end`
    fn read_sequence(&mut self, end: char) -> Result<Vec<Term>, FormatError> {
        self.skip_whitespace();
        if self.peek_or_fail()? == end {
            self.advance();
            return Ok(Vec::new());
        }

        let mut terms = Vec::new();
        loop {
            terms.push(self.read_term()?);
            self.skip_whitespace();
            let offset = self.pos;
            match self.next_or_fail()? {
                ',' => continue,
                ch if ch == end => return Ok(terms),
                ch => {
                    return Err(FormatError::new(
                        format!("Expected ',' or '{}', got '{}'", end, ch),
                        offset,
                    ))
                }
            }
        }
    }

    fn read_list(&mut self) -> Result<Term, FormatError> {
        self.expect("list", '[')?;
        Ok(Term::list(self.read_sequence(']')?))
    }

    /// An application, or a tuple when there is no constructor name
    fn read_appl(&mut self) -> Result<Term, FormatError> {
        let constructor = self.read_identifier();
        self.skip_whitespace();
        let args = if self.peek() == Some('(') {
            self.advance();
            self.read_sequence(')')?
        } else if constructor.is_empty() {
            return Err(self.error("Expected a constructor or '('"));
        } else {
            Vec::new()
        };
        Ok(Term::appl(constructor, args))
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        if self.peek().is_some_and(is_identifier_start) {
            self.advance();
            while self.peek().is_some_and(is_identifier_char) {
                self.advance();
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn read_placeholder(&mut self) -> Result<Term, FormatError> {
        self.expect("placeholder start", '<')?;
        let template = self.read_term()?;
        self.skip_whitespace();
        self.expect("placeholder end", '>')?;
        Ok(Term::placeholder(template))
    }

    fn read_digits(&mut self) -> &'a str {
        let input = self.input;
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        &input[start..self.pos]
    }

    /// An integer, or a real when a fraction or exponent is present
    fn read_number(&mut self, negative: bool) -> Result<Term, FormatError> {
        let start = self.pos;
        let ints = self.read_digits();
        let mut frac = None;
        let mut exp = None;
        if self.peek() == Some('.') {
            self.advance();
            frac = Some(self.read_digits());
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            exp = Some(self.read_digits());
        }
        if ints.is_empty() && frac.map_or(true, str::is_empty) {
            return Err(FormatError::new("Expected a number", start));
        }

        let sign = if negative { "-" } else { "" };
        if frac.is_none() && exp.is_none() {
            let text = format!("{}{}", sign, ints);
            return text
                .parse::<i64>()
                .map(Term::int)
                .map_err(|_| FormatError::new(format!("Integer out of range: {}", text), start));
        }

        let nonempty = |s: Option<&str>| match s {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => "0".to_string(),
        };
        let text = format!(
            "{}{}.{}e{}",
            sign,
            nonempty(Some(ints)),
            nonempty(frac),
            nonempty(exp)
        );
        text.parse::<f64>()
            .map(Term::real)
            .map_err(|_| FormatError::new(format!("Invalid real: {}", text), start))
    }

    fn read_string(&mut self) -> Result<Term, FormatError> {
        self.expect("string", '"')?;
        let mut value = String::new();
        loop {
            let ch = self.next_or_fail()?;
            match ch {
                '"' => break,
                '\\' => {
                    let offset = self.pos - 1;
                    let escaped = match self.next_or_fail()? {
                        'n' => '\n',
                        'r' => '\r',
                        'f' => '\u{c}',
                        't' => '\t',
                        '\\' => '\\',
                        '\'' => '\'',
                        '"' => '"',
                        'u' => self.read_unicode_escape(4, 4, offset)?,
                        'U' => self.read_unicode_escape(8, 8, offset)?,
                        'x' => self.read_unicode_escape(1, 4, offset)?,
                        other => {
                            return Err(FormatError::new(
                                format!("Unrecognized escape sequence: '\\{}'", other),
                                offset,
                            ))
                        }
                    };
                    value.push(escaped);
                }
                c => value.push(c),
            }
        }
        Ok(Term::string(value))
    }

    /// Between `min` and `max` hex digits forming one code point
    fn read_unicode_escape(&mut self, min: usize, max: usize, offset: usize) -> Result<char, FormatError> {
        let start = self.pos;
        let mut count = 0;
        while count < max && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.advance();
            count += 1;
        }
        if count < min {
            return Err(FormatError::new(
                format!(
                    "Expected at least {} digits to form a Unicode character escape sequence, found {}",
                    min, count
                ),
                offset,
            ));
        }
        let digits = &self.input[start..self.pos];
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| FormatError::new(format!("Invalid code point: {}", digits), offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::TermKind;

    #[test]
    fn test_read_tuples() {
        assert_eq!(read("()").unwrap(), Term::tuple(vec![]));
        assert_eq!(read("(10)").unwrap(), Term::tuple(vec![Term::int(10)]));
        assert_eq!(
            read("(\"a\", 10)").unwrap(),
            Term::tuple(vec![Term::string("a"), Term::int(10)])
        );
    }

    #[test]
    fn test_read_applications() {
        assert_eq!(read("MyCons()").unwrap(), Term::appl("MyCons", vec![]));
        assert_eq!(read("MyCons").unwrap(), Term::appl("MyCons", vec![]));
        assert_eq!(
            read("MyCons(\"a\", 10)").unwrap(),
            Term::appl("MyCons", vec![Term::string("a"), Term::int(10)])
        );
        assert_eq!(
            read("  Foo ( Bar , [ ] ) ").unwrap(),
            Term::appl("Foo", vec![Term::appl("Bar", vec![]), Term::list(vec![])])
        );
        assert_eq!(read("$x-1").unwrap(), Term::appl("$x-1", vec![]));
    }

    #[test]
    fn test_read_lists() {
        assert_eq!(read("[]").unwrap(), Term::list(vec![]));
        assert_eq!(read("[10]").unwrap(), Term::list(vec![Term::int(10)]));
        assert_eq!(
            read("[\"a\", 10]").unwrap(),
            Term::list(vec![Term::string("a"), Term::int(10)])
        );
    }

    #[test]
    fn test_read_numbers() {
        assert_eq!(read("0").unwrap(), Term::int(0));
        assert_eq!(read("42").unwrap(), Term::int(42));
        assert_eq!(read("-7").unwrap(), Term::int(-7));
        assert_eq!(read(".0").unwrap(), Term::real(0.0));
        assert_eq!(read("0.0").unwrap(), Term::real(0.0));
        assert_eq!(read("42.1").unwrap(), Term::real(42.1));
        assert_eq!(read("42e2").unwrap(), Term::real(4200.0));
        assert_eq!(read(".1e2").unwrap(), Term::real(10.0));
        assert_eq!(read("42.1e2").unwrap(), Term::real(4210.0));
        assert_eq!(read("-1.5").unwrap(), Term::real(-1.5));
        assert!(matches!(read("42e2").unwrap().kind(), TermKind::Real(_)));
    }

    #[test]
    fn test_read_strings() {
        assert_eq!(read("\"\"").unwrap(), Term::string(""));
        assert_eq!(read("\"abc\"").unwrap(), Term::string("abc"));
        assert_eq!(
            read(r#""a\n\r\t\f\\\"\'b""#).unwrap(),
            Term::string("a\n\r\t\u{c}\\\"'b")
        );
        assert_eq!(read(r#""\u00e9\x41\U0001F600""#).unwrap(), Term::string("éA😀"));
    }

    #[test]
    fn test_read_placeholder() {
        assert_eq!(
            read("<Foo(1)>").unwrap(),
            Term::placeholder(Term::appl("Foo", vec![Term::int(1)]))
        );
    }

    #[test]
    fn test_read_annotations() {
        let term = read("()  {MyAnno(42)}").unwrap();
        assert_eq!(term, Term::tuple(vec![]));
        assert_eq!(
            term.annotations(),
            &[Term::appl("MyAnno", vec![Term::int(42)])]
        );

        let empty = read("[]{}").unwrap();
        assert!(empty.annotations().is_empty());

        let nested = read("Foo(1{A}){B(\"x\"{C})}").unwrap();
        assert_eq!(nested.get(0).unwrap().annotations().len(), 1);
        let b = nested.annotation("B", Some(1)).unwrap();
        assert_eq!(b.get(0).unwrap().annotations()[0], Term::appl("C", vec![]));
    }

    #[test]
    fn test_read_errors() {
        for input in [
            "",
            "[1, 2",
            "(1",
            "\"abc",
            "Foo(1 2)",
            "\"\\q\"",
            "\"\\u12\"",
            "<1",
            "@",
            "1 2",
            "99999999999999999999",
            "{A}",
            ".",
        ] {
            assert!(read(input).is_err(), "expected an error for {:?}", input);
        }

        let err = read("[1, ?]").unwrap_err();
        assert_eq!(err.offset, 4);
    }
}

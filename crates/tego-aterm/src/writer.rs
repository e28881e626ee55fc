//! Writing terms as text
//!
//! The output reads back with [`read`](crate::reader::read) into an equal
//! term with equal annotations. Terms that have no textual form (blobs,
//! variables, non-finite reals, constructors that are not identifiers) are
//! rejected with [`io::ErrorKind::InvalidInput`].

use crate::term::{Term, TermKind};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write `term` to `sink`
pub fn write(term: &Term, sink: &mut impl Write) -> io::Result<()> {
    check_writable(term)?;
    write!(sink, "{}", term)
}

/// Write `term` to a string
pub fn write_to_string(term: &Term) -> io::Result<String> {
    check_writable(term)?;
    Ok(term.to_string())
}

/// Write `term` to a file, replacing it
pub fn write_file(term: &Term, path: impl AsRef<Path>) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write(term, &mut out)?;
    out.flush()
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

fn is_identifier(name: &str) -> bool {
    let extra = |c: char| matches!(c, '_' | '-' | '+' | '*' | '$');
    let mut chars = name.chars();
    let first_ok = match chars.next() {
        None => return true,
        // `-` followed by a digit reads as a negative number
        Some('-') => !matches!(chars.clone().next(), Some('.' | '0'..='9')),
        Some(c) => c.is_alphabetic() || extra(c),
    };
    first_ok && chars.all(|c| c.is_alphanumeric() || extra(c))
}

fn check_writable(term: &Term) -> io::Result<()> {
    let mut pending = vec![term];
    while let Some(term) = pending.pop() {
        match term.kind() {
            TermKind::Blob(_) => return Err(invalid("blob terms cannot be written".to_string())),
            TermKind::Var(name) => {
                return Err(invalid(format!("term variable {} cannot be written", name)))
            }
            TermKind::Real(value) if !value.is_finite() => {
                return Err(invalid(format!("real {} cannot be written", value)))
            }
            TermKind::Appl { constructor, .. } if !is_identifier(constructor) => {
                return Err(invalid(format!("constructor {:?} is not an identifier", constructor)))
            }
            _ => {}
        }
        pending.extend(term.subterms());
        pending.extend(term.template().ok());
        pending.extend(term.annotations());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read;
    use crate::term::Blob;

    #[test]
    fn test_round_trip_keeps_annotations() {
        let term = Term::appl(
            "StrategyDef",
            vec![
                Term::string("tab\there \"quoted\" \u{1}"),
                Term::list(vec![Term::int(-5), Term::real(0.25), Term::real(3.0)]),
                Term::placeholder(Term::tuple(vec![Term::int(1)])),
            ],
        )
        .annotated(vec![Term::appl("OfRef", vec![Term::appl("Ref", vec![])
            .annotated(vec![Term::appl("TermIndex", vec![Term::string("r"), Term::int(3)])])])]);

        let text = write_to_string(&term).unwrap();
        let back = read(&text).unwrap();
        assert_eq!(back, term);
        assert_eq!(back.annotations(), term.annotations());
        let inner = &back.annotations()[0].get(0).unwrap().annotations()[0];
        assert_eq!(inner.get(1).unwrap().as_int().unwrap(), 3);
    }

    #[test]
    fn test_unwritable_terms() {
        assert!(write_to_string(&Term::blob(Blob::new(1u8))).is_err());
        assert!(write_to_string(&Term::list(vec![Term::var("x")])).is_err());
        assert!(write_to_string(&Term::real(f64::NAN)).is_err());
        assert!(write_to_string(&Term::placeholder(Term::var("x"))).is_err());
        assert!(write_to_string(&Term::appl("has space", vec![])).is_err());
        assert!(write_to_string(&Term::appl("-1", vec![])).is_err());
        assert!(write_to_string(&Term::appl("-x", vec![])).is_ok());
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("term.aterm");
        let term = Term::appl("Foo", vec![Term::string("bar")]);
        write_file(&term, &path).unwrap();
        assert_eq!(crate::reader::read_file(&path).unwrap(), term);
    }
}

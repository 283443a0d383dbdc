//! Loaders for the three plain-text input files.
//!
//! Each format has a `parse_*` function that works on the file's text and a
//! `load_*` wrapper that reads it from disk first.

mod attachments_file;
mod mesh_file;
mod skeleton_file;

pub use self::attachments_file::{load_attachments, parse_attachments};
pub use self::mesh_file::{load_mesh, parse_mesh};
pub use self::skeleton_file::{load_skeleton, parse_skeleton};

use errors::{Error, ErrorKind, Result, ResultExt};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

fn read_file(path: &Path, kind: &'static str) -> Result<String> {
    let mut s = String::new();
    File::open(path)
        .and_then(|mut f| f.read_to_string(&mut s))
        .chain_err(|| format!("unable to open {} file {}", kind, path.to_string_lossy()))?;
    Ok(s)
}

/// Cursor over the whitespace-separated fields of one line.
struct Fields<'a> {
    file: &'static str,
    line_no: usize,
    tokens: SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    fn new(file: &'static str, line_no: usize, line: &'a str) -> Fields<'a> {
        Fields { file, line_no, tokens: line.split_whitespace() }
    }

    fn error(&self, msg: String) -> Error {
        ErrorKind::Parse(self.file, self.line_no, msg).into()
    }

    fn next_token(&mut self) -> Option<&'a str> {
        self.tokens.next()
    }

    fn parse<T: FromStr>(&self, token: &str, what: &str) -> Result<T> {
        token.parse::<T>()
            .map_err(|_| self.error(format!("expected {}, found {:?}", what, token)))
    }

    /// The next field, which must exist and parse as a T.
    fn next<T: FromStr>(&mut self, what: &str) -> Result<T> {
        match self.tokens.next() {
            Some(token) => self.parse(token, what),
            None => Err(self.error(format!("missing {}", what))),
        }
    }

    /// Number of fields left over.
    fn remaining(self) -> usize {
        self.tokens.count()
    }
}

#[test]
fn test_missing_file_names_kind_and_path() {
    use std::io;

    let path = Path::new("does/not/exist.obj");
    let io_err = File::open(path).err().unwrap();
    assert_eq!(io_err.kind(), io::ErrorKind::NotFound);

    let err = load_mesh(path).err().unwrap();
    match *err.kind() {
        ErrorKind::Msg(ref msg) => {
            assert!(msg.starts_with("unable to open mesh file"));
            assert!(msg.contains("does/not/exist.obj"));
        }
        ref kind => panic!("unexpected error {:?}", kind),
    }
    let cause = err.iter().nth(1).expect("io error in the chain");
    assert_eq!(cause.to_string(), io_err.to_string());

    let err = load_skeleton(Path::new("does/not/exist.skel")).err().unwrap();
    assert!(err.to_string().starts_with("unable to open skeleton file"));
    let err = load_attachments(Path::new("does/not/exist.attach"), 2).err().unwrap();
    assert!(err.to_string().starts_with("unable to open attachments file"));
}

//! Skeleton files have one joint per line:
//!
//!     tx ty tz parent
//!
//! where (tx,ty,tz) is the offset from the parent joint and parent is the
//! index of an earlier line, or -1 for the root. Blank lines and lines
//! starting with # don't count as joints.

use cgmath::vec3;
use errors::{Result, ResultExt};
use skeleton::JointRecord;
use std::path::Path;
use super::{read_file, Fields};

static FILE_KIND: &str = "skeleton";

pub fn load_skeleton(path: &Path) -> Result<Vec<JointRecord>> {
    let text = read_file(path, FILE_KIND)?;
    parse_skeleton(&text)
        .chain_err(|| format!("couldn't load skeleton file {}", path.to_string_lossy()))
}

pub fn parse_skeleton(text: &str) -> Result<Vec<JointRecord>> {
    let mut records = vec![];

    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut fields = Fields::new(FILE_KIND, i + 1, line);
        let tx = fields.next::<f64>("x offset")?;
        let ty = fields.next::<f64>("y offset")?;
        let tz = fields.next::<f64>("z offset")?;
        let parent = fields.next::<i64>("parent index")?;
        let parent = match parent {
            -1 => None,
            p if p >= 0 => Some(p as usize),
            p => return Err(fields.error(format!(
                "parent index must be -1 or a joint index, found {}", p,
            ))),
        };
        let extra = fields.remaining();
        if extra != 0 {
            warn!("skeleton line {}: ignoring {} extra field(s)", i + 1, extra);
        }

        records.push(JointRecord { translation: vec3(tx, ty, tz), parent });
    }

    debug!("read {} joints", records.len());

    Ok(records)
}

#[test]
fn test_parse_skeleton() {
    let text = "\
        # a comment\n\
        0 0 0 -1\n\
        \n\
        0.5 1e-1 -2 0\n\
        \t1 1 1 1\n";
    let records = parse_skeleton(text).unwrap();
    assert_eq!(records, vec![
        JointRecord { translation: vec3(0.0, 0.0, 0.0), parent: None },
        JointRecord { translation: vec3(0.5, 0.1, -2.0), parent: Some(0) },
        JointRecord { translation: vec3(1.0, 1.0, 1.0), parent: Some(1) },
    ]);
}

#[test]
fn test_malformed_number_reports_line() {
    use errors::ErrorKind;

    let err = parse_skeleton("0 0 0 -1\n0 zero 0 0\n").unwrap_err();
    match *err.kind() {
        ErrorKind::Parse("skeleton", 2, _) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }

    let err = parse_skeleton("0 0 0\n").unwrap_err();
    match *err.kind() {
        ErrorKind::Parse("skeleton", 1, _) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }

    let err = parse_skeleton("0 0 0 -2\n").unwrap_err();
    match *err.kind() {
        ErrorKind::Parse("skeleton", 1, _) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }
}

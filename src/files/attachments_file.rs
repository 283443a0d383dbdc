//! Attachment files have one line per mesh vertex, in the same order as the
//! mesh file. Each line holds the vertex's weight for joint 0, 1, 2, ...
//! Missing trailing weights are zero.

use errors::{ErrorKind, Result, ResultExt};
use std::path::Path;
use super::{read_file, Fields};

static FILE_KIND: &str = "attachments";

pub fn load_attachments(path: &Path, num_joints: usize) -> Result<Vec<Vec<f64>>> {
    let text = read_file(path, FILE_KIND)?;
    parse_attachments(&text, num_joints)
        .chain_err(|| format!("couldn't load attachments file {}", path.to_string_lossy()))
}

pub fn parse_attachments(text: &str, num_joints: usize) -> Result<Vec<Vec<f64>>> {
    let lines: Vec<&str> = text.lines().collect();

    // A blank line in the middle would shift every following row onto the
    // wrong vertex, so only trailing ones are allowed.
    let num_lines = lines.iter()
        .rposition(|line| !line.trim().is_empty())
        .map(|last| last + 1)
        .unwrap_or(0);

    let mut rows = Vec::with_capacity(num_lines);
    let mut num_padded = 0;

    for (i, line) in lines[..num_lines].iter().enumerate() {
        if line.trim().is_empty() {
            bail!(ErrorKind::Parse(
                FILE_KIND,
                i + 1,
                "blank line between attachment rows".to_string(),
            ));
        }

        let mut fields = Fields::new(FILE_KIND, i + 1, line);
        let mut row = Vec::with_capacity(num_joints);
        while row.len() < num_joints {
            match fields.next_token() {
                Some(token) => row.push(fields.parse::<f64>(token, "joint weight")?),
                None => break,
            }
        }
        if row.len() < num_joints {
            trace!("attachments line {}: padding {} missing weight(s) with zero",
                i + 1, num_joints - row.len());
            num_padded += 1;
            row.resize(num_joints, 0.0);
        }
        let extra = fields.remaining();
        if extra != 0 {
            warn!("attachments line {}: ignoring {} weight(s) past the last joint",
                i + 1, extra);
        }

        rows.push(row);
    }

    if num_padded != 0 {
        debug!("{} attachment row(s) were short and got zero-padded", num_padded);
    }

    Ok(rows)
}

#[test]
fn test_short_rows_are_padded() {
    let rows = parse_attachments("0.25 0.75 0\n1\n0 0 1\n", 3).unwrap();
    assert_eq!(rows, vec![
        vec![0.25, 0.75, 0.0],
        vec![1.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0],
    ]);
}

#[test]
fn test_trailing_blank_lines_allowed() {
    let rows = parse_attachments("1 0\n0 1\n\n   \n", 2).unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_interior_blank_line_is_an_error() {
    let err = parse_attachments("1 0\n\n0 1\n", 2).unwrap_err();
    match *err.kind() {
        ErrorKind::Parse("attachments", 2, _) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }
}

#[test]
fn test_bad_weight() {
    let err = parse_attachments("1 0\n0 x\n", 2).unwrap_err();
    match *err.kind() {
        ErrorKind::Parse("attachments", 2, _) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }
}

#[test]
fn test_extra_weights_ignored() {
    let rows = parse_attachments("0.5 0.5 9 9\n", 2).unwrap();
    assert_eq!(rows, vec![vec![0.5, 0.5]]);
}

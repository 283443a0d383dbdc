//! `pose` subcommand: set joint angles, skin, and write out the result.

use cgmath::{Deg, Matrix4, Rad};
use clap::ArgMatches;
use convert;
use errors::{ErrorKind, Result, ResultExt};
use model::SkeletalModel;
use render::{self, TriangleSoup};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A joint index with Euler angles in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct JointAngles {
    pub joint: usize,
    pub degrees: [f64; 3],
}

pub fn main(matches: &ArgMatches) -> Result<()> {
    let mut model = SkeletalModel::from_arg_matches(matches)?;

    let specs: Vec<JointAngles> = match matches.values_of("ANGLES") {
        Some(values) => values.map(parse_angle_spec).collect::<Result<_>>()?,
        None => vec![],
    };
    for spec in &specs {
        let [rx, ry, rz] = spec.degrees;
        debug!("setting joint {} to ({}, {}, {}) degrees", spec.joint, rx, ry, rz);
        model.set_joint_angles(spec.joint, to_rad(rx), to_rad(ry), to_rad(rz))?;
    }
    model.update();

    let out_path = PathBuf::from(matches.value_of_os("OUTPUT").unwrap());
    let format = matches.value_of("FORMAT").unwrap_or("obj");
    let with_skeleton = matches.is_present("SKELETON_GEOMETRY");

    write_pose(&model, format, with_skeleton, &out_path)?;
    info!("wrote {}", out_path.to_string_lossy());

    Ok(())
}

/// Serialize the posed model in the given format. Nothing is written to
/// `out_path` unless that succeeds.
pub fn write_pose(
    model: &SkeletalModel,
    format: &str,
    with_skeleton: bool,
    out_path: &Path,
) -> Result<()> {
    let text = serialize(model, format, with_skeleton)?;
    let mut f = File::create(out_path)
        .chain_err(|| format!("couldn't create {}", out_path.to_string_lossy()))?;
    f.write_all(text.as_bytes())?;
    Ok(())
}

fn serialize(model: &SkeletalModel, format: &str, with_skeleton: bool) -> Result<String> {
    match format {
        "json" => {
            if with_skeleton {
                warn!("--skeleton only applies to OBJ output; ignoring it");
            }
            Ok(convert::pose_json::to_json(model).pretty(2))
        }
        "obj" => {
            let skeleton = if with_skeleton {
                let mut soup = TriangleSoup::new();
                render::draw(model, Matrix4::from_scale(1.0), true, &mut soup);
                Some(soup)
            } else {
                None
            };
            let mut s = String::new();
            convert::obj::write(&mut s, model, skeleton.as_ref())?;
            Ok(s)
        }
        _ => bail!("unknown output format {:?}", format),
    }
}

fn to_rad(degrees: f64) -> Rad<f64> {
    Deg(degrees).into()
}

/// Parses `JOINT:RX,RY,RZ`, eg. `3:0,90,0`. Trailing angles may be left off
/// and default to zero, so `3:45` rotates joint 3 about X only.
pub fn parse_angle_spec(spec: &str) -> Result<JointAngles> {
    let bad = || ErrorKind::BadAngleSpec(spec.to_string());

    let mut halves = spec.splitn(2, ':');
    let joint = halves.next().unwrap_or("").trim();
    let angles = halves.next().ok_or_else(bad)?;

    let joint = joint.parse::<usize>().map_err(|_| bad())?;

    let mut degrees = [0.0; 3];
    let mut n = 0;
    for part in angles.split(',') {
        if n == 3 {
            bail!(bad());
        }
        degrees[n] = part.trim().parse::<f64>().map_err(|_| bad())?;
        n += 1;
    }

    Ok(JointAngles { joint, degrees })
}

#[test]
fn test_parse_angle_spec() {
    assert_eq!(parse_angle_spec("3:0,90,-45").unwrap(),
        JointAngles { joint: 3, degrees: [0.0, 90.0, -45.0] });
    assert_eq!(parse_angle_spec("0:12.5").unwrap(),
        JointAngles { joint: 0, degrees: [12.5, 0.0, 0.0] });
    assert_eq!(parse_angle_spec(" 1 : 1, 2 ,3").unwrap(),
        JointAngles { joint: 1, degrees: [1.0, 2.0, 3.0] });
}

#[test]
fn test_bad_angle_specs() {
    for &spec in &["", "3", "x:1,2,3", "-1:0,0,0", "1:1,2,3,4", "1:a", "1:"] {
        let err = parse_angle_spec(spec).unwrap_err();
        match *err.kind() {
            ErrorKind::BadAngleSpec(ref s) => assert_eq!(s, spec),
            ref kind => panic!("unexpected error {:?}", kind),
        }
    }
}

#[cfg(test)]
fn single_joint_model() -> SkeletalModel {
    use files;
    let records = files::parse_skeleton("0 0 0 -1\n").unwrap();
    let mesh = files::parse_mesh("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
    let attachments = files::parse_attachments("1\n1\n1\n", 1).unwrap();
    SkeletalModel::from_parts(&records, mesh, attachments).unwrap()
}

#[test]
fn test_failed_serialize_leaves_no_file() {
    use std::env;
    use std::fs;

    let model = single_joint_model();
    let out_path = env::temp_dir().join(format!("skelskin-pose-{}.out", ::std::process::id()));
    let _ = fs::remove_file(&out_path);

    assert!(write_pose(&model, "ply", false, &out_path).is_err());
    assert!(!out_path.exists());

    write_pose(&model, "obj", true, &out_path).unwrap();
    let written = fs::read_to_string(&out_path).unwrap();
    assert!(written.contains("o mesh"));
    assert!(written.contains("o skeleton"));
    fs::remove_file(&out_path).unwrap();
}

#[test]
fn test_serialize_json() {
    let model = single_joint_model();
    let text = serialize(&model, "json", false).unwrap();
    let parsed = ::json::parse(&text).unwrap();
    assert_eq!(parsed["joints"].len(), 1);
}

#![recursion_limit = "1024"] // for error_chain

extern crate atty;
extern crate cgmath;
#[macro_use]
extern crate clap;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate json;
#[macro_use]
extern crate log;
extern crate petgraph;
extern crate smallvec;
extern crate termcolor;

#[macro_use]
mod errors;
mod util;
mod convert;
mod files;
mod info;
mod logger;
mod mesh;
mod model;
mod pose;
mod render;
mod skeleton;
mod skinning;
mod version;

use std::process::exit;

fn main() {
    let app = clap_app!(skelskin =>
        (@setting SubcommandRequiredElseHelp)
        (@setting VersionlessSubcommands)
        (version: crate_version!())
        (about: "Skeletal mesh skinning from skeleton, mesh and attachment files")
        (@arg verbose: -v --verbose +multiple "More logging (-vv for even more)")
        (@arg quiet: -q --quiet "Only log errors")
        (@subcommand info =>
            (about: "Print joints, mesh stats and weight diagnostics")
            (alias: "i")
            (@arg SKELETON: +required "Skeleton file")
            (@arg MESH: +required "Mesh (.obj) file")
            (@arg ATTACHMENTS: +required "Attachments file")
        )
        (@subcommand pose =>
            (about: "Pose the skeleton, skin the mesh and write the result")
            (alias: "p")
            (@arg SKELETON: +required "Skeleton file")
            (@arg MESH: +required "Mesh (.obj) file")
            (@arg ATTACHMENTS: +required "Attachments file")
            (@arg ANGLES: -a --angles +takes_value +multiple number_of_values(1)
                "Joint angles in degrees as JOINT:RX,RY,RZ (can repeat)")
            (@arg OUTPUT: -o --output +takes_value +required "Output file")
            (@arg FORMAT: -f --format +takes_value possible_values(&["obj", "json"])
                "Output format (default obj)")
            (@arg SKELETON_GEOMETRY: --skeleton "Also write joint spheres and bone boxes (OBJ only)")
        )
        (@subcommand version =>
            (about: "Print version info")
        )
    );
    let matches = app.get_matches();

    let level = logger::level_from_verbosity(
        matches.occurrences_of("verbose"),
        matches.is_present("quiet"),
    );
    logger::init(level);

    let res = match matches.subcommand() {
        ("info", Some(m)) => info::main(m),
        ("pose", Some(m)) => pose::main(m),
        ("version", _) => {
            version::print_version_info();
            Ok(())
        }
        _ => Ok(()),
    };

    if let Err(e) = res {
        error!("{}", e);
        for cause in e.iter().skip(1) {
            error!("  caused by: {}", cause);
        }
        exit(1);
    }
}

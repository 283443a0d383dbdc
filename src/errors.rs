error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Fmt(::std::fmt::Error);
    }

    errors {
        Parse(file: &'static str, line: usize, msg: String) {
            description("malformed input file")
            display("{} file, line {}: {}", file, line, msg)
        }
        JointOutOfBounds(index: usize, count: usize) {
            description("joint index out of bounds")
            display("joint index {} out of bounds (skeleton has {} joints)", index, count)
        }
        BadHierarchy(msg: String) {
            description("joint hierarchy is not a tree")
            display("bad joint hierarchy: {}", msg)
        }
        EmptySkeleton {
            description("skeleton has no joints")
            display("skeleton has no joints")
        }
        Mismatch(msg: String) {
            description("inconsistent model files")
            display("inconsistent model: {}", msg)
        }
        BadAngleSpec(spec: String) {
            description("malformed joint angle argument")
            display("don't understand joint angles {:?}; expected JOINT:RX,RY,RZ", spec)
        }
    }
}

macro_rules! check {
    ($b:expr) => {
        if !$b {
            use errors::Error;
            use errors::ErrorKind;
            Err(Error::from_kind(ErrorKind::Msg(format!(
                "expected: {}",
                stringify!($b)
            ))))
        } else {
            Ok(())
        }
    };
}

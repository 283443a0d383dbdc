//! Output formats for a posed model.

pub mod obj;
pub mod pose_json;

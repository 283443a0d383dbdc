use cgmath::Point3;
use errors::{ErrorKind, Result};

/// Triangle mesh with per-vertex joint weights.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub bind_vertices: Vec<Point3<f64>>,
    /// 0-based vertex indices.
    pub faces: Vec<[u32; 3]>,
    /// Output of the last skinning pass. Starts out equal to the bind
    /// vertices.
    pub current_vertices: Vec<Point3<f64>>,
    /// attachments[vertex][joint]. Every row is exactly `num_joints` long.
    /// Rows are not required to sum to one.
    pub attachments: Vec<Vec<f64>>,
    num_joints: usize,
}

impl Mesh {
    pub fn new(bind_vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Result<Mesh> {
        let num_verts = bind_vertices.len();
        for (face_idx, face) in faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&vi| vi as usize >= num_verts) {
                bail!(ErrorKind::Mismatch(format!(
                    "face {} uses vertex {} but there are only {} vertices",
                    face_idx, bad, num_verts,
                )));
            }
        }

        Ok(Mesh {
            current_vertices: bind_vertices.clone(),
            bind_vertices,
            faces,
            attachments: vec![],
            num_joints: 0,
        })
    }

    pub fn num_vertices(&self) -> usize {
        self.bind_vertices.len()
    }

    pub fn num_joints(&self) -> usize {
        self.num_joints
    }

    /// Install the weight table. There must be one row per vertex, each
    /// exactly `num_joints` long.
    pub fn set_attachments(&mut self, attachments: Vec<Vec<f64>>, num_joints: usize) -> Result<()> {
        if attachments.len() != self.num_vertices() {
            bail!(ErrorKind::Mismatch(format!(
                "mesh has {} vertices but there are {} rows of attachment weights",
                self.num_vertices(), attachments.len(),
            )));
        }
        if let Some(vi) = attachments.iter().position(|row| row.len() != num_joints) {
            bail!(ErrorKind::Mismatch(format!(
                "attachment row for vertex {} has {} weights, expected {}",
                vi, attachments[vi].len(), num_joints,
            )));
        }
        self.attachments = attachments;
        self.num_joints = num_joints;
        Ok(())
    }

    pub fn weight_sum(&self, vertex: usize) -> f64 {
        self.attachments[vertex].iter().sum()
    }

    /// Vertices whose weights don't add up to one (within `tolerance`).
    ///
    /// Skinning doesn't renormalize, so these will come out scaled toward or
    /// away from the origin.
    pub fn unnormalized_vertices(&self, tolerance: f64) -> Vec<usize> {
        (0..self.num_vertices())
            .filter(|&vi| (self.weight_sum(vi) - 1.0).abs() > tolerance)
            .collect()
    }
}

#[cfg(test)]
fn triangle() -> Mesh {
    Mesh::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2]],
    ).unwrap()
}

#[test]
fn test_current_starts_at_bind() {
    let mesh = triangle();
    assert_eq!(mesh.current_vertices, mesh.bind_vertices);
}

#[test]
fn test_face_index_out_of_range() {
    let err = Mesh::new(vec![Point3::new(0.0, 0.0, 0.0)], vec![[0, 0, 1]]).unwrap_err();
    match *err.kind() {
        ErrorKind::Mismatch(_) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }
}

#[test]
fn test_attachment_shape_checked() {
    let mut mesh = triangle();
    assert!(mesh.set_attachments(vec![vec![1.0, 0.0]; 2], 2).is_err());
    assert!(mesh.set_attachments(vec![vec![1.0, 0.0], vec![1.0], vec![0.5, 0.5]], 2).is_err());
    mesh.set_attachments(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.25]], 2).unwrap();
    assert_eq!(mesh.num_joints(), 2);
    assert_eq!(mesh.unnormalized_vertices(1e-3), vec![2]);
}

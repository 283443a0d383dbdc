//! Immediate-mode drawing of a skeletal model.
//!
//! Nothing in here touches the skinning math; it only reads the final vertex
//! positions and joint transforms and hands primitives to a `Sink`. Drawing
//! the mesh and drawing the debug skeleton are separate modes, same as in
//! the viewer this is modeled on.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Transform, Vector3};
use mesh::Mesh;
use model::SkeletalModel;
use skeleton::{NodeIndex, Skeleton};
use std::f64::consts::PI;
use util::matrix_stack::MatrixStack;

/// Triangles whose edge cross product is this short are skipped.
pub static DEGENERATE_EPSILON: f64 = 1e-5;
pub static JOINT_SPHERE_RADIUS: f64 = 0.025;
pub static BONE_WIDTH: f64 = 0.025;

/// Receives draw calls. Like a GL 1.x context, primitives are drawn in the
/// space of the most recently loaded matrix.
pub trait Sink {
    fn load_matrix(&mut self, m: Matrix4<f64>);
    fn triangle(&mut self, normal: Vector3<f64>, verts: [Point3<f64>; 3]);
    /// Sphere centered on the origin.
    fn sphere(&mut self, radius: f64);
    /// Unit cube centered on the origin.
    fn cube(&mut self);
}

pub fn draw<S: Sink>(model: &SkeletalModel, camera: Matrix4<f64>, skeleton_visible: bool, sink: &mut S) {
    if skeleton_visible {
        draw_joints(&model.skeleton, camera, sink);
        draw_skeleton(&model.skeleton, camera, sink);
    } else {
        sink.load_matrix(camera);
        draw_mesh(&model.mesh, sink);
    }
}

/// Submit every face of the mesh at its current (skinned) position.
pub fn draw_mesh<S: Sink>(mesh: &Mesh, sink: &mut S) {
    let mut num_degenerate = 0;
    for face in &mesh.faces {
        let v0 = mesh.current_vertices[face[0] as usize];
        let v1 = mesh.current_vertices[face[1] as usize];
        let v2 = mesh.current_vertices[face[2] as usize];

        let cross = (v1 - v0).cross(v2 - v0);
        let len = cross.magnitude();
        if len <= DEGENERATE_EPSILON {
            num_degenerate += 1;
            continue;
        }
        sink.triangle(cross / len, [v0, v1, v2]);
    }
    if num_degenerate != 0 {
        trace!("skipped {} degenerate triangles", num_degenerate);
    }
}

/// A sphere at every joint.
pub fn draw_joints<S: Sink>(skel: &Skeleton, camera: Matrix4<f64>, sink: &mut S) {
    fn recur<S: Sink>(skel: &Skeleton, stack: &mut MatrixStack, node: NodeIndex, sink: &mut S) {
        stack.with_pushed(skel.tree[node].local_to_parent, |stack| {
            for child in skel.children(node) {
                recur(skel, stack, child, sink);
            }
            sink.load_matrix(stack.top());
            sink.sphere(JOINT_SPHERE_RADIUS);
        });
    }

    let mut stack = MatrixStack::new();
    stack.with_pushed(camera, |stack| recur(skel, stack, skel.root, sink));
}

/// A box along every bone, ie. from each joint to each of its children.
pub fn draw_skeleton<S: Sink>(skel: &Skeleton, camera: Matrix4<f64>, sink: &mut S) {
    fn recur<S: Sink>(skel: &Skeleton, stack: &mut MatrixStack, node: NodeIndex, sink: &mut S) {
        stack.with_pushed(skel.tree[node].local_to_parent, |stack| {
            for child in skel.children(node) {
                let offset = skel.tree[child].local_to_parent.w.truncate();
                stack.with_pushed(bone_box(offset), |stack| {
                    sink.load_matrix(stack.top());
                    sink.cube();
                });
                recur(skel, stack, child, sink);
            }
        });
    }

    let mut stack = MatrixStack::new();
    stack.with_pushed(camera, |stack| recur(skel, stack, skel.root, sink));
}

/// Transform taking the unit cube to a thin box running from the origin to
/// `offset`.
pub fn bone_box(offset: Vector3<f64>) -> Matrix4<f64> {
    let len = offset.magnitude();
    let t = Matrix4::from_translation(Vector3::new(0.0, 0.0, 0.5));
    let s = Matrix4::from_nonuniform_scale(BONE_WIDTH, BONE_WIDTH, len);
    let r = align_z_with(offset, len);
    r * s * t
}

/// Rotation taking +Z to the direction of `v`.
fn align_z_with(v: Vector3<f64>, len: f64) -> Matrix4<f64> {
    if len == 0.0 {
        return Matrix4::from_scale(1.0);
    }
    let dir = v / len;
    let axis = Vector3::unit_z().cross(dir);
    if axis.magnitude() < DEGENERATE_EPSILON {
        // Parallel or anti-parallel to Z; the cross product is no good as an
        // axis.
        return if dir.z > 0.0 {
            Matrix4::from_scale(1.0)
        } else {
            Matrix4::from_angle_x(Rad(PI))
        };
    }
    let angle = dir.z.max(-1.0).min(1.0).acos();
    Matrix4::from_axis_angle(axis.normalize(), Rad(angle))
}

/// Sink that tessellates everything into a list of triangles, eg. for
/// writing to a file.
pub struct TriangleSoup {
    pub positions: Vec<Point3<f64>>,
    pub triangles: Vec<[u32; 3]>,
    cur_mat: Matrix4<f64>,
}

static SPHERE_STACKS: u32 = 12;
static SPHERE_SLICES: u32 = 12;

impl TriangleSoup {
    pub fn new() -> TriangleSoup {
        TriangleSoup {
            positions: vec![],
            triangles: vec![],
            cur_mat: Matrix4::from_scale(1.0),
        }
    }

    fn add_vertex(&mut self, p: Point3<f64>) -> u32 {
        self.positions.push(self.cur_mat.transform_point(p));
        (self.positions.len() - 1) as u32
    }
}

impl Sink for TriangleSoup {
    fn load_matrix(&mut self, m: Matrix4<f64>) {
        self.cur_mat = m;
    }

    fn triangle(&mut self, _normal: Vector3<f64>, verts: [Point3<f64>; 3]) {
        let a = self.add_vertex(verts[0]);
        let b = self.add_vertex(verts[1]);
        let c = self.add_vertex(verts[2]);
        self.triangles.push([a, b, c]);
    }

    fn sphere(&mut self, radius: f64) {
        let first = self.positions.len() as u32;
        for i in 0..SPHERE_STACKS + 1 {
            let theta = PI * i as f64 / SPHERE_STACKS as f64;
            for j in 0..SPHERE_SLICES + 1 {
                let phi = 2.0 * PI * j as f64 / SPHERE_SLICES as f64;
                let p = Point3::new(
                    radius * theta.sin() * phi.cos(),
                    radius * theta.cos(),
                    radius * theta.sin() * phi.sin(),
                );
                self.add_vertex(p);
            }
        }
        let stride = SPHERE_SLICES + 1;
        for i in 0..SPHERE_STACKS {
            for j in 0..SPHERE_SLICES {
                let a = first + i * stride + j;
                let b = a + 1;
                let c = a + stride;
                let d = c + 1;
                self.triangles.push([a, c, b]);
                self.triangles.push([b, c, d]);
            }
        }
    }

    fn cube(&mut self) {
        let first = self.positions.len() as u32;
        for &z in &[-0.5, 0.5] {
            for &y in &[-0.5, 0.5] {
                for &x in &[-0.5, 0.5] {
                    self.add_vertex(Point3::new(x, y, z));
                }
            }
        }
        // Corner k has x = k&1, y = k&2, z = k&4
        static CUBE_TRIS: [[u32; 3]; 12] = [
            [0, 2, 1], [1, 2, 3], // -z
            [4, 5, 6], [5, 7, 6], // +z
            [0, 1, 4], [1, 5, 4], // -y
            [2, 6, 3], [3, 6, 7], // +y
            [0, 4, 2], [2, 4, 6], // -x
            [1, 3, 5], [3, 7, 5], // +x
        ];
        for tri in &CUBE_TRIS {
            self.triangles.push([first + tri[0], first + tri[1], first + tri[2]]);
        }
    }
}

#[cfg(test)]
use util::approx::point_approx_eq;
#[cfg(test)]
use skeleton::{build_skeleton, JointRecord};

#[cfg(test)]
#[derive(Default)]
struct Recorder {
    normals: Vec<Vector3<f64>>,
    spheres: Vec<Point3<f64>>,
    cubes: Vec<Matrix4<f64>>,
    cur_mat: Option<Matrix4<f64>>,
}

#[cfg(test)]
impl Sink for Recorder {
    fn load_matrix(&mut self, m: Matrix4<f64>) { self.cur_mat = Some(m); }
    fn triangle(&mut self, normal: Vector3<f64>, _verts: [Point3<f64>; 3]) {
        self.normals.push(normal);
    }
    fn sphere(&mut self, _radius: f64) {
        let m = self.cur_mat.unwrap();
        self.spheres.push(m.transform_point(Point3::new(0.0, 0.0, 0.0)));
    }
    fn cube(&mut self) { self.cubes.push(self.cur_mat.unwrap()); }
}

#[test]
fn test_draw_mesh_skips_degenerate_faces() {
    let mesh = Mesh::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ],
        vec![[0, 1, 2], [0, 1, 3], [2, 2, 2]],
    ).unwrap();
    let mut rec = Recorder::default();
    draw_mesh(&mesh, &mut rec);
    assert_eq!(rec.normals.len(), 1);
    assert!((rec.normals[0] - Vector3::unit_z()).magnitude() < 1e-12);
}

#[test]
fn test_draw_joints_and_bones() {
    let skel = build_skeleton(&[
        JointRecord { translation: Vector3::new(0.0, 1.0, 0.0), parent: None },
        JointRecord { translation: Vector3::new(0.0, 0.0, 2.0), parent: Some(0) },
        JointRecord { translation: Vector3::new(3.0, 0.0, 0.0), parent: Some(0) },
    ]).unwrap();
    let camera = Matrix4::from_translation(Vector3::new(0.0, 0.0, -10.0));

    let mut rec = Recorder::default();
    draw_joints(&skel, camera, &mut rec);
    assert_eq!(rec.spheres.len(), 3);
    // Children are drawn before their parent
    assert!(point_approx_eq(rec.spheres[0], Point3::new(0.0, 1.0, -8.0)));
    assert!(point_approx_eq(rec.spheres[1], Point3::new(3.0, 1.0, -10.0)));
    assert!(point_approx_eq(rec.spheres[2], Point3::new(0.0, 1.0, -10.0)));

    let mut rec = Recorder::default();
    draw_skeleton(&skel, camera, &mut rec);
    assert_eq!(rec.cubes.len(), 2);
    // The top of each box sits on the child joint
    let top = Point3::new(0.0, 0.0, 0.5);
    assert!(point_approx_eq(rec.cubes[0].transform_point(top), Point3::new(0.0, 1.0, -8.0)));
    assert!(point_approx_eq(rec.cubes[1].transform_point(top), Point3::new(3.0, 1.0, -10.0)));
}

#[test]
fn test_bone_box_directions() {
    let top = Point3::new(0.0, 0.0, 0.5);
    let bottom = Point3::new(0.0, 0.0, -0.5);
    let offsets = [
        Vector3::new(0.0, 0.0, 2.0),
        Vector3::new(0.0, 0.0, -2.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(-1.0, 2.0, 0.5),
        Vector3::new(1e-12, 0.0, -1.0),
    ];
    for &offset in &offsets {
        let m = bone_box(offset);
        assert!(point_approx_eq(m.transform_point(top), Point3::new(offset.x, offset.y, offset.z)));
        assert!(point_approx_eq(m.transform_point(bottom), Point3::new(0.0, 0.0, 0.0)));
    }

    // Zero-length bones collapse instead of producing NaNs
    let m = bone_box(Vector3::new(0.0, 0.0, 0.0));
    assert!(point_approx_eq(m.transform_point(top), Point3::new(0.0, 0.0, 0.0)));
}

#[test]
fn test_triangle_soup() {
    let mut soup = TriangleSoup::new();
    soup.load_matrix(Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0)));
    soup.cube();
    assert_eq!(soup.positions.len(), 8);
    assert_eq!(soup.triangles.len(), 12);
    assert!(point_approx_eq(soup.positions[0], Point3::new(0.5, -0.5, -0.5)));

    soup.sphere(1.0);
    let n = (SPHERE_STACKS + 1) * (SPHERE_SLICES + 1);
    assert_eq!(soup.positions.len(), 8 + n as usize);
    assert_eq!(soup.triangles.len(), 12 + 2 * (SPHERE_STACKS * SPHERE_SLICES) as usize);
    for tri in &soup.triangles {
        for &vi in tri {
            assert!((vi as usize) < soup.positions.len());
        }
    }
}

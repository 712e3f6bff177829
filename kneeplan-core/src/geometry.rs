/// Triangle mesh primitives for cutting solids and resection hand-off
use nalgebra::{Isometry3, Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal from the winding order, or `None` for a degenerate face.
    pub fn calculate_normal(&self) -> Option<Vector3<f64>> {
        let [v0, v1, v2] = self.vertices.map(|v| v.position);
        (v1 - v0).cross(&(v2 - v0)).try_normalize(f64::EPSILON)
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Add a planar quad as two triangles, corners counter-clockwise around `normal`.
    fn add_quad(&mut self, corners: [Point3<f64>; 4], normal: Vector3<f64>) {
        let [a, b, c, d] = corners.map(|p| Vertex::new(p, normal));
        self.add_triangle(Triangle::new(a, b, c));
        self.add_triangle(Triangle::new(a, c, d));
    }

    /// Axis-aligned box centered at the origin with outward-facing winding.
    pub fn cuboid(width: f64, height: f64, depth: f64) -> Self {
        let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
        let p = Point3::new;
        let mut mesh = Self::with_capacity(12);

        // +Z / -Z
        mesh.add_quad([p(-x, -y, z), p(x, -y, z), p(x, y, z), p(-x, y, z)], Vector3::z());
        mesh.add_quad([p(-x, -y, -z), p(-x, y, -z), p(x, y, -z), p(x, -y, -z)], -Vector3::z());
        // +Y / -Y
        mesh.add_quad([p(-x, y, -z), p(-x, y, z), p(x, y, z), p(x, y, -z)], Vector3::y());
        mesh.add_quad([p(-x, -y, -z), p(x, -y, -z), p(x, -y, z), p(-x, -y, z)], -Vector3::y());
        // +X / -X
        mesh.add_quad([p(x, -y, -z), p(x, y, -z), p(x, y, z), p(x, -y, z)], Vector3::x());
        mesh.add_quad([p(-x, -y, -z), p(-x, -y, z), p(-x, y, z), p(-x, y, -z)], -Vector3::x());

        mesh
    }

    /// Copy of the mesh moved by `offset`.
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        self.map_vertices(|v| Vertex::new(v.position + offset, v.normal))
    }

    /// Copy of the mesh with `transform` baked into positions and normals.
    pub fn transformed(&self, transform: &Isometry3<f64>) -> Self {
        self.map_vertices(|v| {
            Vertex::new(
                transform.transform_point(&v.position),
                transform.transform_vector(&v.normal),
            )
        })
    }

    fn map_vertices(&self, f: impl Fn(&Vertex) -> Vertex) -> Self {
        Self {
            triangles: self
                .triangles
                .iter()
                .map(|t| Triangle {
                    vertices: [f(&t.vertices[0]), f(&t.vertices[1]), f(&t.vertices[2])],
                })
                .collect(),
        }
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.triangles.iter().flat_map(|t| t.vertices.iter())
    }

    /// Axis-aligned bounding box as `(min, max)`, or `None` when empty.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut positions = self.vertices().map(|v| v.position);
        let first = positions.next()?;
        Some(positions.fold((first, first), |(min, max), p| {
            (min.inf(&p), max.sup(&p))
        }))
    }

    /// Flat `[x, y, z, ...]` triangle-soup positions for GPU upload.
    pub fn positions_f32(&self) -> Vec<f32> {
        self.vertices()
            .flat_map(|v| [v.position.x as f32, v.position.y as f32, v.position.z as f32])
            .collect()
    }

    /// Enclosed volume by the divergence theorem. Positive for outward winding.
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.vertices.map(|v| v.position.coords);
                a.dot(&b.cross(&c)) / 6.0
            })
            .sum()
    }
}

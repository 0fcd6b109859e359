//! # Geometry IR
//!
//! The evaluated scene tree handed to the mesh kernel. Each node carries a
//! resolved local transform, material, and children; the actual polygon
//! work (CSG, triangulation, extrusion) happens downstream, behind the
//! [`GeometryBuilder`] interface.

use crate::transform::Material;
use crate::value::Color;
use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};
use shape_ast::Span;
use std::rc::Rc;

// =============================================================================
// PATHS
// =============================================================================

/// A point on a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// Position of the point.
    pub position: DVec3,
    /// True for curve control points, false for sharp corners.
    pub is_curve: bool,
}

impl PathPoint {
    /// A sharp corner point.
    pub fn corner(position: DVec3) -> Self {
        Self {
            position,
            is_curve: false,
        }
    }

    /// A smooth curve point.
    pub fn curve(position: DVec3) -> Self {
        Self {
            position,
            is_curve: true,
        }
    }
}

/// A polyline/spline path, possibly closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Path points in order.
    pub points: Vec<PathPoint>,
    /// Whether the last point connects back to the first.
    pub closed: bool,
}

impl Path {
    /// An approximated circle of the given diameter.
    ///
    /// Uses `segments` smooth points around the circumference.
    pub fn circle(diameter: f64, segments: u32) -> Self {
        let radius = diameter / 2.0;
        let segments = segments.max(3);
        let points = (0..segments)
            .map(|i| {
                let theta = std::f64::consts::TAU * f64::from(i) / f64::from(segments);
                PathPoint::curve(DVec3::new(radius * theta.cos(), radius * theta.sin(), 0.0))
            })
            .collect();
        Self {
            points,
            closed: true,
        }
    }

    /// An axis-aligned rectangle of the given width and height.
    pub fn rectangle(width: f64, height: f64) -> Self {
        let (w, h) = (width / 2.0, height / 2.0);
        let points = vec![
            PathPoint::corner(DVec3::new(-w, -h, 0.0)),
            PathPoint::corner(DVec3::new(w, -h, 0.0)),
            PathPoint::corner(DVec3::new(w, h, 0.0)),
            PathPoint::corner(DVec3::new(-w, h, 0.0)),
        ];
        Self {
            points,
            closed: true,
        }
    }

    /// The same path with every point transformed.
    pub fn transformed(&self, matrix: DMat4) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| PathPoint {
                    position: matrix.transform_point3(p.position),
                    is_curve: p.is_curve,
                })
                .collect(),
            closed: self.closed,
        }
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// The shape a geometry node represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeometryKind {
    /// A cone; apex up.
    Cone {
        /// Radial tessellation segments.
        segments: u32,
    },
    /// A cylinder.
    Cylinder {
        /// Radial tessellation segments.
        segments: u32,
    },
    /// A sphere.
    Sphere {
        /// Tessellation segments.
        segments: u32,
    },
    /// A unit cube (scaled by the node transform).
    Cube,
    /// Linear extrusion of paths, optionally along other paths.
    Extrude {
        /// Cross-section paths.
        paths: Vec<Path>,
        /// Paths to sweep along, when non-empty.
        along: Vec<Path>,
        /// Twist in half-turns over the extrusion.
        twist: f64,
    },
    /// Surface of revolution.
    Lathe {
        /// Profile paths.
        paths: Vec<Path>,
        /// Radial tessellation segments.
        segments: u32,
    },
    /// Skinned surface through consecutive cross-sections.
    Loft {
        /// Cross-section paths.
        paths: Vec<Path>,
    },
    /// Filled (flat) polygons from paths.
    Fill {
        /// Outline paths.
        paths: Vec<Path>,
    },
    /// Boolean union of the children.
    Union,
    /// First child minus the rest.
    Difference,
    /// Common volume of the children.
    Intersection,
    /// Symmetric difference of the children.
    Xor,
    /// First child retained where overlapped by the rest.
    Stencil,
    /// Convex hull of the children.
    Hull,
    /// Transparent container for the children.
    Group,
    /// A bare path rendered as a stroke.
    Path {
        /// The path.
        path: Path,
    },
    /// Imported mesh data owned by the delegate.
    Mesh,
}

impl GeometryKind {
    /// Short tag for logs and debugging.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Cone { .. } => "cone",
            Self::Cylinder { .. } => "cylinder",
            Self::Sphere { .. } => "sphere",
            Self::Cube => "cube",
            Self::Extrude { .. } => "extrude",
            Self::Lathe { .. } => "lathe",
            Self::Loft { .. } => "loft",
            Self::Fill { .. } => "fill",
            Self::Union => "union",
            Self::Difference => "difference",
            Self::Intersection => "intersection",
            Self::Xor => "xor",
            Self::Stencil => "stencil",
            Self::Hull => "hull",
            Self::Group => "group",
            Self::Path { .. } => "path",
            Self::Mesh => "mesh",
        }
    }
}

/// A node of the evaluated scene tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// What this node is.
    pub kind: GeometryKind,
    /// Local transform relative to the parent node.
    pub transform: DMat4,
    /// Surface color, if any.
    pub color: Option<Color4>,
    /// Texture name, if any.
    pub texture: Option<String>,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Optional user-assigned name.
    pub name: Option<String>,
    /// Marked for debug visualization.
    pub debug: bool,
    /// Child nodes.
    pub children: Vec<Rc<Geometry>>,
    /// Source span of the producing block.
    pub span: Span,
}

/// Serializable RGBA color for the IR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color4 {
    /// Red component.
    pub r: f64,
    /// Green component.
    pub g: f64,
    /// Blue component.
    pub b: f64,
    /// Alpha component.
    pub a: f64,
}

impl From<Color> for Color4 {
    fn from(c: Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

// =============================================================================
// BUILDER INTERFACE
// =============================================================================

/// The geometry collaborator invoked by primitive, builder, and CSG blocks.
///
/// The evaluator never constructs scene nodes directly; it hands the
/// resolved parameters to a builder and keeps the returned handle opaque.
/// The default [`SceneGraphBuilder`] materializes [`Geometry`] nodes;
/// embedders can substitute their own kernel.
pub trait GeometryBuilder {
    /// Build one geometry node.
    fn build(
        &mut self,
        kind: GeometryKind,
        transform: DMat4,
        material: &Material,
        name: Option<String>,
        children: Vec<Rc<Geometry>>,
        span: Span,
    ) -> Rc<Geometry>;
}

/// The default geometry builder: an IR scene graph.
#[derive(Debug, Default)]
pub struct SceneGraphBuilder;

impl GeometryBuilder for SceneGraphBuilder {
    fn build(
        &mut self,
        kind: GeometryKind,
        transform: DMat4,
        material: &Material,
        name: Option<String>,
        children: Vec<Rc<Geometry>>,
        span: Span,
    ) -> Rc<Geometry> {
        Rc::new(Geometry {
            kind,
            transform,
            color: material.color.map(Color4::from),
            texture: material.texture.as_ref().map(|t| t.name.clone()),
            opacity: material.opacity,
            name,
            debug: false,
            children,
            span,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_path() {
        let path = Path::circle(2.0, 16);
        assert_eq!(path.points.len(), 16);
        assert!(path.closed);
        for point in &path.points {
            assert!((point.position.length() - 1.0).abs() < 1e-9);
            assert!(point.is_curve);
        }
    }

    #[test]
    fn test_circle_enforces_minimum_segments() {
        assert_eq!(Path::circle(1.0, 0).points.len(), 3);
    }

    #[test]
    fn test_rectangle_path() {
        let path = Path::rectangle(2.0, 4.0);
        assert_eq!(path.points.len(), 4);
        assert!(path.points.iter().all(|p| !p.is_curve));
    }

    #[test]
    fn test_path_transformed() {
        let path = Path::rectangle(2.0, 2.0);
        let moved = path.transformed(DMat4::from_translation(DVec3::new(1.0, 0.0, 0.0)));
        assert_eq!(moved.points[0].position, DVec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_geometry_serializes() {
        let mut builder = SceneGraphBuilder;
        let node = builder.build(
            GeometryKind::Sphere { segments: 16 },
            DMat4::IDENTITY,
            &Material::default(),
            None,
            Vec::new(),
            Span::new(0, 6),
        );
        let json = serde_json::to_string(&*node).unwrap();
        assert!(json.contains("Sphere"));
        let back: Geometry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, *node);
    }

    #[test]
    fn test_scene_graph_builder_records_material() {
        let mut builder = SceneGraphBuilder;
        let material = Material {
            color: Some(Color::new(1.0, 0.0, 0.0, 1.0)),
            texture: None,
            opacity: 0.5,
        };
        let node = builder.build(
            GeometryKind::Cube,
            DMat4::IDENTITY,
            &material,
            Some("lid".to_string()),
            Vec::new(),
            Span::new(0, 4),
        );
        assert_eq!(node.kind.tag(), "cube");
        assert_eq!(node.opacity, 0.5);
        assert_eq!(node.name.as_deref(), Some("lid"));
        assert!(node.color.is_some());
    }
}

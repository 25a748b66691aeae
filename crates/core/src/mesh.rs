//! Scene description types: meshes, attribute arrays, and decoded images.
//!
//! A [`Mesh`] is the device-independent input to scene initialization:
//! named per-vertex attribute arrays, an optional 16-bit index list,
//! and a primitive topology. [`Mesh::cube`] and [`Mesh::triangle`]
//! build the two stock scenes. Nothing in this module touches the GPU.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Primitive assembly mode used when interpreting a vertex/index stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    /// The GL draw-mode constant for this topology.
    pub(crate) fn gl_mode(self) -> u32 {
        match self {
            Topology::Points => glow::POINTS,
            Topology::Lines => glow::LINES,
            Topology::LineStrip => glow::LINE_STRIP,
            Topology::LineLoop => glow::LINE_LOOP,
            Topology::Triangles => glow::TRIANGLES,
            Topology::TriangleStrip => glow::TRIANGLE_STRIP,
            Topology::TriangleFan => glow::TRIANGLE_FAN,
        }
    }
}

/// One named per-vertex attribute array.
///
/// `values` is a flat list of scalars; `components` says how many
/// scalars belong to each vertex (e.g. 3 for xyz positions, 2 for UVs).
/// The `name` must match an attribute declared in the shader when the
/// mesh is bound name-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshAttribute {
    pub name: String,
    pub values: Vec<f32>,
    pub components: u32,
}

impl MeshAttribute {
    pub fn new(name: impl Into<String>, values: Vec<f32>, components: u32) -> Self {
        Self {
            name: name.into(),
            values,
            components,
        }
    }
}

/// A complete mesh description: attributes, optional indices, topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub topology: Topology,
    pub attributes: Vec<MeshAttribute>,
    pub indices: Option<Vec<u16>>,
}

impl Mesh {
    /// A unit triangle in the XY plane, positions only, non-indexed.
    pub fn triangle() -> Self {
        Self {
            topology: Topology::Triangles,
            attributes: vec![MeshAttribute::new(
                "aVertexPosition",
                vec![0.0, 0.8, -0.8, -0.8, 0.8, -0.8],
                2,
            )],
            indices: None,
        }
    }

    /// The textured, per-face-colored cube: 24 vertices (4 per face),
    /// UVs, face colors, and 36 indices.
    pub fn cube() -> Self {
        #[rustfmt::skip]
        let positions = vec![
            // Front face
            -1.0, -1.0,  1.0,
             1.0, -1.0,  1.0,
             1.0,  1.0,  1.0,
            -1.0,  1.0,  1.0,
            // Back face
            -1.0, -1.0, -1.0,
            -1.0,  1.0, -1.0,
             1.0,  1.0, -1.0,
             1.0, -1.0, -1.0,
            // Top face
            -1.0,  1.0, -1.0,
            -1.0,  1.0,  1.0,
             1.0,  1.0,  1.0,
             1.0,  1.0, -1.0,
            // Bottom face
            -1.0, -1.0, -1.0,
             1.0, -1.0, -1.0,
             1.0, -1.0,  1.0,
            -1.0, -1.0,  1.0,
            // Right face
             1.0, -1.0, -1.0,
             1.0,  1.0, -1.0,
             1.0,  1.0,  1.0,
             1.0, -1.0,  1.0,
            // Left face
            -1.0, -1.0, -1.0,
            -1.0, -1.0,  1.0,
            -1.0,  1.0,  1.0,
            -1.0,  1.0, -1.0,
        ];

        // The same UV square on every face.
        let face_uv = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
        let mut uv = Vec::with_capacity(6 * face_uv.len());
        for _ in 0..6 {
            uv.extend_from_slice(&face_uv);
        }

        // One color per face, repeated for the face's four vertices.
        let face_colors: [[f32; 4]; 6] = [
            [0.0, 1.0, 1.0, 1.0], // front
            [1.0, 0.0, 0.0, 1.0], // back
            [0.0, 1.0, 0.0, 1.0], // top
            [0.0, 0.0, 1.0, 1.0], // bottom
            [1.0, 1.0, 0.0, 1.0], // right
            [1.0, 0.0, 1.0, 1.0], // left
        ];
        let mut colors = Vec::with_capacity(24 * 4);
        for face in &face_colors {
            for _ in 0..4 {
                colors.extend_from_slice(face);
            }
        }

        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2,    0, 2, 3,    // front
            4, 5, 6,    4, 6, 7,    // back
            8, 9, 10,   8, 10, 11,  // top
            12, 13, 14, 12, 14, 15, // bottom
            16, 17, 18, 16, 18, 19, // right
            20, 21, 22, 20, 22, 23, // left
        ];

        Self {
            topology: Topology::Triangles,
            attributes: vec![
                MeshAttribute::new("aVertexPosition", positions, 3),
                MeshAttribute::new("aTextureCoord", uv, 2),
                MeshAttribute::new("aVertexColor", colors, 4),
            ],
            indices: Some(indices),
        }
    }
}

/// A decoded RGBA8 image, four bytes per pixel, row-major.
///
/// Validated at construction so GPU upload paths never see malformed
/// pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageData {
    /// Builds an image from decoded RGBA8 pixels.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::InvalidDimensions` if either dimension is
    /// zero, or `RenderError::PixelSizeMismatch` if `pixels` is not
    /// exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions);
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderError::PixelSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw RGBA byte stream, `width * height * 4` long.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_is_three_two_component_vertices() {
        let mesh = Mesh::triangle();
        assert_eq!(mesh.topology, Topology::Triangles);
        assert!(mesh.indices.is_none(), "triangle should be non-indexed");
        assert_eq!(mesh.attributes.len(), 1);

        let positions = &mesh.attributes[0];
        assert_eq!(positions.name, "aVertexPosition");
        assert_eq!(positions.components, 2);
        assert_eq!(
            positions.values,
            vec![0.0, 0.8, -0.8, -0.8, 0.8, -0.8],
            "unit triangle vertices changed"
        );
    }

    #[test]
    fn cube_has_24_vertices_and_36_indices() {
        let mesh = Mesh::cube();
        let positions = &mesh.attributes[0];
        assert_eq!(positions.values.len() / positions.components as usize, 24);
        assert_eq!(
            mesh.indices.as_ref().map(Vec::len),
            Some(36),
            "six faces, two triangles each"
        );
    }

    #[test]
    fn cube_attributes_have_expected_names_and_components() {
        let mesh = Mesh::cube();
        let summary: Vec<(&str, u32)> = mesh
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.components))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("aVertexPosition", 3),
                ("aTextureCoord", 2),
                ("aVertexColor", 4)
            ]
        );
    }

    #[test]
    fn cube_attribute_arrays_agree_on_vertex_count() {
        let mesh = Mesh::cube();
        for attr in &mesh.attributes {
            assert_eq!(
                attr.values.len() / attr.components as usize,
                24,
                "attribute {} disagrees on vertex count",
                attr.name
            );
        }
    }

    #[test]
    fn cube_indices_stay_in_vertex_range() {
        let mesh = Mesh::cube();
        let indices = mesh.indices.unwrap();
        assert!(
            indices.iter().all(|&i| i < 24),
            "index out of range for 24 vertices"
        );
    }

    #[test]
    fn cube_colors_repeat_per_face() {
        let mesh = Mesh::cube();
        let colors = &mesh.attributes[2].values;
        // The four vertices of the front face share one color.
        let first: &[f32] = &colors[0..4];
        for vertex in 1..4 {
            assert_eq!(&colors[vertex * 4..vertex * 4 + 4], first);
        }
    }

    #[test]
    fn image_data_accepts_matching_pixels() {
        let img = ImageData::new(2, 2, vec![0u8; 16]).unwrap();
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 2);
        assert_eq!(img.pixels().len(), 16);
    }

    #[test]
    fn image_data_rejects_zero_dimensions() {
        let err = ImageData::new(0, 4, Vec::new()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidDimensions));
        let err = ImageData::new(4, 0, Vec::new()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidDimensions));
    }

    #[test]
    fn image_data_rejects_wrong_pixel_size() {
        let err = ImageData::new(2, 2, vec![0u8; 15]).unwrap_err();
        match err {
            RenderError::PixelSizeMismatch { expected, actual } => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 15);
            }
            other => panic!("expected PixelSizeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn mesh_round_trips_through_json() {
        let mesh = Mesh::cube();
        let json = serde_json::to_string(&mesh).unwrap();
        let back: Mesh = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mesh);
    }
}

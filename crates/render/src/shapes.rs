use std::fmt;

use bytemuck::{Pod, Zeroable};
use orbitview_common::{AngleRange, ColorCycle, Rgb, TWO_PI};
use tracing::{debug, warn};

use crate::device::{BufferHandle, BufferUsage, DrawPass, RenderDevice};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("a circle needs at least 3 points (got {0})")]
    TooFewPoints(u32),
    #[error("{0} points exceed the 16-bit index range")]
    TooManyPoints(u32),
    #[error("{name} must be positive and finite (got {value})")]
    InvalidSize { name: &'static str, value: f32 },
}

/// Interleaved vertex: position, normal, colour. 36 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// Normal shared by every flat shape; they all lie in the XY plane.
const FLAT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

impl Vertex {
    pub fn flat(x: f32, y: f32, color: Rgb) -> Self {
        Self {
            position: [x, y, 0.0],
            normal: FLAT_NORMAL,
            color: color.0,
        }
    }
}

/// Something that owns geometry and can draw itself inside an open pass.
///
/// `upload` creates and fills GPU buffers once; `draw` only issues commands.
pub trait Drawable: fmt::Debug {
    fn name(&self) -> &str;
    fn upload(&mut self, device: &mut dyn RenderDevice);
    fn draw(&self, pass: &mut dyn DrawPass);
    fn vertex_count(&self) -> u32;
    /// `None` for non-indexed geometry.
    fn index_count(&self) -> Option<u32>;
}

#[derive(Debug, Clone, Copy)]
struct MeshBuffers {
    vertices: BufferHandle,
    indices: Option<BufferHandle>,
}

/// Triangle-list geometry with optional `u16` indices.
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vertex>,
    indices: Option<Vec<u16>>,
    buffers: Option<MeshBuffers>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Option<Vec<u16>>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
            buffers: None,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_deref()
    }

    pub fn is_uploaded(&self) -> bool {
        self.buffers.is_some()
    }

    /// Index bytes padded with a trailing zero index to a 4-byte multiple.
    fn index_bytes(indices: &[u16]) -> Vec<u8> {
        let mut padded = indices.to_vec();
        if padded.len() % 2 == 1 {
            padded.push(0);
        }
        bytemuck::cast_slice(&padded).to_vec()
    }
}

impl Drawable for Mesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn upload(&mut self, device: &mut dyn RenderDevice) {
        if self.buffers.is_some() {
            return;
        }
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&self.vertices);
        let vertices = device.create_buffer(
            &format!("{}_vertices", self.name),
            vertex_bytes.len() as u64,
            BufferUsage::Vertex,
        );
        device.write_buffer(vertices, 0, vertex_bytes);

        let indices = self.indices.as_deref().map(|indices| {
            let bytes = Self::index_bytes(indices);
            let handle = device.create_buffer(
                &format!("{}_indices", self.name),
                bytes.len() as u64,
                BufferUsage::Index,
            );
            device.write_buffer(handle, 0, &bytes);
            handle
        });

        debug!(
            name = %self.name,
            vertices = self.vertices.len(),
            indices = self.indices.as_ref().map_or(0, Vec::len),
            "mesh uploaded"
        );
        self.buffers = Some(MeshBuffers { vertices, indices });
    }

    fn draw(&self, pass: &mut dyn DrawPass) {
        let Some(buffers) = self.buffers else {
            warn!(name = %self.name, "draw before upload skipped");
            return;
        };
        pass.set_vertex_buffer(0, buffers.vertices);
        match (buffers.indices, self.index_count()) {
            (Some(index_buffer), Some(count)) => {
                pass.set_index_buffer(index_buffer);
                pass.draw_indexed(0..count);
            }
            _ => pass.draw(0..self.vertex_count()),
        }
    }

    fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    fn index_count(&self) -> Option<u32> {
        self.indices.as_ref().map(|i| i.len() as u32)
    }
}

fn positive(name: &'static str, value: f32) -> Result<f32, ShapeError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ShapeError::InvalidSize { name, value })
    }
}

/// Axis-aligned rectangle centred on the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub width: f32,
    pub height: f32,
    /// Palette for the corners, from top-left going anticlockwise.
    pub colors: String,
}

impl Default for Rectangle {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            colors: "ygbr".into(),
        }
    }
}

impl Rectangle {
    /// Square with the given side and default colours.
    pub fn square(side: f32) -> Self {
        Self {
            width: side,
            height: side,
            ..Self::default()
        }
    }

    pub fn build(&self) -> Result<Mesh, ShapeError> {
        let x = 0.5 * positive("width", self.width)?;
        let y = 0.5 * positive("height", self.height)?;
        let mut corner = self.colors.chars().map(Rgb::from_char);
        let mut next = || corner.next().unwrap_or(Rgb::BLACK);
        let vertices = vec![
            Vertex::flat(-x, y, next()),
            Vertex::flat(-x, -y, next()),
            Vertex::flat(x, -y, next()),
            Vertex::flat(x, y, next()),
        ];
        Ok(Mesh::new("rectangle", vertices, Some(vec![0, 1, 2, 2, 3, 0])))
    }
}

/// Triangle centred on the origin with a movable top vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub width: f32,
    pub height: f32,
    /// Horizontal offset of the top vertex as a fraction of half the width.
    pub shift_top: f32,
    /// Palette for top, bottom-left and bottom-right, cycling if short.
    pub colors: String,
}

impl Default for Triangle {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            shift_top: 0.0,
            colors: "rgb".into(),
        }
    }
}

impl Triangle {
    pub fn build(&self) -> Result<Mesh, ShapeError> {
        let x = 0.5 * positive("width", self.width)?;
        let y = 0.5 * positive("height", self.height)?;
        let mut colors = ColorCycle::new(&self.colors);
        let mut next = || colors.next().unwrap_or(Rgb::BLACK);
        let vertices = vec![
            Vertex::flat(x * self.shift_top, y, next()),
            Vertex::flat(-x, -y, next()),
            Vertex::flat(x, -y, next()),
        ];
        Ok(Mesh::new("triangle", vertices, None))
    }
}

/// Regular polygon approximating a circle.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub radius: f32,
    pub points: u32,
    /// Palette cycled around the rim.
    pub colors: String,
}

impl Default for Circle {
    fn default() -> Self {
        Self {
            radius: 1.0,
            points: 5,
            colors: "rgbym".into(),
        }
    }
}

impl Circle {
    pub fn build(&self) -> Result<Mesh, ShapeError> {
        let radius = positive("radius", self.radius)?;
        let n = self.points;
        if n < 3 {
            return Err(ShapeError::TooFewPoints(n));
        }
        if n > u16::MAX as u32 {
            return Err(ShapeError::TooManyPoints(n));
        }

        // Rim points start at the top and step anticlockwise.
        let step = -TWO_PI / n as f32;
        let mut colors = ColorCycle::new(&self.colors);
        let vertices = (0..n)
            .map(|i| {
                let (sin, cos) = (i as f32 * step).sin_cos();
                let color = colors.next().unwrap_or(Rgb::BLACK);
                Vertex::flat(radius * sin, radius * cos, color)
            })
            .collect();

        Ok(Mesh::new("circle", vertices, Some(strip_indices(n as u16))))
    }
}

/// Fan-free triangulation of a convex ring: triangles alternate between
/// advancing from the start of the ring and retreating from its end.
fn strip_indices(n: u16) -> Vec<u16> {
    let ring = AngleRange::new(0.0, n as f32);
    let mut start = 1u16;
    let mut end = 0u16;
    let mut indices = Vec::with_capacity(3 * (n as usize - 2));
    for tri in 0..n - 2 {
        if tri % 2 == 0 {
            let forward = start + 1;
            indices.extend([start, forward, end]);
            start = forward;
        } else {
            let backward = ring.wrap(end as f32, -1.0) as u16;
            indices.extend([start, backward, end]);
            end = backward;
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DrawCommand, RecordingDevice, RecordingPass};

    #[test]
    fn vertex_is_36_bytes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
    }

    #[test]
    fn rectangle_geometry() {
        let mesh = Rectangle {
            width: 6.0,
            ..Rectangle::default()
        }
        .build()
        .unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices(), Some(&[0, 1, 2, 2, 3, 0][..]));
        assert_eq!(mesh.vertices()[0].position, [-3.0, 0.5, 0.0]);
        assert_eq!(mesh.vertices()[0].color, Rgb::YELLOW.0);
        assert_eq!(mesh.vertices()[3].color, Rgb::RED.0);
    }

    #[test]
    fn short_rectangle_palette_pads_with_black() {
        let mesh = Rectangle {
            colors: "1".into(),
            ..Rectangle::square(2.0)
        }
        .build()
        .unwrap();
        assert_eq!(mesh.vertices()[0].color, Rgb::WHITE.0);
        assert_eq!(mesh.vertices()[1].color, Rgb::BLACK.0);
    }

    #[test]
    fn triangle_shifts_top() {
        let mesh = Triangle {
            width: 3.0,
            shift_top: -0.75,
            colors: "cmy".into(),
            ..Triangle::default()
        }
        .build()
        .unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.index_count().is_none());
        assert_eq!(mesh.vertices()[0].position, [-1.125, 0.5, 0.0]);
        assert_eq!(mesh.vertices()[2].color, Rgb::YELLOW.0);
    }

    #[test]
    fn circle_needs_three_points() {
        let circle = Circle {
            points: 2,
            ..Circle::default()
        };
        assert_eq!(circle.build().unwrap_err(), ShapeError::TooFewPoints(2));
    }

    #[test]
    fn circle_strip_alternates_ends() {
        let mesh = Circle::default().build().unwrap();
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.indices(), Some(&[1, 2, 0, 2, 4, 0, 2, 3, 4][..]));
        let top = mesh.vertices()[0].position;
        assert!(top[0].abs() < 1e-6 && (top[1] - 1.0).abs() < 1e-6);
        // Second point steps towards -x.
        assert!(mesh.vertices()[1].position[0] < 0.0);
    }

    #[test]
    fn every_circle_vertex_is_used() {
        let mesh = Circle {
            points: 16,
            ..Circle::default()
        }
        .build()
        .unwrap();
        let indices = mesh.indices().unwrap();
        assert_eq!(indices.len(), 3 * 14);
        for v in 0..16u16 {
            assert!(indices.contains(&v), "vertex {v} unused");
        }
    }

    #[test]
    fn odd_index_count_is_padded_on_upload() {
        let mut mesh = Circle {
            points: 3,
            ..Circle::default()
        }
        .build()
        .unwrap();
        let mut device = RecordingDevice::new();
        mesh.upload(&mut device);
        let index_buffer = device
            .buffers()
            .iter()
            .find(|b| b.usage == BufferUsage::Index)
            .unwrap();
        assert_eq!(index_buffer.data.len(), 8);
        assert_eq!(mesh.index_count(), Some(3));
    }

    #[test]
    fn draw_issues_commands_after_upload() {
        let mut mesh = Triangle::default().build().unwrap();
        let mut pass = RecordingPass::new();
        mesh.draw(&mut pass);
        assert!(pass.commands.is_empty());

        let mut device = RecordingDevice::new();
        mesh.upload(&mut device);
        mesh.draw(&mut pass);
        assert_eq!(pass.commands.last(), Some(&DrawCommand::Draw(0..3)));

        let mut rect = Rectangle::default().build().unwrap();
        rect.upload(&mut device);
        rect.draw(&mut pass);
        assert_eq!(pass.commands.last(), Some(&DrawCommand::DrawIndexed(0..6)));
    }

    #[test]
    fn invalid_sizes_are_rejected() {
        let err = Rectangle {
            width: 0.0,
            ..Rectangle::default()
        }
        .build()
        .unwrap_err();
        assert!(matches!(err, ShapeError::InvalidSize { name: "width", .. }));
    }
}

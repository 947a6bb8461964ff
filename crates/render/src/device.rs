use std::ops::Range;

use tracing::{trace, warn};

/// Opaque reference to a buffer owned by a [`RenderDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(u32);

impl BufferHandle {
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Uniform,
    Vertex,
    Index,
}

/// The buffer operations the renderer core needs from a GPU.
///
/// Writes are fire-and-forget and apply in call order per buffer. Offsets and
/// lengths are multiples of four bytes.
pub trait RenderDevice {
    fn create_buffer(&mut self, label: &str, size: u64, usage: BufferUsage) -> BufferHandle;
    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, bytes: &[u8]);
}

/// Commands a drawable issues while a render pass is open.
///
/// Index buffers are always `u16`.
pub trait DrawPass {
    /// Select the transform uniform used by following draws.
    fn set_model(&mut self, transform: BufferHandle);
    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle);
    fn set_index_buffer(&mut self, buffer: BufferHandle);
    fn draw(&mut self, vertices: Range<u32>);
    fn draw_indexed(&mut self, indices: Range<u32>);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBuffer {
    pub label: String,
    pub usage: BufferUsage,
    pub data: Vec<u8>,
}

/// In-memory device. Buffers are byte vectors, writes are applied immediately.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    buffers: Vec<RecordedBuffer>,
    writes: Vec<BufferHandle>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self, handle: BufferHandle) -> Option<&RecordedBuffer> {
        self.buffers.get(handle.index())
    }

    pub fn buffers(&self) -> &[RecordedBuffer] {
        &self.buffers
    }

    /// Buffer contents decoded as little-endian `f32`s.
    pub fn floats(&self, handle: BufferHandle) -> Vec<f32> {
        self.words(handle, f32::from_le_bytes)
    }

    /// Buffer contents decoded as little-endian `u32`s.
    pub fn uints(&self, handle: BufferHandle) -> Vec<u32> {
        self.words(handle, u32::from_le_bytes)
    }

    fn words<T>(&self, handle: BufferHandle, decode: fn([u8; 4]) -> T) -> Vec<T> {
        self.buffer(handle)
            .map(|b| {
                b.data
                    .chunks_exact(4)
                    .map(|c| decode([c[0], c[1], c[2], c[3]]))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Targets of every successful write, oldest first.
    pub fn write_log(&self) -> &[BufferHandle] {
        &self.writes
    }
}

impl RenderDevice for RecordingDevice {
    fn create_buffer(&mut self, label: &str, size: u64, usage: BufferUsage) -> BufferHandle {
        let handle = BufferHandle::from_index(self.buffers.len());
        self.buffers.push(RecordedBuffer {
            label: label.to_owned(),
            usage,
            data: vec![0; size as usize],
        });
        handle
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, bytes: &[u8]) {
        let Some(target) = self.buffers.get_mut(buffer.index()) else {
            warn!(?buffer, "write to unknown buffer ignored");
            return;
        };
        let range = usize::try_from(offset)
            .ok()
            .and_then(|start| Some(start..start.checked_add(bytes.len())?))
            .filter(|range| range.end <= target.data.len());
        let Some(range) = range else {
            warn!(
                label = %target.label,
                offset,
                len = bytes.len(),
                size = target.data.len(),
                "write past end of buffer ignored"
            );
            return;
        };
        target.data[range].copy_from_slice(bytes);
        self.writes.push(buffer);
        trace!(label = %target.label, offset, len = bytes.len(), "buffer write");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    SetModel(BufferHandle),
    SetVertexBuffer { slot: u32, buffer: BufferHandle },
    SetIndexBuffer(BufferHandle),
    Draw(Range<u32>),
    DrawIndexed(Range<u32>),
}

/// Pass that records commands instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingPass {
    pub commands: Vec<DrawCommand>,
}

impl RecordingPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw calls recorded, indexed or not.
    pub fn draw_calls(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Draw(_) | DrawCommand::DrawIndexed(_)))
            .count()
    }
}

impl DrawPass for RecordingPass {
    fn set_model(&mut self, transform: BufferHandle) {
        self.commands.push(DrawCommand::SetModel(transform));
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle) {
        self.commands
            .push(DrawCommand::SetVertexBuffer { slot, buffer });
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle) {
        self.commands.push(DrawCommand::SetIndexBuffer(buffer));
    }

    fn draw(&mut self, vertices: Range<u32>) {
        self.commands.push(DrawCommand::Draw(vertices));
    }

    fn draw_indexed(&mut self, indices: Range<u32>) {
        self.commands.push(DrawCommand::DrawIndexed(indices));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_start_zeroed() {
        let mut device = RecordingDevice::new();
        let h = device.create_buffer("ambient", 16, BufferUsage::Uniform);
        assert_eq!(device.buffer(h).unwrap().data, vec![0; 16]);
        assert_eq!(device.buffer(h).unwrap().usage, BufferUsage::Uniform);
    }

    #[test]
    fn writes_apply_at_offset() {
        let mut device = RecordingDevice::new();
        let h = device.create_buffer("light", 12, BufferUsage::Uniform);
        device.write_buffer(h, 4, bytemuck::bytes_of(&[2.0f32, 3.0]));
        assert_eq!(device.floats(h), vec![0.0, 2.0, 3.0]);
        assert_eq!(device.write_count(), 1);
    }

    #[test]
    fn out_of_range_write_is_ignored() {
        let mut device = RecordingDevice::new();
        let h = device.create_buffer("small", 4, BufferUsage::Uniform);
        device.write_buffer(h, 0, &[1; 8]);
        device.write_buffer(BufferHandle::from_index(9), 0, &[1; 4]);
        assert_eq!(device.buffer(h).unwrap().data, vec![0; 4]);
        assert_eq!(device.write_count(), 0);
    }

    #[test]
    fn offset_near_usize_max_is_ignored() {
        let mut device = RecordingDevice::new();
        let h = device.create_buffer("small", 4, BufferUsage::Uniform);
        device.write_buffer(h, u64::MAX, &[1; 4]);
        device.write_buffer(h, usize::MAX as u64 - 1, &[1; 4]);
        assert_eq!(device.buffer(h).unwrap().data, vec![0; 4]);
        assert!(device.write_log().is_empty());
    }

    #[test]
    fn write_log_keeps_order() {
        let mut device = RecordingDevice::new();
        let a = device.create_buffer("a", 4, BufferUsage::Uniform);
        let b = device.create_buffer("b", 4, BufferUsage::Uniform);
        device.write_buffer(b, 0, &[1; 4]);
        device.write_buffer(a, 0, &[2; 4]);
        device.write_buffer(a, 8, &[3; 4]);
        device.write_buffer(b, 0, &[4; 4]);
        assert_eq!(device.write_log(), &[b, a, b]);
        assert_eq!(device.write_count(), 3);
    }

    #[test]
    fn pass_counts_draws() {
        let mut pass = RecordingPass::new();
        let h = BufferHandle::from_index(0);
        pass.set_vertex_buffer(0, h);
        pass.draw(0..3);
        pass.set_index_buffer(h);
        pass.draw_indexed(0..6);
        assert_eq!(pass.draw_calls(), 2);
    }
}

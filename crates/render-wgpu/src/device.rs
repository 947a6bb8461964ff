use std::collections::BTreeMap;
use std::ops::Range;

use orbitview_render::{BufferHandle, BufferUsage, DrawPass, RenderDevice};
use tracing::{trace, warn};

/// A wgpu device and queue plus every buffer created through them.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    buffers: Vec<wgpu::Buffer>,
}

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            buffers: Vec::new(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn buffer(&self, handle: BufferHandle) -> Option<&wgpu::Buffer> {
        self.buffers.get(handle.index())
    }
}

fn usages(usage: BufferUsage) -> wgpu::BufferUsages {
    let kind = match usage {
        BufferUsage::Uniform => wgpu::BufferUsages::UNIFORM,
        BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
        BufferUsage::Index => wgpu::BufferUsages::INDEX,
    };
    kind | wgpu::BufferUsages::COPY_DST
}

impl RenderDevice for WgpuDevice {
    fn create_buffer(&mut self, label: &str, size: u64, usage: BufferUsage) -> BufferHandle {
        let size = size.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usages(usage),
            mapped_at_creation: false,
        });
        let handle = BufferHandle::from_index(self.buffers.len());
        self.buffers.push(buffer);
        trace!(label, size, ?usage, "buffer created");
        handle
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, bytes: &[u8]) {
        match self.buffers.get(buffer.index()) {
            Some(target) => self.queue.write_buffer(target, offset, bytes),
            None => warn!(?buffer, "write to unknown buffer ignored"),
        }
    }
}

/// A render pass the scene draws into. Handles resolve to the device's buffers.
pub struct WgpuPass<'a> {
    pass: wgpu::RenderPass<'a>,
    device: &'a WgpuDevice,
    model_groups: &'a BTreeMap<BufferHandle, wgpu::BindGroup>,
}

impl<'a> WgpuPass<'a> {
    pub(crate) fn new(
        pass: wgpu::RenderPass<'a>,
        device: &'a WgpuDevice,
        model_groups: &'a BTreeMap<BufferHandle, wgpu::BindGroup>,
    ) -> Self {
        Self {
            pass,
            device,
            model_groups,
        }
    }
}

impl DrawPass for WgpuPass<'_> {
    fn set_model(&mut self, transform: BufferHandle) {
        match self.model_groups.get(&transform) {
            Some(group) => {
                self.pass
                    .set_bind_group(orbitview_render::layout::MODEL_GROUP, group, &[])
            }
            None => warn!(?transform, "no bind group for model buffer"),
        }
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle) {
        if let Some(b) = self.device.buffer(buffer) {
            self.pass.set_vertex_buffer(slot, b.slice(..));
        }
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle) {
        if let Some(b) = self.device.buffer(buffer) {
            self.pass
                .set_index_buffer(b.slice(..), wgpu::IndexFormat::Uint16);
        }
    }

    fn draw(&mut self, vertices: Range<u32>) {
        self.pass.draw(vertices, 0..1);
    }

    fn draw_indexed(&mut self, indices: Range<u32>) {
        self.pass.draw_indexed(indices, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_usage_is_writable() {
        for usage in [BufferUsage::Uniform, BufferUsage::Vertex, BufferUsage::Index] {
            assert!(usages(usage).contains(wgpu::BufferUsages::COPY_DST));
        }
        assert!(usages(BufferUsage::Index).contains(wgpu::BufferUsages::INDEX));
        assert!(!usages(BufferUsage::Uniform).contains(wgpu::BufferUsages::VERTEX));
    }
}

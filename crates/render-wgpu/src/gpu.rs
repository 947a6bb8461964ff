use std::collections::BTreeMap;

use orbitview_render::layout::{
    AMBIENT_BINDING, CAMERA_GROUP, CAMERA_VECTORS_BINDING, COLOR_LOCATION, LIGHT_BINDING,
    LIGHTING_GROUP, MODEL_BINDING, NORMAL_LOCATION, POSITION_LOCATION, PROJECTION_BINDING,
    VIEW_BINDING, VIEW_PROJECTION_BINDING,
};
use orbitview_render::{BufferHandle, Scene, SceneBindings, Vertex};
use tracing::info;

use crate::device::{WgpuDevice, WgpuPass};
use crate::shaders;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[derive(Debug, thiserror::Error)]
pub enum WgpuRendererError {
    #[error("scene binding refers to buffer {0:?}, which this device never created")]
    MissingBuffer(BufferHandle),
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn bind_group(
    gpu: &WgpuDevice,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffers: &[(u32, BufferHandle)],
) -> Result<wgpu::BindGroup, WgpuRendererError> {
    let entries = buffers
        .iter()
        .map(|&(binding, handle)| {
            let buffer = gpu
                .buffer(handle)
                .ok_or(WgpuRendererError::MissingBuffer(handle))?;
            Ok(wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            })
        })
        .collect::<Result<Vec<_>, WgpuRendererError>>()?;
    Ok(gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &entries,
    }))
}

/// Draws a bound scene with a single lit, depth-tested pipeline.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    camera_group: wgpu::BindGroup,
    lighting_group: wgpu::BindGroup,
    model_groups: BTreeMap<BufferHandle, wgpu::BindGroup>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    /// Build the pipeline and bind groups for buffers already created by
    /// `Scene::bind` on the same device.
    pub fn new(
        gpu: &WgpuDevice,
        bindings: &SceneBindings,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, WgpuRendererError> {
        let device = gpu.device();
        let vertex_fragment = wgpu::ShaderStages::VERTEX_FRAGMENT;

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_layout"),
            entries: &[
                uniform_entry(VIEW_BINDING, vertex_fragment),
                uniform_entry(PROJECTION_BINDING, vertex_fragment),
                uniform_entry(VIEW_PROJECTION_BINDING, vertex_fragment),
                uniform_entry(CAMERA_VECTORS_BINDING, vertex_fragment),
            ],
        });
        let lighting_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lighting_layout"),
            entries: &[
                uniform_entry(LIGHT_BINDING, wgpu::ShaderStages::FRAGMENT),
                uniform_entry(AMBIENT_BINDING, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("model_layout"),
            entries: &[uniform_entry(MODEL_BINDING, wgpu::ShaderStages::VERTEX)],
        });

        let camera = &bindings.camera;
        let camera_group = bind_group(
            gpu,
            "camera_bind_group",
            &camera_layout,
            &[
                (VIEW_BINDING, camera.view),
                (PROJECTION_BINDING, camera.projection),
                (VIEW_PROJECTION_BINDING, camera.view_projection),
                (CAMERA_VECTORS_BINDING, camera.vectors),
            ],
        )?;
        let lighting_group = bind_group(
            gpu,
            "lighting_bind_group",
            &lighting_layout,
            &[
                (LIGHT_BINDING, bindings.light),
                (AMBIENT_BINDING, bindings.ambient),
            ],
        )?;
        let model_groups = bindings
            .models
            .iter()
            .map(|&handle| {
                let group = bind_group(
                    gpu,
                    "model_bind_group",
                    &model_layout,
                    &[(MODEL_BINDING, handle)],
                )?;
                Ok((handle, group))
            })
            .collect::<Result<BTreeMap<_, _>, WgpuRendererError>>()?;

        // Group indices follow the slot constants: camera 0, lighting 1, model 2.
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&camera_layout, &lighting_layout, &model_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        POSITION_LOCATION => Float32x3,
                        NORMAL_LOCATION => Float32x3,
                        COLOR_LOCATION => Float32x3,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Flat shapes are visible from both sides.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        info!(
            models = model_groups.len(),
            ?surface_format,
            "scene pipeline ready"
        );

        Ok(Self {
            pipeline,
            camera_group,
            lighting_group,
            model_groups,
            depth_texture: Self::create_depth_texture(device, width, height),
            surface_format,
        })
    }

    pub fn resize(&mut self, gpu: &WgpuDevice, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(gpu.device(), width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Record and submit one frame. Uniforms must already be written.
    /// The colour target is cleared to the scene's ambient colour.
    pub fn render(
        &self,
        gpu: &WgpuDevice,
        view: &wgpu::TextureView,
        scene: &Scene,
        bindings: &SceneBindings,
    ) {
        let ambient = scene.ambient.color();
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: ambient.x as f64,
                            g: ambient.y as f64,
                            b: ambient.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(CAMERA_GROUP, &self.camera_group, &[]);
            pass.set_bind_group(LIGHTING_GROUP, &self.lighting_group, &[]);

            let mut draw = WgpuPass::new(pass, gpu, &self.model_groups);
            scene.draw(&mut draw, bindings);
        }

        gpu.queue().submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

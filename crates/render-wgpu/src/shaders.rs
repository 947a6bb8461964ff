/// WGSL for lit flat shapes: ambient plus one attenuated point light.
pub const SCENE_SHADER: &str = r#"
struct CameraVectors {
    position: vec3<f32>,
    direction: vec3<f32>,
};

@group(0) @binding(0) var<uniform> view: mat4x4<f32>;
@group(0) @binding(1) var<uniform> projection: mat4x4<f32>;
@group(0) @binding(2) var<uniform> view_projection: mat4x4<f32>;
@group(0) @binding(3) var<uniform> camera: CameraVectors;

struct Light {
    position: vec3<f32>,
    color: vec3<f32>,
    attenuation: vec3<f32>,
};

@group(1) @binding(0) var<uniform> light: Light;
@group(1) @binding(1) var<uniform> ambient: vec4<f32>;

struct Model {
    world: mat4x4<f32>,
    flags: vec4<u32>,
    normal: mat3x3<f32>,
};

@group(2) @binding(0) var<uniform> model: Model;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = model.world * vec4<f32>(vertex.position, 1.0);

    // flags.x set: scaled model, use the uploaded inverse-transpose.
    var normal: vec3<f32>;
    if (model.flags.x == 1u) {
        normal = model.normal * vertex.normal;
    } else {
        normal = (model.world * vec4<f32>(vertex.normal, 0.0)).xyz;
    }

    var out: VertexOutput;
    out.clip_position = view_projection * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = normal;
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Flat shapes are two-sided: light the side facing the camera.
    var n = normalize(in.world_normal);
    if (dot(n, camera.position - in.world_position) < 0.0) {
        n = -n;
    }

    let to_light = light.position - in.world_position;
    let dist = length(to_light);
    let l = to_light / max(dist, 1e-4);
    let a = light.attenuation;
    let falloff = 1.0 / (a.x + a.y * dist + a.z * dist * dist);
    let diffuse = max(dot(n, l), 0.0) * falloff * light.color;

    return vec4<f32>(in.color * (ambient.rgb + diffuse), 1.0);
}
"#;

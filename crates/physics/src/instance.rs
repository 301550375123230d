use crate::body::Body;
use cgmath::Vector2;

pub const FLAG_MOVABLE: u32 = 1;
pub const FLAG_ACTIVE: u32 = 1 << 1;
/// Marks a predicted-position dot rather than a body.
pub const FLAG_PREVIEW: u32 = 1 << 2;
pub const PREVIEW_DOT_RADIUS: f32 = 2.0;

/// Per-circle record for a renderer's instance buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyInstance {
    pub pos: [f32; 2],
    pub radius: f32,
    pub flags: u32,
    pub color: u32,
    _padding: [u32; 3], // Bump to 32 bytes
}
unsafe impl bytemuck::Zeroable for BodyInstance {}
unsafe impl bytemuck::Pod for BodyInstance {}

impl BodyInstance {
    pub fn from_body(body: &Body) -> Self {
        let mut flags = 0;
        if body.is_movable() {
            flags |= FLAG_MOVABLE;
        }
        if body.is_active() {
            flags |= FLAG_ACTIVE;
        }
        Self {
            pos: [body.pos().x as f32, body.pos().y as f32],
            radius: body.radius() as f32,
            flags,
            color: body.color(),
            _padding: [0; 3],
        }
    }
    pub fn preview_dot(pos: Vector2<f64>, color: u32) -> Self {
        Self {
            pos: [pos.x as f32, pos.y as f32],
            radius: PREVIEW_DOT_RADIUS,
            flags: FLAG_PREVIEW,
            color,
            _padding: [0; 3],
        }
    }
}

/// Every body followed by the dots of its preview, if any.
pub fn instances(bodies: &[Body]) -> Vec<BodyInstance> {
    let mut out = Vec::with_capacity(bodies.len());
    for body in bodies {
        out.push(BodyInstance::from_body(body));
        if let Some(samples) = body.trajectory() {
            out.extend(
                samples
                    .iter()
                    .map(|&pos| BodyInstance::preview_dot(pos, body.color())),
            );
        }
    }
    out
}

pub fn as_bytes(instances: &[BodyInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

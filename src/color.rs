use glam::Vec3;

// Palette shared by the scene background, fog, lights and floor.
// Linear RGB; the forward shader tone maps before output.

pub const BACKGROUND: Vec3 = Vec3::new(0.878, 0.847, 0.788);
pub const LIGHT: Vec3 = Vec3::new(1.0, 1.0, 1.0);
pub const SKY: Vec3 = Vec3::new(0.678, 0.788, 0.898);
pub const GROUND: Vec3 = Vec3::new(0.690, 0.639, 0.537);

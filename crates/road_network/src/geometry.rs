use bevy::math::{Vec2, Vec3};

/// Project a world position onto the ground plane. Height is ignored for
/// road topology.
#[inline]
pub fn project_xz(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Whether two segments share an endpoint once projected onto the ground
/// plane. Comparison is exact.
pub fn shares_endpoint_xz(a0: Vec3, a1: Vec3, b0: Vec3, b1: Vec3) -> bool {
    let (a0, a1) = (project_xz(a0), project_xz(a1));
    let (b0, b1) = (project_xz(b0), project_xz(b1));
    a0 == b0 || a0 == b1 || a1 == b0 || a1 == b1
}

/// Closed segment intersection test on the ground plane.
///
/// Each segment's endpoints are classified against the other segment's
/// supporting line with a cross product. The segments intersect when, for
/// both segments, the two orientation values do not share a strict sign.
/// Touching and collinear configurations count as intersecting.
pub fn segments_intersect(a0: Vec3, a1: Vec3, b0: Vec3, b1: Vec3) -> bool {
    let (a0, a1) = (project_xz(a0), project_xz(a1));
    let (b0, b1) = (project_xz(b0), project_xz(b1));
    let da = a1 - a0;
    let db = b1 - b0;

    let o0 = (b1 - a0).perp_dot(db);
    let o1 = (b1 - a1).perp_dot(db);
    let o2 = (a1 - b0).perp_dot(da);
    let o3 = (a1 - b1).perp_dot(da);

    o0 * o1 <= 0.0 && o2 * o3 <= 0.0
}

/// Point at parameter `t` along `a -> b`.
#[inline]
pub fn lerp_waypoint(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a.lerp(b, t)
}

use super::math::{Mat3, Ray, Vec3};

/// Dimensions of the projection plane window, in world units.
#[derive(Debug)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Viewport {
        Viewport { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(1.0, 1.0)
    }
}

#[derive(Debug)]
pub struct Camera {
    pub origin: Vec3,
    pub rotation: Mat3,
    pub projection_plane_distance: f64,
}

impl Camera {
    pub fn new(origin: Vec3, rotation: Mat3) -> Camera {
        Camera {
            origin,
            rotation,
            projection_plane_distance: 1.0,
        }
    }

    /// Creates a camera that looks at a specific point from a specific
    /// position. The point is referred to be the center of the screen.
    pub fn look_at(position: Vec3, point: Vec3) -> Camera {
        let world_up = Vec3::y_axis();
        let forward = (point - position).normalize();
        let right = world_up.cross(forward).normalize();
        // to get an orthonormal base, we should calculate the up vector with two perpendicular vectors
        let up = forward.cross(right).normalize();
        Camera::new(position, Mat3::from_basis(right, up, forward))
    }

    /// Create the ray from the camera through a canvas pixel, in world space.
    pub fn primary_ray(
        &self,
        pixel: (i32, i32),
        viewport: &Viewport,
        canvas_dims: (u32, u32),
    ) -> Ray {
        let view_direction = canvas_to_viewport(pixel, viewport, canvas_dims, self);
        Ray::new(self.origin, self.rotation.apply(view_direction))
    }
}

impl Default for Camera {
    /// Camera sitting at the origin looking toward the z axis.
    fn default() -> Self {
        Camera::new(Vec3::zero(), Mat3::identity())
    }
}

/// Map a canvas-centered pixel coordinate onto the projection plane, giving
/// the camera-space ray direction for that pixel. The result is deliberately
/// not normalized.
pub fn canvas_to_viewport(
    pixel: (i32, i32),
    viewport: &Viewport,
    canvas_dims: (u32, u32),
    camera: &Camera,
) -> Vec3 {
    let (canvas_width, canvas_height) = canvas_dims;
    Vec3::new(
        pixel.0 as f64 * viewport.width / canvas_width as f64,
        pixel.1 as f64 * viewport.height / canvas_height as f64,
        camera.projection_plane_distance,
    )
}

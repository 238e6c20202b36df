use super::camera::{Camera, Viewport};
use super::math::{Color, Ray, Vec3};

// offset applied to shadow and reflection rays to avoid surface acne
const EPSILON: f64 = 1e-3;

// primary rays start at the projection plane, not at the eye
const PROJECTION_PLANE_T: f64 = 1.0;

#[derive(Debug)]
pub struct Scene {
    pub objects: Vec<Sphere>,
    pub lights: Vec<Light>,
    pub background_color: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub color: Color,
    /// Specular exponent; [`Material::MATTE`] disables the highlight.
    pub specular: f64,
    /// Fraction of the outgoing color taken from the mirror reflection,
    /// in [0, 1].
    pub reflective: f64,
}

impl Material {
    /// Sentinel exponent meaning "no specular highlight at all".
    pub const MATTE: f64 = -1.0;

    pub fn matte(color: Color) -> Material {
        Material {
            color,
            specular: Self::MATTE,
            reflective: 0.0,
        }
    }
}

#[derive(Debug)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
    pub material: Material,
}

/// The three light kinds of the shading model. Point and directional lights
/// cast hard shadows; ambient light is unconditional fill.
#[derive(Debug, Clone, Copy)]
pub enum Light {
    Ambient { intensity: f64 },
    Point { intensity: f64, position: Vec3 },
    Directional { intensity: f64, direction: Vec3 },
}

/// Nearest intersection found by [`closest_intersection`]; borrows the sphere
/// from the scene it was queried against.
pub struct ClosestHit<'a> {
    pub sphere: &'a Sphere,
    pub t: f64,
}

/// Solve the ray/sphere quadratic and return both roots, unordered.
///
/// When the ray misses the sphere both components are `f64::INFINITY`, which
/// no open `(t_min, t_max)` interval ever admits.
pub fn intersect_ray_sphere(origin: Vec3, direction: Vec3, sphere: &Sphere) -> (f64, f64) {
    let center_to_origin = origin - sphere.center;

    let a = direction.dot(direction);
    let b = 2.0 * center_to_origin.dot(direction);
    let c = center_to_origin.dot(center_to_origin) - sphere.radius * sphere.radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return (f64::INFINITY, f64::INFINITY);
    }

    let t1 = (-b + discriminant.sqrt()) / (2.0 * a);
    let t2 = (-b - discriminant.sqrt()) / (2.0 * a);
    (t1, t2)
}

/// Scan every sphere in order and keep the nearest root strictly inside
/// `(t_min, t_max)`. Ties go to the sphere encountered first.
///
/// Primary, reflection and shadow rays all go through here; they differ only
/// in the interval they pass.
pub fn closest_intersection<'a>(
    origin: Vec3,
    direction: Vec3,
    t_min: f64,
    t_max: f64,
    scene: &'a Scene,
) -> Option<ClosestHit<'a>> {
    let in_range = |t: f64| t > t_min && t < t_max;

    let mut closest_t = f64::INFINITY;
    let mut closest_sphere = None;
    for sphere in &scene.objects {
        let (t1, t2) = intersect_ray_sphere(origin, direction, sphere);
        if in_range(t1) && t1 < closest_t {
            closest_t = t1;
            closest_sphere = Some(sphere);
        }
        if in_range(t2) && t2 < closest_t {
            closest_t = t2;
            closest_sphere = Some(sphere);
        }
    }

    closest_sphere.map(|sphere| ClosestHit {
        sphere,
        t: closest_t,
    })
}

/// Total light intensity arriving at a surface point.
///
/// `normal` must be unit length; `to_camera` points from the surface back
/// toward the viewer. The result is non-negative and unbounded above, the
/// caller clamps when scaling the surface color.
pub fn compute_lighting(
    point: Vec3,
    normal: Vec3,
    to_camera: Vec3,
    specular: f64,
    scene: &Scene,
) -> f64 {
    let mut cumulative_intensity = 0.0;

    for light in &scene.lights {
        let (light_intensity, to_light, shadow_t_max) = match *light {
            Light::Ambient { intensity } => {
                cumulative_intensity += intensity;
                continue;
            }
            Light::Point {
                intensity,
                position,
            } => (intensity, position - point, 1.0),
            Light::Directional {
                intensity,
                direction,
            } => (intensity, direction, f64::INFINITY),
        };

        // an occluder anywhere between the surface and the light kills the
        // whole contribution, there is no partial attenuation
        if closest_intersection(point, to_light, EPSILON, shadow_t_max, scene).is_some() {
            continue;
        }

        let n_dot_l = normal.dot(to_light);
        if n_dot_l > 0.0 {
            cumulative_intensity += light_intensity * n_dot_l / (normal.len() * to_light.len());
        }

        if specular != Material::MATTE {
            let reflection = to_light.reflect(normal);
            let r_dot_v = reflection.dot(to_camera);
            if r_dot_v > 0.0 {
                cumulative_intensity += light_intensity
                    * (r_dot_v / (reflection.len() * to_camera.len())).powf(specular);
            }
        }
    }

    cumulative_intensity
}

/// Trace one ray through the scene and return its color.
///
/// `depth` bounds the recursive specular reflections; it strictly decreases
/// on every bounce, so the recursion always terminates.
pub fn trace_ray(
    origin: Vec3,
    direction: Vec3,
    t_min: f64,
    t_max: f64,
    depth: u32,
    scene: &Scene,
) -> Color {
    let Some(hit) = closest_intersection(origin, direction, t_min, t_max, scene) else {
        return scene.background_color;
    };

    let point = Ray::new(origin, direction).at(hit.t);
    let normal = (point - hit.sphere.center).normalize();
    let material = hit.sphere.material;

    let intensity = compute_lighting(point, normal, -direction, material.specular, scene);
    let local_color = material.color.scale(intensity);

    if depth == 0 || material.reflective <= 0.0 {
        return local_color;
    }

    let reflection = (-direction).reflect(normal);
    let reflected_color = trace_ray(point, reflection, EPSILON, f64::INFINITY, depth - 1, scene);

    local_color.scale(1.0 - material.reflective) + reflected_color.scale(material.reflective)
}

/// Render a single pixel, given in canvas-centered coordinates. This is the
/// whole per-pixel pipeline: project, rotate into world space, trace.
pub fn render_pixel(
    pixel: (i32, i32),
    viewport: &Viewport,
    canvas_dims: (u32, u32),
    camera: &Camera,
    scene: &Scene,
    max_depth: u32,
) -> Color {
    let ray = camera.primary_ray(pixel, viewport, canvas_dims);
    trace_ray(
        ray.origin,
        ray.direction,
        PROJECTION_PLANE_T,
        f64::INFINITY,
        max_depth,
        scene,
    )
}

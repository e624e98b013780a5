use crate::scene::{Light, Scene, Sphere};

pub const BACKGROUND_COLOR: [u8; 3] = [0, 0, 0];

/// Offset applied to shadow-ray `t_min` so a surface does not occlude itself.
const SHADOW_EPSILON: f32 = 0.01;

/// Anything a ray can hit. The scene scan is brute force; an acceleration
/// structure would slot in behind this trait without touching the shading
/// engine or the frame driver.
pub trait Intersectable {
    /// Roots of `|O + tD - C|^2 = r^2` along the ray `O + tD`. A miss is
    /// `(INFINITY, INFINITY)`, not an error. Root order is unspecified;
    /// callers must test both against their validity window.
    fn intersect(&self, origin: glam::Vec3, dir: glam::Vec3) -> (f32, f32);
}

impl Intersectable for Sphere {
    fn intersect(&self, origin: glam::Vec3, dir: glam::Vec3) -> (f32, f32) {
        let co = origin - self.center;

        let a = dir.dot(dir);
        let b = 2.0 * co.dot(dir);
        let c = co.dot(co) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return (f32::INFINITY, f32::INFINITY);
        }

        let sqrt_d = discriminant.sqrt();
        ((-b + sqrt_d) / (2.0 * a), (-b - sqrt_d) / (2.0 * a))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Hit<'scene> {
    pub t: f32,
    pub sphere: &'scene Sphere,
}

/// Nearest root strictly inside the open interval `(t_min, t_max)` across
/// every sphere. Strict `<` keeps the first sphere in scene order on exact
/// ties, which keeps output deterministic.
pub fn closest_hit(
    scene: &Scene,
    origin: glam::Vec3,
    dir: glam::Vec3,
    t_min: f32,
    t_max: f32,
) -> Option<Hit<'_>> {
    let mut closest: Option<Hit> = None;

    for sphere in scene.spheres() {
        let (t1, t2) = sphere.intersect(origin, dir);
        for t in [t1, t2] {
            if t > t_min && t < t_max && closest.map_or(true, |hit| t < hit.t) {
                closest = Some(Hit { t, sphere });
            }
        }
    }

    closest
}

/// Accumulated light intensity at point `p` with unit-ish normal `n` and view
/// vector `v`. `specular` of `None` disables the highlight term.
pub fn compute_lighting(
    scene: &Scene,
    p: glam::Vec3,
    n: glam::Vec3,
    v: glam::Vec3,
    specular: Option<f32>,
) -> f32 {
    let mut total = 0.0;

    for light in scene.lights() {
        let (light_intensity, l) = match *light {
            Light::Ambient { intensity } => {
                total += intensity;
                continue;
            }
            Light::Point {
                intensity,
                position,
            } => (intensity, position - p),
            Light::Directional {
                intensity,
                direction,
            } => (intensity, direction),
        };

        // Hard shadow: any occluder along L suppresses this light entirely.
        // The upper bound is unbounded even for point lights, matching the
        // source renderer; see the shading tests for the recorded deviation
        // from distance-clipped shadowing.
        if closest_hit(scene, p, l, SHADOW_EPSILON, f32::INFINITY).is_some() {
            continue;
        }

        // Diffuse
        let n_dot_l = n.dot(l);
        let diffuse_denom = n.length() * l.length();
        if n_dot_l >= 0.0 && diffuse_denom > 0.0 {
            total += light_intensity * n_dot_l / diffuse_denom;
        }

        // Specular
        if let Some(exponent) = specular {
            let r = 2.0 * n_dot_l * n - l;
            let r_dot_v = r.dot(v);
            let specular_denom = r.length() * v.length();
            if r_dot_v >= 0.0 && specular_denom > 0.0 {
                total += light_intensity * (r_dot_v / specular_denom).powf(exponent);
            }
        }
    }

    total
}

/// Traces one ray through the scene and shades the nearest hit. A miss yields
/// the background color.
pub fn trace_ray(
    scene: &Scene,
    origin: glam::Vec3,
    dir: glam::Vec3,
    t_min: f32,
    t_max: f32,
) -> [u8; 3] {
    let Some(hit) = closest_hit(scene, origin, dir, t_min, t_max) else {
        return BACKGROUND_COLOR;
    };

    let p = origin + hit.t * dir;
    // normalize_or_zero: the zero normal cannot arise from a valid sphere,
    // but a zero vector shades as "no contribution" instead of dividing by 0.
    let n = (p - hit.sphere.center).normalize_or_zero();

    let intensity = compute_lighting(scene, p, n, -dir, hit.sphere.specular);
    clamp_color(intensity * hit.sphere.color)
}

/// Per-channel clamp to a byte. Unclamped shading can exceed 255 when light
/// intensities plus a specular spike stack up.
pub fn clamp_color(color: glam::Vec3) -> [u8; 3] {
    [
        color.x.clamp(0.0, 255.0) as u8,
        color.y.clamp(0.0, 255.0) as u8,
        color.z.clamp(0.0, 255.0) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Light, Scene, Sphere};
    use glam::Vec3;

    const RED: Vec3 = Vec3::new(255.0, 0.0, 0.0);
    const BLUE: Vec3 = Vec3::new(0.0, 0.0, 255.0);

    fn sphere_at(center: Vec3, color: Vec3) -> Sphere {
        Sphere::new(center, 1.0, color, None)
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn miss_returns_infinite_roots() {
        let sphere = sphere_at(Vec3::new(0.0, 10.0, 0.0), RED);
        let (t1, t2) = sphere.intersect(Vec3::ZERO, Vec3::Z);
        assert!(t1.is_infinite() && t2.is_infinite());
    }

    #[test]
    fn roots_bracket_the_sphere() {
        let sphere = sphere_at(Vec3::new(0.0, 0.0, 3.0), RED);
        let (t1, t2) = sphere.intersect(Vec3::ZERO, Vec3::Z);
        let (near, far) = (t1.min(t2), t1.max(t2));
        assert_close(near, 2.0);
        assert_close(far, 4.0);
    }

    #[test]
    fn miss_traces_to_background() {
        let scene = Scene::new(
            vec![sphere_at(Vec3::new(0.0, 10.0, 5.0), RED)],
            vec![Light::Ambient { intensity: 1.0 }],
        )
        .unwrap();
        let color = trace_ray(&scene, Vec3::ZERO, Vec3::Z, 1.0, f32::INFINITY);
        assert_eq!(color, BACKGROUND_COLOR);
    }

    #[test]
    fn nearest_valid_root_wins() {
        // Both spheres sit on the ray; the near one must be chosen.
        let scene = Scene::new(
            vec![
                sphere_at(Vec3::new(0.0, 0.0, 10.0), BLUE),
                sphere_at(Vec3::new(0.0, 0.0, 4.0), RED),
            ],
            vec![Light::Ambient { intensity: 1.0 }],
        )
        .unwrap();
        let hit = closest_hit(&scene, Vec3::ZERO, Vec3::Z, 1.0, f32::INFINITY).unwrap();
        assert_close(hit.t, 3.0);
        assert_eq!(hit.sphere.color, RED);
    }

    #[test]
    fn exact_tie_resolves_to_first_declared_sphere() {
        let center = Vec3::new(0.0, 0.0, 4.0);
        let scene = Scene::new(
            vec![sphere_at(center, RED), sphere_at(center, BLUE)],
            vec![],
        )
        .unwrap();
        let hit = closest_hit(&scene, Vec3::ZERO, Vec3::Z, 1.0, f32::INFINITY).unwrap();
        assert_eq!(hit.sphere.color, RED);
    }

    #[test]
    fn near_root_inside_t_min_falls_back_to_far_root() {
        // Camera inside the t window cutoff: near root at 0.5 is excluded by
        // t_min = 1, the far root at 1.5 must still register.
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 1.0), 0.5, RED, None);
        let scene = Scene::new(vec![sphere], vec![]).unwrap();
        let hit = closest_hit(&scene, Vec3::ZERO, Vec3::Z, 1.0, f32::INFINITY).unwrap();
        assert_close(hit.t, 1.5);
    }

    #[test]
    fn ambient_only_lighting_is_exactly_k() {
        let scene = Scene::new(vec![], vec![Light::Ambient { intensity: 0.37 }]).unwrap();
        let i = compute_lighting(&scene, Vec3::new(5.0, -2.0, 1.0), Vec3::Y, Vec3::Z, None);
        assert_eq!(i, 0.37);
        // Independent of P and N.
        let i = compute_lighting(&scene, Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), Vec3::X, Some(10.0));
        assert_eq!(i, 0.37);
    }

    #[test]
    fn facing_point_light_gets_full_diffuse() {
        // Surface at origin, normal +Y, light straight above: N.L/(|N||L|) = 1.
        let scene = Scene::new(
            vec![],
            vec![Light::Point {
                intensity: 0.6,
                position: Vec3::new(0.0, 2.0, 0.0),
            }],
        )
        .unwrap();
        let i = compute_lighting(&scene, Vec3::ZERO, Vec3::Y, Vec3::Z, None);
        assert_close(i, 0.6);
    }

    #[test]
    fn occluder_casts_binary_shadow() {
        let point = Light::Point {
            intensity: 0.6,
            position: Vec3::new(0.0, 10.0, 0.0),
        };
        let ambient = Light::Ambient { intensity: 0.2 };

        let open = Scene::new(vec![], vec![ambient, point]).unwrap();
        let lit = compute_lighting(&open, Vec3::ZERO, Vec3::Y, Vec3::Z, None);
        assert_close(lit, 0.8);

        // Sphere directly between the surface point and the light.
        let blocked = Scene::new(
            vec![sphere_at(Vec3::new(0.0, 5.0, 0.0), RED)],
            vec![ambient, point],
        )
        .unwrap();
        let shadowed = compute_lighting(&blocked, Vec3::ZERO, Vec3::Y, Vec3::Z, None);
        assert_close(shadowed, 0.2);
    }

    #[test]
    fn occluder_behind_point_light_still_shadows() {
        // Known deviation from distance-clipped shadowing: the shadow ray's
        // upper bound is unbounded, so a sphere past the light at t > 1 along
        // L still suppresses the light.
        let scene = Scene::new(
            vec![sphere_at(Vec3::new(0.0, 20.0, 0.0), RED)],
            vec![Light::Point {
                intensity: 0.6,
                position: Vec3::new(0.0, 10.0, 0.0),
            }],
        )
        .unwrap();
        let i = compute_lighting(&scene, Vec3::ZERO, Vec3::Y, Vec3::Z, None);
        assert_eq!(i, 0.0);
    }

    #[test]
    fn directional_magnitude_cancels_in_diffuse() {
        let short = Scene::new(
            vec![],
            vec![Light::Directional {
                intensity: 0.5,
                direction: Vec3::new(0.0, 1.0, 0.0),
            }],
        )
        .unwrap();
        let long = Scene::new(
            vec![],
            vec![Light::Directional {
                intensity: 0.5,
                direction: Vec3::new(0.0, 8.0, 0.0),
            }],
        )
        .unwrap();
        let a = compute_lighting(&short, Vec3::ZERO, Vec3::Y, Vec3::Z, None);
        let b = compute_lighting(&long, Vec3::ZERO, Vec3::Y, Vec3::Z, None);
        assert_close(a, 0.5);
        assert_close(b, 0.5);
    }

    #[test]
    fn zero_length_light_vector_contributes_nothing() {
        // Point light coincident with the surface point: L = 0, guarded.
        let scene = Scene::new(
            vec![],
            vec![Light::Point {
                intensity: 0.6,
                position: Vec3::ZERO,
            }],
        )
        .unwrap();
        let i = compute_lighting(&scene, Vec3::ZERO, Vec3::Y, Vec3::Z, Some(50.0));
        assert_eq!(i, 0.0);
    }

    #[test]
    fn specular_skipped_without_exponent() {
        let scene = Scene::new(
            vec![],
            vec![Light::Point {
                intensity: 0.6,
                position: Vec3::new(0.0, 2.0, 0.0),
            }],
        )
        .unwrap();
        // View vector aligned with the reflection direction would add a full
        // specular term if the exponent were present.
        let diffuse_only = compute_lighting(&scene, Vec3::ZERO, Vec3::Y, Vec3::new(0.0, 1.0, 0.0), None);
        let with_specular =
            compute_lighting(&scene, Vec3::ZERO, Vec3::Y, Vec3::new(0.0, 1.0, 0.0), Some(1.0));
        assert_close(diffuse_only, 0.6);
        assert_close(with_specular, 1.2);
    }

    #[test]
    fn shading_clamps_each_channel_to_a_byte() {
        // Intensities summing past 1 would overflow a byte channel without
        // the clamp.
        let scene = Scene::new(
            vec![sphere_at(Vec3::new(0.0, 0.0, 4.0), RED)],
            vec![
                Light::Ambient { intensity: 1.0 },
                Light::Ambient { intensity: 1.0 },
            ],
        )
        .unwrap();
        let color = trace_ray(&scene, Vec3::ZERO, Vec3::Z, 1.0, f32::INFINITY);
        assert_eq!(color, [255, 0, 0]);
    }
}

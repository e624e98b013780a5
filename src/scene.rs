use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("sphere {index} has degenerate radius {radius}")]
    DegenerateSphere { index: usize, radius: f32 },
    #[error("light {index} has negative intensity {intensity}")]
    NegativeIntensity { index: usize, intensity: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: glam::Vec3,
    pub radius: f32,

    /// Surface color with channels in `0.0..=255.0`.
    pub color: glam::Vec3,
    /// Shininess exponent; `None` disables the specular highlight.
    pub specular: Option<f32>,
}

impl Sphere {
    pub fn new(center: glam::Vec3, radius: f32, color: glam::Vec3, specular: Option<f32>) -> Self {
        Self {
            center,
            radius,
            color,
            specular,
        }
    }
}

/// Light sources dispatched by pattern match in the shading engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        intensity: f32,
    },
    Point {
        intensity: f32,
        position: glam::Vec3,
    },
    /// `direction` points from the surface toward the light. It is used
    /// unnormalized; its magnitude cancels inside the shading ratios but is
    /// still part of the caller contract for the specular reflection vector.
    Directional {
        intensity: f32,
        direction: glam::Vec3,
    },
}

impl Light {
    pub fn intensity(&self) -> f32 {
        match *self {
            Light::Ambient { intensity }
            | Light::Point { intensity, .. }
            | Light::Directional { intensity, .. } => intensity,
        }
    }
}

/// Immutable-per-frame sphere and light collection. Read-only during a render
/// pass; replaced wholesale between passes.
#[derive(Debug, Default)]
pub struct Scene {
    spheres: Vec<Sphere>,
    lights: Vec<Light>,
}

impl Scene {
    /// Validates geometry up front so the tracer never sees a degenerate
    /// sphere or a negative intensity mid-pass.
    pub fn new(spheres: Vec<Sphere>, lights: Vec<Light>) -> Result<Self, SceneError> {
        for (index, sphere) in spheres.iter().enumerate() {
            if sphere.radius <= 0.0 {
                return Err(SceneError::DegenerateSphere {
                    index,
                    radius: sphere.radius,
                });
            }
        }
        for (index, light) in lights.iter().enumerate() {
            let intensity = light.intensity();
            if intensity < 0.0 {
                return Err(SceneError::NegativeIntensity { index, intensity });
            }
        }
        Ok(Self { spheres, lights })
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere(radius: f32) -> Sphere {
        Sphere::new(glam::Vec3::ZERO, radius, glam::Vec3::new(255.0, 0.0, 0.0), None)
    }

    #[test]
    fn rejects_degenerate_radius() {
        let err = Scene::new(vec![unit_sphere(1.0), unit_sphere(0.0)], vec![]).unwrap_err();
        assert!(matches!(err, SceneError::DegenerateSphere { index: 1, .. }));

        let err = Scene::new(vec![unit_sphere(-2.5)], vec![]).unwrap_err();
        assert!(matches!(err, SceneError::DegenerateSphere { index: 0, .. }));
    }

    #[test]
    fn rejects_negative_intensity() {
        let err = Scene::new(vec![], vec![Light::Ambient { intensity: -0.1 }]).unwrap_err();
        assert!(matches!(err, SceneError::NegativeIntensity { index: 0, .. }));
    }

    #[test]
    fn accepts_valid_scene() {
        let scene = Scene::new(
            vec![unit_sphere(1.0)],
            vec![
                Light::Ambient { intensity: 0.2 },
                Light::Point {
                    intensity: 0.6,
                    position: glam::Vec3::new(2.0, 1.0, 0.0),
                },
            ],
        )
        .unwrap();
        assert_eq!(scene.spheres().len(), 1);
        assert_eq!(scene.lights().len(), 2);
    }
}

//! Reflection and refraction of ray directions at a surface.
//!
//! Refraction follows Snell's law with the relative refractive index taken
//! from the two media's relative permittivities, `n = sqrt(eps_in / eps_out)`.
//! When no transmitted direction exists the ray is totally internally
//! reflected instead, so [`refract`] always yields a unit direction.

use glam::Vec3A;

/// Reflect a vector off a surface using the law of reflection.
pub fn reflect(v: Vec3A, n: Vec3A) -> Vec3A {
    v - 2.0 * v.dot(n) * n
}

/// Refract `incident` through a surface with unit `normal`.
///
/// `normal` must point against the incident ray (`normal.dot(incident) <= 0`).
/// `eps_incident` and `eps_exit` are the relative permittivities of the
/// medium the ray travels in and the medium it enters; both must be
/// positive. Equal permittivities pass the ray through unchanged.
pub fn refract(incident: Vec3A, normal: Vec3A, eps_incident: f32, eps_exit: f32) -> Vec3A {
    debug_assert!(
        eps_incident > 0.0 && eps_exit > 0.0,
        "relative permittivities must be positive"
    );

    let n = (eps_incident / eps_exit).sqrt();
    let cos_i = -normal.dot(incident);
    let sin2_t = n * n * (1.0 - cos_i * cos_i);

    if sin2_t > 1.0 {
        // Total internal reflection
        return reflect(incident, normal);
    }

    let cos_t = (1.0 - sin2_t).sqrt();
    (n * incident + (n * cos_i - cos_t) * normal).normalize()
}

/// Flip `normal` if needed so it points against `direction`.
pub fn face_against(normal: Vec3A, direction: Vec3A) -> Vec3A {
    if normal.dot(direction) > 0.0 { -normal } else { normal }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_vec_eq(a: Vec3A, b: Vec3A) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-5);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-5);
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-5);
    }

    #[test]
    fn reflect_mirrors_about_normal() {
        let d = Vec3A::new(1.0, 0.0, -1.0).normalize();
        let r = reflect(d, Vec3A::Z);
        assert_vec_eq(r, Vec3A::new(1.0, 0.0, 1.0).normalize());
    }

    #[test]
    fn equal_permittivity_passes_straight_through() {
        let directions = [
            Vec3A::new(0.3, -0.2, -0.9),
            Vec3A::new(-0.9, 0.1, -0.05),
            -Vec3A::Z,
        ];
        for d in directions {
            let d = d.normalize();
            let normal = face_against(Vec3A::new(0.1, 0.2, 1.0).normalize(), d);
            for eps in [1.0, 1.5, 7.0] {
                assert_vec_eq(refract(d, normal, eps, eps), d);
            }
        }
    }

    #[test]
    fn normal_incidence_does_not_bend() {
        let r = refract(-Vec3A::Z, Vec3A::Z, 1.0, 4.0);
        assert_vec_eq(r, -Vec3A::Z);
    }

    #[test]
    fn snell_law_holds() {
        // 45 degrees from air (eps 1) into eps 4: n = 0.5
        let d = Vec3A::new(1.0, 0.0, -1.0).normalize();
        let r = refract(d, Vec3A::Z, 1.0, 4.0);
        let sin_i = d.x;
        let sin_t = r.x;
        assert_abs_diff_eq!(sin_t, 0.5 * sin_i, epsilon = 1e-5);
        assert_abs_diff_eq!(r.length(), 1.0, epsilon = 1e-5);
        assert!(r.z < 0.0);
    }

    #[test]
    fn steep_angle_totally_internally_reflects() {
        // n = 2, sin(60) = 0.866, sin2_t = 4 * 0.75 = 3 > 1
        let d = Vec3A::new(60f32.to_radians().sin(), 0.0, -60f32.to_radians().cos());
        let r = refract(d, Vec3A::Z, 4.0, 1.0);
        assert_vec_eq(r, reflect(d, Vec3A::Z));
    }

    #[test]
    fn shallow_angle_escapes_denser_medium() {
        // n = 2, sin(20) = 0.342, sin2_t = 0.468 < 1
        let d = Vec3A::new(20f32.to_radians().sin(), 0.0, -20f32.to_radians().cos());
        let r = refract(d, Vec3A::Z, 4.0, 1.0);
        assert_abs_diff_eq!(r.x, 2.0 * d.x, epsilon = 1e-5);
        assert!(r.z < 0.0);
    }

    #[test]
    fn face_against_flips_only_when_needed() {
        assert_eq!(face_against(Vec3A::Z, -Vec3A::Z), Vec3A::Z);
        assert_eq!(face_against(Vec3A::Z, Vec3A::Z), -Vec3A::Z);
    }
}

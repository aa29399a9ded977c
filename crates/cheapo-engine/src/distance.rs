//! Great-circle distance on the WGS-84 ellipsoid.
//!
//! Uses Vincenty's inverse formula, which is accurate to well under a
//! millimetre for any pair of points that are not nearly antipodal. For the
//! nearly-antipodal pairs where the iteration fails to converge, the mean-radius
//! haversine distance is returned instead.

use cheapo_core::Coordinates;

const WGS84_SEMI_MAJOR_M: f64 = 6_378_137.0;
const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;
const WGS84_SEMI_MINOR_M: f64 = WGS84_SEMI_MAJOR_M * (1.0 - WGS84_FLATTENING);
const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE_THRESHOLD: f64 = 1e-12;

/// Distance in meters between two points given in decimal degrees.
///
/// Inputs are not validated; latitudes outside ±90° produce meaningless output.
#[must_use]
pub fn geodesic_distance(from: Coordinates, to: Coordinates) -> f64 {
    vincenty_inverse(from, to).unwrap_or_else(|| haversine(from, to))
}

fn vincenty_inverse(from: Coordinates, to: Coordinates) -> Option<f64> {
    let f = WGS84_FLATTENING;
    let lon_delta = (to.longitude - from.longitude).to_radians();
    let reduced_lat_1 = ((1.0 - f) * from.latitude.to_radians().tan()).atan();
    let reduced_lat_2 = ((1.0 - f) * to.latitude.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = reduced_lat_1.sin_cos();
    let (sin_u2, cos_u2) = reduced_lat_2.sin_cos();

    let mut lambda = lon_delta;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        if sin_sigma.abs() < f64::EPSILON {
            // Coincident when cos σ > 0, otherwise exactly antipodal.
            return (cos_sigma > 0.0).then_some(0.0);
        }
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial lines have cos²α = 0.
        let cos_2sigma_m = if cos_sq_alpha.abs() < f64::EPSILON {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = lon_delta
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - previous).abs() < CONVERGENCE_THRESHOLD {
            let a_sq = WGS84_SEMI_MAJOR_M.powi(2);
            let b_sq = WGS84_SEMI_MINOR_M.powi(2);
            let u_sq = cos_sq_alpha * (a_sq - b_sq) / b_sq;
            let big_a =
                1.0 + u_sq / 16_384.0 * (4_096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1_024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            return Some(WGS84_SEMI_MINOR_M * big_a * (sigma - delta_sigma));
        }
    }

    None
}

fn haversine(from: Coordinates, to: Coordinates) -> f64 {
    let lat_1 = from.latitude.to_radians();
    let lat_2 = to.latitude.to_radians();
    let d_lat = lat_2 - lat_1;
    let d_lon = (to.longitude - from.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat_1.cos() * lat_2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

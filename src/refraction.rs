//! Atmospheric refraction for the pointing-center report.
//!
//! Uses the two-term model
//!
//! ```text
//! R = (A·tan z + B·tan³ z) / (1 + (A + 3B·tan² z)·sec² z)
//! ```
//!
//! with `A`, `B` derived from pressure, temperature and wavelength for a
//! homogeneous atmosphere of 10 km over an Earth radius of 6738 km.
//! Refraction lifts an object toward the zenith, along the parallactic angle.

const HPA_TO_MMHG: f64 = 0.7500616827042;
const ATMOSPHERE_HEIGHT_KM: f64 = 10.0;
const EARTH_RADIUS_KM: f64 = 6738.0;
/// Refractivity constant, radians per mmHg/K.
const REFRACTIVITY_K: f64 = 0.00010514;

/// Site and observing conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefractionModel {
    pub latitude_deg: f64,
    pub pressure_hpa: f64,
    pub temperature_c: f64,
    /// Reference wavelength the pointing is optimised for.
    pub wavelength_nm: f64,
}

impl Default for RefractionModel {
    fn default() -> Self {
        Self::keck()
    }
}

impl RefractionModel {
    /// Mauna Kea summit conditions.
    pub fn keck() -> Self {
        Self {
            latitude_deg: 19.8283,
            pressure_hpa: 615.0,
            temperature_c: 0.0,
            wavelength_nm: 650.0,
        }
    }

    /// Refraction coefficients `(A, B)` in radians at the given wavelength.
    pub fn coefficients(&self, wavelength_nm: f64) -> (f64, f64) {
        let wl_um = wavelength_nm / 1000.0;
        let press_mmhg = self.pressure_hpa * HPA_TO_MMHG;
        let n_minus_1 = REFRACTIVITY_K * press_mmhg / (273.15 + self.temperature_c)
            * (1.0 + 0.00567 / (wl_um * wl_um));
        let ratio = ATMOSPHERE_HEIGHT_KM / EARTH_RADIUS_KM;
        let a = n_minus_1 * (1.0 - ratio);
        let b = -n_minus_1 * (ratio - n_minus_1 / 2.0);
        (a, b)
    }

    fn refraction_at(&self, zenith_rad: f64, wavelength_nm: f64) -> f64 {
        let (a, b) = self.coefficients(wavelength_nm);
        let tanz = zenith_rad.tan();
        let secz = 1.0 / zenith_rad.cos();
        let num = a * tanz + b * tanz.powi(3);
        let denom = 1.0 + (a + 3.0 * b * tanz * tanz) * secz * secz;
        (num / denom).to_degrees() * 3600.0
    }

    /// Refraction at the reference wavelength, arcsec.
    pub fn refraction_arcsec(&self, zenith_rad: f64) -> f64 {
        self.refraction_at(zenith_rad, self.wavelength_nm)
    }

    /// Refraction at the reference wavelength minus that at `wavelength_nm`, arcsec.
    pub fn differential_arcsec(&self, zenith_rad: f64, wavelength_nm: f64) -> f64 {
        self.refraction_at(zenith_rad, self.wavelength_nm)
            - self.refraction_at(zenith_rad, wavelength_nm)
    }

    /// Zenith distance of a source at the given hour angle and declination.
    ///
    /// Sources below the horizon are clamped to the horizon.
    pub fn zenith_distance(&self, hour_angle_rad: f64, dec_rad: f64) -> f64 {
        let (sinlat, coslat) = self.latitude_deg.to_radians().sin_cos();
        let (sindec, cosdec) = dec_rad.sin_cos();
        let sin_el = (sinlat * sindec + coslat * cosdec * hour_angle_rad.cos()).clamp(0.0, 1.0);
        std::f64::consts::FRAC_PI_2 - sin_el.asin()
    }

    /// Parallactic angle: position angle (north through east) of the zenith as
    /// seen from the source.
    pub fn parallactic_angle(&self, hour_angle_rad: f64, dec_rad: f64) -> f64 {
        let (sinh, cosh) = hour_angle_rad.sin_cos();
        let (sindec, cosdec) = dec_rad.sin_cos();
        let tanlat = self.latitude_deg.to_radians().tan();
        sinh.atan2(tanlat * cosdec - sindec * cosh)
    }

    /// Apparent (refracted) position of a source, degrees.
    pub fn refracted_position(&self, ra_deg: f64, dec_deg: f64, hour_angle_deg: f64) -> (f64, f64) {
        let ha = hour_angle_deg.to_radians();
        let dec = dec_deg.to_radians();
        let r_deg = self.refraction_arcsec(self.zenith_distance(ha, dec)) / 3600.0;
        let (sinq, cosq) = self.parallactic_angle(ha, dec).sin_cos();

        let cosd = dec.cos();
        let dra = if cosd.abs() > 1e-5 { r_deg * sinq / cosd } else { 0.0 };
        (ra_deg + dra, dec_deg + r_deg * cosq)
    }
}

use num_complex::Complex64;

use crate::db::MaterialDb;
use crate::error::Result;

/// Cromer-Mann coefficients: (symbol, a, b, c).
///
/// f0(s) = c + sum_i(a_i * exp(-b_i * s^2)), s = sin(theta) / lambda in 1/Angstrom.
const CROMER_MANN: &[(&str, [f64; 4], [f64; 4], f64)] = &[
    (
        "H",
        [0.493002, 0.322912, 0.140191, 0.040810],
        [10.5109, 26.1257, 3.14236, 57.7997],
        0.003038,
    ),
    (
        "C",
        [2.31, 1.02, 1.5886, 0.865],
        [20.8439, 10.2075, 0.5687, 51.6512],
        0.2156,
    ),
    (
        "N",
        [12.2126, 3.1322, 2.0125, 1.1663],
        [0.0057, 9.8933, 28.9975, 0.5826],
        -11.529,
    ),
    (
        "O",
        [3.0485, 2.2868, 1.5463, 0.867],
        [13.2771, 5.7011, 0.3239, 32.9089],
        0.2508,
    ),
    (
        "P",
        [6.4345, 4.1791, 1.78, 1.4908],
        [1.9067, 27.157, 0.526, 68.1645],
        1.1149,
    ),
    (
        "S",
        [6.9053, 5.2034, 1.4379, 1.5863],
        [1.4679, 22.2151, 0.2536, 56.172],
        0.8669,
    ),
    (
        "Au",
        [16.8819, 18.5913, 25.5582, 5.86],
        [0.4611, 8.6216, 1.4826, 36.3956],
        12.0658,
    ),
];

/// Normal-scattering form factor f0 for a symbol at s = |q| / 4pi (1/Angstrom).
///
/// Returns `None` when no coefficients are known for the element.
pub fn f0(symbol: &str, s: f64) -> Option<f64> {
    let (_, a, b, c) = CROMER_MANN.iter().find(|(sym, ..)| *sym == symbol)?;
    let s2 = s * s;
    Some(
        a.iter()
            .zip(b.iter())
            .fold(*c, |acc, (a, b)| acc + a * (-b * s2).exp()),
    )
}

/// Energy- and q-dependent scattering factor of one element.
///
/// `f(q) = f0(|q|) - Z + f1(E) + i f2(E)`. Elements without Cromer-Mann
/// coefficients fall back to the forward-scattering value `f1 + i f2`.
#[derive(Debug, Clone)]
pub struct AtomicFormFactor {
    symbol: String,
    z: f64,
    anomalous: Complex64,
    has_f0: bool,
}

impl AtomicFormFactor {
    pub fn new(db: &MaterialDb, z: u16, photon_energy_ev: f64) -> Result<Self> {
        let symbol = db.element_by_z(z)?.symbol.clone();
        let (f1, f2) = db.scattering_factor_z(z, photon_energy_ev)?;
        let has_f0 = f0(&symbol, 0.0).is_some();
        Ok(AtomicFormFactor {
            symbol,
            z: f64::from(z),
            anomalous: Complex64::new(f1, f2),
            has_f0,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Evaluates at a scattering vector magnitude in 1/m.
    pub fn at(&self, q_norm: f64) -> Complex64 {
        if !self.has_f0 {
            return self.anomalous;
        }
        // 1/m -> 1/Angstrom, then s = q / 4pi.
        let s = q_norm * 1e-10 / (4.0 * std::f64::consts::PI);
        match f0(&self.symbol, s) {
            Some(f) => self.anomalous + (f - self.z),
            None => self.anomalous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_f0_forward_is_close_to_z() {
        assert_relative_eq!(f0("H", 0.0).unwrap(), 1.0, epsilon = 2e-3);
        assert_relative_eq!(f0("C", 0.0).unwrap(), 6.0, epsilon = 2e-3);
        assert_relative_eq!(f0("O", 0.0).unwrap(), 8.0, epsilon = 2e-3);
        assert_relative_eq!(f0("Au", 0.0).unwrap(), 79.0, epsilon = 0.1);
    }

    #[test]
    fn test_f0_decreases_with_q() {
        let low = f0("O", 0.1).unwrap();
        let high = f0("O", 0.5).unwrap();
        assert!(high < low);
        assert!(f0("Xe", 0.0).is_none());
    }

    #[test]
    fn test_form_factor_forward_equals_f1() {
        let db = MaterialDb::new();
        let ff = AtomicFormFactor::new(&db, 8, 10_000.0).unwrap();
        let (f1, f2) = db.scattering_factor("O", 10_000.0).unwrap();
        let forward = ff.at(0.0);
        assert_relative_eq!(forward.re, f1, epsilon = 2e-3);
        assert_relative_eq!(forward.im, f2, epsilon = 1e-12);
    }
}

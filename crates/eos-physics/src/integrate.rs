//! Adaptive Gauss-Kronrod quadrature.
//!
//! Each interval is integrated with the 7-point Gauss rule embedded in the
//! 15-point Kronrod rule; the difference of the two is the error estimate.
//! Intervals whose error exceeds their share of the tolerance are bisected
//! until `max_depth` is reached.

use eos_core::{EosError, ErrorInfo, IntegrationConfig};

const XGK: [f64; 8] = [
    0.991_455_371_120_812_639_206_854_697_526_329,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.586_087_235_467_691_130_294_144_845_693_013,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.0,
];

const WGK: [f64; 8] = [
    0.022_935_322_010_529_224_963_732_008_058_970,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.209_482_141_084_727_828_012_999_174_891_714,
];

const WG: [f64; 4] = [
    0.129_484_966_168_869_693_270_611_432_679_082,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.417_959_183_673_469_387_755_102_040_816_327,
];

fn sample<F: Fn(f64) -> f64>(integrand: &F, x: f64) -> Result<f64, EosError> {
    let value = integrand(x);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EosError::Numeric(
            ErrorInfo::new("eos_physics.non_finite_integrand", "integrand is not finite")
                .with_context("x", x.to_string())
                .with_context("value", value.to_string()),
        ))
    }
}

/// Single 15-point Kronrod estimate of the integral over `[a, b]` with its
/// error estimate.
pub fn kronrod<F: Fn(f64) -> f64>(integrand: &F, a: f64, b: f64) -> Result<(f64, f64), EosError> {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let f_center = sample(integrand, center)?;
    let mut kronrod = f_center * WGK[7];
    let mut gauss = f_center * WG[3];
    for (j, (&node, &weight)) in XGK.iter().zip(WGK.iter()).take(7).enumerate() {
        let offset = half * node;
        let pair = sample(integrand, center - offset)? + sample(integrand, center + offset)?;
        kronrod += weight * pair;
        if j % 2 == 1 {
            gauss += WG[j / 2] * pair;
        }
    }
    Ok((kronrod * half, ((kronrod - gauss) * half).abs()))
}

/// Integral of `integrand` over `[a, b]` to the tolerances in `config`.
///
/// Fails with a numeric error when the integrand is not finite somewhere it
/// is sampled or when bisection exceeds `config.max_depth`.
pub fn integrate<F: Fn(f64) -> f64>(integrand: F, a: f64, b: f64, config: &IntegrationConfig) -> Result<f64, EosError> {
    if a == b {
        return Ok(0.0);
    }
    if a > b {
        return integrate(integrand, b, a, config).map(|value| -value);
    }
    let (estimate, _) = kronrod(&integrand, a, b)?;
    let tolerance = config.epsabs.max(config.epsrel * estimate.abs());
    let width = b - a;

    let mut total = 0.0;
    let mut pending = vec![(a, b, 0u32)];
    while let Some((lo, hi, depth)) = pending.pop() {
        let (value, error) = kronrod(&integrand, lo, hi)?;
        let share = tolerance * (hi - lo) / width;
        if error <= share || error <= 50.0 * f64::EPSILON * value.abs() {
            total += value;
            continue;
        }
        if depth >= config.max_depth {
            return Err(EosError::Numeric(
                ErrorInfo::new("eos_physics.integration_depth", "adaptive quadrature did not converge")
                    .with_context("a", lo.to_string())
                    .with_context("b", hi.to_string())
                    .with_context("error", error.to_string())
                    .with_hint("relax epsrel or raise max_depth in the engine configuration"),
            ));
        }
        let mid = 0.5 * (lo + hi);
        pending.push((mid, hi, depth + 1));
        pending.push((lo, mid, depth + 1));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polynomials_are_exact_on_one_interval() {
        let (value, error) = kronrod(&|x: f64| x.powi(5) - 3.0 * x * x + 1.0, -1.0, 2.0).unwrap();
        assert!((value - (64.0 / 6.0 - 1.0 / 6.0 - 9.0 + 3.0)).abs() < 1e-13);
        assert!(error < 1e-12);
    }

    #[test]
    fn reversed_bounds_flip_the_sign() {
        let config = IntegrationConfig::default();
        let forward = integrate(f64::exp, 0.0, 1.0, &config).unwrap();
        let backward = integrate(f64::exp, 1.0, 0.0, &config).unwrap();
        assert_eq!(forward, -backward);
        assert!((forward - (std::f64::consts::E - 1.0)).abs() < 1e-12);
    }
}

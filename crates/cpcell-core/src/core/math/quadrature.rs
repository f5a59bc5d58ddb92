use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A Gauss-Kronrod pair on `[-1, 1]`.
///
/// Abscissae are stored for the non-negative half, largest first, with the centre node last.
/// The embedded Gauss rule uses every odd-indexed abscissa (and the centre node when the
/// Gauss order is odd).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KronrodRule {
    name: &'static str,
    abscissae: &'static [f64],
    kronrod_weights: &'static [f64],
    gauss_weights: &'static [f64],
}

/// 7-point Gauss rule embedded in a 15-point Kronrod extension.
pub const GK15: KronrodRule = KronrodRule {
    name: "G7-K15",
    abscissae: &[
        0.991_455_371_120_812_639_206_854_697_526_329,
        0.949_107_912_342_758_524_526_189_684_047_851,
        0.864_864_423_359_769_072_789_712_788_640_926,
        0.741_531_185_599_394_439_863_864_773_280_788,
        0.586_087_235_467_691_130_294_144_845_693_013,
        0.405_845_151_377_397_166_906_606_412_076_961,
        0.207_784_955_007_898_467_600_689_403_773_245,
        0.0,
    ],
    kronrod_weights: &[
        0.022_935_322_010_529_224_963_732_008_058_970,
        0.063_092_092_629_978_553_290_700_663_189_204,
        0.104_790_010_322_250_183_839_876_322_541_518,
        0.140_653_259_715_525_918_745_189_590_510_238,
        0.169_004_726_639_267_902_826_583_426_598_550,
        0.190_350_578_064_785_409_913_256_402_421_014,
        0.204_432_940_075_298_892_414_161_999_234_649,
        0.209_482_141_084_727_828_012_999_174_891_714,
    ],
    gauss_weights: &[
        0.129_484_966_168_869_693_270_611_432_679_082,
        0.279_705_391_489_276_667_901_467_771_423_780,
        0.381_830_050_505_118_944_950_369_775_488_975,
        0.417_959_183_673_469_387_755_102_040_816_327,
    ],
};

/// 10-point Gauss rule embedded in a 21-point Kronrod extension.
pub const GK21: KronrodRule = KronrodRule {
    name: "G10-K21",
    abscissae: &[
        0.995_657_163_025_808_080_735_527_280_689_003,
        0.973_906_528_517_171_720_077_964_012_084_452,
        0.930_157_491_355_708_226_001_207_180_059_508,
        0.865_063_366_688_984_510_732_096_688_423_493,
        0.780_817_726_586_416_897_063_717_578_345_042,
        0.679_409_568_299_024_406_234_327_365_114_874,
        0.562_757_134_668_604_683_339_000_099_272_694,
        0.433_395_394_129_247_190_799_265_943_165_784,
        0.294_392_862_701_460_198_131_126_603_103_866,
        0.148_874_338_981_631_210_884_826_001_129_720,
        0.0,
    ],
    kronrod_weights: &[
        0.011_694_638_867_371_874_278_064_396_062_192,
        0.032_558_162_307_964_727_478_818_972_459_390,
        0.054_755_896_574_351_996_031_381_300_244_580,
        0.075_039_674_810_919_952_767_043_140_916_190,
        0.093_125_454_583_697_605_535_065_465_083_366,
        0.109_387_158_802_297_641_899_210_590_325_805,
        0.123_491_976_262_065_851_077_208_980_529_691,
        0.134_709_217_311_473_325_928_054_001_771_707,
        0.142_775_938_577_060_080_797_094_273_138_717,
        0.147_739_104_901_338_491_374_841_515_972_068,
        0.149_445_554_002_916_905_664_936_468_389_821,
    ],
    gauss_weights: &[
        0.066_671_344_308_688_137_593_568_809_893_332,
        0.149_451_349_150_580_593_145_776_339_657_697,
        0.219_086_362_515_982_043_995_534_934_228_163,
        0.269_266_719_309_996_355_091_226_921_569_469,
        0.295_524_224_714_752_870_173_892_994_651_338,
    ],
};

/// Which Kronrod pair to integrate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuadratureRule {
    Gk15,
    #[default]
    Gk21,
}

impl QuadratureRule {
    pub fn kronrod(self) -> &'static KronrodRule {
        match self {
            QuadratureRule::Gk15 => &GK15,
            QuadratureRule::Gk21 => &GK21,
        }
    }
}

impl std::str::FromStr for QuadratureRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gk15" => Ok(QuadratureRule::Gk15),
            "gk21" => Ok(QuadratureRule::Gk21),
            other => Err(format!(
                "Unknown quadrature rule '{}'. Expected 'gk15' or 'gk21'.",
                other
            )),
        }
    }
}

/// Stopping criteria for adaptive subdivision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveConfig {
    pub absolute_tolerance: f64,
    pub relative_tolerance: f64,
    pub max_subdivisions: usize,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            absolute_tolerance: 1e-12,
            relative_tolerance: 1e-10,
            max_subdivisions: 64,
        }
    }
}

/// Result of an integration: the Kronrod estimate and the `|K - G|` error bound.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuadratureEstimate {
    pub value: f64,
    pub error: f64,
    /// Number of sub-intervals the final estimate is made of.
    pub intervals: usize,
}

impl QuadratureEstimate {
    pub fn within(&self, config: &AdaptiveConfig) -> bool {
        self.error <= config.absolute_tolerance.max(config.relative_tolerance * self.value.abs())
    }
}

#[derive(Debug, Clone, Copy)]
struct Panel {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

impl PartialEq for Panel {
    fn eq(&self, other: &Self) -> bool {
        self.error == other.error
    }
}
impl Eq for Panel {}

impl PartialOrd for Panel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.error.partial_cmp(&other.error)
    }
}

impl Ord for Panel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

impl KronrodRule {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of integrand evaluations per interval.
    pub fn order(&self) -> usize {
        2 * self.abscissae.len() - 1
    }

    /// Integrates `f` over `[a, b]` with a single application of the rule.
    pub fn integrate<F>(&self, f: F, a: f64, b: f64) -> QuadratureEstimate
    where
        F: Fn(f64) -> f64,
    {
        let (value, error) = self.apply(&f, a, b);
        QuadratureEstimate {
            value,
            error,
            intervals: 1,
        }
    }

    /// Integrates `f` over `[a, b]`, bisecting the worst interval until the tolerance in
    /// `config` is met or `config.max_subdivisions` intervals exist.
    ///
    /// The best available estimate is always returned; callers compare it against the
    /// tolerance with [`QuadratureEstimate::within`] if they need to know whether it converged.
    pub fn integrate_adaptive<F>(
        &self,
        f: F,
        a: f64,
        b: f64,
        config: &AdaptiveConfig,
    ) -> QuadratureEstimate
    where
        F: Fn(f64) -> f64,
    {
        let (value, error) = self.apply(&f, a, b);
        let mut panels = BinaryHeap::new();
        panels.push(Panel { a, b, value, error });

        let mut total_value = value;
        let mut total_error = error;
        let max_panels = config.max_subdivisions.max(1);

        while panels.len() < max_panels
            && total_error > config.absolute_tolerance.max(config.relative_tolerance * total_value.abs())
        {
            let Some(worst) = panels.pop() else {
                break;
            };
            let mid = 0.5 * (worst.a + worst.b);
            if mid <= worst.a || mid >= worst.b {
                // Interval can no longer be split in floating point.
                panels.push(worst);
                break;
            }

            let (left_value, left_error) = self.apply(&f, worst.a, mid);
            let (right_value, right_error) = self.apply(&f, mid, worst.b);

            total_value += left_value + right_value - worst.value;
            total_error += left_error + right_error - worst.error;

            panels.push(Panel {
                a: worst.a,
                b: mid,
                value: left_value,
                error: left_error,
            });
            panels.push(Panel {
                a: mid,
                b: worst.b,
                value: right_value,
                error: right_error,
            });
        }

        // Re-sum to avoid drift from the incremental updates.
        let intervals = panels.len();
        let (value, error) = panels
            .iter()
            .fold((0.0, 0.0), |(v, e), p| (v + p.value, e + p.error));

        QuadratureEstimate {
            value,
            error,
            intervals,
        }
    }

    fn apply<F>(&self, f: &F, a: f64, b: f64) -> (f64, f64)
    where
        F: Fn(f64) -> f64,
    {
        let centre = 0.5 * (a + b);
        let half_length = 0.5 * (b - a);
        let last = self.abscissae.len() - 1;

        let f_centre = f(centre);
        let mut kronrod = f_centre * self.kronrod_weights[last];
        // The centre node belongs to the Gauss rule only when its order is odd.
        let mut gauss = if self.gauss_weights.len() > last / 2 {
            f_centre * self.gauss_weights[self.gauss_weights.len() - 1]
        } else {
            0.0
        };

        for n in 0..last {
            let dx = half_length * self.abscissae[n];
            let pair = f(centre - dx) + f(centre + dx);
            kronrod += self.kronrod_weights[n] * pair;
            if n % 2 == 1 {
                gauss += self.gauss_weights[n / 2] * pair;
            }
        }

        let value = kronrod * half_length;
        let error = ((kronrod - gauss) * half_length).abs();
        (value, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn kronrod_weights_sum_to_interval_length() {
        for rule in [&GK15, &GK21] {
            let sum = rule.integrate(|_| 1.0, -1.0, 1.0).value;
            assert!(f64_approx_equal(sum, 2.0), "{} sums to {}", rule.name(), sum);
        }
    }

    #[test]
    fn gauss_weights_sum_to_interval_length() {
        for rule in [&GK15, &GK21] {
            let estimate = rule.integrate(|_| 1.0, -1.0, 1.0);
            assert!(estimate.error < TOLERANCE, "{} error {}", rule.name(), estimate.error);
        }
    }

    #[test]
    fn rule_orders_match_their_names() {
        assert_eq!(GK15.order(), 15);
        assert_eq!(GK21.order(), 21);
    }

    #[test]
    fn polynomials_within_gauss_degree_are_exact_with_vanishing_error() {
        // G10 integrates degree 19 exactly.
        let f = |x: f64| 3.0 * x.powi(19) + x.powi(12) - 2.0 * x.powi(5) + 1.0;
        let exact = |x: f64| 3.0 * x.powi(20) / 20.0 + x.powi(13) / 13.0 - x.powi(6) / 3.0 + x;
        let estimate = GK21.integrate(f, 0.0, 1.0);
        assert!(f64_approx_equal(estimate.value, exact(1.0) - exact(0.0)));
        assert!(estimate.error < 1e-10);
    }

    #[test]
    fn integrates_sine_over_half_period() {
        let estimate = GK15.integrate(f64::sin, 0.0, PI);
        assert!(f64_approx_equal(estimate.value, 2.0));
        assert_eq!(estimate.intervals, 1);
    }

    #[test]
    fn reversed_bounds_negate_the_integral() {
        let forward = GK21.integrate(f64::exp, 0.0, 1.0).value;
        let backward = GK21.integrate(f64::exp, 1.0, 0.0).value;
        assert!(f64_approx_equal(forward, -backward));
    }

    #[test]
    fn error_estimate_is_large_for_endpoint_singularity() {
        let estimate = GK15.integrate(|x: f64| x.sqrt(), 0.0, 1.0);
        assert!((estimate.value - 2.0 / 3.0).abs() <= estimate.error.max(1e-14) * 10.0);
        assert!(estimate.error > 1e-8);
    }

    #[test]
    fn adaptive_integration_converges_on_endpoint_singularity() {
        let config = AdaptiveConfig {
            absolute_tolerance: 1e-12,
            relative_tolerance: 1e-12,
            max_subdivisions: 200,
        };
        let estimate = GK21.integrate_adaptive(|x: f64| x.sqrt(), 0.0, 1.0, &config);
        assert!((estimate.value - 2.0 / 3.0).abs() < 1e-10);
        assert!(estimate.intervals > 1);
        assert!(estimate.within(&config));
    }

    #[test]
    fn adaptive_integration_stops_at_subdivision_budget() {
        let config = AdaptiveConfig {
            absolute_tolerance: 0.0,
            relative_tolerance: 0.0,
            max_subdivisions: 5,
        };
        let estimate = GK15.integrate_adaptive(|x: f64| x.sqrt(), 0.0, 1.0, &config);
        assert_eq!(estimate.intervals, 5);
        assert!((estimate.value - 2.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn adaptive_integration_on_smooth_integrand_needs_no_subdivision() {
        let config = AdaptiveConfig::default();
        let estimate = GK21.integrate_adaptive(f64::cos, 0.0, 1.0, &config);
        assert_eq!(estimate.intervals, 1);
        assert!(f64_approx_equal(estimate.value, 1f64.sin()));
    }

    #[test]
    fn quadrature_rule_parses_case_insensitively() {
        assert_eq!("GK15".parse::<QuadratureRule>(), Ok(QuadratureRule::Gk15));
        assert_eq!("gk21".parse::<QuadratureRule>(), Ok(QuadratureRule::Gk21));
        assert!("gl8".parse::<QuadratureRule>().is_err());
        assert_eq!(QuadratureRule::default().kronrod().order(), 21);
    }
}

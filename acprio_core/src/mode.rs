//! AC-load priority flag with asymmetric hysteresis.
//!
//! The flag turns on readily close to the minimum SOC, but only turns off once
//! SOC climbs all the way into the full band.

use crate::config::ControllerCfg;

/// Position of the battery SOC relative to the configured minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocBand {
    /// `soc >= minimum + soc_distance_full`
    Full,
    /// `minimum <= soc < minimum + soc_distance_full`
    Mid,
    /// `soc < minimum`
    BelowMinimum,
}

impl SocBand {
    pub fn classify(soc: f64, minimum_soc: f64, cfg: &ControllerCfg) -> Self {
        if soc >= minimum_soc + cfg.soc_distance_full {
            SocBand::Full
        } else if soc >= minimum_soc {
            SocBand::Mid
        } else {
            SocBand::BelowMinimum
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SocBand::Full => "full",
            SocBand::Mid => "mid",
            SocBand::BelowMinimum => "below_minimum",
        }
    }
}

/// Next value of the priority flag.
///
/// In the mid band the flag is only ever set (at or below
/// `minimum + soc_distance`); above that it keeps its previous value.
pub fn next_priority(
    band: SocBand,
    previous: bool,
    soc: f64,
    minimum_soc: f64,
    cfg: &ControllerCfg,
) -> bool {
    match band {
        SocBand::Full => false,
        SocBand::Mid => previous || soc <= minimum_soc + cfg.soc_distance,
        SocBand::BelowMinimum => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(20.0, SocBand::Full)]
    #[case(19.99, SocBand::Mid)]
    #[case(10.0, SocBand::Mid)]
    #[case(9.99, SocBand::BelowMinimum)]
    fn band_edges(#[case] soc: f64, #[case] expected: SocBand) {
        assert_eq!(SocBand::classify(soc, 10.0, &ControllerCfg::default()), expected);
    }

    #[rstest]
    #[case(SocBand::Full, true, 30.0, false)]
    #[case(SocBand::BelowMinimum, false, 5.0, true)]
    #[case(SocBand::Mid, false, 15.0, true)] // exactly minimum + soc_distance
    #[case(SocBand::Mid, false, 15.5, false)]
    #[case(SocBand::Mid, true, 19.0, true)] // retained
    fn transitions(
        #[case] band: SocBand,
        #[case] previous: bool,
        #[case] soc: f64,
        #[case] expected: bool,
    ) {
        let cfg = ControllerCfg::default();
        assert_eq!(next_priority(band, previous, soc, 10.0, &cfg), expected);
    }
}

//! Strike level derivation.
//!
//! Maps a reference price (typically the trailing close of a daily
//! series) into a bounded, evenly spaced band of candidate strikes, then
//! resolves each strike to tradable catalog symbols for a target
//! underlying and expiry.

use catalog::{InstrumentFilter, InstrumentRecord, filter};
use chrono::NaiveDate;
use common::Candle;
use tracing::debug;

/// Round a value to the nearest multiple of `step`.
///
/// Ties round half away from zero, so on the positive price axis this is
/// plain half-up: `round_to_step(23450.0, 100.0) == 23500.0`. A
/// non-positive step returns the value unchanged.
pub fn round_to_step(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    let ratio = value / step;
    let rounded = if ratio >= 0.0 {
        (ratio + 0.5).floor()
    } else {
        (ratio - 0.5).ceil()
    };
    rounded * step
}

/// Generate `2 * levels + 1` strikes spaced `step` apart around `center`.
///
/// The result is strictly ascending with no duplicates, and the function
/// is pure: identical inputs always produce identical output.
pub fn generate_levels(center: f64, levels: usize, step: f64) -> Vec<f64> {
    let half = levels as i64;
    (-half..=half).map(|k| center + k as f64 * step).collect()
}

/// One derived level together with the catalog rows that trade at it.
///
/// `matches` may be empty: a level with no instrument at the target
/// strike/expiry/underlying keeps its slot so callers can see the miss.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLevel {
    /// Strike level in rupees
    pub level: f64,
    /// Catalog rows at exactly this strike for the requested name/expiry
    pub matches: Vec<InstrumentRecord>,
}

/// Resolve each level against a catalog snapshot.
///
/// Output length always equals input length; zero-match levels are
/// retained with an empty match list, never dropped.
pub fn resolve(
    levels: &[f64],
    snapshot: &[InstrumentRecord],
    name: &str,
    expiry: NaiveDate,
) -> Vec<ResolvedLevel> {
    levels
        .iter()
        .map(|&level| {
            let spec = InstrumentFilter::new()
                .name(name)
                .expiry(expiry)
                .strikes([level]);
            let matches = filter(snapshot, &spec);
            if matches.is_empty() {
                debug!(level, name, "no catalog instrument at this strike");
            }
            ResolvedLevel { level, matches }
        })
        .collect()
}

/// Level derivation parameters: band half-width and strike spacing.
#[derive(Debug, Clone, Copy)]
pub struct StrikeLevelEngine {
    /// Number of levels above and below the center
    pub levels: usize,
    /// Strike spacing in rupees
    pub step: f64,
}

impl Default for StrikeLevelEngine {
    fn default() -> Self {
        Self {
            levels: 2,
            step: 100.0,
        }
    }
}

impl StrikeLevelEngine {
    /// Engine with an explicit band width and spacing
    pub fn new(levels: usize, step: f64) -> Self {
        Self { levels, step }
    }

    /// Derive the strike band from a series' trailing close.
    ///
    /// `None` on an empty series; there is no price to anchor on.
    pub fn derive(&self, series: &[Candle]) -> Option<Vec<f64>> {
        let reference = series.last()?.close;
        let center = round_to_step(reference, self.step);
        debug!(reference, center, "strike band centered");
        Some(generate_levels(center, self.levels, self.step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::Exchange;

    #[test]
    fn rounds_half_up_at_the_documented_boundary() {
        assert_eq!(round_to_step(23451.0, 100.0), 23500.0);
        assert_eq!(round_to_step(23449.0, 100.0), 23400.0);
        // tie: half away from zero
        assert_eq!(round_to_step(23450.0, 100.0), 23500.0);
    }

    #[test]
    fn rounding_is_exact_on_multiples() {
        assert_eq!(round_to_step(23400.0, 100.0), 23400.0);
        assert_eq!(round_to_step(0.0, 100.0), 0.0);
    }

    #[test]
    fn non_positive_step_is_identity() {
        assert_eq!(round_to_step(23451.0, 0.0), 23451.0);
        assert_eq!(round_to_step(23451.0, -100.0), 23451.0);
    }

    #[test]
    fn generates_the_documented_band() {
        assert_eq!(
            generate_levels(23400.0, 2, 100.0),
            vec![23200.0, 23300.0, 23400.0, 23500.0, 23600.0]
        );
    }

    #[test]
    fn band_is_strictly_ascending_and_duplicate_free() {
        let band = generate_levels(500.0, 5, 50.0);
        assert_eq!(band.len(), 11);
        assert!(band.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_levels(23400.0, 2, 100.0);
        let b = generate_levels(23400.0, 2, 100.0);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_levels_yields_just_the_center() {
        assert_eq!(generate_levels(23400.0, 0, 100.0), vec![23400.0]);
    }

    fn option_row(symbol: &str, token: &str, strike: f64, expiry: NaiveDate) -> InstrumentRecord {
        InstrumentRecord {
            symbol: symbol.to_string(),
            token: token.to_string(),
            exchange_segment: Exchange::Nfo,
            name: "NIFTY".to_string(),
            strike,
            expiry: Some(expiry),
        }
    }

    #[test]
    fn resolve_keeps_empty_levels_in_place() {
        let expiry = NaiveDate::from_ymd_opt(2025, 3, 27).unwrap();
        let snapshot = vec![
            option_row("NIFTY27MAR2523300CE", "51100", 23300.0, expiry),
            option_row("NIFTY27MAR2523300PE", "51101", 23300.0, expiry),
            option_row("NIFTY27MAR2523500CE", "51140", 23500.0, expiry),
        ];
        let band = generate_levels(23400.0, 2, 100.0);

        let resolved = resolve(&band, &snapshot, "NIFTY", expiry);

        assert_eq!(resolved.len(), band.len());
        assert_eq!(resolved[0].matches.len(), 0); // 23200: no instrument
        assert_eq!(resolved[1].matches.len(), 2); // 23300: CE and PE
        assert_eq!(resolved[2].matches.len(), 0); // 23400: no instrument
        assert_eq!(resolved[3].matches.len(), 1); // 23500: CE only
        assert_eq!(resolved[4].matches.len(), 0); // 23600: no instrument
        assert_eq!(resolved[1].level, 23300.0);
    }

    #[test]
    fn resolve_preserves_tokens_verbatim() {
        let expiry = NaiveDate::from_ymd_opt(2025, 3, 27).unwrap();
        let snapshot = vec![option_row("NIFTY27MAR2523400CE", "051120", 23400.0, expiry)];
        let resolved = resolve(&[23400.0], &snapshot, "NIFTY", expiry);
        assert_eq!(resolved[0].matches[0].token, "051120");
    }

    #[test]
    fn resolve_respects_expiry_exactly() {
        let march = NaiveDate::from_ymd_opt(2025, 3, 27).unwrap();
        let april = NaiveDate::from_ymd_opt(2025, 4, 3).unwrap();
        let snapshot = vec![option_row("NIFTY03APR2523400CE", "60231", 23400.0, april)];
        let resolved = resolve(&[23400.0], &snapshot, "NIFTY", march);
        assert!(resolved[0].matches.is_empty());
    }

    fn candle(close: f64) -> Candle {
        Candle {
            timestamp: NaiveDate::from_ymd_opt(2025, 3, 21)
                .unwrap()
                .and_hms_opt(15, 30, 0)
                .unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    #[test]
    fn engine_derives_from_the_trailing_close() {
        let series = vec![candle(23100.0), candle(23451.0)];
        let band = StrikeLevelEngine::default().derive(&series).unwrap();
        assert_eq!(band, vec![23300.0, 23400.0, 23500.0, 23600.0, 23700.0]);
    }

    #[test]
    fn engine_has_no_anchor_on_an_empty_series() {
        assert!(StrikeLevelEngine::default().derive(&[]).is_none());
    }
}

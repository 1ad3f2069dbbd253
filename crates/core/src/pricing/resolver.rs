//! Rate resolution for the two activity kinds.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::activity::{ActivityKind, Unit};
use crate::ledger::rate_from_total;

use super::error::PricingError;
use super::quote::{RateQuote, RateSource};
use super::scoring::{EmissionScorer, ScoringRequest};

/// Port for the local waste rate table.
///
/// Implemented by the rates repository in `daura-db`; tests use in-memory
/// maps. `Ok(None)` means no active rate covers the code; store failures
/// surface as [`PricingError::RateUnavailable`].
#[async_trait]
pub trait RateLookup: Send + Sync {
    /// Finds the active points-per-kg rate for a waste category code.
    async fn waste_rate(&self, code: &str) -> Result<Option<Decimal>, PricingError>;
}

/// Resolves the per-unit rate for one submission.
///
/// Waste sales hit the local rate table. Emission reports make exactly one
/// scoring call, bounded by the configured timeout; the per-unit rate is
/// derived from the returned total so the entry stays auditable. No
/// caching and no internal retries: a submission that cannot be priced
/// fails fast.
pub struct RateResolver {
    rates: Arc<dyn RateLookup>,
    scorer: Arc<dyn EmissionScorer>,
    scoring_timeout: Duration,
}

impl RateResolver {
    /// Creates a resolver over the two rate sources.
    #[must_use]
    pub fn new(
        rates: Arc<dyn RateLookup>,
        scorer: Arc<dyn EmissionScorer>,
        scoring_timeout: Duration,
    ) -> Self {
        Self {
            rates,
            scorer,
            scoring_timeout,
        }
    }

    /// Resolves a rate quote for one submission.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::RateNotFound`] when no active rate covers
    /// the code, and [`PricingError::RateUnavailable`] when the source
    /// fails, times out, or returns an unusable total.
    pub async fn resolve(
        &self,
        kind: ActivityKind,
        code: &str,
        quantity: Decimal,
        unit: Unit,
    ) -> Result<RateQuote, PricingError> {
        match kind {
            ActivityKind::WasteSale => self.resolve_local(code).await,
            ActivityKind::EmissionReport => self.resolve_scored(code, quantity, unit).await,
        }
    }

    async fn resolve_local(&self, code: &str) -> Result<RateQuote, PricingError> {
        match self.rates.waste_rate(code).await? {
            Some(rate) => Ok(RateQuote::new(rate, RateSource::LocalTable)),
            None => Err(PricingError::RateNotFound {
                code: code.to_string(),
            }),
        }
    }

    async fn resolve_scored(
        &self,
        code: &str,
        quantity: Decimal,
        unit: Unit,
    ) -> Result<RateQuote, PricingError> {
        let request = ScoringRequest {
            activity_id: code.to_string(),
            quantity,
            unit,
        };

        let total = tokio::time::timeout(self.scoring_timeout, self.scorer.score(&request))
            .await
            .map_err(|_| {
                PricingError::RateUnavailable(format!(
                    "scoring call exceeded {}ms",
                    self.scoring_timeout.as_millis()
                ))
            })?
            .map_err(|err| PricingError::RateUnavailable(err.to_string()))?;

        // Zero quantities are rejected upstream by validation.
        let rate = rate_from_total(total, quantity).ok_or_else(|| {
            PricingError::RateUnavailable("cannot derive rate for zero quantity".to_string())
        })?;

        Ok(RateQuote::new(rate, RateSource::ExternalService))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal_macros::dec;

    use crate::pricing::scoring::ScoringError;

    use super::*;

    struct TableLookup(HashMap<String, Decimal>);

    impl TableLookup {
        fn with(code: &str, rate: Decimal) -> Self {
            Self(HashMap::from([(code.to_string(), rate)]))
        }
    }

    #[async_trait]
    impl RateLookup for TableLookup {
        async fn waste_rate(&self, code: &str) -> Result<Option<Decimal>, PricingError> {
            Ok(self.0.get(code).copied())
        }
    }

    struct FixedScorer(Decimal);

    #[async_trait]
    impl EmissionScorer for FixedScorer {
        async fn score(&self, _request: &ScoringRequest) -> Result<Decimal, ScoringError> {
            Ok(self.0)
        }
    }

    struct DownScorer;

    #[async_trait]
    impl EmissionScorer for DownScorer {
        async fn score(&self, _request: &ScoringRequest) -> Result<Decimal, ScoringError> {
            Err(ScoringError::Status { status: 503 })
        }
    }

    struct HangingScorer;

    #[async_trait]
    impl EmissionScorer for HangingScorer {
        async fn score(&self, _request: &ScoringRequest) -> Result<Decimal, ScoringError> {
            std::future::pending().await
        }
    }

    fn resolver(lookup: impl RateLookup + 'static, scorer: impl EmissionScorer + 'static) -> RateResolver {
        RateResolver::new(
            Arc::new(lookup),
            Arc::new(scorer),
            Duration::from_millis(50),
        )
    }

    #[tokio::test]
    async fn test_waste_sale_resolves_from_local_table() {
        let resolver = resolver(TableLookup::with("pet_plastic", dec!(10)), FixedScorer(dec!(0)));

        let quote = resolver
            .resolve(ActivityKind::WasteSale, "pet_plastic", dec!(3.5), Unit::Kg)
            .await
            .unwrap();

        assert_eq!(quote.rate, dec!(10));
        assert_eq!(quote.source, RateSource::LocalTable);
    }

    #[tokio::test]
    async fn test_unknown_waste_code_is_rate_not_found() {
        let resolver = resolver(TableLookup::with("pet_plastic", dec!(10)), FixedScorer(dec!(0)));

        let err = resolver
            .resolve(ActivityKind::WasteSale, "styrofoam", dec!(1), Unit::Kg)
            .await
            .unwrap_err();

        assert!(matches!(err, PricingError::RateNotFound { code } if code == "styrofoam"));
    }

    #[tokio::test]
    async fn test_emission_report_derives_per_unit_rate() {
        // 52.5 kg CO2e for 120 kWh comes back as 0.4375 per kWh.
        let resolver = resolver(TableLookup(HashMap::new()), FixedScorer(dec!(52.5)));

        let quote = resolver
            .resolve(ActivityKind::EmissionReport, "electricity", dec!(120), Unit::Kwh)
            .await
            .unwrap();

        assert_eq!(quote.rate, dec!(0.4375));
        assert_eq!(quote.source, RateSource::ExternalService);
    }

    #[tokio::test]
    async fn test_scorer_failure_is_rate_unavailable() {
        let resolver = resolver(TableLookup(HashMap::new()), DownScorer);

        let err = resolver
            .resolve(ActivityKind::EmissionReport, "electricity", dec!(10), Unit::Kwh)
            .await
            .unwrap_err();

        assert!(matches!(err, PricingError::RateUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_scoring_timeout_is_rate_unavailable() {
        let resolver = resolver(TableLookup(HashMap::new()), HangingScorer);

        let err = resolver
            .resolve(ActivityKind::EmissionReport, "diesel", dec!(5), Unit::Liter)
            .await
            .unwrap_err();

        assert!(matches!(err, PricingError::RateUnavailable(_)));
    }

    #[tokio::test]
    async fn test_emission_path_never_touches_rate_table() {
        // An empty table must not matter for scored submissions.
        let resolver = resolver(TableLookup(HashMap::new()), FixedScorer(dec!(9)));

        let quote = resolver
            .resolve(ActivityKind::EmissionReport, "petrol", dec!(3), Unit::Liter)
            .await
            .unwrap();

        assert_eq!(quote.rate, dec!(3));
    }
}

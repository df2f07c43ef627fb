//! # Engine Configuration
//!
//! The configuration surface the service layer injects: assurance-tier
//! weights, the anti-collusion window, and the certificate format version.
//! Signing keys are never part of configuration; they are passed per call.
//!
//! Deserializes from camelCase keys. Missing fields take defaults, so an
//! empty document is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::attestation::AssuranceTier;
use crate::error::ValidationError;

/// Scoring weight per assurance tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TierWeights {
    pub biometric: f64,
    pub ussd: f64,
    pub cso_mediated: f64,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            biometric: AssuranceTier::Biometric.default_weight(),
            ussd: AssuranceTier::Ussd.default_weight(),
            cso_mediated: AssuranceTier::CsoMediated.default_weight(),
        }
    }
}

impl TierWeights {
    /// Weight for a tier.
    pub fn weight(&self, tier: AssuranceTier) -> f64 {
        match tier {
            AssuranceTier::Biometric => self.biometric,
            AssuranceTier::Ussd => self.ussd,
            AssuranceTier::CsoMediated => self.cso_mediated,
        }
    }

    /// Every weight must be finite and within `[0, 1]`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for tier in [
            AssuranceTier::Biometric,
            AssuranceTier::Ussd,
            AssuranceTier::CsoMediated,
        ] {
            let w = self.weight(tier);
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                return Err(ValidationError::InvalidConfig(format!(
                    "weight for {tier} must be within [0, 1], got {w}"
                )));
            }
        }
        Ok(())
    }
}

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Citizen scoring weights.
    pub tier_weights: TierWeights,
    /// Number of most recent rotation rounds on a project whose assignees
    /// are excluded from new draws.
    pub anti_collusion_window: u32,
    /// Version string stamped on issued certificates.
    pub certificate_version: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tier_weights: TierWeights::default(),
            anti_collusion_window: 3,
            certificate_version: "1.0".to_string(),
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidConfig`] for out-of-range weights,
    /// a zero anti-collusion window, or an empty certificate version.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.tier_weights.validate()?;
        if self.anti_collusion_window == 0 {
            return Err(ValidationError::InvalidConfig(
                "antiCollusionWindow must be at least 1".to_string(),
            ));
        }
        if self.certificate_version.trim().is_empty() {
            return Err(ValidationError::InvalidConfig(
                "certificateVersion must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

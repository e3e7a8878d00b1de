//! Risk scoring of a simulated distribution.
//!
//! Four checks award points (0..=11 in total):
//!
//! | check                       | 3      | 2      | 1      |
//! |-----------------------------|--------|--------|--------|
//! | probability profitable (%)  | >= 80  | >= 60  | >= 50  |
//! | probability of ruin (%)     | < 1    | < 5    | < 10   |
//! | median max drawdown (%)     | < 10   | < 20   | < 30   |
//! | p95 loss streak             |        | <= 5   | <= 8   |
//!
//! A check that awards nothing records a concern.

use serde::{Deserialize, Serialize};

/// Risk label derived from the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskRating {
    Low,
    Moderate,
    High,
    #[default]
    VeryHigh,
}

impl RiskRating {
    pub fn from_score(score: u32) -> Self {
        match score {
            9.. => RiskRating::Low,
            6..=8 => RiskRating::Moderate,
            3..=5 => RiskRating::High,
            _ => RiskRating::VeryHigh,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskRating::Low => "LOW RISK",
            RiskRating::Moderate => "MODERATE RISK",
            RiskRating::High => "HIGH RISK",
            RiskRating::VeryHigh => "VERY HIGH RISK",
        }
    }

    /// Deployment advice for this tier.
    pub fn advice(self) -> &'static str {
        match self {
            RiskRating::Low => "Stable strategy. Deploy with normal sizing.",
            RiskRating::Moderate => "Acceptable strategy. Deploy with reduced sizing (50%).",
            RiskRating::High => "Risky strategy. Micro size only, or revise the parameters.",
            RiskRating::VeryHigh => "DO NOT DEPLOY. Strategy is too risky.",
        }
    }
}

impl std::fmt::Display for RiskRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of the scoring pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub rating: RiskRating,
    pub concerns: Vec<String>,
}

impl RiskAssessment {
    pub fn evaluate(
        probability_profitable: f64,
        probability_of_ruin: f64,
        median_max_drawdown: f64,
        worst_loss_streak_95pct: f64,
    ) -> Self {
        let mut score = 0;
        let mut concerns = Vec::new();

        score += if probability_profitable >= 80.0 {
            3
        } else if probability_profitable >= 60.0 {
            2
        } else if probability_profitable >= 50.0 {
            1
        } else {
            concerns.push("Probability of profit below 50%".to_string());
            0
        };

        score += if probability_of_ruin < 1.0 {
            3
        } else if probability_of_ruin < 5.0 {
            2
        } else if probability_of_ruin < 10.0 {
            1
        } else {
            concerns.push(format!("High risk of ruin ({probability_of_ruin:.1}%)"));
            0
        };

        score += if median_max_drawdown < 10.0 {
            3
        } else if median_max_drawdown < 20.0 {
            2
        } else if median_max_drawdown < 30.0 {
            1
        } else {
            concerns.push(format!("High median drawdown ({median_max_drawdown:.1}%)"));
            0
        };

        score += if worst_loss_streak_95pct <= 5.0 {
            2
        } else if worst_loss_streak_95pct <= 8.0 {
            1
        } else {
            concerns.push(format!(
                "Long losing streaks possible ({worst_loss_streak_95pct:.0})"
            ));
            0
        };

        Self {
            score,
            rating: RiskRating::from_score(score),
            concerns,
        }
    }

    /// Tier advice followed by the itemized concerns, if any.
    pub fn recommendation(&self) -> String {
        let mut text = self.rating.advice().to_string();
        if !self.concerns.is_empty() {
            text.push_str("\n\nPoints of attention:");
            for concern in &self.concerns {
                text.push_str("\n  - ");
                text.push_str(concern);
            }
        }
        text
    }
}

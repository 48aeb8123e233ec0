//! Theme-to-category bias.
//!
//! Each tome theme carries a probability distribution over card categories.
//! One uniform draw is compared against cumulative thresholds in the fixed order
//! math, science, logic; anything past the first two thresholds is logic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::TomeType;
use crate::DomainError;

/// Subject category a card teaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Math,
    Science,
    Logic,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Math => "math",
            Category::Science => "science",
            Category::Logic => "logic",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "math" => Ok(Category::Math),
            "science" => Ok(Category::Science),
            "logic" => Ok(Category::Logic),
            other => Err(DomainError::parse(format!("Unknown category: {}", other))),
        }
    }
}

/// Category distribution for one theme. Weights sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    math: f64,
    science: f64,
    logic: f64,
}

impl CategoryWeights {
    const SUM_TOLERANCE: f64 = 1e-6;

    pub fn new(math: f64, science: f64, logic: f64) -> Result<Self, DomainError> {
        if [math, science, logic].iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(DomainError::validation(
                "Category weights must be finite and non-negative",
            ));
        }
        let sum = math + science + logic;
        if (sum - 1.0).abs() > Self::SUM_TOLERANCE {
            return Err(DomainError::validation(format!(
                "Category weights must sum to 1.0, got {}",
                sum
            )));
        }
        Ok(Self {
            math,
            science,
            logic,
        })
    }

    /// Even split, used when nothing better is configured.
    pub fn uniform() -> Self {
        Self {
            math: 1.0 / 3.0,
            science: 1.0 / 3.0,
            logic: 1.0 / 3.0,
        }
    }

    pub fn math(&self) -> f64 {
        self.math
    }

    pub fn science(&self) -> f64 {
        self.science
    }

    pub fn logic(&self) -> f64 {
        self.logic
    }

    /// Category for a uniform draw in `[0, 1)`.
    pub fn pick(&self, roll: f64) -> Category {
        if roll < self.math {
            Category::Math
        } else if roll < self.math + self.science {
            Category::Science
        } else {
            Category::Logic
        }
    }
}

/// Chooses a category for a theme, falling back to the default theme's weights.
#[derive(Debug, Clone)]
pub struct ThemeBiasSelector {
    tables: HashMap<String, CategoryWeights>,
    default_weights: CategoryWeights,
}

impl ThemeBiasSelector {
    pub fn new(default_weights: CategoryWeights) -> Self {
        Self {
            tables: HashMap::new(),
            default_weights,
        }
    }

    pub fn with_theme(mut self, theme: impl Into<String>, weights: CategoryWeights) -> Self {
        self.tables.insert(theme.into(), weights);
        self
    }

    /// Weights for `theme`; unknown themes get the default weights.
    pub fn weights_for(&self, theme: &str) -> &CategoryWeights {
        match self.tables.get(theme) {
            Some(weights) => weights,
            None => &self.default_weights,
        }
    }

    pub fn knows(&self, theme: &str) -> bool {
        self.tables.contains_key(theme)
    }

    pub fn select(&self, theme: &str, roll: f64) -> Category {
        self.weights_for(theme).pick(roll)
    }
}

impl Default for ThemeBiasSelector {
    /// The built-in tome tables. `standard` doubles as the fallback.
    fn default() -> Self {
        let table = |math, science, logic| CategoryWeights {
            math,
            science,
            logic,
        };
        let standard = CategoryWeights::uniform();
        Self::new(standard)
            .with_theme(TomeType::Standard.as_str(), standard)
            .with_theme(TomeType::Fire.as_str(), table(0.2, 0.6, 0.2))
            .with_theme(TomeType::Water.as_str(), table(0.25, 0.5, 0.25))
            .with_theme(TomeType::Earth.as_str(), table(0.3, 0.5, 0.2))
            .with_theme(TomeType::Air.as_str(), table(0.2, 0.4, 0.4))
            .with_theme(TomeType::Logic.as_str(), table(0.15, 0.15, 0.7))
    }
}

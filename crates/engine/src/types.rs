//! Vocabulary types shared between the engine and the operation layer.

use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

use crate::error::{EngineError, Result};

/// Time-bucket resolution of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grain {
    #[serde(rename = "Y")]
    Yearly,
    #[serde(rename = "Q")]
    Quarterly,
    #[serde(rename = "M")]
    Monthly,
}

impl Grain {
    /// Bucket width in months.
    #[must_use]
    pub fn months(self) -> u32 {
        match self {
            Self::Yearly => 12,
            Self::Quarterly => 3,
            Self::Monthly => 1,
        }
    }

    pub fn parse(c: char) -> Result<Self> {
        match c {
            'Y' | 'y' => Ok(Self::Yearly),
            'Q' | 'q' => Ok(Self::Quarterly),
            'M' | 'm' => Ok(Self::Monthly),
            other => Err(EngineError::unsupported(format!(
                "unknown grain '{other}', expected Y, Q, or M"
            ))),
        }
    }

    /// Parse a grain spec: `"OQDY"` sets each axis separately, a bare
    /// grain letter (`"Q"`) applies to both.
    pub fn parse_spec(spec: &str) -> Result<(Self, Self)> {
        let chars: Vec<char> = spec.chars().collect();
        match chars.as_slice() {
            [g] => {
                let grain = Self::parse(*g)?;
                Ok((grain, grain))
            },
            ['O' | 'o', og, 'D' | 'd', dg] => Ok((Self::parse(*og)?, Self::parse(*dg)?)),
            _ => Err(EngineError::unsupported(format!(
                "bad grain spec '{spec}', expected e.g. \"OQDQ\" or \"Q\""
            ))),
        }
    }
}

impl fmt::Display for Grain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Yearly => 'Y',
            Self::Quarterly => 'Q',
            Self::Monthly => 'M',
        };
        write!(f, "{c}")
    }
}

/// Comparison operator for axis and index filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparator {
    /// Evaluate against any ordered pair.
    pub fn eval<T: PartialOrd>(self, left: &T, right: &T) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
            Self::Lt => left < right,
            Self::Le => left <= right,
        }
    }
}

/// Reduction applied by a group-by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Mean,
    Std,
    Var,
    Median,
    Min,
    Max,
    Prod,
}

/// Axis a trend rate runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendAxis {
    Origin,
    Valuation,
}

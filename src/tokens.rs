//! Fixed enumeration tables mapping domain values to their header tokens.
//!
//! The tables are closed: every case is a compile-time constant and unknown
//! tokens fail with [`CompositeError::UnknownToken`].

use crate::{CompositeError, CompositeResult};

/// Coverage-radius classification of the contributing radars.
///
/// Encoded as a 2-byte token in the `VS` header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxRange {
    /// 100 km and 128 km (mixed).
    Mixed100And128,
    /// 100 km.
    R100,
    /// 128 km.
    R128,
    /// 150 km.
    R150,
}

impl MaxRange {
    /// The 2-byte token recorded in the `VS` header field.
    pub fn token(self) -> &'static str {
        match self {
            Self::Mixed100And128 => " 0",
            Self::R100 => " 1",
            Self::R128 => " 2",
            Self::R150 => " 3",
        }
    }

    /// Looks a class up by its header token.
    pub fn from_token(token: &str) -> CompositeResult<Self> {
        match token {
            " 0" => Ok(Self::Mixed100And128),
            " 1" => Ok(Self::R100),
            " 2" => Ok(Self::R128),
            " 3" => Ok(Self::R150),
            _ => Err(CompositeError::UnknownToken(token.to_string())),
        }
    }
}

/// Numeric precision class: physical units per raw magnitude unit.
///
/// Encoded as a 5-byte token in the `PR` header field. The set is closed;
/// precisions outside it are unrepresentable in the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// 0.01 units per raw unit.
    Hundredth,
    /// 0.1 units per raw unit.
    Tenth,
    /// 1.0 units per raw unit.
    One,
}

impl Precision {
    /// The scale factor applied to raw magnitudes.
    pub fn factor(self) -> f64 {
        match self {
            Self::Hundredth => 0.01,
            Self::Tenth => 0.1,
            Self::One => 1.0,
        }
    }

    /// The 5-byte token recorded in the `PR` header field.
    pub fn token(self) -> &'static str {
        match self {
            Self::Hundredth => " E-02",
            Self::Tenth => " E-01",
            Self::One => " E-00",
        }
    }

    /// Looks a precision class up by its header token.
    pub fn from_token(token: &str) -> CompositeResult<Self> {
        match token {
            " E-02" => Ok(Self::Hundredth),
            " E-01" => Ok(Self::Tenth),
            " E-00" => Ok(Self::One),
            _ => Err(CompositeError::UnknownToken(token.to_string())),
        }
    }
}

/// Converts a scale factor to its precision class.
impl TryFrom<f64> for Precision {
    type Error = CompositeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 0.01 {
            Ok(Self::Hundredth)
        } else if value == 0.1 {
            Ok(Self::Tenth)
        } else if value == 1.0 {
            Ok(Self::One)
        } else {
            Err(CompositeError::UnknownToken(value.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_range_tokens_round_trip() {
        for class in [
            MaxRange::Mixed100And128,
            MaxRange::R100,
            MaxRange::R128,
            MaxRange::R150,
        ] {
            assert_eq!(MaxRange::from_token(class.token()).unwrap(), class);
        }
    }

    #[test]
    fn precision_tokens_round_trip() {
        for class in [Precision::Hundredth, Precision::Tenth, Precision::One] {
            assert_eq!(Precision::from_token(class.token()).unwrap(), class);
        }
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert!(matches!(
            MaxRange::from_token(" 7"),
            Err(CompositeError::UnknownToken(_))
        ));
        assert!(matches!(
            Precision::from_token(" E-03"),
            Err(CompositeError::UnknownToken(_))
        ));
    }

    #[test]
    fn unsupported_scale_factor_is_rejected() {
        assert!(Precision::try_from(0.1).is_ok());
        assert!(matches!(
            Precision::try_from(0.5),
            Err(CompositeError::UnknownToken(_))
        ));
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Facial expression labels reported by the expression classifier.
///
/// Declaration order is the canonical order: it drives iteration over
/// scores, tie-breaking in dominant selection, and `Ord`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
    Contempt,
}

impl Expression {
    pub const ALL: [Expression; 8] = [
        Expression::Neutral,
        Expression::Happy,
        Expression::Sad,
        Expression::Angry,
        Expression::Fearful,
        Expression::Disgusted,
        Expression::Surprised,
        Expression::Contempt,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Expression::Neutral => "neutral",
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Angry => "angry",
            Expression::Fearful => "fearful",
            Expression::Disgusted => "disgusted",
            Expression::Surprised => "surprised",
            Expression::Contempt => "contempt",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown expression label: {0:?}")]
pub struct UnknownExpression(pub String);

impl FromStr for Expression {
    type Err = UnknownExpression;

    /// Accepts the canonical labels and the FER+ class names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neutral" => Ok(Expression::Neutral),
            "happy" | "happiness" => Ok(Expression::Happy),
            "sad" | "sadness" => Ok(Expression::Sad),
            "angry" | "anger" => Ok(Expression::Angry),
            "fearful" | "fear" => Ok(Expression::Fearful),
            "disgusted" | "disgust" => Ok(Expression::Disgusted),
            "surprised" | "surprise" => Ok(Expression::Surprised),
            "contempt" => Ok(Expression::Contempt),
            _ => Err(UnknownExpression(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_all_is_in_declaration_order() {
        let mut sorted = Expression::ALL;
        sorted.sort();
        assert_eq!(sorted, Expression::ALL);
    }

    #[test]
    fn test_label_round_trips_through_from_str() {
        for expr in Expression::ALL {
            assert_eq!(expr.label().parse::<Expression>().unwrap(), expr);
        }
    }

    #[rstest]
    #[case::happiness("happiness", Expression::Happy)]
    #[case::sadness("sadness", Expression::Sad)]
    #[case::anger("anger", Expression::Angry)]
    #[case::fear("fear", Expression::Fearful)]
    #[case::disgust("disgust", Expression::Disgusted)]
    #[case::surprise("surprise", Expression::Surprised)]
    #[case::uppercase("HAPPY", Expression::Happy)]
    #[case::padded(" sad ", Expression::Sad)]
    fn test_parses_aliases(#[case] input: &str, #[case] expected: Expression) {
        assert_eq!(input.parse::<Expression>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_label_is_error() {
        let err = "confused".parse::<Expression>().unwrap_err();
        assert_eq!(err, UnknownExpression("confused".to_string()));
    }

    #[test]
    fn test_display_matches_label() {
        assert_eq!(Expression::Surprised.to_string(), "surprised");
    }

    #[test]
    fn test_serde_uses_lowercase_labels() {
        let json = serde_json::to_string(&Expression::Angry).unwrap();
        assert_eq!(json, "\"angry\"");
    }
}

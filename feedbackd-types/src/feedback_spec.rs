use crate::ColorTag;

/// One (profile, event-name) → Feedback mapping entry, as read from a theme file.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum FeedbackSpec {
    Dummy,
    Sound(SoundSpec),
    VibraRumble(VibraRumbleSpec),
    VibraPeriodic(VibraPeriodicSpec),
    VibraPattern(VibraPatternSpec),
    Led(LedSpec),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SoundSpec {
    #[serde(rename = "event-name")]
    pub event_name: String,
    #[serde(rename = "media-role", default = "default_media_role")]
    pub media_role: String,
}

fn default_media_role() -> String {
    "event".to_string()
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VibraRumbleSpec {
    pub count: u32,
    pub pause: u32,
    pub duration: u32,
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VibraPeriodicSpec {
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VibraPatternSpec {
    pub magnitudes: Vec<f64>,
    pub durations: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LedSpec {
    pub color: String,
    pub frequency: u32,
    #[serde(rename = "max-brightness", default = "default_max_brightness")]
    pub max_brightness: u32,
}

fn default_max_brightness() -> u32 {
    100
}

/// Errors a [`FeedbackSpec`] can fail validation with before an event is
/// even constructed — these map to the RPC-level `InvalidArgument` error.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecValidationError {
    MagnitudeOutOfRange(f64),
    MismatchedPatternLengths { magnitudes: usize, durations: usize },
    EmptyPattern,
    UnknownColor(String),
    BrightnessOutOfRange(u32),
}

impl std::fmt::Display for SpecValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecValidationError::MagnitudeOutOfRange(m) => write!(f, "magnitude {} out of range [0,1]", m),
            SpecValidationError::MismatchedPatternLengths { magnitudes, durations } => write!(
                f,
                "pattern arrays have mismatched lengths: {} magnitudes, {} durations",
                magnitudes, durations
            ),
            SpecValidationError::EmptyPattern => write!(f, "pattern must have at least one step"),
            SpecValidationError::UnknownColor(c) => write!(f, "unknown color: {}", c),
            SpecValidationError::BrightnessOutOfRange(b) => write!(f, "max-brightness {} out of range [0,100]", b),
        }
    }
}

impl FeedbackSpec {
    /// Validate invariants that the theme file can violate but the type
    /// system can't express: magnitude ranges, matched pattern array
    /// lengths, and known color names.
    pub fn validate(&self) -> Result<(), SpecValidationError> {
        match self {
            FeedbackSpec::Dummy => Ok(()),
            FeedbackSpec::Sound(_) => Ok(()),
            FeedbackSpec::VibraRumble(r) => validate_magnitude(r.magnitude),
            FeedbackSpec::VibraPeriodic(p) => validate_magnitude(p.magnitude),
            FeedbackSpec::VibraPattern(p) => {
                if p.magnitudes.is_empty() || p.durations.is_empty() {
                    return Err(SpecValidationError::EmptyPattern);
                }
                if p.magnitudes.len() != p.durations.len() {
                    return Err(SpecValidationError::MismatchedPatternLengths {
                        magnitudes: p.magnitudes.len(),
                        durations: p.durations.len(),
                    });
                }
                for m in &p.magnitudes {
                    validate_magnitude(*m)?;
                }
                Ok(())
            }
            FeedbackSpec::Led(l) => {
                if ColorTag::parse(&l.color).is_none() {
                    return Err(SpecValidationError::UnknownColor(l.color.clone()));
                }
                if l.max_brightness > 100 {
                    return Err(SpecValidationError::BrightnessOutOfRange(l.max_brightness));
                }
                Ok(())
            }
        }
    }
}

fn validate_magnitude(magnitude: f64) -> Result<(), SpecValidationError> {
    if (0.0..=1.0).contains(&magnitude) {
        Ok(())
    } else {
        Err(SpecValidationError::MagnitudeOutOfRange(magnitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_magnitude() {
        let spec = FeedbackSpec::VibraPeriodic(VibraPeriodicSpec { magnitude: 1.5 });
        assert_eq!(spec.validate(), Err(SpecValidationError::MagnitudeOutOfRange(1.5)));
    }

    #[test]
    fn rejects_mismatched_pattern_lengths() {
        let spec = FeedbackSpec::VibraPattern(VibraPatternSpec {
            magnitudes: vec![0.1, 0.2],
            durations: vec![100],
        });
        assert_eq!(
            spec.validate(),
            Err(SpecValidationError::MismatchedPatternLengths { magnitudes: 2, durations: 1 })
        );
    }

    #[test]
    fn rejects_empty_pattern() {
        let spec = FeedbackSpec::VibraPattern(VibraPatternSpec { magnitudes: vec![], durations: vec![] });
        assert_eq!(spec.validate(), Err(SpecValidationError::EmptyPattern));
    }

    #[test]
    fn rejects_unknown_color() {
        let spec = FeedbackSpec::Led(LedSpec { color: "purple".into(), frequency: 1000, max_brightness: 100 });
        assert_eq!(spec.validate(), Err(SpecValidationError::UnknownColor("purple".into())));
    }

    #[test]
    fn accepts_valid_sound_spec() {
        let spec = FeedbackSpec::Sound(SoundSpec { event_name: "click".into(), media_role: default_media_role() });
        assert_eq!(spec.validate(), Ok(()));
    }

    #[test]
    fn deserializes_theme_json_variant() {
        let json = r#"{"type":"VibraRumble","count":3,"pause":50,"duration":200,"magnitude":1.0}"#;
        let spec: FeedbackSpec = serde_json::from_str(json).unwrap();
        assert_eq!(
            spec,
            FeedbackSpec::VibraRumble(VibraRumbleSpec { count: 3, pause: 50, duration: 200, magnitude: 1.0 })
        );
    }
}

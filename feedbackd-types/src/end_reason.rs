/// Why a feedback (or an event) ended.
///
/// Ordering matters: when several end causes race, the reported reason is
/// the maximum under `NotFound > Expired > Explicit > Natural`.
///
/// Declaration order drives the derived `Ord` (and therefore `merge`), so
/// it deliberately does NOT match the wire encoding below — see
/// [`as_wire`](EndReason::as_wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum EndReason {
    Natural,
    Explicit,
    Expired,
    NotFound,
}

impl EndReason {
    /// Encode as the `u32` wire value used by the `FeedbackEnded` signal.
    pub fn as_wire(self) -> u32 {
        match self {
            EndReason::Natural => 0,
            EndReason::Expired => 1,
            EndReason::Explicit => 2,
            EndReason::NotFound => 3,
        }
    }

    /// Fold a new cause into an existing reason, keeping the higher-precedence one.
    pub fn merge(self, other: EndReason) -> EndReason {
        self.max(other)
    }
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EndReason::Natural => "natural",
            EndReason::Expired => "expired",
            EndReason::Explicit => "explicit",
            EndReason::NotFound => "not-found",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_order() {
        assert!(EndReason::NotFound > EndReason::Expired);
        assert!(EndReason::Expired > EndReason::Explicit);
        assert!(EndReason::Explicit > EndReason::Natural);
    }

    #[test]
    fn merge_keeps_higher_precedence() {
        assert_eq!(EndReason::Natural.merge(EndReason::Expired), EndReason::Expired);
        assert_eq!(EndReason::NotFound.merge(EndReason::Explicit), EndReason::NotFound);
        assert_eq!(EndReason::Explicit.merge(EndReason::Explicit), EndReason::Explicit);
    }

    #[test]
    fn wire_values_match_spec() {
        assert_eq!(EndReason::Natural.as_wire(), 0);
        assert_eq!(EndReason::Expired.as_wire(), 1);
        assert_eq!(EndReason::Explicit.as_wire(), 2);
        assert_eq!(EndReason::NotFound.as_wire(), 3);
    }
}

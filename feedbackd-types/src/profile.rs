/// Active feedback level. Selects which theme profile slices are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileLevel {
    Full,
    Quiet,
    Silent,
}

impl ProfileLevel {
    /// Profiles consulted during theme resolution, in search order, for this level.
    pub fn search_order(self) -> &'static [ProfileLevel] {
        match self {
            ProfileLevel::Full => &[ProfileLevel::Full, ProfileLevel::Quiet, ProfileLevel::Silent],
            ProfileLevel::Quiet => &[ProfileLevel::Quiet, ProfileLevel::Silent],
            ProfileLevel::Silent => &[ProfileLevel::Silent],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileLevel::Full => "full",
            ProfileLevel::Quiet => "quiet",
            ProfileLevel::Silent => "silent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(ProfileLevel::Full),
            "quiet" => Some(ProfileLevel::Quiet),
            "silent" => Some(ProfileLevel::Silent),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProfileLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for ProfileLevel {
    fn default() -> Self {
        ProfileLevel::Full
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_order_widens_as_level_quiets() {
        assert_eq!(ProfileLevel::Full.search_order(), &[ProfileLevel::Full, ProfileLevel::Quiet, ProfileLevel::Silent]);
        assert_eq!(ProfileLevel::Quiet.search_order(), &[ProfileLevel::Quiet, ProfileLevel::Silent]);
        assert_eq!(ProfileLevel::Silent.search_order(), &[ProfileLevel::Silent]);
    }

    #[test]
    fn roundtrip_str() {
        for level in [ProfileLevel::Full, ProfileLevel::Quiet, ProfileLevel::Silent] {
            assert_eq!(ProfileLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(ProfileLevel::parse("loud"), None);
    }
}

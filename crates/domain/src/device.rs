/// Coarse device category derived from a user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// Phones.
    Mobile,
    /// Tablets.
    Tablet,
    /// Everything else.
    Desktop,
}

impl DeviceClass {
    /// Classifies a user agent string.
    ///
    /// Mobile markers are checked before tablet markers.
    #[must_use]
    pub fn from_user_agent(user_agent: &str) -> Self {
        let user_agent = user_agent.to_ascii_lowercase();

        if ["mobile", "android", "iphone"]
            .iter()
            .any(|marker| user_agent.contains(marker))
        {
            Self::Mobile
        } else if ["tablet", "ipad"]
            .iter()
            .any(|marker| user_agent.contains(marker))
        {
            Self::Tablet
        } else {
            Self::Desktop
        }
    }

    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }
}

use serde::{Deserialize, Serialize};

/// The eight franchises the model was trained on. The set is closed: the
/// classifier vocabulary contains exactly these names, so everything that
/// reaches it must come from this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "Sunrisers Hyderabad")]
    SunrisersHyderabad,
    #[serde(rename = "Mumbai Indians")]
    MumbaiIndians,
    #[serde(rename = "Royal Challengers Bangalore")]
    RoyalChallengersBangalore,
    #[serde(rename = "Kolkata Knight Riders")]
    KolkataKnightRiders,
    #[serde(rename = "Kings XI Punjab")]
    KingsXiPunjab,
    #[serde(rename = "Chennai Super Kings")]
    ChennaiSuperKings,
    #[serde(rename = "Rajasthan Royals")]
    RajasthanRoyals,
    #[serde(rename = "Delhi Capitals")]
    DelhiCapitals,
}

impl Team {
    /// Registry order. The first entry doubles as the fallback identity for
    /// unrecognized feed team names.
    pub const ALL: [Team; 8] = [
        Team::SunrisersHyderabad,
        Team::MumbaiIndians,
        Team::RoyalChallengersBangalore,
        Team::KolkataKnightRiders,
        Team::KingsXiPunjab,
        Team::ChennaiSuperKings,
        Team::RajasthanRoyals,
        Team::DelhiCapitals,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Team::SunrisersHyderabad => "Sunrisers Hyderabad",
            Team::MumbaiIndians => "Mumbai Indians",
            Team::RoyalChallengersBangalore => "Royal Challengers Bangalore",
            Team::KolkataKnightRiders => "Kolkata Knight Riders",
            Team::KingsXiPunjab => "Kings XI Punjab",
            Team::ChennaiSuperKings => "Chennai Super Kings",
            Team::RajasthanRoyals => "Rajasthan Royals",
            Team::DelhiCapitals => "Delhi Capitals",
        }
    }

    /// Primary brand color, used by the dashboard probability bars.
    pub fn color(&self) -> &'static str {
        match self {
            Team::SunrisersHyderabad => "#FF822A",
            Team::MumbaiIndians => "#045093",
            Team::RoyalChallengersBangalore => "#DA1818",
            Team::KolkataKnightRiders => "#3B215D",
            Team::KingsXiPunjab => "#C8102E",
            Team::ChennaiSuperKings => "#F8CD05",
            Team::RajasthanRoyals => "#254AA5",
            Team::DelhiCapitals => "#17499D",
        }
    }

    pub fn logo_url(&self) -> &'static str {
        match self {
            Team::SunrisersHyderabad => {
                "https://upload.wikimedia.org/wikipedia/en/8/81/Sunrisers_Hyderabad.png"
            }
            Team::MumbaiIndians => {
                "https://upload.wikimedia.org/wikipedia/en/c/cd/Mumbai_Indians_Logo.png"
            }
            Team::RoyalChallengersBangalore => {
                "https://upload.wikimedia.org/wikipedia/en/2/2f/Royal_Challengers_Bangalore_Logo.png"
            }
            Team::KolkataKnightRiders => {
                "https://upload.wikimedia.org/wikipedia/en/4/4a/Kolkata_Knight_Riders_Logo.png"
            }
            Team::KingsXiPunjab => {
                "https://upload.wikimedia.org/wikipedia/en/d/d4/Punjab_Kings_Logo.png"
            }
            Team::ChennaiSuperKings => {
                "https://upload.wikimedia.org/wikipedia/en/2/2f/Chennai_Super_Kings_Logo.png"
            }
            Team::RajasthanRoyals => {
                "https://upload.wikimedia.org/wikipedia/en/6/60/Rajasthan_Royals_Logo.png"
            }
            Team::DelhiCapitals => {
                "https://upload.wikimedia.org/wikipedia/en/3/3f/Delhi_Capitals_Logo.png"
            }
        }
    }

    /// Fallback identity for feed team strings that match no franchise.
    pub fn default_identity() -> Team {
        Team::ALL[0]
    }

    /// Map a free-form feed team string onto a canonical identity.
    ///
    /// The feed's innings label usually embeds the franchise name with extra
    /// text ("Chennai Super Kings Inning 2"), so after an exact
    /// case-insensitive match we also accept a containment match.
    pub fn from_feed_name(raw: &str) -> Option<Team> {
        let needle = raw.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        Team::ALL
            .iter()
            .copied()
            .find(|t| t.name().to_lowercase() == needle)
            .or_else(|| {
                Team::ALL
                    .iter()
                    .copied()
                    .find(|t| needle.contains(&t.name().to_lowercase()))
            })
    }

    /// Resolve a feed team string, substituting the default identity when the
    /// name is out of vocabulary. Never fails.
    pub fn resolve_feed_name(raw: &str) -> Team {
        Team::from_feed_name(raw).unwrap_or_else(Team::default_identity)
    }

    /// First registry entry that differs from `other` (bowling-side guess in
    /// live mode, where the feed only names the batting side).
    pub fn any_other(other: Team) -> Team {
        Team::ALL
            .iter()
            .copied()
            .find(|t| *t != other)
            .unwrap_or_else(Team::default_identity)
    }
}

/// Host cities present in the training data, sorted. Manual entry and the
/// model vocabulary are both restricted to this list.
pub const CITIES: [&str; 29] = [
    "Abu Dhabi",
    "Ahmedabad",
    "Bangalore",
    "Bengaluru",
    "Bloemfontein",
    "Cape Town",
    "Centurion",
    "Chandigarh",
    "Chennai",
    "Cuttack",
    "Delhi",
    "Dharamsala",
    "Durban",
    "East London",
    "Hyderabad",
    "Indore",
    "Jaipur",
    "Johannesburg",
    "Kimberley",
    "Kolkata",
    "Mohali",
    "Mumbai",
    "Nagpur",
    "Port Elizabeth",
    "Pune",
    "Raipur",
    "Ranchi",
    "Sharjah",
    "Visakhapatnam",
];

pub fn is_known_city(city: &str) -> bool {
    CITIES.iter().any(|c| *c == city)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_feed_name_maps_case_insensitively() {
        assert_eq!(
            Team::from_feed_name("chennai super kings"),
            Some(Team::ChennaiSuperKings)
        );
    }

    #[test]
    fn innings_label_maps_by_containment() {
        assert_eq!(
            Team::from_feed_name("Mumbai Indians Inning 2"),
            Some(Team::MumbaiIndians)
        );
    }

    #[test]
    fn unknown_feed_name_falls_back_to_default() {
        assert_eq!(
            Team::resolve_feed_name("Gujarat Titans"),
            Team::default_identity()
        );
        assert_eq!(Team::resolve_feed_name(""), Team::default_identity());
    }

    #[test]
    fn any_other_differs() {
        for team in Team::ALL {
            assert_ne!(Team::any_other(team), team);
        }
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&Team::KingsXiPunjab).unwrap();
        assert_eq!(json, "\"Kings XI Punjab\"");
        let back: Team = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Team::KingsXiPunjab);
    }

    #[test]
    fn cities_are_sorted_and_known() {
        let mut sorted = CITIES.to_vec();
        sorted.sort();
        assert_eq!(sorted, CITIES.to_vec());
        assert!(is_known_city("Mumbai"));
        assert!(!is_known_city("London"));
    }
}

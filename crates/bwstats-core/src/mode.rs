//! The fixed catalog of Bedwars game modes
//!
//! Raw counter fields in the origin payload are named `{prefix}{suffix}`,
//! where the prefix is derived from the mode. The mapping is kept as an
//! explicit static table rather than string concatenation so a typo'd mode
//! cannot silently read zeros.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// One tracked game mode; `Total` is the aggregate-across-all-modes
/// pseudo-mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModeKey {
    /// Lifetime totals across every mode
    Total,
    /// Solo
    EightOne,
    /// Doubles
    EightTwo,
    /// 3v3v3v3
    FourThree,
    /// 4v4v4v4
    FourFour,
    /// 4v4
    TwoFour,
    EightOneRush,
    EightOneUltimate,
    EightTwoLucky,
    EightTwoArmed,
    EightTwoRush,
    EightTwoSwap,
    EightTwoUltimate,
    EightTwoVoidless,
    FourFourLucky,
    FourFourArmed,
    FourFourRush,
    FourFourSwap,
    FourFourUltimate,
    FourFourVoidless,
    Castle,
    TourneyBedwars4s0,
    TourneyBedwarsTwoFour0,
}

impl ModeKey {
    /// Every mode, `Total` first, primary modes before variants
    pub const ALL: &'static [ModeKey] = &[
        ModeKey::Total,
        ModeKey::EightOne,
        ModeKey::EightTwo,
        ModeKey::FourThree,
        ModeKey::FourFour,
        ModeKey::TwoFour,
        ModeKey::EightOneRush,
        ModeKey::EightOneUltimate,
        ModeKey::EightTwoLucky,
        ModeKey::EightTwoArmed,
        ModeKey::EightTwoRush,
        ModeKey::EightTwoSwap,
        ModeKey::EightTwoUltimate,
        ModeKey::EightTwoVoidless,
        ModeKey::FourFourLucky,
        ModeKey::FourFourArmed,
        ModeKey::FourFourRush,
        ModeKey::FourFourSwap,
        ModeKey::FourFourUltimate,
        ModeKey::FourFourVoidless,
        ModeKey::Castle,
        ModeKey::TourneyBedwars4s0,
        ModeKey::TourneyBedwarsTwoFour0,
    ];

    /// Canonical snake-case key, as used in cache documents and JSON
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::EightOne => "eight_one",
            Self::EightTwo => "eight_two",
            Self::FourThree => "four_three",
            Self::FourFour => "four_four",
            Self::TwoFour => "two_four",
            Self::EightOneRush => "eight_one_rush",
            Self::EightOneUltimate => "eight_one_ultimate",
            Self::EightTwoLucky => "eight_two_lucky",
            Self::EightTwoArmed => "eight_two_armed",
            Self::EightTwoRush => "eight_two_rush",
            Self::EightTwoSwap => "eight_two_swap",
            Self::EightTwoUltimate => "eight_two_ultimate",
            Self::EightTwoVoidless => "eight_two_voidless",
            Self::FourFourLucky => "four_four_lucky",
            Self::FourFourArmed => "four_four_armed",
            Self::FourFourRush => "four_four_rush",
            Self::FourFourSwap => "four_four_swap",
            Self::FourFourUltimate => "four_four_ultimate",
            Self::FourFourVoidless => "four_four_voidless",
            Self::Castle => "castle",
            Self::TourneyBedwars4s0 => "tourney_bedwars4s_0",
            Self::TourneyBedwarsTwoFour0 => "tourney_bedwars_two_four_0",
        }
    }

    /// Parse a canonical key
    pub fn from_str(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.as_str() == key)
    }

    /// Field prefix for raw counters of this mode in the origin payload.
    ///
    /// `Total` counters carry no prefix.
    pub fn field_prefix(self) -> &'static str {
        match self {
            Self::Total => "",
            Self::EightOne => "eight_one_",
            Self::EightTwo => "eight_two_",
            Self::FourThree => "four_three_",
            Self::FourFour => "four_four_",
            Self::TwoFour => "two_four_",
            Self::EightOneRush => "eight_one_rush_",
            Self::EightOneUltimate => "eight_one_ultimate_",
            Self::EightTwoLucky => "eight_two_lucky_",
            Self::EightTwoArmed => "eight_two_armed_",
            Self::EightTwoRush => "eight_two_rush_",
            Self::EightTwoSwap => "eight_two_swap_",
            Self::EightTwoUltimate => "eight_two_ultimate_",
            Self::EightTwoVoidless => "eight_two_voidless_",
            Self::FourFourLucky => "four_four_lucky_",
            Self::FourFourArmed => "four_four_armed_",
            Self::FourFourRush => "four_four_rush_",
            Self::FourFourSwap => "four_four_swap_",
            Self::FourFourUltimate => "four_four_ultimate_",
            Self::FourFourVoidless => "four_four_voidless_",
            Self::Castle => "castle_",
            Self::TourneyBedwars4s0 => "tourney_bedwars4s_0_",
            Self::TourneyBedwarsTwoFour0 => "tourney_bedwars_two_four_0_",
        }
    }

    /// Human-readable mode name
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Total => "Overall",
            Self::EightOne => "Solo",
            Self::EightTwo => "Doubles",
            Self::FourThree => "3v3v3v3",
            Self::FourFour => "4v4v4v4",
            Self::TwoFour => "4v4",
            Self::EightOneRush => "Solo Rush",
            Self::EightOneUltimate => "Solo Ultimate",
            Self::EightTwoLucky => "Doubles Lucky",
            Self::EightTwoArmed => "Doubles Armed",
            Self::EightTwoRush => "Doubles Rush",
            Self::EightTwoSwap => "Doubles Swap",
            Self::EightTwoUltimate => "Doubles Ultimate",
            Self::EightTwoVoidless => "Doubles Voidless",
            Self::FourFourLucky => "4v4v4v4 Lucky",
            Self::FourFourArmed => "4v4v4v4 Armed",
            Self::FourFourRush => "4v4v4v4 Rush",
            Self::FourFourSwap => "4v4v4v4 Swap",
            Self::FourFourUltimate => "4v4v4v4 Ultimate",
            Self::FourFourVoidless => "4v4v4v4 Voidless",
            Self::Castle => "Castle",
            Self::TourneyBedwars4s0 => "Tourney 4v4v4v4",
            Self::TourneyBedwarsTwoFour0 => "Tourney 4v4",
        }
    }
}

impl fmt::Display for ModeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ModeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Self::from_str(&key).ok_or_else(|| de::Error::custom(format!("unknown mode key: {key}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::ModeKey;

    #[test]
    fn key_round_trip() {
        for mode in ModeKey::ALL {
            assert_eq!(ModeKey::from_str(mode.as_str()), Some(*mode));
        }
        assert_eq!(ModeKey::from_str("ranked"), None);
    }

    #[test]
    fn prefixes_follow_keys() {
        assert_eq!(ModeKey::Total.field_prefix(), "");
        for mode in ModeKey::ALL.iter().filter(|m| **m != ModeKey::Total) {
            assert_eq!(mode.field_prefix(), format!("{}_", mode.as_str()));
        }
    }

    #[test]
    fn total_sorts_first() {
        let mut map = BTreeMap::new();
        for mode in ModeKey::ALL {
            map.insert(*mode, ());
        }
        assert_eq!(map.keys().next(), Some(&ModeKey::Total));
    }

    #[test]
    fn serde_as_map_key() {
        let mut map = BTreeMap::new();
        map.insert(ModeKey::TourneyBedwars4s0, 1u32);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, "{\"tourney_bedwars4s_0\":1}");

        let back: BTreeMap<ModeKey, u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(&ModeKey::TourneyBedwars4s0), Some(&1));
    }
}

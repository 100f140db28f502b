use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One catalog entry returned by `TrainList.php`.
///
/// The endpoint is a loosely typed PHP script: ids may arrive as strings,
/// flags as `0`/`1` and text columns as bare numbers, so those fields go
/// through lenient decoders. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub header_image_path: Option<String>,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub ver: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub download_link: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub download_pass: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub terms: Option<String>,

    #[serde(default, deserialize_with = "deserialize_cache_bust")]
    pub image_updated_at: Option<CacheBust>,
    #[serde(default, deserialize_with = "deserialize_cache_bust")]
    pub updated_at: Option<CacheBust>,

    // ── Regions ──
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub area_tohoku: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub area_kanto: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub area_kansai: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub area_kyushu: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub area_other: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub area_overseas: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub area_fictional: bool,

    // ── Features ──
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub door_opening_closing: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub running_sound: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub announcement: bool,
    #[serde(rename = "ATS", default, deserialize_with = "deserialize_flag")]
    pub ats: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub special_lighting: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub door_behavior: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub pantograph_behavior: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub in_car_equipment: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub drivers_cab: bool,
}

impl Train {
    pub fn has_region(&self, region: Region) -> bool {
        match region {
            Region::Tohoku => self.area_tohoku,
            Region::Kanto => self.area_kanto,
            Region::Kansai => self.area_kansai,
            Region::Kyushu => self.area_kyushu,
            Region::Other => self.area_other,
            Region::Overseas => self.area_overseas,
            Region::Fictional => self.area_fictional,
        }
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::DoorOpeningClosing => self.door_opening_closing,
            Feature::RunningSound => self.running_sound,
            Feature::Announcement => self.announcement,
            Feature::Ats => self.ats,
            Feature::SpecialLighting => self.special_lighting,
            Feature::DoorBehavior => self.door_behavior,
            Feature::PantographBehavior => self.pantograph_behavior,
            Feature::InCarEquipment => self.in_car_equipment,
            Feature::DriversCab => self.drivers_cab,
        }
    }

    /// Regions flagged on this train, in badge order.
    pub fn regions(&self) -> Vec<Region> {
        Region::ALL
            .iter()
            .copied()
            .filter(|r| self.has_region(*r))
            .collect()
    }

    /// Features flagged on this train, in badge order.
    pub fn features(&self) -> Vec<Feature> {
        Feature::ALL
            .iter()
            .copied()
            .filter(|f| self.has_feature(*f))
            .collect()
    }

    /// Timestamp used to bust the header image cache, if the API sent one.
    pub fn cache_bust(&self) -> Option<&CacheBust> {
        self.image_updated_at
            .as_ref()
            .filter(|cb| !cb.is_empty())
            .or_else(|| self.updated_at.as_ref().filter(|cb| !cb.is_empty()))
    }

    /// Terms text, trimmed; `None` when absent or blank.
    pub fn terms_text(&self) -> Option<&str> {
        self.terms
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Image update marker as sent by the API: either epoch seconds or a date
/// string. Rendered verbatim into the `cb` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheBust {
    Number(i64),
    Text(String),
}

impl CacheBust {
    pub fn is_empty(&self) -> bool {
        match self {
            CacheBust::Number(n) => *n == 0,
            CacheBust::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for CacheBust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBust::Number(n) => write!(f, "{n}"),
            CacheBust::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

/// Region badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Tohoku,
    Kanto,
    Kansai,
    Kyushu,
    Other,
    Overseas,
    Fictional,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Tohoku,
        Region::Kanto,
        Region::Kansai,
        Region::Kyushu,
        Region::Other,
        Region::Overseas,
        Region::Fictional,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Region::Tohoku => "tohoku",
            Region::Kanto => "kanto",
            Region::Kansai => "kansai",
            Region::Kyushu => "kyushu",
            Region::Other => "other",
            Region::Overseas => "overseas",
            Region::Fictional => "fictional",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Region::Tohoku => "東北",
            Region::Kanto => "関東",
            Region::Kansai => "関西",
            Region::Kyushu => "九州",
            Region::Other => "その他",
            Region::Overseas => "海外",
            Region::Fictional => "架空",
        }
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.key().eq_ignore_ascii_case(wanted) || r.label() == wanted)
            .ok_or_else(|| format!("unknown region '{s}'"))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Feature badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    DoorOpeningClosing,
    RunningSound,
    Announcement,
    Ats,
    SpecialLighting,
    DoorBehavior,
    PantographBehavior,
    InCarEquipment,
    DriversCab,
}

impl Feature {
    pub const ALL: [Feature; 9] = [
        Feature::DoorOpeningClosing,
        Feature::RunningSound,
        Feature::Announcement,
        Feature::Ats,
        Feature::SpecialLighting,
        Feature::DoorBehavior,
        Feature::PantographBehavior,
        Feature::InCarEquipment,
        Feature::DriversCab,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Feature::DoorOpeningClosing => "door_opening_closing",
            Feature::RunningSound => "running_sound",
            Feature::Announcement => "announcement",
            Feature::Ats => "ats",
            Feature::SpecialLighting => "special_lighting",
            Feature::DoorBehavior => "door_behavior",
            Feature::PantographBehavior => "pantograph_behavior",
            Feature::InCarEquipment => "in_car_equipment",
            Feature::DriversCab => "drivers_cab",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Feature::DoorOpeningClosing => "ドア開閉",
            Feature::RunningSound => "走行音",
            Feature::Announcement => "アナウンス",
            Feature::Ats => "ATS",
            Feature::SpecialLighting => "特殊照明",
            Feature::DoorBehavior => "ドア挙動",
            Feature::PantographBehavior => "パンタグラフ",
            Feature::InCarEquipment => "車内機器",
            Feature::DriversCab => "運転台",
        }
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.key().eq_ignore_ascii_case(&wanted) || f.label() == wanted)
            .ok_or_else(|| format!("unknown feature '{s}'"))
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ── Lenient decoders ────────────────────────────────────

fn deserialize_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("invalid train id {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid train id {s:?}"))),
        other => Err(D::Error::custom(format!("invalid train id {other}"))),
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        _ => false,
    })
}

/// Strings pass through, numbers are stringified, anything else is absent.
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn deserialize_cache_bust<'de, D>(deserializer: D) -> Result<Option<CacheBust>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => CacheBust::Number(i),
            None => CacheBust::Text(n.to_string()),
        }),
        Value::String(s) => Some(CacheBust::Text(s)),
        _ => None,
    })
}

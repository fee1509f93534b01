use serde::{Deserialize, Serialize};

/// A validated map document: background, hit-zone shapes, optional ambient
/// sound. Immutable once loaded; a reload re-fetches or re-reads the cache,
/// it never patches a document in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    pub background_image: BackgroundImage,
    pub shapes: Vec<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_sound: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackgroundImage {
    pub file: String,
    #[serde(deserialize_with = "dimension")]
    pub width: f64,
    #[serde(deserialize_with = "dimension")]
    pub height: f64,
}

/// Authoring tools sometimes quote dimensions; `800` and `"800"` decode the
/// same way, matching what structural validation accepts.
fn dimension<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid dimension {s:?}"))),
    }
}

/// One interactive region. `path` is vector path data and `script` is an
/// opaque host command string; neither is interpreted here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shape {
    pub id: String,
    pub path: String,
    /// 3- or 6-digit hex, e.g. `#F00` or `#FF0000`.
    pub color: String,
    pub script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

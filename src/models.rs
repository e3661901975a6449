//! Data models for the greenhouse monitoring service.
//!
//! Field renames mirror the backend's PostgREST column names exactly
//! (`Farm`, `Vegetationtbl`, `FarmHistory`, `FarmGallery`), so these types
//! serialize straight into request bodies and out of responses.

use serde::{Deserialize, Serialize};

// ---

/// One sensor snapshot from the backend's `Farm` table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SensorReading {
    // ---
    #[serde(rename = "temp")]
    pub temperature: f32,
    #[serde(rename = "groundHumid")]
    pub ground_humidity: f32,
    #[serde(rename = "airHumid")]
    pub air_humidity: f32,
    /// Raw ISO-8601 string as delivered by the backend. Kept unparsed:
    /// alert dedup compares timestamps by string equality.
    #[serde(rename = "dateTime")]
    pub timestamp: String,
}

/// A named set of acceptable sensor ranges, split by day and night.
///
/// `id` is absent until the backend assigns one. Thresholds are plain `f32`
/// pairs; [`VegetationProfile::validate`] rejects `min > max` before a
/// profile reaches the backend or the monitor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VegetationProfile {
    // ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,

    pub day_temp_min: f32,
    pub day_temp_max: f32,
    pub night_temp_min: f32,
    pub night_temp_max: f32,

    pub day_ground_humid_min: f32,
    pub day_ground_humid_max: f32,
    pub night_ground_humid_min: f32,
    pub night_ground_humid_max: f32,

    pub day_air_humid_min: f32,
    pub day_air_humid_max: f32,
    pub night_air_humid_min: f32,
    pub night_air_humid_max: f32,
}

impl VegetationProfile {
    /// Check every min/max pair for `min <= max`.
    ///
    /// Returns the offending column pair so API callers get a usable
    /// message rather than a bare 422.
    pub fn validate(&self) -> Result<(), String> {
        // ---
        let pairs = [
            ("dayTempMin/dayTempMax", self.day_temp_min, self.day_temp_max),
            (
                "nightTempMin/nightTempMax",
                self.night_temp_min,
                self.night_temp_max,
            ),
            (
                "dayGroundHumidMin/dayGroundHumidMax",
                self.day_ground_humid_min,
                self.day_ground_humid_max,
            ),
            (
                "nightGroundHumidMin/nightGroundHumidMax",
                self.night_ground_humid_min,
                self.night_ground_humid_max,
            ),
            (
                "dayAirHumidMin/dayAirHumidMax",
                self.day_air_humid_min,
                self.day_air_humid_max,
            ),
            (
                "nightAirHumidMin/nightAirHumidMax",
                self.night_air_humid_min,
                self.night_air_humid_max,
            ),
        ];

        for (pair, min, max) in pairs {
            if min > max {
                return Err(format!("{pair}: min {min} exceeds max {max}"));
            }
        }
        Ok(())
    }
}

/// One entry in the `FarmHistory` log.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    // ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub farm_id: i64,
    pub temperature: f32,
    pub ground_humidity: f32,
    pub air_humidity: f32,
    #[serde(default)]
    pub picture_url: String,
    #[serde(default)]
    pub notes: String,
    pub recorded_at: String,
}

/// One stored media item in the `FarmGallery` table.
///
/// Upload itself happens outside this service; we only list what the
/// backend already holds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GalleryItem {
    // ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "UserID")]
    pub user_id: i64,
    #[serde(rename = "URI")]
    pub uri: String,
    pub date: String,
}

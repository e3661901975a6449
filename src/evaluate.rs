//! Range evaluation: compare a reading against the active profile's
//! day or night thresholds and report every out-of-range metric.

use serde::Serialize;

use crate::daylight::is_daytime;
use crate::models::{SensorReading, VegetationProfile};

// ---

/// The three monitored metrics, in the order they are checked and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    Temperature,
    GroundHumidity,
    AirHumidity,
}

impl Metric {
    pub fn label(self) -> &'static str {
        // ---
        match self {
            Metric::Temperature => "Temperature",
            Metric::GroundHumidity => "Ground humidity",
            Metric::AirHumidity => "Air humidity",
        }
    }

    pub fn unit(self) -> &'static str {
        // ---
        match self {
            Metric::Temperature => "°C",
            Metric::GroundHumidity | Metric::AirHumidity => "%",
        }
    }
}

/// Which side of the acceptable range was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    TooLow,
    TooHigh,
}

/// One out-of-range metric. `magnitude` is the distance past the
/// crossed bound, always positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deviation {
    // ---
    pub metric: Metric,
    pub direction: Direction,
    pub magnitude: f32,
}

impl Deviation {
    /// One alert sentence, magnitude rendered to one decimal place.
    ///
    /// Example: `"Temperature is too high by 3.0°C. "`
    pub fn describe(&self) -> String {
        // ---
        let side = match self.direction {
            Direction::TooLow => "low",
            Direction::TooHigh => "high",
        };
        format!(
            "{} is too {} by {:.1}{}. ",
            self.metric.label(),
            side,
            self.magnitude,
            self.metric.unit()
        )
    }
}

// ---

/// Evaluate a reading against a profile's thresholds.
///
/// Returns one [`Deviation`] per out-of-range metric, in metric order;
/// an empty report means everything is in range. With no active profile
/// there is nothing to compare against, so the report is empty and no
/// alerting can happen.
///
/// Day or night thresholds are selected from the reading's own timestamp,
/// not the wall clock at evaluation time.
pub fn evaluate(reading: &SensorReading, profile: Option<&VegetationProfile>) -> Vec<Deviation> {
    // ---
    let Some(p) = profile else {
        return Vec::new();
    };

    let day = is_daytime(Some(&reading.timestamp));
    let (temp, ground, air) = if day {
        (
            (p.day_temp_min, p.day_temp_max),
            (p.day_ground_humid_min, p.day_ground_humid_max),
            (p.day_air_humid_min, p.day_air_humid_max),
        )
    } else {
        (
            (p.night_temp_min, p.night_temp_max),
            (p.night_ground_humid_min, p.night_ground_humid_max),
            (p.night_air_humid_min, p.night_air_humid_max),
        )
    };

    let mut report = Vec::new();
    check(&mut report, Metric::Temperature, reading.temperature, temp);
    check(
        &mut report,
        Metric::GroundHumidity,
        reading.ground_humidity,
        ground,
    );
    check(&mut report, Metric::AirHumidity, reading.air_humidity, air);
    report
}

fn check(report: &mut Vec<Deviation>, metric: Metric, value: f32, (min, max): (f32, f32)) {
    // ---
    if value < min {
        report.push(Deviation {
            metric,
            direction: Direction::TooLow,
            magnitude: min - value,
        });
    } else if value > max {
        report.push(Deviation {
            metric,
            direction: Direction::TooHigh,
            magnitude: value - max,
        });
    }
}

/// Concatenate per-metric sentences into one alert body.
pub fn alert_body(report: &[Deviation]) -> String {
    // ---
    report.iter().map(Deviation::describe).collect()
}

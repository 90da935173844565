// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synthetic sensor readings.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

const TEMPERATURE_RANGE: RangeInclusive<f64> = 20.0..=30.0;
const HUMIDITY_RANGE: RangeInclusive<f64> = 30.0..=70.0;
const CO2_RANGE: RangeInclusive<f64> = 400.0..=800.0;

/// One simulated environmental sensor sample.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use devbridge::telemetry::Reading;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let reading = Reading::random(&mut rng);
///
/// assert!((20.0..=30.0).contains(&reading.temperature));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Temperature in degrees Celsius, within 20–30.
    pub temperature: f64,
    /// Relative humidity in percent, within 30–70.
    pub humidity: f64,
    /// CO2 concentration in ppm, within 400–800.
    pub co2: f64,
}

impl Reading {
    /// Draws a reading with every value rounded to two decimals.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            temperature: round2(rng.gen_range(TEMPERATURE_RANGE)),
            humidity: round2(rng.gen_range(HUMIDITY_RANGE)),
            co2: round2(rng.gen_range(CO2_RANGE)),
        }
    }

    /// Encodes the reading as a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

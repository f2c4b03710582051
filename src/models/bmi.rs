// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Body mass index derived from height and weight.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum BmiCategory {
    Underweight,
    Healthy,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Category for an already-rounded BMI value.
    pub fn from_value(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Healthy
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

/// BMI rounded to one decimal, with its category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Bmi {
    pub value: f64,
    pub category: BmiCategory,
}

impl Bmi {
    /// Compute BMI as weight / (height in metres)².
    ///
    /// Returns `None` unless both inputs are finite and positive. The
    /// category is taken from the rounded value, so 24.96 reads as 25.0
    /// and is reported as overweight.
    pub fn from_metrics(height_cm: f64, weight_kg: f64) -> Option<Self> {
        if !(height_cm.is_finite() && weight_kg.is_finite()) || height_cm <= 0.0 || weight_kg <= 0.0
        {
            return None;
        }

        let height_m = height_cm / 100.0;
        let raw = weight_kg / (height_m * height_m);
        let value = (raw * 10.0).round() / 10.0;

        Some(Self {
            value,
            category: BmiCategory::from_value(value),
        })
    }

    /// BMI from optional inputs (as held by forms and profiles).
    pub fn from_optional(height_cm: Option<f64>, weight_kg: Option<f64>) -> Option<Self> {
        match (height_cm, weight_kg) {
            (Some(h), Some(w)) => Self::from_metrics(h, w),
            _ => None,
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile model and the onboarding completeness predicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::time_utils::deserialize_optional_flexible_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

impl FromStr for FitnessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Beginner" => Ok(FitnessLevel::Beginner),
            "Intermediate" => Ok(FitnessLevel::Intermediate),
            "Advanced" => Ok(FitnessLevel::Advanced),
            other => Err(format!("unknown fitness level: {other}")),
        }
    }
}

/// Profile fields as named in the `user_profiles` table and in form errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    FirstName,
    LastName,
    Email,
    Age,
    Gender,
    HeightCm,
    WeightKg,
    FitnessLevel,
    MedicalHistory,
    LifestyleHabits,
}

impl ProfileField {
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileField::FirstName => "firstName",
            ProfileField::LastName => "lastName",
            ProfileField::Email => "email",
            ProfileField::Age => "age",
            ProfileField::Gender => "gender",
            ProfileField::HeightCm => "heightCm",
            ProfileField::WeightKg => "weightKg",
            ProfileField::FitnessLevel => "fitnessLevel",
            ProfileField::MedicalHistory => "medicalHistory",
            ProfileField::LifestyleHabits => "lifestyleHabits",
        }
    }

    /// Resolve either the column name or the Rust field name.
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "firstName" | "first_name" => ProfileField::FirstName,
            "lastName" | "last_name" => ProfileField::LastName,
            "email" => ProfileField::Email,
            "age" => ProfileField::Age,
            "gender" => ProfileField::Gender,
            "heightCm" | "height_cm" => ProfileField::HeightCm,
            "weightKg" | "weight_kg" => ProfileField::WeightKg,
            "fitnessLevel" | "fitness_level" => ProfileField::FitnessLevel,
            "medicalHistory" | "medical_history" => ProfileField::MedicalHistory,
            "lifestyleHabits" | "lifestyle_habits" => ProfileField::LifestyleHabits,
            _ => return None,
        })
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields that must be filled in before onboarding counts as finished.
pub const COMPLETENESS_FIELDS: [ProfileField; 7] = [
    ProfileField::FirstName,
    ProfileField::LastName,
    ProfileField::Age,
    ProfileField::Gender,
    ProfileField::HeightCm,
    ProfileField::WeightKg,
    ProfileField::FitnessLevel,
];

/// Row in the `user_profiles` table, one per auth user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Row id; workout tables reference the profile through it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(rename = "user_id")]
    pub user_id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub fitness_level: Option<FitnessLevel>,
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub lifestyle_habits: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_flexible_datetime"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_flexible_datetime"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Rows written by older clients hold `""` for unset enum columns.
fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl UserProfile {
    /// Empty profile for a user; every onboarding field unset.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: None,
            user_id,
            email: None,
            first_name: None,
            last_name: None,
            age: None,
            gender: None,
            height_cm: None,
            weight_kg: None,
            fitness_level: None,
            medical_history: None,
            lifestyle_habits: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Minimal profile built from sign-up identity data.
    ///
    /// `full_name` is split on whitespace: the first part becomes the
    /// first name and the second part the last name.
    pub fn stub(user_id: Uuid, email: Option<&str>, full_name: Option<&str>) -> Self {
        let mut parts = full_name.unwrap_or_default().split_whitespace();
        let first = parts.next().map(str::to_string);
        let last = parts.next().map(str::to_string);

        Self {
            email: email.map(str::to_string),
            first_name: first,
            last_name: last,
            ..Self::new(user_id)
        }
    }

    fn is_field_present(&self, field: ProfileField) -> bool {
        match field {
            ProfileField::FirstName => has_text(&self.first_name),
            ProfileField::LastName => has_text(&self.last_name),
            ProfileField::Email => has_text(&self.email),
            ProfileField::Age => self.age.is_some_and(|a| a > 0),
            ProfileField::Gender => self.gender.is_some(),
            ProfileField::HeightCm => self.height_cm.is_some_and(|h| h > 0.0),
            ProfileField::WeightKg => self.weight_kg.is_some_and(|w| w > 0.0),
            ProfileField::FitnessLevel => self.fitness_level.is_some(),
            ProfileField::MedicalHistory => has_text(&self.medical_history),
            ProfileField::LifestyleHabits => has_text(&self.lifestyle_habits),
        }
    }

    /// Completeness fields that are absent, empty or zero.
    pub fn missing_fields(&self) -> Vec<ProfileField> {
        COMPLETENESS_FIELDS
            .iter()
            .copied()
            .filter(|f| !self.is_field_present(*f))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Completeness of an optional profile row; no row means incomplete.
pub fn is_profile_complete(profile: Option<&UserProfile>) -> bool {
    profile.is_some_and(UserProfile::is_complete)
}

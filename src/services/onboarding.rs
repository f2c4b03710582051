// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Multi-step profile form (onboarding wizard and settings).
//!
//! The wizard state is plain data: the client holds it and sends it back
//! with every transition, and the server applies the step rules. Field
//! constraints are declared on [`ProfileDraft`] with `validator`; presence
//! of required fields is checked separately because `validator` skips
//! unset `Option` fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::models::{Bmi, FitnessLevel, Gender, ProfileField, UserProfile};

/// Message shown next to a required field left empty.
pub const REQUIRED_MESSAGE: &str = "Required";

const WHOLE_AGE_MESSAGE: &str = "Age must be a whole number";

/// Wizard pages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Step {
    Personal = 1,
    Physical = 2,
    Fitness = 3,
    Health = 4,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Personal, Step::Physical, Step::Fitness, Step::Health];

    /// Fields edited on this page.
    pub fn fields(self) -> &'static [ProfileField] {
        match self {
            Step::Personal => &[
                ProfileField::FirstName,
                ProfileField::LastName,
                ProfileField::Email,
            ],
            Step::Physical => &[
                ProfileField::Age,
                ProfileField::Gender,
                ProfileField::HeightCm,
                ProfileField::WeightKg,
            ],
            Step::Fitness => &[ProfileField::FitnessLevel],
            Step::Health => &[ProfileField::MedicalHistory, ProfileField::LifestyleHabits],
        }
    }

    /// Page a field lives on.
    pub fn of_field(field: ProfileField) -> Step {
        Step::ALL
            .into_iter()
            .find(|s| s.fields().contains(&field))
            .unwrap_or(Step::Health)
    }

    pub fn next(self) -> Option<Step> {
        match self {
            Step::Personal => Some(Step::Physical),
            Step::Physical => Some(Step::Fitness),
            Step::Fitness => Some(Step::Health),
            Step::Health => None,
        }
    }

    pub fn prev(self) -> Option<Step> {
        match self {
            Step::Personal => None,
            Step::Physical => Some(Step::Personal),
            Step::Fitness => Some(Step::Physical),
            Step::Health => Some(Step::Fitness),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Personal => "Personal",
            Step::Physical => "Physical",
            Step::Fitness => "Fitness",
            Step::Health => "Health",
        }
    }
}

impl TryFrom<u8> for Step {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Step::Personal),
            2 => Ok(Step::Physical),
            3 => Ok(Step::Fitness),
            4 => Ok(Step::Health),
            other => Err(format!("step out of range: {other}")),
        }
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> u8 {
        step as u8
    }
}

/// First-time onboarding or later edits from the settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    Complete,
    Update,
}

/// Fields that must be present before a submit is attempted.
pub const REQUIRED_FIELDS: [ProfileField; 8] = [
    ProfileField::FirstName,
    ProfileField::LastName,
    ProfileField::Email,
    ProfileField::Age,
    ProfileField::Gender,
    ProfileField::HeightCm,
    ProfileField::WeightKg,
    ProfileField::FitnessLevel,
];

/// Values currently entered in the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    #[serde(default)]
    #[validate(length(min = 2, message = "First name is required"))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 2, message = "Last name is required"))]
    pub last_name: Option<String>,
    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(range(min = 13.0, max = 120.0, message = "Age must be between 13 and 120"))]
    pub age: Option<f64>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    #[validate(range(min = 100.0, max = 250.0, message = "Height must be between 100 and 250 cm"))]
    pub height_cm: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 30.0, max = 300.0, message = "Weight must be between 30 and 300 kg"))]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub fitness_level: Option<FitnessLevel>,
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub lifestyle_habits: Option<String>,
}

fn text_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl ProfileDraft {
    /// Defaults shown to a user with no stored values.
    pub fn with_defaults() -> Self {
        Self {
            age: Some(25.0),
            gender: Some(Gender::Male),
            height_cm: Some(170.0),
            weight_kg: Some(70.0),
            fitness_level: Some(FitnessLevel::Beginner),
            ..Self::default()
        }
    }

    /// Prefill from a stored profile, falling back to the defaults for
    /// anything unset. The email always comes from the signed-in account.
    pub fn prefill(profile: Option<&UserProfile>, account_email: Option<&str>) -> Self {
        let defaults = Self::with_defaults();
        let Some(p) = profile else {
            return Self {
                email: account_email.map(str::to_string),
                ..defaults
            };
        };

        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            email: account_email.map(str::to_string).or_else(|| p.email.clone()),
            age: p.age.filter(|a| *a > 0).map(f64::from).or(defaults.age),
            gender: p.gender.or(defaults.gender),
            height_cm: p.height_cm.filter(|h| *h > 0.0).or(defaults.height_cm),
            weight_kg: p.weight_kg.filter(|w| *w > 0.0).or(defaults.weight_kg),
            fitness_level: p.fitness_level.or(defaults.fitness_level),
            medical_history: p.medical_history.clone(),
            lifestyle_habits: p.lifestyle_habits.clone(),
        }
    }

    fn is_present(&self, field: ProfileField) -> bool {
        match field {
            ProfileField::FirstName => text_present(&self.first_name),
            ProfileField::LastName => text_present(&self.last_name),
            ProfileField::Email => text_present(&self.email),
            ProfileField::Age => self.age.is_some_and(|a| a != 0.0),
            ProfileField::Gender => self.gender.is_some(),
            ProfileField::HeightCm => self.height_cm.is_some_and(|h| h > 0.0),
            ProfileField::WeightKg => self.weight_kg.is_some_and(|w| w > 0.0),
            ProfileField::FitnessLevel => self.fitness_level.is_some(),
            ProfileField::MedicalHistory | ProfileField::LifestyleHabits => true,
        }
    }

    /// Required fields that are empty or zero, in form order.
    pub fn missing_required(&self) -> Vec<ProfileField> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|f| !self.is_present(*f))
            .collect()
    }

    /// Copy with surrounding whitespace removed from the text fields, as
    /// they will be stored.
    pub fn trimmed(&self) -> Self {
        let trim = |v: &Option<String>| v.as_deref().map(|s| s.trim().to_string());
        Self {
            first_name: trim(&self.first_name),
            last_name: trim(&self.last_name),
            email: trim(&self.email),
            ..self.clone()
        }
    }

    /// Per-field errors for the given fields.
    ///
    /// A missing required field reports [`REQUIRED_MESSAGE`]; otherwise the
    /// declared constraints apply to the trimmed values.
    pub fn field_errors(&self, fields: &[ProfileField]) -> BTreeMap<ProfileField, Vec<String>> {
        let mut errors: BTreeMap<ProfileField, Vec<String>> = BTreeMap::new();

        for field in fields {
            if REQUIRED_FIELDS.contains(field) && !self.is_present(*field) {
                errors.insert(*field, vec![REQUIRED_MESSAGE.to_string()]);
            }
        }

        if fields.contains(&ProfileField::Age)
            && !errors.contains_key(&ProfileField::Age)
            && self.age.is_some_and(|a| a.fract() != 0.0)
        {
            errors.insert(ProfileField::Age, vec![WHOLE_AGE_MESSAGE.to_string()]);
        }

        if let Err(validation) = self.trimmed().validate() {
            for (key, field_errors) in validation.field_errors() {
                let Some(field) = ProfileField::from_key(&key) else {
                    continue;
                };
                if !fields.contains(&field) || errors.contains_key(&field) {
                    continue;
                }
                let messages = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid {field}"))
                    })
                    .collect();
                errors.insert(field, messages);
            }
        }

        errors
    }

    pub fn bmi(&self) -> Option<Bmi> {
        Bmi::from_optional(self.height_cm, self.weight_kg)
    }
}

/// Fully validated form contents, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub fitness_level: FitnessLevel,
    pub medical_history: Option<String>,
    pub lifestyle_habits: Option<String>,
}

impl ProfileSubmission {
    /// Apply the submission on top of the stored row (if any).
    pub fn apply_to(self, mut profile: UserProfile) -> UserProfile {
        profile.email = Some(self.email);
        profile.first_name = Some(self.first_name.trim().to_string());
        profile.last_name = Some(self.last_name.trim().to_string());
        profile.age = Some(self.age);
        profile.gender = Some(self.gender);
        profile.height_cm = Some(self.height_cm);
        profile.weight_kg = Some(self.weight_kg);
        profile.fitness_level = Some(self.fitness_level);
        profile.medical_history = self.medical_history.filter(|s| !s.trim().is_empty());
        profile.lifestyle_habits = self.lifestyle_habits.filter(|s| !s.trim().is_empty());
        profile
    }
}

/// Why a submit attempt was refused before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("A submission is already in progress")]
    InProgress,
    #[error("Please complete all required fields: {}", join_fields(.0))]
    Incomplete(Vec<ProfileField>),
    #[error("Please fix the highlighted fields")]
    Invalid,
}

fn join_fields(fields: &[ProfileField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Complete state of one form instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub step: Step,
    pub mode: FormMode,
    #[serde(default)]
    pub draft: ProfileDraft,
    #[serde(default)]
    pub errors: BTreeMap<ProfileField, Vec<String>>,
    #[serde(default)]
    pub submitting: bool,
}

impl WizardState {
    pub fn new(mode: FormMode, draft: ProfileDraft) -> Self {
        Self {
            step: Step::Personal,
            mode,
            draft,
            errors: BTreeMap::new(),
            submitting: false,
        }
    }

    /// Validate the current page and advance if it is valid.
    ///
    /// Returns whether the step changed. Only the current page's errors are
    /// replaced.
    pub fn next(&mut self) -> bool {
        let Some(target) = self.step.next() else {
            return false;
        };

        let fields = self.step.fields();
        self.errors.retain(|f, _| !fields.contains(f));
        let errors = self.draft.field_errors(fields);
        let valid = errors.is_empty();
        self.errors.extend(errors);

        if valid {
            self.step = target;
        }
        valid
    }

    /// Go back one page without validating.
    pub fn back(&mut self) -> bool {
        match self.step.prev() {
            Some(prev) => {
                self.step = prev;
                true
            }
            None => false,
        }
    }

    pub fn bmi(&self) -> Option<Bmi> {
        self.draft.bmi()
    }

    fn jump_to_first_error(&mut self, fields: impl IntoIterator<Item = ProfileField>) {
        if let Some(step) = fields.into_iter().map(Step::of_field).min() {
            self.step = step;
        }
    }

    /// Check the whole form and mark it as submitting.
    ///
    /// On failure the errors are recorded and the wizard moves to the
    /// earliest page holding one.
    pub fn begin_submit(&mut self) -> Result<ProfileSubmission, SubmitError> {
        if self.submitting {
            return Err(SubmitError::InProgress);
        }

        let missing = self.draft.missing_required();
        if !missing.is_empty() {
            self.errors = missing
                .iter()
                .map(|f| (*f, vec![REQUIRED_MESSAGE.to_string()]))
                .collect();
            self.jump_to_first_error(missing.iter().copied());
            return Err(SubmitError::Incomplete(missing));
        }

        let all_fields: Vec<ProfileField> =
            Step::ALL.iter().flat_map(|s| s.fields()).copied().collect();
        let errors = self.draft.field_errors(&all_fields);
        if !errors.is_empty() {
            self.jump_to_first_error(errors.keys().copied());
            self.errors = errors;
            return Err(SubmitError::Invalid);
        }

        // Presence was checked above, so every required value is set.
        let d = self.draft.trimmed();
        let submission = match (
            d.first_name,
            d.last_name,
            d.email,
            d.age.map(|a| a as u32),
            d.gender,
            d.height_cm,
            d.weight_kg,
            d.fitness_level,
        ) {
            (
                Some(first_name),
                Some(last_name),
                Some(email),
                Some(age),
                Some(gender),
                Some(height_cm),
                Some(weight_kg),
                Some(fitness_level),
            ) => ProfileSubmission {
                first_name,
                last_name,
                email,
                age,
                gender,
                height_cm,
                weight_kg,
                fitness_level,
                medical_history: d.medical_history,
                lifestyle_habits: d.lifestyle_habits,
            },
            _ => return Err(SubmitError::Incomplete(self.draft.missing_required())),
        };

        self.errors.clear();
        self.submitting = true;
        Ok(submission)
    }

    /// Clear the submitting flag once the store attempt is over.
    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            state: self.clone(),
            bmi: self.bmi(),
            show_step_indicator: self.mode == FormMode::Complete,
            total_steps: Step::ALL.len() as u8,
            step_title: self.step.title(),
            can_go_back: self.step.prev().is_some(),
            is_last_step: self.step.next().is_none(),
        }
    }
}

/// What the client renders for the form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub state: WizardState,
    pub bmi: Option<Bmi>,
    pub show_step_indicator: bool,
    pub total_steps: u8,
    pub step_title: &'static str,
    pub can_go_back: bool,
    pub is_last_step: bool,
}

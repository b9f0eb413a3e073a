use serde::{Deserialize, Serialize};

use crate::error::SurveyResult;
use crate::form::SurveyForm;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerPreference {
    Male,
    Female,
    Any,
}

impl PartnerPreference {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "any" => Some(Self::Any),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRating {
    pub interest: String,
    pub level: u8,
}

/// A fully validated survey, ready to hand to whoever consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyAnswers {
    pub nickname: String,
    pub gender: Gender,
    pub age: u8,
    pub phone: String,
    pub city: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub ratings: Vec<InterestRating>,
    pub avg_hours: f64,
    pub partner_gender: PartnerPreference,
    pub time_slots: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
}

impl SurveyAnswers {
    /// Parses every field, failing on the first invalid one in step order.
    pub fn from_form(form: &SurveyForm) -> SurveyResult<Self> {
        let nickname = validate::nickname(form)?;
        let gender = validate::gender(form)?;
        let age = validate::age(form)?;
        let phone = validate::phone(form)?;
        let city = validate::city(form)?;
        let height_cm = validate::height(form)?;
        let weight_kg = validate::weight(form)?;
        validate::interests(form)?;
        let avg_hours = validate::avg_hours(form)?;
        let ratings = validate::ratings(form)?;
        let partner_gender = validate::partner_gender(form)?;
        let time_slots = validate::time_slots(form)?;
        let intro = validate::intro(form)?;

        Ok(Self {
            nickname,
            gender,
            age,
            phone,
            city,
            height_cm,
            weight_kg,
            ratings,
            avg_hours,
            partner_gender,
            time_slots,
            intro,
        })
    }

    pub fn interests(&self) -> impl Iterator<Item = &str> {
        self.ratings.iter().map(|rating| rating.interest.as_str())
    }
}

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Raw survey inputs as the form holds them, before any parsing.
///
/// Index `i` of `level` is the self-rating for `interests[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurveyForm {
    pub nickname: String,
    pub gender: String,
    #[serde(deserialize_with = "text_or_number")]
    pub age: String,
    pub phone: String,
    pub city: String,
    #[serde(deserialize_with = "text_or_number")]
    pub height: String,
    #[serde(deserialize_with = "text_or_number")]
    pub weight: String,
    pub interests: Vec<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub avg_hours: String,
    #[serde(deserialize_with = "texts_or_numbers")]
    pub level: Vec<String>,
    pub partner_gender: String,
    pub time_slots: Vec<String>,
    pub intro: String,
}

impl SurveyForm {
    /// Interest ids with surrounding whitespace removed and blank entries skipped.
    pub fn selected_interests(&self) -> impl Iterator<Item = &str> {
        self.interests
            .iter()
            .map(|interest| interest.trim())
            .filter(|interest| !interest.is_empty())
    }
}

/// The seven survey pages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Step {
    #[default]
    Profile,
    Contact,
    Body,
    Habits,
    Ratings,
    Preferences,
    Intro,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Self::Profile,
        Self::Contact,
        Self::Body,
        Self::Habits,
        Self::Ratings,
        Self::Preferences,
        Self::Intro,
    ];
    pub const FIRST: Step = Self::Profile;
    pub const LAST: Step = Self::Intro;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Following step, capped at the last one.
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(Self::LAST)
    }

    /// Preceding step, floored at the first one.
    pub fn previous(self) -> Self {
        self.index()
            .checked_sub(1)
            .and_then(Self::from_index)
            .unwrap_or(Self::FIRST)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Profile => "About you",
            Self::Contact => "Contact",
            Self::Body => "Body",
            Self::Habits => "Exercise habits",
            Self::Ratings => "Skill levels",
            Self::Preferences => "Partner preferences",
            Self::Intro => "Introduction",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "step {} ({})", self.index(), self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SurveyField {
    Nickname,
    Gender,
    Age,
    Phone,
    City,
    Height,
    Weight,
    Interests,
    AvgHours,
    /// The rating list as a whole.
    Level,
    /// Self-rating for one selected interest.
    Rating(String),
    PartnerGender,
    TimeSlots,
    Intro,
}

impl fmt::Display for SurveyField {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nickname => "nickname",
            Self::Gender => "gender",
            Self::Age => "age",
            Self::Phone => "phone",
            Self::City => "city",
            Self::Height => "height",
            Self::Weight => "weight",
            Self::Interests => "interests",
            Self::AvgHours => "avgHours",
            Self::Level => "level",
            Self::Rating(interest) => return write!(formatter, "level[{interest}]"),
            Self::PartnerGender => "partnerGender",
            Self::TimeSlots => "timeSlots",
            Self::Intro => "intro",
        };
        formatter.write_str(name)
    }
}

/// Fields rendered on `step`. The ratings page has one field per selected interest.
pub fn step_fields(step: Step, form: &SurveyForm) -> Vec<SurveyField> {
    match step {
        Step::Profile => vec![SurveyField::Nickname, SurveyField::Gender, SurveyField::Age],
        Step::Contact => vec![SurveyField::Phone, SurveyField::City],
        Step::Body => vec![SurveyField::Height, SurveyField::Weight],
        Step::Habits => vec![SurveyField::Interests, SurveyField::AvgHours],
        Step::Ratings => form
            .selected_interests()
            .map(|interest| SurveyField::Rating(interest.to_string()))
            .collect(),
        Step::Preferences => vec![SurveyField::PartnerGender, SurveyField::TimeSlots],
        Step::Intro => vec![SurveyField::Intro],
    }
}

// Hand-edited survey files tend to mix `"170"` and `170`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<TextOrNumber> for String {
    fn from(value: TextOrNumber) -> Self {
        match value {
            TextOrNumber::Text(text) => text,
            TextOrNumber::Integer(number) => number.to_string(),
            TextOrNumber::Float(number) => number.to_string(),
        }
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    TextOrNumber::deserialize(deserializer).map(String::from)
}

fn texts_or_numbers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<TextOrNumber>::deserialize(deserializer)?;
    Ok(values.into_iter().map(String::from).collect())
}

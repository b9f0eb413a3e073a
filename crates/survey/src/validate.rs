use snafu::{OptionExt, ensure};

use crate::answers::{Gender, InterestRating, PartnerPreference};
use crate::error::{
    BelowMinimumSnafu, InvalidFormatSnafu, MissingSnafu, NotBelowSnafu, OutOfRangeSnafu,
    RatingsIncompleteSnafu, SurveyResult, TooLongSnafu,
};
use crate::form::{Step, SurveyField, SurveyForm};

pub const NICKNAME_MAX_CHARS: usize = 20;
pub const MIN_AGE: u32 = 12;
pub const MAX_AGE: u32 = 100;
pub const MIN_HEIGHT_CM: f64 = 100.0;
pub const MIN_WEIGHT_KG: f64 = 30.0;
/// Hours in a week; weekly exercise must stay strictly below it.
pub const WEEK_HOURS: f64 = 168.0;
pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 5;
pub const INTRO_MAX_CHARS: usize = 200;

/// Checks only the fields that belong to `step`.
pub fn validate_step(step: Step, form: &SurveyForm) -> SurveyResult<()> {
    match step {
        Step::Profile => {
            nickname(form)?;
            gender(form)?;
            age(form)?;
        }
        Step::Contact => {
            phone(form)?;
            city(form)?;
        }
        Step::Body => {
            height(form)?;
            weight(form)?;
        }
        Step::Habits => {
            interests(form)?;
            avg_hours(form)?;
        }
        Step::Ratings => {
            ratings(form)?;
        }
        Step::Preferences => {
            partner_gender(form)?;
            time_slots(form)?;
        }
        Step::Intro => {
            intro(form)?;
        }
    }
    Ok(())
}

/// Local mobile numbers: ten digits, starting with `09`.
pub fn is_valid_phone(raw: &str) -> bool {
    raw.len() == 10 && raw.starts_with("09") && raw.bytes().all(|byte| byte.is_ascii_digit())
}

pub(crate) fn nickname(form: &SurveyForm) -> SurveyResult<String> {
    let value = required(&form.nickname, SurveyField::Nickname)?;
    ensure!(
        value.chars().count() <= NICKNAME_MAX_CHARS,
        TooLongSnafu {
            field: SurveyField::Nickname,
            max: NICKNAME_MAX_CHARS,
        }
    );
    Ok(value.to_string())
}

pub(crate) fn gender(form: &SurveyForm) -> SurveyResult<Gender> {
    let value = required(&form.gender, SurveyField::Gender)?;
    Gender::parse(value).context(InvalidFormatSnafu {
        field: SurveyField::Gender,
        expected: "one of male, female, other",
    })
}

pub(crate) fn age(form: &SurveyForm) -> SurveyResult<u8> {
    let value = required(&form.age, SurveyField::Age)?;
    let age = value.parse::<u32>().ok().context(InvalidFormatSnafu {
        field: SurveyField::Age,
        expected: "a whole number",
    })?;
    ensure!(
        (MIN_AGE..=MAX_AGE).contains(&age),
        OutOfRangeSnafu {
            field: SurveyField::Age,
            min: MIN_AGE,
            max: MAX_AGE,
        }
    );
    // Range check above keeps this lossless.
    Ok(age as u8)
}

pub(crate) fn phone(form: &SurveyForm) -> SurveyResult<String> {
    let value = required(&form.phone, SurveyField::Phone)?;
    ensure!(
        is_valid_phone(value),
        InvalidFormatSnafu {
            field: SurveyField::Phone,
            expected: "10 digits starting with 09",
        }
    );
    Ok(value.to_string())
}

pub(crate) fn city(form: &SurveyForm) -> SurveyResult<String> {
    required(&form.city, SurveyField::City).map(str::to_string)
}

pub(crate) fn height(form: &SurveyForm) -> SurveyResult<f64> {
    let value = number(&form.height, SurveyField::Height)?;
    ensure!(
        value >= MIN_HEIGHT_CM,
        BelowMinimumSnafu {
            field: SurveyField::Height,
            min: MIN_HEIGHT_CM,
        }
    );
    Ok(value)
}

pub(crate) fn weight(form: &SurveyForm) -> SurveyResult<f64> {
    let value = number(&form.weight, SurveyField::Weight)?;
    ensure!(
        value >= MIN_WEIGHT_KG,
        BelowMinimumSnafu {
            field: SurveyField::Weight,
            min: MIN_WEIGHT_KG,
        }
    );
    Ok(value)
}

pub(crate) fn interests(form: &SurveyForm) -> SurveyResult<Vec<String>> {
    ensure!(
        form.interests.iter().all(|interest| !interest.trim().is_empty()),
        InvalidFormatSnafu {
            field: SurveyField::Interests,
            expected: "a list without blank entries",
        }
    );
    let selected = form
        .selected_interests()
        .map(str::to_string)
        .collect::<Vec<_>>();
    ensure!(
        !selected.is_empty(),
        MissingSnafu {
            field: SurveyField::Interests,
        }
    );
    Ok(selected)
}

pub(crate) fn avg_hours(form: &SurveyForm) -> SurveyResult<f64> {
    let value = number(&form.avg_hours, SurveyField::AvgHours)?;
    ensure!(
        value >= 0.0,
        BelowMinimumSnafu {
            field: SurveyField::AvgHours,
            min: 0.0,
        }
    );
    ensure!(
        value < WEEK_HOURS,
        NotBelowSnafu {
            field: SurveyField::AvgHours,
            limit: WEEK_HOURS,
        }
    );
    Ok(value)
}

pub(crate) fn ratings(form: &SurveyForm) -> SurveyResult<Vec<InterestRating>> {
    let selected = form.selected_interests().collect::<Vec<_>>();
    ensure!(
        form.level.len() == selected.len(),
        RatingsIncompleteSnafu {
            interests: selected.len(),
            ratings: form.level.len(),
        }
    );

    selected
        .into_iter()
        .zip(&form.level)
        .map(|(interest, level)| {
            let field = SurveyField::Rating(interest.to_string());
            let level = level.trim().parse::<u32>().ok().context(InvalidFormatSnafu {
                field: field.clone(),
                expected: "a whole number",
            })?;
            ensure!(
                (MIN_LEVEL..=MAX_LEVEL).contains(&level),
                OutOfRangeSnafu {
                    field,
                    min: MIN_LEVEL,
                    max: MAX_LEVEL,
                }
            );
            Ok(InterestRating {
                interest: interest.to_string(),
                level: level as u8,
            })
        })
        .collect()
}

pub(crate) fn partner_gender(form: &SurveyForm) -> SurveyResult<PartnerPreference> {
    let value = required(&form.partner_gender, SurveyField::PartnerGender)?;
    PartnerPreference::parse(value).context(InvalidFormatSnafu {
        field: SurveyField::PartnerGender,
        expected: "one of male, female, any",
    })
}

pub(crate) fn time_slots(form: &SurveyForm) -> SurveyResult<Vec<String>> {
    ensure!(
        form.time_slots.iter().any(|slot| !slot.trim().is_empty()),
        MissingSnafu {
            field: SurveyField::TimeSlots,
        }
    );
    Ok(form
        .time_slots
        .iter()
        .map(|slot| slot.trim().to_string())
        .filter(|slot| !slot.is_empty())
        .collect())
}

pub(crate) fn intro(form: &SurveyForm) -> SurveyResult<Option<String>> {
    let value = form.intro.trim();
    ensure!(
        value.chars().count() <= INTRO_MAX_CHARS,
        TooLongSnafu {
            field: SurveyField::Intro,
            max: INTRO_MAX_CHARS,
        }
    );
    Ok((!value.is_empty()).then(|| value.to_string()))
}

fn required(raw: &str, field: SurveyField) -> SurveyResult<&str> {
    let value = raw.trim();
    ensure!(!value.is_empty(), MissingSnafu { field });
    Ok(value)
}

fn number(raw: &str, field: SurveyField) -> SurveyResult<f64> {
    let value = required(raw, field.clone())?;
    value
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .context(InvalidFormatSnafu {
            field,
            expected: "a number",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurveyError;

    fn form() -> SurveyForm {
        SurveyForm {
            nickname: "Mei".to_string(),
            gender: "female".to_string(),
            age: "29".to_string(),
            phone: "0912345678".to_string(),
            city: "Taipei".to_string(),
            height: "162".to_string(),
            weight: "51".to_string(),
            interests: vec!["1".to_string(), "2".to_string()],
            avg_hours: "10".to_string(),
            level: vec!["3".to_string(), "4".to_string()],
            partner_gender: "any".to_string(),
            time_slots: vec!["weekend-morning".to_string()],
            intro: String::new(),
        }
    }

    #[test]
    fn phone_must_be_ten_digits_starting_with_09() {
        let mut form = form();
        assert_eq!(validate_step(Step::Contact, &form), Ok(()));

        for rejected in ["0812345678", "091234567", "09123456789", "09-2345678", "+886912345"] {
            form.phone = rejected.to_string();
            let error = validate_step(Step::Contact, &form).unwrap_err();
            assert_eq!(error.field(), SurveyField::Phone, "{rejected} accepted");
        }
    }

    #[test]
    fn missing_phone_reports_required() {
        let mut form = form();
        form.phone = "  ".to_string();

        let error = validate_step(Step::Contact, &form).unwrap_err();

        assert_eq!(
            error,
            SurveyError::Missing {
                field: SurveyField::Phone
            }
        );
        assert_eq!(error.to_string(), "phone is required");
    }

    #[test]
    fn body_measurements_have_minimums() {
        let mut form = form();
        form.height = "95".to_string();
        assert_eq!(
            validate_step(Step::Body, &form).unwrap_err().to_string(),
            "height must be at least 100"
        );

        form.height = "170".to_string();
        form.weight = "abc".to_string();
        assert!(matches!(
            validate_step(Step::Body, &form),
            Err(SurveyError::InvalidFormat {
                field: SurveyField::Weight,
                ..
            })
        ));
    }

    #[test]
    fn weekly_hours_stay_below_a_week() {
        let mut form = form();
        form.avg_hours = "200".to_string();
        assert_eq!(
            validate_step(Step::Habits, &form).unwrap_err().field(),
            SurveyField::AvgHours
        );

        form.avg_hours = "168".to_string();
        assert!(validate_step(Step::Habits, &form).is_err());

        form.avg_hours = "NaN".to_string();
        assert!(validate_step(Step::Habits, &form).is_err());

        form.avg_hours = "10".to_string();
        assert_eq!(validate_step(Step::Habits, &form), Ok(()));
    }

    #[test]
    fn one_rating_per_interest_is_required() {
        let mut form = form();
        form.level = vec!["3".to_string()];
        assert_eq!(
            validate_step(Step::Ratings, &form),
            Err(SurveyError::RatingsIncomplete {
                interests: 2,
                ratings: 1,
            })
        );

        form.level = vec!["3".to_string(), "4".to_string()];
        assert_eq!(validate_step(Step::Ratings, &form), Ok(()));

        form.level = vec!["3".to_string(), "9".to_string()];
        assert_eq!(
            validate_step(Step::Ratings, &form).unwrap_err().field(),
            SurveyField::Rating("2".to_string())
        );
    }

    #[test]
    fn blank_interest_entries_are_rejected() {
        let mut form = form();
        form.interests = vec!["1".to_string(), " ".to_string()];

        assert!(matches!(
            validate_step(Step::Habits, &form),
            Err(SurveyError::InvalidFormat {
                field: SurveyField::Interests,
                ..
            })
        ));
    }

    #[test]
    fn ratings_pair_with_trimmed_interests() {
        let mut form = form();
        form.interests = vec![" 1 ".to_string(), "2".to_string()];

        let rated = ratings(&form).unwrap();

        assert_eq!(rated[0].interest, "1");
        assert_eq!(rated[1].level, 4);

        form.interests.push("  ".to_string());
        assert_eq!(ratings(&form).unwrap().len(), 2);
    }

    #[test]
    fn only_the_current_step_is_checked() {
        let mut form = form();
        form.phone = "bad".to_string();
        assert_eq!(validate_step(Step::Body, &form), Ok(()));
    }

    #[test]
    fn intro_is_optional_but_bounded() {
        let mut form = form();
        assert_eq!(intro(&form), Ok(None));

        form.intro = "x".repeat(INTRO_MAX_CHARS + 1);
        assert!(validate_step(Step::Intro, &form).is_err());
    }
}

use sportmate_survey::{
    Gender, PartnerPreference, Step, SurveyError, SurveyField, SurveyFlow, SurveyForm, step_fields,
};

fn complete_form() -> SurveyForm {
    serde_json::from_value(serde_json::json!({
        "nickname": "Ariel",
        "gender": "other",
        "age": 27,
        "phone": "0912345678",
        "city": "Tainan",
        "height": 171,
        "weight": "63.5",
        "interests": ["1", "2"],
        "avgHours": 10,
        "level": [3, "4"],
        "partnerGender": "any",
        "timeSlots": ["weekday-evening"],
        "intro": "  Looking for a badminton partner  "
    }))
    .expect("survey json")
}

fn walk_to(flow: &mut SurveyFlow, target: Step) {
    while flow.step() < target {
        flow.advance().expect("earlier steps valid");
    }
}

#[test]
fn a_complete_form_walks_every_step() {
    let mut flow = SurveyFlow::with_form(complete_form());

    for expected in Step::ALL.into_iter().skip(1) {
        assert_eq!(flow.advance(), Ok(expected));
    }
    // Advancing past the last step stays put.
    assert_eq!(flow.advance(), Ok(Step::Intro));

    let answers = flow.finish().expect("valid survey");
    assert_eq!(answers.gender, Gender::Other);
    assert_eq!(answers.age, 27);
    assert_eq!(answers.weight_kg, 63.5);
    assert_eq!(answers.partner_gender, PartnerPreference::Any);
    assert_eq!(answers.interests().collect::<Vec<_>>(), ["1", "2"]);
    assert_eq!(answers.ratings[1].level, 4);
    assert_eq!(answers.intro.as_deref(), Some("Looking for a badminton partner"));
}

#[test]
fn invalid_phone_blocks_the_contact_step() {
    let mut form = complete_form();
    form.phone = "1234".to_string();
    let mut flow = SurveyFlow::with_form(form);
    walk_to(&mut flow, Step::Contact);

    let error = flow.advance().unwrap_err();

    assert_eq!(error.field(), SurveyField::Phone);
    assert_eq!(flow.step(), Step::Contact);

    flow.form_mut().phone = "0912345678".to_string();
    assert_eq!(flow.advance(), Ok(Step::Body));
}

#[test]
fn weekly_hours_of_200_are_rejected() {
    let mut form = complete_form();
    form.avg_hours = "200".to_string();
    let mut flow = SurveyFlow::with_form(form);
    walk_to(&mut flow, Step::Habits);

    assert!(matches!(
        flow.advance(),
        Err(SurveyError::NotBelow {
            field: SurveyField::AvgHours,
            ..
        })
    ));

    flow.form_mut().avg_hours = "10".to_string();
    assert_eq!(flow.advance(), Ok(Step::Ratings));
}

#[test]
fn ratings_must_cover_every_interest() {
    let mut form = complete_form();
    form.level = vec!["3".to_string()];
    let mut flow = SurveyFlow::with_form(form);
    walk_to(&mut flow, Step::Ratings);

    assert!(!flow.ratings_complete());
    assert_eq!(
        flow.fields(),
        vec![
            SurveyField::Rating("1".to_string()),
            SurveyField::Rating("2".to_string()),
        ]
    );
    let error = flow.advance().unwrap_err();
    assert_eq!(error.field(), SurveyField::Level);

    flow.form_mut().level.push("4".to_string());
    assert!(flow.ratings_complete());
    assert_eq!(flow.advance(), Ok(Step::Preferences));
}

#[test]
fn back_moves_without_validation_and_stops_at_the_start() {
    let mut flow = SurveyFlow::with_form(complete_form());
    walk_to(&mut flow, Step::Body);
    flow.form_mut().phone.clear();

    assert_eq!(flow.back(), Step::Contact);
    assert_eq!(flow.back(), Step::Profile);
    assert_eq!(flow.back(), Step::Profile);
}

#[test]
fn finish_returns_to_the_first_invalid_step() {
    let mut form = complete_form();
    form.height = "80".to_string();
    form.time_slots.clear();
    let mut flow = SurveyFlow::with_form(form);

    let error = flow.finish().unwrap_err();

    assert_eq!(error.field(), SurveyField::Height);
    assert_eq!(flow.step(), Step::Body);
}

#[test]
fn missing_json_fields_default_to_empty() {
    let form: SurveyForm =
        serde_json::from_str(r#"{ "nickname": "Lin" }"#).expect("partial survey json");

    assert_eq!(form.nickname, "Lin");
    assert!(form.interests.is_empty());

    let mut flow = SurveyFlow::with_form(form);
    assert_eq!(
        flow.advance(),
        Err(SurveyError::Missing {
            field: SurveyField::Gender
        })
    );
}

#[test]
fn blank_interest_cannot_reach_the_answers() {
    let mut form = complete_form();
    form.interests = vec!["1".to_string(), " ".to_string()];
    form.level = vec!["3".to_string(), "4".to_string()];
    assert_eq!(
        step_fields(Step::Ratings, &form),
        vec![SurveyField::Rating("1".to_string())]
    );
    let mut flow = SurveyFlow::with_form(form);

    let error = flow.finish().unwrap_err();

    assert_eq!(error.field(), SurveyField::Interests);
    assert_eq!(flow.step(), Step::Habits);
}

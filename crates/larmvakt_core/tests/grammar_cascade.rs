use larmvakt_core::{parse_details, AlarmConfig, AlarmKind, MessageNormalizer, UNKNOWN_ALARM_TYPE};

fn normalizer() -> MessageNormalizer {
    MessageNormalizer::new(&AlarmConfig::builtin()).unwrap()
}

#[test]
fn slash_klass_with_trailing_code_list() {
    let details =
        parse_details("Main Street 12, City; /Klass: Major Alarm - Automatic Alarm.; A01, A02, A03");

    assert_eq!(details.alarm_type.as_deref(), Some("Major Alarm"));
    assert_eq!(details.what.as_deref(), Some("Automatic Alarm"));
    assert_eq!(details.where_location.as_deref(), Some("Main Street 12, City"));
    assert_eq!(details.who_called.as_deref(), Some("A01, A02, A03"));
}

#[test]
fn slash_klass_beats_generic_rules() {
    // Also satisfies the generic leading-codes rule; the specific /Klass:
    // rule must win and keep the location in `where`.
    let details =
        parse_details("Oak Street 11, City; /Klass: Major Alarm - Building Fire.; B01, B02");

    assert_eq!(details.alarm_type.as_deref(), Some("Major Alarm"));
    assert_eq!(details.what.as_deref(), Some("Building Fire"));
    assert_eq!(details.where_location.as_deref(), Some("Oak Street 11, City"));
    assert_eq!(details.who_called.as_deref(), Some("B01, B02"));
}

#[test]
fn plain_provalarm_keeps_free_text_as_what() {
    let details = parse_details("PROVALARM Station A. Practice drill tonight at 19:00.");

    assert_eq!(details.alarm_type.as_deref(), Some("PROVALARM"));
    assert_eq!(
        details.what.as_deref(),
        Some("Station A. Practice drill tonight at 19:00.")
    );
    assert_eq!(details.where_location, None);
    assert_eq!(details.who_called, None);
}

#[test]
fn coded_provalarm_extracts_location_and_tidies_what() {
    let details = parse_details(
        "Alpha_N_900_PROVALARM Station A. . Practice drill tonight at 19:00._Main Street 12, Station A, City",
    );

    assert_eq!(details.alarm_type.as_deref(), Some("PROVALARM"));
    assert_eq!(
        details.what.as_deref(),
        Some("Station A. Practice drill tonight at 19:00")
    );
    assert_eq!(
        details.where_location.as_deref(),
        Some("Main Street 12, Station A, City")
    );
    assert_eq!(details.who_called, None);
}

#[test]
fn infix_coded_message_defaults_to_larm_type() {
    let details = parse_details(
        "A01, DEPT01_C_441_Staff station due to resources busy with fire at location ._Main Street 12, Station A, City",
    );

    assert_eq!(details.alarm_type.as_deref(), Some("Larm"));
    assert_eq!(
        details.what.as_deref(),
        Some("Staff station due to resources busy with fire at location")
    );
    assert_eq!(
        details.where_location.as_deref(),
        Some("Main Street 12, Station A, City")
    );
    assert_eq!(details.who_called.as_deref(), Some("A01, DEPT01"));
}

#[test]
fn infix_coded_message_picks_up_type_keyword() {
    let details =
        parse_details("A01, DEPT01_C_440_Beredskapsalarm standby at depot ._Main Street 12, City");

    assert_eq!(details.alarm_type.as_deref(), Some("Beredskapsalarm"));
    assert_eq!(details.who_called.as_deref(), Some("A01, DEPT01"));
}

#[test]
fn handelse_question_shape_combines_event_and_extra() {
    let details = parse_details(
        "Old School Street 12, City;  Klass: Person Search Alarm. Händelse? LIFT ASSISTANCE. Övrigt: door open, sitting on floor outside bathroom.;  B01, B02",
    );

    assert_eq!(details.alarm_type.as_deref(), Some("Person Search Alarm"));
    assert_eq!(
        details.what.as_deref(),
        Some("LIFT ASSISTANCE. Övrigt: door open, sitting on floor outside bathroom.")
    );
    assert_eq!(
        details.where_location.as_deref(),
        Some("Old School Street 12, City")
    );
    assert_eq!(details.who_called.as_deref(), Some("B01, B02"));
}

#[test]
fn handelse_colon_shape_extracts_event_text() {
    let details = parse_details(
        "Main Road, City; Klass: Rescue - Assistance. Händelse: driven into ditch, 1 person not trapped; B01, B02, A01",
    );

    assert_eq!(details.alarm_type.as_deref(), Some("Rescue - Assistance"));
    assert_eq!(
        details.what.as_deref(),
        Some("driven into ditch, 1 person not trapped")
    );
    assert_eq!(details.where_location.as_deref(), Some("Main Road, City"));
    assert_eq!(details.who_called.as_deref(), Some("B01, B02, A01"));
}

#[test]
fn dash_klass_folds_trailing_text_into_what() {
    let details = parse_details(
        "Bay Street 323, City; Klass: Small Alarm - Chimney Fire. What type of building? chimney fire. 2 floors.; E01, E02, A01",
    );

    assert_eq!(details.alarm_type.as_deref(), Some("Small Alarm"));
    assert_eq!(
        details.what.as_deref(),
        Some("Chimney Fire. What type of building? chimney fire. 2 floors.")
    );
    assert_eq!(details.where_location.as_deref(), Some("Bay Street 323, City"));
    assert_eq!(details.who_called.as_deref(), Some("E01, E02, A01"));
}

#[test]
fn beredskap_shape_without_extra_segment() {
    let details =
        parse_details("Main Street 12, Station A, City; Beredskapsalarm standby at depot., A01, DEPT01");

    assert_eq!(details.alarm_type.as_deref(), Some("Beredskapsalarm"));
    assert_eq!(details.what.as_deref(), Some("standby at depot"));
    assert_eq!(
        details.where_location.as_deref(),
        Some("Main Street 12, Station A, City")
    );
    assert_eq!(details.who_called.as_deref(), Some("A01, DEPT01"));
}

#[test]
fn reinforcement_shape_sets_fixed_type() {
    let details = parse_details(
        "Harbor Road, City; Typ av förstärkning Fire Department. Övrig information: Fire in barn City.; A01, A02, A03, DEPT01",
    );

    assert_eq!(details.alarm_type.as_deref(), Some("Förstärkning"));
    assert_eq!(
        details.what.as_deref(),
        Some("Typ av förstärkning Fire Department. Övrig information: Fire in barn City")
    );
    assert_eq!(details.where_location.as_deref(), Some("Harbor Road, City"));
    assert_eq!(details.who_called.as_deref(), Some("A01, A02, A03, DEPT01"));
}

#[test]
fn inverted_shape_with_leading_codes() {
    let details = parse_details(
        "E01, E02, A01 B 417 Klass: Small Alarm - Chimney Fire. Bay Street 323, City",
    );

    assert_eq!(details.alarm_type.as_deref(), Some("Small Alarm"));
    assert_eq!(details.what.as_deref(), Some("Chimney Fire"));
    assert_eq!(details.where_location.as_deref(), Some("Bay Street 323, City"));
    assert_eq!(details.who_called.as_deref(), Some("E01, E02, A01 B 417"));
}

#[test]
fn unmatched_shape_falls_back_without_error() {
    let details = parse_details("smoke visible from the highway, unclear where");

    assert_eq!(details.alarm_type.as_deref(), Some(UNKNOWN_ALARM_TYPE));
    assert_eq!(
        details.what.as_deref(),
        Some("smoke visible from the highway, unclear where")
    );
    assert_eq!(details.where_location, None);
    assert_eq!(details.who_called, None);
}

#[test]
fn ignore_marker_wins_over_every_shape_rule() {
    let parsed = normalizer()
        .normalize("PROVALARM-BEFOLKNINGSSKYDD quarterly siren check; Klass: Larm - Test.; A01");

    assert_eq!(parsed.kind, AlarmKind::Ignore);
    assert_eq!(parsed.alarm_type, None);
    assert_eq!(parsed.what, None);
    assert_eq!(parsed.who_called, None);
}

#[test]
fn provalarm_scenario_classifies_as_practice() {
    let parsed = normalizer().normalize("PROVALARM Station A. Practice drill tonight at 19:00.");

    assert_eq!(parsed.kind, AlarmKind::Practice);
    assert_eq!(
        parsed.what.as_deref(),
        Some("Station A. Practice drill tonight at 19:00.")
    );
    assert_eq!(parsed.where_location, None);
    // "Station A" is a configured alias for DEPT01.
    assert_eq!(parsed.department_codes, vec!["DEPT01".to_string()]);
}

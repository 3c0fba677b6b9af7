use chrono::NaiveDate;
use geomark_core::models::{
    AttendanceLog, AttendanceRecord, AttendanceStatus, ClockTime, DaySchedule, DocumentPatch,
    Location, Schedule, Slot, Subject, UserDocument, Weekday,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{from_str, from_value, json, to_string, to_value};

fn sample_slot(id: &str, from: &str, to: &str) -> Slot {
    Slot {
        id: id.to_string(),
        from: from.parse().expect("valid from time"),
        to: to.parse().expect("valid to time"),
        subject_id: "sub-1".to_string(),
        subject_name: "Networks".to_string(),
        location: Location {
            lat: 10.759973571454065,
            lng: 78.81130220593371,
            name: Some("Orion".to_string()),
        },
        exclude: false,
    }
}

#[rstest]
#[case("00:00", 0)]
#[case("09:00", 540)]
#[case("09:05", 545)]
#[case("23:59", 1439)]
fn clock_time_parses_to_minutes(#[case] input: &str, #[case] expected: u32) {
    let time: ClockTime = input.parse().expect("valid clock time");
    assert_eq!(time.minutes(), expected);
    assert_eq!(time.to_string(), input);
}

#[rstest]
#[case("")]
#[case("9am")]
#[case("25:00")]
#[case("12:60")]
#[case("12-30")]
fn clock_time_rejects_malformed_input(#[case] input: &str) {
    assert!(input.parse::<ClockTime>().is_err());
}

#[test]
fn clock_time_orders_like_the_padded_string() {
    let early: ClockTime = "08:05".parse().expect("valid");
    let late: ClockTime = "10:00".parse().expect("valid");
    assert!(early < late);
    assert_eq!(ClockTime::new(8, 5), early);
}

#[test]
fn clock_time_serializes_as_string() {
    let time: ClockTime = "07:45".parse().expect("valid");
    assert_eq!(to_value(time).expect("serialize"), json!("07:45"));

    let back: ClockTime = from_value(json!("07:45")).expect("deserialize");
    assert_eq!(back, time);
}

#[test]
fn weekday_serializes_as_full_name() {
    assert_eq!(to_value(Weekday::Monday).expect("serialize"), json!("Monday"));
    assert_eq!(
        from_value::<Weekday>(json!("Friday")).expect("deserialize"),
        Weekday::Friday
    );
}

#[rstest]
#[case(chrono::Weekday::Mon, Some(Weekday::Monday))]
#[case(chrono::Weekday::Fri, Some(Weekday::Friday))]
#[case(chrono::Weekday::Sat, None)]
#[case(chrono::Weekday::Sun, None)]
fn weekday_from_chrono(#[case] input: chrono::Weekday, #[case] expected: Option<Weekday>) {
    assert_eq!(Weekday::from_chrono(input), expected);
}

#[test]
fn location_label_prefers_the_name() {
    let named = Location {
        lat: 10.76,
        lng: 78.81,
        name: Some("Orion".to_string()),
    };
    assert_eq!(named.label(), "Orion");

    let unnamed = Location {
        lat: 10.76,
        lng: 78.81,
        name: None,
    };
    assert_eq!(unnamed.label(), "10.76, 78.81");
}

#[test]
fn slot_serializes_with_camel_case_fields() {
    let slot = sample_slot("slot-1", "09:00", "10:00");
    let value = to_value(&slot).expect("serialize");

    assert_eq!(value["subjectId"], json!("sub-1"));
    assert_eq!(value["subjectName"], json!("Networks"));
    assert_eq!(value["from"], json!("09:00"));
    assert_eq!(value["location"]["name"], json!("Orion"));

    let back: Slot = from_value(value).expect("deserialize");
    assert_eq!(back, slot);
}

#[test]
fn slot_time_range_label() {
    let slot = sample_slot("slot-1", "09:00", "10:30");
    assert_eq!(slot.time_range(), "09:00-10:30");
}

#[test]
fn schedule_default_has_all_five_weekdays() {
    let schedule = Schedule::default();
    let days: Vec<Weekday> = schedule.days().iter().map(|d| d.day).collect();
    assert_eq!(days, Weekday::ALL.to_vec());
    assert!(schedule.days().iter().all(|d| d.slots.is_empty()));
}

#[test]
fn schedule_normalize_synthesizes_missing_days_and_sorts_slots() {
    let mut schedule: Schedule = from_value(json!([
        {
            "day": "Wednesday",
            "slots": [
                {
                    "id": "slot-late",
                    "from": "14:00",
                    "to": "15:00",
                    "subjectId": "sub-1",
                    "subjectName": "Networks",
                    "location": {"lat": 1.0, "lng": 2.0}
                },
                {
                    "id": "slot-early",
                    "from": "09:00",
                    "to": "10:00",
                    "subjectId": "sub-1",
                    "subjectName": "Networks",
                    "location": {"lat": 1.0, "lng": 2.0}
                }
            ]
        }
    ]))
    .expect("deserialize");

    schedule.normalize();

    let days: Vec<Weekday> = schedule.days().iter().map(|d| d.day).collect();
    assert_eq!(days, Weekday::ALL.to_vec());

    let wednesday = schedule.day(Weekday::Wednesday).expect("wednesday exists");
    let ids: Vec<&str> = wednesday.slots.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["slot-early", "slot-late"]);
}

#[rstest]
#[case(AttendanceStatus::Pending, "pending")]
#[case(AttendanceStatus::Attended, "attended")]
#[case(AttendanceStatus::NotAttended, "not-attended")]
fn attendance_status_wire_form(#[case] status: AttendanceStatus, #[case] expected: &str) {
    assert_eq!(to_value(status).expect("serialize"), json!(expected));
    assert_eq!(status.to_string(), expected);
    assert_eq!(
        from_value::<AttendanceStatus>(json!(expected)).expect("deserialize"),
        status
    );
}

#[test]
fn attendance_record_round_trips_with_camel_case_field_names() {
    let record = AttendanceRecord {
        status: AttendanceStatus::Attended,
        modified: false,
        subject_id: "sub-1".to_string(),
        subject_name: "Networks".to_string(),
        time_slot: "09:00-10:00".to_string(),
        exclude: false,
        location_name: "Orion".to_string(),
    };

    let value = to_value(&record).expect("serialize");
    assert_eq!(value["status"], json!("attended"));
    assert_eq!(value["subjectId"], json!("sub-1"));
    assert_eq!(value["subjectName"], json!("Networks"));
    assert_eq!(value["timeSlot"], json!("09:00-10:00"));
    assert_eq!(value["locationName"], json!("Orion"));

    let json = to_string(&record).expect("serialize");
    let back: AttendanceRecord = from_str(&json).expect("deserialize");
    assert_eq!(back, record);
}

#[test]
fn attendance_log_keys_by_date_then_slot() {
    let date = NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date");
    let mut log = AttendanceLog::new();
    log.upsert(
        date,
        "slot-1",
        AttendanceRecord {
            status: AttendanceStatus::NotAttended,
            modified: false,
            subject_id: "sub-1".to_string(),
            subject_name: "Networks".to_string(),
            time_slot: "09:00-10:00".to_string(),
            exclude: false,
            location_name: "Orion".to_string(),
        },
    );

    assert_eq!(log.len(), 1);
    assert!(log.record(date, "slot-1").is_some());
    assert!(log.record(date, "slot-2").is_none());

    let value = to_value(&log).expect("serialize");
    assert_eq!(value["2025-06-02"]["slot-1"]["status"], json!("not-attended"));
}

#[test]
fn user_document_defaults_match_a_fresh_account() {
    let document = UserDocument::default();
    assert!(document.subjects.is_empty());
    assert_eq!(document.min_attendance_percent, 75);
    assert_eq!(document.schedule.days().len(), 5);
    assert!(document.attendance_records.is_empty());
}

#[test]
fn user_document_deserializes_the_stored_layout() {
    let document: UserDocument = from_value(json!({
        "subjects": [{"id": "sub-1", "name": "Networks"}],
        "schedule": [
            {
                "day": "Monday",
                "slots": [{
                    "id": "slot-1",
                    "from": "09:00",
                    "to": "10:00",
                    "subjectId": "sub-1",
                    "subjectName": "Networks",
                    "location": {"lat": 10.76, "lng": 78.81, "name": "Orion"},
                    "exclude": false
                }]
            }
        ],
        "minAttendancePercent": 80,
        "attendanceRecords": {
            "2025-06-02": {
                "slot-1": {
                    "status": "attended",
                    "modified": false,
                    "subjectId": "sub-1",
                    "subjectName": "Networks",
                    "timeSlot": "09:00-10:00",
                    "exclude": false,
                    "locationName": "Orion"
                }
            }
        }
    }))
    .expect("deserialize");

    assert_eq!(document.subjects, vec![Subject {
        id: "sub-1".to_string(),
        name: "Networks".to_string(),
    }]);
    assert_eq!(document.min_attendance_percent, 80);

    let monday = document.schedule.day(Weekday::Monday).expect("monday exists");
    assert_eq!(monday.slots.len(), 1);

    let date = NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date");
    let record = document
        .attendance_records
        .record(date, "slot-1")
        .expect("record exists");
    assert_eq!(record.status, AttendanceStatus::Attended);
}

#[test]
fn user_document_tolerates_missing_fields() {
    let document: UserDocument = from_value(json!({})).expect("deserialize");
    assert_eq!(document, UserDocument::default());
}

#[test]
fn document_patch_serializes_only_named_fields() {
    let patch = DocumentPatch::min_attendance_percent(60);
    let value = to_value(&patch).expect("serialize");
    assert_eq!(value, json!({"minAttendancePercent": 60}));
}

#[test]
fn document_patch_apply_replaces_only_named_fields() {
    let mut document = UserDocument::default();
    document.subjects.push(Subject {
        id: "sub-1".to_string(),
        name: "Networks".to_string(),
    });

    document.apply(DocumentPatch::min_attendance_percent(60));

    assert_eq!(document.min_attendance_percent, 60);
    assert_eq!(document.subjects.len(), 1);
}

#[test]
fn document_patch_full_writes_everything() {
    let mut source = UserDocument::default();
    source.min_attendance_percent = 90;

    let mut target = UserDocument::default();
    target.apply(DocumentPatch::full(&source));

    assert_eq!(target, source);
}

#[test]
fn day_schedule_empty_has_no_slots() {
    let day = DaySchedule::empty(Weekday::Tuesday);
    assert_eq!(day.day, Weekday::Tuesday);
    assert!(day.slots.is_empty());
}

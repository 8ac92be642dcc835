use parceltrack_core::{NewParcel, Parcel, STATUS_REGISTERED, STATUS_SENT};

#[test]
fn new_parcel_registered_sets_defaults() {
    let draft = NewParcel::registered(1000, "1 Test Street", "2024-03-01T10:00:00Z");

    assert_eq!(draft.client, 1000);
    assert_eq!(draft.status, STATUS_REGISTERED);
    assert_eq!(draft.address, "1 Test Street");
    assert_eq!(draft.created_at, "2024-03-01T10:00:00Z");
}

#[test]
fn into_parcel_attaches_the_assigned_number() {
    let draft = NewParcel::registered(1000, "1 Test Street", "2024-03-01T10:00:00Z");
    let parcel = draft.clone().into_parcel(42);

    assert_eq!(parcel.number, 42);
    assert_eq!(parcel.client, draft.client);
    assert_eq!(parcel.status, draft.status);
    assert_eq!(parcel.address, draft.address);
    assert_eq!(parcel.created_at, draft.created_at);
    assert!(parcel.is_registered());
}

#[test]
fn is_registered_tracks_status_text() {
    let mut parcel = NewParcel::registered(1, "1 Test Street", "2024-03-01T10:00:00Z").into_parcel(1);
    assert!(parcel.is_registered());

    parcel.status = STATUS_SENT.to_string();
    assert!(!parcel.is_registered());
}

#[test]
fn parcel_serialization_uses_expected_wire_fields() {
    let parcel = Parcel {
        number: 7,
        client: 1000,
        status: STATUS_SENT.to_string(),
        address: "1 Test Street".to_string(),
        created_at: "2024-03-01T10:00:00Z".to_string(),
    };

    let json = serde_json::to_value(&parcel).unwrap();
    assert_eq!(json["number"], 7);
    assert_eq!(json["client"], 1000);
    assert_eq!(json["status"], "sent");
    assert_eq!(json["address"], "1 Test Street");
    assert_eq!(json["created_at"], "2024-03-01T10:00:00Z");

    let decoded: Parcel = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, parcel);
}

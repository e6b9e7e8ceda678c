use formateur_macros::{entity_id, value_object};
use std::collections::HashSet;

#[entity_id(prefix = "TEST")]
struct TestId(String);

#[entity_id]
struct BareId(String);

#[value_object]
struct Label {
    text: String,
}

#[value_object]
#[serde(rename_all = "snake_case")]
enum Palier {
    Bas,
    TresHaut,
}

#[value_object(eq = false)]
struct Loose {
    key: String,
    ignored: u32,
}

impl PartialEq for Loose {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[test]
fn generated_ids_carry_prefix_and_are_unique() {
    let ids: HashSet<TestId> = (0..1000).map(|_| TestId::generate()).collect();
    assert_eq!(ids.len(), 1000);
    assert!(ids.iter().all(|id| id.as_str().starts_with("TEST-")));
}

#[test]
fn bare_id_is_a_ulid() {
    let id = BareId::generate();
    assert!(id.as_str().parse::<ulid::Ulid>().is_ok());
}

#[test]
fn id_conversions_and_serde() {
    let id: TestId = "TEST-42".parse().unwrap();
    assert_eq!(id.to_string(), "TEST-42");
    assert_eq!(id, TestId::from("TEST-42"));
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"TEST-42\"");
    let s: String = id.into();
    assert_eq!(s, "TEST-42");
}

#[test]
fn value_object_derives() {
    let a = Label {
        text: "x".to_string(),
    };
    assert_eq!(a.clone(), a);
    assert_eq!(format!("{:?}", a), "Label { text: \"x\" }");
    assert_eq!(serde_json::to_string(&Palier::TresHaut).unwrap(), "\"tres_haut\"");
    assert_ne!(Palier::Bas, Palier::TresHaut);
}

#[test]
fn value_object_custom_equality() {
    let a = Loose {
        key: "k".into(),
        ignored: 1,
    };
    let b = Loose {
        key: "k".into(),
        ignored: 2,
    };
    assert!(a == b);
    assert_eq!(a.ignored + 1, b.ignored);
}

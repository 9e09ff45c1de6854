use loom_registry::{capabilities, prompt_listing, CapabilitySource};
use rstest::rstest;

#[test]
fn listing_mentions_every_capability() {
    let listing = prompt_listing();
    for cap in capabilities() {
        assert!(listing.contains(cap.usage), "{} missing from listing", cap.name);
    }
}

#[rstest]
#[case("**Registry Components:**")]
#[case("**Control Components:**")]
#[case("`<MathFormula tex=\"x^2 + y^2 = z^2\" />` - LaTeX formula")]
#[case("Do not import anything.")]
fn listing_sections(#[case] needle: &str) {
    assert!(prompt_listing().contains(needle));
}

#[test]
fn lesson_primitives_listed_before_controls() {
    let listing = prompt_listing();
    let controls_at = listing.find("**Control Components:**").unwrap();
    for cap in capabilities()
        .iter()
        .filter(|c| c.source == CapabilitySource::Lesson)
    {
        let at = listing.find(cap.usage).unwrap();
        assert!(at < controls_at, "{} listed after controls", cap.name);
    }
}

#[test]
fn capabilities_serialize_with_snake_case_kinds() {
    let quiz = loom_registry::lookup("Quiz").unwrap();
    let value = serde_json::to_value(quiz).unwrap();
    assert_eq!(value["kind"], "quiz");
    assert_eq!(value["source"], "lesson");
}

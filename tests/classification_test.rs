// Classifier properties: keyword-exact, case-insensitive, order-sensitive.

use leadflow_backend::services::classification::{
    classify_category, classify_priority, summarize_email, FALLBACK_CONFIDENCE, MATCH_CONFIDENCE,
};

#[test]
fn lead_keywords_always_classify_as_lead_with_confidence_88() {
    let samples = [
        ("Pricing for 50 seats", ""),
        ("", "can we book a DEMO next week?"),
        ("Trial extension", "our trial expired"),
        ("hello", "I want to buy your product"),
    ];
    for (subject, body) in samples {
        let (category, confidence) = classify_category(subject, body);
        assert_eq!(category, "Lead", "subject={:?} body={:?}", subject, body);
        assert_eq!(confidence, MATCH_CONFIDENCE);
    }
}

#[test]
fn support_and_billing_categories() {
    assert_eq!(classify_category("dashboard bug", "").0, "Support");
    assert_eq!(classify_category("", "please send the invoice").0, "Billing");
    assert_eq!(classify_category("refund request", "").0, "Billing");
}

#[test]
fn category_order_is_stable() {
    // Lead keywords shadow Support and Billing keywords
    assert_eq!(classify_category("pricing error", "").0, "Lead");
    assert_eq!(classify_category("demo invoice", "").0, "Lead");
    // Support shadows Billing
    assert_eq!(classify_category("problem with billing", "").0, "Support");
}

#[test]
fn unmatched_text_is_other_with_confidence_72() {
    let (category, confidence) = classify_category("greetings", "nice weather today");
    assert_eq!(category, "Other");
    assert_eq!(confidence, FALLBACK_CONFIDENCE);
}

#[test]
fn priority_defaults_to_low() {
    assert_eq!(classify_priority("URGENT: site down", ""), "high");
    assert_eq!(classify_priority("", "please reply soon"), "medium");
    assert_eq!(classify_priority("question", "about the api"), "low");
}

#[test]
fn summary_is_bounded() {
    let long_body = "This is a sentence. ".repeat(50);
    let summary = summarize_email(&long_body);
    assert!(summary.chars().count() <= 183);
    assert!(summary.ends_with('.') || summary.ends_with("..."));
}

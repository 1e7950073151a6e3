// Renderer behavior over realistic template shapes.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use leadflow_backend::models::AutoReplyTemplate;
use leadflow_backend::services::templates::{render, substitute};

fn template(subject: &str, body: &str) -> AutoReplyTemplate {
    AutoReplyTemplate {
        id: Uuid::new_v4(),
        company_id: Some(Uuid::new_v4()),
        name: Some("welcome".to_string()),
        category: None,
        tone: Some("friendly".to_string()),
        trigger_type: "lead".to_string(),
        subject_template: subject.to_string(),
        body_template: body.to_string(),
        created_at: Utc::now(),
    }
}

fn context(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
    pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
}

#[test]
fn lead_welcome_template_renders_name() {
    let t = template("Re: {name}", "Hi {name}, thanks!");
    let rendered = render(&t, &context(&[("name", "Sam"), ("email", "sam@x.com")]));
    assert_eq!(rendered.subject, "Re: Sam");
    assert_eq!(rendered.body, "Hi Sam, thanks!");
}

#[test]
fn render_is_total_over_arbitrary_contexts() {
    let t = template(
        "{greeting} {name} {missing}",
        "Regarding {subject}: {body}",
    );

    for ctx in [
        HashMap::new(),
        context(&[("name", "Ada")]),
        context(&[("unrelated", "value"), ("other", "")]),
    ] {
        // Must never panic, whatever the context holds
        let rendered = render(&t, &ctx);
        assert!(!rendered.subject.contains('{') || t.subject_template.contains("{{"));
        assert_eq!(render(&t, &ctx), rendered);
    }
}

#[test]
fn multiple_occurrences_all_substitute() {
    assert_eq!(
        substitute("{name}, {name}, {name}", &context(&[("name", "Bo")])),
        "Bo, Bo, Bo"
    );
}

#[test]
fn literal_braces_survive_rendering() {
    assert_eq!(
        substitute("use {{placeholders}} like {name}", &context(&[("name", "this")])),
        "use {placeholders} like this"
    );
}

#[test]
fn empty_template_renders_empty() {
    let t = template("", "");
    let rendered = render(&t, &context(&[("name", "Sam")]));
    assert_eq!(rendered.subject, "");
    assert_eq!(rendered.body, "");
}

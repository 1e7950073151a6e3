// Template store and renderer.
//
// Placeholders use `{name}` syntax; `{{` and `}}` escape to literal braces.
// Substitution is "safe": a placeholder missing from the context renders as
// the empty string so malformed context never blocks reply generation.
// Template authors are trusted (company admins); no escaping is applied.

use std::collections::HashMap;

use diesel_async::AsyncPgConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AutoReplyTemplate, TriggerType};

/// A rendered subject/body pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedReply {
    pub subject: String,
    pub body: String,
}

/// Most-recently-created template for (company, trigger_type).
/// Returns None (not an error) when the company is absent or has no match.
pub async fn latest_template(
    conn: &mut AsyncPgConnection,
    trigger: TriggerType,
    company_id: Option<Uuid>,
) -> Result<Option<AutoReplyTemplate>, diesel::result::Error> {
    match company_id {
        Some(owner) => AutoReplyTemplate::latest_for_trigger(conn, trigger, owner).await,
        None => Ok(None),
    }
}

/// Render a template against a context map. Never fails.
pub fn render(template: &AutoReplyTemplate, context: &HashMap<&str, String>) -> RenderedReply {
    RenderedReply {
        subject: substitute(&template.subject_template, context),
        body: substitute(&template.body_template, context),
    }
}

/// Substitute `{name}` placeholders from the context, empty string for
/// missing keys. `{{`/`}}` produce literal braces. An unterminated `{`
/// is passed through unchanged rather than treated as an error.
pub fn substitute(template: &str, context: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '{' => {
                if let Some((_, '{')) = chars.peek() {
                    chars.next();
                    out.push('{');
                    continue;
                }
                // Scan to the closing brace
                let rest = &template[idx + 1..];
                match rest.find(['{', '}']) {
                    Some(end) if rest.as_bytes()[end] == b'}' => {
                        let key = &rest[..end];
                        if let Some(value) = context.get(key) {
                            out.push_str(value);
                        }
                        // Missing key renders as empty string.
                        // Skip by char count, not byte offset.
                        let skip = rest[..=end].chars().count();
                        for _ in 0..skip {
                            chars.next();
                        }
                    },
                    _ => {
                        // No closing brace: emit literally
                        out.push('{');
                    },
                }
            },
            '}' => {
                if let Some((_, '}')) = chars.peek() {
                    chars.next();
                }
                out.push('}');
            },
            c => out.push(c),
        }
    }

    out
}

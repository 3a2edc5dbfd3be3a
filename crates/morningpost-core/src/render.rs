//! Template renderer — `{{source.field}}` substitution.
//!
//! The template is scanned once, left to right. Each token that names a
//! known field is replaced by its value; substituted text is never scanned
//! again. Tokens that match no field stay in the output as written.

use crate::store::RecordStore;

/// Placeholder token for one field, e.g. `{{weather.Temp}}`.
pub fn placeholder(source: &str, field: &str) -> String {
    format!("{{{{{source}.{field}}}}}")
}

/// Substitute every field of every record in `store` into `template`.
pub fn render(template: &str, store: &RecordStore) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];
        let Some(close) = candidate[2..].find("}}") else {
            out.push_str(candidate);
            return out;
        };
        let inner = &candidate[2..2 + close];
        match lookup(store, inner) {
            Some(value) => {
                out.push_str(&value);
                rest = &candidate[close + 4..];
            }
            None => {
                // Not a field: keep one brace and retry from the next one,
                // so `{{{{one.Sentence}}` still resolves its inner token.
                out.push('{');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn lookup(store: &RecordStore, inner: &str) -> Option<String> {
    let (source, field) = inner.split_once('.')?;
    store.get(source)?.get(field).map(|value| value.render())
}

/// Placeholders still present in `rendered`, in order of appearance.
pub fn unresolved(rendered: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = rendered;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start..];
        match after.find("}}") {
            Some(end) => {
                let token = &after[..end + 2];
                if token[2..end].contains('.') {
                    found.push(token);
                }
                rest = &after[end + 2..];
            }
            None => break,
        }
    }
    found
}

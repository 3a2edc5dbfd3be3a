//! Lightweight HTML extraction — marker scoping plus tag/attribute lookup.
//!
//! No DOM: a "scope" is the document from a marker (`class="wea_info"`,
//! `id="bgLink"`) onward, and lookups take the first match inside it.
//! Good enough for the handful of stable pages the sources read.

use regex::Regex;

/// The document from the first occurrence of `marker`, or `None`.
pub fn section<'a>(html: &'a str, marker: &str) -> Option<&'a str> {
    html.find(marker).map(|i| &html[i..])
}

/// Scope starting at the opening tag that carries `marker`.
pub fn enclosing_tag<'a>(html: &'a str, marker: &str) -> Option<&'a str> {
    let at = html.find(marker)?;
    let open = html[..at].rfind('<')?;
    Some(&html[open..])
}

/// Text of the first `<tag ...>...</tag>` in `scope`, tags stripped.
/// `tag` is the bare element name, e.g. `"em"`.
pub fn element_text(scope: &str, tag: &str) -> Option<String> {
    let open = find_open_tag(scope, tag)?;
    let body_start = open + scope[open..].find('>')? + 1;
    let close = format!("</{tag}>");
    let body_end = body_start + scope[body_start..].find(&close)?;
    Some(clean_text(&scope[body_start..body_end]))
}

/// Value of `name` on the first `<tag ...>` in `scope`.
pub fn attr(scope: &str, tag: &str, name: &str) -> Option<String> {
    let open = find_open_tag(scope, tag)?;
    let end = open + scope[open..].find('>')?;
    attr_in(&scope[open..end], name)
}

/// Text node that follows the first child element of the element opening
/// `scope`, e.g. the date in `<div><i class="icon"></i>2026-10-19</div>`.
pub fn text_after_first_child(scope: &str) -> Option<String> {
    let inside = scope.find('>')? + 1;
    let child_close = inside + scope[inside..].find("</")?;
    let after = child_close + scope[child_close..].find('>')? + 1;
    let end = after + scope[after..].find('<').unwrap_or(scope.len() - after);
    let text = clean_text(&scope[after..end]);
    (!text.is_empty()).then_some(text)
}

fn find_open_tag(scope: &str, tag: &str) -> Option<usize> {
    let needle = format!("<{tag}");
    let mut from = 0;
    while let Some(rel) = scope[from..].find(&needle) {
        let at = from + rel;
        let next = scope[at + needle.len()..].chars().next();
        // Skip `<b` matching `<br>`/`<body>`.
        if matches!(next, Some(c) if c == '>' || c == '/' || c.is_whitespace()) {
            return Some(at);
        }
        from = at + needle.len();
    }
    None
}

fn attr_in(tag: &str, name: &str) -> Option<String> {
    let pattern = format!(r#"(?:^|\s){}\s*=\s*(?:"([^"]*)"|'([^']*)')"#, regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(tag)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| decode_entities(m.as_str()))
}

/// Strip tags, decode common entities, collapse whitespace.
pub fn clean_text(html: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    let decoded = decode_entities(&out);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="box">
          <a id="link" href="/x?a=1&amp;b=2" title='Sea &amp; Sky'>go</a>
          <p class="t"> Hello <b>bold</b>
             world </p>
          <br><b>after break</b>
          <div class="time"><i class="icon"></i> 2026-10-19 <span>x</span></div>
        </div>"#;

    #[test]
    fn test_attr_double_and_single_quotes() {
        assert_eq!(attr(PAGE, "a", "href").as_deref(), Some("/x?a=1&b=2"));
        assert_eq!(attr(PAGE, "a", "title").as_deref(), Some("Sea & Sky"));
        assert_eq!(attr(PAGE, "a", "missing"), None);
    }

    #[test]
    fn test_attr_name_must_be_whole_word() {
        let tag = r#"<img data-src="lazy.jpg" src="real.jpg">"#;
        assert_eq!(attr(tag, "img", "src").as_deref(), Some("real.jpg"));
    }

    #[test]
    fn test_element_text_strips_and_collapses() {
        let scope = section(PAGE, r#"class="t""#).unwrap();
        // Scope starts inside the <p> tag, so look up from the enclosing tag.
        let p = enclosing_tag(PAGE, r#"class="t""#).unwrap();
        assert!(scope.len() < p.len());
        assert_eq!(element_text(p, "p").as_deref(), Some("Hello bold world"));
    }

    #[test]
    fn test_open_tag_does_not_match_prefix() {
        let scope = section(PAGE, "<br>").unwrap();
        assert_eq!(element_text(scope, "b").as_deref(), Some("after break"));
    }

    #[test]
    fn test_text_after_first_child() {
        let scope = enclosing_tag(PAGE, r#"class="time""#).unwrap();
        assert_eq!(text_after_first_child(scope).as_deref(), Some("2026-10-19"));
    }

    #[test]
    fn test_enclosing_tag_finds_attribute_owner() {
        let scope = enclosing_tag(PAGE, r#"id="link""#).unwrap();
        assert!(scope.starts_with("<a id=\"link\""));
    }

    #[test]
    fn test_missing_marker() {
        assert!(section(PAGE, "nope").is_none());
        assert!(element_text("<p>unclosed", "p").is_none());
    }
}

//! URL helpers for attribute values.
//!
//! [§ 2.4.5 URLs](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#resolving-urls)
//! [URL Standard](https://url.spec.whatwg.org/)
//!
//! Markup hands us URLs in several dressings: bare attribute values with
//! stray whitespace, CSS `url(...)` functions, quoted strings in `@import`
//! rules. [`parse_url`] strips the dressing, [`resolve_url`] makes the result
//! absolute.

/// Clean a URL as written in markup or CSS.
///
/// - surrounding whitespace is trimmed
/// - a `url(...)` wrapper (any case) is removed
/// - one level of matching `'` or `"` quotes is removed
/// - embedded tabs and line breaks are dropped
///
/// Returns an empty string when nothing is left.
#[must_use]
pub fn parse_url(value: &str) -> String {
    let mut s = value.trim();

    if s.len() >= 4 && s[..4].eq_ignore_ascii_case("url(") {
        s = s[4..].trim_start();
        if let Some(inner) = s.strip_suffix(')') {
            s = inner.trim_end();
        }
    }

    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            s = &s[1..s.len() - 1];
            break;
        }
    }

    s.chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// [§ 4.2.3 The base element](https://html.spec.whatwg.org/multipage/semantics.html#the-base-element)
///
/// Resolve a potentially relative URL against a base URL.
///
/// STEP 1: "If url is an absolute URL, return url."
///
/// STEP 2: "Otherwise, resolve url relative to base."
///
/// NOTE: This covers the shapes found in real documents (scheme-relative,
/// origin-relative, directory-relative with `.`/`..` segments) and does not
/// attempt full URL Standard parsing.
#[must_use]
pub fn resolve_url(href: &str, base_url: Option<&str>) -> String {
    // STEP 1: Check if href is already absolute.
    if has_scheme(href) {
        return href.to_string();
    }

    let Some(base) = base_url else {
        return href.to_string();
    };

    // STEP 2: Resolve relative URL against base.
    if href.is_empty() {
        return base.to_string();
    }

    let Some(scheme_end) = base.find("://") else {
        return href.to_string();
    };
    let scheme = &base[..scheme_end];
    let after_scheme = &base[scheme_end + 3..];
    let (authority, base_path) = after_scheme
        .find('/')
        .map_or((after_scheme, "/"), |i| after_scheme.split_at(i));

    if let Some(rest) = href.strip_prefix("//") {
        return format!("{scheme}://{rest}");
    }

    if href.starts_with('/') {
        return format!("{scheme}://{authority}{}", normalize_path(href));
    }

    if href.starts_with('?') || href.starts_with('#') {
        let cut = base_path
            .find(if href.starts_with('?') { ['?', '#'] } else { ['#', '#'] })
            .unwrap_or(base_path.len());
        return format!("{scheme}://{authority}{}{href}", &base_path[..cut]);
    }

    let base_path = base_path.split(['?', '#']).next().unwrap_or("/");
    let base_dir = base_path.rsplit_once('/').map_or("", |(dir, _)| dir);
    let joined = format!("{base_dir}/{href}");
    format!("{scheme}://{authority}{}", normalize_path(&joined))
}

/// A URL is absolute when it starts with `scheme:` where the scheme is an
/// ASCII letter followed by letters, digits, `+`, `-` or `.`.
fn has_scheme(href: &str) -> bool {
    let Some(colon) = href.find(':') else {
        return false;
    };
    let scheme = &href[..colon];
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Remove `.` and `..` segments from an absolute path, keeping any query or
/// fragment untouched.
fn normalize_path(path: &str) -> String {
    let split_at = path.find(['?', '#']).unwrap_or(path.len());
    let (path, suffix) = path.split_at(split_at);

    let mut segments: Vec<&str> = Vec::new();
    let trailing_slash = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                let _ = segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut out = String::from("/");
    out.push_str(&segments.join("/"));
    if trailing_slash && !segments.is_empty() {
        out.push('/');
    }
    out.push_str(suffix);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_strips_css_wrapper() {
        assert_eq!(parse_url("  url( 'a.css' ) "), "a.css");
        assert_eq!(parse_url("URL(b.css)"), "b.css");
        assert_eq!(parse_url("\"c.css\""), "c.css");
        assert_eq!(parse_url(" d\n.js "), "d.js");
        assert_eq!(parse_url("   "), "");
    }

    #[test]
    fn test_resolve_absolute_is_unchanged() {
        assert_eq!(
            resolve_url("https://x.org/a.js", Some("http://y.org/")),
            "https://x.org/a.js"
        );
        assert_eq!(resolve_url("data:text/plain,hi", None), "data:text/plain,hi");
    }

    #[test]
    fn test_resolve_relative_forms() {
        let base = Some("http://example.com/dir/page.html?q=1");
        assert_eq!(resolve_url("a.js", base), "http://example.com/dir/a.js");
        assert_eq!(resolve_url("../a.js", base), "http://example.com/a.js");
        assert_eq!(resolve_url("/x/./y.css", base), "http://example.com/x/y.css");
        assert_eq!(resolve_url("//cdn.example.com/z.js", base), "http://cdn.example.com/z.js");
        assert_eq!(resolve_url("#top", base), "http://example.com/dir/page.html?q=1#top");
    }

    #[test]
    fn test_resolve_without_base() {
        assert_eq!(resolve_url("a.js", None), "a.js");
    }
}

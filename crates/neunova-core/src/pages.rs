//! Page-range selection
//!
//! Turns user strings like `"1-3, 5, 8-9"` into zero-based page indices.
//! Parsing is permissive: a token that does not make sense for the document
//! is dropped instead of failing the whole request.

/// Resolve a page specification against a document with `total_pages` pages.
///
/// - `a-b` selects pages `a..=b`, clamped to `1..=total_pages`. A range that
///   is empty after clamping selects nothing.
/// - A bare number selects that page if it exists.
/// - Anything unparseable is skipped.
/// - An empty spec selects every page.
///
/// Indices come back in the order they were written, ascending within each
/// range, with duplicates kept.
pub fn resolve(spec: &str, total_pages: usize) -> Vec<usize> {
    if spec.trim().is_empty() {
        return (0..total_pages).collect();
    }

    let total = total_pages as i64;
    let mut indices = Vec::new();

    for part in spec.split(',').map(str::trim) {
        if let Some((start, end)) = part.split_once('-') {
            let (Some(start), Some(end)) = (parse_page_number(start), parse_page_number(end))
            else {
                continue;
            };

            let first = start.max(1);
            let last = end.min(total);
            if first > last {
                continue;
            }

            indices.extend((first..=last).map(|page| (page - 1) as usize));
        } else if let Some(page) = parse_page_number(part) {
            if (1..=total).contains(&page) {
                indices.push((page - 1) as usize);
            }
        }
    }

    indices
}

/// Resolve a spec into one single-page selection per resolved index.
///
/// This is what split uses: each entry becomes its own output document.
pub fn split_selections(spec: &str, total_pages: usize) -> Vec<Vec<usize>> {
    resolve(spec, total_pages)
        .into_iter()
        .map(|index| vec![index])
        .collect()
}

/// Lenient integer parse: leading whitespace and a sign are accepted, and
/// parsing stops at the first non-digit. `"7abc"` is 7, `"abc"` is nothing.
fn parse_page_number(token: &str) -> Option<i64> {
    let token = token.trim_start();
    let (negative, digits) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        seen_digit = true;
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { -value } else { value })
}

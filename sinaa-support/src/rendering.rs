//! Text rendering utilities for human-friendly error messages.
//!
//! Formats construction chains, candidate lists and "did you mean?"
//! suggestions for type names.

/// Renders a construction chain as a readable string.
///
/// # Examples
/// ```
/// use sinaa_support::rendering::render_chain;
///
/// let chain = vec!["SimpleA", "SimpleB", "SimpleA"];
/// assert_eq!(render_chain(&chain), "SimpleA → SimpleB → SimpleA");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    join(chain, " → ")
}

/// Renders a list of type names, comma separated.
///
/// ```
/// use sinaa_support::rendering::render_list;
///
/// assert_eq!(render_list(&["ConcreteB", "ReplacedB"]), "ConcreteB, ReplacedB");
/// ```
pub fn render_list(names: &[impl AsRef<str>]) -> String {
    join(names, ", ")
}

fn join(names: &[impl AsRef<str>], separator: &str) -> String {
    names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Shortens a path-qualified type name for display.
///
/// ```
/// use sinaa_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("app::services::Mailer"), "Mailer");
/// assert_eq!(shorten_type_name("Arc<dyn app::Logger>"), "Arc<dyn Logger>");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut segment_start = 0;

    for (i, ch) in full_name.char_indices() {
        if matches!(ch, '<' | '>' | ',' | ' ') {
            result.push_str(last_segment(&full_name[segment_start..i]));
            result.push(ch);
            segment_start = i + ch.len_utf8();
        }
    }
    result.push_str(last_segment(&full_name[segment_start..]));
    result
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Suggests known names close to `requested`, best match first.
///
/// A name matches when one contains the other (ignoring case and path
/// prefixes) or when it is within a small edit distance.
pub fn suggest_similar(requested: &str, available: &[&str], max_suggestions: usize) -> Vec<String> {
    let wanted = shorten_type_name(requested).to_lowercase();
    if wanted.is_empty() {
        return Vec::new();
    }
    let tolerance = (wanted.chars().count() / 4).max(1);

    let mut scored: Vec<(usize, &str)> = available
        .iter()
        .filter_map(|&name| {
            let candidate = shorten_type_name(name).to_lowercase();
            if candidate == wanted || candidate.contains(&wanted) || wanted.contains(&candidate) {
                return Some((0, name));
            }
            let distance = edit_distance(&candidate, &wanted);
            (distance <= tolerance).then_some((distance, name))
        })
        .collect();

    scored.sort();
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(_, name)| name.to_owned())
        .collect()
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

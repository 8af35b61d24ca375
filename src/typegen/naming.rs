/// TypeScript name for a qualified type name.
///
/// Accepts both `::` and `.` separators and keeps the innermost module segment
/// as a prefix, so `pkg.Greeting` and `app::pkg::Greeting` both become
/// `pkg_Greeting`. A name without any module renders as itself.
///
/// This is the preferred name only: a [`TypeCompiler`](super::TypeCompiler)
/// that meets two different qualified names with the same preferred name
/// gives the later one a longer name.
#[must_use]
pub fn type_name(qualified: &str) -> String {
    scoped_type_name(&qualified_segments(qualified), 0).unwrap_or_default()
}

/// Non-empty segments of a qualified name, split on `::` and `.`.
pub(crate) fn qualified_segments(qualified: &str) -> Vec<&str> {
    qualified
        .split("::")
        .flat_map(|part| part.split('.'))
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// The type segment prefixed by `1 + extra` module segments, joined with `_`.
///
/// `None` once there are not enough module segments left. A bare type
/// name is its own scoped name at `extra == 0`.
pub(crate) fn scoped_type_name(segments: &[&str], extra: usize) -> Option<String> {
    match segments {
        [] => None,
        [name] => (extra == 0).then(|| (*name).to_string()),
        _ => {
            let take = extra + 2;
            (take <= segments.len()).then(|| segments[segments.len() - take..].join("_"))
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Quote a property name unless it is a valid bare identifier.
///
/// An identifier starts with `[A-Za-z_$]` and continues with `[A-Za-z0-9_$]`.
/// Quoted names escape `\` and `'`.
#[must_use]
pub fn escape_property_name(name: &str) -> String {
    let mut chars = name.chars();
    let bare = match chars.next() {
        Some(first) => is_identifier_start(first) && chars.all(is_identifier_part),
        None => false,
    };
    if bare {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

/// Uppercase the first character, leaving the rest untouched.
///
/// `greeting` → `Greeting`, `getPlaylists` → `GetPlaylists`.
#[must_use]
pub fn to_pascal_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

//! Naming conventions shared by the graph builder and chain resolution.

use once_cell::sync::Lazy;
use regex::Regex;

static CLASS_REPR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<class '([^']+)'>$").expect("valid class repr pattern"));
static WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:typing\.)?(?:Optional|Type)\[(.+)\]$").expect("valid wrapper pattern")
});

const OPAQUE_TYPES: &[&str] = &["None", "Any", "typing.Any", "object", "NoneType"];

/// Reduces a declared type annotation to a bare (possibly dotted) class name.
///
/// Returns `None` when the annotation names nothing a class lookup could
/// match: empty, `None`/`Any`, or a generic container.
pub fn normalize_annotation(raw: &str) -> Option<String> {
    let mut current = raw.trim().trim_matches(|c| c == '\'' || c == '"').trim().to_string();

    for _ in 0..4 {
        if let Some(caps) = CLASS_REPR.captures(&current) {
            current = caps[1].trim().to_string();
            continue;
        }
        if let Some(caps) = WRAPPER.captures(&current) {
            current = caps[1].trim().to_string();
            continue;
        }
        if current.contains('|') {
            let parts: Vec<&str> = current
                .split('|')
                .map(str::trim)
                .filter(|p| *p != "None")
                .collect();
            if parts.len() == 1 {
                current = parts[0].to_string();
                continue;
            }
            return None;
        }
        break;
    }

    let current = current.trim_matches(|c| c == '\'' || c == '"');
    if current.is_empty()
        || OPAQUE_TYPES.contains(&current)
        || current.contains(|c: char| c == '[' || c == ',' || c.is_whitespace())
    {
        return None;
    }
    Some(current.to_string())
}

/// `hybrid_bodies` → `HybridBodies`. Already-camel input is returned as is.
pub fn to_camel_case(segment: &str) -> String {
    segment
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// English plural heuristic on the final word of an identifier.
pub fn is_plural(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with('s')
        && !lower.ends_with("ss")
        && !lower.ends_with("us")
        && !lower.ends_with("is")
}

/// Singular form of a plural identifier; `None` when it is not plural.
pub fn singularize(name: &str) -> Option<String> {
    if !is_plural(name) {
        return None;
    }
    let lower = name.to_ascii_lowercase();
    if lower.ends_with("ies") && name.len() > 3 {
        let y = if name.ends_with("IES") { 'Y' } else { 'y' };
        return Some(format!("{}{}", &name[..name.len() - 3], y));
    }
    let es_suffix = ["sses", "xes", "ches", "shes", "zes"]
        .iter()
        .any(|suffix| lower.ends_with(suffix));
    let stem_len = if es_suffix { name.len() - 2 } else { name.len() - 1 };
    Some(name[..stem_len].to_string())
}

/// Second dotted segment of a module path (`pycatia.hybrid_shape_interfaces.x`
/// → `hybrid_shape_interfaces`), or the whole path when it has no dots.
pub fn domain_of(module_path: &str) -> &str {
    let mut parts = module_path.split('.');
    let first = parts.next().unwrap_or("");
    match parts.next() {
        Some(second) if !second.is_empty() => second,
        _ if first.is_empty() => "unknown",
        _ => first,
    }
}

pub fn looks_like_factory(short_name: &str) -> bool {
    short_name.contains("Factory")
}

pub fn looks_like_collection(short_name: &str) -> bool {
    let lower = short_name.to_ascii_lowercase();
    is_plural(short_name)
        || ["collection", "list", "set"]
            .iter()
            .any(|hint| lower.contains(hint))
}

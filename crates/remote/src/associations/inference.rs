//! Naming conventions used to default association options (English-centric)

use super::definition::Cardinality;

pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// `Author` -> `author_id`
pub fn foreign_key_for(local_model: &str) -> String {
    format!("{}_id", to_snake_case(local_model))
}

/// `profile` -> `Profile`, `blog_posts` -> `BlogPost` for many associations
pub fn class_name_for(association: &str, cardinality: Cardinality) -> String {
    let base = match cardinality {
        Cardinality::One => association.to_string(),
        Cardinality::Many => singularize(association),
    };
    to_pascal_case(&base)
}

/// `BlogPost` -> `blog_posts`
pub fn collection_name_for(resource: &str) -> String {
    pluralize(&to_snake_case(resource))
}

pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }

    result
}

pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
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

pub fn pluralize(name: &str) -> String {
    if name.ends_with('y') && !ends_with_any(name, &["ay", "ey", "iy", "oy", "uy"]) {
        format!("{}ies", &name[..name.len() - 1])
    } else if ends_with_any(name, &["s", "sh", "ch", "x", "z"]) {
        format!("{}es", name)
    } else {
        format!("{}s", name)
    }
}

pub fn singularize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        format!("{}y", stem)
    } else if ends_with_any(name, &["ses", "ches", "shes", "xes", "zes"]) {
        name[..name.len() - 2].to_string()
    } else if name.ends_with('s') && !name.ends_with("ss") && name.len() > 1 {
        name[..name.len() - 1].to_string()
    } else {
        name.to_string()
    }
}

fn ends_with_any(name: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|suffix| name.ends_with(suffix))
}

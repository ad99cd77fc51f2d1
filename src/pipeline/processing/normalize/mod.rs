//! Canonical join keys and display forms for facility, state and LGA names.
//!
//! Every function here is deterministic and idempotent: feeding an output
//! back in returns it unchanged.

use serde_json::Value;

/// Punctuation stripped from both ends of a facility key
const KEY_TRIM_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '-', '_'];

/// Canonical join key for a facility name.
///
/// Lowercases, collapses whitespace runs and trims surrounding whitespace and
/// punctuation. Two spellings of the same facility that differ only in case,
/// spacing or trailing punctuation share a key.
pub fn normalize_facility_name(name: &str) -> String {
    let collapsed = collapse_whitespace(&name.to_lowercase());
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || KEY_TRIM_PUNCTUATION.contains(&c))
        .to_string()
}

/// Facility key for an untyped field value; anything but text yields an empty key.
pub fn normalize_facility_value(value: &Value) -> String {
    match value {
        Value::String(name) => normalize_facility_name(name),
        _ => String::new(),
    }
}

/// Canonical state name: drops a leading "state of" or trailing "state",
/// keeps the FCT acronym and title-cases everything else.
pub fn normalize_state(name: &str) -> String {
    let mut cleaned = collapse_whitespace(name);

    loop {
        let stripped = strip_prefix_ignore_case(&cleaned, "state of ")
            .or_else(|| strip_suffix_ignore_case(&cleaned, " state"));
        match stripped {
            Some(rest) => cleaned = rest.trim().to_string(),
            None => break,
        }
    }

    if cleaned.is_empty() {
        return String::new();
    }

    let compact: String = cleaned
        .chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .collect();
    if compact.eq_ignore_ascii_case("fct") {
        return "FCT".to_string();
    }

    title_case(&cleaned)
}

/// Canonical LGA name: whitespace collapsed and title-cased.
pub fn normalize_lga(name: &str) -> String {
    title_case(&collapse_whitespace(name))
}

/// Presentation form of an original (non-normalized) facility name.
pub fn display_name(name: &str) -> String {
    title_case(name.trim())
}

/// Collapse internal whitespace runs to a single space and trim the ends.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let start = value.len().checked_sub(suffix.len())?;
    let tail = value.get(start..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &value[..start])
}

/// Uppercase the first letter of each word and lowercase the rest. A word
/// starts after any character that is neither a letter nor an apostrophe.
/// Letters whose case mapping expands to several characters (`ß`, `İ`) are
/// kept as they are.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.push(single_char(c.to_lowercase()).unwrap_or(c));
            } else {
                out.push(single_char(c.to_uppercase()).unwrap_or(c));
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = c == '\'' && in_word;
        }
    }
    out
}

fn single_char(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    match (mapped.next(), mapped.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_facility_key_ignores_case_spacing_and_punctuation() {
        assert_eq!(
            normalize_facility_name("  ACME   Clinic!! "),
            normalize_facility_name("acme clinic")
        );
        assert_eq!(normalize_facility_name("  ACME   Clinic!! "), "acme clinic");
        assert_eq!(normalize_facility_name("_-PHC Ikeja.-"), "phc ikeja");
        assert_eq!(normalize_facility_name("- Ojo PHC"), "ojo phc");
    }

    #[test]
    fn test_facility_key_is_idempotent() {
        let samples = [
            "  ACME   Clinic!! ",
            "- Ojo PHC",
            "Comprehensive\tHealth   Centre, Ikeja;",
            "!!!",
            "",
            "St. Mary's PHC.",
        ];
        for sample in samples {
            let once = normalize_facility_name(sample);
            assert_eq!(normalize_facility_name(&once), once, "input {:?}", sample);
        }
    }

    #[test]
    fn test_non_text_facility_value_is_empty_key() {
        assert_eq!(normalize_facility_value(&json!(42)), "");
        assert_eq!(normalize_facility_value(&Value::Null), "");
        assert_eq!(normalize_facility_value(&json!(" Ikeja PHC ")), "ikeja phc");
    }

    #[test]
    fn test_state_prefix_and_suffix_are_stripped() {
        assert_eq!(normalize_state("lagos state"), "Lagos");
        assert_eq!(normalize_state("State of  Ogun"), "Ogun");
        assert_eq!(normalize_state("  cross   river STATE "), "Cross River");
        assert_eq!(normalize_state(""), "");
        assert_eq!(normalize_state("   "), "");
    }

    #[test]
    fn test_state_fct_variants() {
        assert_eq!(normalize_state("fct"), "FCT");
        assert_eq!(normalize_state("F.C.T."), "FCT");
        assert_eq!(normalize_state("f. c. t"), "FCT");
        assert_eq!(normalize_state("FCT State"), "FCT");
    }

    #[test]
    fn test_state_is_idempotent() {
        let samples = [
            "lagos state",
            "State of ogun",
            "F.C.T.",
            "Ondo State State",
            "state",
            "akwa ibom",
            "ßa",
            "aİb",
        ];
        for sample in samples {
            let once = normalize_state(sample);
            assert_eq!(normalize_state(&once), once, "input {:?}", sample);
        }
    }

    #[test]
    fn test_lga_and_display_name() {
        assert_eq!(normalize_lga("  ikeja   north "), "Ikeja North");
        assert_eq!(normalize_lga(""), "");
        assert_eq!(display_name("  st. mary's phc "), "St. Mary's Phc");
        assert_eq!(normalize_lga("ßa"), "ßa");
        assert_eq!(display_name("straße"), "Straße");
        for sample in ["ßa ikeja", "aİb"] {
            assert_eq!(normalize_lga(&normalize_lga(sample)), normalize_lga(sample));
            assert_eq!(display_name(&display_name(sample)), display_name(sample));
        }
        assert_eq!(display_name("IKEJA-WEST health centre"), "Ikeja-West Health Centre");
    }
}

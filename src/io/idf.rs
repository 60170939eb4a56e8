//! Reading and writing of simulation-engine input (IDF) object text.
//!
//! An IDF object is a type name followed by comma-separated fields and a
//! terminating semicolon. Everything after `!` on a line is a comment.

use std::fs;
use std::path::Path;

use crate::error::{Result, ScheduleError};

/// Column at which field comments start in commented output.
const COMMENT_COLUMN: usize = 25;

/// Builds the text of a single IDF object.
///
/// With `comments`, each field sits on its own line followed by a `!-`
/// comment aligned to a fixed column. Without them the fields are written
/// one per line with no annotation.
///
/// # Examples
///
/// ```
/// use energy_schedules::io::idf::generate_idf_string;
///
/// let fields = vec!["Fraction".to_string(), "0".to_string()];
/// let text = generate_idf_string("ScheduleTypeLimits", &fields, None);
/// assert_eq!(text, "ScheduleTypeLimits,\n Fraction,\n 0;");
/// ```
pub fn generate_idf_string(
    object_type: &str,
    values: &[String],
    comments: Option<&[&str]>,
) -> String {
    let last = values.len().saturating_sub(1);
    let lines: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, val)| {
            let sep = if i == last { ';' } else { ',' };
            match comments.and_then(|c| c.get(i)) {
                Some(comment) => {
                    let pad = COMMENT_COLUMN.saturating_sub(val.chars().count()).max(1);
                    format!("{val}{sep}{}!- {comment}", " ".repeat(pad))
                }
                None => format!("{val}{sep}"),
            }
        })
        .collect();
    if lines.is_empty() {
        return format!("{object_type};");
    }
    format!("{object_type},\n {}", lines.join("\n "))
}

/// Removes `!` comments from IDF text, line by line.
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|line| match line.find('!') {
            Some(pos) => &line[..pos],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits the text of one IDF object into its fields.
///
/// The object type name is checked (case-insensitively) against
/// `expected_type` when given and is not part of the returned fields.
///
/// # Errors
///
/// Returns [`ScheduleError::Parse`] if the object type does not match, the
/// text holds more than one object, or the terminating `;` is missing.
pub fn parse_idf_string(idf_string: &str, expected_type: Option<&str>) -> Result<Vec<String>> {
    let cleaned = strip_comments(idf_string);
    let cleaned = cleaned.trim();
    if let Some(expected) = expected_type {
        let head = cleaned.split(',').next().unwrap_or("").trim();
        if !head.eq_ignore_ascii_case(expected) {
            return Err(ScheduleError::Parse(format!(
                "expected IDF object {expected} but received {head}"
            )));
        }
    }
    let mut parts = cleaned.split(';');
    let body = parts.next().unwrap_or("");
    let rest: Vec<&str> = parts.collect();
    if rest.is_empty() {
        return Err(ScheduleError::Parse(
            "IDF object is missing its terminating semicolon".to_string(),
        ));
    }
    if rest.iter().any(|r| !r.trim().is_empty()) {
        return Err(ScheduleError::Parse(
            "received more than one object in IDF text".to_string(),
        ));
    }
    let mut fields: Vec<String> = body.split(',').map(|f| f.trim().to_string()).collect();
    fields.remove(0);
    Ok(fields)
}

/// Reads an IDF file and strips all comments from it.
///
/// # Errors
///
/// Returns [`ScheduleError::Io`] if the file cannot be read.
pub fn clean_idf_file_contents(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)?;
    Ok(strip_comments(&content))
}

/// Finds every object of `object_type` in comment-free IDF text.
///
/// Matching of the type name is case-insensitive. Each returned string runs
/// from the type name through its terminating semicolon.
pub fn extract_objects(contents: &str, object_type: &str) -> Vec<String> {
    let haystack = contents.to_ascii_lowercase();
    let needle = format!("{},", object_type.to_ascii_lowercase());
    let mut objects = Vec::new();
    let mut from = 0;
    while let Some(rel) = haystack[from..].find(&needle) {
        let start = from + rel;
        let at_boundary = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| c.is_whitespace() || c == ';');
        if !at_boundary {
            from = start + needle.len();
            continue;
        }
        match contents[start..].find(';') {
            Some(end) => {
                objects.push(contents[start..=start + end].trim().to_string());
                from = start + end + 1;
            }
            None => break,
        }
    }
    objects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commented_output_ends_with_semicolon() {
        let fields = vec!["Fractional".to_string(), "0".to_string(), "1".to_string()];
        let comments = ["name", "lower limit value", "upper limit value"];
        let text = generate_idf_string("ScheduleTypeLimits", &fields, Some(&comments));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ScheduleTypeLimits,");
        assert!(lines[1].starts_with(" Fractional,"));
        assert!(lines[1].ends_with("!- name"));
        assert!(lines[3].starts_with(" 1;"));
    }

    #[test]
    fn parse_strips_comments_and_type() {
        let text = "ScheduleTypeLimits,\n Fractional,  !- name\n 0,  !- lower\n ;  !- upper";
        let fields = parse_idf_string(text, Some("ScheduleTypeLimits"));
        assert_eq!(
            fields.ok(),
            Some(vec!["Fractional".to_string(), "0".to_string(), String::new()])
        );
    }

    #[test]
    fn parse_rejects_wrong_type_and_multiple_objects() {
        assert!(parse_idf_string("Schedule:File, a;", Some("Schedule:Compact")).is_err());
        assert!(parse_idf_string("Schedule:File, a; Schedule:File, b;", None).is_err());
        assert!(parse_idf_string("Schedule:File, a", None).is_err());
    }

    #[test]
    fn extract_is_case_insensitive_and_bounded() {
        let idf = "SCHEDULETYPELIMITS, A, 0, 1;\nSchedule:File, S, A, f.csv;\n\
                   scheduletypelimits,B,,;";
        let objs = extract_objects(idf, "ScheduleTypeLimits");
        assert_eq!(objs.len(), 2);
        assert!(objs[1].starts_with("scheduletypelimits,B"));
        assert!(extract_objects(idf, "Schedule:Compact").is_empty());
    }
}

use record_store::{ValidationErrors, Violation};

pub const MIN_USERNAME_LENGTH: usize = 4;
pub const MAX_USERNAME_LENGTH: usize = 16;
pub const MIN_TITLE_LENGTH: usize = 4;
pub const MAX_TITLE_LENGTH: usize = 32;
pub const MIN_LINE_LENGTH: usize = 4;
pub const MAX_LINE_LENGTH: usize = 1000;

/// Username: 4-16 of `A-Z a-z 0-9 _ . -`
pub fn validate_username(username: &str) -> Result<(), Violation> {
    let valid = has_length(username, MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH)
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

    if valid {
        Ok(())
    } else {
        Err(Violation::InvalidModel)
    }
}

pub fn validate_title(title: &str) -> Result<(), Violation> {
    validate_text(title, MIN_TITLE_LENGTH, MAX_TITLE_LENGTH)
}

pub fn validate_content_line(line: &str) -> Result<(), Violation> {
    validate_text(line, MIN_LINE_LENGTH, MAX_LINE_LENGTH)
}

/// Records a violation for an empty sequence, then one per bad line,
/// named `<field>[<index>]`.
pub fn validate_content(field: &str, lines: &[String], errs: &mut ValidationErrors) {
    if lines.is_empty() {
        errs.append(field, Err(Violation::MissingValue));
        return;
    }
    for (i, line) in lines.iter().enumerate() {
        errs.append(format!("{}[{}]", field, i), validate_content_line(line));
    }
}

fn validate_text(text: &str, min: usize, max: usize) -> Result<(), Violation> {
    if has_length(text, min, max) && text.chars().all(is_text_char) {
        Ok(())
    } else {
        Err(Violation::InvalidModel)
    }
}

fn has_length(text: &str, min: usize, max: usize) -> bool {
    let len = text.chars().count();
    len >= min && len <= max
}

fn is_text_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || (';'..='_').contains(&c)
        || matches!(
            c,
            ' ' | '$' | '@' | '!' | '%' | '*' | '?' | '&' | '#' | '\'' | '^' | '+' | '.'
        )
}

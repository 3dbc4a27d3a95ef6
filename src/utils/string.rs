//! String case conversion for controller and action names
//!
//! Controllers and actions arrive in whatever case the router produced
//! (`UserProfile`, `showList`, `admin.UserProfile`); view files on disk are
//! named in snake_case.

/// Convert a camel/Pascal case identifier to snake_case
///
/// An underscore is inserted before every uppercase letter that has a
/// preceding character, then the result is lowercased. Whitespace separates
/// words the same way a case change does. Input without uppercase letters is
/// returned unchanged.
///
/// # Example
/// ```rust
/// use rustf_view_driver::utils::to_snake_case;
///
/// assert_eq!(to_snake_case("UserProfile"), "user_profile");
/// assert_eq!(to_snake_case("showList"), "show_list");
/// assert_eq!(to_snake_case("index"), "index");
/// ```
pub fn to_snake_case(input: &str) -> String {
    if !input.chars().any(char::is_uppercase) && !input.chars().any(char::is_whitespace) {
        return input.to_string();
    }

    // Capitalise each word and drop the whitespace between them
    let mut compact = String::with_capacity(input.len());
    let mut word_start = true;
    for c in input.chars() {
        if c.is_whitespace() {
            word_start = true;
            continue;
        }
        if word_start {
            compact.extend(c.to_uppercase());
        } else {
            compact.push(c);
        }
        word_start = false;
    }

    let mut result = String::with_capacity(compact.len() + 4);
    for (i, c) in compact.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

/// snake_case only the segment after the last `.` of a dotted name
///
/// Namespace segments keep their case: `admin.UserProfile` becomes
/// `admin.user_profile`. Names without a dot are converted whole.
pub fn to_snake_case_last_segment(input: &str) -> String {
    match input.rfind('.') {
        Some(pos) if pos > 0 => {
            format!("{}.{}", &input[..pos], to_snake_case(&input[pos + 1..]))
        }
        _ => to_snake_case(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("UserProfile"), "user_profile");
        assert_eq!(to_snake_case("showList"), "show_list");
        assert_eq!(to_snake_case("Index"), "index");
        assert_eq!(to_snake_case("index"), "index");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_snake_case_acronyms_split_per_letter() {
        assert_eq!(to_snake_case("HTMLParser"), "h_t_m_l_parser");
    }

    #[test]
    fn test_snake_case_whitespace() {
        assert_eq!(to_snake_case("user profile"), "user_profile");
        assert_eq!(to_snake_case("Hello World Test"), "hello_world_test");
    }

    #[test]
    fn test_last_segment_only() {
        assert_eq!(to_snake_case_last_segment("blog.post"), "blog.post");
        assert_eq!(
            to_snake_case_last_segment("Admin.UserProfile"),
            "Admin.user_profile"
        );
        assert_eq!(to_snake_case_last_segment("a.b.ShowItem"), "a.b.show_item");
        assert_eq!(to_snake_case_last_segment("UserProfile"), "user_profile");
    }
}

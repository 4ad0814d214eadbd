//! XML 1.0 name and character rules.

use std::borrow::Cow;

use quick_xml::escape::escape;

/// Returns `true` if `name` can be used verbatim as an XML element name.
///
/// Follows the XML 1.0 `Name` production, except that `:` is refused: a
/// prefixed name would need a namespace declaration the document never has.
pub fn is_valid_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-'
            | '.'
            | '0'..='9'
            | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

/// Returns `true` if `c` may appear in an XML 1.0 document.
pub fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t'
        | '\n'
        | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Escapes a value for use as element text.
///
/// Carriage returns become `&#13;`, otherwise a parser would normalize
/// them away.
pub fn escape_text(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if escaped.contains('\r') {
        Cow::Owned(escaped.replace('\r', "&#13;"))
    } else {
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_header_names() {
        for name in ["Name", "first_name", "_id", "price.eur", "col-2", "Größe", "名前"] {
            assert!(is_valid_element_name(name), "{} should be valid", name);
        }
    }

    #[test]
    fn rejects_illegal_names() {
        for name in ["", "1st", "-x", ".x", "first name", "a<b", "ns:tag", "a&b", "\"q\""] {
            assert!(!is_valid_element_name(name), "{:?} should be invalid", name);
        }
    }

    #[test]
    fn control_characters_are_not_xml() {
        assert!(is_xml_char('\t'));
        assert!(is_xml_char('é'));
        assert!(!is_xml_char('\u{0}'));
        assert!(!is_xml_char('\u{1B}'));
        assert!(!is_xml_char('\u{FFFE}'));
    }

    #[test]
    fn escapes_markup_and_quotes() {
        assert_eq!(
            escape_text("<tag> & \"quote\""),
            "&lt;tag&gt; &amp; &quot;quote&quot;"
        );
        assert_eq!(escape_text("plain"), "plain");
        assert_eq!(escape_text("a\r\nb"), "a&#13;\nb");
    }
}

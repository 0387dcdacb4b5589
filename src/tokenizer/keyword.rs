//! Reserved words of the language.
//!
//! Keywords are recognized after an identifier has been scanned: a word is a
//! keyword only when it is spelled exactly like one (`Agent` is an identifier).

/// Keywords lead statements (`agent`, `run`, ...) or join their parts
/// (`with`, `message`, `on_error`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Keyword {
    Agent,
    Tool,
    Pipeline,
    Run,
    With,
    Let,
    Config,
    OnError,
    Send,
    Message,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_keyword_spelling() {
        assert_eq!(Keyword::from_str("on_error"), Ok(Keyword::OnError));
        assert_eq!(Keyword::from_str("pipeline"), Ok(Keyword::Pipeline));
        assert!(Keyword::from_str("Agent").is_err());
        assert!(Keyword::from_str("onError").is_err());
    }

    #[test]
    fn test_keyword_roundtrip_display() {
        for keyword in Keyword::iter() {
            assert_eq!(Keyword::from_str(keyword.as_ref()), Ok(keyword));
        }
        assert_eq!(Keyword::iter().count(), 10);
    }
}

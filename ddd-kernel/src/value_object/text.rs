use super::{ValueObject, check_limits};
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// 文本长度限制（按字符计）
pub trait TextLimits: 'static {
    const TYPE_NAME: &'static str = "text";
    const MIN_CHARS: Option<usize> = None;
    const MAX_CHARS: Option<usize> = None;
}

/// 不限制长度的文本
#[derive(Debug)]
pub enum AnyText {}

impl TextLimits for AnyText {}

/// 文本
///
/// ```
/// use ddd_kernel::value_object::{Text, TextLimits};
///
/// enum Title {}
/// impl TextLimits for Title {
///     const TYPE_NAME: &'static str = "title";
///     const MAX_CHARS: Option<usize> = Some(5);
/// }
///
/// assert!(Text::<Title>::new("héllo").is_ok());
/// assert!(Text::<Title>::new("héllo!").is_err());
/// ```
pub struct Text<L = AnyText> {
    text: String,
    _limits: PhantomData<fn() -> L>,
}

impl<L: TextLimits> Text<L> {
    pub fn new(text: impl Into<String>) -> DomainResult<Self> {
        let text = Self {
            text: text.into(),
            _limits: PhantomData,
        };
        text.validate()?;
        Ok(text)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl<L: TextLimits> ValueObject for Text<L> {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        check_limits(L::TYPE_NAME, L::MIN_CHARS, L::MAX_CHARS, self.char_len())
    }
}

impl<L> Clone for Text<L> {
    fn clone(&self) -> Self {
        Self {
            text: self.text.clone(),
            _limits: PhantomData,
        }
    }
}

impl<L> PartialEq for Text<L> {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl<L> Eq for Text<L> {}

impl<L> Hash for Text<L> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl<L> AsRef<str> for Text<L> {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl<L: TextLimits> fmt::Debug for Text<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(L::TYPE_NAME).field(&self.text).finish()
    }
}

impl<L> fmt::Display for Text<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl<L> Serialize for Text<L> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de, L: TextLimits> Deserialize<'de> for Text<L> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::new(text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Code {}

    impl TextLimits for Code {
        const TYPE_NAME: &'static str = "code";
        const MIN_CHARS: Option<usize> = Some(2);
        const MAX_CHARS: Option<usize> = Some(4);
    }

    enum Inverted {}

    impl TextLimits for Inverted {
        const MIN_CHARS: Option<usize> = Some(4);
        const MAX_CHARS: Option<usize> = Some(2);
    }

    #[test]
    fn length_is_counted_in_characters() {
        let code = Text::<Code>::new("жёлт").unwrap();
        assert_eq!(code.char_len(), 4);
        assert_eq!(code.as_str().len(), 8);
    }

    #[test]
    fn enforces_both_bounds() {
        assert!(matches!(
            Text::<Code>::new("a"),
            Err(DomainError::ValueTooSmall { type_name: "code", .. })
        ));
        assert!(matches!(
            Text::<Code>::new("abcde"),
            Err(DomainError::ValueTooLarge { .. })
        ));
        assert!(matches!(
            Text::<Inverted>::new("abc"),
            Err(DomainError::InvalidLimits { type_name: "text", .. })
        ));
        assert!(Text::<AnyText>::new("").is_ok());
    }

    #[test]
    fn serde_validates_length() {
        let code: Text<Code> = serde_json::from_str("\"ab\"").unwrap();
        assert_eq!(code.to_string(), "ab");
        assert!(serde_json::from_str::<Text<Code>>("\"abcdef\"").is_err());
    }
}

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::core::TypeDescriptor;
use super::describe::Describe;

/// A value that is either present or `null` on the wire.
///
/// `Choice` is the building block for sum types the client language has no
/// native encoding for. A struct whose fields are all `Choice`s is read as a
/// tagged union: exactly one field is expected to be set.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use tsbridge::{Choice, Describe};
///
/// #[derive(Serialize, Deserialize, Describe)]
/// struct Payment {
///     card: Choice<String>,
///     iban: Choice<String>,
/// }
///
/// let payment: Payment = serde_json::from_str(r#"{"card": "4242"}"#).unwrap();
/// assert_eq!(payment.card.get(), Some(&"4242".to_string()));
/// assert!(payment.iban.is_none());
/// ```
///
/// In generated clients the payload type is unwrapped and the field becomes
/// optional: `card?: string`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Choice<T>(Option<T>);

impl<T> Choice<T> {
    pub fn some(value: T) -> Self {
        Choice(Some(value))
    }

    pub fn none() -> Self {
        Choice(None)
    }

    #[must_use]
    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice(None)
    }
}

impl<T> From<Option<T>> for Choice<T> {
    fn from(value: Option<T>) -> Self {
        Choice(value)
    }
}

impl<T: Serialize> Serialize for Choice<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

// Delegating to `Option` keeps serde's missing-field handling: an absent
// `Choice` field decodes as `none()`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Choice<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Choice)
    }
}

impl<T: Describe> Describe for Choice<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::wrapper(T::describe())
    }
}

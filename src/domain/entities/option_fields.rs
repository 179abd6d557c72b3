use serde::{Deserialize, Deserializer};

/// A nullable field in an update body.
///
/// An absent key (with `#[serde(default)]`) is `Unchanged`, an explicit `null`
/// is `SetToNull`, anything else is `SetToValue`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OptionField<T> {
    #[default]
    Unchanged,
    SetToNull,
    SetToValue(T),
}

pub type PatchString = OptionField<String>;

impl<'de, T> Deserialize<'de> for OptionField<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(OptionField::from)
    }
}

impl<T> From<Option<T>> for OptionField<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(OptionField::SetToNull, OptionField::SetToValue)
    }
}

impl<T> OptionField<T> {
    /// Writes the patch into a stored value.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            OptionField::Unchanged => {}
            OptionField::SetToNull => *target = None,
            OptionField::SetToValue(v) => *target = Some(v),
        }
    }

    /// The value a field would have if there were nothing stored to keep.
    pub fn into_value(self) -> Option<T> {
        match self {
            OptionField::SetToValue(v) => Some(v),
            OptionField::Unchanged | OptionField::SetToNull => None,
        }
    }
}

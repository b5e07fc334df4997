/// Represents a field update operation for partial updates
///
/// This type provides a clear, three-state pattern for updating optional fields:
/// - `NoChange`: Field keeps its existing value
/// - `Set(value)`: Field is updated to the provided value
/// - `Clear`: Field is cleared (set to None)
///
/// # Example
///
/// ```
/// use datebook_domain::FieldUpdate;
///
/// let time_update = FieldUpdate::Set("09:30".to_string());
/// let note_update: FieldUpdate<String> = FieldUpdate::Clear;
/// let priority_update: FieldUpdate<i64> = FieldUpdate::NoChange;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Do not modify this field (keep existing value)
    NoChange,
    /// Set the field to the provided value
    Set(T),
    /// Clear the field (set to None)
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::NoChange
    }
}

impl<T> FieldUpdate<T> {
    /// Apply this update to an optional field
    ///
    /// # Example
    ///
    /// ```
    /// use datebook_domain::FieldUpdate;
    ///
    /// let mut field = Some("08:00".to_string());
    /// let update = FieldUpdate::Set("09:30".to_string());
    /// update.apply_to(&mut field);
    /// assert_eq!(field, Some("09:30".to_string()));
    ///
    /// let clear = FieldUpdate::Clear;
    /// clear.apply_to(&mut field);
    /// assert_eq!(field, None);
    /// ```
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }

    /// Check if this represents a change (not NoChange)
    pub fn is_change(&self) -> bool {
        !matches!(self, FieldUpdate::NoChange)
    }

    /// Transform the carried value, keeping the update kind
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FieldUpdate<U> {
        match self {
            FieldUpdate::NoChange => FieldUpdate::NoChange,
            FieldUpdate::Set(value) => FieldUpdate::Set(f(value)),
            FieldUpdate::Clear => FieldUpdate::Clear,
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// Convert Option<T> to FieldUpdate<T>
    /// - Some(value) becomes Set(value)
    /// - None becomes Clear
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_change_keeps_value() {
        let mut priority = Some(3);
        FieldUpdate::NoChange.apply_to(&mut priority);
        assert_eq!(priority, Some(3));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(FieldUpdate::from(Some(2)), FieldUpdate::Set(2));
        assert_eq!(FieldUpdate::<i64>::from(None), FieldUpdate::Clear);
    }

    #[test]
    fn test_map_preserves_kind() {
        let update = FieldUpdate::Set(" 10:00 ".to_string()).map(|t| t.trim().to_string());
        assert_eq!(update, FieldUpdate::Set("10:00".to_string()));
        assert_eq!(FieldUpdate::<String>::Clear.map(|t| t.len()), FieldUpdate::Clear);
    }
}

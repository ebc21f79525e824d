//! Column sorting shared by every table.
//!
//! Sorting is a pure derivation: views keep their rows in arrival order and
//! call [`sorted`] on every render. The sorted sequence is never written back.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Sort direction of a table column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Header arrow for the active column.
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "↑",
            Self::Descending => "↓",
        }
    }
}

/// Active sort column and direction of one table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortConfig<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: Copy + PartialEq> SortConfig<K> {
    pub fn new(key: K, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Applies a header click.
    ///
    /// Clicking the active column flips its direction; clicking any other
    /// column selects it ascending.
    pub fn request(&mut self, key: K) {
        if self.key == key {
            self.direction = self.direction.toggled();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }

    /// Arrow to draw next to `key`'s header, if it is the active column.
    pub fn indicator(&self, key: K) -> Option<&'static str> {
        (self.key == key).then(|| self.direction.arrow())
    }
}

/// A cell value as seen by the comparator.
#[derive(Clone, Debug, PartialEq)]
pub enum SortValue {
    /// Absent value; always ordered after every present value.
    Null,
    Number(Decimal),
    Time(NaiveDateTime),
    Text(String),
}

impl SortValue {
    /// Builds a value from text, treating numeric-looking strings as numbers.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        match Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed)) {
            Ok(number) if !trimmed.is_empty() => Self::Number(number),
            _ => Self::Text(value),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Time(_) => 1,
            Self::Text(_) => 2,
            Self::Null => 3,
        }
    }

    /// Orders two present values; mixed kinds fall back to a fixed kind order.
    fn cmp_present(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<Option<Decimal>> for SortValue {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Self::Null, Self::Number)
    }
}

impl From<Decimal> for SortValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<Option<NaiveDateTime>> for SortValue {
    fn from(value: Option<NaiveDateTime>) -> Self {
        value.map_or(Self::Null, Self::Time)
    }
}

impl From<Option<&str>> for SortValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Self::Null, Self::text)
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

/// A row type whose columns can be sorted.
pub trait Sortable {
    /// Column identifier.
    type Key: Copy + PartialEq;

    /// Returns the value of column `key` for this row.
    fn sort_value(&self, key: Self::Key) -> SortValue;
}

/// Compares two cells under `direction`; nulls go last either way.
pub fn compare(a: &SortValue, b: &SortValue, direction: SortDirection) -> Ordering {
    match (a, b) {
        (SortValue::Null, SortValue::Null) => Ordering::Equal,
        (SortValue::Null, _) => Ordering::Greater,
        (_, SortValue::Null) => Ordering::Less,
        _ => {
            let ordering = a.cmp_present(b);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
    }
}

/// Returns `rows` ordered by `config`. Stable for equal keys.
pub fn sorted<'a, T: Sortable>(rows: &'a [T], config: &SortConfig<T::Key>) -> Vec<&'a T> {
    let mut keyed: Vec<(SortValue, &T)> = rows
        .iter()
        .map(|row| (row.sort_value(config.key), row))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare(a, b, config.direction));
    keyed.into_iter().map(|(_, row)| row).collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        score: Option<Decimal>,
        label: Option<&'static str>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Col {
        Score,
        Label,
    }

    impl Sortable for Row {
        type Key = Col;

        fn sort_value(&self, key: Col) -> SortValue {
            match key {
                Col::Score => self.score.into(),
                Col::Label => self.label.into(),
            }
        }
    }

    fn row(id: u32, score: Option<Decimal>, label: Option<&'static str>) -> Row {
        Row { id, score, label }
    }

    fn ids(rows: &[&Row]) -> Vec<u32> {
        rows.iter().map(|r| r.id).collect()
    }

    fn sample() -> Vec<Row> {
        vec![
            row(1, Some(dec!(5)), Some("beta")),
            row(2, None, Some("10")),
            row(3, Some(dec!(-1)), None),
            row(4, Some(dec!(5)), Some("9")),
            row(5, Some(dec!(12.5)), Some("alpha")),
        ]
    }

    #[test]
    fn request_toggles_active_and_resets_new_key() {
        let mut config = SortConfig::new(Col::Score, SortDirection::Descending);
        config.request(Col::Score);
        assert_eq!(config.direction, SortDirection::Ascending);
        config.request(Col::Score);
        assert_eq!(config.direction, SortDirection::Descending);
        config.request(Col::Label);
        assert_eq!(config, SortConfig::new(Col::Label, SortDirection::Ascending));
        assert_eq!(config.indicator(Col::Label), Some("↑"));
        assert_eq!(config.indicator(Col::Score), None);
    }

    #[test]
    fn nulls_last_in_both_directions() {
        let rows = sample();
        let asc = sorted(&rows, &SortConfig::new(Col::Score, SortDirection::Ascending));
        assert_eq!(ids(&asc), vec![3, 1, 4, 5, 2]);

        let desc = sorted(&rows, &SortConfig::new(Col::Score, SortDirection::Descending));
        assert_eq!(ids(&desc), vec![5, 1, 4, 3, 2]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let rows = sample();
        let desc = sorted(&rows, &SortConfig::new(Col::Score, SortDirection::Descending));
        let pos1 = desc.iter().position(|r| r.id == 1).unwrap();
        let pos4 = desc.iter().position(|r| r.id == 4).unwrap();
        assert!(pos1 < pos4);
    }

    #[test]
    fn numeric_strings_compare_numerically() {
        let rows = sample();
        let asc = sorted(&rows, &SortConfig::new(Col::Label, SortDirection::Ascending));
        // "9" < "10" numerically, numbers before text, null last.
        assert_eq!(ids(&asc), vec![4, 2, 5, 1, 3]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let rows = sample();
        for key in [Col::Score, Col::Label] {
            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                let config = SortConfig::new(key, direction);
                let once: Vec<Row> = sorted(&rows, &config).into_iter().cloned().collect();
                let twice: Vec<Row> = sorted(&once, &config).into_iter().cloned().collect();
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn sorting_does_not_touch_source() {
        let rows = sample();
        let before = rows.clone();
        let _ = sorted(&rows, &SortConfig::new(Col::Score, SortDirection::Descending));
        assert_eq!(rows, before);
    }
}

//! Record descriptors
//!
//! Every persisted entity declares an ordered list of fields with a semantic
//! type. The repository builds its SQL from that list and decodes rows back
//! through it, so the declaration order is the single source of column order.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};

use crate::error::{BookkeeperError, BookkeeperResult};

/// Text encoding for date columns
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text encoding for date-time columns. `%.f` prints nothing for a zero
/// fraction and accepts a missing fraction when parsing.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Name of the primary-key column shared by every table
pub const PK_COLUMN: &str = "pk";

/// Semantic type of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Real,
    Text,
    Date,
    DateTime,
    /// Nullable id of another record
    Reference,
}

/// A single declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub field_type: FieldType,
}

impl Field {
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self { name, field_type }
    }
}

/// A field value in its in-memory form
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl FieldValue {
    /// Coerce a raw stored value according to the declared field type
    ///
    /// Date and date-time fields are stored as text and parsed back here;
    /// everything else passes through unchanged.
    pub fn decode(field: &Field, raw: Value) -> BookkeeperResult<Self> {
        match (field.field_type, raw) {
            (_, Value::Null) => Ok(Self::Null),
            (FieldType::Date, Value::Text(text)) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
                .map(Self::Date)
                .map_err(|e| BookkeeperError::decode(field.name, format!("'{}': {}", text, e))),
            (FieldType::DateTime, Value::Text(text)) => {
                NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT)
                    .map(Self::DateTime)
                    .map_err(|e| {
                        BookkeeperError::decode(field.name, format!("'{}': {}", text, e))
                    })
            }
            (FieldType::Date | FieldType::DateTime, other) => Err(BookkeeperError::decode(
                field.name,
                format!("expected ISO-8601 text, found {:?}", other.data_type()),
            )),
            (_, Value::Integer(v)) => Ok(Self::Integer(v)),
            (_, Value::Real(v)) => Ok(Self::Real(v)),
            (_, Value::Text(v)) => Ok(Self::Text(v)),
            (_, Value::Blob(_)) => Err(BookkeeperError::decode(
                field.name,
                "blob values are not supported",
            )),
        }
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(Value::Null),
            Self::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            Self::Real(v) => ToSqlOutput::Owned(Value::Real(*v)),
            Self::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Self::Date(v) => ToSqlOutput::Owned(Value::Text(v.format(DATE_FORMAT).to_string())),
            Self::DateTime(v) => {
                ToSqlOutput::Owned(Value::Text(v.format(DATETIME_FORMAT).to_string()))
            }
        })
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Real(v) => write!(f, "{}", v),
            Self::Text(v) => write!(f, "{}", v),
            Self::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            Self::DateTime(v) => write!(f, "{}", v.format(DATETIME_FORMAT)),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// An entity that can be persisted by a repository
///
/// `FIELDS` lists every stored field except the primary key, in the order
/// `values()` produces them and `from_values()` consumes them.
pub trait Record: Clone + fmt::Debug {
    /// Type name; the table is its lower-cased form
    const TYPE_NAME: &'static str;

    /// Declared fields, primary key excluded
    const FIELDS: &'static [Field];

    /// Primary key, 0 while unsaved
    fn pk(&self) -> i64;

    fn set_pk(&mut self, pk: i64);

    /// Field values in declaration order
    fn values(&self) -> Vec<FieldValue>;

    /// Rebuild a record from decoded values in declaration order
    fn from_values(pk: i64, values: RecordValues) -> BookkeeperResult<Self>;

    fn table_name() -> String {
        Self::TYPE_NAME.to_lowercase()
    }

    /// Position of a declared field, `None` for unknown names and for `pk`
    fn field_index(name: &str) -> Option<usize> {
        Self::FIELDS.iter().position(|f| f.name == name)
    }
}

/// Sequential reader over decoded values, used by `Record::from_values`
#[derive(Debug)]
pub struct RecordValues {
    fields: &'static [Field],
    values: std::vec::IntoIter<FieldValue>,
    position: usize,
}

impl RecordValues {
    pub fn new(fields: &'static [Field], values: Vec<FieldValue>) -> Self {
        Self {
            fields,
            values: values.into_iter(),
            position: 0,
        }
    }

    fn next_value(&mut self) -> BookkeeperResult<(&'static str, FieldValue)> {
        let name = self
            .fields
            .get(self.position)
            .map(|f| f.name)
            .unwrap_or("<extra>");
        self.position += 1;
        let value = self
            .values
            .next()
            .ok_or_else(|| BookkeeperError::decode(name, "missing value"))?;
        Ok((name, value))
    }

    pub fn integer(&mut self) -> BookkeeperResult<i64> {
        match self.next_value()? {
            (_, FieldValue::Integer(v)) => Ok(v),
            (name, other) => Err(mismatch(name, "integer", &other)),
        }
    }

    pub fn real(&mut self) -> BookkeeperResult<f64> {
        match self.next_value()? {
            (_, FieldValue::Real(v)) => Ok(v),
            (_, FieldValue::Integer(v)) => Ok(v as f64),
            (name, other) => Err(mismatch(name, "real", &other)),
        }
    }

    pub fn text(&mut self) -> BookkeeperResult<String> {
        match self.next_value()? {
            (_, FieldValue::Text(v)) => Ok(v),
            (name, other) => Err(mismatch(name, "text", &other)),
        }
    }

    pub fn date(&mut self) -> BookkeeperResult<NaiveDate> {
        match self.next_value()? {
            (_, FieldValue::Date(v)) => Ok(v),
            (name, other) => Err(mismatch(name, "date", &other)),
        }
    }

    pub fn datetime(&mut self) -> BookkeeperResult<NaiveDateTime> {
        match self.next_value()? {
            (_, FieldValue::DateTime(v)) => Ok(v),
            (name, other) => Err(mismatch(name, "date-time", &other)),
        }
    }

    pub fn reference(&mut self) -> BookkeeperResult<Option<i64>> {
        match self.next_value()? {
            (_, FieldValue::Null) => Ok(None),
            (_, FieldValue::Integer(v)) => Ok(Some(v)),
            (name, other) => Err(mismatch(name, "reference", &other)),
        }
    }
}

fn mismatch(field: &str, expected: &str, found: &FieldValue) -> BookkeeperError {
    BookkeeperError::decode(field, format!("expected {}, found {:?}", expected, found))
}

/// Conjunction of exact-match terms for `get_all`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    terms: Vec<(String, FieldValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality term
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.terms.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[(String, FieldValue)] {
        &self.terms
    }

    /// Reject names that are neither declared fields of `T` nor `pk`
    ///
    /// Field names end up interpolated into SQL, so this runs before any
    /// statement is built.
    pub fn validate<T: Record>(&self) -> BookkeeperResult<()> {
        for (name, _) in &self.terms {
            if name != PK_COLUMN && T::field_index(name).is_none() {
                return Err(BookkeeperError::InvalidState(format!(
                    "{} has no field '{}'",
                    T::TYPE_NAME,
                    name
                )));
            }
        }
        Ok(())
    }

    /// Evaluate the filter against an in-memory record
    ///
    /// Values are compared the way a column of the field's declared type
    /// compares them: numbers by value, dates by their stored text.
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        let values = record.values();
        self.terms.iter().all(|(name, expected)| {
            if name == PK_COLUMN {
                let actual = FieldValue::Integer(record.pk());
                return comparable(FieldType::Integer, &actual)
                    == comparable(FieldType::Integer, expected);
            }
            T::field_index(name).map_or(false, |i| {
                values.get(i).map_or(false, |actual| {
                    let field_type = T::FIELDS[i].field_type;
                    comparable(field_type, actual) == comparable(field_type, expected)
                })
            })
        })
    }
}

/// A value as a column of `field_type` would hold it
///
/// Numeric columns hold reals (numeric text is converted), text and date
/// columns hold text.
fn comparable(field_type: FieldType, value: &FieldValue) -> FieldValue {
    let numeric = matches!(
        field_type,
        FieldType::Integer | FieldType::Real | FieldType::Reference
    );
    match value {
        FieldValue::Null => FieldValue::Null,
        FieldValue::Integer(v) if numeric => FieldValue::Real(*v as f64),
        FieldValue::Real(v) if numeric => FieldValue::Real(*v),
        FieldValue::Text(t) if numeric => t
            .trim()
            .parse::<f64>()
            .map(FieldValue::Real)
            .unwrap_or_else(|_| FieldValue::Text(t.clone())),
        FieldValue::Real(v) => FieldValue::Text(format!("{:?}", v)),
        other => FieldValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATE_FIELD: Field = Field::new("expense_date", FieldType::Date);
    const DATETIME_FIELD: Field = Field::new("added_date", FieldType::DateTime);
    const TEXT_FIELD: Field = Field::new("comment", FieldType::Text);

    #[test]
    fn test_decode_date() {
        let value = FieldValue::decode(&DATE_FIELD, Value::Text("2024-03-01".into())).unwrap();
        assert_eq!(
            value,
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_decode_datetime_with_and_without_fraction() {
        let whole = FieldValue::decode(&DATETIME_FIELD, Value::Text("2024-03-01 10:20:30".into()))
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 20, 30)
            .unwrap();
        assert_eq!(whole, FieldValue::DateTime(expected));

        let fractional = FieldValue::decode(
            &DATETIME_FIELD,
            Value::Text("2024-03-01 10:20:30.123456".into()),
        )
        .unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_micro_opt(10, 20, 30, 123_456)
            .unwrap();
        assert_eq!(fractional, FieldValue::DateTime(expected));
    }

    #[test]
    fn test_decode_bad_date_text() {
        let err = FieldValue::decode(&DATE_FIELD, Value::Text("yesterday".into())).unwrap_err();
        assert!(matches!(err, BookkeeperError::Decode { .. }));
    }

    #[test]
    fn test_decode_passes_other_types_through() {
        let value = FieldValue::decode(&TEXT_FIELD, Value::Text("lunch".into())).unwrap();
        assert_eq!(value, FieldValue::Text("lunch".into()));
        let null = FieldValue::decode(&DATE_FIELD, Value::Null).unwrap();
        assert_eq!(null, FieldValue::Null);
    }

    #[test]
    fn test_datetime_text_encoding() {
        let whole = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(FieldValue::DateTime(whole).to_string(), "2024-01-02 03:04:05");
    }

    #[test]
    fn test_record_values_reader() {
        const FIELDS: &[Field] = &[
            Field::new("name", FieldType::Text),
            Field::new("parent_id", FieldType::Reference),
        ];
        let mut values = RecordValues::new(FIELDS, vec!["food".into(), FieldValue::Null]);
        assert_eq!(values.text().unwrap(), "food");
        assert_eq!(values.reference().unwrap(), None);
        assert!(values.text().is_err());
    }

    #[test]
    fn test_record_values_type_mismatch_names_field() {
        const FIELDS: &[Field] = &[Field::new("amount", FieldType::Real)];
        let mut values = RecordValues::new(FIELDS, vec!["ten".into()]);
        match values.real().unwrap_err() {
            BookkeeperError::Decode { field, .. } => assert_eq!(field, "amount"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_filter_compares_by_declared_type() {
        #[derive(Debug, Clone)]
        struct Row {
            amount: f64,
            day: NaiveDate,
            pk: i64,
        }

        impl Record for Row {
            const TYPE_NAME: &'static str = "Row";
            const FIELDS: &'static [Field] = &[
                Field::new("amount", FieldType::Real),
                Field::new("day", FieldType::Date),
            ];

            fn pk(&self) -> i64 {
                self.pk
            }

            fn set_pk(&mut self, pk: i64) {
                self.pk = pk;
            }

            fn values(&self) -> Vec<FieldValue> {
                vec![self.amount.into(), self.day.into()]
            }

            fn from_values(pk: i64, mut values: RecordValues) -> BookkeeperResult<Self> {
                Ok(Self {
                    amount: values.real()?,
                    day: values.date()?,
                    pk,
                })
            }
        }

        let row = Row {
            amount: 5.0,
            day: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            pk: 3,
        };

        assert!(Filter::new().eq("amount", 5_i64).matches(&row));
        assert!(Filter::new().eq("amount", "5").matches(&row));
        assert!(!Filter::new().eq("amount", 5.5).matches(&row));
        assert!(Filter::new().eq("day", "2024-01-01").matches(&row));
        assert!(!Filter::new().eq("day", "2024-01-02").matches(&row));
        assert!(Filter::new().eq("pk", 3.0).matches(&row));
        assert!(!Filter::new().eq("day", FieldValue::Null).matches(&row));
    }

    #[test]
    fn test_option_into_field_value() {
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(4_i64)), FieldValue::Integer(4));
    }
}

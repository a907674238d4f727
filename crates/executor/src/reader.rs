//! Forward-only row reader
//!
//! A [`DataReader`] walks the rows of a query result. Object rows expose
//! their fields as columns in document order; a scalar row (from a `VALUE`
//! projection) exposes one column named `$1`.

use cosmosql_core::Document;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::discriminator::RecordType;
use crate::{Error, Result};

/// Column name given to scalar rows.
pub const SCALAR_COLUMN: &str = "$1";

/// Forward-only reader over query rows.
#[derive(Debug, Clone)]
pub struct DataReader {
    rows: Vec<Value>,
    position: Option<usize>,
    record_type: RecordType,
}

impl DataReader {
    /// Create a reader positioned before the first row.
    pub fn new(rows: Vec<Value>, record_type: RecordType) -> Self {
        Self {
            rows,
            position: None,
            record_type,
        }
    }

    /// The record type rows are read as.
    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Whether the result has any rows.
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Total rows in the result.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Advance to the next row. Returns `false` past the last row.
    pub fn read(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            true
        } else {
            self.position = Some(self.rows.len());
            false
        }
    }

    /// Number of columns in the current row.
    pub fn field_count(&self) -> usize {
        match self.current() {
            Some(Value::Object(map)) => map.len(),
            Some(_) => 1,
            None => 0,
        }
    }

    /// Name of a column of the current row.
    pub fn get_name(&self, ordinal: usize) -> Result<&str> {
        match self.current_row()? {
            Value::Object(map) => map
                .keys()
                .nth(ordinal)
                .map(String::as_str)
                .ok_or_else(|| out_of_range(ordinal)),
            _ if ordinal == 0 => Ok(SCALAR_COLUMN),
            _ => Err(out_of_range(ordinal)),
        }
    }

    /// Ordinal of a column of the current row.
    pub fn get_ordinal(&self, name: &str) -> Result<usize> {
        match self.current_row()? {
            Value::Object(map) => map
                .keys()
                .position(|k| k == name)
                .ok_or_else(|| Error::invalid_input(format!("no column named '{}'", name))),
            _ if name == SCALAR_COLUMN => Ok(0),
            _ => Err(Error::invalid_input(format!("no column named '{}'", name))),
        }
    }

    /// Value of a column of the current row by ordinal.
    pub fn get_value(&self, ordinal: usize) -> Result<&Value> {
        match self.current_row()? {
            Value::Object(map) => map
                .values()
                .nth(ordinal)
                .ok_or_else(|| out_of_range(ordinal)),
            scalar if ordinal == 0 => Ok(scalar),
            _ => Err(out_of_range(ordinal)),
        }
    }

    /// Value of a column of the current row by name.
    ///
    /// Returns `None` when the row has no such column.
    pub fn get(&self, name: &str) -> Result<Option<&Value>> {
        match self.current_row()? {
            Value::Object(map) => Ok(map.get(name)),
            scalar if name == SCALAR_COLUMN => Ok(Some(scalar)),
            _ => Ok(None),
        }
    }

    /// Whether a column of the current row is null.
    pub fn is_null(&self, ordinal: usize) -> Result<bool> {
        Ok(self.get_value(ordinal)?.is_null())
    }

    /// The current row as a document. Scalar rows are wrapped under `$1`.
    pub fn row(&self) -> Result<Document> {
        match self.current_row()? {
            Value::Object(map) => Ok(map.clone()),
            scalar => {
                let mut document = Document::new();
                document.insert(SCALAR_COLUMN.to_string(), scalar.clone());
                Ok(document)
            }
        }
    }

    /// Deserialize the current row.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.current_row()?.clone())?)
    }

    /// Deserialize every remaining row, consuming the reader.
    pub fn into_records<T: DeserializeOwned>(mut self) -> Result<Vec<T>> {
        let mut out = Vec::new();
        while self.read() {
            out.push(self.deserialize()?);
        }
        Ok(out)
    }

    fn current(&self) -> Option<&Value> {
        self.position.and_then(|p| self.rows.get(p))
    }

    fn current_row(&self) -> Result<&Value> {
        self.current()
            .ok_or_else(|| Error::invalid_input("reader is not positioned on a row"))
    }
}

fn out_of_range(ordinal: usize) -> Error {
    Error::invalid_input(format!("column ordinal {} is out of range", ordinal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Age")]
        age: u32,
    }

    fn reader(rows: Vec<Value>) -> DataReader {
        DataReader::new(rows, RecordType::of::<User>())
    }

    #[test]
    fn walks_rows_forward() {
        let mut r = reader(vec![json!({"Name": "a", "Age": 1}), json!({"Name": "b", "Age": 2})]);
        assert!(r.get_value(0).is_err());
        assert!(r.read());
        assert_eq!(r.field_count(), 2);
        assert_eq!(r.get_name(1).unwrap(), "Age");
        assert_eq!(r.get_ordinal("Name").unwrap(), 0);
        assert_eq!(r.get_value(0).unwrap(), &json!("a"));
        assert!(r.read());
        assert_eq!(r.get("Age").unwrap(), Some(&json!(2)));
        assert!(!r.read());
        assert!(!r.read());
        assert_eq!(r.field_count(), 0);
    }

    #[test]
    fn scalar_rows_have_one_column() {
        let mut r = reader(vec![json!(5)]);
        assert!(r.read());
        assert_eq!(r.field_count(), 1);
        assert_eq!(r.get_name(0).unwrap(), SCALAR_COLUMN);
        assert_eq!(r.get_value(0).unwrap(), &json!(5));
        assert!(r.get_value(1).is_err());
        assert_eq!(r.row().unwrap()["$1"], json!(5));
    }

    #[test]
    fn deserializes_records() {
        let r = reader(vec![json!({"Name": "a", "Age": 1, "id": "x"})]);
        assert_eq!(r.record_type().document_type(), "User");
        let users: Vec<User> = r.into_records().unwrap();
        assert_eq!(
            users,
            vec![User {
                name: "a".into(),
                age: 1
            }]
        );
    }

    #[test]
    fn shape_mismatch_is_invalid_input() {
        let mut r = reader(vec![json!({"Name": 3})]);
        r.read();
        assert!(matches!(
            r.deserialize::<User>(),
            Err(Error::InvalidInput { .. })
        ));
    }
}

//! Supporting types for command results.

use cosmosql_core::StatusCode;
use serde::{Deserialize, Serialize};

/// Outcome of a non-query command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affected {
    /// Documents written or removed: 1 on a success status, else 0
    pub rows: u64,
    /// Sequence value allocated by an insert
    pub generated_id: Option<i64>,
}

impl Affected {
    /// Nothing was touched.
    pub fn none() -> Self {
        Self::default()
    }

    /// A count coerced from a scalar result.
    pub fn count(rows: u64) -> Self {
        Self {
            rows,
            generated_id: None,
        }
    }

    /// One row if `status` is a success status.
    pub fn from_status(status: StatusCode, generated_id: Option<i64>) -> Self {
        Self {
            rows: u64::from(status.is_success()),
            generated_id,
        }
    }
}

impl std::fmt::Display for Affected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.generated_id {
            Some(id) => write!(f, "{} row(s), id {}", self.rows, id),
            None => write!(f, "{} row(s)", self.rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses_count_one_row() {
        assert_eq!(Affected::from_status(StatusCode::Created, Some(3)).rows, 1);
        assert_eq!(Affected::from_status(StatusCode::Ok, None).rows, 1);
        assert_eq!(Affected::from_status(StatusCode::NoContent, None).rows, 1);
        assert_eq!(Affected::from_status(StatusCode::NotFound, None).rows, 0);
        assert_eq!(
            Affected::from_status(StatusCode::Created, Some(3)).to_string(),
            "1 row(s), id 3"
        );
    }
}

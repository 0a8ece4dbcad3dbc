//! Sort column and direction

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a direction, case-insensitively. Anything but `desc` is ascending.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// SQL keyword
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Column and direction of a table listing, as kept in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn ascending(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    /// Next sort after the user clicks `column`.
    ///
    /// Clicking the current column flips the direction, any other column
    /// starts ascending.
    pub fn clicked(&self, column: &str) -> Self {
        if self.column == column {
            Self::new(column, self.direction.toggled())
        } else {
            Self::ascending(column)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_is_case_insensitive_and_defaults_to_asc() {
        assert_eq!(SortDirection::parse("DESC"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("desc"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("Desc "), SortDirection::Desc);
        assert_eq!(SortDirection::parse("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::parse("sideways"), SortDirection::Asc);
        assert_eq!(SortDirection::parse(""), SortDirection::Asc);
    }

    #[test]
    fn clicking_toggles_same_column_and_resets_other() {
        let sort = SortSpec::ascending("name");
        let toggled = sort.clicked("name");
        assert_eq!(toggled, SortSpec::new("name", SortDirection::Desc));
        assert_eq!(toggled.clicked("name"), SortSpec::ascending("name"));
        assert_eq!(toggled.clicked("id"), SortSpec::ascending("id"));
    }

    #[test]
    fn persisted_as_lowercase() {
        let value = serde_json::to_value(SortSpec::new("id", SortDirection::Desc)).unwrap();
        assert_eq!(value, json!({"column": "id", "direction": "desc"}));
    }
}

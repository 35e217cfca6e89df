//! Table configuration types (Functional Core - pure data).

/// Table schema configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

impl KeyAttribute {
    fn new(name: &str, attribute_type: AttributeType) -> Self {
        Self {
            name: name.to_string(),
            attribute_type,
        }
    }
}

/// DynamoDB scalar attribute types used by key schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Number,
}

impl AttributeType {
    /// The DynamoDB type descriptor (`S` or `N`).
    pub fn code(&self) -> &'static str {
        match self {
            AttributeType::String => "S",
            AttributeType::Number => "N",
        }
    }
}

/// The four tables served by gridload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TableKind {
    Movies,
    ReferenceZones,
    TotalLoad,
    ResolutionCodes,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::Movies,
        TableKind::ReferenceZones,
        TableKind::TotalLoad,
        TableKind::ResolutionCodes,
    ];

    /// Default table name, overridable with the same variables the server reads.
    pub fn table_name(&self) -> String {
        let (var, default) = match self {
            TableKind::Movies => ("MOVIES_TABLE", "Movies"),
            TableKind::ReferenceZones => ("REFERENCE_ZONES_TABLE", "ReferenceZones"),
            TableKind::TotalLoad => ("TOTAL_LOAD_TABLE", "TotalLoadData"),
            TableKind::ResolutionCodes => ("RESOLUTION_CODES_TABLE", "ResolutionCodes"),
        };
        std::env::var(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// Key schema of the table.
    /// This is a pure function - no I/O.
    pub fn table_config(&self, table_name: &str) -> TableConfig {
        use AttributeType::{Number, String};

        let (partition_key, sort_key) = match self {
            TableKind::Movies => (
                KeyAttribute::new("year", Number),
                Some(KeyAttribute::new("title", String)),
            ),
            TableKind::ReferenceZones => (
                KeyAttribute::new("Id", Number),
                Some(KeyAttribute::new("Id_CountryFK", String)),
            ),
            TableKind::TotalLoad => (
                KeyAttribute::new("entsoeAreaReference_FK", Number),
                Some(KeyAttribute::new("DateTime", String)),
            ),
            TableKind::ResolutionCodes => (KeyAttribute::new("Id", Number), None),
        };

        TableConfig {
            table_name: table_name.to_string(),
            partition_key,
            sort_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_table_is_keyed_by_zone_and_timestamp() {
        let config = TableKind::TotalLoad.table_config("TotalLoadData");
        assert_eq!(config.partition_key.name, "entsoeAreaReference_FK");
        assert_eq!(config.partition_key.attribute_type, AttributeType::Number);
        let sort = config.sort_key.unwrap();
        assert_eq!(sort.name, "DateTime");
        assert_eq!(sort.attribute_type, AttributeType::String);
    }

    #[test]
    fn test_resolution_codes_have_no_sort_key() {
        let config = TableKind::ResolutionCodes.table_config("ResolutionCodes");
        assert_eq!(config.partition_key.name, "Id");
        assert!(config.sort_key.is_none());
    }

    #[test]
    fn test_zone_sort_key_is_composite() {
        let config = TableKind::ReferenceZones.table_config("ReferenceZones");
        assert_eq!(config.sort_key.unwrap().name, "Id_CountryFK");
    }
}

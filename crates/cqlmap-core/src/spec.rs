use crate::meta::KeyOrdering;
use cqlmap_types::{CqlIdentifier, DataType};
use serde::Serialize;

///
/// ColumnKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum ColumnKind {
    PartitionKey,
    Clustered { ordering: KeyOrdering },
    Regular,
}

///
/// ColumnSpecification
///
/// One column of a table specification: name, physical encoding, and
/// key kind.
///

#[derive(Clone, Debug, Serialize)]
pub struct ColumnSpecification {
    pub name: CqlIdentifier,
    pub data_type: DataType,
    pub kind: ColumnKind,
}

///
/// CreateTableSpecification
///
/// The derived shape of a table: ordered partition-key columns, ordered
/// cluster-key columns with direction, and plain columns. Consumed by a
/// separate DDL emitter; never constructed partially.
///

#[derive(Clone, Debug, Serialize)]
pub struct CreateTableSpecification {
    name: CqlIdentifier,
    partition_key_columns: Vec<ColumnSpecification>,
    clustered_key_columns: Vec<ColumnSpecification>,
    columns: Vec<ColumnSpecification>,
}

impl CreateTableSpecification {
    #[must_use]
    pub const fn new(name: CqlIdentifier) -> Self {
        Self {
            name,
            partition_key_columns: Vec::new(),
            clustered_key_columns: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn partition_key_column(&mut self, name: CqlIdentifier, data_type: DataType) {
        self.partition_key_columns.push(ColumnSpecification {
            name,
            data_type,
            kind: ColumnKind::PartitionKey,
        });
    }

    pub fn clustered_key_column(
        &mut self,
        name: CqlIdentifier,
        data_type: DataType,
        ordering: KeyOrdering,
    ) {
        self.clustered_key_columns.push(ColumnSpecification {
            name,
            data_type,
            kind: ColumnKind::Clustered { ordering },
        });
    }

    pub fn column(&mut self, name: CqlIdentifier, data_type: DataType) {
        self.columns.push(ColumnSpecification {
            name,
            data_type,
            kind: ColumnKind::Regular,
        });
    }

    #[must_use]
    pub const fn name(&self) -> &CqlIdentifier {
        &self.name
    }

    #[must_use]
    pub fn partition_key_columns(&self) -> &[ColumnSpecification] {
        &self.partition_key_columns
    }

    #[must_use]
    pub fn clustered_key_columns(&self) -> &[ColumnSpecification] {
        &self.clustered_key_columns
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnSpecification] {
        &self.columns
    }
}

///
/// FieldSpecification
///

#[derive(Clone, Debug, Serialize)]
pub struct FieldSpecification {
    pub name: CqlIdentifier,
    pub data_type: DataType,
}

///
/// CreateStructuredTypeSpecification
///
/// The derived shape of a user-defined structured type: ordered fields.
///

#[derive(Clone, Debug, Serialize)]
pub struct CreateStructuredTypeSpecification {
    name: CqlIdentifier,
    fields: Vec<FieldSpecification>,
}

impl CreateStructuredTypeSpecification {
    #[must_use]
    pub const fn new(name: CqlIdentifier) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    pub fn field(&mut self, name: CqlIdentifier, data_type: DataType) {
        self.fields.push(FieldSpecification { name, data_type });
    }

    #[must_use]
    pub const fn name(&self) -> &CqlIdentifier {
        &self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpecification] {
        &self.fields
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use cqlmap_types::SimpleType;

    #[test]
    fn column_order_is_insertion_order() {
        let mut spec =
            CreateTableSpecification::new(CqlIdentifier::new("events").unwrap());

        spec.partition_key_column(CqlIdentifier::new("id").unwrap(), SimpleType::Uuid.into());
        spec.clustered_key_column(
            CqlIdentifier::new("at").unwrap(),
            SimpleType::Timestamp.into(),
            KeyOrdering::Descending,
        );
        spec.column(CqlIdentifier::new("payload").unwrap(), SimpleType::Blob.into());

        assert_eq!(spec.partition_key_columns().len(), 1);
        assert_eq!(spec.clustered_key_columns()[0].name.to_string(), "at");
        assert_eq!(
            spec.clustered_key_columns()[0].kind,
            ColumnKind::Clustered {
                ordering: KeyOrdering::Descending
            }
        );
        assert_eq!(spec.columns()[0].name.to_string(), "payload");
    }
}

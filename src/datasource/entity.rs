//! Registered entity descriptors.
//!
//! The embedding application registers one descriptor per table or
//! collection before startup. Datasources only read them while provisioning.

/// A column of a relational table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// SQL type as written in DDL (e.g. `BIGSERIAL`, `TEXT`).
    pub sql_type: String,
    pub primary_key: bool,
    pub nullable: bool,
}

impl Column {
    /// A nullable, non-key column.
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            primary_key: false,
            nullable: true,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// A table (relational) or collection (document) to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    name: String,
    columns: Vec<Column>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column. Document stores ignore columns.
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

/// Application types that map to a table or collection.
pub trait Entity {
    fn descriptor() -> EntityDescriptor;
}

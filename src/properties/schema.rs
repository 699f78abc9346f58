//! Infer a column schema from a batch of property records.

use indexmap::IndexMap;

use crate::error::Result;
use crate::properties::{Column, ColumnType, Properties, Schema};

/// Options for schema inference.
#[derive(Debug, Clone)]
pub struct SchemaInferenceOptions {
    /// The type given to a column whose values were null in every record.
    pub null_column_type: ColumnType,
    /// Stop after this many records. `None` scans every record.
    pub max_read_records: Option<usize>,
}

impl Default for SchemaInferenceOptions {
    fn default() -> Self {
        Self {
            null_column_type: ColumnType::String,
            max_read_records: None,
        }
    }
}

/// A scanner over property records to infer a column schema.
///
/// Columns appear in the order their names are first seen. The type of each column is the
/// left-to-right [promotion][ColumnType::promote] of the types of its non-null values. Every
/// inferred column is nullable, since any record may omit any property.
///
/// Successive calls to [`process`][Self::process] accumulate, so one builder can infer a joint
/// schema across several batches.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    /// `None` until a non-null value of the column has been seen.
    fields: IndexMap<String, Option<ColumnType>>,
    options: SchemaInferenceOptions,
    num_records: usize,
}

impl SchemaBuilder {
    /// Create a new schema builder.
    pub fn new(options: SchemaInferenceOptions) -> Self {
        Self {
            fields: IndexMap::new(),
            options,
            num_records: 0,
        }
    }

    /// Process the properties of one record.
    ///
    /// Records past [`SchemaInferenceOptions::max_read_records`] are ignored.
    pub fn process(&mut self, properties: &Properties) {
        if self
            .options
            .max_read_records
            .is_some_and(|max| self.num_records >= max)
        {
            return;
        }
        self.num_records += 1;

        for (name, value) in properties {
            let value_type = ColumnType::of_value(value);
            if let Some(field) = self.fields.get_mut(name) {
                *field = match (*field, value_type) {
                    (Some(existing), Some(new)) => Some(existing.promote(new)),
                    (existing, new) => existing.or(new),
                };
            } else {
                self.fields.insert(name.clone(), value_type);
            }
        }
    }

    /// The number of records that contributed to the schema so far.
    pub fn num_records(&self) -> usize {
        self.num_records
    }

    /// Finish the schema building process and return the resulting schema.
    pub fn finish(self) -> Result<Schema> {
        let null_column_type = self.options.null_column_type;
        let columns = self
            .fields
            .into_iter()
            .map(|(name, column_type)| {
                let mut column = Column::new(name, column_type.unwrap_or(null_column_type));
                column.title = Some(column.name.clone());
                column
            })
            .collect();
        Schema::try_new(columns)
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

/// Infer a schema from a sequence of records with default options.
///
/// An empty input yields an empty schema.
pub fn infer_schema<'a>(records: impl IntoIterator<Item = &'a Properties>) -> Result<Schema> {
    let mut builder = SchemaBuilder::default();
    for record in records {
        builder.process(record);
    }
    builder.finish()
}

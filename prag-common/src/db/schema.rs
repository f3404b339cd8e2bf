//! Table Schema Definitions
//!
//! Single source of truth for the normalized corpus tables. Each struct
//! defines one table; `reset_schema` drops and recreates all of them.
//!
//! # Usage
//!
//! ```rust,ignore
//! // Destructive full reload
//! reset_schema(&pool).await?;
//! ```

use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER")
    pub sql_type: String,
    /// NOT NULL constraint
    pub not_null: bool,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
    /// UNIQUE constraint
    pub unique: bool,
    /// DEFAULT value
    pub default_value: Option<String>,
    /// REFERENCES target as (table, column)
    pub references: Option<(String, String)>,
}

impl ColumnDefinition {
    /// Create new column definition
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            unique: false,
            default_value: None,
            references: None,
        }
    }

    /// Mark column as PRIMARY KEY
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark column as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Mark column as UNIQUE
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set DEFAULT value
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Add a foreign key reference
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some((table.into(), column.into()));
        self
    }

    fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = &self.default_value {
            sql.push_str(&format!(" DEFAULT {}", default));
        }
        if let Some((table, column)) = &self.references {
            sql.push_str(&format!(" REFERENCES {}({})", table, column));
        }
        sql
    }
}

/// Defines the schema for one table
pub trait TableSchema {
    /// Table name in database
    fn table_name() -> &'static str;

    /// Column definitions in creation order
    fn columns() -> Vec<ColumnDefinition>;

    /// Table-level constraints such as composite UNIQUE keys
    fn table_constraints() -> Vec<&'static str> {
        Vec::new()
    }
}

/// Render `CREATE TABLE` for a schema
pub fn create_table_sql<T: TableSchema>() -> String {
    let mut parts: Vec<String> = T::columns().iter().map(ColumnDefinition::to_sql).collect();
    parts.extend(T::table_constraints().into_iter().map(str::to_string));
    format!("CREATE TABLE {} (\n    {}\n)", T::table_name(), parts.join(",\n    "))
}

fn id_column() -> ColumnDefinition {
    ColumnDefinition::new("id", "INTEGER").primary_key()
}

/// Distinct surface tokens
pub struct TokensTable;

impl TableSchema for TokensTable {
    fn table_name() -> &'static str {
        "tokens"
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            id_column(),
            ColumnDefinition::new("token", "TEXT").not_null().unique(),
        ]
    }
}

/// Distinct token-ID sequences (JSON arrays)
pub struct ExprsTable;

impl TableSchema for ExprsTable {
    fn table_name() -> &'static str {
        "exprs"
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            id_column(),
            ColumnDefinition::new("expr", "TEXT").not_null().unique(),
        ]
    }
}

/// Expression-ID sequences (JSON arrays). Uniqueness is kept by the
/// registry cache only; the table permits reuse.
pub struct PhrasesTable;

impl TableSchema for PhrasesTable {
    fn table_name() -> &'static str {
        "phrases"
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![id_column(), ColumnDefinition::new("phrase", "TEXT").not_null()]
    }
}

/// Categorical values scoped by field
pub struct FeaturesTable;

impl TableSchema for FeaturesTable {
    fn table_name() -> &'static str {
        "features"
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            id_column(),
            ColumnDefinition::new("field", "TEXT").not_null(),
            ColumnDefinition::new("value", "TEXT").not_null(),
        ]
    }

    fn table_constraints() -> Vec<&'static str> {
        vec!["UNIQUE (field, value)"]
    }
}

/// Foreign-language excerpts
pub struct TranslationsTable;

impl TableSchema for TranslationsTable {
    fn table_name() -> &'static str {
        "translations"
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            id_column(),
            ColumnDefinition::new("excerpt", "TEXT").not_null(),
            ColumnDefinition::new("lang", "TEXT").not_null(),
        ]
    }

    fn table_constraints() -> Vec<&'static str> {
        vec!["UNIQUE (excerpt, lang)"]
    }
}

/// One row per corpus unit
///
/// Array columns hold JSON arrays of feature or translation IDs.
pub struct UnitsTable;

impl TableSchema for UnitsTable {
    fn table_name() -> &'static str {
        "units"
    }

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            id_column(),
            ColumnDefinition::new("phrase_id", "INTEGER")
                .not_null()
                .references("phrases", "id"),
            ColumnDefinition::new("extrequired", "INTEGER").not_null().default("0"),
            ColumnDefinition::new("semantics", "TEXT"),
            ColumnDefinition::new("act1", "TEXT"),
            ColumnDefinition::new("actclass", "TEXT"),
            ColumnDefinition::new("situation", "TEXT"),
            ColumnDefinition::new("parts", "INTEGER").not_null().default("0"),
            ColumnDefinition::new("intonation", "INTEGER").references("features", "id"),
            ColumnDefinition::new("extension", "TEXT"),
            ColumnDefinition::new("mods", "TEXT"),
            ColumnDefinition::new("gest", "TEXT"),
            ColumnDefinition::new("organ", "TEXT"),
            ColumnDefinition::new("translations", "TEXT"),
            ColumnDefinition::new("examples", "TEXT"),
            ColumnDefinition::new("audio", "TEXT"),
            ColumnDefinition::new("video", "TEXT"),
            ColumnDefinition::new("style", "INTEGER").references("features", "id"),
            ColumnDefinition::new("comment", "TEXT"),
            ColumnDefinition::new("construction", "TEXT"),
            ColumnDefinition::new("link", "TEXT"),
        ]
    }
}

/// Tables in creation order; dropped in reverse
pub const TABLE_NAMES: [&str; 6] = [
    "tokens",
    "exprs",
    "phrases",
    "features",
    "translations",
    "units",
];

/// Drop and recreate every corpus table
///
/// Destructive: all previous data is lost.
pub async fn reset_schema(pool: &SqlitePool) -> Result<()> {
    for table in TABLE_NAMES.iter().rev() {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }

    for sql in [
        create_table_sql::<TokensTable>(),
        create_table_sql::<ExprsTable>(),
        create_table_sql::<PhrasesTable>(),
        create_table_sql::<FeaturesTable>(),
        create_table_sql::<TranslationsTable>(),
        create_table_sql::<UnitsTable>(),
    ] {
        sqlx::query(&sql).execute(pool).await?;
    }

    info!("Schema reset: {}", TABLE_NAMES.join(", "));
    Ok(())
}

/// Check if table exists
pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name = ?
        )
        "#,
    )
    .bind(table_name)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

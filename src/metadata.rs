//! Static description of the tables this crate owns.
//!
//! The descriptors mirror `schema.rs` and can be checked against a live
//! database through the postgres catalog (`information_schema`).

use std::collections::HashMap;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Text;
use diesel::Column;

use crate::errors::DbError;
use crate::schema::notes;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlType {
    BigInt,
    Text,
}

impl SqlType {
    /// Name reported by `information_schema.columns.data_type`.
    pub fn catalog_name(&self) -> &'static str {
        match self {
            SqlType::BigInt => "bigint",
            SqlType::Text => "text",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub primary_key: bool,
    pub unique: bool,
    pub nullable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: &'static str,
    pub columns: &'static [ColumnDescriptor],
}

pub const NOTES_TABLE: TableDescriptor = TableDescriptor {
    name: "notes",
    columns: &[
        ColumnDescriptor {
            name: <notes::id as Column>::NAME,
            sql_type: SqlType::BigInt,
            primary_key: true,
            unique: false,
            nullable: false,
        },
        ColumnDescriptor {
            name: <notes::name as Column>::NAME,
            sql_type: SqlType::Text,
            primary_key: false,
            unique: true,
            nullable: false,
        },
        ColumnDescriptor {
            name: <notes::text as Column>::NAME,
            sql_type: SqlType::Text,
            primary_key: false,
            unique: false,
            nullable: true,
        },
    ],
};

#[derive(QueryableByName)]
struct CatalogColumn {
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Text)]
    data_type: String,
    #[diesel(sql_type = Text)]
    is_nullable: String,
}

#[derive(QueryableByName)]
struct CatalogConstraint {
    #[diesel(sql_type = Text)]
    constraint_name: String,
    #[diesel(sql_type = Text)]
    constraint_type: String,
    #[diesel(sql_type = Text)]
    column_name: String,
}

impl TableDescriptor {
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn primary_key(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name)
            .collect()
    }

    /// Compares the descriptor with the table found in the current schema.
    /// Every difference is reported in a single `SchemaMismatch`.
    pub fn validate(&self, conn: &mut PgConnection) -> Result<(), DbError> {
        let columns = sql_query(
            "SELECT column_name::text AS column_name, \
                    data_type::text AS data_type, \
                    is_nullable::text AS is_nullable \
             FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1 \
             ORDER BY ordinal_position",
        )
        .bind::<Text, _>(self.name)
        .load::<CatalogColumn>(conn)?;

        if columns.is_empty() {
            return Err(DbError::SchemaMismatch(format!(
                "table {} does not exist",
                self.name
            )));
        }

        let constraints = sql_query(
            "SELECT tc.constraint_name::text AS constraint_name, \
                    tc.constraint_type::text AS constraint_type, \
                    kcu.column_name::text AS column_name \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON tc.constraint_schema = kcu.constraint_schema \
              AND tc.constraint_name = kcu.constraint_name \
             WHERE tc.table_schema = current_schema() AND tc.table_name = $1 \
               AND tc.constraint_type IN ('PRIMARY KEY', 'UNIQUE')",
        )
        .bind::<Text, _>(self.name)
        .load::<CatalogConstraint>(conn)?;

        let problems = self.compare(&columns, &constraints);
        if problems.is_empty() {
            log::debug!("table {} matches its descriptor", self.name);
            Ok(())
        } else {
            Err(DbError::SchemaMismatch(problems.join("; ")))
        }
    }

    fn compare(&self, columns: &[CatalogColumn], constraints: &[CatalogConstraint]) -> Vec<String> {
        let mut problems = vec![];

        let found: Vec<&str> = columns.iter().map(|c| c.column_name.as_str()).collect();
        if found != self.column_names() {
            problems.push(format!(
                "{} has columns {:?}, expected {:?}",
                self.name,
                found,
                self.column_names()
            ));
        }

        for live in columns {
            let Some(expected) = self.column(&live.column_name) else {
                continue;
            };
            if live.data_type != expected.sql_type.catalog_name() {
                problems.push(format!(
                    "{}.{} is {}, expected {}",
                    self.name,
                    expected.name,
                    live.data_type,
                    expected.sql_type.catalog_name()
                ));
            }
            if (live.is_nullable == "YES") != expected.nullable {
                problems.push(format!(
                    "{}.{} nullable should be {}",
                    self.name, expected.name, expected.nullable
                ));
            }
        }

        // constraint name -> (type, columns)
        let mut keys: HashMap<&str, (&str, Vec<&str>)> = HashMap::new();
        for c in constraints {
            keys.entry(c.constraint_name.as_str())
                .or_insert_with(|| (c.constraint_type.as_str(), vec![]))
                .1
                .push(c.column_name.as_str());
        }

        let mut primary_key: Vec<&str> = keys
            .values()
            .filter(|(kind, _)| *kind == "PRIMARY KEY")
            .flat_map(|(_, cols)| cols.iter().copied())
            .collect();
        primary_key.sort_unstable();
        let mut expected_key = self.primary_key();
        expected_key.sort_unstable();
        if primary_key != expected_key {
            problems.push(format!(
                "{} primary key is {:?}, expected {:?}",
                self.name, primary_key, expected_key
            ));
        }

        for column in self.columns.iter().filter(|c| c.unique) {
            let covered = keys
                .values()
                .any(|(kind, cols)| *kind == "UNIQUE" && cols.as_slice() == [column.name]);
            if !covered {
                problems.push(format!("{}.{} must be unique", self.name, column.name));
            }
        }

        problems
    }
}

/// The set of tables the test suite expects to exist.
#[derive(Clone, Copy, Debug)]
pub struct MetaData {
    tables: &'static [TableDescriptor],
}

pub const METADATA: MetaData = MetaData {
    tables: &[NOTES_TABLE],
};

impl MetaData {
    pub fn tables(&self) -> &'static [TableDescriptor] {
        self.tables
    }

    pub fn table(&self, name: &str) -> Option<&'static TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn validate(&self, conn: &mut PgConnection) -> Result<(), DbError> {
        for table in self.tables {
            table.validate(conn)?;
        }
        Ok(())
    }
}

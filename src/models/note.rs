use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};

use crate::schema::notes;

#[derive(Clone, Debug, PartialEq, Eq, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = notes)]
pub struct Note {
    pub id: i64,
    pub name: String,
    pub text: Option<String>,
}

/// A row to insert; `id` is assigned by the database.
#[derive(Clone, Debug, PartialEq, Eq, Insertable, Deserialize)]
#[diesel(table_name = notes)]
pub struct NewNote {
    pub name: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl NewNote {
    pub fn new(name: impl Into<String>, text: Option<&str>) -> Self {
        NewNote {
            name: name.into(),
            text: text.map(str::to_owned),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }
}

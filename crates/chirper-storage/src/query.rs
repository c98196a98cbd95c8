//! Statement builders for the read path.
//!
//! Both statements start from a `matched` CTE holding the ids of the chirps
//! selected by the tag filter. The filter becomes an `IN (...)` list with one
//! bound parameter per tag; placeholder numbering is left to
//! [`QueryBuilder`], so the tag count never has to be tracked by hand.

use chirper_core::{Result, StorageError};
use sqlx::{Postgres, QueryBuilder};

/// PostgreSQL accepts at most this many bind parameters per statement.
pub(crate) const MAX_BIND_PARAMS: usize = u16::MAX as usize;

const LIST_SELECT: &str = r#"
SELECT chirps.id AS id,
       chirps.message AS message,
       users.username AS author,
       COALESCE(
           array_agg(tags.name::text ORDER BY tags.name) FILTER (WHERE tags.name IS NOT NULL),
           ARRAY[]::text[]
       ) AS tags
FROM chirps
JOIN matched ON matched.id = chirps.id
JOIN users ON users.id = chirps.author_id
LEFT JOIN chirps_tags ON chirps_tags.chirp_id = chirps.id
LEFT JOIN tags ON tags.id = chirps_tags.tag_id
GROUP BY chirps.id, chirps.message, users.username
ORDER BY chirps.id"#;

const COUNT_SELECT: &str = r#"
SELECT COUNT(*)
FROM chirps
JOIN matched ON matched.id = chirps.id
WHERE chirps.created_at >= "#;

/// A read statement under construction.
pub(crate) struct ChirpQuery<'args> {
    builder: QueryBuilder<'args, Postgres>,
}

impl<'args> ChirpQuery<'args> {
    /// Lists matching chirps with their full tag sets.
    pub(crate) fn list(tags: &'args [String]) -> Result<Self> {
        let mut query = Self::matching(tags, 0)?;
        query.builder.push(LIST_SELECT);
        Ok(query)
    }

    /// Counts matching chirps created in `[starting_date, ending_date)`.
    pub(crate) fn count(
        starting_date: &'args str,
        ending_date: &'args str,
        tags: &'args [String],
    ) -> Result<Self> {
        let mut query = Self::matching(tags, 2)?;
        query
            .builder
            .push(COUNT_SELECT)
            .push_bind(starting_date)
            .push("::timestamp AND chirps.created_at < ")
            .push_bind(ending_date)
            .push("::timestamp");
        Ok(query)
    }

    /// Opens the statement with the `matched` CTE. `reserved` is the number
    /// of parameters the caller binds after the tag list.
    fn matching(tags: &'args [String], reserved: usize) -> Result<Self> {
        let binds = tags.len() + reserved;
        if binds > MAX_BIND_PARAMS {
            return Err(StorageError::Build(format!(
                "statement needs {binds} bind parameters, at most {MAX_BIND_PARAMS} allowed"
            )));
        }

        let mut builder = QueryBuilder::new("WITH matched AS (");
        if tags.is_empty() {
            builder.push("SELECT chirps.id AS id FROM chirps");
        } else {
            builder.push(
                "SELECT DISTINCT chirps_tags.chirp_id AS id \
                 FROM chirps_tags \
                 JOIN tags ON tags.id = chirps_tags.tag_id \
                 WHERE tags.name IN (",
            );
            {
                let mut names = builder.separated(", ");
                for tag in tags {
                    names.push_bind(tag.as_str());
                }
            }
            builder.push(")");
        }
        builder.push(")");

        Ok(Self { builder })
    }

    #[cfg(test)]
    pub(crate) fn sql(&self) -> &str {
        self.builder.sql()
    }

    pub(crate) fn into_builder(self) -> QueryBuilder<'args, Postgres> {
        self.builder
    }
}

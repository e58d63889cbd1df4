use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::models::category::Category;

pub async fn list<'e>(db: impl SqliteExecutor<'e>) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
        .fetch_all(db)
        .await
}

/// Resolves category names to rows; unknown names are simply absent.
pub async fn find_by_names<'e>(
    db: impl SqliteExecutor<'e>,
    names: &[String],
) -> Result<Vec<Category>, sqlx::Error> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id, name FROM categories WHERE name IN (");
    let mut separated = builder.separated(", ");
    for name in names {
        separated.push_bind(name.as_str());
    }
    separated.push_unseparated(") ORDER BY id");

    builder.build_query_as::<Category>().fetch_all(db).await
}

pub async fn create<'e>(db: impl SqliteExecutor<'e>, name: &str) -> Result<Category, sqlx::Error> {
    let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
        .bind(name)
        .execute(db)
        .await?;

    Ok(Category {
        id: result.last_insert_rowid(),
        name: name.to_string(),
    })
}

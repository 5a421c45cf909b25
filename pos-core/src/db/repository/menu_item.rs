//! Menu Item Repository

use super::PosResult;
use shared::models::{MenuItem, MenuItemCreate};
use shared::util::snowflake_id;
use sqlx::SqliteExecutor;

pub async fn find_by_id(ex: impl SqliteExecutor<'_>, id: i64) -> PosResult<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>(
        "SELECT id, name, category, price_cents, available FROM menu_item WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(ex)
    .await?;
    Ok(item)
}

pub async fn create(ex: impl SqliteExecutor<'_>, data: MenuItemCreate) -> PosResult<MenuItem> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO menu_item (id, name, category, price_cents, available) VALUES (?, ?, ?, ?, 1)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.category)
    .bind(data.price_cents)
    .execute(ex)
    .await?;
    Ok(MenuItem {
        id,
        name: data.name,
        category: data.category,
        price_cents: data.price_cents,
        available: true,
    })
}

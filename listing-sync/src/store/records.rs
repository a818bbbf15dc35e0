//! SQLite implementation of the properties table

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use listing_core::db::PropertyRow;
use listing_core::model::ColumnValue;
use listing_core::{Error, Property, PropertyField, Result};

use super::RecordStore;

const SELECT_COLUMNS: &str = "id, title, description, address, price, bedrooms, bathrooms, \
     features, areas, floorplans, technical_items, nearby_places, nearby_cities, \
     images, featured_image, featured_images, grid_images, created_at, updated_at";

pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn select_row(&self, id: &str) -> Result<PropertyRow> {
        self.select(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("property {id}")))
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn select(&self, id: &str) -> Result<Option<PropertyRow>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM properties WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_from(&r)).transpose()
    }

    async fn insert(&self, property: &Property) -> Result<PropertyRow> {
        if property.id.is_empty() {
            return Err(Error::InvalidInput(
                "cannot insert a property without an id".to_string(),
            ));
        }

        let columns: Vec<&str> = PropertyField::ALL.iter().map(|f| f.column()).collect();
        let placeholders = vec!["?"; columns.len() + 1].join(", ");
        let sql = format!(
            "INSERT INTO properties (id, {}) VALUES ({placeholders})",
            columns.join(", ")
        );

        let mut query = sqlx::query(&sql).bind(property.id.clone());
        for field in PropertyField::ALL {
            query = bind_column(query, field.encode(property)?);
        }
        query.execute(&self.pool).await?;

        debug!(property_id = %property.id, "Inserted property row");
        self.select_row(&property.id).await
    }

    async fn update(
        &self,
        id: &str,
        patch: &[(PropertyField, ColumnValue)],
    ) -> Result<PropertyRow> {
        if patch.is_empty() {
            return Err(Error::InvalidInput("empty column patch".to_string()));
        }

        // Column names come from PropertyField::column(), never from input
        let mut sql = String::from("UPDATE properties SET ");
        for (i, (field, _)) in patch.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(field.column());
            sql.push_str(" = ?");
        }
        sql.push_str(", updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?");

        let mut query = sqlx::query(&sql);
        for (_, value) in patch {
            query = bind_column(query, value.clone());
        }
        let outcome = query.bind(id).execute(&self.pool).await?;

        if outcome.rows_affected() == 0 {
            return Err(Error::NotFound(format!("property {id}")));
        }

        debug!(
            property_id = %id,
            columns = patch.len(),
            "Updated property columns"
        );
        self.select_row(id).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM properties WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn bind_column<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>,
    value: ColumnValue,
) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
    match value {
        ColumnValue::Text(s) => query.bind(s),
        ColumnValue::Integer(n) => query.bind(n),
        ColumnValue::Real(f) => query.bind(f),
        ColumnValue::Null => query.bind(Option::<String>::None),
    }
}

fn row_from(row: &SqliteRow) -> Result<PropertyRow> {
    Ok(PropertyRow {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        address: row.try_get("address")?,
        price: row.try_get("price")?,
        bedrooms: row.try_get("bedrooms")?,
        bathrooms: row.try_get("bathrooms")?,
        features: row.try_get("features")?,
        areas: row.try_get("areas")?,
        floorplans: row.try_get("floorplans")?,
        technical_items: row.try_get("technical_items")?,
        nearby_places: row.try_get("nearby_places")?,
        nearby_cities: row.try_get("nearby_cities")?,
        images: row.try_get("images")?,
        featured_image: row.try_get("featured_image")?,
        featured_images: row.try_get("featured_images")?,
        grid_images: row.try_get("grid_images")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

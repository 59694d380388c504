//! Products Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::{decode_u64, encode_u64},
    domain::{
        products::{
            data::NewProduct,
            records::{ProductRecord, ProductStatus, ProductUuid},
        },
        users::records::UserUuid,
    },
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const FIND_PRODUCT_SQL: &str = include_str!("sql/find_product.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");

/// Column values written by [`PgProductsRepository::update_product`].
#[derive(Debug, Clone)]
pub(crate) struct ProductColumns<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub base_price: u64,
    pub unit_price: u64,
    pub status: ProductStatus,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        public_only: bool,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_SQL)
            .bind(public_only)
            .fetch_all(&mut **tx)
            .await
    }

    /// Find a product in any status, including soft-deleted ones.
    pub(crate) async fn find_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(FIND_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        seller: UserUuid,
        product: &NewProduct,
        unit_price: u64,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(seller.into_uuid())
            .bind(&product.title)
            .bind(&product.description)
            .bind(encode_u64(product.base_price, "base_price")?)
            .bind(encode_u64(unit_price, "unit_price")?)
            .bind(encode_u64(product.available_stock, "available_stock")?)
            .bind(product.status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        columns: ProductColumns<'_>,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(columns.title)
            .bind(columns.description)
            .bind(encode_u64(columns.base_price, "base_price")?)
            .bind(encode_u64(columns.unit_price, "unit_price")?)
            .bind(columns.status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            seller_uuid: UserUuid::from_uuid(row.try_get("seller_uuid")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            base_price: decode_u64(row.try_get("base_price")?, "base_price")?,
            unit_price: decode_u64(row.try_get("unit_price")?, "unit_price")?,
            available_stock: decode_u64(row.try_get("available_stock")?, "available_stock")?,
            sold_amount: decode_u64(row.try_get("sold_amount")?, "sold_amount")?,
            status: status
                .parse::<ProductStatus>()
                .map_err(|error| sqlx::Error::ColumnDecode {
                    index: "status".to_string(),
                    source: Box::new(error),
                })?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

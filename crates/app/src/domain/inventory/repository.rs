//! Inventory Repository

use sqlx::{Postgres, Transaction, query_as, query_scalar};

use crate::{
    database::decode_u64,
    domain::{
        inventory::records::StockCut,
        products::records::{ProductRecord, ProductUuid},
    },
};

const CUT_STOCK_SQL: &str = include_str!("sql/cut_stock.sql");
const GET_STOCK_SQL: &str = include_str!("sql/get_stock.sql");
const RESTOCK_SQL: &str = include_str!("sql/restock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgInventoryRepository;

impl PgInventoryRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Conditionally decrement stock in a single statement. Concurrent cuts on the same
    /// row serialize on its row lock and re-check the stock condition.
    ///
    /// Returns `None` when the product does not exist.
    pub(crate) async fn try_cut_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Option<StockCut>, sqlx::Error> {
        let cut: Option<(i64, i64)> = query_as(CUT_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(i64::from(quantity))
            .fetch_optional(&mut **tx)
            .await?;

        if let Some((available_stock, sold_amount)) = cut {
            return Ok(Some(StockCut::Applied {
                available_stock: decode_u64(available_stock, "available_stock")?,
                sold_amount: decode_u64(sold_amount, "sold_amount")?,
            }));
        }

        let available: Option<i64> = query_scalar(GET_STOCK_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        available
            .map(|available| {
                decode_u64(available, "available_stock").map(|available_stock| {
                    StockCut::Insufficient { available_stock }
                })
            })
            .transpose()
    }

    pub(crate) async fn restock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(RESTOCK_SQL)
            .bind(product.into_uuid())
            .bind(i64::from(quantity))
            .fetch_optional(&mut **tx)
            .await
    }
}

//! Orders Repository

use std::collections::HashMap;

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{decode_u64, encode_u64},
    domain::{
        addresses::records::AddressUuid,
        orders::{
            data::{OrderDraft, OrderFilter},
            records::{OrderLineRecord, OrderRecord, OrderUuid, PaymentMethod, ShippingRecord},
            status::ShippingStatus,
            tracking::TrackingCode,
        },
        products::records::ProductUuid,
        users::records::UserUuid,
    },
};

const INSERT_ORDER_SQL: &str = include_str!("sql/insert_order.sql");
const INSERT_ORDER_LINE_SQL: &str = include_str!("sql/insert_order_line.sql");
const FIND_ORDER_SQL: &str = include_str!("sql/find_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const LIST_ORDER_LINES_SQL: &str = include_str!("sql/list_order_lines.sql");
const UPDATE_STATUS_SQL: &str = include_str!("sql/update_status.sql");
const MARK_PAID_SQL: &str = include_str!("sql/mark_paid.sql");
const DELETE_ORDER_SQL: &str = include_str!("sql/delete_order.sql");
const TOTAL_REVENUE_SQL: &str = include_str!("sql/total_revenue.sql");

/// An `orders` row before its lines are attached.
#[derive(Debug)]
struct OrderRow {
    uuid: OrderUuid,
    tracking_code: TrackingCode,
    buyer_uuid: UserUuid,
    payment_method: PaymentMethod,
    total_price: u64,
    is_paid: bool,
    shipping: ShippingRecord,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl OrderRow {
    fn with_lines(self, lines: Vec<OrderLineRecord>) -> OrderRecord {
        OrderRecord {
            uuid: self.uuid,
            tracking_code: self.tracking_code,
            buyer_uuid: self.buyer_uuid,
            lines,
            payment_method: self.payment_method,
            total_price: self.total_price,
            is_paid: self.is_paid,
            shipping: self.shipping,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug)]
struct OrderLineRow {
    order_uuid: Uuid,
    line: OrderLineRecord,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderDraft,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.tracking_code.as_str())
            .bind(order.buyer_uuid.into_uuid())
            .bind(order.payment_method.as_str())
            .bind(encode_u64(order.total_price, "total_price")?)
            .bind(order.is_paid)
            .bind(order.address_uuid.into_uuid())
            .execute(&mut **tx)
            .await?;

        for (position, line) in order.lines.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|error| sqlx::Error::Encode(format!("position: {error}").into()))?;

            query(INSERT_ORDER_LINE_SQL)
                .bind(order.uuid.into_uuid())
                .bind(position)
                .bind(line.product_uuid.into_uuid())
                .bind(line.seller_uuid.into_uuid())
                .bind(&line.title)
                .bind(i64::from(line.quantity))
                .bind(encode_u64(line.item_price, "item_price")?)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    pub(crate) async fn find_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        let Some(row) = query_as::<Postgres, OrderRow>(FIND_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await?
        else {
            return Ok(None);
        };

        let mut orders = self.attach_lines(tx, vec![row]).await?;

        Ok(orders.pop())
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: OrderFilter,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let (buyer, seller) = match filter {
            OrderFilter::All => (None, None),
            OrderFilter::Buyer(buyer) => (Some(buyer.into_uuid()), None),
            OrderFilter::Seller(seller) => (None, Some(seller.into_uuid())),
        };

        let rows = query_as::<Postgres, OrderRow>(LIST_ORDERS_SQL)
            .bind(buyer)
            .bind(seller)
            .fetch_all(&mut **tx)
            .await?;

        self.attach_lines(tx, rows).await
    }

    async fn attach_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        rows: Vec<OrderRow>,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let order_uuids: Vec<Uuid> = rows.iter().map(|row| row.uuid.into_uuid()).collect();

        let line_rows = query_as::<Postgres, OrderLineRow>(LIST_ORDER_LINES_SQL)
            .bind(&order_uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut lines_by_order: HashMap<Uuid, Vec<OrderLineRecord>> = HashMap::new();

        for line_row in line_rows {
            lines_by_order
                .entry(line_row.order_uuid)
                .or_default()
                .push(line_row.line);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let lines = lines_by_order
                    .remove(&row.uuid.into_uuid())
                    .unwrap_or_default();

                row.with_lines(lines)
            })
            .collect())
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        expected: ShippingStatus,
        next: ShippingStatus,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(UPDATE_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(expected.as_str())
            .bind(next.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    pub(crate) async fn mark_paid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(MARK_PAID_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    pub(crate) async fn delete_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(DELETE_ORDER_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    pub(crate) async fn total_revenue(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<u64, sqlx::Error> {
        let total: i64 = query_scalar(TOTAL_REVENUE_SQL).fetch_one(&mut **tx).await?;

        decode_u64(total, "total_price")
    }
}

fn decode_column<T, E>(value: &str, column: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr<Err = E>,
    E: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().map_err(|error| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(error),
    })
}

impl<'r> FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let tracking_code: String = row.try_get("tracking_code")?;
        let payment_method: String = row.try_get("payment_method")?;
        let status: String = row.try_get("shipping_status")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            tracking_code: decode_column(&tracking_code, "tracking_code")?,
            buyer_uuid: UserUuid::from_uuid(row.try_get("buyer_uuid")?),
            payment_method: decode_column(&payment_method, "payment_method")?,
            total_price: decode_u64(row.try_get("total_price")?, "total_price")?,
            is_paid: row.try_get("is_paid")?,
            shipping: ShippingRecord {
                address_uuid: AddressUuid::from_uuid(row.try_get("address_uuid")?),
                status: decode_column(&status, "shipping_status")?,
            },
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderLineRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i64 = row.try_get("quantity")?;

        Ok(Self {
            order_uuid: row.try_get("order_uuid")?,
            line: OrderLineRecord {
                product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
                seller_uuid: UserUuid::from_uuid(row.try_get("seller_uuid")?),
                title: row.try_get("title")?,
                quantity: u32::try_from(quantity).map_err(|error| sqlx::Error::ColumnDecode {
                    index: "quantity".to_string(),
                    source: Box::new(error),
                })?,
                item_price: decode_u64(row.try_get("item_price")?, "item_price")?,
            },
        })
    }
}

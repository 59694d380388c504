//! Emails and notifications produced by the order workflow.

use crate::{
    domain::{
        addresses::records::AddressRecord,
        notifications::{data::NewNotification, records::NotificationUuid},
        orders::{
            records::{OrderLineRecord, OrderRecord},
            status::ShippingStatus,
        },
        users::records::{UserRecord, UserUuid},
    },
    outbox::EmailMessage,
};

/// Render minor units as a decimal amount, e.g. `2500` as `25.00`.
#[must_use]
pub fn format_money(minor_units: u64) -> String {
    format!("{}.{:02}", minor_units / 100, minor_units % 100)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            ch => escaped.push(ch),
        }
    }

    escaped
}

fn line_items<'a>(lines: impl IntoIterator<Item = &'a OrderLineRecord>) -> String {
    let mut rows = String::from("<ul>");

    for line in lines {
        rows.push_str(&format!(
            "<li>{} &times; {} @ {} = {}</li>",
            line.quantity,
            escape_html(&line.title),
            format_money(line.item_price),
            line.line_total().map_or_else(|| "-".to_string(), format_money),
        ));
    }

    rows.push_str("</ul>");
    rows
}

fn cancelled_items<'a>(lines: impl IntoIterator<Item = &'a OrderLineRecord>) -> String {
    let mut rows = String::from("<ul>");

    for line in lines {
        rows.push_str(&format!(
            "<li><s>{} &times; {}</s> cancelled</li>",
            line.quantity,
            escape_html(&line.title),
        ));
    }

    rows.push_str("</ul>");
    rows
}

fn lines_for(order: &OrderRecord, seller: UserUuid) -> impl Iterator<Item = &OrderLineRecord> {
    order
        .lines
        .iter()
        .filter(move |line| line.seller_uuid == seller)
}

/// Sent to the buyer when a paid order is placed or an order is marked paid.
#[must_use]
pub fn order_confirmation(order: &OrderRecord, buyer: &UserRecord) -> EmailMessage {
    EmailMessage {
        to: buyer.email.clone(),
        subject: "Order Confirmation".to_string(),
        html: format!(
            "<p>Hi {name},</p><p>Thank you for your order <strong>{code}</strong>.</p>\
             {items}<p>Total: {total}</p><p>Payment: {payment}</p>",
            name = escape_html(&buyer.first_name),
            code = order.tracking_code,
            items = line_items(&order.lines),
            total = format_money(order.total_price),
            payment = order.payment_method,
        ),
    }
}

/// Sent to a seller when a paid order contains their products.
#[must_use]
pub fn new_order_arrived(order: &OrderRecord, seller: &UserRecord) -> EmailMessage {
    EmailMessage {
        to: seller.email.clone(),
        subject: "New Order Arrived".to_string(),
        html: format!(
            "<p>Order <strong>{code}</strong> includes your products:</p>{items}",
            code = order.tracking_code,
            items = line_items(lines_for(order, seller.uuid)),
        ),
    }
}

/// Sent to a seller when the buyer cancels a pending order.
#[must_use]
pub fn cancelled_by_buyer(order: &OrderRecord, seller: &UserRecord) -> EmailMessage {
    EmailMessage {
        to: seller.email.clone(),
        subject: "Order Cancelled".to_string(),
        html: format!(
            "<p>The buyer cancelled order <strong>{code}</strong>.</p>{items}",
            code = order.tracking_code,
            items = cancelled_items(lines_for(order, seller.uuid)),
        ),
    }
}

/// Sent to the buyer after every shipping status change. There is no email for
/// `pending` since no transition leads there.
#[must_use]
pub fn status_changed(
    order: &OrderRecord,
    buyer: &UserRecord,
    address: &AddressRecord,
) -> Option<EmailMessage> {
    let code = &order.tracking_code;

    let (subject, html) = match order.shipping.status {
        ShippingStatus::Pending => return None,
        ShippingStatus::Approved => (
            "Order Approved",
            format!(
                "<p>Your order <strong>{code}</strong> has been approved and is being \
                 prepared.</p>{items}<p>Total: {total}</p>",
                items = line_items(&order.lines),
                total = format_money(order.total_price),
            ),
        ),
        ShippingStatus::Shipped => (
            "Order Shipped",
            format!(
                "<p>Your order <strong>{code}</strong> has been shipped.</p>{items}\
                 <p>Total: {total}</p>",
                items = line_items(&order.lines),
                total = format_money(order.total_price),
            ),
        ),
        ShippingStatus::Cancelled => (
            "Order Cancelled",
            format!(
                "<p>Your order <strong>{code}</strong> has been cancelled.</p>{items}\
                 <p>Total: {total}</p><p>Payment: {payment}</p>",
                items = cancelled_items(&order.lines),
                total = format_money(order.total_price),
                payment = order.payment_method,
            ),
        ),
        ShippingStatus::Delivered => (
            "Order Delivered",
            format!(
                "<p>Hi {name} ({email}),</p><p>Your order <strong>{code}</strong> has been \
                 delivered.</p>{items}<p>Total: {total}</p><p>Payment: {payment}</p>\
                 <p>Delivered to: {line}</p><p>Phone: {phone}</p>",
                name = escape_html(&buyer.first_name),
                email = escape_html(&buyer.email),
                items = line_items(&order.lines),
                total = format_money(order.total_price),
                payment = order.payment_method,
                line = escape_html(&address.address_line),
                phone = escape_html(&address.phone_number),
            ),
        ),
        ShippingStatus::Refunded => (
            "Order Refunded",
            format!(
                "<p>Your order <strong>{code}</strong> has been refunded.</p>{items}\
                 <p>Refunded: {total}</p><p>Payment: {payment}</p>",
                items = line_items(&order.lines),
                total = format_money(order.total_price),
                payment = order.payment_method,
            ),
        ),
    };

    Some(EmailMessage {
        to: buyer.email.clone(),
        subject: subject.to_string(),
        html,
    })
}

/// In-app notice to a seller that one of their products was ordered.
#[must_use]
pub fn new_order_notification(order: &OrderRecord, seller: UserUuid) -> NewNotification {
    NewNotification {
        uuid: NotificationUuid::new(),
        recipient: seller,
        sender: Some(order.buyer_uuid),
        title: "Order Notification".to_string(),
        content: "Got new order".to_string(),
        kind: "Product order".to_string(),
        entity: Some(order.uuid.into_uuid()),
    }
}

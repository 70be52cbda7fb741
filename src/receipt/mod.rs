//! Receipt

use std::io;

use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    catalog::trees::RentalPeriod,
    orders::{Order, OrderLine, OrderNumber},
    prices::Price,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// The output could not be written.
    #[error("IO error")]
    IO,
}

/// One charged line on a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    /// What was charged for
    pub label: String,

    /// Extra detail: size, dates, zone
    pub detail: String,

    /// Amount charged
    pub amount: Price,
}

impl ReceiptLine {
    fn new(label: impl Into<String>, detail: impl Into<String>, amount: Price) -> Self {
        Self {
            label: label.into(),
            detail: detail.into(),
            amount,
        }
    }
}

/// Confirmation shown after an order is placed.
#[derive(Debug, Clone)]
pub struct Receipt {
    order_number: OrderNumber,
    lines: SmallVec<[ReceiptLine; 8]>,
    subtotal: Price,
    discount: Price,
    total: Price,
}

impl Receipt {
    /// Build the receipt for a stored order.
    pub fn from_order(order: &Order) -> Self {
        let pricing = &order.pricing;
        let mut lines: SmallVec<[ReceiptLine; 8]> = SmallVec::new();

        lines.push(ReceiptLine::new(
            order.line.description(),
            line_detail(&order.line),
            pricing.base,
        ));

        if let OrderLine::Product {
            tree: Some(tree), ..
        } = &order.line
            && let Some(period) = tree.rental_period()
        {
            lines.push(ReceiptLine::new(
                "Rental period",
                format!("{} days", RentalPeriod::days(period)),
                pricing.rental,
            ));
        }

        if let Some(workers) = order.men_power {
            lines.push(ReceiptLine::new(
                "Installers",
                format!("{workers} workers"),
                pricing.men_power,
            ));
        }

        if let Some(date) = order.dates.installation_date {
            lines.push(ReceiptLine::new(
                "Installation",
                date.to_string(),
                pricing.installation,
            ));
        }

        if let Some(date) = order.dates.teardown_date {
            lines.push(ReceiptLine::new(
                "Teardown",
                date.to_string(),
                pricing.teardown,
            ));
        }

        if !matches!(order.line, OrderLine::GiftCard { .. }) {
            lines.push(ReceiptLine::new(
                "Delivery",
                order.customer.delivery_area().unwrap_or_default(),
                pricing.delivery,
            ));
        }

        for add_on in &order.add_ons {
            lines.push(ReceiptLine::new("Add-on", add_on.name.clone(), add_on.fee));
        }

        Self {
            order_number: order.order_number.clone(),
            lines,
            subtotal: pricing.subtotal,
            discount: pricing.discount,
            total: order.total_amount,
        }
    }

    /// Order number
    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    /// Charged lines
    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Total before discount
    pub fn subtotal(&self) -> Price {
        self.subtotal
    }

    /// Discount taken off
    pub fn discount(&self) -> Price {
        self.discount
    }

    /// Amount charged
    pub fn total(&self) -> Price {
        self.total
    }

    /// Writes the receipt as a table followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        writeln!(out, "\n Order {}", self.order_number).map_err(|_err| ReceiptError::IO)?;

        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Detail", "Amount"]);

        for (index, line) in self.lines.iter().enumerate() {
            builder.push_record([
                (index + 1).to_string(),
                line.label.clone(),
                line.detail.clone(),
                line.amount.to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..4), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut rows: SmallVec<[(&str, String); 3]> = SmallVec::new();

        rows.push(("Subtotal:", self.subtotal.to_string()));

        if !self.discount.is_zero() {
            rows.push(("Discount:", format!("-{}", self.discount)));
        }

        rows.push(("Total:", self.total.to_string()));

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in rows {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")
                .map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

fn line_detail(line: &OrderLine) -> String {
    match line {
        OrderLine::Product {
            tree: Some(tree), ..
        } => {
            let mut detail = format!("{} wide", tree.width());

            if let Some(level) = tree.decor_level() {
                detail.push_str(&format!(", {}% decorated", level.percent()));
            }

            detail
        }
        OrderLine::Product { tree: None, .. } | OrderLine::Event { .. } => String::new(),
        OrderLine::GiftCard { .. } => "Sent by email".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use jiff::{Timestamp, civil::date};

    use crate::{
        catalog::{
            ProductId,
            trees::{DecorLevel, TreeOptions},
        },
        customers::CustomerDetails,
        delivery::ResolvedDelivery,
        gift_cards::GiftCardId,
        orders::{OrderId, OrderStatus, SelectedAddOn, ServiceDates},
        pricing::PriceBreakdown,
    };

    use super::*;

    fn tree_order() -> anyhow::Result<Order> {
        let mut tree = TreeOptions::new("8ft", "Noble Fir")?;
        tree.set_rental_period(RentalPeriod::Days60);
        tree.set_decor_level(DecorLevel::Full);

        let mut customer = CustomerDetails::new("Holly", "holly@example.com", "8123 4567");
        customer.apply_delivery(&ResolvedDelivery {
            fee: Price::from_major(45),
            zone_name: "East".to_string(),
        });

        let pricing = PriceBreakdown {
            base: Price::from_major(300),
            rental: Price::from_major(100),
            men_power: Price::from_major(250),
            installation: Price::from_major(100),
            delivery: Price::from_major(45),
            add_ons: Price::from_major(20),
            subtotal: Price::from_major(815),
            discount: Price::from_major(15),
            total: Price::from_major(800),
            ..PriceBreakdown::default()
        };

        Ok(Order {
            id: OrderId::new(),
            order_number: OrderNumber::from_parts(1_766_000_123_456, 10),
            customer,
            line: OrderLine::Product {
                product_id: ProductId::new(),
                title: "Grand Tree".to_string(),
                tree: Some(tree),
            },
            men_power: Some(5),
            dates: ServiceDates {
                installation_date: Some(date(2026, 12, 19)),
                teardown_date: None,
            },
            add_ons: vec![SelectedAddOn {
                id: "stairs".to_string(),
                name: "Stair carry".to_string(),
                fee: Price::from_major(20),
            }],
            discount_code_id: None,
            pricing,
            total_amount: pricing.total,
            status: OrderStatus::Pending,
            payment_intent_id: Some("pi_1".to_string()),
            created_at: Timestamp::UNIX_EPOCH,
        })
    }

    #[test]
    fn from_order_lists_every_charge() -> anyhow::Result<()> {
        let receipt = Receipt::from_order(&tree_order()?);

        let labels: Vec<&str> = receipt
            .lines()
            .iter()
            .map(|line| line.label.as_str())
            .collect();

        assert_eq!(
            labels,
            [
                "Grand Tree (8ft Noble Fir)",
                "Rental period",
                "Installers",
                "Installation",
                "Delivery",
                "Add-on",
            ]
        );
        assert_eq!(receipt.total(), Price::from_major(800));

        Ok(())
    }

    #[test]
    fn write_to_renders_table_and_totals() -> anyhow::Result<()> {
        let receipt = Receipt::from_order(&tree_order()?);

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("TJ-123456-00A"));
        assert!(output.contains("Stair carry"));
        assert!(output.contains("100% decorated"));
        assert!(output.contains("Subtotal:"));
        assert!(output.contains("-$15.00"));
        assert!(output.contains("$800.00"));

        Ok(())
    }

    #[test]
    fn gift_card_receipt_has_no_delivery() -> anyhow::Result<()> {
        let mut order = tree_order()?;

        order.line = OrderLine::GiftCard {
            gift_card_id: GiftCardId::new(),
        };
        order.men_power = None;
        order.dates = ServiceDates::default();
        order.add_ons.clear();
        order.pricing = PriceBreakdown::gift_card(Price::from_major(75));
        order.total_amount = Price::from_major(75);

        let receipt = Receipt::from_order(&order);

        assert_eq!(receipt.lines().len(), 1);
        assert_eq!(receipt.discount(), Price::ZERO);
        assert_eq!(receipt.total(), Price::from_major(75));

        Ok(())
    }
}

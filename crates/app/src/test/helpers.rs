//! Test Helpers

use std::sync::atomic::{AtomicU32, Ordering};

use garland::{
    catalog::{
        Category, Product, ProductId,
        trees::{DecorLevel, RentalPeriod, TreeOptions, TreeOptionsError},
    },
    customers::CustomerDetails,
    discounts::{DiscountCode, DiscountCodeId, DiscountKind},
    orders::{Order, OrderId, OrderLine, OrderNumber, OrderStatus, ServiceDates},
    prices::Price,
    pricing::{DayType, PriceBreakdown, TimingSurcharge, TimingSurchargeId},
};
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde_json::json;

static ORDER_SEQUENCE: AtomicU32 = AtomicU32::new(1);

pub(crate) fn product(title: &str, category: Category, price: u64) -> Product {
    Product {
        id: ProductId::new(),
        title: title.to_string(),
        price: Price::from_major(price),
        category,
        colors: vec!["gold".to_string()],
        decorated: false,
        images: Vec::new(),
    }
}

/// 8ft Noble Fir, fully decorated, for 60 days.
pub(crate) fn tree_options() -> Result<TreeOptions, TreeOptionsError> {
    let mut tree = TreeOptions::new("8ft", "Noble Fir")?;

    tree.set_rental_period(RentalPeriod::Days60);
    tree.set_decor_level(DecorLevel::Full);

    Ok(tree)
}

pub(crate) fn discount_code(code: &str, kind: DiscountKind, value: Decimal) -> DiscountCode {
    DiscountCode {
        id: DiscountCodeId::new(),
        code: code.to_string(),
        kind,
        value,
        min_order_amount: Price::ZERO,
        max_uses: None,
        used_count: 0,
        valid_from: None,
        valid_until: None,
        is_active: true,
    }
}

pub(crate) fn timing_surcharge(
    name: &str,
    day_type: DayType,
    amount: u64,
    is_active: bool,
) -> TimingSurcharge {
    TimingSurcharge {
        id: TimingSurchargeId::new(),
        name: name.to_string(),
        day_type,
        amount: Price::from_major(amount),
        is_active,
    }
}

pub(crate) fn fill_customer(customer: &mut CustomerDetails) {
    customer.name = "Carol Singer".to_string();
    customer.email = "carol@example.com".to_string();
    customer.phone = "9123 4567".to_string();
    customer.street_address = "3 Holly Lane".to_string();
}

/// A pending decoration order with its own order number.
pub(crate) fn decoration_order() -> Order {
    let entropy = ORDER_SEQUENCE.fetch_add(1, Ordering::Relaxed);

    // Delivery can only be set by the resolver, so build it as a stored row would read.
    let customer: CustomerDetails = serde_json::from_value(json!({
        "name": "Carol Singer",
        "email": "carol@example.com",
        "phone": "9123 4567",
        "street_address": "3 Holly Lane",
        "delivery_zone": "Central",
        "delivery_area": "Central",
        "delivery_fee": 4_000,
    }))
    .expect("customer row should deserialize");

    let pricing = PriceBreakdown {
        base: Price::from_major(80),
        delivery: Price::from_major(40),
        subtotal: Price::from_major(120),
        total: Price::from_major(120),
        ..PriceBreakdown::default()
    };

    Order {
        id: OrderId::new(),
        order_number: OrderNumber::from_parts(1_766_000_000_000, entropy),
        customer,
        line: OrderLine::Product {
            product_id: ProductId::new(),
            title: "Snowfall Garland".to_string(),
            tree: None,
        },
        men_power: None,
        dates: ServiceDates::default(),
        add_ons: Vec::new(),
        discount_code_id: None,
        pricing,
        total_amount: pricing.total,
        status: OrderStatus::Pending,
        payment_intent_id: Some("pi_test".to_string()),
        created_at: Timestamp::now(),
    }
}

//! Integration tests walking whole orders through checkout and pricing.

use jiff::{Timestamp, civil::date};
use rust_decimal_macros::dec;
use uuid::Uuid;

use garland::{
    catalog::{Category, EventService, EventServiceId, Product, ProductId},
    checkout::{CheckoutError, CheckoutSession, CheckoutStep, OrderSeed, PaidIntent},
    delivery::{
        DeliveryConfiguration, DeliveryError, DeliveryModel, DeliverySelection, DeliveryZone,
        resolve,
    },
    discounts::{self, DiscountCode, DiscountCodeId, DiscountError, DiscountKind},
    gift_cards::{GiftCardError, GiftCardRequest},
    orders::{OrderLine, OrderNumber},
    prelude::{DecorLevel, EventSize, RentalPeriod, TreeOptions},
    prices::Price,
    pricing::{
        DayType, HolidayCalendar, MenPowerTiers, OrderCharges, PricingContext, TimingSurcharge,
        TimingSurchargeId, compute_order_total, rental_surcharge,
    },
};

struct Config {
    tiers: MenPowerTiers,
    surcharges: Vec<TimingSurcharge>,
    holidays: HolidayCalendar,
    delivery: DeliveryConfiguration,
}

impl Config {
    fn new() -> Self {
        Self {
            tiers: MenPowerTiers::default(),
            surcharges: vec![TimingSurcharge {
                id: TimingSurchargeId::from_uuid(Uuid::from_u128(1)),
                name: "Weekend".to_string(),
                day_type: DayType::Weekend,
                amount: Price::from_major(100),
                is_active: true,
            }],
            holidays: HolidayCalendar::new([date(2026, 12, 25)]),
            delivery: DeliveryConfiguration::default(),
        }
    }

    fn context(&self) -> PricingContext<'_> {
        PricingContext {
            men_power: &self.tiers,
            surcharges: &self.surcharges,
            holidays: &self.holidays,
            add_ons: &self.delivery.add_ons,
        }
    }
}

fn product(category: Category, price: Price) -> Product {
    Product {
        id: ProductId::new(),
        title: "Snowfall Garland".to_string(),
        price,
        category,
        colors: vec!["gold".to_string()],
        decorated: false,
        images: Vec::new(),
    }
}

fn start(seed: OrderSeed) -> CheckoutSession {
    CheckoutSession::start(seed, OrderNumber::from_parts(1_766_000_654_321, 1_234))
}

fn fill_contact(session: &mut CheckoutSession) -> anyhow::Result<()> {
    let customer = session.customer_mut()?;

    customer.name = "Carol Singer".to_string();
    customer.email = "carol@example.com".to_string();
    customer.phone = "9123 4567".to_string();
    customer.street_address = "3 Holly Lane".to_string();

    Ok(())
}

fn discount_code(code: &str, kind: DiscountKind, value: rust_decimal::Decimal) -> DiscountCode {
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

#[test]
fn tree_rental_with_weekend_install_and_full_crew() -> anyhow::Result<()> {
    let mut config = Config::new();
    config.delivery.zones = vec![DeliveryZone {
        id: "east".to_string(),
        name: "East".to_string(),
        postal_codes: vec!["46".to_string()],
        fee: Price::from_major(45),
    }];

    let base = Price::from_major(350);

    let mut session = start(OrderSeed::Product {
        product: product(Category::Trees, base),
        tree: Some(TreeOptions::new("9ft", "Nordmann Fir")?),
    });

    session.set_rental_period(RentalPeriod::Days60)?;
    session.set_decor_level(DecorLevel::Full)?;
    session.set_event_size(Some(EventSize::Medium))?;
    session.set_men_power(Some(5))?;
    // Saturday
    session.set_installation_date(Some(date(2026, 12, 19)))?;

    assert_eq!(session.advance()?, CheckoutStep::CustomerDetails);

    fill_contact(&mut session)?;
    session.select_delivery(
        &config.delivery,
        &DeliverySelection::PostalCode("460123".to_string()),
    )?;

    assert_eq!(session.advance()?, CheckoutStep::Payment);

    let quote = session.quote(&config.context())?;
    let expected = base
        .checked_add(Price::from_major(100 + 250 + 100 + 45))?;

    assert_eq!(quote.rental, Price::from_major(100));
    assert_eq!(quote.men_power, Price::from_major(250));
    assert_eq!(quote.installation, Price::from_major(100));
    assert_eq!(quote.teardown, Price::ZERO);
    assert_eq!(quote.delivery, Price::from_major(45));
    assert_eq!(quote.total, expected);

    Ok(())
}

#[test]
fn decoration_with_percentage_code_discounts_delivery_too() -> anyhow::Result<()> {
    let config = Config::new();
    let price = Price::new(8_999);

    let mut session = start(OrderSeed::Product {
        product: product(Category::Decorations, price),
        tree: None,
    });

    assert_eq!(session.step(), CheckoutStep::CustomerDetails);

    fill_contact(&mut session)?;
    session.select_delivery(
        &config.delivery,
        &DeliverySelection::Zone("central".to_string()),
    )?;

    let codes = [discount_code("SAVE10", DiscountKind::Percentage, dec!(10))];

    session.apply_discount_code(&codes, "save10", &config.context(), Timestamp::now())?;

    let quote = session.quote(&config.context())?;

    // (89.99 + 40.00) * 0.9 = 116.991
    assert_eq!(quote.subtotal, Price::new(12_999));
    assert_eq!(quote.discount, Price::new(1_300));
    assert_eq!(quote.total, Price::new(11_699));

    Ok(())
}

#[test]
fn gift_card_for_self_costs_face_value() -> anyhow::Result<()> {
    let config = Config::new();

    let card = GiftCardRequest {
        amount: Price::from_major(75),
        sender_name: "Carol Singer".to_string(),
        sender_email: "carol@example.com".to_string(),
        is_for_self: true,
        ..GiftCardRequest::default()
    }
    .validate(date(2026, 12, 1))?;

    let card_id = card.id;

    let mut session = start(OrderSeed::GiftCard { card });

    assert_eq!(session.step(), CheckoutStep::CustomerDetails);

    let customer = session.customer_mut()?;
    customer.name = "Carol Singer".to_string();
    customer.email = "carol@example.com".to_string();
    customer.phone = "9123 4567".to_string();

    assert_eq!(session.advance()?, CheckoutStep::Payment);

    session.record_payment(PaidIntent {
        id: "pi_gift".to_string(),
        amount: Price::from_major(75),
    })?;

    let prepared = session.prepare_order(&config.context(), Timestamp::now())?;

    assert_eq!(prepared.order.total_amount, Price::from_major(75));
    assert_eq!(prepared.order.pricing.subtotal, Price::from_major(75));
    assert_eq!(
        prepared.order.line,
        OrderLine::GiftCard {
            gift_card_id: card_id
        }
    );
    assert_eq!(prepared.gift_card.map(|card| card.id), Some(card_id));

    session.mark_submitted()?;

    assert_eq!(session.step(), CheckoutStep::Submitted);

    Ok(())
}

#[test]
fn used_up_code_leaves_total_unchanged() -> anyhow::Result<()> {
    let config = Config::new();

    let mut session = start(OrderSeed::Product {
        product: product(Category::Ribbons, Price::from_major(30)),
        tree: None,
    });

    session.select_delivery(
        &config.delivery,
        &DeliverySelection::Zone("central".to_string()),
    )?;

    let before = session.quote(&config.context())?;

    let mut capped = discount_code("LASTONE", DiscountKind::Fixed, dec!(10));
    capped.max_uses = Some(5);
    capped.used_count = 5;

    let result =
        session.apply_discount_code(&[capped], "LASTONE", &config.context(), Timestamp::now());

    assert!(matches!(
        result,
        Err(CheckoutError::Discount(DiscountError::UsageLimitReached))
    ));
    assert_eq!(session.quote(&config.context())?, before);

    Ok(())
}

#[test]
fn unknown_postal_code_blocks_delivery_step() -> anyhow::Result<()> {
    let config = Config::new();

    let mut session = start(OrderSeed::Product {
        product: product(Category::Centrepieces, Price::from_major(60)),
        tree: None,
    });

    fill_contact(&mut session)?;

    let error = session
        .select_delivery(
            &config.delivery,
            &DeliverySelection::PostalCode("999999".to_string()),
        )
        .err();

    assert_eq!(
        error.as_ref().map(ToString::to_string).as_deref(),
        Some("Sorry, we do not deliver to postal code 999999 yet")
    );
    assert!(matches!(
        error,
        Some(CheckoutError::Delivery(DeliveryError::ZoneNotFound(_)))
    ));
    assert_eq!(session.advance(), Err(CheckoutError::MissingDelivery));
    assert_eq!(session.step(), CheckoutStep::CustomerDetails);

    Ok(())
}

#[test]
fn rental_surcharge_fails_outside_table() -> anyhow::Result<()> {
    assert_eq!(rental_surcharge(45)?, Price::ZERO);
    assert_eq!(rental_surcharge(60)?, Price::from_major(100));
    assert_eq!(rental_surcharge(90)?, Price::from_major(200));

    for days in [0, 1, 30, 59, 61, 89, 91, 365] {
        assert!(rental_surcharge(days).is_err(), "{days} days should fail");
    }

    Ok(())
}

#[test]
fn total_never_goes_negative() -> anyhow::Result<()> {
    let config = Config::new();
    let codes = [discount_code("HUGE", DiscountKind::Fixed, dec!(10000))];

    for base in [0, 1, 999, 50_000] {
        let subtotal = Price::new(base);
        let applied = discounts::validate(&codes, "HUGE", subtotal, Timestamp::now())?;

        let breakdown = compute_order_total(
            subtotal,
            &OrderCharges {
                discount: Some(&applied),
                ..OrderCharges::default()
            },
            &config.context(),
        )?;

        assert_eq!(breakdown.total, Price::ZERO);
        assert_eq!(breakdown.discount, subtotal);
    }

    Ok(())
}

#[test]
fn validating_twice_gives_same_result() -> anyhow::Result<()> {
    let mut code = discount_code("TWICE", DiscountKind::Percentage, dec!(12.5));
    code.max_uses = Some(1);

    let codes = [code];
    let now = Timestamp::now();

    let first = discounts::validate(&codes, "TWICE", Price::new(4_321), now)?;
    let second = discounts::validate(&codes, "TWICE", Price::new(4_321), now)?;

    assert_eq!(first.amount, second.amount);
    assert_eq!(first.discount_id, second.discount_id);

    Ok(())
}

#[test]
fn exact_postal_code_beats_prefix() -> anyhow::Result<()> {
    let config = DeliveryConfiguration {
        model: DeliveryModel::Zone,
        zones: vec![
            DeliveryZone {
                id: "prefix".to_string(),
                name: "Sector 52".to_string(),
                postal_codes: vec!["52".to_string()],
                fee: Price::from_major(50),
            },
            DeliveryZone {
                id: "exact".to_string(),
                name: "Harbourfront".to_string(),
                postal_codes: vec!["520001".to_string()],
                fee: Price::from_major(65),
            },
        ],
        ..DeliveryConfiguration::default()
    };

    let exact = resolve(&config, &DeliverySelection::PostalCode("520001".to_string()))?;
    let prefix = resolve(&config, &DeliverySelection::PostalCode("520002".to_string()))?;

    assert_eq!(exact.fee, Price::from_major(65));
    assert_eq!(prefix.fee, Price::from_major(50));

    Ok(())
}

#[test]
fn gift_card_amount_bounds() {
    let request = |cents| GiftCardRequest {
        amount: Price::new(cents),
        sender_name: "Carol".to_string(),
        sender_email: "carol@example.com".to_string(),
        is_for_self: true,
        ..GiftCardRequest::default()
    };

    let today = date(2026, 11, 30);

    assert!(request(1_000).validate(today).is_ok());
    assert!(request(100_000).validate(today).is_ok());
    assert!(matches!(
        request(999).validate(today),
        Err(GiftCardError::AmountOutOfRange(_))
    ));
    assert!(matches!(
        request(100_001).validate(today),
        Err(GiftCardError::AmountOutOfRange(_))
    ));
}

#[test]
fn event_booking_prices_holiday_teardown() -> anyhow::Result<()> {
    let mut config = Config::new();
    config.surcharges.push(TimingSurcharge {
        id: TimingSurchargeId::from_uuid(Uuid::from_u128(2)),
        name: "Public holiday".to_string(),
        day_type: DayType::Holiday,
        amount: Price::from_major(150),
        is_active: true,
    });

    let mut session = start(OrderSeed::Event {
        service: EventService {
            id: EventServiceId::new(),
            title: "Ballroom styling".to_string(),
            price: Price::from_major(1_200),
            is_active: true,
        },
    });

    // Wednesday install, Friday holiday teardown
    session.set_installation_date(Some(date(2026, 12, 2)))?;
    session.set_teardown_date(Some(date(2026, 12, 25)))?;

    let quote = session.quote(&config.context())?;

    assert_eq!(quote.installation, Price::ZERO);
    assert_eq!(quote.teardown, Price::from_major(150));

    session.set_teardown(false)?;

    assert_eq!(session.quote(&config.context())?.teardown, Price::ZERO);

    Ok(())
}

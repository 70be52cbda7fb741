//! Garland prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    catalog::{
        Category, EventService, EventServiceId, Product, ProductId,
        trees::{DecorLevel, EventSize, RentalPeriod, TreeOptions, TreeOptionsError},
    },
    checkout::{
        CheckoutError, CheckoutSession, CheckoutStep, FlowKind, OrderSeed, PaidIntent,
        PreparedOrder, Scheduling,
    },
    customers::CustomerDetails,
    delivery::{
        DeliveryAddOn, DeliveryConfiguration, DeliveryError, DeliveryModel, DeliverySelection,
        DeliveryZone, DistanceConfig, ResolvedDelivery, resolve,
    },
    discounts::{AppliedDiscount, DiscountCode, DiscountCodeId, DiscountError, DiscountKind},
    gift_cards::{GiftCard, GiftCardDelivery, GiftCardError, GiftCardId, GiftCardRequest},
    ids::TypedUuid,
    orders::{Order, OrderError, OrderId, OrderLine, OrderNumber, OrderStatus},
    prices::{Price, PriceError},
    pricing::{
        DayType, HolidayCalendar, MenPowerTier, MenPowerTiers, OrderCharges, PriceBreakdown,
        PricingContext, PricingError, TimingSurcharge, TimingSurchargeId, compute_order_total,
    },
    receipt::{Receipt, ReceiptError},
    settings::{PricingSettings, SettingsError},
};

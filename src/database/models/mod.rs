pub mod category;
pub mod exchange_rate;
pub mod payment;
pub mod payment_method;
pub mod settings;
pub mod subscription;
pub mod summary;

pub use category::{Category, NewCategory};
pub use exchange_rate::ExchangeRate;
pub use payment::{NewPayment, Payment, PaymentStatus};
pub use payment_method::{NewPaymentMethod, PaymentMethod};
pub use settings::{Settings, Theme, UpdateSettings};
pub use subscription::{
    BillingCycle, NewSubscription, RenewalType, Subscription, SubscriptionStatus,
    UpdateSubscription,
};
pub use summary::MonthlySummary;

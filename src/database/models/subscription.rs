use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Paused,
    Cancelled,
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        SubscriptionStatus::Active
    }
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Whether the daily job advances billing dates for this subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenewalType {
    Auto,
    Manual,
}

impl Default for RenewalType {
    fn default() -> Self {
        RenewalType::Auto
    }
}

impl RenewalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(Self::Auto),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub subscription_id: i64,
    pub name: String,
    pub plan: Option<String>,
    pub billing_cycle: BillingCycle,
    pub amount: Decimal,
    pub currency: String,
    pub next_billing_date: NaiveDate,
    pub last_billing_date: Option<NaiveDate>,
    pub status: SubscriptionStatus,
    pub renewal_type: RenewalType,
    pub category_id: i64,
    pub payment_method_id: i64,
    pub notes: Option<String>,
    pub sub_created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSubscription {
    pub name: String,
    pub plan: Option<String>,
    pub billing_cycle: BillingCycle,
    pub amount: Decimal,
    pub currency: String,
    pub next_billing_date: NaiveDate,
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub renewal_type: RenewalType,
    pub category_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub notes: Option<String>,
}

/// Full-row replacement used by PUT; absent optional fields clear the column.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubscription {
    pub name: String,
    pub plan: Option<String>,
    pub billing_cycle: BillingCycle,
    pub amount: Decimal,
    pub currency: String,
    pub next_billing_date: NaiveDate,
    pub status: SubscriptionStatus,
    pub renewal_type: RenewalType,
    pub category_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub notes: Option<String>,
}

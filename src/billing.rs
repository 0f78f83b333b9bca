use chrono::{Months, NaiveDate};

use crate::database::models::BillingCycle;

/// Add one billing interval to a date.
///
/// Month arithmetic clamps to the end of shorter months (Jan 31 + monthly is
/// Feb 28, or Feb 29 in a leap year) and does not un-clamp afterwards.
pub fn advance_date(date: NaiveDate, cycle: BillingCycle) -> NaiveDate {
    let months = match cycle {
        BillingCycle::Monthly => 1,
        BillingCycle::Quarterly => 3,
        BillingCycle::Yearly => 12,
    };
    // In-range dates can always move forward by a few months.
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Last day of the billing period that starts at `period_start`.
pub fn period_end(period_start: NaiveDate, cycle: BillingCycle) -> NaiveDate {
    advance_date(period_start, cycle).pred_opt().unwrap_or(period_start)
}

/// Advance `next` past `today`, one interval at a time.
///
/// Returns the first due date strictly after `today` together with the number
/// of periods that elapsed. A date already in the future comes back unchanged
/// with a count of zero; a subscription left unprocessed for several periods
/// catches up in one call.
pub fn roll_forward(next: NaiveDate, cycle: BillingCycle, today: NaiveDate) -> (NaiveDate, u32) {
    let mut due = next;
    let mut periods = 0;
    while due <= today {
        due = advance_date(due, cycle);
        periods += 1;
    }
    (due, periods)
}

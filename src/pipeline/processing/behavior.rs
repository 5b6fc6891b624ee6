use crate::types::PaymentBehavior;

/// "Yes" iff the payment arrived with zero delay.
pub fn on_time_flag(delay_days: i64) -> &'static str {
    if delay_days == 0 {
        "Yes"
    } else {
        "No"
    }
}

/// Label a payment by its delay. Thresholds are inclusive on the lower
/// branch: 0 is Good, 10 is still Average, 11 is Delayed.
pub fn classify(delay_days: i64) -> PaymentBehavior {
    match delay_days {
        0 => PaymentBehavior::Good,
        d if d <= 10 => PaymentBehavior::Average,
        _ => PaymentBehavior::Delayed,
    }
}

use rust_decimal::Decimal;

use crate::database::models::cash_card::CashCard;

/// Sample cards: three for `sarah1` and one for `kumar2`
pub fn sample_cash_cards() -> Vec<CashCard> {
    vec![
        card(99, Decimal::new(12345, 2), "sarah1"),
        card(100, Decimal::new(100, 2), "sarah1"),
        card(101, Decimal::new(15000, 2), "sarah1"),
        card(102, Decimal::new(20000, 2), "kumar2"),
    ]
}

fn card(id: i64, amount: Decimal, owner: &str) -> CashCard {
    CashCard {
        id,
        amount,
        owner: owner.to_string(),
    }
}

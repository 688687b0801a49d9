use chrono::NaiveDate;
use log::trace;

use crate::error::{Error, Result};
use crate::transactions::{Transaction, TransactionKind};

/// Leftover units below this are floating point noise, not an over-sell.
pub const UNIT_TOLERANCE: f64 = 1e-9;

/// A lot of units acquired by a single buy.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    date: NaiveDate,
    units: f64,
    remaining_units: f64,
    price: f64,
}

impl Holding {
    pub fn acquire(transaction: &Transaction) -> Self {
        Holding {
            date: transaction.date(),
            units: transaction.units(),
            remaining_units: transaction.units(),
            price: transaction.price(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn units(&self) -> f64 {
        self.units
    }

    pub fn remaining_units(&self) -> f64 {
        self.remaining_units
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Cost basis of what is left of the lot.
    pub fn value(&self) -> f64 {
        self.remaining_units * self.price
    }
}

/**
 * Replays `transactions` (already in date order) and returns the lots that
 * remain, oldest first. Sells drain the oldest lots first; selling more than
 * was ever held fails with a consistency error naming `scheme`.
 */
pub fn derive_holdings(scheme: &str, transactions: &[Transaction]) -> Result<Vec<Holding>> {
    let mut holdings = Vec::new();
    for transaction in transactions {
        match transaction.kind() {
            TransactionKind::Buy => holdings.push(Holding::acquire(transaction)),
            TransactionKind::Sell => consume(scheme, &mut holdings, transaction.units())?,
            TransactionKind::Other => {}
        }
    }
    Ok(holdings)
}

fn consume(scheme: &str, holdings: &mut [Holding], units: f64) -> Result<()> {
    let mut to_consume = units;
    for holding in holdings.iter_mut() {
        if holding.remaining_units > to_consume {
            trace!("{}: taking {} units from lot of {}", scheme, to_consume, holding.date);
            holding.remaining_units -= to_consume;
            to_consume = 0.0;
            break;
        }

        if holding.remaining_units > 0.0 {
            trace!("{}: exhausting lot of {}", scheme, holding.date);
        }
        to_consume -= holding.remaining_units;
        holding.remaining_units = 0.0;
        if to_consume <= 0.0 {
            break;
        }
    }

    if to_consume > UNIT_TOLERANCE {
        return Err(Error::Consistency {
            scheme: scheme.to_string(),
            excess: to_consume,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEME: &str = "Test Fund";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn buy(date: NaiveDate, units: f64, price: f64) -> Transaction {
        Transaction::new(date, TransactionKind::Buy, units, price, units * price)
    }

    fn sell(date: NaiveDate, units: f64) -> Transaction {
        Transaction::new(date, TransactionKind::Sell, -units, 0.0, 0.0)
    }

    fn remaining(holdings: &[Holding]) -> Vec<f64> {
        holdings.iter().map(Holding::remaining_units).collect()
    }

    mod buys {
        use super::*;

        #[test]
        fn every_buy_opens_a_lot() {
            let transactions = [
                buy(date(2023, 1, 1), 10.0, 5.0),
                buy(date(2023, 2, 1), 20.0, 6.0),
                buy(date(2023, 3, 1), 30.0, 7.0),
            ];
            let holdings = derive_holdings(SCHEME, &transactions).unwrap();

            assert_eq!(holdings.len(), 3);
            assert_eq!(remaining(&holdings), vec![10.0, 20.0, 30.0]);
            assert_eq!(holdings[1].units(), 20.0);
            assert_eq!(holdings[1].price(), 6.0);
            assert_eq!(holdings[1].date(), date(2023, 2, 1));
        }

        #[test]
        fn other_transactions_do_nothing() {
            let transactions = [
                buy(date(2023, 1, 1), 10.0, 5.0),
                Transaction::other(date(2023, 1, 2)),
            ];
            let holdings = derive_holdings(SCHEME, &transactions).unwrap();
            assert_eq!(remaining(&holdings), vec![10.0]);
        }
    }

    mod sells {
        use super::*;

        #[test]
        fn oldest_lot_is_consumed_first() {
            let transactions = [
                buy(date(2023, 1, 1), 100.0, 10.0),
                buy(date(2023, 2, 1), 50.0, 12.0),
                sell(date(2023, 3, 1), 120.0),
            ];
            let holdings = derive_holdings(SCHEME, &transactions).unwrap();

            assert_eq!(remaining(&holdings), vec![0.0, 30.0]);
            let value: f64 = holdings.iter().map(Holding::value).sum();
            assert_eq!(value, 360.0);
        }

        #[test]
        fn partial_sell_leaves_newer_lots_untouched() {
            let transactions = [
                buy(date(2023, 1, 1), 100.0, 10.0),
                buy(date(2023, 2, 1), 50.0, 12.0),
                sell(date(2023, 3, 1), 40.0),
                sell(date(2023, 4, 1), 40.0),
            ];
            let holdings = derive_holdings(SCHEME, &transactions).unwrap();
            assert_eq!(remaining(&holdings), vec![20.0, 50.0]);
        }

        #[test]
        fn exact_exhaustion_stops_the_walk() {
            let transactions = [
                buy(date(2023, 1, 1), 10.0, 1.0),
                buy(date(2023, 1, 2), 10.0, 1.0),
                sell(date(2023, 1, 3), 10.0),
            ];
            let holdings = derive_holdings(SCHEME, &transactions).unwrap();
            assert_eq!(remaining(&holdings), vec![0.0, 10.0]);
        }

        #[test]
        fn selling_everything_leaves_empty_lots() {
            let transactions = [
                buy(date(2023, 1, 1), 10.0, 1.0),
                buy(date(2023, 1, 2), 5.0, 1.0),
                sell(date(2023, 1, 3), 15.0),
            ];
            let holdings = derive_holdings(SCHEME, &transactions).unwrap();
            assert_eq!(holdings.len(), 2);
            assert_eq!(remaining(&holdings), vec![0.0, 0.0]);
        }

        #[test]
        fn later_buys_open_new_lots_after_sells() {
            let transactions = [
                buy(date(2023, 1, 1), 10.0, 1.0),
                sell(date(2023, 1, 2), 10.0),
                buy(date(2023, 1, 3), 4.0, 2.0),
                sell(date(2023, 1, 4), 1.0),
            ];
            let holdings = derive_holdings(SCHEME, &transactions).unwrap();
            assert_eq!(remaining(&holdings), vec![0.0, 3.0]);
        }

        #[test]
        fn remaining_units_equal_bought_minus_sold() {
            let transactions = [
                buy(date(2023, 1, 1), 12.5, 1.0),
                sell(date(2023, 1, 2), 3.25),
                buy(date(2023, 1, 3), 7.75, 1.0),
                sell(date(2023, 1, 4), 10.0),
                buy(date(2023, 1, 5), 1.5, 1.0),
                sell(date(2023, 1, 6), 0.5),
            ];
            let holdings = derive_holdings(SCHEME, &transactions).unwrap();
            let total: f64 = remaining(&holdings).iter().sum();
            assert!((total - 8.0).abs() < UNIT_TOLERANCE);
            for holding in &holdings {
                assert!(holding.remaining_units() >= 0.0);
                assert!(holding.remaining_units() <= holding.units());
            }
        }

        #[test]
        fn floating_point_noise_is_tolerated() {
            let transactions = [
                buy(date(2023, 1, 1), 0.1, 1.0),
                buy(date(2023, 1, 2), 0.2, 1.0),
                sell(date(2023, 1, 3), 0.1 + 0.2),
            ];
            assert!(derive_holdings(SCHEME, &transactions).is_ok());
        }
    }

    mod over_sells {
        use super::*;

        #[test]
        fn sell_without_buys_fails() {
            let transactions = [sell(date(2023, 1, 1), 10.0)];
            match derive_holdings(SCHEME, &transactions) {
                Err(Error::Consistency { scheme, excess }) => {
                    assert_eq!(scheme, SCHEME);
                    assert_eq!(excess, 10.0);
                }
                other => panic!("expected consistency error, got {:?}", other),
            }
        }

        #[test]
        fn selling_more_than_bought_fails() {
            let transactions = [
                buy(date(2023, 1, 1), 10.0, 1.0),
                sell(date(2023, 1, 2), 10.5),
            ];
            assert!(matches!(
                derive_holdings(SCHEME, &transactions),
                Err(Error::Consistency { .. })
            ));
        }

        #[test]
        fn sell_before_buy_fails() {
            let transactions = [
                sell(date(2023, 1, 1), 1.0),
                buy(date(2023, 1, 2), 10.0, 1.0),
            ];
            assert!(matches!(
                derive_holdings(SCHEME, &transactions),
                Err(Error::Consistency { .. })
            ));
        }
    }
}

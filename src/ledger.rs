use std::path::Path;

use log::{debug, info};

use crate::error::Result;
use crate::holdings::{derive_holdings, Holding};
use crate::range::DateRange;
use crate::schemes::SchemeMap;
use crate::transactions::{discover_statements, read_statement, StatementRow, Transaction, TransactionKind};

#[derive(Debug)]
pub struct Scheme {
    code: String,
    name: String,
    transactions: Vec<Transaction>,
    holdings: Vec<Holding>,
}

impl Scheme {
    fn new(code: &str) -> Self {
        Scheme {
            code: code.to_string(),
            name: String::new(),
            transactions: Vec::new(),
            holdings: Vec::new(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Acquisition cost of the units still held.
    pub fn cost_basis(&self) -> f64 {
        self.holdings.iter().map(Holding::value).sum()
    }

    /// Sum of buy amounts dated inside `range`.
    pub fn invested_in(&self, range: &DateRange) -> f64 {
        self.transactions
            .iter()
            .filter(|t| t.kind() == TransactionKind::Buy && range.contains(t.date()))
            .map(Transaction::amount)
            .sum()
    }

    /// Stable, so same-day transactions keep their statement order.
    fn sort_transactions(&mut self) {
        self.transactions.sort_by_key(Transaction::date);
    }

    fn build_holdings(&mut self, folio: &str) -> Result<()> {
        let label = format!("{} ({}) in folio {}", self.name, self.code, folio);
        self.holdings = derive_holdings(&label, &self.transactions)?;
        debug!("{}: {} lots from {} transactions", label, self.holdings.len(), self.transactions.len());
        Ok(())
    }
}

#[derive(Debug)]
pub struct Folio {
    number: String,
    amc_name: String,
    schemes: Vec<Scheme>,
}

impl Folio {
    fn new(number: &str) -> Self {
        Folio {
            number: number.to_string(),
            amc_name: String::new(),
            schemes: Vec::new(),
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn amc_name(&self) -> &str {
        &self.amc_name
    }

    pub fn schemes(&self) -> &[Scheme] {
        &self.schemes
    }

    fn scheme_mut(&mut self, code: &str) -> &mut Scheme {
        let index = match self.schemes.iter().position(|s| s.code == code) {
            Some(index) => index,
            None => {
                self.schemes.push(Scheme::new(code));
                self.schemes.len() - 1
            }
        };
        &mut self.schemes[index]
    }
}

/**
 * Folios in the order they were first seen. Identity (folio number, scheme
 * code) is fixed by the first row that mentions it; display names follow the
 * latest row.
 */
#[derive(Debug, Default)]
pub struct Ledger {
    folios: Vec<Folio>,
}

impl Ledger {
    /// Reads every statement in `dir` and derives the holdings of each scheme.
    pub fn load(dir: &Path, schemes: &SchemeMap) -> Result<Self> {
        let mut ledger = Ledger::default();
        for path in discover_statements(dir)? {
            debug!("Reading statement {}", path.display());
            read_statement(&path, |row| ledger.ingest(&row, schemes))?;
        }
        info!(
            "Ingested {} transactions across {} folios",
            ledger.transaction_count(),
            ledger.folios.len()
        );

        ledger.sort_transactions();
        ledger.build_holdings()?;
        Ok(ledger)
    }

    pub fn folios(&self) -> &[Folio] {
        &self.folios
    }

    pub fn ingest(&mut self, row: &StatementRow<'_>, schemes: &SchemeMap) -> Result<()> {
        let code = schemes.resolve(row.issuer_code, row.scheme_name)?;
        let transaction = row.to_transaction()?;

        let folio = self.folio_mut(row.folio);
        folio.amc_name = row.amc_name.to_string();
        let scheme = folio.scheme_mut(code);
        scheme.name = row.scheme_name.to_string();
        scheme.transactions.push(transaction);
        Ok(())
    }

    pub fn sort_transactions(&mut self) {
        for folio in &mut self.folios {
            for scheme in &mut folio.schemes {
                scheme.sort_transactions();
            }
        }
    }

    pub fn build_holdings(&mut self) -> Result<()> {
        for folio in &mut self.folios {
            for scheme in &mut folio.schemes {
                scheme.build_holdings(&folio.number)?;
            }
        }
        Ok(())
    }

    pub fn transaction_count(&self) -> usize {
        self.folios
            .iter()
            .flat_map(|f| &f.schemes)
            .map(|s| s.transactions.len())
            .sum()
    }

    fn folio_mut(&mut self, number: &str) -> &mut Folio {
        let index = match self.folios.iter().position(|f| f.number == number) {
            Some(index) => index,
            None => {
                self.folios.push(Folio::new(number));
                self.folios.len() - 1
            }
        };
        &mut self.folios[index]
    }
}

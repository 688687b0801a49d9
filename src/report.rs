use std::fmt::Display;

use crate::currency::format_rupees;
use crate::ledger::{Ledger, Scheme};
use crate::range::DateRange;

const SEPARATOR_WIDTH: usize = 100;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReportKind {
    /// Acquisition cost of the units still held.
    Holdings,
    /// Amount put into buys within a window of dates.
    Invested(DateRange),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemeLine {
    pub name: String,
    pub total: f64,
}

/**
 * Per-scheme totals grouped by folio, per-AMC totals and a grand total.
 * AMCs keep the order their first folio was seen in.
 * Rendered for the console through `Display`.
 */
#[derive(Debug)]
pub struct Report {
    kind: ReportKind,
    folios: Vec<Vec<SchemeLine>>,
    amc_totals: Vec<(String, f64)>,
}

impl Report {
    pub fn holdings(ledger: &Ledger) -> Self {
        Report::build(ledger, ReportKind::Holdings, Scheme::cost_basis)
    }

    /// Only schemes with something invested in `range` are listed.
    pub fn invested(ledger: &Ledger, range: DateRange) -> Self {
        Report::build(ledger, ReportKind::Invested(range), |scheme| {
            scheme.invested_in(&range)
        })
    }

    fn build<F>(ledger: &Ledger, kind: ReportKind, scheme_total: F) -> Self
    where
        F: Fn(&Scheme) -> f64,
    {
        let list_all = kind == ReportKind::Holdings;
        let mut folios = Vec::new();
        let mut amc_totals: Vec<(String, f64)> = Vec::new();

        for folio in ledger.folios() {
            let lines: Vec<SchemeLine> = folio
                .schemes()
                .iter()
                .map(|scheme| SchemeLine {
                    name: scheme.name().to_string(),
                    total: scheme_total(scheme),
                })
                .filter(|line| list_all || line.total != 0.0)
                .collect();
            if !list_all && lines.is_empty() {
                continue;
            }

            let folio_total: f64 = lines.iter().map(|line| line.total).sum();
            match amc_totals.iter_mut().find(|(name, _)| name == folio.amc_name()) {
                Some((_, total)) => *total += folio_total,
                None => amc_totals.push((folio.amc_name().to_string(), folio_total)),
            }
            folios.push(lines);
        }

        Report {
            kind,
            folios,
            amc_totals,
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn lines(&self) -> impl Iterator<Item = &SchemeLine> {
        self.folios.iter().flatten()
    }

    pub fn amc_total(&self, amc_name: &str) -> Option<f64> {
        self.amc_totals
            .iter()
            .find(|(name, _)| name == amc_name)
            .map(|(_, total)| *total)
    }

    pub fn total(&self) -> f64 {
        self.amc_totals.iter().map(|(_, total)| total).sum()
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let separator = "-".repeat(SEPARATOR_WIDTH);
        for lines in &self.folios {
            for line in lines {
                writeln!(f, "{}\t{}", line.name, format_rupees(line.total))?;
            }
            writeln!(f, "{}", separator)?;
        }

        for (amc_name, total) in &self.amc_totals {
            writeln!(f, "{} {}", amc_name, format_rupees(*total))?;
        }
        writeln!(f, "{}", separator)?;

        let total = format_rupees(self.total());
        match self.kind {
            ReportKind::Holdings => writeln!(f, "Total cost of investment {}", total)?,
            ReportKind::Invested(range) => writeln!(f, "Total invested from {} {}", range, total)?,
        }
        writeln!(f, "{}", separator)
    }
}

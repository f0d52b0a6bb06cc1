//! Normalization and periodization.
//!
//! Raw per-date (bank, rate) pairs from a source become canonical records,
//! a generated date sequence drives one fetch per date, and the resulting
//! period is reconciled into a single combined series with per-bank presence
//! bookkeeping. Everything is synchronous and sequential; a failed date
//! aborts the collection with the partial results discarded.

use chrono::{Days, Months, NaiveDate};
use std::collections::BTreeMap;
use thiserror::Error;

use currency_codes::{CodeError, CodeTable};
use models::{DATE_FORMAT, ExchangeRateRecord, Granularity, Period, Snapshot};
use rate_sources::{RateSource, RawRate, SourceError};
use translation::{Translate, TranslationCache, TranslationError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("a time series needs at least 2 snapshots, got {0}")]
    InsufficientData(usize),
    #[error(transparent)]
    Code(#[from] CodeError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Translation(#[from] TranslationError),
}

/// Turns raw (bank, rate) pairs into canonical records for one date.
///
/// Output order and count match the input; duplicate bank names are
/// preserved, not merged. `localized` marks bank names as source-language,
/// to be resolved through the translation cache.
pub fn normalize(
    raw: &[RawRate],
    cc: &str,
    date: NaiveDate,
    codes: &CodeTable,
    cache: &mut TranslationCache,
    translator: &dyn Translate,
    localized: bool,
) -> Result<Snapshot, PipelineError> {
    let cc = cc.to_uppercase();
    let r030 = codes.numeric(&cc)?;
    let formatted_date = date.format(DATE_FORMAT).to_string();

    let mut records = Vec::with_capacity(raw.len());
    for pair in raw {
        let bank = if localized {
            cache.lookup_or_translate(&pair.bank, translator)?
        } else {
            pair.bank.clone()
        };
        records.push(ExchangeRateRecord {
            bank,
            r030,
            cc: cc.clone(),
            rate: pair.rate,
            date: formatted_date.clone(),
        });
    }
    Ok(records)
}

/// Chronological inclusive date sequence from `start` to `end`, stepped by
/// one calendar unit.
///
/// Each date is `start` plus a whole number of steps, so the day-of-month is
/// preserved wherever it is valid (Jan 31 by month gives Feb 28, then
/// Mar 31). `start > end` yields an empty sequence; `start == end` a single
/// date.
pub fn date_sequence(start: NaiveDate, end: NaiveDate, by: Granularity) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut step: u32 = 0;
    loop {
        let next = match by {
            Granularity::Day => start.checked_add_days(Days::new(step as u64)),
            Granularity::Month => start.checked_add_months(Months::new(step)),
            Granularity::Year => step
                .checked_mul(12)
                .and_then(|months| start.checked_add_months(Months::new(months))),
        };
        let Some(date) = next else { break };
        if date > end {
            break;
        }
        dates.push(date);
        step += 1;
    }
    dates
}

/// Drives a source and the normalizer, sharing the code table and the
/// translation cache across dates.
pub struct Collector<'a> {
    pub codes: &'a CodeTable,
    pub cache: &'a mut TranslationCache,
    pub translator: &'a dyn Translate,
}

impl Collector<'_> {
    /// One fetch from the source, normalized.
    pub fn snapshot(
        &mut self,
        source: &dyn RateSource,
        cc: &str,
        date: NaiveDate,
    ) -> Result<Snapshot, PipelineError> {
        let raw = source.fetch(cc, date)?;
        normalize(
            &raw,
            cc,
            date,
            self.codes,
            self.cache,
            self.translator,
            source.localized_names(),
        )
    }

    /// Collects one snapshot per generated date, strictly in order.
    ///
    /// Day granularity costs one remote call per day; wide day ranges are
    /// expensive. A failed date aborts the whole collection and the partial
    /// results are discarded.
    pub fn collect(
        &mut self,
        source: &dyn RateSource,
        cc: &str,
        start: NaiveDate,
        end: NaiveDate,
        by: Granularity,
    ) -> Result<Period, PipelineError> {
        let dates = date_sequence(start, end, by);
        if by == Granularity::Day && dates.len() > 31 {
            log::warn!(
                "collecting {} days of {cc} rates, one request per day",
                dates.len()
            );
        }
        let mut period = Vec::with_capacity(dates.len());
        for date in dates {
            log::info!("collecting {cc} on {date} from {}", source.name());
            period.push(self.snapshot(source, cc, date)?);
        }
        Ok(period)
    }
}

/// Flattens a period into one chronological record sequence.
pub fn flatten(period: &[Snapshot]) -> Vec<ExchangeRateRecord> {
    period.iter().flatten().cloned().collect()
}

/// A period flattened for charting, with per-bank presence bookkeeping.
///
/// `records` is the full combined sequence; banks missing from some dates are
/// still in it, so consumers grouping by bank must not assume one record per
/// bank per date. `complete_only` is the strict subset.
#[derive(Debug)]
pub struct AlignedSeries {
    records: Vec<ExchangeRateRecord>,
    snapshot_count: usize,
    occurrences: BTreeMap<String, usize>,
}

impl AlignedSeries {
    pub fn records(&self) -> &[ExchangeRateRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ExchangeRateRecord> {
        self.records
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshot_count
    }

    /// How many records the bank has across the whole period.
    pub fn occurrences(&self, bank: &str) -> usize {
        self.occurrences.get(bank).copied().unwrap_or(0)
    }

    /// Banks that appear exactly once per date, in every date.
    pub fn fully_present(&self) -> Vec<&str> {
        self.occurrences
            .iter()
            .filter(|&(_, &n)| n == self.snapshot_count)
            .map(|(bank, _)| bank.as_str())
            .collect()
    }

    /// Records of fully-present banks only, original order preserved.
    pub fn complete_only(&self) -> Vec<ExchangeRateRecord> {
        self.records
            .iter()
            .filter(|r| self.occurrences.get(&r.bank) == Some(&self.snapshot_count))
            .cloned()
            .collect()
    }
}

/// Reconciles a period into one combined sequence and computes which banks
/// are present on every date. Needs at least 2 snapshots.
pub fn align(period: &[Snapshot]) -> Result<AlignedSeries, PipelineError> {
    if period.len() < 2 {
        return Err(PipelineError::InsufficientData(period.len()));
    }
    let records = flatten(period);
    let mut occurrences: BTreeMap<String, usize> = BTreeMap::new();
    for record in &records {
        *occurrences.entry(record.bank.clone()).or_insert(0) += 1;
    }
    Ok(AlignedSeries {
        records,
        snapshot_count: period.len(),
        occurrences,
    })
}

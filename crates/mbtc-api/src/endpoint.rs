//! Endpoint construction per API resource.
//!
//! URL layout: `{base}/{coin}/{resource}[/...]`. Every resource shares the
//! prefix; only the suffix strategy differs, and that is the single hook
//! each variant implements.

use crate::error::ApiResult;
use chrono::{Datelike, NaiveDate};
use mbtc_core::{unix_epoch, ApiKind, Coin, TradeRange};
use std::fmt;

/// Fully-qualified request URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// API resource variant.
///
/// Implementations are pure: the same inputs always give the same endpoint.
pub trait ApiResource {
    /// Which API this resource belongs to.
    const KIND: ApiKind;

    /// Build the request URL for `coin` under `base`.
    fn build_endpoint(&self, base: &str, coin: &Coin) -> ApiResult<Endpoint>;
}

fn resource_root(base: &str, coin: &Coin, kind: ApiKind) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), coin, kind)
}

/// Day summary for a single calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySummaryApi {
    pub date: NaiveDate,
}

impl DaySummaryApi {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl ApiResource for DaySummaryApi {
    const KIND: ApiKind = ApiKind::DaySummary;

    /// `{base}/{coin}/day-summary/{year}/{month}/{day}`, numbers unpadded.
    fn build_endpoint(&self, base: &str, coin: &Coin) -> ApiResult<Endpoint> {
        Ok(Endpoint(format!(
            "{}/{}/{}/{}",
            resource_root(base, coin, Self::KIND),
            self.date.year(),
            self.date.month(),
            self.date.day()
        )))
    }
}

/// Trades, optionally bounded in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TradesApi {
    pub range: TradeRange,
}

impl TradesApi {
    pub fn new(range: TradeRange) -> Self {
        Self { range }
    }
}

impl ApiResource for TradesApi {
    const KIND: ApiKind = ApiKind::Trades;

    /// `{base}/{coin}/trades[/{from}[/{to}]]` with Unix-second bounds.
    ///
    /// A `to` bound without a `from` bound is dropped: the URL then carries
    /// no range at all, same as an unbounded query.
    fn build_endpoint(&self, base: &str, coin: &Coin) -> ApiResult<Endpoint> {
        self.range.validate()?;

        let mut url = resource_root(base, coin, Self::KIND);
        if let Some(from) = self.range.from() {
            url.push_str(&format!("/{}", unix_epoch(from)));
            if let Some(to) = self.range.to() {
                url.push_str(&format!("/{}", unix_epoch(to)));
            }
        }
        Ok(Endpoint(url))
    }
}

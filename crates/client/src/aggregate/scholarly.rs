//! Scholarly search across OpenAlex and Crossref.

use std::fmt;
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::{AggregatedResponse, check_range, fan_out, present};
use crate::format::{format_crossref, format_openalex};
use crate::providers::ProviderError;
use crate::providers::crossref::{self, CrossrefClient};
use crate::providers::openalex::{self, OpenAlexClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScholarlySource {
    OpenAlex,
    Crossref,
}

impl ScholarlySource {
    pub fn name(self) -> &'static str {
        match self {
            ScholarlySource::OpenAlex => "OpenAlex",
            ScholarlySource::Crossref => "Crossref",
        }
    }
}

impl fmt::Display for ScholarlySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScholarlyCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    /// Inclusive `YYYY-YYYY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_open_access: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

static YEAR_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{4})$").expect("year range pattern compiles"));

/// Inclusive publication-year window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    pub fn parse(value: &str) -> Result<Self, ProviderError> {
        let invalid = || ProviderError::InvalidInput(format!("year_range must look like YYYY-YYYY, got {value}"));
        let captures = YEAR_RANGE_RE.captures(value.trim()).ok_or_else(invalid)?;
        let from: i32 = captures[1].parse().map_err(|_| invalid())?;
        let to: i32 = captures[2].parse().map_err(|_| invalid())?;
        if from > to {
            return Err(ProviderError::InvalidInput(format!("year_range starts after it ends: {value}")));
        }
        Ok(Self { from, to })
    }
}

impl ScholarlyCriteria {
    pub fn has_search_field(&self) -> bool {
        [&self.query, &self.title, &self.author, &self.doi, &self.year_range]
            .into_iter()
            .any(|field| present(field).is_some())
            || self.publication_year.is_some()
            || self.recent_years.is_some()
    }

    /// Explicit `year_range`, or the last `recent_years` years ending at
    /// `current_year` when no explicit year or range was given.
    pub fn effective_year_range(&self, current_year: i32) -> Result<Option<YearRange>, ProviderError> {
        if let Some(range) = present(&self.year_range) {
            return YearRange::parse(range).map(Some);
        }
        match (self.publication_year, self.recent_years) {
            (None, Some(years)) => {
                let span = i32::try_from(years).unwrap_or(i32::MAX).saturating_sub(1);
                Ok(Some(YearRange { from: current_year.saturating_sub(span), to: current_year }))
            }
            _ => Ok(None),
        }
    }

    fn openalex_request(&self, range: Option<YearRange>, per_page: u32) -> openalex::WorksRequest {
        let mut filters = Vec::new();
        match (self.publication_year, range) {
            (Some(year), _) => filters.push(format!("publication_year:{year}")),
            (None, Some(YearRange { from, to })) => filters.push(format!("publication_year:{from}-{to}")),
            (None, None) => {}
        }
        if let Some(is_oa) = self.is_open_access {
            filters.push(format!("is_oa:{is_oa}"));
        }
        if let Some(language) = present(&self.language) {
            filters.push(format!("language:{language}"));
        }
        if let Some(doi) = present(&self.doi) {
            filters.push(format!("doi:{doi}"));
        }

        openalex::WorksRequest {
            search: present(&self.query)
                .or(present(&self.title))
                .or(present(&self.author))
                .map(str::to_string),
            filter: (!filters.is_empty()).then(|| filters.join(",")),
            per_page: Some(per_page),
            page: None,
        }
    }

    fn crossref_request(&self, range: Option<YearRange>, rows: u32) -> crossref::WorksRequest {
        let mut filters = Vec::new();
        let years = match (self.publication_year, range) {
            (Some(year), _) => Some((year, year)),
            (None, Some(YearRange { from, to })) => Some((from, to)),
            (None, None) => None,
        };
        if let Some((from, to)) = years {
            filters.push(format!("from-pub-date:{from}-01-01"));
            filters.push(format!("until-pub-date:{to}-12-31"));
        }
        if let Some(doi) = present(&self.doi) {
            filters.push(format!("doi:{doi}"));
        }

        crossref::WorksRequest {
            query: present(&self.query).map(str::to_string),
            query_bibliographic: present(&self.title).map(str::to_string),
            query_author: present(&self.author).map(str::to_string),
            filter: (!filters.is_empty()).then(|| filters.join(",")),
            rows: Some(rows),
            offset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScholarlySearchOptions {
    pub max_results_per_source: u32,
    pub include_open_alex: bool,
    pub include_crossref: bool,
    pub summary_mode: bool,
}

impl Default for ScholarlySearchOptions {
    fn default() -> Self {
        Self { max_results_per_source: 10, include_open_alex: true, include_crossref: true, summary_mode: true }
    }
}

impl ScholarlySearchOptions {
    fn sources(&self) -> Vec<ScholarlySource> {
        let mut sources = Vec::with_capacity(2);
        if self.include_open_alex {
            sources.push(ScholarlySource::OpenAlex);
        }
        if self.include_crossref {
            sources.push(ScholarlySource::Crossref);
        }
        sources
    }
}

#[derive(Debug, Clone)]
pub struct ScholarlySearch {
    openalex: OpenAlexClient,
    crossref: CrossrefClient,
}

impl ScholarlySearch {
    pub fn new(openalex: OpenAlexClient, crossref: CrossrefClient) -> Self {
        Self { openalex, crossref }
    }

    pub async fn search(
        &self, criteria: &ScholarlyCriteria, options: &ScholarlySearchOptions,
    ) -> Result<AggregatedResponse<ScholarlyCriteria>, ProviderError> {
        self.search_as_of(criteria, options, chrono::Utc::now().year()).await
    }

    /// [`Self::search`] with `recent_years` counted back from `current_year`.
    pub async fn search_as_of(
        &self, criteria: &ScholarlyCriteria, options: &ScholarlySearchOptions, current_year: i32,
    ) -> Result<AggregatedResponse<ScholarlyCriteria>, ProviderError> {
        if !criteria.has_search_field() {
            return Err(ProviderError::InvalidInput(
                "at least one of query, title, author, doi, publication_year, year_range or recent_years is required"
                    .into(),
            ));
        }
        check_range("max_results_per_source", options.max_results_per_source, 1..=20)?;
        if let Some(years) = criteria.recent_years {
            check_range("recent_years", years, 1..=20)?;
        }
        let range = criteria.effective_year_range(current_year)?;

        let results = fan_out(options.sources(), |source| self.query(source, criteria, range, options)).await;

        Ok(AggregatedResponse::new(criteria.clone(), results, None))
    }

    async fn query(
        &self, source: ScholarlySource, criteria: &ScholarlyCriteria, range: Option<YearRange>,
        options: &ScholarlySearchOptions,
    ) -> Result<Value, ProviderError> {
        let limit = options.max_results_per_source;
        match source {
            ScholarlySource::OpenAlex => {
                let response = self.openalex.search_works(&criteria.openalex_request(range, limit)).await?;
                Ok(format_openalex(response, options.summary_mode))
            }
            ScholarlySource::Crossref => {
                let response = self.crossref.search_works(&criteria.crossref_request(range, limit)).await?;
                Ok(format_crossref(response, options.summary_mode))
            }
        }
    }
}

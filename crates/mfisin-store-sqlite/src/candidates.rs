//! Candidate filter: renders a [`FilterPlan`] into SQL against `scheme`.
//!
//! Stages, each returning as soon as it yields rows:
//!
//! 1. the Franklin reroute for `FTI<digits>` codes;
//! 2. the plan itself (registrar, code, name clauses);
//! 3. the plan once more with the last character of the code dropped.
//!
//! A plan without a code yields no candidates.
//!
//! Every stage collapses rows sharing an ISIN to the newest one and orders
//! the result newest first.

use mfisin_core::{
  CodeMatch, FilterPlan, NameClause, Rta, SchemeCandidate, filter::FranklinReroute,
};
use rusqlite::{Row, ToSql};

use crate::{
  Result,
  db::{Db, required_text, text_column},
};

const SELECT_CANDIDATES: &str =
  "SELECT name, isin, amfi_code, type, MAX(id) AS latest_id FROM scheme";

const NEWEST_PER_ISIN: &str = "GROUP BY isin ORDER BY latest_id DESC";

/// Run the filter stages for `plan`.
pub(crate) fn scheme_candidates(db: &Db, plan: &FilterPlan) -> Result<Vec<SchemeCandidate>> {
  if !plan.has_code() {
    tracing::debug!(rta = %plan.rta, "empty registrar code, no candidates");
    return Ok(Vec::new());
  }

  if let Some(reroute) = plan.franklin_reroute() {
    let rows = SqlFilter::franklin(&reroute).run(db)?;
    if !rows.is_empty() {
      tracing::debug!(code = %reroute.rta_code, count = rows.len(), "matched via franklin reroute");
      return Ok(rows);
    }
  }

  let rows = SqlFilter::from_plan(plan).run(db)?;
  if !rows.is_empty() {
    tracing::debug!(rta = %plan.rta, code = %plan.rta_code, count = rows.len(), "candidates found");
    return Ok(rows);
  }

  match plan.with_trailing_char_dropped() {
    Some(retry) => {
      tracing::debug!(
        rta = %plan.rta,
        code = %plan.rta_code,
        retry_code = %retry.rta_code,
        "no candidates, retrying without trailing character"
      );
      SqlFilter::from_plan(&retry).run(db)
    }
    None => Ok(rows),
  }
}

/// Rows carrying `isin` directly, collapsed to the newest.
pub(crate) fn isin_candidates(db: &Db, isin: &str) -> Result<Vec<SchemeCandidate>> {
  let mut filter = SqlFilter::default();
  filter.push("isin = :isin", ":isin", isin.to_owned());
  filter.run(db)
}

// ─── SQL assembly ────────────────────────────────────────────────────────────

#[derive(Default)]
struct SqlFilter {
  clauses: Vec<String>,
  params:  Vec<(String, String)>,
}

impl SqlFilter {
  fn push(&mut self, clause: impl Into<String>, param: impl Into<String>, value: String) {
    self.clauses.push(clause.into());
    self.params.push((param.into(), value));
  }

  fn franklin(reroute: &FranklinReroute) -> Self {
    let mut filter = Self::default();
    filter.push("rta = :rta", ":rta", Rta::Franklin.as_str().to_owned());
    filter.push(
      "(rta_code = :rta_code OR amc_code = :amc_code)",
      ":rta_code",
      reroute.rta_code.clone(),
    );
    filter.params.push((":amc_code".into(), reroute.amc_code.clone()));
    filter
  }

  fn from_plan(plan: &FilterPlan) -> Self {
    let mut filter = Self::default();
    filter.push("rta = :rta", ":rta", plan.rta.as_str().to_owned());

    match plan.code_match {
      CodeMatch::Exact => filter.push("rta_code = :rta_code", ":rta_code", plan.rta_code.clone()),
      CodeMatch::Prefix => filter.push(
        "rta_code LIKE :rta_code ESCAPE '\\'",
        ":rta_code",
        format!("{}%", escape_like(&plan.rta_code)),
      ),
    }

    for (i, clause) in plan.name_clauses.iter().enumerate() {
      let param = format!(":name_{i}");
      match clause {
        NameClause::Contains(s) => {
          filter.push(format!("name LIKE {param}"), param, format!("%{s}%"))
        }
        NameClause::Excludes(s) => {
          filter.push(format!("name NOT LIKE {param}"), param, format!("%{s}%"))
        }
      }
    }
    filter
  }

  fn run(&self, db: &Db) -> Result<Vec<SchemeCandidate>> {
    let sql = format!(
      "{SELECT_CANDIDATES} WHERE {} {NEWEST_PER_ISIN}",
      self.clauses.join(" AND ")
    );
    let params: Vec<(&str, &dyn ToSql)> = self
      .params
      .iter()
      .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
      .collect();
    tracing::trace!(%sql, "running candidate query");
    db.query(&sql, params.as_slice(), candidate_from_row)
  }
}

fn candidate_from_row(row: &Row<'_>) -> rusqlite::Result<SchemeCandidate> {
  Ok(SchemeCandidate {
    name:        required_text(row, "name")?,
    isin:        required_text(row, "isin")?,
    amfi_code:   text_column(row, "amfi_code")?.filter(|c| !c.is_empty()),
    scheme_type: required_text(row, "type")?,
  })
}

fn escape_like(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

//! Candidate filter rules.
//!
//! A [`FilterPlan`] describes, in database-neutral terms, how the `scheme`
//! table is narrowed for one query: which registrar, which code and how it is
//! compared, and which substring clauses apply to the scheme name. The store
//! renders the plan into SQL; the rules that shape it live here as a flat
//! table evaluated top to bottom.

use std::sync::LazyLock;

use regex::Regex;

use crate::{query::SchemeQuery, rta::Rta};

static FTI_CODE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)fti(\d+)").expect("valid fti regex"));

static REINVEST: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)re-*invest").expect("valid reinvest regex"));

static DISTRIBUTION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)dividend|idcw|\bdiv\b|payout").expect("valid distribution regex")
});

// ─── Plan ────────────────────────────────────────────────────────────────────

/// How `rta_code` is compared against the `scheme.rta_code` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeMatch {
  Exact,
  /// The stored code starts with the query code. HDFC codes carry a variable
  /// plan suffix that back-office exports drop.
  Prefix,
}

/// A case-insensitive substring condition on `scheme.name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameClause {
  Contains(&'static str),
  Excludes(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPlan {
  pub rta:          Rta,
  /// Registrar code with all whitespace removed.
  pub rta_code:     String,
  pub code_match:   CodeMatch,
  pub name_clauses: Vec<NameClause>,
}

/// Franklin-administered schemes are sometimes reported by CAMS under an
/// `FTI<amc code>` code. Such codes are tried against the Franklin rows first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FranklinReroute {
  pub rta_code: String,
  pub amc_code: String,
}

impl FilterPlan {
  /// Build the plan for `query` by running every applicable rule.
  pub fn for_query(query: &SchemeQuery) -> Self {
    let mut plan = Self {
      rta:          query.rta(),
      rta_code:     strip_whitespace(query.rta_code()),
      code_match:   CodeMatch::Exact,
      name_clauses: Vec::new(),
    };

    let name = query.scheme_name();
    for rule in RULES.iter().filter(|rule| (rule.when)(name)) {
      tracing::trace!(rule = rule.name, "applying filter rule");
      (rule.apply)(name, &mut plan);
    }
    plan
  }

  /// The Franklin reroute for this plan's code, if the code and registrar
  /// qualify.
  pub fn franklin_reroute(&self) -> Option<FranklinReroute> {
    if !matches!(self.rta, Rta::Cams | Rta::Franklin) {
      return None;
    }
    let captures = FTI_CODE.captures(&self.rta_code)?;
    Some(FranklinReroute {
      rta_code: self.rta_code.clone(),
      amc_code: captures[1].to_owned(),
    })
  }

  /// Whether the plan has a code to match at all. An empty code would turn
  /// a prefix match into "every row of the registrar".
  pub fn has_code(&self) -> bool { !self.rta_code.is_empty() }

  /// The same plan with the last character of the code dropped, used for the
  /// single fallback query. `None` when nothing would be left of the code.
  pub fn with_trailing_char_dropped(&self) -> Option<Self> {
    let mut code = self.rta_code.clone();
    code.pop()?;
    if code.is_empty() {
      return None;
    }
    Some(Self { rta_code: code, ..self.clone() })
  }
}

fn strip_whitespace(code: &str) -> String {
  code.chars().filter(|c| !c.is_whitespace()).collect()
}

// ─── Rules ───────────────────────────────────────────────────────────────────

struct Rule {
  name:  &'static str,
  when:  fn(&str) -> bool,
  apply: fn(&str, &mut FilterPlan),
}

const RULES: &[Rule] = &[
  Rule { name: "hdfc-plan", when: is_hdfc, apply: direct_plan_clause },
  Rule { name: "hdfc-distribution", when: is_hdfc_distribution, apply: reinvest_clause },
  Rule { name: "hdfc-code-prefix", when: is_hdfc, apply: prefix_code },
];

fn contains_ci(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(needle)
}

fn is_hdfc(name: &str) -> bool { contains_ci(name, "hdfc") }

fn is_hdfc_distribution(name: &str) -> bool { is_hdfc(name) && DISTRIBUTION.is_match(name) }

fn direct_plan_clause(name: &str, plan: &mut FilterPlan) {
  plan.name_clauses.push(if contains_ci(name, "direct") {
    NameClause::Contains("direct")
  } else {
    NameClause::Excludes("direct")
  });
}

fn reinvest_clause(name: &str, plan: &mut FilterPlan) {
  plan.name_clauses.push(if REINVEST.is_match(name) {
    NameClause::Contains("reinvest")
  } else {
    NameClause::Excludes("reinvest")
  });
}

fn prefix_code(_: &str, plan: &mut FilterPlan) { plan.code_match = CodeMatch::Prefix; }

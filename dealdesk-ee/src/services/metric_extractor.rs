//! Metric extraction from research prose
//!
//! Best-effort pattern matching over free-form research text. Everything in
//! this module is fallible-by-design: a miss produces a placeholder value,
//! never an error, and callers can't tell "no data" apart from an explicit
//! zero — the narrow `text -> metrics` boundary exists so the whole module
//! can be swapped for a structured-output provider contract later.

use crate::models::enrichment::{
    CompetitiveData, ExtractedMetric, FinancialMetrics, MarketMetrics, TeamAssessment,
    ANALYSIS_PENDING, NOT_AVAILABLE,
};
use once_cell::sync::Lazy;
use regex::Regex;

// Dollar amounts like "$12 billion", "$3.4B", "$950 million TAM"
static TAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\$\s*(\d+(?:\.\d+)?)\s*(trillion|billion|million|[tbm])\b[^.\n]{0,40}?\b(?:TAM|total addressable market|addressable market|market size)",
    )
    .expect("TAM pattern")
});

static SAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\$\s*(\d+(?:\.\d+)?)\s*(trillion|billion|million|[tbm])\b[^.\n]{0,40}?\b(?:SAM|serviceable addressable market|serviceable market)",
    )
    .expect("SAM pattern")
});

// Growth like "24% CAGR", "growing at 12.5% annually", "CAGR of 9%"
static GROWTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:(\d+(?:\.\d+)?)\s*%\s*(?:CAGR|annual growth|year-over-year|yoy)|CAGR\s+of\s+(\d+(?:\.\d+)?)\s*%|growing\s+(?:at\s+)?(\d+(?:\.\d+)?)\s*%)",
    )
    .expect("growth pattern")
});

// Funding like "raised $45 million", "has raised $1.2B"
static RAISED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)raised\s+(?:a\s+total\s+of\s+)?\$\s*(\d+(?:\.\d+)?)\s*(trillion|billion|million|[tbm])")
        .expect("raised pattern")
});

// Revenue like "$10M ARR", "revenue of $8 million", "annual revenue of $3.5M"
static REVENUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\$\s*(\d+(?:\.\d+)?)\s*(trillion|billion|million|[tbm])\s*(?:in\s+)?(?:ARR|annual recurring revenue|revenue)|revenue\s+of\s+\$\s*(\d+(?:\.\d+)?)\s*(trillion|billion|million|[tbm]))",
    )
    .expect("revenue pattern")
});

// Burn like "burn rate of $500k per month", "burning $1.2M monthly"
static BURN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)burn(?:ing|\s+rate)?\s+(?:of\s+)?\$\s*(\d+(?:\.\d+)?)\s*(million|thousand|[mk])\b[^.\n]{0,20}?(?:per\s+month|monthly|/\s*month)",
    )
    .expect("burn pattern")
});

// Competitor listings like "competes with X, Y, and Z" / "competitors include X, Y"
static COMPETITORS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:competitors\s+include|competes\s+with|competing\s+against)\s+([^.\n]+)")
        .expect("competitors pattern")
});

// Team size like "team of 45", "120 employees", "headcount of 60"
static TEAM_SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:team\s+of\s+(\d+)|(\d+)\s+employees|headcount\s+of\s+(\d+))")
        .expect("team size pattern")
});

// Founder sentences: first sentence mentioning founders/CEO
static LEADERSHIP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[^.\n]*\b(?:founder|founders|founding team|CEO)\b[^.\n]*\.")
        .expect("leadership pattern")
});

// Positioning sentences: first sentence about market position/differentiation
static POSITIONING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[^.\n]*\b(?:positioned|differentiat\w+|market leader|leading provider)\b[^.\n]*\.")
        .expect("positioning pattern")
});

/// Extract market-sizing metrics from research prose
pub fn extract_market_metrics(text: &str) -> MarketMetrics {
    MarketMetrics {
        tam: extract_dollar_billions(&TAM_RE, text, "TAM"),
        sam: extract_dollar_billions(&SAM_RE, text, "SAM"),
        growth_rate: extract_growth(text),
    }
}

/// Extract funding/revenue/burn metrics from research prose
pub fn extract_financial_metrics(text: &str) -> FinancialMetrics {
    FinancialMetrics {
        total_raised: extract_raised(text),
        revenue: extract_revenue(text),
        burn_rate: extract_burn(text),
    }
}

/// Extract competitor names and positioning from research prose
pub fn extract_competitive_data(text: &str) -> CompetitiveData {
    let competitors = COMPETITORS_RE
        .captures(text)
        .map(|c| split_name_list(&c[1]))
        .unwrap_or_default();

    let positioning = match POSITIONING_RE.find(text) {
        Some(m) => ExtractedMetric::found(m.as_str().trim().to_string(), None, m.as_str().to_string()),
        None => ExtractedMetric::missing(ANALYSIS_PENDING),
    };

    CompetitiveData { competitors, positioning }
}

/// Extract leadership signals from research prose
pub fn extract_team_assessment(text: &str) -> TeamAssessment {
    let leadership = match LEADERSHIP_RE.find(text) {
        Some(m) => ExtractedMetric::found(m.as_str().trim().to_string(), None, m.as_str().to_string()),
        None => ExtractedMetric::missing(ANALYSIS_PENDING),
    };

    let team_size = match TEAM_SIZE_RE.captures(text) {
        Some(caps) => {
            let raw = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
            let n = first_group(&caps).and_then(|s| s.parse::<f64>().ok());
            ExtractedMetric::found(
                n.map(|v| format!("{:.0} people", v)).unwrap_or_else(|| raw.clone()),
                n,
                raw,
            )
        }
        None => ExtractedMetric::missing(NOT_AVAILABLE),
    };

    TeamAssessment { leadership, team_size }
}

/// Dollar amount normalized to USD billions
fn extract_dollar_billions(re: &Regex, text: &str, label: &str) -> ExtractedMetric {
    match re.captures(text) {
        Some(caps) => {
            let raw = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
            let amount: f64 = caps[1].parse().unwrap_or(0.0);
            let billions = amount * unit_to_billions(&caps[2]);
            ExtractedMetric::found(format!("${:.1}B {}", billions, label), Some(billions), raw)
        }
        None => ExtractedMetric::missing(NOT_AVAILABLE),
    }
}

fn extract_growth(text: &str) -> ExtractedMetric {
    match GROWTH_RE.captures(text) {
        Some(caps) => {
            let raw = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
            let pct = first_group(&caps).and_then(|s| s.parse::<f64>().ok());
            ExtractedMetric::found(
                pct.map(|v| format!("{:.1}% CAGR", v)).unwrap_or_else(|| raw.clone()),
                pct,
                raw,
            )
        }
        None => ExtractedMetric::missing(ANALYSIS_PENDING),
    }
}

/// Funding normalized to USD millions
fn extract_raised(text: &str) -> ExtractedMetric {
    match RAISED_RE.captures(text) {
        Some(caps) => {
            let raw = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
            let amount: f64 = caps[1].parse().unwrap_or(0.0);
            let millions = amount * unit_to_billions(&caps[2]) * 1000.0;
            ExtractedMetric::found(format!("${:.1}M raised", millions), Some(millions), raw)
        }
        None => ExtractedMetric::missing(NOT_AVAILABLE),
    }
}

/// Revenue normalized to USD millions
fn extract_revenue(text: &str) -> ExtractedMetric {
    match REVENUE_RE.captures(text) {
        Some(caps) => {
            let raw = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
            let (amount, unit) = if caps.get(1).is_some() {
                (caps[1].parse::<f64>().unwrap_or(0.0), caps[2].to_string())
            } else {
                (caps[3].parse::<f64>().unwrap_or(0.0), caps[4].to_string())
            };
            let millions = amount * unit_to_billions(&unit) * 1000.0;
            ExtractedMetric::found(format!("${:.1}M revenue", millions), Some(millions), raw)
        }
        None => ExtractedMetric::missing(NOT_AVAILABLE),
    }
}

/// Burn normalized to USD millions per month
fn extract_burn(text: &str) -> ExtractedMetric {
    match BURN_RE.captures(text) {
        Some(caps) => {
            let raw = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
            let amount: f64 = caps[1].parse().unwrap_or(0.0);
            let unit = caps[2].to_lowercase();
            let millions = if unit.starts_with('k') || unit.starts_with("thousand") {
                amount / 1000.0
            } else {
                amount
            };
            ExtractedMetric::found(format!("${:.2}M/month burn", millions), Some(millions), raw)
        }
        None => ExtractedMetric::missing(NOT_AVAILABLE),
    }
}

fn unit_to_billions(unit: &str) -> f64 {
    match unit.to_lowercase().chars().next() {
        Some('t') => 1000.0,
        Some('b') => 1.0,
        Some('m') => 0.001,
        _ => 0.0,
    }
}

/// First populated capture group, for alternation patterns
fn first_group<'t>(caps: &'t regex::Captures<'t>) -> Option<&'t str> {
    (1..caps.len()).find_map(|i| caps.get(i)).map(|m| m.as_str())
}

/// Split "Stripe, Adyen, and Square" into individual names
fn split_name_list(listing: &str) -> Vec<String> {
    listing
        .split(',')
        .flat_map(|part| part.split(" and "))
        .map(|name| name.trim().trim_end_matches('.').trim().to_string())
        .filter(|name| !name.is_empty() && name.len() < 60)
        .take(8)
        .collect()
}

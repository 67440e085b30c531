//! Industry classifier
//!
//! Maps free-text industry/sector strings to canonical industries through a
//! fixed priority ladder of match tiers, each with its own confidence. The
//! mapping table is immutable reference data built once at startup and
//! shared by reference; matching is pure and never fails — absent data is a
//! `None` result, not an error.
//!
//! Tier ladder (first hit wins):
//! 1. exact canonical name          -> 100
//! 2. exact alias                   -> 95
//! 3. exact subcategory term        -> 90
//! 4. near-miss (typo) on name/alias -> 85
//! 5. substring vs subcategory term -> 75
//! 6. substring vs related term     -> 70
//! 7. substring vs canonical name   -> 65
//!
//! Comparisons are trimmed and case-insensitive; no stemming.

use serde::{Deserialize, Serialize};

/// Similarity floor for the typo tier
const FUZZY_THRESHOLD: f64 = 0.85;

/// Minimum length of the shorter side in substring comparisons; blocks
/// short fragments like "erp" or "ai" from matching inside unrelated words
/// (exact-match tiers still see them)
const MIN_SUBSTRING_LEN: usize = 4;

/// Default confidence floor for alignment rule (c)
pub const DEFAULT_MIN_ALIGNMENT_CONFIDENCE: f64 = 70.0;

/// One canonical industry with its lookup vocabulary
#[derive(Debug, Clone)]
pub struct IndustryMapping {
    pub canonical: String,
    pub aliases: Vec<String>,
    pub subcategories: Vec<String>,
    pub related_terms: Vec<String>,
}

/// A successful classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryMatch {
    /// Canonical industry name
    pub industry: String,
    /// Match confidence (0-100), fixed per tier
    pub confidence: f64,
    /// Human-readable justification
    pub reason: String,
}

/// Outcome of a deal/fund industry alignment check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub aligned: bool,
    pub confidence: f64,
    pub matched_industry: Option<String>,
    pub explanation: String,
}

impl AlignmentResult {
    fn unaligned(deal_industry: &str) -> Self {
        Self {
            aligned: false,
            confidence: 0.0,
            matched_industry: None,
            explanation: format!(
                "\"{}\" does not align with any of the fund's focus industries",
                deal_industry
            ),
        }
    }
}

/// Immutable catalog of canonical industries
pub struct IndustryCatalog {
    mappings: Vec<IndustryMapping>,
}

impl IndustryCatalog {
    /// Built-in canonical industry table
    pub fn builtin() -> Self {
        Self { mappings: build_mappings() }
    }

    /// Look up the mapping entry for a canonical industry name
    pub fn get(&self, canonical: &str) -> Option<&IndustryMapping> {
        let needle = normalize(canonical);
        self.mappings.iter().find(|m| normalize(&m.canonical) == needle)
    }

    /// Classify a free-text term. Empty or whitespace-only input is a
    /// non-match, not an error.
    pub fn find_best_match(&self, term: &str) -> Option<IndustryMatch> {
        let needle = normalize(term);
        if needle.is_empty() {
            return None;
        }

        // Tier 1: exact canonical name
        for m in &self.mappings {
            if normalize(&m.canonical) == needle {
                return Some(IndustryMatch {
                    industry: m.canonical.clone(),
                    confidence: 100.0,
                    reason: format!("\"{}\" is the canonical industry name", term.trim()),
                });
            }
        }

        // Tier 2: exact alias
        for m in &self.mappings {
            if m.aliases.iter().any(|a| normalize(a) == needle) {
                return Some(IndustryMatch {
                    industry: m.canonical.clone(),
                    confidence: 95.0,
                    reason: format!("\"{}\" is a known alias of {}", term.trim(), m.canonical),
                });
            }
        }

        // Tier 3: exact subcategory term
        for m in &self.mappings {
            if m.subcategories.iter().any(|s| normalize(s) == needle) {
                return Some(IndustryMatch {
                    industry: m.canonical.clone(),
                    confidence: 90.0,
                    reason: format!("\"{}\" is a subcategory of {}", term.trim(), m.canonical),
                });
            }
        }

        // Tier 4: near-miss on canonical name or alias (hand-entered typos)
        for m in &self.mappings {
            let candidates = std::iter::once(m.canonical.as_str())
                .chain(m.aliases.iter().map(|a| a.as_str()));
            for candidate in candidates {
                if strsim::normalized_levenshtein(&needle, &normalize(candidate)) > FUZZY_THRESHOLD {
                    return Some(IndustryMatch {
                        industry: m.canonical.clone(),
                        confidence: 85.0,
                        reason: format!(
                            "\"{}\" closely matches \"{}\" ({})",
                            term.trim(),
                            candidate,
                            m.canonical
                        ),
                    });
                }
            }
        }

        // Tier 5: substring vs subcategory term (either direction)
        for m in &self.mappings {
            if let Some(hit) = m.subcategories.iter().find(|s| contains_either(&needle, s)) {
                return Some(IndustryMatch {
                    industry: m.canonical.clone(),
                    confidence: 75.0,
                    reason: format!(
                        "\"{}\" overlaps subcategory \"{}\" of {}",
                        term.trim(),
                        hit,
                        m.canonical
                    ),
                });
            }
        }

        // Tier 6: substring vs related term
        for m in &self.mappings {
            if let Some(hit) = m.related_terms.iter().find(|r| contains_either(&needle, r)) {
                return Some(IndustryMatch {
                    industry: m.canonical.clone(),
                    confidence: 70.0,
                    reason: format!(
                        "\"{}\" overlaps related term \"{}\" of {}",
                        term.trim(),
                        hit,
                        m.canonical
                    ),
                });
            }
        }

        // Tier 7: substring vs the canonical name itself
        for m in &self.mappings {
            if contains_either(&needle, &m.canonical) {
                return Some(IndustryMatch {
                    industry: m.canonical.clone(),
                    confidence: 65.0,
                    reason: format!("\"{}\" overlaps the industry name {}", term.trim(), m.canonical),
                });
            }
        }

        None
    }

    /// Check whether a deal's industry aligns with any of a fund's focus
    /// industries. Fund industries are checked in caller-supplied order and
    /// the first one satisfying any rule wins; there is no global
    /// best-match search across the list.
    ///
    /// Rules per fund entry:
    /// (a) direct case-insensitive substring between the raw strings (85);
    /// (b) both terms resolve to the same canonical industry (confidence of
    ///     the deal term's match);
    /// (c) the deal term's match confidence clears `min_confidence` and its
    ///     canonical industry has a mapping entry.
    pub fn are_industries_aligned(
        &self,
        deal_industry: &str,
        fund_industries: &[String],
        min_confidence: f64,
    ) -> AlignmentResult {
        let deal_norm = normalize(deal_industry);
        if deal_norm.is_empty() {
            return AlignmentResult::unaligned(deal_industry);
        }

        let deal_match = self.find_best_match(deal_industry);

        for fund_industry in fund_industries {
            // Rule (a): raw substring either direction
            if contains_either(&deal_norm, fund_industry) {
                return AlignmentResult {
                    aligned: true,
                    confidence: 85.0,
                    matched_industry: self
                        .find_best_match(fund_industry)
                        .map(|m| m.industry),
                    explanation: format!(
                        "\"{}\" directly overlaps the fund focus \"{}\"",
                        deal_industry.trim(),
                        fund_industry
                    ),
                };
            }

            // Rule (b): shared canonical industry
            if let (Some(deal_m), Some(fund_m)) =
                (deal_match.as_ref(), self.find_best_match(fund_industry))
            {
                if deal_m.industry == fund_m.industry {
                    return AlignmentResult {
                        aligned: true,
                        confidence: deal_m.confidence,
                        matched_industry: Some(deal_m.industry.clone()),
                        explanation: format!(
                            "\"{}\" and fund focus \"{}\" both resolve to {}",
                            deal_industry.trim(),
                            fund_industry,
                            deal_m.industry
                        ),
                    };
                }
            }

            // Rule (c): strong standalone deal match with a known mapping
            if let Some(deal_m) = deal_match.as_ref() {
                if deal_m.confidence >= min_confidence && self.get(&deal_m.industry).is_some() {
                    return AlignmentResult {
                        aligned: true,
                        confidence: deal_m.confidence,
                        matched_industry: Some(deal_m.industry.clone()),
                        explanation: format!(
                            "\"{}\" resolves to {} at sufficient confidence for focus \"{}\"",
                            deal_industry.trim(),
                            deal_m.industry,
                            fund_industry
                        ),
                    };
                }
            }
        }

        AlignmentResult::unaligned(deal_industry)
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Substring in either direction, with a length floor on the shorter side
fn contains_either(a: &str, b: &str) -> bool {
    let b = normalize(b);
    let shorter = a.len().min(b.len());
    if shorter < MIN_SUBSTRING_LEN {
        return false;
    }
    a.contains(&b) || b.contains(a)
}

fn build_mappings() -> Vec<IndustryMapping> {
    fn entry(
        canonical: &str,
        aliases: &[&str],
        subcategories: &[&str],
        related_terms: &[&str],
    ) -> IndustryMapping {
        IndustryMapping {
            canonical: canonical.to_string(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            subcategories: subcategories.iter().map(|s| s.to_string()).collect(),
            related_terms: related_terms.iter().map(|s| s.to_string()).collect(),
        }
    }

    vec![
        entry(
            "Financial Services",
            &["finserv", "financial technology", "banking and financial services"],
            &["fintech", "payments", "insurtech", "wealth management", "lending", "banking"],
            &["neobank", "trading platform", "capital markets", "regtech"],
        ),
        entry(
            "Healthcare",
            &["health care", "healthtech", "health and wellness"],
            &["digital health", "medical devices", "biotech", "telemedicine", "pharma"],
            &["clinical", "patient care", "life sciences", "diagnostics"],
        ),
        entry(
            "Enterprise Software",
            &["b2b software", "saas", "business software"],
            &["crm", "erp", "hr tech", "collaboration software", "devops", "data analytics"],
            &["workflow automation", "productivity tools", "vertical saas"],
        ),
        entry(
            "Consumer Internet",
            &["consumer tech", "b2c"],
            &["social media", "marketplace", "gaming", "content platform", "streaming"],
            &["creator economy", "subscription app", "mobile app"],
        ),
        entry(
            "E-Commerce & Retail",
            &["ecommerce", "e-commerce", "online retail"],
            &["d2c brands", "retail tech", "grocery delivery", "fashion commerce"],
            &["omnichannel", "dropshipping", "point of sale"],
        ),
        entry(
            "Cybersecurity",
            &["security software", "infosec", "information security"],
            &["network security", "identity management", "endpoint security", "cloud security"],
            &["zero trust", "threat intelligence", "vulnerability management"],
        ),
        entry(
            "Artificial Intelligence",
            &["ai", "machine learning", "ml"],
            &["computer vision", "nlp", "generative ai", "mlops"],
            &["foundation models", "deep learning", "ai infrastructure"],
        ),
        entry(
            "Climate & Energy",
            &["cleantech", "climate tech", "energy"],
            &["solar", "energy storage", "carbon accounting", "ev charging"],
            &["renewables", "decarbonization", "grid software"],
        ),
        entry(
            "Logistics & Supply Chain",
            &["supply chain", "logistics tech"],
            &["freight", "last-mile delivery", "warehouse automation", "fleet management"],
            &["shipping", "fulfillment", "procurement"],
        ),
        entry(
            "Real Estate & Construction",
            &["proptech", "real estate"],
            &["construction tech", "property management", "mortgage tech"],
            &["smart building", "facilities management"],
        ),
        entry(
            "Education",
            &["edtech", "education technology"],
            &["online learning", "corporate training", "tutoring platforms"],
            &["upskilling", "credentialing", "curriculum"],
        ),
        entry(
            "Industrial & Manufacturing",
            &["industrials", "manufacturing"],
            &["robotics", "industrial iot", "3d printing", "predictive maintenance"],
            &["factory automation", "machine tools", "supply base"],
        ),
    ]
}

//! Built-in criteria template blueprints
//!
//! Default category/subcategory trees for the two fund types. Funds start
//! from one of these and edit weights, signals, and keywords in the UI; the
//! blueprints themselves are fixed reference data and always validate clean
//! against the default tolerance.

use super::{
    Category, CriteriaTemplate, FundType, ParameterType, Subcategory, TargetParameter,
};

/// Default criteria template for a fund type
pub fn default_template(fund_type: FundType) -> CriteriaTemplate {
    let categories = match fund_type {
        FundType::Vc => vc_categories(),
        FundType::Pe => pe_categories(),
    };
    CriteriaTemplate { fund_type, categories }
}

/// Default target-allocation parameters for a fund type
pub fn default_target_parameters(fund_type: FundType) -> Vec<TargetParameter> {
    let mut params = vec![
        parameter("Enterprise Software", ParameterType::Sector, 40.0),
        parameter("Financial Services", ParameterType::Sector, 35.0),
        parameter("Healthcare & Biotech", ParameterType::Sector, 25.0),
        parameter("North America", ParameterType::Geography, 60.0),
        parameter("Europe", ParameterType::Geography, 40.0),
    ];
    match fund_type {
        FundType::Vc => {
            params.push(parameter("Seed", ParameterType::Stage, 30.0));
            params.push(parameter("Series A", ParameterType::Stage, 45.0));
            params.push(parameter("Series B", ParameterType::Stage, 25.0));
        }
        FundType::Pe => {
            params.push(parameter("Growth Buyout", ParameterType::Stage, 55.0));
            params.push(parameter("Carve-out", ParameterType::Stage, 25.0));
            params.push(parameter("Recapitalization", ParameterType::Stage, 20.0));
        }
    }
    params
}

fn vc_categories() -> Vec<Category> {
    vec![
        category("Team & Leadership", 25.0, vec![
            subcategory(
                "Founder Experience", 30.0,
                "Founders with prior startup or deep domain experience in the target market",
                &["repeat founder with prior exit", "10+ years operating in the domain"],
                &["first-time team with no domain exposure", "solo founder in a complex market"],
                &["founder background", "previous startup exit", "founding team experience"],
            ),
            subcategory(
                "Team Completeness", 25.0,
                "Core functions (product, engineering, go-to-market) covered by committed full-time leaders",
                &["full-time technical co-founder", "early commercial hire in place"],
                &["key roles outsourced or vacant", "heavy advisor dependence for execution"],
                &["leadership team", "key hires", "cto cofounder"],
            ),
            subcategory(
                "Advisory Board", 15.0,
                "Advisors with relevant networks who actively open doors",
                &["advisors from target customer segment", "investor-operators on the cap table"],
                &["trophy advisors with no engagement"],
                &["advisory board", "notable investors"],
            ),
            subcategory(
                "Execution Track Record", 30.0,
                "Demonstrated ability to ship and hit stated milestones since founding",
                &["shipped roadmap on schedule", "milestones hit ahead of prior round plan"],
                &["slipped launches", "pivots without learning narrative"],
                &["product launch", "milestones", "execution history"],
            ),
        ]),
        category("Market Opportunity", 25.0, vec![
            subcategory(
                "Market Size (TAM)", 35.0,
                "Total addressable market large enough to support venture-scale outcomes",
                &["TAM above $10B with credible bottom-up sizing", "expanding addressable footprint"],
                &["niche market below $1B", "top-down-only sizing"],
                &["total addressable market", "TAM", "market size"],
            ),
            subcategory(
                "Market Growth Rate", 30.0,
                "Underlying market growing fast enough to pull the company forward",
                &["double-digit CAGR", "secular tailwinds (regulation, platform shift)"],
                &["flat or shrinking market", "growth dependent on one-off events"],
                &["market growth rate", "CAGR", "industry growth"],
            ),
            subcategory(
                "Market Timing", 20.0,
                "Why-now catalyst making the opportunity newly addressable",
                &["recent enabling technology or regulatory change", "budget line emerging at buyers"],
                &["educating the market from scratch", "previous attempts failed without new enabler"],
                &["market timing", "why now", "adoption drivers"],
            ),
            subcategory(
                "Regulatory Environment", 15.0,
                "Regulatory posture understood, with compliance path costed",
                &["clear licensing path", "regulation raising barriers for laggards"],
                &["pending rules that could bar the model", "unbudgeted compliance burden"],
                &["regulation", "compliance requirements", "licensing"],
            ),
        ]),
        category("Product & Technology", 20.0, vec![
            subcategory(
                "Product Differentiation", 35.0,
                "Clear, demonstrable advantage versus incumbent and startup alternatives",
                &["10x improvement on a metric buyers care about", "win-rate evidence vs named competitors"],
                &["feature-level parity", "differentiation only on price"],
                &["product differentiation", "competitive advantage", "unique value proposition"],
            ),
            subcategory(
                "Technology Moat", 30.0,
                "Defensible technical depth: data advantage, IP, or accumulated engineering",
                &["proprietary data flywheel", "granted or filed patents on core method"],
                &["thin wrapper over third-party models or APIs"],
                &["proprietary technology", "patents", "data moat"],
            ),
            subcategory(
                "Development Stage", 20.0,
                "Product maturity consistent with the round being raised",
                &["production deployments with reference customers", "usage retention past 6 months"],
                &["demo-stage at a priced growth round", "pilot purgatory"],
                &["product stage", "general availability", "pilot customers"],
            ),
            subcategory(
                "Scalability", 15.0,
                "Architecture and delivery model scale without linear cost growth",
                &["gross-margin profile improves with volume", "self-serve expansion motion"],
                &["services-heavy delivery", "per-customer customization"],
                &["scalability", "gross margin", "unit scaling"],
            ),
        ]),
        category("Financial Performance", 15.0, vec![
            subcategory(
                "Revenue Growth", 35.0,
                "Top-line trajectory consistent with stage benchmarks",
                &["3x+ year-over-year at early stage", "expansion revenue accelerating"],
                &["growth decelerating before scale", "one-time revenue dressed as recurring"],
                &["revenue growth", "ARR growth", "year over year"],
            ),
            subcategory(
                "Unit Economics", 30.0,
                "Contribution margin and payback support scaling with venture capital",
                &["LTV/CAC above 3", "payback under 18 months"],
                &["negative contribution margin at scale", "CAC rising with each cohort"],
                &["unit economics", "LTV CAC", "payback period"],
            ),
            subcategory(
                "Burn Rate & Runway", 20.0,
                "Runway to the next value-accretive milestone with margin for error",
                &["18+ months runway post-round", "burn multiple under 2"],
                &["under 12 months runway", "burn growing faster than revenue"],
                &["burn rate", "runway", "cash position"],
            ),
            subcategory(
                "Capital Efficiency", 15.0,
                "Progress achieved per dollar raised versus peers",
                &["reached revenue milestones on modest raise", "low dilution history"],
                &["heavy raise with little product progress"],
                &["capital raised", "capital efficiency", "funding history"],
            ),
        ]),
        category("Competitive Position", 15.0, vec![
            subcategory(
                "Competitive Landscape", 40.0,
                "Position within the mapped field of incumbents and emerging rivals",
                &["category leadership in a defined segment", "incumbents structurally unable to respond"],
                &["well-funded direct competitors ahead on distribution", "crowded undifferentiated field"],
                &["competitors", "competitive landscape", "market leaders"],
            ),
            subcategory(
                "Barriers to Entry", 35.0,
                "Structural protection once the position is established",
                &["network effects strengthening with scale", "high switching costs at customers"],
                &["low-friction category with commodity inputs"],
                &["barriers to entry", "switching costs", "network effects"],
            ),
            subcategory(
                "Customer Concentration", 25.0,
                "Revenue spread across a healthy customer base",
                &["no customer above 15% of revenue"],
                &["top customer above 30% of revenue", "channel dependence on a single partner"],
                &["customer concentration", "top customers", "revenue concentration"],
            ),
        ]),
    ]
}

fn pe_categories() -> Vec<Category> {
    vec![
        category("Financial Performance", 30.0, vec![
            subcategory(
                "EBITDA Quality", 30.0,
                "Reported EBITDA survives quality-of-earnings scrutiny",
                &["low add-back ratio", "stable margin across the cycle"],
                &["aggressive add-backs", "one-time items recurring annually"],
                &["EBITDA", "quality of earnings", "adjusted EBITDA"],
            ),
            subcategory(
                "Revenue Stability", 25.0,
                "Recurring or re-occurring revenue with demonstrated retention",
                &["multi-year contracts", "gross revenue retention above 90%"],
                &["project-based revenue", "cyclical demand swings"],
                &["recurring revenue", "contract length", "revenue retention"],
            ),
            subcategory(
                "Cash Flow Generation", 25.0,
                "Free cash flow conversion supports the leverage thesis",
                &["EBITDA-to-FCF conversion above 70%", "low maintenance capex"],
                &["working-capital-intensive growth", "capex-heavy model"],
                &["free cash flow", "cash conversion", "capex"],
            ),
            subcategory(
                "Debt Capacity", 20.0,
                "Balance sheet and cash flows support the intended structure",
                &["modest existing leverage", "asset base supporting security package"],
                &["existing debt covenants near breach"],
                &["leverage", "debt capacity", "balance sheet"],
            ),
        ]),
        category("Market Position", 20.0, vec![
            subcategory(
                "Market Share", 35.0,
                "Defensible share in the served market",
                &["top-three position in niche", "share gains over trailing three years"],
                &["sub-scale player in consolidating market"],
                &["market share", "market position", "industry ranking"],
            ),
            subcategory(
                "Industry Dynamics", 35.0,
                "Industry structure rewards the hold-period plan",
                &["fragmented field with roll-up potential", "rational pricing environment"],
                &["secular decline", "disruptive substitutes scaling"],
                &["industry consolidation", "industry outlook", "pricing environment"],
            ),
            subcategory(
                "Customer Relationships", 30.0,
                "Sticky, diversified customer base with references",
                &["decade-plus customer tenures", "net promoter evidence"],
                &["churn concentrated in recent cohorts", "tender-driven relationships"],
                &["customer retention", "customer relationships", "NPS"],
            ),
        ]),
        category("Operational Excellence", 20.0, vec![
            subcategory(
                "Margin Improvement Potential", 40.0,
                "Identified levers to expand margins during the hold",
                &["procurement and pricing levers unexploited", "benchmark gap vs best-in-class peers"],
                &["margins already at peer ceiling"],
                &["margin expansion", "cost reduction", "operational improvement"],
            ),
            subcategory(
                "Operational Efficiency", 35.0,
                "Current operations run at measurable, managed efficiency",
                &["KPI dashboards in active use", "capacity headroom without new capex"],
                &["key processes undocumented", "single-plant dependence"],
                &["operational efficiency", "utilization", "throughput"],
            ),
            subcategory(
                "Systems & Processes", 25.0,
                "Systems scale through the hold without replatforming",
                &["modern ERP in place", "clean monthly close under five days"],
                &["spreadsheet-run finance", "end-of-life core systems"],
                &["ERP system", "financial reporting systems", "process maturity"],
            ),
        ]),
        category("Management Quality", 15.0, vec![
            subcategory(
                "Leadership Depth", 40.0,
                "Bench strength below the CEO across core functions",
                &["experienced CFO and COO staying post-close"],
                &["founder-dependent decision making", "vacant finance leadership"],
                &["management team", "executive experience", "CFO"],
            ),
            subcategory(
                "Incentive Alignment", 30.0,
                "Management economics aligned with the equity plan",
                &["meaningful rollover equity", "management co-investment"],
                &["full cash-out at close", "retention dependent on earn-out disputes"],
                &["management rollover", "equity incentives", "alignment"],
            ),
            subcategory(
                "Succession Planning", 30.0,
                "Credible succession for retiring or exiting leaders",
                &["identified internal successors", "documented transition plan"],
                &["founder exit with no successor"],
                &["succession plan", "leadership transition"],
            ),
        ]),
        category("Deal Structure", 15.0, vec![
            subcategory(
                "Valuation Discipline", 40.0,
                "Entry multiple defensible against comparables and the base case",
                &["entry below recent comparable transactions", "multiple supported by downside case"],
                &["auction-driven premium", "multiple priced for perfection"],
                &["valuation multiple", "comparable transactions", "entry multiple"],
            ),
            subcategory(
                "Exit Optionality", 35.0,
                "Multiple plausible exit paths at underwritten returns",
                &["strategic and sponsor buyer universes both active", "IPO-scale potential in base case"],
                &["single plausible acquirer"],
                &["exit options", "strategic buyers", "sponsor activity"],
            ),
            subcategory(
                "Downside Protection", 25.0,
                "Structural protections limit capital impairment",
                &["asset backing near entry valuation", "seller note or earn-out sharing risk"],
                &["thin equity cushion at close"],
                &["downside protection", "deal structure", "seller financing"],
            ),
        ]),
    ]
}

fn category(name: &str, weight: f64, subcategories: Vec<Subcategory>) -> Category {
    Category { name: name.to_string(), weight, enabled: true, subcategories }
}

fn subcategory(
    name: &str,
    weight: f64,
    requirements: &str,
    positive: &[&str],
    negative: &[&str],
    keywords: &[&str],
) -> Subcategory {
    Subcategory {
        name: name.to_string(),
        weight,
        enabled: true,
        requirements: requirements.to_string(),
        positive_signals: positive.iter().map(|s| s.to_string()).collect(),
        negative_signals: negative.iter().map(|s| s.to_string()).collect(),
        ai_search_keywords: keywords.iter().map(|s| s.to_string()).collect(),
        custom: false,
    }
}

fn parameter(name: &str, param_type: ParameterType, weight: f64) -> TargetParameter {
    TargetParameter { name: name.to_string(), param_type, weight, enabled: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::WeightValidator;

    #[test]
    fn vc_template_has_five_categories_summing_to_100() {
        let template = default_template(FundType::Vc);
        assert_eq!(template.categories.len(), 5);
        let total: f64 = template.categories.iter().map(|c| c.weight).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn every_subcategory_carries_research_keywords() {
        for fund_type in [FundType::Vc, FundType::Pe] {
            for category in default_template(fund_type).categories {
                for sub in category.subcategories {
                    assert!(
                        !sub.ai_search_keywords.is_empty(),
                        "{} / {} has no keywords",
                        category.name,
                        sub.name
                    );
                    assert!(!sub.custom);
                }
            }
        }
    }

    #[test]
    fn default_target_parameters_validate_per_type() {
        let validator = WeightValidator::default();
        for fund_type in [FundType::Vc, FundType::Pe] {
            let report = validator.validate_target_parameters(&default_target_parameters(fund_type));
            assert!(report.is_valid, "{:?}: {:?}", fund_type, report.errors);
        }
    }
}

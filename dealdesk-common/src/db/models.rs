//! Row models shared across services

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A deal under evaluation. Industry/stage/geography are free text as
/// entered by the user; the classifier resolves them against the canonical
/// tables at analysis time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub id: Uuid,
    pub fund_id: Uuid,
    pub name: String,
    pub industry: String,
    pub stage: String,
    pub geography: String,
    pub description: Option<String>,
    pub website: Option<String>,
    /// Structured financial data as submitted (revenue, burn, raise history);
    /// opaque to the common layer
    pub financials: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Deal {
    /// True when any free-text company context was supplied
    pub fn has_company_context(&self) -> bool {
        self.description.as_deref().is_some_and(|s| !s.trim().is_empty())
            || self.website.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    /// True when structured financial data was supplied
    pub fn has_financial_data(&self) -> bool {
        self.financials.is_some()
    }
}

/// A fund with its focus industries (used for deal/fund alignment checks)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fund {
    pub id: Uuid,
    pub name: String,
    pub fund_type: crate::criteria::FundType,
    pub focus_industries: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal() -> Deal {
        Deal {
            id: Uuid::new_v4(),
            fund_id: Uuid::new_v4(),
            name: "Acme Analytics".to_string(),
            industry: "fintech".to_string(),
            stage: "Series A".to_string(),
            geography: "US".to_string(),
            description: None,
            website: None,
            financials: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn company_context_ignores_blank_strings() {
        let mut d = deal();
        assert!(!d.has_company_context());
        d.website = Some("  ".to_string());
        assert!(!d.has_company_context());
        d.description = Some("B2B payments platform".to_string());
        assert!(d.has_company_context());
    }

    #[test]
    fn financial_data_flag() {
        let mut d = deal();
        assert!(!d.has_financial_data());
        d.financials = Some(serde_json::json!({"arr_usd": 1_200_000}));
        assert!(d.has_financial_data());
    }
}

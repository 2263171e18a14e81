use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// How a canonical attribute is typed in the warehouse. The kind drives the
/// cast emitted into the generated staging model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Loan/customer identifiers, cast to string.
    Identifier,
    /// Date columns, rendered with the day-offset or fixed-pattern rule.
    Date,
    /// Amounts and ratios, cast to numeric.
    Numeric,
    /// Categorical columns, cast to string.
    Text,
    /// Default flag, cast to int64.
    Flag,
    /// Bureau score columns, cast to int64.
    Score,
}

/// One canonical attribute of the unified loan schema together with the raw
/// column names known to carry it, in precedence order.
#[derive(Debug, Clone, Deserialize)]
pub struct CanonicalAttribute {
    pub name: String,
    pub kind: AttributeKind,
    pub aliases: Vec<String>,
}

/// Ordered alias lookup for the canonical loan schema.
///
/// Alias lists are consulted in declared order and the first alias present
/// in a header wins. Declaration order of the attributes is also the
/// projection order of the generated staging model.
#[derive(Debug, Clone, Deserialize)]
pub struct AliasTable {
    pub attributes: Vec<CanonicalAttribute>,
}

fn attr(name: &str, kind: AttributeKind, aliases: &[&str]) -> CanonicalAttribute {
    CanonicalAttribute {
        name: name.to_string(),
        kind,
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

impl AliasTable {
    /// The built-in table covering the known loan datasets.
    pub fn builtin() -> Self {
        Self {
            attributes: vec![
                // Loan/Application ID
                attr(
                    "loan_id",
                    AttributeKind::Identifier,
                    &["uniqueid", "loan_id", "application_id", "contract_id"],
                ),
                attr(
                    "customer_id",
                    AttributeKind::Identifier,
                    &["uniqueid", "sk_id_curr", "customer_id", "client_id"],
                ),
                // Dates
                attr(
                    "application_date",
                    AttributeKind::Date,
                    &["disbursaldate", "days_decision", "application_date", "disbursal_date"],
                ),
                attr("date_of_birth", AttributeKind::Date, &["date_of_birth", "days_birth"]),
                // Amounts
                attr(
                    "loan_amount",
                    AttributeKind::Numeric,
                    &["disbursed_amount", "amt_credit", "loan_amount", "credit_amount"],
                ),
                attr(
                    "asset_cost",
                    AttributeKind::Numeric,
                    &["asset_cost", "amt_goods_price", "goods_price"],
                ),
                attr("ltv_ratio", AttributeKind::Numeric, &["ltv", "amt_credit_sum_debt"]),
                // Customer attributes
                attr(
                    "employment_type",
                    AttributeKind::Text,
                    &["employment_type", "name_income_type", "occupation_type"],
                ),
                attr("gender", AttributeKind::Text, &["code_gender", "gender"]),
                // Location
                attr("state_id", AttributeKind::Text, &["state_id", "region_rating_client"]),
                attr("branch_id", AttributeKind::Text, &["branch_id", "dealer_id"]),
                attr(
                    "pincode_id",
                    AttributeKind::Text,
                    &["current_pincode_id", "region_population_relative"],
                ),
                // Product
                attr(
                    "product_id",
                    AttributeKind::Text,
                    &["manufacturer_id", "product_id", "name_contract_type"],
                ),
                // Target
                attr("loan_default", AttributeKind::Flag, &["loan_default", "target", "default_flag"]),
                // Credit bureau
                attr(
                    "credit_score",
                    AttributeKind::Score,
                    &["perform_cns_score", "ext_source_1", "ext_source_2", "ext_source_3"],
                ),
            ],
        }
    }

    /// Load a deployment-specific table from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let table: AliasTable = serde_yaml::from_str(yaml)?;
        Ok(table)
    }

    /// Load a deployment-specific table from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn get(&self, name: &str) -> Option<&CanonicalAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

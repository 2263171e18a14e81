use std::fmt;

/// Which known dataset family a header resembles.
///
/// This is a detection hint only: column mapping re-derives everything from
/// column presence and never branches on the family tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    HomeCredit,
    VehicleLoan,
    Generic,
}

impl DatasetKind {
    /// Detect the family from signature columns, most specific first.
    pub fn detect(columns: &[String]) -> Self {
        let lower: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
        let has = |name: &str| lower.iter().any(|c| c == name);

        if has("sk_id_curr") {
            DatasetKind::HomeCredit
        } else if has("uniqueid") && has("disbursaldate") {
            DatasetKind::VehicleLoan
        } else {
            DatasetKind::Generic
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetKind::HomeCredit => "home_credit",
            DatasetKind::VehicleLoan => "vehicle_loan",
            DatasetKind::Generic => "generic",
        };
        write!(f, "{name}")
    }
}

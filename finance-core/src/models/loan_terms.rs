use serde::{Deserialize, Serialize};

/// How a loan's principal is repaid over its term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentMethod {
    /// Constant total payment (annuity).
    EqualPayment,
    /// Constant principal portion; the total payment declines.
    EqualPrincipal,
}

impl RepaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EqualPayment => "equal-payment",
            Self::EqualPrincipal => "equal-principal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "equal-payment" => Some(Self::EqualPayment),
            "equal-principal" => Some(Self::EqualPrincipal),
            _ => None,
        }
    }
}

/// Interest-rate structure, which decides the DSR stress add-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateType {
    Fixed,
    Variable,
    /// Fixed for an initial period, then variable.
    Mixed,
    /// Reset on a fixed schedule.
    Periodic,
}

impl RateType {
    pub const ALL: [RateType; 4] = [Self::Fixed, Self::Variable, Self::Mixed, Self::Periodic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Variable => "variable",
            Self::Mixed => "mixed",
            Self::Periodic => "periodic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fixed" => Some(Self::Fixed),
            "variable" => Some(Self::Variable),
            "mixed" => Some(Self::Mixed),
            "periodic" => Some(Self::Periodic),
            _ => None,
        }
    }
}

/// Housing-market regulatory zone, which decides the base LTV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegulatoryZone {
    Speculation,
    OverheatedSpeculation,
    AdjustmentTarget,
    NonRegulated,
}

impl RegulatoryZone {
    pub const ALL: [RegulatoryZone; 4] = [
        Self::Speculation,
        Self::OverheatedSpeculation,
        Self::AdjustmentTarget,
        Self::NonRegulated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Speculation => "speculation",
            Self::OverheatedSpeculation => "overheated",
            Self::AdjustmentTarget => "adjustment",
            Self::NonRegulated => "non-regulated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "speculation" => Some(Self::Speculation),
            "overheated" => Some(Self::OverheatedSpeculation),
            "adjustment" => Some(Self::AdjustmentTarget),
            "non-regulated" => Some(Self::NonRegulated),
            _ => None,
        }
    }
}

/// How often interest is compounded in a savings projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompoundingFrequency {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl CompoundingFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::SemiAnnual => 2,
            Self::Annual => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::SemiAnnual => "semi-annual",
            Self::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "semi-annual" => Some(Self::SemiAnnual),
            "annual" => Some(Self::Annual),
            _ => None,
        }
    }
}

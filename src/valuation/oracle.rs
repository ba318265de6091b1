use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

pub const CURRENCY: &str = "USD";

/// Brand used when the requested brand has no entry in its subcategory
pub const GENERIC_BRAND: &str = "Generic";

type BrandTable = HashMap<&'static str, Decimal>;
type ValuationTable = HashMap<&'static str, HashMap<&'static str, BrandTable>>;

static VALUATION_TABLE: OnceLock<ValuationTable> = OnceLock::new();

fn default_base_value() -> Decimal {
    Decimal::new(10, 0)
}

fn default_multiplier() -> Decimal {
    Decimal::new(7, 1)
}

fn brands(entries: &[(&'static str, i64)]) -> BrandTable {
    entries
        .iter()
        .map(|(brand, value)| (*brand, Decimal::new(*value, 0)))
        .collect()
}

fn get_table() -> &'static ValuationTable {
    VALUATION_TABLE.get_or_init(|| {
        let mut table = HashMap::new();

        let mut clothing = HashMap::new();
        clothing.insert("shirt", brands(&[("Nike", 30), ("Adidas", 25), ("Puma", 20), ("Generic", 10)]));
        clothing.insert("pants", brands(&[("Nike", 40), ("Adidas", 35), ("Puma", 30), ("Generic", 15)]));
        clothing.insert("jacket", brands(&[("Nike", 80), ("Adidas", 70), ("Puma", 60), ("Generic", 25)]));
        clothing.insert("shorts", brands(&[("Nike", 25), ("Adidas", 20), ("Puma", 18), ("Generic", 8)]));
        table.insert("clothing", clothing);

        let mut shoes = HashMap::new();
        shoes.insert("sneakers", brands(&[("Nike", 80), ("Adidas", 70), ("Puma", 60), ("Generic", 30)]));
        shoes.insert("boots", brands(&[("Nike", 100), ("Adidas", 90), ("Puma", 80), ("Generic", 40)]));
        shoes.insert("sandals", brands(&[("Nike", 30), ("Adidas", 25), ("Puma", 20), ("Generic", 10)]));
        table.insert("shoes", shoes);

        let mut accessories = HashMap::new();
        accessories.insert("watch", brands(&[("Rolex", 5000), ("Casio", 50), ("Generic", 20)]));
        accessories.insert("bag", brands(&[("Nike", 50), ("Adidas", 45), ("Generic", 15)]));
        accessories.insert("hat", brands(&[("Nike", 25), ("Adidas", 20), ("Generic", 8)]));
        table.insert("accessories", accessories);

        let mut electronics = HashMap::new();
        electronics.insert("phone", brands(&[("Apple", 800), ("Samsung", 600), ("Generic", 200)]));
        electronics.insert("tablet", brands(&[("Apple", 500), ("Samsung", 350), ("Generic", 150)]));
        electronics.insert("laptop", brands(&[("Apple", 1200), ("Dell", 800), ("Generic", 400)]));
        table.insert("electronics", electronics);

        table
    })
}

/// Valuation inputs. Absent fields fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRequest {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default = "default_brand")]
    pub brand: String,
    #[serde(default = "default_condition")]
    pub condition: String,
}

fn default_brand() -> String {
    GENERIC_BRAND.to_string()
}

fn default_condition() -> String {
    "good".to_string()
}

impl Default for ValuationRequest {
    fn default() -> Self {
        Self {
            category: String::new(),
            subcategory: String::new(),
            brand: default_brand(),
            condition: default_condition(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub value: Decimal,
    pub currency: String,
    pub base_value: Decimal,
    pub condition_multiplier: Decimal,
}

/// Multiplier for an item condition; unknown conditions count as "good"
pub fn condition_multiplier(condition: &str) -> Decimal {
    match condition {
        "new" => Decimal::ONE,
        "excellent" => Decimal::new(9, 1),
        "good" => Decimal::new(7, 1),
        "fair" => Decimal::new(5, 1),
        "poor" => Decimal::new(3, 1),
        _ => default_multiplier(),
    }
}

/// Base value before the condition multiplier.
///
/// Exact brand first, then the subcategory's generic entry. Unknown
/// category or subcategory falls through to the global default.
pub fn base_value(category: &str, subcategory: &str, brand: &str) -> Decimal {
    get_table()
        .get(category)
        .and_then(|subcategories| subcategories.get(subcategory))
        .and_then(|brands| brands.get(brand).or_else(|| brands.get(GENERIC_BRAND)))
        .copied()
        .unwrap_or_else(default_base_value)
}

pub fn estimate(req: &ValuationRequest) -> Valuation {
    let base = base_value(&req.category, &req.subcategory, &req.brand);
    let multiplier = condition_multiplier(&req.condition);

    Valuation {
        value: (base * multiplier).round_dp(2),
        currency: CURRENCY.to_string(),
        base_value: base,
        condition_multiplier: multiplier,
    }
}

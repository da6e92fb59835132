use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One CSV row exactly as it arrives, before any parsing or validation.
///
/// Headers are lower-cased by the loader before deserialization, so the
/// renames here are the lower-cased forms of the dataset's column names.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "city")]
    pub city: Option<String>,
    #[serde(rename = "area")]
    pub area: Option<String>,
    #[serde(rename = "rooms")]
    pub rooms: Option<String>,
    #[serde(rename = "bathroom")]
    pub bathroom: Option<String>,
    #[serde(rename = "parking spaces")]
    pub parking_spaces: Option<String>,
    #[serde(rename = "animal")]
    pub animal: Option<String>,
    #[serde(rename = "furniture")]
    pub furniture: Option<String>,
    #[serde(rename = "hoa (r$)")]
    pub hoa: Option<String>,
    #[serde(rename = "rent amount (r$)")]
    pub rent_amount: Option<String>,
    #[serde(rename = "property tax (r$)")]
    pub property_tax: Option<String>,
    #[serde(rename = "fire insurance (r$)")]
    pub fire_insurance: Option<String>,
    #[serde(rename = "total (r$)")]
    pub total: Option<String>,
}

/// Whether a listing accepts pets. The CSV encodes this as the literal
/// strings `acept` / `not acept`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PetPolicy {
    Accepts,
    Rejects,
}

impl PetPolicy {
    pub fn parse(s: &str) -> Option<PetPolicy> {
        match s.trim() {
            "acept" => Some(PetPolicy::Accepts),
            "not acept" => Some(PetPolicy::Rejects),
            _ => None,
        }
    }

    /// Portuguese label used on the pet-policy chart.
    pub fn label(self) -> &'static str {
        match self {
            PetPolicy::Accepts => "Pet friendly",
            PetPolicy::Rejects => "Não aceita pet",
        }
    }
}

/// One of the five fixed area bins. Bin edges follow the original grouping:
/// `(0, 50] (50, 100] (100, 150] (150, 200] (200, max]`, with the upper edge
/// of the last bin being the maximum observed area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SizeCluster {
    UpTo50,
    To100,
    To150,
    To200,
    Above200,
}

impl SizeCluster {
    pub const ALL: [SizeCluster; 5] = [
        SizeCluster::UpTo50,
        SizeCluster::To100,
        SizeCluster::To150,
        SizeCluster::To200,
        SizeCluster::Above200,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SizeCluster::UpTo50 => "0-50m²",
            SizeCluster::To100 => "51-100m²",
            SizeCluster::To150 => "101-150m²",
            SizeCluster::To200 => "151-200m²",
            SizeCluster::Above200 => "200m²+",
        }
    }
}

impl fmt::Display for SizeCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated rental listing. Monetary fields are non-negative and `area`
/// is strictly positive; rows violating either are dropped at load time.
///
/// `custo_total`, `aluguel_m2` and `cluster` are derived per render pass by
/// `metrics::derive`; `lat`/`lon` are attached by `geo::attach_coordinates`
/// and stay `None` for cities outside the fixed coordinate table.
#[derive(Debug, Clone)]
pub struct Listing {
    pub city: String,
    pub area: f64,
    pub rooms: Option<u32>,
    pub bathroom: Option<u32>,
    pub parking_spaces: Option<u32>,
    pub animal: PetPolicy,
    pub furniture: Option<String>,
    pub hoa: f64,
    pub rent_amount: f64,
    pub property_tax: f64,
    pub fire_insurance: f64,
    /// The dataset's precomputed grand total; `None` when the column is
    /// absent from the file.
    pub total: Option<f64>,
    pub custo_total: f64,
    pub aluguel_m2: f64,
    pub cluster: SizeCluster,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Aggregate view of one city, recomputed on every pass from the `total`
/// column.
#[derive(Debug, Clone, PartialEq)]
pub struct CityAggregate {
    pub city: String,
    pub mean_total: f64,
    pub listings: usize,
    pub mean_tax: f64,
}

/// The five scalar metrics shown on the summary cards.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub custo_total_medio: f64,
    pub media_aluguel_m2: f64,
    pub percentual_aceitam_animais: f64,
    pub imposto_medio_aluguel: f64,
    pub total_imoveis: usize,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct MetricCard {
    #[serde(rename = "Indicador")]
    #[tabled(rename = "Indicador")]
    pub label: String,
    #[serde(rename = "Valor")]
    #[tabled(rename = "Valor")]
    pub value: String,
}

/// Raw-data preview row (the "Mostrar Dados Brutos" toggle).
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RawPreviewRow {
    #[serde(rename = "Cidade")]
    #[tabled(rename = "Cidade")]
    pub city: String,
    #[serde(rename = "Área (m²)")]
    #[tabled(rename = "Área (m²)")]
    pub area: String,
    #[serde(rename = "Quartos")]
    #[tabled(rename = "Quartos")]
    pub rooms: String,
    #[serde(rename = "Banheiros")]
    #[tabled(rename = "Banheiros")]
    pub bathroom: String,
    #[serde(rename = "Vagas")]
    #[tabled(rename = "Vagas")]
    pub parking_spaces: String,
    #[serde(rename = "Mobiliado")]
    #[tabled(rename = "Mobiliado")]
    pub furniture: String,
    #[serde(rename = "Animais")]
    #[tabled(rename = "Animais")]
    pub animal: String,
    #[serde(rename = "Aluguel (R$)")]
    #[tabled(rename = "Aluguel (R$)")]
    pub rent: String,
    #[serde(rename = "Total (R$)")]
    #[tabled(rename = "Total (R$)")]
    pub total: String,
}

/// City aggregate row as exported/previewed (values already formatted).
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct CityAggregateRow {
    #[serde(rename = "Cidade")]
    #[tabled(rename = "Cidade")]
    pub city: String,
    #[serde(rename = "MediaCustoTotal")]
    #[tabled(rename = "MediaCustoTotal")]
    pub mean_total: String,
    #[serde(rename = "QuantidadeImoveis")]
    #[tabled(rename = "QuantidadeImoveis")]
    pub listings: usize,
    #[serde(rename = "ImpostoMedio")]
    #[tabled(rename = "ImpostoMedio")]
    pub mean_tax: String,
}

#[cfg(test)]
pub fn test_listing(city: &str, area: f64, rent: f64, animal: PetPolicy) -> Listing {
    Listing {
        city: city.to_string(),
        area,
        rooms: Some(2),
        bathroom: Some(1),
        parking_spaces: Some(1),
        animal,
        furniture: None,
        hoa: 0.0,
        rent_amount: rent,
        property_tax: 0.0,
        fire_insurance: 0.0,
        total: Some(rent),
        custo_total: 0.0,
        aluguel_m2: 0.0,
        cluster: SizeCluster::UpTo50,
        lat: None,
        lon: None,
    }
}

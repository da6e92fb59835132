// The six chart builders. Each one is a pure function from the listings
// (or the city aggregates) to a declarative `ChartSpec`; rendering and JSON
// export happen elsewhere and no builder touches the input table.
use crate::types::{CityAggregate, Listing, PetPolicy, SizeCluster};
use crate::util::{format_brl, mean};
use serde::Serialize;
use std::cmp::Ordering;

/// Fixed dashboard palette.
pub const PALETTE: [&str; 4] = ["#32a676", "#16634a", "#8a8a8a", "#5a9bd4"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Waterfall,
    Bar,
    HorizontalBar,
    Scatter,
}

#[derive(Debug, Clone, Serialize)]
pub struct Bar {
    pub category: String,
    pub value: f64,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub group: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub show_legend: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bars: Vec<Bar>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<ScatterPoint>,
}

impl ChartSpec {
    fn bars(kind: ChartKind, title: &str, x_title: &str, y_title: &str, bars: Vec<Bar>) -> ChartSpec {
        ChartSpec {
            kind,
            title: title.to_string(),
            x_title: x_title.to_string(),
            y_title: y_title.to_string(),
            show_legend: false,
            bars,
            points: Vec::new(),
        }
    }
}

/// Gráfico 1 — waterfall of the cost composition. One relative bar per cost
/// component, labeled with the formatted mean and its share of the total;
/// the four component means sum to the mean `custo_total` by construction.
pub fn cost_composition_waterfall(listings: &[Listing]) -> ChartSpec {
    let components: [(&str, Vec<f64>); 4] = [
        ("Condomínio (R$)", listings.iter().map(|l| l.hoa).collect()),
        ("Aluguel (R$)", listings.iter().map(|l| l.rent_amount).collect()),
        ("Imposto (R$)", listings.iter().map(|l| l.property_tax).collect()),
        ("Seguro Incêndio (R$)", listings.iter().map(|l| l.fire_insurance).collect()),
    ];
    let means: Vec<(&str, f64)> = components
        .iter()
        .map(|(name, values)| (*name, mean(values)))
        .collect();
    let total: f64 = means.iter().map(|(_, v)| v).sum();

    let bars = means
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| {
            let pct = if total > 0.0 { value / total * 100.0 } else { 0.0 };
            Bar {
                category: name.to_string(),
                value,
                color: PALETTE[i % PALETTE.len()].to_string(),
                label: Some(format!("{} ({:.2}%)", format_brl(value), pct)),
            }
        })
        .collect();
    ChartSpec::bars(
        ChartKind::Waterfall,
        "Composição do Custo Total",
        "Componente do Custo",
        "Valor Médio (R$)",
        bars,
    )
}

/// Gráfico 2 — mean total cost per city, categories in descending order of
/// the mean (ties broken by city name), bar color encoding the listing
/// count against the palette.
pub fn city_mean_cost_bar(aggs: &[CityAggregate]) -> ChartSpec {
    let min_count = aggs.iter().map(|a| a.listings).min().unwrap_or(0);
    let max_count = aggs.iter().map(|a| a.listings).max().unwrap_or(0);

    let mut ordered: Vec<&CityAggregate> = aggs.iter().collect();
    ordered.sort_by(|a, b| {
        b.mean_total
            .partial_cmp(&a.mean_total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.city.cmp(&b.city))
    });

    let bars = ordered
        .into_iter()
        .map(|a| Bar {
            category: a.city.clone(),
            // The card and axis use whole reais for the city means.
            value: a.mean_total.round(),
            color: color_for_count(a.listings, min_count, max_count).to_string(),
            label: Some(format!("{} imóveis", a.listings)),
        })
        .collect();
    let mut spec = ChartSpec::bars(
        ChartKind::Bar,
        "Média de Aluguel por Cidade",
        "Cidade",
        "Média de Aluguel",
        bars,
    );
    spec.show_legend = true;
    spec
}

// Quantize a listing count into the four-color palette.
fn color_for_count(count: usize, min: usize, max: usize) -> &'static str {
    if max <= min {
        return PALETTE[0];
    }
    let t = (count - min) as f64 / (max - min) as f64;
    let idx = (t * (PALETTE.len() - 1) as f64).round() as usize;
    PALETTE[idx.min(PALETTE.len() - 1)]
}

/// Gráfico 3 — horizontal bars of the pet-policy counts, ordered ascending
/// by count, with a fixed color per category label.
pub fn pet_policy_bar(listings: &[Listing]) -> ChartSpec {
    let mut bars: Vec<Bar> = [PetPolicy::Accepts, PetPolicy::Rejects]
        .into_iter()
        .map(|policy| {
            let count = listings.iter().filter(|l| l.animal == policy).count();
            Bar {
                category: policy.label().to_string(),
                value: count as f64,
                color: match policy {
                    PetPolicy::Accepts => PALETTE[0].to_string(),
                    PetPolicy::Rejects => PALETTE[1].to_string(),
                },
                label: None,
            }
        })
        .filter(|b| b.value > 0.0)
        .collect();
    bars.sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal));
    let mut spec = ChartSpec::bars(
        ChartKind::HorizontalBar,
        "Imóveis que Aceitam Animais",
        "Quantidade",
        "Status",
        bars,
    );
    spec.show_legend = true;
    spec
}

/// Gráfico 4 — mean rent per m² for each of the five size clusters, bars in
/// bin order.
pub fn cluster_rent_m2_bar(listings: &[Listing]) -> ChartSpec {
    let bars = SizeCluster::ALL
        .into_iter()
        .map(|cluster| {
            let values: Vec<f64> = listings
                .iter()
                .filter(|l| l.cluster == cluster)
                .map(|l| l.aluguel_m2)
                .collect();
            Bar {
                category: cluster.label().to_string(),
                value: mean(&values),
                color: PALETTE[0].to_string(),
                label: None,
            }
        })
        .collect();
    ChartSpec::bars(
        ChartKind::Bar,
        "R$/m² por Cluster de Tamanho de Imóvel",
        "Tamanho do Imóvel",
        "R$/m²",
        bars,
    )
}

/// Gráfico 5 — horizontal bars of the mean property tax per city, sorted
/// ascending by value (ties broken by city name).
pub fn city_mean_tax_bar(aggs: &[CityAggregate]) -> ChartSpec {
    let mut ordered: Vec<&CityAggregate> = aggs.iter().collect();
    ordered.sort_by(|a, b| {
        a.mean_tax
            .partial_cmp(&b.mean_tax)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.city.cmp(&b.city))
    });
    let bars = ordered
        .into_iter()
        .map(|a| Bar {
            category: a.city.clone(),
            value: a.mean_tax,
            color: PALETTE[2].to_string(),
            label: None,
        })
        .collect();
    ChartSpec::bars(
        ChartKind::HorizontalBar,
        "Imposto Médio por Imóvel e Cidade",
        "Imposto Médio (R$)",
        "Cidade",
        bars,
    )
}

/// Gráfico 6 — scatter of rent per m² against area, one point per listing,
/// colored by size cluster.
pub fn area_rent_scatter(listings: &[Listing]) -> ChartSpec {
    let points = listings
        .iter()
        .map(|l| {
            let idx = SizeCluster::ALL.iter().position(|c| *c == l.cluster).unwrap_or(0);
            ScatterPoint {
                x: l.area,
                y: l.aluguel_m2,
                group: l.cluster.label().to_string(),
                color: PALETTE[idx % PALETTE.len()].to_string(),
            }
        })
        .collect();
    ChartSpec {
        kind: ChartKind::Scatter,
        title: "Relação entre Área e Preço do Aluguel por Tamanho do Imóvel".to_string(),
        x_title: "Área (m²)".to_string(),
        y_title: "Preço do Aluguel (R$/m²)".to_string(),
        show_legend: true,
        bars: Vec::new(),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;
    use crate::types::test_listing;

    fn sample() -> Vec<Listing> {
        let mut rows = vec![
            test_listing("São Paulo", 70.0, 2000.0, PetPolicy::Accepts),
            test_listing("São Paulo", 120.0, 4000.0, PetPolicy::Rejects),
            test_listing("Campinas", 45.0, 800.0, PetPolicy::Accepts),
            test_listing("Campinas", 250.0, 3000.0, PetPolicy::Accepts),
        ];
        for (i, l) in rows.iter_mut().enumerate() {
            l.hoa = 100.0 * (i + 1) as f64;
            l.property_tax = 50.0;
            l.fire_insurance = 20.0;
            l.total = Some(l.hoa + l.rent_amount + l.property_tax + l.fire_insurance);
        }
        metrics::derive(&mut rows);
        rows
    }

    #[test]
    fn waterfall_components_sum_to_the_mean_total_cost() {
        let rows = sample();
        let spec = cost_composition_waterfall(&rows);
        assert_eq!(spec.kind, ChartKind::Waterfall);
        assert_eq!(spec.bars.len(), 4);
        let sum: f64 = spec.bars.iter().map(|b| b.value).sum();
        let mean_custo = metrics::summarize(&rows).custo_total_medio;
        assert!((sum - mean_custo).abs() < 1e-9);
    }

    #[test]
    fn waterfall_labels_combine_value_and_share() {
        let mut a = test_listing("Campinas", 50.0, 900.0, PetPolicy::Accepts);
        a.hoa = 300.0;
        let mut rows = vec![a];
        metrics::derive(&mut rows);
        let spec = cost_composition_waterfall(&rows);
        // hoa mean is 300 of a 1200 total: 25%.
        assert_eq!(spec.bars[0].label.as_deref(), Some("R$ 300,00 (25.00%)"));
    }

    #[test]
    fn city_cost_bars_are_ordered_descending_by_mean() {
        let rows = sample();
        let aggs = metrics::city_aggregates(&rows);
        let spec = city_mean_cost_bar(&aggs);
        assert_eq!(spec.bars.len(), 2);
        assert!(spec.bars[0].value >= spec.bars[1].value);
        assert_eq!(spec.bars[0].category, "São Paulo");
    }

    #[test]
    fn city_cost_ties_break_on_city_name() {
        let aggs = vec![
            CityAggregate { city: "Rio de Janeiro".into(), mean_total: 2000.0, listings: 3, mean_tax: 10.0 },
            CityAggregate { city: "Campinas".into(), mean_total: 2000.0, listings: 3, mean_tax: 10.0 },
        ];
        let spec = city_mean_cost_bar(&aggs);
        assert_eq!(spec.bars[0].category, "Campinas");
        assert_eq!(spec.bars[1].category, "Rio de Janeiro");
    }

    #[test]
    fn pet_bars_ascend_by_count_with_fixed_colors() {
        let mut rows = Vec::new();
        for _ in 0..7 {
            rows.push(test_listing("Campinas", 50.0, 800.0, PetPolicy::Accepts));
        }
        for _ in 0..3 {
            rows.push(test_listing("Campinas", 50.0, 800.0, PetPolicy::Rejects));
        }
        let spec = pet_policy_bar(&rows);
        assert_eq!(spec.bars[0].category, "Não aceita pet");
        assert_eq!(spec.bars[0].value, 3.0);
        assert_eq!(spec.bars[0].color, PALETTE[1]);
        assert_eq!(spec.bars[1].category, "Pet friendly");
        assert_eq!(spec.bars[1].value, 7.0);
        assert_eq!(spec.bars[1].color, PALETTE[0]);
    }

    #[test]
    fn cluster_bars_follow_bin_order() {
        let rows = sample();
        let spec = cluster_rent_m2_bar(&rows);
        let categories: Vec<&str> = spec.bars.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(
            categories,
            vec!["0-50m²", "51-100m²", "101-150m²", "151-200m²", "200m²+"]
        );
    }

    #[test]
    fn tax_bars_ascend_by_value() {
        let aggs = vec![
            CityAggregate { city: "São Paulo".into(), mean_total: 0.0, listings: 2, mean_tax: 120.0 },
            CityAggregate { city: "Campinas".into(), mean_total: 0.0, listings: 2, mean_tax: 35.0 },
        ];
        let spec = city_mean_tax_bar(&aggs);
        assert_eq!(spec.bars[0].category, "Campinas");
        assert_eq!(spec.bars[1].category, "São Paulo");
        assert!(spec.bars.iter().all(|b| b.color == PALETTE[2]));
    }

    #[test]
    fn scatter_emits_one_point_per_listing_grouped_by_cluster() {
        let rows = sample();
        let spec = area_rent_scatter(&rows);
        assert_eq!(spec.kind, ChartKind::Scatter);
        assert_eq!(spec.points.len(), rows.len());
        let p = &spec.points[2];
        assert_eq!(p.x, 45.0);
        assert_eq!(p.group, "0-50m²");
    }

    #[test]
    fn chart_specs_serialize_to_json() {
        let rows = sample();
        let spec = cost_composition_waterfall(&rows);
        let json = serde_json::to_string_pretty(&spec).unwrap();
        assert!(json.contains("\"kind\": \"waterfall\""));
        assert!(json.contains("Composição do Custo Total"));
    }
}

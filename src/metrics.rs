// Metric derivation: per-listing derived columns and the aggregate scalars
// behind the summary cards. Everything here is recomputed from scratch on
// each render pass.
use crate::types::{CityAggregate, DashboardSummary, Listing, PetPolicy, SizeCluster};
use crate::util::mean;
use std::collections::HashMap;

/// Fixed inner bin edges; the outer edges are 0 and the maximum observed
/// area, so the largest listing always lands in the final bin.
const BIN_EDGES: [f64; 4] = [50.0, 100.0, 150.0, 200.0];

pub fn cluster_for(area: f64, max_area: f64) -> SizeCluster {
    if area >= max_area {
        return SizeCluster::Above200;
    }
    if area <= BIN_EDGES[0] {
        SizeCluster::UpTo50
    } else if area <= BIN_EDGES[1] {
        SizeCluster::To100
    } else if area <= BIN_EDGES[2] {
        SizeCluster::To150
    } else if area <= BIN_EDGES[3] {
        SizeCluster::To200
    } else {
        SizeCluster::Above200
    }
}

/// Fill the derived per-listing fields: `custo_total` (sum of the four cost
/// components), `aluguel_m2` (rent / area; area is strictly positive after
/// loading) and the size cluster.
pub fn derive(listings: &mut [Listing]) {
    let max_area = listings.iter().map(|l| l.area).fold(0.0_f64, f64::max);
    for l in listings.iter_mut() {
        l.custo_total = l.hoa + l.rent_amount + l.property_tax + l.fire_insurance;
        l.aluguel_m2 = l.rent_amount / l.area;
        l.cluster = cluster_for(l.area, max_area);
    }
}

/// Aggregate scalars for the five summary cards.
///
/// `imposto_medio_aluguel` is the mean of per-listing `tax / rent` ratios,
/// not the ratio of the two means; the two disagree whenever rents differ,
/// and the cards report the former. Listings with zero rent are excluded
/// from that ratio rather than producing an infinite term.
pub fn summarize(listings: &[Listing]) -> DashboardSummary {
    let total_imoveis = listings.len();
    let custo_total_medio = mean(&listings.iter().map(|l| l.custo_total).collect::<Vec<_>>());
    let media_aluguel_m2 = mean(&listings.iter().map(|l| l.aluguel_m2).collect::<Vec<_>>());

    // Explicit zero-count guard: an empty table reports 0%, not NaN.
    let percentual_aceitam_animais = if total_imoveis == 0 {
        0.0
    } else {
        let aceitam = listings
            .iter()
            .filter(|l| l.animal == PetPolicy::Accepts)
            .count();
        aceitam as f64 / total_imoveis as f64 * 100.0
    };

    let ratios: Vec<f64> = listings
        .iter()
        .filter(|l| l.rent_amount > 0.0)
        .map(|l| l.property_tax / l.rent_amount * 100.0)
        .collect();
    let imposto_medio_aluguel = mean(&ratios);

    DashboardSummary {
        custo_total_medio,
        media_aluguel_m2,
        percentual_aceitam_animais,
        imposto_medio_aluguel,
        total_imoveis,
    }
}

/// Per-city aggregates over the grand-total column: mean total cost,
/// listing count and mean property tax. Callers must gate on
/// `LoadReport::total_column_present`; listings without a parseable total
/// are left out of the mean.
///
/// The result is sorted by city name so downstream orderings have a stable,
/// deterministic base.
pub fn city_aggregates(listings: &[Listing]) -> Vec<CityAggregate> {
    #[derive(Default)]
    struct Acc {
        totals: Vec<f64>,
        taxes: Vec<f64>,
        count: usize,
    }
    let mut map: HashMap<String, Acc> = HashMap::new();
    for l in listings {
        let e = map.entry(l.city.clone()).or_default();
        e.count += 1;
        e.taxes.push(l.property_tax);
        if let Some(t) = l.total {
            e.totals.push(t);
        }
    }
    let mut aggs: Vec<CityAggregate> = map
        .into_iter()
        .map(|(city, acc)| CityAggregate {
            city,
            mean_total: mean(&acc.totals),
            listings: acc.count,
            mean_tax: mean(&acc.taxes),
        })
        .collect();
    aggs.sort_by(|a, b| a.city.cmp(&b.city));
    aggs
}

// Presentation layer: turns the loaded listings plus the interaction state
// into a `DashboardView`, prints it in the fixed row layout, and exports the
// chart specs. `build_view` is the explicit `render(state) -> view` pass
// that runs in full on every interaction; only the raw load is cached.
use crate::charts::{self, ChartSpec};
use crate::geo;
use crate::loader::LoadReport;
use crate::metrics;
use crate::output;
use crate::types::{CityAggregate, CityAggregateRow, Listing, MetricCard, RawPreviewRow};
use crate::util::{format_brl, format_decimal_br, format_int_br};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::Tabled;

/// Row arrangement of the page: 5 cards, then 2 / 3 / 1 charts, then the map.
pub const ROW_LAYOUT: [usize; 4] = [5, 2, 3, 1];

pub const MISSING_TOTAL_MSG: &str =
    "A coluna 'total (R$)' não foi encontrada no conjunto de dados.";

const RAW_PREVIEW_ROWS: usize = 10;

/// A page section renders independently: a failure here shows an inline
/// message and never suppresses the rest of the page.
#[derive(Debug, Clone, Serialize)]
pub enum Section<T> {
    Ready(T),
    Failed(String),
}

impl<T> Section<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(t) => Some(t),
            Section::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MapPoint {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    /// Integer slider bounds derived from the city means (floor of the
    /// minimum, ceil of the maximum, so the full range covers every city).
    pub bounds: (i64, i64),
    /// The currently selected `[min, max]`, clamped to the bounds.
    pub selected: (i64, i64),
    /// Cities whose mean total cost falls inside the selection.
    pub cities: Vec<String>,
    pub points: Vec<MapPoint>,
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub cards: Vec<MetricCard>,
    /// The six chart sections in layout order: waterfall, city mean cost,
    /// pet policy, cluster rent/m², city mean tax, area scatter.
    pub charts: Vec<Section<ChartSpec>>,
    pub aggregates: Section<Vec<CityAggregateRow>>,
    pub raw_preview: Option<Vec<RawPreviewRow>>,
    pub map: Section<MapView>,
}

/// Interaction state owned by the menu loop: the raw-data toggle and the
/// map cost filter. Everything else is a pure function of the dataset.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub show_raw: bool,
    pub cost_filter: Option<(i64, i64)>,
}

pub fn build_view(mut listings: Vec<Listing>, report: &LoadReport, state: &ViewState) -> DashboardView {
    metrics::derive(&mut listings);
    geo::attach_coordinates(&mut listings);

    let summary = metrics::summarize(&listings);
    let cards = vec![
        MetricCard {
            label: "Custo Total Médio".to_string(),
            value: format_brl(summary.custo_total_medio),
        },
        MetricCard {
            label: "Média de Aluguel por m²".to_string(),
            value: format!("{}/m²", format_brl(summary.media_aluguel_m2)),
        },
        MetricCard {
            label: "Imóveis que Aceitam Animais (%)".to_string(),
            value: format!("{}%", format_decimal_br(summary.percentual_aceitam_animais, 2)),
        },
        MetricCard {
            label: "% Imposto / Aluguel Total".to_string(),
            value: format!("{}%", format_decimal_br(summary.imposto_medio_aluguel, 2)),
        },
        MetricCard {
            label: "Quantidade Total de Imóveis".to_string(),
            value: format_int_br(summary.total_imoveis as i64),
        },
    ];

    let aggs = metrics::city_aggregates(&listings);

    let city_cost_section = if report.total_column_present {
        Section::Ready(charts::city_mean_cost_bar(&aggs))
    } else {
        Section::Failed(MISSING_TOTAL_MSG.to_string())
    };
    let charts = vec![
        Section::Ready(charts::cost_composition_waterfall(&listings)),
        city_cost_section,
        Section::Ready(charts::pet_policy_bar(&listings)),
        Section::Ready(charts::cluster_rent_m2_bar(&listings)),
        Section::Ready(charts::city_mean_tax_bar(&aggs)),
        Section::Ready(charts::area_rent_scatter(&listings)),
    ];

    let aggregates = if report.total_column_present {
        Section::Ready(
            aggs.iter()
                .map(|a| CityAggregateRow {
                    city: a.city.clone(),
                    mean_total: format_brl(a.mean_total),
                    listings: a.listings,
                    mean_tax: format_brl(a.mean_tax),
                })
                .collect(),
        )
    } else {
        Section::Failed(MISSING_TOTAL_MSG.to_string())
    };

    let raw_preview = state.show_raw.then(|| {
        listings
            .iter()
            .take(RAW_PREVIEW_ROWS)
            .map(|l| RawPreviewRow {
                city: l.city.clone(),
                area: format_decimal_br(l.area, 2),
                rooms: l.rooms.map_or_else(|| "-".to_string(), |r| r.to_string()),
                bathroom: l.bathroom.map_or_else(|| "-".to_string(), |r| r.to_string()),
                parking_spaces: l
                    .parking_spaces
                    .map_or_else(|| "-".to_string(), |r| r.to_string()),
                furniture: l.furniture.clone().unwrap_or_else(|| "-".to_string()),
                animal: l.animal.label().to_string(),
                rent: format_brl(l.rent_amount),
                total: l.total.map_or_else(|| "-".to_string(), format_brl),
            })
            .collect()
    });

    let map = build_map(&listings, &aggs, report, state);

    DashboardView { cards, charts, aggregates, raw_preview, map }
}

fn build_map(
    listings: &[Listing],
    aggs: &[CityAggregate],
    report: &LoadReport,
    state: &ViewState,
) -> Section<MapView> {
    if !report.total_column_present {
        return Section::Failed(MISSING_TOTAL_MSG.to_string());
    }
    if aggs.is_empty() {
        return Section::Failed("Sem dados para o mapa.".to_string());
    }

    let min_mean = aggs.iter().map(|a| a.mean_total).fold(f64::INFINITY, f64::min);
    let max_mean = aggs.iter().map(|a| a.mean_total).fold(f64::NEG_INFINITY, f64::max);
    let bounds = (min_mean.floor() as i64, max_mean.ceil() as i64);

    let selected = match state.cost_filter {
        Some((lo, hi)) => (lo.clamp(bounds.0, bounds.1), hi.clamp(bounds.0, bounds.1)),
        None => bounds,
    };

    let cities: Vec<String> = aggs
        .iter()
        .filter(|a| a.mean_total >= selected.0 as f64 && a.mean_total <= selected.1 as f64)
        .map(|a| a.city.clone())
        .collect();

    let points: Vec<MapPoint> = listings
        .iter()
        .filter(|l| cities.iter().any(|c| c == &l.city))
        .filter_map(|l| match (l.lat, l.lon) {
            // Listings outside the coordinate table are silently excluded.
            (Some(lat), Some(lon)) => Some(MapPoint { city: l.city.clone(), lat, lon }),
            _ => None,
        })
        .collect();

    Section::Ready(MapView { bounds, selected, cities, points })
}

#[derive(Debug, Clone, Tabled)]
struct BarPreviewRow {
    #[tabled(rename = "Categoria")]
    category: String,
    #[tabled(rename = "Valor")]
    value: String,
    #[tabled(rename = "Rótulo")]
    label: String,
}

#[derive(Debug, Clone, Tabled)]
struct PointPreviewRow {
    #[tabled(rename = "Cidade")]
    city: String,
    #[tabled(rename = "Latitude")]
    lat: String,
    #[tabled(rename = "Longitude")]
    lon: String,
}

/// Print the whole page: cards, the charts grouped by the fixed row layout,
/// the optional raw-data preview, the city table and the map.
pub fn print_dashboard(view: &DashboardView) {
    println!("Análise de Custos e Características de Imóveis por Cidade");
    println!("=========================================================\n");

    if let Some(table) = output::markdown_table(&view.cards, ROW_LAYOUT[0]) {
        println!("{}\n", table);
    }

    if let Some(raw) = &view.raw_preview {
        println!("Dados Brutos (primeiras {} linhas)\n", RAW_PREVIEW_ROWS);
        if let Some(table) = output::markdown_table(raw, RAW_PREVIEW_ROWS) {
            println!("{}\n", table);
        } else {
            println!("(sem linhas)\n");
        }
    }

    let mut next = 0usize;
    for (row_idx, width) in ROW_LAYOUT[1..].iter().copied().enumerate() {
        println!("--- Linha {} ---\n", row_idx + 2);
        for section in view.charts.iter().skip(next).take(width) {
            print_chart(section);
        }
        next += width;
    }

    match &view.aggregates {
        Section::Ready(rows) => {
            println!("Resumo por Cidade\n");
            if let Some(table) = output::markdown_table(rows, rows.len()) {
                println!("{}\n", table);
            }
        }
        Section::Failed(msg) => println!("[erro] {}\n", msg),
    }

    print_map(&view.map);
}

fn print_chart(section: &Section<ChartSpec>) {
    match section {
        Section::Failed(msg) => println!("[erro] {}\n", msg),
        Section::Ready(spec) => {
            println!("{}", spec.title);
            if spec.points.is_empty() {
                let rows: Vec<BarPreviewRow> = spec
                    .bars
                    .iter()
                    .map(|b| BarPreviewRow {
                        category: b.category.clone(),
                        value: format_decimal_br(b.value, 2),
                        label: b.label.clone().unwrap_or_default(),
                    })
                    .collect();
                match output::markdown_table(&rows, rows.len()) {
                    Some(table) => println!("{}\n", table),
                    None => println!("(sem dados)\n"),
                }
            } else {
                println!(
                    "({} pontos; {} x {})\n",
                    format_int_br(spec.points.len() as i64),
                    spec.x_title,
                    spec.y_title
                );
            }
        }
    }
}

fn print_map(map: &Section<MapView>) {
    println!("Mapa de propriedades com base na média de aluguel\n");
    match map {
        Section::Failed(msg) => println!("[erro] {}\n", msg),
        Section::Ready(m) => {
            println!(
                "Intervalo disponível: R$ {} a R$ {} | selecionado: R$ {} a R$ {}",
                format_int_br(m.bounds.0),
                format_int_br(m.bounds.1),
                format_int_br(m.selected.0),
                format_int_br(m.selected.1)
            );
            println!(
                "Cidades no intervalo: {}",
                if m.cities.is_empty() { "(nenhuma)".to_string() } else { m.cities.join(", ") }
            );
            println!("Pontos no mapa: {}\n", format_int_br(m.points.len() as i64));
            let rows: Vec<PointPreviewRow> = m
                .points
                .iter()
                .map(|p| PointPreviewRow {
                    city: p.city.clone(),
                    lat: format!("{:.4}", p.lat),
                    lon: format!("{:.4}", p.lon),
                })
                .collect();
            if let Some(table) = output::markdown_table(&rows, 5) {
                println!("{}\n", table);
            }
        }
    }
}

const CHART_SLUGS: [&str; 6] = [
    "composicao_custo",
    "media_aluguel_cidade",
    "aceita_animais",
    "aluguel_m2_cluster",
    "imposto_medio_cidade",
    "dispersao_area_aluguel",
];

/// Export every ready chart spec as pretty JSON plus the city aggregates as
/// CSV. Returns the list of files written.
pub fn export_dashboard(dir: &Path, view: &DashboardView) -> Result<Vec<String>, Box<dyn Error>> {
    let mut written = Vec::new();
    for (i, section) in view.charts.iter().enumerate() {
        if let Some(spec) = section.ready() {
            let name = format!("chart{}_{}.json", i + 1, CHART_SLUGS[i]);
            output::write_json(&dir.join(&name), spec)?;
            written.push(name);
        }
    }
    if let Some(rows) = view.aggregates.ready() {
        let name = "resumo_cidades.csv".to_string();
        output::write_csv(&dir.join(&name), rows)?;
        written.push(name);
    }
    output::write_json(&dir.join("cards.json"), &view.cards)?;
    written.push("cards.json".to_string());
    Ok(written)
}

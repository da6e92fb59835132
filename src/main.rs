// Entry point and high-level CLI flow.
//
// The binary mirrors the original dashboard's behavior as an explicit
// event loop:
// - Option [1] (re)loads the CSV, printing diagnostics.
// - Option [2] runs the whole pipeline and renders the page: cards, the six
//   charts, the city table and the map, exporting the chart specs as JSON.
// - Options [3] and [4] change the interaction state (raw-data toggle, map
//   cost filter); the next render picks them up.
// Every render recomputes everything; only the raw load is memoized, keyed
// by (path, row cap), and invalidated by an explicit reload.
mod charts;
mod geo;
mod loader;
mod metrics;
mod output;
mod render;
mod types;
mod util;

use clap::Parser;
use loader::LoadReport;
use once_cell::sync::Lazy;
use render::ViewState;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use types::Listing;
use util::format_int_br;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Análise de custos e características de imóveis por cidade")]
struct Args {
    /// CSV dataset of rental listings.
    #[arg(long, default_value = "houses_to_rent_v2.csv")]
    file: String,
    /// Maximum number of data rows to read.
    #[arg(long, default_value_t = 10_000)]
    nrows: usize,
    /// Directory receiving the exported chart specs and tables.
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,
}

struct CachedLoad {
    key: (String, usize),
    listings: Vec<Listing>,
    report: LoadReport,
}

struct AppState {
    cache: Option<CachedLoad>,
    view: ViewState,
}

// In-memory app state so we only read the CSV once but can re-render the
// dashboard any number of times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> =
    Lazy::new(|| Mutex::new(AppState { cache: None, view: ViewState::default() }));

/// Read a single line of input after printing the common "Enter choice:"
/// prompt. The prompt is reused for the menu and the filter inputs.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Handle option [1]: (re)load the CSV, replacing whatever is cached.
fn handle_load(args: &Args) {
    let mut state = APP_STATE.lock().unwrap();
    state.cache = None;
    match loader::load_dataset(&args.file, args.nrows) {
        Ok((listings, report)) => {
            println!(
                "Dados carregados! ({} linhas lidas, {} válidas, {} descartadas)",
                format_int_br(report.total_rows as i64),
                format_int_br(report.loaded_rows as i64),
                format_int_br(report.skipped_rows as i64)
            );
            if !report.total_column_present {
                println!("Aviso: {}", render::MISSING_TOTAL_MSG);
            }
            println!();
            state.cache = Some(CachedLoad {
                key: (args.file.clone(), args.nrows),
                listings,
                report,
            });
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Memoized load used by the render path: reuse the cache when the key
/// matches, otherwise load fresh.
fn cached_load(args: &Args) -> Option<(Vec<Listing>, LoadReport)> {
    {
        let state = APP_STATE.lock().unwrap();
        if let Some(cache) = &state.cache {
            if cache.key == (args.file.clone(), args.nrows) {
                return Some((cache.listings.clone(), cache.report.clone()));
            }
        }
    }
    handle_load(args);
    let state = APP_STATE.lock().unwrap();
    state
        .cache
        .as_ref()
        .map(|c| (c.listings.clone(), c.report.clone()))
}

/// Handle option [2]: run the full pipeline and print/export the page.
fn handle_render(args: &Args) {
    let Some((listings, report)) = cached_load(args) else {
        println!("Error: No data loaded. Please check the CSV file (option 1).\n");
        return;
    };
    let view_state = APP_STATE.lock().unwrap().view.clone();
    let view = render::build_view(listings, &report, &view_state);
    render::print_dashboard(&view);
    match render::export_dashboard(&args.export_dir, &view) {
        Ok(written) => println!("(Exportado: {})\n", written.join(", ")),
        Err(e) => eprintln!("Write error: {}\n", e),
    }
}

/// Handle option [3]: flip the raw-data toggle.
fn handle_toggle_raw() {
    let mut state = APP_STATE.lock().unwrap();
    state.view.show_raw = !state.view.show_raw;
    println!(
        "Mostrar Dados Brutos: {}\n",
        if state.view.show_raw { "sim" } else { "não" }
    );
}

/// Handle option [4]: set or clear the map cost filter. Blank input clears
/// the filter back to the full range.
fn handle_set_filter() {
    let min_input = read_line("Média de aluguel mínima (R$, vazio limpa o filtro): ");
    if min_input.is_empty() {
        APP_STATE.lock().unwrap().view.cost_filter = None;
        println!("Filtro removido.\n");
        return;
    }
    let max_input = read_line("Média de aluguel máxima (R$): ");
    match (min_input.parse::<i64>(), max_input.parse::<i64>()) {
        (Ok(lo), Ok(hi)) if lo <= hi => {
            APP_STATE.lock().unwrap().view.cost_filter = Some((lo, hi));
            println!(
                "Filtro: R$ {} a R$ {}\n",
                format_int_br(lo),
                format_int_br(hi)
            );
        }
        _ => println!("Intervalo inválido.\n"),
    }
}

fn main() {
    let args = Args::parse();
    loop {
        println!("[1] Carregar o arquivo");
        println!("[2] Renderizar o painel");
        println!("[3] Mostrar/ocultar dados brutos");
        println!("[4] Filtro de média de aluguel do mapa");
        println!("[5] Sair\n");
        match read_choice().as_str() {
            "1" => handle_load(&args),
            "2" => {
                println!();
                handle_render(&args);
            }
            "3" => handle_toggle_raw(),
            "4" => handle_set_filter(),
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1-5.\n"),
        }
    }
}

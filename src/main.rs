// Console front end for the franchise KPI dashboard.
//
// The dataset is loaded once before the menu starts; every selection change
// re-runs `compute` and the dashboard is printed again on request.
use nbc_dashboard::config::DashboardConfig;
use nbc_dashboard::layout::{self, Layout};
use nbc_dashboard::output;
use nbc_dashboard::util::format_int;
use nbc_dashboard::{compute, control_options, loader, ControlOptions, Dataset, Selection};
use once_cell::sync::OnceCell;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{error, info, warn};

static DATASET: OnceCell<Dataset> = OnceCell::new();

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Show a numbered list and return the chosen value. An empty answer keeps
/// `current`.
fn choose(title: &str, options: &[String], current: &str) -> String {
    println!("{}", title);
    for (i, o) in options.iter().enumerate() {
        let mark = if o == current { "*" } else { " " };
        println!("{} [{}] {}", mark, i + 1, o);
    }
    loop {
        let Some(answer) = prompt("Enter number (blank keeps current): ") else {
            return current.to_string();
        };
        if answer.is_empty() {
            return current.to_string();
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return options[n - 1].clone(),
            _ => println!("Invalid choice. Please enter 1-{}.", options.len()),
        }
    }
}

struct Session<'a> {
    dataset: &'a Dataset,
    config: DashboardConfig,
    layout: Layout,
    options: ControlOptions,
    selection: Selection,
    page: usize,
}

impl Session<'_> {
    fn show(&self) {
        let views = compute(self.dataset, &self.selection);
        print!(
            "{}",
            output::render_dashboard(
                &self.layout,
                self.dataset.columns(),
                &views,
                self.config.histogram_bins,
                self.page,
            )
        );
    }

    fn next_page(&mut self) {
        let views = compute(self.dataset, &self.selection);
        let pages = output::page_count(views.rows.len(), self.config.page_size);
        self.page = (self.page + 1) % pages;
        print!(
            "{}",
            output::table_page(self.dataset.columns(), &views.rows, self.page, self.config.page_size)
        );
    }

    fn export(&self) {
        let views = compute(self.dataset, &self.selection);
        let dir = &self.config.export_dir;
        let rows_path = dir.join("filtered_rows.csv");
        let views_path = dir.join("derived_views.json");
        if let Err(e) = output::write_csv(&rows_path, &views.rows) {
            warn!(error = %e, "csv export failed");
            eprintln!("Write error: {}", e);
            return;
        }
        if let Err(e) = output::write_json(&views_path, &views) {
            warn!(error = %e, "json export failed");
            eprintln!("Write error: {}", e);
            return;
        }
        println!(
            "Exported {} rows to {} and views to {}\n",
            format_int(views.rows.len()),
            rows_path.display(),
            views_path.display()
        );
    }

    fn run(&mut self) {
        loop {
            println!("{}", self.config.title);
            println!("Current selection: {}\n", self.selection);
            println!("[1] Select City");
            println!("[2] Select Product");
            println!("[3] Select Loyalty Segment");
            println!("[4] Show Dashboard");
            println!("[5] Next Table Page");
            println!("[6] Export Filtered Rows");
            println!("[0] Exit\n");
            let Some(choice) = prompt("Enter choice: ") else {
                break;
            };
            match choice.as_str() {
                "1" => {
                    self.selection.city =
                        choose("Select City:", &self.options.cities, &self.selection.city);
                    self.page = 0;
                }
                "2" => {
                    self.selection.product =
                        choose("Select Product:", &self.options.products, &self.selection.product);
                    self.page = 0;
                }
                "3" => {
                    self.selection.loyalty_segment = choose(
                        "Select Loyalty Segment:",
                        &self.options.loyalty_segments,
                        &self.selection.loyalty_segment,
                    );
                    self.page = 0;
                }
                "4" => self.show(),
                "5" => self.next_page(),
                "6" => self.export(),
                "0" => break,
                _ => println!("Invalid choice. Please enter 0-6.\n"),
            }
        }
        println!("Exiting the program.");
    }
}

fn main() -> ExitCode {
    init_tracing();
    let config = DashboardConfig::from_env();

    let (dataset, report) = match loader::load(&config.data_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(path = %config.data_path.display(), error = %e, "failed to load dataset");
            eprintln!("Failed to load file: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!(
        "Processing dataset... ({} rows loaded, {} blank measure cells)\n",
        format_int(report.total_rows),
        format_int(report.absent_values)
    );
    let dataset = DATASET.get_or_init(|| dataset);

    let options = control_options(dataset);
    let Some(selection) = layout::default_selection(&options) else {
        error!("dataset has no rows");
        eprintln!("The dataset is empty; nothing to show.");
        return ExitCode::FAILURE;
    };
    info!(%selection, "default selection");

    let mut session = Session {
        dataset,
        layout: layout::layout(dataset, &config.title, config.page_size),
        config,
        options,
        selection,
        page: 0,
    };
    session.run();
    ExitCode::SUCCESS
}

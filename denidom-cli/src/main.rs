//! denidom - offline estimate calculator
//!
//! Works on JSON files without a database or network: totals, analytics,
//! price prediction and KS-2/KS-3/M-29 CSV documents, computed by the same
//! denidom-core code the HTTP service uses.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use denidom_common::time::{format_ru_date, now};
use denidom_core::analytics::{detect_anomalies, optimize, predict_price, recommend, OptimizeOptions};
use denidom_core::calculator::{calculate, calculate_resource_totals, item_total, ResourceSettings};
use denidom_core::documents::{
    export_estimate_csv, render_ks2, render_ks3, render_m29, DocumentHeader, DocumentKind,
    PreviousAmounts,
};
use denidom_core::estimate::{ResourceItem, UnitCosts};
use denidom_core::normatives::NormativeBase;
use denidom_core::reference;
use tracing::info;

mod input;

use input::{load_actuals, load_estimate, read_json, write_output};

const RULE: &str = "═══════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────";

#[derive(Parser)]
#[command(name = "denidom", version, propagate_version = true)]
#[command(about = "DeniDom - сметные расчёты из командной строки")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Рассчитать смету из JSON файла
    Calculate {
        /// JSON файл со сметой ({"items": [...], "options": {...}})
        #[arg(short, long)]
        input: PathBuf,

        /// Сохранить результат в JSON файл
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Показать позиции
        #[arg(short, long)]
        verbose: bool,
    },

    /// Проверить смету: аномалии, экономия, рекомендации
    Analyze {
        #[arg(short, long)]
        input: PathBuf,

        /// Минимальное качество альтернатив (0..1)
        #[arg(long, default_value_t = 0.7)]
        min_quality: f64,

        /// Целевой бюджет прямых затрат
        #[arg(long)]
        target_budget: Option<f64>,

        /// Вывести результат в JSON
        #[arg(long)]
        json: bool,
    },

    /// Сформировать документ в CSV
    Export {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, value_enum)]
        kind: ExportKind,

        /// Файл для сохранения (по умолчанию stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Номер документа
        #[arg(long, default_value = "1")]
        number: String,

        /// Дата составления (YYYY-MM-DD, по умолчанию сегодня)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, default_value = "")]
        object: String,

        #[arg(long, default_value = "")]
        customer: String,

        #[arg(long, default_value = "")]
        contractor: String,

        #[arg(long)]
        period_from: Option<NaiveDate>,

        #[arg(long)]
        period_to: Option<NaiveDate>,

        /// КС-3: JSON с ранее предъявленными суммами
        #[arg(long)]
        previous: Option<PathBuf>,

        /// М-29: JSON {"материал": фактический расход}
        #[arg(long)]
        actual: Option<PathBuf>,
    },

    /// Прогноз цены по категории работ
    Predict {
        /// Ключ категории (plaster, tile, ...)
        category: String,

        #[arg(long)]
        region: Option<String>,

        #[arg(short, long, default_value_t = 1)]
        quarters: u32,

        /// Месяц выполнения работ (1-12)
        #[arg(short, long)]
        month: Option<u32>,
    },

    /// Справочные данные
    Info,

    /// Демонстрация ресурсного расчёта
    Demo {
        /// Количество позиций
        #[arg(short, long, default_value_t = 100)]
        items: usize,

        /// Индекс пересчёта в текущие цены
        #[arg(long, default_value_t = 8.5)]
        index: f64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportKind {
    Ks2,
    Ks3,
    M29,
    Csv,
}

impl From<ExportKind> for DocumentKind {
    fn from(kind: ExportKind) -> Self {
        match kind {
            ExportKind::Ks2 => DocumentKind::Ks2,
            ExportKind::Ks3 => DocumentKind::Ks3,
            ExportKind::M29 => DocumentKind::M29,
            ExportKind::Csv => DocumentKind::Csv,
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so that stdout stays clean for CSV and JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Calculate {
            input,
            output,
            verbose,
        } => run_calculation(&input, output.as_deref(), verbose),
        Commands::Analyze {
            input,
            min_quality,
            target_budget,
            json,
        } => run_analysis(
            &input,
            OptimizeOptions {
                min_quality,
                target_budget,
            },
            json,
        ),
        Commands::Export {
            input,
            kind,
            output,
            number,
            date,
            object,
            customer,
            contractor,
            period_from,
            period_to,
            previous,
            actual,
        } => {
            let mut header = DocumentHeader::new(number, date.unwrap_or_else(|| now().date_naive()))
                .with_parties(&object, &customer, &contractor);
            header.period_from = period_from;
            header.period_to = period_to;

            let sources = ExportSources {
                previous,
                actual,
            };
            run_export(&input, kind.into(), &header, &sources, output.as_deref())
        }
        Commands::Predict {
            category,
            region,
            quarters,
            month,
        } => run_prediction(&category, region.as_deref(), quarters, month),
        Commands::Info => {
            show_info();
            Ok(())
        }
        Commands::Demo { items, index } => run_demo(items, index),
    }
}

fn run_calculation(input: &Path, output: Option<&Path>, verbose: bool) -> Result<()> {
    let estimate = load_estimate(input)?;
    let result = calculate(&estimate.items, &estimate.options);

    if let Some(title) = &estimate.title {
        println!("{}", title);
    }
    if verbose {
        println!("{}", RULE);
        for (i, item) in estimate.items.iter().enumerate() {
            println!(
                "{:>3}. {:<40} {:>10} {:<6} × {:>12.2} × {:<5} = {:>14.2}",
                i + 1,
                item.name,
                item.quantity,
                item.unit,
                item.price,
                item.coefficient,
                item_total(item.quantity, item.price, item.coefficient)
            );
        }
    }

    println!("{}", RULE);
    println!("   Позиций:           {:>15}", result.items_count);
    println!("   Прямые затраты:    {:>15.2} ₽", result.subtotal);
    println!("   Накладные расходы: {:>15.2} ₽", result.overhead);
    println!("   Сметная прибыль:   {:>15.2} ₽", result.profit);
    println!("{}", THIN_RULE);
    println!("   Итого без НДС:     {:>15.2} ₽", result.total_without_vat());
    println!("   НДС:               {:>15.2} ₽", result.vat);
    println!("{}", RULE);
    println!("   ИТОГО:             {:>15.2} ₽", result.total);
    println!("{}", RULE);

    if let Some(path) = output {
        write_output(Some(path), &serde_json::to_string_pretty(&result)?)?;
        info!("Result saved to {}", path.display());
    }
    Ok(())
}

fn run_analysis(input: &Path, options: OptimizeOptions, json: bool) -> Result<()> {
    let estimate = load_estimate(input)?;
    let anomalies = detect_anomalies(&estimate.items);
    let optimization = optimize(&estimate.items, &options);
    let recommendations = recommend(&estimate.items, 5);

    if json {
        let report = serde_json::json!({
            "anomalies": anomalies,
            "optimization": optimization,
            "recommendations": recommendations,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Аномалии (риск {:.2}, проверено позиций: {})", anomalies.risk_score, anomalies.items_checked);
    if anomalies.anomalies.is_empty() {
        println!("   не найдены");
    }
    for a in &anomalies.anomalies {
        println!("   [{:?}] {}", a.severity, a.message);
    }

    println!();
    println!(
        "Оптимизация: {:.2} ₽ → {:.2} ₽ (экономия {:.2} ₽, {:.1}%)",
        optimization.original_total,
        optimization.optimized_total,
        optimization.savings,
        optimization.savings_percent
    );
    for s in &optimization.suggestions {
        println!(
            "   {} «{}»: {} по {:.2} ₽ вместо {:.2} ₽",
            if s.applied { "+" } else { " " },
            s.item_name,
            s.alternative,
            s.alternative_price,
            s.current_price
        );
    }
    if let Some(reached) = optimization.target_reached {
        println!("   Целевой бюджет {}", if reached { "достигнут" } else { "не достигнут" });
    }

    println!();
    println!("Рекомендуемые работы:");
    for r in &recommendations {
        println!("   {} ({:.2} ₽/{}): {}", r.name, r.typical_price, r.unit, r.reason);
    }
    Ok(())
}

struct ExportSources {
    previous: Option<PathBuf>,
    actual: Option<PathBuf>,
}

fn run_export(
    input: &Path,
    kind: DocumentKind,
    header: &DocumentHeader,
    sources: &ExportSources,
    output: Option<&Path>,
) -> Result<()> {
    let estimate = load_estimate(input)?;

    let csv = match kind {
        DocumentKind::Ks2 => render_ks2(header, &estimate.items, &estimate.options),
        DocumentKind::Ks3 => {
            let previous: PreviousAmounts = match &sources.previous {
                Some(path) => read_json(path)?,
                None => PreviousAmounts::default(),
            };
            let period = calculate(&estimate.items, &estimate.options);
            render_ks3(header, &period, &previous)
        }
        DocumentKind::M29 => {
            let actual = load_actuals(sources.actual.as_deref())?;
            render_m29(header, &estimate.items, &actual)
        }
        DocumentKind::Csv => {
            let title = estimate.title.as_deref().unwrap_or("Смета");
            export_estimate_csv(title, &estimate.items, &estimate.options)
        }
    };

    write_output(output, &csv)?;
    if let Some(path) = output {
        eprintln!(
            "{} от {} сохранён: {}",
            kind.title(),
            format_ru_date(header.date),
            path.display()
        );
    }
    Ok(())
}

fn run_prediction(category: &str, region: Option<&str>, quarters: u32, month: Option<u32>) -> Result<()> {
    let p = predict_price(category, region, quarters, month)?;

    println!("Прогноз: {} через {} кв.", category, p.quarters_ahead);
    println!("{}", RULE);
    println!("   Текущая цена:      {:>12.2} ₽", p.current_price);
    println!("   Прогноз:           {:>12.2} ₽", p.predicted_price);
    println!("   Интервал 95%:      {:.2} … {:.2} ₽", p.lower_bound, p.upper_bound);
    println!("   Тренд:             {:?} ({:+.2} ₽/кв.)", p.trend, p.slope);
    println!("   Региональный к-т:  {:.2}", p.regional_coefficient);
    println!("   Сезонный к-т:      {:.2}", p.seasonal_factor);
    Ok(())
}

fn show_info() {
    println!("DeniDom v{}", env!("CARGO_PKG_VERSION"));
    println!("   ОС:          {}", std::env::consts::OS);
    println!("   Архитектура: {}", std::env::consts::ARCH);
    println!();

    println!("Нормативные базы:");
    for base in NormativeBase::ALL {
        println!("   {:<6} {}", base.display_name(), base.full_name());
    }
    println!();

    println!("Категории работ:");
    for c in reference::categories() {
        println!("   {:<12} {:<32} {:>10.2} ₽/{}", c.key, c.name, c.latest_price(), c.unit);
    }
    println!();

    println!("Регионы с коэффициентом:");
    for (region, k) in reference::regions() {
        println!("   {:<24} {:.2}", region, k);
    }
}

/// Synthetic resource-mode estimate: 30% labor, 55% materials and 15%
/// machines, two thirds of which are operator wages
fn demo_items(count: usize) -> Vec<ResourceItem> {
    (0..count)
        .map(|i| {
            let base_price = 1000.0 + (i as f64) * 50.0;
            ResourceItem {
                code: format!("ДЕМО-{:04}", i + 1),
                name: format!("Демонстрационная позиция {}", i + 1),
                unit: "м²".to_string(),
                quantity: 10.0 + (i % 20) as f64,
                unit_costs: UnitCosts::new(
                    base_price,
                    base_price * 0.30,
                    base_price * 0.10,
                    base_price * 0.55,
                    base_price * 0.15,
                ),
            }
        })
        .collect()
}

fn run_demo(count: usize, index: f64) -> Result<()> {
    if !index.is_finite() || index <= 0.0 {
        anyhow::bail!("index must be greater than zero");
    }

    let items = demo_items(count);
    let settings = ResourceSettings {
        index,
        ..ResourceSettings::default()
    };

    println!("Ресурсный расчёт: {} позиций", count);
    println!("   Индекс пересчёта:    {:.2}", settings.index);
    println!("   Накладные расходы:   {:.0}% ФОТ", settings.overhead_rate * 100.0);
    println!("   Сметная прибыль:     {:.0}% ФОТ", settings.profit_rate * 100.0);
    println!("   НДС:                 {:.0}%", settings.vat_rate * 100.0);
    println!();

    let start = Instant::now();
    let result = calculate_resource_totals(&items, &settings);
    let elapsed = start.elapsed();

    println!("{}", RULE);
    println!("   Прямые затраты:    {:>15.2} ₽", result.direct_costs);
    println!("   ОЗП:               {:>15.2} ₽", result.labor_costs);
    println!("   ЗПМ:               {:>15.2} ₽", result.machine_operator_costs);
    println!("   Материалы:         {:>15.2} ₽", result.material_costs);
    println!("   Машины:            {:>15.2} ₽", result.machine_costs);
    println!("{}", THIN_RULE);
    println!("   ФОТ:               {:>15.2} ₽", result.wage_fund());
    println!("   Накладные расходы: {:>15.2} ₽", result.overhead);
    println!("   Сметная прибыль:   {:>15.2} ₽", result.profit);
    println!("{}", THIN_RULE);
    println!("   Итого без НДС:     {:>15.2} ₽", result.subtotal);
    println!("   НДС:               {:>15.2} ₽", result.vat);
    println!("{}", RULE);
    println!("   ИТОГО:             {:>15.2} ₽", result.total);
    println!("{}", RULE);
    println!("Время расчёта: {:?}", elapsed);
    Ok(())
}

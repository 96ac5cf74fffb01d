//! Link inference command

use super::open_data;
use crate::output::{
    color_confidence, format_gbps, print_header, print_info, print_json, print_success,
    print_table, print_warning, OutputFormat,
};
use crate::InferArgs;
use anyhow::{Context, Result};
use colored::Colorize;
use tabled::Tabled;
use topology_lib::export::{write_artifacts, TopologyExport};
use topology_lib::{CapacityReport, Pipeline, PipelineConfig, PipelineMetrics, PipelineOutcome};

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "Cells")]
    cells: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Safe Capacity")]
    safe_capacity: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

pub fn run(args: &InferArgs, config: PipelineConfig, format: OutputFormat) -> Result<()> {
    let source = open_data(&args.data, &config)?;
    let pipeline = Pipeline::new(config)?;
    let outcome = pipeline.run(source.as_ref())?;

    match format {
        OutputFormat::Json => print_json(&TopologyExport::from_outcome(&outcome))?,
        OutputFormat::Table => print_outcome(&outcome),
    }

    if let Some(dir) = &args.output {
        let written = write_artifacts(&outcome, dir)?;
        if matches!(format, OutputFormat::Table) {
            print_success(&format!(
                "Wrote {} artifacts to {}",
                written.len(),
                dir.display()
            ));
        }
    }

    if let Some(path) = &args.metrics {
        let text = PipelineMetrics::new()
            .encode_text()
            .context("Failed to encode metrics")?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
    }

    Ok(())
}

fn print_outcome(outcome: &PipelineOutcome) {
    print_header(&format!("Fronthaul Topology: {}", outcome.dataset));
    println!("{}: {}", "Cells".bold(), outcome.cell_count);
    println!("{}: {}", "Threshold".bold(), outcome.threshold);
    if let Some(model) = &outcome.capacity_model {
        println!("{}: {}", "Capacity model".bold(), model);
    }
    println!();

    if !outcome.is_complete() {
        print_warning(&format!(
            "Only {} cell(s) found; link inference needs at least two",
            outcome.cell_count
        ));
        return;
    }

    let rows: Vec<LinkRow> = outcome
        .links
        .iter()
        .map(|(label, cells)| {
            let confidence = outcome.confidences.get(label).copied().unwrap_or(0.0);
            let report = outcome.capacity.get(label);
            LinkRow {
                link: label.to_string(),
                cells: cells.join(", "),
                confidence: color_confidence(confidence),
                safe_capacity: format_gbps(report.and_then(CapacityReport::safe_gbps)),
                detail: report.map(describe_report).unwrap_or_default(),
            }
        })
        .collect();
    print_table(&rows);

    if outcome.warnings.is_empty() {
        print_success(&format!("Inferred {} link(s)", outcome.links.len()));
    } else {
        println!();
        for warning in &outcome.warnings {
            print_warning(warning);
        }
    }

    let empty = outcome.fingerprints.empty_count();
    if empty > 0 {
        print_info(&format!("{} cell(s) had no loss samples", empty));
    }
}

fn describe_report(report: &CapacityReport) -> String {
    match report {
        CapacityReport::Transmit(t) => format!(
            "est {:.3} Gbps, {} cell(s) with data",
            t.estimated_gbps, t.cells_with_data
        ),
        CapacityReport::DualCapture(d) => format!(
            "peak {:.3} / avg {:.3} Gbps, congestion {:.3}",
            d.peak_demand_gbps, d.average_demand_gbps, d.congestion_score
        ),
        CapacityReport::Empty(_) => "no data".to_string(),
    }
}

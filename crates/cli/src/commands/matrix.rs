//! Similarity matrix command

use super::open_data;
use crate::output::{color_similarity, print_header, print_info, print_json, OutputFormat};
use crate::DataArgs;
use anyhow::Result;
use tabled::{builder::Builder, settings::Style};
use topology_lib::fingerprint::FingerprintBuilder;
use topology_lib::inference::{SimilarityEngine, SimilarityMatrix};
use topology_lib::PipelineConfig;

pub fn run(args: &DataArgs, config: PipelineConfig, format: OutputFormat) -> Result<()> {
    let source = open_data(args, &config)?;
    let fingerprints = FingerprintBuilder::new(source.as_ref()).build()?;
    let matrix = SimilarityEngine::with_min_overlap(config.min_overlap_samples).compute(&fingerprints);

    match format {
        OutputFormat::Json => print_json(&matrix)?,
        OutputFormat::Table => {
            print_header(&format!("Similarity Matrix: {}", source.describe()));
            if matrix.is_empty() {
                print_info("No cells found");
                return Ok(());
            }
            println!("{}", render_table(&matrix, config.threshold));
            print_info(&format!(
                "Entries above {} link their cells",
                config.threshold
            ));
        }
    }

    Ok(())
}

fn render_table(matrix: &SimilarityMatrix, threshold: f64) -> String {
    let mut builder = Builder::default();

    let mut header = vec![String::new()];
    header.extend(matrix.cells().iter().cloned());
    builder.push_record(header);

    for (i, cell) in matrix.cells().iter().enumerate() {
        let mut record = vec![cell.clone()];
        record.extend(matrix.row(i).iter().map(|v| color_similarity(*v, threshold)));
        builder.push_record(record);
    }

    builder.build().with(Style::rounded()).to_string()
}

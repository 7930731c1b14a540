use std::path::PathBuf;

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ShowArg {
    /// Genome file written by `train`
    #[arg(long)]
    genome: PathBuf,
    /// Print at most this many genes
    #[arg(long)]
    limit: Option<usize>,
}

pub(crate) fn run(arg: &ShowArg) -> anyhow::Result<()> {
    let ShowArg { genome, limit } = arg;
    let record = util::read_genome_file(genome)?;

    println!("Trained at: {}", record.trained_at);
    println!("Fitness: {:.4} (score {:.1})", record.fitness, record.score);
    println!("Generations: {}, seed: {}", record.generations, record.seed);
    let genes = record.genes.genes();
    let shown = limit.map_or(genes.len(), |limit| limit.min(genes.len()));
    for (i, gene) in genes[..shown].iter().enumerate() {
        println!("{i:5}: {gene}");
    }
    if shown < genes.len() {
        println!("... {} more genes", genes.len() - shown);
    }

    Ok(())
}

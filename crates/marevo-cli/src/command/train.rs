use std::path::PathBuf;

use chrono::Utc;
use marevo_env::simulator::CourseSimulator;
use marevo_training::driver::{GenerationReport, Trainer};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;

use crate::{
    schema::record::BestGenomeRecord,
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Configuration file (JSON with optional `training` and `simulator` sections)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of individuals per generation
    #[arg(long)]
    population: Option<usize>,
    /// Number of generations to run
    #[arg(long)]
    generations: Option<usize>,
    /// Number of genes per genome
    #[arg(long)]
    genome_len: Option<usize>,
    /// Seed for the random generator
    #[arg(long)]
    seed: Option<u64>,
    /// Number of environments evaluated in parallel
    #[arg(long)]
    workers: Option<usize>,
    /// Per-gene mutation probability
    #[arg(long)]
    mutation_rate: Option<f64>,
    /// Output file path for the best genome
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        config,
        population,
        generations,
        genome_len,
        seed,
        workers,
        mutation_rate,
        output,
    } = arg;

    let file = util::read_config_file(config.as_ref())?;
    let mut training = file.training;
    let simulator = file.simulator;
    if let Some(population) = population {
        training.population_size = *population;
    }
    if let Some(generations) = generations {
        training.generations = *generations;
    }
    if let Some(genome_len) = genome_len {
        training.genome_len = *genome_len;
    }
    if let Some(workers) = workers {
        training.workers = *workers;
    }
    if let Some(mutation_rate) = mutation_rate {
        training.mutation_rate = *mutation_rate;
    }
    let seed = seed
        .or(training.seed)
        .unwrap_or_else(|| rand::rng().random());
    training.seed = Some(seed);
    log::debug!("training config: {training:?}");
    log::debug!("simulator config: {simulator:?}");
    let fitness_params = training.fitness;

    eprintln!("Training with seed {seed}:");
    eprintln!("  Population:    {}", training.population_size);
    eprintln!("  Generations:   {}", training.generations);
    eprintln!("  Genome length: {}", training.genome_len);
    eprintln!("  Workers:       {}", training.worker_count());

    let mut rng = Pcg64::seed_from_u64(seed);
    let trainer = Trainer::new(
        training,
        || CourseSimulator::new(simulator.clone()),
        &mut rng,
    )?;
    let outcome = trainer.run(&mut rng, print_report);

    let best = &outcome.best;
    let score = best.evaluation().map_or(0.0, |eval| eval.score);
    let record = BestGenomeRecord {
        trained_at: Utc::now(),
        fitness: best.fitness(),
        score,
        generations: outcome.history.len(),
        seed,
        genome_len: best.genome().len(),
        simulator,
        fitness_params,
        genes: best.genome().clone(),
    };
    Output::save_json(&record, output.clone())?;

    eprintln!();
    eprintln!("Best genome saved successfully");
    if let Some(path) = &output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Trained at: {}", record.trained_at);
    eprintln!("  Fitness: {:.4}", record.fitness);
    eprintln!("  Score: {:.1}", record.score);
    eprintln!("  Genes: {}", record.genes.len());

    Ok(())
}

fn print_report(report: &GenerationReport) {
    let GenerationReport {
        generation,
        stats,
        generation_best,
        best_fitness,
        improved,
        evaluation_failures,
    } = report;
    eprintln!("Generation #{generation}:");
    eprintln!("  Fitness Stats:");
    eprintln!("    Min:    {:.4}", stats.min);
    eprintln!("    Max:    {:.4}", stats.max);
    eprintln!("    Mean:   {:.4}", stats.mean);
    eprintln!("    Median: {:.4}", stats.median);
    eprintln!("    StdDev: {:.4}", stats.std_dev);
    eprintln!("  Generation best: {generation_best:.4}");
    eprintln!(
        "  All-time best:   {best_fitness:.4}{}",
        if *improved { " (improved)" } else { "" }
    );
    if *evaluation_failures > 0 {
        eprintln!("  Failed evaluations: {evaluation_failures}");
    }
}

use std::path::PathBuf;

use marevo_env::simulator::CourseSimulator;
use marevo_training::fitness::FitnessEvaluator;

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Genome file written by `train`
    #[arg(long)]
    genome: PathBuf,
    /// Configuration file whose `simulator` section replaces the recorded one
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of episodes to replay
    #[arg(long, default_value_t = 1)]
    loops: usize,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        genome,
        config,
        loops,
    } = arg;

    let record = util::read_genome_file(genome)?;
    let simulator = match config {
        Some(path) => util::read_config_file(Some(path))?.simulator,
        None => record.simulator.clone(),
    };
    let evaluator = FitnessEvaluator::new(record.fitness_params);

    eprintln!(
        "Replaying {} genes (trained fitness {:.4}, seed {})",
        record.genes.len(),
        record.fitness,
        record.seed
    );
    let mut env = CourseSimulator::new(simulator);
    for episode in 0..*loops {
        let eval = evaluator.evaluate(&record.genes, &mut env)?;
        eprintln!("Episode #{episode}:");
        eprintln!("  Steps:          {}", eval.steps);
        eprintln!("  Right moves:    {}", eval.right_moves);
        eprintln!("  Reward total:   {:.1}", eval.reward_total);
        eprintln!("  Time remaining: {:.1}", eval.max_time_remaining);
        eprintln!("  Score:          {:.1}", eval.score);
        eprintln!("  Fitness:        {:.4}", eval.fitness);
        eprintln!("  Game score:     {}", env.score());
        eprintln!("  Progress:       {}", env.level_progress());
        eprintln!("  Lives left:     {}", env.lives());
    }

    Ok(())
}

use marevo_env::simulator::SimulatorConfig;
use marevo_training::config::TrainingConfig;
use serde::{Deserialize, Serialize};

/// On-disk configuration; both sections may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub training: TrainingConfig,
    pub simulator: SimulatorConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let file: ConfigFile =
            serde_json::from_str(r#"{ "training": { "generations": 3 } }"#).unwrap();
        assert_eq!(file.training.generations, 3);
        assert_eq!(file.training.population_size, 10);
        assert_eq!(file.simulator, SimulatorConfig::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        let file: ConfigFile = serde_json::from_str("{}").unwrap();
        file.training.validate().unwrap();
    }
}

use crate::error::AppError;
use crate::infra::build_context;
use clap::Args;
use loan_scoring::config::AppConfig;
use loan_scoring::scoring::{ApplicationInput, DecisionResult, ScoringService};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding one application submission
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Score with this model artifact instead of the configured one
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(model) = args.model {
        config.scoring.model_path = model;
    }

    let service = ScoringService::new(build_context(&config.scoring)?);
    let result = score_file(&service, &args.input)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn score_file(service: &ScoringService, path: &Path) -> Result<DecisionResult, AppError> {
    let raw = fs::read_to_string(path)?;
    let input: ApplicationInput = serde_json::from_str(&raw)?;
    Ok(service.evaluate(&input)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_scoring::config::ScoringSettings;
    use std::io::Write;

    fn shipped_service() -> ScoringService {
        let settings = ScoringSettings {
            model_path: PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../../models/scoring_model.json"
            )),
            ..ScoringSettings::default()
        };
        ScoringService::new(build_context(&settings).expect("shipped artifact loads"))
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        let mut file = fs::File::create(&path).expect("temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        path
    }

    #[test]
    fn scores_application_file() {
        let path = write_temp(
            "application.json",
            r#"{"application_id": "cli-1", "declared_income": 18000, "loan_amount": 4000}"#,
        );

        let result = score_file(&shipped_service(), &path).expect("scored");
        let _ = fs::remove_file(&path);

        assert!((0.0..=1.0).contains(&result.ml_probability));
        assert!((0.0..=100.0).contains(&result.final_sci));
    }

    #[test]
    fn malformed_file_is_an_input_error() {
        let path = write_temp("broken.json", "{ not json");

        let error = score_file(&shipped_service(), &path).expect_err("invalid json");
        let _ = fs::remove_file(&path);

        assert!(matches!(error, AppError::Input(_)));
    }

    #[test]
    fn missing_model_fails_context_build() {
        let settings = ScoringSettings {
            model_path: PathBuf::from("/nonexistent/model.json"),
            ..ScoringSettings::default()
        };
        assert!(matches!(build_context(&settings), Err(AppError::Model(_))));
    }
}

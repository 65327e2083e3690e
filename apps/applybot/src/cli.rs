use std::path::PathBuf;

use clap::Parser;

use crate::apply::MappingStrategy;
use crate::pipeline::RunRequest;

#[derive(Parser, Debug)]
#[command(name = "applybot", version)]
#[command(about = "Automated job application bot: search boards, rank matches, fill and submit forms")]
pub struct Args {
    /// Path to your resume PDF file.
    #[arg(long, env = "RESUME_PATH")]
    pub resume: PathBuf,

    /// Job keywords to search for (space separated, or comma separated in JOB_KEYWORDS).
    #[arg(long, env = "JOB_KEYWORDS", num_args = 1.., value_delimiter = ',', required = true)]
    pub keywords: Vec<String>,

    /// Job location to search in.
    #[arg(long, env = "LOCATION", default_value = "")]
    pub location: String,

    /// Maximum number of applications to submit.
    #[arg(long = "max", env = "MAX_APPLICATIONS", default_value_t = 10)]
    pub max_applications: usize,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Show the browser windows instead of running headless.
    #[arg(long)]
    pub headful: bool,

    /// Map all fields of a form with a single oracle call.
    #[arg(long)]
    pub batch_mapping: bool,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    pub fn run_request(&self) -> RunRequest {
        RunRequest {
            keywords: self
                .keywords
                .iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            location: self.location.trim().to_string(),
            max_applications: self.max_applications,
            strategy: if self.batch_mapping {
                MappingStrategy::Batched
            } else {
                MappingStrategy::PerField
            },
        }
    }

    /// Tracing filter directive. `--log-level` wins over a `RUST_LOG` directive;
    /// with neither, this crate logs at info.
    pub fn log_directive(&self, rust_log: Option<&str>) -> String {
        let crate_level = |level: &str| format!("{}={level}", env!("CARGO_PKG_NAME"));
        match (self.log_level.as_deref(), rust_log.map(str::trim)) {
            (Some(level), _) => crate_level(level),
            (None, Some(directive)) if !directive.is_empty() => directive.to_string(),
            (None, _) => crate_level("info"),
        }
    }

    /// Prints the run banner.
    pub fn print_banner(&self) {
        println!("=== Automated Job Application Bot ===");
        println!("Resume: {}", self.resume.display());
        println!("Keywords: {}", self.keywords.join(", "));
        println!("Location: {}", self.location);
        println!("Max Applications: {}", self.max_applications);
        println!("====================================");
    }
}

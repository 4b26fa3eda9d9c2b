use std::path::PathBuf;

use clap::Parser;

use crate::conversation::DEFAULT_MAX_ROUNDS;
use crate::errors::AppError;
use crate::lead::Lead;
use crate::outreach::DEFAULT_REVIEW_ITERATIONS;
use crate::pipeline::RunOptions;

/// Research a lead and draft a personalized cold email
#[derive(Parser, Debug)]
#[command(name = "outreach")]
#[command(version)]
#[command(about = "Research a lead and draft a personalized cold email", long_about = None)]
pub struct Cli {
    /// JSON file describing the lead
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = ["first_name", "company", "website", "profile_url"]
    )]
    pub lead: Option<PathBuf>,

    /// Lead's first name
    #[arg(long)]
    pub first_name: Option<String>,

    /// Lead's company name
    #[arg(long)]
    pub company: Option<String>,

    /// Company website URL
    #[arg(long)]
    pub website: Option<String>,

    /// Professional profile URL
    #[arg(long)]
    pub profile_url: Option<String>,

    /// Cache file path
    #[arg(long, value_name = "FILE", env = "OUTREACH_CACHE_PATH")]
    pub cache: Option<PathBuf>,

    /// Round limit for the research conversation
    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
    pub research_rounds: usize,

    /// Maximum draft/review iterations in the writers' room
    #[arg(long, default_value_t = DEFAULT_REVIEW_ITERATIONS)]
    pub review_iterations: usize,

    /// Print the research report before the email
    #[arg(long)]
    pub show_research: bool,

    /// Print the whole result as JSON
    #[arg(long, conflicts_with = "show_research")]
    pub json: bool,
}

impl Cli {
    /// Builds the lead from `--lead` or from the individual flags.
    pub fn lead(&self) -> Result<Lead, AppError> {
        if let Some(path) = &self.lead {
            return Lead::from_file(path);
        }
        match (
            &self.first_name,
            &self.company,
            &self.website,
            &self.profile_url,
        ) {
            (Some(first_name), Some(company), Some(website), Some(profile_url)) => {
                let lead = Lead {
                    first_name: first_name.clone(),
                    company_name: company.clone(),
                    website_url: website.clone(),
                    profile_url: profile_url.clone(),
                };
                lead.validate()?;
                Ok(lead)
            }
            _ => Err(AppError::Usage(
                "provide --lead FILE, or all of --first-name, --company, --website and --profile-url"
                    .to_string(),
            )),
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            research_rounds: self.research_rounds,
            review_iterations: self.review_iterations,
        }
    }
}

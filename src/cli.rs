use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use fal_vision::pipeline::types::{MaritalStatus, Mood, UserContext, UserProfile};

#[derive(Debug, Parser)]
#[command(name = "fal-vision", version, about = "Coffee-cup and palm photo readings")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Knowledge base JSON, overrides the configured one
    #[arg(long, global = true)]
    pub knowledge_base: Option<PathBuf>,

    /// Fixed seed for phrase selection
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check whether a photo shows a coffee cup with grounds
    Validate { image: PathBuf },
    /// Read a coffee cup photo
    Coffee {
        image: PathBuf,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Read a palm photo
    Palm { image: PathBuf },
    /// Print a palm reading tip
    Tip,
}

#[derive(Debug, Args)]
pub struct ContextArgs {
    #[arg(long)]
    pub occupation: Option<String>,
    #[arg(long)]
    pub marital_status: Option<MaritalStatus>,
    #[arg(long)]
    pub age: Option<u32>,
    #[arg(long, value_enum)]
    pub mood: Option<Mood>,
}

impl From<ContextArgs> for UserContext {
    fn from(args: ContextArgs) -> Self {
        let profile = UserProfile {
            occupation: args.occupation,
            marital_status: args.marital_status,
            age: args.age,
        };
        UserContext::new((!profile.is_empty()).then_some(profile), args.mood)
    }
}

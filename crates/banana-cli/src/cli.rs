use std::path::PathBuf;

use banana_model::{ImageResolution, MaterialScope, ProviderFormat, ServiceKind};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line client of the banana slides backend.
#[derive(Debug, Parser)]
#[command(name = "banana", version, about = "banana slides backend client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ./banana.toml
    #[arg(long, global = true, env = "BANANA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend URL, overrides `api.base_url`
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format of command results
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate images into the materials library
    Material {
        #[command(subcommand)]
        action: MaterialCommands,
    },
    /// Follow a task submitted earlier
    Task {
        #[command(subcommand)]
        action: TaskCommands,
    },
    /// Backend settings and service tests
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
    /// Browse and manage the materials library
    Materials {
        #[command(subcommand)]
        action: MaterialsCommands,
    },
    /// Project history
    Projects {
        #[command(subcommand)]
        action: ProjectsCommands,
    },
    /// Reference documents
    Files {
        #[command(subcommand)]
        action: FilesCommands,
    },
    /// User slide templates
    Templates {
        #[command(subcommand)]
        action: TemplatesCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum MaterialCommands {
    /// Generate an image from a prompt and wait for it
    Generate {
        prompt: String,
        /// Attach the result to this project instead of the global library
        #[arg(long)]
        project: Option<String>,
        /// Main reference image
        #[arg(long)]
        ref_image: Option<PathBuf>,
        /// Additional reference images
        #[arg(long = "extra-image")]
        extra_images: Vec<PathBuf>,
        /// Print the task id and return without polling
        #[arg(long)]
        no_wait: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommands {
    /// Poll a task until it finishes
    Poll {
        task_id: String,
        /// Project the task belongs to; global when omitted
        #[arg(long, conflicts_with = "service")]
        project: Option<String>,
        /// Follow a settings service test of this service instead of a material job
        #[arg(long)]
        service: Option<ServiceKind>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommands {
    /// Print the stored settings
    Show,
    /// Change stored settings
    Update(SettingsArgs),
    /// Restore backend defaults
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Check connectivity of configured services
    Test {
        /// Services to test; all when omitted
        services: Vec<ServiceKind>,
        #[command(flatten)]
        overrides: SettingsArgs,
    },
}

/// Settings fields; unset flags are left unchanged.
#[derive(Debug, Clone, Default, Args)]
pub struct SettingsArgs {
    #[arg(long)]
    pub provider: Option<ProviderFormat>,
    #[arg(long)]
    pub api_base_url: Option<String>,
    /// Empty keeps the stored key
    #[arg(long, env = "BANANA_PROVIDER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long)]
    pub text_model: Option<String>,
    #[arg(long)]
    pub image_model: Option<String>,
    #[arg(long)]
    pub caption_model: Option<String>,
    #[arg(long)]
    pub mineru_api_base: Option<String>,
    /// Empty keeps the stored token
    #[arg(long, env = "BANANA_MINERU_TOKEN", hide_env_values = true)]
    pub mineru_token: Option<String>,
    #[arg(long)]
    pub resolution: Option<ImageResolution>,
    /// Image aspect ratio as W:H
    #[arg(long)]
    pub aspect_ratio: Option<String>,
    #[arg(long)]
    pub description_workers: Option<u32>,
    #[arg(long)]
    pub image_workers: Option<u32>,
    #[arg(long)]
    pub language: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum MaterialsCommands {
    /// List materials: `all`, `none` for global ones, or a project id
    List {
        #[arg(long, default_value = "all")]
        scope: MaterialScope,
    },
    /// Upload an image
    Upload {
        path: PathBuf,
        #[arg(long)]
        project: Option<String>,
    },
    /// Delete materials
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Attach global materials to a project
    Associate {
        #[arg(long)]
        project: String,
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Download materials as a zip archive
    Download {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(short = 'O', long, default_value = "materials.zip")]
        out: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProjectsCommands {
    /// List projects, newest first
    List {
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Follow pages until the end
        #[arg(long)]
        all: bool,
    },
    /// Change a project's title
    Rename { id: String, title: String },
    /// Delete projects
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum FilesCommands {
    /// Upload a reference document
    Upload {
        path: PathBuf,
        #[arg(long)]
        project: Option<String>,
        /// Start parsing right after the upload
        #[arg(long)]
        parse: bool,
    },
    /// Attach an uploaded file to a project
    Associate { id: String, project: String },
    /// Start parsing an uploaded file
    Parse { id: String },
}

#[derive(Debug, Subcommand)]
pub enum TemplatesCommands {
    List,
    Upload {
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    Delete { id: String },
}

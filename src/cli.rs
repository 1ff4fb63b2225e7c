// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command-line front end.
//!
//! Each invocation opens the file-backed store, performs one action through
//! the controller, and prints what the map would show.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mapmarks::config::{AppConfig, STORE_ENV_VAR};
use mapmarks::io::serialization::{self, FileFormat};
use mapmarks::io::storage::FileStore;
use mapmarks::models::color::Color;
use mapmarks::ui::form::{ImageInput, MarkerForm, PlacementHandler};
use mapmarks::ui::surface::TextSurface;
use mapmarks::{Controller, Position, ProjectRepository};
use std::path::PathBuf;

type App = Controller<FileStore, TextSurface>;

#[derive(Parser, Debug)]
#[command(name = "mapmarks", version, about = "Named, tagged map markers grouped into per-person paths")]
pub struct Cli {
    /// YAML config file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Storage directory (overrides MAPMARKS_STORE and the config file)
    #[arg(short = 's', long = "store")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List stored projects
    Projects,
    /// Create an empty project
    Create { name: String },
    /// Delete a project
    Delete { name: String },
    /// Place a marker
    Add(MarkerArgs),
    /// Edit the marker at a position
    Edit(EditArgs),
    /// Delete the marker at a position
    Remove(PositionArgs),
    /// Print visible markers and paths
    Show {
        #[arg(short, long)]
        project: String,
        /// Only this person
        #[arg(long)]
        person: Option<String>,
        /// Only markers with any of these tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// List tags in use
    Tags {
        #[arg(short, long)]
        project: String,
    },
    /// Set a person's color
    Color {
        #[arg(short, long)]
        project: String,
        #[arg(long)]
        person: String,
        /// #RRGGBB
        color: String,
    },
    /// Export a project (.json, .yaml, .yml or .geojson)
    Export {
        #[arg(short, long)]
        project: String,
        output: PathBuf,
    },
    /// Import a transfer document (.json, .yaml or .yml)
    Import {
        input: PathBuf,
        /// Replace an existing project of the same name
        #[arg(long)]
        overwrite: bool,
    },
    /// Import a GeoJSON FeatureCollection as a new project
    ImportGeojson {
        input: PathBuf,
        #[arg(short, long)]
        name: String,
        #[arg(long)]
        overwrite: bool,
    },
}

#[derive(Args, Debug)]
pub struct PositionArgs {
    #[arg(short, long)]
    pub project: String,
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,
}

#[derive(Args, Debug)]
pub struct MarkerArgs {
    #[command(flatten)]
    pub at: PositionArgs,
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "")]
    pub years: String,
    /// Comma-separated
    #[arg(long, default_value = "")]
    pub tags: String,
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub marker: MarkerArgs,
    /// Drop the marker's image reference
    #[arg(long, conflicts_with = "image")]
    pub clear_image: bool,
}

impl MarkerArgs {
    fn form(&self, clear_image: bool) -> MarkerForm {
        let image = match (&self.image, clear_image) {
            (Some(url), _) => ImageInput::Replace(url.clone()),
            (None, true) => ImageInput::Clear,
            (None, false) => ImageInput::Keep,
        };
        MarkerForm {
            name: self.name.clone(),
            description: self.description.clone(),
            years: self.years.clone(),
            tags: self.tags.clone(),
            image,
        }
    }
}

impl PositionArgs {
    fn position(&self) -> Position {
        Position::new(self.lat, self.lng)
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.resolve_storage_dir(cli.store.clone(), std::env::var(STORE_ENV_VAR).ok());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let store = FileStore::open(&config.storage_dir)
        .with_context(|| format!("opening store at {}", config.storage_dir.display()))?;
    let repo = ProjectRepository::with_collection_key(store, config.collection_key.clone());
    let mut app = Controller::new(repo, TextSurface::new());

    if let Err(e) = execute(&mut app, cli.command, &config) {
        log::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

fn execute(app: &mut App, command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Projects => {
            for name in app.projects()? {
                println!("{name}");
            }
        }
        Command::Create { name } => {
            app.create_project(&name)?;
            println!("Created project '{name}'");
        }
        Command::Delete { name } => {
            if app.delete_project(&name)? {
                println!("Deleted project '{name}'");
            } else {
                println!("No project named '{name}'");
            }
        }
        Command::Add(args) => {
            app.open_project(&args.at.project)?;
            app.begin_placement(args.at.position())?;
            app.on_submit(args.form(false))?;
            print_map(app);
        }
        Command::Edit(args) => {
            let marker = &args.marker;
            app.open_project(&marker.at.project)?;
            app.edit_marker(marker.at.position(), marker.form(args.clear_image))?;
            print_map(app);
        }
        Command::Remove(args) => {
            app.open_project(&args.project)?;
            let removed = app.delete_marker(args.position())?;
            println!("Removed '{}' at {}", removed.name, removed.position);
        }
        Command::Show {
            project,
            person,
            tags,
        } => {
            app.open_project(&project)?;
            app.set_name_filter(person)?;
            for tag in &tags {
                app.toggle_tag(tag)?;
            }
            print_map(app);
        }
        Command::Tags { project } => {
            app.open_project(&project)?;
            for tag in app.all_tags() {
                println!("{tag}");
            }
        }
        Command::Color {
            project,
            person,
            color,
        } => {
            let color: Color = color.parse()?;
            app.open_project(&project)?;
            app.set_color(&person, color)?;
            print_map(app);
        }
        Command::Export { project, output } => {
            app.open_project(&project)?;
            match FileFormat::from_path(&output) {
                Some(FileFormat::GeoJson) => {
                    serialization::export_geojson(&app.export_geojson()?, &output, config.pretty_exports)?
                }
                _ => serialization::export_transfer(&app.export_project()?, &output, config.pretty_exports)?,
            }
            println!("Exported '{}' to {}", project, output.display());
        }
        Command::Import { input, overwrite } => {
            let doc = serialization::import_transfer(&input)?;
            app.import_project(doc, overwrite)?;
            println!("Imported project '{}'", app.active_project().unwrap_or_default());
        }
        Command::ImportGeojson {
            input,
            name,
            overwrite,
        } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            app.import_geojson(&text, &name, overwrite)?;
            println!("Imported project '{name}'");
        }
    }
    Ok(())
}

fn print_map(app: &App) {
    for line in app.surface().lines() {
        println!("{line}");
    }
}

use clap::{Args, Parser, Subcommand};
use crate::cli::error::{
    StageList, parse_pipeline_order, parse_record_status, parse_seconds, parse_stage_list, parse_stage_spec,
    parse_template_status, parse_time_track_status, parse_timestamp, parse_visibility, validate_hex_color,
    validate_non_empty,
};
use crate::cli::output::{
    format_board_detail, format_board_list, format_category_list, format_deal, format_field_group_list,
    format_pipeline_detail, format_pipeline_list, format_template_detail, format_template_page,
};
use crate::config::Config;
use crate::context::{AppContext, ServiceContext};
use crate::models::{
    BoardDoc, CategoryDoc, PipelineDoc, RecordStatus, Stage, StageDoc, TemplateDoc, TemplateStatus,
    TimeTrackStatus, Visibility,
};
use crate::repo::StageRepo;
use crate::services::content::SaveAsTemplate;
use crate::services::pipelines::PipelineOrder;
use crate::services::templates::{Paging, TemplateFilter, TemplateUse};
use crate::services::{boards, categories, deals, field_groups, pipelines, templates};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "salesdeck")]
#[command(about = "Sales boards, pipelines and reusable templates")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Act as this user (overrides the `user` setting)
    #[arg(long, global = true)]
    pub user: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Board management commands
    Boards {
        #[command(subcommand)]
        subcommand: BoardCommands,
    },
    /// Pipeline management commands
    Pipelines {
        #[command(subcommand)]
        subcommand: PipelineCommands,
    },
    /// Board item commands
    Items {
        #[command(subcommand)]
        subcommand: ItemCommands,
    },
    /// Deal commands
    Deals {
        #[command(subcommand)]
        subcommand: DealCommands,
    },
    /// Template commands
    Templates {
        #[command(subcommand)]
        subcommand: TemplateCommands,
    },
    /// Template category commands
    Categories {
        #[command(subcommand)]
        subcommand: CategoryCommands,
    },
    /// Field group commands
    FieldGroups {
        #[command(subcommand)]
        subcommand: FieldGroupCommands,
    },
}

/// Name, description and status of a template being saved
#[derive(Args)]
pub struct SaveArgs {
    /// Template name
    #[arg(long, value_parser = validate_non_empty)]
    pub name: String,
    /// Template description (defaults to one naming the source)
    #[arg(long)]
    pub description: Option<String>,
    /// Template status (active, inactive)
    #[arg(long, value_parser = parse_template_status)]
    pub status: Option<TemplateStatus>,
}

impl SaveArgs {
    fn to_request(&self) -> SaveAsTemplate {
        SaveAsTemplate {
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
        }
    }
}

#[derive(Subcommand)]
pub enum BoardCommands {
    /// Create a board
    Add {
        /// Board name
        name: String,
    },
    /// Rename a board
    Edit {
        /// Board ID
        id: String,
        /// New name
        #[arg(long)]
        name: String,
    },
    /// Remove an empty board
    Remove {
        /// Board ID
        id: String,
    },
    /// List boards
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show a board with its pipelines and stages
    Show {
        /// Board ID
        id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Save a board and all its pipelines as a template
    SaveAsTemplate {
        /// Board ID
        id: String,
        #[command(flatten)]
        save: SaveArgs,
    },
}

/// Pipeline attributes shared by add and edit
#[derive(Args, Default)]
pub struct PipelineArgs {
    /// Status (active, archived)
    #[arg(long, value_parser = parse_record_status)]
    pub status: Option<RecordStatus>,
    /// Visibility (public, private)
    #[arg(long, value_parser = parse_visibility)]
    pub visibility: Option<Visibility>,
    /// Background color (#rgb or #rrggbb)
    #[arg(long, value_parser = validate_hex_color)]
    pub bg_color: Option<String>,
    /// Start date (YYYY-MM-DD, YYYY-MM-DDTHH:MM, today, tomorrow)
    #[arg(long, value_parser = parse_timestamp)]
    pub start_date: Option<i64>,
    /// End date
    #[arg(long, value_parser = parse_timestamp)]
    pub end_date: Option<i64>,
    /// Metric label
    #[arg(long)]
    pub metric: Option<String>,
    /// Scoring type
    #[arg(long)]
    pub hack_scoring_type: Option<String>,
    /// Restrict items by date
    #[arg(long)]
    pub check_date: Option<bool>,
    /// Restrict items to their assigned users
    #[arg(long)]
    pub check_user: Option<bool>,
    /// Restrict items to the user's department
    #[arg(long)]
    pub check_department: Option<bool>,
    /// Item numbering pattern, e.g. "DEAL-{year}-"
    #[arg(long)]
    pub number_config: Option<String>,
    /// Digits of the item sequence number
    #[arg(long)]
    pub number_size: Option<String>,
    /// Item naming pattern
    #[arg(long)]
    pub name_config: Option<String>,
    /// Position among the board's pipelines
    #[arg(long)]
    pub order: Option<i64>,
}

impl PipelineArgs {
    fn to_doc(&self, board_id: Option<String>, name: Option<String>) -> PipelineDoc {
        PipelineDoc {
            board_id,
            name,
            status: self.status,
            visibility: self.visibility,
            bg_color: self.bg_color.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            metric: self.metric.clone(),
            hack_scoring_type: self.hack_scoring_type.clone(),
            is_check_date: self.check_date,
            is_check_user: self.check_user,
            is_check_department: self.check_department,
            number_config: self.number_config.clone(),
            number_size: self.number_size.clone(),
            name_config: self.name_config.clone(),
            order: self.order,
        }
    }
}

/// Stage list given on the command line
#[derive(Args, Default)]
pub struct StageArgs {
    /// Stage as NAME or NAME=PROBABILITY (repeatable, in order)
    #[arg(long = "stage", value_parser = parse_stage_spec)]
    pub stages: Vec<StageDoc>,
    /// Stages as a JSON array of {id?, name, probability?, status?, order?}
    #[arg(long = "stages", value_parser = parse_stage_list, conflicts_with = "stages")]
    pub stage_json: Option<StageList>,
}

impl StageArgs {
    fn given(&self) -> Option<Vec<StageDoc>> {
        if let Some(ref list) = self.stage_json {
            return Some(list.0.clone());
        }
        if self.stages.is_empty() {
            None
        } else {
            Some(self.stages.clone())
        }
    }
}

#[derive(Subcommand)]
pub enum PipelineCommands {
    /// Create a pipeline on a board
    Add {
        /// Board ID
        board_id: String,
        /// Pipeline name
        name: String,
        #[command(flatten)]
        attrs: PipelineArgs,
        #[command(flatten)]
        stages: StageArgs,
    },
    /// Modify a pipeline; a stage list replaces the current stages
    Edit {
        /// Pipeline ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// Move to another board
        #[arg(long)]
        board: Option<String>,
        #[command(flatten)]
        attrs: PipelineArgs,
        #[command(flatten)]
        stages: StageArgs,
    },
    /// Remove a pipeline with its stages and deals
    Remove {
        /// Pipeline ID
        id: String,
    },
    /// Archive or restore a pipeline (toggles without --status)
    Archive {
        /// Pipeline ID
        id: String,
        /// Explicit status (active, archived)
        #[arg(long, value_parser = parse_record_status)]
        status: Option<RecordStatus>,
    },
    /// Duplicate a pipeline and its stages
    Copy {
        /// Pipeline ID
        id: String,
    },
    /// Set the position of several pipelines at once
    Reorder {
        /// New positions as ID=ORDER
        #[arg(required = true, value_parser = parse_pipeline_order)]
        orders: Vec<PipelineOrder>,
    },
    /// Watch a pipeline as the acting user
    Watch {
        /// Pipeline ID
        id: String,
        /// Stop watching instead
        #[arg(long)]
        remove: bool,
    },
    /// List the pipelines of a board
    List {
        /// Board ID
        board_id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show a pipeline with its stages
    Show {
        /// Pipeline ID
        id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Save a pipeline as a template
    SaveAsTemplate {
        /// Pipeline ID
        id: String,
        #[command(flatten)]
        save: SaveArgs,
    },
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Set the time tracking state of a board item
    TimeTrack {
        /// Item ID
        id: String,
        /// started, stopped, paused or completed
        #[arg(value_parser = parse_time_track_status)]
        status: TimeTrackStatus,
        /// Seconds or a duration such as 1h30m
        #[arg(value_parser = parse_seconds)]
        time_spent: i64,
        /// When tracking started
        #[arg(long, value_parser = parse_timestamp)]
        start_date: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum DealCommands {
    /// Place a deal on a stage
    Add {
        /// Stage ID
        stage_id: String,
        /// Deal name
        name: String,
    },
    /// Show a deal
    Show {
        /// Deal ID
        id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Template content and attributes
#[derive(Args)]
pub struct TemplateArgs {
    /// Content as a JSON string
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,
    /// Read content from a file
    #[arg(long)]
    pub content_file: Option<PathBuf>,
    /// Content type as SERVICE:RESOURCE, e.g. sales:board
    #[arg(long)]
    pub content_type: Option<String>,
    /// Description
    #[arg(long)]
    pub description: Option<String>,
    /// Category ID
    #[arg(long)]
    pub category: Option<String>,
    /// Status (active, inactive)
    #[arg(long, value_parser = parse_template_status)]
    pub status: Option<TemplateStatus>,
}

impl TemplateArgs {
    fn to_doc(&self, name: Option<String>) -> Result<TemplateDoc> {
        let content = match self.content_file {
            Some(ref path) => Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
            ),
            None => self.content.clone(),
        };
        Ok(TemplateDoc {
            name,
            content,
            content_type: self.content_type.clone(),
            plugin_type: self.content_type
                .as_deref()
                .and_then(|t| t.split_once(':'))
                .map(|(service, _)| service.to_string()),
            description: self.description.clone(),
            category: self.category.clone(),
            status: self.status,
        })
    }
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// Create a template
    Add {
        /// Template name
        name: String,
        #[command(flatten)]
        attrs: TemplateArgs,
    },
    /// Modify a template
    Edit {
        /// Template ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        attrs: TemplateArgs,
    },
    /// Remove a template
    Remove {
        /// Template ID
        id: String,
    },
    /// Restore a template through the service owning its content type
    Use {
        /// Template ID
        id: String,
        /// Target board (pipeline templates)
        #[arg(long)]
        board: Option<String>,
    },
    /// List templates
    List {
        /// Case-insensitive text to find in name or description
        #[arg(long)]
        search: Option<String>,
        /// Category ID (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Exact content type
        #[arg(long)]
        content_type: Option<String>,
        /// Only templates with this status
        #[arg(long, value_parser = parse_template_status)]
        status: Option<TemplateStatus>,
        /// Page number (from 1)
        #[arg(long)]
        page: Option<usize>,
        /// Templates per page
        #[arg(long)]
        per_page: Option<usize>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show a template
    Show {
        /// Template ID
        id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// List content types in use
    Types {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Save any entity as a template through the service owning it
    SaveFrom {
        /// Source entity ID
        source_id: String,
        /// Content type as SERVICE:RESOURCE, e.g. sales:pipeline
        content_type: String,
        #[command(flatten)]
        save: SaveArgs,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List {
        /// Only categories of this content type
        #[arg(long)]
        content_type: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Create a category
    Add {
        /// Category name
        name: String,
        /// Unique code
        code: String,
        /// Content type the category groups
        #[arg(long)]
        content_type: String,
        /// Parent category ID
        #[arg(long)]
        parent: Option<String>,
        /// Sort key
        #[arg(long)]
        order: Option<String>,
        /// Status (active, inactive)
        #[arg(long, value_parser = parse_template_status)]
        status: Option<TemplateStatus>,
    },
    /// Modify a category
    Edit {
        /// Category ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        order: Option<String>,
        #[arg(long, value_parser = parse_template_status)]
        status: Option<TemplateStatus>,
    },
    /// Remove a category without children
    Remove {
        /// Category ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum FieldGroupCommands {
    /// Create a field group
    Add {
        /// Group name
        name: String,
        /// Board ID the group applies to (repeatable)
        #[arg(long = "board")]
        boards: Vec<String>,
        /// Pipeline ID the group applies to (repeatable)
        #[arg(long = "pipeline")]
        pipelines: Vec<String>,
    },
    /// List field groups
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse the command line and run it against the configured store
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if cli.user.is_some() {
        config.user = cli.user.clone();
    }
    let app = AppContext::open(&config)
        .context("Failed to open the sales database")?;
    let ctx = app.service();

    match cli.command {
        Commands::Boards { subcommand } => handle_boards(&ctx, subcommand),
        Commands::Pipelines { subcommand } => handle_pipelines(&ctx, subcommand),
        Commands::Items { subcommand } => handle_items(&ctx, subcommand),
        Commands::Deals { subcommand } => handle_deals(&ctx, subcommand),
        Commands::Templates { subcommand } => handle_templates(&ctx, subcommand),
        Commands::Categories { subcommand } => handle_categories(&ctx, subcommand),
        Commands::FieldGroups { subcommand } => handle_field_groups(&ctx, subcommand),
    }
}

fn handle_boards(ctx: &ServiceContext, cmd: BoardCommands) -> Result<()> {
    match cmd {
        BoardCommands::Add { name } => {
            let board = boards::add(ctx, &name)?;
            println!("Created board '{}' (id: {})", board.name, board.id);
        }
        BoardCommands::Edit { id, name } => {
            let board = boards::edit(ctx, &id, &BoardDoc { name: Some(name) })?;
            println!("Renamed board {} to '{}'", board.id, board.name);
        }
        BoardCommands::Remove { id } => {
            let board = boards::remove(ctx, &id)?;
            println!("Removed board '{}' (id: {})", board.name, board.id);
        }
        BoardCommands::List { json } => {
            let list = boards::list(ctx)?;
            if json {
                print_json(&list)?;
            } else {
                println!("{}", format_board_list(&list));
            }
        }
        BoardCommands::Show { id, json } => {
            let detail = boards::detail(ctx, &id)?;
            if json {
                print_json(&detail)?;
            } else {
                print!("{}", format_board_detail(&detail));
            }
        }
        BoardCommands::SaveAsTemplate { id, save } => {
            let saved = boards::save_as_template(ctx, &id, &save.to_request())?;
            println!("{} (template id: {})", saved.message, saved.template_id);
        }
    }
    Ok(())
}

/// Stage entries for an edit: bare names reuse the id of an existing stage
/// with the same name so that its deals are kept
fn match_existing_stages(ctx: &ServiceContext, pipeline_id: &str, docs: Vec<StageDoc>) -> Result<Vec<StageDoc>> {
    let existing = StageRepo::list_for_pipeline(ctx.conn, pipeline_id)?;
    Ok(reuse_stage_ids(&existing, docs))
}

/// Each existing stage is claimed at most once; a name repeated more often
/// than it exists yields new stages for the extra entries.
fn reuse_stage_ids(existing: &[Stage], mut docs: Vec<StageDoc>) -> Vec<StageDoc> {
    let mut claimed: HashSet<String> = docs.iter().filter_map(|d| d.id.clone()).collect();
    for doc in docs.iter_mut().filter(|d| d.id.is_none()) {
        if let Some(stage) = existing
            .iter()
            .find(|s| s.name == doc.name && !claimed.contains(&s.id))
        {
            claimed.insert(stage.id.clone());
            doc.id = Some(stage.id.clone());
        }
    }
    docs
}

fn handle_pipelines(ctx: &ServiceContext, cmd: PipelineCommands) -> Result<()> {
    match cmd {
        PipelineCommands::Add { board_id, name, attrs, stages } => {
            let doc = attrs.to_doc(Some(board_id), Some(name));
            let detail = pipelines::add(ctx, &doc, &stages.given().unwrap_or_default())?;
            println!(
                "Created pipeline '{}' (id: {}) with {} stage(s)",
                detail.pipeline.name,
                detail.pipeline.id,
                detail.stages.len()
            );
        }
        PipelineCommands::Edit { id, name, board, attrs, stages } => {
            let doc = attrs.to_doc(board, name);
            let stages = match stages.given() {
                Some(docs) if stages.stage_json.is_none() => Some(match_existing_stages(ctx, &id, docs)?),
                other => other,
            };
            let detail = pipelines::edit(ctx, &id, &doc, stages.as_deref())?;
            println!("Modified pipeline '{}' (id: {})", detail.pipeline.name, detail.pipeline.id);
        }
        PipelineCommands::Remove { id } => {
            let pipeline = pipelines::remove(ctx, &id)?;
            println!("Removed pipeline '{}' (id: {})", pipeline.name, pipeline.id);
        }
        PipelineCommands::Archive { id, status } => {
            let pipeline = pipelines::archive(ctx, &id, status)?;
            println!("Pipeline '{}' is now {}", pipeline.name, pipeline.status.as_str());
        }
        PipelineCommands::Copy { id } => {
            let detail = pipelines::copy(ctx, &id)?;
            println!(
                "Copied pipeline to '{}' (id: {}) with {} stage(s)",
                detail.pipeline.name,
                detail.pipeline.id,
                detail.stages.len()
            );
        }
        PipelineCommands::Reorder { orders } => {
            let reordered = pipelines::update_order(ctx, &orders)?;
            for pipeline in &reordered {
                println!("Pipeline '{}' moved to position {}", pipeline.name, pipeline.order);
            }
        }
        PipelineCommands::Watch { id, remove } => {
            let pipeline = pipelines::watch(ctx, &id, !remove)?;
            let verb = if remove { "Stopped watching" } else { "Watching" };
            println!("{} pipeline '{}' ({} watcher(s))", verb, pipeline.name, pipeline.watched_user_ids.len());
        }
        PipelineCommands::List { board_id, json } => {
            let list = pipelines::list(ctx, &board_id)?;
            if json {
                print_json(&list)?;
            } else {
                println!("{}", format_pipeline_list(&list));
            }
        }
        PipelineCommands::Show { id, json } => {
            let detail = pipelines::detail(ctx, &id)?;
            if json {
                print_json(&detail)?;
            } else {
                print!("{}", format_pipeline_detail(&detail));
            }
        }
        PipelineCommands::SaveAsTemplate { id, save } => {
            let saved = pipelines::save_as_template(ctx, &id, &save.to_request())?;
            println!("{} (template id: {})", saved.message, saved.template_id);
        }
    }
    Ok(())
}

fn handle_items(ctx: &ServiceContext, cmd: ItemCommands) -> Result<()> {
    match cmd {
        ItemCommands::TimeTrack { id, status, time_spent, start_date } => {
            let deal = boards::update_time_tracking(ctx, &id, status, time_spent, start_date)?;
            println!("Time tracking for '{}' set to {}", deal.name, status.as_str());
        }
    }
    Ok(())
}

fn handle_deals(ctx: &ServiceContext, cmd: DealCommands) -> Result<()> {
    match cmd {
        DealCommands::Add { stage_id, name } => {
            let deal = deals::add(ctx, &stage_id, &name)?;
            println!("Created deal '{}' (id: {})", deal.name, deal.id);
        }
        DealCommands::Show { id, json } => {
            let deal = deals::get(ctx, &id)?;
            if json {
                print_json(&deal)?;
            } else {
                print!("{}", format_deal(&deal));
            }
        }
    }
    Ok(())
}

fn handle_templates(ctx: &ServiceContext, cmd: TemplateCommands) -> Result<()> {
    match cmd {
        TemplateCommands::Add { name, attrs } => {
            let template = templates::add(ctx, &attrs.to_doc(Some(name))?)?;
            println!("Created template '{}' (id: {})", template.name, template.id);
        }
        TemplateCommands::Edit { id, name, attrs } => {
            let template = templates::edit(ctx, &id, &attrs.to_doc(name)?)?;
            println!("Modified template '{}' (id: {})", template.name, template.id);
        }
        TemplateCommands::Remove { id } => {
            let template = templates::remove(ctx, &id)?;
            println!("Removed template '{}' (id: {})", template.name, template.id);
        }
        TemplateCommands::Use { id, board } => {
            let outcome = templates::use_template(ctx, &id, board.as_deref())?;
            if let TemplateUse::Raw(_) = outcome {
                eprintln!("Template could not be restored; showing its raw content.");
            }
            print_json(&outcome)?;
        }
        TemplateCommands::List { search, categories, content_type, status, page, per_page, json } => {
            let filter = TemplateFilter {
                search_value: search,
                category_ids: categories,
                content_type,
                status,
            };
            let paging = Paging::new(page, per_page);
            let result = templates::list(ctx, &filter, paging)?;
            if json {
                print_json(&result)?;
            } else {
                println!("{}", format_template_page(&result, paging));
            }
        }
        TemplateCommands::Show { id, json } => {
            let template = templates::get(ctx, &id)?;
            if json {
                print_json(&template)?;
            } else {
                print!("{}", format_template_detail(&template));
            }
        }
        TemplateCommands::Types { json } => {
            let types = templates::types(ctx)?;
            if json {
                print_json(&types)?;
            } else if types.is_empty() {
                println!("No content types in use.");
            } else {
                for content_type in types {
                    println!("{}", content_type);
                }
            }
        }
        TemplateCommands::SaveFrom { source_id, content_type, save } => {
            let result = templates::save_from(ctx, &source_id, &content_type, &save.to_request())?;
            print_json(&result)?;
        }
    }
    Ok(())
}

fn handle_categories(ctx: &ServiceContext, cmd: CategoryCommands) -> Result<()> {
    match cmd {
        CategoryCommands::List { content_type, json } => {
            let page = categories::list(ctx, content_type.as_deref())?;
            if json {
                print_json(&page)?;
            } else {
                println!("{}", format_category_list(&page));
            }
        }
        CategoryCommands::Add { name, code, content_type, parent, order, status } => {
            let category = categories::add(ctx, &CategoryDoc {
                name: Some(name),
                code: Some(code),
                parent_id: parent,
                content_type: Some(content_type),
                order,
                status,
            })?;
            println!("Created category '{}' (id: {})", category.code, category.id);
        }
        CategoryCommands::Edit { id, name, code, content_type, parent, order, status } => {
            let category = categories::edit(ctx, &id, &CategoryDoc {
                name,
                code,
                parent_id: parent,
                content_type,
                order,
                status,
            })?;
            println!("Modified category '{}' (id: {})", category.code, category.id);
        }
        CategoryCommands::Remove { id } => {
            let category = categories::remove(ctx, &id)?;
            println!("Removed category '{}' (id: {})", category.code, category.id);
        }
    }
    Ok(())
}

fn handle_field_groups(ctx: &ServiceContext, cmd: FieldGroupCommands) -> Result<()> {
    match cmd {
        FieldGroupCommands::Add { name, boards, pipelines } => {
            let group = field_groups::add(ctx, &name, &boards, &pipelines)?;
            println!("Created field group '{}' (id: {})", group.name, group.id);
        }
        FieldGroupCommands::List { json } => {
            let groups = field_groups::list(ctx)?;
            if json {
                print_json(&groups)?;
            } else {
                println!("{}", format_field_group_list(&groups));
            }
        }
    }
    Ok(())
}

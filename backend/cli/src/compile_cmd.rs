//! `tractstack compile`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::{json, Value};
use tracing::info;

use tractstack_actions::ActionContext;
use tractstack_config::EngineConfig;
use tractstack_core::{FileNode, OptionsPayload};
use tractstack_markdown::{compile, parse_markdown, resolve_parent_classes, CompileContext, HastNode};

use crate::input::{read_json_opt, read_text};

#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Markdown file, or a hast JSON tree with --hast
    pub input: PathBuf,
    /// Input is a hast JSON tree instead of markdown text
    #[arg(long)]
    pub hast: bool,
    /// Options payload JSON (class names, overrides, buttons)
    #[arg(long)]
    pub options: Option<PathBuf>,
    /// File table JSON: array of {id, filename, src, altDescription?, srcSet?}
    #[arg(long)]
    pub files: Option<PathBuf>,
    /// Slug of the page the pane is rendered on (defaults to the home slug)
    #[arg(long)]
    pub slug: Option<String>,
    /// The page is a context page
    #[arg(long)]
    pub context: bool,
    /// Parent id for top-level blocks
    #[arg(long)]
    pub container_id: Option<String>,
}

pub async fn run(args: CompileArgs, config: &EngineConfig) -> Result<Value> {
    let raw = read_text(&args.input).await?;
    let root = if args.hast { HastNode::from_json(&raw)? } else { parse_markdown(&raw) };

    let options_value: Option<Value> = read_json_opt(args.options.as_deref()).await?;
    let options = OptionsPayload::from_value(options_value.as_ref());
    let files: Vec<FileNode> = read_json_opt(args.files.as_deref()).await?.unwrap_or_default();

    let slug = args.slug.unwrap_or_else(|| config.home_slug().to_string());
    let actions = ActionContext::new(slug, config.home_slug()).with_context(args.context);
    let ctx = CompileContext::new(&options, &files, actions)
        .with_container_id(args.container_id.as_deref().unwrap_or(config.container_id()))
        .with_fallback_alt(config.fallback_alt());

    let graph = compile(&root, &ctx);
    info!(input = %args.input.display(), nodes = graph.len(), "Compiled pane");

    Ok(json!({
        "containerId": graph.container_id(),
        "nodes": graph.nodes(),
        "lookup": graph.lookup(),
        "parentClasses": resolve_parent_classes(&options),
    }))
}

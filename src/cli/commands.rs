//! Command dispatch

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use itertools::Itertools;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::application::display::node_label;
use crate::application::{parse_script, ApplicationError, IoResultExt, NavBuilder, TreeDisplay};
use crate::cli::args::{Cli, Commands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::domain::{count_nodes, parse_value, DragOutcome, NodeFields, NodeForm, NodeId};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let cwd = std::env::current_dir().with_context("determine working directory")?;
    let settings = Settings::load(Some(&cwd))?;
    let ctx = Context {
        file: cli.file.clone().or_else(|| settings.value_file.clone()),
        settings,
    };

    match &cli.command {
        Some(Commands::Show) => ctx.show(),
        Some(Commands::Add {
            label,
            slug,
            kind,
            parent,
            in_place,
        }) => ctx.add(label, slug.as_deref(), kind.as_deref(), parent, *in_place),
        Some(Commands::Move {
            node,
            parent,
            index,
            in_place,
        }) => ctx.move_node(node, parent, *index, *in_place),
        Some(Commands::Drag { script, in_place }) => ctx.drag(script, *in_place),
        Some(Commands::Check) => ctx.check(),
        Some(Commands::Fmt { in_place }) => ctx.fmt(*in_place),
        Some(Commands::Config) => ctx.config(),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "navtree", &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

struct Context {
    file: Option<PathBuf>,
    settings: Settings,
}

impl Context {
    fn file(&self) -> CliResult<&Path> {
        self.file.as_deref().ok_or_else(|| {
            CliError::Usage("no navigation file: pass --file or set value_file in config".into())
        })
    }

    fn read(&self) -> CliResult<(PathBuf, String)> {
        let path = self.file()?.to_path_buf();
        let content = std::fs::read_to_string(&path).with_path_context("read nav file", &path)?;
        Ok((path, content))
    }

    fn load(&self) -> CliResult<(PathBuf, NavBuilder)> {
        let (path, content) = self.read()?;
        let builder = NavBuilder::from_json(self.settings.form.form_spec(), &content)?;
        debug!("loaded {} nodes from {}", builder.tree().len(), path.display());
        Ok((path, builder))
    }

    /// Prints the builder's value, or writes it back to `path` atomically.
    fn emit(&self, builder: &NavBuilder, path: &Path, in_place: bool) -> CliResult<()> {
        let json = builder.to_json(self.settings.output.indent())?;
        if in_place {
            write_atomic(path, &json)?;
            output::action("written", &path.display());
        } else {
            output::data(&json);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn show(&self) -> CliResult<()> {
        let (_, builder) = self.load()?;
        output::data(&builder.to_tree_string());
        let tree = builder.tree();
        output::detail(&format!("{} nodes, {} levels", tree.len(), tree.depth()));
        Ok(())
    }

    #[instrument(skip(self))]
    fn add(
        &self,
        label: &str,
        slug: Option<&str>,
        kind: Option<&str>,
        parent: &str,
        in_place: bool,
    ) -> CliResult<()> {
        let (path, mut builder) = self.load()?;
        let parent = builder.resolve_parent(parent)?;

        let mut data = NodeFields::new();
        data.insert("label".into(), label.into());
        let id = builder.add_node(parent, data)?;

        let form = builder.form_mut(id)?;
        if let Some(slug) = slug {
            form.set("slug", slug).map_err(ApplicationError::from)?;
        }
        if let Some(kind) = kind.or(self.settings.form.default_type.as_deref()) {
            form.set("type", kind).map_err(ApplicationError::from)?;
        }
        output::action("added", &node_label(&form.serialize()));

        self.emit(&builder, &path, in_place)
    }

    #[instrument(skip(self))]
    fn move_node(&self, node: &str, parent: &str, index: usize, in_place: bool) -> CliResult<()> {
        let (path, mut builder) = self.load()?;
        let id = builder.resolve_path(node)?;
        let parent = builder.resolve_parent(parent)?;
        builder.move_node(id, parent, index)?;
        output::action("moved", &format!("{} -> {}", node, describe(&builder, id)?));
        self.emit(&builder, &path, in_place)
    }

    #[instrument(skip(self))]
    fn drag(&self, script: &Path, in_place: bool) -> CliResult<()> {
        let (path, mut builder) = self.load()?;
        let text = std::fs::read_to_string(script).with_path_context("read drag script", script)?;
        let steps = parse_script(&text)?;
        let outcomes = builder.replay(&steps)?;

        for outcome in &outcomes {
            match outcome {
                DragOutcome::Committed { node, moved: true, .. } => output::action("dropped", &describe(&builder, *node)?),
                DragOutcome::Committed { node, .. } => {
                    output::detail(&format!("{} dropped in place", describe(&builder, *node)?))
                }
                DragOutcome::Cancelled {
                    restored: Some(node),
                } => output::detail(&format!("drag of {} cancelled", node)),
                other => debug!("outcome: {:?}", other),
            }
        }
        if builder.drag_session().is_some() {
            output::warning("script ended mid-drag; the pending drop was discarded");
        }
        info!("replayed {} drag steps", steps.len());
        self.emit(&builder, &path, in_place)
    }

    #[instrument(skip(self))]
    fn check(&self) -> CliResult<()> {
        let (path, content) = self.read()?;
        let input = parse_value(&content).map_err(ApplicationError::from)?;
        let builder: NavBuilder =
            NavBuilder::with_value(self.settings.form.form_spec(), &input)?;
        let roundtrip = builder.serialize()?;

        if roundtrip != input {
            return Err(CliError::CheckFailed(path.display().to_string()));
        }
        for (_, node) in builder.tree().iter() {
            builder
                .form(node.id)?
                .validate()
                .map_err(ApplicationError::from)?;
        }
        output::success(&format!(
            "{}: {} nodes round-trip unchanged",
            path.display(),
            count_nodes(&input)
        ));
        Ok(())
    }

    #[instrument(skip(self))]
    fn fmt(&self, in_place: bool) -> CliResult<()> {
        let (path, builder) = self.load()?;
        self.emit(&builder, &path, in_place)
    }

    fn config(&self) -> CliResult<()> {
        output::data(&self.settings.to_toml()?);
        Ok(())
    }
}

/// `label (slug) [type] at 0.2`, naming a node by its current position.
fn describe(builder: &NavBuilder, id: NodeId) -> CliResult<String> {
    let fields = builder.form(id)?.serialize();
    let path = builder
        .tree()
        .path_of(id)
        .map_err(ApplicationError::from)?
        .iter()
        .join(".");
    Ok(format!("{} at {}", node_label(&fields), path))
}

/// Replaces `path` with `content` via a temp file in the same directory.
fn write_atomic(path: &Path, content: &str) -> CliResult<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).with_path_context("create temp file", dir)?;
    writeln!(tmp, "{}", content).with_path_context("write temp file", tmp.path())?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_path_context("replace nav file", path)?;
    Ok(())
}

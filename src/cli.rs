//! Minimal CLI: schema files → field tables (json | lines)
use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::Value;

use field_docs::{document_with, FieldType, SchemaProvider, VisitorContext, WalkOptions};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// document the fields of JSON Schema files: path → JSON type
#[derive(Parser, Debug)]
#[command(name = "field-docs")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// walk each schema and print its field table
    Fields(FieldsOut),
    /// list the named definitions (`$defs` / `definitions`) of each schema
    Definitions(DefinitionsOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to the schema inside each document (e.g. /components/schemas/Order)
    #[arg(long, conflicts_with = "definition")]
    json_pointer: Option<String>,

    /// document this named definition instead of the document root
    #[arg(long)]
    definition: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Lines,
}

#[derive(clap::Parser, Debug)]
struct FieldsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// include name, declaring type, optionality and description per field
    #[arg(long, default_value_t = false)]
    detailed: bool,

    /// maximum schema nesting before a walk is aborted
    #[arg(long, default_value_t = WalkOptions::default().max_depth)]
    max_depth: usize,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct DefinitionsOut {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Walk every input file independently; results keep the input order.
    fn document_all(&self, options: WalkOptions) -> Result<Vec<(PathBuf, VisitorContext)>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        source_paths
            .into_par_iter()
            .map(|source_path| -> Result<(PathBuf, VisitorContext)> {
                let context = self.document_file(&source_path, options)
                    .with_context(|| format!("failed to document {}", source_path.display()))?;
                Ok((source_path, context))
            })
            .collect()
    }

    fn document_file(&self, source_path: &Path, options: WalkOptions) -> Result<VisitorContext> {
        let provider = SchemaProvider::from_root(load_json(source_path)?).with_options(options);
        let reference = match (&self.json_pointer, &self.definition) {
            (Some(pointer), _) => format!("#{pointer}"),
            (None, Some(name)) => provider.definition_reference(name)
                .ok_or_else(|| anyhow!("no definition named `{name}`"))?,
            (None, None) => "#".to_string(),
        };
        tracing::info!(file = %source_path.display(), reference = %reference, "documenting schema");
        let context = document_with(&provider, |provider, visitor| {
            provider.accept_reference(&reference, visitor)
        })?;
        Ok(context)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Fields(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(())
                }
                let options = WalkOptions { max_depth: target.max_depth };
                let documented = target.input_settings.document_all(options)?;
                let rendered = match target.format {
                    OutputFormat::Json => render_json(&documented, target.detailed)?,
                    OutputFormat::Lines => render_lines(&documented, target.detailed),
                };
                write_output(target.out.as_deref(), &rendered)
            }
            Command::Definitions(target) => {
                let source_paths = resolve_file_path_patterns(&target.input)
                    .context("failed to resolve input file paths")?;
                for source_path in source_paths {
                    let provider = SchemaProvider::from_root(load_json(&source_path)?);
                    println!("{}", source_path.display().to_string().bold());
                    for (name, _) in provider.definitions() {
                        println!("  {name}");
                    }
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// OUTPUT
// ————————————————————————————————————————————————————————————————————————————

fn render_json(documented: &[(PathBuf, VisitorContext)], detailed: bool) -> Result<String> {
    let mut out = IndexMap::<String, Value>::new();
    for (source_path, context) in documented {
        let value = if detailed {
            serde_json::to_value(context)?
        } else {
            serde_json::to_value(context.field_types())?
        };
        out.insert(source_path.display().to_string(), value);
    }
    Ok(serde_json::to_string_pretty(&out)?)
}

fn render_lines(documented: &[(PathBuf, VisitorContext)], detailed: bool) -> String {
    let mut out = String::new();
    for (source_path, context) in documented {
        out.push_str(&format!("{}\n", source_path.display().to_string().bold()));
        let width = context.entries().map(|e| e.info.path().chars().count()).max().unwrap_or(0);
        for entry in context.entries() {
            let path = entry.info.path();
            out.push_str(&format!("  {path:<width$}  {}", paint(entry.field_type)));
            if detailed {
                if entry.info.is_optional() {
                    out.push_str(&format!("  {}", "optional".dimmed()));
                }
                if let Some(description) = entry.info.description() {
                    out.push_str(&format!("  {description}"));
                }
            }
            out.push('\n');
        }
    }
    out
}

fn paint(field_type: FieldType) -> colored::ColoredString {
    let label = field_type.as_str();
    match field_type {
        FieldType::Object | FieldType::Array => label.cyan(),
        FieldType::String => label.green(),
        FieldType::Number => label.yellow(),
        FieldType::Boolean => label.magenta(),
        FieldType::Null => label.dimmed(),
        FieldType::Varies => label.red(),
    }
}

fn write_output(out: Option<&Path>, rendered: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, rendered)
                .with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn load_json(source_path: &Path) -> Result<Value> {
    let source = std::fs::read_to_string(source_path)
        .with_context(|| format!("failed to read source file {}", source_path.display()))?;
    serde_json::from_str::<Value>(&source)
        .with_context(|| format!("failed to parse JSON source file {}", source_path.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fields_subcommand() {
        let cli = CommandLineInterface::try_parse_from([
            "field-docs", "fields", "--input", "a.json", "b.json", "--format", "lines", "--definition", "Order",
        ]).unwrap();
        let Command::Fields(target) = cli.cmd else { panic!("expected fields") };
        assert_eq!(target.input_settings.input, vec!["a.json", "b.json"]);
        assert_eq!(target.input_settings.definition.as_deref(), Some("Order"));
        assert_eq!(target.format, OutputFormat::Lines);
        assert_eq!(target.max_depth, 64);
    }

    #[test]
    fn pointer_and_definition_conflict() {
        let parsed = CommandLineInterface::try_parse_from([
            "field-docs", "fields", "-i", "a.json", "--json-pointer", "/x", "--definition", "Order",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn literal_paths_pass_through_and_empty_globs_fail() {
        let paths = resolve_file_path_patterns(["schemas/order.json"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("schemas/order.json")]);
        assert!(resolve_file_path_patterns(["/definitely/not/here/*.json"]).is_err());
    }

    #[test]
    fn json_output_is_keyed_by_file() {
        let ctx = field_docs::document_schema(&serde_json::json!({
            "type": "object",
            "properties": { "id": { "type": "integer" } }
        })).unwrap();
        let rendered = render_json(&[(PathBuf::from("order.json"), ctx)], false).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value, serde_json::json!({ "order.json": { "id": "NUMBER" } }));
    }

    #[test]
    fn lines_output_lists_every_field() {
        colored::control::set_override(false);
        let ctx = field_docs::document_schema(&serde_json::json!({
            "type": "object",
            "properties": { "id": { "type": "integer" }, "tags": { "type": "array" } }
        })).unwrap();
        let rendered = render_lines(&[(PathBuf::from("order.json"), ctx)], false);
        assert_eq!(rendered, "order.json\n  id    number\n  tags  array\n");
    }

    #[test]
    fn lines_align_non_ascii_paths() {
        colored::control::set_override(false);
        let ctx = field_docs::document_schema(&serde_json::json!({
            "type": "object",
            "properties": { "größe": { "type": "number" }, "abcdef": { "type": "string" } }
        })).unwrap();
        let rendered = render_lines(&[(PathBuf::from("s.json"), ctx)], false);
        assert_eq!(rendered, "s.json\n  größe   number\n  abcdef  string\n");
    }
}

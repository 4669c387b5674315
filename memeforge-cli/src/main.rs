use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "memeforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in meme templates.
    Templates(TemplatesArgs),
    /// Caption an image and write the meme as a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct TemplatesArgs {
    /// Print the catalog as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["template", "image"])))]
struct RenderArgs {
    /// Template id or display name.
    #[arg(long)]
    template: Option<String>,

    /// Image file to upload (type inferred from the extension).
    #[arg(long)]
    image: Option<PathBuf>,

    /// Top caption.
    #[arg(long, default_value = "")]
    top: String,

    /// Bottom caption.
    #[arg(long, default_value = "")]
    bottom: String,

    /// Caption size in px.
    #[arg(long)]
    font_size: Option<u32>,

    /// Caption font file (TTF/OTF). Defaults to a heavy system sans-serif.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Directory holding `templates/<id>.jpg` copies and relative references.
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Editor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory; the file is named `meme-<timestamp>.png`.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Exact output path; overrides `--out-dir`.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Templates(args) => cmd_templates(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_templates(args: TemplatesArgs) -> anyhow::Result<()> {
    if args.json {
        let json = serde_json::to_string_pretty(memeforge::TEMPLATES)
            .context("serialize template catalog")?;
        println!("{json}");
        return Ok(());
    }
    for t in memeforge::TEMPLATES {
        let mark = if t.popular { " *" } else { "" };
        println!("{:<16} {}{mark}", t.id, t.name);
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => memeforge::EditorConfig::from_path(path)?,
        None => memeforge::EditorConfig::default(),
    }
    .with_env_overrides();
    if let Some(root) = args.assets_root {
        config.assets_root = root;
    }
    if let Some(font) = args.font {
        config.font_path = Some(font);
    }

    let mut editor = memeforge::Editor::from_config(config).context("start editor")?;

    let loaded = match (&args.template, &args.image) {
        (Some(key), _) => editor
            .select_template(key)
            .with_context(|| format!("load template '{key}'")),
        (None, Some(path)) => memeforge::Upload::from_path(path)
            .and_then(|upload| editor.upload(upload))
            .with_context(|| format!("load image '{}'", path.display())),
        (None, None) => anyhow::bail!("either --template or --image is required"),
    };
    report_notices(&mut editor);
    loaded?;

    if let Some(size) = args.font_size {
        editor.set_font_size(size)?;
    }
    editor.set_top_text(args.top)?;
    editor.set_bottom_text(args.bottom)?;

    let artifact = editor.export().context("export meme")?;
    report_notices(&mut editor);

    let out_path = match args.out {
        Some(path) => path,
        None => args.out_dir.join(&artifact.file_name),
    };
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out_path, &artifact.png)
        .with_context(|| format!("write png '{}'", out_path.display()))?;

    println!("{}", out_path.display());
    Ok(())
}

fn report_notices(editor: &mut memeforge::Editor) {
    for notice in editor.take_notices() {
        match notice.level {
            memeforge::NoticeLevel::Info => eprintln!("{}", notice.message),
            memeforge::NoticeLevel::Error => eprintln!("error: {}", notice.message),
        }
    }
}

//! Augmentor CLI - serve the HTTP API or augment local images.

use anyhow::Context as _;
use augmentor::prelude::*;
use augmentor::recipes::catalog;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "augmentor", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, env = "AUGMENTOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),
    /// Generate variants of one image.
    Generate(GenerateArgs),
    /// List the recipe catalog.
    Recipes(RecipesArgs),
    /// Print the size and quality report of an image.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Listen address, overriding the config file.
    #[arg(long)]
    listen: Option<SocketAddr>,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Source image path or http(s) URL.
    source: String,

    #[arg(long, default_value = "weather_basic")]
    recipe: String,

    /// Number of variants (1-12).
    #[arg(long, default_value_t = 10)]
    count: i64,

    #[arg(long)]
    seed: Option<i64>,

    /// Directory for variant_NN.jpg files.
    #[arg(long, default_value = "augmented", conflicts_with = "json")]
    out_dir: PathBuf,

    /// Print the JSON response instead of writing files.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct RecipesArgs {
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Source image path or http(s) URL.
    source: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AugmentorConfig::load_or_default(cli.config.as_deref())?;
    init_logging(&config);

    match cli.cmd {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Generate(args) => cmd_generate(&config, args),
        Command::Recipes(args) => cmd_recipes(args),
        Command::Inspect(args) => cmd_inspect(&config, args),
    }
}

fn init_logging(config: &AugmentorConfig) {
    let env = env_logger::Env::default().default_filter_or(config.logging.level.as_str());
    env_logger::Builder::from_env(env).init();
}

fn local_augmentor(config: &AugmentorConfig) -> Augmentor {
    Augmentor::new(
        Arc::new(DefaultSource::new(&config.fetch)),
        VariantGenerator::new(config.quality.into()),
    )
}

fn cmd_serve(config: AugmentorConfig, args: ServeArgs) -> anyhow::Result<()> {
    let listen = args.listen.unwrap_or(config.server.listen);
    // Remote callers may only reference HTTP sources.
    let service = Augmentor::new(
        Arc::new(HttpSource::new(&config.fetch)),
        VariantGenerator::new(config.quality.into()),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(listen)
            .await
            .with_context(|| format!("bind {listen}"))?;
        augmentor::server::serve(listener, service)
            .await
            .context("server error")
    })
}

fn cmd_generate(config: &AugmentorConfig, args: GenerateArgs) -> anyhow::Result<()> {
    let service = local_augmentor(config);
    let request = AugmentRequest::new(args.source)
        .recipe(args.recipe)
        .count(args.count)
        .seed(args.seed);

    if args.json {
        let response = service.handle(&request)?;
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    request.validate()?;
    let source = service.load_source(&request.src_url)?;
    let variants = service.generator().generate_with_report(
        &source,
        &request.recipe,
        request.count,
        request.seed,
    )?;
    write_variants(&args.out_dir, &variants)
}

fn write_variants(out_dir: &Path, variants: &[Variant]) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;

    for variant in variants {
        let report = &variant.report;
        let path = out_dir.join(format!("variant_{:02}.jpg", report.index));
        let bytes = encode_jpeg(&variant.image, JPEG_QUALITY)?;
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;

        let strength = report
            .strength
            .map(|s| format!("{s:.3}"))
            .unwrap_or_else(|| "-".to_string());
        let note = if report.retried { " (retried)" } else { "" };
        eprintln!("wrote {} strength={strength}{note}", path.display());
    }
    Ok(())
}

fn cmd_recipes(args: RecipesArgs) -> anyhow::Result<()> {
    let recipes = catalog();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
        return Ok(());
    }

    for recipe in &recipes {
        let aware = if recipe.strength_aware { " [strength sweep]" } else { "" };
        println!("{}{aware}", recipe.name);
        println!("    {}", recipe.description);
        for step in &recipe.steps {
            println!("    {}", format_step(step));
        }
        println!();
    }
    Ok(())
}

fn format_step(step: &StepDescription) -> String {
    let params: Vec<String> = step
        .effect
        .parameters
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    format!(
        "p={:.2} {:<10} {:<20} {}",
        step.probability,
        step.effect.category.display_name(),
        step.effect.id,
        params.join(" ")
    )
}

fn cmd_inspect(config: &AugmentorConfig, args: InspectArgs) -> anyhow::Result<()> {
    let service = local_augmentor(config);
    let image = service.load_source(&args.source)?;
    let report = service.generator().guard().evaluate(&image);

    println!("size:               {}x{}", image.width(), image.height());
    println!("laplacian variance: {:.2}", report.laplacian_variance);
    println!("mean value:         {:.2}", report.mean_value);
    println!("too blurry:         {}", report.too_blurry);
    println!("too dark:           {}", report.too_dark);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::parse_from(["augmentor", "generate", "street.jpg"]);
        match cli.cmd {
            Command::Generate(args) => {
                assert_eq!(args.recipe, "weather_basic");
                assert_eq!(args.count, 10);
                assert_eq!(args.seed, None);
                assert!(!args.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_format_step_shows_category() {
        let recipes = catalog();
        let rain = recipes
            .iter()
            .find(|r| r.name == RecipeKind::RainHeavy)
            .unwrap();
        let line = format_step(&rain.steps[2]);
        assert!(line.starts_with("p=1.00 Weather"), "{line}");
        assert!(line.contains("rain"), "{line}");
        assert!(line.contains("drop_length="), "{line}");
    }

    #[test]
    fn test_generate_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.png");
        Image::from_fn(40, 30, |x, y| image::Rgb([(x * 6) as u8, (y * 8) as u8, 90]))
            .save(&source)
            .unwrap();

        let out_dir = dir.path().join("out");
        let args = GenerateArgs {
            source: source.to_string_lossy().to_string(),
            recipe: "fog_heavy".to_string(),
            count: 3,
            seed: Some(4),
            out_dir: out_dir.clone(),
            json: false,
        };
        cmd_generate(&AugmentorConfig::default(), args).unwrap();

        for i in 0..3 {
            let written = image::open(out_dir.join(format!("variant_{i:02}.jpg"))).unwrap();
            assert_eq!((written.width(), written.height()), (40, 30));
        }
    }

    #[test]
    fn test_generate_rejects_large_count() {
        let args = GenerateArgs {
            source: "missing.png".to_string(),
            recipe: "fog_heavy".to_string(),
            count: 15,
            seed: None,
            out_dir: PathBuf::from("unused"),
            json: false,
        };
        let error = cmd_generate(&AugmentorConfig::default(), args).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<AugmentError>(),
            Some(AugmentError::InvalidRequest(_))
        ));
    }
}
